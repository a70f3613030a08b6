use anyhow::{Context, Result};
use rangelayers::{Config, Crs, LayerDocument, load_inputs, run_pipeline, write_layer_document};
use tracing::info;

/// Config file and environment first, then command-line overrides.
fn resolve_config(cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(source) = &args.boundary {
        config.boundary.source = source.clone();
    }
    if let Some(name) = &args.jurisdiction {
        config.boundary.name = name.clone();
    }
    if let Some(crs) = &args.range_crs {
        config.ranges.crs = Some(crs.parse::<Crs>()
            .with_context(|| format!("[run] invalid --range-crs {crs}"))?);
    }
    Ok(config)
}

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<()> {
    let out_path = &args.output.clone().unwrap_or("./layers.json".into());
    let config = resolve_config(cli, args)?;

    info!(points = %args.points.display(), ranges = %args.ranges.display(), boundary = %config.boundary.source, "loading inputs");
    let inputs = load_inputs(&args.points, &args.ranges, &config, &cli.cache_dir())?;

    let output = run_pipeline(inputs, &config)
        .context("[run] reconciliation failed")?;

    let document = LayerDocument::assemble(&output, &config.layers);
    write_layer_document(&document, out_path, args.force)?;

    eprintln!(
        "[run] {} species layer pairs, {} points ({} species without range data in {}) -> {}",
        output.pairs.len(),
        output.all_points.len(),
        output.report.point_only_keys.len(),
        config.boundary.name,
        out_path.display(),
    );

    Ok(())
}
