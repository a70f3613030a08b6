use anyhow::Result;
use rangelayers::Config;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::FetchArgs) -> Result<()> {
    let url = match &args.url {
        Some(url) => url.clone(),
        None => Config::load(cli.config.as_deref())?.boundary.source,
    };

    #[cfg(feature = "download")]
    {
        let path = rangelayers::fetch_boundary(&url, &cli.cache_dir())?;
        eprintln!("[fetch-boundary] {url} -> {}", path.display());
        Ok(())
    }
    #[cfg(not(feature = "download"))]
    {
        let _ = cli;
        anyhow::bail!("[fetch-boundary] {url}: built without the `download` feature")
    }
}
