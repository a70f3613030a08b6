use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::io::{PendingWrite, ensure_dir_exists};

/// Cache file name for a remote archive: a URL hash plus the original file name.
pub(crate) fn cache_file_name(url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let base = url.rsplit('/').next()
        .filter(|name| !name.is_empty())
        .unwrap_or("download");
    format!("{}-{base}", &digest[..16])
}

/// Download a large file from `file_url` to `out_path`.
pub(crate) fn download_big_file(file_url: &str, out_path: &Path, force: bool) -> Result<()> {
    // Safe big-file write (tempfile -> atomic rename), no accidental overwrite unless `force`
    let mut sink = PendingWrite::open(out_path, force)?;

    let mut resp = reqwest::blocking::get(file_url)
        .with_context(|| format!("GET {file_url}"))?
        .error_for_status()
        .with_context(|| format!("GET {file_url} returned error status"))?;

    std::io::copy(&mut resp, &mut sink).with_context(|| format!("write {}", out_path.display()))?;

    sink.finalize()
}

/// Fetch `url` into `cache_dir` once; later calls reuse the cached copy.
pub(crate) fn fetch_cached(url: &str, cache_dir: &Path) -> Result<PathBuf> {
    ensure_dir_exists(cache_dir)?;
    let path = cache_dir.join(cache_file_name(url));

    if path.exists() {
        info!(url, path = %path.display(), "using cached download");
    } else {
        info!(url, path = %path.display(), "downloading");
        download_big_file(url, &path, false)?;
    }
    Ok(path)
}
