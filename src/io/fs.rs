use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() { bail!("Path exists but is not a directory: {}", path.display()); }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Extracts the given `.zip` file to the target directory.
pub(crate) fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(zip_path)
        .with_context(|| format!("failed to open {:?}", zip_path))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive {:?}", zip_path))?;
    archive.extract(dest_dir)
        .with_context(|| format!("failed to extract {:?} to {:?}", zip_path, dest_dir))
}

/// Find the single `.shp` file under `dir` (searched recursively).
pub(crate) fn find_shapefile(dir: &Path) -> Result<PathBuf> {
    let mut found = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("shp")));

    let first = found.next()
        .with_context(|| format!("no .shp file found under {}", dir.display()))?;
    if let Some(second) = found.next() {
        bail!("ambiguous archive: found {} and {} under {}", first.display(), second.display(), dir.display());
    }
    Ok(first)
}

/// Write-then-rename wrapper for atomic outputs.
pub(crate) struct PendingWrite {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl PendingWrite {
    /// Open a temp file next to `target`; refuses to clobber unless `force`.
    pub(crate) fn open(target: &Path, force: bool) -> Result<Self> {
        let parent = target.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        ensure_dir_exists(parent)?;
        if !force && target.exists() {
            bail!("Refusing to overwrite existing file: {} (use --force)", target.display());
        }
        let tmp = NamedTempFile::new_in(parent).context("create temp file")?;

        Ok(Self { target: target.to_path_buf(), tmp })
    }

    /// Finalize the write by renaming over the target.
    pub(crate) fn finalize(self) -> Result<()> {
        self.tmp.as_file().sync_all().ok(); // best-effort fsync file
        self.tmp.persist(&self.target)
            .with_context(|| format!("rename to {}", self.target.display()))?;
        Ok(())
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.tmp.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.tmp.flush() }
}

/// Atomically write `bytes` to `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8], force: bool) -> Result<()> {
    let mut sink = PendingWrite::open(path, force)?;
    sink.write_all(bytes)
        .with_context(|| format!("write {}", path.display()))?;
    sink.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");

        write_atomic(&path, b"{}", false).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}");

        assert!(write_atomic(&path, b"[]", false).is_err());
        write_atomic(&path, b"[]", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"[]");
    }

    #[test]
    fn finds_exactly_one_shapefile() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_shapefile(dir.path()).is_err());

        ensure_dir_exists(&dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub/countries.SHP")).unwrap();
        File::create(dir.path().join("sub/countries.dbf")).unwrap();
        assert_eq!(find_shapefile(dir.path()).unwrap(), dir.path().join("sub/countries.SHP"));

        File::create(dir.path().join("other.shp")).unwrap();
        assert!(find_shapefile(dir.path()).is_err());
    }
}
