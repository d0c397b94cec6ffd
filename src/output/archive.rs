//! Zip archive of the public screenshots

use crate::ExportResult;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Zips every file in `screenshot_dir` into `archive_path`
///
/// Returns `Ok(None)` without touching `archive_path` when the directory is
/// missing or holds no files.
pub fn archive_screenshots(screenshot_dir: &Path, archive_path: &Path) -> ExportResult<Option<PathBuf>> {
    if !screenshot_dir.is_dir() {
        tracing::info!("No screenshot directory at {}", screenshot_dir.display());
        return Ok(None);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(screenshot_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    if files.is_empty() {
        tracing::info!("No screenshots found to archive");
        return Ok(None);
    }
    files.sort();

    if let Some(parent) = archive_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(path)?)?;
    }
    zip.finish()?;

    tracing::info!(
        "Archived {} screenshots to {}",
        files.len(),
        archive_path.display()
    );
    Ok(Some(archive_path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dir_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("screenshots.zip");

        let result = archive_screenshots(&dir.path().join("nope"), &archive).unwrap();
        assert_eq!(result, None);
        assert!(!archive.exists());
    }

    #[test]
    fn test_empty_dir_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("screenshots");
        std::fs::create_dir_all(&shots).unwrap();
        let archive = dir.path().join("screenshots.zip");

        assert_eq!(archive_screenshots(&shots, &archive).unwrap(), None);
        assert!(!archive.exists());
    }

    #[test]
    fn test_archives_files() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("public/screenshots");
        std::fs::create_dir_all(&shots).unwrap();
        std::fs::write(shots.join("cta_0_a.png"), b"one").unwrap();
        std::fs::write(shots.join("form_0_a.png"), b"two").unwrap();
        let archive = dir.path().join("public/screenshots.zip");

        let written = archive_screenshots(&shots, &archive).unwrap();
        assert_eq!(written, Some(archive.clone()));

        let zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["cta_0_a.png", "form_0_a.png"]);
    }
}
