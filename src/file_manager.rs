//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sul filesystem della pipeline.
//!
//! ## Responsabilità:
//! - Preparazione idempotente delle directory (albero datato, log, archivio)
//! - Discovery ricorsiva delle immagini nella directory di intake
//! - Lettura dimensioni file
//! - Archiviazione degli originali (rename nella directory di archivio)
//! - Formattazione dimensioni e calcolo percentuale di risparmio
//!
//! ## Formati accettati:
//! Le estensioni sono confrontate in modo esatto: `jpg`, `jpeg`, `png`,
//! `JPG`, `PNG`, `webp`. Varianti come `JPEG` o `WEBP` vengono ignorate.
//!
//! ## Esempio:
//! ```ignore
//! FileManager::ensure_directories(&[dest.as_path(), archive.as_path()]).await?;
//! for image in FileManager::find_pending_images(&raw_dir)? {
//!     let size = FileManager::file_size(&image).await?;
//! }
//! ```

use crate::error::PublishError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Extensions picked up from the intake directory, matched case-sensitively
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "PNG", "webp"];

/// Filesystem operations used by the pipeline
pub struct FileManager;

impl FileManager {
    /// Create every directory (and missing parents). Existing directories are fine.
    pub async fn ensure_directories(dirs: &[&Path]) -> Result<(), PublishError> {
        for dir in dirs {
            fs::create_dir_all(dir).await?;
            debug!("Directory ready: {}", dir.display());
        }
        Ok(())
    }

    /// Find all pending images under `raw_dir`, recursively.
    ///
    /// Hidden files and directories (name starting with `.`) are skipped, so
    /// AppleDouble files like `._IMG_1.jpg` never reach the converter.
    /// Symlinks to files are accepted; symlinked directories are not entered.
    /// Order is whatever the directory listing yields. A missing intake
    /// directory yields no images.
    pub fn find_pending_images(raw_dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
        if !raw_dir.exists() {
            debug!("Intake directory does not exist: {}", raw_dir.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(raw_dir)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !Self::is_hidden(e.file_name()))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let is_file = if entry.path_is_symlink() {
                path.is_file()
            } else {
                entry.file_type().is_file()
            };
            if is_file && Self::is_pending_image(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    fn is_hidden(name: &OsStr) -> bool {
        name.to_string_lossy().starts_with('.')
    }

    /// Check if a file has one of the accepted image extensions
    pub fn is_pending_image(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    }

    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64, PublishError> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Move `source` into `archive_dir`, keeping its file name and extension.
    pub async fn archive(source: &Path, archive_dir: &Path) -> Result<PathBuf, PublishError> {
        let file_name = source
            .file_name()
            .ok_or_else(|| PublishError::InvalidPath(source.to_path_buf()))?;
        let target = archive_dir.join(file_name);
        fs::rename(source, &target).await?;
        Ok(target)
    }

    /// Size in kilobytes with two decimals, e.g. `12.50 KB`
    pub fn format_kb(size: u64) -> String {
        format!("{:.2} KB", size as f64 / 1024.0)
    }

    /// Percentage saved, `(1 - after/before) * 100`. Zero for empty originals.
    pub fn calculate_savings(size_before: u64, size_after: u64) -> f64 {
        if size_before == 0 {
            0.0
        } else {
            (1.0 - (size_after as f64 / size_before as f64)) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_pending_image() {
        assert!(FileManager::is_pending_image(Path::new("a.jpg")));
        assert!(FileManager::is_pending_image(Path::new("a.JPG")));
        assert!(FileManager::is_pending_image(Path::new("a.jpeg")));
        assert!(FileManager::is_pending_image(Path::new("a.PNG")));
        assert!(FileManager::is_pending_image(Path::new("a.webp")));

        assert!(!FileManager::is_pending_image(Path::new("a.JPEG")));
        assert!(!FileManager::is_pending_image(Path::new("a.WEBP")));
        assert!(!FileManager::is_pending_image(Path::new("a.Jpg")));
        assert!(!FileManager::is_pending_image(Path::new("a.gif")));
        assert!(!FileManager::is_pending_image(Path::new("README")));
    }

    #[test]
    fn test_find_pending_images_recursive() {
        let temp = TempDir::new().unwrap();
        let raw = temp.path().join("raw_images");
        std::fs::create_dir_all(raw.join("nested/deeper")).unwrap();
        std::fs::write(raw.join("one.jpg"), b"1").unwrap();
        std::fs::write(raw.join("nested/two.PNG"), b"2").unwrap();
        std::fs::write(raw.join("nested/deeper/three.webp"), b"3").unwrap();
        std::fs::write(raw.join("notes.txt"), b"x").unwrap();
        std::fs::write(raw.join("upper.WEBP"), b"x").unwrap();

        let mut found: Vec<String> = FileManager::find_pending_images(&raw)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        found.sort();
        assert_eq!(found, vec!["one.jpg", "three.webp", "two.PNG"]);
    }

    #[test]
    fn test_find_pending_images_skips_hidden_entries() {
        let temp = TempDir::new().unwrap();
        let raw = temp.path().join("raw_images");
        std::fs::create_dir_all(raw.join(".hidden")).unwrap();
        std::fs::write(raw.join("real.jpg"), b"1").unwrap();
        std::fs::write(raw.join("._real.jpg"), b"x").unwrap();
        std::fs::write(raw.join(".hidden/x.png"), b"x").unwrap();

        let found = FileManager::find_pending_images(&raw).unwrap();
        assert_eq!(found, vec![raw.join("real.jpg")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_pending_images_accepts_symlinked_files() {
        let temp = TempDir::new().unwrap();
        let raw = temp.path().join("raw_images");
        let elsewhere = temp.path().join("elsewhere");
        std::fs::create_dir_all(&raw).unwrap();
        std::fs::create_dir_all(elsewhere.join("dir")).unwrap();
        std::fs::write(elsewhere.join("target.jpg"), b"1").unwrap();
        std::fs::write(elsewhere.join("dir/inner.png"), b"2").unwrap();
        std::fs::write(raw.join("real.jpg"), b"3").unwrap();
        std::os::unix::fs::symlink(elsewhere.join("target.jpg"), raw.join("link.jpg")).unwrap();
        std::os::unix::fs::symlink(elsewhere.join("dir"), raw.join("linked_dir")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone.jpg"), raw.join("dangling.jpg")).unwrap();

        let mut found = FileManager::find_pending_images(&raw).unwrap();
        found.sort();
        assert_eq!(found, vec![raw.join("link.jpg"), raw.join("real.jpg")]);
    }

    #[test]
    fn test_find_pending_images_missing_dir() {
        let temp = TempDir::new().unwrap();
        let files = FileManager::find_pending_images(&temp.path().join("absent")).unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_directories_idempotent() {
        let temp = TempDir::new().unwrap();
        let dated = temp.path().join("Public/site/images/2024/March/07");
        let logs = temp.path().join("logs");

        FileManager::ensure_directories(&[dated.as_path(), logs.as_path()]).await.unwrap();
        FileManager::ensure_directories(&[dated.as_path(), logs.as_path()]).await.unwrap();

        assert!(dated.is_dir());
        assert!(logs.is_dir());
    }

    #[tokio::test]
    async fn test_archive_keeps_name() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("photo one (1).JPG");
        let archive = temp.path().join("archive");
        std::fs::create_dir_all(&archive).unwrap();
        std::fs::write(&source, b"raw").unwrap();

        let target = FileManager::archive(&source, &archive).await.unwrap();

        assert_eq!(target, archive.join("photo one (1).JPG"));
        assert!(!source.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"raw");
    }

    #[test]
    fn test_format_kb() {
        assert_eq!(FileManager::format_kb(0), "0.00 KB");
        assert_eq!(FileManager::format_kb(1536), "1.50 KB");
    }

    #[test]
    fn test_calculate_savings() {
        assert_eq!(FileManager::calculate_savings(0, 10), 0.0);
        assert_eq!(FileManager::calculate_savings(1000, 250), 75.0);
        assert!(FileManager::calculate_savings(100, 150) < 0.0);
        assert_eq!(format!("{:.1}", FileManager::calculate_savings(3000, 1000)), "66.7");
    }
}
