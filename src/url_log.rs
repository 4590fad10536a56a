//! # URL Log
//!
//! File di testo con tutti gli URL pubblici generati, il batch più recente
//! in cima e gli URL separati da una riga vuota. Il contenuto precedente
//! non viene mai analizzato né deduplicato.

use crate::error::PublishError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const SEPARATOR: &str = "\n\n";

/// Append-style log of published URLs, newest batch first
pub struct UrlLog {
    path: PathBuf,
}

impl UrlLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current content, or an empty string when the file does not exist yet
    pub async fn read(&self) -> Result<String, PublishError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Put `urls` in front of the existing content
    pub async fn prepend(&self, urls: &[String]) -> Result<(), PublishError> {
        let previous = self.read().await?;
        fs::write(&self.path, render(urls, &previous)).await?;
        Ok(())
    }
}

/// `urls` joined by a blank line, a blank line, then `previous` verbatim
pub fn render(urls: &[String], previous: &str) -> String {
    let mut content = urls.join(SEPARATOR);
    content.push_str(SEPARATOR);
    content.push_str(previous);
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_on_empty_log() {
        assert_eq!(render(&urls(&["a", "b"]), ""), "a\n\nb\n\n");
    }

    #[test]
    fn test_render_keeps_previous_verbatim() {
        let previous = "old-1\n\nold-2\n\n  odd spacing \n";
        let content = render(&urls(&["new"]), previous);
        assert_eq!(content, format!("new\n\n{}", previous));
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let temp = TempDir::new().unwrap();
        let log = UrlLog::new(temp.path().join("log.txt"));
        assert_eq!(log.read().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_prepend_twice_newest_first() {
        let temp = TempDir::new().unwrap();
        let log = UrlLog::new(temp.path().join("log.txt"));

        log.prepend(&urls(&["first"])).await.unwrap();
        log.prepend(&urls(&["second", "third"])).await.unwrap();

        assert_eq!(log.read().await.unwrap(), "second\n\nthird\n\nfirst\n\n");
    }
}
