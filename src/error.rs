//! # Error Types Module
//!
//! Questo modulo definisce i due livelli di errore della pipeline.
//!
//! ## Categorie:
//! - `PublishError`: errori fatali (filesystem, output mancante, path invalidi).
//!   Vengono propagati fino a `main`, che li logga come errore critico.
//! - `SoftFailure`: fallimento di una chiamata esterna (cwebp, git, dispatch HTTP).
//!   Il chiamante lo logga come warning e prosegue.
//!
//! ## Esempio:
//! ```ignore
//! if let Err(failure) = runner.run(&command).await {
//!     warn!("{}", failure);
//! }
//! ```

use std::path::PathBuf;

/// Fatal errors that end the run
#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Converted file was not produced: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// An external call that did not succeed.
///
/// Carries the rendered call and whatever diagnostic the call produced
/// (stderr, exit status, spawn error or HTTP status).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{call} failed: {diagnostic}")]
pub struct SoftFailure {
    pub call: String,
    pub diagnostic: String,
}

impl SoftFailure {
    pub fn new(call: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            call: call.into(),
            diagnostic: diagnostic.into(),
        }
    }
}
