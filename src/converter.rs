//! # WebP Conversion Module
//!
//! Converte ogni immagine in WebP delegando tutto a `cwebp`, senza
//! elaborazione in memoria.
//!
//! ## Parametri (da `WebpSettings`):
//! - `-q 60`: qualità
//! - `-m 6`: metodo di compressione più lento e migliore
//! - `-pass 10`: passate di analisi entropica
//! - `-mt`: multithreading
//! - `-resize 1280 0`: larghezza massima, altezza proporzionale
//!
//! Un fallimento di `cwebp` non interrompe la pipeline: viene restituito come
//! `SoftFailure` e il chiamante prosegue leggendo comunque il file di output.

use crate::config::WebpSettings;
use crate::error::SoftFailure;
use crate::runner::{CommandRunner, ExternalCommand};
use std::path::Path;
use tracing::{debug, warn};

/// Name of the WebP encoder binary
pub const CWEBP: &str = "cwebp";

/// Builds and runs cwebp invocations
pub struct WebpConverter {
    settings: WebpSettings,
}

impl WebpConverter {
    pub fn new(settings: WebpSettings) -> Self {
        Self { settings }
    }

    /// The cwebp invocation converting `input` into `output`
    pub fn command(&self, input: &Path, output: &Path) -> ExternalCommand {
        let s = &self.settings;
        let mut command = ExternalCommand::new(CWEBP)
            .arg("-q")
            .arg(s.quality)
            .arg("-m")
            .arg(s.method)
            .arg("-pass")
            .arg(s.passes);
        if s.multithreaded {
            command = command.arg("-mt");
        }
        command
            .arg("-resize")
            .arg(s.max_width)
            .arg(0)
            .path_arg(input)
            .arg("-o")
            .path_arg(output)
    }

    /// Convert one image. Does not check that `output` was written.
    pub async fn convert(
        &self,
        runner: &dyn CommandRunner,
        input: &Path,
        output: &Path,
    ) -> Result<(), SoftFailure> {
        let command = self.command(input, output);
        debug!("Converting {} -> {}", input.display(), output.display());
        runner.run(&command).await.map(|_| ())
    }

    /// Warn early when cwebp is not on PATH. Conversion is still attempted.
    pub fn preflight() -> bool {
        match which::which(CWEBP) {
            Ok(path) => {
                debug!("Using {} at {}", CWEBP, path.display());
                true
            }
            Err(_) => {
                warn!("{} not found in PATH, conversions will fail", CWEBP);
                false
            }
        }
    }
}
