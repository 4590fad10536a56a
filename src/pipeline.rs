//! # Batch Asset Pipeline
//!
//! Questo è il modulo che orchestra l'intera esecuzione.
//!
//! ## Flusso di esecuzione:
//! 1. **Directory**: crea albero datato, directory del log e archivio
//! 2. **Discovery**: trova le immagini in `raw_images/` (nessuna → termina subito)
//! 3. **Per file, in sequenza**: dimensione, nome pulito, `cwebp`, risparmio,
//!    archiviazione dell'originale, URL pubblico
//! 4. **Log URL**: il nuovo batch viene anteposto al contenuto esistente
//! 5. **Git**: `add`, `commit`, `push` (fallimenti solo loggati)
//! 6. **Trigger**: dispatch HTTP solo se `TRIGGER_PAT` è presente
//! 7. **Riepilogo**: stampa tutti i nuovi URL
//!
//! ## Gestione errori:
//! - Le chiamate esterne restituiscono `SoftFailure`: warning e si prosegue
//! - Tutto il resto è fatale e risale al chiamante con contesto `anyhow`
//! - Se `cwebp` non produce l'output, la lettura della sua dimensione fallisce:
//!   nessun URL viene generato per un asset inesistente
//!
//! ## Esempio:
//! ```ignore
//! let pipeline = AssetPipeline::new(config, RunDate::today(), runner, dispatcher)?;
//! let report = pipeline.run().await?;
//! ```

use crate::config::{Config, RunDate, TRIGGER_TOKEN_VAR};
use crate::converter::WebpConverter;
use crate::error::{PublishError, SoftFailure};
use crate::file_manager::FileManager;
use crate::git::GitPublisher;
use crate::progress::{BatchStats, ProgressManager};
use crate::runner::CommandRunner;
use crate::sanitize::{output_file_name, OUTPUT_EXTENSION};
use crate::trigger::{DispatchRequest, Dispatcher};
use crate::url_log::UrlLog;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One converted image
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedAsset {
    /// Where the original was found
    pub source: PathBuf,
    /// Where the original now lives
    pub archived: PathBuf,
    /// The WebP file inside the dated tree
    pub output: PathBuf,
    pub size_before: u64,
    pub size_after: u64,
    pub url: String,
    /// Set when cwebp reported a failure but an output file was still present
    pub conversion_warning: Option<SoftFailure>,
}

impl ProcessedAsset {
    pub fn savings(&self) -> f64 {
        FileManager::calculate_savings(self.size_before, self.size_after)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The intake directory held no images; nothing else was touched
    NothingToDo,
    Published,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerStatus {
    /// No credential configured
    Skipped,
    Sent,
    Failed(SoftFailure),
}

/// What a run did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub assets: Vec<ProcessedAsset>,
    pub stats: BatchStats,
    pub git_failures: Vec<SoftFailure>,
    pub trigger: TriggerStatus,
}

impl RunReport {
    fn nothing_to_do() -> Self {
        Self {
            outcome: RunOutcome::NothingToDo,
            assets: Vec::new(),
            stats: BatchStats::new(),
            git_failures: Vec::new(),
            trigger: TriggerStatus::Skipped,
        }
    }

    /// New URLs in discovery order
    pub fn urls(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.url.clone()).collect()
    }
}

/// Sequential image publishing pipeline
pub struct AssetPipeline {
    config: Config,
    date: RunDate,
    converter: WebpConverter,
    runner: Arc<dyn CommandRunner>,
    dispatcher: Arc<dyn Dispatcher>,
    show_progress: bool,
}

impl AssetPipeline {
    pub fn new(
        config: Config,
        date: RunDate,
        runner: Arc<dyn CommandRunner>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self, PublishError> {
        config.validate()?;
        let converter = WebpConverter::new(config.webp.clone());
        Ok(Self {
            config,
            date,
            converter,
            runner,
            dispatcher,
            show_progress: false,
        })
    }

    /// Draw a progress bar while converting
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn destination_dir(&self) -> PathBuf {
        self.config.destination_dir(&self.date)
    }

    /// Run every step once
    pub async fn run(&self) -> Result<RunReport> {
        debug!(
            "Configuration: {}",
            serde_json::to_string(&self.config).unwrap_or_default()
        );

        let dest_dir = self.destination_dir();
        let log_dir = self.config.log_dir();
        let archive_dir = self.config.archive_dir();
        FileManager::ensure_directories(&[dest_dir.as_path(), log_dir.as_path(), archive_dir.as_path()])
            .await
            .context("Failed to prepare directories")?;

        let raw_dir = self.config.raw_dir();
        let images = FileManager::find_pending_images(&raw_dir)
            .with_context(|| format!("Failed to scan {}", raw_dir.display()))?;

        if images.is_empty() {
            info!("❌ No new images found in 'raw_images'.");
            return Ok(RunReport::nothing_to_do());
        }

        info!(
            "🔎 Found {} images. Processing for {}...",
            images.len(),
            self.config.github_owner
        );
        WebpConverter::preflight();

        let progress = if self.show_progress {
            ProgressManager::new(images.len() as u64)
        } else {
            ProgressManager::hidden()
        };

        let mut assets = Vec::with_capacity(images.len());
        let mut stats = BatchStats::new();
        for image in &images {
            let asset = self
                .process_image(image, &dest_dir, &archive_dir, &progress)
                .await
                .with_context(|| format!("Failed to process {}", image.display()))?;
            stats.add(asset.size_before, asset.size_after);
            progress.advance(&asset.url);
            assets.push(asset);
        }
        progress.finish();
        info!("📊 {}", stats.format_summary());

        let urls: Vec<String> = assets.iter().map(|a| a.url.clone()).collect();
        let log = UrlLog::new(self.config.log_file());
        log.prepend(&urls)
            .await
            .with_context(|| format!("Failed to update {}", log.path().display()))?;
        info!("📝 Updated log file.");

        info!("⬆️  Pushing to private storage ({})...", self.config.storage_repo);
        let git_failures = GitPublisher::from_config(&self.config)
            .publish(self.runner.as_ref(), urls.len())
            .await;

        let trigger = self.trigger_deploy().await;

        print_links(&urls);

        Ok(RunReport {
            outcome: RunOutcome::Published,
            assets,
            stats,
            git_failures,
            trigger,
        })
    }

    async fn process_image(
        &self,
        source: &Path,
        dest_dir: &Path,
        archive_dir: &Path,
        progress: &ProgressManager,
    ) -> Result<ProcessedAsset, PublishError> {
        let size_before = FileManager::file_size(source).await?;

        let file_name = output_file_name(source);
        if file_name.len() == OUTPUT_EXTENSION.len() + 1 {
            warn!("Nothing left of the name of {} after cleaning", source.display());
        }
        let output = dest_dir.join(&file_name);

        let display_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        progress.set_message(&display_name);
        progress.suspend(|| info!("⚙️  Processing: {}", display_name));

        let conversion_warning = match self.converter.convert(self.runner.as_ref(), source, &output).await {
            Ok(()) => None,
            Err(failure) => {
                progress.suspend(|| warn!("Warning: {}", failure));
                Some(failure)
            }
        };

        let size_after = match FileManager::file_size(&output).await {
            Ok(size) => size,
            Err(PublishError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(PublishError::MissingOutput(output));
            }
            Err(e) => return Err(e),
        };

        progress.suspend(|| {
            info!(
                "   ✅ Saved! 📉 {} -> {} ({:.1}%)",
                FileManager::format_kb(size_before),
                FileManager::format_kb(size_after),
                FileManager::calculate_savings(size_before, size_after)
            )
        });

        let archived = FileManager::archive(source, archive_dir).await?;
        debug!("Archived {} -> {}", source.display(), archived.display());

        let url = self.config.public_url(&self.date, &file_name);

        Ok(ProcessedAsset {
            source: source.to_path_buf(),
            archived,
            output,
            size_before,
            size_after,
            url,
            conversion_warning,
        })
    }

    async fn trigger_deploy(&self) -> TriggerStatus {
        let Some(request) = DispatchRequest::from_config(&self.config) else {
            warn!("⚠️  SKIPPING TRIGGER: {} not set.", TRIGGER_TOKEN_VAR);
            return TriggerStatus::Skipped;
        };

        info!("🚀 Triggering deployment on {}...", self.config.deploy_repo);
        match self.dispatcher.dispatch(&request).await {
            Ok(()) => {
                info!("✅ Signal sent!");
                TriggerStatus::Sent
            }
            Err(failure) => {
                warn!("Warning: {}", failure);
                TriggerStatus::Failed(failure)
            }
        }
    }
}

/// Print the new URLs on stdout, each followed by a blank line
fn print_links(urls: &[String]) {
    println!("\n✨ NEW LINKS:");
    for url in urls {
        println!("{}\n", url);
    }
}
