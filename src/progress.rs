//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce la barra di avanzamento del batch e le statistiche
//! aggregate sulle dimensioni.
//!
//! ## Componenti principali:
//! - `ProgressManager`: barra `indicatif` (nascosta automaticamente fuori da un terminale)
//! - `BatchStats`: byte prima/dopo e risparmio complessivo del batch
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [=========>------------------------------] 3/12 (25%) photo-one-1.webp
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over the images of a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        // The template is a constant; fall back to the default style if it is ever rejected.
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Advance by one file
    pub fn advance(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Hide the bar while `f` writes to the terminal
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Size totals of a run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchStats {
    pub files: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, size_before: u64, size_after: u64) {
        self.files += 1;
        self.bytes_before += size_before;
        self.bytes_after += size_after;
    }

    pub fn overall_savings(&self) -> f64 {
        FileManager::calculate_savings(self.bytes_before, self.bytes_after)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "{} images | {} -> {} ({:.1}% saved)",
            self.files,
            FileManager::format_kb(self.bytes_before),
            FileManager::format_kb(self.bytes_after),
            self.overall_savings()
        )
    }
}
