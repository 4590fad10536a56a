//! # Asset Publisher Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione immutabile e data dell'esecuzione
//! - `error`: Errori fatali e fallimenti "soft" delle chiamate esterne
//! - `sanitize`: Pulizia dei nomi file
//! - `file_manager`: Directory, discovery, dimensioni, archiviazione
//! - `runner`: Esecuzione di processi esterni (sostituibile nei test)
//! - `converter`: Conversione WebP con `cwebp`
//! - `url_log`: Log degli URL pubblicati
//! - `git`: Commit e push del repository di storage
//! - `trigger`: Dispatch del deploy su GitHub
//! - `progress`: Barra di avanzamento e statistiche
//! - `pipeline`: Orchestratore dell'intera esecuzione
//!
//! ## Utilizzo:
//! ```ignore
//! use std::sync::Arc;
//! use asset_publisher::{AssetPipeline, Config, HttpDispatcher, RunDate, SystemRunner};
//!
//! let config = Config::for_root(".").with_env();
//! let pipeline = AssetPipeline::new(
//!     config,
//!     RunDate::today(),
//!     Arc::new(SystemRunner),
//!     Arc::new(HttpDispatcher::new()),
//! )?;
//! pipeline.run().await?;
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod git;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod sanitize;
pub mod trigger;
pub mod url_log;

pub use config::{Config, RunDate};
pub use error::{PublishError, SoftFailure};
pub use pipeline::{AssetPipeline, ProcessedAsset, RunOutcome, RunReport, TriggerStatus};
pub use runner::{CommandRunner, SystemRunner};
pub use trigger::{Dispatcher, HttpDispatcher};
