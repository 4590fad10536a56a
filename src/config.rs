//! # Configuration Management Module
//!
//! Questo modulo raccoglie tutti i parametri della pipeline in un unico valore
//! immutabile, costruito all'avvio e passato alla pipeline.
//!
//! ## Responsabilità:
//! - Definisce `Config` con i valori compilati di default (host, repo, percorsi, cwebp)
//! - Calcola i percorsi del progetto (intake, archivio, albero datato, log URL)
//! - Costruisce gli URL pubblici degli asset
//! - Definisce `RunDate`, calcolata una sola volta per esecuzione
//! - Valida i parametri di conversione
//!
//! ## Layout del progetto:
//! ```text
//! <root>/raw_images/                                   intake
//! <root>/already_optimize_image/                       originali archiviati
//! <root>/Public/<site>/images/<YYYY>/<Month>/<DD>/     output WebP
//! <root>/optimized_image_url/optimized_image_url.txt   log URL
//! ```
//!
//! ## Esempio:
//! ```ignore
//! let config = Config::for_root("/srv/assets").with_env();
//! config.validate()?;
//! let date = RunDate::today();
//! let dest = config.destination_dir(&date);
//! ```

use crate::error::PublishError;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the deployment trigger credential.
pub const TRIGGER_TOKEN_VAR: &str = "TRIGGER_PAT";

/// cwebp encoding parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebpSettings {
    /// Quality factor (1-100)
    pub quality: u8,
    /// Compression method (0-6, 6 = slowest/best)
    pub method: u8,
    /// Number of entropy-analysis passes (1-10)
    pub passes: u8,
    /// Use multi-threaded encoding
    pub multithreaded: bool,
    /// Maximum output width; height is scaled to keep the aspect ratio
    pub max_width: u32,
}

impl Default for WebpSettings {
    fn default() -> Self {
        Self {
            quality: 60,
            method: 6,
            passes: 10,
            multithreaded: true,
            max_width: 1280,
        }
    }
}

/// Deployment trigger credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct TriggerToken(String);

impl TriggerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TriggerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TriggerToken(***)")
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the storage repository; every path below is relative to it
    pub project_root: PathBuf,
    /// Site path segment, both on disk (`Public/<site>`) and in URLs
    pub site: String,
    /// Host serving the published assets
    pub asset_host: String,
    /// GitHub account owning both repositories
    pub github_owner: String,
    /// Repository whose workflow is triggered after a push
    pub deploy_repo: String,
    /// Repository the pipeline commits into (informational, used in logs)
    pub storage_repo: String,
    /// Base URL of the GitHub REST API
    pub api_base: String,
    /// `event_type` sent with the repository dispatch
    pub dispatch_event: String,
    /// Git remote to push to
    pub git_remote: String,
    /// Git branch to push
    pub git_branch: String,
    /// cwebp parameters
    pub webp: WebpSettings,
    /// Credential for the deployment trigger; `None` skips the trigger
    #[serde(skip)]
    pub trigger_token: Option<TriggerToken>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            site: "TMP_news".to_string(),
            asset_host: "assets.786313.xyz".to_string(),
            github_owner: "TMPnews-assets".to_string(),
            deploy_repo: "TMPnews-assets-deployer-02".to_string(),
            storage_repo: "TMPnews-assets-02".to_string(),
            api_base: "https://api.github.com".to_string(),
            dispatch_event: "deploy_assets".to_string(),
            git_remote: "origin".to_string(),
            git_branch: "main".to_string(),
            webp: WebpSettings::default(),
            trigger_token: None,
        }
    }
}

impl Config {
    /// Default configuration rooted at `root`
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: root.into(),
            ..Default::default()
        }
    }

    /// Read the trigger credential from the environment. Only an empty value counts as absent.
    pub fn with_env(self) -> Self {
        let token = std::env::var(TRIGGER_TOKEN_VAR).ok();
        self.with_trigger_token(token)
    }

    pub fn with_trigger_token(mut self, token: Option<String>) -> Self {
        self.trigger_token = token
            .filter(|t| !t.is_empty())
            .map(TriggerToken::new);
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), PublishError> {
        let webp = &self.webp;
        if webp.quality == 0 || webp.quality > 100 {
            return Err(PublishError::Config("WebP quality must be between 1 and 100".into()));
        }
        if webp.method > 6 {
            return Err(PublishError::Config("WebP method must be between 0 and 6".into()));
        }
        if webp.passes == 0 || webp.passes > 10 {
            return Err(PublishError::Config("WebP passes must be between 1 and 10".into()));
        }
        if webp.max_width == 0 {
            return Err(PublishError::Config("Resize width must be greater than 0".into()));
        }

        let required = [
            ("site", &self.site),
            ("asset host", &self.asset_host),
            ("GitHub owner", &self.github_owner),
            ("deploy repository", &self.deploy_repo),
            ("git remote", &self.git_remote),
            ("git branch", &self.git_branch),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(PublishError::Config(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.project_root.join("raw_images")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.project_root.join("already_optimize_image")
    }

    pub fn public_root(&self) -> PathBuf {
        self.project_root.join("Public").join(&self.site).join("images")
    }

    /// `<public-root>/<YYYY>/<Month>/<DD>`
    pub fn destination_dir(&self, date: &RunDate) -> PathBuf {
        self.public_root()
            .join(&date.year)
            .join(&date.month)
            .join(&date.day)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.project_root.join("optimized_image_url")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join("optimized_image_url.txt")
    }

    /// Public URL of an asset written into today's destination directory
    pub fn public_url(&self, date: &RunDate, file_name: &str) -> String {
        format!(
            "https://{}/{}/images/{}/{}/{}/{}",
            self.asset_host, self.site, date.year, date.month, date.day, file_name
        )
    }

    /// Endpoint of the repository dispatch API for the deploy repository
    pub fn dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/dispatches",
            self.api_base.trim_end_matches('/'),
            self.github_owner,
            self.deploy_repo
        )
    }
}

/// Date components shared by every file of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDate {
    /// Four-digit year
    pub year: String,
    /// Full English month name, e.g. `October`
    pub month: String,
    /// Two-digit day of month
    pub day: String,
}

impl RunDate {
    /// Today's date in local time
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: format!("{:04}", date.year()),
            month: date.format("%B").to_string(),
            day: format!("{:02}", date.day()),
        }
    }
}
