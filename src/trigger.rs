//! # Deployment Trigger
//!
//! Invia un evento `repository_dispatch` al repository di deploy, in modo che
//! il suo workflow pubblichi gli asset appena spinti.
//!
//! ## Richiesta:
//! ```text
//! POST https://api.github.com/repos/<owner>/<deploy-repo>/dispatches
//! Authorization: token <TRIGGER_PAT>
//! Accept: application/vnd.github.v3+json
//! {"event_type":"deploy_assets"}
//! ```
//!
//! La chiamata HTTP è dietro il trait `Dispatcher` per poterla sostituire nei
//! test. Qualsiasi errore diventa un `SoftFailure`.

use crate::config::{Config, TriggerToken};
use crate::error::SoftFailure;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Serialize;
use tracing::debug;

pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Body of a repository dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchPayload {
    pub event_type: String,
}

/// A fully built dispatch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub url: String,
    pub token: TriggerToken,
    pub payload: DispatchPayload,
}

impl DispatchRequest {
    /// `None` when no trigger credential is configured
    pub fn from_config(config: &Config) -> Option<Self> {
        let token = config.trigger_token.clone()?;
        Some(Self {
            url: config.dispatch_url(),
            token,
            payload: DispatchPayload {
                event_type: config.dispatch_event.clone(),
            },
        })
    }

    pub fn authorization(&self) -> String {
        format!("token {}", self.token.expose())
    }
}

/// Sends dispatch requests
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), SoftFailure>;
}

/// Dispatcher backed by `reqwest`
pub struct HttpDispatcher {
    client: reqwest::Client,
}

impl HttpDispatcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), SoftFailure> {
        let call = format!("POST {}", request.url);
        debug!("Sending dispatch event {:?}", request.payload.event_type);

        let response = self
            .client
            .post(&request.url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(AUTHORIZATION, request.authorization())
            .header(USER_AGENT, concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .json(&request.payload)
            .send()
            .await
            .map_err(|e| SoftFailure::new(call.clone(), e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!("Dispatch accepted with {}", status);
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SoftFailure::new(call, format!("{} {}", status, body.trim())))
        }
    }
}
