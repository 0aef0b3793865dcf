//! Credential validation and the ready-to-use evaluation client

use crate::config::ServiceConfig;
use crate::error::{IcpError, Result};
use crate::llm::inference::GenerativeModel;
use crate::output::report::EvaluationResult;
use log::{debug, info, warn};
use std::fmt;
use std::time::{Duration, Instant};

const PING_PROMPT: &str = "ping";

/// API key for the remote model. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub request_timeout: Duration,
    pub validation_timeout: Duration,
}

impl From<&ServiceConfig> for ClientSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            validation_timeout: Duration::from_secs(config.validation_timeout_secs),
        }
    }
}

/// One "ping" round-trip with the key. Any failure is `false`; a blank key
/// never reaches the model.
pub async fn validate_credential<M>(model: &M, api_key: &str, wait: Duration) -> bool
where
    M: GenerativeModel + ?Sized,
{
    if api_key.trim().is_empty() {
        debug!("Credential validation skipped: empty key");
        return false;
    }

    match tokio::time::timeout(wait, model.generate(api_key, PING_PROMPT)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!("Credential validation failed: {}", e);
            false
        }
        Err(_) => {
            debug!("Credential validation timed out after {:?}", wait);
            false
        }
    }
}

/// A client whose credential passed validation.
pub struct ReadyClient<M> {
    model: M,
    api_key: ApiKey,
    request_timeout: Duration,
}

impl<M: GenerativeModel> ReadyClient<M> {
    pub async fn connect(model: M, api_key: ApiKey, settings: ClientSettings) -> Result<Self> {
        if !validate_credential(&model, api_key.expose(), settings.validation_timeout).await {
            return Err(IcpError::Credential(
                "the API key is invalid, expired or the service is unreachable".to_string(),
            ));
        }

        info!("Credential validated for model {}", model.model_name());
        Ok(Self {
            model,
            api_key,
            request_timeout: settings.request_timeout,
        })
    }

    pub fn model_name(&self) -> String {
        self.model.model_name()
    }

    /// Sends the prompt once. Dropping the returned future cancels the request.
    pub async fn evaluate(&self, prompt: &str) -> Result<EvaluationResult> {
        let started = Instant::now();
        let call = self.model.generate(self.api_key.expose(), prompt);

        let verdict = match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Evaluation timed out after {:?}", self.request_timeout);
                return Err(IcpError::Timeout {
                    seconds: self.request_timeout.as_secs(),
                });
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!("Evaluation completed in {}ms", elapsed_ms);
        Ok(EvaluationResult::new(verdict, self.model_name(), elapsed_ms))
    }
}
