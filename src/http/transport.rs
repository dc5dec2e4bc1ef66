use async_trait::async_trait;
use log::info;
use tokio_rustls::TlsConnector;

use super::{ native_tls_connector, send_json_post, HttpError, HttpResult };
use crate::llm::AssistantConfig;

/// Delivers one JSON payload to the chat backend and returns the raw reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_json(&self, payload: &[u8]) -> Result<HttpResult, HttpError>;
}

pub struct TlsTransport {
    connector: TlsConnector,
    host: String,
    path: String,
    user_agent: String,
}

impl TlsTransport {
    pub fn new(
        connector: TlsConnector,
        host: String,
        path: String,
        user_agent: String
    ) -> Self {
        Self { connector, host, path, user_agent }
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self, HttpError> {
        let connector = native_tls_connector()?;
        info!("HTTPS transport configured for https://{}{}", config.host, config.path);
        Ok(Self::new(connector, config.host.clone(), config.path.clone(), config.user_agent.clone()))
    }
}

#[async_trait]
impl ChatTransport for TlsTransport {
    async fn post_json(&self, payload: &[u8]) -> Result<HttpResult, HttpError> {
        send_json_post(&self.connector, &self.host, &self.user_agent, &self.path, payload).await
    }
}
