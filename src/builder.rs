use std::sync::Arc;

use crate::client::BitmeshClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::transport::HttpTransport;

/// Assembles a [`BitmeshClient`] from a [`ClientConfig`] and a transport.
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        ClientBuilder {
            config,
            transport: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.with_base_url(base_url);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.with_user_agent(user_agent);
        self
    }

    pub fn transport<T: HttpTransport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<BitmeshClient> {
        let base_url = self.config.normalized_base_url()?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };
        Ok(BitmeshClient::from_parts(
            self.config.credentials,
            base_url,
            self.config.user_agent,
            transport,
        ))
    }
}

#[cfg(feature = "reqwest")]
fn default_transport() -> Result<Arc<dyn HttpTransport>> {
    Ok(Arc::new(crate::transport::ReqwestTransport::new()))
}

#[cfg(not(feature = "reqwest"))]
fn default_transport() -> Result<Arc<dyn HttpTransport>> {
    Err(crate::error::Error::Configuration(
        "no HTTP transport configured and the `reqwest` feature is disabled".to_string(),
    ))
}
