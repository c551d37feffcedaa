//! Compiling service contracts.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bdclip_clip_model::ClipDescriptor;
use bdclip_common::config::CompilingSettings;
use uuid::Uuid;

use crate::error::TransportError;
use crate::progress::ProgressSink;

/// Address of a compiling service, rendered as `scheme://host:port/endpoint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAddress {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub endpoint: String,
}

impl ServiceAddress {
    pub fn from_settings(settings: &CompilingSettings) -> Self {
        Self {
            scheme: "tcp".to_string(),
            host: settings.host.clone(),
            port: settings.port,
            endpoint: settings.endpoint.clone(),
        }
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}/{}",
            self.scheme, self.host, self.port, self.endpoint
        )
    }
}

/// One submission to the compiling service.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub project_id: Uuid,
    pub workspace: &'a Path,
    pub clip: &'a ClipDescriptor,
}

/// A connected compiling service.
#[async_trait]
pub trait CompilingService: Send {
    /// Submit a clip and wait for the service to finish.
    ///
    /// `Ok(false)` means the service ran and reported failure. Channel
    /// problems are errors.
    async fn compile(
        &mut self,
        request: CompileRequest<'_>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<bool, TransportError>;
}

/// Builds a channel to a compiling service.
#[async_trait]
pub trait ServiceConnector: Send + Sync {
    async fn connect(
        &self,
        address: &ServiceAddress,
    ) -> Result<Box<dyn CompilingService>, TransportError>;

    /// Connector name for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_matches_settings_connection_string() {
        let settings = CompilingSettings {
            port: 12000,
            ..CompilingSettings::default()
        };
        let address = ServiceAddress::from_settings(&settings);
        assert_eq!(address.to_string(), settings.connection_string());
        assert_eq!(address.to_string(), "tcp://localhost:12000/CompilingService");
    }
}
