//! Generation adapters implementing the
//! [`GenerationGateway`](critique_application::GenerationGateway) port.

mod command;
#[cfg(feature = "http-generation")]
mod http;

pub use command::CommandGenerationGateway;
#[cfg(feature = "http-generation")]
pub use http::HttpGenerationGateway;

use crate::config::{FileGenerationConfig, GenerationProvider};
use critique_application::{GenerationError, GenerationGateway, NoGeneration};
use std::sync::Arc;

/// Build the gateway selected by the `[generation]` section.
pub fn gateway_from_config(
    config: &FileGenerationConfig,
) -> Result<Arc<dyn GenerationGateway>, GenerationError> {
    match config.provider {
        GenerationProvider::None => Ok(Arc::new(NoGeneration)),
        GenerationProvider::Command => {
            let command = config
                .command
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .ok_or(GenerationError::NotConfigured)?;
            Ok(Arc::new(CommandGenerationGateway::new(command)))
        }
        GenerationProvider::Http => http_gateway(config),
    }
}

#[cfg(feature = "http-generation")]
fn http_gateway(
    config: &FileGenerationConfig,
) -> Result<Arc<dyn GenerationGateway>, GenerationError> {
    let endpoint = config
        .endpoint
        .as_deref()
        .ok_or(GenerationError::NotConfigured)?;
    let gateway = HttpGenerationGateway::new(endpoint, config.model.as_deref().unwrap_or("default"))?
        .with_api_key(config.api_key())
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature);
    Ok(Arc::new(gateway))
}

#[cfg(not(feature = "http-generation"))]
fn http_gateway(
    _config: &FileGenerationConfig,
) -> Result<Arc<dyn GenerationGateway>, GenerationError> {
    Err(GenerationError::Other(
        "the http provider needs the `http-generation` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_provider() {
        let gateway = gateway_from_config(&FileGenerationConfig::default()).unwrap();
        assert_eq!(gateway.name(), "none");
    }

    #[test]
    fn test_command_provider_requires_command() {
        let config = FileGenerationConfig {
            provider: GenerationProvider::Command,
            ..Default::default()
        };
        assert_eq!(
            gateway_from_config(&config).err(),
            Some(GenerationError::NotConfigured)
        );

        let config = FileGenerationConfig {
            command: Some("cat".to_string()),
            ..config
        };
        assert_eq!(gateway_from_config(&config).unwrap().name(), "command");
    }
}
