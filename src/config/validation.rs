use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig, SourcesConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Misconfigured window sizes would otherwise loop forever or issue unbounded
/// request storms, so everything is checked before the first fetch.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_sources_config(&config.sources)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates batch window sizes
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_batch_size < 1 || config.page_batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "page_batch_size must be between 1 and 100, got {}",
            config.page_batch_size
        )));
    }

    if config.item_batch_size < 1 || config.item_batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "item_batch_size must be between 1 and 100, got {}",
            config.item_batch_size
        )));
    }

    Ok(())
}

/// Validates fetch retry settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates that both source base URLs are well-formed http(s) URLs
fn validate_sources_config(config: &SourcesConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("rozetka-base-url", &config.rozetka_base_url),
        ("telemart-base-url", &config.telemart_base_url),
    ] {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", name, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} must be http or https, got {}",
                name,
                url.scheme()
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            crawler: CrawlerConfig {
                page_batch_size: 10,
                item_batch_size: 10,
            },
            fetch: FetchConfig {
                retry_attempts: 5,
                retry_delay_ms: 20000,
                timeout_secs: 30,
            },
            sources: SourcesConfig {
                rozetka_base_url: "https://rozetka.com.ua/".to_string(),
                telemart_base_url: "https://telemart.ua/ua".to_string(),
            },
            output: OutputConfig {
                database_path: "./catalog.db".to_string(),
            },
        }
    }

    #[test]
    fn accepts_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn rejects_zero_page_batch() {
        let mut config = valid_config();
        config.crawler.page_batch_size = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_zero_item_batch() {
        let mut config = valid_config();
        config.crawler.item_batch_size = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_zero_retry_attempts() {
        let mut config = valid_config();
        config.fetch.retry_attempts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_malformed_base_url() {
        let mut config = valid_config();
        config.sources.telemart_base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let mut config = valid_config();
        config.sources.rozetka_base_url = "ftp://rozetka.com.ua/".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_empty_database_path() {
        let mut config = valid_config();
        config.output.database_path = String::new();
        assert!(validate(&config).is_err());
    }
}
