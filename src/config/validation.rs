use crate::config::types::{Config, CrawlerConfig, FlowConfig, OutputConfig, ServerConfig};
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_flow_config(&config.flows)?;
    validate_output_config(&config.output)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_budget < 1 {
        return Err(ConfigError::Validation(format!(
            "page_budget must be >= 1, got {}",
            config.page_budget
        )));
    }

    if config.navigation_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "navigation_timeout_ms must be >= 1ms".to_string(),
        ));
    }

    if !config.settle_delay_secs.is_finite() || config.settle_delay_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "settle_delay_secs must be a non-negative number, got {}",
            config.settle_delay_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates flow enumeration limits
fn validate_flow_config(config: &FlowConfig) -> Result<(), ConfigError> {
    // max_depth = 0 is allowed: every flow is just the seed

    if config.max_count < 1 {
        return Err(ConfigError::Validation(format!(
            "max_count must be >= 1, got {}",
            config.max_count
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, dir) in [
        ("export_dir", &config.export_dir),
        ("screenshot_dir", &config.screenshot_dir),
        ("public_screenshot_dir", &config.public_screenshot_dir),
    ] {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates the front end listen address
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.listen_addr.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!(
            "Invalid listen_addr '{}': {}",
            config.listen_addr, e
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut config = Config::default();
        config.crawler.page_budget = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_negative_or_nan_settle_delay_rejected() {
        let mut config = Config::default();
        config.crawler.settle_delay_secs = -1.0;
        assert!(validate(&config).is_err());

        config.crawler.settle_delay_secs = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_flow_count_rejected() {
        let mut config = Config::default();
        config.flows.max_count = 0;
        assert!(validate(&config).is_err());

        config.flows.max_count = 1;
        config.flows.max_depth = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_output_dir_rejected() {
        let mut config = Config::default();
        config.output.export_dir = PathBuf::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_listen_addr_must_parse() {
        let mut config = Config::default();
        config.server.listen_addr = "not-an-address".to_string();
        assert!(validate(&config).is_err());

        config.server.listen_addr = "127.0.0.1:0".to_string();
        assert!(validate(&config).is_ok());
    }
}
