use crate::config::types::{Config, DetailConfig, OutputConfig, SearchConfig, SiteConfig};
use crate::identity::IdentityProfile;
use crate::ConfigError;
use url::Url;

/// Upper bound on detail workers; each one holds a browser tab open
const MAX_CONCURRENCY: usize = 16;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_search_config(&config.search)?;
    validate_detail_config(&config.detail)?;
    validate_output_config(&config.output)?;
    validate_identities(&config.identities)?;
    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "search max-attempts must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "search request-timeout-secs must be >= 1".to_string(),
        ));
    }

    validate_range(
        "search page-delay",
        config.page_delay_min_ms,
        config.page_delay_max_ms,
    )
}

fn validate_detail_config(config: &DetailConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "detail concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.render_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "detail render-timeout-secs must be >= 1 when set".to_string(),
        ));
    }

    validate_range("detail dwell", config.dwell_min_ms, config.dwell_max_ms)
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "output max-attempts must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_identities(identities: &[IdentityProfile]) -> Result<(), ConfigError> {
    if identities.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[identity]] is required".to_string(),
        ));
    }

    for identity in identities {
        if identity.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "identity user-agent cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_range(name: &str, min_ms: u64, max_ms: u64) -> Result<(), ConfigError> {
    if min_ms > max_ms {
        return Err(ConfigError::Validation(format!(
            "{} min ({}ms) exceeds max ({}ms)",
            name, min_ms, max_ms
        )));
    }
    Ok(())
}
