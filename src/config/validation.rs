use crate::config::types::{Config, FetchConfig, PoolConfig};
use crate::ConfigError;

/// Upper bound on configured workers for either pool
pub const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_pool_config(&config.pool)?;
    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    // Must be a legal header value
    if !config
        .user_agent
        .chars()
        .all(|c| c.is_ascii_graphic() || c == ' ')
    {
        return Err(ConfigError::Validation(format!(
            "user_agent must contain only printable ASCII characters, got '{}'",
            config.user_agent
        )));
    }

    Ok(())
}

fn validate_pool_config(config: &PoolConfig) -> Result<(), ConfigError> {
    if let Some(workers) = config.workers {
        if !(1..=MAX_WORKERS).contains(&workers) {
            return Err(ConfigError::Validation(format!(
                "workers must be between 1 and {}, got {}",
                MAX_WORKERS, workers
            )));
        }
    }

    if let Some(program) = &config.worker_program {
        if program.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "worker_program cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
