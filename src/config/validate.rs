// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::connection::Endpoint;
use crate::errors::{PlansolveError, Result};

/// Smallest pipe that can hold one tar block.
const MIN_PIPE_CAPACITY: usize = 512;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PlansolveError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.client, raw.output, raw.logging))
    }
}

/// Re-run validation on an already constructed config.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    let raw = RawConfigFile {
        client: cfg.client.clone(),
        output: cfg.output.clone(),
        logging: cfg.logging.clone(),
    };
    validate_raw_config(&raw)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_host(cfg)?;
    validate_transport(cfg)?;
    Ok(())
}

fn validate_host(cfg: &RawConfigFile) -> Result<()> {
    // An empty host means "not set"; resolution falls through to the env.
    match cfg.client.host.as_deref() {
        Some(host) if !host.trim().is_empty() => {
            Endpoint::parse(host).map_err(|e| {
                PlansolveError::ConfigError(format!("[client].host is invalid: {e}"))
            })?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_transport(cfg: &RawConfigFile) -> Result<()> {
    if cfg.client.event_buffer == 0 {
        return Err(PlansolveError::ConfigError(
            "[client].event_buffer must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.client.pipe_capacity < MIN_PIPE_CAPACITY {
        return Err(PlansolveError::ConfigError(format!(
            "[client].pipe_capacity must be >= {} (got {})",
            MIN_PIPE_CAPACITY, cfg.client.pipe_capacity
        )));
    }

    Ok(())
}
