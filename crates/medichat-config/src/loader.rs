//! Loading and resolving configuration.
//!
//! Resolution order for a flow's settings, highest first:
//!
//! 1. `[flows.<flow-id>]` in the loaded file
//! 2. the flow's built-in defaults (see `settings::builtin_overrides`)
//! 3. `[defaults]` in the loaded file
//! 4. `DEFAULT_MODEL` with no sampling overrides

use std::path::Path;

use tracing::debug;

use medichat_contracts::error::{MediChatError, MediChatResult};

use crate::settings::{
    builtin_overrides, FlowSettings, MediChatConfig, ModelOverrides, DEFAULT_MODEL,
};

impl MediChatConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `MediChatError::ConfigError` if the TOML is malformed or does
    /// not match the expected schema.
    pub fn from_toml_str(s: &str) -> MediChatResult<Self> {
        let config: MediChatConfig = toml::from_str(s).map_err(|e| MediChatError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> MediChatResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MediChatError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&contents)
    }

    /// Resolve the settings for one flow.
    pub fn settings_for(&self, flow_id: &str) -> FlowSettings {
        let empty = ModelOverrides::default();
        let file_override = self.flows.get(flow_id).unwrap_or(&empty);
        let merged = file_override
            .over(&builtin_overrides(flow_id))
            .over(&self.defaults);

        FlowSettings {
            model: merged.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: merged.temperature,
            max_output_tokens: merged.max_output_tokens,
        }
    }

    /// Read the provider API key from the configured environment variable.
    pub fn api_key(&self) -> MediChatResult<String> {
        let var = &self.provider.api_key_env;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(MediChatError::ConfigError {
                reason: format!("environment variable '{}' is not set", var),
            }),
        }
    }

    fn validate(&self) -> MediChatResult<()> {
        if self.provider.base_url.trim().is_empty() {
            return Err(MediChatError::ConfigError {
                reason: "provider.base_url must not be empty".to_string(),
            });
        }
        if self.provider.timeout_secs == 0 {
            return Err(MediChatError::ConfigError {
                reason: "provider.timeout_secs must be greater than zero".to_string(),
            });
        }
        let tables = std::iter::once(("defaults", &self.defaults))
            .chain(self.flows.iter().map(|(k, v)| (k.as_str(), v)));
        for (name, overrides) in tables {
            if let Some(t) = overrides.temperature {
                if !(0.0..=2.0).contains(&t) {
                    return Err(MediChatError::ConfigError {
                        reason: format!("temperature {} in [{}] is outside 0.0..=2.0", t, name),
                    });
                }
            }
        }
        Ok(())
    }
}
