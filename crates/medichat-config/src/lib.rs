//! # medichat-config
//!
//! Provider and per-flow model configuration, loaded from TOML.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use medichat_config::MediChatConfig;
//!
//! let config = MediChatConfig::from_file(Path::new("medichat.toml"))?;
//! let settings = config.settings_for("symptom-analyzer");
//! ```
//!
//! Every table is optional; `MediChatConfig::default()` is a working
//! configuration that talks to the public Gemini endpoint.

pub mod loader;
pub mod settings;

pub use settings::{FlowSettings, Limits, MediChatConfig, ModelOverrides, ProviderConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use medichat_contracts::error::MediChatError;

    use crate::settings::{ANALYSIS_MODEL, DEFAULT_BASE_URL, DEFAULT_MODEL};
    use crate::MediChatConfig;

    // ── 1. defaults ───────────────────────────────────────────────────────────

    #[test]
    fn empty_document_yields_defaults() {
        let config = MediChatConfig::from_toml_str("").unwrap();
        assert_eq!(config, MediChatConfig::default());
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.provider.timeout_secs, 60);
        assert_eq!(config.limits.companion_history, 20);
    }

    #[test]
    fn unknown_flow_uses_default_model() {
        let config = MediChatConfig::default();
        let settings = config.settings_for("medicine-info");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.temperature, None);
        assert_eq!(settings.max_output_tokens, None);
    }

    #[test]
    fn builtin_flow_defaults_apply() {
        let config = MediChatConfig::default();

        let symptoms = config.settings_for("symptom-analyzer");
        assert_eq!(symptoms.model, ANALYSIS_MODEL);
        assert_eq!(symptoms.temperature, Some(0.3));
        assert_eq!(symptoms.max_output_tokens, Some(1500));

        let analytics = config.settings_for("health-analytics");
        assert_eq!(analytics.temperature, Some(0.2));
        assert_eq!(analytics.max_output_tokens, Some(2000));

        let doctor = config.settings_for("ai-doctor");
        assert_eq!(doctor.model, DEFAULT_MODEL);
        assert_eq!(doctor.temperature, Some(0.7));
    }

    // ── 2. layering ───────────────────────────────────────────────────────────

    #[test]
    fn flow_table_overrides_builtin_and_defaults() {
        let toml = r#"
            [defaults]
            model = "gemini-2.5-flash"
            max_output_tokens = 800

            [flows.symptom-analyzer]
            temperature = 0.1
        "#;
        let config = MediChatConfig::from_toml_str(toml).unwrap();

        let symptoms = config.settings_for("symptom-analyzer");
        assert_eq!(symptoms.temperature, Some(0.1));
        // Built-in flow defaults sit above [defaults].
        assert_eq!(symptoms.model, ANALYSIS_MODEL);
        assert_eq!(symptoms.max_output_tokens, Some(1500));

        let medicine = config.settings_for("medicine-info");
        assert_eq!(medicine.model, "gemini-2.5-flash");
        assert_eq!(medicine.max_output_tokens, Some(800));
    }

    #[test]
    fn provider_table_is_read() {
        let toml = r#"
            [provider]
            base_url = "http://localhost:8089/v1beta"
            api_key_env = "MEDICHAT_TEST_KEY"
            timeout_secs = 5

            [limits]
            companion_history = 4
        "#;
        let config = MediChatConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.provider.base_url, "http://localhost:8089/v1beta");
        assert_eq!(config.provider.api_key_env, "MEDICHAT_TEST_KEY");
        assert_eq!(config.provider.timeout_secs, 5);
        assert_eq!(config.limits.companion_history, 4);
    }

    // ── 3. errors ─────────────────────────────────────────────────────────────

    #[test]
    fn malformed_toml_is_config_error() {
        let err = MediChatConfig::from_toml_str("[provider\nbase_url = ").unwrap_err();
        assert!(matches!(err, MediChatError::ConfigError { .. }));
        assert!(err.to_string().contains("failed to parse config TOML"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = MediChatConfig::from_toml_str("[provider]\ntimeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let err =
            MediChatConfig::from_toml_str("[flows.ai-doctor]\ntemperature = 3.5").unwrap_err();
        assert!(err.to_string().contains("ai-doctor"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = MediChatConfig::from_file(std::path::Path::new("/nonexistent/medichat.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\nmodel = \"gemini-2.5-pro\"").unwrap();

        let config = MediChatConfig::from_file(file.path()).unwrap();
        assert_eq!(config.settings_for("medical-summarizer").model, "gemini-2.5-pro");
    }

    // ── 4. api key ────────────────────────────────────────────────────────────

    #[test]
    fn api_key_missing_env_is_config_error() {
        let mut config = MediChatConfig::default();
        config.provider.api_key_env = "MEDICHAT_KEY_THAT_IS_NEVER_SET_4471".to_string();
        let err = config.api_key().unwrap_err();
        assert!(err.to_string().contains("MEDICHAT_KEY_THAT_IS_NEVER_SET_4471"));
    }
}
