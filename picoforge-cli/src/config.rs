//! CLI configuration
//!
//! Loaded from environment variables; command-line flags override it.

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Coloured tables for humans
    #[default]
    Text,
    /// One JSON document on stdout
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Output format (default: text, `PICOFORGE_OUTPUT=json|text`)
    pub output: OutputFormat,
    /// Coloured output (default: true, disabled by any `NO_COLOR` value)
    pub color: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::Text,
            color: true,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("PICOFORGE_OUTPUT").ok(),
            std::env::var_os("NO_COLOR").is_some(),
        )
    }

    fn from_vars(output: Option<String>, no_color: bool) -> Self {
        let output = output
            .as_deref()
            .and_then(|v| {
                let parsed = OutputFormat::parse(v);
                if parsed.is_none() {
                    tracing::warn!(value = v, "Ignoring unknown PICOFORGE_OUTPUT");
                }
                parsed
            })
            .unwrap_or_default();

        Self {
            output,
            color: !no_color,
        }
    }

    pub fn is_json(&self) -> bool {
        self.output == OutputFormat::Json
    }

    /// Apply the colour setting to the `colored` crate.
    pub fn apply_color(&self) {
        if !self.color || self.is_json() {
            colored::control::set_override(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.color);
        assert!(!config.is_json());
    }

    #[test]
    fn test_output_from_env_value() {
        let config = CliConfig::from_vars(Some("JSON".into()), false);
        assert!(config.is_json());

        let config = CliConfig::from_vars(Some("text".into()), false);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn test_unknown_output_falls_back_to_text() {
        let config = CliConfig::from_vars(Some("yaml".into()), false);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn test_no_color() {
        let config = CliConfig::from_vars(None, true);
        assert!(!config.color);
    }
}
