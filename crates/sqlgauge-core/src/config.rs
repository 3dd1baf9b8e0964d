use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Decoding controls passed through unmodified to the completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default)]
    pub presence_penalty: f64,
    #[serde(default)]
    pub frequency_penalty: f64,
}

fn default_max_tokens() -> u32 {
    512
}

fn default_top_p() -> f64 {
    1.0
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }
}

/// One model under evaluation: a short report key and the provider's model id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub key: String,
    pub id: String,
}

/// The models to compare and the shared sampling settings, loaded once at
/// startup and passed into the harness explicitly.
///
/// ```yaml
/// models:
///   - key: llama_8b
///     id: accounts/fireworks/models/llama-v3p1-8b-instruct
/// sampling:
///   temperature: 0.0
///   max_tokens: 512
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub models: Vec<ModelEntry>,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

impl ModelsConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ModelsConfig =
            serde_yaml::from_str(yaml).context("invalid models config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }

    fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(HarnessError::Config("no models configured".to_string()).into());
        }
        for entry in &self.models {
            if entry.key.is_empty() || entry.id.is_empty() {
                return Err(HarnessError::Config(format!(
                    "model entry with empty key or id: {entry:?}"
                ))
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = "
models:
  - key: llama_8b
    id: accounts/fireworks/models/llama-v3p1-8b-instruct
  - key: qwen_7b
    id: accounts/fireworks/models/qwen2p5-7b-instruct
sampling:
  temperature: 0.2
  max_tokens: 300
  top_p: 0.9
";
        let config = ModelsConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].key, "llama_8b");
        assert_eq!(config.sampling.temperature, 0.2);
        assert_eq!(config.sampling.max_tokens, 300);
        assert_eq!(config.sampling.presence_penalty, 0.0);
    }

    #[test]
    fn sampling_section_is_optional() {
        let yaml = "
models:
  - key: m
    id: provider/m
";
        let config = ModelsConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.sampling.max_tokens, 512);
        assert_eq!(config.sampling.top_p, 1.0);
    }

    #[test]
    fn empty_model_list_is_rejected() {
        let err = ModelsConfig::from_yaml_str("models: []").unwrap_err();
        assert!(err.to_string().contains("no models"));
    }
}
