use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub name: String,
    pub version: String,
    pub release_stage: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "indian-desi-llm-inference-core".to_string(),
            version: "1.0.0".to_string(),
            release_stage: "B20".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    /// Path to a contract document overriding the embedded one.
    /// `None` serves the contract compiled into the binary.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `"static"` (deterministic built-in responder) or `"ollama"`.
    pub provider: String,
    pub ollama_model: String,
    /// Base URL for the Ollama API.  Overridden at runtime by the
    /// `OLLAMA_BASE_URL` environment variable when set.
    pub ollama_base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "static".to_string(),
            ollama_model: "llama3.1:8b".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub server: ServerConfig,
    pub contract: ContractConfig,
    pub llm: LlmConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        if let Ok(value) = env::var("OLLAMA_BASE_URL") {
            if !value.is_empty() {
                config.llm.ollama_base_url = value;
            }
        }
        if let Ok(value) = env::var("DESI_BIND_ADDR") {
            if !value.is_empty() {
                config.server.bind_addr = value;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    pub fn uses_static_responder(&self) -> bool {
        !self.llm.provider.eq_ignore_ascii_case("ollama")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_identity() {
        let config = AppConfig::default();
        assert_eq!(config.engine.name, "indian-desi-llm-inference-core");
        assert_eq!(config.engine.version, "1.0.0");
        assert_eq!(config.engine.release_stage, "B20");
        assert!(config.uses_static_responder());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load_from("/nonexistent/desi.toml").unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert!(config.contract.path.is_none());
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.server.bind_addr = "0.0.0.0:9090".to_string();
        config.contract.path = Some("contract/voice_contract_v1.json".to_string());
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.server.bind_addr, "0.0.0.0:9090");
        assert_eq!(
            loaded.contract.path.as_deref(),
            Some("contract/voice_contract_v1.json")
        );
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "[server]\nbind_addr = \"127.0.0.1:4000\"\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.server.bind_addr, "127.0.0.1:4000");
        assert_eq!(loaded.llm.provider, "static");
        assert_eq!(loaded.telemetry.log_level, "info");
    }
}
