use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub llm: Option<LlmSection>,
    pub server: Option<ServerSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub summary_max_tokens: Option<u32>,
    pub narrative_max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub listen_port: Option<u16>,
    pub database_path: Option<String>,
}

/// Resolved LLM settings used by the pipeline.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub summary_max_tokens: u32,
    pub narrative_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            summary_max_tokens: 500,
            narrative_max_tokens: 2000,
        }
    }
}

impl ConfigFile {
    /// Resolve the pipeline settings, falling back to defaults per field.
    pub fn llm_config(&self) -> LlmConfig {
        let defaults = LlmConfig::default();
        let section = self.llm.clone().unwrap_or_default();
        LlmConfig {
            model: section.model.unwrap_or(defaults.model),
            summary_max_tokens: section
                .summary_max_tokens
                .unwrap_or(defaults.summary_max_tokens),
            narrative_max_tokens: section
                .narrative_max_tokens
                .unwrap_or(defaults.narrative_max_tokens),
        }
    }

    /// API key from the config file, falling back to `OPENAI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        self.llm
            .as_ref()
            .and_then(|l| l.api_key.clone())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

/// Platform config directory path: `<config_dir>/caseline/caseline.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("caseline").join("caseline.toml"))
}

/// Load config by cascading CWD `.caseline.toml` over the platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".caseline.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        llm: Some(LlmSection {
            api_key: overlay
                .llm
                .as_ref()
                .and_then(|l| l.api_key.clone())
                .or_else(|| base.llm.as_ref().and_then(|l| l.api_key.clone())),
            base_url: overlay
                .llm
                .as_ref()
                .and_then(|l| l.base_url.clone())
                .or_else(|| base.llm.as_ref().and_then(|l| l.base_url.clone())),
            model: overlay
                .llm
                .as_ref()
                .and_then(|l| l.model.clone())
                .or_else(|| base.llm.as_ref().and_then(|l| l.model.clone())),
            summary_max_tokens: overlay
                .llm
                .as_ref()
                .and_then(|l| l.summary_max_tokens)
                .or_else(|| base.llm.as_ref().and_then(|l| l.summary_max_tokens)),
            narrative_max_tokens: overlay
                .llm
                .as_ref()
                .and_then(|l| l.narrative_max_tokens)
                .or_else(|| base.llm.as_ref().and_then(|l| l.narrative_max_tokens)),
        }),
        server: Some(ServerSection {
            listen_port: overlay
                .server
                .as_ref()
                .and_then(|s| s.listen_port)
                .or_else(|| base.server.as_ref().and_then(|s| s.listen_port)),
            database_path: overlay
                .server
                .as_ref()
                .and_then(|s| s.database_path.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.database_path.clone())),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config() {
        let cfg: ConfigFile = toml::from_str(
            r#"
            [llm]
            model = "gpt-4o"
            "#,
        )
        .unwrap();
        let llm = cfg.llm_config();
        assert_eq!(llm.model, "gpt-4o");
        assert_eq!(llm.summary_max_tokens, 500);
        assert_eq!(llm.narrative_max_tokens, 2000);
    }

    #[test]
    fn overlay_wins_field_by_field() {
        let base: ConfigFile = toml::from_str(
            r#"
            [llm]
            model = "gpt-4"
            summary_max_tokens = 300
            [server]
            listen_port = 5000
            "#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [llm]
            model = "gpt-4o"
            "#,
        )
        .unwrap();

        let merged = merge(base, overlay);
        let llm = merged.llm.unwrap();
        assert_eq!(llm.model.as_deref(), Some("gpt-4o"));
        assert_eq!(llm.summary_max_tokens, Some(300));
        assert_eq!(merged.server.unwrap().listen_port, Some(5000));
    }

    #[test]
    fn defaults_when_empty() {
        let cfg = ConfigFile::default();
        let llm = cfg.llm_config();
        assert_eq!(llm.model, "gpt-4");
    }
}
