use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use voltron_codegen::Target;
use voltron_schema::StaticRegistry;

pub const DEFAULT_CONFIG_NAME: &str = "voltron.config.json";

/// Voltron configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing page documents (`*.json`)
    #[serde(default = "default_page_dir")]
    pub page_dir: String,

    /// Generated code goes to `<outDir>/<target>/<page>/`
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,

    /// Move React state into a companion `store.ts`
    #[serde(default)]
    pub extract_store: bool,

    #[serde(default = "default_typescript")]
    pub typescript: bool,

    /// Extra component catalog merged over the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
}

fn default_page_dir() -> String {
    "pages".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_targets() -> Vec<Target> {
    vec![Target::React]
}

fn default_typescript() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn page_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.page_dir)
    }

    pub fn out_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir)
    }

    /// Built-in catalog, extended with the configured one
    pub fn load_registry(&self, cwd: &Path) -> anyhow::Result<StaticRegistry> {
        let mut registry = StaticRegistry::builtin()?;
        if let Some(path) = &self.registry {
            let path = cwd.join(path);
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("Cannot read registry {}", path.display()))?;
            registry.extend(StaticRegistry::from_json(&source)?);
        }
        Ok(registry)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_dir: default_page_dir(),
            out_dir: default_out_dir(),
            targets: default_targets(),
            extract_store: false,
            typescript: default_typescript(),
            registry: None,
        }
    }
}
