use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub fn config_file() -> PathBuf { dirs::home_dir().unwrap().join(".quickset.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub confirm: ConfirmSettings,
    #[serde(default)]
    pub backend: BackendSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfirmSettings {
    /// Seconds an unconfirmed layout stays up before it is reverted.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Keep new layouts without prompting.
    #[serde(default)]
    pub auto_accept: bool,
}

impl Default for ConfirmSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            auto_accept: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct BackendSettings {
    /// Extra arguments prepended to every xrandr invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_timeout_secs() -> u64 { 15 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../quickset.default.toml")).unwrap()
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Returns a list of configuration issues worth warning about.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.confirm.timeout_secs == 0 {
            issues.push("confirm.timeout_secs of 0 reverts every layout immediately".to_string());
        }
        if self.confirm.timeout_secs > 300 {
            issues.push(format!(
                "confirm.timeout_secs of {} leaves an unusable layout up for a long time",
                self.confirm.timeout_secs
            ));
        }
        issues
    }

    fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }
}
