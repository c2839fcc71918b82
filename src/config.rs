// Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub driver: DriverConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Automation backend to instantiate
    #[serde(default = "default_driver_type")]
    pub driver_type: String,

    /// Wait duration for UI readiness, in seconds
    #[serde(default = "default_element_timeout")]
    pub element_timeout: u64,

    /// Optional window resize applied on driver startup
    #[serde(default)]
    pub snapshot_width: Option<u32>,

    #[serde(default)]
    pub snapshot_height: Option<u32>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver_type: default_driver_type(),
            element_timeout: default_element_timeout(),
            snapshot_width: None,
            snapshot_height: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory report files are written to
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
        }
    }
}

// Default values
pub const ENV_STEPLEDGER_DRIVER: &str = "STEPLEDGER_DRIVER";

pub fn default_driver_type() -> String {
    String::from("firefox")
}

fn default_element_timeout() -> u64 {
    5
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("target/reports")
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Option<Self> {
        // Check locations in order:
        // 1. .stepledgerrc (current directory)
        // 2. ~/.stepledgerrc (home directory)
        // 3. .stepledgerrc.toml (current directory)
        // 4. ~/.stepledgerrc.toml (home directory)

        let cwd = std::env::current_dir().ok()?;
        let home = dirs::home_dir()?;

        let paths = [
            cwd.join(".stepledgerrc"),
            home.join(".stepledgerrc"),
            cwd.join(".stepledgerrc.toml"),
            home.join(".stepledgerrc.toml"),
        ];

        for path in &paths {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        None
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }

    /// Effective driver type, with the environment variable taking
    /// precedence over the configured value.
    pub fn driver_type(&self) -> String {
        std::env::var(ENV_STEPLEDGER_DRIVER).unwrap_or_else(|_| self.driver.driver_type.clone())
    }
}
