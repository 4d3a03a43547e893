use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::loader::DataSource;

/// Environment variable overriding the data source.
pub const SOURCE_ENV: &str = "SALES_DASHBOARD_SOURCE";
/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "SALES_DASHBOARD_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

/// Startup settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Path or `http(s)://` URL of the sales CSV.
    pub source: String,
    pub window_width: f32,
    pub window_height: f32,
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: "Sales_Superstore.csv".to_string(),
            window_width: 1400.0,
            window_height: 900.0,
            title: "Sales Dashboard".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Resolve from the process environment.
    ///
    /// Precedence, lowest first: defaults, config file, `SALES_DASHBOARD_SOURCE`,
    /// first command-line argument.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let file = match &explicit {
            Some(path) => Some(Self::from_file(path)?),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Some(Self::from_file(default)?)
                } else {
                    None
                }
            }
        };
        let env_source = std::env::var(SOURCE_ENV).ok();
        let cli_source = std::env::args().nth(1);
        Ok(Self::resolve(file, env_source, cli_source))
    }

    /// Read a JSON config file; missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Layer the source overrides on top of the file (or defaults).
    pub fn resolve(
        file: Option<DashboardConfig>,
        env_source: Option<String>,
        cli_source: Option<String>,
    ) -> Self {
        let mut config = file.unwrap_or_default();
        let non_empty = |s: &String| !s.trim().is_empty();
        if let Some(source) = cli_source.filter(non_empty).or(env_source.filter(non_empty)) {
            config.source = source;
        }
        config
    }

    pub fn data_source(&self) -> DataSource {
        DataSource::parse(&self.source)
    }
}
