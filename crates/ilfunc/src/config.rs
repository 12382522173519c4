use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ilfunc_core::{Newline, RewriteOptions, DEFAULT_ATTRIBUTE};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ILASM: &str = r"C:\Windows\Microsoft.NET\Framework\v4.0.30319\ilasm.exe";
pub const DEFAULT_ILDASM: &str =
    r"C:\Program Files (x86)\Microsoft SDKs\Windows\v8.1A\bin\NETFX 4.5.1 Tools\ildasm.exe";

/// Contents of an `ilfunc.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ilasm: Option<PathBuf>,
    pub ildasm: Option<PathBuf>,
    /// Marker attribute type name.
    pub attribute: Option<String>,
    pub newline: Option<NewlineConfig>,
    pub log_level: Option<LevelFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineConfig {
    Crlf,
    Lf,
    Detect,
}

impl From<NewlineConfig> for Newline {
    fn from(value: NewlineConfig) -> Self {
        match value {
            NewlineConfig::Crlf => Newline::CrLf,
            NewlineConfig::Lf => Newline::Lf,
            NewlineConfig::Detect => Newline::Detect,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Effective settings: command line over config file over built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub ilasm: PathBuf,
    pub ildasm: PathBuf,
    pub rewrite: RewriteOptions,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn resolve(ilasm: Option<PathBuf>, ildasm: Option<PathBuf>, config: Config) -> Self {
        Self {
            ilasm: ilasm
                .or(config.ilasm)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ILASM)),
            ildasm: ildasm
                .or(config.ildasm)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ILDASM)),
            rewrite: RewriteOptions {
                attribute: config
                    .attribute
                    .unwrap_or_else(|| DEFAULT_ATTRIBUTE.to_string()),
                newline: config.newline.map(Newline::from).unwrap_or_default(),
            },
            log_level: config.log_level.unwrap_or(LevelFilter::Info),
        }
    }
}
