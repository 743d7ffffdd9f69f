//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `--config <path>` on the command line
//! 2. `$NUMPLOT_CONFIG` environment variable
//! 3. `<platform config dir>/numplot/config.toml`
//! 4. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use numplot_core::AnalysisOptions;
use numplot_store::PlotSize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub plots: PlotsConfig,
    pub analysis: AnalysisConfig,
}

/// HTTP listener settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where and how large generated images are.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlotsConfig {
    /// Image directory, relative paths resolve against the working directory.
    pub dir: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Query points for linear interpolation.
    pub interp_points: usize,
    /// Degree of the least-squares polynomial for `fit` (2 is a quadratic).
    pub fit_degree: usize,
}

// --- Defaults ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

impl Default for PlotsConfig {
    fn default() -> Self {
        Self {
            dir: "static/img".into(),
            width: 640,
            height: 480,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let opts = AnalysisOptions::default();
        Self {
            interp_points: opts.interp_points,
            fit_degree: opts.fit_degree,
        }
    }
}

impl PlotsConfig {
    pub fn size(&self) -> PlotSize {
        PlotSize {
            width: self.width,
            height: self.height,
        }
    }
}

impl Config {
    /// Reject values that would only fail later, when a plot is drawn.
    pub fn validate(&self) -> Result<()> {
        self.plots
            .size()
            .validate()
            .context("invalid [plots] width/height")?;
        Ok(())
    }
}

impl AnalysisConfig {
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            interp_points: self.interp_points,
            fit_degree: self.fit_degree,
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists, unless
/// the path was given explicitly.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(p) = explicit {
        if !p.exists() {
            bail!("config file not found: {}", p.display());
        }
    }

    if let Some(p) = config_path(explicit) {
        if p.exists() {
            let content =
                std::fs::read_to_string(&p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            config
                .validate()
                .with_context(|| format!("validating {}", p.display()))?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

/// Resolve the config file path.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }

    if let Ok(p) = std::env::var("NUMPLOT_CONFIG") {
        return Some(PathBuf::from(p));
    }

    directories::ProjectDirs::from("dev", "numplot", "numplot")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Show the active config path (for `numplot config`).
pub fn show_config_path(explicit: Option<&Path>) -> String {
    match config_path(explicit) {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
