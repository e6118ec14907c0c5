use std::{env, path::PathBuf};

use color_eyre::Result;
use directories::ProjectDirs;
use forms::ValidationMode;
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cli::Cli;

pub const DEFAULT_TITLE: &str = "User record";
pub const DEFAULT_TICK_RATE: f64 = 4.0;
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub validation_mode: ValidationMode,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_tick_rate() -> f64 {
    DEFAULT_TICK_RATE
}

fn default_frame_rate() -> f64 {
    DEFAULT_FRAME_RATE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            validation_mode: ValidationMode::default(),
            title: default_title(),
            tick_rate: DEFAULT_TICK_RATE,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Layer `config.json5` / `config.toml` from the config directory over
    /// the built-in defaults. Missing files are fine.
    pub fn new() -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            warn!(dir = %config_dir.display(), "no configuration file found; using defaults");
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.check_rates()?;
        debug!(?cfg, "configuration loaded");
        Ok(cfg)
    }

    /// Tick and frame rates from a file must be finite and positive.
    fn check_rates(&self) -> Result<(), config::ConfigError> {
        for (key, rate) in [("tick_rate", self.tick_rate), ("frame_rate", self.frame_rate)] {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(config::ConfigError::Message(format!(
                    "{key} must be a positive number, got {rate}"
                )));
            }
        }
        Ok(())
    }

    /// Command line flags take precedence over file configuration.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(mode) = cli.mode {
            self.validation_mode = mode;
        }
        if let Some(title) = &cli.title {
            self.title = title.clone();
        }
        if let Some(tick_rate) = cli.tick_rate {
            self.tick_rate = tick_rate;
        }
        if let Some(frame_rate) = cli.frame_rate {
            self.frame_rate = frame_rate;
        }
        self
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "chicken105", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_the_user_form() {
        let cfg = Config::default();
        assert_eq!(cfg.validation_mode, ValidationMode::OnTouched);
        assert_eq!(cfg.title, DEFAULT_TITLE);
    }

    #[test]
    fn cli_overrides_file_values() {
        let cli = Cli::parse_from(["scribe", "--mode", "onSubmit", "--tick-rate", "2"]);
        let cfg = Config::default().merge_cli(&cli);
        assert_eq!(cfg.validation_mode, ValidationMode::OnSubmit);
        assert_eq!(cfg.tick_rate, 2.0);
        assert_eq!(cfg.frame_rate, DEFAULT_FRAME_RATE);
    }

    #[test]
    fn zero_rate_in_file_is_rejected() {
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "frame_rate = 0.0",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let err = cfg.check_rates().unwrap_err();
        assert!(err.to_string().contains("frame_rate"));
        assert!(Config::default().check_rates().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "validation_mode = \"onBlur\"",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.validation_mode, ValidationMode::OnBlur);
        assert_eq!(cfg.title, DEFAULT_TITLE);
        assert_eq!(cfg.tick_rate, DEFAULT_TICK_RATE);
    }
}
