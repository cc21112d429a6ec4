use std::path::{Path, PathBuf};

use compio::fs;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::BestEffortPathExt;
use crate::resources::{DEFAULT_MAX_DEPTH, DEFAULT_ROOT_LABEL};
use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;

const CONFIG_FILE_NAME: &str = "hub.yaml";
pub const DEFAULT_ADMIN_SECRET: &str = "STUDENT HUB";

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub admin_secret: String,
    pub max_upload_bytes: u64,
    pub max_breadcrumb_depth: usize,
    pub seed_demo: bool,
    pub root_label: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            admin_secret: DEFAULT_ADMIN_SECRET.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_breadcrumb_depth: DEFAULT_MAX_DEPTH,
            seed_demo: true,
            root_label: DEFAULT_ROOT_LABEL.to_string(),
        }
    }
}

impl HubConfig {
    /// Reads `hub.yaml` under `root`. A missing file yields the defaults.
    pub async fn read(root: &Path) -> Result<Self, HubConfigError> {
        let path = get_config_file_path(root);
        if !path.exists() {
            info!(
                "No config at {}, using defaults",
                path.best_effort_path_display()
            );
            return Ok(Self::default());
        }
        Self::from_path(path).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, HubConfigError> {
        debug!("Reading config file: {}", path.best_effort_path_display());
        let bytes = fs::read(&path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    fn apply(&mut self, key: &str, value: &Yaml) -> Result<(), HubConfigError> {
        match key {
            "admin_secret" => self.admin_secret = expect_string(key, value)?,
            "root_label" => self.root_label = expect_string(key, value)?,
            "max_upload_bytes" => self.max_upload_bytes = expect_count(key, value, 0)?,
            "max_breadcrumb_depth" => {
                self.max_breadcrumb_depth = expect_count(key, value, 1)? as usize
            }
            "seed_demo" => match value {
                Yaml::Value(Scalar::Boolean(flag)) => self.seed_demo = *flag,
                _ => return InvalidValueSnafu { key, expected: "a boolean" }.fail(),
            },
            _ => debug!("Ignoring unknown config key '{}'", key),
        }
        Ok(())
    }
}

fn expect_string(key: &str, value: &Yaml) -> Result<String, HubConfigError> {
    match value {
        Yaml::Value(Scalar::String(text)) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => InvalidValueSnafu {
            key,
            expected: "a non-empty string",
        }
        .fail(),
    }
}

fn expect_count(key: &str, value: &Yaml, min: i64) -> Result<u64, HubConfigError> {
    match value {
        Yaml::Value(Scalar::Integer(n)) if *n >= min => Ok(*n as u64),
        _ => InvalidValueSnafu {
            key,
            expected: if min > 0 {
                "a positive integer"
            } else {
                "a non-negative integer"
            },
        }
        .fail(),
    }
}

impl TryFrom<&str> for HubConfig {
    type Error = HubConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents =
            Yaml::load_from_str(contents).map_err(|e| HubConfigError::ParseError { source: e })?;
        let mut config = HubConfig::default();

        let Some(document) = documents.first() else {
            debug!("Config file is empty");
            return Ok(config);
        };
        let top_level = document
            .as_mapping()
            .ok_or(HubConfigError::TopLevelNotMap)?;

        for (key, value) in top_level {
            match key {
                Yaml::Value(Scalar::String(key)) => config.apply(key, value)?,
                other => debug!("Skipping non-string config key: {:?}", other),
            }
        }

        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum HubConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config key '{}' should be {}", key, expected))]
    InvalidValue { key: String, expected: &'static str },
}
