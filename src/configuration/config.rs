#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::collections::HashMap;
use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::DEFAULT_MAX_UPLOAD_BYTES;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ApiURL,
    ConfigFile,
    MaxUploadBytes,
    RequestTimeout,
    SessionID,
}

impl ConfigKey {
    fn is_integer(&self) -> bool {
        return matches!(self, ConfigKey::MaxUploadBytes | ConfigKey::RequestTimeout);
    }
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let max_upload_bytes = DEFAULT_MAX_UPLOAD_BYTES.to_string();
        let config_path = dirs::config_dir()
            .unwrap_or_else(env::temp_dir)
            .join("solvex/config.toml")
            .to_string_lossy()
            .to_string();

        let res = match key {
            ConfigKey::ApiURL => "http://localhost:8000",
            ConfigKey::MaxUploadBytes => &max_upload_bytes,
            ConfigKey::RequestTimeout => "30000",

            // Special
            ConfigKey::ConfigFile => &config_path,
            ConfigKey::SessionID => "",
        };

        return res.to_string();
    }

    pub async fn load(clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        let mut values = ConfigKey::iter()
            .map(|key| return (key, Config::default(key)))
            .collect::<HashMap<ConfigKey, String>>();

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    if let Some(val_int) = val.as_integer() {
                        values.insert(key, val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        values.insert(key, val_str.to_string());
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    values.insert(key, val.to_string());
                }
            }
        }

        for (key, val) in values.iter() {
            if key.is_integer() && val.parse::<u64>().is_err() {
                bail!(format!(
                    "Invalid value for '{key}': {val}\nExpected a whole number."
                ));
            }
        }

        for (key, val) in values.iter() {
            Config::set(*key, val);
        }

        tracing::debug!(
            api_url = Config::get(ConfigKey::ApiURL),
            request_timeout = Config::get(ConfigKey::RequestTimeout),
            max_upload_bytes = Config::get(ConfigKey::MaxUploadBytes),
            session_id = Config::get(ConfigKey::SessionID),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::SessionID || key == ConfigKey::ConfigFile {
                    return None;
                }

                let long = key.to_string();
                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(long.as_str()))?;

                let description = arg
                    .get_help()?
                    .to_string()
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let mut val = Config::default(key);
                if key.is_integer() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
