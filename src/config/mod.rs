//! Application configuration.
//!
//! `<configs>/config.ini` is read first. Its `[CORE] EXECUTION_ENVIRONMENT`
//! names a subdirectory whose own `config.ini` is laid over the base file
//! key by key.

pub mod ini;
mod settings;

use anyhow::{anyhow, Context, Result};
use essentials::debug;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use settings::Settings;

pub const CONFIG_FILE: &str = "config.ini";

#[derive(Debug, Clone, Default)]
pub struct Config {
    sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(configs_root: impl AsRef<Path>) -> Result<Self> {
        let configs_root = configs_root.as_ref();
        let base_file = configs_root.join(CONFIG_FILE);
        let mut config = Self::parse_file(&base_file)?;
        let environment = config
            .get("CORE", "EXECUTION_ENVIRONMENT")
            .filter(|environment| !environment.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "EXECUTION_ENVIRONMENT should be set in {}",
                    base_file.display()
                )
            })?
            .to_string();
        debug!(environment = %environment, "loading environment configuration");
        config.merge(Self::parse_file(
            &configs_root.join(&environment).join(CONFIG_FILE),
        )?);
        config.add_paths(configs_root);
        Ok(config)
    }

    pub fn parse_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Overwrites values with those of `other`, keeping keys it lacks.
    pub fn merge(&mut self, other: Config) {
        for (name, entries) in other.sections {
            self.sections.entry(name).or_default().extend(entries);
        }
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(default)
    }

    /// Missing and empty values are false; so is `0`.
    pub fn get_bool(&self, section: &str, key: &str) -> bool {
        !matches!(self.get(section, key), None | Some("") | Some("0"))
    }

    pub fn get_parsed<T>(&self, section: &str, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.get(section, key)
            .map(|value| {
                value
                    .parse()
                    .with_context(|| format!("Invalid value for [{section}] {key}: {value}"))
            })
            .transpose()
    }

    fn add_paths(&mut self, configs_root: &Path) {
        let views_root = configs_root
            .parent()
            .map(|parent| parent.join("views"))
            .unwrap_or_else(|| PathBuf::from("views"));
        if self.get("PATH", "CONFIGS_ROOT").is_none() {
            self.set("PATH", "CONFIGS_ROOT", configs_root.display().to_string());
        }
        if self.get("PATH", "VIEWS_ROOT").is_none() {
            self.set("PATH", "VIEWS_ROOT", views_root.display().to_string());
        }
    }
}

impl FromStr for Config {
    type Err = ini::IniError;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let sections = ini::parse(input, ini::Scanner::Normal)?;
        Ok(Self {
            sections: sections
                .into_iter()
                .map(|section| (section.name, section.entries.into_iter().collect()))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::env;

    use super::*;

    fn configs_dir(name: &str) -> PathBuf {
        let root = env::temp_dir()
            .join(format!("trellis-config-{}-{name}", std::process::id()))
            .join("configs");
        fs::create_dir_all(root.join("development")).unwrap();
        root
    }

    #[test]
    fn environment_overrides_base() {
        let root = configs_dir("override");
        fs::write(
            root.join(CONFIG_FILE),
            "[CORE]\nEXECUTION_ENVIRONMENT = development\nDEBUG = off\n\n[APP]\nBASE_PATH = /app\nLOGIN_CONTROLLER = account\n",
        )
        .unwrap();
        fs::write(
            root.join("development").join(CONFIG_FILE),
            "[CORE]\nDEBUG = on\n[SESSION]\nLIFETIME = 60\n",
        )
        .unwrap();

        let config = Config::load(&root).unwrap();
        assert!(config.get_bool("CORE", "DEBUG"));
        assert_eq!(config.get("APP", "BASE_PATH"), Some("/app"));
        assert_eq!(config.get("APP", "LOGIN_CONTROLLER"), Some("account"));
        assert_eq!(config.get_parsed::<u64>("SESSION", "LIFETIME").unwrap(), Some(60));
        assert_eq!(
            config.get("PATH", "CONFIGS_ROOT"),
            Some(root.display().to_string().as_str())
        );
        assert_eq!(
            config.get("PATH", "VIEWS_ROOT"),
            Some(root.parent().unwrap().join("views").display().to_string().as_str())
        );
    }

    #[test]
    fn environment_is_required() {
        let root = configs_dir("missing-env");
        fs::write(root.join(CONFIG_FILE), "[CORE]\nDEBUG = on\n").unwrap();
        let error = Config::load(&root).unwrap_err();
        assert!(error.to_string().contains("EXECUTION_ENVIRONMENT"));
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let config: Config = "[SERVER]\nPORT = eighty\n".parse().unwrap();
        assert!(config.get_parsed::<u16>("SERVER", "PORT").is_err());
        assert_eq!(config.get_parsed::<u16>("SERVER", "MISSING").unwrap(), None);
    }
}
