use anyhow::Result;
use std::path::PathBuf;

use super::Config;

pub const DEFAULT_SESSION_COOKIE: &str = "TRELLISSESSID";
pub const DEFAULT_SESSION_LIFETIME: u64 = 1440;

/// The typed part of [Config] the framework itself reads.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Lets raw error messages reach the client.
    pub debug: bool,
    /// Prefix stripped from request paths before routing.
    pub base_path: String,
    pub views_root: PathBuf,
    pub login_controller: String,
    pub login_action: String,
    pub session_cookie: String,
    /// Seconds a session survives without being saved again.
    pub session_lifetime: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            base_path: String::new(),
            views_root: PathBuf::from("views"),
            login_controller: String::new(),
            login_action: String::new(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            session_lifetime: DEFAULT_SESSION_LIFETIME,
        }
    }
}

impl Settings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            debug: config.get_bool("CORE", "DEBUG"),
            base_path: config
                .get_or("APP", "BASE_PATH", "")
                .trim_end_matches('/')
                .to_string(),
            views_root: config
                .get("PATH", "VIEWS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.views_root),
            login_controller: config.get_or("AUTH", "LOGIN_CONTROLLER", "").to_string(),
            login_action: config.get_or("AUTH", "LOGIN_ACTION", "").to_string(),
            session_cookie: config
                .get_or("SESSION", "COOKIE_NAME", DEFAULT_SESSION_COOKIE)
                .to_string(),
            session_lifetime: config
                .get_parsed("SESSION", "LIFETIME")?
                .unwrap_or(defaults.session_lifetime),
        })
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_login(mut self, controller: impl Into<String>, action: impl Into<String>) -> Self {
        self.login_controller = controller.into();
        self.login_action = action.into();
        self
    }

    pub fn with_views_root(mut self, views_root: impl Into<PathBuf>) -> Self {
        self.views_root = views_root.into();
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_typed_values() {
        let config: Config = "[CORE]\nDEBUG = true\n[APP]\nBASE_PATH = /blog/\n[AUTH]\nLOGIN_CONTROLLER = account\nLOGIN_ACTION = signin\n[SESSION]\nLIFETIME = 30\n"
            .parse()
            .unwrap();
        let settings = Settings::from_config(&config).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.base_path, "/blog");
        assert_eq!(settings.login_controller, "account");
        assert_eq!(settings.login_action, "signin");
        assert_eq!(settings.session_lifetime, 30);
        assert_eq!(settings.session_cookie, DEFAULT_SESSION_COOKIE);
    }

    #[test]
    fn defaults_when_empty() {
        let settings = Settings::from_config(&Config::new()).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.base_path, "");
        assert_eq!(settings.session_lifetime, DEFAULT_SESSION_LIFETIME);
    }
}
