// Configuration module
// Reads INI-style configuration files with environment variable overrides

use configparser::ini::Ini;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Name configparser gives to keys that appear before any [Section] header
const DEFAULT_SECTION: &str = "default";

/// Configuration file reader.
/// Keys outside any section are stored as-is; keys inside `[Section]` are
/// stored as `Section.Key`. Environment variables `<prefix><Key>` (with `.`
/// replaced by `_`) take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<String, String>,
    filename: String,
    env_prefix: String,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// A config with no file that still honours environment overrides
    pub fn from_env(env_prefix: &str) -> Self {
        let mut config = Self::new();
        config.env_prefix = env_prefix.to_string();
        config
    }

    /// Load configuration from a file.
    /// Returns false when the file is missing or unparsable; env overrides still apply.
    pub fn set_source(&mut self, filename: &str, env_prefix: &str) -> bool {
        self.filename = filename.to_string();
        self.env_prefix = env_prefix.to_string();
        self.reload()
    }

    /// Reload the configuration file
    pub fn reload(&mut self) -> bool {
        self.values.clear();

        let path = Path::new(&self.filename);
        if !path.exists() {
            return false;
        }

        let mut ini = Ini::new_cs();
        let sections = match ini.load(path) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!("Could not parse configuration file {}: {}", self.filename, err);
                return false;
            }
        };
        self.absorb(sections);
        true
    }

    /// Parse configuration from an in-memory string
    pub fn load_str(&mut self, content: &str) -> bool {
        self.values.clear();
        let mut ini = Ini::new_cs();
        match ini.read(content.to_string()) {
            Ok(map) => {
                self.absorb(map);
                true
            }
            Err(_) => false,
        }
    }

    fn absorb(&mut self, sections: HashMap<String, HashMap<String, Option<String>>>) {
        for (section, entries) in sections {
            for (key, value) in entries {
                let Some(mut value) = value else {
                    continue;
                };
                if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                    value = value[1..value.len() - 1].to_string();
                }
                let key = if section == DEFAULT_SECTION {
                    key
                } else {
                    format!("{}.{}", section, key)
                };
                self.values.insert(key, value);
            }
        }
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn get_string_default(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_string(&self, key: &str) -> String {
        self.get_string_default(key, "")
    }

    /// `1`, `true` and `yes` (any case) are true; anything else set is false
    pub fn get_bool_default(&self, key: &str, default: bool) -> bool {
        self.lookup(key).map_or(default, |raw| {
            matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
        })
    }

    pub fn get_int_default(&self, key: &str, default: i32) -> i32 {
        self.parsed(key).unwrap_or(default)
    }

    pub fn get_float_default(&self, key: &str, default: f32) -> f32 {
        self.parsed(key).unwrap_or(default)
    }

    /// Unparsable values fall back to the caller's default
    fn parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.lookup(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Config key {} has unparsable value '{}'", key, raw);
                None
            }
        }
    }

    fn env_key(&self, key: &str) -> Option<String> {
        (!self.env_prefix.is_empty()).then(|| format!("{}{}", self.env_prefix, key.replace('.', "_")))
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.env_key(key)
            .and_then(|name| std::env::var(name).ok())
            .or_else(|| self.values.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_and_unparsable_use_defaults() {
        let mut config = Config::new();
        config.load_str("Threads = many\nVerbose = Yes\n");
        assert_eq!(config.get_int_default("Threads", 4), 4);
        assert_eq!(config.get_int_default("Missing", 7), 7);
        assert_eq!(config.get_string_default("Missing", "x"), "x");
        assert!(config.get_bool_default("Verbose", false));
        assert!(config.get_bool_default("Missing", true));
    }

    #[test]
    fn test_load_str_sections_and_quotes() {
        let mut config = Config::new();
        assert!(config.load_str("LogLevel = 3\nLogsDir = \"logs\"\n[Batch]\nThreads = 4\n"));
        assert_eq!(config.get_int_default("LogLevel", 0), 3);
        assert_eq!(config.get_string("LogsDir"), "logs");
        assert_eq!(config.get_int_default("Batch.Threads", 1), 4);
        assert!(!config.is_set("Threads"));
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::new();
        config.load_str("Threads = 2\n");
        config.env_prefix = "BwmSharedTest_".to_string();
        // SAFETY: test-only, key is unique to this test
        unsafe { std::env::set_var("BwmSharedTest_Threads", "6") };
        assert_eq!(config.get_int_default("Threads", 1), 6);
        unsafe { std::env::remove_var("BwmSharedTest_Threads") };
        assert_eq!(config.get_int_default("Threads", 1), 2);
    }

    #[test]
    fn test_missing_file() {
        let mut config = Config::new();
        assert!(!config.set_source("/nonexistent/bwmtool.conf", "X_"));
        assert_eq!(config.get_float_default("Scale", 1.5), 1.5);
    }
}
