use std::{
    collections::HashMap,
    env,
    fs,
    path::PathBuf,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        // Read .runnerrc if exists
        if let Ok(text) = fs::read_to_string(&config_path) {
            parse_rc(&text, &mut map);
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    /// Build a config from defaults plus explicit rc text, ignoring the
    /// process environment.
    pub fn from_rc_text(text: &str) -> Self {
        let mut map = default_map();
        parse_rc(text, &mut map);
        Self { inner: map, config_path: default_config_path() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).filter(|v| !v.is_empty()).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    pub fn default_mode(&self) -> String {
        self.get("DEFAULT_MODE").unwrap_or_else(|| "minimal".to_string())
    }

    pub fn script_dir(&self) -> Option<PathBuf> {
        self.get_path("SCRIPT_DIR")
    }
}

fn parse_rc(text: &str, map: &mut HashMap<String, String>) {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or RUNNER_* for forward-compat
    const KEYS: &[&str] = &[
        "DEFAULT_MODE",
        "SCRIPT_DIR",
        "NOTIFY_BACKEND",
        "NOTIFY_SUCCESS_CMD",
        "NOTIFY_ALARM_CMD",
        "NOTIFY_ON_SUCCESS",
        "NOTIFY_ON_ERROR",
        "BANNER_COLOR",
        "LOG_LEVEL",
    ];

    KEYS.contains(&k) || k.starts_with("RUNNER_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("script_runner").join(".runnerrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Strings
    m.insert("DEFAULT_MODE".into(), "minimal".into());
    m.insert("NOTIFY_BACKEND".into(), "auto".into());
    m.insert("BANNER_COLOR".into(), "cyan".into());
    m.insert("LOG_LEVEL".into(), "warn".into());

    // Bools as strings
    m.insert("NOTIFY_ON_SUCCESS".into(), "false".into());
    m.insert("NOTIFY_ON_ERROR".into(), "false".into());

    m
}
