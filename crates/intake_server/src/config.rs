use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use shared::protocol::MAX_UPLOAD_BYTES;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub max_upload_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new("server.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file, then environment variables.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.server_bind = v.clone();
            }
            if let Some(v) = file_cfg.get("max_upload_bytes") {
                if let Ok(parsed) = v.parse::<u64>() {
                    settings.max_upload_bytes = parsed;
                }
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__MAX_UPLOAD_BYTES") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.max_upload_bytes = parsed;
        }
    }

    settings
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings_from(Path::new("/nonexistent/server.toml"), no_env);
        assert_eq!(settings.server_bind, "127.0.0.1:8000");
        assert_eq!(settings.max_upload_bytes, MAX_UPLOAD_BYTES);
    }

    #[test]
    fn environment_overrides_file_values() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("intake_server_config_{suffix}.toml"));
        fs::write(
            &path,
            "bind_addr = \"0.0.0.0:9000\"\nmax_upload_bytes = \"1024\"\n",
        )
        .expect("write config");

        let from_file = load_settings_from(&path, no_env);
        assert_eq!(from_file.server_bind, "0.0.0.0:9000");
        assert_eq!(from_file.max_upload_bytes, 1024);

        let overridden = load_settings_from(&path, |key| match key {
            "APP__BIND_ADDR" => Some("127.0.0.1:9100".to_string()),
            "APP__MAX_UPLOAD_BYTES" => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(overridden.server_bind, "127.0.0.1:9100");
        assert_eq!(overridden.max_upload_bytes, 1024);

        fs::remove_file(path).expect("cleanup");
    }
}
