use std::{collections::HashMap, fs, path::Path, time::Duration};

use shared::protocol::{COMPUTE_RESULTS_PATH, UPLOAD_PDF_PATH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub page_url: String,
    pub upload_path: String,
    pub compute_path: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_url: "http://127.0.0.1:8000/calculator/".into(),
            upload_path: UPLOAD_PDF_PATH.into(),
            compute_path: COMPUTE_RESULTS_PATH.into(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new("intake.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file, then environment variables. Command-line
/// flags are applied by the caller.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            let text = |key: &str| file_cfg.get(key).and_then(|v| v.as_str()).map(str::to_string);
            if let Some(v) = text("page_url") {
                settings.page_url = v;
            }
            if let Some(v) = text("upload_path") {
                settings.upload_path = v;
            }
            if let Some(v) = text("compute_path") {
                settings.compute_path = v;
            }
            if let Some(v) = file_cfg
                .get("request_timeout_secs")
                .and_then(|v| v.as_integer())
                .and_then(|v| u64::try_from(v).ok())
            {
                settings.request_timeout_secs = v;
            }
        }
    }

    if let Some(v) = env("INTAKE_PAGE_URL") {
        settings.page_url = v;
    }
    if let Some(v) = env("INTAKE_UPLOAD_PATH") {
        settings.upload_path = v;
    }
    if let Some(v) = env("INTAKE_COMPUTE_PATH") {
        settings.compute_path = v;
    }
    if let Some(v) = env("INTAKE_REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings
}
