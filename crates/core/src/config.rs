use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub preview_debounce_ms: u64,
    pub resurface_probability: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            preview_debounce_ms: 500,
            resurface_probability: 0.3,
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load(None).unwrap();
        assert_eq!(cfg.server.base_url, "http://localhost:8080");
        assert_eq!(cfg.ui.preview_debounce_ms, 500);
        assert!((cfg.ui.resurface_probability - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.toml");
        fs::write(
            &path,
            "[server]\nbase_url = \"http://example.test:9000\"\n\n[ui]\npreview_debounce_ms = 250\n",
        )
        .unwrap();
        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.server.base_url, "http://example.test:9000");
        assert_eq!(cfg.ui.preview_debounce_ms, 250);
        // Untouched keys keep their defaults.
        assert!((cfg.ui.resurface_probability - 0.3).abs() < f64::EPSILON);
    }
}
