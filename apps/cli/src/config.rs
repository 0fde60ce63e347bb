use std::{collections::HashMap, fs};

#[derive(Debug)]
pub struct Settings {
    pub base_url: String,
    pub database_url: Option<String>,
    pub default_search: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: client_core::DEFAULT_BASE_URL.into(),
            database_url: None,
            default_search: client_core::DEFAULT_SEARCH_TERM.into(),
        }
    }
}

/// Defaults, overridden by an optional `stories.toml` in the working
/// directory, overridden in turn by environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("stories.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("base_url") {
                settings.base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("database_url") {
                settings.database_url = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("default_search") {
                settings.default_search = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("STORIES_BASE_URL") {
        settings.base_url = v;
    }
    if let Ok(v) = std::env::var("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Ok(v) = std::env::var("STORIES_DATABASE_URL") {
        settings.database_url = Some(v);
    }
    if let Ok(v) = std::env::var("APP__DATABASE_URL") {
        settings.database_url = Some(v);
    }

    if let Ok(v) = std::env::var("STORIES_DEFAULT_SEARCH") {
        settings.default_search = v;
    }

    settings
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return "sqlite://./data/stories.sqlite3".to_string();
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}
