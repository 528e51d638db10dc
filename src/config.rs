//! Catalog configuration document.
//!
//! The JSON file is read once, deserialized into [`Config`] and then passed
//! by reference to every rendering step. Nothing mutates it after load.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::net::fetch::{fetch_url, is_remote, FetchError};

/// Category whose cards are the targets of private-channel buttons.
pub const PRIVATE_CATEGORY_ID: &str = "private";
/// Category whose items may carry a private-channel button.
pub const CHANNELS_CATEGORY_ID: &str = "channels";

pub const DEFAULT_LOGO_PATH: &str = "logo/";
pub const DEFAULT_LOGO_PLACEHOLDER: &str = "TG";
pub const DEFAULT_PRIVATE_LABEL: &str = "Private";
pub const DEFAULT_NO_RESULTS: &str = "No results found";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub footer: Option<String>,
    pub about_text: Option<String>,
    pub logo_path: Option<String>,
    pub texts: Option<Texts>,
    pub contact_info: Option<BTreeMap<String, String>>,
    pub external_links: Option<Vec<ExternalLink>>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texts {
    pub search: Option<String>,
    pub tabs: Option<BTreeMap<String, String>>,
    pub footer: Option<FooterTexts>,
    pub buttons: Option<ButtonTexts>,
    pub no_results: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterTexts {
    pub about: Option<String>,
    pub contacts: Option<String>,
    pub forums: Option<String>,
    pub contact_labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonTexts {
    pub private: Option<String>,
    pub back_to_top: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalLink {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub title: String,
    pub description: String,
    pub username: String,
    pub link: String,
    pub logo: Option<String>,
    pub logo_placeholder: Option<String>,
    pub private_channel: Option<PrivateChannel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrivateChannel {
    pub username: String,
    pub link: String,
}

/// An optional config string, with `""` counted as absent.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl CatalogItem {
    /// Glyph shown when there is no logo or it failed to load.
    pub fn placeholder(&self) -> &str {
        non_empty(self.logo_placeholder.as_deref()).unwrap_or(DEFAULT_LOGO_PLACEHOLDER)
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    pub fn logo_path(&self) -> &str {
        non_empty(self.logo_path.as_deref()).unwrap_or(DEFAULT_LOGO_PATH)
    }

    pub fn footer_texts(&self) -> Option<&FooterTexts> {
        self.texts.as_ref().and_then(|t| t.footer.as_ref())
    }

    pub fn button_texts(&self) -> Option<&ButtonTexts> {
        self.texts.as_ref().and_then(|t| t.buttons.as_ref())
    }

    pub fn private_button_label(&self) -> &str {
        non_empty(self.button_texts().and_then(|b| b.private.as_deref()))
            .unwrap_or(DEFAULT_PRIVATE_LABEL)
    }

    pub fn back_to_top_title(&self) -> Option<&str> {
        non_empty(self.button_texts().and_then(|b| b.back_to_top.as_deref()))
    }

    pub fn no_results_label(&self) -> &str {
        non_empty(self.texts.as_ref().and_then(|t| t.no_results.as_deref()))
            .unwrap_or(DEFAULT_NO_RESULTS)
    }

    /// Position of the private-channels category, if the catalog has one.
    pub fn private_category_index(&self) -> Option<usize> {
        self.categories
            .iter()
            .position(|c| c.id == PRIVATE_CATEGORY_ID)
    }

    pub fn card_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

/// Where the configuration document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Url(String),
}

impl ConfigSource {
    pub fn parse(location: &str) -> Self {
        if is_remote(location) {
            ConfigSource::Url(location.to_string())
        } else {
            ConfigSource::File(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Url(url) => write!(f, "{}", url),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed configuration: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Load the configuration once. No retry.
pub fn load_config(source: &ConfigSource) -> Result<Config, ConfigError> {
    let json = match source {
        ConfigSource::File(path) => {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?
        }
        ConfigSource::Url(url) => fetch_url(url, FETCH_TIMEOUT)?.text(),
    };
    let config = Config::from_json(&json)?;
    log::debug!(
        "Loaded configuration from {}: {} categories, {} items",
        source,
        config.categories.len(),
        config.card_count()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_minimal_document() {
        let config = Config::from_json(r#"{"categories": []}"#).unwrap();
        assert!(config.title.is_none());
        assert_eq!(config.logo_path(), "logo/");
        assert_eq!(config.private_button_label(), "Private");
        assert_eq!(config.no_results_label(), "No results found");
        assert!(config.private_category_index().is_none());
    }

    #[test]
    fn parses_camel_case_fields() {
        let json = r#"{
            "title": "Directory",
            "logoPath": "img/",
            "aboutText": "About",
            "texts": {"buttons": {"private": "Closed", "backToTop": "Up"}},
            "contactInfo": {"email": "team@example.com"},
            "externalLinks": [{"name": "Forum", "url": "https://forum.example", "icon": "fa fa-comments"}],
            "categories": [
                {"id": "channels", "name": "Channels", "items": [
                    {"title": "News", "description": "Daily", "username": "@news", "link": "https://t.me/news",
                     "logoPlaceholder": "NW", "privateChannel": {"username": "@news_vip", "link": "https://t.me/+abc"}}
                ]},
                {"id": "private", "name": "Private", "items": []}
            ]
        }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.logo_path(), "img/");
        assert_eq!(config.about_text.as_deref(), Some("About"));
        assert_eq!(config.private_button_label(), "Closed");
        assert_eq!(config.back_to_top_title(), Some("Up"));
        assert_eq!(config.private_category_index(), Some(1));
        let item = &config.categories[0].items[0];
        assert_eq!(item.placeholder(), "NW");
        assert_eq!(
            item.private_channel.as_ref().map(|p| p.username.as_str()),
            Some("@news_vip")
        );
    }

    #[test]
    fn empty_strings_fall_back_to_defaults() {
        let json = r#"{
            "logoPath": "",
            "texts": {"noResults": "", "buttons": {"private": "", "backToTop": ""}},
            "categories": [{"id": "c", "name": "C", "items": [
                {"title": "T", "description": "D", "username": "@t", "link": "https://t.me/t", "logoPlaceholder": ""}
            ]}]
        }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.logo_path(), "logo/");
        assert_eq!(config.private_button_label(), "Private");
        assert_eq!(config.back_to_top_title(), None);
        assert_eq!(config.no_results_label(), "No results found");
        assert_eq!(config.categories[0].items[0].placeholder(), "TG");
    }

    #[test]
    fn missing_categories_is_an_error() {
        let err = Config::from_json(r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file_and_report_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"subtitle": "Sub", "categories": []}}"#).unwrap();

        let config = load_config(&ConfigSource::File(path)).unwrap();
        assert_eq!(config.subtitle.as_deref(), Some("Sub"));

        let missing = ConfigSource::File(dir.path().join("nope.json"));
        assert!(matches!(
            load_config(&missing).unwrap_err(),
            ConfigError::Io { .. }
        ));
    }

    #[test]
    fn source_classification() {
        assert_eq!(
            ConfigSource::parse("https://example.com/config.json"),
            ConfigSource::Url("https://example.com/config.json".into())
        );
        assert_eq!(
            ConfigSource::parse("site/config.json"),
            ConfigSource::File(PathBuf::from("site/config.json"))
        );
    }
}
