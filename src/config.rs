//! Site configuration module.
//!
//! Handles loading and validating the project's `config.toml`. A
//! `config.json` with the same shape is accepted when no TOML file exists.
//! The loaded [`SiteConfig`] is built once and passed by reference into every
//! stage; nothing reads configuration from ambient state.
//!
//! ## Configuration Options
//!
//! ```toml
//! site_name = "Coffee Guide"            # Required
//! base_url = "https://example.com"      # Required, http(s)
//! language = "en"                       # <html lang>
//!
//! [build]
//! output_dir = "dist"
//!
//! [data]
//! local_csv = "data/points.csv"
//! remote_url = ""                       # Optional CSV export URL
//! fetch_timeout_secs = 20
//!
//! [niche]
//! type_label = "Café"
//! plural_label = "Cafés"
//! unknown_city = "Other"                # Group name for rows without a city
//!
//! [affiliate]
//! tag = ""
//! keywords = []
//! search_url = "https://www.amazon.com/s"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const CONFIG_TOML: &str = "config.toml";
pub const CONFIG_JSON: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No config.toml or config.json found in {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site name, used as home page title and in the page frame.
    pub site_name: String,
    /// Absolute URL the site is published under. Trailing slashes are ignored.
    pub base_url: String,
    /// Value of the `<html lang>` attribute.
    pub language: String,
    pub build: BuildConfig,
    pub data: DataConfig,
    pub niche: NicheConfig,
    pub affiliate: AffiliateConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: String::new(),
            base_url: String::new(),
            language: "en".to_string(),
            build: BuildConfig::default(),
            data: DataConfig::default(),
            niche: NicheConfig::default(),
            affiliate: AffiliateConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Base URL without trailing slashes, ready for `"{base}/{path}"` joins.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// The remote dataset URL, if one is configured and network-addressed.
    pub fn remote_url(&self) -> Option<Url> {
        let raw = self.data.remote_url.trim();
        if raw.is_empty() {
            return None;
        }
        Url::parse(raw)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
    }

    /// Validate required values and ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_name.trim().is_empty() {
            return Err(ConfigError::Validation("site_name must not be empty".into()));
        }
        match Url::parse(self.base_url()) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "base_url must be an absolute http(s) URL, got {:?}",
                    self.base_url
                )));
            }
        }
        let out = self.build.output_dir.trim();
        if out.is_empty() || out == "." || out == ".." {
            return Err(ConfigError::Validation(
                "build.output_dir must name a directory below the project root".into(),
            ));
        }
        if self.niche.type_label.trim().is_empty() || self.niche.plural_label.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "niche.type_label and niche.plural_label must not be empty".into(),
            ));
        }
        if self.niche.unknown_city.trim().is_empty() {
            return Err(ConfigError::Validation(
                "niche.unknown_city must not be empty".into(),
            ));
        }
        if self.data.fetch_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "data.fetch_timeout_secs must be at least 1".into(),
            ));
        }
        if !self.affiliate.tag.is_empty() && Url::parse(&self.affiliate.search_url).is_err() {
            return Err(ConfigError::Validation(format!(
                "affiliate.search_url is not a valid URL: {:?}",
                self.affiliate.search_url
            )));
        }
        Ok(())
    }
}

/// Output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Output directory, relative to the project root.
    pub output_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: "dist".to_string(),
        }
    }
}

/// Dataset source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Local CSV, relative to the project root. Used when no remote source is
    /// configured or the fetch fails.
    pub local_csv: String,
    /// Optional remote CSV (e.g. a spreadsheet export link).
    pub remote_url: String,
    /// Upper bound on the remote fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

impl DataConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            local_csv: "data/points.csv".to_string(),
            remote_url: String::new(),
            fetch_timeout_secs: 20,
        }
    }
}

/// Wording for the kind of place the directory lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NicheConfig {
    /// Singular label, e.g. "Café".
    pub type_label: String,
    /// Plural label, e.g. "Cafés".
    pub plural_label: String,
    /// Group name used for rows with a blank city.
    pub unknown_city: String,
}

impl Default for NicheConfig {
    fn default() -> Self {
        Self {
            type_label: "Place".to_string(),
            plural_label: "Places".to_string(),
            unknown_city: "Other".to_string(),
        }
    }
}

/// Outbound search links rendered on detail pages.
///
/// The block is only emitted when both `tag` and `keywords` are non-empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AffiliateConfig {
    pub tag: String,
    pub keywords: Vec<String>,
    /// Search endpoint; `k` and `tag` query parameters are appended.
    pub search_url: String,
}

impl AffiliateConfig {
    pub fn is_enabled(&self) -> bool {
        !self.tag.trim().is_empty() && self.keywords.iter().any(|k| !k.trim().is_empty())
    }
}

impl Default for AffiliateConfig {
    fn default() -> Self {
        Self {
            tag: String::new(),
            keywords: Vec::new(),
            search_url: "https://www.amazon.com/s".to_string(),
        }
    }
}

/// Locate the config file in `root`: `config.toml` first, then `config.json`.
pub fn find_config_file(root: &Path) -> Result<PathBuf, ConfigError> {
    [CONFIG_TOML, CONFIG_JSON]
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| ConfigError::NotFound(root.to_path_buf()))
}

/// Parse config text, picking the format from the file extension.
pub fn parse_config(path: &Path, content: &str) -> Result<SiteConfig, ConfigError> {
    let is_json = path.extension().is_some_and(|e| e == "json");
    let config: SiteConfig = if is_json {
        serde_json::from_str(content)?
    } else {
        toml::from_str(content)?
    };
    Ok(config)
}

/// Load and validate the project config from `root`.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = find_config_file(root)?;
    let content = fs::read_to_string(&path)?;
    let config = parse_config(&path, &content)?;
    config.validate()?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Places Configuration
# ===========================
# Only site_name and base_url are required. Values shown below are the defaults
# for everything else. Unknown keys cause an error.

# Site name, shown in the page frame and as the home page title.
site_name = "My Directory"

# Absolute URL the site is published under (used for canonical links,
# robots.txt and sitemap.xml).
base_url = "https://example.com"

# <html lang> attribute.
language = "en"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[build]
# Output directory, relative to the project root. Regenerated on every run.
output_dir = "dist"

# ---------------------------------------------------------------------------
# Dataset
# ---------------------------------------------------------------------------
[data]
# Local CSV with a header row. Columns: name, city, address, hours,
# features (semicolon-separated), photo_url, website_url, lat, lon.
local_csv = "data/points.csv"

# Optional remote CSV. When set, it is fetched on every build and saved to
# data/points_fetched.csv. Any failure falls back to local_csv.
remote_url = ""

# Upper bound on the remote fetch, in seconds.
fetch_timeout_secs = 20

# ---------------------------------------------------------------------------
# Wording
# ---------------------------------------------------------------------------
[niche]
type_label = "Place"
plural_label = "Places"
# Group name for rows with an empty city column.
unknown_city = "Other"

# ---------------------------------------------------------------------------
# Affiliate search links (detail pages). Disabled while tag or keywords
# is empty.
# ---------------------------------------------------------------------------
[affiliate]
tag = ""
keywords = []
search_url = "https://www.amazon.com/s"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn minimal() -> SiteConfig {
        SiteConfig {
            site_name: "Guide".into(),
            base_url: "https://example.com/".into(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn defaults_for_optional_sections() {
        let config = SiteConfig::default();
        assert_eq!(config.build.output_dir, "dist");
        assert_eq!(config.data.local_csv, "data/points.csv");
        assert_eq!(config.data.fetch_timeout_secs, 20);
        assert_eq!(config.niche.unknown_city, "Other");
        assert_eq!(config.language, "en");
        assert!(!config.affiliate.is_enabled());
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        assert_eq!(minimal().base_url(), "https://example.com");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
site_name = "Coffee"
base_url = "https://coffee.example"

[niche]
type_label = "Café"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.niche.type_label, "Café");
        // Defaults preserved
        assert_eq!(config.niche.plural_label, "Places");
        assert_eq!(config.build.output_dir, "dist");
    }

    #[test]
    fn unknown_key_rejected() {
        let toml = r#"
site_name = "x"
base_url = "https://example.com"
colour = "red"
"#;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let toml = r#"
[niche]
typo_label = "x"
"#;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn validate_default_config_fails_without_site_identity() {
        let result = SiteConfig::default().validate();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_minimal_passes() {
        minimal().validate().unwrap();
    }

    #[test]
    fn validate_rejects_relative_base_url() {
        let config = SiteConfig {
            base_url: "example.com".into(),
            ..minimal()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_dot_output_dir() {
        let mut config = minimal();
        config.build.output_dir = ".".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = minimal();
        config.data.fetch_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn remote_url_requires_http_scheme() {
        let mut config = minimal();
        assert!(config.remote_url().is_none());

        config.data.remote_url = "ftp://example.com/points.csv".into();
        assert!(config.remote_url().is_none());

        config.data.remote_url = "not a url".into();
        assert!(config.remote_url().is_none());

        config.data.remote_url = "  https://docs.example.com/export?format=csv ".into();
        assert_eq!(
            config.remote_url().unwrap().as_str(),
            "https://docs.example.com/export?format=csv"
        );
    }

    #[test]
    fn affiliate_enabled_needs_tag_and_keywords() {
        let mut aff = AffiliateConfig::default();
        aff.tag = "shop-21".into();
        assert!(!aff.is_enabled());
        aff.keywords = vec!["  ".into()];
        assert!(!aff.is_enabled());
        aff.keywords = vec!["coffee beans".into()];
        assert!(aff.is_enabled());
    }

    #[test]
    fn load_config_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn load_config_reads_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_TOML),
            "site_name = \"Guide\"\nbase_url = \"https://example.com\"\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site_name, "Guide");
    }

    #[test]
    fn load_config_reads_json_fallback() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_JSON),
            r#"{"site_name": "Guide", "base_url": "https://example.com",
                "niche": {"type_label": "Bar", "plural_label": "Bars"}}"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.niche.plural_label, "Bars");
    }

    #[test]
    fn load_config_prefers_toml_over_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_TOML),
            "site_name = \"From TOML\"\nbase_url = \"https://example.com\"\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join(CONFIG_JSON),
            r#"{"site_name": "From JSON", "base_url": "https://example.com"}"#,
        )
        .unwrap();
        assert_eq!(load_config(tmp.path()).unwrap().site_name, "From TOML");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_TOML), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_TOML),
            "site_name = \"\"\nbase_url = \"https://example.com\"\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_toml_is_valid() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.build.output_dir, BuildConfig::default().output_dir);
        assert_eq!(config.niche.unknown_city, NicheConfig::default().unknown_city);
        assert_eq!(
            config.affiliate.search_url,
            AffiliateConfig::default().search_url
        );
    }
}
