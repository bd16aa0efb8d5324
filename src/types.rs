//! Shared types passed between pipeline stages.
//!
//! Rows come out of [`crate::dataset`], are partitioned into [`Group`]s by
//! [`crate::group`], and every rendered [`Page`] path ends up in the
//! [`SiteManifest`] that feeds `sitemap.xml`.

use std::collections::BTreeMap;

/// One point of interest. Keys and values are trimmed; `name` is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: BTreeMap<String, String>,
}

impl Row {
    /// Build a row from `(column, value)` pairs, trimming both sides.
    ///
    /// Returns `None` when the `name` column is missing or blank. Empty
    /// column names are ignored.
    pub fn from_pairs<K, V, I>(pairs: I) -> Option<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut fields = BTreeMap::new();
        for (k, v) in pairs {
            let key = k.as_ref().trim();
            if key.is_empty() {
                continue;
            }
            fields.insert(key.to_string(), v.as_ref().trim().to_string());
        }
        let row = Self { fields };
        if row.name().is_empty() {
            None
        } else {
            Some(row)
        }
    }

    /// Field value, or `""` when the column is absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.get("name")
    }

    pub fn city(&self) -> &str {
        self.get("city")
    }

    pub fn address(&self) -> &str {
        self.get("address")
    }

    pub fn hours(&self) -> &str {
        self.get("hours")
    }

    pub fn photo_url(&self) -> &str {
        self.get("photo_url")
    }

    pub fn website_url(&self) -> &str {
        self.get("website_url")
    }

    pub fn lat(&self) -> &str {
        self.get("lat")
    }

    pub fn lon(&self) -> &str {
        self.get("lon")
    }

    /// The `features` column split on `;`, blanks removed.
    pub fn features(&self) -> Vec<&str> {
        self.get("features")
            .split(';')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect()
    }
}

/// Rows sharing a city, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Display name as it appears in the data (or the unknown-city label).
    pub name: String,
    pub rows: Vec<Row>,
}

/// A fully rendered output document.
#[derive(Debug, Clone)]
pub struct Page {
    /// Site-relative path with a leading slash, e.g. `/paris/cafe-x.html`.
    pub path: String,
    pub title: String,
    pub description: String,
    pub canonical: String,
    /// Directory depth below the site root (0 = home).
    pub depth: usize,
    pub html: String,
}

/// Ordered list of every page path emitted in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteManifest {
    pages: Vec<String>,
}

impl SiteManifest {
    pub fn record(&mut self, path: impl Into<String>) {
        self.pages.push(path.into());
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
