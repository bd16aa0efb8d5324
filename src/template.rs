//! Placeholder templates for the page frame, home, city index and detail pages.
//!
//! ## Syntax
//!
//! A placeholder is `{{TOKEN}}` where `TOKEN` is one or more of `A-Z`, `0-9`
//! or `_`. Anything else that happens to contain braces (`{{ x }}`,
//! `{{lower}}`, a lone `{{`) is literal text.
//!
//! ## Single-Pass Substitution
//!
//! Each template is compiled once into a list of literal and slot segments.
//! Rendering walks that list and looks every slot up by exact token, so an
//! inserted value is never scanned for placeholders again. A CSV field that
//! contains `{{BASE_PATH}}` is emitted as that text (escaped), not replaced.
//!
//! ```text
//! "<a href=\"{{BASE_PATH}}/\">{{NAME}}</a>"
//!   → [Literal("<a href=\""), Slot(BASE_PATH), Literal("/\">"), Slot(NAME), Literal("</a>")]
//! ```
//!
//! ## Token Sets
//!
//! Each template kind accepts a fixed token set; an unknown token is a load
//! error, so typos surface before anything is written. `SITE_NAME` and
//! `BASE_PATH` are accepted everywhere.

use maud::Render;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error reading template {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Template not found: {0}")]
    Missing(PathBuf),
    #[error("Unknown placeholder {{{{{token}}}}} in template {template}")]
    UnknownPlaceholder { template: String, token: String },
}

/// The four templates every project provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Shared page frame (`<html>`, `<head>`, header, footer).
    Frame,
    /// Home page body: one card per city.
    Home,
    /// City index body: one card per item.
    City,
    /// Item detail body.
    Detail,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Frame,
        TemplateKind::Home,
        TemplateKind::City,
        TemplateKind::Detail,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Frame => "base.html",
            TemplateKind::Home => "index.html",
            TemplateKind::City => "city.html",
            TemplateKind::Detail => "page.html",
        }
    }

    /// Placeholders this template may use.
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            TemplateKind::Frame => &[
                "PAGE_TITLE",
                "PAGE_DESC",
                "CANONICAL",
                "SITE_NAME",
                "YEAR",
                "LANG",
                "CONTENT",
                "BASE_PATH",
            ],
            TemplateKind::Home => &[
                "CITY_CARDS",
                "TYPE_LABEL",
                "PLURAL_LABEL",
                "CITY_COUNT",
                "SITE_NAME",
                "BASE_PATH",
            ],
            TemplateKind::City => &[
                "CITY",
                "COUNT",
                "CARDS",
                "TYPE_LABEL",
                "PLURAL_LABEL",
                "SITE_NAME",
                "BASE_PATH",
            ],
            TemplateKind::Detail => &[
                "TYPE_LABEL",
                "TYPE_LABEL_LOWER",
                "NAME",
                "CITY",
                "CITY_URL",
                "ADDRESS",
                "HOURS",
                "FEATURES_SENTENCE",
                "PHOTO",
                "PHOTO_URL",
                "WEBSITE_URL",
                "LAT",
                "LON",
                "AFF_BLOCK",
                "SITE_NAME",
                "BASE_PATH",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(String),
}

/// A compiled template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Data-sourced text; HTML-escaped on insertion.
    Text(String),
    /// HTML the generator built itself; inserted verbatim.
    Markup(String),
}

/// Placeholder bindings for one render.
#[derive(Debug, Clone, Default)]
pub struct Vars {
    values: HashMap<&'static str, Value>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, token: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(token, Value::Text(value.into()));
        self
    }

    pub fn markup(mut self, token: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(token, Value::Markup(value.into()));
        self
    }

    pub fn get(&self, token: &str) -> Option<&Value> {
        self.values.get(token)
    }
}

fn is_token(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// Escape `& < > "` so text is safe in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    text.render().into_string()
}

/// Relative path from a page `depth` directories deep back to the site root.
///
/// `0 → "."`, `1 → ".."`, `2 → "../.."`.
pub fn base_path(depth: usize) -> String {
    if depth == 0 {
        ".".to_string()
    } else {
        vec![".."; depth].join("/")
    }
}

impl Template {
    /// Compile `text`, rejecting placeholders outside `allowed`.
    pub fn compile(name: &str, text: &str, allowed: &[&str]) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(open) = rest.find("{{") {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}") {
                Some(close) if is_token(&after[..close]) => {
                    let token = &after[..close];
                    if !allowed.contains(&token) {
                        return Err(TemplateError::UnknownPlaceholder {
                            template: name.to_string(),
                            token: token.to_string(),
                        });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(token.to_string()));
                    rest = &after[close + 2..];
                }
                _ => {
                    // Not a placeholder; keep one brace and rescan from the next.
                    literal.push('{');
                    rest = &rest[open + 1..];
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholders used by this template, in order of appearance.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Slot(t) => Some(t.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Fill every slot from `vars`. Unbound slots render empty.
    pub fn render(&self, vars: &Vars) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(token) => match vars.get(token) {
                    Some(Value::Text(text)) => out.push_str(&escape_html(text)),
                    Some(Value::Markup(html)) => out.push_str(html),
                    None => log::debug!("{}: no value for {{{{{token}}}}}", self.name),
                },
            }
        }
        out
    }
}

/// The compiled templates of one project.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub frame: Template,
    pub home: Template,
    pub city: Template,
    pub detail: Template,
}

impl TemplateSet {
    /// Load and compile `base.html`, `index.html`, `city.html` and
    /// `page.html` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let load = |kind: TemplateKind| -> Result<Template, TemplateError> {
            let path = dir.join(kind.file_name());
            if !path.is_file() {
                return Err(TemplateError::Missing(path));
            }
            let text = fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            Template::compile(kind.file_name(), &text, kind.tokens())
        };

        Ok(Self {
            frame: load(TemplateKind::Frame)?,
            home: load(TemplateKind::Home)?,
            city: load(TemplateKind::City)?,
            detail: load(TemplateKind::Detail)?,
        })
    }
}
