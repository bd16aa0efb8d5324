//! HTML site generation.
//!
//! Takes the project inputs (config, templates, assets, dataset) and writes
//! the complete static site. Every run is a full rebuild: files are
//! overwritten unconditionally and nothing is diffed.
//!
//! ## Generated Pages
//!
//! - **Home page** (`/index.html`): one card per city
//! - **City pages** (`/{city}/index.html`): one card per item
//! - **Detail pages** (`/{city}/{item}.html`): one per dataset row
//! - `robots.txt` and `sitemap.xml` listing every page above
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── robots.txt
//! ├── sitemap.xml
//! ├── assets/
//! │   └── style.css          # copied from <root>/assets/
//! ├── lyon/
//! │   ├── index.html
//! │   └── spot-z.html
//! └── paris/
//!     ├── index.html
//!     ├── cafe-x.html
//!     └── bar-y.html
//! ```
//!
//! ## Two Phases
//!
//! [`plan`] loads and validates everything (templates, assets, dataset) and
//! assigns slugs, without touching the output directory. [`write_site`] then
//! renders each page fully in memory before writing it. A configuration or
//! template problem therefore aborts before any output exists.
//!
//! ## Slug Collisions
//!
//! Distinct names can slugify to the same segment ("Café" and "Cafe"). The
//! second claimant gets a numeric suffix (`cafe-2`) and a warning is logged.
//! Item slugs are unique per city and never `index`; city slugs are unique
//! site-wide and never `assets`.
//!
//! ## Time
//!
//! The copyright year is the only value derived from the clock. It enters
//! through [`BuildContext`], so two builds with the same context produce
//! byte-identical output.

use crate::config::{AffiliateConfig, ConfigError, SiteConfig};
use crate::dataset::{self, DataSource, DatasetError};
use crate::group::group_by_city;
use crate::naming::slugify;
use crate::template::{Template, TemplateError, TemplateSet, Vars, base_path};
use crate::types::{Group, Page, Row, SiteManifest};
use chrono::Datelike;
use maud::{Markup, html};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;
use walkdir::WalkDir;

pub const TEMPLATES_DIR: &str = "templates";
pub const ASSETS_DIR: &str = "assets";
pub const STYLESHEET: &str = "style.css";

const RESERVED_CITY_SLUGS: &[&str] = &[ASSETS_DIR];
const RESERVED_ITEM_SLUGS: &[&str] = &["index"];

const DEFAULT_HOURS: &str = "variable hours";
const DEFAULT_FEATURES: &str = "see on site";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Required asset not found: {0}")]
    MissingAsset(PathBuf),
    #[error("Cannot copy assets: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Per-run inputs that do not come from the project files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    /// Rendered into the frame's `{{YEAR}}`.
    pub year: i32,
}

impl BuildContext {
    pub fn now() -> Self {
        Self {
            year: chrono::Local::now().year(),
        }
    }
}

/// A city group with its URL segments decided.
#[derive(Debug, Clone)]
pub struct PlannedGroup {
    pub group: Group,
    pub slug: String,
    /// One per row, same order as `group.rows`.
    pub item_slugs: Vec<String>,
}

impl PlannedGroup {
    pub fn items(&self) -> impl Iterator<Item = (&Row, &str)> {
        self.group
            .rows
            .iter()
            .zip(self.item_slugs.iter().map(String::as_str))
    }
}

/// Everything needed to write the site, validated up front.
#[derive(Debug, Clone)]
pub struct SitePlan {
    pub templates: TemplateSet,
    pub source: DataSource,
    pub groups: Vec<PlannedGroup>,
}

impl SitePlan {
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.group.rows.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub name: String,
    pub path: String,
    pub items: Vec<ItemSummary>,
}

/// What a build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub manifest: SiteManifest,
    pub groups: Vec<GroupSummary>,
    pub source: DataSource,
    pub output_dir: PathBuf,
}

/// Claims slugs in order, suffixing `-2`, `-3`, … on collision.
#[derive(Debug, Default)]
struct SlugAllocator {
    taken: HashSet<String>,
}

impl SlugAllocator {
    fn with_reserved(reserved: &[&str]) -> Self {
        Self {
            taken: reserved.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Returns `(slug, disambiguated)`.
    fn claim(&mut self, base: String) -> (String, bool) {
        if self.taken.insert(base.clone()) {
            return (base, false);
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if self.taken.insert(candidate.clone()) {
                return (candidate, true);
            }
            n += 1;
        }
    }
}

/// Assign city and item slugs, disambiguating collisions.
pub fn assign_slugs(groups: Vec<Group>) -> Vec<PlannedGroup> {
    let mut cities = SlugAllocator::with_reserved(RESERVED_CITY_SLUGS);

    groups
        .into_iter()
        .map(|group| {
            let (slug, renamed) = cities.claim(slugify(&group.name));
            if renamed {
                log::warn!("City {:?} collides with another city; using /{slug}/", group.name);
            }

            let mut items = SlugAllocator::with_reserved(RESERVED_ITEM_SLUGS);
            let item_slugs = group
                .rows
                .iter()
                .map(|row| {
                    let (item_slug, renamed) = items.claim(slugify(row.name()));
                    if renamed {
                        log::warn!(
                            "{:?} in {} collides with another name; using {item_slug}.html",
                            row.name(),
                            group.name
                        );
                    }
                    item_slug
                })
                .collect();

            PlannedGroup {
                group,
                slug,
                item_slugs,
            }
        })
        .collect()
}

/// Load templates, verify assets, load and group the dataset.
///
/// Reads only; nothing is written except the fetched-dataset copy.
pub fn plan(config: &SiteConfig, root: &Path) -> Result<SitePlan, GenerateError> {
    let templates = TemplateSet::load(&root.join(TEMPLATES_DIR))?;

    let stylesheet = root.join(ASSETS_DIR).join(STYLESHEET);
    if !stylesheet.is_file() {
        return Err(GenerateError::MissingAsset(stylesheet));
    }

    let loaded = dataset::load_rows(config, root)?;
    log::info!("Loaded {} rows from {}", loaded.rows.len(), loaded.source);

    let groups = group_by_city(loaded.rows, &config.niche.unknown_city);
    Ok(SitePlan {
        templates,
        source: loaded.source,
        groups: assign_slugs(groups),
    })
}

/// Full build: [`plan`] then [`write_site`].
pub fn generate(
    config: &SiteConfig,
    root: &Path,
    output_dir: &Path,
    ctx: &BuildContext,
) -> Result<BuildReport, GenerateError> {
    let site = plan(config, root)?;
    write_site(config, &site, root, output_dir, ctx)
}

/// Render and write every page, copy assets, emit robots.txt and sitemap.xml.
pub fn write_site(
    config: &SiteConfig,
    site: &SitePlan,
    root: &Path,
    output_dir: &Path,
    ctx: &BuildContext,
) -> Result<BuildReport, GenerateError> {
    let renderer = Renderer {
        config,
        templates: &site.templates,
        ctx,
    };
    let mut manifest = SiteManifest::default();
    let mut summaries = Vec::with_capacity(site.groups.len());

    fs::create_dir_all(output_dir)?;

    for planned in &site.groups {
        fs::create_dir_all(output_dir.join(&planned.slug))?;

        let mut items = Vec::with_capacity(planned.item_slugs.len());
        for (row, item_slug) in planned.items() {
            let page = renderer.detail_page(row, &planned.group.name, &planned.slug, item_slug);
            write_page(output_dir, &page)?;
            items.push(ItemSummary {
                name: row.name().to_string(),
                path: page.path.clone(),
            });
            manifest.record(page.path);
        }

        let page = renderer.city_page(planned);
        write_page(output_dir, &page)?;
        summaries.push(GroupSummary {
            name: planned.group.name.clone(),
            path: page.path.clone(),
            items,
        });
        manifest.record(page.path);
    }

    let home = renderer.home_page(&site.groups);
    write_page(output_dir, &home)?;
    manifest.record(home.path);

    copy_assets(&root.join(ASSETS_DIR), &output_dir.join(ASSETS_DIR))?;

    write_file(&output_dir.join("robots.txt"), &robots_txt(config))?;
    write_file(
        &output_dir.join("sitemap.xml"),
        &sitemap_xml(config.base_url(), &manifest),
    )?;

    log::info!(
        "Wrote {} pages to {}",
        manifest.len(),
        output_dir.display()
    );

    Ok(BuildReport {
        manifest,
        groups: summaries,
        source: site.source.clone(),
        output_dir: output_dir.to_path_buf(),
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), GenerateError> {
    fs::write(path, contents).map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_page(output_dir: &Path, page: &Page) -> Result<(), GenerateError> {
    let path = output_dir.join(page.path.trim_start_matches('/'));
    log::debug!("Writing {}", path.display());
    write_file(&path, &page.html)
}

/// Copy the project's `assets/` tree verbatim.
fn copy_assets(src: &Path, dst: &Path) -> Result<(), GenerateError> {
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|source| GenerateError::Write {
                path: target.clone(),
                source,
            })?;
        }
    }
    Ok(())
}

// ============================================================================
// URL hygiene
// ============================================================================

/// Accept relative URLs and absolute `http`/`https` URLs; reject other schemes.
///
/// Returns `None` for blank input and for rejected values.
fn safe_url(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Url::parse(raw) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => Some(raw),
        Ok(u) => {
            log::warn!("Ignoring URL with {:?} scheme: {raw}", u.scheme());
            None
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => Some(raw),
        Err(e) => {
            log::warn!("Ignoring malformed URL {raw:?}: {e}");
            None
        }
    }
}

// ============================================================================
// Fragments
// ============================================================================

fn photo_img(src: Option<&str>, alt: &str) -> Markup {
    html! {
        @if let Some(src) = src {
            img src=(src) alt=(alt) loading="lazy";
        }
    }
}

fn count_label(n: usize) -> String {
    if n == 1 {
        "1 place".to_string()
    } else {
        format!("{n} places")
    }
}

/// Card on a city page, linking to the detail page in the same directory.
fn item_card(row: &Row, item_slug: &str) -> Markup {
    html! {
        a.card href={ "./" (item_slug) ".html" } {
            (photo_img(safe_url(row.photo_url()), row.name()))
            div.p {
                div.card-title { (row.name()) }
                div.meta { (row.address()) }
            }
        }
    }
}

/// Card on the home page, linking to the city index.
fn city_card(planned: &PlannedGroup) -> Markup {
    let photo = planned
        .group
        .rows
        .iter()
        .find_map(|row| safe_url(row.photo_url()));
    html! {
        a.card href={ "./" (planned.slug) "/index.html" } {
            (photo_img(photo, &planned.group.name))
            div.p {
                div.card-title { (planned.group.name) }
                div.meta { (count_label(planned.group.rows.len())) }
            }
        }
    }
}

/// Outbound search links; empty unless both tag and keywords are set.
fn affiliate_block(affiliate: &AffiliateConfig) -> Markup {
    if !affiliate.is_enabled() {
        return html! {};
    }
    let tag = affiliate.tag.trim();
    let links: Vec<(&str, Url)> = affiliate
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .filter_map(|k| {
            Url::parse_with_params(&affiliate.search_url, &[("k", k), ("tag", tag)])
                .ok()
                .map(|url| (k, url))
        })
        .collect();

    html! {
        div.aff {
            div.tag { "Useful suggestions" }
            @for (keyword, url) in &links {
                a href=(url.as_str()) rel="nofollow sponsored noopener" target="_blank" {
                    "See " (keyword)
                }
            }
        }
    }
}

fn join_cards(cards: impl Iterator<Item = Markup>) -> String {
    cards.map(Markup::into_string).collect::<Vec<_>>().join("\n")
}

// ============================================================================
// Page renderers
// ============================================================================

struct PageMeta {
    path: String,
    title: String,
    description: String,
    depth: usize,
}

struct Renderer<'a> {
    config: &'a SiteConfig,
    templates: &'a TemplateSet,
    ctx: &'a BuildContext,
}

impl Renderer<'_> {
    /// Bindings every template accepts.
    fn shared_vars(&self, depth: usize) -> Vars {
        Vars::new()
            .text("SITE_NAME", self.config.site_name.as_str())
            .text("BASE_PATH", base_path(depth))
    }

    /// Render `inner`, wrap it in the frame and produce the finished page.
    fn document(&self, inner: &Template, vars: Vars, meta: PageMeta) -> Page {
        let content = inner.render(&vars);
        let canonical = format!("{}{}", self.config.base_url(), meta.path);

        let frame_vars = self
            .shared_vars(meta.depth)
            .text("PAGE_TITLE", meta.title.as_str())
            .text("PAGE_DESC", meta.description.as_str())
            .text("CANONICAL", canonical.as_str())
            .text("YEAR", self.ctx.year.to_string())
            .text("LANG", self.config.language.as_str())
            .markup("CONTENT", content);
        let html = self.templates.frame.render(&frame_vars);

        Page {
            path: meta.path,
            title: meta.title,
            description: meta.description,
            canonical,
            depth: meta.depth,
            html,
        }
    }

    fn detail_page(&self, row: &Row, city: &str, city_slug: &str, item_slug: &str) -> Page {
        let niche = &self.config.niche;
        let name = row.name();
        let hours = row.hours();
        let features = row.features();
        let features_sentence = if features.is_empty() {
            DEFAULT_FEATURES.to_string()
        } else {
            features.join(", ")
        };
        let photo = safe_url(row.photo_url());

        let vars = self
            .shared_vars(1)
            .text("TYPE_LABEL", niche.type_label.as_str())
            .text("TYPE_LABEL_LOWER", niche.type_label.to_lowercase())
            .text("NAME", name)
            .text("CITY", city)
            .text("CITY_URL", format!("{}/{city_slug}/index.html", base_path(1)))
            .text("ADDRESS", row.address())
            .text("HOURS", if hours.is_empty() { DEFAULT_HOURS } else { hours })
            .text("FEATURES_SENTENCE", features_sentence)
            .markup("PHOTO", photo_img(photo, name).into_string())
            .text("PHOTO_URL", photo.unwrap_or(""))
            .text("WEBSITE_URL", safe_url(row.website_url()).unwrap_or("#"))
            .text("LAT", row.lat())
            .text("LON", row.lon())
            .markup("AFF_BLOCK", affiliate_block(&self.config.affiliate).into_string());

        let meta = PageMeta {
            path: format!("/{city_slug}/{item_slug}.html"),
            title: format!("{} in {city} – {name}", niche.type_label),
            description: format!(
                "{} {name} in {city}. Address: {}. Hours: {}.",
                niche.type_label,
                row.address(),
                if hours.is_empty() { "variable" } else { hours }
            ),
            depth: 1,
        };
        self.document(&self.templates.detail, vars, meta)
    }

    fn city_page(&self, planned: &PlannedGroup) -> Page {
        let niche = &self.config.niche;
        let city = planned.group.name.as_str();
        let count = planned.group.rows.len();
        let cards = join_cards(planned.items().map(|(row, slug)| item_card(row, slug)));

        let vars = self
            .shared_vars(1)
            .text("CITY", city)
            .text("COUNT", count.to_string())
            .markup("CARDS", cards)
            .text("TYPE_LABEL", niche.type_label.as_str())
            .text("PLURAL_LABEL", niche.plural_label.as_str());

        let meta = PageMeta {
            path: format!("/{}/index.html", planned.slug),
            title: format!("{} in {city}", niche.plural_label),
            description: format!("{} in {city}: {}.", niche.plural_label, count_label(count)),
            depth: 1,
        };
        self.document(&self.templates.city, vars, meta)
    }

    fn home_page(&self, groups: &[PlannedGroup]) -> Page {
        let niche = &self.config.niche;
        let cards = join_cards(groups.iter().map(city_card));

        let vars = self
            .shared_vars(0)
            .markup("CITY_CARDS", cards)
            .text("TYPE_LABEL", niche.type_label.as_str())
            .text("PLURAL_LABEL", niche.plural_label.as_str())
            .text("CITY_COUNT", groups.len().to_string());

        let meta = PageMeta {
            path: "/index.html".to_string(),
            title: self.config.site_name.clone(),
            description: format!("Directory of {}.", niche.plural_label),
            depth: 0,
        };
        self.document(&self.templates.home, vars, meta)
    }
}

// ============================================================================
// robots.txt / sitemap.xml
// ============================================================================

fn robots_txt(config: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml\n",
        config.base_url()
    )
}

fn sitemap_xml(base_url: &str, manifest: &SiteManifest) -> String {
    let urls: Vec<String> = manifest
        .pages()
        .iter()
        .map(|path| {
            format!(
                "<url><loc>{}</loc><changefreq>weekly</changefreq></url>",
                crate::template::escape_html(&format!("{base_url}{path}"))
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
         {}\n\
         </urlset>\n",
        urls.join("\n")
    )
}

// ============================================================================
// Tests
// ============================================================================
