//! # Simple Places
//!
//! A minimal static site generator for points-of-interest directories.
//! A CSV of places (name, city, address, hours, features, coordinates)
//! becomes a home page, one index page per city, one detail page per place,
//! plus `robots.txt` and `sitemap.xml`.
//!
//! # Pipeline
//!
//! ```text
//! 1. Load      data/points.csv (or remote CSV)  →  rows
//! 2. Group     rows                             →  cities, sorted
//! 3. Plan      cities                           →  slugs assigned
//! 4. Write     templates + plan                 →  dist/
//! ```
//!
//! Stages 1–3 only read; a missing template or asset fails the run before
//! the output directory is touched.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` / `config.json` loading and validation |
//! | [`dataset`] | Remote fetch with local fallback, CSV parsing, name filter |
//! | [`group`] | Partition rows by city, deterministic ordering |
//! | [`naming`] | `slugify`: display names → URL segments |
//! | [`template`] | Compiled single-pass `{{TOKEN}}` templates |
//! | [`generate`] | Page rendering, slug collisions, assets, robots/sitemap |
//! | [`types`] | `Row`, `Group`, `Page`, `SiteManifest` |
//! | [`output`] | CLI output formatting |
//!
//! # Project Layout
//!
//! ```text
//! my-site/
//! ├── config.toml
//! ├── templates/
//! │   ├── base.html     # page frame
//! │   ├── index.html    # home body
//! │   ├── city.html     # city index body
//! │   └── page.html     # detail body
//! ├── assets/
//! │   └── style.css     # copied verbatim
//! └── data/
//!     └── points.csv
//! ```
//!
//! # Design Decisions
//!
//! ## Text Templates, Maud Fragments
//!
//! Page templates are plain files the site owner edits, so they stay text
//! with `{{TOKEN}}` placeholders. The repeated fragments the generator builds
//! itself (cards, image tags, affiliate links) are written with
//! [Maud](https://maud.lambda.xyz/), which escapes every interpolation.
//!
//! ## Full Rebuilds
//!
//! Every run regenerates every page. The site is small, the dataset is the
//! source of truth, and there is no state to get out of sync.

pub mod config;
pub mod dataset;
pub mod generate;
pub mod group;
pub mod naming;
pub mod output;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
