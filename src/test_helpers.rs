//! Shared test utilities for the simple-places test suite.
//!
//! Fixture projects live under `fixtures/site/` (config, templates, assets,
//! dataset). Tests get an isolated temp copy they can mutate freely.
//!
//! ```rust
//! let tmp = setup_fixtures();
//! write_dataset(tmp.path(), "name,city\nCafe X,Paris\n");
//! let report = build(tmp.path());
//! assert_eq!(sitemap_locs(&read_output(&report.output_dir, "sitemap.xml")).len(), 3);
//! ```

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::{self, SiteConfig};
use crate::generate::{self, BuildContext, BuildReport};

/// Year used by every fixture build, so output is comparable across runs.
pub const FIXTURE_YEAR: i32 = 2024;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Replace the fixture's local dataset.
pub fn write_dataset(root: &Path, csv: &str) {
    std::fs::create_dir_all(root.join("data")).unwrap();
    std::fs::write(root.join("data/points.csv"), csv).unwrap();
}

/// Minimal valid config for render-level tests.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig {
        site_name: "Coffee Guide".into(),
        base_url: "https://example.com/".into(),
        ..SiteConfig::default()
    };
    config.niche.type_label = "Café".into();
    config.niche.plural_label = "Cafés".into();
    config
}

pub fn load_fixture_config(root: &Path) -> SiteConfig {
    config::load_config(root).unwrap()
}

/// Full build of the project at `root` into its configured output dir.
pub fn build(root: &Path) -> BuildReport {
    let config = load_fixture_config(root);
    let output = root.join(&config.build.output_dir);
    generate::generate(&config, root, &output, &BuildContext { year: FIXTURE_YEAR }).unwrap()
}

/// A URL on a local port nothing listens on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/points.csv")
}

// =========================================================================
// Output inspection
// =========================================================================

pub fn read_output(output_dir: &Path, rel: &str) -> String {
    std::fs::read_to_string(output_dir.join(rel))
        .unwrap_or_else(|e| panic!("cannot read {rel} in {}: {e}", output_dir.display()))
}

/// Every file under `output_dir` as relative path → bytes.
pub fn snapshot(output_dir: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(output_dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(output_dir).unwrap();
            (
                rel.to_string_lossy().replace('\\', "/"),
                std::fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

/// Sorted relative paths of the generated `.html` pages.
pub fn output_pages(output_dir: &Path) -> Vec<String> {
    snapshot(output_dir)
        .into_keys()
        .filter(|p| p.ends_with(".html"))
        .collect()
}

/// The `<loc>` values of a sitemap, in document order.
pub fn sitemap_locs(xml: &str) -> Vec<String> {
    xml.split("<loc>")
        .skip(1)
        .filter_map(|chunk| chunk.split_once("</loc>"))
        .map(|(loc, _)| loc.to_string())
        .collect()
}
