//! CLI output formatting for build and check runs.
//!
//! Output is information-first: every city and item leads with its
//! positional index and display name, with the generated path after an arrow.
//!
//! ```text
//! Source: data/points.csv
//! Home → index.html
//! 001 Lyon (1 item) → lyon/index.html
//!     001 Spot Z → lyon/spot-z.html
//! 002 Paris (2 items) → paris/index.html
//!     001 Cafe X → paris/cafe-x.html
//!     002 Bar Y → paris/bar-y.html
//!
//! Generated 2 cities, 3 item pages, 6 pages total
//! ```
//!
//! Each `format_*` function is pure and returns lines; the `print_*`
//! wrappers write them to stdout.

use crate::generate::{BuildReport, SitePlan};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn items_label(n: usize) -> String {
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{n} items")
    }
}

fn rel(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Lines describing a finished build.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![
        format!("Source: {}", report.source),
        "Home → index.html".to_string(),
    ];

    let mut item_pages = 0;
    for (i, group) in report.groups.iter().enumerate() {
        lines.push(format!(
            "{} {} ({}) → {}",
            format_index(i + 1),
            group.name,
            items_label(group.items.len()),
            rel(&group.path)
        ));
        for (j, item) in group.items.iter().enumerate() {
            lines.push(format!(
                "    {} {} → {}",
                format_index(j + 1),
                item.name,
                rel(&item.path)
            ));
        }
        item_pages += group.items.len();
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} cities, {} item pages, {} pages total",
        report.groups.len(),
        item_pages,
        report.manifest.len()
    ));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

/// Lines describing a validated, unwritten site.
pub fn format_check_output(site: &SitePlan) -> Vec<String> {
    let mut lines = vec![format!("Source: {}", site.source)];
    for (i, planned) in site.groups.iter().enumerate() {
        lines.push(format!(
            "{} {} ({}) → {}/",
            format_index(i + 1),
            planned.group.name,
            items_label(planned.group.rows.len()),
            planned.slug
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "{} rows in {} cities",
        site.row_count(),
        site.groups.len()
    ));
    lines
}

pub fn print_check_output(site: &SitePlan) {
    for line in format_check_output(site) {
        println!("{}", line);
    }
}
