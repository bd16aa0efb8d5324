//! Partitioning rows into city groups.

use crate::types::{Group, Row};
use std::collections::HashMap;

/// Group rows by their `city` column.
///
/// Rows with a blank city land in `unknown_city`. Each group keeps its rows
/// in input order. Groups come back sorted case-insensitively by name (ties
/// broken by the raw name), so the output tree and sitemap are stable from
/// run to run.
pub fn group_by_city(rows: Vec<Row>, unknown_city: &str) -> Vec<Group> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for row in rows {
        let city = match row.city() {
            "" => unknown_city.to_string(),
            c => c.to_string(),
        };
        match index.get(&city) {
            Some(&i) => groups[i].rows.push(row),
            None => {
                index.insert(city.clone(), groups.len());
                groups.push(Group {
                    name: city,
                    rows: vec![row],
                });
            }
        }
    }

    groups.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    groups
}
