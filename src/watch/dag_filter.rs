// src/watch/dag_filter.rs

//! DAG-aware filtering of watch matches.

use std::collections::{HashMap, HashSet};

/// Whether `task` has a transitive ancestor (via `after`) in `matching`.
pub fn has_ancestor_in_matching(
    task: &str,
    matching: &HashSet<String>,
    dep_map: &HashMap<String, Vec<String>>,
) -> bool {
    let mut stack: Vec<&str> = dep_map
        .get(task)
        .map(|deps| deps.iter().map(String::as_str).collect())
        .unwrap_or_default();
    let mut visited: HashSet<&str> = HashSet::new();

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        if matching.contains(current) {
            return true;
        }
        if let Some(parents) = dep_map.get(current) {
            stack.extend(parents.iter().map(String::as_str));
        }
    }

    false
}

/// Keep only the matched tasks none of whose ancestors also matched.
/// Triggering those is enough: the scheduler pulls in their dependents.
pub fn root_matches<'a>(
    matching: &[&'a str],
    dep_map: &HashMap<String, Vec<String>>,
) -> Vec<&'a str> {
    let names: HashSet<String> = matching.iter().map(|s| s.to_string()).collect();
    matching
        .iter()
        .copied()
        .filter(|name| !has_ancestor_in_matching(name, &names, dep_map))
        .collect()
}
