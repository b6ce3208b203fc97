// src/pipeline/asset.rs

//! In-memory asset sets and rename maps.

use std::collections::BTreeMap;
use std::path::Path;

/// Ordered collection of `(relative path, bytes)` records.
///
/// Keys are relative to the tree the set was loaded from and always use
/// forward slashes, so they can be matched against globs and against
/// references inside markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSet {
    files: BTreeMap<String, Vec<u8>>,
}

impl AssetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rel_path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(rel_path.into(), contents.into());
    }

    pub fn get(&self, rel_path: &str) -> Option<&[u8]> {
        self.files.get(rel_path).map(Vec::as_slice)
    }

    pub fn contains(&self, rel_path: &str) -> bool {
        self.files.contains_key(rel_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Relative paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl IntoIterator for AssetSet {
    type Item = (String, Vec<u8>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<(String, Vec<u8>)> for AssetSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// Original relative path -> fingerprinted relative path, for one build
/// pass. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMap {
    entries: BTreeMap<String, String>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, original: impl Into<String>, renamed: impl Into<String>) {
        self.entries.insert(original.into(), renamed.into());
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fold another map into this one. Entries of `other` win.
    pub fn extend(&mut self, other: RenameMap) {
        self.entries.extend(other.entries);
    }
}

/// Lowercased extension of a slash-separated relative path.
pub fn extension_of(rel_path: &str) -> Option<String> {
    Path::new(rel_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether `rel_path` has one of `extensions` (compared case-insensitively,
/// leading dots ignored).
pub fn has_extension(rel_path: &str, extensions: &[String]) -> bool {
    let Some(ext) = extension_of(rel_path) else {
        return false;
    };
    extensions
        .iter()
        .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}
