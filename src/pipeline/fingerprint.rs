// src/pipeline/fingerprint.rs

//! Content-hash fingerprinting of asset filenames.

use tracing::debug;

use crate::config::model::FingerprintSection;
use crate::pipeline::asset::{has_extension, AssetSet, RenameMap};

/// Longest token a BLAKE3 hex digest can provide.
pub const MAX_TOKEN_LENGTH: usize = 64;

#[derive(Debug, Clone)]
pub struct FingerprintOptions {
    /// Extensions (case-insensitive, no dot) of the files to rename.
    pub extensions: Vec<String>,
    /// Hex characters of the digest kept in the new name.
    pub token_length: usize,
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self::from(&FingerprintSection::default())
    }
}

impl From<&FingerprintSection> for FingerprintOptions {
    fn from(section: &FingerprintSection) -> Self {
        Self {
            extensions: section.extensions.clone(),
            token_length: section.token_length,
        }
    }
}

/// Hex token derived from `contents`, `len` characters long (clamped to
/// `1..=64`).
pub fn content_token(contents: &[u8], len: usize) -> String {
    let len = len.clamp(1, MAX_TOKEN_LENGTH);
    let hex = blake3::hash(contents).to_hex();
    hex.as_str()[..len].to_string()
}

/// `dir/name.ext` -> `dir/name-<token>.ext`.
pub fn fingerprinted_name(rel_path: &str, token: &str) -> String {
    let (dir, file) = match rel_path.rfind('/') {
        Some(idx) => (&rel_path[..=idx], &rel_path[idx + 1..]),
        None => ("", rel_path),
    };

    match file.rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, ext) = file.split_at(dot);
            format!("{dir}{stem}-{token}{ext}")
        }
        _ => format!("{dir}{file}-{token}"),
    }
}

/// Whether the file stem of `rel_path` already ends in `-<token>`.
fn carries_token(rel_path: &str, token: &str) -> bool {
    let file = rel_path.rsplit_once('/').map_or(rel_path, |(_, file)| file);
    let stem = match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    };
    stem.strip_suffix(token).is_some_and(|rest| rest.ends_with('-'))
}

/// Rename every matching asset to embed its content token.
///
/// Pure: the returned set holds the renamed files plus everything that did
/// not match, and the map records each rename. A file whose name already
/// carries the token of its current contents is kept as is, so running the
/// step again over an output tree changes nothing.
pub fn fingerprint(assets: AssetSet, options: &FingerprintOptions) -> (AssetSet, RenameMap) {
    let mut renames = RenameMap::new();
    let mut out = AssetSet::new();

    for (rel, contents) in assets {
        if !has_extension(&rel, &options.extensions) {
            out.insert(rel, contents);
            continue;
        }

        let token = content_token(&contents, options.token_length);
        if carries_token(&rel, &token) {
            debug!(file = %rel, "already fingerprinted");
            out.insert(rel, contents);
            continue;
        }
        let renamed = fingerprinted_name(&rel, &token);
        debug!(from = %rel, to = %renamed, "fingerprinted asset");

        renames.insert(rel, renamed.clone());
        out.insert(renamed, contents);
    }

    (out, renames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_token_checks_the_stem_suffix() {
        assert!(carries_token("js/app-abc.js", "abc"));
        assert!(carries_token("LICENSE-abc", "abc"));
        assert!(!carries_token("js/app.js", "abc"));
        assert!(!carries_token("js/appabc.js", "abc"));
        assert!(!carries_token("js-abc/app.js", "abc"));
    }
}
