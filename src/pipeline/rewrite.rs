// src/pipeline/rewrite.rs

//! Rewriting references to fingerprinted files inside text assets.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::model::FingerprintSection;
use crate::pipeline::asset::{has_extension, AssetSet, RenameMap};

#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Extensions of the files whose contents are scanned.
    pub extensions: Vec<String>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self::from(&FingerprintSection::default())
    }
}

impl From<&FingerprintSection> for RewriteOptions {
    fn from(section: &FingerprintSection) -> Self {
        Self {
            extensions: section.rewrite_extensions.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub replacements: usize,
}

/// Replace every reference to a renamed file in the text assets of `assets`.
///
/// A reference is an occurrence of the original relative path that is
/// neither preceded nor followed by a filename character, so `app.js` does
/// not match inside `myapp.js` or `app.json`. Inside `js/index.html` a file
/// below `js/` may also be referenced relative to that folder (`main.js`,
/// `./main.js`, `lib/util.js`); such a reference is rewritten to the renamed
/// path relative to the same folder. Longer originals are preferred when
/// several start at the same position. Non-UTF-8 files are left alone.
pub fn rewrite_references(
    assets: AssetSet,
    renames: &RenameMap,
    options: &RewriteOptions,
) -> (AssetSet, RewriteStats) {
    let mut stats = RewriteStats::default();
    if renames.is_empty() {
        return (assets, stats);
    }

    let mut matchers: BTreeMap<String, Option<ReferenceMatcher>> = BTreeMap::new();

    let rewritten = assets
        .into_iter()
        .map(|(rel, contents)| {
            if !has_extension(&rel, &options.extensions) {
                return (rel, contents);
            }
            let text = match String::from_utf8(contents) {
                Ok(text) => text,
                Err(err) => {
                    debug!(file = %rel, "not valid UTF-8; skipping reference rewrite");
                    return (rel, err.into_bytes());
                }
            };

            let folder = parent_folder(&rel);
            let matcher = matchers
                .entry(folder.to_string())
                .or_insert_with(|| ReferenceMatcher::new(renames, folder));
            let Some(matcher) = matcher else {
                return (rel, text.into_bytes());
            };

            stats.files_scanned += 1;
            let (new_text, count) = matcher.replace_all(&text);
            if count > 0 {
                debug!(file = %rel, replacements = count, "rewrote references");
                stats.files_changed += 1;
                stats.replacements += count;
                (rel, new_text.into_bytes())
            } else {
                (rel, text.into_bytes())
            }
        })
        .collect();

    (rewritten, stats)
}

/// `js/app/main.js` -> `js/app`, `index.html` -> ``.
fn parent_folder(rel: &str) -> &str {
    rel.rsplit_once('/').map_or("", |(folder, _)| folder)
}

#[derive(Debug)]
struct Candidate {
    original: String,
    renamed: String,
    /// Written relative to the scanned file's folder.
    relative: bool,
}

struct ReferenceMatcher {
    regex: Regex,
    /// Longest original first; at equal originals, folder-relative first.
    candidates: Vec<Candidate>,
}

impl ReferenceMatcher {
    fn new(renames: &RenameMap, folder: &str) -> Option<Self> {
        let mut candidates: Vec<Candidate> = renames
            .iter()
            .map(|(orig, renamed)| Candidate {
                original: orig.to_string(),
                renamed: renamed.to_string(),
                relative: false,
            })
            .collect();

        if !folder.is_empty() {
            let prefix = format!("{folder}/");
            candidates.extend(renames.iter().filter_map(|(orig, renamed)| {
                Some(Candidate {
                    original: orig.strip_prefix(&prefix)?.to_string(),
                    renamed: renamed.strip_prefix(&prefix)?.to_string(),
                    relative: true,
                })
            }));
        }

        candidates.sort_by(|a, b| {
            b.original
                .len()
                .cmp(&a.original.len())
                .then_with(|| a.original.cmp(&b.original))
                .then_with(|| b.relative.cmp(&a.relative))
        });

        let pattern = candidates
            .iter()
            .map(|c| regex::escape(&c.original))
            .collect::<Vec<_>>()
            .join("|");

        match Regex::new(&pattern) {
            Ok(regex) => Some(Self { regex, candidates }),
            Err(err) => {
                warn!(error = %err, "could not compile reference matcher; skipping rewrite");
                None
            }
        }
    }

    fn replace_all(&self, text: &str) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut copied_to = 0;
        let mut pos = 0;
        let mut count = 0;

        while let Some(m) = self.regex.find_at(text, pos) {
            let start = m.start();
            match self.accepted_at(text, start) {
                Some(candidate) => {
                    out.push_str(&text[copied_to..start]);
                    out.push_str(&candidate.renamed);
                    copied_to = start + candidate.original.len();
                    pos = copied_to;
                    count += 1;
                }
                None => {
                    pos = start + text[start..].chars().next().map_or(1, char::len_utf8);
                }
            }
            if pos >= text.len() {
                break;
            }
        }

        out.push_str(&text[copied_to..]);
        (out, count)
    }

    fn accepted_at(&self, text: &str, start: usize) -> Option<&Candidate> {
        let before = &text[..start];
        if before.chars().next_back().is_some_and(is_filename_char) {
            return None;
        }
        let rest = &text[start..];
        self.candidates.iter().find(|c| {
            rest.starts_with(c.original.as_str())
                && ends_reference(&rest[c.original.len()..])
                && (!c.relative || starts_relative_reference(before))
        })
    }
}

/// A folder-relative reference is either bare or starts with `./`; any
/// other slash in front means it points into a different folder.
fn starts_relative_reference(before: &str) -> bool {
    match before.strip_suffix('/') {
        None => true,
        Some(rest) => rest.strip_suffix('.').is_some_and(|rest| {
            !rest
                .chars()
                .next_back()
                .is_some_and(|c| is_filename_char(c) || c == '/')
        }),
    }
}

fn is_filename_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// The text following a candidate must not continue the filename. A dot
/// not followed by an alphanumeric (end of a sentence) is allowed.
fn ends_reference(after: &str) -> bool {
    let mut chars = after.chars();
    match chars.next() {
        None => true,
        Some('.') => !chars.next().is_some_and(|c| c.is_ascii_alphanumeric()),
        Some(c) => !(c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    }
}
