// tests/fingerprint_rewrite.rs

use assetdag::pipeline::fingerprint::{content_token, fingerprinted_name};
use assetdag::pipeline::{
    fingerprint, rewrite_references, AssetSet, FingerprintOptions, RenameMap, RewriteOptions,
};
use proptest::prelude::*;

fn assets(files: &[(&str, &str)]) -> AssetSet {
    files
        .iter()
        .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()))
        .collect()
}

fn text<'a>(set: &'a AssetSet, path: &str) -> &'a str {
    std::str::from_utf8(set.get(path).unwrap()).unwrap()
}

#[test]
fn fingerprint_renames_scripts_and_styles_only() {
    let input = assets(&[
        ("js/app.js", "console.log('hi');"),
        ("css/site.CSS", "body{}"),
        ("index.html", "<html></html>"),
        ("img/logo.png", "\u{89}PNG"),
    ]);

    let (out, renames) = fingerprint(input, &FingerprintOptions::default());

    let token = content_token(b"console.log('hi');", 10);
    assert_eq!(token.len(), 10);
    assert_eq!(renames.get("js/app.js"), Some(format!("js/app-{token}.js").as_str()));
    assert!(out.contains(&format!("js/app-{token}.js")));
    assert!(!out.contains("js/app.js"));

    let css = renames.get("css/site.CSS").unwrap();
    assert!(css.starts_with("css/site-") && css.ends_with(".CSS"));

    assert!(out.contains("index.html"));
    assert!(out.contains("img/logo.png"));
    assert_eq!(renames.len(), 2);
    assert_eq!(out.len(), 4);
}

#[test]
fn token_changes_with_content_and_respects_length() {
    let a = content_token(b"one", 10);
    let b = content_token(b"two", 10);
    assert_ne!(a, b);
    assert_eq!(content_token(b"one", 10), a);
    assert_eq!(content_token(b"one", 64).len(), 64);
    assert!(content_token(b"one", 64).starts_with(&a));
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn fingerprinted_name_keeps_directory_and_extension() {
    assert_eq!(fingerprinted_name("app.js", "abc"), "app-abc.js");
    assert_eq!(fingerprinted_name("a/b/vendor.min.js", "abc"), "a/b/vendor.min-abc.js");
}

#[test]
fn rewrite_updates_markup_references() {
    let mut renames = RenameMap::new();
    renames.insert("app.js", "app-0123456789.js");
    renames.insert("css/site.css", "css/site-abcdef0123.css");

    let input = assets(&[
        (
            "index.html",
            r#"<link href="css/site.css"><script src="/app.js"></script><script src="myapp.js"></script>"#,
        ),
        ("notes.txt", "see app.js"),
    ]);

    let (out, stats) = rewrite_references(input, &renames, &RewriteOptions::default());

    assert_eq!(
        text(&out, "index.html"),
        r#"<link href="css/site-abcdef0123.css"><script src="/app-0123456789.js"></script><script src="myapp.js"></script>"#
    );
    // Not a rewrite extension.
    assert_eq!(text(&out, "notes.txt"), "see app.js");
    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.files_changed, 1);
    assert_eq!(stats.replacements, 2);
}

#[test]
fn rewrite_prefers_longest_original() {
    let mut renames = RenameMap::new();
    renames.insert("app.js", "app-111.js");
    renames.insert("lib/app.js", "lib/app-222.js");

    let input = assets(&[("index.html", r#"<script src="lib/app.js"></script> app.js"#)]);
    let (out, _) = rewrite_references(input, &renames, &RewriteOptions::default());

    assert_eq!(
        text(&out, "index.html"),
        r#"<script src="lib/app-222.js"></script> app-111.js"#
    );
}

#[test]
fn rewrite_resolves_references_relative_to_the_file_folder() {
    let mut renames = RenameMap::new();
    renames.insert("js/main.js", "js/main-aaa.js");
    renames.insert("js/util.js", "js/util-bbb.js");
    renames.insert("js/lib/x.js", "js/lib/x-ccc.js");

    let input = assets(&[
        (
            "js/index.html",
            r#"<script src="main.js"></script><script src="./util.js"></script><script src="lib/x.js"></script><script src="../main.js"></script><script src="vendor/main.js"></script>"#,
        ),
        ("js/main-aaa.js", "import './util.js'; import '/js/util.js';"),
        ("index.html", r#"<script src="js/main.js"></script><script src="main.js"></script>"#),
    ]);

    let (out, stats) = rewrite_references(input, &renames, &RewriteOptions::default());

    assert_eq!(
        text(&out, "js/index.html"),
        r#"<script src="main-aaa.js"></script><script src="./util-bbb.js"></script><script src="lib/x-ccc.js"></script><script src="../main.js"></script><script src="vendor/main.js"></script>"#
    );
    assert_eq!(
        text(&out, "js/main-aaa.js"),
        "import './util-bbb.js'; import '/js/util-bbb.js';"
    );
    // At the root, a bare `main.js` is a different file.
    assert_eq!(
        text(&out, "index.html"),
        r#"<script src="js/main-aaa.js"></script><script src="main.js"></script>"#
    );
    assert_eq!(stats.replacements, 6);
}

#[test]
fn rewrite_ignores_longer_filenames_and_binary_files() {
    let mut renames = RenameMap::new();
    renames.insert("app.js", "app-111.js");

    let mut input = assets(&[("main.js", "import 'app.json'; import 'app.js'.")]);
    input.insert("broken.html", vec![0xff, 0xfe, b'a', b'p', b'p']);

    let (out, stats) = rewrite_references(input, &renames, &RewriteOptions::default());

    assert_eq!(text(&out, "main.js"), "import 'app.json'; import 'app-111.js'.");
    assert_eq!(out.get("broken.html").unwrap(), &[0xff, 0xfe, b'a', b'p', b'p']);
    assert_eq!(stats.files_scanned, 1);
}

#[test]
fn empty_rename_map_is_a_no_op() {
    let input = assets(&[("index.html", "<script src=\"app.js\"></script>")]);
    let (out, stats) = rewrite_references(input.clone(), &RenameMap::new(), &RewriteOptions::default());
    assert_eq!(out, input);
    assert_eq!(stats.replacements, 0);
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(contents in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut set = AssetSet::new();
        set.insert("bundle.js", contents.clone());
        let (a, ra) = fingerprint(set.clone(), &FingerprintOptions::default());
        let (b, rb) = fingerprint(set, &FingerprintOptions::default());
        prop_assert_eq!(a, b);
        prop_assert_eq!(ra, rb);
    }

    #[test]
    fn rewrite_without_references_leaves_text_alone(body in "[a-z <>=\"/]{0,80}") {
        let mut renames = RenameMap::new();
        renames.insert("app.js", "app-0123456789.js");
        let mut set = AssetSet::new();
        set.insert("index.html", body.clone().into_bytes());

        let (out, _) = rewrite_references(set, &renames, &RewriteOptions::default());
        prop_assert_eq!(out.get("index.html").unwrap(), body.as_bytes());
    }
}
