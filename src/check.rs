use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::html::{self, DOMElement};
use crate::selector;

/// Parse `html_text` and evaluate every selector in the check-list file
/// against it, returning a map from selector to presence.
pub fn check_document(html_text: &str, checks_path: &Path) -> Result<BTreeMap<String, bool>> {
    let (_, dom) = html::document(html_text).map_err(|e| anyhow!("could not parse HTML: {}", e))?;
    let mut checks = load_checks(checks_path)?;
    checks.sort();
    run_checks(&dom, &checks)
}

/// Read and decode the check-list file, a JSON array of selector strings
pub fn load_checks(path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let checks: Vec<String> = serde_json::from_str(&data)
        .with_context(|| format!("{} is not a valid check list", path.display()))?;
    debug!("Loaded {} checks from {}", checks.len(), path.display());
    Ok(checks)
}

/// Evaluate each check against the document tree. Every check gets exactly
/// one entry; a selector with no matching element maps to `false`.
pub fn run_checks(dom: &DOMElement, checks: &[String]) -> Result<BTreeMap<String, bool>> {
    let mut results = BTreeMap::new();
    for check in checks {
        let selector = selector::parse(check)
            .map_err(|e| anyhow!("invalid selector {:?}: {}", check, e))?;
        let present = selector.matches_in(dom);
        debug!("{:?} present: {}", check, present);
        results.insert(check.clone(), present);
    }
    Ok(results)
}

#[cfg(test)]
fn parse_document(input: &str) -> DOMElement {
    html::document(input).unwrap().1
}

#[cfg(test)]
#[test]
fn test_present_and_missing() {
    let dom = parse_document("<html><body><h1>Hi</h1></body></html>");
    let checks = ["h1".to_string(), "h2".to_string()];
    let results = run_checks(&dom, &checks).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results.get("h1"), Some(&true));
    assert_eq!(results.get("h2"), Some(&false));
}

#[cfg(test)]
#[test]
fn test_uppercase_document() {
    let dom = parse_document("<HTML><BODY><H1>Hi</H1></BODY></HTML>");
    let checks = ["h1".to_string()];
    let results = run_checks(&dom, &checks).unwrap();
    assert_eq!(results.get("h1"), Some(&true));
}

#[cfg(test)]
#[test]
fn test_empty_check_list() {
    let dom = parse_document("<html><body></body></html>");
    let results = run_checks(&dom, &[]).unwrap();
    assert!(results.is_empty());
}

#[cfg(test)]
#[test]
fn test_run_checks_idempotent() {
    let dom = parse_document(
        r#"<html><body><div id=banner class="wide dark"><a href="/x">x</a></div></body></html>"#,
    );
    let checks = [
        "#banner".to_string(),
        "a[href]".to_string(),
        "div.wide".to_string(),
        "h2".to_string(),
    ];
    let first = run_checks(&dom, &checks).unwrap();
    let second = run_checks(&dom, &checks).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.get("#banner"), Some(&true));
    assert_eq!(first.get("a[href]"), Some(&true));
    assert_eq!(first.get("div.wide"), Some(&true));
    assert_eq!(first.get("h2"), Some(&false));
}

#[cfg(test)]
#[test]
fn test_invalid_selector_is_reported() {
    let dom = parse_document("<html></html>");
    let checks = ["div >".to_string()];
    let err = run_checks(&dom, &checks).unwrap_err();
    assert!(err.to_string().contains("invalid selector"));
}

#[cfg(test)]
#[test]
fn test_load_checks() {
    let path = std::env::temp_dir().join("gradah-test-checks.json");
    std::fs::write(&path, r#"["h1", "a[href]"]"#).unwrap();
    assert_eq!(
        load_checks(&path).unwrap(),
        vec!["h1".to_string(), "a[href]".to_string()]
    );
}

#[cfg(test)]
#[test]
fn test_load_checks_malformed() {
    let path = std::env::temp_dir().join("gradah-test-checks-malformed.json");
    std::fs::write(&path, "not json").unwrap();
    let err = load_checks(&path).unwrap_err();
    assert!(err.to_string().contains("not a valid check list"));
}

#[cfg(test)]
#[test]
fn test_check_document() {
    let path = std::env::temp_dir().join("gradah-test-check-document.json");
    std::fs::write(&path, r#"["h2", "h1"]"#).unwrap();
    let results = check_document("<html><body><h1>Hi</h1></body></html>", &path).unwrap();
    let expected = BTreeMap::from([("h1".to_string(), true), ("h2".to_string(), false)]);
    assert_eq!(results, expected);
}
