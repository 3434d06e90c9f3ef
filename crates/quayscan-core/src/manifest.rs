//! Shipping manifest parsing.

use std::sync::OnceLock;

use regex::Regex;

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

/// Extract the declared weight from each free-text manifest.
///
/// The last digit group in the string is taken as the declared weight in kg;
/// manifests with no digits declare 0.0.
pub fn declared_weights(manifests: &[String]) -> Vec<f64> {
    manifests
        .iter()
        .map(|m| {
            digits_re()
                .find_iter(m)
                .last()
                .and_then(|g| g.as_str().parse::<f64>().ok())
                .unwrap_or(0.0)
        })
        .collect()
}
