//! Series identity: metric name plus a canonical label set.
//!
//! Labels arrive as an unordered list of key/value pairs. They are sorted by
//! key (a repeated key keeps its last value) so that `{a="1",b="2"}` and
//! `{b="2",a="1"}` address the same series.

use std::collections::BTreeMap;
use std::fmt;

/// Identity of one time series.
///
/// Ordering is by name, then by sorted labels, so the label-less base series
/// of a metric always sorts first among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    name: String,
    labels: Vec<(String, String)>,
}

impl SeriesKey {
    /// Build a key from a name and labels in any order.
    pub fn new(name: &str, labels: &[(&str, &str)]) -> Self {
        let sorted: BTreeMap<&str, &str> = labels.iter().copied().collect();
        Self {
            name: name.to_string(),
            labels: sorted
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Key of the label-less base series.
    pub fn base(name: &str) -> Self {
        Self {
            name: name.to_string(),
            labels: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &[(String, String)] {
        &self.labels
    }

    pub fn is_base(&self) -> bool {
        self.labels.is_empty()
    }

    /// `k1="v1",k2="v2"` with values escaped for the exposition format.
    pub fn render_labels(&self) -> String {
        render_pairs(self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Label block including braces, with an extra trailing pair (used for
    /// `le` on histogram buckets).
    pub fn render_labels_with(&self, key: &str, value: &str) -> String {
        let pairs = self
            .labels
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once((key, value)));
        format!("{{{}}}", render_pairs(pairs))
    }

    /// Label block including braces, or nothing for the base series.
    pub fn label_block(&self) -> String {
        if self.is_base() {
            String::new()
        } else {
            format!("{{{}}}", self.render_labels())
        }
    }
}

/// The canonical lookup key: `name` or `name{k1="v1",k2="v2"}`.
impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.label_block())
    }
}

fn render_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Escape backslash, double quote and newline.
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_order_is_irrelevant() {
        let a = SeriesKey::new("requests", &[("a", "1"), ("b", "2")]);
        let b = SeriesKey::new("requests", &[("b", "2"), ("a", "1")]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), r#"requests{a="1",b="2"}"#);
    }

    #[test]
    fn test_base_key_has_no_braces() {
        let key = SeriesKey::new("requests", &[]);
        assert!(key.is_base());
        assert_eq!(key, SeriesKey::base("requests"));
        assert_eq!(key.to_string(), "requests");
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let key = SeriesKey::new("m", &[("route", "/a"), ("route", "/b")]);
        assert_eq!(key.to_string(), r#"m{route="/b"}"#);
    }

    #[test]
    fn test_values_are_escaped() {
        let key = SeriesKey::new("m", &[("path", "C:\\tmp \"x\"\n")]);
        assert_eq!(key.render_labels(), r#"path="C:\\tmp \"x\"\n""#);
    }

    #[test]
    fn test_render_with_le() {
        let key = SeriesKey::new("latency", &[("route", "/pay")]);
        assert_eq!(
            key.render_labels_with("le", "+Inf"),
            r#"{route="/pay",le="+Inf"}"#
        );
        assert_eq!(
            SeriesKey::base("latency").render_labels_with("le", "10"),
            r#"{le="10"}"#
        );
    }

    #[test]
    fn test_base_sorts_first() {
        let mut keys = vec![
            SeriesKey::new("latency", &[("route", "/a")]),
            SeriesKey::base("latency"),
            SeriesKey::base("errors"),
        ];
        keys.sort();
        assert_eq!(keys[0], SeriesKey::base("errors"));
        assert_eq!(keys[1], SeriesKey::base("latency"));
    }
}
