//! Text interpolation.
//!
//! A [`Template`] is text split into literal runs and bindings. Every
//! occurrence of a marker is its own binding, duplicates included. An opening
//! delimiter without a closing one is literal text.

use crate::config::Delimiters;
use crate::error::Result;
use crate::reactive::{Collector, Path, Value};

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Literal(String),
    Binding(Path),
}

/// Parsed interpolation text.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    parts: Vec<Part>,
}

/// Whether `text` contains at least one complete marker with a path inside.
pub fn contains_binding(text: &str, delimiters: &Delimiters, trim: bool) -> bool {
    next_marker(text, delimiters, trim).is_some()
}

struct Marker<'a> {
    /// Byte offset of the opening delimiter.
    open: usize,
    /// Byte offset just past the closing delimiter.
    end: usize,
    path: &'a str,
}

/// Locate the first marker whose capture is not empty. Empty markers such as
/// `{{}}` are skipped and stay literal text.
fn next_marker<'a>(text: &'a str, delimiters: &Delimiters, trim: bool) -> Option<Marker<'a>> {
    if delimiters.open.is_empty() || delimiters.close.is_empty() {
        return None;
    }
    let mut from = 0;
    loop {
        let open = text[from..].find(&delimiters.open)? + from;
        let inner = open + delimiters.open.len();
        let close = text[inner..].find(&delimiters.close)? + inner;
        let end = close + delimiters.close.len();
        let captured = &text[inner..close];
        let path = if trim { captured.trim() } else { captured };
        if !path.is_empty() {
            return Some(Marker { open, end, path });
        }
        from = end;
    }
}

impl Template {
    /// Split `text` into literals and bindings.
    ///
    /// With `trim` set, whitespace around each captured path is removed.
    /// Without it the capture is used verbatim.
    pub fn parse(text: &str, delimiters: &Delimiters, trim: bool) -> Result<Self> {
        let mut parts = Vec::new();
        let mut rest = text;

        while let Some(Marker { open, end, path }) = next_marker(rest, delimiters, trim) {
            if open > 0 {
                parts.push(Part::Literal(rest[..open].to_string()));
            }
            parts.push(Part::Binding(Path::parse(path)?));
            rest = &rest[end..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }

        Ok(Self { parts })
    }

    /// One path per marker occurrence, in text order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.parts.iter().filter_map(|part| match part {
            Part::Binding(path) => Some(path),
            Part::Literal(_) => None,
        })
    }

    /// Substitute every marker with the current value at its path.
    ///
    /// Reads do not subscribe anything.
    pub fn render(&self, model: &Value) -> Result<String> {
        Collector::untracked(|| {
            let mut out = String::new();
            for part in &self.parts {
                match part {
                    Part::Literal(text) => out.push_str(text),
                    Part::Binding(path) => out.push_str(&path.resolve(model)?.to_string()),
                }
            }
            Ok(out)
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::reactive::observe;

    fn delims() -> Delimiters {
        Delimiters::default()
    }

    fn paths(template: &Template) -> Vec<&str> {
        template.paths().map(Path::as_str).collect()
    }

    #[test]
    fn finds_every_occurrence() {
        let t = Template::parse("{{a}} and {{b.c}} and {{a}}", &delims(), true).unwrap();
        assert_eq!(paths(&t), vec!["a", "b.c", "a"]);
    }

    #[test]
    fn detects_markers() {
        assert!(contains_binding("x {{y}}", &delims(), true));
        assert!(!contains_binding("x {{y", &delims(), true));
        assert!(!contains_binding("x }}y{{", &delims(), true));
        assert!(!contains_binding("plain", &delims(), true));
        assert!(!contains_binding("{{}} {{  }}", &delims(), true));
        assert!(contains_binding("{{  }}", &delims(), false));
        assert!(contains_binding("{{}} {{y}}", &delims(), true));
    }

    #[test]
    fn trimming_is_configurable() {
        let trimmed = Template::parse("{{ name }}", &delims(), true).unwrap();
        assert_eq!(paths(&trimmed), vec!["name"]);

        let verbatim = Template::parse("{{ name }}", &delims(), false).unwrap();
        assert_eq!(paths(&verbatim), vec![" name "]);
    }

    #[test]
    fn empty_marker_stays_literal() {
        let model = observe(json!({ "a": 1 }));
        let t = Template::parse("{{}} {{ }} {{a}}", &delims(), true).unwrap();
        assert_eq!(paths(&t), vec!["a"]);
        assert_eq!(t.render(&model).unwrap(), "{{}} {{ }} 1");
    }

    #[test]
    fn malformed_path_is_invalid() {
        let err = Template::parse("{{a..b}}", &delims(), true).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[test]
    fn unclosed_marker_stays_literal() {
        let model = observe(json!({ "a": 1 }));
        let t = Template::parse("{{a}} {{b", &delims(), true).unwrap();
        assert_eq!(t.render(&model).unwrap(), "1 {{b");
    }

    #[test]
    fn renders_with_custom_delimiters() {
        let model = observe(json!({ "user": { "first": "Ann", "last": "Lee" } }));
        let delimiters = Delimiters {
            open: "[[".into(),
            close: "]]".into(),
        };
        let t = Template::parse("Hi [[user.first]] [[user.last]]! {{x}}", &delimiters, true).unwrap();
        assert_eq!(t.render(&model).unwrap(), "Hi Ann Lee! {{x}}");
    }

    #[test]
    fn render_fails_on_missing_path() {
        let model = observe(json!({}));
        let t = Template::parse("{{gone}}", &delims(), true).unwrap();
        assert!(matches!(t.render(&model), Err(Error::PathResolution { .. })));
    }

    #[test]
    fn literal_only_template_has_no_bindings() {
        let t = Template::parse("just text", &delims(), true).unwrap();
        assert!(paths(&t).is_empty());
    }
}
