//! Binding expressions.
//!
//! A [`Path`] is a dot-separated key sequence resolved from the model root.
//! Every segment must be present: there is no default value and no partial
//! resolution.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use super::object::Object;
use super::value::Value;
use crate::error::{Error, Result};

/// A parsed binding expression such as `user.address.city`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    raw: String,
    segments: SmallVec<[String; 4]>,
}

impl Path {
    /// Split `raw` on dots. Segments are used verbatim, whitespace included.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments: SmallVec<[String; 4]> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::InvalidPath(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Read the value at this path.
    ///
    /// Every segment is a property read, so an active collector subscribes to
    /// each property along the way.
    pub fn resolve(&self, root: &Value) -> Result<Value> {
        let mut current = root.clone();
        for segment in &self.segments {
            current = self.step(&current, segment)?;
        }
        Ok(current)
    }

    /// Assign `value` at this path.
    ///
    /// Resolves the container named by all but the last segment, then writes
    /// the last segment on it. Returns whether the stored value changed.
    pub fn assign(&self, root: &Value, value: Value) -> Result<bool> {
        let (last, parents) = self
            .segments
            .split_last()
            .ok_or_else(|| Error::InvalidPath(self.raw.clone()))?;

        let mut current = root.clone();
        for segment in parents {
            current = self.step(&current, segment)?;
        }
        let container = self.container(&current, last)?;
        container.set(last, value)
    }

    fn step(&self, current: &Value, segment: &str) -> Result<Value> {
        self.container(current, segment)?
            .get(segment)
            .ok_or_else(|| Error::missing(&self.raw, segment))
    }

    fn container<'v>(&self, current: &'v Value, segment: &str) -> Result<&'v Object> {
        current
            .as_object()
            .ok_or_else(|| Error::missing(&self.raw, segment))
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::reactive::observe;

    #[test]
    fn parses_segments() {
        let path = Path::parse("user.address.city").unwrap();
        assert_eq!(path.segments(), ["user", "address", "city"]);
        assert_eq!(path.to_string(), "user.address.city");

        let spaced: Path = " name ".parse().unwrap();
        assert_eq!(spaced.segments(), [" name "]);
    }

    #[test]
    fn rejects_empty_segments() {
        for raw in ["", ".", "a..b", "a."] {
            assert!(matches!(Path::parse(raw), Err(Error::InvalidPath(_))), "{raw}");
        }
    }

    #[test]
    fn resolves_nested_values() {
        let model = observe(json!({ "user": { "name": "Ann" } }));
        let path = Path::parse("user.name").unwrap();
        assert_eq!(path.resolve(&model).unwrap(), Value::from("Ann"));
    }

    #[test]
    fn missing_segment_is_fatal() {
        let model = observe(json!({ "user": { "name": "Ann" } }));

        let err = Path::parse("user.age").unwrap().resolve(&model).unwrap_err();
        assert!(matches!(err, Error::PathResolution { ref segment, .. } if segment == "age"));

        let err = Path::parse("user.name.first").unwrap().resolve(&model).unwrap_err();
        assert!(matches!(err, Error::PathResolution { ref segment, .. } if segment == "first"));
    }

    #[test]
    fn non_object_root_fails_to_resolve() {
        let model = observe(json!(3));
        assert!(Path::parse("a").unwrap().resolve(&model).is_err());
    }

    #[test]
    fn assign_writes_through_parent() {
        let model = observe(json!({ "user": { "name": "Ann" } }));
        let path = Path::parse("user.name").unwrap();

        assert!(path.assign(&model, Value::from("Bo")).unwrap());
        assert!(!path.assign(&model, Value::from("Bo")).unwrap());
        assert_eq!(path.resolve(&model).unwrap(), Value::from("Bo"));
    }

    #[test]
    fn assign_to_new_key_adds_plain_field() {
        let model = observe(json!({ "user": {} }));
        Path::parse("user.nick").unwrap().assign(&model, Value::from("b")).unwrap();

        let user = model.as_object().unwrap().get("user").unwrap();
        assert!(!user.as_object().unwrap().is_reactive("nick"));
    }

    #[test]
    fn assign_through_missing_parent_fails() {
        let model = observe(json!({}));
        let err = Path::parse("user.name").unwrap().assign(&model, Value::Null).unwrap_err();
        assert!(matches!(err, Error::PathResolution { ref segment, .. } if segment == "user"));
    }
}
