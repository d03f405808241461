//! Attribute resolution.
//!
//! A [`Resolver`] maps attribute names to values. Names may be dotted
//! (`user.address.city`); each segment after the first descends one level
//! into a [`Value::Map`], matching keys exactly.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use arbiter_types::Value;
use serde::{Deserialize, Serialize};

/// Resolves attribute names against an evaluation context.
///
/// `None` means the attribute is absent. `Some(Value::Null)` means it is
/// present with a null value; operators treat the two differently.
pub trait Resolver {
    fn resolve(&self, attribute: &str) -> Option<Cow<'_, Value>>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, attribute: &str) -> Option<Cow<'_, Value>> {
        (**self).resolve(attribute)
    }
}

/// Walks a dotted path, using `root` for the first segment.
///
/// Empty segments (`a..b`, `.a`, `a.`) never resolve.
pub fn lookup_path<'a>(
    path: &str,
    root: impl FnOnce(&str) -> Option<&'a Value>,
) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next().filter(|s| !s.is_empty())?;
    let mut current = root(first)?;
    for segment in segments {
        if segment.is_empty() {
            return None;
        }
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}

impl Resolver for BTreeMap<String, Value> {
    fn resolve(&self, attribute: &str) -> Option<Cow<'_, Value>> {
        lookup_path(attribute, |key| self.get(key)).map(Cow::Borrowed)
    }
}

impl<S: std::hash::BuildHasher> Resolver for HashMap<String, Value, S> {
    fn resolve(&self, attribute: &str) -> Option<Cow<'_, Value>> {
        lookup_path(attribute, |key| self.get(key)).map(Cow::Borrowed)
    }
}

/// A map value can serve as a context directly. Non-map values resolve nothing.
impl Resolver for Value {
    fn resolve(&self, attribute: &str) -> Option<Cow<'_, Value>> {
        let map = self.as_map()?;
        lookup_path(attribute, |key| map.get(key)).map(Cow::Borrowed)
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// An owned evaluation context.
///
/// ```
/// use arbiter_policy::{Attributes, Resolver};
/// use arbiter_types::Value;
///
/// let attrs = Attributes::new()
///     .with("user.id", "u-1")
///     .with("request", serde_json::json!({ "ip": "10.0.0.7" }));
///
/// assert_eq!(attrs.resolve("request.ip").as_deref(), Some(&Value::from("10.0.0.7")));
/// assert!(attrs.resolve("request.port").is_none());
/// ```
///
/// Keys are stored verbatim, so a top-level key may itself contain dots.
/// An exact top-level match wins over path descent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Attributes::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Inserts a record as a nested map so its fields are reachable by path.
    ///
    /// Field names are matched exactly as the record serializes them.
    pub fn insert_record<T: Serialize + ?Sized>(
        &mut self,
        name: impl Into<String>,
        record: &T,
    ) -> Result<(), serde_json::Error> {
        let value = Value::from_serialize(record)?;
        self.0.insert(name.into(), value);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl Resolver for Attributes {
    fn resolve(&self, attribute: &str) -> Option<Cow<'_, Value>> {
        if let Some(value) = self.0.get(attribute) {
            return Some(Cow::Borrowed(value));
        }
        self.0.resolve(attribute)
    }
}

impl From<BTreeMap<String, Value>> for Attributes {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Attributes {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn context() -> Attributes {
        Attributes::new()
            .with(
                "user",
                json!({
                    "name": "ada",
                    "address": { "city": "London", "zip": null },
                    "roles": ["admin", "dev"]
                }),
            )
            .with("flag", true)
    }

    #[test_case("flag", Some(Value::Bool(true)); "top level")]
    #[test_case("user.name", Some(Value::from("ada")); "one level")]
    #[test_case("user.address.city", Some(Value::from("London")); "two levels")]
    #[test_case("user.address.zip", Some(Value::Null); "present null")]
    #[test_case("user.address.country", None; "missing leaf")]
    #[test_case("user.roles.0", None; "lists are not descended")]
    #[test_case("flag.inner", None; "descend into scalar")]
    #[test_case("user..name", None; "empty middle segment")]
    #[test_case(".flag", None; "leading dot")]
    #[test_case("flag.", None; "trailing dot")]
    #[test_case("", None; "empty name")]
    #[test_case("User.name", None; "keys are case sensitive")]
    fn test_resolve(path: &str, expected: Option<Value>) {
        assert_eq!(context().resolve(path).map(Cow::into_owned), expected);
    }

    #[test]
    fn test_exact_dotted_key_wins() {
        let attrs = Attributes::new()
            .with("a.b", 1)
            .with("a", json!({ "b": 2 }));
        assert_eq!(attrs.resolve("a.b").as_deref(), Some(&Value::Int(1)));
    }

    #[derive(Serialize)]
    struct Device {
        id: u32,
        os_version: String,
        trusted: bool,
    }

    #[test]
    fn test_insert_record() {
        let mut attrs = Attributes::new();
        attrs
            .insert_record(
                "device",
                &Device {
                    id: 7,
                    os_version: "14.2".to_string(),
                    trusted: false,
                },
            )
            .unwrap();

        assert_eq!(attrs.resolve("device.id").as_deref(), Some(&Value::Int(7)));
        assert_eq!(
            attrs.resolve("device.os_version").as_deref(),
            Some(&Value::from("14.2"))
        );
        assert!(attrs.resolve("device.OsVersion").is_none());
    }

    #[test]
    fn test_value_and_hashmap_resolvers() {
        let value = Value::from(json!({ "a": { "b": [1, 2] } }));
        assert_eq!(
            value.resolve("a.b").as_deref(),
            Some(&Value::from(vec![1, 2]))
        );
        assert!(Value::Int(3).resolve("a").is_none());

        let mut map = HashMap::new();
        map.insert("k".to_string(), Value::from("v"));
        assert_eq!(map.resolve("k").as_deref(), Some(&Value::from("v")));
    }

    #[test]
    fn test_collect_and_extend() {
        let mut attrs: Attributes = [("a", 1), ("b", 2)].into_iter().collect();
        attrs.extend([("c", 3)]);
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.get("c"), Some(&Value::Int(3)));
        assert_eq!(attrs.remove("a"), Some(Value::Int(1)));
        assert!(!attrs.is_empty());
    }
}
