//! Route matcher options and the index of their string-matchable fields.
//!
//! A route is registered with a set of [`RouteMatcherOptions`]. The rule-matching engine does not
//! inspect the options itself: it asks [`all_string_matcher_fields`] once, at registration time,
//! which fields hold string matchers and then pattern-matches only those.
use log::debug;
use regex::{Regex, RegexBuilder};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value;
use std::fmt;

/// Fields of [`RouteMatcherOptions`] whose value is a single [`StringMatcher`].
///
/// Dotted names address a field nested inside a dictionary (e.g. `auth.username`).
pub const STRING_MATCHER_FIELDS: &[&str] = &[
    "auth.username",
    "auth.password",
    "hostname",
    "method",
    "path",
    "pathname",
    "url",
];

/// Fields of [`RouteMatcherOptions`] whose value is a dictionary of [`StringMatcher`]s,
/// one per sub-key (e.g. one per header name).
pub const DICT_STRING_MATCHER_FIELDS: &[&str] = &["headers", "query"];

/// A pattern a request property is matched against.
#[derive(Clone, Debug)]
pub enum StringMatcher {
    /// A glob (or plain) string.
    Glob(String),
    Regex(Regex),
}

/// The value of a field in [`RouteMatcherOptions`].
#[derive(Clone, Debug)]
pub enum MatcherValue {
    Pattern(StringMatcher),
    Dict(MatcherMap),
    /// Anything that is neither a pattern nor a dictionary (`https`, `port`, `times`, ...).
    /// Kept as-is, it is never string-matched.
    Scalar(Value),
}

impl From<&str> for MatcherValue {
    fn from(s: &str) -> Self {
        MatcherValue::Pattern(StringMatcher::Glob(s.to_owned()))
    }
}

impl From<String> for MatcherValue {
    fn from(s: String) -> Self {
        MatcherValue::Pattern(StringMatcher::Glob(s))
    }
}

impl From<Regex> for MatcherValue {
    fn from(r: Regex) -> Self {
        MatcherValue::Pattern(StringMatcher::Regex(r))
    }
}

impl From<MatcherMap> for MatcherValue {
    fn from(map: MatcherMap) -> Self {
        MatcherValue::Dict(map)
    }
}

impl From<Value> for MatcherValue {
    fn from(value: Value) -> Self {
        MatcherValue::Scalar(value)
    }
}

/// An ordered dictionary of matcher values.
///
/// Keys keep the order they were inserted (or written, when deserialized) in.
#[derive(Clone, Debug, Default)]
pub struct MatcherMap(Vec<(String, MatcherValue)>);

impl MatcherMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builder-style [`MatcherMap::insert`].
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<MatcherValue>,
    {
        self.insert(key, value);
        self
    }

    /// Set `key` to `value`, replacing an existing entry in place.
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<MatcherValue>,
    {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MatcherValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Resolve a dotted path, descending into nested dictionaries.
    pub fn get_path(&self, path: &str) -> Option<&MatcherValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            match current {
                MatcherValue::Dict(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The request-matching part of a route definition.
///
/// Read-only once built; it can be deserialized from the JSON the test driver sends:
/// - strings become [`StringMatcher::Glob`];
/// - `{ "$regex": "<source>", "flags": "<flags>" }` becomes [`StringMatcher::Regex`];
/// - other objects become dictionaries;
/// - every other value is kept as [`MatcherValue::Scalar`].
#[derive(Clone, Debug, Default)]
pub struct RouteMatcherOptions(MatcherMap);

impl RouteMatcherOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a top-level field.
    pub fn with<K, V>(mut self, field: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<MatcherValue>,
    {
        self.0.insert(field, value);
        self
    }

    /// Return the value of `field`, a top-level name or a dotted path.
    pub fn get(&self, field: &str) -> Option<&MatcherValue> {
        self.0.get_path(field)
    }

    /// Whether `field` (a top-level name or a dotted path) is configured.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }
}

impl From<MatcherMap> for RouteMatcherOptions {
    fn from(map: MatcherMap) -> Self {
        Self(map)
    }
}

/// List the string-matchable fields configured in `options`, using the default
/// [`STRING_MATCHER_FIELDS`] and [`DICT_STRING_MATCHER_FIELDS`].
///
/// ### Example:
/// ```rust
/// use net_stubbing::matchers::{all_string_matcher_fields, MatcherMap, RouteMatcherOptions};
///
/// let options = RouteMatcherOptions::new()
///     .with("url", "/users/*")
///     .with("method", "GET")
///     .with("headers", MatcherMap::new().with("accept", "application/json"));
///
/// assert_eq!(
///     all_string_matcher_fields(&options),
///     vec!["method", "url", "headers.accept"]
/// );
/// ```
pub fn all_string_matcher_fields(options: &RouteMatcherOptions) -> Vec<String> {
    string_matcher_fields(options, STRING_MATCHER_FIELDS, DICT_STRING_MATCHER_FIELDS)
}

/// List the string-matchable fields configured in `options`.
///
/// Plain fields come first, in the order of `string_fields`. They are followed by one
/// `field.subkey` path per sub-key of every dictionary field, in the order of `dict_fields`
/// and then of the sub-keys themselves. Absent fields and empty dictionaries contribute nothing.
/// No deduplication is performed.
pub fn string_matcher_fields(
    options: &RouteMatcherOptions,
    string_fields: &[&str],
    dict_fields: &[&str],
) -> Vec<String> {
    let plain = string_fields
        .iter()
        .filter(|field| options.has(field))
        .map(|field| field.to_string());

    let nested = dict_fields
        .iter()
        .filter_map(|field| match options.get(field) {
            Some(MatcherValue::Dict(map)) => {
                Some(map.keys().map(move |key| format!("{}.{}", field, key)))
            }
            Some(_) => {
                debug!("Ignoring `{}`: it is not a dictionary of string matchers.", field);
                None
            }
            None => None,
        })
        .flatten();

    plain.chain(nested).collect()
}

fn build_regex<E: de::Error>(source: &str, flags: &str) -> Result<Regex, E> {
    let mut builder = RegexBuilder::new(source);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            // Stateful or unicode flags have no effect on a single match.
            'g' | 'y' | 'u' => &mut builder,
            other => return Err(E::custom(format!("unknown regex flag `{}`", other))),
        };
    }
    builder.build().map_err(E::custom)
}

struct MatcherValueVisitor;

impl<'de> Visitor<'de> for MatcherValueVisitor {
    type Value = MatcherValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string matcher, a regex, a dictionary or a scalar")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<MatcherValue, E> {
        Ok(v.into())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<MatcherValue, E> {
        Ok(v.into())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<MatcherValue, E> {
        Ok(MatcherValue::Scalar(v.into()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<MatcherValue, E> {
        Ok(MatcherValue::Scalar(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<MatcherValue, E> {
        Ok(MatcherValue::Scalar(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<MatcherValue, E> {
        Ok(MatcherValue::Scalar(v.into()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<MatcherValue, E> {
        Ok(MatcherValue::Scalar(Value::Null))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<MatcherValue, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(MatcherValue::Scalar(Value::Array(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MatcherValue, A::Error> {
        let mut map = MatcherMap::new();
        while let Some((key, value)) = access.next_entry::<String, MatcherValue>()? {
            map.insert(key, value);
        }

        let is_regex = map.get("$regex").is_some()
            && map.keys().all(|k| k == "$regex" || k == "flags");
        if !is_regex {
            return Ok(MatcherValue::Dict(map));
        }
        let text = |key: &str| -> Result<String, A::Error> {
            match map.get(key) {
                Some(MatcherValue::Pattern(StringMatcher::Glob(s))) => Ok(s.clone()),
                None => Ok(String::new()),
                Some(_) => Err(de::Error::custom(format!("`{}` must be a string", key))),
            }
        };
        let regex = build_regex::<A::Error>(&text("$regex")?, &text("flags")?)?;
        Ok(MatcherValue::Pattern(StringMatcher::Regex(regex)))
    }
}

impl<'de> Deserialize<'de> for MatcherValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MatcherValueVisitor)
    }
}

impl<'de> Deserialize<'de> for RouteMatcherOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match MatcherValue::deserialize(deserializer)? {
            MatcherValue::Dict(map) => Ok(Self(map)),
            _ => Err(de::Error::custom("route matcher options must be an object")),
        }
    }
}
