//! `$(NAME)` placeholder substitution.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::warn;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\(([A-Z0-9_]+)\)").expect("placeholder pattern is valid"));

/// The parameter document was not a JSON object.
///
/// Never surfaced to callers of the resolver: substitution falls back to
/// returning the text unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameter document: {reason}")]
pub struct ParameterParseError {
    /// Why the document was rejected.
    pub reason: String,
}

/// Placeholder name to replacement value, parsed once per resolution run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: BTreeMap<String, Value>,
}

impl ParameterSet {
    /// Parses a flat JSON object such as `{"PRIORITY_TX_MAX_GAS_LIMIT": 72000000}`.
    pub fn parse(text: &str) -> Result<Self, ParameterParseError> {
        let value: Value = serde_json::from_str(text).map_err(|e| ParameterParseError {
            reason: e.to_string(),
        })?;
        match value {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => Err(ParameterParseError {
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Parses `text`, logging and falling back to an empty set on failure.
    ///
    /// An empty set leaves every placeholder untouched, so the result of
    /// substitution is the original text.
    pub fn parse_lenient(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|err| {
            warn!(%err, "ignoring parameter document, placeholders are left as-is");
            Self::default()
        })
    }

    /// Builds a set from name/value pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Returns the replacement text for `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).map(render_value)
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every known placeholder in `text`.
    ///
    /// Unknown placeholders are kept verbatim. Text without placeholders is
    /// returned borrowed.
    pub fn substitute<'t>(&self, text: &'t str) -> Cow<'t, str> {
        PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
            self.get(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
    }

    /// Owned variant of [`substitute`](Self::substitute) that reuses `text`
    /// when nothing changes.
    pub fn apply(&self, text: String) -> String {
        if !PLACEHOLDER.is_match(&text) {
            return text;
        }
        self.substitute(&text).into_owned()
    }
}

/// Substitutes placeholders in `text` using the raw parameter document.
///
/// If the document does not parse, `text` is returned unchanged.
pub fn substitute<'t>(text: &'t str, parameter_text: &str) -> Cow<'t, str> {
    if !PLACEHOLDER.is_match(text) {
        return Cow::Borrowed(text);
    }
    match ParameterSet::parse(parameter_text) {
        Ok(params) => params.substitute(text),
        Err(err) => {
            warn!(%err, "ignoring parameter document, placeholders are left as-is");
            Cow::Borrowed(text)
        }
    }
}

/// Renders a JSON value the way it should appear in source text.
///
/// Floats are written in plain positional notation (`1e21` becomes
/// `1000000000000000000000`) because Solidity number literals have no
/// `e+N` form.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
