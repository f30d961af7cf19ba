// ── Response normalizer ──
//
// Every read endpoint answers with a JSON list of object fragments.
// Single-record domains must carry exactly one; merge domains may carry
// any number, which are deep-merged into one object.

use serde_json::{Map, Value};

use crate::domain::DomainSpec;
use crate::error::CoreError;
use crate::merge::merge;

/// Unwrap a single-fragment response into its object.
///
/// Fails with [`CoreError::ShapeFault`] when `raw` is not a list, holds
/// anything other than exactly one element, or that element is not an
/// object.
pub fn normalize(domain: &str, raw: Value) -> Result<Map<String, Value>, CoreError> {
    let items = into_list(domain, raw)?;
    let len = items.len();
    let mut items = items.into_iter();
    match (items.next(), len) {
        (Some(Value::Object(record)), 1) => Ok(record),
        (Some(other), 1) => Err(CoreError::shape(
            domain,
            format!("expected an object fragment, got {}", kind(&other)),
        )),
        _ => Err(CoreError::shape(
            domain,
            format!("expected exactly one fragment, got {len}"),
        )),
    }
}

/// Split a multi-fragment response into its objects. An empty list is
/// valid and yields no fragments.
pub fn fragments(domain: &str, raw: Value) -> Result<Vec<Map<String, Value>>, CoreError> {
    let items = into_list(domain, raw)?;
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fragment) => Ok(fragment),
            other => Err(CoreError::shape(
                domain,
                format!("fragment {index} is {}, not an object", kind(&other)),
            )),
        })
        .collect()
}

/// Normalize `raw` the way `spec` asks for.
pub fn normalize_domain(spec: &DomainSpec, raw: Value) -> Result<Map<String, Value>, CoreError> {
    if spec.merge {
        merge(fragments(spec.name, raw)?)
    } else {
        normalize(spec.name, raw)
    }
}

fn into_list(domain: &str, raw: Value) -> Result<Vec<Value>, CoreError> {
    match raw {
        Value::Array(items) => Ok(items),
        other => Err(CoreError::shape(
            domain,
            format!("expected a list, got {}", kind(&other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
