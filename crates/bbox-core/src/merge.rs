// ── Record merger ──
//
// Deep-merges a sequence of object fragments into one object. Every
// value is classified as Mapping, Sequence, or Scalar before the two
// sides of a key are combined, so all nine pairings are decided here:
//
//              | Mapping  | Sequence | Scalar
//   -----------+----------+----------+-------------------
//   Mapping    | recurse  | conflict | conflict
//   Sequence   | conflict | append   | conflict
//   Scalar     | conflict | conflict | equal ok, else conflict

use serde_json::{Map, Value};

use crate::error::CoreError;

/// Accumulator side of a combine, borrowed in place.
enum Slot<'a> {
    Mapping(&'a mut Map<String, Value>),
    Sequence(&'a mut Vec<Value>),
    Scalar(&'a Value),
}

impl<'a> Slot<'a> {
    fn of(value: &'a mut Value) -> Self {
        match value {
            Value::Object(map) => Slot::Mapping(map),
            Value::Array(items) => Slot::Sequence(items),
            scalar => Slot::Scalar(scalar),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Slot::Mapping(map) => Value::Object((*map).clone()),
            Slot::Sequence(items) => Value::Array((*items).clone()),
            Slot::Scalar(value) => (*value).clone(),
        }
    }
}

/// Incoming side of a combine, owned.
enum Incoming {
    Mapping(Map<String, Value>),
    Sequence(Vec<Value>),
    Scalar(Value),
}

impl From<Value> for Incoming {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Incoming::Mapping(map),
            Value::Array(items) => Incoming::Sequence(items),
            scalar => Incoming::Scalar(scalar),
        }
    }
}

impl Incoming {
    fn into_value(self) -> Value {
        match self {
            Incoming::Mapping(map) => Value::Object(map),
            Incoming::Sequence(items) => Value::Array(items),
            Incoming::Scalar(value) => value,
        }
    }
}

/// Merge `fragments` left to right into a single object.
///
/// An empty input yields an empty object. Sequences are concatenated
/// without deduplication; differing scalars or mismatched kinds fail
/// with [`CoreError::MergeConflict`] naming the dotted key path.
pub fn merge<I>(fragments: I) -> Result<Map<String, Value>, CoreError>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let mut fragments = fragments.into_iter();
    let Some(mut acc) = fragments.next() else {
        return Ok(Map::new());
    };
    for fragment in fragments {
        combine_maps(&mut acc, fragment, "")?;
    }
    Ok(acc)
}

fn combine_maps(
    acc: &mut Map<String, Value>,
    incoming: Map<String, Value>,
    prefix: &str,
) -> Result<(), CoreError> {
    for (key, value) in incoming {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match acc.get_mut(&key) {
            None => {
                acc.insert(key, value);
            }
            Some(existing) => combine_values(existing, value, &path)?,
        }
    }
    Ok(())
}

fn combine_values(acc: &mut Value, incoming: Value, path: &str) -> Result<(), CoreError> {
    match (Slot::of(acc), Incoming::from(incoming)) {
        (Slot::Mapping(left), Incoming::Mapping(right)) => combine_maps(left, right, path),
        (Slot::Sequence(left), Incoming::Sequence(right)) => {
            left.extend(right);
            Ok(())
        }
        (Slot::Scalar(left), Incoming::Scalar(right)) => {
            if *left == right {
                Ok(())
            } else {
                Err(conflict(path, left.clone(), right))
            }
        }
        // The six mixed pairings.
        (left, right) => Err(conflict(path, left.to_value(), right.into_value())),
    }
}

fn conflict(path: &str, left: Value, right: Value) -> CoreError {
    CoreError::MergeConflict {
        path: path.to_owned(),
        left,
        right,
    }
}
