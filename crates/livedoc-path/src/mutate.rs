//! In-place writes: materializing `set` and `remove`.

use serde_json::{Map, Value};

use crate::format_dotted;
use crate::types::Segment;
use crate::PathError;

fn empty_container(next: &Segment) -> Value {
    if next.is_index() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn array_index(segment: &Segment) -> Option<usize> {
    match segment {
        Segment::Index(i) => Some(*i),
        Segment::Key(k) => k.parse().ok(),
    }
}

fn key_of(segment: &Segment) -> String {
    match segment {
        Segment::Key(k) => k.clone(),
        Segment::Index(i) => i.to_string(),
    }
}

/// Descend one step, creating the child when it is missing or `null`.
///
/// The created child is an array when `next` is an index, otherwise an object.
fn child_or_insert<'a>(
    current: &'a mut Value,
    segment: &Segment,
    next: &Segment,
    path: &[Segment],
) -> Result<&'a mut Value, PathError> {
    let child = match current {
        Value::Object(map) => map.entry(key_of(segment)).or_insert(Value::Null),
        Value::Array(arr) => {
            let idx = array_index(segment).ok_or_else(|| PathError::InvalidIndex(format_dotted(path)))?;
            if idx >= arr.len() {
                arr.resize(idx + 1, Value::Null);
            }
            &mut arr[idx]
        }
        _ => return Err(PathError::NotTraversable(format_dotted(path))),
    };
    if child.is_null() {
        *child = empty_container(next);
    }
    Ok(child)
}

/// Write `value` at `path`, materializing missing intermediate containers.
///
/// Returns the value previously stored at `path`, if any. Writing past the
/// end of an array pads the gap with `null`.
///
/// # Errors
///
/// Fails when an intermediate step is a scalar, or when a non-numeric key is
/// used on an array.
pub fn set(doc: &mut Value, path: &[Segment], value: Value) -> Result<Option<Value>, PathError> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    let mut current = doc;
    for (i, segment) in parents.iter().enumerate() {
        current = child_or_insert(current, segment, &path[i + 1], &path[..=i])?;
    }
    match current {
        Value::Object(map) => Ok(map.insert(key_of(last), value)),
        Value::Array(arr) => {
            let idx = array_index(last).ok_or_else(|| PathError::InvalidIndex(format_dotted(path)))?;
            if idx < arr.len() {
                Ok(Some(std::mem::replace(&mut arr[idx], value)))
            } else {
                arr.resize(idx, Value::Null);
                arr.push(value);
                Ok(None)
            }
        }
        _ => Err(PathError::NotTraversable(format_dotted(parents))),
    }
}

/// Remove the value at `path`.
///
/// A no-op returning `None` when the parent cannot be traversed or the key is
/// absent. Removing the root is not supported and also returns `None`.
pub fn remove(doc: &mut Value, path: &[Segment]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    match crate::get_mut(doc, parents)? {
        Value::Object(map) => map.shift_remove(&key_of(last)),
        Value::Array(arr) => {
            let idx = array_index(last)?;
            (idx < arr.len()).then(|| arr.remove(idx))
        }
        _ => None,
    }
}
