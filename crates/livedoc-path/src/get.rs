use serde_json::Value;

use crate::types::Segment;

fn step<'a>(current: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), Segment::Key(k)) => map.get(k),
        (Value::Object(map), Segment::Index(i)) => map.get(&i.to_string()),
        (Value::Array(arr), Segment::Index(i)) => arr.get(*i),
        (Value::Array(arr), Segment::Key(k)) => arr.get(k.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Get a value from a document by path.
///
/// Returns `None` when any step is missing or cannot be traversed.
pub fn get<'a>(val: &'a Value, path: &[Segment]) -> Option<&'a Value> {
    let mut current = val;
    for segment in path {
        current = step(current, segment)?;
    }
    Some(current)
}

/// Get a mutable reference to a value in a document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[Segment]) -> Option<&'a mut Value> {
    let mut current = val;
    for segment in path {
        current = match (current, segment) {
            (Value::Object(map), Segment::Key(k)) => map.get_mut(k)?,
            (Value::Object(map), Segment::Index(i)) => map.get_mut(&i.to_string())?,
            (Value::Array(arr), Segment::Index(i)) => arr.get_mut(*i)?,
            (Value::Array(arr), Segment::Key(k)) => arr.get_mut(k.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
