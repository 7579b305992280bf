//! Dot-notation access into nested data mappings
//!
//! Paths address nested maps with `.`-separated segments; numeric segments
//! index into lists. A key that itself contains dots is found when it exists
//! verbatim at the top level.

use crate::value::{Map, Value};

/// Every leaf path of the mapping, in mapping order
///
/// Non-empty maps and lists are descended into; everything else, including
/// empty containers, is a leaf.
pub fn leaf_paths(data: &Map) -> Vec<String> {
    let mut paths = Vec::new();
    for (key, value) in data {
        collect_leaves(key.clone(), value, &mut paths);
    }
    paths
}

fn collect_leaves(prefix: String, value: &Value, paths: &mut Vec<String>) {
    match value {
        Value::Map(map) if !map.is_empty() => {
            for (key, child) in map {
                collect_leaves(format!("{prefix}.{key}"), child, paths);
            }
        }
        Value::List(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                collect_leaves(format!("{prefix}.{index}"), child, paths);
            }
        }
        _ => paths.push(prefix),
    }
}

/// Look up the value at a dotted path
pub fn get<'a>(data: &'a Map, path: &str) -> Option<&'a Value> {
    if let Some(value) = data.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = child(current, segment)?;
    }
    Some(current)
}

/// Mutable lookup of the value at a dotted path
pub fn get_mut<'a>(data: &'a mut Map, path: &str) -> Option<&'a mut Value> {
    if data.contains_key(path) {
        return data.get_mut(path);
    }

    let mut segments = path.split('.');
    let mut current = data.get_mut(segments.next()?)?;
    for segment in segments {
        current = child_mut(current, segment)?;
    }
    Some(current)
}

/// Whether a value exists at the path, null values included
pub fn has(data: &Map, path: &str) -> bool {
    get(data, path).is_some()
}

/// Replace the value at an existing path
///
/// Returns false and leaves the data untouched when the path does not exist.
pub fn set(data: &mut Map, path: &str, value: Value) -> bool {
    match get_mut(data, path) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Map(map) => map.get(segment),
        Value::List(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Map(map) => map.get_mut(segment),
        Value::List(items) => items.get_mut(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Map {
        match Value::from(json!({
            "name": "jim",
            "empty": {},
            "contact": {"email": "a@b.c", "phone": null},
            "items": [{"sku": "x"}, {"sku": "y"}]
        })) {
            Value::Map(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_leaf_paths() {
        let paths = leaf_paths(&sample());
        assert_eq!(
            paths,
            vec![
                "contact.email",
                "contact.phone",
                "empty",
                "items.0.sku",
                "items.1.sku",
                "name",
            ]
        );
    }

    #[test]
    fn test_get_and_has() {
        let data = sample();
        assert_eq!(get(&data, "contact.email"), Some(&Value::from("a@b.c")));
        assert_eq!(get(&data, "items.1.sku"), Some(&Value::from("y")));
        assert!(has(&data, "contact.phone"));
        assert!(!has(&data, "contact.fax"));
        assert!(!has(&data, "name.first"));
        assert!(!has(&data, "items.7.sku"));
    }

    #[test]
    fn test_set_existing_only() {
        let mut data = sample();
        assert!(set(&mut data, "items.0.sku", Value::from("z")));
        assert_eq!(get(&data, "items.0.sku"), Some(&Value::from("z")));

        assert!(!set(&mut data, "contact.fax", Value::from("1")));
        assert!(!has(&data, "contact.fax"));
    }

    #[test]
    fn test_verbatim_dotted_key() {
        let mut data = Map::new();
        data.insert("a.b".to_string(), Value::Int(1));
        assert_eq!(get(&data, "a.b"), Some(&Value::Int(1)));
        assert!(set(&mut data, "a.b", Value::Int(2)));
        assert_eq!(data["a.b"], Value::Int(2));
    }
}
