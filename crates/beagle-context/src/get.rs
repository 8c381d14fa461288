use crate::types::PathStep;
use serde_json::Value;

/// Get a value from a canonical context value by path.
pub fn get<'a>(val: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Object(map) => map.get(step.as_key().as_ref())?,
            Value::Array(arr) => arr.get(step.as_index()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shape_decides_how_numeric_steps_resolve() {
        let doc = json!({"map": {"0": "zero"}, "list": ["first"]});
        assert_eq!(get(&doc, &["map".into(), PathStep::Index(0)]), Some(&json!("zero")));
        assert_eq!(get(&doc, &["list".into(), "0".into()]), Some(&json!("first")));
        assert_eq!(get(&doc, &["list".into(), "x".into()]), None);
    }

    #[test]
    fn primitive_has_no_children() {
        let doc = json!({"n": 5});
        assert_eq!(get(&doc, &["n".into(), "a".into()]), None);
        assert_eq!(get(&doc, &[]), Some(&doc));
    }
}
