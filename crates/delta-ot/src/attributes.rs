//! Attribute map algebra.
//!
//! Attributes are JSON objects attached to insert and retain operations,
//! typically carrying inline formatting (`{"bold": true}`). A `null` value is
//! meaningful: composed onto an insert it unsets the attribute, composed onto
//! a retain it must survive so the unset propagates further.
//!
//! All four operations are pure and total. `None` means "no attributes"; an
//! operation that would produce an empty map returns `None` instead, so
//! callers never store empty maps. Value comparison is deep structural
//! equality (`serde_json::Value: PartialEq`).

use serde_json::{Map, Value};

pub type AttributeMap = Map<String, Value>;

/// Merge `b` over `a`, as when the operation carrying `b` is applied after
/// the operation carrying `a`.
///
/// Keys present in `b` win; keys only in `a` are kept. When `keep_null` is
/// false, keys whose final value is `null` are dropped from the result.
pub fn compose(
    a: Option<&AttributeMap>,
    b: Option<&AttributeMap>,
    keep_null: bool,
) -> Option<AttributeMap> {
    let mut attributes: AttributeMap = b.cloned().unwrap_or_default();
    if let Some(a) = a {
        for (key, value) in a {
            if !attributes.contains_key(key) {
                attributes.insert(key.clone(), value.clone());
            }
        }
    }
    if !keep_null {
        attributes = attributes
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();
    }
    non_empty(attributes)
}

/// Compute the attribute map that undoes `attr` relative to `base`.
///
/// Keys of `attr` that changed a value record the `base` value (or `null`
/// when `base` had none); keys of `base` untouched by `attr` are restored
/// verbatim.
pub fn invert(attr: Option<&AttributeMap>, base: Option<&AttributeMap>) -> Option<AttributeMap> {
    let mut inverted = AttributeMap::new();
    if let Some(base) = base {
        for (key, base_value) in base {
            let differs = attr
                .and_then(|a| a.get(key))
                .map_or(true, |value| value != base_value);
            if differs {
                inverted.insert(key.clone(), base_value.clone());
            }
        }
    }
    if let Some(attr) = attr {
        for key in attr.keys() {
            if base.map_or(true, |b| !b.contains_key(key)) {
                inverted.insert(key.clone(), Value::Null);
            }
        }
    }
    non_empty(inverted)
}

/// Record, for every key whose value differs between `a` and `b`, the value
/// in `b` (or `null` when `b` lacks the key).
pub fn diff(a: Option<&AttributeMap>, b: Option<&AttributeMap>) -> Option<AttributeMap> {
    let mut attributes = AttributeMap::new();
    let a_keys = a.into_iter().flat_map(Map::keys);
    let b_keys = b
        .into_iter()
        .flat_map(Map::keys)
        .filter(|key| a.map_or(true, |a| !a.contains_key(*key)));
    for key in a_keys.chain(b_keys) {
        let a_value = a.and_then(|m| m.get(key));
        let b_value = b.and_then(|m| m.get(key));
        if a_value != b_value {
            attributes.insert(key.clone(), b_value.cloned().unwrap_or(Value::Null));
        }
    }
    non_empty(attributes)
}

/// Rewrite `b` so it can apply after the concurrent `a`.
///
/// With `priority`, `a` wins conflicts and only `b`'s untouched keys survive;
/// without it, `b` overwrites and passes through unchanged.
pub fn transform(
    a: Option<&AttributeMap>,
    b: Option<&AttributeMap>,
    priority: bool,
) -> Option<AttributeMap> {
    let b = match b {
        Some(b) if !b.is_empty() => b,
        _ => return None,
    };
    if !priority {
        return Some(b.clone());
    }
    let attributes: AttributeMap = b
        .iter()
        .filter(|(key, _)| a.map_or(true, |a| !a.contains_key(*key)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    non_empty(attributes)
}

fn non_empty(attributes: AttributeMap) -> Option<AttributeMap> {
    if attributes.is_empty() {
        None
    } else {
        Some(attributes)
    }
}
