//! Process-wide registry of embed handlers.
//!
//! An embed occupies one document position and is identified by the single
//! top-level key of its JSON value, e.g. `{"poll": {...}}` has embed type
//! `"poll"`. The algebra itself has no opinion on what is inside an embed;
//! when both sides of a compose/invert/transform present the same embed type,
//! it defers to the handler registered for that type.
//!
//! Handlers must be pure and reentrant. Writes to the registry are
//! serialized behind an `RwLock`; algebra calls only take read locks, so
//! concurrent readers never block each other. Register handlers before
//! running any algebra that can encounter their embed type.

use crate::error::DeltaError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Embed-type-specific algebra over embed payload values.
///
/// The payloads handed to a handler are the values *under* the embed type
/// key, and the returned value is wrapped back under the same key.
pub trait EmbedHandler: Send + Sync {
    /// Combine payload `b` applied after payload `a`. `keep_null` is true
    /// when `a` came from a retain, so unset markers must survive.
    fn compose(&self, a: &Value, b: &Value, keep_null: bool) -> Value;

    /// Produce the payload that undoes `a` against the embedded object
    /// state `base`.
    fn invert(&self, a: &Value, base: &Value) -> Value;

    /// Rewrite payload `b` so it applies after the concurrent payload `a`.
    fn transform(&self, a: &Value, b: &Value, priority: bool) -> Value;
}

type Registry = RwLock<HashMap<String, Arc<dyn EmbedHandler>>>;

static HANDLERS: OnceLock<Registry> = OnceLock::new();

fn handlers() -> &'static Registry {
    HANDLERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register `handler` for `embed_type`, replacing any previous handler.
pub fn register_embed(embed_type: impl Into<String>, handler: Arc<dyn EmbedHandler>) {
    handlers()
        .write()
        .expect("embed handler registry poisoned")
        .insert(embed_type.into(), handler);
}

pub fn unregister_embed(embed_type: &str) {
    handlers()
        .write()
        .expect("embed handler registry poisoned")
        .remove(embed_type);
}

pub fn find_handler(embed_type: &str) -> Option<Arc<dyn EmbedHandler>> {
    handlers()
        .read()
        .expect("embed handler registry poisoned")
        .get(embed_type)
        .cloned()
}

/// Like [`find_handler`], but an unregistered type is an error.
pub fn handler(embed_type: &str) -> Result<Arc<dyn EmbedHandler>, DeltaError> {
    find_handler(embed_type).ok_or_else(|| DeltaError::UnknownEmbedType(embed_type.to_string()))
}

/// Split two embed values into their shared type and the two payloads.
pub fn embed_type_and_data<'a>(
    a: &'a Value,
    b: &'a Value,
) -> Result<(&'a str, &'a Value, &'a Value), DeltaError> {
    let (Value::Object(a_map), Value::Object(b_map)) = (a, b) else {
        return Err(DeltaError::CannotRetainNonObject);
    };
    let a_type = a_map.keys().next();
    let b_type = b_map.keys().next();
    match (a_type, b_type) {
        (Some(a_type), Some(b_type)) if a_type == b_type => {
            Ok((a_type.as_str(), &a_map[a_type], &b_map[b_type]))
        }
        _ => Err(DeltaError::EmbedTypeMismatch {
            left: a_type.cloned().unwrap_or_default(),
            right: b_type.cloned().unwrap_or_default(),
        }),
    }
}

/// Wrap a handler result back under its embed type key.
pub(crate) fn wrap(embed_type: &str, data: Value) -> Value {
    let mut map = serde_json::Map::with_capacity(1);
    map.insert(embed_type.to_string(), data);
    Value::Object(map)
}
