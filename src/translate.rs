//! Copying and reshaping one structure into another through compiled
//! (getter, setter) pairs.

use serde_json::{Map, Value};
use tracing::warn;

use crate::accessor::Translator;

/// Applies each pair in sequence: extract from `source`, write into
/// `destination`. A failing setter aborts the remaining pairs immediately
/// and leaves the destination as populated so far with no rollback. The
/// failure is logged, never propagated; callers treat a partial result
/// from a failed translation as a signal to discard, not trust.
pub fn translate_one(source: &Value, destination: &mut Value, translators: &[Translator]) {
    for translator in translators {
        let value = translator.getter().get(source);
        if let Err(error) = translator.setter().set(destination, value, source) {
            warn!(error = %error, "translation aborted, destination left partial");
            return;
        }
    }
}

/// [`translate_one`] into a fresh empty mapping.
pub fn translate(source: &Value, translators: &[Translator]) -> Value {
    let mut destination = Value::Object(Map::new());
    translate_one(source, &mut destination, translators);
    destination
}
