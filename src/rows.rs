//! Bulk operations over collections of rows.
//!
//! A collection is a plain JSON value holding rows either as an ordered
//! sequence or as a keyed mapping. Every operation is polymorphic over
//! that choice and, unless its semantics require re-keying (grouping,
//! deduplication, hashing by a derived key), preserves it: a sequence
//! comes back as a sequence re-packed from index 0, a mapping comes back
//! with its original keys in their original order. A non-collection input
//! folds to the empty mapping.
//!
//! Rows passed by value are moved, not cloned, into the result; operations
//! that keep the input alive take it by reference and build fresh rows.
//! All operations are pure passes with no cross-call state; compile the
//! specs once and reuse them across calls.

use std::collections::HashSet;
use std::hash::BuildHasherDefault;

use seahash::SeaHasher;
use serde_json::map::Entry;
use serde_json::{Map, Value, json};

use crate::accessor::{Getter, Translator};
use crate::matching::{self, MatcherSet};
use crate::translate;

// fast hashing for sets keyed by derived strings
pub type KeyHasher = BuildHasherDefault<SeaHasher>;

// ------------- Row iteration -------------

fn map_rows(rows: &Value, mut f: impl FnMut(&Value) -> Value) -> Value {
    match rows {
        Value::Array(seq) => Value::Array(seq.iter().map(|row| f(row)).collect()),
        Value::Object(map) => {
            Value::Object(map.iter().map(|(key, row)| (key.clone(), f(row))).collect())
        }
        _ => Value::Object(Map::new()),
    }
}

fn retain_rows(rows: Value, mut keep: impl FnMut(&Value) -> bool) -> Value {
    match rows {
        Value::Array(seq) => Value::Array(seq.into_iter().filter(|row| keep(row)).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().filter(|(_, row)| keep(row)).collect())
        }
        _ => Value::Object(Map::new()),
    }
}

fn into_row_values(rows: Value) -> Vec<Value> {
    match rows {
        Value::Array(seq) => seq,
        Value::Object(map) => map.into_iter().map(|(_, row)| row).collect(),
        _ => Vec::new(),
    }
}

fn row_values(rows: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match rows {
        Value::Array(seq) => Box::new(seq.iter()),
        Value::Object(map) => Box::new(map.values()),
        _ => Box::new(std::iter::empty()),
    }
}

fn row_entries(rows: &Value) -> Vec<(String, &Value)> {
    match rows {
        Value::Array(seq) => seq
            .iter()
            .enumerate()
            .map(|(i, row)| (i.to_string(), row))
            .collect(),
        Value::Object(map) => map.iter().map(|(key, row)| (key.clone(), row)).collect(),
        _ => Vec::new(),
    }
}

/// The key a derived value indexes under: a string keys as itself, any
/// other value as its compact JSON rendering.
fn derived_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ------------- Operations -------------

/// Per row, the ordered sequence of each compiled getter's extraction.
pub fn extract(rows: &Value, getters: &[Getter]) -> Value {
    map_rows(rows, |row| {
        Value::Array(getters.iter().map(|getter| getter.get(row)).collect())
    })
}

/// Keeps the rows the matcher set accepts. Kept rows are moved, not
/// cloned; a sequence re-packs contiguously, a mapping keeps its keys.
pub fn filter_by_matchers(rows: Value, set: &MatcherSet) -> Value {
    retain_rows(rows, |row| set.is_match(row))
}

/// Object-wise convenience filter: each row is compared directly against a
/// literal pattern, by deep equality when `exact` or by intersection (any
/// shared element or entry) otherwise. No spec compilation involved.
pub fn filter_by_pattern(rows: Value, pattern: &Value, exact: bool) -> Value {
    retain_rows(rows, |row| {
        if exact {
            row == pattern
        } else {
            matching::intersects(pattern, row)
        }
    })
}

/// Per row, a freshly built destination produced by the translator batch.
/// The result never aliases the source rows.
pub fn translate_all(rows: &Value, translators: &[Translator]) -> Value {
    map_rows(rows, |row| translate::translate(row, translators))
}

/// Per row, a new row with the fields named in `old_keys` stored under the
/// corresponding `new_keys` name (the old name when `new_keys` is omitted
/// or shorter). With `keep_only_renamed` false, all remaining source
/// fields are carried across first and the renamed fields extend them.
/// Pairs absent from a source row are skipped. Non-mapping rows come back
/// empty.
pub fn rename_fields(
    rows: &Value,
    old_keys: &[&str],
    new_keys: Option<&[&str]>,
    keep_only_renamed: bool,
) -> Value {
    map_rows(rows, |row| {
        let Value::Object(source) = row else {
            return Value::Object(Map::new());
        };
        let mut renamed = if keep_only_renamed {
            Map::new()
        } else {
            let mut rest = source.clone();
            for old in old_keys {
                rest.shift_remove(*old);
            }
            rest
        };
        for (i, old) in old_keys.iter().enumerate() {
            if let Some(value) = source.get(*old) {
                let name = new_keys.and_then(|keys| keys.get(i)).unwrap_or(old);
                renamed.insert((*name).to_owned(), value.clone());
            }
        }
        Value::Object(renamed)
    })
}

/// Buckets rows into a mapping from derived key to the sequence of rows
/// sharing it. Bucket order follows the first occurrence of each distinct
/// key; within a bucket, input order is preserved. Every input row lands
/// in exactly one bucket.
pub fn group_by(rows: Value, getter: &Getter) -> Value {
    let mut buckets = Map::new();
    for row in into_row_values(rows) {
        let key = derived_key(&getter.get(&row));
        if let Value::Array(bucket) = buckets
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            bucket.push(row);
        }
    }
    Value::Object(buckets)
}

/// What [`deduplicate`] records per distinct derived key.
pub enum DedupMode<'a> {
    /// Only that the key was seen: the numeric marker 1.
    Marker,
    /// The first row carrying the key.
    Whole,
    /// A translated projection of the first row.
    Project(&'a [Translator]),
}

/// Mapping from derived key to the first row (or marker, or projection)
/// carrying it; later rows sharing a key are dropped. Applying it again
/// to its own output with the same getter is a no-op for [`DedupMode::Whole`].
pub fn deduplicate(rows: Value, getter: &Getter, mode: DedupMode) -> Value {
    let mut kept = Map::new();
    for row in into_row_values(rows) {
        let key = derived_key(&getter.get(&row));
        if kept.contains_key(key.as_str()) {
            continue;
        }
        let entry = match &mode {
            DedupMode::Marker => json!(1),
            DedupMode::Whole => row,
            DedupMode::Project(translators) => translate::translate(&row, translators),
        };
        kept.insert(key, entry);
    }
    Value::Object(kept)
}

/// All of `rows1` (moved, unmodified) followed by every row of `rows2`
/// whose derived key does not already appear among `rows1`'s derived keys.
/// `rows1` wins ties; `rows2` contributions are copies. Assumes each side
/// holds unique keys of its own. The result takes `rows1`'s container
/// kind; on a mapping, a colliding key keeps the `rows1` entry.
pub fn union(rows1: Value, rows2: &Value, getter: &Getter) -> Value {
    let mut seen: HashSet<String, KeyHasher> = HashSet::default();
    for row in row_values(&rows1) {
        seen.insert(derived_key(&getter.get(row)));
    }
    match rows1 {
        Value::Array(mut seq) => {
            for (_, row) in row_entries(rows2) {
                if !seen.contains(derived_key(&getter.get(row)).as_str()) {
                    seq.push(row.clone());
                }
            }
            Value::Array(seq)
        }
        Value::Object(mut map) => {
            for (key, row) in row_entries(rows2) {
                if seen.contains(derived_key(&getter.get(row)).as_str()) {
                    continue;
                }
                map.entry(key).or_insert_with(|| row.clone());
            }
            Value::Object(map)
        }
        _ => Value::Object(Map::new()),
    }
}

/// Mapping from derived key to the count of rows carrying it, keyed in
/// first-occurrence order.
pub fn tally(rows: &Value, getter: &Getter) -> Value {
    let mut tally = Map::new();
    for row in row_values(rows) {
        let key = derived_key(&getter.get(row));
        match tally.entry(key) {
            Entry::Occupied(mut entry) => {
                let count = entry.get().as_u64().unwrap_or(0);
                *entry.get_mut() = json!(count + 1);
            }
            Entry::Vacant(entry) => {
                entry.insert(json!(1));
            }
        }
    }
    Value::Object(tally)
}

/// Mapping from derived key to `default` when supplied, otherwise to the
/// row itself. Unlike [`deduplicate`], the LAST row carrying a key wins.
pub fn hash_index(rows: Value, getter: &Getter, default: Option<Value>) -> Value {
    let mut index = Map::new();
    for row in into_row_values(rows) {
        let key = derived_key(&getter.get(&row));
        let entry = match &default {
            Some(value) => value.clone(),
            None => row,
        };
        index.insert(key, entry);
    }
    Value::Object(index)
}

/// Flattens a sequence (nested sequences splatted through) and produces a
/// mapping from each element's derived key to `default`, or the numeric
/// marker 1. A non-sequence input yields the empty mapping.
pub fn hashify(values: &Value, default: Option<Value>) -> Value {
    let marker = default.unwrap_or_else(|| json!(1));
    let mut result = Map::new();
    if let Value::Array(seq) = values {
        let mut flat = Vec::new();
        for element in seq {
            flatten_into(element, &mut flat);
        }
        for element in flat {
            result.insert(derived_key(element), marker.clone());
        }
    }
    Value::Object(result)
}

fn flatten_into<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(seq) => {
            for element in seq {
                flatten_into(element, out);
            }
        }
        other => out.push(other),
    }
}

/// The inverse of [`hash_index`] with a default: explodes a collection
/// into a sequence of `{key_field: key, value_field: value}` rows, one per
/// entry, in entry order. Field names default to `"key"` and `"value"`.
pub fn arrayify(rows: &Value, key_field: Option<&str>, value_field: Option<&str>) -> Value {
    let key_field = key_field.unwrap_or("key");
    let value_field = value_field.unwrap_or("value");
    let mut result = Vec::new();
    for (key, value) in row_entries(rows) {
        let mut row = Map::new();
        row.insert(key_field.to_owned(), Value::String(key));
        row.insert(value_field.to_owned(), value.clone());
        result.push(Value::Object(row));
    }
    Value::Array(result)
}
