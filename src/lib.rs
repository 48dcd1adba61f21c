//! Rowsift – a path-based accessor/query engine for semi-structured data.
//!
//! Rowsift operates on tree-shaped values (nested mappings and sequences,
//! as produced by parsing JSON-like documents) and centers on three
//! declarative specifications compiled once into reusable operations:
//! * A [`accessor::GetterSpec`] addresses a value buried arbitrarily deep
//!   inside a nested structure (a key, a [`path::Path`], or a function).
//! * A [`accessor::SetterSpec`] writes into such a structure, creating
//!   intermediate mappings on demand.
//! * A [`accessor::ValuerSpec`] tests a retrieved value against a pattern
//!   (literal, set membership, regular expression, sub-structure
//!   intersection, or arbitrary predicate).
//!
//! Compiled (getter, valuer) pairs form matchers, compiled
//! (getter, setter) pairs form translators, and a small library of bulk
//! operations (filter, extract, translate, rename, group, deduplicate,
//! union, tally, hash-index) folds them over collections of rows, where a
//! collection may be an ordered sequence or a keyed mapping and keeps its
//! kind through every operation.
//!
//! ## Modules
//! * [`path`] – Deep read / create-on-write navigation through nested
//!   values using ordered key sequences.
//! * [`accessor`] – The spec compiler: getter/setter/valuer specs, their
//!   compiled forms, qualifier batches, and spec-as-data interpretation.
//! * [`matching`] – Intersection tests and matcher-set evaluation with
//!   all-vs-any and exact-vs-partial semantics.
//! * [`translate`] – Copying/reshaping a source structure into a
//!   destination through compiled translator pairs.
//! * [`rows`] – Collection-level operations delegating each row to the
//!   engine above.
//! * [`error`] – The [`error::SiftError`] taxonomy surfaced by the strict
//!   compilation mode.
//!
//! ## Values
//! The universal data model is [`serde_json::Value`]; no engine-specific
//! wrapper crosses the public surface, so the engine composes with
//! JSON-derived structures from any serializer. Missing data never raises:
//! reads signal absence with null/`None` sentinels and bulk operations
//! fold malformed rows away rather than aborting, which suits loosely
//! structured external data where one bad record must not kill a batch.
//!
//! ## Quick Start
//! ```
//! use rowsift::accessor::MatcherSpec;
//! use rowsift::matching::MatcherSet;
//! use rowsift::rows;
//! use serde_json::json;
//!
//! let people = json!([{"age": 7}, {"age": 8}, {"age": 88}]);
//! let eights = MatcherSet::all(vec![MatcherSpec::new("age", json!(8))]);
//! assert_eq!(rows::filter_by_matchers(people, &eights), json!([{"age": 8}]));
//! ```
//!
//! Specs are data: the same matcher set can be loaded from a JSON
//! document with [`matching::MatcherSet::from_value`], and translator
//! batches with [`accessor::translators_from_value`].
//!
//! ## Concurrency
//! The engine is synchronous and single-threaded; every operation is a
//! pure function of its inputs apart from in-place writes to an explicitly
//! passed target. Compiled specs are `Send + Sync` and may be cached and
//! shared; concurrent use against shared mutable data is the caller's
//! problem to serialize.

pub mod accessor;
pub mod error;
pub mod matching;
pub mod path;
pub mod rows;
pub mod translate;
