//! Boolean matching over extracted values.
//!
//! The matching engine evaluates compiled (getter, valuer) pairs against a
//! candidate value with configurable conjunction/disjunction semantics, and
//! supplies the intersection tests that partial (non-exact) valuers and
//! object-wise filtering are built on. Deep equality is `Value` equality.

use serde_json::{Map, Value};

use crate::accessor::{Matcher, MatcherSpec, compile_matchers};
use crate::error::Result;

// ------------- Intersection -------------

/// True when the two sequences share at least one element by deep equality.
pub fn seq_intersects(a: &[Value], b: &[Value]) -> bool {
    a.iter().any(|x| b.contains(x))
}

/// True when at least one key of `pattern` exists in `candidate` with a
/// deep-equal value. A sequence candidate is probed positionally through
/// the pattern's numeric keys.
pub fn map_intersects(pattern: &Map<String, Value>, candidate: &Value) -> bool {
    pattern.iter().any(|(key, expected)| match candidate {
        Value::Object(map) => map.get(key).is_some_and(|found| found == expected),
        Value::Array(seq) => key
            .parse::<usize>()
            .ok()
            .and_then(|i| seq.get(i))
            .is_some_and(|found| found == expected),
        _ => false,
    })
}

/// Partial-match dispatch on the pattern's kind: a sequence pattern tests
/// for a shared element (or plain membership when the candidate is not a
/// sequence), a mapping pattern tests for a shared entry, and a scalar
/// pattern falls back to equality.
pub fn intersects(pattern: &Value, candidate: &Value) -> bool {
    match pattern {
        Value::Array(elements) => match candidate {
            Value::Array(others) => seq_intersects(elements, others),
            other => elements.contains(other),
        },
        Value::Object(entries) => map_intersects(entries, candidate),
        scalar => scalar == candidate,
    }
}

// ------------- Matcher sets -------------

/// Evaluates each compiled pair as `valuer(getter(value))`. With `all` the
/// result is a conjunction failing on the first miss; without it, a
/// disjunction succeeding on the first hit. Zero matchers are vacuously
/// true for a conjunction and vacuously false for a disjunction.
pub fn matches(value: &Value, matchers: &[Matcher], all: bool) -> bool {
    for matcher in matchers {
        if matcher.valuer().test(&matcher.getter().get(value)) {
            if !all {
                return true;
            }
        } else if all {
            return false;
        }
    }
    all
}

/// A compiled matcher set: the reusable form of a batch of qualifier
/// specs, plus the conjunction/disjunction choice.
#[derive(Debug)]
pub struct MatcherSet {
    matchers: Vec<Matcher>,
    all: bool,
}

impl MatcherSet {
    pub fn new(specs: Vec<MatcherSpec>, all: bool) -> Self {
        Self {
            matchers: compile_matchers(specs),
            all,
        }
    }
    /// Conjunction: every qualifier must hold.
    pub fn all(specs: Vec<MatcherSpec>) -> Self {
        Self::new(specs, true)
    }
    /// Disjunction: any qualifier suffices.
    pub fn any(specs: Vec<MatcherSpec>) -> Self {
        Self::new(specs, false)
    }
    /// Compiles a matcher set from a JSON sequence of qualifier documents,
    /// e.g. `[{"getter": "age", "valuer": 8}]`.
    pub fn from_value(specs: Value, all: bool) -> Result<Self> {
        let specs = MatcherSpec::batch_from_value(specs)?;
        Ok(Self::new(specs, all))
    }
    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }
    pub fn is_conjunction(&self) -> bool {
        self.all
    }
    pub fn is_match(&self, value: &Value) -> bool {
        matches(value, &self.matchers, self.all)
    }
}
