//! Deep read and create-on-write navigation through nested JSON values.
//!
//! A [`Path`] is an ordered sequence of [`Step`]s (text keys or positional
//! indexes) addressing a location inside a nested [`serde_json::Value`].
//! Reads signal a missing step by returning `None` rather than failing;
//! writes materialize missing intermediates as empty mappings.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Result, SiftError};

// ------------- Step -------------

/// One component of a [`Path`]: a text key into a mapping or a positional
/// index into a sequence.
///
/// Resolution is deliberately loose, mirroring untyped indexing: an index
/// applied to a mapping looks up its decimal rendering, and a key applied
/// to a sequence is positional when it parses as an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

impl Step {
    fn resolve<'a>(&self, node: &'a Value) -> Option<&'a Value> {
        match (self, node) {
            (Step::Key(k), Value::Object(map)) => map.get(k),
            (Step::Index(i), Value::Object(map)) => map.get(i.to_string().as_str()),
            (Step::Index(i), Value::Array(seq)) => seq.get(*i),
            (Step::Key(k), Value::Array(seq)) => {
                k.parse::<usize>().ok().and_then(|i| seq.get(i))
            }
            _ => None,
        }
    }

    fn resolve_mut<'a>(&self, node: &'a mut Value) -> Option<&'a mut Value> {
        match (self, node) {
            (Step::Key(k), Value::Object(map)) => map.get_mut(k),
            (Step::Index(i), Value::Object(map)) => map.get_mut(i.to_string().as_str()),
            (Step::Index(i), Value::Array(seq)) => seq.get_mut(*i),
            (Step::Key(k), Value::Array(seq)) => {
                k.parse::<usize>().ok().and_then(|i| seq.get_mut(i))
            }
            _ => None,
        }
    }

    // A missing step always materializes a mapping, even when the next step
    // is an index; index steps resolve through mappings by their decimal
    // rendering, so such paths still read back.
    fn resolve_or_create<'a>(&self, node: &'a mut Value) -> Result<&'a mut Value> {
        match node {
            Value::Object(map) => {
                let key = match self {
                    Step::Key(k) => k.clone(),
                    Step::Index(i) => i.to_string(),
                };
                Ok(map.entry(key).or_insert_with(|| Value::Object(Map::new())))
            }
            Value::Array(seq) => {
                let i = match self {
                    Step::Index(i) => *i,
                    Step::Key(k) => k.parse::<usize>().map_err(|_| {
                        SiftError::InvalidTarget(format!("key {} into a sequence", k))
                    })?,
                };
                if i >= seq.len() {
                    seq.resize(i + 1, Value::Null);
                }
                if seq[i].is_null() {
                    seq[i] = Value::Object(Map::new());
                }
                Ok(&mut seq[i])
            }
            other => Err(SiftError::InvalidTarget(format!(
                "step {} into {}",
                self,
                kind_of(other)
            ))),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Step::Key(k) => write!(f, "{}", k),
            Step::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Step {
    fn from(k: &str) -> Self {
        Step::Key(k.to_owned())
    }
}
impl From<String> for Step {
    fn from(k: String) -> Self {
        Step::Key(k)
    }
}
impl From<usize> for Step {
    fn from(i: usize) -> Self {
        Step::Index(i)
    }
}

// ------------- Path -------------

/// An ordered sequence of steps identifying a location inside a nested value.
///
/// Applying a path by repeated indexing either reaches a unique terminal
/// value or is undefined at some step. The empty path addresses the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path(Vec<Step>);

impl Path {
    pub fn new() -> Self {
        Self(Vec::new())
    }
    pub fn push(&mut self, step: impl Into<Step>) {
        self.0.push(step.into());
    }
    pub fn steps(&self) -> &[Step] {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = String::new();
        for step in &self.0 {
            s += &(step.to_string() + ".");
        }
        s.pop();
        write!(f, "{}", s)
    }
}

impl<S: Into<Step>, const N: usize> From<[S; N]> for Path {
    fn from(steps: [S; N]) -> Self {
        Self(steps.into_iter().map(Into::into).collect())
    }
}
impl<S: Into<Step>> From<Vec<S>> for Path {
    fn from(steps: Vec<S>) -> Self {
        Self(steps.into_iter().map(Into::into).collect())
    }
}
impl FromIterator<Step> for Path {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ------------- Traversal -------------

/// Walks `root` through the successive steps of `path`, read-only.
/// Returns `None` the instant a step is missing. The empty path yields
/// `root` itself.
pub fn traverse<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut node = root;
    for step in path.steps() {
        node = step.resolve(node)?;
    }
    Some(node)
}

/// Mutable form of [`traverse`]; never creates missing steps.
pub fn traverse_mut<'a>(root: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut node = root;
    for step in path.steps() {
        node = step.resolve_mut(node)?;
    }
    Some(node)
}

/// Walks `root` creating an empty mapping wherever a step is missing, and
/// returns the node at the end of the walk. Fails only when an existing
/// intermediate is a scalar that cannot hold children.
pub fn traverse_or_create<'a>(root: &'a mut Value, path: &Path) -> Result<&'a mut Value> {
    steps_or_create(root, path.steps())
}

fn steps_or_create<'a>(root: &'a mut Value, steps: &[Step]) -> Result<&'a mut Value> {
    let mut node = root;
    for step in steps {
        node = step.resolve_or_create(node)?;
    }
    Ok(node)
}

/// The terminal value at `path`, or `None` if any step is missing.
pub fn read<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    traverse(root, path)
}

/// The terminal value at `path`, or `default` when the path is missing.
/// A stored null also yields `default`: "absent" and "present but null"
/// are indistinguishable here. Use [`read`] when the distinction matters.
pub fn read_or<'a>(root: &'a Value, path: &Path, default: &'a Value) -> &'a Value {
    match traverse(root, path) {
        None | Some(Value::Null) => default,
        Some(value) => value,
    }
}

/// Creates intermediate mappings as needed, sets the terminal step to
/// `value` and returns a reference to the written value. A path of length
/// one sets directly on `root`; the empty path is not a writable location.
pub fn update<'a>(root: &'a mut Value, path: &Path, value: Value) -> Result<&'a Value> {
    let (last, parents) = path
        .steps()
        .split_last()
        .ok_or_else(|| SiftError::InvalidTarget("empty path".to_owned()))?;
    let parent = steps_or_create(root, parents)?;
    match (last, parent) {
        (Step::Key(k), Value::Object(map)) => {
            map.insert(k.clone(), value);
            Ok(&map[k])
        }
        (Step::Index(i), Value::Object(map)) => {
            let key = i.to_string();
            map.insert(key.clone(), value);
            Ok(&map[&key])
        }
        (step, Value::Array(seq)) => {
            let i = match step {
                Step::Index(i) => *i,
                Step::Key(k) => k.parse::<usize>().map_err(|_| {
                    SiftError::InvalidTarget(format!("key {} into a sequence", k))
                })?,
            };
            if i >= seq.len() {
                seq.resize(i + 1, Value::Null);
            }
            seq[i] = value;
            Ok(&seq[i])
        }
        (step, other) => Err(SiftError::InvalidTarget(format!(
            "step {} into {}",
            step,
            kind_of(other)
        ))),
    }
}

/// Navigates to the parent of the terminal step without creating missing
/// intermediates and deletes the terminal entry if present. Returns true
/// iff a deletion occurred. Removing a sequence element shifts later
/// elements down.
pub fn remove(root: &mut Value, path: &Path) -> bool {
    let Some((last, parents)) = path.steps().split_last() else {
        return false;
    };
    let mut node = &mut *root;
    for step in parents {
        match step.resolve_mut(node) {
            Some(next) => node = next,
            None => return false,
        }
    }
    match (last, node) {
        (Step::Key(k), Value::Object(map)) => map.shift_remove(k).is_some(),
        (Step::Index(i), Value::Object(map)) => {
            map.shift_remove(i.to_string().as_str()).is_some()
        }
        (step, Value::Array(seq)) => {
            let i = match step {
                Step::Index(i) => *i,
                Step::Key(k) => match k.parse::<usize>() {
                    Ok(i) => i,
                    Err(_) => return false,
                },
            };
            if i < seq.len() {
                seq.remove(i);
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
