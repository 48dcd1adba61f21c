//! The accessor compiler: declarative getter/setter/valuer specifications
//! compiled once into reusable operations.
//!
//! A spec is a tagged variant resolved at compile time (a text key, a
//! [`Path`], a function, or (for valuers) a literal pattern) so that no
//! per-invocation kind inspection remains. Because specs are data in the
//! systems this engine serves, every spec can also be interpreted from a
//! plain JSON value: permissively via `from_value` (an unrecognized kind
//! demotes to a safe fallback, which callers rely on when passing literal
//! constants as getters) or strictly via `try_from_value` (an unrecognized
//! kind is reported as [`SiftError::UnrecognizedSpec`]).
//!
//! Compiled [`Getter`]s, [`Setter`]s and [`Valuer`]s are pure functions of
//! their captured spec, `Send + Sync`, and meant to be cached and reused.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SiftError};
use crate::matching::intersects;
use crate::path::{self, Path, Step, kind_of};

/// Computed extraction: source to extracted value.
pub type GetterFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;
/// Computed write: (target, value, source) to written value. The source
/// object being read from is passed along for context-dependent writes.
pub type SetterFn = Arc<dyn Fn(&mut Value, Value, &Value) -> Result<Value> + Send + Sync>;
/// Arbitrary predicate over an extracted value.
pub type ValuerFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

// ------------- Specs -------------

/// Where to read from: a single-level key, a deep path, a computed
/// extraction, or a constant.
///
/// `Const` is the permissive fallback for specs of unrecognized kind: the
/// literal is returned for every source. Valuer compilation leans on this
/// branch; getter compilation proper never produces it from typed
/// construction, only from [`GetterSpec::from_value`].
#[derive(Clone)]
pub enum GetterSpec {
    Key(String),
    Index(usize),
    Path(Path),
    Fn(GetterFn),
    Const(Value),
}

impl GetterSpec {
    pub fn func(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        GetterSpec::Fn(Arc::new(f))
    }

    /// Interprets a JSON value as a getter spec: a string is a key, an
    /// integer an index, a sequence of keys/indexes a path. Anything else
    /// compiles to a constant returning itself.
    pub fn from_value(spec: Value) -> Self {
        match Self::classify(spec) {
            Ok(spec) => spec,
            Err(literal) => {
                debug!(spec = %literal, "getter spec of unrecognized kind, compiled to a constant");
                GetterSpec::Const(literal)
            }
        }
    }

    /// Strict form of [`GetterSpec::from_value`].
    pub fn try_from_value(spec: Value) -> Result<Self> {
        Self::classify(spec).map_err(|literal| {
            SiftError::UnrecognizedSpec(format!("{} cannot act as a getter", kind_of(&literal)))
        })
    }

    fn classify(spec: Value) -> std::result::Result<Self, Value> {
        match spec {
            Value::String(key) => Ok(GetterSpec::Key(key)),
            Value::Number(n) => match n.as_u64() {
                Some(i) => Ok(GetterSpec::Index(i as usize)),
                None => Err(Value::Number(n)),
            },
            Value::Array(elements) => match path_from_elements(&elements) {
                Some(path) => Ok(GetterSpec::Path(path)),
                None => Err(Value::Array(elements)),
            },
            other => Err(other),
        }
    }
}

impl fmt::Debug for GetterSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GetterSpec::Key(k) => f.debug_tuple("Key").field(k).finish(),
            GetterSpec::Index(i) => f.debug_tuple("Index").field(i).finish(),
            GetterSpec::Path(p) => f.debug_tuple("Path").field(p).finish(),
            GetterSpec::Fn(_) => f.write_str("Fn(..)"),
            GetterSpec::Const(v) => f.debug_tuple("Const").field(v).finish(),
        }
    }
}

impl From<&str> for GetterSpec {
    fn from(key: &str) -> Self {
        GetterSpec::Key(key.to_owned())
    }
}
impl From<String> for GetterSpec {
    fn from(key: String) -> Self {
        GetterSpec::Key(key)
    }
}
impl From<usize> for GetterSpec {
    fn from(index: usize) -> Self {
        GetterSpec::Index(index)
    }
}
impl From<Path> for GetterSpec {
    fn from(path: Path) -> Self {
        GetterSpec::Path(path)
    }
}
impl<S: Into<Step>, const N: usize> From<[S; N]> for GetterSpec {
    fn from(steps: [S; N]) -> Self {
        GetterSpec::Path(Path::from(steps))
    }
}

/// Where to write to: mirrors [`GetterSpec`], with the function variant
/// invoked as (target, value, source).
#[derive(Clone)]
pub enum SetterSpec {
    Key(String),
    Index(usize),
    Path(Path),
    Fn(SetterFn),
}

impl SetterSpec {
    pub fn func(
        f: impl Fn(&mut Value, Value, &Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        SetterSpec::Fn(Arc::new(f))
    }

    /// Interprets a JSON value as a setter spec. An unrecognized kind
    /// falls back to direct single-level assignment under the literal
    /// key `"key"`.
    pub fn from_value(spec: Value) -> Self {
        match Self::classify(spec) {
            Ok(spec) => spec,
            Err(literal) => {
                debug!(spec = %literal, "setter spec of unrecognized kind, assigning under the literal key");
                SetterSpec::Key("key".to_owned())
            }
        }
    }

    /// Strict form of [`SetterSpec::from_value`].
    pub fn try_from_value(spec: Value) -> Result<Self> {
        Self::classify(spec).map_err(|literal| {
            SiftError::UnrecognizedSpec(format!("{} cannot act as a setter", kind_of(&literal)))
        })
    }

    fn classify(spec: Value) -> std::result::Result<Self, Value> {
        match spec {
            Value::String(key) => Ok(SetterSpec::Key(key)),
            Value::Number(n) => match n.as_u64() {
                Some(i) => Ok(SetterSpec::Index(i as usize)),
                None => Err(Value::Number(n)),
            },
            Value::Array(elements) => match path_from_elements(&elements) {
                Some(path) => Ok(SetterSpec::Path(path)),
                None => Err(Value::Array(elements)),
            },
            other => Err(other),
        }
    }
}

impl fmt::Debug for SetterSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SetterSpec::Key(k) => f.debug_tuple("Key").field(k).finish(),
            SetterSpec::Index(i) => f.debug_tuple("Index").field(i).finish(),
            SetterSpec::Path(p) => f.debug_tuple("Path").field(p).finish(),
            SetterSpec::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

impl From<&str> for SetterSpec {
    fn from(key: &str) -> Self {
        SetterSpec::Key(key.to_owned())
    }
}
impl From<String> for SetterSpec {
    fn from(key: String) -> Self {
        SetterSpec::Key(key)
    }
}
impl From<usize> for SetterSpec {
    fn from(index: usize) -> Self {
        SetterSpec::Index(index)
    }
}
impl From<Path> for SetterSpec {
    fn from(path: Path) -> Self {
        SetterSpec::Path(path)
    }
}
impl<S: Into<Step>, const N: usize> From<[S; N]> for SetterSpec {
    fn from(steps: [S; N]) -> Self {
        SetterSpec::Path(Path::from(steps))
    }
}

/// What to test an extracted value against: a literal pattern (scalar,
/// sequence or mapping; semantics depend on its kind and the exact flag,
/// see [`Valuer::compile`]), a regular expression, or a predicate.
#[derive(Clone)]
pub enum ValuerSpec {
    Literal(Value),
    Pattern(Regex),
    Fn(ValuerFn),
}

impl ValuerSpec {
    pub fn func(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        ValuerSpec::Fn(Arc::new(f))
    }

    /// Interprets a JSON value as a valuer spec. Every value is a valid
    /// literal pattern; the one special form is a single-entry mapping
    /// `{"regex": "..."}` compiling to a pattern valuer. An invalid
    /// pattern falls back to the literal.
    pub fn from_value(spec: Value) -> Self {
        match Self::classify(spec) {
            Ok(spec) => spec,
            Err((literal, error)) => {
                debug!(error = %error, "pattern did not compile, falling back to the literal");
                ValuerSpec::Literal(literal)
            }
        }
    }

    /// Strict form of [`ValuerSpec::from_value`]: an invalid pattern is
    /// reported instead of demoted.
    pub fn try_from_value(spec: Value) -> Result<Self> {
        Self::classify(spec).map_err(|(_, error)| error)
    }

    fn classify(spec: Value) -> std::result::Result<Self, (Value, SiftError)> {
        let pattern = match &spec {
            Value::Object(entries) if entries.len() == 1 => match entries.get("regex") {
                Some(Value::String(pattern)) => Some(pattern.clone()),
                _ => None,
            },
            _ => None,
        };
        match pattern {
            Some(pattern) => match Regex::new(&pattern) {
                Ok(re) => Ok(ValuerSpec::Pattern(re)),
                Err(e) => Err((spec, e.into())),
            },
            None => Ok(ValuerSpec::Literal(spec)),
        }
    }
}

impl fmt::Debug for ValuerSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValuerSpec::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            ValuerSpec::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            ValuerSpec::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

impl From<Value> for ValuerSpec {
    fn from(literal: Value) -> Self {
        ValuerSpec::Literal(literal)
    }
}
impl From<&str> for ValuerSpec {
    fn from(literal: &str) -> Self {
        ValuerSpec::Literal(Value::String(literal.to_owned()))
    }
}
impl From<i64> for ValuerSpec {
    fn from(literal: i64) -> Self {
        ValuerSpec::Literal(Value::from(literal))
    }
}
impl From<bool> for ValuerSpec {
    fn from(literal: bool) -> Self {
        ValuerSpec::Literal(Value::Bool(literal))
    }
}
impl From<Regex> for ValuerSpec {
    fn from(pattern: Regex) -> Self {
        ValuerSpec::Pattern(pattern)
    }
}

fn path_from_elements(elements: &[Value]) -> Option<Path> {
    let mut steps = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Value::String(key) => steps.push(Step::Key(key.clone())),
            Value::Number(n) => steps.push(Step::Index(n.as_u64()? as usize)),
            _ => return None,
        }
    }
    Some(Path::from(steps))
}

// ------------- Compiled forms -------------

/// A compiled extraction. Missing locations extract as null, the engine's
/// "not found" sentinel.
pub struct Getter {
    kind: GetterKind,
}

enum GetterKind {
    Path(Path),
    Fn(GetterFn),
    Const(Value),
}

impl Getter {
    pub fn compile(spec: GetterSpec) -> Self {
        let kind = match spec {
            GetterSpec::Key(key) => GetterKind::Path(Path::from([Step::Key(key)])),
            GetterSpec::Index(i) => GetterKind::Path(Path::from([Step::Index(i)])),
            GetterSpec::Path(p) => GetterKind::Path(p),
            GetterSpec::Fn(f) => GetterKind::Fn(f),
            GetterSpec::Const(v) => GetterKind::Const(v),
        };
        Self { kind }
    }

    pub fn get(&self, source: &Value) -> Value {
        match &self.kind {
            GetterKind::Path(p) => path::traverse(source, p).cloned().unwrap_or(Value::Null),
            GetterKind::Fn(f) => f(source),
            GetterKind::Const(v) => v.clone(),
        }
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            GetterKind::Path(p) => f.debug_tuple("Getter").field(&p.to_string()).finish(),
            GetterKind::Fn(_) => f.write_str("Getter(fn)"),
            GetterKind::Const(v) => f.debug_tuple("Getter").field(v).finish(),
        }
    }
}

/// A compiled write into a destination, creating intermediate mappings on
/// demand. Returns the written value.
pub struct Setter {
    kind: SetterKind,
}

enum SetterKind {
    Path(Path),
    Fn(SetterFn),
}

impl Setter {
    pub fn compile(spec: SetterSpec) -> Self {
        let kind = match spec {
            SetterSpec::Key(key) => SetterKind::Path(Path::from([Step::Key(key)])),
            SetterSpec::Index(i) => SetterKind::Path(Path::from([Step::Index(i)])),
            SetterSpec::Path(p) => SetterKind::Path(p),
            SetterSpec::Fn(f) => SetterKind::Fn(f),
        };
        Self { kind }
    }

    pub fn set(&self, target: &mut Value, value: Value, source: &Value) -> Result<Value> {
        match &self.kind {
            SetterKind::Path(p) => path::update(target, p, value).cloned(),
            SetterKind::Fn(f) => f(target, value, source),
        }
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            SetterKind::Path(p) => f.debug_tuple("Setter").field(&p.to_string()).finish(),
            SetterKind::Fn(_) => f.write_str("Setter(fn)"),
        }
    }
}

/// A compiled predicate over an extracted value. The exact/partial choice
/// is resolved once at compilation into the concrete semantics.
pub struct Valuer {
    kind: ValuerKind,
}

enum ValuerKind {
    Equals(Value),
    Intersects(Value),
    Pattern(Regex),
    Predicate(ValuerFn),
}

impl Valuer {
    /// With `exact`, a literal pattern means deep equality whatever its
    /// kind. Without it, a sequence pattern means membership (or a shared
    /// element when the candidate is itself a sequence) and a mapping
    /// pattern means a shared entry; scalars stay equality either way.
    pub fn compile(spec: ValuerSpec, exact: bool) -> Self {
        let kind = match spec {
            ValuerSpec::Literal(v) => {
                if exact || !(v.is_array() || v.is_object()) {
                    ValuerKind::Equals(v)
                } else {
                    ValuerKind::Intersects(v)
                }
            }
            ValuerSpec::Pattern(re) => ValuerKind::Pattern(re),
            ValuerSpec::Fn(f) => ValuerKind::Predicate(f),
        };
        Self { kind }
    }

    pub fn test(&self, candidate: &Value) -> bool {
        match &self.kind {
            ValuerKind::Equals(pattern) => pattern == candidate,
            ValuerKind::Intersects(pattern) => intersects(pattern, candidate),
            // a candidate that has no text rendering is a non-match,
            // never an error
            ValuerKind::Pattern(re) => match text_of(candidate) {
                Some(text) => re.is_match(&text),
                None => false,
            },
            ValuerKind::Predicate(f) => f(candidate),
        }
    }
}

impl fmt::Debug for Valuer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ValuerKind::Equals(v) => f.debug_tuple("Valuer::Equals").field(v).finish(),
            ValuerKind::Intersects(v) => f.debug_tuple("Valuer::Intersects").field(v).finish(),
            ValuerKind::Pattern(re) => f.debug_tuple("Valuer::Pattern").field(&re.as_str()).finish(),
            ValuerKind::Predicate(_) => f.write_str("Valuer::Predicate(fn)"),
        }
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ------------- Qualifiers -------------

/// One matching qualifier: where to read and what to test it against.
/// Per-qualifier `exact` defaults to true when unspecified.
#[derive(Debug, Clone)]
pub struct MatcherSpec {
    pub getter: GetterSpec,
    pub valuer: ValuerSpec,
    pub exact: Option<bool>,
}

impl MatcherSpec {
    pub fn new(getter: impl Into<GetterSpec>, valuer: impl Into<ValuerSpec>) -> Self {
        Self {
            getter: getter.into(),
            valuer: valuer.into(),
            exact: None,
        }
    }
    /// Selects intersection/membership semantics for this qualifier.
    pub fn partial(mut self) -> Self {
        self.exact = Some(false);
        self
    }

    /// Interprets a qualifier document, e.g.
    /// `{"getter": ["name", "last"], "valuer": ["doe", "lee"], "exact": false}`.
    /// A missing valuer defaults to the getter spec itself, which is how
    /// pure field-extraction qualifiers are written.
    pub fn from_value(spec: Value) -> Result<Self> {
        let Value::Object(mut entries) = spec else {
            return Err(SiftError::UnrecognizedSpec(
                "a qualifier must be a mapping with a getter".to_owned(),
            ));
        };
        let raw_getter = entries
            .remove("getter")
            .ok_or_else(|| SiftError::UnrecognizedSpec("qualifier without a getter".to_owned()))?;
        let raw_valuer = entries.remove("valuer").unwrap_or_else(|| raw_getter.clone());
        let exact = entries.remove("exact").and_then(|v| v.as_bool());
        Ok(Self {
            getter: GetterSpec::from_value(raw_getter),
            valuer: ValuerSpec::from_value(raw_valuer),
            exact,
        })
    }

    /// Interprets a sequence of qualifier documents.
    pub fn batch_from_value(specs: Value) -> Result<Vec<Self>> {
        let Value::Array(elements) = specs else {
            return Err(SiftError::UnrecognizedSpec(
                "a qualifier batch must be a sequence".to_owned(),
            ));
        };
        elements.into_iter().map(Self::from_value).collect()
    }
}

impl<'de> Deserialize<'de> for MatcherSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        MatcherSpec::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// One translation qualifier: where to read and where to write. A missing
/// setter defaults to the getter's key/path as the destination.
#[derive(Debug, Clone)]
pub struct TranslatorSpec {
    pub getter: GetterSpec,
    pub setter: Option<SetterSpec>,
}

impl TranslatorSpec {
    pub fn new(getter: impl Into<GetterSpec>) -> Self {
        Self {
            getter: getter.into(),
            setter: None,
        }
    }
    pub fn to(mut self, setter: impl Into<SetterSpec>) -> Self {
        self.setter = Some(setter.into());
        self
    }

    /// Interprets a translator document, e.g.
    /// `{"getter": ["name", "last"], "setter": "lastname"}`.
    pub fn from_value(spec: Value) -> Result<Self> {
        let Value::Object(mut entries) = spec else {
            return Err(SiftError::UnrecognizedSpec(
                "a translator must be a mapping with a getter".to_owned(),
            ));
        };
        let raw_getter = entries
            .remove("getter")
            .ok_or_else(|| SiftError::UnrecognizedSpec("translator without a getter".to_owned()))?;
        let setter = entries.remove("setter").map(SetterSpec::from_value);
        Ok(Self {
            getter: GetterSpec::from_value(raw_getter),
            setter,
        })
    }

    /// Interprets a sequence of translator documents.
    pub fn batch_from_value(specs: Value) -> Result<Vec<Self>> {
        let Value::Array(elements) = specs else {
            return Err(SiftError::UnrecognizedSpec(
                "a translator batch must be a sequence".to_owned(),
            ));
        };
        elements.into_iter().map(Self::from_value).collect()
    }
}

impl<'de> Deserialize<'de> for TranslatorSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        TranslatorSpec::from_value(value).map_err(serde::de::Error::custom)
    }
}

// ------------- Batch compilation -------------

/// A compiled (getter, valuer) pair.
#[derive(Debug)]
pub struct Matcher {
    getter: Getter,
    valuer: Valuer,
}

impl Matcher {
    pub fn getter(&self) -> &Getter {
        &self.getter
    }
    pub fn valuer(&self) -> &Valuer {
        &self.valuer
    }
}

/// A compiled (getter, setter) pair.
#[derive(Debug)]
pub struct Translator {
    getter: Getter,
    setter: Setter,
}

impl Translator {
    pub fn getter(&self) -> &Getter {
        &self.getter
    }
    pub fn setter(&self) -> &Setter {
        &self.setter
    }
}

/// Single pass over a qualifier batch, compiling each getter and valuer
/// independently. Per-qualifier exact defaults to true.
pub fn compile_matchers(specs: Vec<MatcherSpec>) -> Vec<Matcher> {
    specs
        .into_iter()
        .map(|spec| {
            let exact = spec.exact.unwrap_or(true);
            Matcher {
                getter: Getter::compile(spec.getter),
                valuer: Valuer::compile(spec.valuer, exact),
            }
        })
        .collect()
}

/// Single pass over a translator batch. A missing setter derives its
/// destination from the getter's key/path; a destination cannot be derived
/// from a function or constant getter, which falls back to assignment
/// under the literal key `"key"`.
pub fn compile_translators(specs: Vec<TranslatorSpec>) -> Vec<Translator> {
    specs
        .into_iter()
        .map(|spec| {
            let setter_spec = spec.setter.unwrap_or_else(|| derived_setter(&spec.getter));
            Translator {
                getter: Getter::compile(spec.getter),
                setter: Setter::compile(setter_spec),
            }
        })
        .collect()
}

/// Compiles a JSON sequence of translator documents in one step.
pub fn translators_from_value(specs: Value) -> Result<Vec<Translator>> {
    Ok(compile_translators(TranslatorSpec::batch_from_value(specs)?))
}

fn derived_setter(getter: &GetterSpec) -> SetterSpec {
    match getter {
        GetterSpec::Key(key) => SetterSpec::Key(key.clone()),
        GetterSpec::Index(i) => SetterSpec::Index(*i),
        GetterSpec::Path(path) => SetterSpec::Path(path.clone()),
        other => {
            debug!(getter = ?other, "no destination derivable from getter, assigning under the literal key");
            SetterSpec::Key("key".to_owned())
        }
    }
}
