use crate::bounds::Bounds;
use crate::error::ValidationError;
use crate::form::{Elements, Fields, Form, Literal, Record, StringFormat, StringSchema, Tuple};
use crate::schema::Schema;
use crate::value::{Array, Object, Value};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;

#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    max_depth: Option<usize>,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops descending past `max_depth` nested matches, reporting a single
    /// issue at that point instead. Unlimited by default.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// A reason a value was rejected. `path` holds the object keys and array
/// indices leading from the validated value to the offending part.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValidationIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    fn new(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    fn at(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: vec![key.into()],
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}: {}", self.path.join("/"), self.message)
    }
}

/// Validates `value` against `schema` with a fresh cache.
///
/// Returns the value itself when it is accepted: nothing is ever coerced.
pub fn validate<'v>(value: &'v Value, schema: &Schema) -> Result<&'v Value, Vec<ValidationIssue>> {
    Validator::new(ValidateOptions::new()).validate(value, schema)
}

/// Like [`validate`], with the issues wrapped in an error type.
pub fn assert_valid<'v>(value: &'v Value, schema: &Schema) -> Result<&'v Value, ValidationError> {
    validate(value, schema).map_err(ValidationError)
}

/// Holds the memo of (schema node, scope, value) results across calls.
///
/// A fresh validator per unrelated validation is the normal use; reusing one
/// lets repeated checks of the same values against the same schemas hit the
/// cache.
pub struct Validator<'s> {
    options: ValidateOptions,
    cache: HashMap<CacheKey, Entry>,
    /// Keys of `Provisional` entries, in the order they were computed.
    provisional: Vec<CacheKey>,
    /// One flag per pair on the stack: whether anything assumed it holds.
    relied: Vec<bool>,
    /// Nested `check` calls currently on the stack.
    depth: usize,
    /// Containers descended into on the way to the current match.
    nesting: usize,
    /// The shallowest pair on the stack the current match has relied on.
    low: usize,
    /// Whether the current match was cut short by `max_depth`.
    truncated: bool,
    schemas: PhantomData<&'s Schema>,
}

type CacheKey = (usize, ScopeKey, ValueKey);

enum Entry {
    InProgress {
        depth: usize,
        nesting: usize,
    },
    /// Computed assuming the pair at stack depth `low` holds. Settled once
    /// that pair is.
    Provisional {
        issues: Vec<ValidationIssue>,
        low: usize,
    },
    Done(Vec<ValidationIssue>),
}

/// The scope anchors `ref`, `this` and `root` resolve against.
#[derive(Clone, Copy, Default)]
struct Scope<'s> {
    global: Option<&'s Fields>,
    root: Option<&'s Schema>,
    local: Option<&'s Schema>,
}

/// Anchor addresses, zero when unset.
type ScopeKey = (usize, usize, usize);

fn address<T>(anchor: Option<&T>) -> usize {
    anchor.map_or(0, |anchor| anchor as *const T as usize)
}

impl Scope<'_> {
    fn key(&self) -> ScopeKey {
        (
            address(self.global),
            address(self.root),
            address(self.local),
        )
    }
}

/// Containers are keyed by identity, everything else by content. The key
/// holds container handles, keeping them alive while their entry exists.
#[derive(Clone)]
enum ValueKey {
    Null,
    Bool(bool),
    Number(u64),
    String(String),
    Opaque(String),
    Array(Array),
    Object(Object),
}

impl ValueKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKey::Null,
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Number(n) => ValueKey::Number(n.to_bits()),
            Value::String(s) => ValueKey::String(s.clone()),
            Value::Opaque(name) => ValueKey::Opaque(name.clone()),
            Value::Array(array) => ValueKey::Array(array.clone()),
            Value::Object(object) => ValueKey::Object(object.clone()),
        }
    }
}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueKey::Null, ValueKey::Null) => true,
            (ValueKey::Bool(a), ValueKey::Bool(b)) => a == b,
            (ValueKey::Number(a), ValueKey::Number(b)) => a == b,
            (ValueKey::String(a), ValueKey::String(b)) => a == b,
            (ValueKey::Opaque(a), ValueKey::Opaque(b)) => a == b,
            (ValueKey::Array(a), ValueKey::Array(b)) => a.ptr_eq(b),
            (ValueKey::Object(a), ValueKey::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for ValueKey {}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            ValueKey::Null => {}
            ValueKey::Bool(b) => b.hash(state),
            ValueKey::Number(n) => n.hash(state),
            ValueKey::String(s) | ValueKey::Opaque(s) => s.hash(state),
            ValueKey::Array(array) => array.id().hash(state),
            ValueKey::Object(object) => object.id().hash(state),
        }
    }
}

/// Prefixes each issue's path with `key`.
fn nest(key: &str, mut issues: Vec<ValidationIssue>) -> Vec<ValidationIssue> {
    for issue in &mut issues {
        issue.path.insert(0, key.to_owned());
    }
    issues
}

fn expected(what: impl fmt::Display, value: &Value) -> Vec<ValidationIssue> {
    vec![ValidationIssue::new(format!(
        "expected {}, found {}",
        what,
        value.type_name()
    ))]
}

fn bounded(bounds: &Bounds, magnitude: usize, label: &str) -> Vec<ValidationIssue> {
    bounds
        .check(magnitude as f64, label)
        .map(ValidationIssue::new)
        .into_iter()
        .collect()
}

/// Messages for a string failing its format or length constraints.
fn string_messages(schema: &StringSchema, text: &str) -> Vec<String> {
    let mut messages = Vec::new();

    match &schema.format {
        Some(StringFormat::Pattern(pattern)) if !pattern.regex().is_match(text) => {
            messages.push(format!(
                "string does not match /{}/{}",
                pattern.source, pattern.flags
            ));
        }
        Some(format) if !format.matches(text) => {
            messages.push(format!("string does not match format {}", format.name()));
        }
        _ => {}
    }

    messages.extend(schema.bounds.check(text.chars().count() as f64, "length"));
    messages
}

fn literal_matches(literal: &Literal, value: &Value) -> bool {
    match (literal, value) {
        (Literal::Boolean(a), Value::Bool(b)) => a == b,
        (Literal::Number(a), Value::Number(b)) => a == b,
        (Literal::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

impl<'s> Validator<'s> {
    pub fn new(options: ValidateOptions) -> Self {
        Self {
            options,
            cache: HashMap::new(),
            provisional: Vec::new(),
            relied: Vec::new(),
            depth: 0,
            nesting: 0,
            low: usize::MAX,
            truncated: false,
            schemas: PhantomData,
        }
    }

    pub fn validate<'v>(
        &mut self,
        value: &'v Value,
        schema: &'s Schema,
    ) -> Result<&'v Value, Vec<ValidationIssue>> {
        self.low = usize::MAX;
        self.truncated = false;
        let issues = self.check(schema, value, Scope::default());
        self.provisional.clear();
        tracing::debug!(kind = schema.kind(), issues = issues.len(), "validated value");

        if issues.is_empty() {
            Ok(value)
        } else {
            Err(issues)
        }
    }

    /// Matches `value` against `schema`, consulting and filling the cache.
    ///
    /// Meeting a pair that is still being matched further up the stack:
    /// - after descending into the value, the data is cyclic and the pair is
    ///   assumed to hold. The outer match reports its own issues, if any.
    /// - without descending, the schema refers to itself without consuming
    ///   any data, which is reported as an issue.
    ///
    /// Results that relied on such an assumption are cached as provisional,
    /// and reused like any other. Once the outermost pair they rely on is
    /// finished they become final. If a pair that was assumed to hold fails,
    /// the provisional successes computed beneath it are dropped instead.
    /// Failures stay: the assumption only ever made matching more lenient.
    fn check(
        &mut self,
        schema: &'s Schema,
        value: &Value,
        scope: Scope<'s>,
    ) -> Vec<ValidationIssue> {
        let key: CacheKey = (address(Some(schema)), scope.key(), ValueKey::of(value));

        match self.cache.get(&key) {
            Some(Entry::Done(issues)) => {
                tracing::trace!(kind = schema.kind(), "cache hit");
                return issues.clone();
            }
            Some(Entry::Provisional { issues, low }) => {
                tracing::trace!(kind = schema.kind(), "provisional cache hit");
                self.low = self.low.min(*low);
                if let Some(relied) = self.relied.get_mut(*low) {
                    *relied = true;
                }
                return issues.clone();
            }
            Some(Entry::InProgress { depth, nesting }) => {
                tracing::trace!(kind = schema.kind(), "revisited pair in progress");
                self.low = self.low.min(*depth);
                if let Some(relied) = self.relied.get_mut(*depth) {
                    *relied = true;
                }

                if *nesting == self.nesting {
                    return vec![ValidationIssue::new(format!(
                        "{} schema refers to itself without consuming the value",
                        schema.kind()
                    ))];
                }
                return Vec::new();
            }
            None => {}
        }

        if let Some(max_depth) = self.options.max_depth {
            if self.depth >= max_depth {
                self.truncated = true;
                return vec![ValidationIssue::new("maximum depth exceeded")];
            }
        }

        let depth = self.depth;
        self.cache.insert(
            key.clone(),
            Entry::InProgress {
                depth,
                nesting: self.nesting,
            },
        );
        self.relied.push(false);
        let mark = self.provisional.len();
        let outer_low = mem::replace(&mut self.low, usize::MAX);
        let outer_truncated = mem::replace(&mut self.truncated, false);

        self.depth += 1;
        let issues = self.check_form(schema, value, scope);
        self.depth -= 1;

        let relied = self.relied.pop().unwrap_or(false);
        let low = self.low;
        let truncated = self.truncated;
        self.low = outer_low.min(low);
        self.truncated = outer_truncated || truncated;

        if relied && !issues.is_empty() {
            self.drop_unfounded(mark);
        }

        if low >= depth {
            self.settle(mark);
        } else {
            self.defer(mark, depth, low);
        }

        if truncated {
            self.cache.remove(&key);
        } else if low >= depth {
            self.cache.insert(key, Entry::Done(issues.clone()));
        } else {
            self.cache.insert(
                key.clone(),
                Entry::Provisional {
                    issues: issues.clone(),
                    low,
                },
            );
            self.provisional.push(key);
        }

        issues
    }

    /// Drops the provisional successes computed since `mark`.
    fn drop_unfounded(&mut self, mark: usize) {
        for key in self.provisional.split_off(mark) {
            let unfounded = matches!(
                self.cache.get(&key),
                Some(Entry::Provisional { issues, .. }) if issues.is_empty()
            );

            if unfounded {
                self.cache.remove(&key);
            } else {
                self.provisional.push(key);
            }
        }
    }

    /// Makes the provisional results computed since `mark` final.
    fn settle(&mut self, mark: usize) {
        for key in self.provisional.drain(mark..) {
            if let Some(entry) = self.cache.get_mut(&key) {
                let issues = match entry {
                    Entry::Provisional { issues, .. } => mem::take(issues),
                    _ => continue,
                };
                *entry = Entry::Done(issues);
            }
        }
    }

    /// The pair at `depth` is leaving the stack unsettled: results that
    /// relied on it now rely on whatever it relied on.
    fn defer(&mut self, mark: usize, depth: usize, low: usize) {
        for key in &self.provisional[mark..] {
            if let Some(Entry::Provisional { low: pending, .. }) = self.cache.get_mut(key) {
                if *pending >= depth {
                    *pending = low;
                }
            }
        }
    }

    /// `check` for a part of `value`.
    fn descend(
        &mut self,
        schema: &'s Schema,
        value: &Value,
        scope: Scope<'s>,
    ) -> Vec<ValidationIssue> {
        self.nesting += 1;
        let issues = self.check(schema, value, scope);
        self.nesting -= 1;
        issues
    }

    fn check_form(
        &mut self,
        schema: &'s Schema,
        value: &Value,
        scope: Scope<'s>,
    ) -> Vec<ValidationIssue> {
        match &schema.form {
            Form::Null => match value {
                Value::Null => Vec::new(),
                _ => expected("null", value),
            },
            Form::Any => self.check_any(schema, value, scope),
            Form::Boolean => match value {
                Value::Bool(_) => Vec::new(),
                _ => expected("boolean", value),
            },
            Form::Literal(literal) => {
                if literal_matches(literal, value) {
                    Vec::new()
                } else {
                    expected(literal, value)
                }
            }
            Form::Integer(bounds) => match value {
                Value::Number(n) if n.is_finite() && n.fract() == 0.0 => {
                    bounds.check(*n, "value").map(ValidationIssue::new).into_iter().collect()
                }
                _ => expected("integer", value),
            },
            Form::Number(bounds) => match value {
                Value::Number(n) if n.is_finite() => {
                    bounds.check(*n, "value").map(ValidationIssue::new).into_iter().collect()
                }
                Value::Number(n) => vec![ValidationIssue::new(format!(
                    "expected finite number, found {}",
                    n
                ))],
                _ => expected("number", value),
            },
            Form::String(string) => match value {
                Value::String(text) => string_messages(string, text)
                    .into_iter()
                    .map(ValidationIssue::new)
                    .collect(),
                _ => expected("string", value),
            },
            Form::Array(elements) => match value {
                Value::Array(array) => self.check_elements(elements, array, scope),
                _ => expected("array", value),
            },
            Form::Tuple(tuple) => match value {
                Value::Array(array) => self.check_tuple(tuple, array, scope),
                _ => expected("array", value),
            },
            Form::Record(record) => match value {
                Value::Object(object) => self.check_record(record, object, scope),
                _ => expected("object", value),
            },
            Form::Union(alternatives) => {
                if alternatives.is_empty() {
                    return vec![ValidationIssue::new("empty union matches nothing")];
                }

                let mut issues = Vec::new();
                for alternative in alternatives {
                    let alternative_issues = self.check(alternative, value, scope);
                    if alternative_issues.is_empty() {
                        return Vec::new();
                    }
                    issues.extend(alternative_issues);
                }
                issues
            }
            Form::Object(fields) => {
                let scope = Scope {
                    local: Some(schema),
                    root: scope.root.or(Some(schema)),
                    ..scope
                };
                self.check_fields(fields, value, scope, true)
            }
            Form::Model(fields) => {
                let scope = Scope {
                    local: Some(schema),
                    root: Some(schema),
                    ..scope
                };
                self.check_fields(fields, value, scope, true)
            }
            Form::Group(group) => {
                let scope = Scope {
                    global: Some(&group.members),
                    ..scope
                };

                match &group.selected {
                    Some(name) => match group.members.get(name) {
                        Some(member) => self.check(member, value, scope),
                        None => vec![ValidationIssue::new(format!(
                            "selected member '{}' is not defined in the group",
                            name
                        ))],
                    },
                    None => self.check_fields(&group.members, value, scope, false),
                }
            }
            Form::Ref(name) => match scope.global {
                Some(global) if !global.is_empty() => match global.get(name) {
                    Some(target) => self.check(target, value, scope),
                    None => vec![ValidationIssue::new(format!(
                        "unresolved reference '{}'",
                        name
                    ))],
                },
                _ => vec![ValidationIssue::new(format!(
                    "no namespace to resolve reference '{}'",
                    name
                ))],
            },
            Form::This => match scope.local {
                Some(local) => self.check(local, value, scope),
                None => vec![ValidationIssue::new("no local schema")],
            },
            Form::Root => match scope.root {
                Some(root) => self.check(root, value, scope),
                None => vec![ValidationIssue::new("no root schema")],
            },
        }
    }

    /// Plain data all the way down: no opaque values, no NaN or infinities.
    fn check_any(
        &mut self,
        schema: &'s Schema,
        value: &Value,
        scope: Scope<'s>,
    ) -> Vec<ValidationIssue> {
        match value {
            Value::Null | Value::Bool(_) | Value::String(_) => Vec::new(),
            Value::Number(n) if n.is_finite() => Vec::new(),
            Value::Number(n) => vec![ValidationIssue::new(format!(
                "expected finite number, found {}",
                n
            ))],
            Value::Array(array) => {
                let mut issues = Vec::new();
                for (i, item) in array.items().iter().enumerate() {
                    issues.extend(nest(&i.to_string(), self.descend(schema, item, scope)));
                }
                issues
            }
            Value::Object(object) => {
                let mut issues = Vec::new();
                for (key, item) in object.entries().iter() {
                    issues.extend(nest(key, self.descend(schema, item, scope)));
                }
                issues
            }
            Value::Opaque(name) => vec![ValidationIssue::new(format!(
                "expected plain data, found {}",
                name
            ))],
        }
    }

    fn check_elements(
        &mut self,
        elements: &'s Elements,
        array: &Array,
        scope: Scope<'s>,
    ) -> Vec<ValidationIssue> {
        let items = array.items();
        let mut issues = bounded(&elements.bounds, items.len(), "length");

        for (i, item) in items.iter().enumerate() {
            issues.extend(nest(&i.to_string(), self.descend(&elements.schema, item, scope)));
        }

        issues
    }

    fn check_tuple(
        &mut self,
        tuple: &'s Tuple,
        array: &Array,
        scope: Scope<'s>,
    ) -> Vec<ValidationIssue> {
        let items = array.items();
        let fixed = tuple.items.len();

        let mut issues = match &tuple.rest {
            None => bounded(&Bounds::exactly(fixed as f64), items.len(), "length"),
            Some(_) => bounded(&Bounds::new().with_min(fixed as f64), items.len(), "length"),
        };

        for (i, (schema, item)) in tuple.items.iter().zip(items.iter()).enumerate() {
            issues.extend(nest(&i.to_string(), self.descend(schema, item, scope)));
        }

        if let Some(rest) = &tuple.rest {
            let excess = items.get(fixed..).unwrap_or(&[]);
            issues.extend(bounded(&rest.bounds, excess.len(), "rest length"));

            for (i, item) in excess.iter().enumerate() {
                let index = (fixed + i).to_string();
                issues.extend(nest(&index, self.descend(&rest.schema, item, scope)));
            }
        }

        issues
    }

    fn check_record(
        &mut self,
        record: &'s Record,
        object: &Object,
        scope: Scope<'s>,
    ) -> Vec<ValidationIssue> {
        let entries = object.entries();
        let mut issues = bounded(&record.bounds, entries.len(), "size");

        for (key, item) in entries.iter() {
            if let Some(key_schema) = &record.key {
                for message in string_messages(key_schema, key) {
                    issues.push(ValidationIssue::at(key.as_str(), format!("key {}", message)));
                }
            }

            issues.extend(nest(key, self.descend(&record.schema, item, scope)));
        }

        issues
    }

    /// Field matching shared by objects, models and unselected groups. Groups
    /// pass `honor_optional = false`: all their members are required.
    fn check_fields(
        &mut self,
        fields: &'s Fields,
        value: &Value,
        scope: Scope<'s>,
        honor_optional: bool,
    ) -> Vec<ValidationIssue> {
        let object = match value {
            Value::Object(object) => object,
            _ => return expected("object", value),
        };

        let entries = object.entries();
        let mut issues = Vec::new();

        for (name, field) in fields {
            match entries.get(name) {
                Some(item) => issues.extend(nest(name, self.descend(field, item, scope))),
                None if honor_optional && field.optional => {}
                None => issues.push(ValidationIssue::at(name.as_str(), "missing key")),
            }
        }

        let excess: Vec<&str> = entries
            .keys()
            .filter(|key| !fields.contains_key(key.as_str()))
            .map(String::as_str)
            .collect();

        if !excess.is_empty() {
            issues.push(ValidationIssue::new(format!(
                "excess keys: {}",
                excess.join(", ")
            )));
        }

        issues
    }
}
