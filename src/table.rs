//! Option tables: descriptors and the typed slots they bind into.

use crate::parser::{self, ParseError};
use crate::value::{Value, ValueKind};
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// Errors found when checking a table before use.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("option '{0}' has an empty long name")]
    EmptyLongName(String),

    #[error("duplicate option name: {0}")]
    DuplicateName(String),
}

/// Reason a slot accessor refused to be read or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SlotRefused(pub String);

/// Reads the current value of a dynamically resolved slot.
pub type ReadFn<T> = Box<dyn Fn(&T) -> Option<Value> + Send + Sync>;
/// Writes a value into a dynamically resolved slot.
pub type WriteFn<T> = Box<dyn Fn(&mut T, Value) -> Result<(), SlotRefused> + Send + Sync>;

/// Typed access to one field of a destination `T`.
///
/// The static variants project a field out of the destination, so the
/// declared kind and the field type can never disagree. `Dynamic` covers
/// destinations whose slots are resolved at run time, such as
/// [`crate::store::ValueStore`].
pub enum Slot<T> {
    String(fn(&mut T) -> &mut String),
    Integer(fn(&mut T) -> &mut i32),
    Long(fn(&mut T) -> &mut i64),
    Float(fn(&mut T) -> &mut f32),
    Double(fn(&mut T) -> &mut f64),
    Byte(fn(&mut T) -> &mut i8),
    Short(fn(&mut T) -> &mut i16),
    Char(fn(&mut T) -> &mut char),
    Boolean(fn(&mut T) -> &mut bool),
    Dynamic {
        kind: ValueKind,
        read: ReadFn<T>,
        write: WriteFn<T>,
    },
}

impl<T> Slot<T> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Slot::String(_) => ValueKind::String,
            Slot::Integer(_) => ValueKind::Integer,
            Slot::Long(_) => ValueKind::Long,
            Slot::Float(_) => ValueKind::Float,
            Slot::Double(_) => ValueKind::Double,
            Slot::Byte(_) => ValueKind::Byte,
            Slot::Short(_) => ValueKind::Short,
            Slot::Char(_) => ValueKind::Char,
            Slot::Boolean(_) => ValueKind::Boolean,
            Slot::Dynamic { kind, .. } => *kind,
        }
    }

    /// Current value of a boolean slot, the basis for a flip.
    pub(crate) fn current_bool(&self, dest: &mut T) -> Result<bool, SlotRefused> {
        match self {
            Slot::Boolean(field) => Ok(*field(dest)),
            Slot::Dynamic { read, .. } => match read(&*dest) {
                Some(Value::Boolean(current)) => Ok(current),
                Some(other) => Err(SlotRefused(format!(
                    "holds a {} value, not a boolean",
                    other.kind()
                ))),
                None => Err(SlotRefused("has no current value".to_string())),
            },
            other => Err(SlotRefused(format!("is a {} slot", other.kind()))),
        }
    }

    /// Write a fully coerced value. Nothing is written on error.
    pub(crate) fn assign(&self, dest: &mut T, value: Value) -> Result<(), SlotRefused> {
        match (self, value) {
            (Slot::String(field), Value::String(v)) => *field(dest) = v,
            (Slot::Integer(field), Value::Integer(v)) => *field(dest) = v,
            (Slot::Long(field), Value::Long(v)) => *field(dest) = v,
            (Slot::Float(field), Value::Float(v)) => *field(dest) = v,
            (Slot::Double(field), Value::Double(v)) => *field(dest) = v,
            (Slot::Byte(field), Value::Byte(v)) => *field(dest) = v,
            (Slot::Short(field), Value::Short(v)) => *field(dest) = v,
            (Slot::Char(field), Value::Char(v)) => *field(dest) = v,
            (Slot::Boolean(field), Value::Boolean(v)) => *field(dest) = v,
            (Slot::Dynamic { write, .. }, v) => return write(dest, v),
            (slot, v) => {
                return Err(SlotRefused(format!(
                    "a {} slot cannot hold a {} value",
                    slot.kind(),
                    v.kind()
                )))
            }
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Dynamic { kind, .. } => write!(f, "Slot::Dynamic({})", kind),
            other => write!(f, "Slot::{:?}", other.kind()),
        }
    }
}

/// Declaration of one bindable option.
#[derive(Debug)]
pub struct OptionDescriptor<T> {
    identifier: String,
    long_name: String,
    short_name: Option<String>,
    required: bool,
    slot: Slot<T>,
}

impl<T> OptionDescriptor<T> {
    /// Create a descriptor whose long name defaults to `identifier`.
    pub fn new(identifier: impl Into<String>, slot: Slot<T>) -> Self {
        let identifier = identifier.into();
        Self {
            long_name: identifier.clone(),
            identifier,
            short_name: None,
            required: false,
            slot,
        }
    }

    pub fn string(identifier: impl Into<String>, field: fn(&mut T) -> &mut String) -> Self {
        Self::new(identifier, Slot::String(field))
    }

    pub fn integer(identifier: impl Into<String>, field: fn(&mut T) -> &mut i32) -> Self {
        Self::new(identifier, Slot::Integer(field))
    }

    pub fn long_int(identifier: impl Into<String>, field: fn(&mut T) -> &mut i64) -> Self {
        Self::new(identifier, Slot::Long(field))
    }

    pub fn float(identifier: impl Into<String>, field: fn(&mut T) -> &mut f32) -> Self {
        Self::new(identifier, Slot::Float(field))
    }

    pub fn double(identifier: impl Into<String>, field: fn(&mut T) -> &mut f64) -> Self {
        Self::new(identifier, Slot::Double(field))
    }

    pub fn byte(identifier: impl Into<String>, field: fn(&mut T) -> &mut i8) -> Self {
        Self::new(identifier, Slot::Byte(field))
    }

    pub fn short_int(identifier: impl Into<String>, field: fn(&mut T) -> &mut i16) -> Self {
        Self::new(identifier, Slot::Short(field))
    }

    pub fn char(identifier: impl Into<String>, field: fn(&mut T) -> &mut char) -> Self {
        Self::new(identifier, Slot::Char(field))
    }

    pub fn boolean(identifier: impl Into<String>, field: fn(&mut T) -> &mut bool) -> Self {
        Self::new(identifier, Slot::Boolean(field))
    }

    /// Set the long name. An empty name falls back to the identifier.
    pub fn long(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.long_name = if name.is_empty() {
            self.identifier.clone()
        } else {
            name
        };
        self
    }

    /// Set the short name. An empty name means no short form.
    pub fn short(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.short_name = (!name.is_empty()).then_some(name);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn kind(&self) -> ValueKind {
        self.slot.kind()
    }

    pub fn slot(&self) -> &Slot<T> {
        &self.slot
    }

    /// The token that matches the long form, e.g. `--first`.
    pub fn long_flag(&self) -> String {
        format!("--{}", self.long_name)
    }

    /// The token that matches the short form, e.g. `-f`.
    pub fn short_flag(&self) -> Option<String> {
        self.short_name.as_ref().map(|s| format!("-{}", s))
    }
}

/// An ordered collection of option descriptors for destination type `T`.
#[derive(Debug)]
pub struct OptionTable<T> {
    options: Vec<OptionDescriptor<T>>,
}

impl<T> Default for OptionTable<T> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
        }
    }
}

impl<T> OptionTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor, builder style.
    pub fn with(mut self, option: OptionDescriptor<T>) -> Self {
        self.options.push(option);
        self
    }

    pub fn push(&mut self, option: OptionDescriptor<T>) {
        self.options.push(option);
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionDescriptor<T>> {
        self.options.iter()
    }

    /// Find a descriptor by its long name (without prefix).
    pub fn get(&self, long_name: &str) -> Option<&OptionDescriptor<T>> {
        self.options.iter().find(|o| o.long_name == long_name)
    }

    /// Check that every long name is non-empty and no two prefixed names collide.
    ///
    /// Parsing does not require this: colliding names go to the option
    /// declared first.
    pub fn validate(&self) -> Result<(), TableError> {
        let mut seen = HashSet::new();

        for option in &self.options {
            if option.long_name.is_empty() {
                return Err(TableError::EmptyLongName(option.identifier.clone()));
            }

            let flags = std::iter::once(option.long_flag()).chain(option.short_flag());
            for flag in flags {
                if !seen.insert(flag.clone()) {
                    return Err(TableError::DuplicateName(flag));
                }
            }
        }

        Ok(())
    }

    /// Bind every token in `tokens` into `dest`. See [`parser::parse`].
    pub fn parse<S: AsRef<str>>(&self, dest: &mut T, tokens: &[S]) -> Result<(), ParseError> {
        parser::parse(self, dest, tokens, 0..tokens.len())
    }

    /// Bind the tokens in `range` into `dest`. See [`parser::parse`].
    pub fn parse_range<S: AsRef<str>>(
        &self,
        dest: &mut T,
        tokens: &[S],
        range: Range<usize>,
    ) -> Result<(), ParseError> {
        parser::parse(self, dest, tokens, range)
    }
}

impl<'a, T> IntoIterator for &'a OptionTable<T> {
    type Item = &'a OptionDescriptor<T>;
    type IntoIter = std::slice::Iter<'a, OptionDescriptor<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}
