//! Binding of raw argument tokens into an option table's slots.
//!
//! Each option is handled in declaration order with one scan over the
//! selected token range:
//!
//! 1. find the first token equal to `--long` or `-short` (the match site),
//! 2. coerce the token after it into the option's kind,
//! 3. write the value into the destination slot,
//!
//! and once every option has been processed, check that each required
//! option was bound. Only the first occurrence of an option is honored;
//! later occurrences of the same name are ignored.

use crate::table::{OptionDescriptor, OptionTable, SlotRefused};
use crate::value::{self, Value, ValueKind};
use std::collections::HashSet;
use std::ops::Range;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur while binding arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing value for option: --{0}")]
    MissingValue(String),

    #[error("invalid value '{raw}' for option --{option}: expected {expected}")]
    InvalidValue {
        option: String,
        raw: String,
        expected: ValueKind,
    },

    #[error("missing required option: --{0}")]
    MissingRequiredOption(String),

    #[error("slot for option --{option} cannot be written: {reason}")]
    UnwritableSlot { option: String, reason: String },

    #[error("token range {start}..{end} is out of bounds for {len} tokens")]
    InvalidRange { start: usize, end: usize, len: usize },
}

impl ParseError {
    /// The long name of the option the error is about, if any.
    pub fn option(&self) -> Option<&str> {
        match self {
            ParseError::MissingValue(option)
            | ParseError::MissingRequiredOption(option)
            | ParseError::InvalidValue { option, .. }
            | ParseError::UnwritableSlot { option, .. } => Some(option),
            ParseError::InvalidRange { .. } => None,
        }
    }
}

/// How a boolean option was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanState {
    NotSeen,
    /// Bare flag: the slot was set to the negation of its previous value
    SeenFlipped,
    /// Flag followed by a `true`/`false` literal
    SeenExplicit,
}

/// Per-option outcome of one binding pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Long name of the option
    pub option: String,
    pub required: bool,
    /// Index of the token that matched, if any
    pub site: Option<usize>,
    /// Toggle state, for boolean options only
    pub toggle: Option<BooleanState>,
}

impl Binding {
    fn unseen<T>(option: &OptionDescriptor<T>) -> Self {
        Self {
            option: option.long_name().to_string(),
            required: option.is_required(),
            site: None,
            toggle: (option.kind() == ValueKind::Boolean).then_some(BooleanState::NotSeen),
        }
    }

    fn seen<T>(option: &OptionDescriptor<T>, site: usize, toggle: Option<BooleanState>) -> Self {
        Self {
            option: option.long_name().to_string(),
            required: option.is_required(),
            site: Some(site),
            toggle,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.site.is_some()
    }
}

/// Outcome of binding every option in a table, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingResult {
    bindings: Vec<Binding>,
}

impl BindingResult {
    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.bindings.iter()
    }

    pub fn get(&self, option: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.option == option)
    }

    /// Whether the option with this long name was bound. Unknown names are not.
    pub fn is_satisfied(&self, option: &str) -> bool {
        self.get(option).is_some_and(Binding::is_satisfied)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Bind `tokens[range]` into `dest` and check required options.
///
/// Fails fast: the first malformed value or the first unbound required
/// option (in declaration order) aborts the call. Options that were bound
/// before a failure keep their new values; the failing option's slot is
/// left untouched.
///
/// When an option appears more than once, only its first occurrence is
/// used.
pub fn parse<T, S: AsRef<str>>(
    table: &OptionTable<T>,
    dest: &mut T,
    tokens: &[S],
    range: Range<usize>,
) -> Result<(), ParseError> {
    let result = bind(table, dest, tokens, range)?;
    validate(&result)
}

/// Bind `tokens[range]` into `dest` without checking required options.
pub fn bind<T, S: AsRef<str>>(
    table: &OptionTable<T>,
    dest: &mut T,
    tokens: &[S],
    range: Range<usize>,
) -> Result<BindingResult, ParseError> {
    if range.start > range.end || range.end > tokens.len() {
        return Err(ParseError::InvalidRange {
            start: range.start,
            end: range.end,
            len: tokens.len(),
        });
    }

    let matchers = Matcher::for_table(table);
    let mut bindings = Vec::with_capacity(table.len());

    for (option, matcher) in table.iter().zip(&matchers) {
        let binding = match matcher.find(tokens, range.clone()) {
            Some(site) => {
                debug!(option = option.long_name(), site, "match site found");
                bind_option(option, dest, tokens, site)?
            }
            None => Binding::unseen(option),
        };
        bindings.push(binding);
    }

    Ok(BindingResult { bindings })
}

/// Fail with the first required option that was not bound.
pub fn validate(result: &BindingResult) -> Result<(), ParseError> {
    match result.iter().find(|b| b.required && !b.is_satisfied()) {
        Some(binding) => Err(ParseError::MissingRequiredOption(binding.option.clone())),
        None => Ok(()),
    }
}

/// The prefixed tokens one option answers to.
#[derive(Debug)]
struct Matcher {
    long: Option<String>,
    short: Option<String>,
}

impl Matcher {
    /// Build matchers for every option. A prefixed name already owned by an
    /// earlier option is dropped from later ones.
    fn for_table<T>(table: &OptionTable<T>) -> Vec<Matcher> {
        let mut claimed = HashSet::new();
        let mut claim = |flag: String| {
            if claimed.insert(flag.clone()) {
                Some(flag)
            } else {
                debug!(flag = %flag, "name already claimed by an earlier option");
                None
            }
        };

        table
            .iter()
            .map(|option| {
                let long = (!option.long_name().is_empty()).then(|| option.long_flag());
                Matcher {
                    long: long.and_then(&mut claim),
                    short: option.short_flag().and_then(&mut claim),
                }
            })
            .collect()
    }

    fn matches(&self, token: &str) -> bool {
        self.long.as_deref() == Some(token) || self.short.as_deref() == Some(token)
    }

    /// Index of the first matching token in `range`.
    fn find<S: AsRef<str>>(&self, tokens: &[S], range: Range<usize>) -> Option<usize> {
        range.into_iter().find(|&i| self.matches(tokens[i].as_ref()))
    }
}

fn bind_option<T, S: AsRef<str>>(
    option: &OptionDescriptor<T>,
    dest: &mut T,
    tokens: &[S],
    site: usize,
) -> Result<Binding, ParseError> {
    // The value token comes from the full vector, so it may sit just past
    // the end of the selected range.
    let next = tokens.get(site + 1).map(AsRef::as_ref);

    if option.kind() == ValueKind::Boolean {
        return bind_toggle(option, dest, site, next);
    }

    let raw = next.ok_or_else(|| ParseError::MissingValue(option.long_name().to_string()))?;
    let value = value::coerce(option.kind(), raw).map_err(|e| ParseError::InvalidValue {
        option: option.long_name().to_string(),
        raw: e.raw,
        expected: e.expected,
    })?;

    store(option, dest, value)?;
    Ok(Binding::seen(option, site, None))
}

fn bind_toggle<T>(
    option: &OptionDescriptor<T>,
    dest: &mut T,
    site: usize,
    next: Option<&str>,
) -> Result<Binding, ParseError> {
    let (value, state) = match next {
        Some(token) if !token.starts_with('-') => {
            let value =
                value::parse_bool_literal(token).ok_or_else(|| ParseError::InvalidValue {
                    option: option.long_name().to_string(),
                    raw: token.to_string(),
                    expected: ValueKind::Boolean,
                })?;
            (value, BooleanState::SeenExplicit)
        }
        // End of input, or the next token is another option
        _ => {
            let current = option
                .slot()
                .current_bool(dest)
                .map_err(|reason| unwritable(option, reason))?;
            trace!(option = option.long_name(), from = current, "flipping flag");
            (!current, BooleanState::SeenFlipped)
        }
    };

    store(option, dest, Value::Boolean(value))?;
    Ok(Binding::seen(option, site, Some(state)))
}

fn store<T>(option: &OptionDescriptor<T>, dest: &mut T, value: Value) -> Result<(), ParseError> {
    trace!(option = option.long_name(), value = %value, "binding value");
    option
        .slot()
        .assign(dest, value)
        .map_err(|reason| unwritable(option, reason))
}

fn unwritable<T>(option: &OptionDescriptor<T>, reason: SlotRefused) -> ParseError {
    ParseError::UnwritableSlot {
        option: option.long_name().to_string(),
        reason: reason.0,
    }
}
