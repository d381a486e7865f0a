//! JSON description of an option table.

use crate::store::ValueStore;
use crate::table::{OptionTable, TableError};
use crate::value::{self, Value, ValueKind};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Prefix for shell variable names when the table sets none.
pub const DEFAULT_PREFIX: &str = "STOMP_";

/// Errors that can occur during table config parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON table: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("option name must not be empty")]
    EmptyName,

    #[error("duplicate option name: {0}")]
    DuplicateName(String),

    #[error("invalid short option '{short}' on '{name}': must be a single character other than '-'")]
    InvalidShortOption { name: String, short: String },

    #[error("invalid default for '{name}': {reason}")]
    InvalidDefault { name: String, reason: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Configuration for a single option.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionConfig {
    /// Slot identifier; also the long name unless `long` is set
    pub name: String,
    /// Long option name (e.g. "first" for --first)
    pub long: Option<String>,
    /// Short option name (e.g. "f" for -f)
    pub short: Option<String>,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(default)]
    pub required: bool,
    /// Pre-parse value of the slot. Booleans flip from here.
    pub default: Option<serde_json::Value>,
}

impl OptionConfig {
    /// The effective long name: `long` if set and non-empty, else `name`.
    pub fn effective_long(&self) -> &str {
        match self.long.as_deref() {
            Some(long) if !long.is_empty() => long,
            _ => &self.name,
        }
    }

    /// The slot's initial value, coerced to the declared kind.
    pub fn initial_value(&self) -> Result<Value, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidDefault {
            name: self.name.clone(),
            reason,
        };

        match &self.default {
            None | Some(serde_json::Value::Null) => Ok(Value::zero(self.kind)),
            Some(serde_json::Value::String(s)) => {
                value::coerce(self.kind, s).map_err(|e| invalid(e.to_string()))
            }
            Some(serde_json::Value::Bool(b)) if self.kind == ValueKind::Boolean => {
                Ok(Value::Boolean(*b))
            }
            Some(serde_json::Value::Number(n)) if self.kind.is_numeric() => {
                value::coerce(self.kind, &n.to_string()).map_err(|e| invalid(e.to_string()))
            }
            Some(other) => Err(invalid(format!(
                "{} is not a valid {} default",
                other, self.kind
            ))),
        }
    }
}

/// Top-level table configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Shell variable prefix (default: "STOMP_")
    pub prefix: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionConfig>,
}

impl TableConfig {
    /// Parse a JSON string into a TableConfig.
    pub fn from_json(json: &str) -> Result<TableConfig, ConfigError> {
        let config: TableConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Validate names, short options and defaults, then the built table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();

        for option in &self.options {
            if option.name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if !names.insert(&option.name) {
                return Err(ConfigError::DuplicateName(option.name.clone()));
            }
            Self::validate_short(option)?;
            option.initial_value()?;
        }

        self.table().validate()?;
        Ok(())
    }

    fn validate_short(option: &OptionConfig) -> Result<(), ConfigError> {
        let Some(short) = option.short.as_deref() else {
            return Ok(());
        };
        if short.is_empty() {
            return Ok(());
        }

        let mut chars = short.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != '-' => Ok(()),
            _ => Err(ConfigError::InvalidShortOption {
                name: option.name.clone(),
                short: short.to_string(),
            }),
        }
    }

    /// Validate and build the table together with a store holding each
    /// option's initial value.
    pub fn build(&self) -> Result<(OptionTable<ValueStore>, ValueStore), ConfigError> {
        self.validate()?;

        let mut store = ValueStore::new();
        for option in &self.options {
            store.declare(option.name.clone(), option.initial_value()?);
        }

        Ok((self.table(), store))
    }

    fn table(&self) -> OptionTable<ValueStore> {
        self.options
            .iter()
            .fold(OptionTable::new(), |table, option| {
                let descriptor = ValueStore::option(option.name.clone(), option.kind)
                    .long(option.effective_long())
                    .short(option.short.clone().unwrap_or_default())
                    .required(option.required);
                table.with(descriptor)
            })
    }

    /// Get the effective prefix, using the default if none is set.
    pub fn effective_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }
}
