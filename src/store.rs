//! A destination whose slots are resolved by name at run time.

use crate::table::{OptionDescriptor, Slot, SlotRefused};
use crate::value::{Value, ValueKind};
use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Errors from writing into a [`ValueStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no slot named '{0}'")]
    UnknownSlot(String),

    #[error("slot '{key}' holds {expected} values, got {found}")]
    KindMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// Named values in declaration order.
///
/// Slots must be declared before options can bind into them; a write to an
/// undeclared name or with a value of another kind is refused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStore {
    entries: Vec<(String, Value)>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a slot with its initial value, replacing any earlier declaration.
    pub fn declare(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Overwrite a declared slot with a value of the same kind.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let idx = self
            .position(key)
            .ok_or_else(|| StoreError::UnknownSlot(key.to_string()))?;

        let current = &mut self.entries[idx].1;
        if current.kind() != value.kind() {
            return Err(StoreError::KindMismatch {
                key: key.to_string(),
                expected: current.kind(),
                found: value.kind(),
            });
        }
        *current = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A slot that reads and writes the entry named `key`.
    pub fn slot(key: impl Into<String>, kind: ValueKind) -> Slot<ValueStore> {
        let key = key.into();
        let read_key = key.clone();
        Slot::Dynamic {
            kind,
            read: Box::new(move |store: &ValueStore| store.get(&read_key).cloned()),
            write: Box::new(move |store: &mut ValueStore, value: Value| {
                store
                    .set(&key, value)
                    .map_err(|e| SlotRefused(e.to_string()))
            }),
        }
    }

    /// A descriptor bound to the entry named `identifier`.
    pub fn option(identifier: impl Into<String>, kind: ValueKind) -> OptionDescriptor<ValueStore> {
        let identifier = identifier.into();
        OptionDescriptor::new(identifier.clone(), Self::slot(identifier, kind))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl Serialize for ValueStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
