//! Record instances.
//!
//! Attributes never own instance state; they read and write named slots
//! through the `Record` capability.

use crate::{error::FieldError, value::Value};
use derive_more::Deref;
use std::collections::{BTreeMap, BTreeSet};

///
/// Record
///

pub trait Record {
    /// Current value of a slot, `None` when the slot holds nothing.
    fn value(&self, field: &str) -> Option<Value>;

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError>;
}

///
/// Row
///
/// Map-backed record. A row built with `with_slots` only accepts the listed
/// slot names; an open row accepts any.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct Row {
    #[deref]
    values: BTreeMap<String, Value>,
    slots: Option<BTreeSet<String>>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: BTreeMap::new(),
            slots: Some(slots.into_iter().map(Into::into).collect()),
        }
    }

    /// Builder-style slot assignment.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Result<Self, FieldError> {
        self.set_value(field, value.into())?;

        Ok(self)
    }

    fn check_slot(&self, field: &str) -> Result<(), FieldError> {
        match &self.slots {
            Some(slots) if !slots.contains(field) => Err(FieldError::UnknownSlot(field.to_string())),
            _ => Ok(()),
        }
    }
}

impl Record for Row {
    fn value(&self, field: &str) -> Option<Value> {
        self.values.get(field).cloned()
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        self.check_slot(field)?;
        self.values.insert(field.to_string(), value);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_row_accepts_any_slot() {
        let mut row = Row::new();
        row.set_value("anything", Value::Int(1)).expect("open row");

        assert_eq!(row.value("anything"), Some(Value::Int(1)));
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn closed_row_rejects_unknown_slot() {
        let mut row = Row::with_slots(["first_name"]);

        let err = row.set_value("nickname", Value::from("x")).unwrap_err();

        assert!(matches!(err, FieldError::UnknownSlot(name) if name == "nickname"));
        assert_eq!(row.value("first_name"), None);
    }
}
