use crate::{
    connection::{Connection, DbType},
    error::CompositeError,
    model::FieldRef,
    record::Record,
    value::Value,
};
use serde::Serialize;

///
/// StorageColumn
///
/// Attribute name plus its physical columns. Virtual attributes have none;
/// composites list one column per enclosed field.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StorageColumn {
    pub attname: String,
    pub columns: Option<Vec<String>>,
}

impl StorageColumn {
    #[must_use]
    pub fn virtual_only(attname: &str) -> Self {
        Self {
            attname: attname.to_string(),
            columns: None,
        }
    }
}

///
/// VirtualField
///
/// Attribute that is visible in owner metadata without a column of its own.
/// The provided methods are the placeholder behaviour; composites override
/// them.
///

pub trait VirtualField {
    fn name(&self) -> &str;

    fn owner(&self) -> &'static str;

    fn storage_type(&self, _conn: &dyn Connection) -> Option<Vec<DbType>> {
        None
    }

    fn storage_column(&self) -> StorageColumn {
        StorageColumn::virtual_only(self.name())
    }

    /// Atomic fields behind this attribute, so schema and index tooling can
    /// treat every attribute the same way.
    fn enclosed_fields(&self) -> &[FieldRef] {
        &[]
    }

    fn read(&self, _instance: Option<&dyn Record>) -> Result<Value, CompositeError> {
        Ok(Value::Null)
    }

    fn write(&self, _instance: &mut dyn Record, _value: Value) -> Result<(), CompositeError> {
        Ok(())
    }
}

///
/// VirtualAttribute
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VirtualAttribute {
    owner: &'static str,
    name: String,
}

impl VirtualAttribute {
    /// Bind a name on an owner without allocating a column.
    pub(crate) fn bind(owner: &'static str, name: &str) -> Self {
        Self {
            owner,
            name: name.to_string(),
        }
    }
}

impl VirtualField for VirtualAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> &'static str {
        self.owner
    }
}
