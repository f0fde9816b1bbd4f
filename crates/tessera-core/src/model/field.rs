use crate::{
    connection::{Connection, DbType},
    error::{FieldError, ModelError},
    model::LookupKind,
    value::Value,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    sync::{Arc, OnceLock},
};

///
/// FieldKind
///
/// Logical type of an atomic field. The connection maps it to a db type.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum FieldKind {
    Blob,
    Bool,
    Int,
    Int128,
    Text,
    Uint,
    Uint128,
}

impl FieldKind {
    /// Coerce a value into this kind. Only lossless integer widening is
    /// accepted; `Null` passes through unchanged.
    #[must_use]
    pub fn coerce(self, value: &Value) -> Option<Value> {
        let coerced = match (self, value) {
            (_, Value::Null) => Value::Null,
            (Self::Blob, Value::Blob(v)) => Value::Blob(v.clone()),
            (Self::Bool, Value::Bool(v)) => Value::Bool(*v),
            (Self::Text, Value::Text(v)) => Value::Text(v.clone()),

            (Self::Int, Value::Int(v)) => Value::Int(*v),
            (Self::Int, Value::Uint(v)) => Value::Int(i64::try_from(*v).ok()?),

            (Self::Int128, Value::Int128(v)) => Value::Int128(*v),
            (Self::Int128, Value::Int(v)) => Value::Int128(i128::from(*v)),
            (Self::Int128, Value::Uint(v)) => Value::Int128(i128::from(*v)),
            (Self::Int128, Value::Uint128(v)) => Value::Int128(i128::try_from(*v).ok()?),

            (Self::Uint, Value::Uint(v)) => Value::Uint(*v),
            (Self::Uint, Value::Int(v)) => Value::Uint(u64::try_from(*v).ok()?),

            (Self::Uint128, Value::Uint128(v)) => Value::Uint128(*v),
            (Self::Uint128, Value::Uint(v)) => Value::Uint128(u128::from(*v)),
            (Self::Uint128, Value::Int(v)) => Value::Uint128(u128::try_from(*v).ok()?),
            (Self::Uint128, Value::Int128(v)) => Value::Uint128(u128::try_from(*v).ok()?),

            _ => return None,
        };

        Some(coerced)
    }
}

///
/// AtomicField
///
/// Contract every field enclosed by a composite must satisfy. An atomic field
/// owns exactly one storage column, but its storage-level lookup preparation
/// may still produce several physical parameters.
///

pub trait AtomicField: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> FieldKind;

    /// Owner path this field is attached to, if attached.
    fn owner(&self) -> Option<&'static str>;

    /// Storage column, available once attached.
    fn column(&self) -> Option<&str>;

    fn is_primary_key(&self) -> bool {
        false
    }

    fn is_nullable(&self) -> bool {
        true
    }

    /// Bind the field to its owner and resolve its column. Once only.
    fn attach(&self, owner: &'static str) -> Result<(), ModelError>;

    fn db_type(&self, conn: &dyn Connection) -> DbType {
        conn.db_type(self.kind())
    }

    fn prepare_lookup(&self, kind: LookupKind, value: &Value) -> Result<Value, FieldError>;

    /// Prepare a lookup value down to physical parameters.
    /// `prepared` skips `prepare_lookup` when the caller already ran it.
    fn prepare_storage_lookup(
        &self,
        kind: LookupKind,
        value: &Value,
        conn: &dyn Connection,
        prepared: bool,
    ) -> Result<Vec<Value>, FieldError>;
}

/// Shared handle to an atomic field. Composites and owner types hold clones.
pub type FieldRef = Arc<dyn AtomicField>;

///
/// FieldBinding
///

#[derive(Debug)]
struct FieldBinding {
    owner: &'static str,
    column: String,
}

///
/// ScalarField
/// Single-column atomic field over one `FieldKind`.
///

#[derive(Debug)]
pub struct ScalarField {
    name: String,
    kind: FieldKind,
    db_column: Option<String>,
    nullable: bool,
    primary_key: bool,
    binding: OnceLock<FieldBinding>,
}

impl ScalarField {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            db_column: None,
            nullable: false,
            primary_key: false,
            binding: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    #[must_use]
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Int)
    }

    #[must_use]
    pub fn uint(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Uint)
    }

    #[must_use]
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    #[must_use]
    pub fn db_column(mut self, column: impl Into<String>) -> Self {
        self.db_column = Some(column.into());
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Wrap into a shared handle.
    #[must_use]
    pub fn into_ref(self) -> FieldRef {
        Arc::new(self)
    }

    fn coerce(&self, value: &Value) -> Result<Value, FieldError> {
        self.kind
            .coerce(value)
            .ok_or_else(|| FieldError::TypeMismatch {
                field: self.name.clone(),
                kind: self.kind,
                value: value.clone(),
            })
    }

    fn invalid(&self, kind: LookupKind, expected: &'static str, value: &Value) -> FieldError {
        FieldError::InvalidArgument {
            field: self.name.clone(),
            kind,
            expected,
            value: value.clone(),
        }
    }
}

impl AtomicField for ScalarField {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> FieldKind {
        self.kind
    }

    fn owner(&self) -> Option<&'static str> {
        self.binding.get().map(|b| b.owner)
    }

    fn column(&self) -> Option<&str> {
        self.binding.get().map(|b| b.column.as_str())
    }

    fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    fn is_nullable(&self) -> bool {
        self.nullable
    }

    fn attach(&self, owner: &'static str) -> Result<(), ModelError> {
        let column = self.db_column.clone().unwrap_or_else(|| self.name.clone());

        self.binding
            .set(FieldBinding { owner, column })
            .map_err(|_| ModelError::AlreadyAttached {
                field: self.name.clone(),
                owner: self.owner().unwrap_or(owner),
            })
    }

    fn prepare_lookup(&self, kind: LookupKind, value: &Value) -> Result<Value, FieldError> {
        match kind {
            LookupKind::Exact
            | LookupKind::Lt
            | LookupKind::Lte
            | LookupKind::Gt
            | LookupKind::Gte => self.coerce(value),

            LookupKind::In => {
                let items = value
                    .as_list()
                    .ok_or_else(|| self.invalid(kind, "a list", value))?;

                items
                    .iter()
                    .map(|item| self.coerce(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }

            LookupKind::Contains | LookupKind::StartsWith => {
                if self.kind != FieldKind::Text {
                    return Err(FieldError::UnsupportedLookup {
                        field: self.name.clone(),
                        kind,
                    });
                }
                match value {
                    Value::Text(_) => Ok(value.clone()),
                    other => Err(self.invalid(kind, "text", other)),
                }
            }

            LookupKind::IsNull => match value {
                Value::Bool(_) => Ok(value.clone()),
                other => Err(self.invalid(kind, "a bool", other)),
            },
        }
    }

    fn prepare_storage_lookup(
        &self,
        kind: LookupKind,
        value: &Value,
        conn: &dyn Connection,
        prepared: bool,
    ) -> Result<Vec<Value>, FieldError> {
        let value = if prepared {
            value.clone()
        } else {
            self.prepare_lookup(kind, value)?
        };

        match kind {
            // rendered as IS [NOT] NULL, nothing to bind
            LookupKind::IsNull => Ok(Vec::new()),

            LookupKind::In => {
                let items = value
                    .as_list()
                    .ok_or_else(|| self.invalid(kind, "a list", &value))?;

                let mut params = Vec::new();
                for item in items {
                    params.extend(conn.encode(self.kind, item)?);
                }

                Ok(params)
            }

            _ => conn.encode(self.kind, &value),
        }
    }
}
