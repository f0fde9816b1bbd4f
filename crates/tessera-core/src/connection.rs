//! Storage dialect boundary.
//!
//! A connection decides which db type an atomic field maps to and how a
//! prepared value becomes physical query parameters. One atomic value may
//! become more than one parameter.

use crate::{
    config::{ConnectionConfig, WideIntegers},
    error::FieldError,
    model::FieldKind,
    value::Value,
};
use serde::Serialize;
use std::fmt::{self, Display};

///
/// DbType
///
/// Column type name plus the number of physical parameters one value of the
/// type occupies.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct DbType {
    pub name: &'static str,
    pub params: usize,
}

impl DbType {
    #[must_use]
    pub const fn new(name: &'static str, params: usize) -> Self {
        Self { name, params }
    }

    #[must_use]
    pub const fn single(name: &'static str) -> Self {
        Self::new(name, 1)
    }
}

impl Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params == 1 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}[{}]", self.name, self.params)
        }
    }
}

///
/// Connection
///

pub trait Connection {
    fn vendor(&self) -> &str;

    fn db_type(&self, kind: FieldKind) -> DbType;

    /// Encode one prepared value into its physical parameters.
    /// The result length always equals `db_type(kind).params`.
    fn encode(&self, kind: FieldKind, value: &Value) -> Result<Vec<Value>, FieldError>;
}

///
/// DialectConnection
/// Config-driven connection used by tests and in-process tooling.
///

#[derive(Clone, Debug, Default)]
pub struct DialectConnection {
    config: ConnectionConfig,
}

impl DialectConnection {
    #[must_use]
    pub const fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    const fn splits(&self, kind: FieldKind) -> bool {
        matches!(self.config.wide_integers, WideIntegers::Split)
            && matches!(kind, FieldKind::Int128 | FieldKind::Uint128)
    }
}

impl Connection for DialectConnection {
    fn vendor(&self) -> &str {
        &self.config.vendor
    }

    fn db_type(&self, kind: FieldKind) -> DbType {
        if self.splits(kind) {
            return DbType::new("BIGINT", 2);
        }

        match kind {
            FieldKind::Blob => DbType::single("BLOB"),
            FieldKind::Bool => DbType::single("BOOLEAN"),
            FieldKind::Int => DbType::single("BIGINT"),
            FieldKind::Int128 => DbType::single("HUGEINT"),
            FieldKind::Text => DbType::single("TEXT"),
            FieldKind::Uint => DbType::single("UBIGINT"),
            FieldKind::Uint128 => DbType::single("UHUGEINT"),
        }
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode(&self, kind: FieldKind, value: &Value) -> Result<Vec<Value>, FieldError> {
        if !self.splits(kind) {
            return Ok(vec![value.clone()]);
        }

        // high half keeps the sign so split pairs sort like the original value
        match value {
            Value::Null => Ok(vec![Value::Null, Value::Null]),
            Value::Int128(v) => Ok(vec![Value::Int((v >> 64) as i64), Value::Uint(*v as u64)]),
            Value::Uint128(v) => Ok(vec![Value::Uint((v >> 64) as u64), Value::Uint(*v as u64)]),
            other => Err(FieldError::Unencodable {
                kind,
                value: other.clone(),
            }),
        }
    }
}
