use crate::{
    config::ConfigError,
    model::{FieldKind, LookupKind},
    value::Value,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level error returned by owner-type surfaces that can fail in more than
/// one layer. Each layer keeps its own typed enum; this only unifies them.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Composite(#[from] CompositeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Composite(err) => err.class(),
            Self::Config(_) => ErrorClass::Unsupported,
            Self::Field(err) => err.class(),
            Self::Model(err) => err.class(),
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Composite(CompositeError::Field(_)) | Self::Field(_) => ErrorOrigin::Field,
            Self::Composite(_) => ErrorOrigin::Composite,
            Self::Config(_) => ErrorOrigin::Config,
            Self::Model(_) => ErrorOrigin::Model,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }
}

///
/// CompositeError
///
/// Misuse of a composite attribute at a call site. Errors raised by an
/// enclosed field pass through `Field` untouched.
///

#[derive(Debug, ThisError)]
pub enum CompositeError {
    #[error(
        "{attribute} arguments must have length {expected}; the length of {value} is {found}"
    )]
    ArityMismatch {
        attribute: String,
        expected: usize,
        found: usize,
        value: Value,
    },

    #[error("{attribute} lookup argument must be a tuple, found {}", .value.label())]
    ExpectedTuple { attribute: String, value: Value },

    #[error("{attribute} can only be retrieved via instance")]
    InstanceRequired { attribute: String },

    #[error("{shape} has no component named '{component}'")]
    UnknownComponent { shape: String, component: String },

    #[error("lookup type '{kind}' not supported on {attribute}")]
    UnsupportedLookup { attribute: String, kind: LookupKind },

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl CompositeError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::ArityMismatch { .. }
            | Self::ExpectedTuple { .. }
            | Self::InstanceRequired { .. }
            | Self::UnknownComponent { .. } => ErrorClass::InvalidArgument,
            Self::UnsupportedLookup { .. } => ErrorClass::Unsupported,
            Self::Field(err) => err.class(),
        }
    }
}

///
/// FieldError
///
/// Raised by an atomic field's own preparation, or by a record slot.
///

#[derive(Debug, ThisError)]
pub enum FieldError {
    #[error("{field}: '{kind}' lookup expects {expected}, found {}", .value.label())]
    InvalidArgument {
        field: String,
        kind: LookupKind,
        expected: &'static str,
        value: Value,
    },

    #[error("{field}: value {value} is not a valid {kind}")]
    TypeMismatch {
        field: String,
        kind: FieldKind,
        value: Value,
    },

    #[error("cannot encode {} as {kind}", .value.label())]
    Unencodable { kind: FieldKind, value: Value },

    #[error("record has no slot named '{0}'")]
    UnknownSlot(String),

    #[error("{field}: lookup type '{kind}' not supported")]
    UnsupportedLookup { field: String, kind: LookupKind },
}

impl FieldError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidArgument { .. } | Self::TypeMismatch { .. } => {
                ErrorClass::InvalidArgument
            }
            Self::Unencodable { .. } | Self::UnsupportedLookup { .. } => ErrorClass::Unsupported,
            Self::UnknownSlot(_) => ErrorClass::NotFound,
        }
    }
}

///
/// ModelError
///
/// Failures while declaring, attaching or finalizing an owner type.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ModelError {
    #[error("field '{field}' is already attached to '{owner}'")]
    AlreadyAttached { field: String, owner: &'static str },

    #[error("attribute '{name}' declared twice on '{owner}'")]
    DuplicateAttribute { owner: &'static str, name: String },

    #[error("composite encloses field '{field}' more than once")]
    DuplicateEnclosedField { field: String },

    #[error("'{owner}' declares more than one primary key ('{first}', '{second}')")]
    DuplicatePrimaryKey {
        owner: &'static str,
        first: String,
        second: String,
    },

    #[error("composite attribute must enclose at least one field")]
    EmptyComposite,

    #[error("composite '{attribute}' on '{owner}' encloses '{field}' which belongs to '{other}'")]
    ForeignField {
        owner: &'static str,
        attribute: String,
        field: String,
        other: &'static str,
    },

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("'{0}' has no primary key")]
    MissingPrimaryKey(&'static str),

    #[error("shape for '{owner}.{attribute}' already exists with components {existing:?}")]
    ShapeConflict {
        owner: &'static str,
        attribute: String,
        existing: Vec<String>,
    },

    #[error("composite may enclose at most {max} fields, found {found}")]
    TooManyFields { max: usize, found: usize },

    #[error("composite '{attribute}' on '{owner}' encloses '{field}' which was never attached")]
    UnattachedField {
        owner: &'static str,
        attribute: String,
        field: String,
    },

    #[error("'{owner}' has no attribute '{name}'")]
    UnknownAttribute { owner: &'static str, name: String },
}

impl ModelError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownAttribute { .. } => ErrorClass::NotFound,
            Self::AlreadyAttached { .. }
            | Self::DuplicateAttribute { .. }
            | Self::DuplicateEnclosedField { .. }
            | Self::DuplicatePrimaryKey { .. }
            | Self::ShapeConflict { .. } => ErrorClass::Conflict,
            _ => ErrorClass::InvariantViolation,
        }
    }
}

///
/// ErrorClass
/// Error taxonomy for classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    InvalidArgument,
    InvariantViolation,
    NotFound,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::InvalidArgument => "invalid_argument",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Composite,
    Config,
    Field,
    Model,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Composite => "composite",
            Self::Config => "config",
            Self::Field => "field",
            Self::Model => "model",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_keep_field_origin_through_composite() {
        let err: Error = CompositeError::from(FieldError::UnknownSlot("x".into())).into();

        assert_eq!(err.origin(), ErrorOrigin::Field);
        assert_eq!(err.class(), ErrorClass::NotFound);
        assert_eq!(err.to_string(), "record has no slot named 'x'");
    }

    #[test]
    fn arity_mismatch_message_names_expected_and_found() {
        let err = CompositeError::ArityMismatch {
            attribute: "full_name".into(),
            expected: 2,
            found: 1,
            value: Value::tuple(["John"]),
        };

        assert_eq!(
            err.to_string(),
            "full_name arguments must have length 2; the length of (John) is 1"
        );
        assert_eq!(
            Error::from(err).display_with_class(),
            "composite:invalid_argument: full_name arguments must have length 2; the length of (John) is 1"
        );
    }
}
