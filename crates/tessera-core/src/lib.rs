//! Core runtime for Tessera: atomic fields, composite attributes, owner type
//! models, values, and observability.
//!
//! A composite attribute presents several independently stored atomic fields
//! as one logical attribute. It is declared against an owner type, resolved
//! once the owner type is finalized, and from then on translates reads,
//! writes and lookups into per-field operations.
#![warn(unreachable_pub)]

pub mod config;
pub mod connection;
pub mod error;
pub mod model;
pub mod obs;
pub mod record;
pub mod value;

///
/// CONSTANTS
///

/// Maximum number of atomic fields a composite attribute may enclose.
pub const MAX_COMPOSITE_FIELDS: usize = 16;

/// Maximum length for attribute identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 64;

/// Maximum length for owner type paths.
pub const MAX_OWNER_PATH_LEN: usize = 128;

// re-exports
pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks or registries are re-exported here.
///

pub mod prelude {
    pub use crate::{
        connection::{Connection, DbType, DialectConnection},
        model::{
            AtomicField, Attribute, CompositeDeclaration, CompositeField, CompositeValue,
            FieldKind, FieldRef, LookupKind, OwnerType, OwnerTypeBuilder, PreparedLookup,
            ScalarField, VirtualField,
        },
        record::{Record, Row},
        value::Value,
    };
}
