//! ## Crate layout
//! - `core`: atomic fields, composite attributes, owner types, values,
//!   connections and observability.
//! - `config`: connection configuration loaded from TOML.
//!
//! The `prelude` module carries the vocabulary needed to declare owner types
//! and work with their instances.

pub use tessera_core as core;

pub use tessera_core::{config, obs};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use tessera_core::{Error, MAX_COMPOSITE_FIELDS, MAX_FIELD_NAME_LEN, MAX_OWNER_PATH_LEN};

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{obs::ModelReport, prelude::*};
    pub use serde::Serialize;
}
