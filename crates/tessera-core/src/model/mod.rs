//! Record model: atomic fields, virtual and composite attributes, and the
//! owner types that hold them.

pub mod composite;
pub mod constraint;
pub mod field;
pub mod index;
pub mod lookup;
pub mod owner;
pub mod shape;
pub mod virtual_field;

mod validate;

// re-exports
pub use composite::{CompositeDeclaration, CompositeField, LifecycleState, PendingComposite};
pub use constraint::{ConstraintSet, UniqueGroup};
pub use field::{AtomicField, FieldKind, FieldRef, ScalarField};
pub use index::IndexModel;
pub use lookup::{LookupKind, PreparedLookup};
pub use owner::{Attribute, OwnerSnapshot, OwnerType, OwnerTypeBuilder};
pub use shape::{CompositeValue, Shape, ShapeRegistry, shape_registry_read, shape_registry_write};
pub use virtual_field::{StorageColumn, VirtualAttribute, VirtualField};
