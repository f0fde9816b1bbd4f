//! Owner types.
//!
//! Attributes are attached to an `OwnerTypeBuilder` in declaration order. A
//! composite may be attached before the fields it encloses; `finalize`
//! resolves every pending composite once all attributes are known, then
//! checks the primary key.

use crate::{
    connection::{Connection, DbType},
    error::{CompositeError, Error, ModelError},
    model::{
        FieldRef, LookupKind, PreparedLookup, ScalarField,
        composite::{CompositeDeclaration, CompositeField, PendingComposite},
        constraint::{ConstraintSet, UniqueGroup},
        index::IndexModel,
        shape::{ShapeRegistry, shape_registry_write},
        validate::{validate_attribute_name, validate_owner_path},
        virtual_field::{StorageColumn, VirtualAttribute, VirtualField},
    },
    obs::sink::{self, ModelEvent},
    record::{Record, Row},
    value::Value,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Alias that always resolves to the owner's primary key attribute.
pub const PK_ALIAS: &str = "pk";

///
/// Attribute
///

#[derive(Clone, Debug)]
pub enum Attribute {
    Field(FieldRef),
    Virtual(VirtualAttribute),
    Composite(Arc<CompositeField>),
}

impl Attribute {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field(field) => field.name(),
            Self::Virtual(attr) => attr.name(),
            Self::Composite(composite) => composite.name(),
        }
    }

    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        match self {
            Self::Field(field) => field.is_primary_key(),
            Self::Virtual(_) => false,
            Self::Composite(composite) => composite.is_primary_key(),
        }
    }

    /// Physical columns behind this attribute, in order.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        match self {
            Self::Field(field) => field.column().map(ToString::to_string).into_iter().collect(),
            Self::Virtual(_) => Vec::new(),
            Self::Composite(composite) => composite.columns().to_vec(),
        }
    }

    #[must_use]
    pub fn storage_column(&self) -> StorageColumn {
        match self {
            Self::Field(field) => StorageColumn {
                attname: field.name().to_string(),
                columns: Some(self.columns()),
            },
            Self::Virtual(attr) => attr.storage_column(),
            Self::Composite(composite) => composite.storage_column(),
        }
    }
}

///
/// Slot
/// builder-side attribute, before composites are resolved
///

#[derive(Debug)]
enum Slot {
    Field(FieldRef),
    Virtual(VirtualAttribute),
    Pending(PendingComposite),
}

impl Slot {
    fn name(&self) -> &str {
        match self {
            Self::Field(field) => field.name(),
            Self::Virtual(attr) => attr.name(),
            Self::Pending(pending) => pending.name(),
        }
    }
}

///
/// OwnerTypeBuilder
///

#[derive(Debug)]
pub struct OwnerTypeBuilder {
    path: &'static str,
    slots: Vec<Slot>,
    constraints: ConstraintSet,
}

impl OwnerTypeBuilder {
    pub fn new(path: &'static str) -> Result<Self, ModelError> {
        validate_owner_path(path)?;

        Ok(Self {
            path,
            slots: Vec::new(),
            constraints: ConstraintSet::new(path),
        })
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Attach a scalar field and hand back its shared handle, ready to be
    /// enclosed by a composite.
    pub fn field(&mut self, field: ScalarField) -> Result<FieldRef, ModelError> {
        let field = field.into_ref();
        self.attach_field(Arc::clone(&field))?;

        Ok(field)
    }

    /// Attach an atomic field. Its column is bound immediately.
    pub fn attach_field(&mut self, field: FieldRef) -> Result<(), ModelError> {
        self.reserve(field.name())?;
        field.attach(self.path)?;
        self.slots.push(Slot::Field(field));

        Ok(())
    }

    /// Attach a composite. Its enclosed fields only need to be attached to
    /// this builder by the time `finalize` runs.
    pub fn attach_composite(
        &mut self,
        name: &str,
        decl: CompositeDeclaration,
    ) -> Result<(), ModelError> {
        self.reserve(name)?;
        let pending = decl.attach(self.path, name, &mut self.constraints);
        self.slots.push(Slot::Pending(pending));

        Ok(())
    }

    pub fn attach_virtual(&mut self, name: &str) -> Result<(), ModelError> {
        self.reserve(name)?;
        self.slots
            .push(Slot::Virtual(VirtualAttribute::bind(self.path, name)));

        Ok(())
    }

    fn reserve(&self, name: &str) -> Result<(), ModelError> {
        validate_attribute_name(name)?;

        if self.slots.iter().any(|slot| slot.name() == name) {
            return Err(ModelError::DuplicateAttribute {
                owner: self.path,
                name: name.to_string(),
            });
        }

        Ok(())
    }

    /// Finalize against the process-wide shape registry.
    pub fn finalize(self) -> Result<OwnerType, ModelError> {
        let mut shapes = shape_registry_write();

        self.finalize_with(&mut shapes)
    }

    /// Resolve pending composites and check the primary key.
    ///
    /// Field bindings made by `attach_field` are not undone when this fails.
    /// A field handle that was attached here cannot be attached to another
    /// builder afterwards (`AlreadyAttached`); rebuild from fresh fields.
    pub fn finalize_with(self, shapes: &mut ShapeRegistry) -> Result<OwnerType, ModelError> {
        let Self {
            path,
            slots,
            constraints,
        } = self;

        let attributes = slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Field(field) => Ok(Attribute::Field(field)),
                Slot::Virtual(attr) => Ok(Attribute::Virtual(attr)),
                Slot::Pending(pending) => pending
                    .finalize(shapes)
                    .map(|composite| Attribute::Composite(Arc::new(composite))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let primary_key = {
            let mut keys = attributes
                .iter()
                .enumerate()
                .filter(|(_, attr)| attr.is_primary_key());

            let Some((index, first)) = keys.next() else {
                return Err(ModelError::MissingPrimaryKey(path));
            };
            if let Some((_, second)) = keys.next() {
                return Err(ModelError::DuplicatePrimaryKey {
                    owner: path,
                    first: first.name().to_string(),
                    second: second.name().to_string(),
                });
            }

            index
        };

        sink::record(ModelEvent::OwnerPrepared {
            owner: path,
            attributes: u64::try_from(attributes.len()).unwrap_or(u64::MAX),
        });
        debug!(
            owner = path,
            attributes = attributes.len(),
            primary_key = attributes[primary_key].name(),
            unique_groups = constraints.unique_groups().len(),
            "owner type finalized"
        );

        Ok(OwnerType {
            path,
            attributes,
            constraints,
            primary_key,
        })
    }
}

///
/// OwnerType
///
/// Finalized, immutable owner model. Every composite on it is active.
///

#[derive(Debug)]
pub struct OwnerType {
    path: &'static str,
    attributes: Vec<Attribute>,
    constraints: ConstraintSet,
    primary_key: usize,
}

impl OwnerType {
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute by name; `pk` resolves to the primary key.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        if name == PK_ALIAS {
            return Some(self.primary_key());
        }

        self.attributes.iter().find(|attr| attr.name() == name)
    }

    #[must_use]
    pub fn composite(&self, name: &str) -> Option<&CompositeField> {
        match self.attribute(name)? {
            Attribute::Composite(composite) => Some(composite.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn primary_key(&self) -> &Attribute {
        &self.attributes[self.primary_key]
    }

    #[must_use]
    pub fn unique_groups(&self) -> &[UniqueGroup] {
        self.constraints.unique_groups()
    }

    /// Atomic columns in declaration order with their db types. Composites
    /// contribute enclosed columns that are not already listed.
    #[must_use]
    pub fn physical_columns(&self, conn: &dyn Connection) -> Vec<(String, DbType)> {
        let mut columns: Vec<(String, DbType)> = Vec::new();
        let mut push = |field: &FieldRef| {
            if let Some(column) = field.column()
                && !columns.iter().any(|(c, _)| c == column)
            {
                columns.push((column.to_string(), field.db_type(conn)));
            }
        };

        for attr in &self.attributes {
            match attr {
                Attribute::Field(field) => push(field),
                Attribute::Virtual(_) => {}
                Attribute::Composite(composite) => {
                    composite.enclosed_fields().iter().for_each(&mut push);
                }
            }
        }

        columns
    }

    /// Primary key index first, then one unique index per uniqueness group.
    #[must_use]
    pub fn index_models(&self) -> Vec<IndexModel> {
        let mut indexes = vec![IndexModel {
            owner: self.path,
            columns: self.primary_key().columns(),
            unique: true,
            primary: true,
        }];

        for group in self.unique_groups() {
            indexes.push(IndexModel {
                owner: self.path,
                columns: group.fields.iter().map(|f| self.column_of(f)).collect(),
                unique: true,
                primary: false,
            });
        }

        indexes
    }

    /// Ordering on an attribute, expanded to its columns. A leading `-`
    /// carries over to every column.
    pub fn order_columns(&self, name: &str) -> Result<Vec<String>, ModelError> {
        let (prefix, name) = name
            .strip_prefix('-')
            .map_or(("", name), |rest| ("-", rest));

        let columns = self.resolve(name)?.columns();

        Ok(columns
            .into_iter()
            .map(|column| format!("{prefix}{column}"))
            .collect())
    }

    pub fn read(&self, name: &str, instance: &dyn Record) -> Result<Value, Error> {
        let value = match self.resolve(name)? {
            Attribute::Field(field) => instance.value(field.name()).unwrap_or(Value::Null),
            Attribute::Virtual(attr) => attr.read(Some(instance))?,
            Attribute::Composite(composite) => composite.get(Some(instance))?.into(),
        };

        Ok(value)
    }

    pub fn write(&self, name: &str, instance: &mut dyn Record, value: Value) -> Result<(), Error> {
        match self.resolve(name)? {
            Attribute::Field(field) => instance.set_value(field.name(), value)?,
            Attribute::Virtual(attr) => attr.write(instance, value)?,
            Attribute::Composite(composite) => composite.write(instance, value)?,
        }

        Ok(())
    }

    pub fn pk_value(&self, instance: &dyn Record) -> Result<Value, Error> {
        self.read(PK_ALIAS, instance)
    }

    pub fn set_pk(&self, instance: &mut dyn Record, value: Value) -> Result<(), Error> {
        self.write(PK_ALIAS, instance, value)
    }

    /// Empty row that only accepts this owner's atomic slots.
    #[must_use]
    pub fn new_row(&self) -> Row {
        Row::with_slots(self.attributes.iter().filter_map(|attr| match attr {
            Attribute::Field(field) => Some(field.name().to_string()),
            _ => None,
        }))
    }

    pub fn prepare_lookup(
        &self,
        name: &str,
        kind: LookupKind,
        value: &Value,
    ) -> Result<PreparedLookup, Error> {
        let prepared = match self.resolve(name)? {
            Attribute::Field(field) => {
                let prepared = field.prepare_lookup(kind, value)?;
                self.lookup_prepared();

                match (kind, prepared) {
                    (LookupKind::In, Value::List(items)) => {
                        PreparedLookup::In(items.into_iter().map(|v| vec![v]).collect())
                    }
                    (LookupKind::Exact, v) => PreparedLookup::Exact(vec![v]),
                    (_, v) => PreparedLookup::Compare(vec![v]),
                }
            }
            Attribute::Virtual(attr) => return Err(self.not_queryable(attr, kind)),
            Attribute::Composite(composite) => composite.prepare_lookup(kind, value)?,
        };

        Ok(prepared)
    }

    pub fn prepare_storage_lookup(
        &self,
        name: &str,
        kind: LookupKind,
        value: &Value,
        conn: &dyn Connection,
    ) -> Result<PreparedLookup, Error> {
        let prepared = match self.resolve(name)? {
            Attribute::Field(field) => {
                let params = field.prepare_storage_lookup(kind, value, conn, false)?;
                self.lookup_prepared();

                match kind {
                    LookupKind::In => {
                        let width = field.db_type(conn).params.max(1);
                        PreparedLookup::In(params.chunks(width).map(<[Value]>::to_vec).collect())
                    }
                    LookupKind::Exact => PreparedLookup::Exact(params),
                    _ => PreparedLookup::Compare(params),
                }
            }
            Attribute::Virtual(attr) => return Err(self.not_queryable(attr, kind)),
            Attribute::Composite(composite) => {
                composite.prepare_storage_lookup(kind, value, conn, false)?
            }
        };

        Ok(prepared)
    }

    #[must_use]
    pub fn snapshot(&self) -> OwnerSnapshot {
        OwnerSnapshot {
            path: self.path,
            primary_key: self.primary_key().name().to_string(),
            attributes: self.attributes.iter().map(Attribute::storage_column).collect(),
            unique: self.unique_groups().to_vec(),
            indexes: self.index_models(),
        }
    }

    fn resolve(&self, name: &str) -> Result<&Attribute, ModelError> {
        self.attribute(name)
            .ok_or_else(|| ModelError::UnknownAttribute {
                owner: self.path,
                name: name.to_string(),
            })
    }

    fn column_of(&self, name: &str) -> String {
        match self.attribute(name) {
            Some(Attribute::Field(field)) => field.column().unwrap_or(name).to_string(),
            _ => name.to_string(),
        }
    }

    fn lookup_prepared(&self) {
        sink::record(ModelEvent::LookupPrepared { owner: self.path });
    }

    fn not_queryable(&self, attr: &VirtualAttribute, kind: LookupKind) -> Error {
        sink::record(ModelEvent::LookupRejected { owner: self.path });

        CompositeError::UnsupportedLookup {
            attribute: attr.name().to_string(),
            kind,
        }
        .into()
    }
}

///
/// OwnerSnapshot
/// serializable view of a finalized owner type
///

#[derive(Clone, Debug, Serialize)]
pub struct OwnerSnapshot {
    pub path: &'static str,
    pub primary_key: String,
    pub attributes: Vec<StorageColumn>,
    pub unique: Vec<UniqueGroup>,
    pub indexes: Vec<IndexModel>,
}
