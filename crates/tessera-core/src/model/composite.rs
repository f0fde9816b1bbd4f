//! Composite attributes.
//!
//! A composite moves through three states. It is `Declared` when built over
//! its enclosed fields, `PendingOwnerPreparation` once attached to an owner,
//! and `Active` after the owner type is finalized. Each transition consumes
//! the previous state, so finalize can run only once per attribute.

use crate::{
    MAX_COMPOSITE_FIELDS,
    connection::{Connection, DbType},
    error::{CompositeError, ModelError},
    model::{
        FieldRef, LookupKind, PreparedLookup,
        constraint::ConstraintSet,
        shape::{CompositeValue, Shape, ShapeRegistry},
        virtual_field::{StorageColumn, VirtualAttribute, VirtualField},
    },
    obs::sink::{self, ModelEvent},
    record::Record,
    value::Value,
};
use derive_more::Display;
use std::{collections::BTreeSet, sync::Arc};
use tracing::{debug, trace};

///
/// LifecycleState
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum LifecycleState {
    Declared,
    PendingOwnerPreparation,
    Active,
}

///
/// CompositeDeclaration
///

#[derive(Debug)]
pub struct CompositeDeclaration {
    fields: Vec<FieldRef>,
    unique: bool,
    primary_key: bool,
}

impl CompositeDeclaration {
    pub fn new<I>(fields: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = FieldRef>,
    {
        let fields: Vec<FieldRef> = fields.into_iter().collect();

        if fields.is_empty() {
            return Err(ModelError::EmptyComposite);
        }
        if fields.len() > MAX_COMPOSITE_FIELDS {
            return Err(ModelError::TooManyFields {
                max: MAX_COMPOSITE_FIELDS,
                found: fields.len(),
            });
        }

        // component names must be distinct
        let mut seen = BTreeSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(ModelError::DuplicateEnclosedField {
                    field: field.name().to_string(),
                });
            }
        }

        Ok(Self {
            fields,
            unique: false,
            primary_key: false,
        })
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Primary-key composites are unique through the key itself and never
    /// register a separate uniqueness group.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldRef] {
        &self.fields
    }

    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        LifecycleState::Declared
    }

    /// Immediate half of attachment. Registers the uniqueness group now and
    /// leaves everything that needs enclosed columns for finalize.
    pub(crate) fn attach(
        self,
        owner: &'static str,
        name: &str,
        constraints: &mut ConstraintSet,
    ) -> PendingComposite {
        if self.unique && !self.primary_key {
            let names = self.fields.iter().map(|f| f.name().to_string()).collect();
            constraints.append_uniqueness_group(names);
        }

        PendingComposite {
            owner,
            name: name.to_string(),
            decl: self,
        }
    }
}

///
/// PendingComposite
///

#[derive(Debug)]
pub struct PendingComposite {
    owner: &'static str,
    name: String,
    decl: CompositeDeclaration,
}

impl PendingComposite {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        LifecycleState::PendingOwnerPreparation
    }

    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.decl.primary_key
    }

    /// Resolve against the enclosed fields' final columns. Every enclosed
    /// field must be attached to this composite's owner by now.
    pub(crate) fn finalize(self, shapes: &mut ShapeRegistry) -> Result<CompositeField, ModelError> {
        let Self { owner, name, decl } = self;

        let mut columns = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let unattached = || ModelError::UnattachedField {
                owner,
                attribute: name.clone(),
                field: field.name().to_string(),
            };

            match field.owner() {
                Some(other) if other != owner => {
                    return Err(ModelError::ForeignField {
                        owner,
                        attribute: name.clone(),
                        field: field.name().to_string(),
                        other,
                    });
                }
                Some(_) => {}
                None => return Err(unattached()),
            }

            let column = field.column().ok_or_else(unattached)?;
            columns.push(column.to_string());
        }

        let base = VirtualAttribute::bind(owner, &name);
        let components: Vec<String> = decl.fields.iter().map(|f| f.name().to_string()).collect();
        let shape = shapes.shape_for(owner, &name, &components)?;

        sink::record(ModelEvent::CompositeFinalized { owner });
        debug!(
            owner,
            attribute = %name,
            arity = columns.len(),
            shape = shape.type_name(),
            "composite attribute finalized"
        );

        Ok(CompositeField {
            base,
            fields: decl.fields,
            columns,
            shape,
            unique: decl.unique,
            primary_key: decl.primary_key,
        })
    }
}

///
/// CompositeField
///
/// Active composite attribute. Immutable; reads build a fresh value from the
/// instance every time and writes touch only the enclosed slots.
///

#[derive(Debug)]
pub struct CompositeField {
    base: VirtualAttribute,
    fields: Vec<FieldRef>,
    columns: Vec<String>,
    shape: Arc<Shape>,
    unique: bool,
    primary_key: bool,
}

impl CompositeField {
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        LifecycleState::Active
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique || self.primary_key
    }

    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Current value on `instance`, absent slots read as `Null`.
    pub fn get<R>(&self, instance: Option<&R>) -> Result<CompositeValue, CompositeError>
    where
        R: Record + ?Sized,
    {
        let instance = instance.ok_or_else(|| CompositeError::InstanceRequired {
            attribute: self.base.name().to_string(),
        })?;

        let values = self
            .fields
            .iter()
            .map(|f| instance.value(f.name()).unwrap_or(Value::Null))
            .collect();

        Ok(CompositeValue::from_parts(Arc::clone(&self.shape), values))
    }

    /// Assign component `i` to enclosed field `i`. Only arity is checked here;
    /// each field validates its own component.
    pub fn set<R>(&self, instance: &mut R, value: impl Into<Vec<Value>>) -> Result<(), CompositeError>
    where
        R: Record + ?Sized,
    {
        let values = value.into();
        if values.len() != self.arity() {
            return Err(self.arity_mismatch(Value::List(values)));
        }

        for (field, value) in self.fields.iter().zip(values) {
            instance.set_value(field.name(), value)?;
        }

        Ok(())
    }

    pub fn prepare_lookup(
        &self,
        kind: LookupKind,
        value: &Value,
    ) -> Result<PreparedLookup, CompositeError> {
        let prepared = match kind {
            LookupKind::Exact => PreparedLookup::Exact(self.prepare_exact(value)?),
            LookupKind::In => PreparedLookup::In(
                self.candidates(value)?
                    .iter()
                    .map(|candidate| self.prepare_exact(candidate))
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Err(self.unsupported(kind)),
        };
        sink::record(ModelEvent::LookupPrepared {
            owner: self.base.owner(),
        });

        Ok(prepared)
    }

    /// Storage-level preparation. Each enclosed field may expand to several
    /// parameters; an exact match flattens them into one list in field order.
    pub fn prepare_storage_lookup(
        &self,
        kind: LookupKind,
        value: &Value,
        conn: &dyn Connection,
        prepared: bool,
    ) -> Result<PreparedLookup, CompositeError> {
        let params = match kind {
            LookupKind::Exact => {
                PreparedLookup::Exact(self.prepare_storage_exact(value, conn, prepared)?)
            }
            LookupKind::In => PreparedLookup::In(
                self.candidates(value)?
                    .iter()
                    .map(|candidate| self.prepare_storage_exact(candidate, conn, prepared))
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Err(self.unsupported(kind)),
        };
        sink::record(ModelEvent::LookupPrepared {
            owner: self.base.owner(),
        });

        Ok(params)
    }

    fn prepare_exact(&self, value: &Value) -> Result<Vec<Value>, CompositeError> {
        let components = self.components(value)?;

        self.fields
            .iter()
            .zip(components)
            .map(|(field, v)| {
                field
                    .prepare_lookup(LookupKind::Exact, v)
                    .map_err(CompositeError::from)
            })
            .collect()
    }

    fn prepare_storage_exact(
        &self,
        value: &Value,
        conn: &dyn Connection,
        prepared: bool,
    ) -> Result<Vec<Value>, CompositeError> {
        let components = self.components(value)?;

        let mut params = Vec::with_capacity(components.len());
        for (field, v) in self.fields.iter().zip(components) {
            params.extend(field.prepare_storage_lookup(LookupKind::Exact, v, conn, prepared)?);
        }

        Ok(params)
    }

    // one tuple, exactly `arity` long
    fn components<'a>(&self, value: &'a Value) -> Result<&'a [Value], CompositeError> {
        let components = value
            .as_list()
            .ok_or_else(|| CompositeError::ExpectedTuple {
                attribute: self.base.name().to_string(),
                value: value.clone(),
            })?;

        if components.len() != self.arity() {
            return Err(self.arity_mismatch(value.clone()));
        }

        Ok(components)
    }

    // list of candidate tuples for `in`
    fn candidates<'a>(&self, value: &'a Value) -> Result<&'a [Value], CompositeError> {
        value
            .as_list()
            .ok_or_else(|| CompositeError::ExpectedTuple {
                attribute: self.base.name().to_string(),
                value: value.clone(),
            })
    }

    fn arity_mismatch(&self, value: Value) -> CompositeError {
        let found = value.as_list().map_or(1, <[Value]>::len);
        sink::record(ModelEvent::ArityMismatch {
            owner: self.base.owner(),
        });

        CompositeError::ArityMismatch {
            attribute: self.base.name().to_string(),
            expected: self.arity(),
            found,
            value,
        }
    }

    fn unsupported(&self, kind: LookupKind) -> CompositeError {
        sink::record(ModelEvent::LookupRejected {
            owner: self.base.owner(),
        });
        trace!(
            owner = self.base.owner(),
            attribute = self.base.name(),
            %kind,
            "composite lookup rejected"
        );

        CompositeError::UnsupportedLookup {
            attribute: self.base.name().to_string(),
            kind,
        }
    }
}

impl VirtualField for CompositeField {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn owner(&self) -> &'static str {
        self.base.owner()
    }

    fn storage_type(&self, conn: &dyn Connection) -> Option<Vec<DbType>> {
        Some(self.fields.iter().map(|f| f.db_type(conn)).collect())
    }

    fn storage_column(&self) -> StorageColumn {
        StorageColumn {
            attname: self.base.name().to_string(),
            columns: Some(self.columns.clone()),
        }
    }

    fn enclosed_fields(&self) -> &[FieldRef] {
        &self.fields
    }

    fn read(&self, instance: Option<&dyn Record>) -> Result<Value, CompositeError> {
        self.get(instance).map(Value::from)
    }

    fn write(&self, instance: &mut dyn Record, value: Value) -> Result<(), CompositeError> {
        match value {
            Value::List(values) => self.set(instance, values),
            other => Err(CompositeError::ExpectedTuple {
                attribute: self.base.name().to_string(),
                value: other,
            }),
        }
    }
}
