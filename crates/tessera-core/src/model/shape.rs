//! Value-type factory.
//!
//! A `Shape` is the structural value type of one composite attribute: fixed
//! arity, named components, produced once per (owner type, attribute) and
//! shared by every read and write of that attribute.

use crate::{
    error::{CompositeError, ModelError},
    obs::sink::{self, ModelEvent},
    value::Value,
};
use convert_case::{Case, Casing};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt::{self, Debug, Display},
    hash::{Hash, Hasher},
    sync::{Arc, LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

///
/// Shape
///

#[derive(Debug, Eq, PartialEq)]
pub struct Shape {
    type_name: String,
    owner: &'static str,
    attribute: String,
    components: Vec<String>,
}

impl Shape {
    fn new(owner: &'static str, attribute: &str, components: Vec<String>) -> Self {
        let leaf = owner.rsplit("::").next().unwrap_or(owner);
        let type_name = format!("{leaf}_{attribute}").to_case(Case::Pascal);

        Self {
            type_name,
            owner,
            attribute: attribute.to_string(),
            components,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub const fn owner(&self) -> &'static str {
        self.owner
    }

    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn position(&self, component: &str) -> Option<usize> {
        self.components.iter().position(|c| c == component)
    }

    /// Positional constructor.
    pub fn make(
        self: &Arc<Self>,
        values: impl Into<Vec<Value>>,
    ) -> Result<CompositeValue, CompositeError> {
        let values = values.into();
        if values.len() != self.arity() {
            return Err(CompositeError::ArityMismatch {
                attribute: self.attribute.clone(),
                expected: self.arity(),
                found: values.len(),
                value: Value::List(values),
            });
        }

        Ok(CompositeValue {
            shape: Arc::clone(self),
            values,
        })
    }
}

///
/// CompositeValue
///
/// Current value of a composite attribute: an ordered, named tuple. Equality,
/// ordering and hashing look at components only, in declaration order.
///

#[derive(Clone)]
pub struct CompositeValue {
    shape: Arc<Shape>,
    values: Vec<Value>,
}

impl CompositeValue {
    // built by reads; arity is guaranteed by the caller
    pub(crate) const fn from_parts(shape: Arc<Shape>, values: Vec<Value>) -> Self {
        Self { shape, values }
    }

    #[must_use]
    pub const fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Named component access.
    #[must_use]
    pub fn get(&self, component: &str) -> Option<&Value> {
        self.shape.position(component).map(|i| &self.values[i])
    }

    #[must_use]
    pub fn component(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.shape
            .components
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Return a copy with the named components replaced.
    pub fn replace<I, S, V>(&self, changes: I) -> Result<Self, CompositeError>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        let mut values = self.values.clone();
        for (name, value) in changes {
            let name = name.as_ref();
            let index =
                self.shape
                    .position(name)
                    .ok_or_else(|| CompositeError::UnknownComponent {
                        shape: self.shape.type_name.clone(),
                        component: name.to_string(),
                    })?;
            values[index] = value.into();
        }

        Ok(Self {
            shape: Arc::clone(&self.shape),
            values,
        })
    }
}

impl PartialEq for CompositeValue {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for CompositeValue {}

impl PartialOrd for CompositeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompositeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.values.cmp(&other.values)
    }
}

impl Hash for CompositeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl Debug for CompositeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(&self.shape.type_name);
        for (name, value) in self.iter() {
            s.field(name, value);
        }
        s.finish()
    }
}

impl Display for CompositeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

impl From<CompositeValue> for Vec<Value> {
    fn from(value: CompositeValue) -> Self {
        value.values
    }
}

impl From<CompositeValue> for Value {
    fn from(value: CompositeValue) -> Self {
        Self::List(value.values)
    }
}

///
/// ShapeRegistry
///

#[derive(Debug, Default)]
pub struct ShapeRegistry {
    shapes: BTreeMap<(&'static str, String), Arc<Shape>>,
}

impl ShapeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shape for (owner, attribute), creating it on first request.
    pub fn shape_for(
        &mut self,
        owner: &'static str,
        attribute: &str,
        components: &[String],
    ) -> Result<Arc<Shape>, ModelError> {
        let key = (owner, attribute.to_string());

        if let Some(existing) = self.shapes.get(&key) {
            if existing.components != components {
                return Err(ModelError::ShapeConflict {
                    owner,
                    attribute: attribute.to_string(),
                    existing: existing.components.clone(),
                });
            }
            sink::record(ModelEvent::ShapeReused { owner });

            return Ok(Arc::clone(existing));
        }

        let shape = Arc::new(Shape::new(owner, attribute, components.to_vec()));
        self.shapes.insert(key, Arc::clone(&shape));
        sink::record(ModelEvent::ShapeCreated { owner });

        Ok(shape)
    }

    #[must_use]
    pub fn get(&self, owner: &'static str, attribute: &str) -> Option<&Arc<Shape>> {
        self.shapes.get(&(owner, attribute.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

///
/// SHAPES
/// process-wide registry used by `OwnerTypeBuilder::finalize`
///

static SHAPES: LazyLock<RwLock<ShapeRegistry>> =
    LazyLock::new(|| RwLock::new(ShapeRegistry::new()));

/// Acquire a write guard to the global shape registry.
pub fn shape_registry_write() -> RwLockWriteGuard<'static, ShapeRegistry> {
    SHAPES
        .write()
        .expect("shape registry RwLock poisoned while acquiring write lock")
}

/// Acquire a read guard to the global shape registry.
pub fn shape_registry_read() -> RwLockReadGuard<'static, ShapeRegistry> {
    SHAPES
        .read()
        .expect("shape registry RwLock poisoned while acquiring read lock")
}
