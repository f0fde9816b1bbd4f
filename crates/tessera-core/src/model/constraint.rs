use crate::obs::sink::{self, ModelEvent};
use serde::Serialize;
use std::fmt::{self, Display};

///
/// UniqueGroup
/// Ordered field names that must be unique together.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct UniqueGroup {
    pub fields: Vec<String>,
}

impl Display for UniqueGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UNIQUE ({})", self.fields.join(", "))
    }
}

///
/// ConstraintSet
///
/// Owner-level constraint registry. Identical groups are stored once.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct ConstraintSet {
    owner: &'static str,
    unique: Vec<UniqueGroup>,
}

impl ConstraintSet {
    pub(crate) fn new(owner: &'static str) -> Self {
        Self {
            owner,
            unique: Vec::new(),
        }
    }

    /// Append a uniqueness group. Returns `false` if the same ordered group
    /// was already registered.
    pub(crate) fn append_uniqueness_group(&mut self, fields: Vec<String>) -> bool {
        let group = UniqueGroup { fields };
        if self.unique.contains(&group) {
            sink::record(ModelEvent::UniqueGroupSkipped { owner: self.owner });
            return false;
        }

        self.unique.push(group);
        sink::record(ModelEvent::UniqueGroupRegistered { owner: self.owner });

        true
    }

    #[must_use]
    pub fn unique_groups(&self) -> &[UniqueGroup] {
        &self.unique
    }
}
