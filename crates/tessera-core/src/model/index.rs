use serde::Serialize;
use std::fmt::{self, Display};

///
/// IndexModel
/// Index derived from an owner's primary key and uniqueness groups, already
/// expanded to physical columns (field order is significant).
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IndexModel {
    pub owner: &'static str,
    pub columns: Vec<String>,
    pub unique: bool,
    pub primary: bool,
}

impl IndexModel {
    #[must_use]
    /// Whether this index's column prefix matches the start of another index.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.columns.len() < other.columns.len() && other.columns.starts_with(&self.columns)
    }
}

impl Display for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns.join(", ");

        if self.primary {
            write!(f, "PRIMARY KEY {}({})", self.owner, columns)
        } else if self.unique {
            write!(f, "UNIQUE {}({})", self.owner, columns)
        } else {
            write!(f, "{}({})", self.owner, columns)
        }
    }
}
