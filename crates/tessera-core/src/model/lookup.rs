use crate::value::Value;
use derive_more::Display;
use serde::Serialize;

///
/// LookupKind
///
/// Comparison requested against an attribute. Composite attributes accept
/// only `Exact` and `In`; atomic fields accept every kind their type allows.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum LookupKind {
    #[display("exact")]
    Exact,
    #[display("in")]
    In,
    #[display("lt")]
    Lt,
    #[display("lte")]
    Lte,
    #[display("gt")]
    Gt,
    #[display("gte")]
    Gte,
    #[display("contains")]
    Contains,
    #[display("startswith")]
    StartsWith,
    #[display("isnull")]
    IsNull,
}

impl LookupKind {
    pub const ALL: [Self; 9] = [
        Self::Exact,
        Self::In,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Contains,
        Self::StartsWith,
        Self::IsNull,
    ];

    /// Parse the suffix form used in filter expressions (`full_name__in`).
    #[must_use]
    pub fn from_suffix(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.to_string() == s)
    }

    /// Split `attr__kind` into its attribute and kind; no suffix means exact.
    /// An unrecognised suffix is treated as part of the attribute name.
    #[must_use]
    pub fn split_expr(expr: &str) -> (&str, Self) {
        if let Some((attr, suffix)) = expr.rsplit_once("__")
            && let Some(kind) = Self::from_suffix(suffix)
        {
            return (attr, kind);
        }

        (expr, Self::Exact)
    }
}

///
/// PreparedLookup
///
/// Output of lookup preparation. At the logical level each entry is one
/// prepared sub-value per enclosed field; at the storage level entries are
/// flattened physical parameters.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum PreparedLookup {
    Exact(Vec<Value>),
    In(Vec<Vec<Value>>),

    /// Any other comparison against a single atomic field.
    Compare(Vec<Value>),
}

impl PreparedLookup {
    /// Total number of values carried, across all candidates.
    #[must_use]
    pub fn param_count(&self) -> usize {
        match self {
            Self::Exact(values) | Self::Compare(values) => values.len(),
            Self::In(candidates) => candidates.iter().map(Vec::len).sum(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.param_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_expr_recognises_known_suffixes() {
        assert_eq!(
            LookupKind::split_expr("full_name__in"),
            ("full_name", LookupKind::In)
        );
        assert_eq!(
            LookupKind::split_expr("first_name__startswith"),
            ("first_name", LookupKind::StartsWith)
        );
        assert_eq!(LookupKind::split_expr("pk"), ("pk", LookupKind::Exact));
    }

    #[test]
    fn split_expr_keeps_unknown_suffix_in_name() {
        assert_eq!(
            LookupKind::split_expr("author__name"),
            ("author__name", LookupKind::Exact)
        );
    }

    #[test]
    fn param_count_sums_in_candidates() {
        let lookup = PreparedLookup::In(vec![
            vec![Value::Int(1), Value::Int(2)],
            vec![Value::Int(3), Value::Int(4)],
        ]);

        assert_eq!(lookup.param_count(), 4);
        assert!(PreparedLookup::In(Vec::new()).is_empty());
    }
}
