use std::cmp::Ordering;

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::document::Document;

/// A single field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value.
    Eq(String, Value),
    /// Field is less than or equal to the value.
    Lte(String, Value),
    /// Field is greater than or equal to the value.
    Gte(String, Value),
}

impl Condition {
    fn matches(&self, document: &Document) -> bool {
        match self {
            Condition::Eq(field, expected) => document
                .get(field)
                .is_some_and(|actual| compare_values(actual, expected) == Some(Ordering::Equal)),
            Condition::Lte(field, bound) => document.get(field).is_some_and(|actual| {
                matches!(
                    compare_values(actual, bound),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }),
            Condition::Gte(field, bound) => document.get(field).is_some_and(|actual| {
                matches!(
                    compare_values(actual, bound),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }),
        }
    }
}

/// A conjunction of conditions. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(field.to_string(), value.into()));
        self
    }

    pub fn lte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Lte(field.to_string(), value.into()));
        self
    }

    pub fn gte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Gte(field.to_string(), value.into()));
        self
    }

    /// Shorthand for an equality filter on the document id.
    pub fn by_id(id: &str) -> Self {
        Self::new().eq(crate::document::ID_FIELD, id)
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub key: String,
    pub direction: SortDirection,
}

/// Sort and limit options for `find`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<SortOrder>,
    /// Maximum number of results (0 = no limit).
    pub limit: usize,
}

impl FindOptions {
    /// Most-recent-first by the given timestamp key, capped at `limit`.
    pub fn newest_first(key: &str, limit: usize) -> Self {
        Self {
            sort: Some(SortOrder {
                key: key.to_string(),
                direction: SortDirection::Descending,
            }),
            limit,
        }
    }

    pub fn limit(limit: usize) -> Self {
        Self { sort: None, limit }
    }
}

/// Compare two JSON values of the same kind.
///
/// Numbers compare numerically. Strings that both parse as RFC 3339
/// timestamps compare chronologically, other strings lexically. Values of
/// different kinds are incomparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => {
            match (
                OffsetDateTime::parse(x, &Rfc3339),
                OffsetDateTime::parse(y, &Rfc3339),
            ) {
                (Ok(tx), Ok(ty)) => Some(tx.cmp(&ty)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Sort documents in place by `order`. Documents missing the key sort last.
pub(crate) fn sort_documents(documents: &mut [Document], order: &SortOrder) {
    documents.sort_by(|a, b| {
        let ord = match (a.get(&order.key), b.get(&order.key)) {
            (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        match order.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}
