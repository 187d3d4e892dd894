use serde::{Deserialize, Serialize};

use crate::dataset::Value;

/// Columns and rows produced by executing a query.
///
/// Column names come from the engine's own statement description, not from
/// the dataset schema, since projections and aliases can change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
