//! Dataset and schema model.
//!
//! A session holds exactly one [`Dataset`] at a time; loading a new one
//! replaces the old wholesale. The [`Schema`] is recomputed from the dataset
//! on every load and is what the query translator describes to the
//! language-model service.

use serde::{Deserialize, Serialize};

/// Name of the single table a session's dataset is materialized into.
pub const TABLE_NAME: &str = "data";

/// A scalar cell value, mirroring SQLite's storage classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn display(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    pub fn display_width(&self) -> usize {
        unicode_width::UnicodeWidthStr::width(self.display().as_str())
    }
}

/// Tabular data loaded for one session: ordered named columns and ordered
/// rows of positional cells. Every row has `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Table name plus ordered column names, derived from a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub table_name: String,
    pub columns: Vec<String>,
}

impl Schema {
    /// Derive the schema for a dataset. Column names are taken verbatim, in
    /// order; the table name is the session constant. Duplicate column names
    /// are a caller error; the ingestion side rejects them before a dataset
    /// reaches this point.
    pub fn of(dataset: &Dataset) -> Schema {
        debug_assert!(!dataset.columns.is_empty());
        debug_assert!({
            let mut seen = std::collections::HashSet::new();
            dataset.columns.iter().all(|c| seen.insert(c))
        });

        Schema {
            table_name: TABLE_NAME.to_string(),
            columns: dataset.columns.clone(),
        }
    }

    /// Comma-separated column list for prompt building.
    pub fn column_list(&self) -> String {
        self.columns.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str]) -> Dataset {
        Dataset {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: vec![],
        }
    }

    #[test]
    fn test_schema_preserves_column_count_and_order() {
        let ds = dataset(&["name", "score", "joined_at"]);
        let schema = Schema::of(&ds);
        assert_eq!(schema.columns.len(), ds.columns.len());
        assert_eq!(schema.columns, vec!["name", "score", "joined_at"]);
        assert_eq!(schema.table_name, TABLE_NAME);
    }

    #[test]
    fn test_schema_is_deterministic() {
        let ds = dataset(&["a", "b"]);
        assert_eq!(Schema::of(&ds), Schema::of(&ds));
    }

    #[test]
    fn test_schema_single_column() {
        let schema = Schema::of(&dataset(&["only"]));
        assert_eq!(schema.columns, vec!["only"]);
        assert_eq!(schema.column_list(), "only");
    }

    #[test]
    fn test_column_list() {
        let schema = Schema::of(&dataset(&["name", "score"]));
        assert_eq!(schema.column_list(), "name, score");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.display(), "NULL");
        assert_eq!(Value::Integer(42).display(), "42");
        assert_eq!(Value::Real(2.5).display(), "2.5");
        assert_eq!(Value::Text("hello".into()).display(), "hello");
    }

    #[test]
    fn test_value_display_width() {
        assert_eq!(Value::Null.display_width(), 4);
        assert_eq!(Value::Integer(-100).display_width(), 4);
        assert_eq!(Value::Text("héllo".into()).display_width(), 5);
    }

    #[test]
    fn test_value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Integer(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&Value::Text("x".into())).unwrap(),
            "\"x\""
        );
    }
}
