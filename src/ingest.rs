//! CSV ingestion.
//!
//! The pipeline itself never parses file formats; this adapter turns a CSV
//! file into a [`Dataset`] and validates what the pipeline assumes: at least
//! one column, unique column names. Cell types are inferred per column:
//! integer if every non-empty cell parses as one, real if every non-empty
//! cell is numeric, text otherwise. Empty cells become NULL.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::dataset::{Dataset, Value};

pub fn read_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();
    if columns.is_empty() {
        bail!("{} has no columns", path.display());
    }
    let mut seen = HashSet::new();
    for name in &columns {
        if !seen.insert(name.as_str()) {
            bail!("duplicate column name {:?} in {}", name, path.display());
        }
    }

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result?);
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|i| infer_kind(&records, i))
        .collect();

    let rows: Vec<Vec<Value>> = records
        .iter()
        .map(|record| {
            (0..columns.len())
                .map(|i| parse_cell(record.get(i).unwrap_or(""), kinds[i]))
                .collect()
        })
        .collect();

    info!(
        path = %path.display(),
        rows = rows.len(),
        columns = columns.len(),
        "CSV ingested"
    );
    Ok(Dataset { columns, rows })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Real,
    Text,
}

fn infer_kind(records: &[csv::StringRecord], idx: usize) -> ColumnKind {
    let mut kind = ColumnKind::Integer;
    let mut saw_value = false;

    for record in records {
        let field = record.get(idx).unwrap_or("").trim();
        if field.is_empty() {
            continue;
        }
        saw_value = true;
        if kind == ColumnKind::Integer && field.parse::<i64>().is_err() {
            kind = ColumnKind::Real;
        }
        if kind == ColumnKind::Real && field.parse::<f64>().is_err() {
            return ColumnKind::Text;
        }
    }

    if saw_value {
        kind
    } else {
        ColumnKind::Text
    }
}

fn parse_cell(field: &str, kind: ColumnKind) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match kind {
        // Inference guarantees these parses succeed for non-empty cells.
        ColumnKind::Integer => trimmed
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(field.to_string())),
        ColumnKind::Real => trimmed
            .parse::<f64>()
            .map(Value::Real)
            .unwrap_or_else(|_| Value::Text(field.to_string())),
        ColumnKind::Text => Value::Text(field.to_string()),
    }
}
