//! The internal tabular shape every engine-facing handler produces before
//! formatting (§4.9). Kept engine-agnostic: neither community nor
//! enterprise client code needs to know about output formats, and neither
//! formatter needs to know about engine wire types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl CellValue {
    /// Rough per-cell byte estimate used by the pre-fetch size guard (§4.9).
    pub fn estimated_bytes(&self) -> usize {
        match self {
            CellValue::Null => 4,
            CellValue::Bool(_) => 5,
            CellValue::Int(_) => 8,
            CellValue::Float(_) => 8,
            CellValue::Str(s) => s.len(),
            CellValue::Bytes(b) => b.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableResult {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<CellValue>>,
    /// `false` when the handler truncated the result against `max_rows`.
    pub is_complete: bool,
}

impl TableResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `rows × cols × BYTES_PER_CELL_ESTIMATE`, the pre-fetch size-guard
    /// estimate from §4.9, generalized to declared-but-unfetched schemas.
    pub fn estimate_bytes(row_count: usize, col_count: usize) -> usize {
        const BYTES_PER_CELL_ESTIMATE: usize = 32;
        row_count.saturating_mul(col_count).saturating_mul(BYTES_PER_CELL_ESTIMATE)
    }

    /// Exact post-serialization size estimate, summing actual cell payloads
    /// plus a per-cell overhead constant for encoding punctuation.
    pub fn measured_bytes(&self) -> usize {
        const OVERHEAD_PER_CELL: usize = 4;
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.estimated_bytes() + OVERHEAD_PER_CELL)
                    .sum::<usize>()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_with_rows_and_cols() {
        assert_eq!(TableResult::estimate_bytes(10, 5), 10 * 5 * 32);
    }

    #[test]
    fn measured_bytes_sums_cells() {
        let t = TableResult {
            columns: vec![ColumnDef { name: "a".into(), type_name: "int".into() }],
            rows: vec![vec![CellValue::Int(1)], vec![CellValue::Str("hi".into())]],
            is_complete: true,
        };
        assert_eq!(t.measured_bytes(), (8 + 4) + (2 + 4));
    }
}
