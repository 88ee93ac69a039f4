//! Response Formatter & Size Guard (C9): renders a [`TableResult`] in one of
//! the enumerated formats and enforces `MAX_RESPONSE_BYTES` both before and
//! after serialization (§4.9).

mod cell;
mod csv;
mod format;
mod json;
mod markdown;
mod xml;
mod yaml;

pub use format::{check_estimate, check_measured, Format};

use dh_domain::{CoreError, TableResult};

/// A rendered response: the serialized body, the format actually used
/// (material when `format=auto`/`optimize-*`), and the row count/
/// completeness flags the envelope must carry (§4.9).
#[derive(Debug)]
pub struct RenderedTable {
    pub body: String,
    pub format_used: Format,
    pub row_count: usize,
    pub is_complete: bool,
}

/// Renders `table` in `requested` format (or its resolved `auto`/
/// `optimize-*` alias), enforcing the post-serialization size guard.
/// Callers are expected to have already called [`check_estimate`] against
/// the *unfetched* row/column counts before fetching `table`.
pub fn render(table: &TableResult, requested: &str) -> Result<RenderedTable, CoreError> {
    let format_used = Format::resolve(requested, table.row_count())?;
    let body = match format_used {
        Format::JsonRow => json::render_row(table),
        Format::JsonColumn => json::render_column(table),
        Format::Csv => csv::render(table)?,
        Format::MarkdownTable => markdown::render_table(table),
        Format::MarkdownKv => markdown::render_kv(table),
        Format::Yaml => yaml::render(table)?,
        Format::Xml => xml::render(table)?,
    };
    check_measured(body.len())?;
    Ok(RenderedTable { body, format_used, row_count: table.row_count(), is_complete: table.is_complete })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_domain::{CellValue, ColumnDef};

    fn sample() -> TableResult {
        TableResult {
            columns: vec![ColumnDef { name: "id".into(), type_name: "int".into() }],
            rows: vec![vec![CellValue::Int(1)]],
            is_complete: true,
        }
    }

    #[test]
    fn render_reports_the_format_actually_used_for_auto() {
        let rendered = render(&sample(), "auto").unwrap();
        assert_eq!(rendered.format_used, Format::MarkdownKv);
        assert!(rendered.body.contains("id: 1"));
    }

    #[test]
    fn render_rejects_unknown_format() {
        let err = render(&sample(), "bogus").unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::InvalidArgument);
    }

    #[test]
    fn oversized_serialized_body_fails_response_too_large() {
        let huge_rows: Vec<Vec<CellValue>> = (0..10).map(|i| vec![CellValue::Str("x".repeat(10_000_000 + i))]).collect();
        let table = TableResult { columns: vec![ColumnDef { name: "id".into(), type_name: "str".into() }], rows: huge_rows, is_complete: true };
        let err = render(&table, "json-row").unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::ResponseTooLarge);
    }
}
