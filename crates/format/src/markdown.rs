//! `markdown-table` and `markdown-kv` encoders (§4.9).

use dh_domain::TableResult;
use std::fmt::Write;

use crate::cell::to_display_string;

/// Header + rule + one row per record, GitHub-flavored.
pub fn render_table(table: &TableResult) -> String {
    let mut out = String::new();
    let headers: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let rule = headers.iter().map(|_| "---").collect::<Vec<_>>().join(" | ");
    let _ = writeln!(out, "| {rule} |");
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(to_display_string).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out
}

/// One record per block: `## Record N\nkey: value\n...`.
pub fn render_kv(table: &TableResult) -> String {
    let mut out = String::new();
    for (i, row) in table.rows.iter().enumerate() {
        let _ = writeln!(out, "## Record {}", i + 1);
        for (col, cell) in table.columns.iter().zip(row) {
            let _ = writeln!(out, "{}: {}", col.name, to_display_string(cell));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_domain::{CellValue, ColumnDef};

    fn sample() -> TableResult {
        TableResult {
            columns: vec![ColumnDef { name: "id".into(), type_name: "int".into() }],
            rows: vec![vec![CellValue::Int(1)], vec![CellValue::Int(2)]],
            is_complete: true,
        }
    }

    #[test]
    fn table_has_header_and_rule_row() {
        let md = render_table(&sample());
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| id |");
        assert_eq!(lines[1], "| --- |");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn kv_emits_one_block_per_record() {
        let md = render_kv(&sample());
        assert!(md.contains("## Record 1"));
        assert!(md.contains("## Record 2"));
        assert!(md.contains("id: 1"));
    }
}
