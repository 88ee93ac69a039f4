//! The enumerated output formats and the `auto`/`optimize-*` aliases that
//! resolve to one of them (§4.9).

use dh_domain::config::MAX_RESPONSE_BYTES;
use dh_domain::{CoreError, TableResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    JsonRow,
    JsonColumn,
    Csv,
    MarkdownTable,
    MarkdownKv,
    Yaml,
    Xml,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::JsonRow => "json-row",
            Format::JsonColumn => "json-column",
            Format::Csv => "csv",
            Format::MarkdownTable => "markdown-table",
            Format::MarkdownKv => "markdown-kv",
            Format::Yaml => "yaml",
            Format::Xml => "xml",
        }
    }

    /// Parses a `format` tool argument, resolving `auto` against the
    /// estimated row count and the `optimize-*` aliases to their concrete
    /// format (§4.9).
    pub fn resolve(requested: &str, estimated_row_count: usize) -> Result<Format, CoreError> {
        match requested {
            "json-row" => Ok(Format::JsonRow),
            "json-column" => Ok(Format::JsonColumn),
            "csv" => Ok(Format::Csv),
            "markdown-table" => Ok(Format::MarkdownTable),
            "markdown-kv" => Ok(Format::MarkdownKv),
            "yaml" => Ok(Format::Yaml),
            "xml" => Ok(Format::Xml),
            "optimize-accuracy" => Ok(Format::MarkdownKv),
            "optimize-cost" => Ok(Format::Csv),
            "optimize-speed" => Ok(Format::JsonColumn),
            "auto" => Ok(match estimated_row_count {
                0..=1000 => Format::MarkdownKv,
                1001..=10_000 => Format::MarkdownTable,
                _ => Format::Csv,
            }),
            other => Err(CoreError::invalid_argument(format!("unrecognized format: {other:?}"))),
        }
    }
}

/// Pre-fetch estimate check: `rows × cols × BYTES_PER_CELL_ESTIMATE` against
/// `MAX_RESPONSE_BYTES`, run before a handler issues the underlying fetch
/// (§4.9).
pub fn check_estimate(row_count: usize, col_count: usize) -> Result<(), CoreError> {
    let estimate = TableResult::estimate_bytes(row_count, col_count);
    if estimate > MAX_RESPONSE_BYTES {
        return Err(CoreError::response_too_large(format!(
            "estimated response size {estimate} bytes exceeds the {MAX_RESPONSE_BYTES} byte ceiling"
        )));
    }
    Ok(())
}

/// Post-serialization exact check against `MAX_RESPONSE_BYTES` (§4.9).
pub fn check_measured(serialized_len: usize) -> Result<(), CoreError> {
    if serialized_len > MAX_RESPONSE_BYTES {
        return Err(CoreError::response_too_large(format!(
            "serialized response size {serialized_len} bytes exceeds the {MAX_RESPONSE_BYTES} byte ceiling"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_resolves_by_row_count_bracket() {
        assert_eq!(Format::resolve("auto", 500).unwrap(), Format::MarkdownKv);
        assert_eq!(Format::resolve("auto", 5_000).unwrap(), Format::MarkdownTable);
        assert_eq!(Format::resolve("auto", 50_000).unwrap(), Format::Csv);
    }

    #[test]
    fn optimize_aliases_map_to_concrete_formats() {
        assert_eq!(Format::resolve("optimize-accuracy", 1).unwrap(), Format::MarkdownKv);
        assert_eq!(Format::resolve("optimize-cost", 1).unwrap(), Format::Csv);
        assert_eq!(Format::resolve("optimize-speed", 1).unwrap(), Format::JsonColumn);
    }

    #[test]
    fn unknown_format_is_invalid_argument() {
        let err = Format::resolve("bogus", 1).unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::InvalidArgument);
    }

    #[test]
    fn estimate_over_ceiling_fails_before_fetch() {
        let err = check_estimate(10_000_000, 100).unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::ResponseTooLarge);
    }
}
