//! Row parser: reads a delimited product file into a normalised sequence
//! of import rows.
//!
//! The parser is deliberately lenient about content and strict about
//! structure: byte sequences that are not valid UTF-8 are decoded lossily,
//! control characters are stripped, and rows without a usable name are
//! silently omitted. A missing file or unreadable header fails the whole
//! job, since no row can be attributed without one.

use std::path::{Path, PathBuf};

use stockroom_core::import::{resolve_columns, sanitize_field, ImportRow};

/// Fatal parsing failures. Any of these aborts the entire job.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The file reference does not resolve to an existing file.
    #[error("Import file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file exists but the underlying stream cannot be read.
    #[error("Import file unreadable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first line could not be parsed into a usable header.
    #[error("Import header unreadable: {0}")]
    HeaderRead(String),
}

/// The parsed content of one import file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Number of retained rows (rows with a usable name). Percentage math
    /// and the result summary both use this count.
    pub total_rows: usize,
    /// The retained rows, in file order.
    pub rows: Vec<ImportRow>,
}

/// Parse a delimited file into import rows.
///
/// Row numbers are 1-based positions after the header row and survive the
/// omission of empty-name rows, so error messages always point at the line
/// the user can see in their spreadsheet.
pub fn parse_rows(path: &Path) -> Result<ParsedFile, ParseError> {
    if !path.exists() {
        return Err(ParseError::FileNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let header = match records.next() {
        Some(Ok(record)) => record,
        Some(Err(e)) => return Err(ParseError::HeaderRead(e.to_string())),
        None => return Err(ParseError::HeaderRead("file is empty".into())),
    };

    let headers: Vec<String> = header.iter().map(sanitize_field).collect();
    let columns = resolve_columns(&headers).ok_or_else(|| {
        ParseError::HeaderRead(format!(
            "no product name column found in header: {headers:?}"
        ))
    })?;

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let row_number = idx + 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                // Malformed data rows are treated like rows without a
                // name: omitted, not fatal.
                tracing::warn!(row_number, error = %e, "Skipping malformed row");
                continue;
            }
        };

        let field = |col: Option<usize>| col.and_then(|i| record.get(i)).map(sanitize_field);

        let name = field(Some(columns.name)).unwrap_or_default();
        let description = field(columns.description);
        let image_url = field(columns.image_url);

        if let Some(row) = ImportRow::from_fields(
            row_number,
            &name,
            description.as_deref(),
            image_url.as_deref(),
        ) {
            rows.push(row);
        }
    }

    Ok(ParsedFile {
        total_rows: rows.len(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn write_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn parses_well_formed_file() {
        let file = write_file(
            b"product_name,description,image_url\n\
              Oak Chair,A sturdy chair,https://example.com/chair.png\n\
              Walnut Desk,,\n",
        );
        let parsed = parse_rows(file.path()).unwrap();

        assert_eq!(parsed.total_rows, 2);
        assert_eq!(parsed.rows[0].name, "Oak Chair");
        assert_eq!(parsed.rows[0].description.as_deref(), Some("A sturdy chair"));
        assert_eq!(parsed.rows[1].name, "Walnut Desk");
        assert!(parsed.rows[1].description.is_none());
        assert!(parsed.rows[1].image_url.is_none());
    }

    #[test]
    fn accepts_name_header_alias() {
        let file = write_file(b"name,description\nLamp,Bright\n");
        let parsed = parse_rows(file.path()).unwrap();
        assert_eq!(parsed.rows[0].name, "Lamp");
    }

    #[test]
    fn omits_rows_without_name_and_keeps_row_numbers() {
        let file = write_file(
            b"product_name,description\n\
              First,a\n\
              ,no name here\n\
              Third,c\n",
        );
        let parsed = parse_rows(file.path()).unwrap();

        assert_eq!(parsed.total_rows, 2);
        assert_eq!(parsed.rows[0].row_number, 1);
        // The nameless row occupies position 2; the next kept row is 3.
        assert_eq!(parsed.rows[1].row_number, 3);
        assert_eq!(parsed.rows[1].name, "Third");
    }

    #[test]
    fn tolerates_invalid_utf8() {
        let file = write_file(b"product_name\nCaf\xFF Table\n");
        let parsed = parse_rows(file.path()).unwrap();
        assert_eq!(parsed.total_rows, 1);
        assert!(parsed.rows[0].name.starts_with("Caf"));
    }

    #[test]
    fn strips_control_characters_from_fields() {
        let file = write_file(b"product_name,description\nChair,desc\x07with\x00noise\n");
        let parsed = parse_rows(file.path()).unwrap();
        assert_eq!(parsed.rows[0].description.as_deref(), Some("descwithnoise"));
    }

    #[test]
    fn fails_on_missing_file() {
        let err = parse_rows(Path::new("/nonexistent/products.csv")).unwrap_err();
        assert_matches!(err, ParseError::FileNotFound(_));
    }

    #[test]
    fn fails_on_empty_file() {
        let file = write_file(b"");
        let err = parse_rows(file.path()).unwrap_err();
        assert_matches!(err, ParseError::HeaderRead(_));
    }

    #[test]
    fn fails_when_no_name_column() {
        let file = write_file(b"sku,price\n1,2\n");
        let err = parse_rows(file.path()).unwrap_err();
        assert_matches!(err, ParseError::HeaderRead(_));
    }

    #[test]
    fn zero_data_rows_is_not_an_error() {
        let file = write_file(b"product_name,description\n");
        let parsed = parse_rows(file.path()).unwrap();
        assert_eq!(parsed.total_rows, 0);
        assert!(parsed.rows.is_empty());
    }
}
