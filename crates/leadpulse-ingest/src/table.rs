//! In-memory CSV table: a trimmed header row plus rectangular data rows.

use csv::ReaderBuilder;

use crate::error::IngestError;

#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parses comma-delimited text with a mandatory header row.
    ///
    /// Rows shorter than the header are padded with empty cells; extra
    /// trailing cells are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MalformedCsv`] if the header row is missing or
    /// blank, or if the reader hits a structural error.
    pub fn parse(file: &str, text: &str) -> Result<Self, IngestError> {
        let text = text.trim_start_matches('\u{feff}');
        let malformed = |reason: String| IngestError::MalformedCsv {
            file: file.to_string(),
            reason,
        };

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| malformed(format!("failed to read header row: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(malformed("missing header row".to_string()));
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| malformed(format!("row {}: {e}", idx + 1)))?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// The trimmed cell at `idx`, or `""` when the column is absent.
pub(crate) fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map_or("", |v| v.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_rows() {
        let table = CsvTable::parse("t.csv", " Nome , LinkedIn\nAna,ana-li\n").unwrap();
        assert_eq!(table.headers(), ["Nome", "LinkedIn"]);
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0], ["Ana", "ana-li"]);
    }

    #[test]
    fn pads_short_rows_and_drops_extra_cells() {
        let table = CsvTable::parse("t.csv", "a,b,c\n1\n1,2,3,4\n").unwrap();
        assert_eq!(table.rows()[0], ["1", "", ""]);
        assert_eq!(table.rows()[1], ["1", "2", "3"]);
    }

    #[test]
    fn keeps_quoted_commas_and_newlines() {
        let table = CsvTable::parse("t.csv", "Nome,Resposta\n\"Souza, Ana\",\"linha 1\nlinha 2\"\n").unwrap();
        assert_eq!(table.rows()[0][0], "Souza, Ana");
        assert_eq!(table.rows()[0][1], "linha 1\nlinha 2");
    }

    #[test]
    fn skips_blank_rows() {
        let table = CsvTable::parse("t.csv", "a,b\n1,2\n,\n3,4\n").unwrap();
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn strips_bom_from_first_header() {
        let table = CsvTable::parse("t.csv", "\u{feff}Campaign Name,Event Type\n").unwrap();
        assert_eq!(table.headers()[0], "Campaign Name");
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = CsvTable::parse("empty.csv", "").unwrap_err();
        assert!(matches!(err, IngestError::MalformedCsv { ref file, .. } if file == "empty.csv"));
    }

    #[test]
    fn cell_returns_empty_for_missing_column() {
        let row = vec![" x ".to_string()];
        assert_eq!(cell(&row, Some(0)), "x");
        assert_eq!(cell(&row, Some(5)), "");
        assert_eq!(cell(&row, None), "");
    }
}
