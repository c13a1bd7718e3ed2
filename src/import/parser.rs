//! Row parser: uploaded workbook (xlsx, xls, ods; first sheet) or CSV export
//! to ordered raw records.
//!
//! Headers are matched loosely (case, accents and separators ignored) so that
//! "Référence Sous-famille" and "reference_sous_famille" land in the same column.
//! Rows are not validated here; a row missing its family name still comes out
//! and is rejected later with the precise reason.

use std::fmt;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use tracing::debug;

use super::error::ImportError;
use crate::domain::value_objects::Slug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Category,
    FamilyReference,
    FamilyName,
    SubfamilyReference,
    SubfamilyName,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Category,
        Column::FamilyReference,
        Column::FamilyName,
        Column::SubfamilyReference,
        Column::SubfamilyName,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Category => "Catégorie",
            Column::FamilyReference => "Référence Famille",
            Column::FamilyName => "Nom Famille",
            Column::SubfamilyReference => "Référence Sous-famille",
            Column::SubfamilyName => "Nom Sous-famille",
        }
    }

    pub fn expected_headers() -> String {
        Self::ALL.iter().map(|c| c.header()).collect::<Vec<_>>().join(", ")
    }

    fn from_header(header: &str) -> Option<Column> {
        let key = Slug::from_name(header);
        Self::ALL.into_iter().find(|c| Slug::from_name(c.header()) == key)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.header()) }
}

/// The five cells of a row, trimmed, exactly as read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RowData {
    #[serde(rename = "Catégorie")]
    pub category: String,
    #[serde(rename = "Référence Famille")]
    pub family_reference: String,
    #[serde(rename = "Nom Famille")]
    pub family_name: String,
    #[serde(rename = "Référence Sous-famille")]
    pub subfamily_reference: String,
    #[serde(rename = "Nom Sous-famille")]
    pub subfamily_name: String,
}

impl RowData {
    pub fn new(category: &str, family_reference: &str, family_name: &str, subfamily_reference: &str, subfamily_name: &str) -> Self {
        Self {
            category: category.trim().to_string(),
            family_reference: family_reference.trim().to_string(),
            family_name: family_name.trim().to_string(),
            subfamily_reference: subfamily_reference.trim().to_string(),
            subfamily_name: subfamily_name.trim().to_string(),
        }
    }

    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::Category => &self.category,
            Column::FamilyReference => &self.family_reference,
            Column::FamilyName => &self.family_name,
            Column::SubfamilyReference => &self.subfamily_reference,
            Column::SubfamilyName => &self.subfamily_name,
        }
    }

    fn set(&mut self, column: Column, value: &str) {
        let slot = match column {
            Column::Category => &mut self.category,
            Column::FamilyReference => &mut self.family_reference,
            Column::FamilyName => &mut self.family_name,
            Column::SubfamilyReference => &mut self.subfamily_reference,
            Column::SubfamilyName => &mut self.subfamily_name,
        };
        *slot = value.trim().to_string();
    }

    pub fn is_blank(&self) -> bool { Column::ALL.iter().all(|c| self.get(*c).is_empty()) }
}

/// A record with its 1-based data row number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRow {
    pub row: usize,
    pub data: RowData,
}

/// Parses an uploaded sheet. Fails only when the file as a whole cannot be read.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError> {
    let rows = if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        parse_workbook(bytes)?
    } else {
        parse_csv(bytes)?
    };
    if rows.is_empty() { return Err(ImportError::EmptyFile); }
    debug!(rows = rows.len(), "parsed import sheet");
    Ok(rows)
}

fn parse_workbook(bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range_at(0).ok_or(ImportError::EmptyFile)??;
    let mut records = range.rows().map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>());
    let headers = records.next().ok_or(ImportError::EmptyFile)?;
    collect_rows(&headers, records.map(Ok))
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ImportError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(bytes))
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let records = reader.records().map(|record| {
        record.map(|r| r.iter().map(str::to_string).collect()).map_err(ImportError::from)
    });
    collect_rows(&headers, records)
}

/// Maps each record onto the recognised columns. Rows are numbered from the first
/// record after the header; blank records keep their number but are dropped.
fn collect_rows<I>(headers: &[String], records: I) -> Result<Vec<ImportRow>, ImportError>
where
    I: Iterator<Item = Result<Vec<String>, ImportError>>,
{
    let columns = map_columns(headers);
    if columns.iter().all(Option::is_none) {
        return Err(ImportError::UnrecognizedColumns(headers.to_vec()));
    }

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record?;
        let mut data = RowData::default();
        for (column, value) in columns.iter().zip(&record) {
            if let Some(column) = column {
                data.set(*column, value);
            }
        }
        if data.is_blank() { continue; }
        rows.push(ImportRow { row: idx + 1, data });
    }
    Ok(rows)
}

fn map_columns(headers: &[String]) -> Vec<Option<Column>> {
    let mut seen = Vec::new();
    headers.iter().map(|header| {
        let column = Column::from_header(header).filter(|c| !seen.contains(c));
        if let Some(c) = column { seen.push(c); }
        column
    }).collect()
}

/// Cell as text. Whole numbers lose the ".0" so a reference typed as 10001 reads "10001".
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

/// Spreadsheet exports in French locales use `;`; everything else `,`.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|d| first_line.iter().filter(|b| *b == d).count())
        .filter(|d| first_line.contains(d))
        .unwrap_or(b',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semicolon_with_bom() {
        let csv = "\u{feff}Catégorie;Référence Famille;Nom Famille;Référence Sous-famille;Nom Sous-famille\n\
                   Soins Visage; 00007 ;Crèmes Hydratantes;10007;Crème Jour\n\
                   Soins Visage;00008;Sérums;;\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].data.family_reference, "00007");
        assert_eq!(rows[1].data.subfamily_reference, "");
    }

    #[test]
    fn test_headers_match_loosely_and_keep_leading_zeros() {
        let csv = "categorie,reference_famille,NOM FAMILLE,Colonne libre\nCapillaires,00004,Shampoings,x\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].data, RowData::new("Capillaires", "00004", "Shampoings", "", ""));
    }

    #[test]
    fn test_blank_rows_skipped_but_numbered() {
        let csv = "Catégorie,Référence Famille,Nom Famille\nA,1,Un\n,,\nB,2,Deux\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_malformed_rows_pass_through() {
        let csv = "Catégorie,Référence Famille,Nom Famille\nSoins Corps,,\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].data.category, "Soins Corps");
        assert!(rows[0].data.family_name.is_empty());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(matches!(parse_rows(b""), Err(ImportError::EmptyFile)));
        assert!(matches!(parse_rows("Catégorie,Nom Famille\n".as_bytes()), Err(ImportError::EmptyFile)));
        assert!(matches!(parse_rows(b"foo,bar\n1,2\n"), Err(ImportError::UnrecognizedColumns(_))));
        assert!(matches!(parse_rows(b"PK\x03\x04rest-of-xlsx"), Err(ImportError::Malformed(_))));
        assert!(matches!(parse_rows(b"Cat\xe9gorie\n\xff\xfe\n"), Err(ImportError::Malformed(_)) | Err(ImportError::UnrecognizedColumns(_))));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(10001.0)), "10001");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String(" Capillaires ".into())), "Capillaires");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
