//! Downloadable import template: three sample families per storefront category.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::error::ImportError;
use super::parser::{Column, RowData};
use crate::domain::aggregates::DEFAULT_CATEGORIES;

pub const TEMPLATE_FILE_NAME: &str = "template-import-categories.xlsx";
pub const TEMPLATE_CSV_FILE_NAME: &str = "template-import-categories.csv";
const SHEET_NAME: &str = "Template";
const COLUMN_WIDTHS: [f64; 5] = [25.0, 20.0, 30.0, 25.0, 35.0];

/// (family name, subfamily name), grouped three by three in category order.
const SAMPLES: [(&str, &str); 24] = [
    ("Vitamine A", "Vitamine A 1000mg"),
    ("Vitamine C", "Vitamine C 500mg"),
    ("Oméga 3", "Oméga 3 Fish Oil"),
    ("Shampoings", "Shampoing Anti-chute"),
    ("Soins Capillaires", "Masque Réparateur"),
    ("Colorations", "Coloration Permanente"),
    ("Crèmes Hydratantes", "Crème Hydratante Jour"),
    ("Sérums", "Sérum Anti-âge"),
    ("Nettoyants", "Gel Nettoyant Doux"),
    ("Laits Corps", "Lait Hydratant Corps"),
    ("Gels Douche", "Gel Douche Surgras"),
    ("Déodorants", "Déodorant Sans Alcool"),
    ("Soins Bébé", "Crème Change Bébé"),
    ("Alimentation Bébé", "Lait Infantile 1er Âge"),
    ("Maternité", "Crème Anti-vergetures"),
    ("Cosmétiques Bio", "Huile Argan Bio"),
    ("Compléments Bio", "Spiruline Bio"),
    ("Tisanes Bio", "Tisane Detox Bio"),
    ("Soins Intimes", "Gel Intime Doux"),
    ("Protections", "Protège-slips"),
    ("Lingettes Intimes", "Lingettes Fraîcheur"),
    ("Tensiomètres", "Tensiomètre Électronique"),
    ("Thermomètres", "Thermomètre Infrarouge"),
    ("Pansements", "Pansements Stériles"),
];

/// Sample rows with family references 00001.. and subfamily references 10001..
pub fn template_rows() -> Vec<RowData> {
    SAMPLES.iter().enumerate().map(|(idx, (family, subfamily))| {
        RowData::new(
            DEFAULT_CATEGORIES[idx / 3],
            &format!("{:05}", idx + 1),
            family,
            &format!("{:05}", 10_001 + idx),
            subfamily,
        )
    }).collect()
}

/// Template as CSV bytes, BOM-prefixed so spreadsheet software keeps the accents.
pub fn template_csv() -> Result<Vec<u8>, ImportError> {
    let mut writer = csv::Writer::from_writer(b"\xEF\xBB\xBF".to_vec());
    writer.write_record(Column::ALL.iter().map(|c| c.header()))?;
    for row in template_rows() {
        writer.write_record(Column::ALL.iter().map(|c| row.get(*c)))?;
    }
    writer.into_inner().map_err(|e| ImportError::Malformed(e.to_string()))
}

/// Template as an xlsx workbook with a single "Template" sheet. Every cell is text,
/// so references keep their leading zeros.
pub fn template_xlsx() -> Result<Vec<u8>, ImportError> {
    build_workbook().map_err(|e| ImportError::Malformed(e.to_string()))
}

fn build_workbook() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, column) in Column::ALL.iter().enumerate() {
        sheet.set_column_width(col as u16, COLUMN_WIDTHS[col])?;
        sheet.write_string_with_format(0, col as u16, column.header(), &bold)?;
    }
    for (idx, row) in template_rows().iter().enumerate() {
        for (col, column) in Column::ALL.iter().enumerate() {
            sheet.write_string(idx as u32 + 1, col as u16, row.get(*column))?;
        }
    }
    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parser::parse_rows;

    #[test]
    fn test_template_references() {
        let rows = template_rows();
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0].family_reference, "00001");
        assert_eq!(rows[23].family_reference, "00024");
        assert_eq!(rows[23].subfamily_reference, "10024");
        assert_eq!(rows[23].category, "Matériel Médical");
    }

    #[test]
    fn test_template_parses_back() {
        let bytes = template_csv().unwrap();
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
        let parsed = parse_rows(&bytes).unwrap();
        assert_eq!(parsed.iter().map(|r| r.data.clone()).collect::<Vec<_>>(), template_rows());
    }

    #[test]
    fn test_workbook_template_parses_back() {
        let bytes = template_xlsx().unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
        let parsed = parse_rows(&bytes).unwrap();
        assert_eq!(parsed.len(), 24);
        assert_eq!(parsed[0].row, 1);
        assert_eq!(parsed[0].data.family_reference, "00001");
        assert_eq!(parsed.iter().map(|r| r.data.clone()).collect::<Vec<_>>(), template_rows());
    }
}
