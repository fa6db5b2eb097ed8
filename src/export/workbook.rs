//! Workbook encoding for spreadsheet artifacts.

use crate::generator::{Artifact, ArtifactFormat};
use rust_xlsxwriter::{Workbook, XlsxError};

/// Encodes a CSV cell grid as a single-sheet xlsx workbook.
///
/// Cells that parse as finite numbers are written as numbers, other
/// non-empty cells as strings. Empty cells are left blank.
pub fn encode_grid(grid: &str) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (row, line) in grid.lines().enumerate() {
        for (col, cell) in line.split(',').enumerate() {
            if cell.is_empty() {
                continue;
            }
            let (row, col) = (row as u32, col as u16);
            match cell.parse::<f64>() {
                Ok(number) if number.is_finite() => {
                    worksheet.write_number(row, col, number)?;
                }
                _ => {
                    worksheet.write_string(row, col, cell)?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}

/// The bytes written to disk for `artifact`.
pub fn artifact_bytes(artifact: &Artifact) -> Result<Vec<u8>, XlsxError> {
    match artifact.format {
        ArtifactFormat::Text => Ok(artifact.content.as_bytes().to_vec()),
        ArtifactFormat::Workbook => encode_grid(&artifact.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn sheet_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("zip archive");
        let mut xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .expect("first sheet")
            .read_to_string(&mut xml)
            .expect("read sheet");
        xml
    }

    fn cell_xml<'a>(xml: &'a str, coordinate: &str) -> Option<&'a str> {
        let start = xml.find(&format!("<c r=\"{}\"", coordinate))?;
        let end = xml[start..].find("</c>")?;
        Some(&xml[start..start + end])
    }

    #[test]
    fn test_workbook_is_zip_container() {
        let bytes = encode_grid(",,\n,,7\n").expect("encode");
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn test_numbers_land_at_coordinates() {
        let bytes = encode_grid("10,15.5\n20,\n").expect("encode");
        let xml = sheet_xml(&bytes);

        assert!(cell_xml(&xml, "A1").expect("A1").contains("<v>10</v>"));
        assert!(cell_xml(&xml, "B1").expect("B1").contains("<v>15.5</v>"));
        assert!(cell_xml(&xml, "A2").expect("A2").contains("<v>20</v>"));
        assert!(cell_xml(&xml, "B2").is_none());
    }

    #[test]
    fn test_text_cells_are_strings() {
        let bytes = encode_grid("Revenue,Units\n").expect("encode");
        let xml = sheet_xml(&bytes);
        let header = cell_xml(&xml, "A1").expect("A1");
        assert!(header.contains("t=\"s\""));
    }

    #[test]
    fn test_text_artifact_bytes_unchanged() {
        let artifact = Artifact::new("notes.txt", "a,b\n");
        assert_eq!(artifact_bytes(&artifact).expect("bytes"), b"a,b\n".to_vec());
    }
}
