//! Writing patched packages.

use pretty_assertions::assert_eq;

use crate::{part_names, part_text, FixtureBuilder};
use dimscrub_core::{CellValue, NumberFormat};
use dimscrub_xlsx::{XlsxReader, XlsxWriter};

fn report() -> FixtureBuilder {
    FixtureBuilder::new()
        .cell_formats(&[0, 164])
        .shared_strings(&["<t>Bore diameter</t>"])
        .sheet(
            "Report",
            r#"<sheetData><row r="2"><c r="B2" t="s"><v>0</v></c><c r="E2" s="1"><f>D2*2</f><v>21</v></c><c r="F2"><v>10.8</v></c></row></sheetData><mergeCells count="1"><mergeCell ref="B2:C2"/></mergeCells><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
        )
        .calc_chain()
}

#[test]
fn test_unmodified_document_keeps_parts() {
    let bytes = report().build();
    let document = XlsxReader::read(&bytes).unwrap();
    let written = XlsxWriter::write(&document).unwrap();

    assert_eq!(part_names(&written), part_names(&bytes));
    for name in part_names(&bytes) {
        assert_eq!(part_text(&written, &name), part_text(&bytes, &name), "{}", name);
    }
}

#[test]
fn test_modified_cells_round_trip() {
    let bytes = report().build();
    let mut document = XlsxReader::read(&bytes).unwrap();
    {
        let sheet = document.workbook_mut().worksheet_mut(0).unwrap();
        let cell = sheet.cell_at_mut(1, 4).unwrap();
        cell.set_value(10.62);
        cell.set_number_format(NumberFormat::two_decimals());
        sheet.set_cell_value("F2", "10.75 / 10.90").unwrap();
    }

    let written = XlsxWriter::write(&document).unwrap();
    let reread = XlsxReader::read(&written).unwrap();
    let sheet = reread.workbook().worksheet(0).unwrap();

    assert_eq!(sheet.get_value("B2").unwrap(), CellValue::string("Bore diameter"));
    assert_eq!(sheet.get_value("E2").unwrap(), CellValue::Number(10.62));
    assert_eq!(sheet.get_value("F2").unwrap(), CellValue::string("10.75 / 10.90"));
    assert_eq!(sheet.merged_regions().len(), 1);

    // E2 gets a clone of style 1 carrying the two-decimal format
    let e2 = sheet.cell("E2").unwrap().unwrap();
    assert_eq!(e2.style_index, 2);
    assert_eq!(reread.cell_format(2), Some(NumberFormat::ID_NUMBER_DEC2));
    assert_eq!(reread.cell_format(1), Some(164));

    let sheet_xml = part_text(&written, "xl/worksheets/sheet1.xml").unwrap();
    assert!(sheet_xml.contains(r#"<pageMargins left="0.7""#));
}

#[test]
fn test_replacing_formula_drops_calc_chain() {
    let bytes = report().build();
    let mut document = XlsxReader::read(&bytes).unwrap();
    document
        .workbook_mut()
        .worksheet_mut(0)
        .unwrap()
        .set_cell_value("E2", 20.5)
        .unwrap();

    let written = XlsxWriter::write(&document).unwrap();

    assert!(part_text(&written, "xl/calcChain.xml").is_none());
    assert!(!part_text(&written, "[Content_Types].xml")
        .unwrap()
        .contains("calcChain"));
    assert!(!part_text(&written, "xl/_rels/workbook.xml.rels")
        .unwrap()
        .contains("calcChain"));
    assert!(XlsxReader::read(&written).is_ok());
}

#[test]
fn test_plain_edit_keeps_calc_chain() {
    let bytes = report().build();
    let mut document = XlsxReader::read(&bytes).unwrap();
    document
        .workbook_mut()
        .worksheet_mut(0)
        .unwrap()
        .set_cell_value("F2", 11.0)
        .unwrap();

    let written = XlsxWriter::write(&document).unwrap();
    assert!(part_text(&written, "xl/calcChain.xml").is_some());
}

#[test]
fn test_write_file() {
    let bytes = report().build();
    let document = XlsxReader::read(&bytes).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");

    XlsxWriter::write_file(&document, &path).unwrap();
    let reread = XlsxReader::read_file(&path).unwrap();
    assert_eq!(reread.workbook().sheet_count(), 1);
}
