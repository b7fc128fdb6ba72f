//! Reading whole packages.

use crate::FixtureBuilder;
use dimscrub_core::{CellValue, StructuredValue};
use dimscrub_xlsx::{XlsxError, XlsxReader};

#[test]
fn test_read_sheets_in_workbook_order() {
    let bytes = FixtureBuilder::new()
        .sheet("Report", r#"<sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData>"#)
        .sheet("Notes", r#"<sheetData/>"#)
        .build();

    let document = XlsxReader::read(&bytes).unwrap();
    let workbook = document.workbook();

    assert_eq!(workbook.sheet_count(), 2);
    assert_eq!(workbook.worksheet(0).unwrap().name(), "Report");
    assert_eq!(workbook.worksheet(1).unwrap().name(), "Notes");
    assert_eq!(document.sheet_part(1), Some("xl/worksheets/sheet2.xml"));
    assert!(workbook.has_data());
    assert!(!workbook.worksheet(1).unwrap().has_data());
}

#[test]
fn test_read_report_row() {
    let bytes = FixtureBuilder::new()
        .shared_strings(&[
            "<t>Angle of chamfer</t>",
            "<r><t>10.5</t></r><r><t xml:space=\"preserve\"> / </t></r><r><t>10.8</t></r>",
        ])
        .cell_formats(&[0, 2])
        .sheet(
            "Report",
            r#"<sheetData><row r="5"><c r="B5" t="s"><v>0</v></c><c r="E5" t="inlineStr"><is><t>30°15'</t></is></c><c r="F5" s="1"><v>30.5</v></c><c r="G5" t="s"><v>1</v></c></row></sheetData>"#,
        )
        .build();

    let document = XlsxReader::read(&bytes).unwrap();
    let sheet = document.workbook().worksheet(0).unwrap();

    assert_eq!(sheet.get_value("B5").unwrap(), CellValue::string("Angle of chamfer"));
    assert_eq!(sheet.get_value("E5").unwrap(), CellValue::string("30°15'"));
    assert_eq!(sheet.get_value("F5").unwrap(), CellValue::Number(30.5));
    assert_eq!(
        sheet.get_value("G5").unwrap(),
        CellValue::rich_text(["10.5", " / ", "10.8"])
    );
    assert_eq!(document.cell_format(1), Some(2));
    assert_eq!(document.cell_format_count(), 2);
}

#[test]
fn test_read_hyperlinks_from_sheet_rels() {
    let bytes = FixtureBuilder::new()
        .sheet(
            "Report",
            r#"<sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Drawing 7</t></is></c></row></sheetData><hyperlinks><hyperlink ref="A1" r:id="rId1"/></hyperlinks>"#,
        )
        .sheet_link("rId1", "https://example.com/7")
        .build();

    let document = XlsxReader::read(&bytes).unwrap();
    assert_eq!(
        document.workbook().worksheet(0).unwrap().get_value("A1").unwrap(),
        CellValue::hyperlink("Drawing 7", "https://example.com/7")
    );
}

#[test]
fn test_read_boolean_and_error_cells() {
    let bytes = FixtureBuilder::new()
        .sheet(
            "Report",
            r#"<sheetData><row r="1"><c r="A1" t="b"><v>0</v></c><c r="B1" t="e"><v>#DIV/0!</v></c></row></sheetData>"#,
        )
        .build();

    let document = XlsxReader::read(&bytes).unwrap();
    let sheet = document.workbook().worksheet(0).unwrap();
    assert_eq!(
        sheet.get_value("A1").unwrap(),
        StructuredValue::Boolean(false).into()
    );
    assert_eq!(
        sheet.get_value("B1").unwrap(),
        StructuredValue::Error(dimscrub_core::CellError::Div0).into()
    );
}

#[test]
fn test_read_file() {
    let bytes = FixtureBuilder::new()
        .sheet("Report", r#"<sheetData><row r="1"><c r="A1"><v>7</v></c></row></sheetData>"#)
        .build();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");
    std::fs::write(&path, &bytes).unwrap();

    let document = XlsxReader::read_file(&path).unwrap();
    assert_eq!(
        document.workbook().worksheet(0).unwrap().get_value("A1").unwrap(),
        CellValue::Number(7.0)
    );
}

#[test]
fn test_not_an_xlsx() {
    assert!(matches!(
        XlsxReader::read(b"id,value\n1,2\n"),
        Err(XlsxError::Zip(_))
    ));
}
