//! Report fixtures shared by the integration tests.
//!
//! Packages are assembled with the `zip` crate from a compact row
//! description, so each test shows the cells it feeds the engine.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// One fixture cell
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Number(f64),
    Text(&'a str),
}

/// One worksheet: cells by A1 reference plus merged ranges
#[derive(Debug, Default, Clone)]
pub struct SheetFixture<'a> {
    pub name: &'a str,
    pub cells: Vec<(&'a str, Value<'a>)>,
    pub merges: Vec<&'a str>,
}

impl<'a> SheetFixture<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn number(mut self, reference: &'a str, n: f64) -> Self {
        self.cells.push((reference, Value::Number(n)));
        self
    }

    pub fn text(mut self, reference: &'a str, s: &'a str) -> Self {
        self.cells.push((reference, Value::Text(s)));
        self
    }

    pub fn merge(mut self, range: &'a str) -> Self {
        self.merges.push(range);
        self
    }

    fn to_xml(&self) -> String {
        let mut rows: Vec<(u32, String)> = Vec::new();
        for (reference, value) in &self.cells {
            let row: u32 = reference
                .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                .parse()
                .unwrap();
            let cell = match value {
                Value::Number(n) => format!(r#"<c r="{reference}"><v>{n}</v></c>"#),
                Value::Text(s) => {
                    format!(r#"<c r="{reference}" t="inlineStr"><is><t>{s}</t></is></c>"#)
                }
            };
            match rows.iter_mut().find(|(r, _)| *r == row) {
                Some((_, xml)) => xml.push_str(&cell),
                None => rows.push((row, cell)),
            }
        }
        rows.sort_by_key(|(r, _)| *r);

        let mut xml = String::from("<sheetData>");
        for (r, cells) in rows {
            xml.push_str(&format!(r#"<row r="{r}">{cells}</row>"#));
        }
        xml.push_str("</sheetData>");
        if !self.merges.is_empty() {
            xml.push_str(&format!(r#"<mergeCells count="{}">"#, self.merges.len()));
            for range in &self.merges {
                xml.push_str(&format!(r#"<mergeCell ref="{range}"/>"#));
            }
            xml.push_str("</mergeCells>");
        }
        xml
    }
}

/// Build an XLSX package holding `sheets`
pub fn build_report(sheets: &[SheetFixture<'_>]) -> Vec<u8> {
    let mut overrides = String::from(
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    let mut workbook_rels = String::new();
    let mut sheets_xml = String::new();
    let mut parts = Vec::new();

    for (i, sheet) in sheets.iter().enumerate() {
        let n = i + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
        sheets_xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            sheet.name
        ));
        parts.push((
            format!("xl/worksheets/sheet{n}.xml"),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{MAIN_NS}" xmlns:r="{REL_NS}">{}</worksheet>"#,
                sheet.to_xml()
            ),
        ));
    }
    workbook_rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="{REL_NS}/styles" Target="styles.xml"/>"#,
        sheets.len() + 1
    ));

    let mut all = vec![
        (
            "[Content_Types].xml".to_string(),
            format!(
                r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{overrides}</Types>"#
            ),
        ),
        (
            "_rels/.rels".to_string(),
            format!(
                r#"<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
            ),
        ),
        (
            "xl/workbook.xml".to_string(),
            format!(
                r#"<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>{sheets_xml}</sheets></workbook>"#
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels".to_string(),
            format!(r#"<Relationships xmlns="{PKG_REL_NS}">{workbook_rels}</Relationships>"#),
        ),
        (
            "xl/styles.xml".to_string(),
            format!(
                r#"<styleSheet xmlns="{MAIN_NS}"><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs></styleSheet>"#
            ),
        ),
    ];
    all.extend(parts);

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in all {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Text of one part of a package
pub fn part_text(bytes: &[u8], name: &str) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    Some(text)
}

/// The bore/chamfer report most tests start from
///
/// Row 3 defines a linear window of 10..15 merged down to row 5; row 7 an
/// angular window of 30°..32°.
pub fn inspection_sheet() -> SheetFixture<'static> {
    SheetFixture::new("Report")
        .text("A1", "Dimensional inspection")
        .text("B2", "Feature")
        .text("C2", "Upper")
        .text("D2", "Lower")
        .text("E2", "Part 1")
        .text("B3", "Bore diameter")
        .number("C3", 15.0)
        .number("D3", 10.0)
        .number("E3", 12.5)
        .number("F3", 16.0)
        .text("G3", "10.5 / 10.8")
        .text("E4", "n/a")
        .text("E5", "9,5")
        .merge("C3:C5")
        .merge("D3:D5")
        .text("B7", "Angle of chamfer")
        .text("C7", "32°00'")
        .text("D7", "30°00'")
        .text("E7", "31°10'")
        .text("F7", "31°20'")
        .merge("E7:F7")
}
