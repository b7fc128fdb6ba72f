//! Common utilities for E2E tests.
//!
//! Fixtures are assembled part by part with the `zip` crate, so every test
//! states exactly which XML the reader and writer see.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Builder for a minimal but complete XLSX package
#[derive(Debug, Default, Clone)]
pub struct FixtureBuilder {
    sheets: Vec<(String, String, Vec<(String, String)>)>,
    shared_strings: Option<String>,
    cell_formats: Option<Vec<u32>>,
    calc_chain: bool,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet; `body` is everything inside `<worksheet>`
    pub fn sheet(mut self, name: &str, body: &str) -> Self {
        self.sheets.push((name.to_string(), body.to_string(), Vec::new()));
        self
    }

    /// Add an external hyperlink relationship to the last sheet
    #[allow(dead_code)]
    pub fn sheet_link(mut self, id: &str, target: &str) -> Self {
        if let Some((_, _, links)) = self.sheets.last_mut() {
            links.push((id.to_string(), target.to_string()));
        }
        self
    }

    /// Shared strings table; each entry is the XML inside one `<si>`
    pub fn shared_strings(mut self, entries: &[&str]) -> Self {
        let items: String = entries.iter().map(|e| format!("<si>{}</si>", e)).collect();
        self.shared_strings = Some(items);
        self
    }

    /// Style table with one `cellXfs` entry per number format id
    pub fn cell_formats(mut self, fmt_ids: &[u32]) -> Self {
        self.cell_formats = Some(fmt_ids.to_vec());
        self
    }

    /// Include an `xl/calcChain.xml` part
    #[allow(dead_code)]
    pub fn calc_chain(mut self) -> Self {
        self.calc_chain = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = Vec::new();

        let mut overrides = String::from(
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        let mut workbook_rels = String::new();
        let mut sheets_xml = String::new();

        for (i, (name, body, links)) in self.sheets.iter().enumerate() {
            let n = i + 1;
            overrides.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
            workbook_rels.push_str(&format!(
                r#"<Relationship Id="rId{n}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{n}.xml"/>"#
            ));
            sheets_xml.push_str(&format!(
                r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#
            ));
            parts.push((
                format!("xl/worksheets/sheet{n}.xml"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{MAIN_NS}" xmlns:r="{REL_NS}">{body}</worksheet>"#
                ),
            ));
            if !links.is_empty() {
                let rels: String = links
                    .iter()
                    .map(|(id, target)| {
                        format!(
                            r#"<Relationship Id="{id}" Type="{REL_NS}/hyperlink" Target="{target}" TargetMode="External"/>"#
                        )
                    })
                    .collect();
                parts.push((
                    format!("xl/worksheets/_rels/sheet{n}.xml.rels"),
                    format!(r#"<Relationships xmlns="{PKG_REL_NS}">{rels}</Relationships>"#),
                ));
            }
        }

        let mut next_rel = self.sheets.len() + 1;
        if let Some(fmt_ids) = &self.cell_formats {
            let xfs: String = fmt_ids
                .iter()
                .map(|id| {
                    format!(r#"<xf numFmtId="{id}" fontId="0" fillId="0" borderId="0" xfId="0"/>"#)
                })
                .collect();
            parts.push((
                "xl/styles.xml".to_string(),
                format!(
                    r#"<styleSheet xmlns="{MAIN_NS}"><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="{}">{xfs}</cellXfs></styleSheet>"#,
                    fmt_ids.len()
                ),
            ));
            overrides.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
            workbook_rels.push_str(&format!(
                r#"<Relationship Id="rId{next_rel}" Type="{REL_NS}/styles" Target="styles.xml"/>"#
            ));
            next_rel += 1;
        }

        if let Some(items) = &self.shared_strings {
            parts.push((
                "xl/sharedStrings.xml".to_string(),
                format!(r#"<sst xmlns="{MAIN_NS}">{items}</sst>"#),
            ));
            overrides.push_str(r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#);
            workbook_rels.push_str(&format!(
                r#"<Relationship Id="rId{next_rel}" Type="{REL_NS}/sharedStrings" Target="sharedStrings.xml"/>"#
            ));
            next_rel += 1;
        }

        if self.calc_chain {
            parts.push((
                "xl/calcChain.xml".to_string(),
                format!(r#"<calcChain xmlns="{MAIN_NS}"><c r="E2" i="1"/></calcChain>"#),
            ));
            overrides.push_str(r#"<Override PartName="/xl/calcChain.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"/>"#);
            workbook_rels.push_str(&format!(
                r#"<Relationship Id="rId{next_rel}" Type="{REL_NS}/calcChain" Target="calcChain.xml"/>"#
            ));
        }

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
        ];
        all.extend(parts);

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in all {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

/// Text of one part of a written package
pub fn part_text(bytes: &[u8], name: &str) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    Some(text)
}

/// Part names of a package, in archive order
pub fn part_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
