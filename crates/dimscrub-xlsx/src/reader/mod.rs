//! XLSX reader

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::document::{XlsxDocument, WORKBOOK_PART};
use crate::error::{XlsxError, XlsxResult};
use crate::package::XlsxPackage;
use crate::rels::{read_relationships, rels_path_for, resolve_target, Relationship};
use crate::styles::{read_cell_formats, STYLES_PART};
use crate::xml::{attr, decode_excel_escapes, local_name, row_index};
use dimscrub_core::{
    Cell, CellAddress, CellError, CellRange, CellValue, StructuredValue, Workbook, Worksheet,
};

const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<XlsxDocument> {
        let bytes = std::fs::read(path)?;
        Self::read(&bytes)
    }

    /// Read a workbook from the bytes of an XLSX file
    pub fn read(bytes: &[u8]) -> XlsxResult<XlsxDocument> {
        let package = XlsxPackage::from_bytes(bytes)?;

        let shared_strings = match package.part(SHARED_STRINGS_PART) {
            Some(xml) => Self::read_shared_strings(xml)?,
            None => Vec::new(),
        };

        let cell_formats = match package.part(STYLES_PART) {
            Some(xml) => read_cell_formats(xml)?,
            None => Vec::new(),
        };

        let sheets = Self::read_workbook_xml(package.require_part(WORKBOOK_PART)?)?;
        let workbook_rels =
            read_relationships(package.require_part(&rels_path_for(WORKBOOK_PART))?)?;

        let mut workbook = Workbook::new();
        let mut sheet_parts = Vec::with_capacity(sheets.len());

        for (name, r_id) in sheets {
            let Some(rel) = workbook_rels.iter().find(|r| r.id == r_id) else {
                log::warn!("sheet '{}' has no relationship {}; skipped", name, r_id);
                continue;
            };
            let part = resolve_target(WORKBOOK_PART, &rel.target);
            let Some(xml) = package.part(&part) else {
                log::warn!("sheet '{}' points at missing part {}; skipped", name, part);
                continue;
            };

            let sheet_rels = match package.part(&rels_path_for(&part)) {
                Some(rels) => read_relationships(rels)?,
                None => Vec::new(),
            };

            let mut worksheet = Worksheet::new(name);
            Self::read_worksheet(xml, &mut worksheet, &shared_strings, &sheet_rels)?;
            log::debug!(
                "read sheet '{}' from {} ({} rows)",
                worksheet.name(),
                part,
                worksheet.rows().count()
            );

            workbook.add_worksheet(worksheet);
            sheet_parts.push(part);
        }

        Ok(XlsxDocument::new(
            workbook,
            package,
            sheet_parts,
            cell_formats,
        ))
    }

    /// Read the shared strings table
    ///
    /// Entries made of several runs become rich text; phonetic runs are skipped.
    fn read_shared_strings(xml: &[u8]) -> XlsxResult<Vec<CellValue>> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut strings = Vec::new();
        let mut runs: Vec<String> = Vec::new();
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match local_name(&e) {
                    b"si" => runs.clear(),
                    b"rPh" => in_phonetic = true,
                    b"t" if !in_phonetic => {
                        in_t = true;
                        runs.push(String::new());
                    }
                    _ => {}
                },
                Event::Empty(e) if local_name(&e) == b"si" => strings.push(CellValue::string("")),
                Event::Text(t) if in_t => {
                    if let Some(run) = runs.last_mut() {
                        run.push_str(&t.unescape()?);
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"t" => in_t = false,
                    b"rPh" => in_phonetic = false,
                    b"si" => strings.push(text_value(&runs)),
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml(xml: &[u8]) -> XlsxResult<Vec<(String, String)>> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if local_name(&e) == b"sheet" => {
                    if let (Some(name), Some(r_id)) = (attr(&e, b"name"), attr(&e, b"id")) {
                        sheets.push((name, r_id));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read cells, merged regions and hyperlinks of one worksheet part
    fn read_worksheet(
        xml: &[u8],
        worksheet: &mut Worksheet,
        shared_strings: &[CellValue],
        sheet_rels: &[Relationship],
    ) -> XlsxResult<()> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();

        let mut row: u32 = 0;
        let mut next_row: u32 = 0;
        let mut next_col: u16 = 0;
        let mut pending: Option<PendingCell> = None;
        let mut capture = Capture::None;
        let mut in_phonetic = false;
        let mut merges = Vec::new();
        let mut links = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match local_name(&e) {
                    b"row" => {
                        row = row_index(&e, next_row)?;
                        next_row = row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let cell = PendingCell::start(&e, row, next_col)?;
                        next_col = cell.addr.col.saturating_add(1);
                        pending = Some(cell);
                    }
                    b"rPh" => in_phonetic = true,
                    name => {
                        if let Some(cell) = pending.as_mut() {
                            capture = cell.begin_capture(name, in_phonetic);
                        }
                    }
                },
                Event::Empty(e) => match local_name(&e) {
                    b"row" => {
                        row = row_index(&e, next_row)?;
                        next_row = row + 1;
                    }
                    b"c" => {
                        let cell = PendingCell::start(&e, row, next_col)?;
                        next_col = cell.addr.col.saturating_add(1);
                    }
                    b"f" => {
                        if let Some(cell) = pending.as_mut() {
                            cell.formula.get_or_insert_with(String::new);
                        }
                    }
                    b"mergeCell" => {
                        if let Some(reference) = attr(&e, b"ref") {
                            merges.push(reference);
                        }
                    }
                    b"hyperlink" => {
                        if let Some(link) = HyperlinkRef::from_element(&e, sheet_rels) {
                            links.push(link);
                        }
                    }
                    _ => {}
                },
                Event::Text(t) if capture != Capture::None => {
                    if let Some(cell) = pending.as_mut() {
                        cell.push_text(capture, &t.unescape()?);
                    }
                }
                Event::CData(t) if capture != Capture::None => {
                    if let Some(cell) = pending.as_mut() {
                        cell.push_text(capture, &String::from_utf8_lossy(&t));
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"v" | b"f" | b"t" => capture = Capture::None,
                    b"rPh" => in_phonetic = false,
                    b"c" => {
                        capture = Capture::None;
                        if let Some(cell) = pending.take() {
                            cell.store(worksheet, shared_strings)?;
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        for reference in merges {
            let range = CellRange::parse(&reference).map_err(|e| {
                XlsxError::Parse(format!("Invalid merge range '{}': {}", reference, e))
            })?;
            if let Err(e) = worksheet.merge_cells(&range) {
                log::warn!("sheet '{}': {}", worksheet.name(), e);
            }
        }

        for link in links {
            link.apply(worksheet);
        }

        Ok(())
    }
}

/// Text context inside a `<c>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    Formula,
    Inline,
}

/// A `<c>` element being read
#[derive(Debug)]
struct PendingCell {
    addr: CellAddress,
    cell_type: Option<String>,
    style: u32,
    value: Option<String>,
    formula: Option<String>,
    inline: Vec<String>,
}

impl PendingCell {
    fn start(e: &BytesStart<'_>, row: u32, next_col: u16) -> XlsxResult<Self> {
        let addr = match attr(e, b"r") {
            Some(r) => CellAddress::parse(&r).map_err(|err| {
                XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, err))
            })?,
            None => CellAddress::new(row, next_col),
        };
        let style = match attr(e, b"s") {
            Some(s) => s
                .parse()
                .map_err(|_| XlsxError::Parse(format!("Invalid style index '{}'", s)))?,
            None => 0,
        };

        Ok(Self {
            addr,
            cell_type: attr(e, b"t"),
            style,
            value: None,
            formula: None,
            inline: Vec::new(),
        })
    }

    fn begin_capture(&mut self, name: &[u8], in_phonetic: bool) -> Capture {
        match name {
            b"v" => {
                self.value.get_or_insert_with(String::new);
                Capture::Value
            }
            b"f" => {
                self.formula.get_or_insert_with(String::new);
                Capture::Formula
            }
            b"t" if !in_phonetic => {
                self.inline.push(String::new());
                Capture::Inline
            }
            _ => Capture::None,
        }
    }

    fn push_text(&mut self, capture: Capture, text: &str) {
        let target = match capture {
            Capture::Value => self.value.as_mut(),
            Capture::Formula => self.formula.as_mut(),
            Capture::Inline => self.inline.last_mut(),
            Capture::None => None,
        };
        if let Some(target) = target {
            target.push_str(text);
        }
    }

    fn store(self, worksheet: &mut Worksheet, shared_strings: &[CellValue]) -> XlsxResult<()> {
        let addr = self.addr;
        let style = self.style;
        let value = self.into_value(shared_strings)?;
        if value.is_empty() {
            return Ok(());
        }
        worksheet.insert_cell_at(addr.row, addr.col, Cell::with_style(value, style))?;
        Ok(())
    }

    fn into_value(self, shared_strings: &[CellValue]) -> XlsxResult<CellValue> {
        let raw = self.value.as_deref();
        let value = match self.cell_type.as_deref() {
            Some("s") => match raw {
                Some(v) => {
                    let idx: usize = v.trim().parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", v))
                    })?;
                    shared_strings.get(idx).cloned().ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?
                }
                None => CellValue::Empty,
            },
            Some("inlineStr") if !self.inline.is_empty() => text_value(&self.inline),
            Some("inlineStr") | Some("str") => raw
                .map(|v| CellValue::string(decode_excel_escapes(v)))
                .unwrap_or_default(),
            Some("b") => raw
                .map(|v| {
                    let v = v.trim();
                    CellValue::from(StructuredValue::Boolean(
                        v == "1" || v.eq_ignore_ascii_case("true"),
                    ))
                })
                .unwrap_or_default(),
            Some("e") => raw
                .map(|v| match CellError::parse(v) {
                    Some(err) => CellValue::from(StructuredValue::Error(err)),
                    None => CellValue::string(v),
                })
                .unwrap_or_default(),
            _ => raw
                .map(|v| match v.trim().parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::string(v),
                })
                .unwrap_or_default(),
        };

        Ok(match self.formula {
            Some(text) => CellValue::formula(text, (!value.is_empty()).then_some(value)),
            None => value,
        })
    }
}

/// A `<hyperlink>` entry waiting for the cells to be loaded
#[derive(Debug)]
struct HyperlinkRef {
    range: CellRange,
    target: String,
}

impl HyperlinkRef {
    fn from_element(e: &BytesStart<'_>, sheet_rels: &[Relationship]) -> Option<Self> {
        let reference = attr(e, b"ref")?;
        let range = match CellRange::parse(&reference) {
            Ok(range) => range,
            Err(err) => {
                log::warn!("ignoring hyperlink with bad ref '{}': {}", reference, err);
                return None;
            }
        };
        let target = attr(e, b"id")
            .and_then(|id| sheet_rels.iter().find(|r| r.id == id))
            .map(|r| r.target.clone())
            .or_else(|| attr(e, b"location"))?;
        Some(Self { range, target })
    }

    /// Wrap plain string cells of the range into hyperlink values
    fn apply(self, worksheet: &mut Worksheet) {
        for addr in self.range.cells() {
            let Some(cell) = worksheet.cell_at_mut(addr.row, addr.col) else {
                continue;
            };
            let link = match &cell.value {
                CellValue::String(text) => CellValue::hyperlink(text.as_str(), self.target.as_str()),
                _ => continue,
            };
            cell.value = link;
        }
    }
}

/// Plain string for one run, rich text for several
fn text_value(runs: &[String]) -> CellValue {
    match runs {
        [] => CellValue::string(""),
        [single] => CellValue::string(decode_excel_escapes(single)),
        runs => CellValue::rich_text(runs.iter().map(|r| decode_excel_escapes(r))),
    }
}
