//! XLSX writer
//!
//! Writing patches the parts a document was read from. Only cells marked
//! modified are re-encoded; every other event of a worksheet part is copied
//! through as read.

use std::collections::{btree_map, BTreeMap};
use std::iter::Peekable;
use std::path::Path;

use ahash::AHashMap;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::document::{XlsxDocument, WORKBOOK_PART};
use crate::error::{XlsxError, XlsxResult};
use crate::package::{XlsxPackage, CONTENT_TYPES_PART};
use crate::rels::rels_path_for;
use crate::styles::{append_cell_formats, STYLES_PART};
use crate::xml::{attr, local_name, prefix_of, row_index};
use dimscrub_core::{Cell, CellAddress, CellValue, StructuredValue};

const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a document to a file path
    pub fn write_file<P: AsRef<Path>>(document: &XlsxDocument, path: P) -> XlsxResult<()> {
        let bytes = Self::write(document)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Write a document to XLSX bytes
    pub fn write(document: &XlsxDocument) -> XlsxResult<Vec<u8>> {
        let mut package = document.package().clone();
        let mut styles = StyleAllocator::new(document);
        let mut formulas_replaced = false;

        for (index, sheet) in document.workbook().worksheets().enumerate() {
            let edits: BTreeMap<CellAddress, CellEdit<'_>> = sheet
                .modified_cells()
                .map(|(addr, cell)| {
                    let style = styles.resolve(cell);
                    (addr, CellEdit { value: &cell.value, style })
                })
                .collect();
            if edits.is_empty() {
                continue;
            }

            let part = document.sheet_part(index).ok_or_else(|| {
                XlsxError::InvalidFormat(format!("sheet '{}' has no backing part", sheet.name()))
            })?;
            let patched = patch_sheet(package.require_part(part)?, &edits)?;
            log::debug!("patched {} cells in {}", edits.len(), part);

            formulas_replaced |= patched.formulas_replaced;
            package.set_part(part, patched.xml);
        }

        if !styles.additions.is_empty() {
            let xml = append_cell_formats(package.require_part(STYLES_PART)?, &styles.additions)?;
            log::debug!("added {} cell styles", styles.additions.len());
            package.set_part(STYLES_PART, xml);
        }

        if formulas_replaced {
            drop_calc_chain(&mut package)?;
        }

        package.to_bytes()
    }
}

/// New contents of one modified cell
#[derive(Debug)]
struct CellEdit<'a> {
    value: &'a CellValue,
    style: u32,
}

type PendingEdits<'m, 'a> = Peekable<btree_map::Iter<'m, CellAddress, CellEdit<'a>>>;

/// Maps `(style, number format)` requests onto style indices, extending the table when needed
struct StyleAllocator<'d> {
    document: &'d XlsxDocument,
    additions: Vec<(u32, u32)>,
    allocated: AHashMap<(u32, u32), u32>,
    warned: bool,
}

impl<'d> StyleAllocator<'d> {
    fn new(document: &'d XlsxDocument) -> Self {
        Self {
            document,
            additions: Vec::new(),
            allocated: AHashMap::new(),
            warned: false,
        }
    }

    fn resolve(&mut self, cell: &Cell) -> u32 {
        let Some(format) = &cell.number_format else {
            return cell.style_index;
        };
        let Some(fmt_id) = format.builtin_id() else {
            log::warn!(
                "number format '{}' has no built-in id; keeping style {}",
                format.format_string(),
                cell.style_index
            );
            return cell.style_index;
        };

        match self.document.cell_format(cell.style_index) {
            Some(current) if current == fmt_id => cell.style_index,
            Some(_) => {
                let key = (cell.style_index, fmt_id);
                let next = (self.document.cell_format_count() + self.additions.len()) as u32;
                let additions = &mut self.additions;
                *self.allocated.entry(key).or_insert_with(|| {
                    additions.push(key);
                    next
                })
            }
            None => {
                if !self.warned {
                    log::warn!(
                        "cell style {} is not in the style table; number formats left unchanged",
                        cell.style_index
                    );
                    self.warned = true;
                }
                cell.style_index
            }
        }
    }
}

struct PatchedSheet {
    xml: Vec<u8>,
    formulas_replaced: bool,
}

/// Stream a worksheet part, replacing or inserting the edited cells
fn patch_sheet(xml: &[u8], edits: &BTreeMap<CellAddress, CellEdit<'_>>) -> XlsxResult<PatchedSheet> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + edits.len() * 64));
    let mut buf = Vec::new();
    let mut pending = edits.iter().peekable();

    let mut prefix = String::new();
    let mut in_data = false;
    let mut row: Option<u32> = None;
    let mut next_row: u32 = 0;
    let mut next_col: u16 = 0;
    let mut skip_depth: usize = 0;
    let mut formulas_replaced = false;

    loop {
        let event = reader.read_event_into(&mut buf)?;

        // inside a replaced <c>: drop its children
        if skip_depth > 0 {
            match &event {
                Event::Start(e) => {
                    formulas_replaced |= local_name(e) == b"f";
                    skip_depth += 1;
                }
                Event::Empty(e) => formulas_replaced |= local_name(e) == b"f",
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }

        match &event {
            Event::Start(e) if local_name(e) == b"sheetData" => {
                prefix = prefix_of(e);
                in_data = true;
                writer.write_event(event)?;
            }
            Event::Empty(e) if local_name(e) == b"sheetData" => {
                if pending.peek().is_none() {
                    writer.write_event(event)?;
                } else {
                    prefix = prefix_of(e);
                    writer.write_event(Event::Start(e.clone()))?;
                    write_rows_until(&mut writer, &prefix, &mut pending, None)?;
                    writer.write_event(Event::End(BytesEnd::new(format!("{}sheetData", prefix))))?;
                }
            }
            Event::End(e) if in_data && e.local_name().as_ref() == b"sheetData" => {
                in_data = false;
                write_rows_until(&mut writer, &prefix, &mut pending, None)?;
                writer.write_event(event)?;
            }
            Event::Start(e) if in_data && local_name(e) == b"row" => {
                let index = row_index(e, next_row)?;
                next_row = index + 1;
                next_col = 0;
                write_rows_until(&mut writer, &prefix, &mut pending, Some(index))?;
                writer.write_event(event)?;
                row = Some(index);
            }
            Event::Empty(e) if in_data && local_name(e) == b"row" => {
                let index = row_index(e, next_row)?;
                next_row = index + 1;
                write_rows_until(&mut writer, &prefix, &mut pending, Some(index))?;
                if pending.peek().is_some_and(|(addr, _)| addr.row == index) {
                    writer.write_event(Event::Start(e.clone()))?;
                    write_cells_until(&mut writer, &prefix, &mut pending, index, None)?;
                    writer.write_event(Event::End(BytesEnd::new(format!("{}row", prefix))))?;
                } else {
                    writer.write_event(event)?;
                }
            }
            Event::End(e) if row.is_some() && e.local_name().as_ref() == b"row" => {
                if let Some(index) = row.take() {
                    write_cells_until(&mut writer, &prefix, &mut pending, index, None)?;
                }
                writer.write_event(event)?;
            }
            Event::Start(e) | Event::Empty(e) if row.is_some() && local_name(e) == b"c" => {
                let index = row.unwrap_or_default();
                let addr = match attr(e, b"r") {
                    Some(r) => CellAddress::parse(&r).map_err(|err| {
                        XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, err))
                    })?,
                    None => CellAddress::new(index, next_col),
                };
                next_col = addr.col.saturating_add(1);

                write_cells_until(&mut writer, &prefix, &mut pending, index, Some(addr.col))?;
                match pending.next_if(|(a, _)| **a == addr) {
                    Some((_, edit)) => {
                        write_cell(&mut writer, &prefix, addr, edit, Some(e))?;
                        if matches!(event, Event::Start(_)) {
                            skip_depth = 1;
                        }
                    }
                    None => writer.write_event(event)?,
                }
            }
            Event::Eof => break,
            _ => writer.write_event(event)?,
        }
        buf.clear();
    }

    if let Some((addr, _)) = pending.peek() {
        return Err(XlsxError::InvalidFormat(format!(
            "worksheet has no sheetData to hold cell {}",
            addr
        )));
    }

    Ok(PatchedSheet {
        xml: writer.into_inner(),
        formulas_replaced,
    })
}

/// Write new `<row>` elements for pending edits above row `before` (all of them if `None`)
fn write_rows_until(
    writer: &mut Writer<Vec<u8>>,
    prefix: &str,
    pending: &mut PendingEdits<'_, '_>,
    before: Option<u32>,
) -> XlsxResult<()> {
    while let Some(row) = pending
        .peek()
        .map(|(addr, _)| addr.row)
        .filter(|row| before.map_or(true, |b| *row < b))
    {
        let mut start = BytesStart::new(format!("{}row", prefix));
        start.push_attribute(("r", (row + 1).to_string().as_str()));
        writer.write_event(Event::Start(start))?;
        write_cells_until(writer, prefix, pending, row, None)?;
        writer.write_event(Event::End(BytesEnd::new(format!("{}row", prefix))))?;
    }
    Ok(())
}

/// Write new cells of `row` left of column `before` (all remaining if `None`)
fn write_cells_until(
    writer: &mut Writer<Vec<u8>>,
    prefix: &str,
    pending: &mut PendingEdits<'_, '_>,
    row: u32,
    before: Option<u16>,
) -> XlsxResult<()> {
    while let Some((addr, edit)) =
        pending.next_if(|(a, _)| a.row == row && before.map_or(true, |b| a.col < b))
    {
        write_cell(writer, prefix, *addr, edit, None)?;
    }
    Ok(())
}

/// Encode one cell, keeping the attributes of the element it replaces
fn write_cell(
    writer: &mut Writer<Vec<u8>>,
    prefix: &str,
    addr: CellAddress,
    edit: &CellEdit<'_>,
    template: Option<&BytesStart<'_>>,
) -> XlsxResult<()> {
    let name = format!("{}c", prefix);
    let mut start = BytesStart::new(name.as_str());
    match template {
        Some(original) => {
            for a in original.attributes() {
                let a = a?;
                if !matches!(a.key.as_ref(), b"t" | b"s") {
                    start.push_attribute(a);
                }
            }
        }
        None => start.push_attribute(("r", addr.to_a1_string().as_str())),
    }
    if edit.style != 0 {
        start.push_attribute(("s", edit.style.to_string().as_str()));
    }

    let value = edit.value;
    match value {
        CellValue::Empty => {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        CellValue::String(s) => {
            start.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(start))?;
            write_inline(writer, prefix, &[s.as_str()])?;
        }
        CellValue::Structured(StructuredValue::Hyperlink { text, .. }) => {
            start.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(start))?;
            write_inline(writer, prefix, &[text.as_str()])?;
        }
        CellValue::Structured(StructuredValue::RichText(runs)) => {
            start.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(start))?;
            let runs: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
            write_inline(writer, prefix, &runs)?;
        }
        CellValue::Structured(StructuredValue::Formula { text, cached }) => {
            let cached = cached.as_deref().and_then(stored_value);
            if let Some((Some(kind), _)) = &cached {
                start.push_attribute(("t", *kind));
            }
            writer.write_event(Event::Start(start))?;
            if !text.is_empty() {
                write_text_element(writer, &format!("{}f", prefix), text)?;
            }
            if let Some((_, v)) = cached {
                write_text_element(writer, &format!("{}v", prefix), &v)?;
            }
        }
        other => {
            let Some((kind, v)) = stored_value(other) else {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            };
            if let Some(kind) = kind {
                start.push_attribute(("t", kind));
            }
            writer.write_event(Event::Start(start))?;
            write_text_element(writer, &format!("{}v", prefix), &v)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `t` attribute and `<v>` text of a value stored directly in a cell
fn stored_value(value: &CellValue) -> Option<(Option<&'static str>, String)> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => Some((None, n.to_string())),
        CellValue::String(s) => Some((Some("str"), s.to_string())),
        CellValue::Structured(StructuredValue::Boolean(b)) => {
            Some((Some("b"), if *b { "1" } else { "0" }.to_string()))
        }
        CellValue::Structured(StructuredValue::Error(e)) => Some((Some("e"), e.as_str().to_string())),
        CellValue::Structured(other) => Some((Some("str"), other.to_string())),
    }
}

fn write_inline(writer: &mut Writer<Vec<u8>>, prefix: &str, runs: &[&str]) -> XlsxResult<()> {
    let is = format!("{}is", prefix);
    let t = format!("{}t", prefix);
    writer.write_event(Event::Start(BytesStart::new(is.as_str())))?;
    match runs {
        [single] => write_text_element(writer, &t, single)?,
        runs => {
            let r = format!("{}r", prefix);
            for run in runs {
                writer.write_event(Event::Start(BytesStart::new(r.as_str())))?;
                write_text_element(writer, &t, run)?;
                writer.write_event(Event::End(BytesEnd::new(r.as_str())))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(is)))?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> XlsxResult<()> {
    let mut start = BytesStart::new(name);
    if text.trim() != text {
        start.push_attribute(("xml:space", "preserve"));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Remove the calculation chain and every reference to it
///
/// The chain lists formula cells; once one of them holds a plain value the
/// chain is stale and spreadsheet applications rebuild it when it is missing.
fn drop_calc_chain(package: &mut XlsxPackage) -> XlsxResult<()> {
    if !package.remove_part(CALC_CHAIN_PART) {
        return Ok(());
    }
    log::debug!("formula cells replaced; removed {}", CALC_CHAIN_PART);

    let part_name = format!("/{}", CALC_CHAIN_PART);
    if let Some(xml) = package.part(CONTENT_TYPES_PART) {
        let xml = remove_elements(xml, |e| {
            local_name(e) == b"Override" && attr(e, b"PartName").as_deref() == Some(part_name.as_str())
        })?;
        package.set_part(CONTENT_TYPES_PART, xml);
    }

    let rels_part = rels_path_for(WORKBOOK_PART);
    if let Some(xml) = package.part(&rels_part) {
        let xml = remove_elements(xml, |e| {
            local_name(e) == b"Relationship"
                && attr(e, b"Type").is_some_and(|t| t.ends_with("/calcChain"))
        })?;
        package.set_part(&rels_part, xml);
    }

    Ok(())
}

/// Copy a part, leaving out every element `drop_if` selects
fn remove_elements<F>(xml: &[u8], drop_if: F) -> XlsxResult<Vec<u8>>
where
    F: Fn(&BytesStart<'_>) -> bool,
{
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut buf = Vec::new();
    let mut skip_depth: usize = 0;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match &event {
            Event::Eof => break,
            Event::Start(_) if skip_depth > 0 => skip_depth += 1,
            Event::End(_) if skip_depth > 0 => skip_depth -= 1,
            _ if skip_depth > 0 => {}
            Event::Start(e) if drop_if(e) => skip_depth = 1,
            Event::Empty(e) if drop_if(e) => {}
            _ => writer.write_event(event)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}
