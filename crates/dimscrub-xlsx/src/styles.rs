//! `xl/styles.xml`: cell format table reading and extension

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{attr, local_name};

pub(crate) const STYLES_PART: &str = "xl/styles.xml";

/// Number format id of every `cellXfs` entry, indexed by style id
pub(crate) fn read_cell_formats(xml: &[u8]) -> XlsxResult<Vec<u32>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;
    let mut formats = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(&e) == b"cellXfs" => in_cell_xfs = true,
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => break,
            Event::Start(e) | Event::Empty(e) if in_cell_xfs && local_name(&e) == b"xf" => {
                let id = attr(&e, b"numFmtId")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                formats.push(id);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(formats)
}

/// Append clones of existing `cellXfs` entries with a different number format
///
/// Each `(source_xf, num_fmt_id)` pair becomes one new entry at index
/// `existing_count + position`. The `count` attribute is updated; every other
/// byte of the part is copied through.
pub(crate) fn append_cell_formats(xml: &[u8], additions: &[(u32, u32)]) -> XlsxResult<Vec<u8>> {
    if additions.is_empty() {
        return Ok(xml.to_vec());
    }

    let sources = collect_xf_elements(xml)?;
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + additions.len() * 96));
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match &event {
            Event::Start(e) if local_name(e) == b"cellXfs" => {
                in_cell_xfs = true;
                let total = (sources.len() + additions.len()).to_string();
                writer.write_event(Event::Start(with_attr(e, b"count", &total)?))?;
            }
            Event::End(e) if in_cell_xfs && e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
                for (source, fmt_id) in additions {
                    let element = sources.get(*source as usize).ok_or_else(|| {
                        XlsxError::Parse(format!("cell style {} does not exist", source))
                    })?;
                    write_cloned_xf(&mut writer, element, *fmt_id)?;
                }
                writer.write_event(event)?;
            }
            Event::Eof => break,
            _ => writer.write_event(event)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

/// Every `cellXfs/xf` element with its children, as owned events
fn collect_xf_elements(xml: &[u8]) -> XlsxResult<Vec<Vec<Event<'static>>>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;
    let mut current: Option<Vec<Event<'static>>> = None;
    let mut elements = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match &event {
            Event::Start(e) if local_name(e) == b"cellXfs" => in_cell_xfs = true,
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" && current.is_none() => {
                break
            }
            Event::Empty(e) if in_cell_xfs && current.is_none() && local_name(e) == b"xf" => {
                elements.push(vec![event.clone().into_owned()]);
            }
            Event::Start(e) if in_cell_xfs && current.is_none() && local_name(e) == b"xf" => {
                current = Some(vec![event.clone().into_owned()]);
            }
            Event::End(e) if current.is_some() && e.local_name().as_ref() == b"xf" => {
                if let Some(mut events) = current.take() {
                    events.push(event.clone().into_owned());
                    elements.push(events);
                }
            }
            Event::Eof => break,
            _ => {
                if let Some(events) = current.as_mut() {
                    events.push(event.clone().into_owned());
                }
            }
        }
        buf.clear();
    }

    Ok(elements)
}

fn write_cloned_xf(
    writer: &mut Writer<Vec<u8>>,
    element: &[Event<'static>],
    fmt_id: u32,
) -> XlsxResult<()> {
    let fmt_id = fmt_id.to_string();
    for (i, event) in element.iter().enumerate() {
        match event {
            Event::Start(e) if i == 0 => {
                let e = with_attr(&with_attr(e, b"numFmtId", &fmt_id)?, b"applyNumberFormat", "1")?;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) if i == 0 => {
                let e = with_attr(&with_attr(e, b"numFmtId", &fmt_id)?, b"applyNumberFormat", "1")?;
                writer.write_event(Event::Empty(e))?;
            }
            other => writer.write_event(other.clone())?,
        }
    }
    Ok(())
}

/// Copy of `e` with attribute `key` set to `value` (replaced in place or appended)
fn with_attr(e: &BytesStart<'_>, key: &[u8], value: &str) -> XlsxResult<BytesStart<'static>> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    let mut replaced = false;

    for a in e.attributes() {
        let a = a?;
        if a.key.as_ref() == key {
            out.push_attribute((key, value.as_bytes()));
            replaced = true;
        } else {
            out.push_attribute(a);
        }
    }
    if !replaced {
        out.push_attribute((key, value.as_bytes()));
    }

    Ok(out.into_owned())
}
