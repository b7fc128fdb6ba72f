//! Small helpers shared by the part readers and patchers

use std::borrow::Cow;

use quick_xml::events::BytesStart;

use crate::error::{XlsxError, XlsxResult};

/// Local name of an element, ignoring any namespace prefix (`x:c` -> `c`)
pub(crate) fn local_name<'a>(e: &'a BytesStart<'_>) -> &'a [u8] {
    let name = e.name().into_inner();
    match name.iter().rposition(|b| *b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Namespace prefix of an element including the colon (`x:c` -> `x:`)
pub(crate) fn prefix_of(e: &BytesStart<'_>) -> String {
    let name = e.name().into_inner();
    match name.iter().rposition(|b| *b == b':') {
        Some(pos) => String::from_utf8_lossy(&name[..=pos]).into_owned(),
        None => String::new(),
    }
}

/// Unescaped value of an attribute, matched on its local name
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(Cow::into_owned))
}

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// `_x000d_` is CR, `_x000a_` LF, `_x005f_` an escaped underscore. Anything
/// that is not exactly `_x` + four hex digits + `_` is left verbatim.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// 0-based index of a `<row>`, falling back to the position after the previous row
pub(crate) fn row_index(e: &BytesStart<'_>, next_row: u32) -> XlsxResult<u32> {
    match attr(e, b"r") {
        Some(r) => match r.trim().parse::<u32>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(XlsxError::Parse(format!("Invalid row number '{}'", r))),
        },
        None => Ok(next_row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("a_x000A_b"), "a\nb");
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("_xZZZZ_"), "_xZZZZ_");
    }

    #[test]
    fn test_local_name_and_prefix() {
        let e = BytesStart::new("x:c");
        assert_eq!(local_name(&e), b"c");
        assert_eq!(prefix_of(&e), "x:");

        let e = BytesStart::new("row");
        assert_eq!(local_name(&e), b"row");
        assert_eq!(prefix_of(&e), "");
    }

    #[test]
    fn test_attr_lookup_ignores_prefix() {
        let mut e = BytesStart::new("hyperlink");
        e.push_attribute(("ref", "E5"));
        e.push_attribute(("r:id", "rId3"));
        assert_eq!(attr(&e, b"ref").as_deref(), Some("E5"));
        assert_eq!(attr(&e, b"id").as_deref(), Some("rId3"));
        assert_eq!(attr(&e, b"location"), None);
    }
}
