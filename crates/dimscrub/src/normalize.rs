//! Raw cell value normalization

use std::borrow::Cow;

use dimscrub_core::{CellValue, StructuredValue};

/// A cell value reduced to a number or a string
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive<'a> {
    Number(f64),
    Text(Cow<'a, str>),
}

impl Primitive<'_> {
    /// Text of a string primitive
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Primitive::Text(s) => Some(s),
            Primitive::Number(_) => None,
        }
    }

    /// Render as text, numbers in their shortest form
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Primitive::Number(n) => Cow::Owned(n.to_string()),
            Primitive::Text(s) => Cow::Borrowed(s),
        }
    }
}

/// Reduce a cell value to a primitive, or `None` when there is nothing to read
///
/// Formulas yield their cached result when that result is itself primitive.
/// Rich text runs are concatenated, hyperlinks yield their display text.
/// Booleans and error literals are not measurements and yield `None`.
pub fn normalize(value: &CellValue) -> Option<Primitive<'_>> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => Some(Primitive::Number(*n)),
        CellValue::String(s) => Some(Primitive::Text(Cow::Borrowed(s.as_str()))),
        CellValue::Structured(structured) => match structured {
            StructuredValue::Formula { cached, .. } => match cached.as_deref() {
                Some(CellValue::Number(n)) => Some(Primitive::Number(*n)),
                Some(CellValue::String(s)) => Some(Primitive::Text(Cow::Borrowed(s.as_str()))),
                _ => None,
            },
            StructuredValue::RichText(runs) => Some(Primitive::Text(Cow::Owned(
                runs.iter().map(|r| r.text.as_str()).collect(),
            ))),
            StructuredValue::Hyperlink { text, .. } => {
                Some(Primitive::Text(Cow::Borrowed(text.as_str())))
            }
            StructuredValue::Boolean(_) | StructuredValue::Error(_) => None,
        },
    }
}
