//! Cell value types

use std::fmt;
use std::sync::Arc;

/// Represents the raw value stored in a cell
///
/// The variant set is closed: anything a container can hold that is not a
/// plain number or plain string lands in [`CellValue::Structured`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Numeric value (all numbers stored as f64, including dates)
    Number(f64),

    /// Plain string value
    String(SharedString),

    /// Anything wrapped: formulas, rich text, hyperlinks, booleans, errors
    Structured(StructuredValue),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: AsRef<str>>(s: S) -> Self {
        CellValue::String(SharedString::new(s))
    }

    /// Create a formula value with a cached result
    pub fn formula<S: Into<String>>(text: S, cached: Option<CellValue>) -> Self {
        CellValue::Structured(StructuredValue::Formula {
            text: text.into(),
            cached: cached.map(Box::new),
        })
    }

    /// Create a rich text value from its runs
    pub fn rich_text<I, S>(runs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CellValue::Structured(StructuredValue::RichText(
            runs.into_iter().map(TextRun::new).collect(),
        ))
    }

    /// Create a hyperlink value
    pub fn hyperlink<T: Into<String>, U: Into<String>>(text: T, target: U) -> Self {
        CellValue::Structured(StructuredValue::Hyperlink {
            text: text.into(),
            target: target.into(),
        })
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the cell contains a formula
    pub fn is_formula(&self) -> bool {
        matches!(
            self,
            CellValue::Structured(StructuredValue::Formula { .. })
        )
    }

    /// Get the number if this is a plain numeric value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string if this is a plain string value
    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Number(_) => "number",
            CellValue::String(_) => "string",
            CellValue::Structured(s) => s.type_name(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Structured(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

impl From<StructuredValue> for CellValue {
    fn from(s: StructuredValue) -> Self {
        CellValue::Structured(s)
    }
}

/// Non-primitive cell contents
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredValue {
    /// Formula with the container's cached result
    Formula {
        /// Formula text without the leading '='
        text: String,
        /// Last calculated value (if the container stored one)
        cached: Option<Box<CellValue>>,
    },

    /// Text made of several differently formatted runs
    RichText(Vec<TextRun>),

    /// Text that links somewhere
    Hyperlink {
        /// Displayed text
        text: String,
        /// Link target (URL or in-workbook location)
        target: String,
    },

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Error value (#VALUE!, #REF!, etc.)
    Error(CellError),
}

impl StructuredValue {
    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            StructuredValue::Formula { .. } => "formula",
            StructuredValue::RichText(_) => "rich_text",
            StructuredValue::Hyperlink { .. } => "hyperlink",
            StructuredValue::Boolean(_) => "boolean",
            StructuredValue::Error(_) => "error",
        }
    }
}

impl fmt::Display for StructuredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuredValue::Formula {
                cached: Some(v), ..
            } => write!(f, "{}", v),
            StructuredValue::Formula { text, .. } => write!(f, "={}", text),
            StructuredValue::RichText(runs) => {
                for run in runs {
                    f.write_str(&run.text)?;
                }
                Ok(())
            }
            StructuredValue::Hyperlink { text, .. } => f.write_str(text),
            StructuredValue::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            StructuredValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// One run of a rich text value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// Run text
    pub text: String,
}

impl TextRun {
    /// Create a new run
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}

/// Spreadsheet error literals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #NULL!
    Null,
    /// #DIV/0!
    Div0,
    /// #VALUE!
    Value,
    /// #REF!
    Ref,
    /// #NAME?
    Name,
    /// #NUM!
    Num,
    /// #N/A
    Na,
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
        }
    }

    /// Parse an error string (case insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "#NULL!" => Some(CellError::Null),
            "#DIV/0!" => Some(CellError::Div0),
            "#VALUE!" => Some(CellError::Value),
            "#REF!" => Some(CellError::Ref),
            "#NAME?" => Some(CellError::Name),
            "#NUM!" => Some(CellError::Num),
            "#N/A" => Some(CellError::Na),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference-counted string
///
/// Report templates repeat the same shared-string entries across many cells;
/// the container reader hands the same `Arc<str>` to each of them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    /// Create a new shared string
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    /// Get the string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the length of the string
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString(Arc::from(s))
    }
}
