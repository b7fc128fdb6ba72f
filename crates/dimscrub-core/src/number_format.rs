//! Number format types

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// 0 - General
    pub const ID_GENERAL: u32 = 0;
    /// 1 - 0
    pub const ID_NUMBER_INT: u32 = 1;
    /// 2 - 0.00
    pub const ID_NUMBER_DEC2: u32 = 2;
    /// 3 - #,##0
    pub const ID_NUMBER_SEP: u32 = 3;
    /// 4 - #,##0.00
    pub const ID_NUMBER_SEP_DEC2: u32 = 4;
    /// 49 - @
    pub const ID_TEXT: u32 = 49;

    /// Decimal format with two places (0.00)
    pub fn two_decimals() -> Self {
        NumberFormat::BuiltIn(Self::ID_NUMBER_DEC2)
    }

    /// Built-in format id, if this format maps onto one
    pub fn builtin_id(&self) -> Option<u32> {
        match self {
            NumberFormat::General => Some(Self::ID_GENERAL),
            NumberFormat::BuiltIn(id) => Some(*id),
            NumberFormat::Custom(code) => match code.as_str() {
                "General" => Some(Self::ID_GENERAL),
                "0" => Some(Self::ID_NUMBER_INT),
                "0.00" => Some(Self::ID_NUMBER_DEC2),
                "#,##0" => Some(Self::ID_NUMBER_SEP),
                "#,##0.00" => Some(Self::ID_NUMBER_SEP_DEC2),
                "@" => Some(Self::ID_TEXT),
                _ => None,
            },
        }
    }

    /// Get the format string
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => match id {
                1 => "0",
                2 => "0.00",
                3 => "#,##0",
                4 => "#,##0.00",
                49 => "@",
                _ => "General",
            },
            NumberFormat::Custom(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimals() {
        let format = NumberFormat::two_decimals();
        assert_eq!(format.format_string(), "0.00");
        assert_eq!(format.builtin_id(), Some(2));
        assert_eq!(NumberFormat::Custom("0.00".into()).builtin_id(), Some(2));
        assert_eq!(NumberFormat::Custom("0.000".into()).builtin_id(), None);
    }
}
