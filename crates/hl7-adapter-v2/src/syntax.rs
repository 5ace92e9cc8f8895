//! HL7 v2 delimiter handling
//!
//! A message declares its own delimiters in the header segment:
//!
//! ```text
//! MSH|^~\&|...
//! 012345
//!    ^^     field separator at offset 3, component separator at offset 4
//! ```

/// Default HL7 v2 separators
pub const DEFAULT_FIELD_SEPARATOR: char = '|';
pub const DEFAULT_COMPONENT_SEPARATOR: char = '^';

/// Offset of the field separator in the message text
pub const FIELD_SEPARATOR_OFFSET: usize = 3;
/// Offset of the component separator in the message text
pub const COMPONENT_SEPARATOR_OFFSET: usize = 4;

/// Separators used for splitting segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
    /// Field separator (default '|')
    pub field: char,
    /// Component separator (default '^')
    pub component: char,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            field: DEFAULT_FIELD_SEPARATOR,
            component: DEFAULT_COMPONENT_SEPARATOR,
        }
    }
}

impl Separators {
    /// Read separators from a message's header.
    ///
    /// Returns `None` when the message is too short to declare both.
    pub fn from_message(message: &str) -> Option<Self> {
        let mut chars = message.chars().skip(FIELD_SEPARATOR_OFFSET);
        let field = chars.next()?;
        let component = chars.next()?;
        Some(Self { field, component })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_separators() {
        let seps = Separators::default();
        assert_eq!(seps.field, '|');
        assert_eq!(seps.component, '^');
    }

    #[test]
    fn test_separators_from_header() {
        let seps = Separators::from_message("MSH|^~\\&||^Facility A").unwrap();
        assert_eq!(seps, Separators::default());

        let custom = Separators::from_message("MSH*:~\\&*SENDER").unwrap();
        assert_eq!(custom.field, '*');
        assert_eq!(custom.component, ':');
    }

    #[test]
    fn test_separators_need_five_characters() {
        assert!(Separators::from_message("MSH|").is_none());
        assert!(Separators::from_message("").is_none());
        assert!(Separators::from_message("MSH|^").is_some());
    }

    #[test]
    fn test_separators_count_characters_not_bytes() {
        let seps = Separators::from_message("MSH§¤rest").unwrap();
        assert_eq!(seps.field, '§');
        assert_eq!(seps.component, '¤');
    }
}
