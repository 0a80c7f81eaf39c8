use thiserror::Error;

/// Errors raised while reading a zone master file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneParseError {
    #[error("invalid zone origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: invalid UTF-8")]
    Encoding { line: usize },

    #[error("line {line}: unbalanced parentheses")]
    UnbalancedParentheses { line: usize },

    #[error("line {line}: unterminated quoted string")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: unsupported directive {directive}")]
    UnsupportedDirective { line: usize, directive: String },

    #[error("line {line}: unknown record type {token}")]
    UnknownRecordType { line: usize, token: String },

    #[error("line {line}: RR class {class} is not the zone's class (IN)")]
    BadClass { line: usize, class: String },

    #[error("line {line}: invalid TTL {value}")]
    BadTtl { line: usize, value: String },

    #[error("line {line}: bad {rtype} rdata: {message}")]
    BadRdata {
        line: usize,
        rtype: String,
        message: String,
    },

    #[error("no SOA RR at the zone origin")]
    NoSoa,

    #[error("no NS RRset at the zone origin")]
    NoNs,
}

impl ZoneParseError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn bad_rdata(line: usize, rtype: impl ToString, message: impl Into<String>) -> Self {
        Self::BadRdata {
            line,
            rtype: rtype.to_string(),
            message: message.into(),
        }
    }

    /// Line number the error refers to, if it is tied to one
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::Encoding { line }
            | Self::UnbalancedParentheses { line }
            | Self::UnterminatedQuote { line }
            | Self::UnsupportedDirective { line, .. }
            | Self::UnknownRecordType { line, .. }
            | Self::BadClass { line, .. }
            | Self::BadTtl { line, .. }
            | Self::BadRdata { line, .. } => Some(*line),
            Self::InvalidOrigin { .. } | Self::NoSoa | Self::NoNs => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line() {
        let err = ZoneParseError::BadTtl {
            line: 7,
            value: "1x".to_string(),
        };
        assert_eq!(err.to_string(), "line 7: invalid TTL 1x");
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_origin_errors_have_no_line() {
        assert_eq!(ZoneParseError::NoSoa.line(), None);
        assert_eq!(ZoneParseError::NoNs.line(), None);
    }
}
