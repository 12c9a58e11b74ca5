// ABOUTME: Validated member names within a class namespace.
// ABOUTME: Follows identifier rules: leading alpha/underscore, then alphanumerics.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemberNameError {
    #[error("member name cannot be empty")]
    Empty,

    #[error("member name cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in member name: '{0}'")]
    InvalidChar(char),
}

/// A validated member name, the key of a class namespace entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberName(String);

impl MemberName {
    pub fn new(value: &str) -> Result<Self, MemberNameError> {
        let mut chars = value.chars();
        let first = chars.next().ok_or(MemberNameError::Empty)?;

        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(MemberNameError::InvalidStart(first));
        }

        for c in chars {
            if !c.is_ascii_alphanumeric() && c != '_' {
                return Err(MemberNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
