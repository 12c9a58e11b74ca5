// ABOUTME: Qualified type names of the form `module.path.TypeName`.
// ABOUTME: Used as the declaring-type identity in final-member records.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QualNameError {
    #[error("qualified name cannot be empty")]
    Empty,

    #[error("qualified name must contain a module path and a type name")]
    MissingModule,

    #[error("qualified name contains an empty segment")]
    EmptySegment,

    #[error("qualified name segment cannot start with a digit: '{0}'")]
    StartsWithDigit(char),

    #[error("invalid character in qualified name: '{0}'")]
    InvalidChar(char),
}

/// A validated qualified type name (`module.path.TypeName`).
///
/// Two types are the same declaring type exactly when their qualified
/// names compare equal; this is the identity the final registry stores
/// and the enforcement check compares against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualName(String);

impl QualName {
    pub fn new(value: &str) -> Result<Self, QualNameError> {
        if value.is_empty() {
            return Err(QualNameError::Empty);
        }

        let segments: Vec<&str> = value.split('.').collect();
        if segments.len() < 2 {
            return Err(QualNameError::MissingModule);
        }

        for segment in &segments {
            validate_segment(segment)?;
        }

        Ok(Self(value.to_string()))
    }

    /// Build a qualified name from a module path and a bare type name.
    pub fn from_parts(module: &str, name: &str) -> Result<Self, QualNameError> {
        if module.is_empty() || name.is_empty() {
            return Err(QualNameError::Empty);
        }
        Self::new(&format!("{}.{}", module, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The module path portion (everything before the last dot).
    pub fn module(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// The bare type name (everything after the last dot).
    pub fn type_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }
}

fn validate_segment(segment: &str) -> Result<(), QualNameError> {
    let mut chars = segment.chars();
    let first = chars.next().ok_or(QualNameError::EmptySegment)?;

    if first.is_ascii_digit() {
        return Err(QualNameError::StartsWithDigit(first));
    }
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(QualNameError::InvalidChar(first));
    }

    for c in chars {
        if !c.is_ascii_alphanumeric() && c != '_' {
            return Err(QualNameError::InvalidChar(c));
        }
    }

    Ok(())
}

impl fmt::Display for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
