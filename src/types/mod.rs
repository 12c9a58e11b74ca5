// ABOUTME: Validated identity types used throughout the registry.
// ABOUTME: Qualified type names and member names with identifier rules.

mod member_name;
mod qual_name;

pub use member_name::{MemberName, MemberNameError};
pub use qual_name::{QualName, QualNameError};
