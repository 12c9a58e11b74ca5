// ABOUTME: Library root for telos - runtime sealing and final-member enforcement.
// ABOUTME: Classes are defined through TypeRegistry; violations fail the definition.

pub mod class;
pub mod error;
pub mod hooks;
mod introspect;
pub mod marking;
pub mod member;
pub mod registry;
pub mod types;

pub use class::{ClassBuilder, ClassDef, ClassError, ClassHandle, Instance, TypeId, Value};
pub use error::{Error, Result};
pub use hooks::{DefineContext, DefineError, SubtypeValidator};
pub use marking::{FinalTarget, MarkError};
pub use member::{Callable, Member, MemberError};
pub use registry::{FinalsError, RedeclarationPolicy, TypeRegistry};
pub use types::{MemberName, MemberNameError, QualName, QualNameError};
