// ABOUTME: The single write entry point: mark a class or member as final.
// ABOUTME: Branches on target kind; members register when bound into a class body.

use thiserror::Error;

use crate::class::ClassHandle;
use crate::member::{Member, MemberError};
use crate::registry::TypeRegistry;

#[derive(Debug, Error)]
pub enum MarkError {
    /// The target shape cannot be finalized (plain data fields have no
    /// callable identity to mark).
    #[error("cannot mark a {kind} as final")]
    InvalidMarkingTarget { kind: &'static str },

    #[error(transparent)]
    Member(#[from] MemberError),
}

/// A target of the marking API: a whole class or a single member.
#[derive(Debug, Clone)]
pub enum FinalTarget {
    Class(ClassHandle),
    Member(Member),
}

impl FinalTarget {
    pub fn into_class(self) -> Option<ClassHandle> {
        match self {
            FinalTarget::Class(class) => Some(class),
            FinalTarget::Member(_) => None,
        }
    }

    pub fn into_member(self) -> Option<Member> {
        match self {
            FinalTarget::Member(member) => Some(member),
            FinalTarget::Class(_) => None,
        }
    }
}

impl From<ClassHandle> for FinalTarget {
    fn from(class: ClassHandle) -> Self {
        FinalTarget::Class(class)
    }
}

impl From<&ClassHandle> for FinalTarget {
    fn from(class: &ClassHandle) -> Self {
        FinalTarget::Class(class.clone())
    }
}

impl From<Member> for FinalTarget {
    fn from(member: Member) -> Self {
        FinalTarget::Member(member)
    }
}

impl TypeRegistry {
    /// Mark a class or member as final.
    ///
    /// A class target is sealed immediately: the enforcement validator is
    /// installed on it and no subtype of it can be defined afterwards.
    ///
    /// A member target gets the final marker on its resolved underlying
    /// callable and is returned unchanged otherwise — callers cannot tell
    /// a finalized member apart except through introspection. The
    /// registry entry is created later, when the member is bound into a
    /// class body by [`TypeRegistry::define`], because the owning type
    /// does not exist yet at marking time.
    pub fn mark_final(&self, target: FinalTarget) -> Result<FinalTarget, MarkError> {
        match target {
            FinalTarget::Class(class) => {
                self.seal(&class);
                Ok(FinalTarget::Class(class))
            }
            FinalTarget::Member(member) => {
                if let Member::Field(_) = member {
                    return Err(MarkError::InvalidMarkingTarget {
                        kind: member.kind_name(),
                    });
                }
                let callable = member.resolve()?;
                callable.set_final();
                tracing::debug!(member = callable.name(), "marked member final");
                Ok(FinalTarget::Member(member))
            }
        }
    }
}
