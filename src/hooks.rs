// ABOUTME: Subtype validators: the hook chain run at type-definition time.
// ABOUTME: Holds the enforcement validator for sealed types and final members.

use thiserror::Error;

use crate::class::{ClassError, ClassHandle};
use crate::registry::{FinalsError, RegistryInner};
use crate::types::{MemberName, MemberNameError, QualName, QualNameError};

/// Errors that abort a type-definition attempt.
///
/// A failed definition produces no class object; the first violated rule
/// wins and nothing is collected or deferred.
#[derive(Debug, Error)]
pub enum DefineError {
    /// An ancestor of the candidate is sealed.
    #[error("cannot subclass the sealed class {type_name}")]
    SealedType { type_name: QualName },

    /// The candidate redeclares a member finalized by an ancestor.
    #[error("cannot override final member '{name}' of {declared_in} in class {attempted_in}")]
    FinalOverride {
        name: MemberName,
        declared_in: QualName,
        attempted_in: QualName,
    },

    /// A final member name was declared twice within one class body
    /// (raised only under `RedeclarationPolicy::Forbid`).
    #[error("final member '{name}' redeclared in class body of {class}")]
    FinalRedeclaration { name: MemberName, class: QualName },

    /// Two declarations of the same name could not be merged into one
    /// accessor bundle.
    #[error("duplicate member '{name}' in class body of {class}")]
    DuplicateMember { name: MemberName, class: QualName },

    /// An independently installed validator refused the subtype.
    #[error("class {class} rejected: {reason}")]
    Rejected { class: QualName, reason: String },

    #[error(transparent)]
    QualName(#[from] QualNameError),

    #[error(transparent)]
    MemberName(#[from] MemberNameError),

    #[error(transparent)]
    Class(#[from] ClassError),

    #[error(transparent)]
    Finals(#[from] FinalsError),
}

/// A validator invoked synchronously whenever a subtype is defined.
///
/// Validators on a hierarchy form an ordered chain: installing appends,
/// and invocation runs newest-first, so a later installation runs its
/// checks and then delegates to everything installed before it. A failed
/// validator aborts the definition; the error propagates to the caller
/// of `TypeRegistry::define` untouched.
pub trait SubtypeValidator: Send + Sync {
    fn validate(&self, ctx: &DefineContext<'_>) -> Result<(), DefineError>;
}

/// Read-only view of a candidate subtype handed to validators.
pub struct DefineContext<'a> {
    qual_name: &'a QualName,
    declared: &'a [MemberName],
    bases: &'a [ClassHandle],
    ancestors: &'a [ClassHandle],
    inner: &'a RegistryInner,
}

impl<'a> DefineContext<'a> {
    pub(crate) fn new(
        qual_name: &'a QualName,
        declared: &'a [MemberName],
        bases: &'a [ClassHandle],
        ancestors: &'a [ClassHandle],
        inner: &'a RegistryInner,
    ) -> Self {
        Self {
            qual_name,
            declared,
            bases,
            ancestors,
            inner,
        }
    }

    /// Qualified name of the candidate subtype.
    pub fn qual_name(&self) -> &QualName {
        self.qual_name
    }

    /// Member names freshly declared in the candidate's body.
    pub fn declared_members(&self) -> &[MemberName] {
        self.declared
    }

    /// Direct bases of the candidate.
    pub fn bases(&self) -> &[ClassHandle] {
        self.bases
    }

    /// Full ancestor chain of the candidate, nearest first.
    pub fn ancestors(&self) -> &[ClassHandle] {
        self.ancestors
    }

    /// Whether the given class is sealed in this registry.
    pub fn is_sealed(&self, class: &ClassHandle) -> bool {
        self.inner
            .record(class.id())
            .is_some_and(|record| record.sealed)
    }

    /// The qualified name of the type that finalized `name` directly on
    /// `class`, if any.
    pub fn finalizing_type_of(&self, class: &ClassHandle, name: &MemberName) -> Option<&QualName> {
        self.inner
            .record(class.id())
            .and_then(|record| record.finals.finalizing_type(name))
    }

    /// Convenience for foreign validators: reject the candidate with a
    /// human-readable reason.
    pub fn reject(&self, reason: impl Into<String>) -> DefineError {
        DefineError::Rejected {
            class: self.qual_name.clone(),
            reason: reason.into(),
        }
    }
}

/// The extensibility-control validator.
///
/// One shared instance per registry; installing it on several types in a
/// diamond still runs it exactly once per definition attempt because the
/// chain is deduplicated by identity before invocation.
pub(crate) struct FinalityValidator;

impl SubtypeValidator for FinalityValidator {
    fn validate(&self, ctx: &DefineContext<'_>) -> Result<(), DefineError> {
        // Sealing takes precedence over member checks: no subtype of a
        // sealed type should exist at all.
        for ancestor in ctx.ancestors() {
            if ctx.is_sealed(ancestor) {
                return Err(DefineError::SealedType {
                    type_name: ancestor.qual_name().clone(),
                });
            }
        }

        // A member finalized anywhere up the chain blocks redeclaration,
        // unless the finalizing type is the candidate itself (same-type
        // accessor pairing under a shared qualified name).
        for name in ctx.declared_members() {
            for ancestor in ctx.ancestors() {
                if let Some(declared_in) = ctx.finalizing_type_of(ancestor, name) {
                    if declared_in != ctx.qual_name() {
                        return Err(DefineError::FinalOverride {
                            name: name.clone(),
                            declared_in: declared_in.clone(),
                            attempted_in: ctx.qual_name().clone(),
                        });
                    }
                    break;
                }
            }
        }

        tracing::trace!(class = %ctx.qual_name(), "extensibility checks passed");
        Ok(())
    }
}
