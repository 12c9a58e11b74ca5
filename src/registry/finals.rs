// ABOUTME: Per-type record of finalized member names and their declaring types.
// ABOUTME: Stores only names introduced by that type; inheritance is resolved by callers.

use thiserror::Error;

use crate::types::{MemberName, QualName};

#[derive(Debug, Error)]
pub enum FinalsError {
    /// The same name was finalized with two different declaring types on
    /// one class. Guards against double-patching; a single definition
    /// pathway never produces this.
    #[error(
        "member '{name}' is already final on this class, declared by {existing}; \
         cannot re-declare it from {incoming}"
    )]
    ConflictingDeclaration {
        name: MemberName,
        existing: QualName,
        incoming: QualName,
    },
}

struct FinalEntry {
    name: MemberName,
    declared_in: QualName,
}

/// The final-member record of a single class, in registration order.
#[derive(Default)]
pub(crate) struct FinalRecord {
    entries: Vec<FinalEntry>,
}

impl FinalRecord {
    /// Register `name` as final, declared by `declaring`.
    ///
    /// Idempotent for a repeated `(name, declaring)` pair — paired
    /// accessor halves register twice under the same name without
    /// conflict. A different declaring type for a known name fails.
    pub(crate) fn mark(&mut self, name: &MemberName, declaring: &QualName) -> Result<(), FinalsError> {
        if let Some(existing) = self.finalizing_type(name) {
            if existing == declaring {
                return Ok(());
            }
            return Err(FinalsError::ConflictingDeclaration {
                name: name.clone(),
                existing: existing.clone(),
                incoming: declaring.clone(),
            });
        }

        self.entries.push(FinalEntry {
            name: name.clone(),
            declared_in: declaring.clone(),
        });
        Ok(())
    }

    /// Names finalized directly on this class, in registration order.
    pub(crate) fn names(&self) -> impl Iterator<Item = &MemberName> {
        self.entries.iter().map(|entry| &entry.name)
    }

    /// The type that finalized `name` on this class, if any.
    pub(crate) fn finalizing_type(&self, name: &MemberName) -> Option<&QualName> {
        self.entries
            .iter()
            .find(|entry| &entry.name == name)
            .map(|entry| &entry.declared_in)
    }

    pub(crate) fn contains(&self, name: &MemberName) -> bool {
        self.finalizing_type(name).is_some()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
