// ABOUTME: Read-only introspection over finality metadata.
// ABOUTME: Unknown targets answer false/empty; nothing here can fail.

use crate::class::ClassHandle;
use crate::marking::FinalTarget;
use crate::member::Callable;
use crate::registry::TypeRegistry;
use crate::types::{MemberName, QualName};

impl TypeRegistry {
    /// Whether the target was marked final through this registry's
    /// marking API: a sealed class, or a member whose callable carries
    /// the final marker.
    pub fn is_final(&self, target: &FinalTarget) -> bool {
        match target {
            FinalTarget::Class(class) => self.is_sealed(class),
            FinalTarget::Member(member) => member.is_final(),
        }
    }

    /// Whether the class is sealed against subtyping.
    pub fn is_sealed(&self, class: &ClassHandle) -> bool {
        self.inner
            .read()
            .record(class.id())
            .is_some_and(|record| record.sealed)
    }

    /// The resolved callables of every member finalized directly on
    /// `class`, in registration order. Ancestors' finals are excluded.
    pub fn final_members_of(&self, class: &ClassHandle) -> Vec<Callable> {
        self.final_member_names(class)
            .iter()
            .filter_map(|name| class.declared_member(name.as_str()))
            .filter_map(|member| member.resolve().ok().cloned())
            .collect()
    }

    /// The names finalized directly on `class`, in registration order.
    pub fn final_member_names(&self, class: &ClassHandle) -> Vec<MemberName> {
        let inner = self.inner.read();
        match inner.record(class.id()) {
            Some(record) => record.finals.names().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// The type that finalized `name` directly on `class`, if any.
    ///
    /// Distinguishes legal same-type redeclaration from cross-type
    /// override: a match against the candidate's own qualified name is
    /// the permitted case.
    pub fn finalizing_type_of(&self, class: &ClassHandle, name: &MemberName) -> Option<QualName> {
        self.inner
            .read()
            .record(class.id())
            .and_then(|record| record.finals.finalizing_type(name).cloned())
    }
}
