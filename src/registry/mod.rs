// ABOUTME: The type registry: class definition pathway and metadata side table.
// ABOUTME: Sealed flags, final-member records, and validator chains keyed by TypeId.

mod finals;

pub use finals::FinalsError;
pub(crate) use finals::FinalRecord;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::class::{ClassBuilder, ClassDef, ClassHandle, TypeId, linearize};
use crate::hooks::{DefineContext, DefineError, FinalityValidator, SubtypeValidator};
use crate::member::Member;
use crate::types::{MemberName, QualName};

/// How to treat a final member name declared twice within one class body.
///
/// The permissive default allows it so a final get accessor can be paired
/// with its set accessor inside the same body. The strict variant refuses
/// any redeclaration of a final name, even same-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedeclarationPolicy {
    #[default]
    AllowSameType,
    Forbid,
}

/// Per-type metadata record in the side table.
#[derive(Default)]
pub(crate) struct TypeRecord {
    pub(crate) sealed: bool,
    pub(crate) finals: FinalRecord,
    pub(crate) validators: Vec<Arc<dyn SubtypeValidator>>,
}

pub(crate) struct RegistryInner {
    pub(crate) classes: HashMap<TypeId, ClassHandle>,
    pub(crate) records: HashMap<TypeId, TypeRecord>,
}

impl RegistryInner {
    pub(crate) fn record(&self, id: TypeId) -> Option<&TypeRecord> {
        self.records.get(&id)
    }
}

/// The process-wide registry owning all extensibility metadata.
///
/// Classes are defined exclusively through [`TypeRegistry::define`]; a
/// definition that violates a sealing or final-member rule fails before
/// any class object exists. Metadata is written once per definition
/// event and read on every later definition attempt.
pub struct TypeRegistry {
    pub(crate) inner: RwLock<RegistryInner>,
    pub(crate) enforcement: Arc<dyn SubtypeValidator>,
    policy: RedeclarationPolicy,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::with_policy(RedeclarationPolicy::default())
    }

    pub fn with_policy(policy: RedeclarationPolicy) -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                classes: HashMap::new(),
                records: HashMap::new(),
            }),
            enforcement: Arc::new(FinalityValidator),
            policy,
        }
    }

    pub fn policy(&self) -> RedeclarationPolicy {
        self.policy
    }

    /// Define a new class from the builder.
    ///
    /// Runs the full validator chain of every ancestor before anything is
    /// created: sealing first, then final-member overrides, then any
    /// independently installed validators. On success the class is
    /// recorded and any final markers carried by its members are
    /// registered under the new class as the declaring type.
    pub fn define(&self, builder: ClassBuilder) -> Result<ClassHandle, DefineError> {
        let (module, name, bases, raw_members) = builder.into_parts();
        let qual_name = QualName::from_parts(&module, &name)?;
        let ancestors = linearize(&qual_name, &bases)?;

        let (members, final_names) = self.merge_members(&qual_name, raw_members)?;
        let declared: Vec<MemberName> = members.iter().map(|(n, _)| n.clone()).collect();

        {
            let inner = self.inner.read();
            let ctx = DefineContext::new(&qual_name, &declared, &bases, &ancestors, &inner);
            for validator in Self::collect_validators(&inner, &ancestors) {
                validator.validate(&ctx)?;
            }
        }

        let class = ClassDef::new(qual_name, bases, ancestors, members);

        let mut inner = self.inner.write();
        if !final_names.is_empty() {
            let record = inner.records.entry(class.id()).or_default();
            for name in &final_names {
                record.finals.mark(name, class.qual_name())?;
            }
            Self::ensure_enforcement(record, &self.enforcement);
        }
        inner.classes.insert(class.id(), class.clone());
        tracing::debug!(
            class = %class.qual_name(),
            bases = class.bases().len(),
            finals = final_names.len(),
            "defined class"
        );

        Ok(class)
    }

    /// Seal a class: no subtype of it may be defined from now on.
    pub(crate) fn seal(&self, class: &ClassHandle) {
        let mut inner = self.inner.write();
        let record = inner.records.entry(class.id()).or_default();
        record.sealed = true;
        Self::ensure_enforcement(record, &self.enforcement);
        tracing::debug!(class = %class.qual_name(), "sealed class");
    }

    /// Register `name` as final on `class`, declared by `declaring`.
    ///
    /// Idempotent for a repeated `(class, name, declaring)` triple; fails
    /// when `name` is already final on `class` under a different
    /// declaring type.
    pub fn mark_member_final(
        &self,
        class: &ClassHandle,
        name: &MemberName,
        declaring: &QualName,
    ) -> Result<(), FinalsError> {
        let mut inner = self.inner.write();
        let record = inner.records.entry(class.id()).or_default();
        record.finals.mark(name, declaring)?;
        Self::ensure_enforcement(record, &self.enforcement);
        Ok(())
    }

    /// Append an independently owned validator to `class`'s chain.
    ///
    /// Installed validators run for every subtype of `class`, newest
    /// first, and their errors propagate unmasked.
    pub fn install_validator(&self, class: &ClassHandle, validator: Arc<dyn SubtypeValidator>) {
        let mut inner = self.inner.write();
        let record = inner.records.entry(class.id()).or_default();
        record.validators.push(validator);
        tracing::debug!(class = %class.qual_name(), "installed subtype validator");
    }

    /// Number of classes defined through this registry.
    pub fn len(&self) -> usize {
        self.inner.read().classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, class: &ClassHandle) -> bool {
        self.inner.read().classes.contains_key(&class.id())
    }

    /// Merge raw body declarations into the final member table.
    ///
    /// Accessor halves sharing one name fold into a single bundle; any
    /// other duplicate is an error. Returns the merged table plus the
    /// names that arrived carrying a final marker.
    fn merge_members(
        &self,
        qual_name: &QualName,
        raw_members: Vec<(String, Member)>,
    ) -> Result<(Vec<(MemberName, Member)>, Vec<MemberName>), DefineError> {
        let mut merged: Vec<(MemberName, Member)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut final_names: Vec<MemberName> = Vec::new();

        for (raw_name, member) in raw_members {
            let member_name = MemberName::new(&raw_name)?;
            let is_final = member.is_final();

            match index.get(member_name.as_str()).copied() {
                None => {
                    index.insert(raw_name, merged.len());
                    merged.push((member_name.clone(), member));
                }
                Some(idx) => {
                    if self.policy == RedeclarationPolicy::Forbid
                        && final_names.contains(&member_name)
                    {
                        return Err(DefineError::FinalRedeclaration {
                            name: member_name,
                            class: qual_name.clone(),
                        });
                    }
                    Self::merge_accessor(&mut merged[idx].1, member, &member_name, qual_name)?;
                }
            }

            if is_final && !final_names.contains(&member_name) {
                final_names.push(member_name);
            }
        }

        Ok((merged, final_names))
    }

    fn merge_accessor(
        existing: &mut Member,
        incoming: Member,
        name: &MemberName,
        class: &QualName,
    ) -> Result<(), DefineError> {
        let duplicate = || DefineError::DuplicateMember {
            name: name.clone(),
            class: class.clone(),
        };

        let (
            Member::Accessor { get, set, del },
            Member::Accessor {
                get: in_get,
                set: in_set,
                del: in_del,
            },
        ) = (existing, incoming)
        else {
            return Err(duplicate());
        };

        for (slot, incoming_half) in [(get, in_get), (set, in_set), (del, in_del)] {
            if let Some(half) = incoming_half {
                if slot.is_some() {
                    return Err(duplicate());
                }
                *slot = Some(half);
            }
        }
        Ok(())
    }

    /// Validators applicable to a candidate with the given ancestors.
    ///
    /// Walks ancestors nearest-first and each type's chain newest-first,
    /// deduplicating by identity so the shared enforcement validator runs
    /// once even when reachable through both sides of a diamond.
    fn collect_validators(
        inner: &RegistryInner,
        ancestors: &[ClassHandle],
    ) -> Vec<Arc<dyn SubtypeValidator>> {
        let mut out: Vec<Arc<dyn SubtypeValidator>> = Vec::new();
        for ancestor in ancestors {
            let Some(record) = inner.record(ancestor.id()) else {
                continue;
            };
            for validator in record.validators.iter().rev() {
                if !out.iter().any(|seen| Arc::ptr_eq(seen, validator)) {
                    out.push(validator.clone());
                }
            }
        }
        out
    }

    fn ensure_enforcement(record: &mut TypeRecord, enforcement: &Arc<dyn SubtypeValidator>) {
        if !record
            .validators
            .iter()
            .any(|validator| Arc::ptr_eq(validator, enforcement))
        {
            record.validators.push(enforcement.clone());
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
