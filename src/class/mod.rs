// ABOUTME: The dynamic class model: defined classes, ancestry, member lookup.
// ABOUTME: Classes are immutable once defined; metadata lives in the registry side table.

mod builder;
mod instance;

pub use builder::ClassBuilder;
pub use instance::{Instance, Value};

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use thiserror::Error;

use crate::member::Member;
use crate::types::{MemberName, QualName};

#[derive(Debug, Error)]
pub enum ClassError {
    #[error("cannot linearize the bases of {class}: inconsistent hierarchy")]
    InconsistentHierarchy { class: QualName },

    #[error("class {class} has no member named '{name}'")]
    UnknownMember { class: QualName, name: String },

    #[error("{kind} member '{name}' of {class} is not callable in this context")]
    NotCallable {
        class: QualName,
        name: String,
        kind: &'static str,
    },

    #[error("member '{name}' of {class} is not readable")]
    NotReadable { class: QualName, name: String },

    #[error("member '{name}' of {class} is not writable")]
    NotWritable { class: QualName, name: String },
}

/// Process-unique identifier for a defined class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Counter for allocating unique TypeIds. Process-wide so handles from
/// different registries never collide in a side table.
static NEXT_TYPE_ID: AtomicU32 = AtomicU32::new(1);

fn allocate_type_id() -> TypeId {
    TypeId(NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed))
}

/// Shared handle to a defined class.
pub type ClassHandle = Arc<ClassDef>;

/// An immutable defined class: identity, bases, cached linearization,
/// and the member table in declaration order.
pub struct ClassDef {
    id: TypeId,
    qual_name: QualName,
    bases: Vec<ClassHandle>,
    ancestors: Vec<ClassHandle>,
    members: Vec<(MemberName, Member)>,
    member_index: HashMap<String, usize>,
    weak_self: Weak<ClassDef>,
}

impl ClassDef {
    pub(crate) fn new(
        qual_name: QualName,
        bases: Vec<ClassHandle>,
        ancestors: Vec<ClassHandle>,
        members: Vec<(MemberName, Member)>,
    ) -> ClassHandle {
        let member_index = members
            .iter()
            .enumerate()
            .map(|(idx, (name, _))| (name.as_str().to_string(), idx))
            .collect();
        Arc::new_cyclic(|weak| Self {
            id: allocate_type_id(),
            qual_name,
            bases,
            ancestors,
            members,
            member_index,
            weak_self: weak.clone(),
        })
    }

    /// A strong handle to this class. A `&self` only exists while some
    /// strong handle does, so the upgrade cannot fail.
    pub(crate) fn handle(&self) -> ClassHandle {
        self.weak_self.upgrade().expect("class is alive while borrowed")
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn qual_name(&self) -> &QualName {
        &self.qual_name
    }

    pub fn name(&self) -> &str {
        self.qual_name.type_name()
    }

    /// Direct bases in declaration order.
    pub fn bases(&self) -> &[ClassHandle] {
        &self.bases
    }

    /// Full ancestor chain in resolution order (nearest first, no self).
    pub fn ancestors(&self) -> &[ClassHandle] {
        &self.ancestors
    }

    /// Member names declared directly on this class, in declaration order.
    pub fn member_names(&self) -> impl Iterator<Item = &MemberName> {
        self.members.iter().map(|(name, _)| name)
    }

    /// A member declared directly on this class (no inheritance).
    pub fn declared_member(&self, name: &str) -> Option<&Member> {
        self.member_index.get(name).map(|&idx| &self.members[idx].1)
    }

    /// Look up a member through this class and its ancestor chain.
    pub fn lookup(&self, name: &str) -> Option<&Member> {
        if let Some(member) = self.declared_member(name) {
            return Some(member);
        }
        self.ancestors
            .iter()
            .find_map(|ancestor| ancestor.declared_member(name))
    }

    /// Whether `ancestor` appears in this class's ancestor chain.
    pub fn derives_from(&self, ancestor: &ClassDef) -> bool {
        self.ancestors.iter().any(|a| a.id == ancestor.id)
    }

    /// Call a type-scoped or static member directly on the class.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ClassError> {
        let member = self.lookup(name).ok_or_else(|| ClassError::UnknownMember {
            class: self.qual_name.clone(),
            name: name.to_string(),
        })?;

        match member {
            Member::TypeMethod(callable) => {
                let mut call_args = Vec::with_capacity(args.len() + 1);
                call_args.push(Value::Class(self.handle()));
                call_args.extend_from_slice(args);
                Ok(callable.invoke(&call_args))
            }
            Member::StaticMethod(callable) => Ok(callable.invoke(args)),
            other => Err(ClassError::NotCallable {
                class: self.qual_name.clone(),
                name: name.to_string(),
                kind: other.kind_name(),
            }),
        }
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("id", &self.id)
            .field("qual_name", &self.qual_name)
            .field("bases", &self.bases.iter().map(|b| b.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// C3 linearization of the given bases.
///
/// Returns the candidate's ancestor chain (nearest first, candidate
/// excluded). Fails when the base order cannot be linearized, e.g. bases
/// declared in an order inconsistent with their own ancestry.
pub(crate) fn linearize(
    class: &QualName,
    bases: &[ClassHandle],
) -> Result<Vec<ClassHandle>, ClassError> {
    if bases.is_empty() {
        return Ok(Vec::new());
    }

    let mut sequences: Vec<VecDeque<ClassHandle>> = bases
        .iter()
        .map(|base| {
            std::iter::once(base.clone())
                .chain(base.ancestors().iter().cloned())
                .collect()
        })
        .collect();
    sequences.push(bases.iter().cloned().collect());

    let mut out = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(out);
        }

        // A head is good when it appears in no sequence's tail.
        let good = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|seq| seq.iter().skip(1).any(|tail| tail.id() == head.id()))
            })
            .cloned();

        match good {
            Some(head) => {
                for seq in &mut sequences {
                    if seq[0].id() == head.id() {
                        seq.pop_front();
                    }
                }
                out.push(head);
            }
            None => {
                return Err(ClassError::InconsistentHierarchy {
                    class: class.clone(),
                });
            }
        }
    }
}
