// ABOUTME: Class member shapes and the resolver to their underlying callables.
// ABOUTME: The final marker lives on the shared callable, not on the binding.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::class::Value;

#[derive(Debug, Error)]
pub enum MemberError {
    /// The member has no underlying callable to resolve.
    #[error("cannot resolve an underlying callable for {0} member")]
    UnsupportedMemberKind(&'static str),
}

/// Signature shared by all native member functions.
///
/// Instance-scoped members receive the instance as the first argument,
/// type-scoped members receive the class; static members receive only
/// what the caller passed.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

struct CallableInner {
    name: String,
    func: NativeFn,
    final_marker: AtomicBool,
}

/// A named native function with shared identity.
///
/// Clones share the same underlying state, so a final marker set through
/// one handle is visible through every other handle to the same function.
#[derive(Clone)]
pub struct Callable(Arc<CallableInner>);

impl Callable {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(CallableInner {
            name: name.to_string(),
            func: Arc::new(func),
            final_marker: AtomicBool::new(false),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn invoke(&self, args: &[Value]) -> Value {
        (self.0.func)(args)
    }

    /// Whether this callable carries the final marker.
    pub fn is_final(&self) -> bool {
        self.0.final_marker.load(Ordering::Relaxed)
    }

    /// Set the final marker. Once set, never unset.
    pub(crate) fn set_final(&self) {
        self.0.final_marker.store(true, Ordering::Relaxed);
    }

    /// Identity comparison: two handles to the same underlying function.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.0.name)
            .field("final", &self.is_final())
            .finish()
    }
}

/// The closed set of member shapes a class body can declare.
#[derive(Debug, Clone)]
pub enum Member {
    /// Instance-scoped function; the instance is passed as the first argument.
    Method(Callable),
    /// Type-scoped function; the class is passed as the first argument.
    TypeMethod(Callable),
    /// Static function; arguments are passed through unchanged.
    StaticMethod(Callable),
    /// Accessor bundle: get/set/delete callables addressed by one name.
    Accessor {
        get: Option<Callable>,
        set: Option<Callable>,
        del: Option<Callable>,
    },
    /// Plain data field. Has no underlying callable.
    Field(Value),
}

impl Member {
    pub fn method<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Member::Method(Callable::new(name, f))
    }

    pub fn type_method<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Member::TypeMethod(Callable::new(name, f))
    }

    pub fn static_method<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Member::StaticMethod(Callable::new(name, f))
    }

    pub fn getter<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Member::Accessor {
            get: Some(Callable::new(name, f)),
            set: None,
            del: None,
        }
    }

    pub fn setter<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Member::Accessor {
            get: None,
            set: Some(Callable::new(name, f)),
            del: None,
        }
    }

    pub fn deleter<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Member::Accessor {
            get: None,
            set: None,
            del: Some(Callable::new(name, f)),
        }
    }

    pub fn field(value: Value) -> Self {
        Member::Field(value)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Member::Method(_) => "method",
            Member::TypeMethod(_) => "type method",
            Member::StaticMethod(_) => "static method",
            Member::Accessor { .. } => "accessor",
            Member::Field(_) => "field",
        }
    }

    /// Resolve the canonical underlying callable for this member.
    ///
    /// Accessor bundles resolve to the get callable, falling back to set
    /// and then delete when the bundle is partial. Fields have no
    /// underlying callable.
    pub fn resolve(&self) -> Result<&Callable, MemberError> {
        match self {
            Member::Method(c) | Member::TypeMethod(c) | Member::StaticMethod(c) => Ok(c),
            Member::Accessor { get, set, del } => get
                .as_ref()
                .or(set.as_ref())
                .or(del.as_ref())
                .ok_or(MemberError::UnsupportedMemberKind("empty accessor")),
            Member::Field(_) => Err(MemberError::UnsupportedMemberKind("field")),
        }
    }

    /// Whether any callable of this member carries the final marker.
    ///
    /// An accessor counts as final when either half was marked, so a
    /// bundle assembled from a plain getter and a final setter is final.
    pub fn is_final(&self) -> bool {
        match self {
            Member::Method(c) | Member::TypeMethod(c) | Member::StaticMethod(c) => c.is_final(),
            Member::Accessor { get, set, del } => [get, set, del]
                .iter()
                .any(|half| half.as_ref().is_some_and(Callable::is_final)),
            Member::Field(_) => false,
        }
    }
}
