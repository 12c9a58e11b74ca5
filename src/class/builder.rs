// ABOUTME: Builder for candidate class definitions fed to TypeRegistry::define.
// ABOUTME: Accumulates bases and raw member declarations in body order.

use crate::class::{ClassHandle, Value};
use crate::member::Member;

/// A candidate class definition.
///
/// Nothing is validated here; names, accessor pairing, and the
/// extensibility rules are all checked by `TypeRegistry::define`, which
/// either produces a `ClassHandle` or fails without creating anything.
#[derive(Debug)]
pub struct ClassBuilder {
    module: String,
    name: String,
    bases: Vec<ClassHandle>,
    members: Vec<(String, Member)>,
}

impl ClassBuilder {
    pub fn new(module: &str, name: &str) -> Self {
        Self {
            module: module.to_string(),
            name: name.to_string(),
            bases: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Add a direct base class. Order matters for ancestor resolution.
    pub fn base(mut self, base: &ClassHandle) -> Self {
        self.bases.push(base.clone());
        self
    }

    /// Bind a pre-built member (possibly carrying a final marker) under `name`.
    ///
    /// The same name may appear twice when pairing accessor halves inside
    /// one class body; `define` merges them into a single bundle.
    pub fn member(mut self, name: &str, member: Member) -> Self {
        self.members.push((name.to_string(), member));
        self
    }

    /// Declare an instance-scoped method. The instance arrives as the
    /// first argument.
    pub fn method<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let member = Member::method(name, f);
        self.member(name, member)
    }

    /// Declare a type-scoped method. The class arrives as the first argument.
    pub fn type_method<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let member = Member::type_method(name, f);
        self.member(name, member)
    }

    /// Declare a static method.
    pub fn static_method<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let member = Member::static_method(name, f);
        self.member(name, member)
    }

    /// Declare the read half of an accessor.
    pub fn getter<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let member = Member::getter(name, f);
        self.member(name, member)
    }

    /// Declare the write half of an accessor.
    pub fn setter<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let member = Member::setter(name, f);
        self.member(name, member)
    }

    /// Declare a plain data field.
    pub fn field(self, name: &str, value: Value) -> Self {
        self.member(name, Member::field(value))
    }

    pub(crate) fn into_parts(self) -> (String, String, Vec<ClassHandle>, Vec<(String, Member)>) {
        (self.module, self.name, self.bases, self.members)
    }
}
