// ABOUTME: Runtime values and class instances with member dispatch.
// ABOUTME: Dispatch resolves through the instance's class and its ancestors.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::class::{ClassDef, ClassError, ClassHandle};
use crate::member::Member;

/// A runtime value passed to and returned from native members.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Class(ClassHandle),
    Object(Arc<Instance>),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<Instance>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassHandle> {
        match self {
            Value::Class(class) => Some(class),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a.id() == b.id(),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Class(class) => write!(f, "<class {}>", class.qual_name()),
            Value::Object(obj) => write!(f, "<{} instance>", obj.class().qual_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

/// An instance of a defined class.
pub struct Instance {
    class: ClassHandle,
    fields: RwLock<HashMap<String, Value>>,
    weak_self: Weak<Instance>,
}

impl Instance {
    pub fn class(&self) -> &ClassHandle {
        &self.class
    }

    /// A strong handle to this instance. A `&self` only exists while some
    /// strong handle does, so the upgrade cannot fail.
    fn handle(&self) -> Arc<Instance> {
        self.weak_self.upgrade().expect("instance is alive while borrowed")
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).cloned()
    }

    pub fn set_field(&self, name: &str, value: Value) {
        self.fields.write().insert(name.to_string(), value);
    }

    /// Call a member by name, resolving through the class ancestry.
    ///
    /// Instance methods receive the instance as the first argument, type
    /// methods receive the instance's class.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ClassError> {
        let member = self.member(name)?;
        match member {
            Member::Method(callable) => {
                let mut call_args = Vec::with_capacity(args.len() + 1);
                call_args.push(Value::Object(self.handle()));
                call_args.extend_from_slice(args);
                Ok(callable.invoke(&call_args))
            }
            Member::TypeMethod(callable) => {
                let mut call_args = Vec::with_capacity(args.len() + 1);
                call_args.push(Value::Class(self.class.clone()));
                call_args.extend_from_slice(args);
                Ok(callable.invoke(&call_args))
            }
            Member::StaticMethod(callable) => Ok(callable.invoke(args)),
            other => Err(ClassError::NotCallable {
                class: self.class.qual_name().clone(),
                name: name.to_string(),
                kind: other.kind_name(),
            }),
        }
    }

    /// Read an attribute: accessor getters win, then instance fields,
    /// then class-level data fields.
    pub fn get(&self, name: &str) -> Result<Value, ClassError> {
        if let Some(Member::Accessor { get, .. }) = self.class.lookup(name) {
            return match get {
                Some(callable) => Ok(callable.invoke(&[Value::Object(self.handle())])),
                None => Err(ClassError::NotReadable {
                    class: self.class.qual_name().clone(),
                    name: name.to_string(),
                }),
            };
        }

        if let Some(value) = self.field(name) {
            return Ok(value);
        }

        match self.class.lookup(name) {
            Some(Member::Field(value)) => Ok(value.clone()),
            Some(_) => Err(ClassError::NotReadable {
                class: self.class.qual_name().clone(),
                name: name.to_string(),
            }),
            None => Err(ClassError::UnknownMember {
                class: self.class.qual_name().clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Write an attribute: accessor setters win, everything else is a
    /// plain instance field write.
    pub fn set(&self, name: &str, value: Value) -> Result<(), ClassError> {
        if let Some(Member::Accessor { set, .. }) = self.class.lookup(name) {
            return match set {
                Some(callable) => {
                    callable.invoke(&[Value::Object(self.handle()), value]);
                    Ok(())
                }
                None => Err(ClassError::NotWritable {
                    class: self.class.qual_name().clone(),
                    name: name.to_string(),
                }),
            };
        }

        self.set_field(name, value);
        Ok(())
    }

    fn member(&self, name: &str) -> Result<&Member, ClassError> {
        self.class
            .lookup(name)
            .ok_or_else(|| ClassError::UnknownMember {
                class: self.class.qual_name().clone(),
                name: name.to_string(),
            })
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.qual_name())
    }
}

impl ClassDef {
    /// Create an instance, invoking the `init` member when one exists.
    pub fn instantiate(&self, args: &[Value]) -> Result<Arc<Instance>, ClassError> {
        let class = self.handle();
        let instance = Arc::new_cyclic(|weak| Instance {
            class,
            fields: RwLock::new(HashMap::new()),
            weak_self: weak.clone(),
        });

        if let Some(Member::Method(_)) = self.lookup("init") {
            instance.call("init", args)?;
        }

        Ok(instance)
    }
}
