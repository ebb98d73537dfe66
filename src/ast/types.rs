//! Static types assigned to expressions by the type checker.
//!
//! Type annotations in the source are plain class names. The checker turns
//! them into [`Type`] values relative to the class being checked, so that
//! `SELF_TYPE` remembers which class it stands for.

use std::fmt::Display;

pub const OBJECT: &str = "Object";
pub const IO: &str = "IO";
pub const INT: &str = "Int";
pub const BOOL: &str = "Bool";
pub const STRING: &str = "String";
pub const SELF_TYPE: &str = "SELF_TYPE";

/// Names a program class may not use.
pub const RESERVED_CLASS_NAMES: [&str; 6] = [OBJECT, IO, INT, BOOL, STRING, SELF_TYPE];

/// Built-in classes that cannot be inherited from.
pub const SEALED_CLASS_NAMES: [&str; 3] = [INT, BOOL, STRING];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// An ordinary class type.
    Class(String),
    /// `SELF_TYPE` seen from inside the named class.
    SelfType(String),
    /// The type of expressions with no useful value, such as `while`.
    Void,
    /// Sentinel for an ill-typed node. Conforms both ways so one mistake
    /// does not cascade.
    Error,
}

impl Type {
    pub fn class(name: &str) -> Type {
        Type::Class(name.to_string())
    }

    /// Converts a declared type name into a static type inside `class_name`.
    pub fn from_annotation(type_name: &str, class_name: &str) -> Type {
        if type_name == SELF_TYPE {
            Type::SelfType(class_name.to_string())
        } else {
            Type::Class(type_name.to_string())
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// `Int`, `Bool` and `String` are compared by value and never void.
    pub fn is_primitive(&self) -> bool {
        match self {
            Type::Class(name) => is_primitive_name(name),
            _ => false,
        }
    }

    /// The class a value of this type is known to be an instance of.
    ///
    /// Self-types resolve to their enclosing class. `Void` and `Error` have
    /// no class.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) | Type::SelfType(name) => Some(name),
            Type::Void | Type::Error => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Class(name) => write!(f, "{}", name),
            Type::SelfType(_) => write!(f, "{}", SELF_TYPE),
            Type::Void => write!(f, "Void"),
            Type::Error => write!(f, "<error>"),
        }
    }
}

pub fn is_primitive_name(name: &str) -> bool {
    SEALED_CLASS_NAMES.contains(&name)
}
