//! The resolved, flattened class table.
//!
//! Built once by [`super::builder::build`] and then only read. Every record
//! carries its full set of attributes and method signatures, inherited ones
//! included, so lookups never walk the hierarchy.

use indexmap::{IndexMap, IndexSet};

use crate::ast::types::{
    is_primitive_name, Type, BOOL, INT, IO, OBJECT, SEALED_CLASS_NAMES, SELF_TYPE, STRING,
};

/// An attribute visible in a class, with the class that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    pub type_name: String,
    pub defined_in: String,
}

/// A method signature visible in a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    /// `(name, type)` pairs in declaration order.
    pub formals: Vec<(String, String)>,
    pub return_type: String,
    /// Class whose declaration this signature comes from.
    pub defined_in: String,
}

impl MethodSignature {
    pub fn arity(&self) -> usize {
        self.formals.len()
    }

    pub fn formal_types(&self) -> impl Iterator<Item = &str> {
        self.formals.iter().map(|(_, type_name)| type_name.as_str())
    }
}

/// Information about a class in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub name: String,
    /// `None` only for `Object`.
    pub parent: Option<String>,
    /// Inherited attributes first, then the class's own.
    pub attributes: Vec<AttributeInfo>,
    /// Inherited methods first; an override takes the inherited slot.
    pub methods: IndexMap<String, MethodSignature>,
    /// Index of the declaring class in the program, `None` for built-ins.
    pub declaration: Option<usize>,
}

impl ClassRecord {
    pub fn is_builtin(&self) -> bool {
        self.declaration.is_none()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }
}

/// Class name to resolved record, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassTable {
    classes: IndexMap<String, ClassRecord>,
    excluded: IndexSet<String>,
}

impl ClassTable {
    /// Create a table with only the built-in classes.
    pub fn with_builtins() -> Self {
        let mut table = ClassTable::default();
        table.register_builtins();
        table
    }

    pub fn get_class(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.get(name)
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes left out of the table because of an inheritance cycle.
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    pub fn is_sealed(&self, name: &str) -> bool {
        SEALED_CLASS_NAMES.contains(&name)
    }

    /// `SELF_TYPE` and every class in the table are valid type names.
    pub fn is_known_type(&self, name: &str) -> bool {
        name == SELF_TYPE || self.has_class(name)
    }

    /// The class itself followed by its ancestors, ending with `Object`.
    pub fn superclass_chain(&self, class_name: &str) -> Vec<&str> {
        let mut chain = vec![];
        let mut current = self.classes.get_key_value(class_name);

        while let Some((name, record)) = current {
            // The builder guarantees an acyclic table; the bound keeps a
            // hand-assembled one from looping.
            if chain.len() > self.classes.len() {
                break;
            }
            chain.push(name.as_str());
            current = record
                .parent
                .as_deref()
                .and_then(|parent| self.classes.get_key_value(parent));
        }

        chain
    }

    /// `true` when `class_name` is `ancestor` or inherits from it.
    pub fn is_subclass(&self, class_name: &str, ancestor: &str) -> bool {
        class_name == ancestor || self.superclass_chain(class_name).contains(&ancestor)
    }

    /// The conformance relation `sub <= sup`.
    pub fn conforms(&self, sub: &Type, sup: &Type) -> bool {
        match (sub, sup) {
            (Type::Error, _) | (_, Type::Error) => true,
            (Type::SelfType(a), Type::SelfType(b)) => a == b,
            (_, Type::SelfType(_)) => false,
            (Type::Void, Type::Void) => true,
            (_, Type::Void) => false,
            (Type::Void, Type::Class(name)) => !is_primitive_name(name),
            (Type::SelfType(name), Type::Class(ancestor))
            | (Type::Class(name), Type::Class(ancestor)) => self.is_subclass(name, ancestor),
        }
    }

    /// The least upper bound of two types.
    pub fn join(&self, a: &Type, b: &Type) -> Type {
        match (a, b) {
            (Type::Error, other) | (other, Type::Error) => other.clone(),
            (Type::SelfType(x), Type::SelfType(y)) if x == y => a.clone(),
            (Type::Void, Type::Void) => Type::Void,
            (Type::Void, other) | (other, Type::Void) if !other.is_primitive() => other.clone(),
            (Type::Void, _) | (_, Type::Void) => Type::class(OBJECT),
            _ => {
                let (Some(left), Some(right)) = (a.class_name(), b.class_name()) else {
                    return Type::class(OBJECT);
                };
                let left_chain = self.superclass_chain(left);
                self.superclass_chain(right)
                    .into_iter()
                    .find(|ancestor| left_chain.contains(ancestor))
                    .map_or_else(|| Type::class(OBJECT), Type::class)
            }
        }
    }

    /// Finds `method` in the flattened method set of `class_name`.
    pub fn lookup_method(&self, class_name: &str, method: &str) -> Option<&MethodSignature> {
        self.classes.get(class_name)?.methods.get(method)
    }

    pub(crate) fn insert(&mut self, record: ClassRecord) {
        self.classes.insert(record.name.clone(), record);
    }

    pub(crate) fn get_class_mut(&mut self, name: &str) -> Option<&mut ClassRecord> {
        self.classes.get_mut(name)
    }

    pub(crate) fn exclude(&mut self, name: &str) {
        self.excluded.insert(name.to_string());
    }

    /// Register all built-in classes.
    fn register_builtins(&mut self) {
        self.register_object();
        self.register_io();
        self.register_primitive(INT, vec![]);
        self.register_primitive(BOOL, vec![]);
        self.register_primitive(
            STRING,
            vec![
                builtin_method("length", &[], INT, STRING),
                builtin_method("concat", &[("s", STRING)], STRING, STRING),
                builtin_method("substr", &[("i", INT), ("l", INT)], STRING, STRING),
            ],
        );
    }

    fn object_methods(&self) -> IndexMap<String, MethodSignature> {
        self.classes
            .get(OBJECT)
            .map(|object| object.methods.clone())
            .unwrap_or_default()
    }

    fn register_object(&mut self) {
        let methods = [
            builtin_method("abort", &[], OBJECT, OBJECT),
            builtin_method("type_name", &[], STRING, OBJECT),
            builtin_method("copy", &[], SELF_TYPE, OBJECT),
        ];

        self.insert(ClassRecord {
            name: OBJECT.to_string(),
            parent: None,
            attributes: vec![],
            methods: methods
                .into_iter()
                .map(|method| (method.name.clone(), method))
                .collect(),
            declaration: None,
        });
    }

    fn register_io(&mut self) {
        let mut methods = self.object_methods();
        for method in [
            builtin_method("out_string", &[("x", STRING)], SELF_TYPE, IO),
            builtin_method("out_int", &[("x", INT)], SELF_TYPE, IO),
            builtin_method("in_string", &[], STRING, IO),
            builtin_method("in_int", &[], INT, IO),
        ] {
            methods.insert(method.name.clone(), method);
        }

        self.insert(ClassRecord {
            name: IO.to_string(),
            parent: Some(OBJECT.to_string()),
            attributes: vec![],
            methods,
            declaration: None,
        });
    }

    fn register_primitive(&mut self, name: &str, own_methods: Vec<MethodSignature>) {
        let mut methods = self.object_methods();
        for method in own_methods {
            methods.insert(method.name.clone(), method);
        }

        self.insert(ClassRecord {
            name: name.to_string(),
            parent: Some(OBJECT.to_string()),
            attributes: vec![],
            methods,
            declaration: None,
        });
    }
}

/// Create a built-in method signature.
fn builtin_method(
    name: &str,
    formals: &[(&str, &str)],
    return_type: &str,
    defined_in: &str,
) -> MethodSignature {
    MethodSignature {
        name: name.to_string(),
        formals: formals
            .iter()
            .map(|(formal, type_name)| (formal.to_string(), type_name.to_string()))
            .collect(),
        return_type: return_type.to_string(),
        defined_in: defined_in.to_string(),
    }
}
