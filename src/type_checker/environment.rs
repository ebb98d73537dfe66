use std::rc::Rc;

use crate::{ast::types::Type, errors::errors::ErrorImpl};

#[derive(Debug)]
struct Binding {
    name: String,
    binding_type: Type,
    next: Option<Rc<Binding>>,
}

/// A persistent chain of variable bindings, innermost first.
///
/// Extending an environment never changes it: [`Environment::push`] returns a
/// new environment that shares every existing link, so a `let` body and the
/// code after it can hold different scopes at the same time.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    head: Option<Rc<Binding>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { head: None }
    }

    pub fn push(&self, name: &str, binding_type: Type) -> Environment {
        Environment {
            head: Some(Rc::new(Binding {
                name: name.to_string(),
                binding_type,
                next: self.head.clone(),
            })),
        }
    }

    /// The innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Result<&Type, ErrorImpl> {
        let mut current = self.head.as_deref();

        while let Some(binding) = current {
            if binding.name == name {
                return Ok(&binding.binding_type);
            }
            current = binding.next.as_deref();
        }

        Err(ErrorImpl::VariableNotDeclared {
            variable: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    /// Number of links, shadowed bindings included.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.head.as_deref();
        while let Some(binding) = current {
            depth += 1;
            current = binding.next.as_deref();
        }
        depth
    }
}
