use crate::Span;

use super::{expressions::Expr, types::OBJECT};

/// The root of the AST: every class of one source text, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub classes: Vec<Class>,
    pub span: Span,
}

impl Program {
    pub fn new(classes: Vec<Class>) -> Self {
        let span = match (classes.first(), classes.last()) {
            (Some(first), Some(last)) => first.span.to(&last.span),
            _ => Span::null(),
        };

        Program { classes, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: String,
    /// Always set; classes written without `inherits` get `Object`.
    pub parent: String,
    pub features: Vec<Feature>,
    pub span: Span,
}

impl Class {
    pub fn new(name: String, parent: Option<String>, features: Vec<Feature>, span: Span) -> Self {
        Class {
            name,
            parent: parent.unwrap_or_else(|| OBJECT.to_string()),
            features,
            span,
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.features.iter().filter_map(|feature| match feature {
            Feature::Method(method) => Some(method),
            Feature::Attribute(_) => None,
        })
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.features.iter().filter_map(|feature| match feature {
            Feature::Attribute(attribute) => Some(attribute),
            Feature::Method(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Method(Method),
    Attribute(Attribute),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub formals: Vec<Formal>,
    pub return_type: String,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Formal {
    pub name: String,
    pub type_name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
    pub init: Option<Expr>,
    pub span: Span,
}
