//! The checked program.
//!
//! The typed AST reuses the parser's node types: every [`Expr`] reachable
//! from a [`TypedProgram`] has its `static_type` filled in.

use crate::ast::{
    ast::{Class, Feature},
    expressions::{Expr, ExprKind},
    types::Type,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedProgram {
    /// Checked classes in program order. Classes the hierarchy builder
    /// rejected are absent.
    pub classes: Vec<Class>,
}

impl TypedProgram {
    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn method_body(&self, class_name: &str, method: &str) -> Option<&Expr> {
        self.class(class_name)?
            .methods()
            .find(|candidate| candidate.name == method)
            .map(|method| &method.body)
    }

    /// Every top-level expression of every feature, in source order.
    pub fn feature_expressions(&self) -> impl Iterator<Item = &Expr> {
        self.classes
            .iter()
            .flat_map(|class| class.features.iter())
            .filter_map(|feature| match feature {
                Feature::Method(method) => Some(&method.body),
                Feature::Attribute(attribute) => attribute.init.as_ref(),
            })
    }

    /// The inferred type of every expression, parents first.
    ///
    /// Parenthesized nodes are skipped; they carry their inner type and only
    /// record how the source was written.
    pub fn expression_types(&self) -> Vec<Option<Type>> {
        let mut types = vec![];
        for expr in self.feature_expressions() {
            expr.walk(&mut |node| {
                if !matches!(node.kind, ExprKind::Paren(_)) {
                    types.push(node.static_type.clone());
                }
            });
        }
        types
    }
}
