//! Renders the AST back to source text.
//!
//! Operands that are not atomic are wrapped in parentheses, so the output
//! re-parses to the same tree up to extra `Paren` nodes.

use std::fmt::{Display, Formatter, Result};

use super::{
    ast::{Attribute, Class, Feature, Formal, Method, Program},
    expressions::{Expr, ExprKind},
};

const INDENT: &str = "    ";

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for class in &self.classes {
            writeln!(f, "{};", class)?;
        }
        Ok(())
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "class {} inherits {} {{", self.name, self.parent)?;
        for feature in &self.features {
            writeln!(f, "{}{};", INDENT, feature)?;
        }
        write!(f, "}}")
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Feature::Method(method) => write!(f, "{}", method),
            Feature::Attribute(attribute) => write!(f, "{}", attribute),
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let formals = self
            .formals
            .iter()
            .map(Formal::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{}({}) : {} {{ {} }}",
            self.name, formals, self.return_type, self.body
        )
    }
}

impl Display for Formal {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} : {}", self.name, self.type_name)
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} : {}", self.name, self.type_name)?;
        if let Some(init) = &self.init {
            write!(f, " <- {}", init)?;
        }
        Ok(())
    }
}

/// Nodes that need no parentheses wherever an expression may appear.
fn is_atomic(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Integer(value) => *value >= 0,
        ExprKind::Identifier(_)
        | ExprKind::SelfRef
        | ExprKind::Str(_)
        | ExprKind::Boolean(_)
        | ExprKind::New(_)
        | ExprKind::Block(_)
        | ExprKind::Dispatch { .. }
        | ExprKind::StaticDispatch { .. }
        | ExprKind::Paren(_)
        | ExprKind::If { .. }
        | ExprKind::While { .. }
        | ExprKind::Case { .. } => true,
        ExprKind::IsVoid(_)
        | ExprKind::Assign { .. }
        | ExprKind::Arithmetic { .. }
        | ExprKind::Comparison { .. }
        | ExprKind::Complement(_)
        | ExprKind::Not(_)
        | ExprKind::Let { .. } => false,
    }
}

struct Operand<'a>(&'a Expr);

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if is_atomic(self.0) {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn join_args(args: &[Expr]) -> String {
    args.iter()
        .map(Expr::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.kind {
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::SelfRef => write!(f, "self"),
            // `~2147483648` is out of range, so the minimum is written as a difference.
            ExprKind::Integer(i32::MIN) => write!(f, "~{} - 1", i32::MAX),
            ExprKind::Integer(value) if *value < 0 => write!(f, "~{}", value.unsigned_abs()),
            ExprKind::Integer(value) => write!(f, "{}", value),
            ExprKind::Str(value) => write!(f, "\"{}\"", escape(value)),
            ExprKind::Boolean(value) => write!(f, "{}", value),
            ExprKind::New(type_name) => write!(f, "new {}", type_name),
            ExprKind::IsVoid(inner) => write!(f, "isvoid {}", Operand(inner)),
            ExprKind::Assign { name, value } => write!(f, "{} <- {}", name, value),
            ExprKind::Block(body) => {
                write!(f, "{{ ")?;
                for expr in body {
                    write!(f, "{}; ", expr)?;
                }
                write!(f, "}}")
            }
            ExprKind::Dispatch {
                receiver,
                method,
                args,
            } => write!(f, "{}.{}({})", Operand(receiver), method, join_args(args)),
            ExprKind::StaticDispatch {
                receiver,
                type_name,
                method,
                args,
            } => write!(
                f,
                "{}@{}.{}({})",
                Operand(receiver),
                type_name,
                method,
                join_args(args)
            ),
            ExprKind::Arithmetic { op, left, right } => {
                write!(f, "{} {} {}", Operand(left), op.symbol(), Operand(right))
            }
            ExprKind::Comparison { op, left, right } => {
                write!(f, "{} {} {}", Operand(left), op.symbol(), Operand(right))
            }
            ExprKind::Complement(inner) => write!(f, "~{}", Operand(inner)),
            ExprKind::Not(inner) => write!(f, "not {}", Operand(inner)),
            ExprKind::Paren(inner) => write!(f, "({})", inner),
            ExprKind::If {
                predicate,
                then_branch,
                else_branch,
            } => write!(
                f,
                "if {} then {} else {} fi",
                predicate, then_branch, else_branch
            ),
            ExprKind::While { predicate, body } => {
                write!(f, "while {} loop {} pool", predicate, body)
            }
            ExprKind::Let { binding, body } => {
                write!(f, "let {} : {}", binding.name, binding.type_name)?;
                if let Some(init) = &binding.init {
                    write!(f, " <- {}", init)?;
                }
                write!(f, " in {}", body)
            }
            ExprKind::Case { scrutinee, arms } => {
                write!(f, "case {} of ", scrutinee)?;
                for arm in arms {
                    write!(f, "{} : {} => {}; ", arm.name, arm.type_name, arm.body)?;
                }
                write!(f, "esac")
            }
        }
    }
}
