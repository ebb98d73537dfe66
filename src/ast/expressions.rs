use crate::Span;

use super::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Less,
    LessEquals,
    Equals,
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Less => "<",
            ComparisonOp::LessEquals => "<=",
            ComparisonOp::Equals => "=",
        }
    }
}

/// A single `name : Type [<- init]` binding. Multi-binding `let`s are
/// desugared into nested single-binding ones.
#[derive(Debug, Clone, PartialEq)]
pub struct LetBinding {
    pub name: String,
    pub type_name: String,
    pub init: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseArm {
    pub name: String,
    pub type_name: String,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    SelfRef,
    Integer(i32),
    Str(String),
    Boolean(bool),
    New(String),
    IsVoid(Box<Expr>),
    Assign {
        name: String,
        value: Box<Expr>,
    },
    Block(Vec<Expr>),
    /// `receiver.method(args)`. Implicit `method(args)` uses a `self` receiver.
    Dispatch {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// `receiver@Type.method(args)`
    StaticDispatch {
        receiver: Box<Expr>,
        type_name: String,
        method: String,
        args: Vec<Expr>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Complement(Box<Expr>),
    Not(Box<Expr>),
    Paren(Box<Expr>),
    If {
        predicate: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    While {
        predicate: Box<Expr>,
        body: Box<Expr>,
    },
    Let {
        binding: LetBinding,
        body: Box<Expr>,
    },
    Case {
        scrutinee: Box<Expr>,
        arms: Vec<CaseArm>,
    },
}

/// An expression node. `static_type` is `None` until the type checker has
/// visited the node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub static_type: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            static_type: None,
        }
    }

    /// Direct sub-expressions, in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Identifier(_)
            | ExprKind::SelfRef
            | ExprKind::Integer(_)
            | ExprKind::Str(_)
            | ExprKind::Boolean(_)
            | ExprKind::New(_) => vec![],
            ExprKind::IsVoid(inner)
            | ExprKind::Complement(inner)
            | ExprKind::Not(inner)
            | ExprKind::Paren(inner) => vec![inner.as_ref()],
            ExprKind::Assign { value, .. } => vec![value.as_ref()],
            ExprKind::Block(body) => body.iter().collect(),
            ExprKind::Dispatch { receiver, args, .. }
            | ExprKind::StaticDispatch { receiver, args, .. } => {
                let mut children = vec![receiver.as_ref()];
                children.extend(args.iter());
                children
            }
            ExprKind::Arithmetic { left, right, .. } | ExprKind::Comparison { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            ExprKind::If {
                predicate,
                then_branch,
                else_branch,
            } => vec![predicate.as_ref(), then_branch.as_ref(), else_branch.as_ref()],
            ExprKind::While { predicate, body } => vec![predicate.as_ref(), body.as_ref()],
            ExprKind::Let { binding, body } => match &binding.init {
                Some(init) => vec![init.as_ref(), body.as_ref()],
                None => vec![body.as_ref()],
            },
            ExprKind::Case { scrutinee, arms } => {
                let mut children = vec![scrutinee.as_ref()];
                children.extend(arms.iter().map(|arm| &arm.body));
                children
            }
        }
    }

    /// Visits this node and every descendant, parents first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}
