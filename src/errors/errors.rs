use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// The compilation phase a diagnostic was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Lexical,
    Syntax,
    Hierarchy,
    Type,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Lexical => write!(f, "lexical"),
            Phase::Syntax => write!(f, "syntax"),
            Phase::Hierarchy => write!(f, "hierarchy"),
            Phase::Type => write!(f, "type"),
        }
    }
}

/// A recoverable error, accumulated by every phase instead of being thrown.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_phase(&self) -> Phase {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnterminatedComment
            | ErrorImpl::UnterminatedString => Phase::Lexical,
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedEndOfInput { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::ChainedComparison { .. } => Phase::Syntax,
            ErrorImpl::ReservedClassName { .. }
            | ErrorImpl::ClassRedefined { .. }
            | ErrorImpl::UnknownParent { .. }
            | ErrorImpl::SealedParent { .. }
            | ErrorImpl::InheritanceCycle { .. }
            | ErrorImpl::InheritsFromCycle { .. }
            | ErrorImpl::AttributeRedefined { .. }
            | ErrorImpl::InheritedAttributeRedefined { .. }
            | ErrorImpl::MethodRedefined { .. }
            | ErrorImpl::OverrideMismatch { .. }
            | ErrorImpl::FormalRedefined { .. }
            | ErrorImpl::SelfTypeFormal { .. }
            | ErrorImpl::IllegalSelfBinding { .. } => Phase::Hierarchy,
            ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::VariableNotDeclared { .. }
            | ErrorImpl::UnknownType { .. }
            | ErrorImpl::UndefinedMethod { .. }
            | ErrorImpl::ArgumentCountMismatch { .. }
            | ErrorImpl::ArgumentTypeMatchError { .. }
            | ErrorImpl::StaticDispatchMismatch { .. }
            | ErrorImpl::DuplicateCaseBranch { .. }
            | ErrorImpl::SelfTypeCaseBranch
            | ErrorImpl::CaseOnVoid
            | ErrorImpl::InvalidEquality { .. }
            | ErrorImpl::OperandTypeMatchError { .. }
            | ErrorImpl::PredicateNotBool { .. }
            | ErrorImpl::AssignToSelf
            | ErrorImpl::IllegalSelfVariable { .. } => Phase::Type,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedEndOfInput { .. } => "UnexpectedEndOfInput",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::ChainedComparison { .. } => "ChainedComparison",
            ErrorImpl::ReservedClassName { .. } => "ReservedClassName",
            ErrorImpl::ClassRedefined { .. } => "ClassRedefined",
            ErrorImpl::UnknownParent { .. } => "UnknownParent",
            ErrorImpl::SealedParent { .. } => "SealedParent",
            ErrorImpl::InheritanceCycle { .. } => "InheritanceCycle",
            ErrorImpl::InheritsFromCycle { .. } => "InheritsFromCycle",
            ErrorImpl::AttributeRedefined { .. } => "AttributeRedefined",
            ErrorImpl::InheritedAttributeRedefined { .. } => "InheritedAttributeRedefined",
            ErrorImpl::MethodRedefined { .. } => "MethodRedefined",
            ErrorImpl::OverrideMismatch { .. } => "OverrideMismatch",
            ErrorImpl::FormalRedefined { .. } => "FormalRedefined",
            ErrorImpl::SelfTypeFormal { .. } => "SelfTypeFormal",
            ErrorImpl::IllegalSelfBinding { .. } => "IllegalSelfBinding",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::UndefinedMethod { .. } => "UndefinedMethod",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::StaticDispatchMismatch { .. } => "StaticDispatchMismatch",
            ErrorImpl::DuplicateCaseBranch { .. } => "DuplicateCaseBranch",
            ErrorImpl::SelfTypeCaseBranch => "SelfTypeCaseBranch",
            ErrorImpl::CaseOnVoid => "CaseOnVoid",
            ErrorImpl::InvalidEquality { .. } => "InvalidEquality",
            ErrorImpl::OperandTypeMatchError { .. } => "OperandTypeMatchError",
            ErrorImpl::PredicateNotBool { .. } => "PredicateNotBool",
            ErrorImpl::AssignToSelf => "AssignToSelf",
            ErrorImpl::IllegalSelfVariable { .. } => "IllegalSelfVariable",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnexpectedToken { token, expected } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, expected {}",
                token, expected
            )),
            ErrorImpl::UnexpectedEndOfInput { expected } => ErrorTip::Suggestion(format!(
                "Input ended while looking for {}",
                expected
            )),
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::ChainedComparison { .. } => ErrorTip::Suggestion(String::from(
                "Comparisons do not chain, wrap the first comparison in parentheses",
            )),
            ErrorImpl::InheritanceCycle { cycle } => ErrorTip::Suggestion(format!(
                "Break the cycle {}",
                cycle.join(" -> ")
            )),
            ErrorImpl::OverrideMismatch { .. } => ErrorTip::Suggestion(String::from(
                "Overrides must keep the inherited formal types and may only narrow the return type",
            )),
            ErrorImpl::InvalidEquality { .. } => ErrorTip::Suggestion(String::from(
                "Int, Bool and String values can only be compared with values of the same type",
            )),
            ErrorImpl::AssignToSelf => {
                ErrorTip::Suggestion(String::from("`self` cannot be the target of an assignment"))
            }
            _ => ErrorTip::None,
        }
    }

    /// The human-readable message for this error.
    pub fn message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            phase: self.get_phase(),
            line: self.position.line,
            column: if self.position.column == 0 {
                None
            } else {
                Some(self.position.column)
            },
            message: self.message(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} error at {}: {}",
            self.get_phase(),
            self.position,
            self.internal_error
        )
    }
}

impl std::error::Error for Error {}

/// The structured record a caller receives for every recoverable error.
///
/// Built-in classes have no source position, so `column` is `None` for
/// diagnostics that could not be attached to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub line: u32,
    pub column: Option<u32>,
    pub message: String,
}

impl From<&Error> for Diagnostic {
    fn from(error: &Error) -> Self {
        error.to_diagnostic()
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("end of input inside a comment")]
    UnterminatedComment,
    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unexpected token {token:?}, expected {expected}")]
    UnexpectedToken { token: String, expected: String },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("comparison operator {operator:?} is non-associative")]
    ChainedComparison { operator: String },

    #[error("class {class:?} uses a reserved class name")]
    ReservedClassName { class: String },
    #[error("class {class:?} already defined")]
    ClassRedefined { class: String },
    #[error("class {class:?} inherits from undefined class {parent:?}")]
    UnknownParent { class: String, parent: String },
    #[error("class {class:?} cannot inherit from sealed class {parent:?}")]
    SealedParent { class: String, parent: String },
    #[error("inheritance cycle: {}", cycle.join(" -> "))]
    InheritanceCycle { cycle: Vec<String> },
    #[error("class {class:?} inherits from {ancestor:?}, which is part of an inheritance cycle")]
    InheritsFromCycle { class: String, ancestor: String },
    #[error("attribute {attribute:?} already defined in class {class:?}")]
    AttributeRedefined { class: String, attribute: String },
    #[error("attribute {attribute:?} of class {class:?} redeclares the attribute inherited from {ancestor:?}")]
    InheritedAttributeRedefined {
        class: String,
        attribute: String,
        ancestor: String,
    },
    #[error("method {method:?} already defined in class {class:?}")]
    MethodRedefined { class: String, method: String },
    #[error("method {method:?} of class {class:?} does not match the signature inherited from {ancestor:?}: {reason}")]
    OverrideMismatch {
        class: String,
        method: String,
        ancestor: String,
        reason: String,
    },
    #[error("formal parameter {formal:?} declared more than once in method {method:?}")]
    FormalRedefined { method: String, formal: String },
    #[error("formal parameter {formal:?} of method {method:?} cannot have type SELF_TYPE")]
    SelfTypeFormal { method: String, formal: String },
    #[error("`self` cannot be declared as {context}")]
    IllegalSelfBinding { context: String },

    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("unknown type {type_}")]
    UnknownType { type_: String },
    #[error("class {class} has no method {method:?}")]
    UndefinedMethod { class: String, method: String },
    #[error("method {method:?} expects {expected} arguments, received {received}")]
    ArgumentCountMismatch {
        method: String,
        expected: usize,
        received: usize,
    },
    #[error("argument {parameter:?} of method {method:?}: expected {expected}, received {received}")]
    ArgumentTypeMatchError {
        method: String,
        parameter: String,
        expected: String,
        received: String,
    },
    #[error("static dispatch to {type_} on an expression of type {receiver}, which does not conform to it")]
    StaticDispatchMismatch { type_: String, receiver: String },
    #[error("duplicate branch type {type_} in case expression")]
    DuplicateCaseBranch { type_: String },
    #[error("case branches cannot have type SELF_TYPE")]
    SelfTypeCaseBranch,
    #[error("case expression on a value that is always void")]
    CaseOnVoid,
    #[error("cannot compare {left} with {right}")]
    InvalidEquality { left: String, right: String },
    #[error("operator {operator:?} expects {expected} operands, received {received}")]
    OperandTypeMatchError {
        operator: String,
        expected: String,
        received: String,
    },
    #[error("{construct} predicate must be Bool, received {received}")]
    PredicateNotBool { construct: String, received: String },
    #[error("cannot assign to self")]
    AssignToSelf,
    #[error("`self` cannot be bound in {context}")]
    IllegalSelfVariable { context: String },
}

/// A fatal condition: the caller passed input no phase can make sense of.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("program contains no classes")]
    EmptyProgram,
    #[error("class {class:?} is unknown to the class table; was the table built from another program?")]
    ForeignClass { class: String },
}
