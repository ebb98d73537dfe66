#![allow(clippy::module_inception)]

//! Front end for a small class-based teaching language.
//!
//! The pipeline turns source text into a validated, typed AST:
//!
//! - [`lexer`]: a reference token source (regex driven)
//! - [`parser`]: a Pratt parser producing an [`ast::ast::Program`]
//! - [`class_table`]: builds and validates the inheritance hierarchy
//! - [`type_checker`]: scopes, conformance, joins and per-expression typing
//!
//! Every phase accumulates recoverable [`errors::errors::Error`]s and returns
//! them next to its best-effort result.

use std::fmt::Display;

use tracing::{debug, instrument};

use crate::{
    ast::ast::Program,
    class_table::{builder::build, class_table::ClassTable},
    errors::errors::{Error, StructuralError},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::{type_checker::check, typed_ast::TypedProgram},
};

pub mod ast;
pub mod class_table;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A 1-based line and column in the source text.
///
/// Built-in classes use [`Position::null`], which has no line or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    pub fn null() -> Self {
        Position { line: 0, column: 0 }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }

    /// The span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }
}

/// The last phase [`run_frontend`] executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum Stage {
    Lex,
    Parse,
    Hierarchy,
    Check,
}

#[derive(Debug, Clone)]
pub struct FrontendOptions {
    pub stop_after: Stage,
}

impl Default for FrontendOptions {
    fn default() -> Self {
        FrontendOptions {
            stop_after: Stage::Check,
        }
    }
}

/// Everything the front end produced for one source text.
///
/// Later phases only run when the earlier ones produced a usable result, so a
/// source with syntax errors has no class table and no typed program.
#[derive(Debug, Default)]
pub struct FrontendOutput {
    pub program: Option<Program>,
    pub class_table: Option<ClassTable>,
    pub typed_program: Option<TypedProgram>,
    pub errors: Vec<Error>,
}

impl FrontendOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Runs the pipeline over `source` up to `options.stop_after`.
#[instrument(skip_all, fields(stop_after = ?options.stop_after))]
pub fn run_frontend(source: &str, options: &FrontendOptions) -> Result<FrontendOutput, StructuralError> {
    let mut output = FrontendOutput::default();

    let (tokens, lex_errors) = tokenize(source);
    debug!("tokenized {} tokens", tokens.len());
    output.errors.extend(lex_errors);
    if options.stop_after == Stage::Lex {
        return Ok(output);
    }

    let program = match parse(tokens.into_iter()) {
        Ok(program) => program,
        Err(syntax_errors) => {
            output.errors.extend(syntax_errors);
            return Ok(output);
        }
    };
    if options.stop_after == Stage::Parse {
        output.program = Some(program);
        return Ok(output);
    }

    let (class_table, hierarchy_errors) = build(&program)?;
    output.errors.extend(hierarchy_errors);
    if options.stop_after == Stage::Hierarchy {
        output.program = Some(program);
        output.class_table = Some(class_table);
        return Ok(output);
    }

    let (typed_program, type_errors) = check(&class_table, &program)?;
    output.errors.extend(type_errors);
    debug!("front end finished with {} diagnostics", output.errors.len());

    output.program = Some(program);
    output.class_table = Some(class_table);
    output.typed_program = Some(typed_program);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::{run_frontend, FrontendOptions, Position, Span, Stage};

    #[test]
    fn test_span_to() {
        let first = Span::new(Position::new(1, 1), Position::new(1, 4));
        let second = Span::new(Position::new(2, 3), Position::new(2, 9));
        let joined = first.to(&second);
        assert_eq!(joined.start, Position::new(1, 1));
        assert_eq!(joined.end, Position::new(2, 9));
    }

    #[test]
    fn test_run_frontend_stops_early() {
        let options = FrontendOptions {
            stop_after: Stage::Parse,
        };
        let output = run_frontend("class A { };", &options).unwrap();
        assert!(output.program.is_some());
        assert!(output.class_table.is_none());
        assert!(!output.has_errors());
    }

    #[test]
    fn test_run_frontend_syntax_errors_skip_semantics() {
        let output = run_frontend("class A { x : Int <- ; };", &FrontendOptions::default()).unwrap();
        assert!(output.has_errors());
        assert!(output.program.is_none());
        assert!(output.typed_program.is_none());
    }

    #[test]
    fn test_run_frontend_full() {
        let source = "class Main inherits IO { main(): Object { out_string(\"hi\") }; };";
        let output = run_frontend(source, &FrontendOptions::default()).unwrap();
        assert!(!output.has_errors(), "{:?}", output.errors);
        assert!(output.typed_program.is_some());
    }
}
