//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Diagnostic, Error, ErrorImpl, ErrorTip, Phase};
use crate::Position;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "#".to_string(),
        },
        Position::new(3, 10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_phase(), Phase::Lexical);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "fi".to_string(),
            expected: "`then`".to_string(),
        },
        Position::new(42, 7),
    );

    assert_eq!(error.get_position().line, 42);
    assert_eq!(error.get_position().column, 7);
}

#[test]
fn test_unexpected_token_has_tip() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "fi".to_string(),
            expected: "`then`".to_string(),
        },
        Position::new(1, 1),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert!(tip.contains("`then`")),
        ErrorTip::None => panic!("expected a suggestion"),
    }
}

#[test]
fn test_phases() {
    let cycle = Error::new(
        ErrorImpl::InheritanceCycle {
            cycle: vec!["A".to_string(), "B".to_string()],
        },
        Position::new(1, 1),
    );
    assert_eq!(cycle.get_phase(), Phase::Hierarchy);
    assert_eq!(cycle.message(), "inheritance cycle: A -> B");

    let mismatch = Error::new(
        ErrorImpl::TypeMatchError {
            expected: "Int".to_string(),
            received: "String".to_string(),
        },
        Position::new(1, 1),
    );
    assert_eq!(mismatch.get_phase(), Phase::Type);
    assert_eq!(mismatch.get_error_name(), "TypeMatchError");

    let eof = Error::new(
        ErrorImpl::UnexpectedEndOfInput {
            expected: "`;`".to_string(),
        },
        Position::new(1, 1),
    );
    assert_eq!(eof.get_phase(), Phase::Syntax);
}

#[test]
fn test_diagnostic_conversion() {
    let error = Error::new(
        ErrorImpl::VariableNotDeclared {
            variable: "foo".to_string(),
        },
        Position::new(4, 9),
    );

    let diagnostic = Diagnostic::from(&error);
    assert_eq!(
        diagnostic,
        Diagnostic {
            phase: Phase::Type,
            line: 4,
            column: Some(9),
            message: "variable \"foo\" not declared".to_string(),
        }
    );
}

#[test]
fn test_diagnostic_without_column() {
    let error = Error::new(
        ErrorImpl::ClassRedefined {
            class: "A".to_string(),
        },
        Position::null(),
    );

    assert_eq!(error.to_diagnostic().column, None);
}
