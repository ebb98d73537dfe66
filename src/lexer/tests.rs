//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Integer, string and boolean literals
//! - Operators and punctuation
//! - Comments
//! - Error cases

use super::{lexer::tokenize, tokens::TokenKind};
use crate::errors::errors::ErrorImpl;

fn kinds(source: &str) -> Vec<TokenKind> {
    let (tokens, errors) = tokenize(source);
    assert!(errors.is_empty(), "unexpected lexer errors: {:?}", errors);
    tokens.into_iter().map(|token| token.kind).collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "class inherits if then else fi while loop pool let in case of esac new isvoid not self";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Class,
            TokenKind::Inherits,
            TokenKind::If,
            TokenKind::Then,
            TokenKind::Else,
            TokenKind::Fi,
            TokenKind::While,
            TokenKind::Loop,
            TokenKind::Pool,
            TokenKind::Let,
            TokenKind::In,
            TokenKind::Case,
            TokenKind::Of,
            TokenKind::Esac,
            TokenKind::New,
            TokenKind::IsVoid,
            TokenKind::Not,
            TokenKind::SelfKw,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(
        kinds("cLaSs iNHERITS wHiLe"),
        vec![TokenKind::Class, TokenKind::Inherits, TokenKind::While, TokenKind::EOF]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let (tokens, _) = tokenize("foo Bar baz_123 SELF_TYPE classy");

    assert_eq!(tokens[0].kind, TokenKind::ObjectId);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].kind, TokenKind::TypeId);
    assert_eq!(tokens[1].value, "Bar");
    assert_eq!(tokens[2].kind, TokenKind::ObjectId);
    assert_eq!(tokens[2].value, "baz_123");
    assert_eq!(tokens[3].kind, TokenKind::TypeId);
    assert_eq!(tokens[3].value, "SELF_TYPE");
    assert_eq!(tokens[4].kind, TokenKind::ObjectId);
    assert_eq!(tokens[4].value, "classy");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_booleans() {
    let (tokens, _) = tokenize("true fAlSe True");

    assert_eq!(tokens[0].kind, TokenKind::Boolean);
    assert_eq!(tokens[0].value, "true");
    assert_eq!(tokens[1].kind, TokenKind::Boolean);
    assert_eq!(tokens[1].value, "false");
    // Upper-case initial makes it a type name.
    assert_eq!(tokens[2].kind, TokenKind::TypeId);
}

#[test]
fn test_tokenize_integers() {
    let (tokens, _) = tokenize("42 0 007");

    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "0");
    assert_eq!(tokens[2].value, "007");
    assert_eq!(tokens[3].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_strings() {
    let (tokens, errors) = tokenize(r#""hello" "two words" "tab\there" "quote\"d""#);

    assert!(errors.is_empty());
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "two words");
    assert_eq!(tokens[2].value, "tab\there");
    assert_eq!(tokens[3].value, "quote\"d");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_unterminated_string() {
    let (tokens, errors) = tokenize("\"abc\nx");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_impl(), &ErrorImpl::UnterminatedString);
    assert_eq!(tokens[0].kind, TokenKind::ObjectId);
    assert_eq!(tokens[0].span.start.line, 2);
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("<- <= => < = + - * / ~ @ . , : ; ( ) { }"),
        vec![
            TokenKind::Assignment,
            TokenKind::LessEquals,
            TokenKind::Arrow,
            TokenKind::Less,
            TokenKind::Equals,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Tilde,
            TokenKind::At,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_assignment_without_spaces() {
    assert_eq!(
        kinds("x<-1"),
        vec![TokenKind::ObjectId, TokenKind::Assignment, TokenKind::Integer, TokenKind::EOF]
    );
}

#[test]
fn test_comments_are_skipped() {
    let source = "a -- line comment\n(* block (* nested *) still comment *) b";

    assert_eq!(
        kinds(source),
        vec![TokenKind::ObjectId, TokenKind::ObjectId, TokenKind::EOF]
    );
}

#[test]
fn test_unterminated_comment() {
    let (tokens, errors) = tokenize("a (* never closed");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_impl(), &ErrorImpl::UnterminatedComment);
    assert_eq!(tokens.len(), 2);
}

#[test]
fn test_unmatched_comment_close() {
    let (_, errors) = tokenize("a *) b");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "UnrecognisedToken");
}

#[test]
fn test_unrecognised_character_is_skipped() {
    let (tokens, errors) = tokenize("a # b");

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].get_impl(),
        &ErrorImpl::UnrecognisedToken {
            token: "#".to_string()
        }
    );
    assert_eq!(errors[0].get_position().column, 3);
    assert_eq!(tokens.len(), 3);
}

#[test]
fn test_positions() {
    let (tokens, _) = tokenize("class A {\n  x : Int;\n};");

    assert_eq!(tokens[0].span.start.line, 1);
    assert_eq!(tokens[0].span.start.column, 1);
    assert_eq!(tokens[1].span.start.column, 7);
    let x = &tokens[3];
    assert_eq!(x.value, "x");
    assert_eq!(x.span.start.line, 2);
    assert_eq!(x.span.start.column, 3);
    assert_eq!(x.span.end.column, 4);
}
