use std::collections::HashMap;

use crate::{ast::expressions::Expr, errors::errors::Error, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser};

/// Operator precedence, loosest first.
///
/// Assignment is the loosest construct of all; it is recognised by the
/// identifier handler, so it needs no entry here.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Not,
    Relational,
    Additive,
    Multiplicative,
    IsVoid,
    Complement,
    At,
    Dot,
}

pub type NUDHandler = fn(&mut Parser<'_>) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser<'_>, Expr, BindingPower) -> Result<Expr, Error>;

pub fn create_token_lookups(parser: &mut Parser<'_>) {
    // Relational
    parser.led(TokenKind::Less, BindingPower::Relational, parse_comparison_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Relational, parse_comparison_expr);
    parser.led(TokenKind::Equals, BindingPower::Relational, parse_comparison_expr);

    // Additive and multiplicative
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_arithmetic_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_arithmetic_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_arithmetic_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_arithmetic_expr);

    // Dispatch
    parser.led(TokenKind::At, BindingPower::At, parse_static_dispatch_expr);
    parser.led(TokenKind::Dot, BindingPower::Dot, parse_dispatch_expr);

    // Literals and symbols
    parser.nud(TokenKind::Integer, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::Boolean, parse_primary_expr);
    parser.nud(TokenKind::SelfKw, parse_self_expr);
    parser.nud(TokenKind::ObjectId, parse_identifier_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::OpenCurly, parse_block_expr);
    parser.nud(TokenKind::New, parse_new_expr);

    // Prefix operators
    parser.nud(TokenKind::Tilde, parse_prefix_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::IsVoid, parse_prefix_expr);

    // Keyword expressions
    parser.nud(TokenKind::If, parse_if_expr);
    parser.nud(TokenKind::While, parse_while_expr);
    parser.nud(TokenKind::Let, parse_let_expr);
    parser.nud(TokenKind::Case, parse_case_expr);
}

// Lookup tables inside parser struct, so it's easier
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
