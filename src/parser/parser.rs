//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the `parse` entry point.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and hand-written functions for classes and features.
//!
//! It maintains lookup tables for:
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence
//!
//! Tokens are pulled from a [`TokenSource`] one at a time. The parser keeps a
//! single token of lookahead and tracks how many `{` are open, which error
//! recovery uses to find the end of the enclosing production.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::{
    ast::ast::Program,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind, TokenSource},
    Position, Span,
};

use super::{
    decl::parse_program,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
    },
};

/// Nesting of the delimiters error recovery skips over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Depth {
    pub braces: usize,
    pub parens: usize,
}

/// The main parser structure that maintains parsing state.
pub struct Parser<'a> {
    /// Where tokens come from
    source: Box<dyn TokenSource + 'a>,
    /// The token being looked at
    current: Token,
    /// Set once the source has produced its end-of-input marker
    exhausted: bool,
    /// End of the most recently consumed token
    previous_end: Position,
    /// Open `{` and `(` consumed and not yet closed
    depth: Depth,
    /// Open `(` count at each unclosed `{`, restored when it closes
    paren_marks: Vec<usize>,
    /// Diagnostics recorded so far
    errors: Vec<Error>,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
}

impl<'a> Parser<'a> {
    /// Creates a new Parser reading from `source`.
    ///
    /// The lookup tables start empty; see [`create_token_lookups`].
    pub fn new<S: TokenSource + 'a>(source: S) -> Self {
        let mut parser = Parser {
            source: Box::new(source),
            current: Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span::new(Position::new(1, 1), Position::new(1, 1)),
            },
            exhausted: false,
            previous_end: Position::new(1, 1),
            depth: Depth::default(),
            paren_marks: vec![],
            errors: vec![],
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        };
        parser.current = parser.pull();
        parser
    }

    fn pull(&mut self) -> Token {
        if !self.exhausted {
            match self.source.next_token() {
                Some(token) if token.kind != TokenKind::EOF => return token,
                Some(token) => {
                    self.exhausted = true;
                    return token;
                }
                None => self.exhausted = true,
            }
        }

        let end = if self.current.kind == TokenKind::EOF {
            self.current.span.start
        } else {
            self.current.span.end
        };
        Token {
            kind: TokenKind::EOF,
            value: String::from("EOF"),
            span: Span::new(end, end),
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> Token {
        let next = self.pull();
        let previous = std::mem::replace(&mut self.current, next);

        match previous.kind {
            TokenKind::OpenCurly => {
                self.paren_marks.push(self.depth.parens);
                self.depth.braces += 1;
            }
            TokenKind::CloseCurly => {
                self.depth.braces = self.depth.braces.saturating_sub(1);
                if let Some(parens) = self.paren_marks.pop() {
                    self.depth.parens = parens;
                }
            }
            TokenKind::OpenParen => self.depth.parens += 1,
            TokenKind::CloseParen => self.depth.parens = self.depth.parens.saturating_sub(1),
            _ => {}
        }
        self.previous_end = previous.span.end;
        previous
    }

    /// Builds the diagnostic for finding the current token where `expected`
    /// should be.
    pub fn unexpected(&self, expected: &str) -> Error {
        let token = self.current_token();
        if token.kind == TokenKind::EOF {
            Error::new(
                ErrorImpl::UnexpectedEndOfInput {
                    expected: expected.to_string(),
                },
                token.span.start,
            )
        } else {
            Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value.clone(),
                    expected: expected.to_string(),
                },
                token.span.start,
            )
        }
    }

    /// Expects a token of the specified kind.
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise returns an Error.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        if self.current_token_kind() == expected_kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected_kind.describe()))
        }
    }

    /// Consumes the current token if it is of kind `kind`.
    pub fn accept(&mut self, kind: TokenKind) -> bool {
        if self.current_token_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `binding_power` - The precedence/binding power for this operator
    /// * `led_fn` - The handler function for this infix operator
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Prefix tokens get no binding power, so one never continues an
    /// expression that is already complete.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Returns the position of the current token.
    pub fn get_position(&self) -> Position {
        self.current.span.start
    }

    /// Returns the end of the last consumed token.
    pub fn previous_end(&self) -> Position {
        self.previous_end
    }

    /// A span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.previous_end)
    }

    /// Currently open braces and parentheses.
    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Forgets unclosed braces and parentheses. Called at each `class`
    /// keyword, which can only appear at the top level.
    pub fn reset_depth(&mut self) {
        self.depth = Depth::default();
        self.paren_marks.clear();
    }

    /// Records a diagnostic and keeps going.
    ///
    /// An error at the same position as the last one is the same problem
    /// seen again by an enclosing production, and is dropped.
    pub fn record(&mut self, error: Error) {
        if let Some(last) = self.errors.last() {
            if last.get_position() == error.get_position() {
                return;
            }
        }
        self.errors.push(error);
    }

    /// Discards tokens up to the terminator of a production that started at
    /// `depth`.
    ///
    /// Stops after a `;` with no brace or parenthesis left open since then,
    /// or before the `}` closing the production's braces. A `}` also closes
    /// any parentheses left open inside it. A `class` keyword or the end of
    /// input always stops recovery.
    pub fn synchronize(&mut self, depth: Depth) {
        loop {
            match self.current_token_kind() {
                TokenKind::EOF | TokenKind::Class => return,
                TokenKind::Semicolon
                    if self.depth.braces <= depth.braces && self.depth.parens <= depth.parens =>
                {
                    self.advance();
                    return;
                }
                TokenKind::CloseCurly if depth.braces > 0 && self.depth.braces <= depth.braces => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

/// Parses a stream of tokens into a [`Program`].
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes the lookup tables and parses classes until the end of input.
/// Syntax errors are accumulated; if there were any, all of them are returned
/// instead of the program.
#[instrument(skip_all)]
pub fn parse<S: TokenSource>(source: S) -> Result<Program, Vec<Error>> {
    let mut parser = Parser::new(source);
    create_token_lookups(&mut parser);

    let program = parse_program(&mut parser);

    if parser.errors.is_empty() {
        debug!("parsed {} classes", program.classes.len());
        Ok(program)
    } else {
        debug!("parsing failed with {} errors", parser.errors.len());
        Err(parser.errors)
    }
}
