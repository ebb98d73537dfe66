use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Order matters: longer operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^\s+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^--[^\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^\(\*").unwrap(), handler: comment_handler },
        RegexPattern { regex: Regex::new(r"^\*\)").unwrap(), handler: unmatched_comment_handler },
        RegexPattern { regex: Regex::new(r"^[0-9]+").unwrap(), handler: integer_handler },
        RegexPattern { regex: Regex::new("^\"").unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new(r"^[A-Z][A-Za-z0-9_]*").unwrap(), handler: type_handler },
        RegexPattern { regex: Regex::new(r"^[a-z][A-Za-z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new(r"^<-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "<-") },
        RegexPattern { regex: Regex::new(r"^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new(r"^=>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Arrow, "=>") },
        RegexPattern { regex: Regex::new(r"^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new(r"^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "=") },
        RegexPattern { regex: Regex::new(r"^\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new(r"^\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new(r"^\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
        RegexPattern { regex: Regex::new(r"^\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
        RegexPattern { regex: Regex::new(r"^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new(r"^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new(r"^\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dot, ".") },
        RegexPattern { regex: Regex::new(r"^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new(r"^@").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::At, "@") },
        RegexPattern { regex: Regex::new(r"^\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new(r"^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new(r"^\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new(r"^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new(r"^~").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~") },
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    errors: Vec<Error>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    pub fn new(source: String) -> Lexer {
        Lexer {
            tokens: vec![],
            errors: vec![],
            source,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Moves past `n` bytes of source, tracking lines and columns.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for c in self.source[self.pos..end].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn error(&mut self, error: ErrorImpl, position: Position) {
        self.errors.push(Error::new(error, position));
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }
}

fn matched_len(lexer: &Lexer, regex: &Regex) -> usize {
    regex.find(lexer.remainder()).map_or(0, |m| m.end())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = matched_len(lexer, regex);
    lexer.advance_n(len);
}

fn comment_handler(lexer: &mut Lexer, _regex: &Regex) {
    let start = lexer.position();
    lexer.advance_n(2);

    let mut depth = 1;
    while depth > 0 {
        let rest = lexer.remainder();
        if rest.is_empty() {
            lexer.error(ErrorImpl::UnterminatedComment, start);
            return;
        }

        if rest.starts_with("(*") {
            depth += 1;
            lexer.advance_n(2);
        } else if rest.starts_with("*)") {
            depth -= 1;
            lexer.advance_n(2);
        } else {
            let width = rest.chars().next().map_or(1, char::len_utf8);
            lexer.advance_n(width);
        }
    }
}

fn unmatched_comment_handler(lexer: &mut Lexer, _regex: &Regex) {
    let start = lexer.position();
    lexer.error(
        ErrorImpl::UnrecognisedToken {
            token: String::from("*)"),
        },
        start,
    );
    lexer.advance_n(2);
}

fn integer_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = matched_len(lexer, regex);
    let value = lexer.remainder()[..len].to_string();
    let start = lexer.position();
    lexer.advance_n(len);
    let end = lexer.position();

    lexer.push(MK_TOKEN!(TokenKind::Integer, value, Span { start, end }));
}

/// Scans a string literal body starting after the opening quote.
///
/// Returns the number of bytes consumed (quotes included), the unescaped
/// value, and whether the closing quote was found. An unescaped newline ends
/// the literal without consuming the newline.
fn scan_string(rest: &str) -> (usize, String, bool) {
    let mut value = String::new();
    let mut chars = rest.char_indices().skip(1);

    while let Some((index, ch)) = chars.next() {
        match ch {
            '"' => return (index + 1, value, true),
            '\n' => return (index, value, false),
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, 'b')) => value.push('\u{8}'),
                Some((_, 'f')) => value.push('\u{c}'),
                Some((_, escaped)) => value.push(escaped),
                None => return (rest.len(), value, false),
            },
            _ => value.push(ch),
        }
    }

    (rest.len(), value, false)
}

fn string_handler(lexer: &mut Lexer, _regex: &Regex) {
    let start = lexer.position();
    let (consumed, value, terminated) = scan_string(lexer.remainder());
    lexer.advance_n(consumed);

    if terminated {
        let end = lexer.position();
        lexer.push(MK_TOKEN!(TokenKind::String, value, Span { start, end }));
    } else {
        lexer.error(ErrorImpl::UnterminatedString, start);
    }
}

fn type_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = matched_len(lexer, regex);
    let value = lexer.remainder()[..len].to_string();
    let start = lexer.position();
    lexer.advance_n(len);
    let end = lexer.position();

    lexer.push(MK_TOKEN!(TokenKind::TypeId, value, Span { start, end }));
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = matched_len(lexer, regex);
    let value = lexer.remainder()[..len].to_string();
    let lowered = value.to_ascii_lowercase();
    let start = lexer.position();
    lexer.advance_n(len);
    let span = Span {
        start,
        end: lexer.position(),
    };

    if lowered == "true" || lowered == "false" {
        lexer.push(MK_TOKEN!(TokenKind::Boolean, lowered, span));
    } else if let Some(kind) = RESERVED_LOOKUP.get(lowered.as_str()) {
        lexer.push(MK_TOKEN!(*kind, value, span));
    } else {
        lexer.push(MK_TOKEN!(TokenKind::ObjectId, value, span));
    }
}

/// Splits `source` into tokens, ending with an [`TokenKind::EOF`] token.
///
/// Unrecognised characters are reported and skipped, so the token stream is
/// always usable by the parser.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Error>) {
    let mut lex = Lexer::new(source.to_string());

    while !lex.at_eof() {
        let mut matched = false;

        for pattern in PATTERNS.iter() {
            if pattern.regex.is_match(lex.remainder()) {
                (pattern.handler)(&mut lex, &pattern.regex);
                matched = true;
                break;
            }
        }

        if !matched {
            let ch = lex.remainder().chars().next().unwrap_or('\0');
            let position = lex.position();
            lex.error(ErrorImpl::UnrecognisedToken { token: ch.to_string() }, position);
            lex.advance_n(ch.len_utf8());
        }
    }

    let end = lex.position();
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), Span { start: end, end }));
    (lex.tokens, lex.errors)
}
