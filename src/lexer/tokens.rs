use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    /// Keywords, matched case-insensitively against lower-case-initial words.
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("class", TokenKind::Class);
        map.insert("inherits", TokenKind::Inherits);
        map.insert("if", TokenKind::If);
        map.insert("then", TokenKind::Then);
        map.insert("else", TokenKind::Else);
        map.insert("fi", TokenKind::Fi);
        map.insert("while", TokenKind::While);
        map.insert("loop", TokenKind::Loop);
        map.insert("pool", TokenKind::Pool);
        map.insert("let", TokenKind::Let);
        map.insert("in", TokenKind::In);
        map.insert("case", TokenKind::Case);
        map.insert("of", TokenKind::Of);
        map.insert("esac", TokenKind::Esac);
        map.insert("new", TokenKind::New);
        map.insert("isvoid", TokenKind::IsVoid);
        map.insert("not", TokenKind::Not);
        map.insert("self", TokenKind::SelfKw);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    TypeId,
    ObjectId,
    Integer,
    String,
    Boolean,

    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    Colon,
    Comma,
    Dot,
    Semicolon,
    At,

    Plus,
    Dash,
    Star,
    Slash,
    Tilde,
    Less,
    LessEquals,
    Equals,
    Assignment, // <-
    Arrow,      // =>

    // Reserved
    Class,
    Inherits,
    If,
    Then,
    Else,
    Fi,
    While,
    Loop,
    Pool,
    Let,
    In,
    Case,
    Of,
    Esac,
    New,
    IsVoid,
    Not,
    SelfKw,
}

impl TokenKind {
    /// How the token is written in source, used by "expected ..." messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::EOF => "end of input",
            TokenKind::TypeId => "a type name",
            TokenKind::ObjectId => "an identifier",
            TokenKind::Integer => "an integer",
            TokenKind::String => "a string",
            TokenKind::Boolean => "a boolean",
            TokenKind::OpenParen => "`(`",
            TokenKind::CloseParen => "`)`",
            TokenKind::OpenCurly => "`{`",
            TokenKind::CloseCurly => "`}`",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Semicolon => "`;`",
            TokenKind::At => "`@`",
            TokenKind::Plus => "`+`",
            TokenKind::Dash => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Tilde => "`~`",
            TokenKind::Less => "`<`",
            TokenKind::LessEquals => "`<=`",
            TokenKind::Equals => "`=`",
            TokenKind::Assignment => "`<-`",
            TokenKind::Arrow => "`=>`",
            TokenKind::Class => "`class`",
            TokenKind::Inherits => "`inherits`",
            TokenKind::If => "`if`",
            TokenKind::Then => "`then`",
            TokenKind::Else => "`else`",
            TokenKind::Fi => "`fi`",
            TokenKind::While => "`while`",
            TokenKind::Loop => "`loop`",
            TokenKind::Pool => "`pool`",
            TokenKind::Let => "`let`",
            TokenKind::In => "`in`",
            TokenKind::Case => "`case`",
            TokenKind::Of => "`of`",
            TokenKind::Esac => "`esac`",
            TokenKind::New => "`new`",
            TokenKind::IsVoid => "`isvoid`",
            TokenKind::Not => "`not`",
            TokenKind::SelfKw => "`self`",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

/// A pull-based supplier of tokens.
///
/// `None`, or a token of kind [`TokenKind::EOF`], marks the end of input.
pub trait TokenSource {
    fn next_token(&mut self) -> Option<Token>;
}

impl<I: Iterator<Item = Token>> TokenSource for I {
    fn next_token(&mut self) -> Option<Token> {
        self.next()
    }
}
