use crate::{
    ast::ast::{Attribute, Class, Feature, Formal, Method, Program},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    expr::parse_binding_name,
    parser::{Depth, Parser},
};

/// `program := (class ';')+`
///
/// A class that fails to parse is reported, skipped up to its terminating
/// `;` (or the next `class`), and parsing resumes.
pub fn parse_program(parser: &mut Parser<'_>) -> Program {
    let mut classes = vec![];

    if !parser.has_tokens() {
        let error = parser.unexpected(TokenKind::Class.describe());
        parser.record(error);
    }

    while parser.has_tokens() {
        match parse_class(parser) {
            Ok(class) => classes.push(class),
            Err(error) => {
                parser.record(error);
                parser.synchronize(Depth::default());
            }
        }
    }

    Program::new(classes)
}

pub fn parse_class(parser: &mut Parser<'_>) -> Result<Class, Error> {
    let start = parser.expect(TokenKind::Class)?.span.start;
    parser.reset_depth();

    let name = parser.expect(TokenKind::TypeId)?.value;
    let parent = if parser.accept(TokenKind::Inherits) {
        Some(parser.expect(TokenKind::TypeId)?.value)
    } else {
        None
    };

    parser.expect(TokenKind::OpenCurly)?;
    let depth = parser.depth();

    let mut features = vec![];
    while !matches!(
        parser.current_token_kind(),
        TokenKind::CloseCurly | TokenKind::EOF | TokenKind::Class
    ) {
        let feature = parse_feature(parser).and_then(|feature| {
            parser.expect(TokenKind::Semicolon)?;
            Ok(feature)
        });

        match feature {
            Ok(feature) => features.push(feature),
            Err(error) => {
                parser.record(error);
                parser.synchronize(depth);
            }
        }
    }

    parser.expect(TokenKind::CloseCurly)?;
    let span = parser.span_from(start);
    parser.expect(TokenKind::Semicolon)?;

    Ok(Class::new(name, parent, features, span))
}

pub fn parse_feature(parser: &mut Parser<'_>) -> Result<Feature, Error> {
    let name = parse_binding_name(parser)?;
    let start = name.span.start;

    match parser.current_token_kind() {
        TokenKind::OpenParen if name.kind == TokenKind::SelfKw => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: name.value,
                expected: String::from(TokenKind::ObjectId.describe()),
            },
            start,
        )),
        TokenKind::OpenParen => {
            parser.advance();
            let formals = parse_formals(parser)?;

            parser.expect(TokenKind::Colon)?;
            let return_type = parser.expect(TokenKind::TypeId)?.value;

            parser.expect(TokenKind::OpenCurly)?;
            let body = parse_expr(parser, BindingPower::Default)?;
            parser.expect(TokenKind::CloseCurly)?;

            Ok(Feature::Method(Method {
                name: name.value,
                formals,
                return_type,
                body,
                span: parser.span_from(start),
            }))
        }
        TokenKind::Colon => {
            parser.advance();
            let type_name = parser.expect(TokenKind::TypeId)?.value;
            let init = if parser.accept(TokenKind::Assignment) {
                Some(parse_expr(parser, BindingPower::Default)?)
            } else {
                None
            };

            Ok(Feature::Attribute(Attribute {
                name: name.value,
                type_name,
                init,
                span: parser.span_from(start),
            }))
        }
        _ => Err(parser.unexpected("`(` or `:`")),
    }
}

/// Formal parameters after the opening `(`, up to and including `)`.
fn parse_formals(parser: &mut Parser<'_>) -> Result<Vec<Formal>, Error> {
    let mut formals = vec![];
    if parser.accept(TokenKind::CloseParen) {
        return Ok(formals);
    }

    loop {
        let name = parse_binding_name(parser)?;
        parser.expect(TokenKind::Colon)?;
        let type_name = parser.expect(TokenKind::TypeId)?.value;

        formals.push(Formal {
            name: name.value,
            type_name,
            span: parser.span_from(name.span.start),
        });

        if parser.accept(TokenKind::Comma) {
            continue;
        }
        if parser.accept(TokenKind::CloseParen) {
            return Ok(formals);
        }
        return Err(parser.unexpected("`,` or `)`"));
    }
}
