use crate::{
    ast::expressions::{ArithmeticOp, CaseArm, ComparisonOp, Expr, ExprKind, LetBinding},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser<'_>, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(handler) => *handler,
        None => return Err(parser.unexpected("an expression")),
    };

    let mut left = nud(parser)?;

    // While the next operator binds tighter than `bp`, keep extending lhs
    loop {
        let token_kind = parser.current_token_kind();
        let (next_bp, led) = match (
            parser.get_bp_lookup().get(&token_kind),
            parser.get_led_lookup().get(&token_kind),
        ) {
            (Some(next_bp), Some(led)) if *next_bp > bp => (*next_bp, *led),
            _ => break,
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

/// Accepts an object identifier, or `self` so that binding it can be
/// reported by the semantic phases with a clearer message.
pub fn parse_binding_name(parser: &mut Parser<'_>) -> Result<Token, Error> {
    match parser.current_token_kind() {
        TokenKind::ObjectId | TokenKind::SelfKw => Ok(parser.advance()),
        _ => Err(parser.unexpected(TokenKind::ObjectId.describe())),
    }
}

pub fn parse_arguments(parser: &mut Parser<'_>) -> Result<Vec<Expr>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut args = vec![];
    if parser.accept(TokenKind::CloseParen) {
        return Ok(args);
    }

    loop {
        args.push(parse_expr(parser, BindingPower::Default)?);

        if parser.accept(TokenKind::Comma) {
            continue;
        }
        if parser.accept(TokenKind::CloseParen) {
            return Ok(args);
        }
        return Err(parser.unexpected("`,` or `)`"));
    }
}

pub fn parse_primary_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let token = parser.advance();

    let kind = match token.kind {
        TokenKind::Integer => match token.value.parse::<i32>() {
            Ok(value) => ExprKind::Integer(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::String => ExprKind::Str(token.value),
        TokenKind::Boolean => ExprKind::Boolean(token.value == "true"),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value,
                    expected: String::from("a literal"),
                },
                token.span.start,
            ))
        }
    };

    Ok(Expr::new(kind, token.span))
}

fn parse_assignment_rhs(parser: &mut Parser<'_>, name: Token) -> Result<Expr, Error> {
    parser.expect(TokenKind::Assignment)?;
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(Expr::new(
        ExprKind::Assign {
            name: name.value,
            value: Box::new(value),
        },
        parser.span_from(name.span.start),
    ))
}

pub fn parse_self_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let token = parser.advance();

    if parser.current_token_kind() == TokenKind::Assignment {
        return parse_assignment_rhs(parser, token);
    }

    Ok(Expr::new(ExprKind::SelfRef, token.span))
}

/// `x`, `x <- e` or the implicit self-dispatch `m(args)`.
pub fn parse_identifier_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let token = parser.advance();

    match parser.current_token_kind() {
        TokenKind::Assignment => parse_assignment_rhs(parser, token),
        TokenKind::OpenParen => {
            let args = parse_arguments(parser)?;
            Ok(Expr::new(
                ExprKind::Dispatch {
                    receiver: Box::new(Expr::new(ExprKind::SelfRef, token.span)),
                    method: token.value,
                    args,
                },
                parser.span_from(token.span.start),
            ))
        }
        _ => Ok(Expr::new(ExprKind::Identifier(token.value), token.span)),
    }
}

pub fn parse_arithmetic_expr(
    parser: &mut Parser<'_>,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, Error> {
    let start = left.span.start;
    let operator_token = parser.advance();
    let op = match operator_token.kind {
        TokenKind::Plus => ArithmeticOp::Add,
        TokenKind::Dash => ArithmeticOp::Subtract,
        TokenKind::Star => ArithmeticOp::Multiply,
        _ => ArithmeticOp::Divide,
    };

    let right = parse_expr(parser, bp)?;

    Ok(Expr::new(
        ExprKind::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        parser.span_from(start),
    ))
}

pub fn parse_comparison_expr(
    parser: &mut Parser<'_>,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, Error> {
    let start = left.span.start;
    let operator_token = parser.advance();
    let op = match operator_token.kind {
        TokenKind::Less => ComparisonOp::Less,
        TokenKind::LessEquals => ComparisonOp::LessEquals,
        _ => ComparisonOp::Equals,
    };

    // Comparisons are non-associative. Report and keep parsing.
    if matches!(left.kind, ExprKind::Comparison { .. }) {
        parser.record(Error::new(
            ErrorImpl::ChainedComparison {
                operator: operator_token.value.clone(),
            },
            operator_token.span.start,
        ));
    }

    let right = parse_expr(parser, bp)?;

    Ok(Expr::new(
        ExprKind::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        parser.span_from(start),
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let bp = match operator_token.kind {
        TokenKind::Tilde => BindingPower::Complement,
        TokenKind::IsVoid => BindingPower::IsVoid,
        _ => BindingPower::Not,
    };

    let operand = Box::new(parse_expr(parser, bp)?);
    let kind = match operator_token.kind {
        TokenKind::Tilde => ExprKind::Complement(operand),
        TokenKind::IsVoid => ExprKind::IsVoid(operand),
        _ => ExprKind::Not(operand),
    };

    Ok(Expr::new(kind, parser.span_from(operator_token.span.start)))
}

pub fn parse_grouping_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::new(ExprKind::Paren(Box::new(expr)), parser.span_from(start)))
}

/// `{ e1; e2; ... }`. A broken statement is reported and skipped up to its
/// `;`, so the rest of the block is still checked for errors.
pub fn parse_block_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    let depth = parser.depth();

    let mut body = vec![];
    loop {
        let statement = parse_expr(parser, BindingPower::Default).and_then(|expr| {
            parser.expect(TokenKind::Semicolon)?;
            Ok(expr)
        });

        match statement {
            Ok(expr) => body.push(expr),
            Err(error) => {
                parser.record(error);
                parser.synchronize(depth);
            }
        }

        if matches!(
            parser.current_token_kind(),
            TokenKind::CloseCurly | TokenKind::EOF | TokenKind::Class
        ) {
            break;
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::new(ExprKind::Block(body), parser.span_from(start)))
}

pub fn parse_new_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    let type_name = parser.expect(TokenKind::TypeId)?.value;

    Ok(Expr::new(ExprKind::New(type_name), parser.span_from(start)))
}

pub fn parse_if_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let predicate = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Then)?;
    let then_branch = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Else)?;
    let else_branch = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Fi)?;

    Ok(Expr::new(
        ExprKind::If {
            predicate: Box::new(predicate),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        },
        parser.span_from(start),
    ))
}

pub fn parse_while_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let predicate = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Loop)?;
    let body = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Pool)?;

    Ok(Expr::new(
        ExprKind::While {
            predicate: Box::new(predicate),
            body: Box::new(body),
        },
        parser.span_from(start),
    ))
}

/// `let b1, b2, ... in body`, desugared into one `Let` node per binding.
/// The body extends as far to the right as possible.
pub fn parse_let_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let mut bindings = vec![];
    loop {
        let name = parse_binding_name(parser)?;
        parser.expect(TokenKind::Colon)?;
        let type_name = parser.expect(TokenKind::TypeId)?.value;
        let init = if parser.accept(TokenKind::Assignment) {
            Some(Box::new(parse_expr(parser, BindingPower::Default)?))
        } else {
            None
        };

        bindings.push(LetBinding {
            name: name.value,
            type_name,
            init,
            span: parser.span_from(name.span.start),
        });

        if !parser.accept(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::In)?;
    let body = parse_expr(parser, BindingPower::Default)?;
    let end = parser.previous_end();

    // The first binding's node starts at `let`, the others at their name.
    let nested = bindings
        .into_iter()
        .enumerate()
        .rev()
        .fold(body, |body, (index, binding)| {
            let binding_start = if index == 0 { start } else { binding.span.start };
            Expr::new(
                ExprKind::Let {
                    binding,
                    body: Box::new(body),
                },
                Span::new(binding_start, end),
            )
        });

    Ok(nested)
}

pub fn parse_case_expr(parser: &mut Parser<'_>) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    let scrutinee = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Of)?;

    let mut arms = vec![];
    loop {
        let name = parse_binding_name(parser)?;
        parser.expect(TokenKind::Colon)?;
        let type_name = parser.expect(TokenKind::TypeId)?.value;
        parser.expect(TokenKind::Arrow)?;
        let body = parse_expr(parser, BindingPower::Default)?;
        parser.expect(TokenKind::Semicolon)?;

        arms.push(CaseArm {
            name: name.value,
            type_name,
            body,
            span: parser.span_from(name.span.start),
        });

        if parser.current_token_kind() == TokenKind::Esac {
            break;
        }
    }
    parser.expect(TokenKind::Esac)?;

    Ok(Expr::new(
        ExprKind::Case {
            scrutinee: Box::new(scrutinee),
            arms,
        },
        parser.span_from(start),
    ))
}

pub fn parse_dispatch_expr(
    parser: &mut Parser<'_>,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    let start = left.span.start;
    parser.advance();

    let method = parser.expect(TokenKind::ObjectId)?.value;
    let args = parse_arguments(parser)?;

    Ok(Expr::new(
        ExprKind::Dispatch {
            receiver: Box::new(left),
            method,
            args,
        },
        parser.span_from(start),
    ))
}

pub fn parse_static_dispatch_expr(
    parser: &mut Parser<'_>,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    let start = left.span.start;
    parser.advance();

    let type_name = parser.expect(TokenKind::TypeId)?.value;
    parser.expect(TokenKind::Dot)?;
    let method = parser.expect(TokenKind::ObjectId)?.value;
    let args = parse_arguments(parser)?;

    Ok(Expr::new(
        ExprKind::StaticDispatch {
            receiver: Box::new(left),
            type_name,
            method,
            args,
        },
        parser.span_from(start),
    ))
}
