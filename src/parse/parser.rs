use tracing::{debug, instrument};

use crate::ast::{Ast, MatrixValue, RESULT_DEF_NAME};
use crate::parse::combinator::{
    alternative, negative_lookahead, optional, predicate, sequence, zero_or_more,
};
use crate::parse::cursor::{Cursor, TokenCursor};
use crate::parse::error::{PResult, ParseError};
use crate::parse::precedence::{self, ChainItem};
use crate::parse::syntax::{DefNode, MatchNode, Node, NodeKind};
use crate::parse::token::{is_infix_operator, GroupKind, Token, TokenValue, RESERVED_WORDS};
use crate::position::{Span, Spanned};

fn token<'t, 'buf: 't>(
    expected: &'static str,
    f: impl Fn(&TokenValue<'buf>) -> bool,
) -> impl Fn(&mut TokenCursor<'t, 'buf>) -> PResult<&'t Token<'buf>> {
    predicate::<TokenCursor<'t, 'buf>, _>(expected, move |token: &&'t Token<'buf>| f(&token.value))
}

/// Consumes a bare identifier spelled `expected`.
fn word<'t, 'buf: 't>(
    expected: &'static str,
) -> impl Fn(&mut TokenCursor<'t, 'buf>) -> PResult<&'t Token<'buf>> {
    move |cursor| match cursor.peek() {
        Ok(token) if token.value.is_word(expected) => cursor.next(),

        _ => Err(ParseError::new(
            cursor.span(),
            format!("expected `{}`, found {}", expected, cursor.describe_next()),
        )),
    }
}

/// Consumes the infix symbol `expected`.
fn symbol<'t, 'buf: 't>(
    expected: &'static str,
) -> impl Fn(&mut TokenCursor<'t, 'buf>) -> PResult<&'t Token<'buf>> {
    move |cursor| match cursor.peek() {
        Ok(token) if token.value.is_infix(expected) => cursor.next(),

        _ => Err(ParseError::new(
            cursor.span(),
            format!("expected `{}`, found {}", expected, cursor.describe_next()),
        )),
    }
}

/// Skips whitespace that does not cross a line.
fn space(cursor: &mut TokenCursor<'_, '_>) -> PResult<()> {
    zero_or_more(token("whitespace", TokenValue::is_space))(cursor)?;

    Ok(())
}

fn whitespace(cursor: &mut TokenCursor<'_, '_>) -> PResult<()> {
    zero_or_more(token("whitespace", TokenValue::is_whitespace))(cursor)?;

    Ok(())
}

/// Whitespace that contains at least one line break.
fn line_break(cursor: &mut TokenCursor<'_, '_>) -> PResult<()> {
    space(cursor)?;
    token("a line break", TokenValue::is_break)(cursor)?;

    whitespace(cursor)
}

fn comma(cursor: &mut TokenCursor<'_, '_>) -> PResult<()> {
    whitespace(cursor)?;
    token("`,`", TokenValue::is_delim)(cursor)?;

    whitespace(cursor)
}

fn span_from(cursor: &TokenCursor<'_, '_>, start: Span) -> Span {
    Span::new(start.start, cursor.prev_end())
}

fn group_of<'t, 'buf>(
    cursor: &mut TokenCursor<'t, 'buf>,
    expected: &'static str,
    accepts: impl Fn(GroupKind) -> bool,
) -> PResult<TokenCursor<'t, 'buf>> {
    if let Ok(token) = cursor.peek() {
        if let TokenValue::Group { kind, tokens } = &token.value {
            if accepts(*kind) {
                cursor.next()?;

                return Ok(TokenCursor::new(tokens, token.span));
            }
        }
    }

    Err(ParseError::new(
        cursor.span(),
        format!("expected {}, found {}", expected, cursor.describe_next()),
    ))
}

fn parens<'t, 'buf>(cursor: &mut TokenCursor<'t, 'buf>) -> PResult<TokenCursor<'t, 'buf>> {
    group_of(cursor, "`(...)`", |kind| kind == GroupKind::Parens)
}

/// An indented or braced block, possibly preceded by spaces.
fn block<'t, 'buf>(cursor: &mut TokenCursor<'t, 'buf>) -> PResult<TokenCursor<'t, 'buf>> {
    space(cursor)?;

    group_of(cursor, "an indented block or `{...}`", |kind| {
        matches!(kind, GroupKind::Indent | GroupKind::Braces)
    })
}

/// Runs `parser` over the contents of a group, which must be consumed entirely.
fn within<'t, 'buf, T>(
    mut inner: TokenCursor<'t, 'buf>,
    parser: impl FnOnce(&mut TokenCursor<'t, 'buf>) -> PResult<T>,
) -> PResult<T> {
    let value = parser(&mut inner)?;

    if inner.is_eof() {
        Ok(value)
    } else {
        Err(inner.current_error(format!("unexpected {}", inner.describe_next())))
    }
}

/// Parses a comma-separated list. A trailing comma is allowed.
fn comma_list<'t, 'buf, T>(
    cursor: &mut TokenCursor<'t, 'buf>,
    item: impl Fn(&mut TokenCursor<'t, 'buf>) -> PResult<T>,
) -> PResult<Vec<T>> {
    let mut items = vec![];
    whitespace(cursor)?;

    while let Some(value) = optional(&item)(cursor)? {
        items.push(value);

        if optional(comma)(cursor)?.is_none() {
            break;
        }
    }

    whitespace(cursor)?;

    Ok(items)
}

#[instrument(level = "trace", skip_all, ret)]
fn name(cursor: &mut TokenCursor<'_, '_>) -> PResult<String> {
    match cursor.peek() {
        Ok(Token {
            value: TokenValue::Ident { name, raw },
            span,
        }) => {
            if !raw && RESERVED_WORDS.contains(&**name) {
                return Err(ParseError::new(
                    *span,
                    format!("`{}` is reserved and cannot be used as a name", name),
                ));
            }

            cursor.next()?;

            Ok(name.to_string())
        }

        _ => Err(ParseError::new(
            cursor.span(),
            format!("expected an identifier, found {}", cursor.describe_next()),
        )),
    }
}

fn parse_number(int: &str, frac: Option<&str>, span: Span) -> PResult<f64> {
    let value: f64 = format!("{}.{}", int, frac.unwrap_or("0"))
        .parse()
        .map_err(|e| ParseError::new(span, format!("invalid number literal: {}", e)))?;

    if !value.is_finite() {
        return Err(ParseError::new(span, "number literal out of range").into_fatal());
    }

    Ok(value)
}

#[instrument(level = "trace", skip_all, ret)]
fn literal(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    let span = cursor.span();

    let kind = match &cursor.peek()?.value {
        TokenValue::Null => NodeKind::Null,
        TokenValue::Bool(value) => NodeKind::Bool(*value),
        TokenValue::Number { int, frac } => NodeKind::Number(parse_number(int, *frac, span)?),
        TokenValue::String(value) => NodeKind::String(value.to_string()),

        _ => {
            return Err(ParseError::new(
                span,
                format!("expected a literal, found {}", cursor.describe_next()),
            ))
        }
    };

    cursor.next()?;

    Ok(Node::new(kind, span))
}

#[instrument(level = "trace", skip_all, ret)]
fn reference(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    let span = cursor.span();

    Ok(Node::new(NodeKind::Ref(name(cursor)?), span))
}

fn arguments(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<Node>> {
    let inner = parens(cursor)?;

    within(inner, |cursor| comma_list(cursor, expr))
}

/// A reference or a parenthesized expression, applied to any number of argument lists.
#[instrument(level = "trace", skip_all, ret)]
fn application(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    let start = cursor.span();
    let mut node = alternative((reference, parenthesized))(cursor)?;

    while let Some(((), args)) = optional(sequence((space, arguments)))(cursor)? {
        node = Node::new(
            NodeKind::Call {
                func: Box::new(node),
                args,
            },
            span_from(cursor, start),
        );
    }

    Ok(node)
}

#[instrument(level = "trace", skip_all, ret)]
fn parenthesized(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    let inner = parens(cursor)?;

    // the chain inside is already reduced, so an enclosing chain treats it as a single operand
    within(inner, |cursor| {
        whitespace(cursor)?;
        let node = expr(cursor)?;
        whitespace(cursor)?;

        Ok(node)
    })
}

#[instrument(level = "trace", skip_all, ret)]
fn list(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    let start = cursor.span();
    let inner = group_of(cursor, "`[...]`", |kind| kind == GroupKind::Brackets)?;
    let items = within(inner, |cursor| comma_list(cursor, expr))?;

    let kind = match items.iter().map(Node::matrix_value).collect::<Option<Vec<_>>>() {
        Some(values) => NodeKind::Matrix(MatrixValue::Array(values)),
        None => NodeKind::List(items),
    };

    Ok(Node::new(kind, span_from(cursor, start)))
}

fn wildcard_case(cursor: &mut TokenCursor<'_, '_>) -> PResult<MatchNode> {
    word("otherwise")(cursor)?;
    whitespace(cursor)?;

    Ok(MatchNode {
        cond: None,
        value: expr(cursor)?,
    })
}

fn conditional_case(cursor: &mut TokenCursor<'_, '_>) -> PResult<MatchNode> {
    let cond = negative_lookahead(word("otherwise"), expr)(cursor)?;
    whitespace(cursor)?;
    symbol("=>")(cursor)?;
    whitespace(cursor)?;

    Ok(MatchNode {
        cond: Some(cond),
        value: expr(cursor)?,
    })
}

fn case_separator(cursor: &mut TokenCursor<'_, '_>) -> PResult<()> {
    alternative((comma, line_break))(cursor)
}

#[instrument(level = "trace", skip_all)]
fn cases(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<MatchNode>> {
    let mut cases = vec![];
    whitespace(cursor)?;

    while !cursor.is_eof() {
        cases.push(alternative((wildcard_case, conditional_case))(cursor)?);

        if optional(case_separator)(cursor)?.is_none() {
            break;
        }
    }

    whitespace(cursor)?;

    Ok(cases)
}

fn switch_block(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<MatchNode>> {
    let inner = block(cursor)?;

    within(inner, cases)
}

/// `switch otherwise value` on a single line.
fn switch_inline(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<MatchNode>> {
    space(cursor)?;

    Ok(vec![wildcard_case(cursor)?])
}

#[instrument(level = "trace", skip_all, ret)]
fn switch(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    let start = cursor.span();
    word("switch")(cursor)?;
    let cases = alternative((switch_block, switch_inline))(cursor)?;

    Ok(Node::new(NodeKind::Switch(cases), span_from(cursor, start)))
}

#[instrument(level = "trace", skip_all, ret)]
fn primary(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    alternative((literal, switch, application, list))(cursor)
}

/// `-operand`, desugared into a subtraction from zero.
fn negation(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    let minus = symbol("-")(cursor)?;
    let operand = primary(cursor)?;

    Ok(Node::negation(minus.span, operand))
}

fn operand(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    alternative((negation, primary))(cursor)
}

fn operator(cursor: &mut TokenCursor<'_, '_>) -> PResult<Spanned<String>> {
    match cursor.peek() {
        Ok(Token {
            value: TokenValue::Infix(op),
            span,
        }) if is_infix_operator(op) => {
            let op = Spanned {
                value: op.to_string(),
                span: *span,
            };
            cursor.next()?;

            Ok(op)
        }

        _ => Err(ParseError::new(
            cursor.span(),
            format!("expected an infix operator, found {}", cursor.describe_next()),
        )),
    }
}

/// An infix chain. Operators of any spelling are accepted; precedence is sorted out afterwards.
///
/// A line may end after an operator but not before one.
#[instrument(level = "trace", skip_all, ret)]
fn chain(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    let first = operand(cursor)?;
    let rest = zero_or_more(sequence((space, operator, whitespace, operand)))(cursor)?;

    if rest.is_empty() {
        return Ok(first);
    }

    let mut items = vec![ChainItem::Operand(first)];

    for ((), op, (), operand) in rest {
        items.push(ChainItem::Operator(op));
        items.push(ChainItem::Operand(operand));
    }

    precedence::reduce(items)
}

fn single_param(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<String>> {
    Ok(vec![name(cursor)?])
}

fn param_list(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<String>> {
    let inner = parens(cursor)?;

    within(inner, |cursor| comma_list(cursor, name))
}

fn where_block(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<DefNode>> {
    let inner = block(cursor)?;

    within(inner, definitions)
}

fn where_inline(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<DefNode>> {
    space(cursor)?;

    Ok(vec![definition(cursor)?])
}

fn where_clause(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<DefNode>> {
    space(cursor)?;
    word("where")(cursor)?;

    alternative((where_block, where_inline))(cursor)
}

#[instrument(level = "trace", skip_all, ret)]
fn closure(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    let start = cursor.span();
    let params = alternative((single_param, param_list))(cursor)?;
    whitespace(cursor)?;
    symbol("->")(cursor)?;
    whitespace(cursor)?;

    let result = expr(cursor)?;
    let mut body = vec![DefNode {
        name: RESULT_DEF_NAME.to_owned(),
        span: result.span,
        expr: Some(result),
    }];

    if let Some(defs) = optional(where_clause)(cursor)? {
        body.extend(defs);
    }

    Ok(Node::new(
        NodeKind::FnDef { params, body },
        span_from(cursor, start),
    ))
}

#[instrument(level = "trace", skip_all, ret)]
fn expr(cursor: &mut TokenCursor<'_, '_>) -> PResult<Node> {
    alternative((closure, chain))(cursor)
}

#[instrument(level = "trace", skip_all, ret)]
fn definition(cursor: &mut TokenCursor<'_, '_>) -> PResult<DefNode> {
    let start = cursor.span();
    let name = name(cursor)?;
    whitespace(cursor)?;
    symbol("=")(cursor)?;
    whitespace(cursor)?;
    let expr = expr(cursor)?;

    Ok(DefNode {
        name,
        expr: Some(expr),
        span: span_from(cursor, start),
    })
}

/// Line-separated definitions, surrounded by optional whitespace.
fn definitions(cursor: &mut TokenCursor<'_, '_>) -> PResult<Vec<DefNode>> {
    let mut defs = vec![];
    whitespace(cursor)?;

    while let Some(def) = optional(definition)(cursor)? {
        defs.push(def);

        if optional(line_break)(cursor)?.is_none() {
            break;
        }
    }

    whitespace(cursor)?;

    Ok(defs)
}

/// Parses a token tree produced by [`lex`](crate::parse::lex). All tokens must be consumed.
#[instrument(level = "debug", skip_all)]
pub fn parse(tokens: &[Token<'_>]) -> PResult<Ast> {
    let span = match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => first.span.convex_hull(&last.span),
        _ => Span::default(),
    };

    let defs = within(TokenCursor::new(tokens, span), definitions)?;
    debug!(defs = defs.len(), "parsed the token tree");

    Ok(Ast::from_parsed(defs))
}
