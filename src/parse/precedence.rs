//! Operator precedence fixup.
//!
//! Infix chains are parsed into a flat list of alternating operands and operators, which is then
//! folded into nested binary calls one precedence tier at a time.

use itertools::Itertools;
use phf::phf_map;
use serde::Serialize;
use tracing::trace;

use crate::parse::error::{PResult, ParseError, ParseErrorKind};
use crate::parse::syntax::Node;
use crate::position::{Span, Spanned};

/// Operator binding strength, from the loosest to the tightest.
#[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Tier {
    /// Any operator missing from the table.
    Custom,
    Or,
    And,
    Equality,
    Comparison,
    BitOr,
    BitAnd,
    Shift,
    Additive,
    Multiplicative,
    Power,
}

impl Tier {
    pub const TIGHTEST_FIRST: [Tier; 11] = [
        Self::Power,
        Self::Multiplicative,
        Self::Additive,
        Self::Shift,
        Self::BitAnd,
        Self::BitOr,
        Self::Comparison,
        Self::Equality,
        Self::And,
        Self::Or,
        Self::Custom,
    ];

    /// The next tier binding tighter than this one.
    pub fn tighter(self) -> Option<Tier> {
        let idx = Self::TIGHTEST_FIRST.iter().position(|&tier| tier == self)?;

        idx.checked_sub(1).map(|idx| Self::TIGHTEST_FIRST[idx])
    }
}

static TIERS: phf::Map<&'static str, Tier> = phf_map! {
    "||" => Tier::Or,
    "&&" => Tier::And,
    "==" => Tier::Equality,
    "!=" => Tier::Equality,
    ">=" => Tier::Comparison,
    "<=" => Tier::Comparison,
    ">" => Tier::Comparison,
    "<" => Tier::Comparison,
    "|" => Tier::BitOr,
    "&" => Tier::BitAnd,
    "<<" => Tier::Shift,
    ">>" => Tier::Shift,
    "+" => Tier::Additive,
    "-" => Tier::Additive,
    "*" => Tier::Multiplicative,
    "/" => Tier::Multiplicative,
    "%" => Tier::Multiplicative,
    "^" => Tier::Power,
};

pub fn tier_of(op: &str) -> Tier {
    TIERS.get(op).copied().unwrap_or(Tier::Custom)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainItem {
    Operand(Node),
    Operator(Spanned<String>),
}

fn lonely_operator(op: Spanned<String>) -> ParseError {
    ParseError::with_kind(op.span, ParseErrorKind::LonelyOperator(op.value)).into_fatal()
}

/// Folds a flat `operand (operator operand)*` chain into a single node.
///
/// Within a tier, operators associate to the left.
pub fn reduce(mut items: Vec<ChainItem>) -> PResult<Node> {
    for tier in Tier::TIGHTEST_FIRST {
        let mut idx = 0;

        while idx < items.len() {
            let op = match &items[idx] {
                ChainItem::Operator(op) if tier_of(&op.value) == tier => op.clone(),

                _ => {
                    idx += 1;

                    continue;
                }
            };

            if idx == 0 || idx + 1 >= items.len() {
                return Err(lonely_operator(op));
            }

            // the folded node takes the place of the left operand, so `idx` points past it again
            let triple: Option<(ChainItem, ChainItem, ChainItem)> =
                items.drain(idx - 1..=idx + 1).collect_tuple();

            let folded = match triple {
                Some((ChainItem::Operand(lhs), ChainItem::Operator(op), ChainItem::Operand(rhs))) => {
                    trace!(op = %op.value, ?tier, "folding an infix operator");

                    Node::binary(op.value, op.span, lhs, rhs)
                }

                _ => return Err(lonely_operator(op)),
            };

            items.insert(idx - 1, ChainItem::Operand(folded));
        }
    }

    let remaining = items.len();

    match items.pop() {
        Some(ChainItem::Operand(node)) if remaining == 1 => Ok(node),

        last => {
            let span = match &last {
                Some(ChainItem::Operand(node)) => node.span,
                Some(ChainItem::Operator(op)) => op.span,
                None => Span::default(),
            };

            Err(ParseError::with_kind(span, ParseErrorKind::IncompleteReduction(remaining)).into_fatal())
        }
    }
}
