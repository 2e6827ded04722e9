// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Pest-based parser turning one cleaned line into an [`ast::Block`].
//!
//! The input must already be downcased with whitespace stripped outside
//! comments (see the session layer); comments arrive verbatim.

use itertools::Itertools;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::ast::{BinOp, Block, Call, Expr, Item, ParAssign, Word};
use crate::ast::Arg::*;
use crate::error::{Error, Result};

#[derive(Parser)]
#[grammar = "gcode.pest"]
pub struct GcodeParser;

/// Parse one cleaned line into a syntactic block.
///
/// `lineno` is the source line index, kept for diagnostics only.
pub fn parse_line(lineno: usize, line: &str) -> Result<Block> {
    let mut pairs = GcodeParser::parse(Rule::line, line).map_err(|_| classify_failure(line))?;
    let mut block = Block { lineno, ..Default::default() };
    for pair in pairs.next().expect("line rule").into_inner() {
        match pair.as_rule() {
            Rule::blockdel => block.blockdel = true,
            Rule::comment => block.items.push(Item::Comment(pair.as_str().into())),
            Rule::par_assign => {
                let (id, value) = pair.into_inner().collect_tuple().expect("two children");
                block.items.push(Item::ParAssign(ParAssign {
                    id: make_expr(id)?,
                    value: make_expr(value)?,
                }));
            }
            Rule::par_ref => {
                let (id,) = pair.into_inner().collect_tuple().expect("one child");
                block.items.push(Item::BareParam(make_expr(id)?));
            }
            Rule::word => {
                let (letter, value) = pair.into_inner().collect_tuple().expect("two children");
                block.items.push(Item::Word(make_word(letter.as_str(), make_expr(value)?)));
            }
            Rule::EOI => (),
            _ => unreachable!(),
        }
    }
    Ok(block)
}

/// The grammar cannot tell us which taxonomy entry a raw syntax failure
/// corresponds to; an unterminated bracket outside comments is the one case
/// worth distinguishing.
fn classify_failure(line: &str) -> Error {
    let mut depth = 0i32;
    let mut in_comment = false;
    for ch in line.chars() {
        match ch {
            '(' if !in_comment => in_comment = true,
            ')' if in_comment => in_comment = false,
            '[' if !in_comment => depth += 1,
            ']' if !in_comment => depth -= 1,
            _ => (),
        }
    }
    if depth > 0 {
        Error::UnclosedExpression
    } else {
        Error::BadCharacterUsed
    }
}

fn make_word(letter: &str, value: Expr) -> Word {
    match letter {
        "n" => Word::LineNumber(value),
        "g" => Word::Gcode(value),
        "m" => Word::Mcode(value),
        "f" => Word::Feed(value),
        "s" => Word::Spindle(value),
        "t" => Word::Tool(value),
        "a" => Word::Arg(AxisA, value),
        "b" => Word::Arg(AxisB, value),
        "c" => Word::Arg(AxisC, value),
        "x" => Word::Arg(AxisX, value),
        "y" => Word::Arg(AxisY, value),
        "z" => Word::Arg(AxisZ, value),
        "i" => Word::Arg(ArcI, value),
        "j" => Word::Arg(ArcJ, value),
        "k" => Word::Arg(ArcK, value),
        "d" => Word::Arg(ParamD, value),
        "h" => Word::Arg(ParamH, value),
        "l" => Word::Arg(ParamL, value),
        "p" => Word::Arg(ParamP, value),
        "q" => Word::Arg(ParamQ, value),
        "r" => Word::Arg(ParamR, value),
        _ => unreachable!(),
    }
}

fn make_expr(pair: Pair<Rule>) -> Result<Expr> {
    Ok(match pair.as_rule() {
        Rule::num => {
            Expr::Num(pair.as_str().parse().map_err(|_| Error::BadNumberFormat)?)
        }
        Rule::par_ref => {
            let (id,) = pair.into_inner().collect_tuple().expect("one child");
            Expr::Par(Box::new(make_expr(id)?))
        }
        Rule::atan_call => {
            let (argy, argx) = pair.into_inner().collect_tuple().expect("two children");
            Expr::Call(Call::Atan(Box::new(make_expr(argy)?), Box::new(make_expr(argx)?)))
        }
        Rule::fn_call => {
            let (name, arg) = pair.into_inner().collect_tuple().expect("two children");
            let arg = Box::new(make_expr(arg)?);
            Expr::Call(match name.as_str() {
                "abs" => Call::Abs(arg),
                "acos" => Call::Acos(arg),
                "asin" => Call::Asin(arg),
                "cos" => Call::Cos(arg),
                "exp" => Call::Exp(arg),
                "fix" => Call::Fix(arg),
                "fup" => Call::Fup(arg),
                "ln" => Call::Ln(arg),
                "round" => Call::Round(arg),
                "sin" => Call::Sin(arg),
                "sqrt" => Call::Sqrt(arg),
                "tan" => Call::Tan(arg),
                _ => unreachable!(),
            })
        }
        Rule::expr => {
            let mut inner = pair.into_inner();
            let first = make_expr(inner.next().expect("first operand"))?;
            let mut rest = Vec::new();
            while let Some(op) = inner.next() {
                let operand = inner.next().expect("operand after operator");
                rest.push((make_op(op.as_str()), make_expr(operand)?));
            }
            Expr::Chain(Box::new(first), rest)
        }
        _ => unreachable!(),
    })
}

fn make_op(token: &str) -> BinOp {
    match token {
        "**" => BinOp::Power,
        "*" => BinOp::Times,
        "/" => BinOp::DividedBy,
        "mod" => BinOp::Modulo,
        "+" => BinOp::Plus,
        "-" => BinOp::Minus,
        "and" => BinOp::And,
        "or" => BinOp::Or,
        "xor" => BinOp::Xor,
        _ => unreachable!(),
    }
}
