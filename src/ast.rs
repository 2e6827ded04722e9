// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Data types to represent one parsed block (line) of RS274/NGC code.
//!
//! The block here is purely syntactic: word values and parameter indices
//! are unevaluated expressions.  Evaluation against the parameter table
//! happens when the runtime [`crate::block::Block`] is built.

use std::fmt::{self, Display, Formatter};

/// A parsed block.  Items keep their source order, which matters for line
/// numbers (first item only) and for deciding which comment survives.
#[derive(Debug, Default)]
pub struct Block {
    /// Source line index of the block, for diagnostics.
    pub lineno: usize,
    /// True if the line was "block deleted", i.e. starts with a slash.
    pub blockdel: bool,
    /// Words, assignments and comments in source order.
    pub items: Vec<Item>,
}

#[derive(Debug)]
pub enum Item {
    Word(Word),
    ParAssign(ParAssign),
    Comment(String),
    /// A `#value` with no following `=`; always an error, but recognized
    /// here so it can be reported precisely.
    BareParam(Expr),
}

/// A G-code "word", i.e. indication letter and value.
///
/// The value can be a complex expression introduced in brackets, even for
/// `G` and `M` words.
#[derive(Debug)]
pub enum Word {
    LineNumber(Expr),
    Gcode(Expr),
    Mcode(Expr),
    Feed(Expr),
    Spindle(Expr),
    Tool(Expr),
    Arg(Arg, Expr),
}

/// A parameter assignment, `#id=value`.
#[derive(Debug)]
pub struct ParAssign {
    pub id: Expr,
    pub value: Expr,
}

/// The possible argument words (all words except N, G, M, F, S, T).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    // axis words
    AxisA,
    AxisB,
    AxisC,
    AxisX,
    AxisY,
    AxisZ,
    // arc parameters
    ArcI,
    ArcJ,
    ArcK,
    // variable meaning params
    ParamD,
    ParamH,
    ParamL,
    ParamP,
    ParamQ,
    ParamR,
}

/// A G-code expression.
///
/// Bracketed expressions are kept as a flat operator chain; operator
/// precedence is applied by the evaluator, not the parser, so that the
/// classic two-stack reduction (with its shared plus-like/logical level)
/// stays in one place.
#[derive(Debug)]
pub enum Expr {
    /// A plain number.  G-code knows only floating-point numbers; places
    /// that require integers check for near-integral values at evaluation
    /// time.
    Num(f64),
    /// A parameter reference, `#expr`.
    Par(Box<Expr>),
    /// A unary function call.
    Call(Call),
    /// A bracketed expression: first operand, then (operator, operand)
    /// pairs in source order.
    Chain(Box<Expr>, Vec<(BinOp, Expr)>),
}

/// The binary operators known to G-code.
///
/// For Boolean inputs, all nonzero numbers are true.  Boolean results are
/// represented as 0.0 and 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Power,
    Times,
    DividedBy,
    Modulo,
    Plus,
    Minus,
    And,
    Or,
    Xor,
}

/// A unary function call, with all functions known to G-code.
///
/// All angle measures in arguments and results are in degrees.
#[derive(Debug)]
pub enum Call {
    Abs(Box<Expr>),
    Acos(Box<Expr>),
    Asin(Box<Expr>),
    Atan(Box<Expr>, Box<Expr>),
    Cos(Box<Expr>),
    Exp(Box<Expr>),
    Fix(Box<Expr>),
    Fup(Box<Expr>),
    Ln(Box<Expr>),
    Round(Box<Expr>),
    Sin(Box<Expr>),
    Sqrt(Box<Expr>),
    Tan(Box<Expr>),
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.blockdel {
            f.write_str("/")?;
        }
        for (n, item) in self.items.iter().enumerate() {
            if n > 0 {
                f.write_str(" ")?;
            }
            Display::fmt(item, f)?;
        }
        Ok(())
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Item::Word(word) => Display::fmt(word, f),
            Item::ParAssign(ass) => Display::fmt(ass, f),
            Item::Comment(text) => f.write_str(text),
            Item::BareParam(id) => write!(f, "#{}", id),
        }
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Word::LineNumber(n) => { f.write_str("n")?; Display::fmt(n, f) }
            Word::Gcode(n)      => { f.write_str("g")?; Display::fmt(n, f) }
            Word::Mcode(n)      => { f.write_str("m")?; Display::fmt(n, f) }
            Word::Feed(n)       => { f.write_str("f")?; Display::fmt(n, f) }
            Word::Spindle(n)    => { f.write_str("s")?; Display::fmt(n, f) }
            Word::Tool(n)       => { f.write_str("t")?; Display::fmt(n, f) }
            Word::Arg(a, n)     => { Display::fmt(a, f)?; Display::fmt(n, f) }
        }
    }
}

impl Display for ParAssign {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}={}", self.id, self.value)
    }
}

impl Display for Arg {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Arg::AxisA => "a",
            Arg::AxisB => "b",
            Arg::AxisC => "c",
            Arg::AxisX => "x",
            Arg::AxisY => "y",
            Arg::AxisZ => "z",
            Arg::ArcI => "i",
            Arg::ArcJ => "j",
            Arg::ArcK => "k",
            Arg::ParamD => "d",
            Arg::ParamH => "h",
            Arg::ParamL => "l",
            Arg::ParamP => "p",
            Arg::ParamQ => "q",
            Arg::ParamR => "r",
        })
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expr::Num(n) => Display::fmt(n, f),
            Expr::Par(id) => write!(f, "#{}", id),
            Expr::Call(call) => Display::fmt(call, f),
            Expr::Chain(first, rest) => {
                write!(f, "[{}", first)?;
                for (op, operand) in rest {
                    write!(f, "{}{}", op, operand)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Display for BinOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            BinOp::Power => "**",
            BinOp::Times => "*",
            BinOp::DividedBy => "/",
            BinOp::Modulo => "mod",
            BinOp::Plus => "+",
            BinOp::Minus => "-",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
        })
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Call::Atan(argy, argx) => write!(f, "atan{}/{}", argy, argx),
            Call::Abs(arg) => write!(f, "abs{}", arg),
            Call::Acos(arg) => write!(f, "acos{}", arg),
            Call::Asin(arg) => write!(f, "asin{}", arg),
            Call::Cos(arg) => write!(f, "cos{}", arg),
            Call::Exp(arg) => write!(f, "exp{}", arg),
            Call::Fix(arg) => write!(f, "fix{}", arg),
            Call::Fup(arg) => write!(f, "fup{}", arg),
            Call::Ln(arg) => write!(f, "ln{}", arg),
            Call::Round(arg) => write!(f, "round{}", arg),
            Call::Sin(arg) => write!(f, "sin{}", arg),
            Call::Sqrt(arg) => write!(f, "sqrt{}", arg),
            Call::Tan(arg) => write!(f, "tan{}", arg),
        }
    }
}
