// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Expression evaluation over the parameter table.
//!
//! Bracketed expressions are flat operator chains in the AST; this module
//! reduces them with the classic two-stack algorithm.  There are four
//! precedence levels: the closing bracket, the plus-like operators, the
//! times-like operators, and power.  The plus-like level includes the
//! logical operators, so `[1and1+1]` is 2, not 1; ties reduce left to
//! right.  This matches the behavior of historical RS274/NGC controllers
//! and is deliberate.

use crate::ast::{BinOp, Call, Expr};
use crate::error::{Error, Result};
use crate::param::{ParamTable, MAX_PARAMETERS};

// level 1 is the implicit closing bracket
fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Power => 4,
        BinOp::Times | BinOp::DividedBy | BinOp::Modulo => 3,
        _ => 2,
    }
}

/// Evaluate an expression.  Parameter references read the table as it was
/// at the start of the line; assignments never take effect mid-line.
pub fn eval_expr(expr: &Expr, params: &ParamTable) -> Result<f64> {
    match expr {
        Expr::Num(value) => Ok(*value),
        Expr::Par(id) => params.get(eval_par_index(id, params)?),
        Expr::Call(call) => eval_call(call, params),
        Expr::Chain(first, rest) => eval_chain(first, rest, params),
    }
}

/// Evaluate an expression that must come out integral.
///
/// The value may be written with a decimal point or may be an expression
/// involving non-integers, as long as the result is within 0.0001 of an
/// integer.
pub fn eval_integer(expr: &Expr, params: &ParamTable) -> Result<i32> {
    let value = eval_expr(expr, params)?;
    let mut int = value.floor();
    if value - int > 0.9999 {
        int = value.ceil();
    } else if value - int > 0.0001 {
        return Err(Error::NonIntegerValueForInteger);
    }
    Ok(int as i32)
}

/// Evaluate a parameter index: integral and within 1..MAX_PARAMETERS.
pub fn eval_par_index(expr: &Expr, params: &ParamTable) -> Result<usize> {
    let index = eval_integer(expr, params)?;
    if index < 1 || index as usize >= MAX_PARAMETERS {
        return Err(Error::ParameterNumberOutOfRange);
    }
    Ok(index as usize)
}

fn eval_chain(first: &Expr, rest: &[(BinOp, Expr)], params: &ParamTable) -> Result<f64> {
    let mut values = vec![eval_expr(first, params)?];
    let mut ops: Vec<BinOp> = Vec::new();
    for (op, operand) in rest {
        while ops.last().is_some_and(|&top| precedence(*op) <= precedence(top)) {
            let top = ops.pop().expect("operator stack");
            let right = values.pop().expect("value stack");
            let left = values.last_mut().expect("value stack");
            *left = execute_binary(*left, top, right)?;
        }
        ops.push(*op);
        values.push(eval_expr(operand, params)?);
    }
    // the remaining operators have strictly increasing precedence
    while let Some(top) = ops.pop() {
        let right = values.pop().expect("value stack");
        let left = values.last_mut().expect("value stack");
        *left = execute_binary(*left, top, right)?;
    }
    Ok(values[0])
}

fn execute_binary(left: f64, op: BinOp, right: f64) -> Result<f64> {
    Ok(match op {
        BinOp::Power => {
            if left < 0.0 && right.floor() != right {
                return Err(Error::AttemptToRaiseNegativeToNonIntegerPower);
            }
            left.powf(right)
        }
        BinOp::Times => left * right,
        BinOp::DividedBy => {
            if right == 0.0 {
                return Err(Error::AttemptToDivideByZero);
            }
            left / right
        }
        // mod always calculates a non-negative answer
        BinOp::Modulo => {
            let rem = left % right;
            if rem < 0.0 { rem + right.abs() } else { rem }
        }
        BinOp::Plus => left + right,
        BinOp::Minus => left - right,
        BinOp::And => bool_num(left != 0.0 && right != 0.0),
        BinOp::Or => bool_num(left != 0.0 || right != 0.0),
        BinOp::Xor => bool_num((left != 0.0) != (right != 0.0)),
    })
}

fn bool_num(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn eval_call(call: &Call, params: &ParamTable) -> Result<f64> {
    Ok(match call {
        Call::Abs(arg) => eval_expr(arg, params)?.abs(),
        Call::Acos(arg) => {
            let arg = eval_expr(arg, params)?;
            if !(-1.0..=1.0).contains(&arg) {
                return Err(Error::ArgumentToAcosOutOfRange);
            }
            arg.acos().to_degrees()
        }
        Call::Asin(arg) => {
            let arg = eval_expr(arg, params)?;
            if !(-1.0..=1.0).contains(&arg) {
                return Err(Error::ArgumentToAsinOutOfRange);
            }
            arg.asin().to_degrees()
        }
        Call::Atan(argy, argx) => {
            let argy = eval_expr(argy, params)?;
            let argx = eval_expr(argx, params)?;
            argy.atan2(argx).to_degrees()
        }
        Call::Cos(arg) => eval_expr(arg, params)?.to_radians().cos(),
        Call::Exp(arg) => eval_expr(arg, params)?.exp(),
        Call::Fix(arg) => eval_expr(arg, params)?.floor(),
        Call::Fup(arg) => eval_expr(arg, params)?.ceil(),
        Call::Ln(arg) => {
            let arg = eval_expr(arg, params)?;
            if arg <= 0.0 {
                return Err(Error::ZeroOrNegativeArgumentToLn);
            }
            arg.ln()
        }
        // f64::round is away-from-zero at .5, which is what the language wants
        Call::Round(arg) => eval_expr(arg, params)?.round(),
        Call::Sin(arg) => eval_expr(arg, params)?.to_radians().sin(),
        Call::Sqrt(arg) => {
            let arg = eval_expr(arg, params)?;
            if arg < 0.0 {
                return Err(Error::NegativeArgumentToSqrt);
            }
            arg.sqrt()
        }
        Call::Tan(arg) => eval_expr(arg, params)?.to_radians().tan(),
    })
}
