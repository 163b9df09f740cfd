//! `math:` package
//!
//! `ceil`, `floor` and `abs` stay exact. Everything else goes through `f64`
//! and converts the result back to an exact rational.

use std::f64::consts;

use crate::error::Result;
use crate::runtime::{CallContext, Symbol, Symtab, Value, ValueType};
use crate::stdlib::{builtins, function};

/// `math:` function and constant table
pub fn symbols() -> Symtab {
    let mut table = Symtab::new();
    function(&mut table, "mod", builtins::builtin_rem);
    function(&mut table, "sqrt", math_sqrt);
    function(&mut table, "sin", math_sin);
    function(&mut table, "cos", math_cos);
    function(&mut table, "tan", math_tan);
    function(&mut table, "ceil", math_ceil);
    function(&mut table, "floor", math_floor);
    function(&mut table, "abs", math_abs);
    function(&mut table, "log", math_log);
    function(&mut table, "log10", math_log10);
    function(&mut table, "pow", math_pow);
    function(&mut table, "deg2rad", math_deg2rad);
    function(&mut table, "rad2deg", math_rad2deg);

    for (name, constant) in [("pi", consts::PI), ("e", consts::E)] {
        if let Some(value) = Value::from_f64(constant) {
            table.insert(name.into(), Symbol::constant(value));
        }
    }
    table
}

/// Applies `op` to the single number argument as a float
fn unary(ctx: &CallContext<'_>, op: fn(f64) -> f64) -> Result<Value> {
    ctx.validate(&[ValueType::Number])?;
    let x = ctx.args[0].to_f64().unwrap_or(f64::NAN);
    float_result(ctx, op(x))
}

fn float_result(ctx: &CallContext<'_>, f: f64) -> Result<Value> {
    Value::from_f64(f).ok_or_else(|| ctx.error(format!("{}: result is not a finite number", ctx.name)))
}

fn math_sqrt(ctx: &mut CallContext<'_>) -> Result<Value> {
    unary(ctx, f64::sqrt)
}

fn math_sin(ctx: &mut CallContext<'_>) -> Result<Value> {
    unary(ctx, f64::sin)
}

fn math_cos(ctx: &mut CallContext<'_>) -> Result<Value> {
    unary(ctx, f64::cos)
}

fn math_tan(ctx: &mut CallContext<'_>) -> Result<Value> {
    unary(ctx, f64::tan)
}

fn math_log(ctx: &mut CallContext<'_>) -> Result<Value> {
    unary(ctx, f64::ln)
}

fn math_log10(ctx: &mut CallContext<'_>) -> Result<Value> {
    unary(ctx, f64::log10)
}

fn math_deg2rad(ctx: &mut CallContext<'_>) -> Result<Value> {
    unary(ctx, f64::to_radians)
}

fn math_rad2deg(ctx: &mut CallContext<'_>) -> Result<Value> {
    unary(ctx, f64::to_degrees)
}

/// Usage: `(math:ceil number) -> integer`
fn math_ceil(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Number])?;
    Ok(Value::Number(ctx.number(0)?.ceil()))
}

/// Usage: `(math:floor number) -> integer`
fn math_floor(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Number])?;
    Ok(Value::Number(ctx.number(0)?.floor()))
}

fn math_abs(ctx: &mut CallContext<'_>) -> Result<Value> {
    use num::Signed;

    ctx.validate(&[ValueType::Number])?;
    Ok(Value::Number(ctx.number(0)?.abs()))
}

/// Usage: `(math:pow base exponent) -> number`
/// Example: `(math:pow 2 10)` returns `1024`
fn math_pow(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Number, ValueType::Number])?;
    let base = ctx.args[0].to_f64().unwrap_or(f64::NAN);
    let exponent = ctx.args[1].to_f64().unwrap_or(f64::NAN);
    float_result(ctx, base.powf(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_registered() {
        let table = symbols();
        let pi = table["pi"].value.to_f64().unwrap();
        assert!((pi - consts::PI).abs() < 1e-12);
        assert!(table["e"].constant);
    }
}
