//! Core builtin functions, registered without a namespace

use num::{BigRational, Zero};
use std::path::Path;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::lexer::{Position, Scanner};
use crate::parser::Parser;
use crate::runtime::{Block, CallContext, Symbol, Symtab, Value, ValueType};
use crate::stdlib::function;

/// Core symbol table
pub fn symbols() -> Symtab {
    let mut table = Symtab::new();
    table.insert("t".into(), Symbol::constant(Value::Boolean(true)));
    table.insert("f".into(), Symbol::constant(Value::Boolean(false)));
    table.insert("nil".into(), Symbol::constant(Value::Nil));

    function(&mut table, "print", builtin_print);
    function(&mut table, "println", builtin_println);
    function(&mut table, "list", builtin_list);
    function(&mut table, "cat", builtin_cat);
    function(&mut table, "+", builtin_add);
    function(&mut table, "-", builtin_sub);
    function(&mut table, "*", builtin_mul);
    function(&mut table, "/", builtin_div);
    function(&mut table, "%", builtin_rem);
    function(&mut table, "=", builtin_equals);
    function(&mut table, "!=", builtin_not_equals);
    function(&mut table, ">", builtin_gt);
    function(&mut table, ">=", builtin_ge);
    function(&mut table, "<", builtin_lt);
    function(&mut table, "<=", builtin_le);
    function(&mut table, "and", builtin_and);
    function(&mut table, "or", builtin_or);
    function(&mut table, "not", builtin_not);
    function(&mut table, "call", builtin_call);
    function(&mut table, "pass", builtin_pass);
    function(&mut table, "assert", builtin_assert);
    function(&mut table, "range", builtin_range);
    function(&mut table, "substring", builtin_substring);
    function(&mut table, "load", builtin_load);
    function(&mut table, "unquote", builtin_unquote);
    table
}

/// Writes each argument to stdout, without separators or newline
///
/// Usage: `(print value...) -> nil`
fn builtin_print(ctx: &mut CallContext<'_>) -> Result<Value> {
    for arg in &ctx.args {
        print!("{}", arg);
    }
    Ok(Value::Nil)
}

/// Writes each argument to stdout on its own line
///
/// Usage: `(println value...) -> nil`
fn builtin_println(ctx: &mut CallContext<'_>) -> Result<Value> {
    for arg in &ctx.args {
        println!("{}", arg);
    }
    Ok(Value::Nil)
}

/// Usage: `(list value...) -> list`
fn builtin_list(ctx: &mut CallContext<'_>) -> Result<Value> {
    Ok(Value::List(std::mem::take(&mut ctx.args)))
}

/// Concatenates the rendering of every argument
///
/// Usage: `(cat value...) -> string`
/// Example: `(cat "n=" 3)` returns `"n=3"`
fn builtin_cat(ctx: &mut CallContext<'_>) -> Result<Value> {
    let joined: String = ctx.args.iter().map(|arg| arg.to_string()).collect();
    Ok(Value::String(joined))
}

fn numbers(ctx: &CallContext<'_>) -> Result<(BigRational, BigRational)> {
    ctx.validate(&[ValueType::Number, ValueType::Number])?;
    Ok((ctx.number(0)?.clone(), ctx.number(1)?.clone()))
}

fn builtin_add(ctx: &mut CallContext<'_>) -> Result<Value> {
    let (a, b) = numbers(ctx)?;
    Ok(Value::Number(a + b))
}

fn builtin_sub(ctx: &mut CallContext<'_>) -> Result<Value> {
    let (a, b) = numbers(ctx)?;
    Ok(Value::Number(a - b))
}

fn builtin_mul(ctx: &mut CallContext<'_>) -> Result<Value> {
    let (a, b) = numbers(ctx)?;
    Ok(Value::Number(a * b))
}

/// Exact division
///
/// Usage: `(/ a b) -> number`
/// Example: `(/ 1 3)` prints as `0.3333` but stays exactly one third
fn builtin_div(ctx: &mut CallContext<'_>) -> Result<Value> {
    let (a, b) = numbers(ctx)?;
    if b.is_zero() {
        return Err(ctx.error("division by zero"));
    }
    Ok(Value::Number(a / b))
}

/// Remainder of both operands truncated to integers; the sign follows the
/// dividend
pub(crate) fn builtin_rem(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Number, ValueType::Number])?;
    let a = ctx.number(0)?.trunc().to_integer();
    let b = ctx.number(1)?.trunc().to_integer();
    if b.is_zero() {
        return Err(ctx.error("division by zero"));
    }
    Ok(Value::Number(BigRational::from_integer(a % b)))
}

fn builtin_equals(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Any, ValueType::Any])?;
    Ok(Value::Boolean(ctx.args[0] == ctx.args[1]))
}

fn builtin_not_equals(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Any, ValueType::Any])?;
    Ok(Value::Boolean(ctx.args[0] != ctx.args[1]))
}

fn builtin_gt(ctx: &mut CallContext<'_>) -> Result<Value> {
    let (a, b) = numbers(ctx)?;
    Ok(Value::Boolean(a > b))
}

fn builtin_ge(ctx: &mut CallContext<'_>) -> Result<Value> {
    let (a, b) = numbers(ctx)?;
    Ok(Value::Boolean(a >= b))
}

fn builtin_lt(ctx: &mut CallContext<'_>) -> Result<Value> {
    let (a, b) = numbers(ctx)?;
    Ok(Value::Boolean(a < b))
}

fn builtin_le(ctx: &mut CallContext<'_>) -> Result<Value> {
    let (a, b) = numbers(ctx)?;
    Ok(Value::Boolean(a <= b))
}

fn builtin_and(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Boolean, ValueType::Boolean])?;
    Ok(Value::Boolean(ctx.boolean(0)? && ctx.boolean(1)?))
}

fn builtin_or(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Boolean, ValueType::Boolean])?;
    Ok(Value::Boolean(ctx.boolean(0)? || ctx.boolean(1)?))
}

fn builtin_not(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Boolean])?;
    Ok(Value::Boolean(!ctx.boolean(0)?))
}

/// Calls a function value with the remaining arguments
///
/// Usage: `(call function arg...) -> value`
/// Example: `(call (fun (x) (* x 2)) 21)` returns `42`
fn builtin_call(ctx: &mut CallContext<'_>) -> Result<Value> {
    let mut args = std::mem::take(&mut ctx.args);
    if args.is_empty() {
        return Err(ctx.error("expected a function"));
    }
    let function = match args.remove(0) {
        Value::Function(function) => function,
        other => {
            return Err(ctx.error(format!(
                "call: argument 1 should be of type function, got {}",
                other.type_name()
            )))
        }
    };
    function.call(ctx.block, args, ctx.pos)
}

/// Returns its argument unchanged; any other arity yields nil
fn builtin_pass(ctx: &mut CallContext<'_>) -> Result<Value> {
    if ctx.args.len() != 1 {
        return Ok(Value::Nil);
    }
    Ok(ctx.take(0))
}

/// Usage: `(assert condition [message]) -> nil`
fn builtin_assert(ctx: &mut CallContext<'_>) -> Result<Value> {
    if ctx.args.len() == 2 {
        ctx.validate(&[ValueType::Boolean, ValueType::String])?;
    } else {
        ctx.validate(&[ValueType::Boolean])?;
    }

    if ctx.boolean(0)? {
        return Ok(Value::Nil);
    }
    match ctx.args.get(1) {
        Some(Value::String(message)) => Err(ctx.error(format!("assertion failed: {}", message))),
        _ => Err(ctx.error("assertion failed")),
    }
}

/// Integers from `low` up to, not including, `high`
///
/// Usage: `(range low high) -> list`
/// Example: `(range 0 3)` returns `(0 1 2)`
fn builtin_range(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Number, ValueType::Number])?;
    let low = ctx.integer(0)?;
    let high = ctx.integer(1)?;
    if low > high {
        return Err(ctx.error(format!(
            "invalid argument(s), low can't be higher than high ({} > {})",
            low, high
        )));
    }
    Ok(Value::List((low..high).map(Value::integer).collect()))
}

/// Byte range of a string, failing when either bound falls outside it
///
/// Usage: `(substring string start end) -> string`
fn builtin_substring(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::String, ValueType::Number, ValueType::Number])?;
    let start = ctx.integer(1)?;
    let end = ctx.integer(2)?;
    let source = ctx.string(0)?;

    slice(source, start, end)
        .map(Value::from)
        .ok_or_else(|| ctx.error("attempting to slice string out of bounds"))
}

/// `source[start..end]`, or `None` when the range is invalid or splits a
/// character
pub(crate) fn slice(source: &str, start: i64, end: i64) -> Option<&str> {
    let start = usize::try_from(start).ok()?;
    let end = usize::try_from(end).ok()?;
    source.get(start..end)
}

/// Evaluates quoted syntax where it was written: at the call site of the
/// macro it was passed to, else in the calling block; strings pass through
/// unchanged
///
/// Usage: `(unquote quoted) -> value`
fn builtin_unquote(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.expect_count(1)?;
    match ctx.take(0) {
        Value::Quoted(quote) => match &quote.scope {
            Some(scope) => Block::new(Vec::new(), scope.clone()).eval_node(&quote.node),
            None => ctx.block.eval_node(&quote.node),
        },
        Value::String(s) => Ok(Value::String(s)),
        other => Err(ctx.error(format!(
            "unquote: argument 1 should be of type quoted, got {}",
            other.type_name()
        ))),
    }
}

/// Runs another source file and imports what it exports
///
/// The file is evaluated in a fresh scope chained to the caller's. Every
/// symbol it exports is copied into the caller's scope, prefixed with the
/// file's namespace when it declared one. Exported functions are pinned to
/// the loaded file's scope so they keep resolving its private bindings.
///
/// Usage: `(load path) -> value of the last form in the file`
fn builtin_load(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::String])?;
    let path = ctx.string(0)?.to_string();

    let source = read_source(&path, ctx.pos)?;
    let tokens = Scanner::new(&source, source_name(&path)).scan_tokens()?;
    let nodes = Parser::new(tokens).parse()?;
    tracing::debug!(path = %path, forms = nodes.len(), "loading file");

    let mut loaded = Block::new(nodes, ctx.block.scope.child());
    let result = loaded.eval()?;

    for (name, mut symbol) in loaded.scope.exported_symbols() {
        if let Value::Function(function) = &symbol.value {
            symbol.value = Value::Function(Rc::new(function.pinned_to(&loaded.scope)));
        }
        let imported = loaded.symbol_name(&name);
        tracing::debug!(symbol = %imported, from = %path, "importing exported symbol");
        ctx.block.scope.set_symbol(&imported, symbol);
    }

    Ok(result)
}

/// Reads a source file, reporting failures as runtime errors at `pos`
pub(crate) fn read_source(path: &str, pos: &Position) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::runtime(pos.clone(), format!("cannot read '{}': {}", path, e)))
}

/// Name positions in a file are reported under: the file stem
pub(crate) fn source_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
