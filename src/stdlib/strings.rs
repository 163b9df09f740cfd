//! `strings:` package

use crate::error::Result;
use crate::runtime::{CallContext, Symtab, Value, ValueType};
use crate::stdlib::{builtins, function};

/// `strings:` function table
pub fn symbols() -> Symtab {
    let mut table = Symtab::new();
    function(&mut table, "substr", strings_substr);
    table
}

/// Byte range `start..end` of a string
///
/// Usage: `(strings:substr string start end) -> string`
/// Example: `(strings:substr "hello" 1 3)` returns `"el"`
fn strings_substr(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::String, ValueType::Number, ValueType::Number])?;
    let start = ctx.integer(1)?;
    let end = ctx.integer(2)?;
    let source = ctx.string(0)?;

    builtins::slice(source, start, end)
        .map(Value::from)
        .ok_or_else(|| {
            ctx.error(format!(
                "out of bounds (length is {}, trying to access {}:{})",
                source.len(),
                start,
                end
            ))
        })
}
