//! `list:` package
//!
//! Lists are values, so every function here works on its own copy of the
//! list it was given: "mutating" functions change that copy and return it,
//! and the caller rebinds the result when it wants to keep the change.
//! Keyword property lists are flat lists of alternating keys and values,
//! `(:name "risp" :version 1)`.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::parser::NodeKind;
use crate::runtime::{Block, CallContext, Macro, MacroCallContext, Mactab, Symtab, Value, ValueType};
use crate::stdlib::function;

/// `list:` function table
pub fn symbols() -> Symtab {
    let mut table = Symtab::new();
    function(&mut table, "seq", list_seq);
    function(&mut table, "contains", list_contains);
    function(&mut table, "contains-key", list_contains_key);
    function(&mut table, "push", list_push);
    function(&mut table, "push-left", list_push_left);
    function(&mut table, "size", list_size);
    function(&mut table, "get", list_get);
    function(&mut table, "get-key", list_get_key);
    function(&mut table, "set", list_set);
    function(&mut table, "set-key", list_set_key);
    function(&mut table, "drop", list_drop);
    function(&mut table, "drop-left", list_drop_left);
    function(&mut table, "join", list_join);
    function(&mut table, "range", list_range);
    function(&mut table, "reverse", list_reverse);
    function(&mut table, "remove", list_remove);
    function(&mut table, "remove-key", list_remove_key);
    table
}

/// `list:` macro table
pub fn macros() -> Mactab {
    use NodeKind::{Any, Identifier, List};

    let mut table = Mactab::new();
    table.insert("map".into(), Macro::new(&[Any, Identifier, List], list_map));
    table.insert("filter".into(), Macro::new(&[Any, Identifier, List], list_filter));
    table.insert(
        "reduce".into(),
        Macro::new(&[Any, Identifier, Identifier, List], list_reduce),
    );
    table
}

fn out_of_bounds(ctx: &CallContext<'_>, index: i64, size: usize) -> Error {
    ctx.error(format!(
        "index {} out of bounds (list size is {})",
        index, size
    ))
}

/// Position of `index` in a list of `size` elements, if it is in bounds
fn checked_index(index: i64, size: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|i| *i < size)
}

/// Index of the value following keyword `key`
fn key_slot(items: &[Value], key: &str) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .position(|(i, item)| matches!(item, Value::Keyword(k) if k == key) && i + 1 < items.len())
        .map(|i| i + 1)
}

fn keyword(ctx: &CallContext<'_>, index: usize) -> Result<String> {
    match ctx.args.get(index) {
        Some(Value::Keyword(k)) => Ok(k.clone()),
        _ => Err(ctx.error(format!(
            "{}: argument {} should be of type keyword",
            ctx.name,
            index + 1
        ))),
    }
}

/// Integers from `low` to `high`, both included
///
/// Usage: `(list:seq low high) -> list`
/// Example: `(list:seq 1 3)` returns `(1 2 3)`
fn list_seq(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::Number, ValueType::Number])?;
    let low = ctx.integer(0)?;
    let high = ctx.integer(1)?;
    if low > high {
        return Err(ctx.error(format!(
            "invalid argument(s), low can't be higher than high ({} > {})",
            low, high
        )));
    }
    Ok(Value::List((low..=high).map(Value::integer).collect()))
}

fn list_contains(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Any])?;
    let needle = ctx.take(1);
    let items = ctx.take_list(0)?;
    Ok(Value::Boolean(items.contains(&needle)))
}

/// True if the property list has a value for `key`
fn list_contains_key(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Keyword])?;
    let key = keyword(ctx, 1)?;
    let items = ctx.take_list(0)?;
    Ok(Value::Boolean(key_slot(&items, &key).is_some()))
}

/// Usage: `(list:push list value) -> list`
fn list_push(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Any])?;
    let value = ctx.take(1);
    let mut items = ctx.take_list(0)?;
    items.push(value);
    Ok(Value::List(items))
}

/// Usage: `(list:push-left list value) -> list`
fn list_push_left(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Any])?;
    let value = ctx.take(1);
    let mut items = ctx.take_list(0)?;
    items.insert(0, value);
    Ok(Value::List(items))
}

fn list_size(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List])?;
    let items = ctx.take_list(0)?;
    Ok(Value::from(items.len()))
}

/// Usage: `(list:get list index) -> value`
fn list_get(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Number])?;
    let index = ctx.integer(1)?;
    let mut items = ctx.take_list(0)?;
    match checked_index(index, items.len()) {
        Some(i) => Ok(items.swap_remove(i)),
        None => Err(out_of_bounds(ctx, index, items.len())),
    }
}

/// Value stored under `key` in a property list, nil when absent
///
/// Usage: `(list:get-key plist :key) -> value`
fn list_get_key(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Keyword])?;
    let key = keyword(ctx, 1)?;
    let mut items = ctx.take_list(0)?;
    Ok(match key_slot(&items, &key) {
        Some(slot) => items.swap_remove(slot),
        None => Value::Nil,
    })
}

/// Usage: `(list:set list index value) -> list`
fn list_set(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Number, ValueType::Any])?;
    let index = ctx.integer(1)?;
    let value = ctx.take(2);
    let mut items = ctx.take_list(0)?;
    match checked_index(index, items.len()) {
        Some(i) => {
            items[i] = value;
            Ok(Value::List(items))
        }
        None => Err(out_of_bounds(ctx, index, items.len())),
    }
}

/// Replaces the value under `key`, appending the pair when absent
///
/// Usage: `(list:set-key plist :key value) -> list`
fn list_set_key(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Keyword, ValueType::Any])?;
    let key = keyword(ctx, 1)?;
    let value = ctx.take(2);
    let mut items = ctx.take_list(0)?;
    match key_slot(&items, &key) {
        Some(slot) => items[slot] = value,
        None => {
            items.push(Value::Keyword(key));
            items.push(value);
        }
    }
    Ok(Value::List(items))
}

/// Removes the last element
fn list_drop(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List])?;
    let mut items = ctx.take_list(0)?;
    if items.pop().is_none() {
        return Err(ctx.error("empty list"));
    }
    Ok(Value::List(items))
}

/// Removes the first element
fn list_drop_left(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List])?;
    let mut items = ctx.take_list(0)?;
    if items.is_empty() {
        return Err(ctx.error("empty list"));
    }
    items.remove(0);
    Ok(Value::List(items))
}

/// Appends the elements of the second list to the first
///
/// Usage: `(list:join a b) -> list`
fn list_join(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::List])?;
    let tail = ctx.take_list(1)?;
    let mut items = ctx.take_list(0)?;
    items.extend(tail);
    Ok(Value::List(items))
}

/// Elements between two indexes, both included; a single element is
/// returned on its own rather than wrapped in a list
///
/// Usage: `(list:range list begin [end]) -> list or value`
/// Example: `(list:range (list 1 2 3 4) 1 2)` returns `(2 3)`
fn list_range(ctx: &mut CallContext<'_>) -> Result<Value> {
    if ctx.args.len() == 2 {
        ctx.validate(&[ValueType::List, ValueType::Number])?;
    } else {
        ctx.validate(&[ValueType::List, ValueType::Number, ValueType::Number])?;
    }

    let begin = ctx.integer(1)?;
    let mut items = ctx.take_list(0)?;
    let length = items.len();
    let end = if ctx.args.len() == 3 {
        ctx.integer(2)?
    } else {
        i64::try_from(length).unwrap_or(i64::MAX) - 1
    };

    let bounds = checked_index(begin, length).zip(checked_index(end, length));
    let (first, last) = match bounds {
        Some((first, last)) if first <= last => (first, last),
        _ => {
            return Err(ctx.error(format!(
                "invalid bounds {} and {} (list length is {})",
                begin, end, length
            )))
        }
    };

    items.truncate(last + 1);
    let mut slice = items.split_off(first);
    if slice.len() == 1 {
        return Ok(slice.remove(0));
    }
    Ok(Value::List(slice))
}

fn list_reverse(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List])?;
    let mut items = ctx.take_list(0)?;
    items.reverse();
    Ok(Value::List(items))
}

/// Usage: `(list:remove list index) -> list`
fn list_remove(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Number])?;
    let index = ctx.integer(1)?;
    let mut items = ctx.take_list(0)?;
    match checked_index(index, items.len()) {
        Some(i) => {
            items.remove(i);
            Ok(Value::List(items))
        }
        None => Err(out_of_bounds(ctx, index, items.len())),
    }
}

/// Removes every `key value` pair for `key`
///
/// Usage: `(list:remove-key plist :key) -> list`
fn list_remove_key(ctx: &mut CallContext<'_>) -> Result<Value> {
    ctx.validate(&[ValueType::List, ValueType::Keyword])?;
    let key = keyword(ctx, 1)?;
    let mut items = ctx.take_list(0)?;
    while let Some(slot) = key_slot(&items, &key) {
        items.drain(slot - 1..=slot);
    }
    Ok(Value::List(items))
}

/// Evaluates the list argument of a list macro
fn eval_list(ctx: &mut MacroCallContext<'_>) -> Result<Vec<Value>> {
    match ctx.eval(0)? {
        Value::List(items) => Ok(items),
        _ => Err(Error::runtime(ctx.nodes[0].pos().clone(), "expected a list")),
    }
}

/// Evaluates `body` in a fresh scope over the caller's with `bindings` set
fn eval_with(ctx: &mut MacroCallContext<'_>, body: usize, bindings: &[(&str, Value)]) -> Result<Value> {
    let node = ctx.nodes[body].clone();
    let mut block = Block::new(Rc::from(vec![node]), ctx.block.scope.child());
    for (name, value) in bindings {
        block.scope.set_local(name, value.clone());
    }
    block.eval()
}

/// Usage: `(list:map list item (body)) -> list`
/// Example: `(list:map (list 1 2) x (* x 10))` returns `(10 20)`
fn list_map(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    let items = eval_list(ctx)?;
    let name = ctx.identifier(1)?.to_string();

    let mut mapped = Vec::with_capacity(items.len());
    for item in items {
        mapped.push(eval_with(ctx, 2, &[(name.as_str(), item)])?);
    }
    Ok(Value::List(mapped))
}

/// Keeps the items the body returns `t` for
///
/// Usage: `(list:filter list item (body)) -> list`
fn list_filter(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    let items = eval_list(ctx)?;
    let name = ctx.identifier(1)?.to_string();

    let mut kept = Vec::new();
    for item in items {
        match eval_with(ctx, 2, &[(name.as_str(), item.clone())])? {
            Value::Boolean(true) => kept.push(item),
            Value::Boolean(false) => {}
            other => {
                return Err(Error::runtime(
                    ctx.nodes[2].pos().clone(),
                    format!("expected a boolean return value, got {}", other.type_name()),
                ))
            }
        }
    }
    Ok(Value::List(kept))
}

/// Folds the list from the left, starting with its first element
///
/// Usage: `(list:reduce list acc item (body)) -> value`
/// Example: `(list:reduce (list 1 2 3) a b (+ a b))` returns `6`
fn list_reduce(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    let items = eval_list(ctx)?;
    if items.is_empty() {
        return Err(Error::runtime(ctx.nodes[0].pos().clone(), "empty list"));
    }
    let acc_name = ctx.identifier(1)?.to_string();
    let item_name = ctx.identifier(2)?.to_string();

    let mut items = items.into_iter();
    let mut acc = items.next().unwrap_or_default();
    for item in items {
        acc = eval_with(ctx, 3, &[(acc_name.as_str(), acc), (item_name.as_str(), item)])?;
    }
    Ok(acc)
}
