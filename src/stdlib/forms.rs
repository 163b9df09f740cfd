//! Special forms
//!
//! Definitions, conditionals, loops, `case`, `export` and `namespace` all
//! need their arguments unevaluated, so they are registered as macros.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::parser::{Node, NodeKind};
use crate::runtime::{
    Block, Function, Macro, MacroCallContext, Mactab, Quote, Symbol, Value, SEQUENCE_RESULT,
};

/// Special-form macro table
pub fn macros() -> Mactab {
    use NodeKind::{Any, Identifier, List};

    let mut table = Mactab::new();
    table.insert(
        "defun".into(),
        Macro::new(&[Identifier, List, List], form_defun).with_rest(List),
    );
    table.insert("def".into(), Macro::new(&[Identifier, Any], form_def));
    table.insert("defconst".into(), Macro::new(&[Identifier, Any], form_defconst));
    table.insert(
        "defmacro".into(),
        Macro::new(&[Identifier, List, List], form_defmacro).with_rest(List),
    );
    table.insert("fun".into(), Macro::new(&[List, List], form_fun).with_rest(List));
    table.insert("for".into(), Macro::new(&[Any, List, List], form_for));
    table.insert("while".into(), Macro::new(&[Any, List], form_while));
    table.insert("if".into(), Macro::new(&[Any, Any], form_if));
    table.insert("ifel".into(), Macro::new(&[Any, Any, Any], form_ifel));
    table.insert("case".into(), Macro::unchecked(form_case));
    table.insert("export".into(), Macro::unchecked(form_export));
    table.insert("namespace".into(), Macro::new(&[Identifier], form_namespace));
    table
}

/// Parameter names of a `(a b c)` list
fn parameters(node: &Node) -> Result<Vec<String>> {
    let nodes = node.as_list().unwrap_or_default();
    nodes
        .iter()
        .map(|param| {
            param
                .as_identifier()
                .map(str::to_string)
                .ok_or_else(|| Error::runtime(param.pos().clone(), "expected an identifier"))
        })
        .collect()
}

/// Body lists of a function or macro, rejecting empty ones
fn body(nodes: &[Node], empty_message: &str) -> Result<Rc<[Node]>> {
    for node in nodes {
        if node.as_list().map_or(false, <[Node]>::is_empty) {
            return Err(Error::runtime(node.pos().clone(), empty_message));
        }
    }
    Ok(Rc::from(nodes))
}

/// Rejects names that may not be (re)defined in the calling scope
fn check_definable(ctx: &MacroCallContext<'_>, disallowed: &str) -> Result<String> {
    let name = ctx.identifier(0)?;
    let pos = ctx.nodes[0].pos();
    if name == SEQUENCE_RESULT {
        return Err(Error::runtime(pos.clone(), disallowed));
    }
    if ctx.block.scope.get_symbol(name).map_or(false, |s| s.constant) {
        return Err(Error::runtime(
            pos.clone(),
            format!("{} is a constant and cannot be modified", name),
        ));
    }
    Ok(name.to_string())
}

/// Defines a named function
///
/// Usage: `(defun name (params...) (body)...) -> function`
fn form_defun(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    let name = check_definable(ctx, "disallowed function name")?;
    let params = parameters(&ctx.nodes[1])?;
    let body = body(&ctx.nodes[2..], "empty function body")?;

    let function = Value::Function(Rc::new(Function::declared(name.as_str(), params, body)));
    ctx.block.scope.set_symbol(&name, Symbol::new(function.clone()));
    Ok(function)
}

fn define(ctx: &mut MacroCallContext<'_>, constant: bool) -> Result<Value> {
    let name = check_definable(ctx, "disallowed symbol name")?;
    let value = ctx.eval(1)?;

    let symbol = if constant {
        Symbol::constant(value.clone())
    } else {
        Symbol::new(value.clone())
    };
    ctx.block.scope.set_symbol(&name, symbol);
    Ok(value)
}

/// Binds a value, rebinding the nearest existing binding of the name
///
/// Usage: `(def name value) -> value`
fn form_def(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    define(ctx, false)
}

/// Like `def`, but the binding can never be redefined
fn form_defconst(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    define(ctx, true)
}

/// Defines a macro whose parameters receive their arguments as quoted
/// syntax; the body runs in a fresh scope over the scope the macro was
/// defined in, while `unquote` evaluates each argument at the call site
///
/// Usage: `(defmacro name (params...) (body)...) -> nil`
fn form_defmacro(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    let name = check_definable(ctx, "disallowed macro name")?;
    let params = parameters(&ctx.nodes[1])?;
    let body = body(&ctx.nodes[2..], "empty macro body")?;
    let definition = ctx.block.scope.clone();

    let kinds = vec![NodeKind::Any; params.len()];
    let mac = Macro::new(&kinds, move |call: &mut MacroCallContext<'_>| {
        let call_site = &call.block.scope;
        let mut block = Block::new(Rc::clone(&body), definition.child());
        for (param, node) in params.iter().zip(call.nodes) {
            let quote = Quote::new(node.clone(), Some(call_site.clone()));
            block.scope.set_local(param, Value::Quoted(Rc::new(quote)));
        }
        block.eval()
    });

    ctx.block.scope.set_macro(&name, mac);
    Ok(Value::Nil)
}

/// Creates an anonymous function
///
/// Usage: `(fun (params...) (body)...) -> function`
fn form_fun(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    let params = parameters(&ctx.nodes[0])?;
    let body = body(&ctx.nodes[1..], "empty function body")?;
    Ok(Value::Function(Rc::new(Function::lambda(params, body))))
}

/// Iterates a list, binding the item and optionally its index
///
/// Usage: `(for list (item [index]) (body)) -> nil`
fn form_for(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    let items = match ctx.eval(0)? {
        Value::List(items) => items,
        _ => {
            return Err(Error::runtime(
                ctx.nodes[0].pos().clone(),
                "expected a list to iterate over",
            ))
        }
    };

    let names = parameters(&ctx.nodes[1])?;
    if names.len() > 2 {
        return Err(Error::runtime(
            ctx.nodes[1].pos().clone(),
            "too many arguments provided",
        ));
    }

    let mut body = Block::new(vec![ctx.nodes[2].clone()], ctx.block.scope.child());
    for (index, item) in items.into_iter().enumerate() {
        if let Some(name) = names.first() {
            body.scope.set_local(name, item);
        }
        if let Some(name) = names.get(1) {
            body.scope.set_local(name, Value::from(index));
        }
        body.eval()?;
    }
    Ok(Value::Nil)
}

fn condition(ctx: &mut MacroCallContext<'_>) -> Result<bool> {
    match ctx.eval(0)? {
        Value::Boolean(b) => Ok(b),
        _ => Err(Error::runtime(ctx.nodes[0].pos().clone(), "expected a boolean")),
    }
}

/// Usage: `(while condition (body)) -> nil`
fn form_while(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    while condition(ctx)? {
        ctx.eval(1)?;
    }
    Ok(Value::Nil)
}

/// Usage: `(if condition then) -> value or nil`
fn form_if(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    if condition(ctx)? {
        ctx.eval(1)
    } else {
        Ok(Value::Nil)
    }
}

/// Usage: `(ifel condition then else) -> value`
fn form_ifel(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    if condition(ctx)? {
        ctx.eval(1)
    } else {
        ctx.eval(2)
    }
}

/// Compares a value against candidate groups, running the branch of the
/// first group containing an equal value, else the `_` branch, else nil
///
/// Usage: `(case value (candidates...) branch ... _ otherwise) -> value`
/// Example: `(case 3 (1 2) "low" (3 4) "high" _ "other")` returns `"high"`
fn form_case(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    if ctx.nodes.is_empty() {
        return Err(ctx.error("missing value to compare to"));
    }
    let subject = ctx.eval(0)?;

    if (ctx.nodes.len() - 1) % 2 != 0 {
        return Err(ctx.error("unbalanced case call"));
    }

    let nodes = ctx.nodes;
    let mut groups: Vec<(Vec<Value>, &Node)> = Vec::new();
    let mut otherwise: Option<&Node> = None;

    for pair in nodes[1..].chunks(2) {
        let (pattern, branch) = (&pair[0], &pair[1]);
        if let Some(candidates) = pattern.as_list() {
            let mut values = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                values.push(ctx.block.eval_node(candidate)?);
            }
            groups.push((values, branch));
        } else if pattern.as_identifier() == Some(SEQUENCE_RESULT) {
            if otherwise.is_some() {
                return Err(Error::runtime(
                    pattern.pos().clone(),
                    "match can only have one otherwise case",
                ));
            }
            otherwise = Some(branch);
        } else {
            return Err(Error::runtime(pattern.pos().clone(), "expected a list"));
        }
    }

    for (values, branch) in groups {
        if values.contains(&subject) {
            return ctx.block.eval_node(branch);
        }
    }
    match otherwise {
        Some(branch) => ctx.block.eval_node(branch),
        None => Ok(Value::Nil),
    }
}

/// Flags bindings to be imported by whoever loads this file; only names
/// bound in the exporting block's own scope can be exported
///
/// Usage: `(export name...) -> nil`
fn form_export(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    for node in ctx.nodes {
        let name = node
            .as_identifier()
            .ok_or_else(|| Error::runtime(node.pos().clone(), "expected an identifier"))?;
        if ctx.block.scope.mark_exported(name) {
            continue;
        }
        let message = if ctx.block.scope.has(name) {
            format!("cannot export '{}', it is not defined in this scope", name)
        } else {
            format!("unknown symbol '{}'", name)
        };
        return Err(Error::runtime(node.pos().clone(), message));
    }
    Ok(Value::Nil)
}

/// Sets the prefix this block's exports are imported under
///
/// Usage: `(namespace name) -> nil`
fn form_namespace(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
    let name = ctx.identifier(0)?.to_string();
    ctx.block.namespace = name;
    Ok(Value::Nil)
}
