//! Standard library for Risp
//!
//! The core builtins and special forms are registered without a prefix.
//! The `list`, `math` and `strings` packages are registered under their
//! package name, so `push` from `list` is called as `list:push`.

pub mod builtins;
pub mod forms;
pub mod list;
pub mod math;
pub mod strings;

use std::rc::Rc;

use crate::runtime::{BuiltinFn, Function, Scope, Symbol, Symtab, Value};

/// Adds a builtin function to a symbol table
pub(crate) fn function(table: &mut Symtab, name: &str, handler: BuiltinFn) {
    let value = Value::Function(Rc::new(Function::builtin(name, handler)));
    table.insert(name.to_string(), Symbol::new(value));
}

/// Registers the core builtins and special forms
pub fn register_core(scope: &Scope) {
    scope.apply_symbols("", builtins::symbols());
    scope.apply_macros("", forms::macros());
}

/// Registers the namespaced packages
pub fn register_packages(scope: &Scope) {
    scope.apply_symbols("list", list::symbols());
    scope.apply_macros("list", list::macros());
    scope.apply_symbols("math", math::symbols());
    scope.apply_symbols("strings", strings::symbols());
}

/// Registers everything
pub fn register_all(scope: &Scope) {
    register_core(scope);
    register_packages(scope);
}
