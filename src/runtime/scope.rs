use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::runtime::{Macro, Value};

/// A named binding in a scope
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Bound value
    pub value: Value,
    /// Copied into the importer when the defining file is loaded
    pub exported: bool,
    /// Rejects redefinition through `def`, `defun` and friends
    pub constant: bool,
}

impl Symbol {
    /// A plain, mutable, unexported binding
    pub fn new(value: Value) -> Self {
        Symbol {
            value,
            exported: false,
            constant: false,
        }
    }

    /// A binding that cannot be redefined
    pub fn constant(value: Value) -> Self {
        Symbol {
            value,
            exported: false,
            constant: true,
        }
    }
}

/// Symbol table, the unit packages register bindings with
pub type Symtab = HashMap<String, Symbol>;

/// Macro table, the unit packages register macros with
pub type Mactab = HashMap<String, Macro>;

struct Frame {
    symbols: HashMap<String, Symbol>,
    macros: HashMap<String, Rc<Macro>>,
    parent: Option<Scope>,
}

/// One frame of the scope chain
///
/// Scopes are shared handles: cloning a `Scope` yields another handle to the
/// same frame. Lookups walk from the innermost frame outward; assignments
/// through [`Scope::set`] mutate the nearest existing binding and only create
/// a new one in the current frame when no frame has it.
#[derive(Clone)]
pub struct Scope(Rc<RefCell<Frame>>);

impl Scope {
    /// Creates a scope, optionally chained to a parent
    pub fn new(parent: Option<&Scope>) -> Self {
        Scope(Rc::new(RefCell::new(Frame {
            symbols: HashMap::new(),
            macros: HashMap::new(),
            parent: parent.cloned(),
        })))
    }

    /// Creates a child scope of this one
    pub fn child(&self) -> Self {
        Scope::new(Some(self))
    }

    /// Parent scope, if any
    pub fn parent(&self) -> Option<Scope> {
        self.0.borrow().parent.clone()
    }

    /// True if both handles refer to the same frame
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Walks the chain from this frame outward, stopping at the first frame
    /// for which `visit` returns a result
    fn find<R>(&self, mut visit: impl FnMut(&mut Frame) -> Option<R>) -> Option<R> {
        let mut scope = self.clone();
        loop {
            let parent = {
                let mut frame = scope.0.borrow_mut();
                if let Some(found) = visit(&mut *frame) {
                    return Some(found);
                }
                frame.parent.clone()
            };
            scope = parent?;
        }
    }

    /// Copy of the value bound to `name` in the nearest frame
    pub fn get(&self, name: &str) -> Option<Value> {
        self.find(|frame| frame.symbols.get(name).map(|s| s.value.clone()))
    }

    /// Copy of the whole binding for `name` in the nearest frame
    pub fn get_symbol(&self, name: &str) -> Option<Symbol> {
        self.find(|frame| frame.symbols.get(name).cloned())
    }

    /// True if any frame in the chain binds `name`
    pub fn has(&self, name: &str) -> bool {
        self.find(|frame| frame.symbols.contains_key(name).then_some(()))
            .is_some()
    }

    /// Rebinds the nearest existing `name` keeping its flags, or creates it
    /// in this frame
    pub fn set(&self, name: &str, value: Value) {
        let mut value = Some(value);
        let updated = self.find(|frame| {
            let symbol = frame.symbols.get_mut(name)?;
            symbol.value = value.take()?;
            Some(())
        });
        if updated.is_none() {
            if let Some(value) = value {
                self.set_local(name, value);
            }
        }
    }

    /// Replaces the nearest existing binding for `name`, or creates it in
    /// this frame
    pub fn set_symbol(&self, name: &str, symbol: Symbol) {
        let mut symbol = Some(symbol);
        let replaced = self.find(|frame| {
            let slot = frame.symbols.get_mut(name)?;
            *slot = symbol.take()?;
            Some(())
        });
        if replaced.is_none() {
            if let Some(symbol) = symbol {
                self.set_symbol_local(name, symbol);
            }
        }
    }

    /// Binding for `name` in this frame only
    pub fn get_local(&self, name: &str) -> Option<Symbol> {
        self.0.borrow().symbols.get(name).cloned()
    }

    /// Binds `name` in this frame only, shadowing any outer binding
    pub fn set_local(&self, name: &str, value: Value) {
        self.set_symbol_local(name, Symbol::new(value));
    }

    /// Binds a full symbol in this frame only
    pub fn set_symbol_local(&self, name: &str, symbol: Symbol) {
        self.0.borrow_mut().symbols.insert(name.to_string(), symbol);
    }

    /// Removes a binding from this frame
    pub fn remove_local(&self, name: &str) -> Option<Symbol> {
        self.0.borrow_mut().symbols.remove(name)
    }

    /// Flags the binding of `name` in this frame for export; false if this
    /// frame does not bind it
    pub fn mark_exported(&self, name: &str) -> bool {
        match self.0.borrow_mut().symbols.get_mut(name) {
            Some(symbol) => {
                symbol.exported = true;
                true
            }
            None => false,
        }
    }

    /// Exported bindings of this frame, sorted by name
    pub fn exported_symbols(&self) -> Vec<(String, Symbol)> {
        let frame = self.0.borrow();
        let mut exported: Vec<_> = frame
            .symbols
            .iter()
            .filter(|(_, symbol)| symbol.exported)
            .map(|(name, symbol)| (name.clone(), symbol.clone()))
            .collect();
        exported.sort_by(|a, b| a.0.cmp(&b.0));
        exported
    }

    /// Names bound in this frame, sorted
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.0.borrow().symbols.keys().cloned().collect();
        names.sort();
        names
    }

    /// Macro registered under `name` in the nearest frame
    pub fn get_macro(&self, name: &str) -> Option<Rc<Macro>> {
        self.find(|frame| frame.macros.get(name).cloned())
    }

    /// True if any frame in the chain registers a macro called `name`
    pub fn has_macro(&self, name: &str) -> bool {
        self.get_macro(name).is_some()
    }

    /// Replaces the nearest macro called `name`, or registers it in this frame
    pub fn set_macro(&self, name: &str, mac: Macro) {
        let mut mac = Some(mac);
        let replaced = self.find(|frame| {
            let slot = frame.macros.get_mut(name)?;
            *slot = Rc::new(mac.take()?);
            Some(())
        });
        if replaced.is_none() {
            if let Some(mac) = mac {
                self.set_macro_local(name, mac);
            }
        }
    }

    /// Registers a macro in this frame only
    pub fn set_macro_local(&self, name: &str, mac: Macro) {
        self.0
            .borrow_mut()
            .macros
            .insert(name.to_string(), Rc::new(mac));
    }

    /// Registers every symbol of `table` in this frame, prefixed with
    /// `namespace:` unless the namespace is empty
    pub fn apply_symbols(&self, namespace: &str, table: Symtab) {
        for (name, symbol) in table {
            self.set_symbol_local(&qualify(namespace, &name), symbol);
        }
    }

    /// Registers every macro of `table` in this frame, prefixed with
    /// `namespace:` unless the namespace is empty
    pub fn apply_macros(&self, namespace: &str, table: Mactab) {
        for (name, mac) in table {
            self.set_macro_local(&qualify(namespace, &name), mac);
        }
    }
}

/// `namespace:name`, or `name` alone for the empty namespace
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}:{}", namespace, name)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let frame = self.0.borrow();
        f.debug_struct("Scope")
            .field("symbols", &frame.symbols.len())
            .field("macros", &frame.macros.len())
            .field("has_parent", &frame.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let root = Scope::new(None);
        root.set_local("x", Value::integer(1));
        let child = root.child();
        assert_eq!(child.get("x"), Some(Value::integer(1)));
        assert!(child.has("x"));
        assert!(!child.has("y"));
        assert_eq!(child.get("y"), None);
    }

    #[test]
    fn test_set_mutates_nearest_binding() {
        let root = Scope::new(None);
        root.set_local("x", Value::integer(1));
        let child = root.child();
        child.set("x", Value::integer(2));
        assert_eq!(root.get("x"), Some(Value::integer(2)));
        assert!(child.local_names().is_empty());
    }

    #[test]
    fn test_set_creates_in_current_frame() {
        let root = Scope::new(None);
        let child = root.child();
        child.set("y", Value::integer(3));
        assert_eq!(child.get("y"), Some(Value::integer(3)));
        assert!(!root.has("y"));
    }

    #[test]
    fn test_set_local_shadows() {
        let root = Scope::new(None);
        root.set_local("x", Value::integer(1));
        let child = root.child();
        child.set_local("x", Value::integer(5));
        assert_eq!(child.get("x"), Some(Value::integer(5)));
        assert_eq!(root.get("x"), Some(Value::integer(1)));
        child.remove_local("x");
        assert_eq!(child.get("x"), Some(Value::integer(1)));
    }

    #[test]
    fn test_set_keeps_flags() {
        let root = Scope::new(None);
        root.set_symbol_local("k", Symbol::constant(Value::integer(1)));
        root.set("k", Value::integer(2));
        let symbol = root.get_symbol("k").unwrap();
        assert!(symbol.constant);
        assert_eq!(symbol.value, Value::integer(2));
    }

    #[test]
    fn test_reads_are_copies() {
        let root = Scope::new(None);
        root.set_local("l", Value::list(vec![Value::integer(1)]));
        if let Some(Value::List(mut items)) = root.get("l") {
            items.push(Value::integer(2));
        }
        assert_eq!(root.get("l").unwrap().to_string(), "(1)");
    }

    #[test]
    fn test_exports() {
        let root = Scope::new(None);
        root.set_local("b", Value::integer(2));
        root.set_local("a", Value::integer(1));
        root.set_local("hidden", Value::Nil);
        assert!(root.mark_exported("b"));
        assert!(root.mark_exported("a"));
        assert!(!root.mark_exported("missing"));
        // bindings of outer frames belong to whoever defined them
        assert!(!root.child().mark_exported("a"));
        let names: Vec<_> = root.exported_symbols().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_apply_symbols_with_namespace() {
        let root = Scope::new(None);
        let mut table = Symtab::new();
        table.insert("pi".into(), Symbol::new(Value::integer(3)));
        root.apply_symbols("math", table.clone());
        root.apply_symbols("", table);
        assert!(root.has("math:pi"));
        assert!(root.has("pi"));
    }
}
