use num::BigRational;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::lexer::Position;
use crate::parser::Node;
use crate::runtime::{Block, Scope, Value, ValueType};

/// Signature shared by every builtin function
pub type BuiltinFn = fn(&mut CallContext<'_>) -> Result<Value>;

/// Everything a builtin sees when it is called
pub struct CallContext<'a> {
    /// The block the call happens in
    pub block: &'a mut Block,
    /// Evaluated arguments, left to right
    pub args: Vec<Value>,
    /// Name the function was registered under
    pub name: &'a str,
    /// Position of the call form
    pub pos: &'a Position,
}

impl CallContext<'_> {
    /// Runtime error at the call position
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::runtime(self.pos.clone(), message)
    }

    /// Checks the argument count and the type of every argument
    pub fn validate(&self, expected: &[ValueType]) -> Result<()> {
        self.expect_count(expected.len())?;
        for (i, (value, want)) in self.args.iter().zip(expected).enumerate() {
            self.expect_type(i, value, *want)?;
        }
        Ok(())
    }

    /// Checks that every argument, however many, has the given type
    pub fn validate_all(&self, want: ValueType) -> Result<()> {
        for (i, value) in self.args.iter().enumerate() {
            self.expect_type(i, value, want)?;
        }
        Ok(())
    }

    /// Checks the argument count only
    pub fn expect_count(&self, count: usize) -> Result<()> {
        if self.args.len() != count {
            return Err(self.error(format!(
                "{}: expected {} arguments, got {}",
                self.name,
                count,
                self.args.len()
            )));
        }
        Ok(())
    }

    fn expect_type(&self, index: usize, value: &Value, want: ValueType) -> Result<()> {
        if want != ValueType::Any && value.value_type() != want {
            return Err(self.error(format!(
                "{}: argument {} should be of type {}, got {}",
                self.name,
                index + 1,
                want,
                value.type_name()
            )));
        }
        Ok(())
    }

    /// Number argument at `index`
    pub fn number(&self, index: usize) -> Result<&BigRational> {
        match self.args.get(index) {
            Some(Value::Number(n)) => Ok(n),
            other => Err(self.type_mismatch(index, ValueType::Number, other)),
        }
    }

    /// Number argument at `index`, truncated toward zero
    pub fn integer(&self, index: usize) -> Result<i64> {
        let value = self.number(index)?;
        Value::Number(value.clone())
            .to_i64()
            .ok_or_else(|| self.error(format!("{}: number out of range", self.name)))
    }

    /// Number argument at `index` as a list index or length
    pub fn index(&self, index: usize) -> Result<usize> {
        let n = self.integer(index)?;
        usize::try_from(n)
            .map_err(|_| self.error(format!("{}: expected a non-negative index, got {}", self.name, n)))
    }

    /// String argument at `index`
    pub fn string(&self, index: usize) -> Result<&str> {
        match self.args.get(index) {
            Some(Value::String(s)) => Ok(s),
            other => Err(self.type_mismatch(index, ValueType::String, other)),
        }
    }

    /// Boolean argument at `index`
    pub fn boolean(&self, index: usize) -> Result<bool> {
        match self.args.get(index) {
            Some(Value::Boolean(b)) => Ok(*b),
            other => Err(self.type_mismatch(index, ValueType::Boolean, other)),
        }
    }

    /// Takes ownership of the list argument at `index`, leaving nil behind
    pub fn take_list(&mut self, index: usize) -> Result<Vec<Value>> {
        if let Some(Value::List(items)) = self.args.get_mut(index) {
            return Ok(std::mem::take(items));
        }
        Err(self.type_mismatch(index, ValueType::List, self.args.get(index)))
    }

    /// Takes ownership of the argument at `index`, leaving nil behind
    pub fn take(&mut self, index: usize) -> Value {
        self.args
            .get_mut(index)
            .map(std::mem::take)
            .unwrap_or(Value::Nil)
    }

    fn type_mismatch(&self, index: usize, want: ValueType, got: Option<&Value>) -> Error {
        match got {
            Some(value) => self.error(format!(
                "{}: argument {} should be of type {}, got {}",
                self.name,
                index + 1,
                want,
                value.type_name()
            )),
            None => self.error(format!("{}: missing argument {}", self.name, index + 1)),
        }
    }
}

/// User-defined function body with its parameter names
#[derive(Clone)]
pub struct Closure {
    /// Parameter names, bound positionally
    pub params: Vec<String>,
    /// Body forms, evaluated in order; the last one is the result
    pub body: Rc<[Node]>,
    /// Scope the call frame is chained to; the caller's scope when unset
    pub scope: Option<Scope>,
}

/// How a function is executed
#[derive(Clone)]
pub enum FunctionKind {
    /// Implemented in Rust
    Builtin(BuiltinFn),
    /// Created by `defun`
    Declared(Closure),
    /// Created by `fun`
    Lambda(Closure),
}

/// A callable value
#[derive(Clone)]
pub struct Function {
    /// Name used in error messages
    pub name: String,
    /// Implementation
    pub kind: FunctionKind,
}

impl Function {
    /// Wraps a Rust function
    pub fn builtin(name: impl Into<String>, handler: BuiltinFn) -> Self {
        Function {
            name: name.into(),
            kind: FunctionKind::Builtin(handler),
        }
    }

    /// A named function as created by `defun`
    pub fn declared(name: impl Into<String>, params: Vec<String>, body: Rc<[Node]>) -> Self {
        Function {
            name: name.into(),
            kind: FunctionKind::Declared(Closure {
                params,
                body,
                scope: None,
            }),
        }
    }

    /// An anonymous function as created by `fun`
    pub fn lambda(params: Vec<String>, body: Rc<[Node]>) -> Self {
        Function {
            name: "<lambda>".to_string(),
            kind: FunctionKind::Lambda(Closure {
                params,
                body,
                scope: None,
            }),
        }
    }

    /// Number of declared parameters; `None` for builtins, which check
    /// their own arguments
    pub fn arity(&self) -> Option<usize> {
        match &self.kind {
            FunctionKind::Builtin(_) => None,
            FunctionKind::Declared(c) | FunctionKind::Lambda(c) => Some(c.params.len()),
        }
    }

    /// Copy of this function whose call frames chain to `scope` instead of
    /// the caller's scope; builtins are returned unchanged
    pub fn pinned_to(&self, scope: &Scope) -> Function {
        let mut pinned = self.clone();
        match &mut pinned.kind {
            FunctionKind::Builtin(_) => {}
            FunctionKind::Declared(c) | FunctionKind::Lambda(c) => c.scope = Some(scope.clone()),
        }
        pinned
    }

    /// Calls the function with already evaluated arguments
    pub fn call(&self, block: &mut Block, args: Vec<Value>, pos: &Position) -> Result<Value> {
        tracing::trace!(function = %self.name, args = args.len(), "calling function");

        match &self.kind {
            FunctionKind::Builtin(handler) => {
                let mut ctx = CallContext {
                    block,
                    args,
                    name: &self.name,
                    pos,
                };
                handler(&mut ctx)
            }
            FunctionKind::Declared(closure) | FunctionKind::Lambda(closure) => {
                if args.len() != closure.params.len() {
                    return Err(Error::runtime(
                        pos.clone(),
                        format!(
                            "'{}' expected {} arguments, got {}",
                            self.name,
                            closure.params.len(),
                            args.len()
                        ),
                    ));
                }

                let parent = closure.scope.as_ref().unwrap_or(&block.scope);
                let mut frame = Block::new(closure.body.clone(), parent.child());
                for (param, arg) in closure.params.iter().zip(args) {
                    frame.scope.set_local(param, arg);
                }
                frame.eval()
            }
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match &self.kind {
            FunctionKind::Builtin(_) => "builtin",
            FunctionKind::Declared(_) => "declared",
            FunctionKind::Lambda(_) => "lambda",
        };
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("arity", &self.arity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(ctx: &mut CallContext<'_>) -> Result<Value> {
        ctx.validate(&[ValueType::Any])?;
        Ok(ctx.take(0))
    }

    fn position() -> Position {
        Position::new("test", 1, 1)
    }

    #[test]
    fn test_builtin_call() {
        let f = Function::builtin("identity", identity);
        let mut block = Block::new(Vec::new(), Scope::new(None));
        let result = f.call(&mut block, vec![Value::integer(7)], &position()).unwrap();
        assert_eq!(result, Value::integer(7));
    }

    #[test]
    fn test_builtin_arity_message() {
        let f = Function::builtin("identity", identity);
        let mut block = Block::new(Vec::new(), Scope::new(None));
        let err = f.call(&mut block, vec![], &position()).unwrap_err();
        assert_eq!(err.message(), "identity: expected 1 arguments, got 0");
    }

    #[test]
    fn test_declared_arity_message() {
        let f = Function::declared("f", vec!["a".into(), "b".into()], Rc::from(Vec::new()));
        let mut block = Block::new(Vec::new(), Scope::new(None));
        let err = f
            .call(&mut block, vec![Value::integer(1)], &position())
            .unwrap_err();
        assert_eq!(err.message(), "'f' expected 2 arguments, got 1");
    }

    #[test]
    fn test_empty_body_returns_nil() {
        let f = Function::lambda(vec![], Rc::from(Vec::new()));
        let mut block = Block::new(Vec::new(), Scope::new(None));
        assert_eq!(f.call(&mut block, vec![], &position()).unwrap(), Value::Nil);
    }

    #[test]
    fn test_pinning_leaves_original_untouched() {
        let f = Function::lambda(vec![], Rc::from(Vec::new()));
        let pinned = f.pinned_to(&Scope::new(None));
        assert!(matches!(&f.kind, FunctionKind::Lambda(c) if c.scope.is_none()));
        assert!(matches!(&pinned.kind, FunctionKind::Lambda(c) if c.scope.is_some()));
    }

    #[test]
    fn test_type_validation_message() {
        fn wants_number(ctx: &mut CallContext<'_>) -> Result<Value> {
            ctx.validate(&[ValueType::Number])?;
            Ok(Value::Nil)
        }
        let f = Function::builtin("n", wants_number);
        let mut block = Block::new(Vec::new(), Scope::new(None));
        let err = f.call(&mut block, vec![Value::from("x")], &position()).unwrap_err();
        assert_eq!(err.message(), "n: argument 1 should be of type number, got string");
    }
}
