//! Runtime for Risp programs
//!
//! Values, the scope chain, the function and macro calling protocols and the
//! block evaluator that walks syntax nodes.

mod block;
mod function;
mod macros;
mod scope;
mod value;

pub use block::{eval, Block, SEQUENCE_RESULT};
pub use function::{BuiltinFn, CallContext, Closure, Function, FunctionKind};
pub use macros::{Macro, MacroCallContext, MacroHandler};
pub use scope::{qualify, Mactab, Scope, Symbol, Symtab};
pub use value::{format_number, Quote, Value, ValueType};

pub use crate::parser::NodeKind;
