//! Tests for `load`: exports, namespaces and closures over loaded files

use std::fs;
use std::path::PathBuf;

use risp::{Interpreter, Result, Value};

/// Writes `source` to a uniquely named file in the temp directory
fn write_module(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("risp-{}-{}.risp", std::process::id(), name));
    fs::write(&path, source).unwrap();
    path
}

/// Helper to evaluate a program in a fresh interpreter
fn eval_lisp(source: &str) -> Result<Value> {
    let mut interpreter = Interpreter::new();
    interpreter.eval_source("test", source)
}

const GEOMETRY: &str = r#"
(namespace geo)
(def scale 10)
(defun scaled (x) (* x scale))
(def unit 1)
(export scaled unit)
"#;

#[test]
fn test_exports_are_namespaced() {
    let path = write_module("geometry", GEOMETRY);
    let source = format!(r#"(load "{}") (list (geo:scaled 2) geo:unit)"#, path.display());

    let result = eval_lisp(&source).unwrap();
    assert_eq!(
        result,
        Value::list(vec![Value::integer(20), Value::integer(1)])
    );
    fs::remove_file(path).ok();
}

#[test]
fn test_private_bindings_are_not_imported() {
    let path = write_module("private", GEOMETRY);
    let source = format!(r#"(load "{}") scale"#, path.display());

    let err = eval_lisp(&source).unwrap_err();
    assert_eq!(err.message(), "unknown symbol 'scale'");
    fs::remove_file(path).ok();
}

#[test]
fn test_exported_functions_keep_their_file_scope() {
    let path = write_module("pinned", GEOMETRY);
    let source = format!(
        r#"
        (load "{}")
        (def scale 100)
        (geo:scaled 3)
        "#,
        path.display()
    );

    assert_eq!(eval_lisp(&source).unwrap(), Value::integer(30));
    fs::remove_file(path).ok();
}

#[test]
fn test_exported_function_reaches_private_helpers() {
    let path = write_module(
        "helpers",
        r#"
        (defun helper (x) (+ x 1))
        (defun api (x) (helper x))
        (export api)
        "#,
    );

    let mut interpreter = Interpreter::new();
    let load = format!(r#"(load "{}")"#, path.display());
    interpreter.eval_source("test", &load).unwrap();

    assert_eq!(interpreter.eval_source("test", "(api 1)").unwrap(), Value::integer(2));
    let err = interpreter.eval_source("test", "(helper 1)").unwrap_err();
    assert_eq!(err.message(), "unknown function 'helper'");
    fs::remove_file(path).ok();
}

#[test]
fn test_load_returns_last_value() {
    let path = write_module("last", "(def a 1) (+ a 41)");
    let source = format!(r#"(load "{}")"#, path.display());

    assert_eq!(eval_lisp(&source).unwrap(), Value::integer(42));
    fs::remove_file(path).ok();
}

#[test]
fn test_exporting_unknown_symbol_fails() {
    let path = write_module("unknown-export", "(export nothing)");
    let source = format!(r#"(load "{}")"#, path.display());

    let err = eval_lisp(&source).unwrap_err();
    assert_eq!(err.message(), "unknown symbol 'nothing'");
    fs::remove_file(path).ok();
}

#[test]
fn test_exporting_importer_binding_fails() {
    let path = write_module("foreign-export", "(export +)");
    let source = format!(r#"(load "{}")"#, path.display());

    let err = eval_lisp(&source).unwrap_err();
    assert_eq!(
        err.message(),
        "cannot export '+', it is not defined in this scope"
    );
    fs::remove_file(path).ok();
}

#[test]
fn test_errors_in_loaded_file_report_its_name() {
    let path = write_module("broken", "(+ 1 missing)");
    let source = format!(r#"(load "{}")"#, path.display());

    let err = eval_lisp(&source).unwrap_err();
    let expected = format!("risp-{}-broken", std::process::id());
    assert_eq!(&*err.position().source, expected.as_str());
    fs::remove_file(path).ok();
}

#[test]
fn test_missing_file() {
    let err = eval_lisp(r#"(load "/nonexistent/risp/module.risp")"#).unwrap_err();
    assert!(err.message().starts_with("cannot read '/nonexistent/risp/module.risp'"));
}

#[test]
fn test_run_file() {
    let path = write_module("main", "(defun sq (x) (* x x)) (sq 9)");
    let mut interpreter = Interpreter::new();

    assert_eq!(interpreter.run_file(&path).unwrap(), Value::integer(81));
    assert!(interpreter.scope().has("sq"));
    fs::remove_file(path).ok();
}
