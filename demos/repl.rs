//! Interactive Risp REPL
//!
//! Lines are collected until their parentheses balance, then every
//! top-level form is evaluated and printed. The last result is bound to `_`.
//!
//! Usage: cargo run --example repl

use risp::runtime::SEQUENCE_RESULT;
use risp::{Interpreter, Token, Value};
use std::io::{self, BufRead, Write};

fn prompt(depth: i32) -> io::Result<()> {
    let mut stdout = io::stdout();
    if depth > 0 {
        write!(stdout, "> ({}) ", depth)?;
    } else {
        write!(stdout, "> ")?;
    }
    stdout.flush()
}

fn describe(value: &Value) -> String {
    match value {
        Value::Nil => format!("===> {}", value),
        _ => format!("===> {} ({})", value, value.type_name()),
    }
}

fn main() -> io::Result<()> {
    println!("Risp {} - type expressions, Ctrl+D to quit", risp::VERSION);

    let mut interpreter = Interpreter::new();
    let mut pending: Vec<Token> = Vec::new();
    let mut depth = 0;

    prompt(depth)?;
    for line in io::stdin().lock().lines() {
        let line = line?;

        match risp::lex(&line, "<repl>") {
            Err(err) => {
                eprintln!("{}", err);
            }
            Ok(tokens) => {
                for token in tokens {
                    depth += token.depth_modifier();
                    pending.push(token);
                }

                if depth <= 0 {
                    depth = 0;
                    let tokens = std::mem::take(&mut pending);
                    match risp::parse(tokens) {
                        Err(err) => eprintln!("{}", err),
                        Ok(nodes) => {
                            for node in &nodes {
                                match interpreter.eval_node(node) {
                                    Ok(value) => {
                                        println!("{}", describe(&value));
                                        interpreter.scope().set_local(SEQUENCE_RESULT, value);
                                    }
                                    Err(err) => eprintln!("{}", err),
                                }
                            }
                        }
                    }
                }
            }
        }

        prompt(depth)?;
    }

    println!();
    Ok(())
}
