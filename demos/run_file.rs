//! Run a Risp program from a file or stdin
//!
//! Usage: cargo run --example run_file -- [--ast] [--ast-indent <indent>] [--from-stdin] [file]

use anyhow::{bail, Context};
use risp::Interpreter;
use std::io::Read;
use std::{env, fs, process};

struct Options {
    ast: bool,
    ast_indent: Option<String>,
    from_stdin: bool,
    file: Option<String>,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut options = Options {
        ast: false,
        ast_indent: None,
        from_stdin: false,
        file: None,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ast" => options.ast = true,
            "--ast-indent" => {
                let indent = args.next().context("--ast-indent needs a value")?;
                options.ast_indent = Some(indent);
            }
            "--from-stdin" => options.from_stdin = true,
            flag if flag.starts_with("--") => bail!("unknown flag '{}'", flag),
            file => options.file = Some(file.to_string()),
        }
    }
    Ok(options)
}

fn run(options: Options) -> anyhow::Result<()> {
    let (name, source) = if options.from_stdin {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("reading stdin")?;
        ("<stdin>".to_string(), source)
    } else if let Some(file) = &options.file {
        let source = fs::read_to_string(file).with_context(|| format!("reading '{}'", file))?;
        let name = std::path::Path::new(file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone());
        (name, source)
    } else {
        bail!("usage: run_file [--ast] [--ast-indent <indent>] [--from-stdin] [file]");
    };

    if options.ast {
        let nodes = risp::parse(risp::lex(&source, &name)?)?;
        let json = match &options.ast_indent {
            Some(indent) => {
                let mut out = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
                let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
                serde::Serialize::serialize(&nodes, &mut serializer)?;
                String::from_utf8(out)?
            }
            None => serde_json::to_string(&nodes)?,
        };
        println!("{}", json);
        return Ok(());
    }

    let mut interpreter = Interpreter::new();
    interpreter.eval_source(&name, &source)?;
    Ok(())
}

fn main() {
    let result = parse_args().and_then(run);
    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(1);
    }
}
