// =============================================================================
// MAIN - Command line driver
// =============================================================================
//
// Translates a scanner token stream into stack machine code, hands the
// generated text through the loader the way a separate machine would
// receive it, and executes it.

mod bytecode;
mod runtime;
mod symtab;
mod token;

#[cfg(test)]
mod testutil;

use std::env;
use std::fs;
use std::io;
use std::process;

use bytecode::Program;
use runtime::{Vm, VmConfig};

#[derive(Default)]
struct Options {
    show_asm: bool,
    show_listing: bool,
    trace: bool,
    output: Option<String>,
    stack: Option<usize>,
    input: Option<String>,
}

fn usage() {
    eprintln!("usage: pzero [options] <lexeme-file>");
    eprintln!();
    eprintln!("options:");
    eprintln!("  -a, --asm        print the generated code text to stdout");
    eprintln!("  -l, --listing    print a mnemonic listing to stdout");
    eprintln!("  -t, --trace      write a per-instruction execution trace to stderr");
    eprintln!("  -o <file>        also write the generated code text to <file>");
    eprintln!("  --stack <n>      override the stack height ceiling");
}

fn parse_args() -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-a" | "--asm" => opts.show_asm = true,
            "-l" | "--listing" => opts.show_listing = true,
            "-t" | "--trace" => opts.trace = true,
            "-o" => {
                opts.output = Some(args.next().ok_or("-o requires a file name")?);
            }
            "--stack" => {
                let value = args.next().ok_or("--stack requires a number")?;
                let height = value
                    .parse()
                    .map_err(|_| format!("invalid stack height: {value}"))?;
                opts.stack = Some(height);
            }
            _ if arg.starts_with('-') => return Err(format!("unknown option: {arg}")),
            _ => {
                if opts.input.is_some() {
                    return Err("more than one input file".to_string());
                }
                opts.input = Some(arg);
            }
        }
    }
    Ok(opts)
}

fn main() {
    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("error: {msg}");
            usage();
            process::exit(1);
        }
    };
    let Some(path) = opts.input else {
        usage();
        process::exit(1);
    };

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: could not read {path}: {e}");
            process::exit(1);
        }
    };

    let program = match bytecode::compile(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("translation error: {e}");
            process::exit(1);
        }
    };

    let text = program.to_text();
    if opts.show_asm {
        print!("{text}");
    }
    if let Some(out_path) = &opts.output {
        if let Err(e) = fs::write(out_path, &text) {
            eprintln!("error: could not write {out_path}: {e}");
            process::exit(1);
        }
    }

    let program = match Program::from_text(&text) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("load error: {e}");
            process::exit(1);
        }
    };
    if opts.show_listing {
        print!("{}", bytecode::listing(&program));
    }

    let config = VmConfig {
        max_stack_height: opts.stack.unwrap_or(runtime::MAX_STACK_HEIGHT),
    };
    let mut vm = Vm::new(program).with_config(config);

    let result = if opts.trace {
        vm.run_traced(&mut io::stderr())
    } else {
        vm.run()
    };
    if let Err(e) = result {
        eprintln!("runtime error: {e}");
        process::exit(1);
    }
}
