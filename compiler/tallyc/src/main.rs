//! Tally REPL
//!
//! Reads one expression per line from stdin and prints its answer.

use std::io::{self, BufRead};
use std::process::ExitCode;

use tally_eval::CalcValue;
use tallyc::{
    init_tracing, CalcResult, Calculator, Notation, PositionalPrinter, RadixDisplay,
    DEFAULT_FRACTION_DIGITS,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dialect {
    Typed,
    Integer,
    Float,
}

fn print_usage() {
    eprintln!("Usage: tally [--prefix | --infix | --postfix] [--typed | --integer | --float]");
    eprintln!();
    eprintln!("Reads expressions from stdin, one per line.");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  :prefix, :infix, :postfix   Switch notation");
    eprintln!("  :stack                      Show the global stack");
    eprintln!("  :clear                      Empty the global stack");
    eprintln!("  :radix N                    Print answers in radix N (10 resets)");
    eprintln!();
    eprintln!("Set TALLY_LOG (e.g. TALLY_LOG=debug) to enable tracing.");
}

fn main() -> ExitCode {
    init_tracing();

    let mut notation = Notation::Infix;
    let mut dialect = Dialect::Typed;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--prefix" => notation = Notation::Prefix,
            "--infix" => notation = Notation::Infix,
            "--postfix" => notation = Notation::Postfix,
            "--typed" => dialect = Dialect::Typed,
            "--integer" => dialect = Dialect::Integer,
            "--float" => dialect = Dialect::Float,
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("error: unknown option '{other}'");
                print_usage();
                return ExitCode::from(2);
            }
        }
    }

    let result = match dialect {
        Dialect::Typed => Calculator::typed().map(|calc| repl(calc, notation)),
        Dialect::Integer => Calculator::integer().map(|calc| repl(calc, notation)),
        Dialect::Float => Calculator::float().map(|calc| repl(calc, notation)),
    };
    match result {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(err)) => {
            eprintln!("error: can't read input: {err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: can't set up calculator: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Mutable REPL settings.
struct Session {
    notation: Notation,
    printer: Option<PositionalPrinter>,
}

fn repl<V: CalcValue + RadixDisplay>(mut calc: Calculator<V>, notation: Notation) -> io::Result<()> {
    let mut session = Session {
        notation,
        printer: None,
    };
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix(':') {
            run_command(&mut calc, &mut session, command);
            continue;
        }
        report(calc.compile_and_execute(session.notation, line), session.printer.as_ref());
    }
    Ok(())
}

fn run_command<V: CalcValue>(calc: &mut Calculator<V>, session: &mut Session, command: &str) {
    if let Some(radix) = command.strip_prefix("radix") {
        set_radix(session, radix.trim());
        return;
    }
    match command {
        "stack" => {
            let values: Vec<String> = calc.global_stack().iter().map(ToString::to_string).collect();
            println!("[{}]", values.join(", "));
        }
        "clear" => calc.clear_global_stack(),
        other => match other.parse::<Notation>() {
            Ok(selected) => {
                session.notation = selected;
                println!("notation: {selected}");
            }
            Err(_) => eprintln!("error: unknown command ':{other}'"),
        },
    }
}

fn set_radix(session: &mut Session, radix: &str) {
    let printer = radix
        .parse::<u32>()
        .map_err(|err| err.to_string())
        .and_then(|radix| PositionalPrinter::new(radix, DEFAULT_FRACTION_DIGITS).map_err(|err| err.to_string()));
    match printer {
        Ok(printer) if printer.radix() == 10 => session.printer = None,
        Ok(printer) => session.printer = Some(printer),
        Err(err) => eprintln!("error: bad radix '{radix}': {err}"),
    }
}

fn report<V: CalcValue + RadixDisplay>(result: CalcResult<Option<V>>, printer: Option<&PositionalPrinter>) {
    match result {
        Ok(Some(value)) => match printer {
            Some(printer) => println!("{}", value.to_radix_string(printer)),
            None => println!("{value}"),
        },
        Ok(None) => println!("(no result)"),
        Err(err) => eprintln!("{} error: {err}", err.category()),
    }
}
