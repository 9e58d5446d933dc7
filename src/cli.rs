//! Command-line argument parsing.

use std::path::PathBuf;

use venturegrid_engine::CellRef;

use crate::error::{AppError, Result};

pub fn print_usage() {
    eprintln!("Usage: venturegrid [OPTIONS] <COMMAND> [ARGS]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  eval <FORMULA>              Evaluate a formula against a grid");
    eprintln!("  recalc [FILE]               Recalculate a grid JSON file (stdin if omitted or '-')");
    eprintln!("  kpis [FILE]                 Adjust a financial record and compute KPIs (stdin if omitted or '-')");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --grid <FILE>               Grid JSON used by eval (default: built-in quarterly sheet)");
    eprintln!("  --at <REF>                  Cell the evaluated formula lives in, e.g. C3");
    eprintln!("  --report                    Print the recalculation report to stderr");
    eprintln!("  --revenue-pct <N>           Revenue sensitivity in whole percent (default: 0)");
    eprintln!("  --cost-pct <N>              COGS sensitivity in whole percent (default: 0)");
    eprintln!("  --initial-investment <N>    Added undiscounted to NPV (default: from config)");
    eprintln!("  --config <FILE>             Load settings from this TOML file");
    eprintln!("  --no-config                 Ignore configuration files");
    eprintln!("  -v, --verbose               Enable debug logging");
    eprintln!("  -h, --help                  Print help");
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Eval {
        formula: String,
        grid: Option<PathBuf>,
        at: Option<CellRef>,
    },
    Recalc {
        input: Option<PathBuf>,
        report: bool,
    },
    Kpis {
        input: Option<PathBuf>,
        revenue_pct: f64,
        cost_pct: f64,
        initial_investment: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub config_file: Option<PathBuf>,
    pub no_config: bool,
    pub verbose: bool,
}

/// Parsed arguments, or a request for help.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Run(Invocation),
    Help,
}

/// Parse arguments, excluding the program name.
pub fn parse_args(args: &[String]) -> Result<Parsed> {
    let mut positionals: Vec<String> = Vec::new();
    let mut grid: Option<PathBuf> = None;
    let mut at: Option<CellRef> = None;
    let mut report = false;
    let mut revenue_pct = 0.0;
    let mut cost_pct = 0.0;
    let mut initial_investment: Option<f64> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut no_config = false;
    let mut verbose = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(Parsed::Help),
            "-v" | "--verbose" => verbose = true,
            "--report" => report = true,
            "--no-config" => no_config = true,
            "--grid" => grid = Some(PathBuf::from(take_value(args, &mut i)?)),
            "--config" => config_file = Some(PathBuf::from(take_value(args, &mut i)?)),
            "--at" => {
                let value = take_value(args, &mut i)?;
                at = Some(
                    CellRef::parse(value).ok_or_else(|| AppError::InvalidCellRef(value.to_string()))?,
                );
            }
            "--revenue-pct" => revenue_pct = take_number(args, &mut i)?,
            "--cost-pct" => cost_pct = take_number(args, &mut i)?,
            "--initial-investment" => initial_investment = Some(take_number(args, &mut i)?),
            // A lone '-' means stdin; anything else starting with '-' that is
            // not a negative number is an unknown flag.
            arg if arg.starts_with('-') && arg != "-" && arg.parse::<f64>().is_err() => {
                return Err(AppError::Usage(format!("Unknown option: {}", arg)));
            }
            _ => positionals.push(args[i].clone()),
        }
        i += 1;
    }

    let mut positionals = positionals.into_iter();
    let command = match positionals.next().as_deref() {
        Some("eval") => {
            let formula = positionals
                .next()
                .ok_or_else(|| AppError::Usage("eval requires a formula".into()))?;
            Command::Eval { formula, grid, at }
        }
        Some("recalc") => Command::Recalc {
            input: input_path(positionals.next()),
            report,
        },
        Some("kpis") => Command::Kpis {
            input: input_path(positionals.next()),
            revenue_pct,
            cost_pct,
            initial_investment,
        },
        Some(other) => return Err(AppError::Usage(format!("Unknown command: {}", other))),
        None => return Err(AppError::Usage("No command given".into())),
    };

    if let Some(extra) = positionals.next() {
        return Err(AppError::Usage(format!("Unexpected argument: {}", extra)));
    }

    Ok(Parsed::Run(Invocation {
        command,
        config_file,
        no_config,
        verbose,
    }))
}

fn input_path(arg: Option<String>) -> Option<PathBuf> {
    arg.filter(|a| a != "-").map(PathBuf::from)
}

fn take_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| AppError::MissingValue(flag.clone()))
}

fn take_number(args: &[String], i: &mut usize) -> Result<f64> {
    let flag = args[*i].clone();
    let value = take_value(args, i)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| AppError::InvalidNumber {
            flag,
            value: value.to_string(),
        })
}
