//! venturegrid - Formula and KPI engine for incubator dashboards

mod cli;
mod commands;
mod config;
mod error;
mod logging;

use std::env;

use anyhow::Result;

use cli::{Command, Invocation, Parsed};
use config::Settings;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let invocation = match cli::parse_args(&args) {
        Ok(Parsed::Run(invocation)) => invocation,
        Ok(Parsed::Help) => {
            cli::print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::print_usage();
            std::process::exit(1);
        }
    };

    logging::init_logging(invocation.verbose);

    let settings = if invocation.no_config {
        Settings::default()
    } else {
        let (settings, warnings) = config::load_settings(invocation.config_file.as_ref());
        for warning in warnings {
            eprintln!("Warning: {}", warning);
        }
        settings
    };

    if let Err(e) = run(invocation, &settings) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(invocation: Invocation, settings: &Settings) -> Result<()> {
    match invocation.command {
        Command::Eval { formula, grid, at } => {
            println!("{}", commands::eval(&formula, grid.as_deref(), at)?);
        }
        Command::Recalc { input, report } => {
            let (grid_json, recalc_report) = commands::recalc(input.as_deref(), settings)?;
            println!("{}", grid_json);
            if report {
                eprintln!("{}", commands::report_json(&recalc_report)?);
            }
        }
        Command::Kpis {
            input,
            revenue_pct,
            cost_pct,
            initial_investment,
        } => {
            println!(
                "{}",
                commands::kpis(
                    input.as_deref(),
                    revenue_pct,
                    cost_pct,
                    initial_investment,
                    settings
                )?
            );
        }
    }
    Ok(())
}
