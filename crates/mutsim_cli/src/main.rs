//! mutsim: runs the bundled numerical demos.
//!
//! Commands:
//!   mutsim lu        solve the 5x5 tridiagonal example through LU factors
//!   mutsim multiply  multiply the example matrices
//!   mutsim mutation  simulate the four-allele mutation chain
//!   mutsim all       run everything (default)
//!
//! `--json` makes `mutation` emit the chart payload instead of the console table.

mod chart;

use anyhow::{bail, Result};
use chart::{ConsoleChart, JsonChart};
use log::error;
use mutsim_core::{
    lu_decompose, multiply, run_simulation_with_sink, ChainSettings, MatrixError,
};
use nalgebra::DMatrix;
use std::env;
use std::io;

fn print_usage() {
    println!(
        r#"
Usage: mutsim [command] [--json]

Commands:
  lu         Solve A x = B through LU factors
  multiply   Multiply the example matrices
  mutation   Simulate allele frequencies under mutation
  all        Run every demo (default)
"#
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let command = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(String::as_str)
        .unwrap_or("all");

    let outcome = match command {
        "lu" => run_lu(),
        "multiply" => run_multiply(),
        "mutation" => run_mutation(json),
        "all" => run_lu().and_then(|_| run_multiply()).and_then(|_| run_mutation(json)),
        "help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            Err(anyhow::anyhow!("Unknown command: {}", other))
        }
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_lu() -> Result<()> {
    let a = DMatrix::from_row_slice(
        5,
        5,
        &[
            2.0, 1.0, 0.0, 0.0, 0.0, //
            4.0, 3.0, 1.0, 0.0, 0.0, //
            0.0, 2.0, 3.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, 4.0, 2.0, //
            0.0, 0.0, 0.0, 1.0, 5.0,
        ],
    );
    let b = [1.0, 4.0, 10.0, 18.0, 19.0];

    let factors = lu_decompose(&a)?;
    println!("L ={}U ={}", factors.lower, factors.upper);
    let x = factors.solve(&b)?;
    println!("x = {:?}", x);
    Ok(())
}

fn run_multiply() -> Result<()> {
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -2.0]);
    let b = DMatrix::from_row_slice(
        4,
        4,
        &[
            2.0, 0.0, 0.0, 0.0, //
            0.0, 3.0, 0.0, 0.0, //
            0.0, 0.0, -4.0, 0.0, //
            0.0, 0.0, 0.0, 5.0,
        ],
    );
    println!("a ={}", a);
    match multiply(&a, &b) {
        Ok(product) => println!("a * b ={}", product),
        Err(e @ MatrixError::DimensionMismatch { .. }) => println!("{}", e),
        Err(e) => bail!(e),
    }
    Ok(())
}

fn run_mutation(json: bool) -> Result<()> {
    let initial = [0.4, 0.3, 0.2, 0.1];
    let raw_rates = DMatrix::from_row_slice(
        4,
        4,
        &[
            0.0, 0.01, 0.005, 0.03, //
            0.02, 0.0, 0.01, 0.01, //
            0.001, 0.03, 0.0, 0.2, //
            0.0, 0.1, 0.2, 0.0,
        ],
    );
    let settings = ChainSettings::default();

    let stdout = io::stdout();
    if json {
        let mut sink = JsonChart::new(stdout.lock());
        run_simulation_with_sink(&initial, &raw_rates, settings, &mut sink)?;
    } else {
        let mut sink = ConsoleChart::new(stdout.lock());
        run_simulation_with_sink(&initial, &raw_rates, settings, &mut sink)?;
    }
    Ok(())
}
