//! Tender command line

use std::{io, process::ExitCode};

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tender::{
    fixtures::{Fixture, parse_currency},
    policy::AllocationPolicy,
    receipt::Receipt,
    solvers::{Solver, greedy::GreedySolver},
};

use crate::cli::Cli;

mod cli;

/// Tender entry point
pub fn main() -> ExitCode {
    // Load configuration from .env and CLI arguments
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(error) => {
            // Help and version requests exit cleanly; usage errors exit with 1.
            let code = if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };

            _ = error.print();

            return code;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");

            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let currency = parse_currency(&cli.currency)?;

    let mut fixture = Fixture::new(currency).with_loyalty_method(cli.loyalty_method.clone());

    fixture
        .load_orders(&cli.orders)
        .with_context(|| format!("failed to load orders from {}", cli.orders.display()))?
        .load_methods(&cli.methods)
        .with_context(|| {
            format!(
                "failed to load payment methods from {}",
                cli.methods.display()
            )
        })?;

    info!(
        orders = fixture.orders().len(),
        methods = fixture.methods().len(),
        "loaded input"
    );

    let solver = GreedySolver::new(AllocationPolicy::with_loyalty_method(
        cli.loyalty_method.clone(),
    ));

    let allocation = solver
        .solve(fixture.orders(), fixture.methods())
        .context("failed to allocate orders to payment methods")?;

    let receipt = Receipt::from_allocation(&allocation)?;

    info!(
        discount = %tender::pricing::format_amount(&receipt.total_discount()),
        "allocation finished"
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if cli.details {
        receipt.write_to(&mut handle)?;
    } else {
        receipt.write_summary(&mut handle)?;
    }

    Ok(())
}
