//! Command line configuration

use std::path::PathBuf;

use clap::Parser;

use tender::policy::DEFAULT_LOYALTY_METHOD_ID;

/// Tender payment allocation
#[derive(Debug, Parser)]
#[command(
    name = "tender",
    about = "Assign orders to payment methods to maximise discounts",
    long_about = None
)]
pub struct Cli {
    /// Orders file (JSON or YAML list of `{id, value, promotions}`)
    pub orders: PathBuf,

    /// Payment methods file (JSON or YAML list of `{id, discount, limit}`)
    pub methods: PathBuf,

    /// Currency of every amount in both files
    #[arg(short, long, env = "TENDER_CURRENCY", default_value = "PLN")]
    pub currency: String,

    /// Identifier of the loyalty points payment method
    #[arg(long, env = "TENDER_LOYALTY_METHOD", default_value = DEFAULT_LOYALTY_METHOD_ID)]
    pub loyalty_method: String,

    /// Print a table of every order's plan before the summary
    #[arg(short, long)]
    pub details: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_apply_with_two_paths() -> TestResult {
        let cli = Cli::try_parse_from(["tender", "orders.json", "paymentmethods.json"])?;

        assert_eq!(cli.orders, PathBuf::from("orders.json"));
        assert_eq!(cli.methods, PathBuf::from("paymentmethods.json"));
        assert!(!cli.details);

        Ok(())
    }

    #[test]
    fn options_override_defaults() -> TestResult {
        let cli = Cli::try_parse_from([
            "tender",
            "o.yml",
            "m.yml",
            "--currency",
            "EUR",
            "--loyalty-method",
            "POINTS",
            "--details",
        ])?;

        assert_eq!(cli.currency, "EUR");
        assert_eq!(cli.loyalty_method, "POINTS");
        assert!(cli.details);

        Ok(())
    }

    #[test]
    fn exactly_two_paths_are_required() {
        assert!(Cli::try_parse_from(["tender", "orders.json"]).is_err());
        assert!(Cli::try_parse_from(["tender", "a.json", "b.json", "c.json"]).is_err());
    }
}
