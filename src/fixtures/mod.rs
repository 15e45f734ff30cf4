//! Fixtures
//!
//! Loads orders and payment methods from JSON or YAML documents.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, PLN, USD},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    fixtures::{methods::MethodFixture, orders::OrderFixture},
    methods::PaymentMethod,
    orders::Order,
    policy::DEFAULT_LOYALTY_METHOD_ID,
    pricing::decimal_to_minor,
};

pub mod methods;
pub mod orders;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (or JSON) parsing error
    #[error("Failed to parse fixture: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid amount format
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid discount percentage
    #[error("Invalid discount percentage: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// An order or payment method has an empty identifier
    #[error("{kind} with an empty id")]
    EmptyId {
        /// `order` or `payment method`
        kind: &'static str,
    },

    /// Two orders or two payment methods share an identifier
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// `order` or `payment method`
        kind: &'static str,

        /// The repeated identifier
        id: String,
    },

    /// Order value is zero or negative
    #[error("Order {order_id} must have a positive value, got {value}")]
    NonPositiveValue {
        /// Order identifier
        order_id: String,

        /// Value as written in the fixture
        value: String,
    },

    /// Payment method limit is negative
    #[error("Payment method {method_id} must have a non-negative limit, got {limit}")]
    NegativeLimit {
        /// Payment method identifier
        method_id: String,

        /// Limit as written in the fixture
        limit: String,
    },

    /// The catalog has nothing but the loyalty method
    #[error("Payment methods must include at least one method other than {loyalty_method_id}")]
    NoDefaultMethod {
        /// Identifier of the loyalty points method
        loyalty_method_id: String,
    },
}

/// Amount written either as a string (`"100.00"`) or as a number (`100.0`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountFixture {
    /// Whole number
    Integer(i64),

    /// Fractional number
    Float(f64),

    /// Decimal string
    Text(String),
}

impl AmountFixture {
    /// Parse into a decimal, exactly as written.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidAmount`] if the text is not a decimal number.
    pub fn to_decimal(&self) -> Result<Decimal, FixtureError> {
        match self {
            AmountFixture::Integer(value) => Ok(Decimal::from(*value)),
            AmountFixture::Float(value) => parse_decimal(&value.to_string()),
            AmountFixture::Text(value) => parse_decimal(value),
        }
    }

    /// Parse into money in `currency`, rounding half-up to minor units.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidAmount`] if the amount cannot be parsed or is out of range.
    pub fn to_money(
        &self,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, FixtureError> {
        let minor = decimal_to_minor(self.to_decimal()?)
            .ok_or_else(|| FixtureError::InvalidAmount(self.to_string()))?;

        Ok(Money::from_minor(minor, currency))
    }
}

impl std::fmt::Display for AmountFixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountFixture::Integer(value) => write!(f, "{value}"),
            AmountFixture::Float(value) => write!(f, "{value}"),
            AmountFixture::Text(value) => write!(f, "{value}"),
        }
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, FixtureError> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidAmount(s.to_string()))
}

/// Look up a supported currency by ISO code (`PLN`, `EUR`, `GBP`, `USD`).
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for any other code.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "PLN" => Ok(PLN),
        "EUR" => Ok(EUR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        _ => Err(FixtureError::UnknownCurrency(code.to_string())),
    }
}

/// Orders and payment methods for one allocation run.
#[derive(Debug)]
pub struct Fixture {
    /// Identifier of the loyalty points method
    loyalty_method_id: String,

    /// Currency of every amount
    currency: &'static Currency,

    /// Orders in file order
    orders: Vec<Order<'static>>,

    /// Payment methods in file order
    methods: Vec<PaymentMethod<'static>>,
}

impl Fixture {
    /// Create an empty fixture with amounts in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            loyalty_method_id: DEFAULT_LOYALTY_METHOD_ID.to_string(),
            currency,
            orders: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Use `loyalty_method_id` as the loyalty points method when validating methods.
    #[must_use]
    pub fn with_loyalty_method(mut self, loyalty_method_id: impl Into<String>) -> Self {
        self.loyalty_method_id = loyalty_method_id.into();
        self
    }

    /// Load orders and payment methods from two files.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read, parsed, or validated.
    pub fn from_files(
        orders_path: impl AsRef<Path>,
        methods_path: impl AsRef<Path>,
        currency: &'static Currency,
    ) -> Result<Self, FixtureError> {
        let mut fixture = Self::new(currency);

        fixture.load_orders(orders_path)?.load_methods(methods_path)?;

        Ok(fixture)
    }

    /// Load orders from a JSON or YAML list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, an id is empty or
    /// repeated, or a value is not positive.
    pub fn load_orders(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(path.as_ref())?;

        self.parse_orders(&contents)
    }

    /// Parse orders from a JSON or YAML string.
    ///
    /// # Errors
    ///
    /// See [`Fixture::load_orders`].
    pub fn parse_orders(&mut self, contents: &str) -> Result<&mut Self, FixtureError> {
        let fixtures: Vec<OrderFixture> = serde_norway::from_str(contents)?;
        let mut seen: FxHashSet<String> =
            self.orders.iter().map(|o| o.id().to_string()).collect();

        for fixture in fixtures {
            let order = fixture.into_order(self.currency)?;

            if !seen.insert(order.id().to_string()) {
                return Err(FixtureError::DuplicateId {
                    kind: "order",
                    id: order.id().to_string(),
                });
            }

            self.orders.push(order);
        }

        debug!(orders = self.orders.len(), "loaded orders");

        Ok(self)
    }

    /// Load payment methods from a JSON or YAML list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, an id is empty or
    /// repeated, a discount or limit is out of range, or no method other than
    /// the loyalty method is defined.
    pub fn load_methods(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(path.as_ref())?;

        self.parse_methods(&contents)
    }

    /// Parse payment methods from a JSON or YAML string.
    ///
    /// # Errors
    ///
    /// See [`Fixture::load_methods`].
    pub fn parse_methods(&mut self, contents: &str) -> Result<&mut Self, FixtureError> {
        let fixtures: Vec<MethodFixture> = serde_norway::from_str(contents)?;
        let mut seen: FxHashSet<String> =
            self.methods.iter().map(|m| m.id().to_string()).collect();

        for fixture in fixtures {
            let method = fixture.into_method(self.currency)?;

            if !seen.insert(method.id().to_string()) {
                return Err(FixtureError::DuplicateId {
                    kind: "payment method",
                    id: method.id().to_string(),
                });
            }

            self.methods.push(method);
        }

        if !self.methods.iter().any(|m| m.id() != self.loyalty_method_id) {
            return Err(FixtureError::NoDefaultMethod {
                loyalty_method_id: self.loyalty_method_id.clone(),
            });
        }

        if !seen.contains(&self.loyalty_method_id) {
            warn!(
                loyalty_method_id = %self.loyalty_method_id,
                "no loyalty points method defined, orders can only be paid by card"
            );
        }

        debug!(methods = self.methods.len(), "loaded payment methods");

        Ok(self)
    }

    /// Loaded orders, in file order.
    pub fn orders(&self) -> &[Order<'static>] {
        &self.orders
    }

    /// Loaded payment methods, in file order.
    pub fn methods(&self) -> &[PaymentMethod<'static>] {
        &self.methods
    }

    /// Currency of every amount.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Identifier of the loyalty points method.
    pub fn loyalty_method_id(&self) -> &str {
        &self.loyalty_method_id
    }
}
