//! Payment Methods

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};

use crate::discounts::percent_points;

/// A way of paying for orders, with a spending limit and a discount.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentMethod<'a> {
    id: String,
    discount_percent: u8,
    limit: Money<'a, Currency>,
}

impl<'a> PaymentMethod<'a> {
    /// Create a new payment method.
    pub fn new(id: impl Into<String>, discount_percent: u8, limit: Money<'a, Currency>) -> Self {
        Self {
            id: id.into(),
            discount_percent,
            limit,
        }
    }

    /// Payment method identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Configured discount in whole percentage points (0 to 100)
    pub fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    /// Configured discount as a percentage
    pub fn discount(&self) -> Percentage {
        percent_points(self.discount_percent)
    }

    /// Total amount this method can absorb
    pub fn limit(&self) -> &Money<'a, Currency> {
        &self.limit
    }
}

/// Payment methods in input order, indexed by identifier.
///
/// Lookups of unknown identifiers return `None`. When identifiers repeat, the
/// first method with that identifier wins.
#[derive(Debug, Clone)]
pub struct MethodCatalog<'a> {
    methods: Vec<PaymentMethod<'a>>,
    index: FxHashMap<String, usize>,
    loyalty_method_id: String,
}

impl<'a> MethodCatalog<'a> {
    /// Build a catalog, marking `loyalty_method_id` as the loyalty points method.
    pub fn new(
        methods: impl Into<Vec<PaymentMethod<'a>>>,
        loyalty_method_id: impl Into<String>,
    ) -> Self {
        let methods = methods.into();
        let mut index = FxHashMap::default();

        for (position, method) in methods.iter().enumerate() {
            index.entry(method.id.clone()).or_insert(position);
        }

        Self {
            methods,
            index,
            loyalty_method_id: loyalty_method_id.into(),
        }
    }

    /// Lookup a method by identifier.
    pub fn get(&self, id: &str) -> Option<&PaymentMethod<'a>> {
        self.index.get(id).and_then(|&position| self.methods.get(position))
    }

    /// Position of the method in the catalog.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// The loyalty points method, if the catalog has one.
    pub fn loyalty(&self) -> Option<&PaymentMethod<'a>> {
        self.get(&self.loyalty_method_id)
    }

    /// Identifier reserved for the loyalty points method.
    pub fn loyalty_method_id(&self) -> &str {
        &self.loyalty_method_id
    }

    /// Non-loyalty methods in catalog order.
    pub fn cards(&self) -> impl Iterator<Item = &PaymentMethod<'a>> {
        self.methods
            .iter()
            .enumerate()
            .filter(|(position, method)| {
                method.id != self.loyalty_method_id && self.position(&method.id) == Some(*position)
            })
            .map(|(_, method)| method)
    }

    /// Looks up a card (non-loyalty) method by identifier.
    pub fn card(&self, id: &str) -> Option<&PaymentMethod<'a>> {
        self.get(id).filter(|method| method.id != self.loyalty_method_id)
    }

    /// The method charged for whatever points do not cover: the first non-loyalty method.
    pub fn default_method(&self) -> Option<&PaymentMethod<'a>> {
        self.cards().next()
    }

    /// All methods in catalog order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = &PaymentMethod<'a>> {
        self.methods.iter()
    }

    /// Number of methods in the catalog.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::PLN;
    use testresult::TestResult;

    use super::*;
    use crate::discounts::percent_of_minor;

    fn catalog() -> MethodCatalog<'static> {
        MethodCatalog::new(
            [
                PaymentMethod::new("PUNKTY", 15, Money::from_minor(10_000, PLN)),
                PaymentMethod::new("mZysk", 10, Money::from_minor(18_000, PLN)),
                PaymentMethod::new("BosBankrut", 5, Money::from_minor(20_000, PLN)),
            ],
            "PUNKTY",
        )
    }

    #[test]
    fn discount_is_percentage_of_points() -> TestResult {
        let method = PaymentMethod::new("mZysk", 10, Money::from_minor(18_000, PLN));

        assert_eq!(method.discount_percent(), 10);
        assert_eq!(percent_of_minor(&method.discount(), 10_000)?, 1_000);

        Ok(())
    }

    #[test]
    fn get_returns_none_for_unknown_ids() {
        let catalog = catalog();

        assert!(catalog.get("mZysk").is_some());
        assert!(catalog.get("UNKNOWN").is_none());
        assert_eq!(catalog.position("BosBankrut"), Some(2));
    }

    #[test]
    fn loyalty_and_cards_are_separated() {
        let catalog = catalog();

        assert_eq!(catalog.loyalty().map(PaymentMethod::id), Some("PUNKTY"));

        let cards: Vec<&str> = catalog.cards().map(PaymentMethod::id).collect();

        assert_eq!(cards, ["mZysk", "BosBankrut"]);
        assert!(catalog.card("PUNKTY").is_none());
        assert!(catalog.card("mZysk").is_some());
    }

    #[test]
    fn default_method_is_first_card_in_catalog_order() {
        let catalog = catalog();

        assert_eq!(catalog.default_method().map(PaymentMethod::id), Some("mZysk"));
    }

    #[test]
    fn no_default_method_without_cards() {
        let catalog = MethodCatalog::new(
            [PaymentMethod::new("PUNKTY", 15, Money::from_minor(10_000, PLN))],
            "PUNKTY",
        );

        assert!(catalog.default_method().is_none());
        assert!(catalog.loyalty().is_some());
    }

    #[test]
    fn missing_loyalty_method_is_absent() {
        let catalog = MethodCatalog::new(
            [PaymentMethod::new("mZysk", 10, Money::from_minor(100, PLN))],
            "PUNKTY",
        );

        assert!(catalog.loyalty().is_none());
        assert_eq!(catalog.cards().count(), 1);
    }

    #[test]
    fn first_duplicate_wins() {
        let catalog = MethodCatalog::new(
            [
                PaymentMethod::new("mZysk", 10, Money::from_minor(100, PLN)),
                PaymentMethod::new("mZysk", 20, Money::from_minor(900, PLN)),
            ],
            "PUNKTY",
        );

        assert_eq!(catalog.get("mZysk").map(PaymentMethod::discount_percent), Some(10));
        assert_eq!(catalog.cards().count(), 1);
        assert_eq!(catalog.len(), 2);
    }
}
