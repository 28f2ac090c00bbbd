use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::{Currency, GoalType};

pub const DEFAULT_MAX_PROJECTION_YEARS: u32 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub max_projection_years: u32,
    /// Percent. -100 keeps a depreciating asset from crossing zero.
    pub min_yearly_return: Decimal,
    pub max_yearly_return: Decimal,
    /// Targets used when a goal leaves `target_amount` unset.
    pub default_goal_targets: BTreeMap<Currency, BTreeMap<GoalType, Decimal>>,
    /// Amounts offered by goal suggestions and the defaults catalogue.
    pub suggested_goal_targets: BTreeMap<Currency, BTreeMap<GoalType, Decimal>>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_projection_years: DEFAULT_MAX_PROJECTION_YEARS,
            min_yearly_return: dec!(-100),
            max_yearly_return: dec!(100),
            default_goal_targets: BTreeMap::new(),
            suggested_goal_targets: regional_goal_defaults(),
        }
    }
}

impl SimulationConfig {
    pub fn with_regional_goal_defaults(mut self) -> Self {
        self.default_goal_targets = regional_goal_defaults();
        self
    }

    pub fn default_target(&self, currency: Currency, goal_type: GoalType) -> Option<Decimal> {
        self.default_goal_targets
            .get(&currency)
            .and_then(|targets| targets.get(&goal_type))
            .copied()
    }

    /// Suggestion amounts for `currency`, falling back to the INR table when the
    /// currency has none. Configured goal targets take precedence.
    pub fn suggestion_targets(&self, currency: Currency) -> BTreeMap<GoalType, Decimal> {
        let mut targets = self
            .suggested_goal_targets
            .get(&currency)
            .or_else(|| self.suggested_goal_targets.get(&Currency::Inr))
            .cloned()
            .unwrap_or_default();
        if let Some(overrides) = self.default_goal_targets.get(&currency) {
            targets.extend(overrides);
        }
        targets
    }
}

pub fn regional_goal_defaults() -> BTreeMap<Currency, BTreeMap<GoalType, Decimal>> {
    BTreeMap::from([
        (
            Currency::Usd,
            BTreeMap::from([
                (GoalType::BuyCar, dec!(25_000)),
                (GoalType::BuyHouse, dec!(200_000)),
                (GoalType::RetireEarly, dec!(1_000_000)),
                (GoalType::AnnualTrips, dec!(5_000)),
            ]),
        ),
        (
            Currency::Inr,
            BTreeMap::from([
                (GoalType::BuyCar, dec!(800_000)),
                (GoalType::BuyHouse, dec!(5_000_000)),
                (GoalType::RetireEarly, dec!(25_000_000)),
                (GoalType::AnnualTrips, dec!(100_000)),
            ]),
        ),
    ])
}
