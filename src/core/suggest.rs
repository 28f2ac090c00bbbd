use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::config::SimulationConfig;
use super::types::{Currency, FinancialGoal, FinancialSnapshot, GoalType};

const RETIREMENT_SUGGESTION_MAX_AGE: u32 = 50;

/// Monthly income levels above which bigger purchases are suggested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeThresholds {
    pub moderate: Decimal,
    pub good: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalDefault {
    pub goal_type: GoalType,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub amount: Decimal,
    pub description: &'static str,
    pub typical_timeline: &'static str,
}

/// Currencies without a regional profile use the INR one.
fn profile_currency(currency: Currency) -> Currency {
    match currency {
        Currency::Usd => Currency::Usd,
        _ => Currency::Inr,
    }
}

pub fn income_thresholds(currency: Currency) -> IncomeThresholds {
    match profile_currency(currency) {
        Currency::Usd => IncomeThresholds {
            moderate: dec!(600),
            good: dec!(1_200),
        },
        _ => IncomeThresholds {
            moderate: dec!(50_000),
            good: dec!(100_000),
        },
    }
}

fn goal_label(goal_type: GoalType) -> (&'static str, &'static str) {
    match goal_type {
        GoalType::BuyCar => ("Buy a car", "3-5 years"),
        GoalType::BuyHouse => ("Buy a house", "8-15 years"),
        GoalType::RetireEarly => ("Retire early", "15-25 years"),
        GoalType::AnnualTrips => ("Annual vacation fund", "1-2 years"),
        GoalType::Custom => ("Custom goal", "varies"),
    }
}

/// Configured default amount for every goal type that has one.
pub fn goal_defaults(currency: Currency, config: &SimulationConfig) -> Vec<GoalDefault> {
    config
        .suggestion_targets(currency)
        .iter()
        .map(|(goal_type, amount)| {
            let (description, typical_timeline) = goal_label(*goal_type);
            GoalDefault {
                goal_type: *goal_type,
                amount: *amount,
                description,
                typical_timeline,
            }
        })
        .collect()
}

pub fn suggest_goals(
    snapshot: &FinancialSnapshot,
    config: &SimulationConfig,
) -> Vec<FinancialGoal> {
    let amounts = config.suggestion_targets(snapshot.currency);
    let thresholds = income_thresholds(snapshot.currency);
    let income = snapshot.monthly_income.unwrap_or(Decimal::ZERO);

    let suggestion = |goal_type: GoalType, target_year: u32| FinancialGoal {
        goal_type,
        target_amount: amounts.get(&goal_type).copied(),
        target_year: Some(target_year),
        description: Some(goal_label(goal_type).0.to_string()),
    };

    let mut suggestions = Vec::new();
    if income > thresholds.moderate {
        suggestions.push(suggestion(GoalType::BuyCar, 3));
    }
    if income > thresholds.good {
        suggestions.push(suggestion(GoalType::BuyHouse, 8));
    }
    if snapshot.age < RETIREMENT_SUGGESTION_MAX_AGE {
        suggestions.push(suggestion(GoalType::RetireEarly, 20));
    }
    suggestions.push(suggestion(GoalType::AnnualTrips, 2));
    suggestions
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn snapshot(currency: Currency, income: Option<Decimal>, age: u32) -> FinancialSnapshot {
        FinancialSnapshot {
            current_bank_balance: dec!(10_000),
            monthly_income: income,
            monthly_expenses: dec!(1_000),
            investments: vec![],
            currency,
            age,
            marital_status: None,
            dependents: None,
            projection_years: 10,
            goals: vec![],
        }
    }

    fn config() -> SimulationConfig {
        SimulationConfig::default()
    }

    fn types(goals: &[FinancialGoal]) -> Vec<GoalType> {
        goals.iter().map(|goal| goal.goal_type).collect()
    }

    #[test]
    fn high_income_young_user_gets_every_suggestion() {
        let goals = suggest_goals(&snapshot(Currency::Usd, Some(dec!(5_000)), 30), &config());
        assert_eq!(
            types(&goals),
            vec![
                GoalType::BuyCar,
                GoalType::BuyHouse,
                GoalType::RetireEarly,
                GoalType::AnnualTrips
            ]
        );
        assert_eq!(goals[1].target_amount, Some(dec!(200_000)));
        assert_eq!(goals[1].target_year, Some(8));
        assert_eq!(goals[1].description.as_deref(), Some("Buy a house"));
    }

    #[test]
    fn no_income_older_user_only_gets_trips() {
        let goals = suggest_goals(&snapshot(Currency::Inr, None, 55), &config());
        assert_eq!(types(&goals), vec![GoalType::AnnualTrips]);
        assert_eq!(goals[0].target_amount, Some(dec!(100_000)));
    }

    #[test]
    fn thresholds_are_strict() {
        let goals = suggest_goals(&snapshot(Currency::Inr, Some(dec!(50_000)), 60), &config());
        assert_eq!(types(&goals), vec![GoalType::AnnualTrips]);

        let goals = suggest_goals(&snapshot(Currency::Inr, Some(dec!(50_000.01)), 60), &config());
        assert_eq!(types(&goals), vec![GoalType::BuyCar, GoalType::AnnualTrips]);
    }

    #[test]
    fn unprofiled_currency_falls_back_to_inr_amounts() {
        let goals = suggest_goals(&snapshot(Currency::Eur, Some(dec!(1_000)), 60), &config());
        assert_eq!(types(&goals), vec![GoalType::AnnualTrips]);
        assert_eq!(goals[0].target_amount, Some(dec!(100_000)));
    }

    #[test]
    fn goal_defaults_list_every_regional_amount() {
        let defaults = goal_defaults(Currency::Usd, &config());
        assert_eq!(defaults.len(), 4);
        let car = defaults
            .iter()
            .find(|entry| entry.goal_type == GoalType::BuyCar)
            .expect("car default");
        assert_eq!(car.amount, dec!(25_000));
        assert_eq!(car.typical_timeline, "3-5 years");
    }

    #[test]
    fn suggestions_use_configured_amounts() {
        let mut config = config();
        config.default_goal_targets = BTreeMap::from([(
            Currency::Usd,
            BTreeMap::from([(GoalType::BuyCar, dec!(1))]),
        )]);
        config
            .suggested_goal_targets
            .insert(Currency::Eur, BTreeMap::from([(GoalType::AnnualTrips, dec!(3_000))]));

        let goals = suggest_goals(&snapshot(Currency::Usd, Some(dec!(5_000)), 30), &config);
        assert_eq!(goals[0].goal_type, GoalType::BuyCar);
        assert_eq!(goals[0].target_amount, Some(dec!(1)));
        assert_eq!(goals[1].target_amount, Some(dec!(200_000)));

        let goals = suggest_goals(&snapshot(Currency::Eur, None, 60), &config);
        assert_eq!(goals[0].target_amount, Some(dec!(3_000)));

        let defaults = goal_defaults(Currency::Usd, &config);
        let car = defaults
            .iter()
            .find(|entry| entry.goal_type == GoalType::BuyCar)
            .expect("car default");
        assert_eq!(car.amount, dec!(1));
    }
}
