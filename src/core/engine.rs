use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use super::config::SimulationConfig;
use super::error::{Result, SimulationError};
use super::types::{
    CashRunway, FinancialGoal, FinancialSnapshot, Investment, InvestmentMode, SimulationResult,
    Tag, YearProjection,
};

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

#[derive(Debug)]
struct Trajectory {
    points: Vec<YearProjection>,
    liquid_cash_end: Decimal,
    total_investments: Decimal,
}

#[derive(Debug)]
struct GoalOutcome {
    key: String,
    target: Option<Decimal>,
    feasible: bool,
    timeline: Option<u32>,
}

pub fn simulate(snapshot: &FinancialSnapshot, config: &SimulationConfig) -> Result<SimulationResult> {
    validate_snapshot(snapshot, config)?;
    let targets = resolve_goal_targets(snapshot, config)?;

    let monthly_cash_flow = monthly_cash_flow(snapshot)?;
    let trajectory = project(snapshot, monthly_cash_flow)?;
    let cash_runway_months = cash_runway(snapshot.current_bank_balance, snapshot.monthly_expenses);

    let keys = goal_keys(&snapshot.goals);
    let outcomes: Vec<GoalOutcome> = snapshot
        .goals
        .iter()
        .zip(keys)
        .zip(targets)
        .map(|((goal, key), target)| {
            evaluate_goal(goal, key, target, &trajectory.points, snapshot.projection_years)
        })
        .collect();

    let mut goal_feasibility = BTreeMap::new();
    let mut goal_timeline = BTreeMap::new();
    let mut goal_targets = BTreeMap::new();
    for outcome in outcomes {
        if let Some(year) = outcome.timeline {
            goal_timeline.insert(outcome.key.clone(), year);
        }
        if let Some(target) = outcome.target {
            goal_targets.insert(outcome.key.clone(), target);
        }
        goal_feasibility.insert(outcome.key, outcome.feasible);
    }

    let net_worth_by_year = trajectory
        .points
        .iter()
        .map(|point| (point.year, point.net_worth))
        .collect();

    debug!(
        "simulated {} years over {} investments and {} goals: liquid cash end {}, investments end {}",
        snapshot.projection_years,
        snapshot.investments.len(),
        snapshot.goals.len(),
        trajectory.liquid_cash_end,
        trajectory.total_investments
    );

    Ok(SimulationResult {
        net_worth_by_year,
        cash_runway_months,
        monthly_cash_flow,
        total_investments: trajectory.total_investments,
        liquid_cash_end: trajectory.liquid_cash_end,
        goal_feasibility,
        goal_timeline,
        goal_targets,
        yearly_breakdown: trajectory.points,
    })
}

/// Runway uses the bank balance only; investments are not treated as instantly accessible.
/// Saturates at `u64::MAX` months for vanishingly small expenses.
pub fn cash_runway(bank_balance: Decimal, monthly_expenses: Decimal) -> CashRunway {
    if monthly_expenses.is_zero() {
        return CashRunway::Unbounded;
    }
    let months = bank_balance
        .checked_div(monthly_expenses)
        .and_then(|ratio| ratio.floor().to_u64())
        .unwrap_or(u64::MAX);
    CashRunway::Months(months)
}

/// Recurring monthly surplus: income minus expenses minus monthly-cadence contributions.
/// Yearly and one-time contributions are not part of the recurring burn.
pub fn monthly_cash_flow(snapshot: &FinancialSnapshot) -> Result<Decimal> {
    let income = snapshot.monthly_income.unwrap_or(Decimal::ZERO);
    let contributions = monthly_contributions(&snapshot.investments, 0)?;
    sub(income, snapshot.monthly_expenses, 0).and_then(|net| sub(net, contributions, 0))
}

pub fn validate_snapshot(snapshot: &FinancialSnapshot, config: &SimulationConfig) -> Result<()> {
    if snapshot.projection_years == 0 {
        return Err(SimulationError::validation(
            "projection_years",
            "must be >= 1",
        ));
    }
    if snapshot.projection_years > config.max_projection_years {
        return Err(SimulationError::validation(
            "projection_years",
            format!("must be <= {}", config.max_projection_years),
        ));
    }

    non_negative("current_bank_balance", snapshot.current_bank_balance)?;
    if let Some(income) = snapshot.monthly_income {
        non_negative("monthly_income", income)?;
    }
    non_negative("monthly_expenses", snapshot.monthly_expenses)?;

    for (index, investment) in snapshot.investments.iter().enumerate() {
        non_negative(&format!("investments[{index}].amount"), investment.amount)?;
        non_negative(
            &format!("investments[{index}].existing_value"),
            investment.existing_value,
        )?;
        let rate = investment.expected_yearly_return;
        if rate < config.min_yearly_return || rate > config.max_yearly_return {
            return Err(SimulationError::validation(
                format!("investments[{index}].expected_yearly_return"),
                format!(
                    "must be between {} and {}",
                    config.min_yearly_return, config.max_yearly_return
                ),
            ));
        }
    }

    for (index, goal) in snapshot.goals.iter().enumerate() {
        if let Some(target) = goal.target_amount {
            non_negative(&format!("goals[{index}].target_amount"), target)?;
        }
    }

    Ok(())
}

fn non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(SimulationError::validation(field, "must be >= 0"));
    }
    Ok(())
}

fn resolve_goal_targets(
    snapshot: &FinancialSnapshot,
    config: &SimulationConfig,
) -> Result<Vec<Option<Decimal>>> {
    snapshot
        .goals
        .iter()
        .enumerate()
        .map(|(index, goal)| {
            let target = goal
                .target_amount
                .or_else(|| config.default_target(snapshot.currency, goal.goal_type));
            if target.is_none() && goal.target_year.is_none() {
                return Err(SimulationError::validation(
                    format!("goals[{index}]"),
                    "needs a target_amount or a target_year",
                ));
            }
            Ok(target)
        })
        .collect()
}

/// `monthly_cash_flow` is the snapshot's own, computed once by the caller.
fn project(snapshot: &FinancialSnapshot, monthly_cash_flow: Decimal) -> Result<Trajectory> {
    let annual_cash_flow = mul(monthly_cash_flow, MONTHS_PER_YEAR, 0)?;

    let mut values: Vec<Decimal> = snapshot
        .investments
        .iter()
        .map(|investment| investment.existing_value)
        .collect();
    let mut liquid = snapshot.current_bank_balance;

    let mut points = Vec::with_capacity(snapshot.projection_years as usize + 1);
    points.push(year_point(0, liquid, &values)?);

    for year in 1..=snapshot.projection_years {
        for (value, investment) in values.iter_mut().zip(&snapshot.investments) {
            let funded = add(*value, yearly_contribution(investment, year)?, year)?;
            *value = mul(funded, growth_factor(investment), year)?;
        }
        liquid = add(liquid, annual_cash_flow, year)?;
        points.push(year_point(year, liquid, &values)?);
    }

    let total_investments = sum(&values, snapshot.projection_years)?;
    Ok(Trajectory {
        points,
        liquid_cash_end: liquid,
        total_investments,
    })
}

fn year_point(year: u32, liquid_cash: Decimal, values: &[Decimal]) -> Result<YearProjection> {
    let investments = sum(values, year)?;
    Ok(YearProjection {
        year,
        liquid_cash,
        investments,
        net_worth: add(liquid_cash, investments, year)?,
    })
}

/// New money entering the vehicle at the start of `year` (1-based).
fn yearly_contribution(investment: &Investment, year: u32) -> Result<Decimal> {
    match investment.mode {
        InvestmentMode::Monthly => mul(investment.amount, MONTHS_PER_YEAR, year),
        InvestmentMode::Yearly => Ok(investment.amount),
        InvestmentMode::OneTime if year == 1 => Ok(investment.amount),
        InvestmentMode::OneTime => Ok(Decimal::ZERO),
    }
}

fn growth_factor(investment: &Investment) -> Decimal {
    Decimal::ONE + investment.expected_yearly_return / PERCENT
}

fn monthly_contributions(investments: &[Investment], year: u32) -> Result<Decimal> {
    investments
        .iter()
        .filter(|investment| investment.mode == InvestmentMode::Monthly)
        .try_fold(Decimal::ZERO, |acc, investment| {
            add(acc, investment.amount, year)
        })
}

fn goal_keys(goals: &[FinancialGoal]) -> Vec<String> {
    let mut used = BTreeSet::new();
    goals
        .iter()
        .map(|goal| {
            let label = goal
                .description
                .as_deref()
                .filter(|description| !description.is_empty())
                .unwrap_or("default");
            let base = format!("{}_{label}", goal.goal_type.as_str());
            let mut key = base.clone();
            let mut n = 1;
            while !used.insert(key.clone()) {
                n += 1;
                key = format!("{base}_{n}");
            }
            key
        })
        .collect()
}

fn evaluate_goal(
    goal: &FinancialGoal,
    key: String,
    target: Option<Decimal>,
    points: &[YearProjection],
    horizon: u32,
) -> GoalOutcome {
    let Some(amount) = target else {
        return GoalOutcome {
            key,
            target,
            feasible: false,
            timeline: None,
        };
    };

    let deadline = goal.target_year.map_or(horizon, |year| year.min(horizon));
    let reached = points
        .iter()
        .find(|point| point.net_worth >= amount)
        .map(|point| point.year);

    GoalOutcome {
        key,
        target,
        feasible: reached.is_some_and(|year| year <= deadline),
        timeline: reached,
    }
}

fn sum(values: &[Decimal], year: u32) -> Result<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, value| add(acc, *value, year))
}

fn add(a: Decimal, b: Decimal, year: u32) -> Result<Decimal> {
    a.checked_add(b).ok_or(SimulationError::Overflow { year })
}

fn sub(a: Decimal, b: Decimal, year: u32) -> Result<Decimal> {
    a.checked_sub(b).ok_or(SimulationError::Overflow { year })
}

fn mul(a: Decimal, b: Decimal, year: u32) -> Result<Decimal> {
    a.checked_mul(b).ok_or(SimulationError::Overflow { year })
}
