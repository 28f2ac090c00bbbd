mod config;
mod engine;
mod error;
pub(crate) mod money;
mod suggest;
mod types;

pub use config::{DEFAULT_MAX_PROJECTION_YEARS, SimulationConfig, regional_goal_defaults};
pub use engine::{cash_runway, monthly_cash_flow, simulate, validate_snapshot};
pub use error::{Result, SimulationError};
pub use suggest::{GoalDefault, IncomeThresholds, goal_defaults, income_thresholds, suggest_goals};
pub use types::{
    CashRunway, Currency, FinancialGoal, FinancialSnapshot, GoalType, Investment, InvestmentMode,
    InvestmentType, MaritalStatus, SimulationResult, Tag, YearProjection,
};
