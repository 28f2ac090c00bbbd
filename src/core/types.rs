use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Closed set of snake_case names used on the wire for the descriptive enums.
pub trait Tag: Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.as_str() == raw)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentType {
    MutualFund,
    Stocks,
    Bonds,
    FixedDeposit,
    Ppf,
    Epf,
    Gold,
    RealEstate,
    Land,
    Crypto,
    Other,
}

impl Tag for InvestmentType {
    const ALL: &'static [Self] = &[
        Self::MutualFund,
        Self::Stocks,
        Self::Bonds,
        Self::FixedDeposit,
        Self::Ppf,
        Self::Epf,
        Self::Gold,
        Self::RealEstate,
        Self::Land,
        Self::Crypto,
        Self::Other,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::MutualFund => "mutual_fund",
            Self::Stocks => "stocks",
            Self::Bonds => "bonds",
            Self::FixedDeposit => "fixed_deposit",
            Self::Ppf => "ppf",
            Self::Epf => "epf",
            Self::Gold => "gold",
            Self::RealEstate => "real_estate",
            Self::Land => "land",
            Self::Crypto => "crypto",
            Self::Other => "other",
        }
    }
}

/// Contribution cadence of an investment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentMode {
    Monthly,
    Yearly,
    OneTime,
}

impl Tag for InvestmentMode {
    const ALL: &'static [Self] = &[Self::Monthly, Self::Yearly, Self::OneTime];

    fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::OneTime => "one_time",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    BuyCar,
    BuyHouse,
    RetireEarly,
    AnnualTrips,
    Custom,
}

impl Tag for GoalType {
    const ALL: &'static [Self] = &[
        Self::BuyCar,
        Self::BuyHouse,
        Self::RetireEarly,
        Self::AnnualTrips,
        Self::Custom,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::BuyCar => "buy_car",
            Self::BuyHouse => "buy_house",
            Self::RetireEarly => "retire_early",
            Self::AnnualTrips => "annual_trips",
            Self::Custom => "custom",
        }
    }
}

/// Display label only; amounts are never converted between currencies.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "CAD")]
    Cad,
    #[serde(rename = "AUD")]
    Aud,
    #[serde(rename = "SGD")]
    Sgd,
    #[serde(rename = "AED")]
    Aed,
    #[serde(rename = "JPY")]
    Jpy,
}

impl Tag for Currency {
    const ALL: &'static [Self] = &[
        Self::Inr,
        Self::Usd,
        Self::Eur,
        Self::Gbp,
        Self::Cad,
        Self::Aud,
        Self::Sgd,
        Self::Aed,
        Self::Jpy,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
            Self::Sgd => "SGD",
            Self::Aed => "AED",
            Self::Jpy => "JPY",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl Tag for MaritalStatus {
    const ALL: &'static [Self] = &[Self::Single, Self::Married, Self::Divorced, Self::Widowed];

    fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
            Self::Divorced => "divorced",
            Self::Widowed => "widowed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    #[serde(rename = "type")]
    pub kind: InvestmentType,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub amount: Decimal,
    pub mode: InvestmentMode,
    /// Nominal annual rate in percent (8 means 8%/yr).
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub expected_yearly_return: Decimal,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub existing_value: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub goal_type: GoalType,
    #[serde(serialize_with = "crate::core::money::serialize_option")]
    pub target_amount: Option<Decimal>,
    /// Years from now, 0 being today.
    pub target_year: Option<u32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub current_bank_balance: Decimal,
    #[serde(serialize_with = "crate::core::money::serialize_option")]
    pub monthly_income: Option<Decimal>,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub monthly_expenses: Decimal,
    pub investments: Vec<Investment>,
    pub currency: Currency,
    pub age: u32,
    pub marital_status: Option<MaritalStatus>,
    pub dependents: Option<u32>,
    pub projection_years: u32,
    pub goals: Vec<FinancialGoal>,
}

/// Months of expenses covered by the bank balance alone.
///
/// Serializes as an integer, or `null` when there are no expenses to cover.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum CashRunway {
    Months(u64),
    /// `monthly_expenses` is zero.
    Unbounded,
}

impl CashRunway {
    pub fn months(self) -> Option<u64> {
        match self {
            Self::Months(months) => Some(months),
            Self::Unbounded => None,
        }
    }

    pub fn covers(self, months: u64) -> bool {
        match self {
            Self::Months(available) => available >= months,
            Self::Unbounded => true,
        }
    }
}

impl From<CashRunway> for Option<u64> {
    fn from(value: CashRunway) -> Self {
        value.months()
    }
}

impl From<Option<u64>> for CashRunway {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Unbounded, Self::Months)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: u32,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub liquid_cash: Decimal,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub investments: Decimal,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub net_worth: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(serialize_with = "crate::core::money::serialize_map")]
    pub net_worth_by_year: BTreeMap<u32, Decimal>,
    pub cash_runway_months: CashRunway,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub monthly_cash_flow: Decimal,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub total_investments: Decimal,
    #[serde(serialize_with = "crate::core::money::serialize")]
    pub liquid_cash_end: Decimal,
    pub goal_feasibility: BTreeMap<String, bool>,
    pub goal_timeline: BTreeMap<String, u32>,
    #[serde(serialize_with = "crate::core::money::serialize_map")]
    pub goal_targets: BTreeMap<String, Decimal>,
    pub yearly_breakdown: Vec<YearProjection>,
}

impl SimulationResult {
    /// Copy with every monetary value rounded for presentation.
    pub fn rounded(&self, dp: u32) -> Self {
        let round =
            |value: Decimal| value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        Self {
            net_worth_by_year: self
                .net_worth_by_year
                .iter()
                .map(|(year, value)| (*year, round(*value)))
                .collect(),
            cash_runway_months: self.cash_runway_months,
            monthly_cash_flow: round(self.monthly_cash_flow),
            total_investments: round(self.total_investments),
            liquid_cash_end: round(self.liquid_cash_end),
            goal_feasibility: self.goal_feasibility.clone(),
            goal_timeline: self.goal_timeline.clone(),
            goal_targets: self
                .goal_targets
                .iter()
                .map(|(key, value)| (key.clone(), round(*value)))
                .collect(),
            yearly_breakdown: self
                .yearly_breakdown
                .iter()
                .map(|point| YearProjection {
                    year: point.year,
                    liquid_cash: round(point.liquid_cash),
                    investments: round(point.investments),
                    net_worth: round(point.net_worth),
                })
                .collect(),
        }
    }
}
