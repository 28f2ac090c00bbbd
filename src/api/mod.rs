use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    CashRunway, Currency, DEFAULT_MAX_PROJECTION_YEARS, FinancialGoal, FinancialSnapshot,
    GoalDefault, GoalType, Investment, InvestmentMode, InvestmentType, MaritalStatus,
    SimulationConfig, SimulationError, SimulationResult, Tag, cash_runway, goal_defaults,
    monthly_cash_flow, simulate, suggest_goals, validate_snapshot,
};

const DEFAULT_PROJECTION_YEARS: i64 = 10;
const EMERGENCY_FUND_MONTHS: u64 = 6;
const OUTPUT_DECIMAL_PLACES: u32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "networth",
    about = "Deterministic net-worth projection with cash runway and goal feasibility"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_MAX_PROJECTION_YEARS,
        help = "Longest accepted projection horizon in years"
    )]
    max_projection_years: u32,
    #[arg(
        long,
        global = true,
        help = "Check goals without a target amount against regional defaults (USD, INR)"
    )]
    regional_goal_defaults: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(default_value_t = 8080)]
        port: u16,
    },
    /// Simulate a snapshot read from a JSON file and print the result.
    Simulate {
        snapshot: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

#[derive(Debug)]
struct AppState {
    config: SimulationConfig,
}

fn build_config(cli: &Cli) -> Result<SimulationConfig, SimulationError> {
    if cli.max_projection_years == 0 {
        return Err(SimulationError::validation(
            "--max-projection-years",
            "must be >= 1",
        ));
    }
    let mut config = SimulationConfig {
        max_projection_years: cli.max_projection_years,
        ..SimulationConfig::default()
    };
    if cli.regional_goal_defaults {
        config = config.with_regional_goal_defaults();
    }
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = build_config(&cli)?;
    match cli.command {
        Command::Serve { port } => run_http_server(port, config).await?,
        Command::Simulate { snapshot, pretty } => {
            let raw = fs::read_to_string(&snapshot).map_err(|source| AppError::Read {
                path: snapshot.clone(),
                source,
            })?;
            let payload: SimulatePayload = serde_json::from_str(&raw)?;
            let snapshot = snapshot_from_payload(payload)?;
            let result = simulate(&snapshot, &config)?.rounded(OUTPUT_DECIMAL_PLACES);
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InvestmentPayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    amount: Option<Decimal>,
    mode: Option<String>,
    expected_yearly_return: Option<Decimal>,
    existing_value: Option<Decimal>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoalPayload {
    goal_type: Option<String>,
    target_amount: Option<Decimal>,
    target_year: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SimulatePayload {
    current_bank_balance: Option<Decimal>,
    monthly_income: Option<Decimal>,
    monthly_expenses: Option<Decimal>,
    investments: Vec<InvestmentPayload>,
    currency: Option<String>,
    age: Option<i64>,
    marital_status: Option<String>,
    dependents: Option<i64>,
    projection_years: Option<i64>,
    goals: Vec<GoalPayload>,
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, SimulationError> {
    value.ok_or_else(|| SimulationError::validation(field, "is required"))
}

fn parse_tag<T: Tag>(field: &str, raw: &str) -> Result<T, SimulationError> {
    T::parse(raw).ok_or_else(|| {
        let expected: Vec<&str> = T::ALL.iter().map(|tag| tag.as_str()).collect();
        SimulationError::validation(
            field,
            format!("unknown value '{raw}', expected one of {}", expected.join(", ")),
        )
    })
}

fn count(field: &str, value: i64) -> Result<u32, SimulationError> {
    if value < 0 {
        return Err(SimulationError::validation(field, "must be >= 0"));
    }
    u32::try_from(value).map_err(|_| SimulationError::validation(field, "is too large"))
}

fn investment_from_payload(
    index: usize,
    payload: InvestmentPayload,
) -> Result<Investment, SimulationError> {
    let field = |name: &str| format!("investments[{index}].{name}");
    let kind: InvestmentType =
        parse_tag(&field("type"), &required(&field("type"), payload.kind)?)?;
    let mode: InvestmentMode =
        parse_tag(&field("mode"), &required(&field("mode"), payload.mode)?)?;
    Ok(Investment {
        kind,
        amount: required(&field("amount"), payload.amount)?,
        mode,
        expected_yearly_return: required(
            &field("expected_yearly_return"),
            payload.expected_yearly_return,
        )?,
        existing_value: required(&field("existing_value"), payload.existing_value)?,
        description: payload.description,
    })
}

fn goal_from_payload(index: usize, payload: GoalPayload) -> Result<FinancialGoal, SimulationError> {
    let field = |name: &str| format!("goals[{index}].{name}");
    let goal_type: GoalType = parse_tag(
        &field("goal_type"),
        &required(&field("goal_type"), payload.goal_type)?,
    )?;
    let target_year = payload
        .target_year
        .map(|year| count(&field("target_year"), year))
        .transpose()?;
    Ok(FinancialGoal {
        goal_type,
        target_amount: payload.target_amount,
        target_year,
        description: payload.description,
    })
}

fn snapshot_from_payload(payload: SimulatePayload) -> Result<FinancialSnapshot, SimulationError> {
    let current_bank_balance = required("current_bank_balance", payload.current_bank_balance)?;
    let monthly_expenses = required("monthly_expenses", payload.monthly_expenses)?;
    let age = count("age", required("age", payload.age)?)?;
    let projection_years = count(
        "projection_years",
        payload.projection_years.unwrap_or(DEFAULT_PROJECTION_YEARS),
    )?;
    let currency = match payload.currency.as_deref() {
        Some(raw) => parse_tag::<Currency>("currency", raw)?,
        None => Currency::default(),
    };
    let marital_status = payload
        .marital_status
        .as_deref()
        .map(|raw| parse_tag::<MaritalStatus>("marital_status", raw))
        .transpose()?;
    let dependents = payload
        .dependents
        .map(|value| count("dependents", value))
        .transpose()?;

    let investments = payload
        .investments
        .into_iter()
        .enumerate()
        .map(|(index, investment)| investment_from_payload(index, investment))
        .collect::<Result<Vec<_>, _>>()?;
    let goals = payload
        .goals
        .into_iter()
        .enumerate()
        .map(|(index, goal)| goal_from_payload(index, goal))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FinancialSnapshot {
        current_bank_balance,
        monthly_income: payload.monthly_income,
        monthly_expenses,
        investments,
        currency,
        age,
        marital_status,
        dependents,
        projection_years,
        goals,
    })
}

#[derive(Debug, Serialize)]
struct SimulateResponse {
    result: SimulationResult,
}

#[derive(Debug, Serialize)]
struct CashRunwayResponse {
    cash_runway_months: CashRunway,
    #[serde(serialize_with = "crate::core::money::serialize_option")]
    cash_runway_years: Option<Decimal>,
    #[serde(serialize_with = "crate::core::money::serialize")]
    monthly_cash_flow: Decimal,
    emergency_fund_status: &'static str,
    #[serde(serialize_with = "crate::core::money::serialize")]
    recommended_emergency_fund: Decimal,
    recommendation: String,
}

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    suggestions: Vec<FinancialGoal>,
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoalDefaultsQuery {
    currency: Option<Currency>,
}

#[derive(Debug, Serialize)]
struct GoalDefaultsResponse {
    currency: Currency,
    default_goals: Vec<GoalDefault>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16, config: SimulationConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("networth HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/simulate/health");

    axum::serve(listener, router(config)).await
}

fn router(config: SimulationConfig) -> Router {
    let state = Arc::new(AppState { config });
    Router::new()
        .route("/api/simulate", post(simulate_handler))
        .route("/api/simulate/health", get(health_handler))
        .route("/api/cash-runway", post(cash_runway_handler))
        .route("/api/goals/suggestions", post(goal_suggestions_handler))
        .route("/api/goals/defaults", get(goal_defaults_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "healthy",
            service: "financial_simulation",
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    match build_simulate_response(payload, &state.config) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => simulation_error_response(err),
    }
}

async fn cash_runway_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    match build_cash_runway_response(payload, &state.config) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => simulation_error_response(err),
    }
}

async fn goal_suggestions_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    match build_suggestions_response(payload, &state.config) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => simulation_error_response(err),
    }
}

async fn goal_defaults_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GoalDefaultsQuery>,
) -> Response {
    json_response(
        StatusCode::OK,
        build_goal_defaults_response(query, &state.config),
    )
}

fn build_simulate_response(
    payload: SimulatePayload,
    config: &SimulationConfig,
) -> Result<SimulateResponse, SimulationError> {
    let snapshot = snapshot_from_payload(payload)?;
    let result = simulate(&snapshot, config)?;
    debug!(
        "simulation finished: {} years, {} goals, final net worth {}",
        snapshot.projection_years,
        snapshot.goals.len(),
        result.liquid_cash_end + result.total_investments
    );
    Ok(SimulateResponse {
        result: result.rounded(OUTPUT_DECIMAL_PLACES),
    })
}

fn build_cash_runway_response(
    payload: SimulatePayload,
    config: &SimulationConfig,
) -> Result<CashRunwayResponse, SimulationError> {
    let snapshot = snapshot_from_payload(payload)?;
    validate_snapshot(&snapshot, config)?;

    let runway = cash_runway(snapshot.current_bank_balance, snapshot.monthly_expenses);
    let cash_flow = monthly_cash_flow(&snapshot)?;
    let recommended = snapshot
        .monthly_expenses
        .checked_mul(Decimal::from(EMERGENCY_FUND_MONTHS))
        .ok_or(SimulationError::Overflow { year: 0 })?;
    let status = if runway.covers(EMERGENCY_FUND_MONTHS) {
        "Good"
    } else {
        "Needs improvement"
    };

    Ok(CashRunwayResponse {
        cash_runway_months: runway,
        cash_runway_years: runway.months().map(|months| {
            (Decimal::from(months) / dec!(12))
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        }),
        monthly_cash_flow: round_output(cash_flow),
        emergency_fund_status: status,
        recommended_emergency_fund: round_output(recommended),
        recommendation: format!(
            "Try to maintain at least {EMERGENCY_FUND_MONTHS} months of expenses ({} {}) as emergency fund",
            snapshot.currency.as_str(),
            group_thousands(recommended)
        ),
    })
}

fn build_suggestions_response(
    payload: SimulatePayload,
    config: &SimulationConfig,
) -> Result<SuggestionsResponse, SimulationError> {
    let snapshot = snapshot_from_payload(payload)?;
    validate_snapshot(&snapshot, config)?;
    let suggestions = suggest_goals(&snapshot, config);
    let message = format!(
        "Generated {} goal suggestions based on your profile",
        suggestions.len()
    );
    Ok(SuggestionsResponse {
        suggestions,
        message,
    })
}

fn build_goal_defaults_response(
    query: GoalDefaultsQuery,
    config: &SimulationConfig,
) -> GoalDefaultsResponse {
    let currency = query.currency.unwrap_or_default();
    GoalDefaultsResponse {
        currency,
        default_goals: goal_defaults(currency, config),
    }
}

fn round_output(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(OUTPUT_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Whole units with comma thousands separators, e.g. `1,234,567`.
fn group_thousands(value: Decimal) -> String {
    let whole = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < Decimal::ZERO {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn error_status(err: &SimulationError) -> StatusCode {
    match err {
        SimulationError::Validation { .. } | SimulationError::Overflow { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn simulation_error_response(err: SimulationError) -> Response {
    warn!("rejected simulation request: {err}");
    error_response(error_status(&err), &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn payload_from_json(json: &str) -> Result<SimulatePayload, String> {
    serde_json::from_str::<SimulatePayload>(json).map_err(|e| format!("Invalid API JSON payload: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"{
      "email": "someone@example.com",
      "current_bank_balance": 12000,
      "monthly_income": 5000,
      "monthly_expenses": 2000,
      "currency": "USD",
      "age": 32,
      "marital_status": "married",
      "dependents": 1,
      "projection_years": 2,
      "investments": [
        {
          "type": "mutual_fund",
          "amount": 1000,
          "mode": "yearly",
          "expected_yearly_return": 10,
          "existing_value": 0,
          "description": "Index fund"
        }
      ],
      "goals": [
        { "goal_type": "buy_car", "target_amount": 20000, "target_year": 3 },
        { "goal_type": "buy_house", "target_amount": 1000000.50 }
      ]
    }"#;

    fn sample_snapshot() -> FinancialSnapshot {
        let payload = payload_from_json(SAMPLE_JSON).expect("json should parse");
        snapshot_from_payload(payload).expect("valid payload")
    }

    fn payload_with(edit: impl FnOnce(&mut serde_json::Value)) -> SimulatePayload {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE_JSON).expect("valid json");
        edit(&mut value);
        serde_json::from_value(value).expect("payload should deserialize")
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("networth").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn snapshot_from_payload_parses_wire_keys() {
        let snapshot = sample_snapshot();

        assert_eq!(snapshot.current_bank_balance, dec!(12_000));
        assert_eq!(snapshot.monthly_income, Some(dec!(5_000)));
        assert_eq!(snapshot.currency, Currency::Usd);
        assert_eq!(snapshot.marital_status, Some(MaritalStatus::Married));
        assert_eq!(snapshot.dependents, Some(1));
        assert_eq!(snapshot.projection_years, 2);
        assert_eq!(snapshot.investments[0].kind, InvestmentType::MutualFund);
        assert_eq!(snapshot.investments[0].mode, InvestmentMode::Yearly);
        assert_eq!(snapshot.goals[0].target_year, Some(3));
        assert_eq!(snapshot.goals[1].target_amount, Some(dec!(1_000_000.50)));
    }

    #[test]
    fn snapshot_from_payload_applies_defaults() {
        let payload = payload_from_json(
            r#"{"current_bank_balance": 100, "monthly_expenses": 10, "age": 40}"#,
        )
        .expect("json should parse");
        let snapshot = snapshot_from_payload(payload).expect("valid payload");

        assert_eq!(snapshot.currency, Currency::Inr);
        assert_eq!(snapshot.projection_years, 10);
        assert_eq!(snapshot.monthly_income, None);
        assert!(snapshot.investments.is_empty());
        assert!(snapshot.goals.is_empty());
    }

    #[test]
    fn snapshot_from_payload_requires_expenses() {
        let payload = payload_with(|value| {
            value.as_object_mut().expect("object").remove("monthly_expenses");
        });
        let err = snapshot_from_payload(payload).expect_err("must require expenses");
        assert_eq!(err.field(), Some("monthly_expenses"));
    }

    #[test]
    fn snapshot_from_payload_rejects_unknown_mode_with_field_path() {
        let payload = payload_with(|value| {
            value["investments"][0]["mode"] = serde_json::json!("weekly");
        });
        let err = snapshot_from_payload(payload).expect_err("must reject unknown mode");
        assert_eq!(err.field(), Some("investments[0].mode"));
        assert!(err.to_string().contains("one_time"));
    }

    #[test]
    fn snapshot_from_payload_rejects_negative_horizon() {
        let payload = payload_with(|value| {
            value["projection_years"] = serde_json::json!(-3);
        });
        let err = snapshot_from_payload(payload).expect_err("must reject negative horizon");
        assert_eq!(err.field(), Some("projection_years"));
    }

    #[test]
    fn snapshot_from_payload_rejects_negative_target_year() {
        let payload = payload_with(|value| {
            value["goals"][1]["target_year"] = serde_json::json!(-1);
        });
        let err = snapshot_from_payload(payload).expect_err("must reject negative target year");
        assert_eq!(err.field(), Some("goals[1].target_year"));
    }

    #[test]
    fn simulate_response_carries_numeric_fields() {
        let payload = payload_from_json(SAMPLE_JSON).expect("json should parse");
        let response =
            build_simulate_response(payload, &SimulationConfig::default()).expect("valid payload");
        let json = serde_json::to_value(&response).expect("response should serialize");

        let result = &json["result"];
        for key in [
            "net_worth_by_year",
            "cash_runway_months",
            "monthly_cash_flow",
            "total_investments",
            "liquid_cash_end",
            "goal_feasibility",
            "goal_timeline",
            "yearly_breakdown",
        ] {
            assert!(result.get(key).is_some(), "missing {key}");
        }
        assert!(result["net_worth_by_year"]["2"].is_number());
        assert!(result["monthly_cash_flow"].is_number());
        assert_eq!(result["cash_runway_months"].as_u64(), Some(6));
        assert_eq!(result["goal_feasibility"]["buy_car_default"], serde_json::json!(true));
        assert_eq!(result["goal_feasibility"]["buy_house_default"], serde_json::json!(false));
        assert!(result["goal_timeline"].get("buy_house_default").is_none());
    }

    #[test]
    fn simulate_response_matches_engine_values() {
        let payload = payload_from_json(SAMPLE_JSON).expect("json should parse");
        let response =
            build_simulate_response(payload, &SimulationConfig::default()).expect("valid payload");

        // 12000 + 2 * 12 * 3000 cash, plus 2310 in the fund.
        assert_eq!(response.result.liquid_cash_end, dec!(84_000));
        assert_eq!(response.result.total_investments, dec!(2_310));
        assert_eq!(response.result.net_worth_by_year[&2], dec!(86_310));
        assert_eq!(response.result.monthly_cash_flow, dec!(3_000));
    }

    #[test]
    fn simulate_rejects_horizon_beyond_configured_limit() {
        let payload = payload_with(|value| {
            value["projection_years"] = serde_json::json!(20);
        });
        let config = build_config(&cli(&["--max-projection-years", "15", "serve"]))
            .expect("valid config");
        let err = build_simulate_response(payload, &config).expect_err("must reject horizon");
        assert_eq!(err.field(), Some("projection_years"));
        assert_eq!(error_status(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn cash_runway_report_flags_short_runway() {
        let payload = payload_with(|value| {
            value["current_bank_balance"] = serde_json::json!(9000);
        });
        let report = build_cash_runway_response(payload, &SimulationConfig::default())
            .expect("valid payload");

        assert_eq!(report.cash_runway_months, CashRunway::Months(4));
        assert_eq!(report.cash_runway_years, Some(dec!(0.3)));
        assert_eq!(report.emergency_fund_status, "Needs improvement");
        assert_eq!(report.recommended_emergency_fund, dec!(12_000));
        assert_eq!(
            report.recommendation,
            "Try to maintain at least 6 months of expenses (USD 12,000) as emergency fund"
        );
    }

    #[test]
    fn amounts_in_messages_use_thousands_separators() {
        assert_eq!(group_thousands(dec!(0)), "0");
        assert_eq!(group_thousands(dec!(999)), "999");
        assert_eq!(group_thousands(dec!(1000)), "1,000");
        assert_eq!(group_thousands(dec!(1234567.5)), "1,234,568");
        assert_eq!(group_thousands(dec!(-25000000)), "-25,000,000");
    }

    #[test]
    fn cash_runway_report_without_expenses_is_good() {
        let payload = payload_with(|value| {
            value["monthly_expenses"] = serde_json::json!(0);
        });
        let report = build_cash_runway_response(payload, &SimulationConfig::default())
            .expect("valid payload");

        assert_eq!(report.cash_runway_months, CashRunway::Unbounded);
        assert_eq!(report.cash_runway_years, None);
        assert_eq!(report.emergency_fund_status, "Good");
        let json = serde_json::to_value(&report).expect("report should serialize");
        assert!(json["cash_runway_months"].is_null());
        assert!(json["monthly_cash_flow"].is_number());
        assert!(json["recommended_emergency_fund"].is_number());
    }

    #[test]
    fn suggestions_response_counts_goals() {
        let payload = payload_from_json(SAMPLE_JSON).expect("json should parse");
        let response = build_suggestions_response(payload, &SimulationConfig::default())
            .expect("valid payload");

        assert_eq!(response.suggestions.len(), 4);
        assert_eq!(
            response.message,
            "Generated 4 goal suggestions based on your profile"
        );
    }

    #[test]
    fn goal_defaults_default_to_inr() {
        let response =
            build_goal_defaults_response(GoalDefaultsQuery::default(), &SimulationConfig::default());
        assert_eq!(response.currency, Currency::Inr);
        assert!(
            response
                .default_goals
                .iter()
                .any(|entry| entry.goal_type == GoalType::RetireEarly
                    && entry.amount == dec!(25_000_000))
        );
    }

    #[test]
    fn goal_responses_follow_configured_amounts() {
        let mut config = SimulationConfig::default();
        config.default_goal_targets = std::collections::BTreeMap::from([(
            Currency::Usd,
            std::collections::BTreeMap::from([(GoalType::BuyCar, dec!(1))]),
        )]);

        let payload = payload_from_json(SAMPLE_JSON).expect("json should parse");
        let response = build_suggestions_response(payload, &config).expect("valid payload");
        let car = response
            .suggestions
            .iter()
            .find(|goal| goal.goal_type == GoalType::BuyCar)
            .expect("car suggestion");
        assert_eq!(car.target_amount, Some(dec!(1)));

        let defaults = build_goal_defaults_response(
            GoalDefaultsQuery {
                currency: Some(Currency::Usd),
            },
            &config,
        );
        let json = serde_json::to_value(&defaults).expect("defaults should serialize");
        let car = json["default_goals"]
            .as_array()
            .expect("list")
            .iter()
            .find(|entry| entry["goal_type"] == "buy_car")
            .expect("car default");
        assert_eq!(car["amount"], serde_json::json!(1));
    }

    #[test]
    fn regional_defaults_flag_fills_missing_targets() {
        let payload = payload_with(|value| {
            value["goals"] = serde_json::json!([{ "goal_type": "buy_car" }]);
        });
        let config = build_config(&cli(&["--regional-goal-defaults", "serve"]))
            .expect("valid config");
        let response = build_simulate_response(payload, &config).expect("valid payload");

        assert_eq!(response.result.goal_targets["buy_car_default"], dec!(25_000));
        assert!(response.result.goal_feasibility["buy_car_default"]);
    }

    #[test]
    fn goal_without_target_is_rejected_without_regional_defaults() {
        let payload = payload_with(|value| {
            value["goals"] = serde_json::json!([{ "goal_type": "buy_car" }]);
        });
        let err = build_simulate_response(payload, &SimulationConfig::default())
            .expect_err("goal needs a target");
        assert_eq!(err.field(), Some("goals[0]"));
    }

    #[test]
    fn cli_parses_subcommands() {
        let parsed = cli(&["simulate", "snapshot.json", "--pretty"]);
        match parsed.command {
            Command::Simulate { snapshot, pretty } => {
                assert_eq!(snapshot, PathBuf::from("snapshot.json"));
                assert!(pretty);
            }
            Command::Serve { .. } => panic!("expected simulate"),
        }

        let parsed = cli(&["serve"]);
        assert!(matches!(parsed.command, Command::Serve { port: 8080 }));
        assert_eq!(parsed.max_projection_years, DEFAULT_MAX_PROJECTION_YEARS);
    }

    #[test]
    fn build_config_rejects_zero_horizon_limit() {
        let err = build_config(&cli(&["--max-projection-years", "0", "serve"]))
            .expect_err("must reject zero limit");
        assert_eq!(err.field(), Some("--max-projection-years"));
    }

    #[test]
    fn error_response_is_json_and_uncached() {
        let response = simulation_error_response(SimulationError::validation(
            "monthly_expenses",
            "must be >= 0",
        ));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
    }
}
