//! TradeGuard CLI: plan entries, evaluate risk caps and inspect session windows.
//!
//! Commands:
//! - `plan` run one entry through the full gate stack and print the plan as JSON
//! - `caps` evaluate the configured caps against an account snapshot
//! - `session` report which calendar window, if any, blocks a symbol at a time
//! - `config` print the effective configuration as TOML

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tradeguard_core::clock::SystemClock;
use tradeguard_core::config::LoggingConfig;
use tradeguard_core::diagnostics::DiagnosticEvent;
use tradeguard_core::domain::{EntryPlan, LockoutState, OrderKind, Side};
use tradeguard_core::risk::{evaluate_caps, RiskDecision, RiskRule, RiskSnapshot};
use tradeguard_core::session::{CalendarProvider, NoCalendar, StaticCalendar};
use tradeguard_core::{GateConfig, GateStack};

#[derive(Parser)]
#[command(
    name = "tradeguard",
    about = "TradeGuard CLI: risk gating and order planning for futures entries"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an entry plan (entry + protective stop) for one intent.
    Plan {
        /// Instrument symbol (e.g., ES, CL).
        #[arg(long)]
        symbol: String,

        /// Direction of the desired position.
        #[arg(long, value_enum)]
        side: SideArg,

        /// Order kind for the entry.
        #[arg(long, value_enum, default_value_t = KindArg::Limit)]
        kind: KindArg,

        /// Limit/stop price, or the reference price for market kinds.
        #[arg(long)]
        price: Decimal,

        /// Exchange-local time (YYYY-MM-DD HH:MM). Defaults to now.
        #[arg(long, value_parser = parse_local_time)]
        at: Option<NaiveDateTime>,

        /// Outcomes to replay before planning, oldest first (e.g., "LWL").
        #[arg(long, default_value = "")]
        outcomes: String,

        /// Calendar JSON file with settlement and blackout windows.
        #[arg(long)]
        calendar: Option<PathBuf>,
    },
    /// Evaluate the configured risk caps against an account snapshot.
    Caps {
        /// Contracts currently held.
        #[arg(long, default_value_t = 0)]
        quantity: u32,

        /// Current account equity.
        #[arg(long, default_value = "0")]
        equity: Decimal,

        /// Peak account equity.
        #[arg(long, default_value = "0")]
        peak_equity: Decimal,

        /// Realized P&L for the day.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        daily_pnl: Decimal,

        /// Realized P&L for the week.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        weekly_pnl: Decimal,
    },
    /// Report the window blocking a symbol at an exchange-local time.
    Session {
        /// Instrument symbol.
        #[arg(long)]
        symbol: String,

        /// Exchange-local time (YYYY-MM-DD HH:MM).
        #[arg(long, value_parser = parse_local_time)]
        at: NaiveDateTime,

        /// Calendar JSON file with settlement and blackout windows.
        #[arg(long)]
        calendar: PathBuf,
    },
    /// Print the effective configuration after validation.
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Long,
    Short,
    Flat,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Long => Side::Long,
            SideArg::Short => Side::Short,
            SideArg::Flat => Side::Flat,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Market,
    Limit,
    StopMarket,
    StopLimit,
}

impl From<KindArg> for OrderKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Market => OrderKind::Market,
            KindArg::Limit => OrderKind::Limit,
            KindArg::StopMarket => OrderKind::StopMarket,
            KindArg::StopLimit => OrderKind::StopLimit,
        }
    }
}

#[derive(Serialize)]
struct PlanReport<'a> {
    plan: &'a EntryPlan,
    lockout: LockoutState,
    loss_streak: u32,
    diagnostics: Vec<DiagnosticEvent>,
}

#[derive(Serialize)]
struct CapsReport {
    decision: RiskDecision,
    reason: &'static str,
    message: &'static str,
    drawdown: Decimal,
}

#[derive(Serialize)]
struct SessionReport {
    symbol: String,
    at: NaiveDateTime,
    blocked: bool,
    window: Option<String>,
    kind: Option<&'static str>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Plan {
            symbol,
            side,
            kind,
            price,
            at,
            outcomes,
            calendar,
        } => run_plan(
            config,
            &symbol,
            side.into(),
            kind.into(),
            price,
            at,
            &outcomes,
            calendar.as_deref(),
        ),
        Commands::Caps {
            quantity,
            equity,
            peak_equity,
            daily_pnl,
            weekly_pnl,
        } => {
            let snapshot = RiskSnapshot {
                account_quantity: quantity,
                equity,
                peak_equity,
                daily_pnl,
                weekly_pnl,
            };
            run_caps(&config, &snapshot)
        }
        Commands::Session {
            symbol,
            at,
            calendar,
        } => run_session(config, &symbol, at, &calendar),
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GateConfig> {
    match path {
        Some(path) => GateConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(GateConfig::default()),
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_calendar(path: Option<&Path>) -> Result<Arc<dyn CalendarProvider>> {
    match path {
        Some(path) => {
            let calendar = StaticCalendar::load(path)
                .with_context(|| format!("failed to load calendar from {}", path.display()))?;
            tracing::debug!(symbols = calendar.symbol_count(), "calendar loaded");
            Ok(Arc::new(calendar))
        }
        None => Ok(Arc::new(NoCalendar)),
    }
}

fn parse_local_time(s: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DD HH:MM, got '{s}'"))
}

#[allow(clippy::too_many_arguments)]
fn run_plan(
    config: GateConfig,
    symbol: &str,
    side: Side,
    kind: OrderKind,
    price: Decimal,
    at: Option<NaiveDateTime>,
    outcomes: &str,
    calendar: Option<&Path>,
) -> Result<()> {
    let stack = GateStack::from_config(config, load_calendar(calendar)?, SystemClock::shared())?;

    for c in outcomes.chars() {
        match c.to_ascii_uppercase() {
            'W' => stack.record_outcome(true),
            'L' => stack.record_outcome(false),
            ',' | ' ' => {}
            other => bail!("unknown outcome '{other}'; use W or L"),
        }
    }

    let mut req = stack.request(symbol, side, kind, price);
    if let Some(at) = at {
        req.now = at;
    }
    let plan = stack.plan_request(&req);

    let report = PlanReport {
        plan: &plan,
        lockout: stack.lockout().lockout_state(),
        loss_streak: stack.lockout().loss_streak(),
        diagnostics: stack.diagnostics(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !plan.is_accepted() {
        tracing::info!(reason = plan.reason(), "entry rejected");
    }
    Ok(())
}

fn run_caps(config: &GateConfig, snapshot: &RiskSnapshot) -> Result<()> {
    let decision = evaluate_caps(&config.caps, snapshot);
    let report = CapsReport {
        decision,
        reason: decision.reason(),
        message: decision.message(),
        drawdown: snapshot.drawdown(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_session(config: GateConfig, symbol: &str, at: NaiveDateTime, calendar: &Path) -> Result<()> {
    let stack = GateStack::from_config(config, load_calendar(Some(calendar))?, SystemClock::shared())?;
    let block = stack.session().blocking_window(symbol, at);

    let report = SessionReport {
        symbol: symbol.to_string(),
        at,
        blocked: block.is_some(),
        window: block.map(|b| b.window().to_string()),
        kind: block.map(|b| b.label()),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_time_accepts_minutes_and_seconds() {
        assert!(parse_local_time("2025-09-02 10:00").is_ok());
        assert!(parse_local_time("2025-09-02T10:00:30").is_ok());
        assert!(parse_local_time("10:00").is_err());
    }

    #[test]
    fn test_cli_parses_plan_command() {
        let cli = Cli::try_parse_from([
            "tradeguard",
            "plan",
            "--symbol",
            "ES",
            "--side",
            "long",
            "--kind",
            "stop-limit",
            "--price",
            "5000.25",
        ])
        .unwrap();
        match cli.command {
            Commands::Plan { symbol, price, kind, .. } => {
                assert_eq!(symbol, "ES");
                assert_eq!(price, Decimal::new(500025, 2));
                assert!(matches!(kind, KindArg::StopLimit));
            }
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn test_cli_caps_accepts_negative_pnl() {
        let cli = Cli::try_parse_from(["tradeguard", "caps", "--daily-pnl", "-500"]).unwrap();
        match cli.command {
            Commands::Caps { daily_pnl, .. } => assert_eq!(daily_pnl, Decimal::from(-500)),
            _ => panic!("expected caps"),
        }
    }
}
