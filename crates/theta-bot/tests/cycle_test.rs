//! End-to-end decision cycle tests from TOML configuration and JSON snapshots.

use rust_decimal_macros::dec;
use std::path::PathBuf;
use theta_bot::{AppConfig, DecisionEngine, MarketSnapshot};
use theta_core::{Action, StrategyKind};
use theta_risk::RiskViolation;

const CONFIG: &str = r#"
dry_run = true

[risk]
max_concentration_per_symbol = 0.6

[strategy]
wheel_enabled = true
iron_condor_enabled = true

[symbols.defaults]
max_position_size_percent = 0

[symbols.tickers.SPY]

[symbols.tickers.QQQ]
max_positions = 2

[symbols.tickers.IWM]
"#;

const SNAPSHOT: &str = r#"{
    "as_of": "2024-01-10",
    "account": {
        "account_id": "DU123",
        "net_liquidation": "200000",
        "cash": "150000",
        "buying_power": "400000"
    },
    "positions": [
        {
            "symbol": "QQQ",
            "instrument": {"kind": "equity"},
            "quantity": 100,
            "avg_cost": "380",
            "market_value": "40000"
        }
    ],
    "symbols": [
        {
            "symbol": "SPY",
            "stock_price": "450",
            "volatility": "0.30",
            "trend": "bullish",
            "chain": [
                {"symbol": "SPY", "strike": "430", "expiration": "2024-02-16", "right": "put",
                 "bid": "1.40", "ask": "1.60", "delta": "-0.20"},
                {"symbol": "SPY", "strike": "440", "expiration": "2024-02-16", "right": "put",
                 "bid": "2.40", "ask": "2.60", "delta": "-0.30"}
            ]
        },
        {
            "symbol": "QQQ",
            "stock_price": "400",
            "chain": [
                {"symbol": "QQQ", "strike": "410", "expiration": "2024-02-16", "right": "call",
                 "bid": "3.90", "ask": "4.10", "delta": "0.30"}
            ]
        },
        {
            "symbol": "IWM",
            "stock_price": "200",
            "volatility": "0.22",
            "trend": "neutral",
            "chain": [
                {"symbol": "IWM", "strike": "185", "expiration": "2024-02-16", "right": "put",
                 "bid": "0.90", "ask": "1.10", "delta": "-0.15"},
                {"symbol": "IWM", "strike": "190", "expiration": "2024-02-16", "right": "put",
                 "bid": "1.90", "ask": "2.10", "delta": "-0.30"},
                {"symbol": "IWM", "strike": "210", "expiration": "2024-02-16", "right": "call",
                 "bid": "1.90", "ask": "2.10", "delta": "0.30"},
                {"symbol": "IWM", "strike": "215", "expiration": "2024-02-16", "right": "call",
                 "bid": "0.90", "ask": "1.10", "delta": "0.15"}
            ]
        }
    ]
}"#;

fn engine(config: &str) -> DecisionEngine {
    DecisionEngine::new(&AppConfig::from_toml_str(config).unwrap())
}

fn snapshot() -> MarketSnapshot {
    MarketSnapshot::from_json_str(SNAPSHOT).unwrap()
}

#[test]
fn test_full_cycle() {
    let report = engine(CONFIG).run_cycle(&snapshot());

    assert!(report.dry_run);
    assert!(report.invalid.is_empty());
    assert_eq!(report.decisions.len(), 3);
    assert_eq!(report.approved().count(), 3);

    let by_symbol = |symbol: &str| {
        report
            .decisions
            .iter()
            .find(|d| d.recommendation.symbol == symbol)
            .unwrap()
    };

    let spy = by_symbol("SPY");
    assert_eq!(spy.recommendation.action, Action::OpenPut);
    assert_eq!(spy.recommendation.strategy, StrategyKind::Wheel);
    let leg = spy.recommendation.single_leg().unwrap();
    assert_eq!(leg.strike.inner(), dec!(440));
    assert_eq!(leg.premium.unwrap().inner(), dec!(2.50));
    assert_eq!(spy.approved_quantity, 1);

    let qqq = by_symbol("QQQ");
    assert_eq!(qqq.recommendation.action, Action::OpenCall);
    assert_eq!(qqq.recommendation.strike().unwrap().inner(), dec!(410));
    assert_eq!(qqq.recommendation.quantity, 1);

    let iwm = by_symbol("IWM");
    assert_eq!(iwm.recommendation.action, Action::OpenSpread);
    assert_eq!(iwm.recommendation.strategy, StrategyKind::IronCondor);
    let legs = iwm.recommendation.spread_legs().unwrap();
    assert_eq!(legs.long_put_strike.inner(), dec!(185));
    assert_eq!(legs.long_call_strike.inner(), dec!(215));
    assert_eq!(legs.expected_credit, Some(dec!(200)));

    assert_eq!(report.portfolio.total_positions, 1);
    assert_eq!(report.portfolio.concentration["QQQ"], dec!(0.2));
    assert_eq!(report.strategy_counts.wheel, 1);
    assert_eq!(report.stats.totals().approved, 3);
}

#[test]
fn test_cycle_under_stress() {
    let config = CONFIG.replace(
        "[risk]\n",
        "[risk]\nmax_vix_for_new_positions = 40\nmax_portfolio_margin_usage = 0.1\n",
    );
    let mut snapshot = snapshot();
    snapshot.vix = Some(dec!(45));

    let report = engine(&config).run_cycle(&snapshot);

    // the condor carries no collateral and is not VIX-gated
    assert_eq!(report.approved().count(), 1);
    let iwm = report.approved().next().unwrap();
    assert_eq!(iwm.recommendation.action, Action::OpenSpread);
    assert!(!iwm.risk.has_violation(RiskViolation::VixTooHigh));

    let spy = report
        .rejected()
        .find(|d| d.recommendation.symbol == "SPY")
        .unwrap();
    // 44,000 collateral on 200,000 net liquidation
    assert!(spy.risk.has_violation(RiskViolation::VixTooHigh));
    assert!(spy.risk.has_violation(RiskViolation::MarginExceeded));
    assert_eq!(spy.approved_quantity, 0);
}

#[test]
fn test_report_serializes() {
    let report = engine(CONFIG).run_cycle(&snapshot());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["as_of"], "2024-01-10");
    // symbols run in ticker order: IWM, QQQ, SPY
    assert_eq!(json["decisions"][0]["recommendation"]["action"], "open_spread");
    assert_eq!(json["decisions"][1]["recommendation"]["action"], "open_call");
    assert_eq!(json["decisions"][0]["risk"]["approved"], true);
}

#[test]
fn test_default_config_file_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
    let config = AppConfig::from_file(&path).unwrap();

    let symbols: Vec<String> = config.symbol_configs().into_iter().map(|c| c.symbol).collect();
    assert_eq!(symbols, vec!["QQQ", "SPY"]);
    assert!(config.strategy.wheel_enabled);
}
