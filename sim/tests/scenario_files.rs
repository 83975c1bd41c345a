use std::io::Write;

use rewards_ledger::TokenLedger;
use rewards_sim::{SimConfig, SimError, Simulator};
use rewards_types::{Address, TokenId, UNIT};

fn scenario_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn bundled_parity_scenario_passes() {
    let config = SimConfig::from_toml_file(scenario_path("hardhat_parity.toml")).unwrap();
    let mut sim = Simulator::new(config).unwrap();
    let report = sim.run().unwrap();

    let alice = Address::new("alice");
    let rwd = TokenId::new("RWD");
    let received = sim.ledger().balance_of(&rwd, &alice);
    assert!(received > 500_277 * UNIT);
    assert!(received <= 1_000_000 * UNIT);
    assert_eq!(report.donations[0].remaining, "0");
    assert_eq!(report.steps, 8);
    assert!(report.to_json().unwrap().contains("\"positions\""));
}

#[test]
fn scenario_loads_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        genesis = 0

        [params]
        borrow_settlement = "credit"

        [[mints]]
        account = "owner"
        token = "RWD"
        amount = "100"

        [[steps]]
        action = "donate"
        from = "owner"
        token = "RWD"
        amount = "100"
        duration = 100

        [[steps]]
        action = "borrow"
        user = "alice"
        amount = "1"

        [[steps]]
        action = "advance"
        secs = 48

        [[steps]]
        action = "borrow"
        user = "alice"
        amount = "1"

        [[steps]]
        action = "expect"
        user = "alice"
        balance = "0"
        pending = "50"
        "#
    )
    .unwrap();

    let config = SimConfig::from_toml_file(file.path()).unwrap();
    let mut sim = Simulator::new(config).unwrap();
    sim.run().unwrap();
    let position = sim
        .hook()
        .position(&Address::new("alice"), 0)
        .unwrap();
    assert_eq!(position.unclaimed, 49 * UNIT);
}

#[test]
fn malformed_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "steps = 3").unwrap();
    assert!(matches!(
        SimConfig::from_toml_file(file.path()),
        Err(SimError::Config(_))
    ));
}
