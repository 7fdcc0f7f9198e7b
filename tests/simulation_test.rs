use std::process::{Command, Output};

fn run_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_metro_sim"))
        .args(args)
        .env("RUST_LOG", "warn,metro_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_sim(&["--ticks", "300", "--seed", "3", "--report-every", "100"]);

    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("=== Final State ==="),
        "Simulation did not complete properly. stdout: {}",
        stdout
    );
    assert_eq!(stdout.matches("--- After tick").count(), 3);
}

/// Test that the scripted operator builds lines during a run
#[test]
fn test_operator_builds_lines() {
    let output = run_sim(&["--ticks", "400", "--seed", "3"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Lines ---"), "No lines were built: {}", stdout);
    assert!(stdout.contains("--- Trains ---"), "No trains were started: {}", stdout);
}

/// Test that no lines appear without the operator
#[test]
fn test_no_operator_leaves_network_unconnected() {
    let output = run_sim(&["--ticks", "200", "--seed", "3", "--no-operator", "--map"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lines: 0, Trains: 0"));
    assert!(!stdout.contains("--- Lines ---"));
}

/// Test that an unusable configuration is reported as a failure
#[test]
fn test_invalid_configuration_fails() {
    let output = run_sim(&["--ticks", "10", "--max-lines", "0"]);
    assert!(!output.status.success());

    let output = run_sim(&["--ticks", "10", "--tick-rate", "0"]);
    assert!(!output.status.success());
}
