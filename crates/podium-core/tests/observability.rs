//! Observability tests for simulation lifecycle tracing.
//!
//! These tests verify that structured tracing events are emitted for run
//! start, finish, cancellation, short fields and roster edits.

use podium_core::{
    emit_roster_changed, emit_short_field, emit_simulation_cancelled, emit_simulation_finished,
    emit_simulation_started, simulate, Apparatus, Athlete, CancelFlag, RosterSnapshot,
    RosterStore, RunSpan, SeedPolicy, Simulation, SimulationConfig,
};
use tracing_test::traced_test;

fn small_roster() -> RosterSnapshot {
    RosterSnapshot::from(vec![
        Athlete::new("Ava", "Able", "USA").with_score(Apparatus::Vault, 14.0),
        Athlete::new("Bea", "Baker", "BRA").with_score(Apparatus::Vault, 13.8),
    ])
}

#[traced_test]
#[test]
fn test_emit_simulation_started_logs_seed_and_apparatus() {
    emit_simulation_started(12, 1000, &[Apparatus::BalanceBeam, Apparatus::Vault], 42);
    assert!(logs_contain("simulation.started"));
    assert!(logs_contain("BB,VT"));
}

#[traced_test]
#[test]
fn test_emit_simulation_finished_logs_medal_total() {
    emit_simulation_finished(17, 1000, 12000);
    assert!(logs_contain("simulation.finished"));
    assert!(logs_contain("medals_awarded=12000"));
}

#[traced_test]
#[test]
fn test_emit_simulation_cancelled_is_a_warning() {
    emit_simulation_cancelled(250, 1000);
    assert!(logs_contain("WARN"));
    assert!(logs_contain("simulation.cancelled"));
}

#[traced_test]
#[test]
fn test_emit_short_field_names_apparatus() {
    emit_short_field(Apparatus::UnevenBars, 1);
    assert!(logs_contain("apparatus.short_field"));
    assert!(logs_contain("eligible=1"));
}

#[traced_test]
#[test]
fn test_emit_roster_changed_at_debug() {
    emit_roster_changed("append", "Simone Biles", 3);
    assert!(logs_contain("roster.changed"));
    assert!(logs_contain("roster_len=3"));
}

#[traced_test]
#[test]
fn test_run_span_enter_creates_span() {
    let span = RunSpan::enter("test-span-run");
    drop(span);
}

#[traced_test]
#[test]
fn test_completed_run_emits_start_and_finish() {
    let roster = small_roster();
    simulate(&roster, 5, &[Apparatus::Vault], SeedPolicy::Fixed(1)).unwrap();

    assert!(logs_contain("simulation.started"));
    assert!(logs_contain("simulation.finished"));
    assert!(logs_contain("podium.run"));
    // Two vaulters: bronze is never awarded.
    assert!(logs_contain("apparatus.short_field"));
}

#[traced_test]
#[test]
fn test_cancelled_run_emits_cancelled_event() {
    let roster = small_roster();
    let cancel = CancelFlag::new();
    cancel.cancel();
    let simulation = Simulation::new(SimulationConfig::new(
        10,
        vec![Apparatus::Vault],
        SeedPolicy::Fixed(1),
    ))
    .unwrap();
    simulation.run(&roster, Some(&cancel)).unwrap();

    assert!(logs_contain("simulation.cancelled"));
    assert!(!logs_contain("simulation.finished"));
}

#[traced_test]
#[test]
fn test_roster_edits_are_logged() {
    let mut store = RosterStore::new();
    store
        .append(Athlete::new("Simone", "Biles", "USA"))
        .unwrap();
    store.remove_last().unwrap();
    assert!(logs_contain("operation=append"));
    assert!(logs_contain("operation=remove_last"));
}
