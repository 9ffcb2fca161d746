use gaslens::analysis::{DetailValue, FindingKind};
use gaslens::domain::TraceError;
use gaslens::trace_data::{replay, TraceData};
use gaslens::tracer::{GasTracer, Phase};
use std::path::PathBuf;
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn replayed(name: &str) -> GasTracer {
    let trace = TraceData::from_file(fixture(name)).expect("Failed to load fixture");
    let tracer = GasTracer::default();
    replay(&trace, &tracer);
    tracer
}

#[test]
fn test_token_transfer_findings() {
    let tracer = replayed("token_transfer.jsonl");
    assert_eq!(tracer.phase(), Phase::Ended);
    assert_eq!(tracer.depth(), 0);
    assert_eq!(tracer.total_gas_used(), 32_713);

    let findings = tracer.findings();
    let kinds: Vec<FindingKind> = findings.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![FindingKind::RedundantSload, FindingKind::GasForwarding, FindingKind::ExpensiveOpcode]
    );

    // Short and padded keys name the same slot
    assert_eq!(findings[0].location.to_string(), "0x0c");
    assert_eq!(findings[0].gas_savings, 200);

    assert_eq!(
        findings[1].detail("to"),
        Some(&DetailValue::Text("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string()))
    );
    assert_eq!(findings[2].detail("opcode"), Some(&DetailValue::Text("SSTORE".to_string())));
}

#[test]
fn test_token_transfer_report_counts() {
    let report = replayed("token_transfer.jsonl").try_report().unwrap();
    assert_eq!(report.storage_reads, 1);
    assert_eq!(report.storage_writes, 1);
    assert_eq!(report.memory_operations, 1);
    assert_eq!(report.call_operations, 1);
    assert_eq!(report.expensive_ops, 1);
    assert_eq!(report.gas_by_opcode["SLOAD"], 2300);
    assert_eq!(report.gas_by_opcode["STOP"], 0);
}

#[test]
fn test_late_events_ignored() {
    let tracer = replayed("batch_calls.jsonl");
    assert_eq!(tracer.ignored_events(), 1);
    assert_eq!(tracer.with_state(|s| s.distinct_slots_read()), 0);

    let kinds: Vec<FindingKind> = tracer.findings().iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FindingKind::MemoryExpansion, FindingKind::MultipleCalls]);
}

#[test]
fn test_truncated_trace_is_not_finalized() {
    let trace = TraceData::from_file(fixture("truncated.jsonl")).unwrap();
    assert!(!trace.is_complete());

    let tracer = GasTracer::default();
    let summary = replay(&trace, &tracer);
    assert!(!summary.saw_tx_end);
    assert_eq!(tracer.phase(), Phase::Running);
    assert!(tracer.try_report().is_err());
}

#[test]
fn test_missing_file() {
    let err = TraceData::from_file(fixture("does_not_exist.jsonl")).unwrap_err();
    assert!(matches!(err, TraceError::Io(_)));
}

#[test]
fn test_cli_json_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_gaslens"))
        .arg(fixture("token_transfer.jsonl"))
        .args(["--json", "--quiet"])
        .output()
        .expect("Failed to run gaslens");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(parsed["total_gas_used"], 32_713);
    assert_eq!(parsed["optimizations"][0]["type"], "redundant_sload");
    assert_eq!(parsed["optimizations"][0]["location"], "0x0c");
}

#[test]
fn test_cli_text_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_gaslens"))
        .arg(fixture("token_transfer.jsonl"))
        .args(["--no-color", "--verbose", "--quiet", "--top", "3"])
        .output()
        .expect("Failed to run gaslens");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("HIGH PRIORITY OPTIMIZATIONS"));
    assert!(stdout.contains("GAS USAGE BREAKDOWN"));
    assert!(stdout.contains("RECOMMENDATIONS"));
    assert!(!stdout.contains("KECCAK256"), "breakdown should stop at 3 rows");
}

#[test]
fn test_cli_incomplete_trace_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_gaslens"))
        .arg(fixture("truncated.jsonl"))
        .arg("--quiet")
        .output()
        .expect("Failed to run gaslens");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("incomplete"));
}

#[test]
fn test_cli_bad_config_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{ "hot_opcode_divisor": 0 }"#).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_gaslens"))
        .arg(fixture("token_transfer.jsonl"))
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to run gaslens");
    assert_eq!(output.status.code(), Some(2));
}
