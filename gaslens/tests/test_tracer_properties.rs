use gaslens::analysis::{DetailValue, FindingKind, Severity};
use gaslens::domain::SlotKey;
use gaslens::tracer::{ExecutionTracer, GasTracer, Phase};
use gaslens_common::{Address, CallFrame, FrameExit, OpCode, StepEvent, U256};

fn sload(pc: u64, key: u64) -> StepEvent {
    StepEvent::new(pc, OpCode::SLOAD, 1_000_000, 100, 1).with_stack(vec![U256::from(key)])
}

fn call(pc: u64) -> StepEvent {
    // Forwarded gas well below the 63/64 maximum
    StepEvent::new(pc, OpCode::CALL, 1_000_000, 100, 1)
        .with_stack(vec![U256::from(10_000), U256::from(0xdead)])
}

fn frame() -> CallFrame {
    CallFrame {
        call_type: OpCode::CALL,
        from: Address::default(),
        to: Address::default(),
        gas: 50_000,
        value: None,
    }
}

fn redundant_reads(tracer: &GasTracer) -> Vec<u64> {
    tracer
        .findings()
        .iter()
        .filter(|f| f.kind == FindingKind::RedundantSload)
        .map(|f| f.gas_savings)
        .collect()
}

#[test]
fn test_nth_read_sets_count_to_n() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);
    let slot = SlotKey::from(U256::from(0x42));

    for n in 1..=6u64 {
        tracer.on_step(&sload(n, 0x42));
        assert_eq!(tracer.with_state(|s| s.read_count(&slot)), n);
        let emitted = u64::try_from(redundant_reads(&tracer).len()).unwrap();
        assert_eq!(emitted, n.saturating_sub(2), "after read {n}");
    }
}

#[test]
fn test_two_reads_no_finding_three_reads_one() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);
    tracer.on_step(&sload(0, 1));
    tracer.on_step(&sload(1, 1));
    assert!(redundant_reads(&tracer).is_empty());

    tracer.on_step(&sload(2, 1));
    assert_eq!(redundant_reads(&tracer), vec![200]);

    let finding = &tracer.findings()[0];
    assert_eq!(finding.severity, Severity::High);
    assert_eq!(finding.detail("read_count"), Some(&DetailValue::Integer(3)));
    assert_eq!(finding.location.to_string(), "0x02");
}

#[test]
fn test_distinct_slots_counted_separately() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);
    for key in 0..3 {
        tracer.on_step(&sload(key, key));
        tracer.on_step(&sload(key, key));
    }
    assert!(redundant_reads(&tracer).is_empty());
}

#[test]
fn test_six_calls_yield_batch_finding() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);
    for pc in 0..6 {
        tracer.on_step(&call(pc));
    }
    tracer.on_tx_end(100_000);

    let batch: Vec<_> =
        tracer.findings().into_iter().filter(|f| f.kind == FindingKind::MultipleCalls).collect();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].gas_savings, 6 * 2100);
    assert_eq!(batch[0].detail("call_count"), Some(&DetailValue::Integer(6)));
    assert_eq!(batch[0].location.to_string(), "multiple");
}

#[test]
fn test_five_calls_yield_no_batch_finding() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);
    for pc in 0..5 {
        tracer.on_step(&call(pc));
    }
    tracer.on_tx_end(100_000);

    assert!(tracer.findings().iter().all(|f| f.kind != FindingKind::MultipleCalls));
}

#[test]
fn test_memory_expansion_every_step_with_exact_size() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);
    let sizes = [9_999, 10_000, 10_001, 10_001, 65_536];
    for (pc, size) in (0u64..).zip(sizes) {
        tracer.on_step(&StepEvent::new(pc, OpCode::MSTORE, 1_000_000, 3, 1).with_memory_size(size));
    }

    let reported: Vec<DetailValue> = tracer
        .findings()
        .iter()
        .filter(|f| f.kind == FindingKind::MemoryExpansion)
        .filter_map(|f| f.detail("memory_size").cloned())
        .collect();
    assert_eq!(
        reported,
        vec![
            DetailValue::Integer(10_001),
            DetailValue::Integer(10_001),
            DetailValue::Integer(65_536)
        ]
    );
}

#[test]
fn test_zero_total_has_no_hot_opcodes() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);
    tracer.on_step(&StepEvent::new(0, OpCode::SSTORE, 1_000_000, 5000, 1));
    tracer.on_tx_end(0);

    assert_eq!(tracer.phase(), Phase::Ended);
    assert_eq!(tracer.total_gas_used(), 0);
    assert!(tracer.findings().iter().all(|f| f.kind != FindingKind::ExpensiveOpcode));
}

#[test]
fn test_hot_opcode_share_reported() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);
    tracer.on_step(&StepEvent::new(0, OpCode::SSTORE, 1_000_000, 5000, 1));
    tracer.on_step(&StepEvent::new(1, OpCode::PUSH1, 1_000_000, 3, 1));
    tracer.on_tx_end(10_000);

    let hot: Vec<_> = tracer
        .findings()
        .into_iter()
        .filter(|f| f.kind == FindingKind::ExpensiveOpcode)
        .collect();
    assert_eq!(hot.len(), 1);
    assert_eq!(hot[0].detail("opcode"), Some(&DetailValue::Text("SSTORE".to_string())));
    assert_eq!(hot[0].detail("percentage"), Some(&DetailValue::Float(50.0)));
}

#[test]
fn test_nested_frames_restore_depth() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);

    for level in 0..10u64 {
        assert_eq!(tracer.depth(), level);
        tracer.on_enter(&frame());
        tracer.on_step(&StepEvent::new(level, OpCode::PUSH1, 50_000, 3, level + 1));
    }
    assert_eq!(tracer.depth(), 10);

    for level in (0..10u64).rev() {
        tracer.on_exit(&FrameExit { gas_used: 10, error: None });
        assert_eq!(tracer.depth(), level);
    }
    tracer.on_tx_end(21_030);
    assert_eq!(tracer.depth(), 0);
}

#[test]
fn test_streaming_findings_precede_terminal_findings() {
    let tracer = GasTracer::default();
    tracer.on_tx_start(1_000_000);
    for pc in 0..3 {
        tracer.on_step(&sload(pc, 7));
    }
    for pc in 3..9 {
        tracer.on_step(&call(pc));
    }
    tracer.on_step(&StepEvent::new(9, OpCode::MLOAD, 1_000_000, 3, 1).with_memory_size(20_000));
    tracer.on_tx_end(1000);

    let kinds: Vec<FindingKind> = tracer.findings().iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FindingKind::RedundantSload,
            FindingKind::MemoryExpansion,
            // CALL 600 and SLOAD 300 both exceed 10% of 1000, mnemonic order
            FindingKind::ExpensiveOpcode,
            FindingKind::ExpensiveOpcode,
            FindingKind::MultipleCalls,
        ]
    );
}
