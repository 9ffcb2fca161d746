//! # Event Consumer
//!
//! Receives the ordered event stream of one traced execution and folds it
//! into a [`RunningState`], asking the [`PatternDetector`] for findings at
//! fixed points.
//!
//! ## Event Routing
//!
//! - `TxStart` → start the trace, record the gas limit
//! - `Enter` / `Exit` → frame depth (Exit also accrues its usage)
//! - `Step` → usage accounting, then category-specific analysis
//! - `Fault` → recorded only
//! - `TxEnd` → authoritative total, terminal pass, trace ends
//!
//! ## Guarding
//!
//! All state sits behind one mutex held for the duration of a single handler
//! call. Warnings and the end-of-trace summary are logged after the guard is
//! released; only `debug` and `trace` lines are written under it. A poisoned
//! guard is recovered rather than propagated: a panic in one handler must not
//! take down every later event.
//!
//! ## Protocol Violations
//!
//! Never fatal. An `Exit` with no open frame leaves depth at zero; events
//! after `TxEnd` are counted and dropped; a second `TxStart` is dropped; an
//! event arriving before `TxStart` starts the trace implicitly. Only `Enter`
//! and `Step` move a started trace to running.

use gaslens_common::{Address, CallFrame, ExecutionEvent, FrameExit, StepEvent, B256};
use log::{debug, info, trace, warn};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::state::{
    CallOperation, ExpensiveOperation, FaultRecord, MemoryOperation, Phase, RunningState,
    StepCursor,
};
use crate::analysis::{Finding, PatternDetector};
use crate::classification::{
    classify_opcode, OpcodeCategory, CALL_GAS_OPERAND, CALL_TARGET_OPERAND, STORAGE_KEY_OPERAND,
};
use crate::config::AnalyzerConfig;
use crate::domain::{ReportError, SlotKey};
use crate::export::Report;

/// Callback surface an interpreter driver invokes as execution proceeds.
///
/// One method per event kind. Implementations take `&self` so a driver can
/// hold a shared reference while nested frames re-enter the tracer.
pub trait ExecutionTracer {
    fn on_tx_start(&self, gas_limit: u64);
    fn on_enter(&self, frame: &CallFrame);
    fn on_step(&self, step: &StepEvent);
    fn on_exit(&self, exit: &FrameExit);
    fn on_fault(&self, step: &StepEvent);
    fn on_tx_end(&self, gas_used: u64);

    /// Route a recorded event to its handler.
    fn dispatch(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::TxStart { gas_limit } => self.on_tx_start(*gas_limit),
            ExecutionEvent::Enter(frame) => self.on_enter(frame),
            ExecutionEvent::Step(step) => self.on_step(step),
            ExecutionEvent::Exit(exit) => self.on_exit(exit),
            ExecutionEvent::Fault(step) => self.on_fault(step),
            ExecutionEvent::TxEnd { gas_used } => self.on_tx_end(*gas_used),
        }
    }
}

/// Outcome of checking one event against the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Accepted,
    /// Accepted; the trace had not started and was started implicitly.
    ImplicitStart,
    /// Dropped because the trace already started.
    Duplicate,
    /// Dropped after `TxEnd`; carries the running ignored count.
    Ignored(u64),
}

impl Admission {
    fn is_accepted(self) -> bool {
        matches!(self, Admission::Accepted | Admission::ImplicitStart)
    }

    fn log(self, kind: &str) {
        match self {
            Admission::Accepted => {}
            Admission::ImplicitStart => {
                warn!("{kind} event arrived before TxStart; starting trace implicitly");
            }
            Admission::Duplicate => warn!("Ignoring duplicate {kind} event"),
            Admission::Ignored(1) => warn!("Ignoring {kind} event delivered after TxEnd"),
            Admission::Ignored(_) => trace!("Ignoring {kind} event delivered after TxEnd"),
        }
    }
}

/// Gas optimization tracer: owner of one [`RunningState`] plus its guard.
#[derive(Debug, Default)]
pub struct GasTracer {
    state: Mutex<RunningState>,
    detector: PatternDetector,
}

impl GasTracer {
    /// Create a tracer with the given thresholds.
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { state: Mutex::new(RunningState::new()), detector: PatternDetector::new(config) }
    }

    fn lock(&self) -> MutexGuard<'_, RunningState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the current state under the guard.
    ///
    /// Intended for reads after delivery has finished; reading while events
    /// are still being delivered sees an arbitrary intermediate state.
    pub fn with_state<R>(&self, f: impl FnOnce(&RunningState) -> R) -> R {
        f(&self.lock())
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    #[must_use]
    pub fn depth(&self) -> u64 {
        self.lock().depth
    }

    #[must_use]
    pub fn total_gas_used(&self) -> u64 {
        self.lock().total_gas_used
    }

    #[must_use]
    pub fn ignored_events(&self) -> u64 {
        self.lock().ignored_events
    }

    /// All findings recorded so far, in the order they were emitted.
    #[must_use]
    pub fn findings(&self) -> Vec<Finding> {
        self.lock().findings().to_vec()
    }

    /// Cumulative usage per instruction mnemonic.
    #[must_use]
    pub fn gas_by_opcode(&self) -> BTreeMap<String, u64> {
        self.lock().gas_per_opcode.clone()
    }

    /// Snapshot the current aggregates.
    ///
    /// Meaningful once the trace has ended. Earlier calls return a partial
    /// snapshot and log a warning; use [`GasTracer::try_report`] to refuse
    /// them instead.
    #[must_use]
    pub fn report(&self) -> Report {
        let (report, phase) = {
            let state = self.lock();
            (Report::from_state(&state), state.phase)
        };
        if !phase.is_ended() {
            warn!("Building report before TxEnd ({phase:?}); snapshot is partial");
        }
        report
    }

    /// Snapshot the aggregates, requiring the trace to have ended.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::NotFinalized`] if `TxEnd` has not been processed.
    pub fn try_report(&self) -> Result<Report, ReportError> {
        let state = self.lock();
        if !state.phase.is_ended() {
            return Err(ReportError::NotFinalized);
        }
        Ok(Report::from_state(&state))
    }

    /// The report in its machine-readable JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] if serialization fails.
    pub fn report_json(&self) -> Result<String, ReportError> {
        self.report().to_json()
    }

    /// Accept or reject an event according to the lifecycle.
    ///
    /// `advances` is set for the events that move a started trace to running.
    fn admit(state: &mut RunningState, advances: bool) -> Admission {
        match state.phase {
            Phase::Ended => {
                state.ignored_events += 1;
                Admission::Ignored(state.ignored_events)
            }
            Phase::Idle => {
                state.phase = if advances { Phase::Running } else { Phase::Started };
                Admission::ImplicitStart
            }
            Phase::Started => {
                if advances {
                    state.phase = Phase::Running;
                }
                Admission::Accepted
            }
            Phase::Running => Admission::Accepted,
        }
    }

    /// Run `handler` under the guard if the lifecycle admits the event.
    ///
    /// The admission outcome is logged once the guard is released.
    fn apply<R>(
        &self,
        kind: &str,
        advances: bool,
        handler: impl FnOnce(&mut RunningState) -> R,
    ) -> Option<R> {
        let (admission, outcome) = {
            let mut state = self.lock();
            let admission = Self::admit(&mut state, advances);
            let outcome = admission.is_accepted().then(|| handler(&mut state));
            (admission, outcome)
        };
        admission.log(kind);
        outcome
    }

    fn handle_storage_read(&self, state: &mut RunningState, step: &StepEvent) {
        let Some(key) = step.operand(STORAGE_KEY_OPERAND) else {
            trace!("SLOAD at pc {} without key operand", step.pc);
            return;
        };
        let slot = SlotKey::from(*key);
        let read_count = state.record_read(slot);
        if let Some(finding) = self.detector.check_storage_read(step.pc, &slot, read_count) {
            state.record_finding(finding);
        }
    }

    fn handle_storage_write(state: &mut RunningState, step: &StepEvent) {
        let Some(key) = step.operand(STORAGE_KEY_OPERAND) else {
            trace!("SSTORE at pc {} without key operand", step.pc);
            return;
        };
        state.record_write(SlotKey::from(*key));
    }

    fn handle_external_call(&self, state: &mut RunningState, step: &StepEvent) {
        let mut call = CallOperation {
            pc: step.pc,
            op: step.op,
            to: None,
            gas: step.gas,
            cost: step.cost,
            depth: step.depth,
        };

        // The call is recorded even when operands are missing; only the
        // forwarding check needs them.
        if let (Some(forwarded), Some(target)) =
            (step.operand(CALL_GAS_OPERAND), step.operand(CALL_TARGET_OPERAND))
        {
            call.to = Some(Address::from_word(B256::from(target.to_be_bytes::<32>())));
            if let Some(finding) = self.detector.check_gas_forwarding(forwarded, &call) {
                state.record_finding(finding);
            }
        }

        state.call_ops.push(call);
    }
}

impl ExecutionTracer for GasTracer {
    fn on_tx_start(&self, gas_limit: u64) {
        let admission = {
            let mut state = self.lock();
            match state.phase {
                Phase::Idle => {
                    state.phase = Phase::Started;
                    state.gas_limit = gas_limit;
                    state.depth = 0;
                    Admission::Accepted
                }
                Phase::Ended => Self::admit(&mut state, false),
                Phase::Started | Phase::Running => Admission::Duplicate,
            }
        };
        if admission == Admission::Accepted {
            debug!("TxStart gas_limit={gas_limit}");
        }
        admission.log("tx_start");
    }

    fn on_enter(&self, frame: &CallFrame) {
        self.apply("enter", true, |state| {
            state.depth += 1;
            trace!("Enter {} to={} depth={}", frame.call_type, frame.to, state.depth);
        });
    }

    fn on_step(&self, step: &StepEvent) {
        self.apply("step", true, |state| {
            state.cursor = StepCursor { pc: step.pc, gas: step.gas, depth: step.depth };
            state.charge(step.op, step.cost);

            let category = classify_opcode(step.op);
            match category {
                OpcodeCategory::StorageRead => self.handle_storage_read(state, step),
                OpcodeCategory::StorageWrite => Self::handle_storage_write(state, step),
                OpcodeCategory::Memory => state.memory_ops.push(MemoryOperation {
                    pc: step.pc,
                    op: step.op,
                    memory_size: step.memory_size,
                    cost: step.cost,
                    depth: step.depth,
                }),
                OpcodeCategory::ExternalCall => self.handle_external_call(state, step),
                OpcodeCategory::Create
                | OpcodeCategory::SelfDestruct
                | OpcodeCategory::Log
                | OpcodeCategory::Hash => {
                    if let Some(description) = self.detector.expensive_operation(category, step) {
                        state.expensive_ops.push(ExpensiveOperation {
                            pc: step.pc,
                            op: step.op,
                            cost: step.cost,
                            description,
                            depth: step.depth,
                        });
                    }
                }
                OpcodeCategory::Other => {}
            }

            if let Some(finding) = self.detector.check_memory_expansion(step.pc, step.memory_size)
            {
                state.record_finding(finding);
            }
        });
    }

    fn on_exit(&self, exit: &FrameExit) {
        let unmatched = self.apply("exit", false, |state| {
            let unmatched = state.depth == 0;
            if unmatched {
                state.unmatched_exits += 1;
            } else {
                state.depth -= 1;
            }
            // Provisional: superseded by the TxEnd total
            state.total_gas_used = state.total_gas_used.saturating_add(exit.gas_used);
            trace!("Exit gas_used={} depth={}", exit.gas_used, state.depth);
            unmatched
        });
        if unmatched == Some(true) {
            warn!("Exit without matching Enter; depth stays at 0");
        }
    }

    fn on_fault(&self, step: &StepEvent) {
        self.apply("fault", false, |state| {
            debug!("Fault {} at pc {} ({:?})", step.op, step.pc, step.error);
            state.faults.push(FaultRecord {
                pc: step.pc,
                op: step.op,
                depth: step.depth,
                error: step.error.clone(),
            });
        });
    }

    fn on_tx_end(&self, gas_used: u64) {
        let summary = self.apply("tx_end", false, |state| {
            if state.total_gas_used != gas_used {
                debug!(
                    "Live total {} differs from final total {gas_used}; using final",
                    state.total_gas_used
                );
            }
            state.total_gas_used = gas_used;

            let terminal = self.detector.terminal_pass(state);
            state.findings.extend(terminal);
            state.phase = Phase::Ended;

            (state.findings.len(), state.call_ops.len(), state.storage_reads.len())
        });

        if let Some((findings, calls, slots)) = summary {
            info!(
                "Trace ended: gas_used={gas_used}, {findings} findings, {calls} calls, \
                 {slots} distinct slots read"
            );
        }
    }
}
