//! Event consumption core
//!
//! - `state`: running aggregates for one trace and the per-category records
//! - `gas_tracer`: the [`ExecutionTracer`] callback surface and [`GasTracer`]
//! - `sequencer`: single-consumer channel for multi-threaded producers

pub mod gas_tracer;
pub mod sequencer;
pub mod state;

pub use gas_tracer::{ExecutionTracer, GasTracer};
pub use sequencer::{EventSequencer, DEFAULT_CAPACITY};
pub use state::{
    CallOperation, ExpensiveOperation, FaultRecord, MemoryOperation, Phase, RunningState,
    StepCursor,
};
