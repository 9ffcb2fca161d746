//! # gaslens - Streaming EVM Gas Optimization Analyzer
//!
//! gaslens consumes the ordered event stream an EVM interpreter emits while
//! executing one transaction (one event per executed instruction, plus frame
//! enter/exit and transaction boundaries), keeps running aggregates, and flags
//! deterministic gas optimization findings. The result is an immutable,
//! serializable report.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  EVM Interpreter (external)                     │
//! │        live adapter, or a recorded JSON Lines trace file        │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ ExecutionEvent (gaslens-common)
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     gaslens (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │  │  trace_data  │──▶│    tracer    │──▶│   analysis   │        │
//! │  │   (replay)   │   │ (GasTracer)  │◀──│  (detector)  │        │
//! │  └──────────────┘   └──────┬───────┘   └──────────────┘        │
//! │                            │                                    │
//! │                            ▼                                    │
//! │                     ┌──────────────┐   ┌──────────────┐        │
//! │                     │    export    │──▶│  presenter   │        │
//! │                     │   (Report)   │   │  (terminal)  │        │
//! │                     └──────────────┘   └──────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! ### Core Pipeline Modules
//!
//! - [`tracer`]: event consumption and running aggregates
//!   - `gas_tracer`: the [`tracer::ExecutionTracer`] callback surface and the
//!     mutex-guarded [`tracer::GasTracer`]
//!   - `sequencer`: single-consumer channel for multi-threaded producers
//!   - `state`: [`tracer::RunningState`] and its per-category records
//!
//! - [`analysis`]: findings and the pattern detector
//!   - Per-step checks: redundant storage reads, full gas forwarding, memory expansion
//!   - Terminal pass at `TxEnd`: hot opcodes, batchable external calls
//!
//! - [`classification`]: maps each opcode to the category that drives analysis
//!
//! - [`export`]: the [`export::Report`] snapshot and its stable JSON form
//!
//! ### Supporting Modules
//!
//! - [`presenter`]: human-readable findings report and gas breakdown
//! - [`trace_data`]: recorded traces and the replay driver
//! - [`config`]: analyzer thresholds, optionally loaded from JSON
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: core domain types (Pc, Location, SlotKey) and error types
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──TxStart──▶ Started ──Enter/Step──▶ Running ──TxEnd──▶ Ended
//! ```
//!
//! One tracer per transaction. Deliver every event, then read the report,
//! then drop the tracer. Events after `TxEnd` are counted and ignored.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Findings report for a recorded trace
//! gaslens trace.jsonl
//!
//! # With the per-opcode breakdown
//! gaslens trace.jsonl --verbose
//!
//! # Machine-readable report
//! gaslens trace.jsonl --json > report.json
//! ```
//!
//! ## Key Concepts
//!
//! - **Storage slot**: 32-byte key into contract storage, compared by its padded hex form
//! - **Warm read**: repeated read of a slot within one transaction, approximated at 100 gas
//! - **63/64 rule**: a call retains at least 1/64 of remaining gas for the caller
//! - **Frame depth**: nesting level of message calls, tracked from Enter/Exit

pub mod analysis;
pub mod classification;
pub mod cli;
pub mod config;
pub mod domain;
pub mod export;
pub mod presenter;
pub mod trace_data;
pub mod tracer;
