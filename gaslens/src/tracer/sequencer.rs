//! Single-consumer event delivery.
//!
//! Drivers that produce events from several threads push them into one
//! bounded channel; a dedicated consumer thread drains it and calls the
//! [`GasTracer`] handlers strictly in arrival order. Since only that thread
//! touches the tracer while delivery runs, per-slot counts and the findings
//! log are never observed mid-update.
//!
//! ```text
//! producer ─┐
//! producer ─┼──▶ bounded channel ──▶ consumer thread ──▶ GasTracer
//! producer ─┘
//! ```

use crossbeam_channel::{bounded, Sender};
use gaslens_common::ExecutionEvent;
use log::{debug, trace};
use std::thread::JoinHandle;

use super::gas_tracer::{ExecutionTracer, GasTracer};
use crate::domain::SequencerError;

/// Default channel capacity; producers block once this many events are queued.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Serializes events from any number of producers into one tracer.
pub struct EventSequencer {
    tx: Sender<ExecutionEvent>,
    handle: JoinHandle<GasTracer>,
}

impl EventSequencer {
    /// Move `tracer` onto a consumer thread fed by a channel of `capacity`.
    #[must_use]
    pub fn spawn(tracer: GasTracer, capacity: usize) -> Self {
        let (tx, rx) = bounded::<ExecutionEvent>(capacity);
        let handle = std::thread::spawn(move || {
            let mut delivered = 0u64;
            for event in rx {
                trace!("Delivering {} event", event.kind());
                tracer.dispatch(&event);
                delivered += 1;
            }
            debug!("Event channel closed after {delivered} events");
            tracer
        });
        Self { tx, handle }
    }

    /// A handle producers can clone and send from.
    #[must_use]
    pub fn sender(&self) -> Sender<ExecutionEvent> {
        self.tx.clone()
    }

    /// Queue one event, blocking while the channel is full.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Closed`] if the consumer has stopped.
    pub fn send(&self, event: ExecutionEvent) -> Result<(), SequencerError> {
        self.tx.send(event).map_err(|_| SequencerError::Closed)
    }

    /// Close the channel, wait for every queued event to be handled, and
    /// return the tracer.
    ///
    /// Senders obtained through [`EventSequencer::sender`] must be dropped
    /// first, or this waits for them.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::ConsumerPanicked`] if a handler panicked.
    pub fn finish(self) -> Result<GasTracer, SequencerError> {
        drop(self.tx);
        self.handle.join().map_err(|_| SequencerError::ConsumerPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SlotKey;
    use crate::tracer::Phase;
    use gaslens_common::{OpCode, StepEvent, U256};

    #[test]
    fn test_finish_returns_ended_tracer() {
        let sequencer = EventSequencer::spawn(GasTracer::default(), 4);
        sequencer.send(ExecutionEvent::TxStart { gas_limit: 100_000 }).unwrap();
        sequencer
            .send(ExecutionEvent::Step(StepEvent::new(0, OpCode::PUSH1, 100_000, 3, 1)))
            .unwrap();
        sequencer.send(ExecutionEvent::TxEnd { gas_used: 21_003 }).unwrap();

        let tracer = sequencer.finish().unwrap();
        assert_eq!(tracer.phase(), Phase::Ended);
        assert_eq!(tracer.total_gas_used(), 21_003);
    }

    #[test]
    fn test_concurrent_producers_lose_no_reads() {
        let sequencer = EventSequencer::spawn(GasTracer::default(), 16);
        sequencer.send(ExecutionEvent::TxStart { gas_limit: 1_000_000 }).unwrap();

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let tx = sequencer.sender();
                std::thread::spawn(move || {
                    for pc in 0..25 {
                        let step = StepEvent::new(pc, OpCode::SLOAD, 1_000_000, 100, 1)
                            .with_stack(vec![U256::from(0xaa)]);
                        tx.send(ExecutionEvent::Step(step)).unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let tracer = sequencer.finish().unwrap();
        let slot = SlotKey::from(U256::from(0xaa));
        assert_eq!(tracer.with_state(|s| s.read_count(&slot)), 100);
        // Reads 3..=100 each produce a finding
        assert_eq!(tracer.findings().len(), 98);
    }
}
