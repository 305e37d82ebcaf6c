//! Interrupt-driven event queue.
//!
//! Events are produced by:
//! - external interrupts (INT0/INT1/INT2 push buttons)
//! - the 1 s compare-match timer
//!
//! and consumed by the lab's main loop, one at a time in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ INTx ISR    │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Timer ISR   │────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The queue is a `heapless::spsc::Queue` split into a producer half,
//! handed to the interrupt side, and a consumer half kept by the loop.

use heapless::spsc::{Consumer, Producer, Queue};
use log::warn;

/// Ring size; one slot stays empty, so 31 events can be pending.
pub const EVENT_QUEUE_CAP: usize = 32;

/// Lab input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── Timer ─────────────────────────────────────────────
    /// One second elapsed.
    SecondElapsed = 0,

    // ── Buttons ───────────────────────────────────────────
    /// INT0: zero the stopwatch.
    ResetPressed = 10,
    /// INT1: freeze the stopwatch.
    PausePressed = 11,
    /// INT2: let the stopwatch run again.
    ResumePressed = 12,
    /// Toggle the fan motor's rotation.
    ReversePressed = 13,
}

// ── Lock-free SPSC queue ──────────────────────────────────────

/// Interrupt-side half.
pub struct EventProducer {
    inner: Producer<'static, Event, EVENT_QUEUE_CAP>,
    dropped: u32,
}

impl EventProducer {
    /// Push an event. Returns `false` if the queue is full (event dropped).
    pub fn push(&mut self, event: Event) -> bool {
        match self.inner.enqueue(event) {
            Ok(()) => true,
            Err(ev) => {
                self.dropped = self.dropped.saturating_add(1);
                warn!("events: queue full, dropped {:?}", ev);
                false
            }
        }
    }

    /// Events lost to a full queue so far.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Main-loop half.
pub struct EventConsumer {
    inner: Consumer<'static, Event, EVENT_QUEUE_CAP>,
}

impl EventConsumer {
    pub fn pop(&mut self) -> Option<Event> {
        self.inner.dequeue()
    }

    /// Drain all pending events into a callback, FIFO.
    pub fn drain(&mut self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Allocate a queue for the life of the program and split it.
///
/// The storage is leaked, standing in for the `static` buffer an ISR
/// writes to; call once per lab run.
pub fn event_queue() -> (EventProducer, EventConsumer) {
    let queue: &'static mut Queue<Event, EVENT_QUEUE_CAP> = Box::leak(Box::new(Queue::new()));
    let (producer, consumer) = queue.split();
    (
        EventProducer {
            inner: producer,
            dropped: 0,
        },
        EventConsumer { inner: consumer },
    )
}
