//! In-memory UART between the two ECUs.
//!
//! Each direction is an `embassy_sync` [`Channel`] guarded by a
//! [`CriticalSectionRawMutex`]; the two [`LinkEnd`]s share them through an
//! `Arc` and can live on different threads.
//!
//! `recv_byte` parks on the channel until a byte arrives or the peer end
//! is dropped.  With a timeout set, an `embassy_time` [`Timer`] races the
//! receive and turns a silent peer into [`LinkError::Timeout`].

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use futures_lite::future::{self, block_on};
use log::{debug, trace};

use crate::app::ports::{LinkError, LinkPort};

/// Bytes buffered per direction.
pub const LINK_DEPTH: usize = 32;

type Lane = Channel<CriticalSectionRawMutex, u8, LINK_DEPTH>;

struct Wire {
    lanes: [Lane; 2],
    closed: [AtomicBool; 2],
    /// Raised on side `i` when the other end is dropped.
    hangup: [Signal<CriticalSectionRawMutex, ()>; 2],
}

/// One end of the link.
pub struct LinkEnd {
    wire: Arc<Wire>,
    side: usize,
    name: &'static str,
    timeout: Option<Duration>,
}

fn millis(timeout_ms: Option<u32>) -> Option<Duration> {
    timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)))
}

/// Create both ends; `timeout_ms` applies to receives on either end.
pub fn link_pair(timeout_ms: Option<u32>) -> (LinkEnd, LinkEnd) {
    let wire = Arc::new(Wire {
        lanes: [Channel::new(), Channel::new()],
        closed: [AtomicBool::new(false), AtomicBool::new(false)],
        hangup: [Signal::new(), Signal::new()],
    });
    let timeout = millis(timeout_ms);
    let a = LinkEnd {
        wire: Arc::clone(&wire),
        side: 0,
        name: "hmi",
        timeout,
    };
    let b = LinkEnd {
        wire,
        side: 1,
        name: "control",
        timeout,
    };
    (a, b)
}

impl LinkEnd {
    /// Replace this end's receive timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: Option<u32>) -> Self {
        self.timeout = millis(timeout_ms);
        self
    }

    fn outgoing(&self) -> &Lane {
        &self.wire.lanes[self.side]
    }

    fn incoming(&self) -> &Lane {
        &self.wire.lanes[1 - self.side]
    }

    fn peer_closed(&self) -> bool {
        self.wire.closed[1 - self.side].load(Ordering::Acquire)
    }

    async fn hangup<T>(&self) -> Result<T, LinkError> {
        self.wire.hangup[self.side].wait().await;
        Err(LinkError::Closed)
    }

    fn wait_for_byte(&self) -> Result<u8, LinkError> {
        if let Ok(byte) = self.incoming().try_receive() {
            return Ok(byte);
        }
        if self.peer_closed() {
            return Err(LinkError::Closed);
        }
        let byte_or_hangup = future::or(async { Ok(self.incoming().receive().await) }, self.hangup());
        match self.timeout {
            None => block_on(byte_or_hangup),
            Some(t) => block_on(future::or(byte_or_hangup, async {
                Timer::after(t).await;
                debug!("link({}): receive timed out", self.name);
                Err(LinkError::Timeout)
            })),
        }
    }
}

impl LinkPort for LinkEnd {
    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        if self.peer_closed() {
            return Err(LinkError::Closed);
        }
        trace!("link({}): tx 0x{:02X}", self.name, byte);
        // A full lane blocks until the peer reads or hangs up.
        block_on(future::or(
            async {
                self.outgoing().send(byte).await;
                Ok(())
            },
            self.hangup(),
        ))
    }

    fn recv_byte(&mut self) -> Result<u8, LinkError> {
        let byte = self.wait_for_byte()?;
        trace!("link({}): rx 0x{:02X}", self.name, byte);
        Ok(byte)
    }
}

impl Drop for LinkEnd {
    fn drop(&mut self) {
        self.wire.closed[self.side].store(true, Ordering::Release);
        self.wire.hangup[1 - self.side].signal(());
    }
}
