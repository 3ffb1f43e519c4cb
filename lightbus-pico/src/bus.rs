//! # Bus Queue
//!
//! Adapts the transaction-level embassy-rp I2C slave driver to the byte
//! queue the protocol engine polls. The driver hands over whole write
//! transactions and per-byte read requests, so the queue can report
//! end-of-transaction authoritatively instead of inferring it from the
//! queue draining.

use heapless::Deque;
use lightbus::{Transceiver, FRAME_CAPACITY};

pub struct BusQueue {
    inbound: Deque<u8, FRAME_CAPACITY>,
    complete: bool,
    pending_read: bool,
    outbound: Option<u8>,
}

impl BusQueue {
    pub const fn new() -> Self {
        Self {
            inbound: Deque::new(),
            complete: false,
            pending_read: false,
            outbound: None,
        }
    }

    /// Queues one finished inbound transaction for the next engine poll.
    pub fn push_transaction(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let _ = self.inbound.push_back(byte);
        }
        self.complete = true;
    }

    /// Flags that the master is clocking a read byte.
    pub fn request_read(&mut self) {
        self.pending_read = true;
    }

    /// Takes the byte the engine produced for the pending read.
    pub fn take_outbound(&mut self) -> Option<u8> {
        self.outbound.take()
    }
}

impl Transceiver for BusQueue {
    fn bytes_available(&self) -> bool {
        !self.inbound.is_empty()
    }

    fn next_byte(&mut self) -> u8 {
        self.inbound.pop_front().unwrap_or(0)
    }

    fn transaction_complete(&self) -> bool {
        self.complete
    }

    fn read_pending(&self) -> bool {
        self.pending_read
    }

    fn send_byte(&mut self, byte: u8) {
        self.pending_read = false;
        self.outbound = Some(byte);
    }
}
