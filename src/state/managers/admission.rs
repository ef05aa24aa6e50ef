//! Admission gate.
//!
//! A fixed pool of tickets bounding how many connections may sit between
//! TCP accept and disconnect. Acquisition never waits: when the pool is
//! empty the caller is refused immediately so the gateway can answer 503
//! before upgrading. A ticket goes back to the pool when it is dropped, so
//! whichever path ends a connection releases it exactly once.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounded-capacity ticket pool.
#[derive(Debug)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One unit of connection capacity. Released on drop.
#[derive(Debug)]
pub struct AdmissionTicket {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Create a gate with a fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Take a ticket if one is free. Never blocks.
    pub fn try_acquire(&self) -> Option<AdmissionTicket> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionTicket { _permit: permit })
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tickets currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Tickets currently held by connections.
    pub fn outstanding(&self) -> usize {
        self.capacity - self.available()
    }

    /// Refuse every later acquisition. Outstanding tickets stay valid.
    pub fn close(&self) {
        self.semaphore.close();
    }
}
