//! Connection registry.
//!
//! The authoritative map of live connections to identities. One exclusive
//! lock covers the map, the identity counter, and the closed flag, so a
//! broadcast that iterates and prunes never races a registration.
//!
//! The lock is a `tokio::sync::Mutex` because fan-out and shutdown write to
//! peers while holding it.

use crate::error::ConnectionError;
use crate::state::uid::{ConnId, IdentityGenerator};
use hub_proto::BoxedSink;
use std::collections::BTreeMap;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// A registered connection.
pub struct RegistryEntry {
    identity: String,
    sink: BoxedSink,
    retire: CancellationToken,
}

impl RegistryEntry {
    /// Identity assigned at registration.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Write half of the connection.
    pub fn sink_mut(&mut self) -> &mut BoxedSink {
        &mut self.sink
    }

    /// Split the entry for teardown.
    pub(crate) fn into_parts(self) -> (String, BoxedSink, CancellationToken) {
        (self.identity, self.sink, self.retire)
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("identity", &self.identity)
            .field("retired", &self.retire.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct RegistryInner {
    entries: BTreeMap<ConnId, RegistryEntry>,
    closed: bool,
}

/// Exclusive access to the registry for iteration plus mutation.
pub struct RegistryGuard<'a> {
    inner: MutexGuard<'a, RegistryInner>,
}

impl RegistryGuard<'_> {
    /// Live entries in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ConnId, &mut RegistryEntry)> {
        self.inner.entries.iter_mut().map(|(id, entry)| (*id, entry))
    }

    /// Remove one entry. Absent ids are a no-op.
    pub fn remove(&mut self, id: ConnId) -> Option<RegistryEntry> {
        self.inner.entries.remove(&id)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Refuse future registrations and take every remaining entry.
    pub fn close(&mut self) -> Vec<(ConnId, RegistryEntry)> {
        self.inner.closed = true;
        std::mem::take(&mut self.inner.entries).into_iter().collect()
    }
}

/// Live connection to identity map.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Mutex<RegistryInner>,
    identities: IdentityGenerator,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and assign it the next identity.
    ///
    /// Fails once the registry has been closed for shutdown; no identity is
    /// consumed in that case.
    pub async fn register(
        &self,
        sink: BoxedSink,
        retire: CancellationToken,
    ) -> Result<(ConnId, String), ConnectionError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(ConnectionError::ShuttingDown);
        }
        let id = self.identities.next();
        let identity = id.identity();
        inner.entries.insert(
            id,
            RegistryEntry {
                identity: identity.clone(),
                sink,
                retire,
            },
        );
        Ok((id, identity))
    }

    /// Remove a connection. Safe to call for an id that is already gone.
    pub async fn deregister(&self, id: ConnId) -> Option<RegistryEntry> {
        self.inner.lock().await.entries.remove(&id)
    }

    /// Current identity of a connection, if it is still registered.
    pub async fn identity_of(&self, id: ConnId) -> Option<String> {
        self.inner
            .lock()
            .await
            .entries
            .get(&id)
            .map(|entry| entry.identity.clone())
    }

    /// Number of registered connections.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Identities of registered connections, in registration order.
    pub async fn identities(&self) -> Vec<String> {
        self.inner
            .lock()
            .await
            .entries
            .values()
            .map(|entry| entry.identity.clone())
            .collect()
    }

    /// Whether the registry refuses new registrations.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }

    /// Take the exclusive lock for a broadcast or shutdown pass.
    pub async fn lock(&self) -> RegistryGuard<'_> {
        RegistryGuard {
            inner: self.inner.lock().await,
        }
    }
}
