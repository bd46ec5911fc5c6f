//! Client registry, broadcast and lifecycle coordination.

use crate::client::{Client, ClientId};
use crate::invariants::{debug_assert_drained, debug_assert_registry_bounded};
use crate::{Config, Frame, SplitterError, Wait};
use log::{debug, trace};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Snapshot of one client's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientStats {
    /// The client's unique id.
    pub id: ClientId,
    /// Frames currently buffered for this client.
    pub latency: usize,
    /// Frames discarded at this client since its last flush.
    pub dropped: usize,
}

/// One-to-many in-memory stream splitter.
///
/// A producer broadcasts reference-counted frames with [`put`](Self::put);
/// every registered client receives the complete sequence through its own
/// bounded queue and drains it with [`get`](Self::get) at its own pace.
/// All methods take `&self` and are safe to call from any number of
/// threads.
///
/// # Locking
///
/// The registry sits behind a reader-writer lock. `put`, `get`,
/// `client_count` and the stats queries share the read side, so broadcasts
/// and dispatches from different threads proceed concurrently (each client
/// queue has its own synchronization). `add_client`, `remove_client`,
/// [`flush`](Self::flush) and [`close`](Self::close) take the write side
/// and therefore wait for in-flight `put`/`get` calls to finish, which is
/// bounded by those calls' own wait budgets. The registry lock is always
/// acquired before any queue lock, never the other way around.
pub struct Splitter {
    config: Config,
    clients: RwLock<Vec<Client>>,
}

impl Splitter {
    /// Creates a splitter with the given capacities.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
        }
    }

    /// Convenience constructor from raw capacities.
    ///
    /// # Panics
    ///
    /// Panics if `max_buffers` or `max_clients` is zero (see
    /// [`Config::new`]).
    pub fn create(max_buffers: usize, max_clients: usize) -> Self {
        Self::new(Config::new(max_buffers, max_clients))
    }

    /// The fixed capacities this splitter was created with.
    #[inline]
    pub fn info(&self) -> Config {
        self.config
    }

    // ---------------------------------------------------------------------
    // CLIENT LIFECYCLE
    // ---------------------------------------------------------------------

    /// Registers a new client and returns its id.
    ///
    /// The client (and its queue) is constructed outside the registry
    /// lock; the capacity check is repeated before the append in case
    /// another thread filled the registry in between. A full registry
    /// yields [`SplitterError::MaxClientsReached`] and leaves it unchanged.
    pub fn add_client(&self) -> Result<ClientId, SplitterError> {
        if self.read_clients().len() >= self.config.max_clients {
            return Err(SplitterError::MaxClientsReached);
        }

        let client = Client::new(self.config.max_buffers);
        let id = client.id();

        let mut clients = self.write_clients();
        if clients.len() >= self.config.max_clients {
            return Err(SplitterError::MaxClientsReached);
        }
        clients.push(client);
        debug_assert_registry_bounded!(clients.len(), self.config.max_clients);
        debug!(
            "client {id} added ({} of {})",
            clients.len(),
            self.config.max_clients
        );
        Ok(id)
    }

    /// Removes a client, flushing its queue and releasing its waiters.
    ///
    /// Removal preserves the relative order of the remaining clients.
    pub fn remove_client(&self, id: ClientId) -> Result<(), SplitterError> {
        let mut clients = self.write_clients();
        let index = clients
            .iter()
            .position(|client| client.id() == id)
            .ok_or(SplitterError::NoClientFound)?;

        clients[index].flush();
        clients.remove(index);
        debug!("client {id} removed");
        Ok(())
    }

    /// Number of registered clients.
    pub fn client_count(&self) -> usize {
        self.read_clients().len()
    }

    /// Stats for the client at `index` in registration order.
    pub fn client_by_index(&self, index: usize) -> Option<ClientStats> {
        self.read_clients().get(index).map(Self::stats)
    }

    /// Stats for the client registered under `id`.
    pub fn client_by_id(&self, id: ClientId) -> Option<ClientStats> {
        self.read_clients()
            .iter()
            .find(|client| client.id() == id)
            .map(Self::stats)
    }

    // ---------------------------------------------------------------------
    // DATA PATH
    // ---------------------------------------------------------------------

    /// Broadcasts `frame` to every client in registration order.
    ///
    /// Each client is offered the same reference-counted frame with the
    /// same wait budget, so a full broadcast takes at most
    /// `client_count × wait` wall time and the payload is never copied.
    /// The result is `Ok` only when every client stored the frame without
    /// loss; a drop at any client surfaces as
    /// [`SplitterError::DataDropped`], an empty registry as
    /// [`SplitterError::NoClients`].
    pub fn put(&self, frame: Frame, wait: Wait) -> Result<(), SplitterError> {
        let clients = self.read_clients();
        if clients.is_empty() {
            return Err(SplitterError::NoClients);
        }

        trace!("put: broadcasting {} bytes to {} clients", frame.len(), clients.len());
        let mut result = Ok(());
        for client in clients.iter() {
            if let Err(err) = client.put(frame.clone(), wait) {
                result = Err(err);
            }
        }
        result
    }

    /// Takes the next frame buffered for client `id`, waiting up to
    /// `wait` for one to arrive.
    ///
    /// An unknown id yields [`SplitterError::NoClientFound`]; an exhausted
    /// wait yields [`SplitterError::NoNewData`].
    pub fn get(&self, id: ClientId, wait: Wait) -> Result<Frame, SplitterError> {
        let clients = self.read_clients();
        let client = clients
            .iter()
            .find(|client| client.id() == id)
            .ok_or(SplitterError::NoClientFound)?;

        client.get(wait)
    }

    // ---------------------------------------------------------------------
    // LIFECYCLE
    // ---------------------------------------------------------------------

    /// Empties every client queue, wakes all blocked producers and
    /// consumers and resets drop accounting. The registry itself is
    /// untouched and the splitter stays fully usable.
    ///
    /// Always reports [`SplitterError::DataFlushed`]; the code is
    /// informational, not a failure.
    pub fn flush(&self) -> SplitterError {
        trace!("flush");
        let clients = self.write_clients();
        for client in clients.iter() {
            client.flush();
            debug_assert_drained!(client.latency(), client.dropped());
        }
        SplitterError::DataFlushed
    }

    /// Flushes every client, then clears the registry.
    ///
    /// The terminal transition: afterwards `client_count` is zero and any
    /// previously issued id is unknown. Like [`flush`](Self::flush), the
    /// returned [`SplitterError::DataFlushed`] is informational.
    pub fn close(&self) -> SplitterError {
        let result = self.flush();
        debug!("close");
        self.write_clients().clear();
        result
    }

    // ---------------------------------------------------------------------
    // LOCK HELPERS (poison-recovering)
    // ---------------------------------------------------------------------

    fn read_clients(&self) -> RwLockReadGuard<'_, Vec<Client>> {
        match self.clients.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_clients(&self) -> RwLockWriteGuard<'_, Vec<Client>> {
        match self.clients.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn stats(client: &Client) -> ClientStats {
        ClientStats {
            id: client.id(),
            latency: client.latency(),
            dropped: client.dropped(),
        }
    }
}

impl Drop for Splitter {
    fn drop(&mut self) {
        self.close();
    }
}
