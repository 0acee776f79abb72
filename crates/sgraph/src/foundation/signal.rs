//! Single-threaded signals used for object notifications
//!
//! Handlers are registered with [`Signal::connect`] and invoked in connection
//! order by [`Signal::emit`]. The handler list is snapshotted before emission,
//! so a handler may connect or disconnect others while it runs.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle identifying a connected handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection(u64);

type Slot<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// A list of handlers notified with a shared value
pub struct Signal<T> {
    slots: RefCell<Vec<(Connection, Slot<T>)>>,
    next_id: Cell<u64>,
}

impl<T> Signal<T> {
    /// Create a signal without handlers
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a handler, returning its connection handle
    pub fn connect<F>(&self, handler: F) -> Connection
    where
        F: FnMut(&T) + 'static,
    {
        let connection = Connection(self.next_id.get());
        self.next_id.set(connection.0 + 1);
        let slot: Slot<T> = Rc::new(RefCell::new(handler));
        self.slots.borrow_mut().push((connection, slot));
        connection
    }

    /// Remove a handler; returns false if it was not connected
    pub fn disconnect(&self, connection: Connection) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|(c, _)| *c != connection);
        slots.len() != before
    }

    /// Remove every handler
    pub fn disconnect_all(&self) {
        self.slots.borrow_mut().clear();
    }

    /// Number of connected handlers
    pub fn num_connections(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Invoke every connected handler with `value`
    pub fn emit(&self, value: &T) {
        let slots: Vec<Slot<T>> = self.slots.borrow().iter().map(|(_, s)| Rc::clone(s)).collect();
        for slot in slots {
            match slot.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(value),
                // A handler that triggers its own signal again is not re-entered
                Err(_) => log::warn!("Skipping re-entrant signal handler"),
            }
        }
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.num_connections())
            .finish()
    }
}
