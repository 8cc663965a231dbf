//! Change notification system for broadcasting store updates to the UI.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::db::Id;

/// Messages broadcast when entities are created, updated, or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum UpdateMessage {
    // Groups
    GroupCreated { group_id: Id },
    GroupUpdated { group_id: Id },
    GroupDeleted { group_id: Id },

    // Todos
    TodoCreated { todo_id: Id },
    TodoUpdated { todo_id: Id },
    TodoDeleted { todo_id: Id },

    // SubTodos
    SubTodoCreated { subtodo_id: Id },
    SubTodoUpdated { subtodo_id: Id },
    SubTodoDeleted { subtodo_id: Id },

    /// Every row was removed by a reset.
    StoreCleared,
}

/// Pub/sub notifier for broadcasting store changes to all subscribers.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<UpdateMessage>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    /// Create a new ChangeNotifier with a buffer of 100 messages.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self { tx }
    }

    /// Subscribe to receive update notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateMessage> {
        self.tx.subscribe()
    }

    /// Broadcast an update message to all subscribers.
    ///
    /// Sending with no live receivers is not an error.
    pub fn notify(&self, msg: UpdateMessage) {
        let _ = self.tx.send(msg);
    }
}
