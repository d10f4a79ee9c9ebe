//! Fan-out of snapshots to connected clients.
//!
//! Each connection owns a bounded outbox. The [`Broadcaster`] sink pushes
//! every snapshot into every subscribed outbox without waiting; a client
//! whose outbox is full or closed is dropped and reported back to the
//! session so its seat can be marked disconnected.

use std::collections::BTreeMap;
use std::sync::Arc;

use codex_types::{ConnectionId, GameView, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::notify::{Delivery, SnapshotSink};

/// Subscription changes queued for the broadcaster.
#[derive(Debug)]
enum Control {
    Subscribe {
        connection: ConnectionId,
        seat: u32,
        outbox: mpsc::Sender<ServerMessage>,
    },
    Unsubscribe(ConnectionId),
}

struct Subscriber {
    seat: u32,
    outbox: mpsc::Sender<ServerMessage>,
}

/// Sink that delivers snapshots to subscribed connections.
pub struct Broadcaster {
    control: mpsc::UnboundedReceiver<Control>,
    subscribers: BTreeMap<ConnectionId, Subscriber>,
}

/// Cloneable handle for changing a [`Broadcaster`]'s subscriptions.
#[derive(Debug, Clone)]
pub struct BroadcastHandle {
    control: mpsc::UnboundedSender<Control>,
}

/// Create a broadcaster and the handle that feeds it subscriptions.
pub fn channel() -> (Broadcaster, BroadcastHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Broadcaster {
            control: rx,
            subscribers: BTreeMap::new(),
        },
        BroadcastHandle { control: tx },
    )
}

impl BroadcastHandle {
    /// Start delivering snapshots to `outbox`, from the next one on.
    pub fn subscribe(
        &self,
        connection: ConnectionId,
        seat: u32,
        outbox: mpsc::Sender<ServerMessage>,
    ) {
        // A closed control channel means the session is gone; nothing to do.
        let _ = self.control.send(Control::Subscribe {
            connection,
            seat,
            outbox,
        });
    }

    /// Stop delivering to `connection`.
    pub fn unsubscribe(&self, connection: ConnectionId) {
        let _ = self.control.send(Control::Unsubscribe(connection));
    }
}

impl Broadcaster {
    #[cfg(test)]
    fn subscriber_count(&mut self) -> usize {
        self.apply_control();
        self.subscribers.len()
    }

    fn apply_control(&mut self) {
        while let Ok(control) = self.control.try_recv() {
            match control {
                Control::Subscribe {
                    connection,
                    seat,
                    outbox,
                } => {
                    self.subscribers
                        .insert(connection, Subscriber { seat, outbox });
                }
                Control::Unsubscribe(connection) => {
                    self.subscribers.remove(&connection);
                }
            }
        }
    }
}

impl SnapshotSink for Broadcaster {
    fn on_snapshot(&mut self, view: &Arc<GameView>) -> Delivery {
        self.apply_control();
        let mut dropped = Vec::new();
        for (connection, subscriber) in &self.subscribers {
            let message = ServerMessage::Snapshot {
                view: Arc::clone(view),
            };
            if let Err(err) = subscriber.outbox.try_send(message) {
                let reason = match err {
                    mpsc::error::TrySendError::Full(_) => "outbox full",
                    mpsc::error::TrySendError::Closed(_) => "connection closed",
                };
                warn!(
                    %connection,
                    seat = subscriber.seat,
                    reason,
                    "dropping subscriber"
                );
                dropped.push(*connection);
            }
        }
        for connection in &dropped {
            self.subscribers.remove(connection);
        }
        debug!(
            version = view.version,
            receivers = self.subscribers.len(),
            "snapshot broadcast"
        );
        Delivery { dropped }
    }
}
