//! Post-commit notification.
//!
//! After every committed mutation the session calls [`Notifier::notify`],
//! which projects the game once and hands the shared view to each
//! registered [`SnapshotSink`] in registration order.

use std::sync::Arc;

use codex_types::{ConnectionId, GameView};
use tokio::sync::watch;

use crate::game::Game;
use crate::view::project;

/// What a sink reports back after a snapshot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Connections that could not take the snapshot and were dropped.
    pub dropped: Vec<ConnectionId>,
}

/// Receiver of post-commit snapshots.
///
/// Implementations must not block: they run inside the game session and
/// every sink delays the next action by its own latency.
pub trait SnapshotSink: Send {
    /// Called after a mutation commits.
    fn on_snapshot(&mut self, view: &Arc<GameView>) -> Delivery;
}

/// Ordered set of sinks.
#[derive(Default)]
pub struct Notifier {
    sinks: Vec<Box<dyn SnapshotSink>>,
}

impl Notifier {
    /// A notifier with no sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink after the existing ones.
    pub fn register(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sinks.push(sink);
    }

    /// Project `game` and deliver the view to every sink.
    ///
    /// Returns the view and every connection a sink dropped.
    pub fn notify(&mut self, game: &Game) -> (Arc<GameView>, Delivery) {
        let view = Arc::new(project(game));
        let mut delivery = Delivery::default();
        for sink in &mut self.sinks {
            delivery.dropped.extend(sink.on_snapshot(&view).dropped);
        }
        (view, delivery)
    }
}

/// Sink that keeps the latest view for readers outside the session.
pub struct LatestView {
    tx: watch::Sender<Option<Arc<GameView>>>,
}

impl LatestView {
    /// Create the sink and a receiver that always sees the newest view.
    pub fn new() -> (Self, watch::Receiver<Option<Arc<GameView>>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

impl SnapshotSink for LatestView {
    fn on_snapshot(&mut self, view: &Arc<GameView>) -> Delivery {
        self.tx.send_replace(Some(Arc::clone(view)));
        Delivery::default()
    }
}
