//! In-process activity source
//!
//! The host bridges its input system into the monitor by calling
//! [`ChannelActivitySource::emit`] for every raw event. Listeners are kept
//! per kind, so an event is delivered only to subscribers that asked for it.

use std::collections::HashMap;
use std::sync::Arc;

use opsdesk_core::{ActivitySink, ActivitySource, ActivitySubscription};
use opsdesk_domain::{ActivityKind, OpsDeskError, Result};
use parking_lot::Mutex;
use tracing::{debug, trace};

#[derive(Default)]
struct Listeners {
    next_id: u64,
    by_kind: HashMap<ActivityKind, Vec<(u64, ActivitySink)>>,
}

impl Listeners {
    fn detach(&mut self, id: u64) {
        for sinks in self.by_kind.values_mut() {
            sinks.retain(|(existing, _)| *existing != id);
        }
        self.by_kind.retain(|_, sinks| !sinks.is_empty());
    }
}

/// Activity source fed by explicit `emit` calls.
#[derive(Clone, Default)]
pub struct ChannelActivitySource {
    listeners: Arc<Mutex<Listeners>>,
}

impl ChannelActivitySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one raw input event. Returns how many subscribers received it.
    ///
    /// Sinks whose receiving side is gone are pruned on the way.
    pub fn emit(&self, kind: ActivityKind) -> usize {
        let mut listeners = self.listeners.lock();
        let Some(sinks) = listeners.by_kind.get_mut(&kind) else {
            trace!(?kind, "activity without listeners");
            return 0;
        };

        sinks.retain(|(_, sink)| sink.send(kind).is_ok());
        let delivered = sinks.len();
        if delivered == 0 {
            listeners.by_kind.remove(&kind);
        }
        delivered
    }

    /// Number of live listeners for `kind`.
    pub fn listener_count(&self, kind: ActivityKind) -> usize {
        self.listeners.lock().by_kind.get(&kind).map_or(0, Vec::len)
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.lock().by_kind.is_empty()
    }
}

impl ActivitySource for ChannelActivitySource {
    fn subscribe(
        &self,
        kinds: &[ActivityKind],
        sink: ActivitySink,
    ) -> Result<ActivitySubscription> {
        if kinds.is_empty() {
            return Err(OpsDeskError::InvalidInput(
                "activity subscription needs at least one event kind".into(),
            ));
        }

        let id = {
            let mut listeners = self.listeners.lock();
            let id = listeners.next_id;
            listeners.next_id += 1;
            for kind in kinds {
                let sinks = listeners.by_kind.entry(*kind).or_default();
                if !sinks.iter().any(|(existing, _)| *existing == id) {
                    sinks.push((id, sink.clone()));
                }
            }
            id
        };
        debug!(subscription = id, kinds = kinds.len(), "activity listeners attached");

        let listeners = Arc::clone(&self.listeners);
        Ok(ActivitySubscription::new(move || {
            listeners.lock().detach(id);
            debug!(subscription = id, "activity listeners detached");
        }))
    }
}

impl std::fmt::Debug for ChannelActivitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock();
        f.debug_struct("ChannelActivitySource")
            .field("kinds", &listeners.by_kind.len())
            .field("next_id", &listeners.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn delivers_only_subscribed_kinds() {
        let source = ChannelActivitySource::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription =
            source.subscribe(&[ActivityKind::KeyDown, ActivityKind::Click], tx).unwrap();

        assert_eq!(source.emit(ActivityKind::KeyDown), 1);
        assert_eq!(source.emit(ActivityKind::Scroll), 0);
        assert_eq!(source.emit(ActivityKind::Click), 1);

        assert_eq!(rx.try_recv().unwrap(), ActivityKind::KeyDown);
        assert_eq!(rx.try_recv().unwrap(), ActivityKind::Click);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn duplicate_kinds_deliver_once() {
        let source = ChannelActivitySource::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription =
            source.subscribe(&[ActivityKind::Scroll, ActivityKind::Scroll], tx).unwrap();

        assert_eq!(source.listener_count(ActivityKind::Scroll), 1);
        source.emit(ActivityKind::Scroll);
        assert_eq!(rx.try_recv().unwrap(), ActivityKind::Scroll);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropping_subscription_detaches_every_kind() {
        let source = ChannelActivitySource::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let subscription = source.subscribe(&ActivityKind::ALL, tx).unwrap();
        for kind in ActivityKind::ALL {
            assert_eq!(source.listener_count(kind), 1);
        }

        drop(subscription);
        assert!(!source.has_listeners());
        assert_eq!(source.emit(ActivityKind::PointerMove), 0);
    }

    #[test]
    fn unsubscribe_leaves_other_subscribers_attached() {
        let source = ChannelActivitySource::new();
        let (first_tx, _first_rx) = mpsc::unbounded_channel();
        let (second_tx, mut second_rx) = mpsc::unbounded_channel();
        let first = source.subscribe(&[ActivityKind::KeyDown], first_tx).unwrap();
        let _second = source.subscribe(&[ActivityKind::KeyDown], second_tx).unwrap();

        first.unsubscribe();
        assert_eq!(source.emit(ActivityKind::KeyDown), 1);
        assert_eq!(second_rx.try_recv().unwrap(), ActivityKind::KeyDown);
    }

    #[test]
    fn prunes_sinks_whose_receiver_is_gone() {
        let source = ChannelActivitySource::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let _subscription = source.subscribe(&[ActivityKind::TouchStart], tx).unwrap();

        drop(rx);
        assert_eq!(source.emit(ActivityKind::TouchStart), 0);
        assert_eq!(source.listener_count(ActivityKind::TouchStart), 0);
    }

    #[test]
    fn empty_kind_list_is_rejected() {
        let source = ChannelActivitySource::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = source.subscribe(&[], tx).unwrap_err();
        assert!(matches!(err, OpsDeskError::InvalidInput(_)));
    }
}
