use crate::network::signal::{HandlerId, Signal, SignalSlot};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};

struct Subscription {
    signal: Arc<dyn SignalSlot>,
    id: HandlerId,
}

struct SourceGroup {
    source: &'static str,
    subscriptions: Vec<Subscription>,
}

/// シグナル発行元ごとに登録したハンドラを覚えておき、まとめて外す
pub struct SubscriptionSet {
    /// None = 解除済み
    groups: Mutex<Option<Vec<SourceGroup>>>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self {
            groups: Mutex::new(Some(Vec::new())),
        }
    }

    fn groups(&self) -> MutexGuard<'_, Option<Vec<SourceGroup>>> {
        self.groups.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe<E, F>(&self, source: &'static str, signal: &Arc<Signal<E>>, handler: F) -> HandlerId
    where
        E: 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = signal.connect(handler);
        self.record(source, signal, id)
    }

    pub fn subscribe_after<E, F>(
        &self,
        source: &'static str,
        signal: &Arc<Signal<E>>,
        handler: F,
    ) -> HandlerId
    where
        E: 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = signal.connect_after(handler);
        self.record(source, signal, id)
    }

    fn record<E: 'static>(&self, source: &'static str, signal: &Arc<Signal<E>>, id: HandlerId) -> HandlerId {
        let slot: Arc<dyn SignalSlot> = signal.clone();
        let mut guard = self.groups();
        let Some(groups) = guard.as_mut() else {
            // 解除済みなら登録したそばから外す
            slot.disconnect(id);
            return id;
        };
        let subscription = Subscription { signal: slot, id };
        match groups.iter_mut().find(|g| g.source == source) {
            Some(group) => group.subscriptions.push(subscription),
            None => groups.push(SourceGroup {
                source,
                subscriptions: vec![subscription],
            }),
        }
        id
    }

    pub fn is_torn_down(&self) -> bool {
        self.groups().is_none()
    }

    pub fn len(&self) -> usize {
        self.groups()
            .as_ref()
            .map(|groups| groups.iter().map(|g| g.subscriptions.len()).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 全ハンドラを外す。実際に外した数を返し、2回目以降は何もしない
    pub fn teardown_all(&self) -> usize {
        let Some(groups) = self.groups().take() else {
            return 0;
        };

        let mut disconnected = 0;
        for group in groups {
            for sub in group.subscriptions {
                if sub.signal.is_connected(sub.id) && sub.signal.disconnect(sub.id) {
                    disconnected += 1;
                } else {
                    debug!(
                        "{}.{}: handler {} already disconnected",
                        group.source,
                        sub.signal.name(),
                        sub.id
                    );
                }
            }
        }
        disconnected
    }
}

impl Default for SubscriptionSet {
    fn default() -> Self {
        Self::new()
    }
}
