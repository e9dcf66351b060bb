//! 接続オブジェクトが発行する名前付きシグナル

use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub type HandlerId = u64;

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Slot<E> {
    id: HandlerId,
    after: bool,
    handler: Handler<E>,
}

/// ハンドラ登録の解除だけを扱う型消去済みの窓口
pub trait SignalSlot: Send + Sync {
    fn name(&self) -> &str;
    fn is_connected(&self, id: HandlerId) -> bool;
    /// 解除できたら true。既に外れていれば false
    fn disconnect(&self, id: HandlerId) -> bool;
}

pub struct Signal<E> {
    name: &'static str,
    next_id: AtomicU64,
    slots: Mutex<Vec<Slot<E>>>,
}

impl<E> Signal<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: AtomicU64::new(1),
            slots: Mutex::new(Vec::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Vec<Slot<E>>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn insert<F>(&self, handler: F, after: bool) -> HandlerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.slots().push(Slot {
            id,
            after,
            handler: Arc::new(handler),
        });
        id
    }

    pub fn connect<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.insert(handler, false)
    }

    /// 通常のハンドラが全て呼ばれた後に呼ばれるハンドラを登録する
    pub fn connect_after<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.insert(handler, true)
    }

    /// 登録済みハンドラを発行スレッド上で同期的に呼ぶ。
    /// ハンドラは長時間ブロックし得るので、ロックは呼び出し前に手放す。
    pub fn emit(&self, event: &E) {
        let handlers: Vec<Handler<E>> = {
            let slots = self.slots();
            let normal = slots.iter().filter(|s| !s.after);
            let after = slots.iter().filter(|s| s.after);
            normal.chain(after).map(|s| Arc::clone(&s.handler)).collect()
        };
        for handler in handlers {
            handler(event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.slots().len()
    }

    /// 発行元が破棄された時と同じく、全ハンドラを外す
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.slots());
        debug!("signal {}: dropped {} handlers", self.name, removed.len());
    }
}

impl<E> SignalSlot for Signal<E> {
    fn name(&self) -> &str {
        self.name
    }

    fn is_connected(&self, id: HandlerId) -> bool {
        self.slots().iter().any(|s| s.id == id)
    }

    fn disconnect(&self, id: HandlerId) -> bool {
        let mut slots = self.slots();
        let before = slots.len();
        slots.retain(|s| s.id != id);
        slots.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_handlers_run_last() {
        let signal: Signal<u32> = Signal::new("test");
        let order = Arc::new(Mutex::new(Vec::new()));

        let o = Arc::clone(&order);
        signal.connect_after(move |v| o.lock().unwrap().push(("after", *v)));
        let o = Arc::clone(&order);
        signal.connect(move |v| o.lock().unwrap().push(("normal", *v)));

        signal.emit(&3);
        assert_eq!(*order.lock().unwrap(), vec![("normal", 3), ("after", 3)]);
    }

    #[test]
    fn disconnect_reports_whether_handler_was_present() {
        let signal: Signal<()> = Signal::new("test");
        let id = signal.connect(|_| {});
        assert!(signal.is_connected(id));
        assert!(signal.disconnect(id));
        assert!(!signal.is_connected(id));
        assert!(!signal.disconnect(id));
    }

    #[test]
    fn handler_may_disconnect_itself_during_emit() {
        let signal: Arc<Signal<()>> = Arc::new(Signal::new("test"));
        let id_cell = Arc::new(Mutex::new(0));
        let s = Arc::clone(&signal);
        let cell = Arc::clone(&id_cell);
        let id = signal.connect(move |_| {
            let id = *cell.lock().unwrap();
            s.disconnect(id);
        });
        *id_cell.lock().unwrap() = id;

        signal.emit(&());
        assert_eq!(signal.handler_count(), 0);
    }
}
