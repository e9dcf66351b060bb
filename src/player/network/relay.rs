use crate::player::PlayerError;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// イベントスレッドからターンループへ渡す1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveEnvelope {
    RealMove { ply: u32, notation: String },
    Interrupt,
    Terminate,
}

/// `deliver` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// ターンループが受け取り、ack を返した
    Acknowledged,
    /// 既に渡した手数以下なので捨てた
    Stale,
    /// 終了済みなので渡さなかった
    Closed,
    /// 設定時間内に受け取られなかったので取り消した
    TimedOut,
}

/// チャネルに入れたがまだ受け取られていない手
struct Pending {
    ply: u32,
    /// 取り消した時に戻す値
    prev_last_ply: Option<u32>,
}

struct Producer {
    tx: Sender<MoveEnvelope>,
    closed: bool,
    last_ply: Option<u32>,
    pending: Option<Pending>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// move / ack の2本のチャネルでイベントスレッドとターンループを同期させる。
/// 受け渡し中の手は常に高々1つ。ack には手数が付いている。
pub struct MoveRelay {
    producer: Mutex<Producer>,
    move_rx: Mutex<Receiver<MoveEnvelope>>,
    ack_tx: Mutex<Sender<u32>>,
    ack_rx: Mutex<Receiver<u32>>,
    ack_timeout: Option<Duration>,
    terminated: AtomicBool,
}

impl MoveRelay {
    pub fn new(ack_timeout: Option<Duration>) -> Self {
        let (move_tx, move_rx) = mpsc::channel();
        let (ack_tx, ack_rx) = mpsc::channel();
        Self {
            producer: Mutex::new(Producer {
                tx: move_tx,
                closed: false,
                last_ply: None,
                pending: None,
            }),
            move_rx: Mutex::new(move_rx),
            ack_tx: Mutex::new(ack_tx),
            ack_rx: Mutex::new(ack_rx),
            ack_timeout,
            terminated: AtomicBool::new(false),
        }
    }

    /// イベントスレッド側。手を渡し、ターンループが使い終わるまでブロックする
    pub fn deliver(&self, ply: u32, notation: &str) -> Delivery {
        {
            let mut producer = lock(&self.producer);
            if producer.closed {
                debug!("relay closed, not delivering ply {} {}", ply, notation);
                return Delivery::Closed;
            }
            if producer.last_ply.is_some_and(|last| ply <= last) {
                return Delivery::Stale;
            }

            let envelope = MoveEnvelope::RealMove {
                ply,
                notation: notation.to_string(),
            };
            if producer.tx.send(envelope).is_err() {
                return Delivery::Closed;
            }
            // 取り消された手がチャネルに残っていても take 側で捨てられる
            producer.pending = Some(Pending {
                ply,
                prev_last_ply: producer.last_ply,
            });
            producer.last_ply = Some(ply);
        }

        // producer のロックは手放してから待つ (kill 側がブロックしないように)
        self.wait_ack(ply)
    }

    fn wait_ack(&self, ply: u32) -> Delivery {
        let ack_rx = lock(&self.ack_rx);
        let mut deadline = self.ack_timeout.map(|timeout| Instant::now() + timeout);
        loop {
            let received = match deadline {
                None => ack_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                Some(at) => ack_rx.recv_timeout(at.saturating_duration_since(Instant::now())),
            };
            match received {
                Ok(acked) if acked == ply => return Delivery::Acknowledged,
                Ok(acked) => debug!("ignoring ack for ply {} while waiting for {}", acked, ply),
                Err(RecvTimeoutError::Disconnected) => return Delivery::Closed,
                Err(RecvTimeoutError::Timeout) => {
                    if self.cancel(ply) {
                        warn!("ply {} not taken within {:?}, withdrawn", ply, self.ack_timeout);
                        return Delivery::TimedOut;
                    }
                    // 既に受け取られているので ack は必ず来る
                    debug!("ply {} taken just before the deadline, waiting for ack", ply);
                    deadline = None;
                }
            }
        }
    }

    /// まだ受け取られていなければ取り消す
    fn cancel(&self, ply: u32) -> bool {
        let mut producer = lock(&self.producer);
        match producer.pending.take() {
            Some(pending) if pending.ply == ply => {
                if producer.last_ply == Some(ply) {
                    producer.last_ply = pending.prev_last_ply;
                }
                true
            }
            other => {
                producer.pending = other;
                false
            }
        }
    }

    /// 受け取った手が取り消されていないか確かめ、受け取り済みにする
    fn claim(&self, ply: u32) -> bool {
        let mut producer = lock(&self.producer);
        if producer.pending.as_ref().is_some_and(|p| p.ply == ply) {
            producer.pending = None;
            true
        } else {
            false
        }
    }

    /// 待機中の `take` に手番の放棄を伝える
    pub fn interrupt(&self) {
        let producer = lock(&self.producer);
        if producer.closed {
            return;
        }
        if producer.tx.send(MoveEnvelope::Interrupt).is_err() {
            debug!("move channel gone, interrupt dropped");
        }
    }

    /// 以後の受け渡しを止め、待機中の `take` を起こす
    pub fn terminate(&self) {
        let mut producer = lock(&self.producer);
        producer.closed = true;
        if producer.tx.send(MoveEnvelope::Terminate).is_err() {
            debug!("move channel gone, terminate dropped");
        }
    }

    /// 手戻し後、その手数より先の手を再び受け付ける
    pub fn rewind(&self, ply: u32) {
        let mut producer = lock(&self.producer);
        producer.last_ply = producer.last_ply.map(|last| last.min(ply));
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.producer).closed
    }

    /// ターンループ側。手・中断・終了のどれかが来るまでブロックする
    pub fn take(&self) -> Result<PendingMove<'_>, PlayerError> {
        if self.terminated.load(Ordering::SeqCst) {
            return Err(PlayerError::Terminated);
        }
        let move_rx = lock(&self.move_rx);
        loop {
            match move_rx.recv() {
                Ok(MoveEnvelope::RealMove { ply, notation }) => {
                    if !self.claim(ply) {
                        debug!("discarding withdrawn ply {} {}", ply, notation);
                        continue;
                    }
                    return Ok(PendingMove {
                        relay: self,
                        ply,
                        notation,
                    });
                }
                Ok(MoveEnvelope::Interrupt) => return Err(PlayerError::Interrupted),
                Ok(MoveEnvelope::Terminate) | Err(_) => {
                    self.terminated.store(true, Ordering::SeqCst);
                    return Err(PlayerError::Terminated);
                }
            }
        }
    }

    fn acknowledge(&self, ply: u32) {
        if lock(&self.ack_tx).send(ply).is_err() {
            debug!("ack channel gone, ack for ply {} dropped", ply);
        }
    }
}

/// 受け取った手。drop 時に必ず ack を返す
#[derive(Debug)]
pub struct PendingMove<'a> {
    relay: &'a MoveRelay,
    pub ply: u32,
    pub notation: String,
}

impl Drop for PendingMove<'_> {
    fn drop(&mut self) {
        self.relay.acknowledge(self.ply);
    }
}

impl std::fmt::Debug for MoveRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveRelay")
            .field("ack_timeout", &self.ack_timeout)
            .field("terminated", &self.terminated.load(Ordering::SeqCst))
            .finish()
    }
}
