use crate::core::GameStatus;
use crate::network::protocol::{Offer, OfferKind};
use crate::player::PlayerEvent;
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// 相手側から出されていて、まだ取り下げられていない申し入れ
pub struct OfferTracker {
    offers: Mutex<HashMap<u32, Offer>>,
}

impl OfferTracker {
    pub fn new() -> Self {
        Self {
            offers: Mutex::new(HashMap::new()),
        }
    }

    fn offers(&self) -> MutexGuard<'_, HashMap<u32, Offer>> {
        self.offers.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn on_add(&self, offer: &Offer, status: GameStatus, observing: bool) -> Option<PlayerEvent> {
        if !status.is_unfinished() || observing {
            return None;
        }
        match offer.index {
            Some(index) => {
                self.offers().insert(index, offer.clone());
            }
            None => debug!("offer without index is not tracked: {}", offer),
        }
        Some(PlayerEvent::Offer(offer.clone()))
    }

    pub fn on_remove(&self, offer: &Offer) -> Option<PlayerEvent> {
        let index = offer.index?;
        self.offers().remove(&index).map(PlayerEvent::Withdraw)
    }

    /// 断りの通知には元のパラメータが欠けていることがあるので、
    /// こちらが出している同種の申し入れから補う
    pub fn on_decline(&self, offer: &Offer, game_offers: &[Offer]) -> PlayerEvent {
        let mut offer = offer.clone();
        for own in game_offers.iter().filter(|o| o.kind == offer.kind) {
            offer.param = own.param.clone();
        }
        if let Some(index) = offer.index {
            self.offers().remove(&index);
        }
        PlayerEvent::Decline(offer)
    }

    /// 送信前の整理。待ったは同時に1件しか出せないので手元の待ったを捨てる
    pub fn prepare_submit(&self, offer: &Offer) -> usize {
        if offer.kind != OfferKind::Takeback {
            return 0;
        }
        let mut offers = self.offers();
        let stale: Vec<u32> = offers
            .iter()
            .filter(|(_, o)| o.kind == OfferKind::Takeback)
            .map(|(index, _)| *index)
            .collect();
        for index in &stale {
            debug!("dropping takeback #{} before sending {}", index, offer);
            offers.remove(index);
        }
        stale.len()
    }

    pub fn get(&self, index: u32) -> Option<Offer> {
        self.offers().get(&index).cloned()
    }

    pub fn len(&self) -> usize {
        self.offers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_of(&self, kind: OfferKind) -> usize {
        self.offers().values().filter(|o| o.kind == kind).count()
    }
}

impl Default for OfferTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::protocol::OfferParam;

    #[test]
    fn add_is_ignored_when_finished_or_observing() {
        let tracker = OfferTracker::new();
        let draw = Offer::new(OfferKind::Draw).indexed(4);

        assert!(tracker.on_add(&draw, GameStatus::Draw, false).is_none());
        assert!(tracker.on_add(&draw, GameStatus::Running, true).is_none());
        assert!(tracker.is_empty());

        assert_eq!(
            tracker.on_add(&draw, GameStatus::Running, false),
            Some(PlayerEvent::Offer(draw.clone()))
        );
        assert_eq!(tracker.get(4), Some(draw));
    }

    #[test]
    fn remove_emits_stored_copy_and_ignores_unknown_indices() {
        let tracker = OfferTracker::new();
        let takeback = Offer::with_param(OfferKind::Takeback, OfferParam::Plies(2)).indexed(9);
        tracker.on_add(&takeback, GameStatus::Running, false);

        // 削除通知はパラメータを持たない
        let removal = Offer::new(OfferKind::Takeback).indexed(9);
        assert_eq!(
            tracker.on_remove(&removal),
            Some(PlayerEvent::Withdraw(takeback))
        );
        assert!(tracker.on_remove(&removal).is_none());
        assert!(tracker.on_remove(&Offer::new(OfferKind::Draw)).is_none());
    }

    #[test]
    fn decline_copies_param_from_game_offer() {
        let tracker = OfferTracker::new();
        let ours = Offer::with_param(OfferKind::Takeback, OfferParam::Plies(1));
        let declined = Offer::new(OfferKind::Takeback).indexed(12);

        let event = tracker.on_decline(&declined, &[Offer::new(OfferKind::Draw), ours]);
        assert_eq!(
            event,
            PlayerEvent::Decline(
                Offer::with_param(OfferKind::Takeback, OfferParam::Plies(1)).indexed(12)
            )
        );
    }

    #[test]
    fn takeback_submit_leaves_no_stale_takebacks() {
        let tracker = OfferTracker::new();
        for index in [1, 2] {
            let offer = Offer::with_param(OfferKind::Takeback, OfferParam::Plies(index)).indexed(index);
            tracker.on_add(&offer, GameStatus::Running, false);
        }
        tracker.on_add(&Offer::new(OfferKind::Draw).indexed(3), GameStatus::Running, false);

        assert_eq!(tracker.prepare_submit(&Offer::new(OfferKind::Draw)), 0);
        assert_eq!(tracker.prepare_submit(&Offer::new(OfferKind::Takeback)), 2);
        assert_eq!(tracker.count_of(OfferKind::Takeback), 0);
        assert_eq!(tracker.count_of(OfferKind::Draw), 1);
    }
}
