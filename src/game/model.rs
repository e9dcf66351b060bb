use crate::core::{Board, Color, GameStatus, Move, Variant};
use crate::game::timer::TimeModel;
use crate::logic::apply_move;
use crate::network::protocol::Offer;
use std::sync::{Mutex, MutexGuard};

/// サーバー側の対局情報
#[derive(Debug, Clone)]
pub struct GameInfo {
    pub game_no: u32,
    pub game_type: String,
    pub rated: bool,
    pub variant: Variant,
}

struct ModelState {
    status: GameStatus,
    /// 白・黒のハンドル
    players: Vec<String>,
    boards: Vec<Board>,
    moves: Vec<Move>,
    offers: Vec<Offer>,
    time: Option<TimeModel>,
}

/// 対局全体の共有状態。ターンループとイベントスレッドの両方から参照される
pub struct GameModel {
    info: GameInfo,
    observation: bool,
    state: Mutex<ModelState>,
}

impl GameModel {
    pub fn new(info: GameInfo, start: Board, time: Option<TimeModel>, observation: bool) -> Self {
        let mut start = start;
        start.variant = info.variant;
        // 時計の手数は盤面の手数に揃える
        let mut time = time;
        if let Some(time) = time.as_mut() {
            time.ply = start.ply;
        }
        Self {
            info,
            observation,
            state: Mutex::new(ModelState {
                status: GameStatus::Waiting,
                players: Vec::new(),
                boards: vec![start],
                moves: Vec::new(),
                offers: Vec::new(),
                time,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ModelState> {
        // 保持中に panic しても盤面履歴自体は壊れないので中身を使い続ける
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn info(&self) -> &GameInfo {
        &self.info
    }

    pub fn game_no(&self) -> u32 {
        self.info.game_no
    }

    pub fn is_observation(&self) -> bool {
        self.observation
    }

    pub fn set_player_handles(&self, white: &str, black: &str) {
        self.state().players = vec![white.to_string(), black.to_string()];
    }

    pub fn player_handles(&self) -> Vec<String> {
        self.state().players.clone()
    }

    pub fn status(&self) -> GameStatus {
        self.state().status
    }

    pub fn set_status(&self, status: GameStatus) {
        let mut state = self.state();
        state.status = status;
        if let Some(time) = state.time.as_mut() {
            time.set_paused(status != GameStatus::Running);
        }
    }

    /// 現局面の手数
    pub fn ply(&self) -> u32 {
        let state = self.state();
        state.boards.last().map(|b| b.ply).unwrap_or(0)
    }

    pub fn board(&self) -> Board {
        let state = self.state();
        state.boards.last().cloned().unwrap_or_default()
    }

    pub fn side_to_move(&self) -> Color {
        let state = self.state();
        state
            .boards
            .last()
            .map(|b| b.side_to_move)
            .unwrap_or_default()
    }

    /// 指定手数の局面 (履歴に無ければ None)
    pub fn board_at_ply(&self, ply: u32) -> Option<Board> {
        let state = self.state();
        let first = state.boards.first()?.ply;
        let idx = ply.checked_sub(first)? as usize;
        state.boards.get(idx).cloned()
    }

    /// 直前の指し手とその指す前の局面
    pub fn last_move(&self) -> Option<(Board, Move)> {
        let state = self.state();
        let mv = state.moves.last()?.clone();
        let before = state.boards.get(state.boards.len().checked_sub(2)?)?.clone();
        Some((before, mv))
    }

    pub fn moves(&self) -> Vec<Move> {
        self.state().moves.clone()
    }

    /// 指し手を適用して新しい局面を返す
    pub fn push_move(&self, mv: &Move) -> Board {
        let mut state = self.state();
        let current = state.boards.last().cloned().unwrap_or_default();
        let next = apply_move(&current, mv);
        state.boards.push(next.clone());
        state.moves.push(mv.clone());
        if let Some(time) = state.time.as_mut() {
            time.tap();
            if time.is_paused() {
                time.ply = next.ply;
            }
        }
        next
    }

    /// `count` 手戻す。実際に戻した手数を返す
    pub fn undo_moves(&self, count: usize) -> usize {
        let mut state = self.state();
        let undone = count.min(state.moves.len());
        let keep = state.boards.len() - undone;
        state.boards.truncate(keep);
        let keep = state.moves.len() - undone;
        state.moves.truncate(keep);
        let ply = state.boards.last().map(|b| b.ply).unwrap_or(0);
        if let Some(time) = state.time.as_mut() {
            time.rewind(ply);
        }
        undone
    }

    pub fn offers(&self) -> Vec<Offer> {
        self.state().offers.clone()
    }

    pub fn add_offer(&self, offer: Offer) {
        self.state().offers.push(offer);
    }

    pub fn remove_offer(&self, offer: &Offer) {
        self.state().offers.retain(|o| o != offer);
    }

    pub fn is_timed(&self) -> bool {
        self.state().time.is_some()
    }

    /// 持ち時間があれば操作する
    pub fn with_time<R>(&self, f: impl FnOnce(&mut TimeModel) -> R) -> Option<R> {
        self.state().time.as_mut().map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_san;
    use crate::network::protocol::OfferKind;

    fn model() -> GameModel {
        let info = GameInfo {
            game_no: 7,
            game_type: "blitz".to_string(),
            rated: true,
            variant: Variant::Normal,
        };
        GameModel::new(info, Board::standard(), Some(TimeModel::new(300.0, 3.0)), false)
    }

    #[test]
    fn history_tracks_boards_by_ply() {
        let model = model();
        let mv = parse_san(&model.board(), "e4").unwrap();
        model.push_move(&mv);
        let mv = parse_san(&model.board(), "e5").unwrap();
        model.push_move(&mv);

        assert_eq!(model.ply(), 2);
        assert_eq!(model.side_to_move(), Color::White);
        assert_eq!(model.board_at_ply(0).unwrap().ply, 0);
        assert_eq!(model.board_at_ply(1).unwrap().side_to_move, Color::Black);
        assert!(model.board_at_ply(3).is_none());

        let (before, last) = model.last_move().unwrap();
        assert_eq!(before.ply, 1);
        assert_eq!(last, mv);
    }

    #[test]
    fn undo_truncates_history() {
        let model = model();
        for san in ["d4", "d5", "c4"] {
            let mv = parse_san(&model.board(), san).unwrap();
            model.push_move(&mv);
        }
        assert_eq!(model.undo_moves(1), 1);
        assert_eq!(model.ply(), 2);
        assert_eq!(model.undo_moves(10), 2);
        assert_eq!(model.ply(), 0);
        assert!(model.last_move().is_none());
    }

    #[test]
    fn undo_keeps_the_clock_in_step_with_the_board() {
        let model = model();
        model.set_status(GameStatus::Running);
        for san in ["e4", "e5"] {
            let mv = parse_san(&model.board(), san).unwrap();
            model.push_move(&mv);
        }
        assert_eq!(model.with_time(|t| t.ply), Some(2));

        model.undo_moves(1);
        assert_eq!(model.side_to_move(), Color::Black);
        assert_eq!(model.with_time(|t| t.ply), Some(model.ply()));
    }

    #[test]
    fn clock_starts_at_the_board_ply() {
        let info = GameInfo {
            game_no: 8,
            game_type: "blitz".to_string(),
            rated: false,
            variant: Variant::Normal,
        };
        let start =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        let model = GameModel::new(info, start, Some(TimeModel::new(60.0, 0.0)), false);
        assert_eq!(model.with_time(|t| t.ply), Some(1));
    }

    #[test]
    fn running_status_starts_the_clock() {
        let model = model();
        assert_eq!(model.with_time(|t| t.is_paused()), Some(true));
        model.set_status(GameStatus::Running);
        assert_eq!(model.with_time(|t| t.is_paused()), Some(false));
        model.set_status(GameStatus::Draw);
        assert_eq!(model.with_time(|t| t.is_paused()), Some(true));
    }

    #[test]
    fn game_level_offers() {
        let model = model();
        let offer = Offer::with_param(
            OfferKind::Takeback,
            crate::network::protocol::OfferParam::Plies(2),
        );
        model.add_offer(offer.clone());
        assert_eq!(model.offers(), vec![offer.clone()]);
        model.remove_offer(&offer);
        assert!(model.offers().is_empty());
    }
}
