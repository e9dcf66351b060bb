pub mod model;
pub mod timer;

pub use model::{GameInfo, GameModel};
pub use timer::TimeModel;

use crate::core::{to_san, Color, GameStatus};
use crate::logic::{legal_moves, terminal_status};
use crate::player::{PlayerController, PlayerError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 保存用の棋譜
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_no: u32,
    pub white: String,
    pub black: String,
    pub start_fen: String,
    pub moves: Vec<String>,
    pub result: GameStatus,
}

impl GameRecord {
    /// `dir` に `game_0007_20240101_120000.json` の形で書き出す
    pub fn save(&self, dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let filename = dir.join(format!(
            "game_{:04}_{}.json",
            self.game_no,
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));

        let file = std::fs::File::create(&filename)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(filename)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let record = serde_json::from_reader(reader)?;
        Ok(record)
    }
}

/// ターンループ。2人のプレイヤーに交互に手を求め、共有モデルに適用する
pub struct Game {
    model: Arc<GameModel>,
}

impl Game {
    pub fn new(model: Arc<GameModel>) -> Self {
        Game { model }
    }

    pub fn model(&self) -> &Arc<GameModel> {
        &self.model
    }

    /// 終局するか `max_plies` 手指すまで進める
    pub fn play(
        &self,
        white: &dyn PlayerController,
        black: &dyn PlayerController,
        max_plies: u32,
    ) -> anyhow::Result<GameStatus> {
        let start_ply = self.model.ply();
        self.model.set_status(GameStatus::Running);
        info!(
            "game {}: {} vs {} started",
            self.model.game_no(),
            white.name(),
            black.name()
        );

        let (status, reason) = loop {
            let board = self.model.board();
            if let Some(status) = terminal_status(&board) {
                break (status, "no legal moves");
            }
            if board.ply.saturating_sub(start_ply) >= max_plies {
                break (GameStatus::Adjourned, "ply limit reached");
            }

            let controller = match board.side_to_move {
                Color::White => white,
                Color::Black => black,
            };

            let last = self.model.last_move();
            let last_move = last.as_ref().map(|(before, mv)| (before, mv));

            match controller.request_move(&board, last_move) {
                Ok(mv) => {
                    if !legal_moves(&board).contains(&mv) {
                        warn!("{} played illegal move {}", controller.name(), mv);
                        self.kill_both(white, black, "illegal move");
                        anyhow::bail!("{} played illegal move {}", controller.name(), mv);
                    }
                    info!(
                        "ply {}: {} {}",
                        board.ply + 1,
                        controller.name(),
                        to_san(&board, &mv)
                    );
                    self.model.push_move(&mv);
                }
                Err(PlayerError::Interrupted) => {
                    debug!("{} interrupted, asking again", controller.name());
                    continue;
                }
                Err(PlayerError::Terminated) => {
                    // 外から決着が付けられていればそれを使う
                    let current = self.model.status();
                    let status = if current.is_decided() {
                        current
                    } else {
                        GameStatus::Aborted
                    };
                    break (status, "player terminated");
                }
                Err(e) => {
                    warn!("{}: {}", controller.name(), e);
                    self.kill_both(white, black, "player error");
                    return Err(e.into());
                }
            }
        };

        self.model.set_status(status);
        info!("game {}: {:?} ({})", self.model.game_no(), status, reason);
        white.end(status, reason);
        black.end(status, reason);
        Ok(status)
    }

    fn kill_both(&self, white: &dyn PlayerController, black: &dyn PlayerController, reason: &str) {
        self.model.set_status(GameStatus::Killed);
        white.kill(reason);
        black.kill(reason);
    }

    /// `count` 手戻して両プレイヤーに知らせる
    pub fn undo(
        &self,
        count: usize,
        white: &dyn PlayerController,
        black: &dyn PlayerController,
    ) -> usize {
        let undone = self.model.undo_moves(count);
        if undone > 0 {
            white.notify_undo(undone, &self.model);
            black.notify_undo(undone, &self.model);
        }
        undone
    }

    pub fn record(&self, white: &str, black: &str) -> GameRecord {
        let moves = self.model.moves();
        let first = self.model.ply() - moves.len() as u32;
        let start_fen = self
            .model
            .board_at_ply(first)
            .map(|b| b.to_fen())
            .unwrap_or_default();
        let san = moves
            .iter()
            .enumerate()
            .filter_map(|(i, mv)| {
                let board = self.model.board_at_ply(first + i as u32)?;
                Some(to_san(&board, mv))
            })
            .collect();

        GameRecord {
            game_no: self.model.game_no(),
            white: white.to_string(),
            black: black.to_string(),
            start_fen,
            moves: san,
            result: self.model.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_san, Board, Move, Variant};
    use crate::player::RandomAI;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 決められた応答を順に返すプレイヤー
    struct Scripted {
        name: String,
        replies: Mutex<VecDeque<Result<&'static str, PlayerError>>>,
        ended: Mutex<Option<GameStatus>>,
        killed: Mutex<bool>,
    }

    impl Scripted {
        fn new(name: &str, replies: Vec<Result<&'static str, PlayerError>>) -> Self {
            Scripted {
                name: name.to_string(),
                replies: Mutex::new(replies.into()),
                ended: Mutex::new(None),
                killed: Mutex::new(false),
            }
        }
    }

    impl PlayerController for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_local(&self) -> bool {
            true
        }

        fn request_move(
            &self,
            board: &Board,
            _last_move: Option<(&Board, &Move)>,
        ) -> Result<Move, PlayerError> {
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(PlayerError::Terminated));
            Ok(parse_san(board, reply?)?)
        }

        fn end(&self, status: GameStatus, _reason: &str) {
            *self.ended.lock().unwrap() = Some(status);
        }

        fn kill(&self, _reason: &str) {
            *self.killed.lock().unwrap() = true;
        }
    }

    fn model() -> Arc<GameModel> {
        let info = GameInfo {
            game_no: 3,
            game_type: "standard".to_string(),
            rated: false,
            variant: Variant::Normal,
        };
        Arc::new(GameModel::new(info, Board::standard(), None, false))
    }

    #[test]
    fn checkmate_ends_the_game() {
        let game = Game::new(model());
        let white = Scripted::new("white", vec![Ok("f3"), Ok("g4")]);
        let black = Scripted::new("black", vec![Ok("e5"), Err(PlayerError::Interrupted), Ok("Qh4")]);

        let status = game.play(&white, &black, 100).unwrap();
        assert_eq!(status, GameStatus::BlackWon);
        assert_eq!(*white.ended.lock().unwrap(), Some(GameStatus::BlackWon));
        assert_eq!(*black.ended.lock().unwrap(), Some(GameStatus::BlackWon));

        let record = game.record("white", "black");
        assert_eq!(record.moves, vec!["f3", "e5", "g4", "Qh4#"]);
        assert_eq!(record.result, GameStatus::BlackWon);
    }

    #[test]
    fn terminated_player_aborts() {
        let game = Game::new(model());
        let white = Scripted::new("white", vec![Ok("e4")]);
        let black = Scripted::new("black", vec![Err(PlayerError::Terminated)]);
        assert_eq!(game.play(&white, &black, 100).unwrap(), GameStatus::Aborted);
        assert_eq!(game.model().status(), GameStatus::Aborted);
    }

    #[test]
    fn unparseable_move_kills_both_players() {
        let game = Game::new(model());
        let white = Scripted::new("white", vec![Ok("Ke2")]);
        let black = Scripted::new("black", vec![]);
        assert!(game.play(&white, &black, 100).is_err());
        assert!(*white.killed.lock().unwrap());
        assert!(*black.killed.lock().unwrap());
        assert_eq!(game.model().status(), GameStatus::Killed);
    }

    #[test]
    fn random_players_stop_at_ply_limit() {
        let game = Game::new(model());
        let white = RandomAI::new("white");
        let black = RandomAI::new("black");
        let status = game.play(&white, &black, 10).unwrap();
        assert!(game.model().ply() <= 10);
        if game.model().ply() == 10 {
            assert_eq!(status, GameStatus::Adjourned);
        }
    }

    #[test]
    fn undo_rewinds_the_model() {
        let game = Game::new(model());
        let white = Scripted::new("white", vec![Ok("e4")]);
        let black = Scripted::new("black", vec![Ok("e5")]);
        game.play(&white, &black, 2).unwrap();

        assert_eq!(game.undo(1, &white, &black), 1);
        assert_eq!(game.model().ply(), 1);
        assert_eq!(game.undo(5, &white, &black), 1);
        assert_eq!(game.undo(1, &white, &black), 0);
    }

    #[test]
    fn record_round_trips_through_a_file() {
        let game = Game::new(model());
        let white = Scripted::new("white", vec![Ok("d4")]);
        let black = Scripted::new("black", vec![Ok("Nf6")]);
        game.play(&white, &black, 2).unwrap();

        let dir = std::env::temp_dir().join(format!("remote_seat_record_{}", std::process::id()));
        let record = game.record("white", "black");
        let path = record.save(&dir).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("game_0003_"));
        assert_eq!(GameRecord::load(&path).unwrap(), record);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
