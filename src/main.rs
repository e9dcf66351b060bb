use log::{debug, info, warn};
use rand::seq::SliceRandom;
use remote_seat::config::Config;
use remote_seat::core::{parse_an, to_san, Board, Color, Variant};
use remote_seat::game::{Game, GameInfo, GameModel, TimeModel};
use remote_seat::logging::init_logging;
use remote_seat::logic::{apply_move, legal_moves};
use remote_seat::network::{BoardUpdate, ChannelOutbound, Connection, OutboundAction, Signal};
use remote_seat::player::{RandomAI, RemotePlayer, Seat};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;

/// サーバー役。こちらの手を受け取ると盤面更新を流し、ランダムに応手する
struct SimulatedServer {
    board_update: Arc<Signal<BoardUpdate>>,
    board: Board,
    game_no: u32,
    white: String,
    black: String,
    clock_ms: i64,
}

impl SimulatedServer {
    fn run(mut self, actions: Receiver<OutboundAction>) {
        for action in actions {
            match action {
                OutboundAction::SendMove(notation) => {
                    if let Err(e) = self.on_move(&notation) {
                        warn!("server: rejecting {}: {}", notation, e);
                        break;
                    }
                }
                other => info!("server: received {:?}", other),
            }
        }
        debug!("server: connection closed");
    }

    fn on_move(&mut self, notation: &str) -> anyhow::Result<()> {
        let mv = parse_an(&self.board, notation)?;
        let san = to_san(&self.board, &mv);
        self.board = apply_move(&self.board, &mv);
        self.publish(san);

        let replies = legal_moves(&self.board);
        let Some(reply) = replies.choose(&mut rand::thread_rng()) else {
            return Ok(());
        };
        let san = to_san(&self.board, reply);
        self.board = apply_move(&self.board, reply);
        // 相手がこの手を受け取るまで戻らない
        self.publish(san);
        Ok(())
    }

    fn publish(&self, last_move: String) {
        let update = BoardUpdate {
            game_no: self.game_no,
            ply: self.board.ply,
            side_to_move: self.board.side_to_move,
            last_move,
            fen: self.board.to_fen(),
            white: self.white.clone(),
            black: self.black.clone(),
            white_ms: self.clock_ms,
            black_ms: self.clock_ms,
        };
        self.board_update.emit(&update);
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let config = Config::load_or_default();
    let demo = &config.demo;

    let info = GameInfo {
        game_no: demo.game_no,
        game_type: "blitz".to_string(),
        rated: false,
        variant: Variant::Normal,
    };
    let time = (demo.minutes > 0)
        .then(|| TimeModel::new(f64::from(demo.minutes) * 60.0, f64::from(demo.increment)));
    let model = Arc::new(GameModel::new(info, Board::standard(), time, false));
    model.set_player_handles(&demo.local_handle, &demo.remote_handle);

    let (outbound, actions) = ChannelOutbound::new();
    let connection = Arc::new(Connection::new(Arc::new(outbound)));

    let server = SimulatedServer {
        board_update: Arc::clone(&connection.bm.board_update),
        board: Board::standard(),
        game_no: demo.game_no,
        white: demo.local_handle.clone(),
        black: demo.remote_handle.clone(),
        clock_ms: i64::from(demo.minutes) * 60_000,
    };
    let server = thread::spawn(move || server.run(actions));

    let remote = RemotePlayer::new(
        Arc::clone(&model),
        Arc::clone(&connection),
        Seat {
            handle: demo.remote_handle.clone(),
            name: format!("{} (remote)", demo.remote_handle),
            rating: demo.remote_rating,
            color: Color::Black,
        },
        &config.session,
    );
    let local = RandomAI::new(&demo.local_handle);

    let game = Game::new(Arc::clone(&model));
    let result = game.play(&local, remote.as_ref(), demo.max_plies);

    if result.is_ok() {
        if let Err(e) = remote.offer_rematch() {
            warn!("rematch: {}", e);
        }
    }
    let record = game.record(&demo.local_handle, &demo.remote_handle);

    // 送信側を全て落とすとサーバー役のループが終わる
    drop(remote);
    drop(connection);
    if server.join().is_err() {
        warn!("server thread panicked");
    }

    let status = result?;
    println!(
        "game {} finished after {} plies: {:?}",
        demo.game_no,
        model.ply(),
        status
    );
    println!("{}", record.moves.join(" "));

    if let Some(dir) = &demo.record_dir {
        let path = record.save(dir)?;
        info!("record saved to {}", path.display());
    }
    Ok(())
}
