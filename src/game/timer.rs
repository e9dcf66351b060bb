use crate::core::Color;
use std::time::{Duration, Instant};

/// 持ち時間管理
#[derive(Debug, Clone)]
pub struct TimeModel {
    /// 色ごとの残り時間 (秒)
    intervals: [f64; 2],
    initial_secs: f64,
    /// 1手ごとの加算 (秒)
    pub gain: f64,
    /// 計測済みの手数
    pub ply: u32,
    paused: bool,
    counter: Option<Instant>,
}

impl TimeModel {
    pub fn new(initial_secs: f64, gain: f64) -> Self {
        Self {
            intervals: [initial_secs, initial_secs],
            initial_secs,
            gain,
            ply: 0,
            paused: true,
            counter: None,
        }
    }

    pub fn initial_minutes(&self) -> u32 {
        (self.initial_secs / 60.0) as u32
    }

    pub fn remaining(&self, color: Color) -> f64 {
        self.intervals[color.index()]
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn moving_color(&self) -> Color {
        Color::from_ply(self.ply)
    }

    fn accrue(&mut self) {
        if let Some(started) = self.counter.take() {
            let idx = self.moving_color().index();
            self.intervals[idx] -= started.elapsed().as_secs_f64();
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        if paused {
            self.accrue();
        } else {
            self.counter = Some(Instant::now());
        }
        self.paused = paused;
    }

    /// 手番交代: 経過時間を差し引き、加算時間を足して次の手番の計測を始める
    pub fn tap(&mut self) {
        if self.paused {
            return;
        }
        self.accrue();
        let idx = self.moving_color().index();
        self.intervals[idx] += self.gain;
        self.ply += 1;
        self.counter = Some(Instant::now());
    }

    /// サーバーから届いた残り時間で上書きする
    pub fn update_player(&mut self, color: Color, secs: f64) {
        self.intervals[color.index()] = secs;
        if !self.paused && self.moving_color() == color {
            self.counter = Some(Instant::now());
        }
    }

    /// 手戻し後の手数に合わせる。計測中なら戻した後の手番で測り直す
    pub fn rewind(&mut self, ply: u32) {
        if ply >= self.ply {
            return;
        }
        if !self.paused {
            self.accrue();
            self.counter = Some(Instant::now());
        }
        self.ply = ply;
    }

    pub fn elapsed_on_move(&self) -> Duration {
        self.counter.map(|c| c.elapsed()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_is_ignored_while_paused() {
        let mut tm = TimeModel::new(180.0, 2.0);
        tm.tap();
        assert_eq!(tm.ply, 0);
        assert_eq!(tm.remaining(Color::White), 180.0);
    }

    #[test]
    fn tap_adds_increment_and_advances_ply() {
        let mut tm = TimeModel::new(180.0, 2.0);
        tm.set_paused(false);
        tm.tap();
        tm.set_paused(true);
        assert_eq!(tm.ply, 1);
        // 経過はごく僅かなので加算分だけ増えている
        assert!(tm.remaining(Color::White) > 181.5);
        // 再停止までの僅かな時間は黒から引かれる
        let black = tm.remaining(Color::Black);
        assert!(black <= 180.0 && black > 179.9);
        assert_eq!(tm.initial_minutes(), 3);
    }

    #[test]
    fn rewind_moves_the_clock_back_to_the_earlier_side() {
        let mut tm = TimeModel::new(180.0, 2.0);
        tm.set_paused(false);
        tm.tap();
        tm.tap();
        assert_eq!(tm.ply, 2);

        tm.rewind(1);
        assert_eq!(tm.ply, 1);
        assert_eq!(tm.moving_color(), Color::Black);
        // 先の手数へは進めない
        tm.rewind(5);
        assert_eq!(tm.ply, 1);
    }

    #[test]
    fn update_player_overwrites_clock() {
        let mut tm = TimeModel::new(60.0, 0.0);
        tm.update_player(Color::Black, 12.5);
        assert_eq!(tm.remaining(Color::Black), 12.5);
        assert_eq!(tm.remaining(Color::White), 60.0);
    }
}
