use serde::{Deserialize, Serialize};
use std::fmt;

/// 手番の色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White, // 先手
    Black, // 後手
}

impl Default for Color {
    fn default() -> Self {
        Color::White
    }
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 盤上で前進する方向 (y 軸)
    pub fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// 手数から手番を求める (0 手目は白番)
    pub fn from_ply(ply: u32) -> Color {
        if ply % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// ゲームの種類。キャスリングの表記方法に影響する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    Normal,
    FischerRandom,
}

/// 対局状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Waiting,
    Running,
    Paused,
    Draw,
    WhiteWon,
    BlackWon,
    Aborted,
    Adjourned,
    Killed,
}

impl GameStatus {
    /// まだ決着していない状態か
    pub fn is_unfinished(self) -> bool {
        matches!(
            self,
            GameStatus::Waiting | GameStatus::Running | GameStatus::Paused
        )
    }

    /// 勝敗 (引き分けを含む) が確定した状態か
    pub fn is_decided(self) -> bool {
        matches!(
            self,
            GameStatus::Draw | GameStatus::WhiteWon | GameStatus::BlackWon
        )
    }

    pub fn won_by(color: Color) -> GameStatus {
        match color {
            Color::White => GameStatus::WhiteWon,
            Color::Black => GameStatus::BlackWon,
        }
    }
}

/// 盤面座標 (0-indexed, y = 0 が 8 段目)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// "e4" 形式の座標を読む
    pub fn from_algebraic(s: &str) -> Option<Position> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Self::from_file_rank(file, rank)
    }

    pub fn from_file_rank(file: char, rank: char) -> Option<Position> {
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        let x = file as usize - 'a' as usize;
        let y = 7 - (rank as usize - '1' as usize);
        Some(Position::new(x, y))
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.x as u8) as char
    }

    pub fn rank_char(&self) -> char {
        (b'8' - self.y as u8) as char
    }

    pub fn offset(self, dx: i32, dy: i32) -> Option<Position> {
        let x = self.x as i32 + dx;
        let y = self.y as i32 + dy;
        if (0..8).contains(&x) && (0..8).contains(&y) {
            Some(Position::new(x as usize, y as usize))
        } else {
            None
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}
