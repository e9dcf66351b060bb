use crate::core::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// サーバーから届く盤面更新
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardUpdate {
    pub game_no: u32,
    pub ply: u32,
    pub side_to_move: Color,
    /// 直前の指し手 (SAN)
    pub last_move: String,
    pub fen: String,
    pub white: String,
    pub black: String,
    pub white_ms: i64,
    pub black_ms: i64,
}

/// 個人宛てメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessage {
    pub sender: String,
    pub title: String,
    pub is_admin: bool,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferKind {
    Draw,
    Abort,
    Adjourn,
    Takeback,
    Resign,
    Flag,
    Pause,
    Resume,
    Switch,
    Hurry,
    Rematch,
    ChatAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferParam {
    /// 待ったで戻す手数
    Plies(u32),
    Text(String),
}

/// 対局中の申し入れ
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offer {
    pub kind: OfferKind,
    pub param: Option<OfferParam>,
    /// サーバーが割り当てた番号
    pub index: Option<u32>,
}

impl Offer {
    pub fn new(kind: OfferKind) -> Self {
        Self {
            kind,
            param: None,
            index: None,
        }
    }

    pub fn with_param(kind: OfferKind, param: OfferParam) -> Self {
        Self {
            kind,
            param: Some(param),
            index: None,
        }
    }

    pub fn indexed(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn chat(text: &str) -> Self {
        Self::with_param(OfferKind::ChatAction, OfferParam::Text(text.to_string()))
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        match &self.param {
            Some(OfferParam::Plies(n)) => write!(f, "({})", n)?,
            Some(OfferParam::Text(text)) => write!(f, "({:?})", text)?,
            None => {}
        }
        if let Some(index) = self.index {
            write!(f, " #{}", index)?;
        }
        Ok(())
    }
}
