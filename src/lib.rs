pub mod config;
pub mod core;
pub mod game;
pub mod logging;
pub mod logic;
pub mod network;
pub mod player;

#[cfg(test)]
mod logic_tests;
