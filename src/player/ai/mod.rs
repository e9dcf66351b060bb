pub mod random;

pub use random::RandomAI;
