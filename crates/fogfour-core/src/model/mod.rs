pub mod board;
pub mod distribution;
pub mod player;
pub mod snapshot;
pub mod world;
