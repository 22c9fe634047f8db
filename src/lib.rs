pub mod application;
pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::*;
pub use storage::{LaunchStore, MemoryStore, Repository, UserStore};
