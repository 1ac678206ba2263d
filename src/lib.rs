#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod log;

mod board;
pub mod catalog;
mod config;
mod control;
pub mod engine;
mod input;
pub mod link;
mod response;
pub mod scheduler;
pub mod storage;
pub mod time;

pub use board::Board;
pub use catalog::Catalog;
pub use catalog::ProgramId;
pub use config::Config;
pub use control::ControlLoop;
pub use control::State;
pub use engine::Outcome;
pub use engine::StreamingEngine;
pub use input::InputMonitor;
pub use input::Switch;
pub use input::SwitchState;
pub use link::ControllerLink;
pub use log::NullLog;
pub use response::Response;
pub use scheduler::ReshufflePolicy;
pub use scheduler::Scheduler;
pub use storage::DirEntry;
pub use storage::Session;
pub use storage::Storage;
pub use time::Clock;
pub use time::MilliSeconds;

#[cfg(test)]
pub use input::TestSwitch;
