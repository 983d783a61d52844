// src/config/mod.rs

//! Broker/worker configuration (`Dmake.toml`).

pub mod loader;
pub mod model;

pub use loader::{load, load_from_path};
pub use model::{BrokerSection, Config, WorkerSection};
