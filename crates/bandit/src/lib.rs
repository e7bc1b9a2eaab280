//! Multi-armed bandit core — per-offer statistics, UCB and Thompson
//! Sampling selection, and the engine façade the API layer calls.

pub mod engine;
pub mod store;
pub mod thompson;
pub mod ucb;

pub use engine::BanditEngine;
pub use store::StatsStore;
pub use thompson::ThompsonSampler;
pub use ucb::UcbSampler;
