//! Simulated wristband: a bounded random walk over heart rate and blood
//! pressure, pushed to registered observers once per tick.

pub mod config;
pub mod observer;
pub mod simulator;

#[cfg(test)]
mod tests;

pub use config::{Baseline, SimulatorConfig};
pub use observer::{AsyncChannelObserver, ChannelObserver, ReadingObserver, SubscriptionId};
pub use simulator::WristbandSimulator;
