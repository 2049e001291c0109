use afya_core::Reading;
use serde::{Deserialize, Serialize};

/// Handle returned by `connect`, usable to detach a single observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Receives every reading the simulator emits while streaming.
pub trait ReadingObserver: Send {
    /// Returns `false` once the observer can no longer take readings; it is
    /// then dropped from the subscription list.
    fn on_reading(&mut self, reading: &Reading) -> bool;
}

impl<F> ReadingObserver for F
where
    F: FnMut(&Reading) + Send,
{
    fn on_reading(&mut self, reading: &Reading) -> bool {
        self(reading);
        true
    }
}

/// Forwards readings into a std channel.
pub struct ChannelObserver(pub std::sync::mpsc::Sender<Reading>);

impl ReadingObserver for ChannelObserver {
    fn on_reading(&mut self, reading: &Reading) -> bool {
        self.0.send(*reading).is_ok()
    }
}

/// Forwards readings into a tokio channel so an async task can consume them.
pub struct AsyncChannelObserver(pub tokio::sync::mpsc::UnboundedSender<Reading>);

impl ReadingObserver for AsyncChannelObserver {
    fn on_reading(&mut self, reading: &Reading) -> bool {
        self.0.send(*reading).is_ok()
    }
}
