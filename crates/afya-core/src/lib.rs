pub mod category;
pub mod history;
pub mod insight;
pub mod profile;
pub mod reading;
pub mod stats;
pub mod window;

#[cfg(test)]
mod tests;

pub use category::*;
pub use history::*;
pub use insight::*;
pub use profile::*;
pub use reading::*;
pub use stats::*;
pub use window::*;
