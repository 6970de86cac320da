//! Size screening of candidate images with retrying filesystem probes.
mod filter;
mod probe;

pub use filter::*;
pub use probe::*;
