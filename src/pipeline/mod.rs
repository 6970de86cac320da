//! Run orchestration: unit ordering, checkpointing, and file transfer.
mod driver;
mod summary;
mod transfer;


pub use driver::*;
pub use summary::*;
pub use transfer::*;
