pub mod engine;
pub mod error;
pub mod generator;
pub mod matcher;
pub mod payout;
pub mod pool;
pub mod state;

#[cfg(test)]
mod testing;

pub use engine::{DrawEngine, DrawPhase, DrawnBall};
pub use error::{DrawError, InvalidReason, PayoutError};
