pub mod cards;
pub mod db;
pub mod draw_state;
pub mod error;
pub mod models;
pub mod patterns;
pub mod payouts;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use rusqlite;
pub use store::{CardStore, DrawStateStore, PatternStore, PayoutStore, SqliteStore};
