//! liftlog - Personal workout and body-weight tracker
//!
//! Log sets, browse them on a month calendar, follow strength progress.

pub mod calendar;
pub mod dates;
pub mod db;
pub mod exercises;
pub mod export;
pub mod session;
pub mod settings;
pub mod stats;
pub mod tui;

pub use db::Database;
pub use session::{Persistence, Session};
pub use settings::Settings;
