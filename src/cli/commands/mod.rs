//! CLI command implementations

pub mod check;
pub mod config;
mod input;
pub mod normalize;
pub mod types;

pub use check::execute as check;
pub use config::execute as config;
pub use normalize::execute as normalize;
pub use types::execute as types;
