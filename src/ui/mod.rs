//! Terminal output for the CLI
//!
//! Uses `cliclack` styling in interactive terminals and falls back to plain
//! bracketed prefixes in CI or when output is piped.
//!
//! # Example
//!
//! ```rust,ignore
//! use convcache::ui::{self, UiContext};
//!
//! let ctx = UiContext::detect();
//! ui::step_ok(&ctx, "Document conforms to Node");
//! ui::step_warn_hint(&ctx, "Config already exists", "Use --force to overwrite");
//! ```

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    intro, remark, step_error_detail, step_info, step_ok, step_ok_detail, step_warn_hint,
};
