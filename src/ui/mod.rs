//! Terminal output helpers
//!
//! Styled status lines and spinners with automatic fallback to plain output
//! in CI/non-interactive environments.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{key_value, key_value_status, step_info, step_ok, step_warn};
pub use progress::TaskSpinner;
