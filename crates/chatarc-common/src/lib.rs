//! chatarc Common Library
//!
//! Shared functionality used across chatarc workspace members:
//!
//! - **Logging**: centralized tracing initialization with env-driven config
//! - **Text utilities**: bounded diagnostic truncation and credential masking

pub mod logging;
pub mod text;

pub use text::{mask_secret, truncate_error, MAX_ERROR_LEN};
