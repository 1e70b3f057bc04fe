pub mod error;
pub mod formatting_helpers;
