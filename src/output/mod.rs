//! Output formatting module
//!
//! Provides two output formats:
//! - Terminal output with colors
//! - JSON export

pub mod json;
pub mod terminal;

pub use json::{print_json, print_json_list};
pub use terminal::{print_comparison, print_failure_details, print_header, print_report};
