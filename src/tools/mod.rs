//! Tool catalogue.

pub mod catalog;

pub use catalog::{all_tools, categories, is_tool_allowed, tools_in_category, ToolCategory};
