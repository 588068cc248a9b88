//! Catalogue of MCP tools the gateway is expected to relay.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Tool grouping, mirroring the MCP servers behind the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ToolCategory {
    Core,
    Diagrams,
    Documentation,
    CloudFormation,
    Pricing,
}

impl ToolCategory {
    /// Tools relayed for this category.
    pub fn tools(self) -> &'static [&'static str] {
        match self {
            Self::Core => &["prompt_understanding"],
            Self::Diagrams => &["generate_diagram", "list_icons", "get_diagram_examples"],
            Self::Documentation => &["search_documentation", "read_documentation", "recommend"],
            Self::CloudFormation => &[
                "create_resource",
                "read_resource",
                "update_resource",
                "delete_resource",
                "list_resources",
                "get_resource_schema",
                "generate_template",
            ],
            // Pricing documents are produced outside MCP.
            Self::Pricing => &[],
        }
    }
}

/// Whether `tool_name` belongs to any category.
pub fn is_tool_allowed(tool_name: &str) -> bool {
    ToolCategory::iter().any(|category| category.tools().contains(&tool_name))
}

/// Tools for a category given by name; unknown categories have no tools.
pub fn tools_in_category(category: &str) -> &'static [&'static str] {
    category
        .parse::<ToolCategory>()
        .map(ToolCategory::tools)
        .unwrap_or(&[])
}

/// Every category name.
pub fn categories() -> Vec<String> {
    ToolCategory::iter().map(|c| c.to_string()).collect()
}

/// Every allowed tool, in category order.
pub fn all_tools() -> Vec<&'static str> {
    ToolCategory::iter()
        .flat_map(|category| category.tools().iter().copied())
        .collect()
}
