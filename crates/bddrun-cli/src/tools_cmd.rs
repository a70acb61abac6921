//! `bddrun tools` command: list the tools that can be run.

use bddrun_core::ToolCatalog;

/// Print one line per tool: id, display name, command line.
pub fn list_tools(catalog: &ToolCatalog) {
    if catalog.is_empty() {
        println!("No tools configured.");
        return;
    }

    for line in tool_lines(catalog) {
        println!("{line}");
    }
}

fn tool_lines(catalog: &ToolCatalog) -> Vec<String> {
    let width = catalog.ids().iter().map(|id| id.len()).max().unwrap_or(0);
    catalog
        .list()
        .into_iter()
        .map(|tool| {
            let mut line = format!(
                "{:<width$}  {}  [{}]  {}",
                tool.id,
                tool.name,
                tool.test_dir.display(),
                tool.command.join(" "),
            );
            if tool.setup.is_some() {
                line.push_str("  (setup)");
            }
            line
        })
        .collect()
}
