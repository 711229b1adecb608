//! CLI command for validating a graph file

use std::path::Path;

use console::style;

use crate::formats::read_graph_file;
use crate::graph::validate;

pub fn execute(source: &Path) -> anyhow::Result<()> {
    let graph = read_graph_file(source)?;
    let issues = validate(&graph);

    if issues.is_empty() {
        println!("{} no issues found", style("ok").green().bold());
        return Ok(());
    }

    for issue in &issues {
        println!("{} {issue}", style("warning").yellow().bold());
    }
    println!("{} issue(s) found", issues.len());

    Ok(())
}
