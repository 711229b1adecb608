//! CLI command for summarizing a graph file

use std::path::Path;

use console::style;

use crate::formats::read_graph_file;
use crate::graph::resolve;

pub fn execute(source: &Path) -> anyhow::Result<()> {
    let graph = read_graph_file(source)?;

    println!("{}", style(source.display()).bold());
    println!(
        "  nodes: {} dialog, {} choice, {} action",
        graph.dialogs().count(),
        graph.choices().count(),
        graph.actions().count()
    );
    println!("  links: {}", graph.links().len());

    match graph.start() {
        Some(start) => println!("  start: {}", start.id),
        None => println!("  start: {}", style("unset").yellow()),
    }
    match resolve::entry(&graph) {
        Some(entry) => println!("  entry: {entry}"),
        None => println!("  entry: {}", style("unresolved").yellow()),
    }

    for choice in graph.choices() {
        let answers: Vec<&str> = choice
            .choices
            .iter()
            .map(|c| c.answer_text.as_str())
            .collect();
        println!("  choice {}: [{}]", choice.id, answers.join(" | "));
    }

    Ok(())
}
