//! Persisted graph formats
//!
//! The JSON layout produced and consumed by authoring tools. The `links`
//! array is the authoritative topology; the `nextNodeGUID` embedded in each
//! choice is a legacy source honored only when `links` is absent.

mod export;

pub use export::{
    ActionNodeExport, ChoiceEntryExport, ChoiceNodeExport, DialogNodeExport, GraphExport,
    LinkExport, MarkerExport, graph_to_json, parse_graph_json, read_graph_file, write_graph_file,
};
