//! JSON export/import of conversation graphs
//!
//! The DTO field names match the authoring tool's serialized layout
//! (camelCase, `guid` for ids, `question` for dialog text), so graphs
//! round-trip byte-compatibly through external editors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{
    ActionNode, Choice, ChoiceNode, DialogNode, Graph, Marker, Position, resolve,
};

/// Serialized conversation graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphExport {
    pub start_node: Option<MarkerExport>,
    pub end_node: Option<MarkerExport>,
    pub dialog_nodes: Vec<DialogNodeExport>,
    pub choice_nodes: Vec<ChoiceNodeExport>,
    pub action_nodes: Vec<ActionNodeExport>,
    pub links: Vec<LinkExport>,
}

/// Serialized Start/End marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkerExport {
    pub guid: String,
    pub position_x: f32,
    pub position_y: f32,
    pub is_initialized: bool,
}

/// Serialized dialog node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialogNodeExport {
    pub title: String,
    pub guid: String,
    pub speaker: String,
    /// The line text (historical field name).
    pub question: String,
    pub position_x: f32,
    pub position_y: f32,
    pub display_time: f32,
}

/// Serialized choice node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceNodeExport {
    pub guid: String,
    pub text: String,
    pub position_x: f32,
    pub position_y: f32,
    pub choices: Vec<ChoiceEntryExport>,
}

/// Serialized answer within a choice node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceEntryExport {
    pub answer_text: String,
    /// Legacy embedded target; used only when `links` is absent.
    #[serde(rename = "nextNodeGUID")]
    pub next_node_guid: Option<String>,
}

/// Serialized action node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionNodeExport {
    pub guid: String,
    pub action_id: String,
    pub payload_json: String,
    pub wait_for_completion: bool,
    pub wait_seconds: f32,
    pub position_x: f32,
    pub position_y: f32,
}

/// Serialized link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkExport {
    pub from_guid: String,
    pub to_guid: String,
    pub from_port_index: usize,
}

impl GraphExport {
    /// Snapshot a graph into its serialized layout.
    ///
    /// Each choice's `nextNodeGUID` is mirrored from the link table so the
    /// output stays readable by legacy consumers.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let marker = |m: &Marker| MarkerExport {
            guid: m.id.clone(),
            position_x: m.position.x,
            position_y: m.position.y,
            is_initialized: m.initialized,
        };

        Self {
            start_node: graph.start().map(marker),
            end_node: graph.end().map(marker),
            dialog_nodes: graph
                .dialogs()
                .map(|n| DialogNodeExport {
                    title: n.title.clone(),
                    guid: n.id.clone(),
                    speaker: n.speaker.clone(),
                    question: n.text.clone(),
                    position_x: n.position.x,
                    position_y: n.position.y,
                    display_time: n.display_time,
                })
                .collect(),
            choice_nodes: graph
                .choices()
                .map(|n| ChoiceNodeExport {
                    guid: n.id.clone(),
                    text: n.text.clone(),
                    position_x: n.position.x,
                    position_y: n.position.y,
                    choices: n
                        .choices
                        .iter()
                        .enumerate()
                        .map(|(index, c)| ChoiceEntryExport {
                            answer_text: c.answer_text.clone(),
                            next_node_guid: resolve::next_from_choice(graph, &n.id, index)
                                .map(String::from),
                        })
                        .collect(),
                })
                .collect(),
            action_nodes: graph
                .actions()
                .map(|n| ActionNodeExport {
                    guid: n.id.clone(),
                    action_id: n.action_id.clone(),
                    payload_json: n.payload.clone(),
                    wait_for_completion: n.wait_for_completion,
                    wait_seconds: n.wait_seconds,
                    position_x: n.position.x,
                    position_y: n.position.y,
                })
                .collect(),
            links: graph
                .links()
                .iter()
                .map(|l| LinkExport {
                    from_guid: l.from_id.clone(),
                    to_guid: l.to_id.clone(),
                    from_port_index: l.from_port,
                })
                .collect(),
        }
    }

    /// Build a graph from the serialized layout.
    ///
    /// When the `links` array is empty, links are synthesized from each
    /// choice's embedded `nextNodeGUID` (legacy layouts predating the link
    /// table).
    ///
    /// # Errors
    /// Returns an error on empty or duplicate node ids.
    pub fn into_graph(self) -> Result<Graph> {
        let mut graph = Graph::new();

        if let Some(start) = self.start_node {
            graph.set_start(Marker {
                id: start.guid,
                position: Position::new(start.position_x, start.position_y),
                initialized: start.is_initialized,
            });
        }
        if let Some(end) = self.end_node {
            graph.set_end(Marker {
                id: end.guid,
                position: Position::new(end.position_x, end.position_y),
                initialized: end.is_initialized,
            });
        }

        for node in self.dialog_nodes {
            graph.add_dialog(DialogNode {
                id: node.guid,
                title: node.title,
                speaker: node.speaker,
                text: node.question,
                portrait: None,
                audio: None,
                display_time: node.display_time.max(0.0),
                position: Position::new(node.position_x, node.position_y),
            })?;
        }

        let mut legacy_links = Vec::new();
        for node in self.choice_nodes {
            let choices = node
                .choices
                .into_iter()
                .enumerate()
                .map(|(index, entry)| {
                    if let Some(target) = &entry.next_node_guid {
                        legacy_links.push((node.guid.clone(), index, target.clone()));
                    }
                    Choice {
                        answer_text: entry.answer_text,
                        next_node_id: entry.next_node_guid,
                        on_selected: None,
                    }
                })
                .collect();
            graph.add_choice(ChoiceNode {
                id: node.guid.clone(),
                text: node.text,
                choices,
                position: Position::new(node.position_x, node.position_y),
            })?;
        }

        for node in self.action_nodes {
            graph.add_action(ActionNode {
                id: node.guid,
                action_id: node.action_id,
                payload: node.payload_json,
                wait_for_completion: node.wait_for_completion,
                wait_seconds: node.wait_seconds.max(0.0),
                position: Position::new(node.position_x, node.position_y),
            })?;
        }

        if self.links.is_empty() {
            // Legacy layout: the choice-embedded targets are all we have.
            for (from, port, to) in legacy_links {
                graph.set_link(from, port, to);
            }
        } else {
            for link in self.links {
                graph.set_link(link.from_guid, link.from_port_index, link.to_guid);
            }
        }

        Ok(graph)
    }
}

/// Parse a graph from its JSON layout.
///
/// # Errors
/// Returns an error if the JSON is malformed or the node set is invalid.
pub fn parse_graph_json(json: &str) -> Result<Graph> {
    let export: GraphExport = serde_json::from_str(json)?;
    export.into_graph()
}

/// Serialize a graph to pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn graph_to_json(graph: &Graph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&GraphExport::from_graph(graph))?)
}

/// Load a graph from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_graph_file<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let json = std::fs::read_to_string(path)?;
    parse_graph_json(&json)
}

/// Write a graph to a JSON file.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn write_graph_file<P: AsRef<Path>>(path: P, graph: &Graph) -> Result<()> {
    std::fs::write(path, graph_to_json(graph)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_json() -> &'static str {
        r#"{
            "startNode": { "guid": "start", "positionX": 0.0, "positionY": 0.0, "isInitialized": true },
            "endNode": { "guid": "end", "positionX": 900.0, "positionY": 0.0, "isInitialized": true },
            "dialogNodes": [
                { "title": "Opening", "guid": "d1", "speaker": "Ann", "question": "Hello.", "positionX": 100.0, "positionY": 0.0, "displayTime": 0.0 }
            ],
            "choiceNodes": [
                { "guid": "c1", "text": "Well?", "positionX": 300.0, "positionY": 0.0,
                  "choices": [
                    { "answerText": "Yes", "nextNodeGUID": "d1" },
                    { "answerText": "No", "nextNodeGUID": null }
                  ] }
            ],
            "actionNodes": [
                { "guid": "a1", "actionId": "OpenDoor", "payloadJson": "{}", "waitForCompletion": true, "waitSeconds": 0.5, "positionX": 500.0, "positionY": 0.0 }
            ],
            "links": [
                { "fromGuid": "start", "toGuid": "d1", "fromPortIndex": 0 },
                { "fromGuid": "d1", "toGuid": "c1", "fromPortIndex": 0 },
                { "fromGuid": "c1", "toGuid": "a1", "fromPortIndex": 0 }
            ]
        }"#
    }

    #[test]
    fn test_parse_full_layout() {
        let graph = parse_graph_json(sample_json()).unwrap();

        assert_eq!(graph.start().unwrap().id, "start");
        assert_eq!(graph.dialog("d1").unwrap().speaker, "Ann");
        assert_eq!(graph.choice("c1").unwrap().choices.len(), 2);
        let action = graph.action("a1").unwrap();
        assert!(action.wait_for_completion);
        assert_eq!(action.wait_seconds, 0.5);
        assert_eq!(resolve::entry(&graph), Some("d1"));
    }

    #[test]
    fn test_links_are_authoritative_over_embedded_targets() {
        // c1's first answer embeds "d1", but the link table says port 0
        // goes to a1. The link table wins.
        let graph = parse_graph_json(sample_json()).unwrap();
        assert_eq!(resolve::next_from_choice(&graph, "c1", 0), Some("a1"));
    }

    #[test]
    fn test_legacy_fallback_without_links() {
        let json = r#"{
            "choiceNodes": [
                { "guid": "c1", "text": "", "positionX": 0.0, "positionY": 0.0,
                  "choices": [
                    { "answerText": "Yes", "nextNodeGUID": "d-yes" },
                    { "answerText": "No", "nextNodeGUID": "d-no" }
                  ] }
            ],
            "dialogNodes": [
                { "guid": "d-yes", "question": "yes line" },
                { "guid": "d-no", "question": "no line" }
            ]
        }"#;
        let graph = parse_graph_json(json).unwrap();

        assert_eq!(resolve::next_from_choice(&graph, "c1", 0), Some("d-yes"));
        assert_eq!(resolve::next_from_choice(&graph, "c1", 1), Some("d-no"));
    }

    #[test]
    fn test_round_trip_preserves_topology_and_layout() {
        let original = parse_graph_json(sample_json()).unwrap();
        let json = graph_to_json(&original).unwrap();
        let restored = parse_graph_json(&json).unwrap();

        assert_eq!(original.node_count(), restored.node_count());
        assert_eq!(original.links().len(), restored.links().len());
        assert_eq!(
            original.dialog("d1").unwrap().position,
            restored.dialog("d1").unwrap().position
        );
        assert_eq!(resolve::entry(&restored), Some("d1"));
    }

    #[test]
    fn test_export_mirrors_links_into_choice_targets() {
        let graph = parse_graph_json(sample_json()).unwrap();
        let export = GraphExport::from_graph(&graph);

        let entry = &export.choice_nodes[0].choices[0];
        assert_eq!(entry.next_node_guid.as_deref(), Some("a1"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let graph = parse_graph_json(sample_json()).unwrap();
        write_graph_file(&path, &graph).unwrap();
        let restored = read_graph_file(&path).unwrap();

        assert_eq!(graph.node_count(), restored.node_count());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"{
            "dialogNodes": [
                { "guid": "dup", "question": "a" },
                { "guid": "dup", "question": "b" }
            ]
        }"#;
        assert!(parse_graph_json(json).is_err());
    }
}
