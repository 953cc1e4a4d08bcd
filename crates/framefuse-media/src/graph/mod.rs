//! Structured filter-graph model.
//!
//! A [`FilterGraph`] is an append-only list of labeled stages wired from
//! declared input streams to a single terminal label. The builder allocates
//! unique intermediate labels and [`FilterGraph::validate`] enforces the
//! threading invariant: every produced label is consumed by exactly one
//! later stage or is the terminal output, and every consumed label is a
//! declared source or an earlier product.

pub mod assemble;
pub mod stage;

use std::collections::HashSet;

use framefuse_models::CompositionError;

pub use assemble::{assemble, SourceSet};
pub use stage::{FadeDirection, Stage, StreamLabel};

/// One stage with its wired input and output labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub inputs: Vec<StreamLabel>,
    pub stage: Stage,
    pub output: StreamLabel,
}

/// An assembled, validated graph.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    sources: Vec<StreamLabel>,
    nodes: Vec<Node>,
    terminal: StreamLabel,
}

impl FilterGraph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn sources(&self) -> &[StreamLabel] {
        &self.sources
    }

    /// The single label mapped to the encoder's video input.
    pub fn terminal(&self) -> &StreamLabel {
        &self.terminal
    }

    /// Check the label-threading invariant.
    pub fn validate(&self) -> Result<(), CompositionError> {
        let mut available: HashSet<&str> = self.sources.iter().map(StreamLabel::as_str).collect();
        let mut produced: HashSet<&str> = HashSet::new();

        for node in &self.nodes {
            if node.inputs.len() != node.stage.arity() {
                return Err(CompositionError::InvalidParameters(format!(
                    "stage {:?} wired with {} inputs, expects {}",
                    node.stage,
                    node.inputs.len(),
                    node.stage.arity()
                )));
            }
            for input in &node.inputs {
                if !available.remove(input.as_str()) {
                    return Err(CompositionError::InvalidParameters(format!(
                        "label [{input}] is not available for consumption"
                    )));
                }
            }
            if produced.contains(node.output.as_str())
                || self.sources.iter().any(|s| s == &node.output)
            {
                return Err(CompositionError::InvalidParameters(format!(
                    "label [{}] produced more than once",
                    node.output
                )));
            }
            produced.insert(node.output.as_str());
            available.insert(node.output.as_str());
        }

        // Unconsumed source inputs are fine (audio-only or unused streams
        // are the invoker's concern); unconsumed intermediates are not.
        let dangling: Vec<&str> = available
            .iter()
            .filter(|label| produced.contains(**label) && **label != self.terminal.as_str())
            .copied()
            .collect();
        if !dangling.is_empty() {
            return Err(CompositionError::InvalidParameters(format!(
                "unconsumed intermediate labels: {dangling:?}"
            )));
        }

        if !available.contains(self.terminal.as_str()) {
            return Err(CompositionError::InvalidParameters(format!(
                "terminal label [{}] was never produced or was consumed",
                self.terminal
            )));
        }

        Ok(())
    }

    /// Render the bracket-labeled textual graph description.
    pub fn to_filter_complex(&self) -> String {
        self.nodes
            .iter()
            .map(|node| {
                let inputs: String = node
                    .inputs
                    .iter()
                    .map(|label| format!("[{label}]"))
                    .collect();
                format!("{}{}[{}]", inputs, node.stage.filter_args(), node.output)
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Forward-only graph builder with a shared label namespace.
#[derive(Debug)]
pub struct GraphBuilder {
    sources: Vec<StreamLabel>,
    nodes: Vec<Node>,
    used: HashSet<String>,
}

impl GraphBuilder {
    pub fn new(sources: Vec<StreamLabel>) -> Self {
        let used = sources.iter().map(|s| s.as_str().to_string()).collect();
        Self {
            sources,
            nodes: Vec::new(),
            used,
        }
    }

    /// Allocate a process-unique label from a readable hint.
    fn alloc(&mut self, hint: &str) -> StreamLabel {
        let mut name = hint.to_string();
        let mut n = 1;
        while self.used.contains(&name) {
            n += 1;
            name = format!("{hint}_{n}");
        }
        self.used.insert(name.clone());
        StreamLabel::new(name)
    }

    /// Append a stage, returning its freshly allocated output label.
    pub fn add(&mut self, inputs: Vec<StreamLabel>, stage: Stage, hint: &str) -> StreamLabel {
        let output = self.alloc(hint);
        self.nodes.push(Node {
            inputs,
            stage,
            output: output.clone(),
        });
        output
    }

    /// Declare the terminal label and validate the finished graph.
    pub fn finish(self, terminal: StreamLabel) -> Result<FilterGraph, CompositionError> {
        let graph = FilterGraph {
            sources: self.sources,
            nodes: self.nodes,
            terminal,
        };
        graph.validate()?;
        Ok(graph)
    }
}
