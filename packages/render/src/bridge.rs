//! Keyed reconciliation of decorator host views.
//!
//! The bridge owns the `NodeKey → live view` mapping. Reconciliation walks
//! the tree, renders every decorator node, and emits the minimal update
//! sequence: `Mount` for new keys, in-place `Update` patches for changed
//! ones, `Unmount` for keys that left the tree. A renderer failure mounts an
//! error placeholder for that key only; the rest of the document is
//! unaffected.

use crate::differ::{diff_views, ViewPatch};
use penmark_common::NodeKey;
use penmark_document::{DocumentNode, DocumentTree, HostNode, NodeTypeRegistry, RenderError};
use std::collections::HashMap;
use tracing::warn;

/// One change to the set of live host views.
#[derive(Debug, Clone, PartialEq)]
pub enum HostUpdate {
    Mount { key: NodeKey, view: HostNode },
    Update { key: NodeKey, patches: Vec<ViewPatch> },
    Unmount { key: NodeKey },
}

#[derive(Debug, Clone)]
struct MountedView {
    view: HostNode,
    failed: bool,
}

/// Keeps every decorator node in the tree backed by exactly one host view.
#[derive(Debug, Default)]
pub struct DecoratorBridge {
    views: HashMap<NodeKey, MountedView>,
}

impl DecoratorBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current view for a key, if mounted.
    pub fn view(&self, key: &NodeKey) -> Option<&HostNode> {
        self.views.get(key).map(|mounted| &mounted.view)
    }

    /// Whether the key's last render failed and shows the error placeholder.
    pub fn is_failed(&self, key: &NodeKey) -> bool {
        self.views.get(key).map(|mounted| mounted.failed).unwrap_or(false)
    }

    pub fn mounted_count(&self) -> usize {
        self.views.len()
    }

    /// Bring host views in line with the tree.
    pub fn reconcile(
        &mut self,
        tree: &DocumentTree,
        registry: &NodeTypeRegistry,
    ) -> Vec<HostUpdate> {
        let mut decorators = Vec::new();
        collect_decorators(tree.root(), registry, &mut decorators);

        let mut updates = Vec::new();
        let mut seen: Vec<NodeKey> = Vec::with_capacity(decorators.len());

        for node in decorators {
            seen.push(node.key.clone());
            let rendered = render_or_placeholder(node, registry);

            match self.views.get(&node.key) {
                None => {
                    updates.push(HostUpdate::Mount {
                        key: node.key.clone(),
                        view: rendered.view.clone(),
                    });
                    self.views.insert(node.key.clone(), rendered);
                }
                Some(mounted) if mounted.view != rendered.view => {
                    let patches = diff_views(&mounted.view, &rendered.view);
                    updates.push(HostUpdate::Update {
                        key: node.key.clone(),
                        patches,
                    });
                    self.views.insert(node.key.clone(), rendered);
                }
                Some(_) => {}
            }
        }

        let removed: Vec<NodeKey> = self
            .views
            .keys()
            .filter(|key| !seen.contains(key))
            .cloned()
            .collect();
        for key in removed {
            self.views.remove(&key);
            updates.push(HostUpdate::Unmount { key });
        }

        updates
    }
}

fn render_or_placeholder(node: &DocumentNode, registry: &NodeTypeRegistry) -> MountedView {
    let definition = match registry.get(&node.node_type) {
        Some(definition) => definition,
        None => {
            warn!(key = %node.key, node_type = %node.node_type, "no renderer registered");
            return MountedView {
                view: error_placeholder(&RenderError::new(format!(
                    "no renderer for `{}`",
                    node.node_type
                ))),
                failed: true,
            };
        }
    };

    match (definition.render)(node) {
        Ok(view) => MountedView {
            view,
            failed: false,
        },
        Err(error) => {
            warn!(key = %node.key, node_type = %node.node_type, %error, "renderer failed");
            MountedView {
                view: error_placeholder(&error),
                failed: true,
            }
        }
    }
}

fn error_placeholder(error: &RenderError) -> HostNode {
    HostNode::element("div")
        .attr("class", "decorator-error")
        .attr("role", "alert")
        .child(HostNode::text(format!(
            "This block failed to render: {}",
            error.reason()
        )))
}

fn collect_decorators<'tree>(
    node: &'tree DocumentNode,
    registry: &NodeTypeRegistry,
    out: &mut Vec<&'tree DocumentNode>,
) {
    if registry.is_decorator(&node.node_type) {
        out.push(node);
    }
    for child in &node.children {
        collect_decorators(child, registry, out);
    }
}
