//! Host-view diffing.
//!
//! Comparing the previously mounted view description against a fresh render
//! yields a list of targeted patches. Patching in place is what lets an
//! editable surface inside a decorator (a code block in edit mode) keep its
//! focus and caret across attribute changes.

use penmark_document::HostNode;
use std::collections::HashMap;

/// One targeted update to a mounted host view. `path` is the child-index
/// trail from the view root.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewPatch {
    /// The node changed kind or tag; swap the subtree.
    Replace { path: Vec<usize>, node: HostNode },
    SetAttributes {
        path: Vec<usize>,
        attributes: HashMap<String, String>,
    },
    SetStyles {
        path: Vec<usize>,
        styles: HashMap<String, String>,
    },
    SetText { path: Vec<usize>, content: String },
    InsertChild {
        path: Vec<usize>,
        index: usize,
        node: HostNode,
    },
    RemoveChild { path: Vec<usize>, index: usize },
}

/// Diff two view descriptions into patches that transform `old` into `new`.
pub fn diff_views(old: &HostNode, new: &HostNode) -> Vec<ViewPatch> {
    let mut patches = Vec::new();
    diff_at(old, new, Vec::new(), &mut patches);
    patches
}

fn diff_at(old: &HostNode, new: &HostNode, path: Vec<usize>, patches: &mut Vec<ViewPatch>) {
    match (old, new) {
        (
            HostNode::Element {
                tag: old_tag,
                attributes: old_attributes,
                styles: old_styles,
                children: old_children,
            },
            HostNode::Element {
                tag: new_tag,
                attributes: new_attributes,
                styles: new_styles,
                children: new_children,
            },
        ) => {
            if old_tag != new_tag {
                patches.push(ViewPatch::Replace {
                    path,
                    node: new.clone(),
                });
                return;
            }
            if old_attributes != new_attributes {
                patches.push(ViewPatch::SetAttributes {
                    path: path.clone(),
                    attributes: new_attributes.clone(),
                });
            }
            if old_styles != new_styles {
                patches.push(ViewPatch::SetStyles {
                    path: path.clone(),
                    styles: new_styles.clone(),
                });
            }

            let shared = old_children.len().min(new_children.len());
            for index in 0..shared {
                let mut child_path = path.clone();
                child_path.push(index);
                diff_at(&old_children[index], &new_children[index], child_path, patches);
            }
            for index in shared..new_children.len() {
                patches.push(ViewPatch::InsertChild {
                    path: path.clone(),
                    index,
                    node: new_children[index].clone(),
                });
            }
            // Remove back to front so earlier indexes stay valid.
            for index in (shared..old_children.len()).rev() {
                patches.push(ViewPatch::RemoveChild {
                    path: path.clone(),
                    index,
                });
            }
        }
        (HostNode::Text { content: old_text }, HostNode::Text { content: new_text }) => {
            if old_text != new_text {
                patches.push(ViewPatch::SetText {
                    path,
                    content: new_text.clone(),
                });
            }
        }
        _ => {
            patches.push(ViewPatch::Replace {
                path,
                node: new.clone(),
            });
        }
    }
}
