//! Task filtering: the status classifier and the tree pruner.
//!
//! MLO never deletes anything from an outline, so exports accumulate every
//! task ever completed or dropped. Compaction removes those tasks, each one
//! together with its entire subtree, and leaves everything else exactly as
//! it was.

use crate::xml::{Document, Element, Node};

/// Element name of the task-tree container.
pub const TASK_TREE_TAG: &str = "TaskTree";
/// Element name of a single task.
pub const TASK_NODE_TAG: &str = "TaskNode";

const COMPLETION_TAG: &str = "CompletionDateTime";
const DROPPED_TAG: &str = "Dropped";

/// Find the task tree inside a parsed export.
///
/// Exports usually look like `<MyLifeOrganized><TaskTree>...</TaskTree>...`,
/// but some export settings put `<TaskTree>` at the document root. Returns
/// `None` when neither shape applies.
pub fn locate_task_tree(doc: &mut Document) -> Option<&mut Element> {
    if doc.root.child(TASK_TREE_TAG).is_some() {
        doc.root.child_mut(TASK_TREE_TAG)
    } else if doc.root.name == TASK_TREE_TAG {
        Some(&mut doc.root)
    } else {
        None
    }
}

/// Whether a task is finished, either completed or dropped.
///
/// Three independent signals, any one of which is enough:
/// - a `CompletionDateTime` child with non-blank text,
/// - a `Dropped` child whose text equals `"true"` ignoring case,
/// - a `Dropped` attribute equal to exactly `"true"`.
///
/// The two `Dropped` forms come from different export variants and keep
/// their historical case rules: the child form is case-insensitive, the
/// attribute form is not. A task with none of these signals is active.
pub fn is_completed_or_dropped(task: &Element) -> bool {
    if let Some(completed) = task.child(COMPLETION_TAG) {
        // present but blank means not completed
        if !completed.text().trim().is_empty() {
            return true;
        }
    }
    if let Some(dropped) = task.child(DROPPED_TAG) {
        if dropped.text().eq_ignore_ascii_case("true") {
            return true;
        }
    }
    task.attribute(DROPPED_TAG) == Some("true")
}

/// Remove finished task children of `node`, recursing into the survivors.
///
/// A removed task takes its whole subtree with it; descendants of a removed
/// task are never inspected. Children that are not `TaskNode` elements are
/// left in place and not recursed into. Sibling order is preserved, and
/// `node` itself is never evaluated for removal.
pub fn prune(node: &mut Element) {
    node.children.retain(|child| match child {
        Node::Element(el) if el.name == TASK_NODE_TAG => !is_completed_or_dropped(el),
        _ => true,
    });
    for child in &mut node.children {
        if let Node::Element(el) = child {
            if el.name == TASK_NODE_TAG {
                prune(el);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Document {
        Document::parse(input).unwrap()
    }

    fn task_names(node: &Element) -> Vec<String> {
        node.child_elements()
            .filter(|el| el.name == TASK_NODE_TAG)
            .map(|el| el.attribute("Caption").unwrap_or_default().to_string())
            .collect()
    }

    fn count_tasks(node: &Element) -> usize {
        node.child_elements()
            .filter(|el| el.name == TASK_NODE_TAG)
            .map(|el| 1 + count_tasks(el))
            .sum()
    }

    #[test]
    fn completed_task_is_finished() {
        let doc = parse(
            "<TaskNode><CompletionDateTime>2024-01-01T10:00:00</CompletionDateTime></TaskNode>",
        );
        assert!(is_completed_or_dropped(&doc.root));
    }

    #[test]
    fn blank_completion_is_not_finished() {
        let doc = parse("<TaskNode><CompletionDateTime></CompletionDateTime></TaskNode>");
        assert!(!is_completed_or_dropped(&doc.root));

        let doc = parse("<TaskNode><CompletionDateTime>   </CompletionDateTime></TaskNode>");
        assert!(!is_completed_or_dropped(&doc.root));
    }

    #[test]
    fn dropped_child_matches_any_case() {
        for value in ["true", "True", "TRUE", "tRuE"] {
            let doc = parse(&format!("<TaskNode><Dropped>{value}</Dropped></TaskNode>"));
            assert!(is_completed_or_dropped(&doc.root), "value {value:?}");
        }
        let doc = parse("<TaskNode><Dropped>false</Dropped></TaskNode>");
        assert!(!is_completed_or_dropped(&doc.root));
    }

    #[test]
    fn dropped_attribute_is_case_sensitive() {
        let doc = parse(r#"<TaskNode Dropped="true"/>"#);
        assert!(is_completed_or_dropped(&doc.root));

        for value in ["TRUE", "True", "false", ""] {
            let doc = parse(&format!(r#"<TaskNode Dropped="{value}"/>"#));
            assert!(!is_completed_or_dropped(&doc.root), "value {value:?}");
        }
    }

    #[test]
    fn task_without_status_fields_is_active() {
        let doc = parse(r#"<TaskNode Caption="plain"><TaskNode/></TaskNode>"#);
        assert!(!is_completed_or_dropped(&doc.root));
    }

    #[test]
    fn prune_removes_completed_task_with_all_descendants() {
        let mut doc = parse(
            r#"<TaskTree>
                <TaskNode Caption="done">
                    <CompletionDateTime>2024-01-01T10:00:00</CompletionDateTime>
                    <TaskNode Caption="a"/>
                    <TaskNode Caption="b"/>
                    <TaskNode Caption="c"/>
                </TaskNode>
                <TaskNode Caption="open"/>
            </TaskTree>"#,
        );
        prune(&mut doc.root);
        assert_eq!(task_names(&doc.root), ["open"]);
        assert_eq!(count_tasks(&doc.root), 1);
    }

    #[test]
    fn prune_keeps_descendants_of_removed_task_out_even_if_active() {
        let mut doc = parse(
            r#"<TaskTree>
                <TaskNode Caption="dropped">
                    <Dropped>true</Dropped>
                    <TaskNode Caption="still-active"/>
                </TaskNode>
            </TaskTree>"#,
        );
        prune(&mut doc.root);
        assert_eq!(count_tasks(&doc.root), 0);
    }

    #[test]
    fn prune_recurses_into_surviving_tasks() {
        let mut doc = parse(
            r#"<TaskTree>
                <TaskNode Caption="parent">
                    <TaskNode Caption="done"><Dropped>True</Dropped></TaskNode>
                    <TaskNode Caption="child"/>
                </TaskNode>
            </TaskTree>"#,
        );
        prune(&mut doc.root);
        let parent = doc.root.child(TASK_NODE_TAG).unwrap();
        assert_eq!(task_names(parent), ["child"]);
    }

    #[test]
    fn prune_preserves_sibling_order() {
        let mut doc = parse(
            r#"<TaskTree>
                <TaskNode Caption="one"/>
                <TaskNode Caption="gone"><Dropped>true</Dropped></TaskNode>
                <TaskNode Caption="two"/>
                <TaskNode Caption="three"/>
            </TaskTree>"#,
        );
        prune(&mut doc.root);
        assert_eq!(task_names(&doc.root), ["one", "two", "three"]);
    }

    #[test]
    fn prune_never_touches_non_task_children() {
        let mut doc = parse(
            r#"<TaskTree>
                <Settings><Dropped>true</Dropped></Settings>
                <TaskNode Caption="open"/>
            </TaskTree>"#,
        );
        prune(&mut doc.root);
        assert!(doc.root.child("Settings").is_some());
        assert_eq!(task_names(&doc.root), ["open"]);
    }

    #[test]
    fn prune_is_idempotent() {
        let mut doc = parse(
            r#"<TaskTree>
                <TaskNode Caption="keep">
                    <TaskNode Caption="drop"><Dropped>true</Dropped></TaskNode>
                    <TaskNode Caption="sub"/>
                </TaskNode>
            </TaskTree>"#,
        );
        prune(&mut doc.root);
        let once = doc.clone();
        prune(&mut doc.root);
        assert_eq!(doc, once);
    }

    #[test]
    fn locates_task_tree_as_child_of_root() {
        let mut doc = parse("<MyLifeOrganized><TaskTree><TaskNode/></TaskTree></MyLifeOrganized>");
        let tree = locate_task_tree(&mut doc).unwrap();
        assert_eq!(tree.name, TASK_TREE_TAG);
    }

    #[test]
    fn locates_task_tree_at_document_root() {
        let mut doc = parse("<TaskTree><TaskNode/></TaskTree>");
        let tree = locate_task_tree(&mut doc).unwrap();
        assert_eq!(tree.name, TASK_TREE_TAG);
    }

    #[test]
    fn reports_missing_task_tree() {
        let mut doc = parse("<SomethingElse><TaskNode/></SomethingElse>");
        assert!(locate_task_tree(&mut doc).is_none());
    }
}
