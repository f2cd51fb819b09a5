//! Bounded-depth element search over a parsed XML tree
//!
//! Lookups walk the tree with an explicit stack instead of recursion. Direct
//! children of the start element are at depth 1; nothing deeper than
//! `max_depth` is visited. Elements are visited in document (pre-order)
//! order, so the first match is the first one a reader would see.

use roxmltree::Node;

/// How a tag name is compared against the searched name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch {
    /// Case-insensitive substring
    Contains,
    /// Case-insensitive equality
    Exact,
}

impl TagMatch {
    fn matches(self, node: &Node<'_, '_>, tag: &str) -> bool {
        let name = node.tag_name().name();
        match self {
            Self::Exact => name.eq_ignore_ascii_case(tag),
            Self::Contains => name.to_ascii_lowercase().contains(&tag.to_ascii_lowercase()),
        }
    }
}

/// Element children of `node` in document order
pub fn element_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn push_children<'a, 'input>(stack: &mut Vec<(Node<'a, 'input>, usize)>, node: Node<'a, 'input>, depth: usize) {
    let children: Vec<_> = element_children(node).collect();
    stack.extend(children.into_iter().rev().map(|child| (child, depth)));
}

/// First element below `root` whose tag matches `tag`
pub fn find_first<'a, 'input>(
    root: Node<'a, 'input>,
    tag: &str,
    max_depth: usize,
    mode: TagMatch,
) -> Option<Node<'a, 'input>> {
    let mut stack = Vec::new();
    push_children(&mut stack, root, 1);

    while let Some((node, depth)) = stack.pop() {
        if mode.matches(&node, tag) {
            return Some(node);
        }
        if depth < max_depth {
            push_children(&mut stack, node, depth + 1);
        }
    }
    None
}

/// Every element below `root` whose tag contains `tag`, in document order
///
/// Matched elements are searched too, so nested matches (child scene nodes,
/// for example) are returned after their parent.
pub fn find_all<'a, 'input>(root: Node<'a, 'input>, tag: &str, max_depth: usize) -> Vec<Node<'a, 'input>> {
    let mut found = Vec::new();
    let mut stack = Vec::new();
    push_children(&mut stack, root, 1);

    while let Some((node, depth)) = stack.pop() {
        if TagMatch::Contains.matches(&node, tag) {
            found.push(node);
        }
        if depth < max_depth {
            push_children(&mut stack, node, depth + 1);
        }
    }
    found
}

/// Value of the first attribute whose name contains "name"
pub fn name_attribute<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attributes()
        .find(|attribute| attribute.name().to_ascii_lowercase().contains("name"))
        .map(|attribute| attribute.value())
}

/// Identifying attribute: `id` when present, otherwise the first attribute
pub fn id_attribute<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute("id")
        .or_else(|| node.attributes().next().map(|attribute| attribute.value()))
}

/// Text directly inside `node`, empty when there is none
pub fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("")
}
