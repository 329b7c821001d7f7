//! A pretty-printer for expression trees, used by trace output and test
//! assertions. The format is indented and parenthesized, one node per line:
//!
//! ```text
//! STORE #5 (8)
//!   ADDR #1 (0)
//!     LOCAL #0
//!   SUB #4
//!     LOAD #2 (8)
//!       ADDR #1 (0)
//!         LOCAL #0
//!     CONST #3 (1, 8)
//! ```
//!
//! Shared subtrees (the `ADDR` node above is referenced by both `STORE` and
//! `LOAD`) are printed once per occurrence rather than deduplicated — the
//! point of this printer is to show exactly what a traversal would walk.

use std::fmt::Write as _;

use crate::ir::tree::{NodeId, Tree};

/// Render every root of `tree` to indented text.
pub fn pretty_print(tree: &Tree) -> String {
    let mut out = String::new();
    for (i, &root) in tree.roots().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_node(tree, root, 0, &mut out);
    }
    out
}

fn write_node(tree: &Tree, node: NodeId, depth: usize, out: &mut String) {
    let op = tree.op(node);
    for _ in 0..depth {
        out.push_str("  ");
    }
    let _ = write!(out, "{} #{}", op.name(), node.index());

    if op.is_label_like() {
        let _ = write!(out, " -> {}", tree.label_id(node).expect("label-like op"));
        out.push('\n');
        return;
    }

    let params = tree.params(node);
    if !params.is_empty() {
        out.push_str(" (");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{param}");
        }
        out.push(')');
    }
    out.push('\n');

    for child in tree.child_ids(node) {
        write_node(tree, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::Builder;

    #[test]
    fn renders_nested_nodes_with_increasing_indentation() {
        let mut tree = Tree::new();
        let mut b = Builder::new(&mut tree);
        let local = b.local().unwrap();
        let addr = b.addr(local, 0).unwrap();
        let loaded = b.load(addr, 8).unwrap();
        b.root(loaded);

        let text = pretty_print(&tree);
        assert_eq!(
            text,
            "LOAD #2 (8)\n  ADDR #1 (0)\n    LOCAL #0\n"
        );
    }

    #[test]
    fn label_like_nodes_print_their_target_instead_of_children() {
        let mut tree = Tree::new();
        let branch = tree.append_branch(9).unwrap();
        tree.declare_root(branch);
        assert_eq!(pretty_print(&tree), "BRANCH #0 -> 9\n");
    }
}
