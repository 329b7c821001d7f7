//! Multi-order tree walking.
//!
//! The expression tree is a DAG, not strictly a tree: template expansion and
//! common-subexpression sharing can make two parents point at the same
//! child offset. [`Traverser`] tracks a visit count per node and reports
//! every occurrence to the [`Visitor`], tagged `repeat` from the second
//! encounter on; by default a repeat is walked again like any other node
//! (since children always reference earlier, already-appended offsets, this
//! can never cycle). A pass whose side effects (codegen, debug printing)
//! must run only once per shared subtree opts out by returning `false` from
//! `pre` when `repeat` is set — the engine itself never makes that call.

use crate::ir::tree::{NodeId, Tree};

/// Callbacks invoked while walking a tree.
///
/// All three have no-op default bodies; implement only the orders a given
/// pass needs. `pre` returning `false` skips descending into `node`'s
/// children (its `post` callback still fires); this is how a pass opts out
/// of re-walking a subtree it has already handled via some other path.
pub trait Visitor {
    /// Called before a node's children are visited.
    ///
    /// `repeat` is `true` if this node was already visited earlier in the
    /// same walk (a shared subtree reached through a second parent). The
    /// engine does not special-case repeats itself; a pass that wants to
    /// skip re-walking a shared subtree's children returns `false` when
    /// `repeat` is set, while one that wants full per-occurrence re-descent
    /// simply returns `true` unconditionally (the default).
    fn pre(&mut self, tree: &Tree, node: NodeId, repeat: bool) -> bool {
        let _ = (tree, node, repeat);
        true
    }

    /// Called between two consecutive children of `node`, after the one at
    /// `child_index` returns and before the one at `child_index + 1` starts.
    fn in_order(&mut self, tree: &Tree, node: NodeId, child_index: usize) {
        let _ = (tree, node, child_index);
    }

    /// Called after all of a node's children (and in-order callbacks) have
    /// run, or immediately if `pre` returned `false`.
    fn post(&mut self, tree: &Tree, node: NodeId, repeat: bool) {
        let _ = (tree, node, repeat);
    }
}

/// A depth-first walker over a [`Tree`]'s roots, with shared-subtree
/// dedup via a per-node visit count.
pub struct Traverser<'t> {
    tree: &'t Tree,
    visits: Vec<u32>,
}

impl<'t> Traverser<'t> {
    /// Create a traverser over `tree`. The visit-count table is sized to
    /// the tree's current arena length; nodes appended after this call are
    /// not addressable by it.
    pub fn new(tree: &'t Tree) -> Self {
        Traverser { tree, visits: vec![0; tree.len()] }
    }

    /// How many times `node` has been reached so far in this traverser's
    /// lifetime (across however many `walk` calls have run).
    pub fn visit_count(&self, node: NodeId) -> u32 {
        self.visits[node.index()]
    }

    /// Walk every declared root, in declaration order.
    pub fn walk_roots(&mut self, visitor: &mut impl Visitor) {
        for root in self.tree.roots().to_vec() {
            self.walk(root, visitor);
        }
    }

    /// Walk the subtree rooted at `node`.
    ///
    /// `LABEL`/`BRANCH` nodes are never descended into — their sole slot
    /// holds a label id, not a child offset, so there is nothing beneath
    /// them to walk.
    pub fn walk(&mut self, node: NodeId, visitor: &mut impl Visitor) {
        self.visits[node.index()] += 1;
        let repeat = self.visits[node.index()] > 1;

        let descend = visitor.pre(self.tree, node, repeat);
        if descend && !self.tree.op(node).is_label_like() {
            let children = self.tree.child_ids(node);
            for (i, child) in children.iter().enumerate() {
                self.walk(*child, visitor);
                if i + 1 < children.len() {
                    visitor.in_order(self.tree, node, i);
                }
            }
        }
        visitor.post(self.tree, node, repeat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::op::Op;

    #[derive(Default)]
    struct RecordingVisitor {
        pre_order: Vec<NodeId>,
        post_order: Vec<NodeId>,
    }

    impl Visitor for RecordingVisitor {
        fn pre(&mut self, _tree: &Tree, node: NodeId, _repeat: bool) -> bool {
            self.pre_order.push(node);
            true
        }
        fn post(&mut self, _tree: &Tree, node: NodeId, _repeat: bool) {
            self.post_order.push(node);
        }
    }

    #[test]
    fn preorder_visits_parent_before_children_postorder_after() {
        let mut tree = Tree::new();
        let a = tree.append_node(Op::Tc, &[], &[]).unwrap();
        let b = tree.append_node(Op::VmNull, &[], &[]).unwrap();
        let add = tree.append_node(Op::Add, &[a, b], &[]).unwrap();
        tree.declare_root(add);

        let mut v = RecordingVisitor::default();
        Traverser::new(&tree).walk_roots(&mut v);

        assert_eq!(v.pre_order, vec![add, a, b]);
        assert_eq!(v.post_order, vec![a, b, add]);
    }

    #[test]
    fn shared_subtree_is_flagged_as_a_repeat_on_its_second_visit() {
        let mut tree = Tree::new();
        let shared = tree.append_node(Op::Tc, &[], &[]).unwrap();
        let left = tree.append_node(Op::Copy, &[shared], &[]).unwrap();
        let right = tree.append_node(Op::Copy, &[shared], &[]).unwrap();
        let do_node = tree.append_node(Op::Do, &[left, right], &[]).unwrap();
        tree.declare_root(do_node);

        let mut traverser = Traverser::new(&tree);
        let mut repeats = Vec::new();
        struct Flagger<'a>(&'a mut Vec<NodeId>);
        impl Visitor for Flagger<'_> {
            fn pre(&mut self, _tree: &Tree, node: NodeId, repeat: bool) -> bool {
                if repeat {
                    self.0.push(node);
                }
                true
            }
        }
        traverser.walk_roots(&mut Flagger(&mut repeats));
        assert_eq!(repeats, vec![shared]);
        assert_eq!(traverser.visit_count(shared), 2);
    }

    #[test]
    fn default_pre_redescends_into_a_shared_subtrees_children_on_every_occurrence() {
        let mut tree = Tree::new();
        let leaf = tree.append_node(Op::Tc, &[], &[]).unwrap();
        let shared = tree.append_node(Op::Copy, &[leaf], &[]).unwrap();
        let left = tree.append_node(Op::Copy, &[shared], &[]).unwrap();
        let right = tree.append_node(Op::Copy, &[shared], &[]).unwrap();
        let do_node = tree.append_node(Op::Do, &[left, right], &[]).unwrap();
        tree.declare_root(do_node);

        let mut v = RecordingVisitor::default();
        Traverser::new(&tree).walk_roots(&mut v);

        // `shared` is a child of both `left` and `right`, so with no
        // visitor opting out, it (and its own child `leaf`) are walked
        // once per occurrence, not once overall.
        assert_eq!(v.pre_order, vec![do_node, left, shared, leaf, right, shared, leaf]);
    }

    #[test]
    fn a_visitor_can_opt_out_of_redescending_into_a_repeat() {
        let mut tree = Tree::new();
        let leaf = tree.append_node(Op::Tc, &[], &[]).unwrap();
        let shared = tree.append_node(Op::Copy, &[leaf], &[]).unwrap();
        let left = tree.append_node(Op::Copy, &[shared], &[]).unwrap();
        let right = tree.append_node(Op::Copy, &[shared], &[]).unwrap();
        let do_node = tree.append_node(Op::Do, &[left, right], &[]).unwrap();
        tree.declare_root(do_node);

        struct SkipRepeats(Vec<NodeId>);
        impl Visitor for SkipRepeats {
            fn pre(&mut self, _tree: &Tree, node: NodeId, repeat: bool) -> bool {
                self.0.push(node);
                !repeat
            }
        }
        let mut v = SkipRepeats(Vec::new());
        Traverser::new(&tree).walk_roots(&mut v);

        // `shared`'s second occurrence (via `right`) returns `false` from
        // `pre` since it's a repeat, so `leaf` is not walked a second time.
        assert_eq!(v.0, vec![do_node, left, shared, leaf, right, shared]);
    }

    #[test]
    fn label_like_nodes_are_never_descended_into() {
        let mut tree = Tree::new();
        let branch = tree.append_branch(3).unwrap();
        tree.declare_root(branch);
        let mut v = RecordingVisitor::default();
        Traverser::new(&tree).walk_roots(&mut v);
        assert_eq!(v.pre_order, vec![branch]);
        assert_eq!(v.post_order, vec![branch]);
    }
}
