//! The node-packed arena and the [`Tree`] that owns it.
//!
//! A node occupies a contiguous run of machine words: a header cell holding
//! its [`Op`], followed by its children (stored as [`NodeId`] offsets into
//! the same arena) and then its parameter words. Variadic operators
//! (`ALL`, `ANY`, `DO`, `ARGLIST`) additionally store their actual child
//! count as the word immediately after the header, before the children
//! themselves — see the width-invariant discussion in `DESIGN.md` for why
//! this crate resolves the ambiguity that way.
//!
//! A parallel `info` array, indexed by the same offsets as the arena, holds
//! everything that isn't part of the portable node shape: the originating
//! VM instruction, the assigned tile, and the register allocator's
//! [`ValueDescriptor`]. Only header offsets have an entry; every other
//! offset in a node's span is `None`.

use std::collections::HashSet;

use crate::consts::MAX_ARENA_WORDS;
use crate::error::IrError;
use crate::ir::op::{Op, ValueType};
use crate::ir::value::ValueDescriptor;

/// A machine word in the arena: wide enough to hold either an [`Op`]
/// discriminant, a child offset, or a 64-bit immediate parameter.
pub type Word = i64;

/// The offset, in arena words, of a node's header cell.
///
/// Doubles as the node's identity: two nodes compare equal iff they start at
/// the same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(u32);

impl NodeId {
    /// The offset this id addresses, as a `usize` index into the arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Everything about a node that lives outside the portable arena shape:
/// where it came from, how it was tiled, and where its value lives.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    /// The node's opcode, duplicated here for convenient lookup without
    /// re-reading the arena header cell.
    pub op: Op,
    /// Index of the VM bytecode instruction this node was lowered from, if
    /// any (synthetic nodes introduced by template expansion have none).
    pub vm_instruction: Option<u32>,
    /// The VM local slot this node reads or writes, for `LOCAL`-rooted
    /// address computations.
    pub vm_local: Option<u16>,
    /// Name of the tile the instruction selector matched at this node, once
    /// tiling has run.
    pub tile: Option<&'static str>,
    /// Tiler-internal cost/state annotation; meaning is owned by the tiler.
    pub tile_state: i32,
    /// Rule index within the matched tile, if the tile has more than one
    /// expansion rule.
    pub tile_rule: Option<u16>,
    /// For `LABEL` nodes, the label id they define.
    pub internal_label: Option<u32>,
    /// The register allocator's view of this node's result.
    pub value: ValueDescriptor,
}

impl NodeInfo {
    fn new(op: Op) -> Self {
        NodeInfo {
            op,
            vm_instruction: None,
            vm_local: None,
            tile: None,
            tile_state: 0,
            tile_rule: None,
            internal_label: None,
            value: ValueDescriptor::fresh(op.result_type()),
        }
    }
}

/// An expression DAG: a node-packed [`Word`] arena plus its declared roots
/// and per-node [`NodeInfo`].
///
/// Construction is append-only and bottom-up: children must already exist
/// in the arena before the node that references them is appended, so every
/// [`NodeId`] a caller holds is guaranteed to resolve.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    arena: Vec<Word>,
    info: Vec<Option<NodeInfo>>,
    roots: Vec<NodeId>,
    defined_labels: HashSet<u32>,
    referenced_labels: HashSet<u32>,
}

impl Tree {
    /// An empty tree with no nodes and no roots.
    pub fn new() -> Self {
        Tree::default()
    }

    /// Number of words currently occupied in the arena.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the arena holds no nodes yet.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// The roots declared so far, in declaration order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// The opcode stored at `node`'s header cell.
    pub fn op(&self, node: NodeId) -> Op {
        self.info(node).op
    }

    /// The [`NodeInfo`] for `node`.
    ///
    /// # Panics
    /// Panics if `node` is not a header offset this tree produced; this is
    /// an internal-consistency invariant, not a user-data error, since every
    /// [`NodeId`] in circulation was returned by this tree's own append
    /// methods.
    pub fn info(&self, node: NodeId) -> &NodeInfo {
        self.info[node.index()]
            .as_ref()
            .expect("NodeId must address a node header cell")
    }

    /// Mutable access to `node`'s [`NodeInfo`], for the tiler and register
    /// allocator to annotate.
    pub fn info_mut(&mut self, node: NodeId) -> &mut NodeInfo {
        self.info[node.index()]
            .as_mut()
            .expect("NodeId must address a node header cell")
    }

    /// The number of real children `node` has: the operator table's fixed
    /// arity, or the stored count for a variadic node.
    pub fn child_count(&self, node: NodeId) -> usize {
        let op = self.op(node);
        match op.info().nchild.fixed() {
            Some(n) => n,
            None => self.arena[node.index() + 1] as usize,
        }
    }

    /// `node`'s children, as offsets into this tree's arena.
    ///
    /// For `LABEL`/`BRANCH`, whose sole slot holds a label id rather than a
    /// node offset, this returns an empty vector — use [`Tree::label_id`]
    /// instead.
    pub fn child_ids(&self, node: NodeId) -> Vec<NodeId> {
        let op = self.op(node);
        if op.is_label_like() {
            return Vec::new();
        }
        let variadic = op.is_variadic();
        let base = node.index() + 1 + usize::from(variadic);
        let count = self.child_count(node);
        self.arena[base..base + count]
            .iter()
            .map(|&w| NodeId(w as u32))
            .collect()
    }

    /// `node`'s parameter words, following its children.
    pub fn params(&self, node: NodeId) -> &[Word] {
        let op = self.op(node);
        if op.is_label_like() {
            return &[];
        }
        let variadic = op.is_variadic();
        let count = self.child_count(node);
        let base = node.index() + 1 + usize::from(variadic) + count;
        &self.arena[base..base + op.info().nargs]
    }

    /// For `LABEL`/`BRANCH` nodes, the label id their sole slot carries.
    pub fn label_id(&self, node: NodeId) -> Option<u32> {
        let op = self.op(node);
        op.is_label_like().then(|| self.arena[node.index() + 1] as u32)
    }

    /// Total word count `node` occupies: `1 + nchild + nargs`, with the
    /// variadic extra count-word folded into `nchild` for this purpose.
    pub fn width(&self, node: NodeId) -> usize {
        let op = self.op(node);
        if op.is_label_like() {
            return 2;
        }
        let variadic = usize::from(op.is_variadic());
        1 + variadic + self.child_count(node) + op.info().nargs
    }

    fn reserve(&mut self, words: usize) -> Result<(), IrError> {
        let requested = self.arena.len() + words;
        if requested > MAX_ARENA_WORDS {
            return Err(IrError::ArenaCapacityExceeded { requested, capacity: MAX_ARENA_WORDS });
        }
        Ok(())
    }

    fn check_child(&self, node: NodeId, op: Op, child_index: usize, child: NodeId) -> Result<(), IrError> {
        if child.index() >= self.arena.len() || self.info[child.index()].is_none() {
            return Err(IrError::DanglingChildOffset { node, child_index, offset: child });
        }
        if let Some(expected) = op.expected_child_type(child_index) {
            let found = self.op(child).result_type();
            if found != expected {
                return Err(IrError::OperandTypeMismatch { node, op, child_index, expected, found });
            }
        }
        Ok(())
    }

    /// Append an ordinary (non-label-like) node.
    ///
    /// `children` must match the opcode's declared arity exactly for fixed
    /// ops; for variadic ops (`ALL`, `ANY`, `DO`, `ARGLIST`), any length is
    /// accepted and recorded as the stored count. `params` must have the
    /// length the operator table declares for `op`.
    pub fn append_node(&mut self, op: Op, children: &[NodeId], params: &[Word]) -> Result<NodeId, IrError> {
        debug_assert!(!op.is_label_like(), "use append_label/append_branch for {op:?}");
        let info = op.info();
        if let Some(expected) = info.nchild.fixed() {
            if children.len() != expected {
                return Err(IrError::ChildCountMismatch { op, expected, found: children.len() });
            }
        }
        debug_assert_eq!(params.len(), info.nargs, "{op:?} expects {} parameter words", info.nargs);

        let variadic = info.nchild.is_variadic();
        let width = 1 + usize::from(variadic) + children.len() + info.nargs;
        self.reserve(width)?;

        let header = NodeId(self.arena.len() as u32);
        // Validate children against the tree as it stands *before* we push
        // anything, so a rejected append leaves the arena untouched.
        for (i, &child) in children.iter().enumerate() {
            self.check_child(header, op, i, child)?;
        }

        self.arena.push(op as Word);
        self.info.push(Some(NodeInfo::new(op)));
        if variadic {
            self.arena.push(children.len() as Word);
            self.info.push(None);
        }
        for &child in children {
            self.arena.push(child.0 as Word);
            self.info.push(None);
        }
        for &param in params {
            self.arena.push(param);
            self.info.push(None);
        }
        Ok(header)
    }

    /// Append a `LABEL` node defining `label_id`.
    ///
    /// Returns [`IrError::DuplicateLabelDefinition`] if `label_id` was
    /// already defined by an earlier `LABEL` node in this tree.
    pub fn append_label(&mut self, label_id: u32) -> Result<NodeId, IrError> {
        if !self.defined_labels.insert(label_id) {
            return Err(IrError::DuplicateLabelDefinition(label_id));
        }
        self.reserve(2)?;
        let header = NodeId(self.arena.len() as u32);
        self.arena.push(Op::Label as Word);
        let mut info = NodeInfo::new(Op::Label);
        info.internal_label = Some(label_id);
        self.info.push(Some(info));
        self.arena.push(label_id as Word);
        self.info.push(None);
        Ok(header)
    }

    /// Append a `BRANCH` node referencing `label_id`.
    ///
    /// The reference is checked against defined labels lazily, by
    /// [`Tree::validate_labels`], since a forward branch to a label defined
    /// later in construction is legal.
    pub fn append_branch(&mut self, label_id: u32) -> Result<NodeId, IrError> {
        self.referenced_labels.insert(label_id);
        self.reserve(2)?;
        let header = NodeId(self.arena.len() as u32);
        self.arena.push(Op::Branch as Word);
        self.info.push(Some(NodeInfo::new(Op::Branch)));
        self.arena.push(label_id as Word);
        self.info.push(None);
        Ok(header)
    }

    /// Declare `node` as a root (an independently evaluated statement).
    pub fn declare_root(&mut self, node: NodeId) {
        self.roots.push(node);
    }

    /// Check that every label referenced by a `BRANCH` is defined by some
    /// `LABEL` node in this tree.
    ///
    /// Returns the first undefined reference found, if any; callers that
    /// need every offender can inspect `referenced_labels` directly via
    /// [`Tree::dangling_labels`].
    pub fn validate_labels(&self) -> Result<(), IrError> {
        for &label in self.dangling_labels() {
            return Err(IrError::UndefinedLabelReference(label));
        }
        Ok(())
    }

    /// Every label id referenced by a `BRANCH` but never defined by a
    /// `LABEL` in this tree.
    pub fn dangling_labels(&self) -> Vec<u32> {
        itertools::sorted(self.referenced_labels.difference(&self.defined_labels).copied())
            .collect()
    }

    /// The raw `Void`-excluding result type of `node`.
    pub fn result_type(&self, node: NodeId) -> ValueType {
        self.op(node).result_type()
    }
}
