//! Construction and allocation error types.
//!
//! Mirrors the split the original interpreter draws between well-formed,
//! recoverable conditions and conditions that must abort the current
//! compilation attempt: every variant here is fatal to the tree under
//! construction, never a panic. Callers decide whether to fall back to the
//! interpreter path.

use crate::ir::op::{Op, ValueType};
use crate::ir::tree::NodeId;
use crate::ir::value::ValueState;
use thiserror::Error;

/// Errors raised while building or expanding an expression tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IrError {
    /// A child offset did not match the expected operand type of its parent.
    #[error(
        "node {node:?} ({op:?}) expected a {expected:?}-typed operand at child {child_index}, found {found:?}"
    )]
    OperandTypeMismatch {
        /// The parent node.
        node: NodeId,
        /// The parent's opcode.
        op: Op,
        /// Index of the offending child.
        child_index: usize,
        /// The operand type the opcode requires at this position.
        expected: ValueType,
        /// The result type the supplied child actually produces.
        found: ValueType,
    },

    /// The number of children supplied did not match the opcode's arity.
    #[error("node {op:?} expects {expected} children, got {found}")]
    ChildCountMismatch {
        /// The opcode being constructed.
        op: Op,
        /// Children required by the operator table (or, for variadic ops,
        /// implied by the caller-supplied count).
        expected: usize,
        /// Children actually supplied.
        found: usize,
    },

    /// A child offset does not address a node already present in the arena.
    #[error("node {node:?} has a dangling child offset {offset:?} at position {child_index}")]
    DanglingChildOffset {
        /// The parent node.
        node: NodeId,
        /// Index of the offending child.
        child_index: usize,
        /// The offset that does not resolve to a prior node.
        offset: NodeId,
    },

    /// The same label id was defined by more than one `LABEL` node.
    #[error("label {0} is defined more than once")]
    DuplicateLabelDefinition(u32),

    /// A `BRANCH` referenced a label id that no `LABEL` node ever defines.
    #[error("label {0} is never defined")]
    UndefinedLabelReference(u32),

    /// The arena grew past [`crate::consts::MAX_ARENA_WORDS`].
    #[error("arena capacity exceeded: requested {requested} words, capacity is {capacity}")]
    ArenaCapacityExceeded {
        /// Words the failing append would have required.
        requested: usize,
        /// The configured ceiling.
        capacity: usize,
    },

    /// The register allocator attempted a forbidden value-descriptor state
    /// transition (see the state machine in [`crate::ir::value`]).
    #[error("illegal value descriptor transition from {from:?} to {to:?}")]
    InvalidValueTransition {
        /// The state the descriptor was in.
        from: ValueState,
        /// The state the caller attempted to move it to.
        to: ValueState,
    },

    /// `expand` was asked to splice a template whose external operand
    /// indices don't match the number of operands supplied by the caller.
    #[error("template {name} expects {expected} external operands, got {found}")]
    TemplateOperandCountMismatch {
        /// The template's descriptive name.
        name: String,
        /// Number of external operand slots in the template.
        expected: usize,
        /// Number of operands supplied by the caller.
        found: usize,
    },
}
