//! Compile-time-constant IR fragments.
//!
//! A [`Template`] is a small, statically declared subtree that the
//! bytecode-to-tree lowering pass splices into a growing [`Tree`] in place
//! of one VM instruction — the same role `MVM_JIT_EXPR_TEMPLATE` macros play
//! in the original lowering tables. Each [`NodeTemplate`] in a template's
//! `nodes` list is a virtual node defined purely in terms of earlier
//! virtual nodes (`Operand::Internal`) and the caller's actual operands
//! (`Operand::External`); [`Template::expand`] walks the list once,
//! appending real nodes to `tree` and resolving references as it goes, and
//! returns the freshly appended root.

use crate::error::IrError;
use crate::ir::op::Op;
use crate::ir::tree::{NodeId, Tree, Word};

/// How a template's expanded root is meant to be consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionKind {
    /// The root is an ordinary value, safe to reference more than once
    /// (e.g. shared as a common subexpression).
    Value,
    /// Expanding this template consumes its operands destructively (for
    /// example, a template whose root is a `STORE`): the caller must not
    /// treat the expansion as a reusable value.
    Destructive,
}

/// A reference to one of a template's operands, as seen from a
/// [`NodeTemplate`]'s child list.
#[derive(Debug, Clone, Copy)]
pub enum Operand {
    /// An earlier virtual node within the same template, given as its
    /// index into [`Template::nodes`]. Must be less than the referencing
    /// node's own index — templates are defined leaves-first, exactly as
    /// [`Tree::append_node`] requires.
    Internal(usize),
    /// One of the real operands the caller supplies to
    /// [`Template::expand`], given as its index into that operand slice.
    External(usize),
}

/// One virtual node in a template's body.
#[derive(Debug, Clone, Copy)]
pub struct NodeTemplate {
    /// The opcode this virtual node expands to.
    pub op: Op,
    /// This node's children, each resolved to a real [`NodeId`] at
    /// expansion time.
    pub children: &'static [Operand],
    /// Literal parameter words, copied verbatim.
    pub params: &'static [Word],
}

/// A named, constant lowering fragment.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    /// Name used in error messages and trace output.
    pub name: &'static str,
    /// The template's virtual nodes, leaves first.
    pub nodes: &'static [NodeTemplate],
    /// Index into `nodes` of the template's root.
    pub root: usize,
    /// Whether the expanded root is reusable or consumed in place.
    pub kind: ExpansionKind,
}

impl Template {
    /// How many distinct external operand slots this template references.
    ///
    /// Slots must be referenced contiguously from `0`; this is the count
    /// [`Template::expand`] requires `operands` to match exactly.
    pub fn external_arity(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|c| match c {
                Operand::External(i) => Some(*i + 1),
                Operand::Internal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Splice this template into `tree`, substituting `operands` for its
    /// external references, and return the [`NodeId`] of the expanded root.
    ///
    /// `operands` must have exactly [`Template::external_arity`] entries;
    /// otherwise returns [`IrError::TemplateOperandCountMismatch`].
    pub fn expand(&self, tree: &mut Tree, operands: &[NodeId]) -> Result<NodeId, IrError> {
        let expected = self.external_arity();
        if operands.len() != expected {
            return Err(IrError::TemplateOperandCountMismatch {
                name: self.name.to_string(),
                expected,
                found: operands.len(),
            });
        }

        let mut resolved: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            let mut children = Vec::with_capacity(node.children.len());
            for operand in node.children {
                let id = match *operand {
                    Operand::Internal(j) => resolved[j]
                        .expect("template nodes must be defined leaves-first"),
                    Operand::External(j) => operands[j],
                };
                children.push(id);
            }
            let appended = tree.append_node(node.op, &children, node.params)?;
            resolved[i] = Some(appended);
        }

        Ok(resolved[self.root].expect("root index must be within nodes"))
    }
}
