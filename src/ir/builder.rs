//! An ergonomic facade over [`Tree`]'s raw arena API.
//!
//! `Tree::append_node` is deliberately low-level — it is the boundary every
//! invariant check runs at. `Builder` wraps a `&mut Tree` with named
//! constructors so lowering code reads like the operation it's building
//! rather than like arena bookkeeping, the same division of labor the
//! teacher draws between its raw instruction executors and its
//! higher-level interpreter constructors.

use crate::error::IrError;
use crate::ir::op::Op;
use crate::ir::tree::{NodeId, Tree, Word};

/// A thin, method-per-opcode wrapper around a [`Tree`] under construction.
pub struct Builder<'t> {
    tree: &'t mut Tree,
}

impl<'t> Builder<'t> {
    /// Borrow `tree` for building.
    pub fn new(tree: &'t mut Tree) -> Self {
        Builder { tree }
    }

    /// The tree being built, for operations the builder doesn't wrap.
    pub fn tree(&mut self) -> &mut Tree {
        self.tree
    }

    /// Declare `node` as a root statement.
    pub fn root(&mut self, node: NodeId) -> &mut Self {
        self.tree.declare_root(node);
        self
    }

    /// `TC` — the current thread context.
    pub fn tc(&mut self) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Tc, &[], &[])
    }

    /// `CU` — the current compilation unit.
    pub fn cu(&mut self) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Cu, &[], &[])
    }

    /// `FRAME` — the current call frame.
    pub fn frame(&mut self) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Frame, &[], &[])
    }

    /// `LOCAL` — the base address of the local register file.
    pub fn local(&mut self) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Local, &[], &[])
    }

    /// `STACK` — the base address of the argument/work stack.
    pub fn stack(&mut self) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Stack, &[], &[])
    }

    /// `VMNULL` — the VM's null/undef sentinel value.
    pub fn vmnull(&mut self) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::VmNull, &[], &[])
    }

    /// `CONST` — a folded immediate, tagged with its size in bytes.
    pub fn constant(&mut self, value: Word, size_bytes: Word) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Const, &[], &[value, size_bytes])
    }

    /// `ADDR` — fold a byte `offset` onto a memory-typed `base`.
    pub fn addr(&mut self, base: NodeId, offset: Word) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Addr, &[base], &[offset])
    }

    /// `IDX` — scale `index` and add it to a memory-typed `base`.
    pub fn idx(&mut self, base: NodeId, index: NodeId, scale: Word) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Idx, &[base, index], &[scale])
    }

    /// `LOAD` — read `size_bytes` from a memory-typed `addr`.
    pub fn load(&mut self, addr: NodeId, size_bytes: Word) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Load, &[addr], &[size_bytes])
    }

    /// `STORE` — write `value` to a memory-typed `addr`.
    pub fn store(&mut self, addr: NodeId, value: NodeId, size_bytes: Word) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Store, &[addr, value], &[size_bytes])
    }

    /// `COPY` — duplicate a register-typed value into a fresh node.
    pub fn copy(&mut self, value: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Copy, &[value], &[])
    }

    /// `CONVERT` — reinterpret `value` from one value type to another.
    pub fn convert(
        &mut self,
        value: NodeId,
        from: Word,
        to: Word,
    ) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Convert, &[value], &[from, to])
    }

    /// Binary arithmetic/bitwise helper shared by `add`/`sub`/`and`/`or`/`xor`.
    fn binary(&mut self, op: Op, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(op, &[left, right], &[])
    }

    /// `ADD`.
    pub fn add(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.binary(Op::Add, left, right)
    }

    /// `SUB`.
    pub fn sub(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.binary(Op::Sub, left, right)
    }

    /// `AND`.
    pub fn and(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.binary(Op::And, left, right)
    }

    /// `OR`.
    pub fn or(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.binary(Op::Or, left, right)
    }

    /// `XOR`.
    pub fn xor(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.binary(Op::Xor, left, right)
    }

    /// `NOT`.
    pub fn not(&mut self, value: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Not, &[value], &[])
    }

    /// Comparison helper shared by `lt`/`le`/`eq`/`ne`/`ge`/`gt`.
    fn compare(&mut self, op: Op, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(op, &[left, right], &[])
    }

    /// `LT`.
    pub fn lt(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.compare(Op::Lt, left, right)
    }

    /// `LE`.
    pub fn le(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.compare(Op::Le, left, right)
    }

    /// `EQ`.
    pub fn eq(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.compare(Op::Eq, left, right)
    }

    /// `NE`.
    pub fn ne(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.compare(Op::Ne, left, right)
    }

    /// `GE`.
    pub fn ge(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.compare(Op::Ge, left, right)
    }

    /// `GT`.
    pub fn gt(&mut self, left: NodeId, right: NodeId) -> Result<NodeId, IrError> {
        self.compare(Op::Gt, left, right)
    }

    /// `NZ` — true iff `value` is nonzero.
    pub fn nz(&mut self, value: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Nz, &[value], &[])
    }

    /// `ZR` — true iff `value` is zero.
    pub fn zr(&mut self, value: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Zr, &[value], &[])
    }

    /// `FLAGVAL` — materialize a condition flag as a 0/1 register value.
    pub fn flag_val(&mut self, flag: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::FlagVal, &[flag], &[])
    }

    /// `ALL` — short-circuiting conjunction of flag-typed `conditions`.
    pub fn all(&mut self, conditions: &[NodeId]) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::All, conditions, &[])
    }

    /// `ANY` — short-circuiting disjunction of flag-typed `conditions`.
    pub fn any(&mut self, conditions: &[NodeId]) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Any, conditions, &[])
    }

    /// `DO` — evaluate `statements` in order, yielding the last one's value.
    pub fn do_seq(&mut self, statements: &[NodeId]) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Do, statements, &[])
    }

    /// `WHEN` — evaluate `body` only `condition` holds; void result.
    pub fn when(&mut self, condition: NodeId, body: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::When, &[condition, body], &[])
    }

    /// `IF` — evaluate `then_branch` or `else_branch` depending on
    /// `condition`, yielding whichever ran.
    pub fn if_(
        &mut self,
        condition: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    ) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::If, &[condition, then_branch, else_branch], &[])
    }

    /// `EITHER` — like `if_`, but void: chosen purely for its side effects.
    pub fn either(
        &mut self,
        condition: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    ) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Either, &[condition, then_branch, else_branch], &[])
    }

    /// `LABEL` — define `label_id` at this point in the tree.
    pub fn label(&mut self, label_id: u32) -> Result<NodeId, IrError> {
        self.tree.append_label(label_id)
    }

    /// `BRANCH` — jump to `label_id`.
    pub fn branch(&mut self, label_id: u32) -> Result<NodeId, IrError> {
        self.tree.append_branch(label_id)
    }

    /// `INVOKISH` — a call that may trigger a VM-level invocation.
    pub fn invokish(&mut self, call: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Invokish, &[call], &[])
    }

    /// `THROWISH` — a call that may unwind the current frame.
    pub fn throwish(&mut self, call: NodeId) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Throwish, &[call], &[])
    }

    /// `CARG` — wrap one argument for an upcoming `CALL`'s `ARGLIST`.
    pub fn carg(&mut self, value: NodeId, type_tag: Word) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::CArg, &[value], &[type_tag])
    }

    /// `ARGLIST` — collect `args` (each already wrapped via `carg`) for a
    /// `CALL`.
    pub fn arglist(&mut self, args: &[NodeId]) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::ArgList, args, &[])
    }

    /// `CALL` — invoke the C function at `target` with `args` (an
    /// `ARGLIST` node), tagged with the expected return type.
    pub fn call(&mut self, target: NodeId, args: NodeId, return_type: Word) -> Result<NodeId, IrError> {
        self.tree.append_node(Op::Call, &[target, args], &[return_type])
    }
}
