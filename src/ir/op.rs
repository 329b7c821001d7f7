//! The operator table: the closed set of expression-tree opcodes and the
//! static metadata (child count, parameter count, result type) the rest of
//! the crate keys off.

use strum::{EnumCount, EnumIter};

/// The result an opcode's evaluation yields, consumed by the tiler and the
/// register allocator to decide how a node's value is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// No value; evaluated purely for side effects.
    Void,
    /// A register-sized scalar.
    Reg,
    /// A memory location / effective address.
    Mem,
    /// A condition flag.
    Flag,
    /// A label.
    Lbl,
    /// An integer constant.
    Int,
    /// A floating-point constant.
    Num,
    /// A raw pointer.
    Ptr,
}

/// Number of children an opcode takes.
///
/// `Fixed(n)` is the common case. `Variadic` marks `ALL`, `ANY`, `DO`, and
/// `ARGLIST`, whose actual child count is not known statically — it is
/// stored as the node's first parameter word (see
/// [`crate::ir::tree::Tree::child_count`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// A statically known number of children.
    Fixed(usize),
    /// Child count is carried in the node's first parameter word.
    Variadic,
}

impl Arity {
    /// The statically known count, if any.
    pub const fn fixed(self) -> Option<usize> {
        match self {
            Arity::Fixed(n) => Some(n),
            Arity::Variadic => None,
        }
    }

    /// Whether this is the variadic marker.
    pub const fn is_variadic(self) -> bool {
        matches!(self, Arity::Variadic)
    }
}

/// The expression-tree opcodes.
///
/// This is the closed catalog from the original design: each variant's
/// arity and result type are fixed by [`Op::info`] and never vary at
/// runtime. `Op` is the header word stored in a node's first arena cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Op {
    // Memory access
    Load,
    Store,
    Const,
    Addr,
    Idx,
    Copy,

    // Type conversion
    Convert,

    // Integer comparison
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    Nz,
    Zr,

    // Flag materialization
    FlagVal,

    // Integer arithmetic
    Add,
    Sub,

    // Bitwise operations
    And,
    Or,
    Xor,

    // Boolean logic
    Not,
    All,
    Any,

    // Control operators
    Do,
    When,
    If,
    Either,
    Branch,
    Label,

    // Special control operators
    Invokish,
    Throwish,

    // C-call
    Call,
    ArgList,
    CArg,

    // Interpreter special variables
    Tc,
    Cu,
    Frame,
    Local,
    Stack,
    VmNull,
}

/// Static per-opcode metadata: name, arity, parameter-word count, and result
/// type. The operator table is just [`Op::info`] — a `const fn` match, so
/// lookup is O(1) and needs no initialization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    /// The opcode's name, as it appears in traces and pretty-printed trees.
    pub name: &'static str,
    /// Number of children.
    pub nchild: Arity,
    /// Number of parameter words (following the children).
    pub nargs: usize,
    /// The value type this opcode's evaluation produces.
    pub result: ValueType,
}

impl Op {
    /// Look up this opcode's static metadata.
    ///
    /// This is the operator table's only public operation: callers treat it
    /// as a constant, O(1) lookup keyed by the opcode stored in a node's
    /// header cell.
    pub const fn info(self) -> OpInfo {
        use Arity::{Fixed, Variadic};
        use ValueType::*;
        match self {
            Op::Load => OpInfo { name: "LOAD", nchild: Fixed(1), nargs: 1, result: Reg },
            Op::Store => OpInfo { name: "STORE", nchild: Fixed(2), nargs: 1, result: Void },
            Op::Const => OpInfo { name: "CONST", nchild: Fixed(0), nargs: 2, result: Reg },
            Op::Addr => OpInfo { name: "ADDR", nchild: Fixed(1), nargs: 1, result: Mem },
            Op::Idx => OpInfo { name: "IDX", nchild: Fixed(2), nargs: 1, result: Mem },
            Op::Copy => OpInfo { name: "COPY", nchild: Fixed(1), nargs: 0, result: Reg },

            Op::Convert => OpInfo { name: "CONVERT", nchild: Fixed(1), nargs: 2, result: Reg },

            Op::Lt => OpInfo { name: "LT", nchild: Fixed(2), nargs: 0, result: Flag },
            Op::Le => OpInfo { name: "LE", nchild: Fixed(2), nargs: 0, result: Flag },
            Op::Eq => OpInfo { name: "EQ", nchild: Fixed(2), nargs: 0, result: Flag },
            Op::Ne => OpInfo { name: "NE", nchild: Fixed(2), nargs: 0, result: Flag },
            Op::Ge => OpInfo { name: "GE", nchild: Fixed(2), nargs: 0, result: Flag },
            Op::Gt => OpInfo { name: "GT", nchild: Fixed(2), nargs: 0, result: Flag },
            Op::Nz => OpInfo { name: "NZ", nchild: Fixed(1), nargs: 0, result: Flag },
            Op::Zr => OpInfo { name: "ZR", nchild: Fixed(1), nargs: 0, result: Flag },

            Op::FlagVal => OpInfo { name: "FLAGVAL", nchild: Fixed(1), nargs: 0, result: Reg },

            Op::Add => OpInfo { name: "ADD", nchild: Fixed(2), nargs: 0, result: Reg },
            Op::Sub => OpInfo { name: "SUB", nchild: Fixed(2), nargs: 0, result: Reg },

            Op::And => OpInfo { name: "AND", nchild: Fixed(2), nargs: 0, result: Reg },
            Op::Or => OpInfo { name: "OR", nchild: Fixed(2), nargs: 0, result: Reg },
            Op::Xor => OpInfo { name: "XOR", nchild: Fixed(2), nargs: 0, result: Reg },

            Op::Not => OpInfo { name: "NOT", nchild: Fixed(1), nargs: 0, result: Reg },
            Op::All => OpInfo { name: "ALL", nchild: Variadic, nargs: 0, result: Flag },
            Op::Any => OpInfo { name: "ANY", nchild: Variadic, nargs: 0, result: Flag },

            Op::Do => OpInfo { name: "DO", nchild: Variadic, nargs: 0, result: Reg },
            Op::When => OpInfo { name: "WHEN", nchild: Fixed(2), nargs: 0, result: Void },
            Op::If => OpInfo { name: "IF", nchild: Fixed(3), nargs: 0, result: Reg },
            Op::Either => OpInfo { name: "EITHER", nchild: Fixed(3), nargs: 0, result: Void },
            Op::Branch => OpInfo { name: "BRANCH", nchild: Fixed(1), nargs: 0, result: Void },
            Op::Label => OpInfo { name: "LABEL", nchild: Fixed(1), nargs: 0, result: Void },

            Op::Invokish => OpInfo { name: "INVOKISH", nchild: Fixed(1), nargs: 0, result: Void },
            Op::Throwish => OpInfo { name: "THROWISH", nchild: Fixed(1), nargs: 0, result: Void },

            Op::Call => OpInfo { name: "CALL", nchild: Fixed(2), nargs: 1, result: Reg },
            Op::ArgList => OpInfo { name: "ARGLIST", nchild: Variadic, nargs: 0, result: Void },
            Op::CArg => OpInfo { name: "CARG", nchild: Fixed(1), nargs: 1, result: Void },

            Op::Tc => OpInfo { name: "TC", nchild: Fixed(0), nargs: 0, result: Reg },
            Op::Cu => OpInfo { name: "CU", nchild: Fixed(0), nargs: 0, result: Mem },
            Op::Frame => OpInfo { name: "FRAME", nchild: Fixed(0), nargs: 0, result: Mem },
            Op::Local => OpInfo { name: "LOCAL", nchild: Fixed(0), nargs: 0, result: Mem },
            Op::Stack => OpInfo { name: "STACK", nchild: Fixed(0), nargs: 0, result: Mem },
            Op::VmNull => OpInfo { name: "VMNULL", nchild: Fixed(0), nargs: 0, result: Reg },
        }
    }

    /// The opcode's name, as it appears in traces and pretty-printed trees.
    pub const fn name(self) -> &'static str {
        self.info().name
    }

    /// The value type this opcode's evaluation produces.
    pub const fn result_type(self) -> ValueType {
        self.info().result
    }

    /// Whether this opcode takes a variadic child list (`ALL`, `ANY`, `DO`,
    /// `ARGLIST`).
    pub const fn is_variadic(self) -> bool {
        self.info().nchild.is_variadic()
    }

    /// Whether this opcode's sole child slot actually holds a label id
    /// rather than a node offset (`LABEL`, `BRANCH`). Such a slot is never
    /// descended by the traverser and is never type-checked against the
    /// operator table.
    pub const fn is_label_like(self) -> bool {
        matches!(self, Op::Label | Op::Branch)
    }

    /// The expected result type of the child at `child_index`, if the
    /// operator table constrains it.
    ///
    /// Only a handful of positions are constrained: the address operand of
    /// `LOAD`/`STORE`/`ADDR`/`IDX`, and the condition operand of
    /// `IF`/`WHEN`/`EITHER`. Every other position accepts anything but
    /// `Void` (checked separately by the caller).
    pub const fn expected_child_type(self, child_index: usize) -> Option<ValueType> {
        match (self, child_index) {
            (Op::Load, 0) | (Op::Addr, 0) | (Op::Idx, 0) | (Op::Store, 0) => {
                Some(ValueType::Mem)
            }
            (Op::If, 0) | (Op::When, 0) | (Op::Either, 0) => Some(ValueType::Flag),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_opcode_has_a_name_matching_its_source_spelling() {
        for op in Op::iter() {
            assert_eq!(op.name(), op.info().name);
            assert!(op.name().chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn variadic_ops_are_exactly_all_any_do_arglist() {
        let variadic: Vec<Op> = Op::iter().filter(|op| op.is_variadic()).collect();
        assert_eq!(
            variadic,
            vec![Op::All, Op::Any, Op::Do, Op::ArgList]
        );
    }

    #[test]
    fn width_rule_matches_fixed_arity_and_param_count() {
        let info = Op::Add.info();
        assert_eq!(info.nchild.fixed(), Some(2));
        assert_eq!(info.nargs, 0);
        assert_eq!(info.result, ValueType::Reg);
    }

    #[test]
    fn label_and_branch_are_not_type_checked_as_ordinary_children() {
        assert!(Op::Label.is_label_like());
        assert!(Op::Branch.is_label_like());
        assert!(!Op::Load.is_label_like());
    }

    #[test]
    fn op_count_matches_the_catalog_size() {
        assert_eq!(Op::COUNT, 41);
    }
}
