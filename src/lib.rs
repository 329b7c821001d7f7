//! Expression-tree intermediate representation for a dynamic-language JIT
//! front-end, plus a low-overhead multi-threaded profiling ring buffer.
//!
//! The [`ir`] module is the primary deliverable: a node-packed arena
//! representation of an expression DAG ([`ir::tree::Tree`]), the static
//! [`ir::op::Op`] catalog that drives its typing discipline, a multi-order
//! [`ir::traverse::Traverser`], and the [`ir::template`] expansion mechanism
//! the upstream bytecode-to-graph lowering uses to splice in IR fragments.
//!
//! The [`telemetry`] module is an independent, secondary core: a
//! lock-striped multi-producer/single-consumer ring buffer of timestamped
//! events, backed by TSC calibration and a background drain thread.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod consts;
pub mod error;
pub mod ir;
pub mod telemetry;

pub mod prelude {
    //! Convenience re-exports of the most commonly used types.

    pub use crate::error::IrError;
    pub use crate::ir::builder::Builder;
    pub use crate::ir::op::{Op, OpInfo, ValueType};
    pub use crate::ir::template::Template;
    pub use crate::ir::traverse::Traverser;
    pub use crate::ir::tree::{NodeId, Tree};
    pub use crate::ir::value::{ValueDescriptor, ValueState};
    pub use crate::telemetry::{Telemetry, TelemetryConfig};
}
