//! Native Call Bridge
//!
//! Host operations exposed to interpreted code:
//! - `NativeFunction`: declared signature plus host implementation
//! - `NativeRegistry`: explicit (namespace, name, arity) table and the
//!   error boundary every call passes through
//! - Built-in markup, document and string operations

mod builtins;
pub mod function;
pub mod registry;

pub use function::{NativeArgs, NativeFnInner, NativeFunction, NativeResult};
pub use registry::NativeRegistry;
