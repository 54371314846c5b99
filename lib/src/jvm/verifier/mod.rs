//! Stack map frame computation
//!
//! For any specific instruction inside a method body, the stack and locals should have the same
//! structure, regardless of which control flow was used to reach that instruction. in other words:
//! although the values on the stack and in the locals may obviously be different, the types and
//! order of the stack and local variables cannot. This information is referred to as the _stack
//! map frame_ (represented using [`Frame`]) and the set of stack map frames for all possible jump
//! targets in a method is the _stack map table_.
//!
//! Frames are computed by abstract interpretation: the [`Interpreter`] simulates one instruction
//! on symbolic [`FrameValue`]s, and the [`Analyzer`] propagates the resulting frames along
//! fall-through, branch, and exception edges, merging them wherever control flow joins, until
//! nothing changes. Merging references needs to know the class hierarchy, which comes from a
//! [`TypeHierarchy`] (usually a [`crate::jvm::class_graph::ClassGraph`]).
//!
//! The converged frames at branch targets and handler entries are then encoded relative to each
//! other as [`StackMapFrame`]s, exactly as in the class file `StackMapTable` attribute.

mod analyzer;
mod frame;
mod hierarchy;
mod interpreter;
mod settings;
mod stack_map;
mod types;
mod value;

pub use analyzer::*;
pub use frame::*;
pub use hierarchy::*;
pub use interpreter::*;
pub use settings::*;
pub use stack_map::*;
pub use types::*;
pub use value::*;
