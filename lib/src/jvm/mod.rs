//! Compute stack map frames for JVM methods
//!
//! ### Simple example
//!
//! Consider the following static method:
//!
//! ```java,ignore,no_run
//! static int abs(int x) {
//!     if (x >= 0) return x;
//!     return -x;
//! }
//! ```
//!
//! The `ifge` jump lands on an instruction which can be reached from two places, so that
//! instruction needs a frame in the `StackMapTable`:
//!
//! ```
//! use stackmap::jvm::class_graph::{ClassGraph, ClassGraphArenas};
//! use stackmap::jvm::code::{Instruction, MethodBody, Opcode, Operand};
//! use stackmap::jvm::verifier::{analyze, AnalysisSettings, StackMapFrame};
//! use stackmap::jvm::*;
//!
//! # fn main() -> Result<(), Error> {
//! let class_graph_arenas = ClassGraphArenas::new();
//! let class_graph = ClassGraph::new(&class_graph_arenas);
//! class_graph.insert_java_library_types();
//!
//! let mut method = MethodBody::new(
//!     BinaryName::from_str("me/Example").map_err(Error::MalformedName)?,
//!     UnqualifiedName::from_str("abs").map_err(Error::MalformedName)?,
//!     MethodDescriptor::parse("(I)I")?,
//!     MethodAccessFlags::STATIC,
//! );
//!
//! let code = &mut method.instructions;
//! code.push(Instruction::simple(Opcode::ILoad0)?);
//! let jump = code.push(Instruction::simple(Opcode::Nop)?);
//! code.push(Instruction::simple(Opcode::ILoad0)?);
//! code.push(Instruction::simple(Opcode::INeg)?);
//! code.push(Instruction::simple(Opcode::IReturn)?);
//! let positive = code.push(Instruction::simple(Opcode::ILoad0)?);
//! code.push(Instruction::simple(Opcode::IReturn)?);
//!
//! // Swap in the real jump now that its target exists
//! code.insert_before(jump, Instruction::new(Opcode::IfGe, Operand::Branch(positive))?)?;
//! code.remove(jump)?;
//!
//! let analysis = analyze(&method, &class_graph, &AnalysisSettings::new())?;
//! assert_eq!(analysis.max_stack(), 1);
//! assert_eq!(
//!     analysis.stack_map_table()?,
//!     vec![StackMapFrame::SameLocalsNoStack { offset_delta: 7 }],
//! );
//! # Ok(())
//! # }
//! ```

mod access_flags;
mod binary_format;
pub mod class_graph;
pub mod code;
mod descriptors;
mod errors;
mod names;
pub mod verifier;

pub use access_flags::*;
pub use binary_format::*;
pub use descriptors::*;
pub use errors::*;
pub use names::*;
