//! Method bytecode: the opcode catalog, decoded instructions, and method bodies
//!
//! Instructions are stored in an [`InstructionSequence`], which hands out stable [`InsnId`]s.
//! Branch targets, exception handler ranges, and local variable ranges all refer to instructions
//! by id rather than by offset, so that the sequence can be edited without having to patch up
//! every reference.

mod decode;
mod instruction;
mod method_body;
mod opcodes;
mod sequence;

pub use decode::*;
pub use instruction::*;
pub use method_body::*;
pub use opcodes::*;
pub use sequence::*;
