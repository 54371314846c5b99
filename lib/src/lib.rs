//! Compute the stack map frames of JVM method bodies
//!
//! Given a decoded method body (instructions, exception handlers, declared parameter types and
//! local variable live ranges), [`jvm::verifier::Analyzer`] runs a fixpoint abstract
//! interpretation over the control flow graph and produces the verification types held in local
//! variables and on the operand stack at every merge point, already compressed into the same
//! delta form used by the `StackMapTable` attribute.

pub mod jvm;
pub mod util;
