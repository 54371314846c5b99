use super::code::InsnId;
use super::{BinaryName, Name};

#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),

    /// A class or member name failed validation
    MalformedName(String),

    /// A field or method descriptor could not be parsed
    MalformedDescriptor(String),

    /// Opcode byte (or `wide`-prefixed pair) which is not in the instruction catalog
    UnknownOpcode { offset: usize, opcode: u16 },

    /// Code array ends in the middle of an instruction
    TruncatedCode { offset: usize },

    /// A branch offset does not land on the start of an instruction
    InvalidBranchOffset { offset: usize, target: isize },

    /// Instruction operand does not have the shape its opcode requires
    OperandMismatch {
        opcode: &'static str,
        expected: &'static str,
    },

    /// Instruction id that is not part of the sequence (or was removed from it)
    UnknownInstruction(InsnId),

    /// Exception handler whose try range or entry point is not in the sequence
    MissingHandlerInstruction { handler_index: usize },

    /// Abstract interpretation of an instruction failed
    AnalysisError {
        offset: usize,
        opcode: &'static str,
        kind: AnalysisErrorKind,
    },

    /// Two paths into the same instruction disagree on the stack height
    InconsistentStackHeight {
        offset: usize,
        expected: usize,
        found: usize,
    },

    /// Control can fall through the last instruction of the method
    FallsOffEnd { offset: usize },

    /// An instruction was revisited more times than the analysis settings allow
    IterationLimit { offset: usize, visits: usize },

    /// Gap between two frames does not fit in a `u16` offset delta
    OffsetDeltaOverflow { offset: usize },

    /// Two frames were recorded for the same offset
    ConflictingFrames { offset: usize },

    MissingClass(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}

impl Error {
    /// Missing class, by name
    pub fn missing_class(name: &BinaryName) -> Error {
        Error::MissingClass(name.as_str().to_owned())
    }
}

/// Ways in which interpreting a single instruction can fail
///
/// These get wrapped into [`Error::AnalysisError`] along with the offset and opcode of the
/// instruction being interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    /// Popped from an empty operand stack
    EmptyStack,

    /// Expected a value of this width in slots
    InvalidWidth(usize),

    /// The instruction does not carry the operand it needs
    MissingOperand,

    /// Constructor invocation arguments disagree with the method descriptor
    ConstructorArity { expected: usize, found: usize },

    /// `invokespecial <init>` on a receiver which is not an uninitialized value
    UninitializedReceiver,

    /// Local variable index outside of what the frame can hold
    InvalidLocal(u16),

    /// `ldc` of a constant which cannot be loaded with that opcode
    NotLoadableConstant,
}
