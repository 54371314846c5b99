use super::{InsnId, InstructionSequence};
use crate::jvm::{
    BinaryName, Error, FieldType, MethodAccessFlags, MethodDescriptor, UnqualifiedName,
};

/// Exception handler protecting a range of instructions
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExceptionHandler {
    /// First protected instruction
    pub try_start: InsnId,

    /// Last protected instruction (inclusive)
    pub try_end: InsnId,

    /// First instruction of the handler
    pub handler: InsnId,

    /// Caught exception type (`None` catches everything)
    pub catch_type: Option<BinaryName>,
}

impl ExceptionHandler {
    /// Type of the exception value on the stack when the handler is entered
    pub fn caught_type(&self) -> BinaryName {
        self.catch_type.clone().unwrap_or(BinaryName::THROWABLE)
    }
}

/// Exception handler whose instructions have been resolved to offsets
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HandlerRange {
    pub start_offset: usize,
    pub end_offset: usize,
    pub handler: InsnId,
    pub handler_offset: usize,
    pub catch_type: BinaryName,
}

impl HandlerRange {
    pub fn protects(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset <= self.end_offset
    }
}

/// Entry in the local variable table: a slot which is live over a range of instructions
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LocalVariable {
    pub slot: u16,

    /// First instruction where the variable is in scope
    pub start: InsnId,

    /// Last instruction where the variable is in scope (inclusive)
    pub end: InsnId,

    pub name: UnqualifiedName,
    pub descriptor: FieldType<BinaryName>,
}

/// Everything about a method needed to compute its frames
pub struct MethodBody {
    pub declaring_class: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,
    pub access_flags: MethodAccessFlags,
    pub instructions: InstructionSequence,
    pub exception_handlers: Vec<ExceptionHandler>,
    pub local_variables: Vec<LocalVariable>,
}

impl MethodBody {
    /// Method body with no instructions, handlers, or local variable information yet
    pub fn new(
        declaring_class: BinaryName,
        name: UnqualifiedName,
        descriptor: MethodDescriptor<BinaryName>,
        access_flags: MethodAccessFlags,
    ) -> MethodBody {
        MethodBody {
            declaring_class,
            name,
            descriptor,
            access_flags,
            instructions: InstructionSequence::new(),
            exception_handlers: vec![],
            local_variables: vec![],
        }
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == UnqualifiedName::INIT
    }

    /// Resolve the exception handlers against the current instruction offsets
    pub fn handler_ranges(&self) -> Result<Vec<HandlerRange>, Error> {
        self.exception_handlers
            .iter()
            .enumerate()
            .map(|(handler_index, handler)| {
                let missing = |_| Error::MissingHandlerInstruction { handler_index };
                let start_offset = self.instructions.offset(handler.try_start).map_err(missing)?;
                let end_offset = self.instructions.offset(handler.try_end).map_err(missing)?;
                let handler_offset = self.instructions.offset(handler.handler).map_err(missing)?;
                if end_offset < start_offset {
                    return Err(Error::MissingHandlerInstruction { handler_index });
                }
                Ok(HandlerRange {
                    start_offset,
                    end_offset,
                    handler: handler.handler,
                    handler_offset,
                    catch_type: handler.caught_type(),
                })
            })
            .collect()
    }

    /// Resolve local variable live ranges to `(slot, first offset, last offset)`
    ///
    /// Entries whose instructions are no longer in the sequence are dropped.
    pub fn local_ranges(&self) -> Vec<(u16, usize, usize)> {
        self.local_variables
            .iter()
            .filter_map(|local| {
                let start = self.instructions.offset(local.start).ok()?;
                let end = self.instructions.offset(local.end).ok()?;
                Some((local.slot, start, end))
            })
            .collect()
    }
}
