use super::{
    CallSiteRef, Constant, ExceptionHandler, FieldRef, InsnId, Instruction, InstructionSequence,
    LocalVariable, MethodRef, Opcode, Operand, OperandKind, SwitchTable,
};
use crate::jvm::{BaseType, BinaryName, Error, FieldType, RefType, UnqualifiedName};
use byteorder::{BigEndian, ReadBytesExt};
use std::collections::HashMap;
use std::io::{Cursor, ErrorKind};

/// Source of resolved constant pool entries
///
/// Parsing the constant pool itself is left to the caller: the decoder only needs typed views of
/// the entries that instructions refer to.
pub trait ConstantPoolResolver {
    /// Loadable constant (target of `ldc`, `ldc_w`, `ldc2_w`)
    fn constant(&self, index: u16) -> Result<Constant, Error>;

    /// Class reference (`new`, `anewarray`, `checkcast`, `instanceof`, `multianewarray`)
    fn class(&self, index: u16) -> Result<RefType<BinaryName>, Error>;

    fn field(&self, index: u16) -> Result<FieldRef, Error>;

    /// Method or interface method reference
    fn method(&self, index: u16) -> Result<MethodRef, Error>;

    /// `InvokeDynamic` entry
    fn call_site(&self, index: u16) -> Result<CallSiteRef, Error>;
}

/// Operand with branch targets still expressed as absolute offsets
enum PendingOperand {
    Ready(Operand),
    Branch(isize),
    Switch {
        default: isize,
        cases: Vec<(i32, isize)>,
    },
}

struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
    insn_offset: usize,
}

impl<'a> Reader<'a> {
    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn truncated(&self, err: std::io::Error) -> Error {
        if err.kind() == ErrorKind::UnexpectedEof {
            Error::TruncatedCode {
                offset: self.insn_offset,
            }
        } else {
            Error::IoError(err)
        }
    }

    fn u8(&mut self) -> Result<u8, Error> {
        self.cursor.read_u8().map_err(|err| self.truncated(err))
    }

    fn i8(&mut self) -> Result<i8, Error> {
        self.cursor.read_i8().map_err(|err| self.truncated(err))
    }

    fn u16(&mut self) -> Result<u16, Error> {
        self.cursor
            .read_u16::<BigEndian>()
            .map_err(|err| self.truncated(err))
    }

    fn i16(&mut self) -> Result<i16, Error> {
        self.cursor
            .read_i16::<BigEndian>()
            .map_err(|err| self.truncated(err))
    }

    fn i32(&mut self) -> Result<i32, Error> {
        self.cursor
            .read_i32::<BigEndian>()
            .map_err(|err| self.truncated(err))
    }

    fn relative(&self, delta: i32) -> isize {
        self.insn_offset as isize + delta as isize
    }
}

/// Decode a `Code` attribute's bytecode array into an instruction sequence
///
/// Branch offsets are resolved into instruction ids. Any branch that does not land exactly on an
/// instruction boundary is rejected.
pub fn decode_code<P: ConstantPoolResolver>(
    code: &[u8],
    pool: &P,
) -> Result<InstructionSequence, Error> {
    let mut reader = Reader {
        cursor: Cursor::new(code),
        insn_offset: 0,
    };

    let mut pending: Vec<(usize, Opcode, PendingOperand)> = vec![];
    while reader.position() < code.len() {
        reader.insn_offset = reader.position();
        let (opcode, operand) = decode_one(&mut reader, pool)?;
        log::trace!("Decoded {} at offset {}", opcode.mnemonic(), reader.insn_offset);
        pending.push((reader.insn_offset, opcode, operand));
    }

    let ids: HashMap<usize, InsnId> = pending
        .iter()
        .enumerate()
        .map(|(idx, (offset, _, _))| (*offset, InsnId(idx)))
        .collect();
    let resolve = |offset: usize, target: isize| -> Result<InsnId, Error> {
        usize::try_from(target)
            .ok()
            .and_then(|target| ids.get(&target).copied())
            .ok_or(Error::InvalidBranchOffset { offset, target })
    };

    let mut instructions = InstructionSequence::new();
    for (offset, opcode, operand) in pending {
        let operand = match operand {
            PendingOperand::Ready(operand) => operand,
            PendingOperand::Branch(target) => Operand::Branch(resolve(offset, target)?),
            PendingOperand::Switch { default, cases } => Operand::Switch(SwitchTable {
                default: resolve(offset, default)?,
                cases: cases
                    .into_iter()
                    .map(|(key, target)| Ok((key, resolve(offset, target)?)))
                    .collect::<Result<_, Error>>()?,
            }),
        };
        instructions.push(Instruction::new(opcode, operand)?);
    }
    Ok(instructions)
}

fn decode_one<P: ConstantPoolResolver>(
    reader: &mut Reader,
    pool: &P,
) -> Result<(Opcode, PendingOperand), Error> {
    let offset = reader.insn_offset;
    let mut code = reader.u8()? as u16;
    let wide = code == 0xC4;
    if wide {
        code = 0xC400 | reader.u8()? as u16;
    }
    let opcode = Opcode::from_code(code).ok_or(Error::UnknownOpcode {
        offset,
        opcode: code,
    })?;

    let operand = match opcode.info().operand {
        OperandKind::None => Operand::None,
        OperandKind::Byte => Operand::Int(reader.i8()? as i32),
        OperandKind::Short => Operand::Int(reader.i16()? as i32),
        OperandKind::Constant => Operand::Constant(pool.constant(reader.u8()? as u16)?),
        OperandKind::WideConstant => Operand::Constant(pool.constant(reader.u16()?)?),
        OperandKind::Local if wide => Operand::Local(reader.u16()?),
        OperandKind::Local => Operand::Local(reader.u8()? as u16),
        OperandKind::LocalIncrement if wide => Operand::Increment {
            local: reader.u16()?,
            delta: reader.i16()?,
        },
        OperandKind::LocalIncrement => Operand::Increment {
            local: reader.u8()? as u16,
            delta: reader.i8()? as i16,
        },
        OperandKind::Branch => {
            let delta = reader.i16()? as i32;
            return Ok((opcode, PendingOperand::Branch(reader.relative(delta))));
        }
        OperandKind::WideBranch => {
            let delta = reader.i32()?;
            return Ok((opcode, PendingOperand::Branch(reader.relative(delta))));
        }
        OperandKind::Switch => {
            for _ in 0..Opcode::switch_padding(offset) {
                reader.u8()?;
            }
            let default = reader.i32()?;
            let default = reader.relative(default);
            let mut cases = vec![];
            if opcode == Opcode::TableSwitch {
                let low = reader.i32()?;
                let high = reader.i32()?;
                if high < low {
                    return Err(Error::OperandMismatch {
                        opcode: opcode.mnemonic(),
                        expected: "tableswitch bounds with low <= high",
                    });
                }
                for key in low..=high {
                    let delta = reader.i32()?;
                    cases.push((key, reader.relative(delta)));
                }
            } else {
                let pairs = reader.i32()?;
                for _ in 0..pairs.max(0) {
                    let key = reader.i32()?;
                    let delta = reader.i32()?;
                    cases.push((key, reader.relative(delta)));
                }
            }
            return Ok((opcode, PendingOperand::Switch { default, cases }));
        }
        OperandKind::Field => Operand::Field(pool.field(reader.u16()?)?),
        OperandKind::Method => {
            let method = pool.method(reader.u16()?)?;
            if opcode == Opcode::InvokeInterface {
                // count and a reserved zero byte
                reader.u8()?;
                reader.u8()?;
            }
            Operand::Method(method)
        }
        OperandKind::Dynamic => {
            let call_site = pool.call_site(reader.u16()?)?;
            reader.u16()?;
            Operand::Dynamic(call_site)
        }
        OperandKind::Type => Operand::Type(pool.class(reader.u16()?)?),
        OperandKind::PrimitiveType => {
            let atype = reader.u8()?;
            let base_type =
                BaseType::from_array_type_code(atype).ok_or(Error::OperandMismatch {
                    opcode: opcode.mnemonic(),
                    expected: "primitive array type code",
                })?;
            Operand::Primitive(base_type)
        }
        OperandKind::MultiArray => Operand::MultiArray {
            array_type: pool.class(reader.u16()?)?,
            dimensions: reader.u8()?,
        },
    };
    Ok((opcode, PendingOperand::Ready(operand)))
}

/// Last instruction starting before `end_offset` (and no earlier than `start_offset`)
fn last_before(
    instructions: &InstructionSequence,
    start_offset: usize,
    end_offset: usize,
) -> Option<InsnId> {
    instructions
        .iter()
        .map(|(id, _)| id)
        .take_while(|id| matches!(instructions.offset(*id), Ok(off) if off < end_offset))
        .filter(|id| matches!(instructions.offset(*id), Ok(off) if off >= start_offset))
        .last()
}

/// Exception table entry, as it appears in a class file
#[derive(Clone, Debug)]
pub struct RawExceptionHandler {
    pub start_pc: u16,

    /// Exclusive end of the protected range
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: Option<BinaryName>,
}

impl RawExceptionHandler {
    /// Resolve offsets into instructions of a decoded sequence
    pub fn resolve(
        &self,
        handler_index: usize,
        instructions: &InstructionSequence,
    ) -> Result<ExceptionHandler, Error> {
        let missing = Error::MissingHandlerInstruction { handler_index };
        let try_start = instructions.at_offset(self.start_pc as usize);
        let try_end = last_before(instructions, self.start_pc as usize, self.end_pc as usize);
        let handler = instructions.at_offset(self.handler_pc as usize);
        match (try_start, try_end, handler) {
            (Some(try_start), Some(try_end), Some(handler)) => Ok(ExceptionHandler {
                try_start,
                try_end,
                handler,
                catch_type: self.catch_type.clone(),
            }),
            _ => Err(missing),
        }
    }
}

/// Local variable table entry, as it appears in a class file
#[derive(Clone, Debug)]
pub struct RawLocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name: UnqualifiedName,
    pub descriptor: FieldType<BinaryName>,
    pub index: u16,
}

impl RawLocalVariable {
    /// Resolve offsets into instructions of a decoded sequence
    ///
    /// Returns `None` if the range does not cover any instruction (javac emits such entries for
    /// variables which are stored but never read).
    pub fn resolve(&self, instructions: &InstructionSequence) -> Option<LocalVariable> {
        let start_offset = self.start_pc as usize;
        let end_offset = start_offset + self.length as usize;
        let start = instructions
            .iter()
            .map(|(id, _)| id)
            .find(|id| matches!(instructions.offset(*id), Ok(off) if off >= start_offset))?;
        let end = last_before(instructions, start_offset, end_offset)?;
        Some(LocalVariable {
            slot: self.index,
            start,
            end,
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::{MethodDescriptor, Name, ParseDescriptor};

    struct TestPool;

    impl ConstantPoolResolver for TestPool {
        fn constant(&self, index: u16) -> Result<Constant, Error> {
            match index {
                1 => Ok(Constant::String(String::from("hello"))),
                2 => Ok(Constant::Long(42)),
                _ => Err(Error::MalformedName(format!("no constant {}", index))),
            }
        }

        fn class(&self, index: u16) -> Result<RefType<BinaryName>, Error> {
            match index {
                3 => Ok(RefType::Object(BinaryName::STRING)),
                _ => Err(Error::MalformedName(format!("no class {}", index))),
            }
        }

        fn field(&self, index: u16) -> Result<FieldRef, Error> {
            Err(Error::MalformedName(format!("no field {}", index)))
        }

        fn method(&self, index: u16) -> Result<MethodRef, Error> {
            match index {
                4 => Ok(MethodRef {
                    class: RefType::Object(BinaryName::STRING),
                    name: UnqualifiedName::from_str("length").unwrap(),
                    descriptor: MethodDescriptor::parse("()I").unwrap(),
                }),
                _ => Err(Error::MalformedName(format!("no method {}", index))),
            }
        }

        fn call_site(&self, index: u16) -> Result<CallSiteRef, Error> {
            Err(Error::MalformedName(format!("no call site {}", index)))
        }
    }

    #[test]
    fn decode_straight_line_code() {
        // ldc "hello"; checkcast String; invokevirtual String.length; ldc2_w 42L; pop2;
        // iinc_w 300 -2; ireturn
        let code = [
            0x12, 0x01, 0xC0, 0x00, 0x03, 0xB6, 0x00, 0x04, 0x14, 0x00, 0x02, 0x58, 0xC4, 0x84,
            0x01, 0x2C, 0xFF, 0xFE, 0xAC,
        ];
        let instructions = decode_code(&code, &TestPool).unwrap();
        let decoded: Vec<(usize, Opcode)> = instructions
            .iter()
            .map(|(id, insn)| (instructions.offset(id).unwrap(), insn.opcode))
            .collect();
        assert_eq!(
            decoded,
            vec![
                (0, Opcode::Ldc),
                (2, Opcode::CheckCast),
                (5, Opcode::InvokeVirtual),
                (8, Opcode::Ldc2W),
                (11, Opcode::Pop2),
                (12, Opcode::IIncW),
                (18, Opcode::IReturn),
            ]
        );
        let iinc = instructions.get(InsnId(5)).unwrap();
        assert_eq!(
            iinc.operand,
            Operand::Increment {
                local: 300,
                delta: -2
            }
        );
    }

    #[test]
    fn decode_branches_and_switches() {
        // 0: iload_0; 1: tableswitch (pad 2) default->24 [0->24, 1->25]; 24: return;
        // 25: goto -1 (back to 24)
        let mut code = vec![0x1A, 0xAA, 0x00, 0x00];
        for value in [23i32, 0, 1, 23, 24] {
            code.extend_from_slice(&value.to_be_bytes());
        }
        code.push(0xB1);
        code.extend_from_slice(&[0xA7, 0xFF, 0xFF]);

        let instructions = decode_code(&code, &TestPool).unwrap();
        assert_eq!(instructions.len(), 4);
        let switch = instructions.get(InsnId(1)).unwrap();
        assert_eq!(
            switch.operand,
            Operand::Switch(SwitchTable {
                default: InsnId(2),
                cases: vec![(0, InsnId(2)), (1, InsnId(3))],
            })
        );
        let goto = instructions.get(InsnId(3)).unwrap();
        assert_eq!(goto.operand, Operand::Branch(InsnId(2)));
        assert_eq!(instructions.code_length(), code.len());
    }

    #[test]
    fn decode_errors() {
        assert!(matches!(
            decode_code(&[0x00, 0xFE], &TestPool),
            Err(Error::UnknownOpcode {
                offset: 1,
                opcode: 0xFE
            })
        ));
        assert!(matches!(
            decode_code(&[0x00, 0x11, 0x01], &TestPool),
            Err(Error::TruncatedCode { offset: 1 })
        ));
        assert!(matches!(
            decode_code(&[0xA7, 0x00, 0x02, 0xB1], &TestPool),
            Err(Error::InvalidBranchOffset {
                offset: 0,
                target: 2
            })
        ));
        assert!(matches!(
            decode_code(&[0xC4, 0x60], &TestPool),
            Err(Error::UnknownOpcode {
                offset: 0,
                opcode: 0xC460
            })
        ));
    }

    #[test]
    fn resolve_tables() {
        // iconst_0; istore_1; iload_1; ireturn
        let instructions = decode_code(&[0x03, 0x3C, 0x1B, 0xAC], &TestPool).unwrap();

        let handler = RawExceptionHandler {
            start_pc: 0,
            end_pc: 2,
            handler_pc: 3,
            catch_type: None,
        }
        .resolve(0, &instructions)
        .unwrap();
        assert_eq!(handler.try_start, InsnId(0));
        assert_eq!(handler.try_end, InsnId(1));
        assert_eq!(handler.handler, InsnId(3));

        let bad = RawExceptionHandler {
            start_pc: 0,
            end_pc: 2,
            handler_pc: 7,
            catch_type: None,
        };
        assert!(matches!(
            bad.resolve(4, &instructions),
            Err(Error::MissingHandlerInstruction { handler_index: 4 })
        ));

        let local = RawLocalVariable {
            start_pc: 2,
            length: 2,
            name: UnqualifiedName::from_str("x").unwrap(),
            descriptor: FieldType::int(),
            index: 1,
        }
        .resolve(&instructions)
        .unwrap();
        assert_eq!((local.start, local.end), (InsnId(2), InsnId(3)));
    }
}
