use super::{Opcode, OperandKind};
use crate::jvm::{
    BaseType, BinaryName, Error, FieldType, MethodDescriptor, RefType, RenderDescriptor,
    UnqualifiedName,
};
use std::fmt;

/// Stable identity of an instruction inside an [`super::InstructionSequence`]
///
/// Ids are never reused, even after the instruction they name is removed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct InsnId(pub(crate) usize);

impl InsnId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for InsnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Loadable constant (already resolved out of the constant pool)
#[derive(Clone, PartialEq, Debug)]
pub enum Constant {
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),
    Class(RefType<BinaryName>),
    MethodType(MethodDescriptor<BinaryName>),
    MethodHandle(MethodRef),

    /// Dynamically computed constant, of the given type
    Dynamic(FieldType<BinaryName>),
}

impl Constant {
    /// Number of stack slots taken up by the constant once loaded
    pub fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            Constant::Dynamic(FieldType::Base(BaseType::Long | BaseType::Double)) => 2,
            _ => 1,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FieldRef {
    pub class: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: FieldType<BinaryName>,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MethodRef {
    /// Class on which the method is declared (array types declare `clone`)
    pub class: RefType<BinaryName>,
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,
}

impl MethodRef {
    pub fn is_constructor(&self) -> bool {
        self.name == UnqualifiedName::INIT
    }
}

/// Call site of an `invokedynamic`
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct CallSiteRef {
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,
}

/// Targets of a `tableswitch` or `lookupswitch`
///
/// For `tableswitch`, keys must be consecutive.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SwitchTable {
    pub default: InsnId,
    pub cases: Vec<(i32, InsnId)>,
}

/// Operand of an instruction
///
/// Which variant an instruction carries is determined by the [`OperandKind`] of its opcode.
#[derive(Clone, PartialEq, Debug)]
pub enum Operand {
    None,
    Int(i32),
    Local(u16),
    Increment { local: u16, delta: i16 },
    Constant(Constant),
    Branch(InsnId),
    Switch(SwitchTable),
    Type(RefType<BinaryName>),
    Primitive(BaseType),
    MultiArray {
        array_type: RefType<BinaryName>,
        dimensions: u8,
    },
    Field(FieldRef),
    Method(MethodRef),
    Dynamic(CallSiteRef),
}

impl Operand {
    fn matches(&self, kind: OperandKind) -> bool {
        matches!(
            (kind, self),
            (OperandKind::None, Operand::None)
                | (OperandKind::Byte | OperandKind::Short, Operand::Int(_))
                | (
                    OperandKind::Constant | OperandKind::WideConstant,
                    Operand::Constant(_)
                )
                | (OperandKind::Local, Operand::Local(_))
                | (OperandKind::LocalIncrement, Operand::Increment { .. })
                | (OperandKind::Branch | OperandKind::WideBranch, Operand::Branch(_))
                | (OperandKind::Switch, Operand::Switch(_))
                | (OperandKind::Type, Operand::Type(_))
                | (OperandKind::PrimitiveType, Operand::Primitive(_))
                | (OperandKind::MultiArray, Operand::MultiArray { .. })
                | (OperandKind::Field, Operand::Field(_))
                | (OperandKind::Method, Operand::Method(_))
                | (OperandKind::Dynamic, Operand::Dynamic(_))
        )
    }
}

/// Instruction, detached from its position in a method body
///
/// Once created, an instruction is never modified. Its offset belongs to the sequence holding it.
#[derive(Clone, PartialEq, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Operand,

    /// Optional source label (only used for display)
    pub label: Option<String>,
}

impl Instruction {
    /// Instruction with an operand matching the opcode's operand kind
    pub fn new(opcode: Opcode, operand: Operand) -> Result<Instruction, Error> {
        let kind = opcode.info().operand;
        if !operand.matches(kind) {
            return Err(Error::OperandMismatch {
                opcode: opcode.mnemonic(),
                expected: operand_kind_name(kind),
            });
        }
        if let (Opcode::TableSwitch, Operand::Switch(table)) = (opcode, &operand) {
            if table.cases.is_empty() {
                return Err(Error::OperandMismatch {
                    opcode: opcode.mnemonic(),
                    expected: "at least one tableswitch case",
                });
            }
            let consecutive = table
                .cases
                .windows(2)
                .all(|pair| pair[0].0.checked_add(1) == Some(pair[1].0));
            if !consecutive {
                return Err(Error::OperandMismatch {
                    opcode: opcode.mnemonic(),
                    expected: "consecutive switch keys",
                });
            }
        }
        Ok(Instruction {
            opcode,
            operand,
            label: None,
        })
    }

    /// Instruction which has no operand
    pub fn simple(opcode: Opcode) -> Result<Instruction, Error> {
        Instruction::new(opcode, Operand::None)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Instruction {
        self.label = Some(label.into());
        self
    }

    /// Encoded size in bytes, if the instruction were placed at the given offset
    pub fn size(&self, offset: usize) -> usize {
        match (&self.operand, self.opcode) {
            (Operand::Switch(table), Opcode::TableSwitch) => {
                1 + Opcode::switch_padding(offset) + 12 + 4 * table.cases.len()
            }
            (Operand::Switch(table), _) => {
                1 + Opcode::switch_padding(offset) + 8 + 8 * table.cases.len()
            }
            _ => self.opcode.info().size as usize,
        }
    }

    /// Explicit branch targets (not including fall through)
    pub fn branch_targets(&self) -> Vec<InsnId> {
        match &self.operand {
            Operand::Branch(target) => vec![*target],
            Operand::Switch(table) => {
                let mut targets = vec![table.default];
                for (_, target) in &table.cases {
                    if !targets.contains(target) {
                        targets.push(*target);
                    }
                }
                targets
            }
            _ => vec![],
        }
    }

    /// Local variable slot touched by a load, store, `iinc`, or `ret`
    pub fn local_slot(&self) -> Option<u16> {
        match self.operand {
            Operand::Local(slot) => Some(slot),
            Operand::Increment { local, .. } => Some(local),
            _ => self
                .opcode
                .local_access()
                .and_then(|access| access.implicit_slot),
        }
    }
}

fn operand_kind_name(kind: OperandKind) -> &'static str {
    match kind {
        OperandKind::None => "no operand",
        OperandKind::Byte | OperandKind::Short => "integer immediate",
        OperandKind::Constant | OperandKind::WideConstant => "constant",
        OperandKind::Local => "local variable",
        OperandKind::LocalIncrement => "local variable and increment",
        OperandKind::Branch | OperandKind::WideBranch => "branch target",
        OperandKind::Switch => "switch table",
        OperandKind::Type => "type",
        OperandKind::PrimitiveType => "primitive type",
        OperandKind::MultiArray => "array type and dimensions",
        OperandKind::Field => "field reference",
        OperandKind::Method => "method reference",
        OperandKind::Dynamic => "call site",
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{}: ", label)?;
        }
        f.write_str(self.opcode.mnemonic())?;
        match &self.operand {
            Operand::None => Ok(()),
            Operand::Int(value) => write!(f, " {}", value),
            Operand::Local(slot) => write!(f, " {}", slot),
            Operand::Increment { local, delta } => write!(f, " {} {}", local, delta),
            Operand::Constant(constant) => write!(f, " {:?}", constant),
            Operand::Branch(target) => write!(f, " {}", target),
            Operand::Switch(table) => {
                for (key, target) in &table.cases {
                    write!(f, " {}:{}", key, target)?;
                }
                write!(f, " default:{}", table.default)
            }
            Operand::Type(ref_type) => write!(f, " {}", ref_type.render()),
            Operand::Primitive(base_type) => write!(f, " {}", base_type.render()),
            Operand::MultiArray {
                array_type,
                dimensions,
            } => write!(f, " {} {}", array_type.render(), dimensions),
            Operand::Field(field) => write!(
                f,
                " {}.{}:{}",
                field.class,
                field.name,
                field.descriptor.render()
            ),
            Operand::Method(method) => write!(
                f,
                " {}.{}{}",
                method.class.render(),
                method.name,
                method.descriptor.render()
            ),
            Operand::Dynamic(call_site) => {
                write!(f, " {}{}", call_site.name, call_site.descriptor.render())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn operand_must_match_opcode() {
        assert!(Instruction::new(Opcode::ILoad, Operand::Local(4)).is_ok());
        assert!(Instruction::simple(Opcode::IAdd).is_ok());
        assert!(matches!(
            Instruction::simple(Opcode::Goto),
            Err(Error::OperandMismatch { opcode: "goto", .. })
        ));
        assert!(matches!(
            Instruction::new(Opcode::Nop, Operand::Int(1)),
            Err(Error::OperandMismatch { opcode: "nop", .. })
        ));
    }

    #[test]
    fn tableswitch_keys_are_consecutive() {
        let table = |keys: &[i32]| SwitchTable {
            default: InsnId(0),
            cases: keys.iter().map(|k| (*k, InsnId(1))).collect(),
        };
        let good = Instruction::new(Opcode::TableSwitch, Operand::Switch(table(&[1, 2, 3])));
        assert!(good.is_ok());
        let bad = Instruction::new(Opcode::TableSwitch, Operand::Switch(table(&[1, 5])));
        assert!(bad.is_err(), "tableswitch keys 1, 5 are not consecutive");
        let lookup = Instruction::new(Opcode::LookupSwitch, Operand::Switch(table(&[1, 5])));
        assert!(lookup.is_ok());

        let empty = Instruction::new(Opcode::TableSwitch, Operand::Switch(table(&[])));
        assert!(matches!(
            empty,
            Err(Error::OperandMismatch { opcode: "tableswitch", .. })
        ));
        let empty_lookup = Instruction::new(Opcode::LookupSwitch, Operand::Switch(table(&[])));
        assert!(empty_lookup.is_ok(), "lookupswitch may have no cases");
    }

    #[test]
    fn switch_sizes_depend_on_offset() {
        let table = SwitchTable {
            default: InsnId(0),
            cases: vec![(0, InsnId(1)), (1, InsnId(2))],
        };
        let tableswitch = Instruction::new(Opcode::TableSwitch, Operand::Switch(table.clone()))
            .unwrap();
        assert_eq!(tableswitch.size(0), 1 + 3 + 12 + 8);
        assert_eq!(tableswitch.size(3), 1 + 12 + 8);

        let lookupswitch = Instruction::new(Opcode::LookupSwitch, Operand::Switch(table)).unwrap();
        assert_eq!(lookupswitch.size(1), 1 + 2 + 8 + 16);
        assert_eq!(
            lookupswitch.branch_targets(),
            vec![InsnId(0), InsnId(1), InsnId(2)]
        );
    }

    #[test]
    fn local_slots() {
        let insn = Instruction::simple(Opcode::AStore3).unwrap();
        assert_eq!(insn.local_slot(), Some(3));
        let insn = Instruction::new(Opcode::IIncW, Operand::Increment { local: 300, delta: -1 })
            .unwrap();
        assert_eq!(insn.local_slot(), Some(300));
        assert_eq!(insn.size(0), 6);
        assert_eq!(Instruction::simple(Opcode::IAdd).unwrap().local_slot(), None);
    }
}
