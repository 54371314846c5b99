use super::{InsnId, Instruction};
use crate::jvm::Error;

struct Node {
    instruction: Instruction,
    offset: Option<usize>,
    previous: Option<InsnId>,
    next: Option<InsnId>,
    removed: bool,
}

/// Instructions of one method body, in code order
///
/// This is a doubly linked list laid out in an arena: nodes are addressed by [`InsnId`] and never
/// move, so ids handed out stay valid across insertions and removals (removed ids just stop
/// resolving). Offsets are recomputed after every structural edit, so that for every live
/// instruction `next.offset == this.offset + this.size`.
#[derive(Default)]
pub struct InstructionSequence {
    nodes: Vec<Node>,
    first: Option<InsnId>,
    last: Option<InsnId>,
    len: usize,
    code_length: usize,
}

impl InstructionSequence {
    pub fn new() -> InstructionSequence {
        InstructionSequence::default()
    }

    /// Number of (live) instructions
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the encoded code array
    pub fn code_length(&self) -> usize {
        self.code_length
    }

    pub fn first(&self) -> Option<InsnId> {
        self.first
    }

    pub fn last(&self) -> Option<InsnId> {
        self.last
    }

    fn node(&self, id: InsnId) -> Result<&Node, Error> {
        match self.nodes.get(id.0) {
            Some(node) if !node.removed => Ok(node),
            _ => Err(Error::UnknownInstruction(id)),
        }
    }

    fn node_mut(&mut self, id: InsnId) -> Result<&mut Node, Error> {
        match self.nodes.get_mut(id.0) {
            Some(node) if !node.removed => Ok(node),
            _ => Err(Error::UnknownInstruction(id)),
        }
    }

    pub fn contains(&self, id: InsnId) -> bool {
        self.node(id).is_ok()
    }

    pub fn get(&self, id: InsnId) -> Result<&Instruction, Error> {
        self.node(id).map(|node| &node.instruction)
    }

    /// Byte offset of the instruction in the code array
    pub fn offset(&self, id: InsnId) -> Result<usize, Error> {
        self.node(id)?.offset.ok_or(Error::UnknownInstruction(id))
    }

    pub fn next(&self, id: InsnId) -> Result<Option<InsnId>, Error> {
        self.node(id).map(|node| node.next)
    }

    pub fn previous(&self, id: InsnId) -> Result<Option<InsnId>, Error> {
        self.node(id).map(|node| node.previous)
    }

    /// Iterate through instructions in code order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            sequence: self,
            cursor: self.first,
        }
    }

    /// Find the instruction starting at a byte offset
    pub fn at_offset(&self, offset: usize) -> Option<InsnId> {
        self.iter()
            .find(|(id, _)| self.nodes[id.0].offset == Some(offset))
            .map(|(id, _)| id)
    }

    fn alloc(&mut self, instruction: Instruction) -> InsnId {
        let id = InsnId(self.nodes.len());
        self.nodes.push(Node {
            instruction,
            offset: None,
            previous: None,
            next: None,
            removed: false,
        });
        self.len += 1;
        id
    }

    /// Append an instruction to the end of the sequence
    ///
    /// On a fresh sequence, the `n`-th pushed instruction gets `InsnId` index `n`.
    pub fn push(&mut self, instruction: Instruction) -> InsnId {
        let offset = self.code_length;
        self.code_length += instruction.size(offset);

        let id = self.alloc(instruction);
        let node = &mut self.nodes[id.0];
        node.offset = Some(offset);
        node.previous = self.last;
        match self.last {
            Some(last) => self.nodes[last.0].next = Some(id),
            None => self.first = Some(id),
        }
        self.last = Some(id);
        id
    }

    /// Insert an instruction right before another one
    pub fn insert_before(
        &mut self,
        anchor: InsnId,
        instruction: Instruction,
    ) -> Result<InsnId, Error> {
        let previous = self.node(anchor)?.previous;
        let id = self.alloc(instruction);
        self.nodes[id.0].previous = previous;
        self.nodes[id.0].next = Some(anchor);
        self.nodes[anchor.0].previous = Some(id);
        match previous {
            Some(previous) => self.nodes[previous.0].next = Some(id),
            None => self.first = Some(id),
        }
        self.recompute_offsets();
        Ok(id)
    }

    /// Insert an instruction right after another one
    pub fn insert_after(
        &mut self,
        anchor: InsnId,
        instruction: Instruction,
    ) -> Result<InsnId, Error> {
        let next = self.node(anchor)?.next;
        let id = self.alloc(instruction);
        self.nodes[id.0].previous = Some(anchor);
        self.nodes[id.0].next = next;
        self.nodes[anchor.0].next = Some(id);
        match next {
            Some(next) => self.nodes[next.0].previous = Some(id),
            None => self.last = Some(id),
        }
        self.recompute_offsets();
        Ok(id)
    }

    /// Remove an instruction from the sequence
    ///
    /// Branches and handlers still pointing at the removed instruction will fail to resolve.
    pub fn remove(&mut self, id: InsnId) -> Result<Instruction, Error> {
        let node = self.node_mut(id)?;
        node.removed = true;
        node.offset = None;
        let (previous, next) = (node.previous.take(), node.next.take());
        let instruction = node.instruction.clone();

        match previous {
            Some(previous) => self.nodes[previous.0].next = next,
            None => self.first = next,
        }
        match next {
            Some(next) => self.nodes[next.0].previous = previous,
            None => self.last = previous,
        }
        self.len -= 1;
        self.recompute_offsets();
        Ok(instruction)
    }

    /// Swap the instruction stored under an id, keeping its position and identity
    ///
    /// Returns the instruction that was there before.
    pub fn replace(&mut self, id: InsnId, instruction: Instruction) -> Result<Instruction, Error> {
        let node = self.node_mut(id)?;
        let previous = std::mem::replace(&mut node.instruction, instruction);
        self.recompute_offsets();
        Ok(previous)
    }

    /// Reassign every offset by walking the chain from the start
    pub fn recompute_offsets(&mut self) {
        let mut offset = 0;
        let mut cursor = self.first;
        while let Some(id) = cursor {
            let node = &mut self.nodes[id.0];
            node.offset = Some(offset);
            offset += node.instruction.size(offset);
            cursor = node.next;
        }
        self.code_length = offset;
    }
}

pub struct Iter<'a> {
    sequence: &'a InstructionSequence,
    cursor: Option<InsnId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (InsnId, &'a Instruction);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = &self.sequence.nodes[id.0];
        self.cursor = node.next;
        Some((id, &node.instruction))
    }
}

impl Extend<Instruction> for InstructionSequence {
    fn extend<T: IntoIterator<Item = Instruction>>(&mut self, iter: T) {
        for instruction in iter {
            self.push(instruction);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::{Opcode, Operand, SwitchTable};
    use quickcheck::{quickcheck, Arbitrary, Gen, TestResult};

    fn simple(opcode: Opcode) -> Instruction {
        Instruction::simple(opcode).unwrap()
    }

    fn offsets(seq: &InstructionSequence) -> Vec<usize> {
        seq.iter().map(|(id, _)| seq.offset(id).unwrap()).collect()
    }

    #[test]
    fn push_assigns_offsets() {
        let mut seq = InstructionSequence::new();
        let a = seq.push(simple(Opcode::IConst0));
        let b = seq.push(Instruction::new(Opcode::IStore, Operand::Local(4)).unwrap());
        let c = seq.push(simple(Opcode::Return));

        assert_eq!((a.index(), b.index(), c.index()), (0, 1, 2));
        assert_eq!(offsets(&seq), vec![0, 1, 3]);
        assert_eq!(seq.code_length(), 4);
        assert_eq!(seq.at_offset(3), Some(c));
        assert_eq!(seq.at_offset(2), None);
    }

    #[test]
    fn edits_shift_offsets() {
        let mut seq = InstructionSequence::new();
        let a = seq.push(simple(Opcode::IConst0));
        let b = seq.push(simple(Opcode::IReturn));

        let inserted = seq
            .insert_before(b, Instruction::new(Opcode::BiPush, Operand::Int(7)).unwrap())
            .unwrap();
        assert_eq!(offsets(&seq), vec![0, 1, 3]);
        assert_eq!(seq.previous(b).unwrap(), Some(inserted));

        let nop = seq.insert_after(a, simple(Opcode::Nop)).unwrap();
        assert_eq!(offsets(&seq), vec![0, 1, 2, 4]);
        assert_eq!(seq.next(a).unwrap(), Some(nop));

        seq.remove(inserted).unwrap();
        assert_eq!(offsets(&seq), vec![0, 1, 2]);
        assert_eq!(seq.len(), 3);
        assert!(matches!(seq.get(inserted), Err(Error::UnknownInstruction(_))));
        assert!(seq.remove(inserted).is_err(), "double removal");

        seq.remove(a).unwrap();
        assert_eq!(seq.first(), Some(nop));
        seq.remove(b).unwrap();
        assert_eq!(seq.last(), Some(nop));
    }

    #[test]
    fn switch_padding_follows_insertions() {
        let mut seq = InstructionSequence::new();
        let target = InsnId(1);
        let switch = seq.push(
            Instruction::new(
                Opcode::LookupSwitch,
                Operand::Switch(SwitchTable {
                    default: target,
                    cases: vec![],
                }),
            )
            .unwrap(),
        );
        seq.push(simple(Opcode::Return));
        assert_eq!(seq.code_length(), 1 + 3 + 8 + 1);

        seq.insert_before(switch, simple(Opcode::Nop)).unwrap();
        assert_eq!(seq.code_length(), 1 + 1 + 2 + 8 + 1);
    }

    /// Structural edit applied to a sequence
    #[derive(Clone, Debug)]
    enum Edit {
        Push(u8),
        InsertBefore(usize, u8),
        InsertAfter(usize, u8),
        Remove(usize),
    }

    const PALETTE: [Opcode; 6] = [
        Opcode::Nop,
        Opcode::BiPush,
        Opcode::SiPush,
        Opcode::ILoad,
        Opcode::TableSwitch,
        Opcode::IIncW,
    ];

    fn palette_instruction(choice: u8) -> Instruction {
        let opcode = PALETTE[choice as usize % PALETTE.len()];
        let operand = match opcode.info().operand {
            crate::jvm::code::OperandKind::Byte | crate::jvm::code::OperandKind::Short => {
                Operand::Int(1)
            }
            crate::jvm::code::OperandKind::Local => Operand::Local(1),
            crate::jvm::code::OperandKind::LocalIncrement => Operand::Increment {
                local: 1,
                delta: 1,
            },
            crate::jvm::code::OperandKind::Switch => Operand::Switch(SwitchTable {
                default: InsnId(0),
                cases: vec![(0, InsnId(0))],
            }),
            _ => Operand::None,
        };
        Instruction::new(opcode, operand).unwrap()
    }

    impl Arbitrary for Edit {
        fn arbitrary<G: Gen>(g: &mut G) -> Self {
            let choice = (u32::arbitrary(g) % 256) as u8;
            let position = u32::arbitrary(g) as usize;
            match u32::arbitrary(g) % 4 {
                0 => Edit::Push(choice),
                1 => Edit::InsertBefore(position, choice),
                2 => Edit::InsertAfter(position, choice),
                _ => Edit::Remove(position),
            }
        }
    }

    quickcheck! {
        fn offsets_stay_contiguous(edits: Vec<Edit>) -> TestResult {
            if edits.is_empty() {
                return TestResult::discard();
            }
            let mut seq = InstructionSequence::new();
            for edit in edits {
                let ids: Vec<InsnId> = seq.iter().map(|(id, _)| id).collect();
                let pick = |position: usize| ids.get(position % ids.len().max(1)).copied();
                match edit {
                    Edit::Push(choice) => {
                        seq.push(palette_instruction(choice));
                    }
                    Edit::InsertBefore(position, choice) => match pick(position) {
                        Some(anchor) => {
                            seq.insert_before(anchor, palette_instruction(choice)).unwrap();
                        }
                        None => {
                            seq.push(palette_instruction(choice));
                        }
                    },
                    Edit::InsertAfter(position, choice) => match pick(position) {
                        Some(anchor) => {
                            seq.insert_after(anchor, palette_instruction(choice)).unwrap();
                        }
                        None => {
                            seq.push(palette_instruction(choice));
                        }
                    },
                    Edit::Remove(position) => {
                        if let Some(id) = pick(position) {
                            seq.remove(id).unwrap();
                        }
                    }
                }
            }

            let mut expected = 0;
            for (id, insn) in seq.iter() {
                let offset = seq.offset(id).unwrap();
                if offset != expected {
                    return TestResult::failed();
                }
                expected = offset + insn.size(offset);
            }
            TestResult::from_bool(expected == seq.code_length())
        }
    }
}
