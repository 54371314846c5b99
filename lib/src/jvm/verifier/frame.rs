use super::*;
use crate::jvm::code::InsnId;
use crate::jvm::Error;
use std::collections::HashMap;
use std::fmt;

/// Snapshot of the stack and local variables at a point in the bytecode
///
/// Both vectors are indexed by slot: `long` and `double` take up two entries, the value followed
/// by a `Top` filler. On the stack, the filler is the entry closer to the top.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Frame {
    /// Local variables, by slot index
    pub locals: Vec<FrameValue>,

    /// Operand stack, bottom first
    pub stack: Vec<FrameValue>,
}

/// Outcome of merging an incoming frame into a stored one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merged {
    /// The stored frame already accounts for the incoming one
    Unchanged,

    /// The stored frame must be replaced by this more general frame
    Changed(Frame),
}

/// Frames which cannot be merged because their stacks have different heights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackHeightMismatch {
    pub expected: usize,
    pub found: usize,
}

impl Frame {
    pub fn new(locals: Vec<FrameValue>, stack: Vec<FrameValue>) -> Frame {
        let mut frame = Frame { locals, stack };
        frame.trim_locals();
        frame
    }

    /// Merge an incoming frame into this one
    ///
    /// Stacks must have the same height and are merged slot by slot. Locals are merged up to the
    /// shorter of the two lengths (locals missing from one side are unusable), then trailing
    /// unusable locals are dropped.
    pub fn merge<H: TypeHierarchy + ?Sized>(
        &self,
        incoming: &Frame,
        hierarchy: &H,
    ) -> Result<Merged, StackHeightMismatch> {
        if self.stack.len() != incoming.stack.len() {
            return Err(StackHeightMismatch {
                expected: self.stack.len(),
                found: incoming.stack.len(),
            });
        }

        let stack: Vec<FrameValue> = self
            .stack
            .iter()
            .zip(&incoming.stack)
            .map(|(value1, value2)| value1.merge(value2, hierarchy))
            .collect();
        let locals: Vec<FrameValue> = self
            .locals
            .iter()
            .zip(&incoming.locals)
            .map(|(value1, value2)| value1.merge(value2, hierarchy))
            .collect();

        let merged = Frame::new(locals, stack);
        if &merged == self {
            Ok(Merged::Unchanged)
        } else {
            Ok(Merged::Changed(merged))
        }
    }

    /// Drop trailing locals which are `Empty` or `Top` (but never the filler of a `long`/`double`)
    pub fn trim_locals(&mut self) {
        while let Some(last) = self.locals.last() {
            let droppable = match last {
                FrameValue::Empty => true,
                FrameValue::Top => !self.is_local_filler(self.locals.len() - 1),
                _ => false,
            };
            if !droppable {
                break;
            }
            self.locals.pop();
        }
    }

    /// Is the local at this slot the second half of a `long` or `double`?
    pub fn is_local_filler(&self, slot: usize) -> bool {
        slot > 0
            && self.locals[slot] == FrameValue::Top
            && self.locals[slot - 1].is_double_word()
    }

    /// Mark as `Empty` the locals whose slot is described in the local variable table but which
    /// have no entry covering `offset`
    ///
    /// Slots never mentioned in the table are left alone, as are the fillers of double word
    /// values which are still in scope.
    pub fn prune_locals(&mut self, offset: usize, ranges: &[(u16, usize, usize)]) {
        for slot in 0..self.locals.len() {
            if self.is_local_filler(slot) && self.locals[slot - 1] != FrameValue::Empty {
                continue;
            }
            let mut mentioned = false;
            let mut in_scope = false;
            for (range_slot, start, end) in ranges {
                if *range_slot as usize == slot {
                    mentioned = true;
                    in_scope |= *start <= offset && offset <= *end;
                }
            }
            if mentioned && !in_scope {
                self.locals[slot] = FrameValue::Empty;
            }
        }
        self.trim_locals();
    }

    /// Replace every occurrence of an uninitialized marker (after its constructor has run)
    pub fn initialize(&mut self, uninitialized: &FrameValue, initialized: &FrameValue) {
        for value in self.locals.iter_mut().chain(self.stack.iter_mut()) {
            if value == uninitialized {
                *value = initialized.clone();
            }
        }
    }

    /// Convert the frame into the form used in the `StackMapTable`
    ///
    /// Fillers are dropped, locals which cannot be described (out of scope locals and return
    /// addresses) become `Top`, and uninitialized markers are replaced with the offset of their
    /// `new` instruction.
    pub fn to_wire(&self, offsets: &HashMap<InsnId, usize>) -> Result<WireFrame<WireType>, Error> {
        let mut locals = wire_values(&self.locals, offsets)?;
        while locals.last() == Some(&VerificationType::Top) {
            locals.pop();
        }
        let stack = wire_values(&self.stack, offsets)?;
        Ok(WireFrame { locals, stack })
    }
}

fn wire_values(
    values: &[FrameValue],
    offsets: &HashMap<InsnId, usize>,
) -> Result<Vec<WireType>, Error> {
    let mut wire = vec![];
    let mut previous_is_double_word = false;
    for value in values {
        if previous_is_double_word {
            previous_is_double_word = false;
            continue;
        }
        previous_is_double_word = value.is_double_word();
        wire.push(match value {
            FrameValue::Empty | FrameValue::Top | FrameValue::ReturnAddress(_) => {
                VerificationType::Top
            }
            FrameValue::Integer => VerificationType::Integer,
            FrameValue::Float => VerificationType::Float,
            FrameValue::Long => VerificationType::Long,
            FrameValue::Double => VerificationType::Double,
            FrameValue::Null => VerificationType::Null,
            FrameValue::Reference(ref_type) => VerificationType::Object(ref_type.clone()),
            FrameValue::UninitializedThis => VerificationType::UninitializedThis,
            FrameValue::Uninitialized(new) => {
                let offset = *offsets.get(new).ok_or(Error::UnknownInstruction(*new))?;
                let offset = u16::try_from(offset)
                    .map_err(|_| Error::OffsetDeltaOverflow { offset })?;
                VerificationType::Uninitialized(offset)
            }
        });
    }
    Ok(wire)
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("locals: [")?;
        for (i, value) in self.locals.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("] stack: [")?;
        for (i, value) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas};
    use crate::jvm::{BinaryName, RefType};
    use quickcheck::quickcheck;
    use FrameValue::*;

    fn new_frame<const N: usize, const M: usize>(
        locals: [FrameValue; N],
        stack: [FrameValue; M],
    ) -> Frame {
        Frame {
            locals: Vec::from(locals),
            stack: Vec::from(stack),
        }
    }

    fn string() -> FrameValue {
        FrameValue::object(BinaryName::STRING)
    }

    #[test]
    fn merging() {
        let arenas = ClassGraphArenas::new();
        let graph = ClassGraph::new(&arenas);
        graph.insert_java_library_types();

        let stored = new_frame([Integer, Null], [string()]);
        assert_eq!(stored.merge(&stored, &graph), Ok(Merged::Unchanged));

        let incoming = new_frame([Integer, string()], [Null]);
        assert_eq!(
            stored.merge(&incoming, &graph),
            Ok(Merged::Changed(new_frame([Integer, string()], [string()])))
        );

        // Locals only present on one side are dropped
        let incoming = new_frame([Integer, Null, Float, Float], [string()]);
        assert_eq!(stored.merge(&incoming, &graph), Ok(Merged::Unchanged));
        assert_eq!(
            incoming.merge(&stored, &graph),
            Ok(Merged::Changed(stored.clone()))
        );

        // Trailing conflicts get trimmed
        let incoming = new_frame([Integer, Integer], [string()]);
        assert_eq!(
            stored.merge(&incoming, &graph),
            Ok(Merged::Changed(new_frame([Integer], [string()])))
        );

        let incoming = new_frame([Integer, Null], []);
        assert_eq!(
            stored.merge(&incoming, &graph),
            Err(StackHeightMismatch {
                expected: 1,
                found: 0
            })
        );
    }

    quickcheck! {
        fn frame_merge_is_idempotent(locals: Vec<FrameValue>, stack: Vec<FrameValue>) -> bool {
            let arenas = ClassGraphArenas::new();
            let graph = ClassGraph::new(&arenas);
            graph.insert_java_library_types();
            let frame = Frame::new(locals, stack);
            frame.merge(&frame, &graph) == Ok(Merged::Unchanged)
        }
    }

    #[test]
    fn trimming_keeps_fillers() {
        let frame = Frame::new(vec![Integer, Long, Top, Top, Empty], vec![]);
        assert_eq!(frame.locals, vec![Integer, Long, Top]);

        let frame = Frame::new(vec![Empty, Top, Integer, Empty], vec![]);
        assert_eq!(frame.locals, vec![Empty, Top, Integer]);
    }

    #[test]
    fn pruning() {
        let ranges = [(1, 0, 10), (2, 5, 10), (3, 0, 4)];

        // slot 0 is not in the table, slot 3 is out of scope
        let mut frame = new_frame([string(), Integer, Float, Integer], []);
        frame.prune_locals(7, &ranges);
        assert_eq!(frame.locals, vec![string(), Integer, Float]);

        // slot 2 is out of scope, slot 3 is in scope
        let mut frame = new_frame([string(), Integer, Float, Integer], []);
        frame.prune_locals(3, &ranges);
        assert_eq!(frame.locals, vec![string(), Integer, Empty, Integer]);

        // the filler of an in-scope long survives even if its slot is mentioned
        let mut frame = new_frame([string(), Long, Top], []);
        frame.prune_locals(7, &[(1, 0, 10), (2, 0, 4)]);
        assert_eq!(frame.locals, vec![string(), Long, Top]);
    }

    #[test]
    fn initializing() {
        let new1 = Uninitialized(InsnId(1));
        let new2 = Uninitialized(InsnId(2));
        let mut frame = new_frame([UninitializedThis, new1.clone()], [new1.clone(), new2.clone()]);
        frame.initialize(&new1, &string());
        assert_eq!(frame, new_frame([UninitializedThis, string()], [string(), new2]));
    }

    #[test]
    fn wire_form() {
        let offsets: HashMap<InsnId, usize> = vec![(InsnId(4), 17)].into_iter().collect();
        let frame = new_frame(
            [string(), Long, Top, Empty, ReturnAddress(InsnId(2)), Double, Top],
            [Uninitialized(InsnId(4)), Double, Top, Null],
        );
        let wire = frame.to_wire(&offsets).unwrap();
        assert_eq!(
            wire.locals,
            vec![
                VerificationType::Object(RefType::Object(BinaryName::STRING)),
                VerificationType::Long,
                VerificationType::Top,
                VerificationType::Top,
                VerificationType::Double,
            ]
        );
        assert_eq!(
            wire.stack,
            vec![
                VerificationType::Uninitialized(17),
                VerificationType::Double,
                VerificationType::Null,
            ]
        );

        let dangling = new_frame([], [Uninitialized(InsnId(9))]);
        assert!(matches!(
            dangling.to_wire(&offsets),
            Err(Error::UnknownInstruction(InsnId(9)))
        ));

        let trailing = new_frame([Integer, ReturnAddress(InsnId(2))], []);
        assert_eq!(
            trailing.to_wire(&offsets).unwrap().locals,
            vec![VerificationType::Integer]
        );
    }
}
