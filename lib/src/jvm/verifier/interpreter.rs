use super::*;
use crate::jvm::code::{
    Constant, InsnId, Instruction, LocalAccess, LocalAccessKind, MethodRef, Opcode, Operand,
    StackBehavior, StackItem,
};
use crate::jvm::{AnalysisErrorKind, BinaryName, FieldType, RefType};
use crate::util::Width;
use std::collections::BTreeMap;

/// Abstract interpreter: computes the frame after an instruction from the frame before it
///
/// Values are only checked for their width in slots, never for their type. The one piece of state
/// carried between instructions is the table of uninitialized objects whose constructor has been
/// called (keyed by the `new` instruction that created them).
pub struct Interpreter<'a, H: TypeHierarchy + ?Sized> {
    /// Class declaring the method being analyzed (type of `this` once it is initialized)
    this_class: &'a BinaryName,
    hierarchy: &'a H,
    initializations: BTreeMap<InsnId, RefType<BinaryName>>,
}

impl<'a, H: TypeHierarchy + ?Sized> Interpreter<'a, H> {
    pub fn new(this_class: &'a BinaryName, hierarchy: &'a H) -> Interpreter<'a, H> {
        Interpreter {
            this_class,
            hierarchy,
            initializations: BTreeMap::new(),
        }
    }

    /// Types given to uninitialized objects by their constructor calls so far
    pub fn initializations(&self) -> &BTreeMap<InsnId, RefType<BinaryName>> {
        &self.initializations
    }

    pub fn into_initializations(self) -> BTreeMap<InsnId, RefType<BinaryName>> {
        self.initializations
    }

    /// Update the frame to reflect the effects of the given instruction
    ///
    /// `id` is the instruction's own id (used to tag objects created by `new`) and `next` is the
    /// id of the instruction after it (the return address pushed by `jsr`).
    pub fn execute(
        &mut self,
        frame: &mut Frame,
        id: InsnId,
        insn: &Instruction,
        next: Option<InsnId>,
    ) -> Result<(), AnalysisErrorKind> {
        use Opcode::*;

        if let Some(access) = insn.opcode.local_access() {
            let slot = insn.local_slot().ok_or(AnalysisErrorKind::MissingOperand)?;
            return match access.kind {
                LocalAccessKind::Load => load_local(frame, slot, access),
                LocalAccessKind::Store => store_local(frame, slot, access),
            };
        }

        let Frame { stack, locals } = frame;

        match (insn.opcode, &insn.operand) {
            (AConstNull, _) => stack.push(FrameValue::Null),

            (Ldc | LdcW, Operand::Constant(constant)) => {
                if constant.width() != 1 {
                    return Err(AnalysisErrorKind::NotLoadableConstant);
                }
                stack.extend(constant_values(constant));
            }
            (Ldc2W, Operand::Constant(constant)) => {
                if constant.width() != 2 {
                    return Err(AnalysisErrorKind::NotLoadableConstant);
                }
                stack.extend(constant_values(constant));
            }

            // Stack shuffles move slots, but only in the value categories each form allows
            (Pop, _) => {
                pop_shuffle(stack, &[&[1]])?;
            }
            (Pop2, _) => {
                pop_shuffle(stack, &[&[1, 1], &[2]])?;
            }
            (Dup, _) => {
                let t = pop_shuffle(stack, &[&[1]])?;
                stack.extend([t[0].clone(), t[0].clone()]);
            }
            (DupX1, _) => {
                let t = pop_shuffle(stack, &[&[1, 1]])?;
                stack.extend([t[0].clone(), t[1].clone(), t[0].clone()]);
            }
            (DupX2, _) => {
                let t = pop_shuffle(stack, &[&[1, 1, 1], &[1, 2]])?;
                stack.extend([t[0].clone(), t[2].clone(), t[1].clone(), t[0].clone()]);
            }
            (Dup2, _) => {
                let t = pop_shuffle(stack, &[&[1, 1], &[2]])?;
                stack.extend([t[1].clone(), t[0].clone(), t[1].clone(), t[0].clone()]);
            }
            (Dup2X1, _) => {
                let t = pop_shuffle(stack, &[&[1, 1, 1], &[2, 1]])?;
                stack.extend([
                    t[1].clone(),
                    t[0].clone(),
                    t[2].clone(),
                    t[1].clone(),
                    t[0].clone(),
                ]);
            }
            (Dup2X2, _) => {
                let t = pop_shuffle(stack, &[&[1, 1, 1, 1], &[2, 1, 1], &[1, 1, 2], &[2, 2]])?;
                stack.extend([
                    t[1].clone(),
                    t[0].clone(),
                    t[3].clone(),
                    t[2].clone(),
                    t[1].clone(),
                    t[0].clone(),
                ]);
            }
            (Swap, _) => {
                let t = pop_shuffle(stack, &[&[1, 1]])?;
                stack.extend([t[0].clone(), t[1].clone()]);
            }

            (AALoad, _) => {
                pop_single(stack)?;
                let array = pop_single(stack)?;
                stack.push(match array {
                    FrameValue::Null => FrameValue::Null,
                    FrameValue::Reference(array_type) => match array_type.element_type() {
                        Some(FieldType::Ref(element)) => FrameValue::Reference(element),
                        _ => FrameValue::Top,
                    },
                    _ => FrameValue::Top,
                });
            }

            (New, Operand::Type(_)) => stack.push(FrameValue::Uninitialized(id)),
            (NewArray, Operand::Primitive(base_type)) => {
                pop_single(stack)?;
                let array_type = RefType::array(FieldType::Base(*base_type));
                stack.push(FrameValue::Reference(array_type));
            }
            (ANewArray, Operand::Type(element_type)) => {
                pop_single(stack)?;
                let array_type = RefType::array(FieldType::Ref(element_type.clone()));
                stack.push(FrameValue::Reference(array_type));
            }
            (CheckCast, Operand::Type(cast_type)) => {
                pop_single(stack)?;
                stack.push(FrameValue::Reference(cast_type.clone()));
            }
            (
                MultiANewArray,
                Operand::MultiArray {
                    array_type,
                    dimensions,
                },
            ) => {
                for _ in 0..*dimensions {
                    pop_single(stack)?;
                }
                stack.push(FrameValue::Reference(array_type.clone()));
            }

            (GetStatic, Operand::Field(field)) => {
                stack.extend(FrameValue::from_field_type(
                    &self.hierarchy.resolve_field_type(field),
                ));
            }
            (GetField, Operand::Field(field)) => {
                pop_single(stack)?;
                stack.extend(FrameValue::from_field_type(
                    &self.hierarchy.resolve_field_type(field),
                ));
            }
            (PutStatic, Operand::Field(field)) => {
                pop_field(stack, &field.descriptor)?;
            }
            (PutField, Operand::Field(field)) => {
                pop_field(stack, &field.descriptor)?;
                pop_single(stack)?;
            }

            (
                InvokeVirtual | InvokeSpecial | InvokeStatic | InvokeInterface,
                Operand::Method(method),
            ) => {
                self.invoke(stack, locals, insn.opcode, method)?;
            }
            (InvokeDynamic, Operand::Dynamic(call_site)) => {
                for parameter in call_site.descriptor.parameters.iter().rev() {
                    pop_field(stack, parameter)?;
                }
                if let Some(return_type) = &call_site.descriptor.return_type {
                    stack.extend(FrameValue::from_field_type(return_type));
                }
            }

            (AThrow, _) => {
                pop_single(stack)?;
                stack.clear();
            }

            (Jsr | JsrW, _) => stack.push(FrameValue::ReturnAddress(next.unwrap_or(id))),

            (IInc | IIncW | Ret | RetW | Nop | Breakpoint, _) => (),

            (
                Ldc | LdcW | Ldc2W | New | NewArray | ANewArray | CheckCast | MultiANewArray
                | GetStatic | GetField | PutStatic | PutField | InvokeVirtual | InvokeSpecial
                | InvokeStatic | InvokeInterface | InvokeDynamic,
                _,
            ) => return Err(AnalysisErrorKind::MissingOperand),

            (opcode, _) => {
                let info = opcode.info();
                if let StackBehavior::Fixed(pops) = info.pops {
                    for item in pops {
                        pop_item(stack, *item)?;
                    }
                }
                if let StackBehavior::Fixed(pushes) = info.pushes {
                    for item in pushes {
                        stack.extend(item_values(*item));
                    }
                }
            }
        }

        Ok(())
    }

    fn invoke(
        &mut self,
        stack: &mut Vec<FrameValue>,
        locals: &mut [FrameValue],
        opcode: Opcode,
        method: &MethodRef,
    ) -> Result<(), AnalysisErrorKind> {
        let is_constructor_call = opcode == Opcode::InvokeSpecial && method.is_constructor();
        if is_constructor_call {
            let expected = method.descriptor.parameter_length(true);
            if stack.len() < expected {
                return Err(AnalysisErrorKind::ConstructorArity {
                    expected,
                    found: stack.len(),
                });
            }
        }

        for parameter in method.descriptor.parameters.iter().rev() {
            pop_field(stack, parameter)?;
        }
        if opcode != Opcode::InvokeStatic {
            let receiver = pop_single(stack)?;

            if is_constructor_call {
                let initialized_type = match receiver {
                    FrameValue::UninitializedThis => RefType::Object(self.this_class.clone()),
                    FrameValue::Uninitialized(new) => {
                        self.initializations.insert(new, method.class.clone());
                        method.class.clone()
                    }
                    _ => return Err(AnalysisErrorKind::UninitializedReceiver),
                };
                let initialized = FrameValue::Reference(initialized_type);
                for value in locals.iter_mut().chain(stack.iter_mut()) {
                    if *value == receiver {
                        *value = initialized.clone();
                    }
                }
            }
        }

        if let Some(return_type) = self.hierarchy.resolve_return_type(method) {
            stack.extend(FrameValue::from_field_type(&return_type));
        }
        Ok(())
    }
}

fn load_local(frame: &mut Frame, slot: u16, access: LocalAccess) -> Result<(), AnalysisErrorKind> {
    let slot = slot as usize;
    match access.value_type {
        StackItem::Reference => {
            let value = match frame.locals.get(slot) {
                Some(value) if value.is_reference() => value.clone(),
                _ => FrameValue::Top,
            };
            frame.stack.push(value);
        }
        item => frame.stack.extend(item_values(item)),
    }
    Ok(())
}

fn store_local(frame: &mut Frame, slot: u16, access: LocalAccess) -> Result<(), AnalysisErrorKind> {
    let value = pop_item_value(&mut frame.stack, access.value_type)?;
    let width = access.value_type.slots();
    let end = slot as usize + width;
    if end > u16::MAX as usize + 1 {
        return Err(AnalysisErrorKind::InvalidLocal(slot));
    }

    let slot = slot as usize;
    if frame.locals.len() < end {
        frame.locals.resize(end, FrameValue::Top);
    }

    // Overwriting the filler of a double word value invalidates the value
    if slot > 0 && frame.is_local_filler(slot) {
        frame.locals[slot - 1] = FrameValue::Top;
    }
    frame.locals[slot] = value;
    if width == 2 {
        frame.locals[slot + 1] = FrameValue::Top;
    }
    Ok(())
}

/// Values a constant pushes onto the stack when loaded
fn constant_values(constant: &Constant) -> Vec<FrameValue> {
    match constant {
        Constant::Integer(_) => vec![FrameValue::Integer],
        Constant::Float(_) => vec![FrameValue::Float],
        Constant::Long(_) => vec![FrameValue::Long, FrameValue::Top],
        Constant::Double(_) => vec![FrameValue::Double, FrameValue::Top],
        Constant::String(_) => vec![FrameValue::object(BinaryName::STRING)],
        Constant::Class(_) => vec![FrameValue::object(BinaryName::CLASS)],
        Constant::MethodType(_) => vec![FrameValue::object(BinaryName::METHODTYPE)],
        Constant::MethodHandle(_) => vec![FrameValue::object(BinaryName::METHODHANDLE)],
        Constant::Dynamic(field_type) => FrameValue::from_field_type(field_type),
    }
}

/// Values for a fixed stack item being pushed
fn item_values(item: StackItem) -> Vec<FrameValue> {
    match item {
        StackItem::Int => vec![FrameValue::Integer],
        StackItem::Float => vec![FrameValue::Float],
        StackItem::Long => vec![FrameValue::Long, FrameValue::Top],
        StackItem::Double => vec![FrameValue::Double, FrameValue::Top],
        StackItem::Reference | StackItem::ReturnAddress | StackItem::Word1 => {
            vec![FrameValue::Top]
        }
        StackItem::Word2 => vec![FrameValue::Top, FrameValue::Top],
    }
}

/// Pop a fixed stack item
fn pop_item(stack: &mut Vec<FrameValue>, item: StackItem) -> Result<(), AnalysisErrorKind> {
    match item {
        StackItem::Word1 => pop_slots(stack, 1).map(|_| ()),
        StackItem::Word2 => pop_slots(stack, 2).map(|_| ()),
        _ => pop_item_value(stack, item).map(|_| ()),
    }
}

/// Pop a typed stack item, returning its value (without the filler)
fn pop_item_value(
    stack: &mut Vec<FrameValue>,
    item: StackItem,
) -> Result<FrameValue, AnalysisErrorKind> {
    if item.slots() == 2 {
        pop_double(stack)
    } else {
        pop_single(stack)
    }
}

fn pop_field(
    stack: &mut Vec<FrameValue>,
    field_type: &FieldType<BinaryName>,
) -> Result<FrameValue, AnalysisErrorKind> {
    if field_type.width() == 2 {
        pop_double(stack)
    } else {
        pop_single(stack)
    }
}

/// Pop a single slot value, which must not be half of a double word value
fn pop_single(stack: &mut Vec<FrameValue>) -> Result<FrameValue, AnalysisErrorKind> {
    let mut popped = pop_slots(stack, 1)?;
    Ok(popped.remove(0))
}

/// Pop a `long` or `double` along with its filler
fn pop_double(stack: &mut Vec<FrameValue>) -> Result<FrameValue, AnalysisErrorKind> {
    let filler = stack.pop().ok_or(AnalysisErrorKind::EmptyStack)?;
    let value = stack.pop().ok_or(AnalysisErrorKind::EmptyStack)?;
    match (value, filler) {
        (value, FrameValue::Top) if value.is_double_word() || value == FrameValue::Top => {
            Ok(value)
        }
        _ => Err(AnalysisErrorKind::InvalidWidth(1)),
    }
}

/// Pop `count` slots (top of the stack first), without splitting a double word value in two
fn pop_slots(
    stack: &mut Vec<FrameValue>,
    count: usize,
) -> Result<Vec<FrameValue>, AnalysisErrorKind> {
    if stack.len() < count {
        return Err(AnalysisErrorKind::EmptyStack);
    }
    let popped: Vec<FrameValue> = stack.drain(stack.len() - count..).rev().collect();
    if popped[0].is_double_word() {
        return Err(AnalysisErrorKind::InvalidWidth(2));
    }
    match stack.last() {
        Some(value) if value.is_double_word() => Err(AnalysisErrorKind::InvalidWidth(2)),
        _ => Ok(popped),
    }
}

/// Pop the operands of a stack shuffle
///
/// Each form lists the slot widths of the values it moves, top of the stack first. The popped
/// slots must split into values matching one of the forms.
fn pop_shuffle(
    stack: &mut Vec<FrameValue>,
    forms: &[&[usize]],
) -> Result<Vec<FrameValue>, AnalysisErrorKind> {
    let count = forms.first().map_or(0, |form| form.iter().sum());
    let popped = pop_slots(stack, count)?;

    // A double word value sits directly under its filler
    let mut widths = vec![];
    let mut slot = 0;
    while slot < popped.len() {
        if popped.get(slot + 1).map_or(false, FrameValue::is_double_word) {
            widths.push(2);
            slot += 2;
        } else if popped[slot].is_double_word() {
            return Err(AnalysisErrorKind::InvalidWidth(2));
        } else {
            widths.push(1);
            slot += 1;
        }
    }

    if forms.iter().any(|form| *form == widths.as_slice()) {
        Ok(popped)
    } else {
        Err(AnalysisErrorKind::InvalidWidth(2))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas};
    use crate::jvm::code::{FieldRef, InstructionSequence};
    use crate::jvm::{MethodDescriptor, Name, ParseDescriptor, UnqualifiedName};
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

    fn my_class() -> BinaryName {
        BinaryName::from_str("me/MyClass").unwrap()
    }

    fn string() -> FrameValue {
        FrameValue::object(BinaryName::STRING)
    }

    fn method(class: &str, name: &str, descriptor: &str) -> Operand {
        Operand::Method(MethodRef {
            class: RefType::Object(BinaryName::from_str(class).unwrap()),
            name: UnqualifiedName::from_str(name).unwrap(),
            descriptor: MethodDescriptor::parse(descriptor).unwrap(),
        })
    }

    /// Run one instruction from the given frame
    fn run(
        frame: &mut Frame,
        opcode: Opcode,
        operand: Operand,
    ) -> Result<(), AnalysisErrorKind> {
        let arenas = ClassGraphArenas::new();
        let graph = ClassGraph::new(&arenas);
        graph.insert_java_library_types();
        let this_class = my_class();
        let mut interpreter = Interpreter::new(&this_class, &graph);
        let insn = Instruction::new(opcode, operand).unwrap();
        interpreter.execute(frame, InsnId(0), &insn, Some(InsnId(1)))
    }

    #[test]
    fn arithmetic() {
        let binops = [
            (Integer, 1, vec![Opcode::IAdd, Opcode::ISub, Opcode::IMul, Opcode::IXor]),
            (Long, 2, vec![Opcode::LAdd, Opcode::LSub, Opcode::LMul, Opcode::LXor]),
            (Float, 1, vec![Opcode::FAdd, Opcode::FSub, Opcode::FDiv, Opcode::FRem]),
            (Double, 2, vec![Opcode::DAdd, Opcode::DSub, Opcode::DDiv, Opcode::DRem]),
        ];

        for (typ, width, opcodes) in binops {
            let operand: Vec<FrameValue> = if width == 2 {
                vec![typ.clone(), Top]
            } else {
                vec![typ.clone()]
            };
            for opcode in opcodes {
                let mut stack = operand.clone();
                stack.extend(operand.clone());
                let mut frame = Frame::new(vec![], stack);
                assert_eq!(
                    run(&mut frame, opcode, Operand::None),
                    Ok(()),
                    "Interpretation of {:?}",
                    opcode
                );
                assert_eq!(
                    frame,
                    Frame::new(vec![], operand.clone()),
                    "Output frame of {:?}",
                    opcode
                );

                // Try with a stack that is too small
                let mut frame = Frame::new(vec![], vec![]);
                assert_eq!(
                    run(&mut frame, opcode, Operand::None),
                    Err(AnalysisErrorKind::EmptyStack),
                    "Interpretation of {:?}",
                    opcode
                );
            }
        }
    }

    #[test]
    fn widths() {
        // `pop` would split a long in half
        let mut frame = new_frame([], [Long, Top]);
        assert_eq!(
            run(&mut frame, Opcode::Pop, Operand::None),
            Err(AnalysisErrorKind::InvalidWidth(2))
        );

        let mut frame = new_frame([], [Long, Top]);
        assert_eq!(run(&mut frame, Opcode::Pop2, Operand::None), Ok(()));
        assert_eq!(frame, new_frame([], []));

        // `ladd` on two pairs of ints
        let mut frame = new_frame([], [Integer, Integer, Integer, Integer]);
        assert_eq!(
            run(&mut frame, Opcode::LAdd, Operand::None),
            Err(AnalysisErrorKind::InvalidWidth(1))
        );

        // `i2l` on a long
        let mut frame = new_frame([], [Long, Top]);
        assert_eq!(
            run(&mut frame, Opcode::I2L, Operand::None),
            Err(AnalysisErrorKind::InvalidWidth(2))
        );
    }

    #[test]
    fn stack_shuffles() {
        let a = Integer;
        let b = Float;
        let c = string();
        let d = Null;

        let cases = [
            (Opcode::Dup, vec![a.clone()], vec![a.clone(), a.clone()]),
            (Opcode::Swap, vec![a.clone(), b.clone()], vec![b.clone(), a.clone()]),
            (
                Opcode::DupX1,
                vec![a.clone(), b.clone()],
                vec![b.clone(), a.clone(), b.clone()],
            ),
            (
                Opcode::DupX2,
                vec![a.clone(), b.clone(), c.clone()],
                vec![c.clone(), a.clone(), b.clone(), c.clone()],
            ),
            (
                Opcode::Dup2,
                vec![a.clone(), b.clone()],
                vec![a.clone(), b.clone(), a.clone(), b.clone()],
            ),
            (
                Opcode::Dup2X1,
                vec![a.clone(), b.clone(), c.clone()],
                vec![b.clone(), c.clone(), a.clone(), b.clone(), c.clone()],
            ),
            (
                Opcode::Dup2X2,
                vec![a.clone(), b.clone(), c.clone(), d.clone()],
                vec![c.clone(), d.clone(), a, b, c, d],
            ),
            (Opcode::Dup2, vec![Long, Top], vec![Long, Top, Long, Top]),
        ];

        for (opcode, before, after) in cases {
            let mut frame = Frame::new(vec![], before);
            assert_eq!(run(&mut frame, opcode, Operand::None), Ok(()), "{:?}", opcode);
            assert_eq!(frame.stack, after, "Output stack of {:?}", opcode);
        }

        let double_word_cases = [
            (
                Opcode::DupX2,
                vec![Long, Top, Integer],
                vec![Integer, Long, Top, Integer],
            ),
            (
                Opcode::Dup2X1,
                vec![Integer, Double, Top],
                vec![Double, Top, Integer, Double, Top],
            ),
            (
                Opcode::Dup2X2,
                vec![Long, Top, Double, Top],
                vec![Double, Top, Long, Top, Double, Top],
            ),
            (
                Opcode::Dup2X2,
                vec![Long, Top, Integer, Float],
                vec![Integer, Float, Long, Top, Integer, Float],
            ),
        ];

        for (opcode, before, after) in double_word_cases {
            let mut frame = Frame::new(vec![], before);
            assert_eq!(run(&mut frame, opcode, Operand::None), Ok(()), "{:?}", opcode);
            assert_eq!(frame.stack, after, "Output stack of {:?}", opcode);
        }
    }

    #[test]
    fn stack_shuffles_keep_double_words_whole() {
        let cases = [
            (Opcode::Swap, vec![Long, Top]),
            (Opcode::Swap, vec![Integer, Long, Top]),
            (Opcode::DupX1, vec![Integer, Long, Top]),
            (Opcode::DupX1, vec![Long, Top, Integer]),
            (Opcode::DupX2, vec![Integer, Long, Top]),
            (Opcode::Dup2X1, vec![Long, Top, Integer, Top]),
            (Opcode::Dup2X2, vec![Integer, Long, Top, Float]),
        ];

        for (opcode, before) in cases {
            let mut frame = Frame::new(vec![], before.clone());
            assert_eq!(
                run(&mut frame, opcode, Operand::None),
                Err(AnalysisErrorKind::InvalidWidth(2)),
                "{:?} on {:?}",
                opcode,
                before
            );
        }
    }

    #[test]
    fn locals() {
        let mut frame = new_frame([string()], [Long, Top]);
        assert_eq!(run(&mut frame, Opcode::LStore, Operand::Local(2)), Ok(()));
        assert_eq!(frame, new_frame([string(), Top, Long, Top], []));

        assert_eq!(run(&mut frame, Opcode::ALoad0, Operand::None), Ok(()));
        assert_eq!(run(&mut frame, Opcode::LLoad2, Operand::None), Ok(()));
        assert_eq!(frame.stack, vec![string(), Long, Top]);

        // Storing into the filler of the long kills the long
        let mut frame = new_frame([string(), Top, Long, Top], [Integer]);
        assert_eq!(run(&mut frame, Opcode::IStore3, Operand::None), Ok(()));
        assert_eq!(frame.locals, vec![string(), Top, Top, Integer]);

        // Loading a non-reference with `aload` produces `Top`
        let mut frame = new_frame([Integer], []);
        assert_eq!(run(&mut frame, Opcode::ALoad0, Operand::None), Ok(()));
        assert_eq!(frame.stack, vec![Top]);

        let mut frame = new_frame([], [Double, Top]);
        assert_eq!(
            run(&mut frame, Opcode::DStoreW, Operand::Local(u16::MAX)),
            Err(AnalysisErrorKind::InvalidLocal(u16::MAX))
        );
    }

    #[test]
    fn constants() {
        let mut frame = new_frame([], []);
        let class = Constant::Class(RefType::Object(BinaryName::STRING));
        assert_eq!(run(&mut frame, Opcode::Ldc, Operand::Constant(class)), Ok(()));
        let string_constant = Operand::Constant(Constant::String("hi".to_owned()));
        assert_eq!(run(&mut frame, Opcode::LdcW, string_constant), Ok(()));
        let long = Operand::Constant(Constant::Long(1));
        assert_eq!(run(&mut frame, Opcode::Ldc2W, long.clone()), Ok(()));
        assert_eq!(
            frame.stack,
            vec![FrameValue::object(BinaryName::CLASS), string(), Long, Top]
        );

        assert_eq!(
            run(&mut frame, Opcode::Ldc, long),
            Err(AnalysisErrorKind::NotLoadableConstant)
        );
        let int = Operand::Constant(Constant::Integer(1));
        assert_eq!(
            run(&mut frame, Opcode::Ldc2W, int),
            Err(AnalysisErrorKind::NotLoadableConstant)
        );
    }

    #[test]
    fn arrays() {
        let strings = FrameValue::Reference(RefType::array(FieldType::object(BinaryName::STRING)));
        let mut frame = new_frame([], [strings, Integer]);
        assert_eq!(run(&mut frame, Opcode::AALoad, Operand::None), Ok(()));
        assert_eq!(frame.stack, vec![string()]);

        let mut frame = new_frame([], [Null, Integer]);
        assert_eq!(run(&mut frame, Opcode::AALoad, Operand::None), Ok(()));
        assert_eq!(frame.stack, vec![Null]);

        let mut frame = new_frame([], [Integer, Integer]);
        let array_type = RefType::array(FieldType::array(FieldType::int()));
        let operand = Operand::MultiArray {
            array_type: array_type.clone(),
            dimensions: 2,
        };
        assert_eq!(run(&mut frame, Opcode::MultiANewArray, operand), Ok(()));
        assert_eq!(frame.stack, vec![FrameValue::Reference(array_type)]);

        let mut frame = new_frame([], [Integer]);
        let operand = Operand::Primitive(crate::jvm::BaseType::Byte);
        assert_eq!(run(&mut frame, Opcode::NewArray, operand), Ok(()));
        assert_eq!(
            frame.stack,
            vec![FrameValue::Reference(RefType::array(FieldType::Base(
                crate::jvm::BaseType::Byte
            )))]
        );
    }

    #[test]
    fn fields_and_calls() {
        let field = Operand::Field(FieldRef {
            class: my_class(),
            name: UnqualifiedName::from_str("count").unwrap(),
            descriptor: FieldType::long(),
        });
        let mut frame = new_frame([], [string()]);
        assert_eq!(run(&mut frame, Opcode::GetField, field.clone()), Ok(()));
        assert_eq!(frame.stack, vec![Long, Top]);
        assert_eq!(run(&mut frame, Opcode::PutStatic, field), Ok(()));
        assert!(frame.stack.is_empty());

        let mut frame = new_frame([], [string(), Integer, Long, Top]);
        let call = method("java/lang/String", "at", "(IJ)Ljava/lang/Object;");
        assert_eq!(run(&mut frame, Opcode::InvokeVirtual, call), Ok(()));
        assert_eq!(frame.stack, vec![FrameValue::object(BinaryName::OBJECT)]);

        let mut frame = new_frame([], [Integer]);
        let call = method("java/lang/Math", "abs", "(I)I");
        assert_eq!(run(&mut frame, Opcode::InvokeStatic, call), Ok(()));
        assert_eq!(frame.stack, vec![Integer]);

        let mut frame = new_frame([], [string()]);
        assert_eq!(run(&mut frame, Opcode::AThrow, Operand::None), Ok(()));
        assert!(frame.stack.is_empty());
    }

    #[test]
    fn constructors() {
        let arenas = ClassGraphArenas::new();
        let graph = ClassGraph::new(&arenas);
        graph.insert_java_library_types();
        let this_class = my_class();
        let mut interpreter = Interpreter::new(&this_class, &graph);

        let mut seq = InstructionSequence::new();
        let new = seq.push(
            Instruction::new(Opcode::New, Operand::Type(RefType::Object(BinaryName::STRING)))
                .unwrap(),
        );
        let dup = seq.push(Instruction::simple(Opcode::Dup).unwrap());
        let init = seq.push(
            Instruction::new(Opcode::InvokeSpecial, method("java/lang/String", "<init>", "()V"))
                .unwrap(),
        );

        let mut frame = new_frame([UninitializedThis], []);
        for id in [new, dup, init] {
            let insn = seq.get(id).unwrap();
            assert_eq!(interpreter.execute(&mut frame, id, insn, None), Ok(()));
        }
        assert_eq!(frame, new_frame([UninitializedThis], [string()]));
        assert_eq!(
            interpreter.initializations().get(&new),
            Some(&RefType::Object(BinaryName::STRING))
        );

        // `this` becomes the class being analyzed, not the superclass
        let mut frame = new_frame([UninitializedThis], [UninitializedThis]);
        let super_init = method("java/lang/Object", "<init>", "()V");
        assert_eq!(run(&mut frame, Opcode::InvokeSpecial, super_init.clone()), Ok(()));
        assert_eq!(frame, new_frame([FrameValue::object(my_class())], []));

        let mut frame = new_frame([], [string()]);
        assert_eq!(
            run(&mut frame, Opcode::InvokeSpecial, super_init),
            Err(AnalysisErrorKind::UninitializedReceiver)
        );

        let mut frame = new_frame([], [Uninitialized(InsnId(3))]);
        let init = method("java/lang/String", "<init>", "(II)V");
        assert_eq!(
            run(&mut frame, Opcode::InvokeSpecial, init),
            Err(AnalysisErrorKind::ConstructorArity {
                expected: 3,
                found: 1
            })
        );
    }

    #[test]
    fn subroutines() {
        let mut frame = new_frame([], []);
        assert_eq!(
            run(&mut frame, Opcode::Jsr, Operand::Branch(InsnId(5))),
            Ok(())
        );
        assert_eq!(frame.stack, vec![ReturnAddress(InsnId(1))]);

        assert_eq!(run(&mut frame, Opcode::AStore1, Operand::None), Ok(()));
        assert_eq!(frame, new_frame([Top, ReturnAddress(InsnId(1))], []));
        assert_eq!(run(&mut frame, Opcode::Ret, Operand::Local(1)), Ok(()));
    }
}
