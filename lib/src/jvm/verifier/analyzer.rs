use super::*;
use crate::jvm::code::{HandlerRange, InsnId, MethodBody, Opcode};
use crate::jvm::{BinaryName, Error, RefType};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Result of running the fixpoint analysis over a method body
#[derive(Debug, Clone)]
pub struct Analysis {
    entry_frame: Frame,

    /// Frame before every reachable instruction
    frames: HashMap<InsnId, Frame>,

    /// Offset of every instruction (reachable or not) at the time of the analysis
    offsets: HashMap<InsnId, usize>,

    /// Instructions whose frames go in the `StackMapTable`, sorted by offset
    retained: Vec<InsnId>,

    initializations: BTreeMap<InsnId, RefType<BinaryName>>,
    max_stack: usize,
    max_locals: usize,
}

impl Analysis {
    /// Frame the method starts with (derived from its descriptor)
    pub fn entry_frame(&self) -> &Frame {
        &self.entry_frame
    }

    /// Converged frame before an instruction, if the instruction is reachable
    pub fn frame_before(&self, insn: InsnId) -> Option<&Frame> {
        self.frames.get(&insn)
    }

    pub fn is_reachable(&self, insn: InsnId) -> bool {
        self.frames.contains_key(&insn)
    }

    /// Frames at branch targets and handler entries (plus the first instruction, when the entry
    /// frame is explicit), sorted by offset
    pub fn retained_frames(&self) -> impl Iterator<Item = (usize, &Frame)> + '_ {
        self.retained
            .iter()
            .filter_map(move |id| Some((*self.offsets.get(id)?, self.frames.get(id)?)))
    }

    /// For every `new` whose constructor was called, the type it was initialized to
    pub fn initializations(&self) -> &BTreeMap<InsnId, RefType<BinaryName>> {
        &self.initializations
    }

    /// Maximum stack height, in slots
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Number of local variable slots used
    pub fn max_locals(&self) -> usize {
        self.max_locals
    }

    /// Retained frames, in the form used in the `StackMapTable`
    pub fn wire_frames(&self) -> Result<Vec<(usize, WireFrame<WireType>)>, Error> {
        self.retained_frames()
            .map(|(offset, frame)| Ok::<_, Error>((offset, frame.to_wire(&self.offsets)?)))
            .collect()
    }

    /// Delta-encoded `StackMapTable` entries
    pub fn stack_map_table(&self) -> Result<Vec<StackMapFrame<WireType>>, Error> {
        let initial = self.entry_frame.to_wire(&self.offsets)?;
        encode_frames(&initial, &self.wire_frames()?)
    }
}

/// Frame at the start of a method: `this` (unless the method is static) followed by the
/// parameters, with an empty stack
pub fn entry_frame(method: &MethodBody) -> Frame {
    let mut locals = vec![];
    if !method.is_static() {
        locals.push(if method.is_constructor() {
            FrameValue::UninitializedThis
        } else {
            FrameValue::object(method.declaring_class.clone())
        });
    }
    for parameter in &method.descriptor.parameters {
        locals.extend(FrameValue::from_field_type(parameter));
    }
    Frame {
        locals,
        stack: vec![],
    }
}

/// Handler that catches an exception thrown at `offset`
///
/// When several handlers protect the instruction, the innermost one wins: the one whose handler
/// code starts closest after the instruction. Handlers placed before the instruction are only
/// picked if there is nothing else (first in table order).
fn innermost_handler(handlers: &[HandlerRange], offset: usize) -> Option<&HandlerRange> {
    let protecting = handlers.iter().filter(|handler| handler.protects(offset));
    let first = protecting.clone().next();
    protecting
        .filter(|handler| handler.handler_offset > offset)
        .min_by_key(|handler| handler.handler_offset)
        .or(first)
}

/// Fixpoint worklist analysis computing the frame before every reachable instruction
pub struct Analyzer<'a, H: TypeHierarchy + ?Sized> {
    method: &'a MethodBody,
    hierarchy: &'a H,
    settings: &'a AnalysisSettings,

    offsets: HashMap<InsnId, usize>,
    handlers: Vec<HandlerRange>,
    local_ranges: Vec<(u16, usize, usize)>,

    frames: HashMap<InsnId, Frame>,
    visits: HashMap<InsnId, usize>,

    /// Pending instructions, ordered by offset
    worklist: BTreeSet<(usize, InsnId)>,

    reached_handlers: HashSet<InsnId>,
    max_stack: usize,
    max_locals: usize,
}

impl<'a, H: TypeHierarchy + ?Sized> Analyzer<'a, H> {
    pub fn new(
        method: &'a MethodBody,
        hierarchy: &'a H,
        settings: &'a AnalysisSettings,
    ) -> Result<Analyzer<'a, H>, Error> {
        let offsets = method
            .instructions
            .iter()
            .map(|(id, _)| Ok::<_, Error>((id, method.instructions.offset(id)?)))
            .collect::<Result<_, Error>>()?;
        let handlers = method.handler_ranges()?;
        let local_ranges = if settings.prune_out_of_scope_locals {
            method.local_ranges()
        } else {
            vec![]
        };

        Ok(Analyzer {
            method,
            hierarchy,
            settings,
            offsets,
            handlers,
            local_ranges,
            frames: HashMap::new(),
            visits: HashMap::new(),
            worklist: BTreeSet::new(),
            reached_handlers: HashSet::new(),
            max_stack: 0,
            max_locals: 0,
        })
    }

    /// Run the analysis to convergence
    pub fn analyze(mut self) -> Result<Analysis, Error> {
        let method = self.method;
        let instructions = &method.instructions;
        let first = match instructions.first() {
            Some(first) => first,
            None => {
                log::error!("Method {} has no code", method.name);
                return Err(Error::FallsOffEnd { offset: 0 });
            }
        };

        let entry = entry_frame(method);
        self.max_locals = entry.locals.len();
        self.frames.insert(first, entry.clone());
        self.worklist.insert((0, first));

        let mut interpreter = Interpreter::new(&method.declaring_class, self.hierarchy);
        while let Some((offset, id)) = self.next_pending() {
            self.visit(&mut interpreter, offset, id)?;
        }

        // Frames go at every merge point
        let mut merge_points: HashSet<InsnId> = self
            .handlers
            .iter()
            .map(|handler| handler.handler)
            .collect();
        for (id, insn) in instructions.iter() {
            merge_points.extend(insn.branch_targets());
            if !self.frames.contains_key(&id) {
                log::warn!(
                    "Instruction {} at offset {} is unreachable",
                    insn,
                    self.offsets.get(&id).copied().unwrap_or_default()
                );
            }
        }
        if !self.settings.implicit_entry_frame {
            merge_points.insert(first);
        }
        let mut retained: Vec<(usize, InsnId)> = merge_points
            .into_iter()
            .filter(|id| self.frames.contains_key(id))
            .filter_map(|id| Some((*self.offsets.get(&id)?, id)))
            .collect();
        retained.sort_unstable();

        for handler in &self.handlers {
            if !self.reached_handlers.contains(&handler.handler) {
                log::warn!(
                    "Handler at offset {} for {} protects nothing that can throw",
                    handler.handler_offset,
                    handler.catch_type
                );
            }
        }

        Ok(Analysis {
            entry_frame: entry,
            frames: self.frames,
            offsets: self.offsets,
            retained: retained.into_iter().map(|(_, id)| id).collect(),
            initializations: interpreter.into_initializations(),
            max_stack: self.max_stack,
            max_locals: self.max_locals,
        })
    }

    /// Take the pending instruction with the lowest offset off the worklist
    fn next_pending(&mut self) -> Option<(usize, InsnId)> {
        let first = *self.worklist.iter().next()?;
        self.worklist.remove(&first);
        Some(first)
    }

    /// Interpret one instruction and propagate its output into its successors
    fn visit(
        &mut self,
        interpreter: &mut Interpreter<'a, H>,
        offset: usize,
        id: InsnId,
    ) -> Result<(), Error> {
        let method = self.method;
        let insn = method.instructions.get(id)?;
        let next = method.instructions.next(id)?;

        let visits = self.visits.entry(id).or_insert(0);
        *visits += 1;
        if *visits > self.settings.max_visits_per_instruction {
            log::error!("Gave up on {} at offset {} after {} visits", insn, offset, visits);
            return Err(Error::IterationLimit {
                offset,
                visits: *visits,
            });
        }

        let input = self
            .frames
            .get(&id)
            .cloned()
            .ok_or(Error::UnknownInstruction(id))?;
        log::debug!("Visiting {} at offset {} with {}", insn, offset, input);

        let mut output = input.clone();
        interpreter
            .execute(&mut output, id, insn, next)
            .map_err(|kind| {
                log::error!("Cannot interpret {} at offset {}: {:?} ({})", insn, offset, kind, input);
                Error::AnalysisError {
                    offset,
                    opcode: insn.opcode.mnemonic(),
                    kind,
                }
            })?;
        self.max_stack = self.max_stack.max(output.stack.len());
        self.max_locals = self.max_locals.max(output.locals.len());

        let mut successors: Vec<(InsnId, Frame)> = insn
            .branch_targets()
            .into_iter()
            .map(|target| (target, output.clone()))
            .collect();

        if insn.opcode.flow().falls_through() {
            let next = match next {
                Some(next) => next,
                None => {
                    log::error!("Control falls off the end of the method after {}", insn);
                    return Err(Error::FallsOffEnd { offset });
                }
            };

            // The subroutine called by `jsr` returns without the return address on the stack
            let fall_through_frame = match insn.opcode {
                Opcode::Jsr | Opcode::JsrW => input.clone(),
                _ => output,
            };
            successors.push((next, fall_through_frame));
        }

        if insn.opcode.can_throw() {
            if let Some(handler) = innermost_handler(&self.handlers, offset) {
                self.reached_handlers.insert(handler.handler);
                self.max_stack = self.max_stack.max(1);
                let handler_frame = Frame {
                    locals: input.locals.clone(),
                    stack: vec![FrameValue::object(handler.catch_type.clone())],
                };
                successors.push((handler.handler, handler_frame));
            }
        }

        for (successor, frame) in successors {
            self.propagate(offset, successor, frame)?;
        }
        Ok(())
    }

    /// Merge a candidate frame into the frame stored for a successor, queuing the successor for
    /// another visit if that changed anything
    fn propagate(&mut self, from: usize, successor: InsnId, mut frame: Frame) -> Result<(), Error> {
        let offset = *self
            .offsets
            .get(&successor)
            .ok_or(Error::UnknownInstruction(successor))?;
        if self.settings.prune_out_of_scope_locals {
            frame.prune_locals(offset, &self.local_ranges);
        } else {
            frame.trim_locals();
        }

        let updated = match self.frames.get(&successor) {
            None => {
                log::debug!("Offset {} reached from {} with {}", offset, from, frame);
                frame
            }
            Some(existing) => match existing.merge(&frame, self.hierarchy) {
                Ok(Merged::Unchanged) => return Ok(()),
                Ok(Merged::Changed(merged)) => {
                    log::trace!(
                        "Frame at offset {} widened from {} to {} (incoming from {})",
                        offset,
                        existing,
                        merged,
                        from
                    );
                    merged
                }
                Err(StackHeightMismatch { expected, found }) => {
                    log::error!(
                        "Stack height at offset {} is {} from offset {}, but was {} before",
                        offset,
                        found,
                        from,
                        expected
                    );
                    return Err(Error::InconsistentStackHeight {
                        offset,
                        expected,
                        found,
                    });
                }
            },
        };

        self.frames.insert(successor, updated);
        self.worklist.insert((offset, successor));
        Ok(())
    }
}

/// Compute the frames of a method body
pub fn analyze<H: TypeHierarchy + ?Sized>(
    method: &MethodBody,
    hierarchy: &H,
    settings: &AnalysisSettings,
) -> Result<Analysis, Error> {
    Analyzer::new(method, hierarchy, settings)?.analyze()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas};
    use crate::jvm::code::{
        ExceptionHandler, Instruction, LocalVariable, MethodRef, Operand, SwitchTable,
    };
    use crate::jvm::{
        AnalysisErrorKind, FieldType, MethodAccessFlags, MethodDescriptor, Name, ParseDescriptor,
        UnqualifiedName,
    };
    use FrameValue::*;

    fn method(name: &str, descriptor: &str, flags: MethodAccessFlags) -> MethodBody {
        MethodBody::new(
            BinaryName::from_str("me/Example").unwrap(),
            UnqualifiedName::from_str(name).unwrap(),
            MethodDescriptor::parse(descriptor).unwrap(),
            flags,
        )
    }

    fn simple(opcode: Opcode) -> Instruction {
        Instruction::simple(opcode).unwrap()
    }

    fn with(opcode: Opcode, operand: Operand) -> Instruction {
        Instruction::new(opcode, operand).unwrap()
    }

    fn run(body: &MethodBody, settings: &AnalysisSettings) -> Result<Analysis, Error> {
        let arenas = ClassGraphArenas::new();
        let graph = ClassGraph::new(&arenas);
        graph.insert_java_library_types();
        analyze(body, &graph, settings)
    }

    fn string() -> FrameValue {
        FrameValue::object(BinaryName::STRING)
    }

    #[test]
    fn entry_frames() {
        let body = method("run", "(JLjava/lang/String;D)V", MethodAccessFlags::PUBLIC);
        assert_eq!(
            entry_frame(&body).locals,
            vec![
                FrameValue::object(body.declaring_class.clone()),
                Long,
                Top,
                string(),
                Double,
                Top
            ]
        );

        let body = method("<init>", "(I)V", MethodAccessFlags::PUBLIC);
        assert_eq!(entry_frame(&body).locals, vec![UninitializedThis, Integer]);

        let body = method("main", "([Ljava/lang/String;)V", MethodAccessFlags::STATIC);
        assert_eq!(
            entry_frame(&body).locals,
            vec![FrameValue::Reference(RefType::array(FieldType::object(
                BinaryName::STRING
            )))]
        );
    }

    #[test]
    fn loop_converges() {
        // int i = 0; while (i < n) i++; return i;
        let mut body = method("count", "(I)I", MethodAccessFlags::STATIC);
        let seq = &mut body.instructions;
        seq.push(simple(Opcode::IConst0));
        seq.push(simple(Opcode::IStore1));
        let check = seq.push(simple(Opcode::ILoad1));
        seq.push(simple(Opcode::ILoad0));
        let exit_jump = seq.push(simple(Opcode::Nop));
        seq.push(with(Opcode::IInc, Operand::Increment { local: 1, delta: 1 }));
        seq.push(with(Opcode::Goto, Operand::Branch(check)));
        let exit = seq.push(simple(Opcode::ILoad1));
        seq.push(simple(Opcode::IReturn));
        seq.insert_before(exit_jump, with(Opcode::IfICmpGe, Operand::Branch(exit)))
            .unwrap();
        seq.remove(exit_jump).unwrap();

        let analysis = run(&body, &AnalysisSettings::new()).unwrap();
        assert_eq!(
            analysis.frame_before(check),
            Some(&Frame::new(vec![Integer, Integer], vec![]))
        );
        assert_eq!(analysis.max_stack(), 2);
        assert_eq!(analysis.max_locals(), 2);

        let offsets: Vec<usize> = analysis.retained_frames().map(|(offset, _)| offset).collect();
        assert_eq!(offsets, vec![2, 13]);
        let table = analysis.stack_map_table().unwrap();
        assert_eq!(
            table,
            vec![
                StackMapFrame::AppendLocalsNoStack {
                    offset_delta: 2,
                    locals: vec![VerificationType::Integer]
                },
                StackMapFrame::SameLocalsNoStack { offset_delta: 10 },
            ]
        );
    }

    #[test]
    fn explicit_entry_frame() {
        let mut body = method("noop", "()V", MethodAccessFlags::STATIC);
        body.instructions.push(simple(Opcode::Return));

        let analysis = run(&body, &AnalysisSettings::new()).unwrap();
        assert_eq!(analysis.stack_map_table().unwrap(), vec![]);

        let settings = AnalysisSettings {
            implicit_entry_frame: false,
            ..AnalysisSettings::new()
        };
        let analysis = run(&body, &settings).unwrap();
        assert_eq!(
            analysis.stack_map_table().unwrap(),
            vec![StackMapFrame::SameLocalsNoStack { offset_delta: 0 }]
        );
    }

    #[test]
    fn fatal_conditions() {
        // Stack heights disagree at the join
        let mut body = method("bad", "(I)V", MethodAccessFlags::STATIC);
        let seq = &mut body.instructions;
        seq.push(simple(Opcode::ILoad0));
        let branch = seq.push(simple(Opcode::Nop));
        seq.push(simple(Opcode::IConst1));
        let join = seq.push(simple(Opcode::Return));
        seq.insert_after(branch, with(Opcode::IfEq, Operand::Branch(join)))
            .unwrap();
        seq.remove(branch).unwrap();
        assert!(matches!(
            run(&body, &AnalysisSettings::new()),
            Err(Error::InconsistentStackHeight {
                offset: 5,
                expected: 0,
                found: 1
            })
        ));

        // Falling off the end
        let mut body = method("bad", "()V", MethodAccessFlags::STATIC);
        body.instructions.push(simple(Opcode::Nop));
        assert!(matches!(
            run(&body, &AnalysisSettings::new()),
            Err(Error::FallsOffEnd { offset: 0 })
        ));

        // Stack underflow names the offset and opcode
        let mut body = method("bad", "()V", MethodAccessFlags::STATIC);
        body.instructions.push(simple(Opcode::Nop));
        body.instructions.push(simple(Opcode::Pop));
        body.instructions.push(simple(Opcode::Return));
        assert!(matches!(
            run(&body, &AnalysisSettings::new()),
            Err(Error::AnalysisError {
                offset: 1,
                opcode: "pop",
                kind: AnalysisErrorKind::EmptyStack
            })
        ));

        // No code at all
        let body = method("bad", "()V", MethodAccessFlags::STATIC);
        assert!(matches!(
            run(&body, &AnalysisSettings::new()),
            Err(Error::FallsOffEnd { offset: 0 })
        ));
    }

    #[test]
    fn visit_limit() {
        let mut body = method("spin", "()V", MethodAccessFlags::STATIC);
        let top = body.instructions.push(simple(Opcode::Nop));
        body.instructions
            .push(with(Opcode::Goto, Operand::Branch(top)));

        // The self loop converges after the second visit
        assert!(run(&body, &AnalysisSettings::new()).is_ok());

        let settings = AnalysisSettings {
            max_visits_per_instruction: 0,
            ..AnalysisSettings::new()
        };
        assert!(matches!(
            run(&body, &settings),
            Err(Error::IterationLimit {
                offset: 0,
                visits: 1
            })
        ));
    }

    #[test]
    fn switches_and_dead_code() {
        let mut body = method("pick", "(I)I", MethodAccessFlags::STATIC);
        let seq = &mut body.instructions;
        seq.push(simple(Opcode::ILoad0));
        let placeholder = seq.push(simple(Opcode::Nop));
        let one = seq.push(simple(Opcode::IConst1));
        seq.push(simple(Opcode::IReturn));
        let dead = seq.push(simple(Opcode::Nop));
        let other = seq.push(simple(Opcode::IConst0));
        seq.push(simple(Opcode::IReturn));
        let switch = Operand::Switch(SwitchTable {
            default: other,
            cases: vec![(1, one), (2, one)],
        });
        seq.insert_before(placeholder, with(Opcode::TableSwitch, switch))
            .unwrap();
        seq.remove(placeholder).unwrap();

        let analysis = run(&body, &AnalysisSettings::new()).unwrap();
        assert!(analysis.is_reachable(one));
        assert!(analysis.is_reachable(other));
        assert!(!analysis.is_reachable(dead));
        assert_eq!(analysis.retained_frames().count(), 2);
    }

    #[test]
    fn handler_frames_use_input_locals() {
        // try { x = "a"; x.hashCode(); } catch (RuntimeException e) { return; }
        let mut body = method("guarded", "()V", MethodAccessFlags::STATIC);
        let seq = &mut body.instructions;
        let start = seq.push(simple(Opcode::AConstNull));
        seq.push(simple(Opcode::AStore0));
        seq.push(with(
            Opcode::Ldc,
            Operand::Constant(crate::jvm::code::Constant::String("a".to_owned())),
        ));
        seq.push(simple(Opcode::Dup));
        seq.push(simple(Opcode::AStore0));
        let call = seq.push(with(
            Opcode::InvokeVirtual,
            Operand::Method(MethodRef {
                class: RefType::Object(BinaryName::STRING),
                name: UnqualifiedName::from_str("hashCode").unwrap(),
                descriptor: MethodDescriptor::parse("()I").unwrap(),
            }),
        ));
        seq.push(simple(Opcode::Pop));
        seq.push(simple(Opcode::Return));
        let handler = seq.push(simple(Opcode::AStore1));
        seq.push(simple(Opcode::Return));
        body.exception_handlers.push(ExceptionHandler {
            try_start: start,
            try_end: call,
            handler,
            catch_type: Some(BinaryName::RUNTIMEEXCEPTION),
        });

        let analysis = run(&body, &AnalysisSettings::new()).unwrap();
        assert_eq!(
            analysis.frame_before(handler),
            Some(&Frame::new(
                vec![string()],
                vec![FrameValue::object(BinaryName::RUNTIMEEXCEPTION)]
            ))
        );
    }

    #[test]
    fn pruning_out_of_scope_locals() {
        // { int x = 1; } goto end; end: return
        let mut body = method("scoped", "()V", MethodAccessFlags::STATIC);
        let seq = &mut body.instructions;
        let start = seq.push(simple(Opcode::IConst1));
        let store = seq.push(simple(Opcode::IStore0));
        let jump = seq.push(simple(Opcode::Nop));
        let end = seq.push(simple(Opcode::Return));
        seq.insert_before(jump, with(Opcode::Goto, Operand::Branch(end)))
            .unwrap();
        seq.remove(jump).unwrap();
        body.local_variables.push(LocalVariable {
            slot: 0,
            start,
            end: store,
            name: UnqualifiedName::from_str("x").unwrap(),
            descriptor: FieldType::int(),
        });

        let analysis = run(&body, &AnalysisSettings::new()).unwrap();
        assert_eq!(analysis.frame_before(end), Some(&Frame::default()));

        let settings = AnalysisSettings {
            prune_out_of_scope_locals: false,
            ..AnalysisSettings::new()
        };
        let analysis = run(&body, &settings).unwrap();
        assert_eq!(
            analysis.frame_before(end),
            Some(&Frame::new(vec![Integer], vec![]))
        );
    }

    #[test]
    fn subroutines() {
        // jsr sub; return; sub: astore_0; ret 0
        let mut body = method("finally", "()V", MethodAccessFlags::STATIC);
        let seq = &mut body.instructions;
        let call = seq.push(simple(Opcode::Nop));
        let after = seq.push(simple(Opcode::Return));
        let sub = seq.push(simple(Opcode::AStore0));
        seq.push(with(Opcode::Ret, Operand::Local(0)));
        seq.insert_before(call, with(Opcode::Jsr, Operand::Branch(sub)))
            .unwrap();
        seq.remove(call).unwrap();

        let analysis = run(&body, &AnalysisSettings::new()).unwrap();
        assert_eq!(
            analysis.frame_before(sub),
            Some(&Frame::new(vec![], vec![ReturnAddress(after)]))
        );
        assert_eq!(analysis.frame_before(after), Some(&Frame::default()));
    }

    #[test]
    fn innermost_handlers() {
        let handler = |start, end, handler_offset| HandlerRange {
            start_offset: start,
            end_offset: end,
            handler: InsnId(handler_offset),
            handler_offset,
            catch_type: BinaryName::THROWABLE,
        };
        let handlers = [handler(0, 20, 30), handler(5, 10, 15), handler(0, 40, 2)];
        assert_eq!(innermost_handler(&handlers, 7).map(|h| h.handler_offset), Some(15));
        assert_eq!(innermost_handler(&handlers, 12).map(|h| h.handler_offset), Some(30));
        assert_eq!(innermost_handler(&handlers, 35).map(|h| h.handler_offset), Some(2));
        assert_eq!(innermost_handler(&handlers, 50), None);
    }
}
