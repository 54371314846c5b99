//! Static catalog of every opcode
//!
//! Each opcode has exactly one [`OpcodeInfo`] entry, describing how it is encoded, how control
//! leaves it, and what shape of values it pops and pushes. Opcodes whose stack effect depends on a
//! resolved reference (field and method access, `multianewarray`, `athrow`) are marked
//! [`StackBehavior::Variable`] and get special handling in the interpreter.
//!
//! The `wide` prefix is not an opcode of its own: the widened local variable instructions are
//! separate catalog entries whose code is `0xC4` followed by the widened opcode byte.

/// Every opcode, in increasing order of code
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Opcode {
    Nop,
    AConstNull,
    IConstM1,
    IConst0,
    IConst1,
    IConst2,
    IConst3,
    IConst4,
    IConst5,
    LConst0,
    LConst1,
    FConst0,
    FConst1,
    FConst2,
    DConst0,
    DConst1,
    BiPush,
    SiPush,
    Ldc,
    LdcW,
    Ldc2W,
    ILoad,
    LLoad,
    FLoad,
    DLoad,
    ALoad,
    ILoad0,
    ILoad1,
    ILoad2,
    ILoad3,
    LLoad0,
    LLoad1,
    LLoad2,
    LLoad3,
    FLoad0,
    FLoad1,
    FLoad2,
    FLoad3,
    DLoad0,
    DLoad1,
    DLoad2,
    DLoad3,
    ALoad0,
    ALoad1,
    ALoad2,
    ALoad3,
    IALoad,
    LALoad,
    FALoad,
    DALoad,
    AALoad,
    BALoad,
    CALoad,
    SALoad,
    IStore,
    LStore,
    FStore,
    DStore,
    AStore,
    IStore0,
    IStore1,
    IStore2,
    IStore3,
    LStore0,
    LStore1,
    LStore2,
    LStore3,
    FStore0,
    FStore1,
    FStore2,
    FStore3,
    DStore0,
    DStore1,
    DStore2,
    DStore3,
    AStore0,
    AStore1,
    AStore2,
    AStore3,
    IAStore,
    LAStore,
    FAStore,
    DAStore,
    AAStore,
    BAStore,
    CAStore,
    SAStore,
    Pop,
    Pop2,
    Dup,
    DupX1,
    DupX2,
    Dup2,
    Dup2X1,
    Dup2X2,
    Swap,
    IAdd,
    LAdd,
    FAdd,
    DAdd,
    ISub,
    LSub,
    FSub,
    DSub,
    IMul,
    LMul,
    FMul,
    DMul,
    IDiv,
    LDiv,
    FDiv,
    DDiv,
    IRem,
    LRem,
    FRem,
    DRem,
    INeg,
    LNeg,
    FNeg,
    DNeg,
    IShl,
    LShl,
    IShr,
    LShr,
    IUshr,
    LUshr,
    IAnd,
    LAnd,
    IOr,
    LOr,
    IXor,
    LXor,
    IInc,
    I2L,
    I2F,
    I2D,
    L2I,
    L2F,
    L2D,
    F2I,
    F2L,
    F2D,
    D2I,
    D2L,
    D2F,
    I2B,
    I2C,
    I2S,
    LCmp,
    FCmpL,
    FCmpG,
    DCmpL,
    DCmpG,
    IfEq,
    IfNe,
    IfLt,
    IfGe,
    IfGt,
    IfLe,
    IfICmpEq,
    IfICmpNe,
    IfICmpLt,
    IfICmpGe,
    IfICmpGt,
    IfICmpLe,
    IfACmpEq,
    IfACmpNe,
    Goto,
    Jsr,
    Ret,
    TableSwitch,
    LookupSwitch,
    IReturn,
    LReturn,
    FReturn,
    DReturn,
    AReturn,
    Return,
    GetStatic,
    PutStatic,
    GetField,
    PutField,
    InvokeVirtual,
    InvokeSpecial,
    InvokeStatic,
    InvokeInterface,
    InvokeDynamic,
    New,
    NewArray,
    ANewArray,
    ArrayLength,
    AThrow,
    CheckCast,
    InstanceOf,
    MonitorEnter,
    MonitorExit,
    MultiANewArray,
    IfNull,
    IfNonNull,
    GotoW,
    JsrW,
    Breakpoint,
    ILoadW,
    LLoadW,
    FLoadW,
    DLoadW,
    ALoadW,
    IStoreW,
    LStoreW,
    FStoreW,
    DStoreW,
    AStoreW,
    IIncW,
    RetW,
}

/// Shape of the operand an instruction carries in the code array
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum OperandKind {
    None,
    /// Signed byte immediate (`bipush`)
    Byte,
    /// Signed short immediate (`sipush`)
    Short,
    /// One byte constant pool index
    Constant,
    /// Two byte constant pool index
    WideConstant,
    /// Local variable index (one byte, two after `wide`)
    Local,
    /// Local variable index and signed increment
    LocalIncrement,
    /// Two byte signed branch offset
    Branch,
    /// Four byte signed branch offset
    WideBranch,
    /// Padded jump table (`tableswitch`, `lookupswitch`)
    Switch,
    Field,
    Method,
    Dynamic,
    Type,
    /// Array type and number of dimensions
    MultiArray,
    /// `newarray` element type code
    PrimitiveType,
}

/// How control leaves an instruction
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FlowControl {
    /// Continue with the next instruction
    Next,
    /// Unconditional jump (this includes the switches)
    Branch,
    /// Jump or continue with the next instruction
    ConditionalBranch,
    /// Method invocation or subroutine call
    Call,
    /// Leaves the method (or, for `ret`, the subroutine)
    Return,
    Throw,
    Breakpoint,
}

impl FlowControl {
    /// Can control reach the instruction after this one?
    pub const fn falls_through(self) -> bool {
        match self {
            FlowControl::Next
            | FlowControl::ConditionalBranch
            | FlowControl::Call
            | FlowControl::Breakpoint => true,
            FlowControl::Branch | FlowControl::Return | FlowControl::Throw => false,
        }
    }
}

/// Abstract kind of a value on the operand stack
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum StackItem {
    Int,
    Long,
    Float,
    Double,
    Reference,
    ReturnAddress,
    /// Any single slot value
    Word1,
    /// Two slots: either one long/double or two single slot values
    Word2,
}

impl StackItem {
    /// Number of stack slots the item occupies
    pub const fn slots(self) -> usize {
        match self {
            StackItem::Long | StackItem::Double | StackItem::Word2 => 2,
            _ => 1,
        }
    }
}

/// Values popped or pushed by an instruction
///
/// Popped items are listed from the top of the stack down; pushed items are listed in the order in
/// which they are pushed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum StackBehavior {
    Fixed(&'static [StackItem]),

    /// Depends on a resolved descriptor or operand
    Variable,
}

impl StackBehavior {
    /// Number of stack slots, if the behavior is fixed
    pub fn slots(&self) -> Option<usize> {
        match self {
            StackBehavior::Fixed(items) => Some(items.iter().map(|item| item.slots()).sum()),
            StackBehavior::Variable => None,
        }
    }
}

/// Catalog entry for one opcode
#[derive(Debug)]
pub struct OpcodeInfo {
    pub opcode: Opcode,
    pub mnemonic: &'static str,

    /// Opcode byte, or `0xC4xx` for the `wide` forms
    pub code: u16,

    /// Encoded size in bytes including the opcode (`0` when it depends on the operand)
    pub size: u8,

    pub operand: OperandKind,
    pub flow: FlowControl,
    pub pops: StackBehavior,
    pub pushes: StackBehavior,

    /// Can the instruction raise an exception that a handler could catch?
    pub can_throw: bool,
}

/// Whether a local variable instruction reads or writes the slot
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum LocalAccessKind {
    Load,
    Store,
}

/// Local variable access performed by a load or store opcode
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct LocalAccess {
    pub kind: LocalAccessKind,
    pub value_type: StackItem,

    /// Slot encoded in the opcode itself (eg. `2` for `aload_2`)
    pub implicit_slot: Option<u16>,
}

impl Opcode {
    /// Catalog entry
    pub fn info(self) -> &'static OpcodeInfo {
        &CATALOG[self as usize]
    }

    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }

    pub fn code(self) -> u16 {
        self.info().code
    }

    pub fn flow(self) -> FlowControl {
        self.info().flow
    }

    pub fn can_throw(self) -> bool {
        self.info().can_throw
    }

    /// Is this one of the `wide` forms?
    pub fn is_wide(self) -> bool {
        self.code() > 0xFF
    }

    /// Look up an opcode from its (possibly `wide`-prefixed) code
    pub fn from_code(code: u16) -> Option<Opcode> {
        CATALOG
            .binary_search_by_key(&code, |info| info.code)
            .ok()
            .map(|idx| CATALOG[idx].opcode)
    }

    /// Look up an opcode from its mnemonic
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        CATALOG
            .iter()
            .find(|info| info.mnemonic == mnemonic)
            .map(|info| info.opcode)
    }

    /// Every opcode in the catalog
    pub fn all() -> impl Iterator<Item = Opcode> {
        CATALOG.iter().map(|info| info.opcode)
    }

    /// Padding bytes between a switch opcode at this offset and its 4-byte aligned jump table
    pub const fn switch_padding(offset: usize) -> usize {
        (4 - (offset + 1) % 4) % 4
    }

    /// Local variable load or store performed by this opcode
    ///
    /// `iinc` and `ret` also refer to a local variable but are not included since they do not move
    /// values between the local and the stack.
    pub fn local_access(self) -> Option<LocalAccess> {
        use LocalAccessKind::{Load, Store};
        use Opcode::*;

        let (kind, value_type, implicit_base) = match self {
            ILoad | ILoadW => (Load, StackItem::Int, None),
            LLoad | LLoadW => (Load, StackItem::Long, None),
            FLoad | FLoadW => (Load, StackItem::Float, None),
            DLoad | DLoadW => (Load, StackItem::Double, None),
            ALoad | ALoadW => (Load, StackItem::Reference, None),
            ILoad0 | ILoad1 | ILoad2 | ILoad3 => (Load, StackItem::Int, Some(ILoad0)),
            LLoad0 | LLoad1 | LLoad2 | LLoad3 => (Load, StackItem::Long, Some(LLoad0)),
            FLoad0 | FLoad1 | FLoad2 | FLoad3 => (Load, StackItem::Float, Some(FLoad0)),
            DLoad0 | DLoad1 | DLoad2 | DLoad3 => (Load, StackItem::Double, Some(DLoad0)),
            ALoad0 | ALoad1 | ALoad2 | ALoad3 => (Load, StackItem::Reference, Some(ALoad0)),
            IStore | IStoreW => (Store, StackItem::Int, None),
            LStore | LStoreW => (Store, StackItem::Long, None),
            FStore | FStoreW => (Store, StackItem::Float, None),
            DStore | DStoreW => (Store, StackItem::Double, None),
            AStore | AStoreW => (Store, StackItem::Reference, None),
            IStore0 | IStore1 | IStore2 | IStore3 => (Store, StackItem::Int, Some(IStore0)),
            LStore0 | LStore1 | LStore2 | LStore3 => (Store, StackItem::Long, Some(LStore0)),
            FStore0 | FStore1 | FStore2 | FStore3 => (Store, StackItem::Float, Some(FStore0)),
            DStore0 | DStore1 | DStore2 | DStore3 => (Store, StackItem::Double, Some(DStore0)),
            AStore0 | AStore1 | AStore2 | AStore3 => (Store, StackItem::Reference, Some(AStore0)),
            _ => return None,
        };
        Some(LocalAccess {
            kind,
            value_type,
            implicit_slot: implicit_base.map(|base| self.code() - base.code()),
        })
    }
}

const NONE: StackBehavior = StackBehavior::Fixed(&[]);

#[allow(clippy::too_many_arguments)]
const fn info(
    opcode: Opcode,
    mnemonic: &'static str,
    code: u16,
    size: u8,
    operand: OperandKind,
    flow: FlowControl,
    pops: StackBehavior,
    pushes: StackBehavior,
    can_throw: bool,
) -> OpcodeInfo {
    OpcodeInfo {
        opcode,
        mnemonic,
        code,
        size,
        operand,
        flow,
        pops,
        pushes,
        can_throw,
    }
}

#[rustfmt::skip]
static CATALOG: [OpcodeInfo; 214] = {
    use Opcode::*;
    use StackBehavior::{Fixed, Variable};
    use StackItem::*;
    [
        info(Nop, "nop", 0x00, 1, OperandKind::None, FlowControl::Next, NONE, NONE, false),
        info(AConstNull, "aconst_null", 0x01, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Reference]), false),
        info(IConstM1, "iconst_m1", 0x02, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(IConst0, "iconst_0", 0x03, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(IConst1, "iconst_1", 0x04, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(IConst2, "iconst_2", 0x05, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(IConst3, "iconst_3", 0x06, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(IConst4, "iconst_4", 0x07, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(IConst5, "iconst_5", 0x08, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(LConst0, "lconst_0", 0x09, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Long]), false),
        info(LConst1, "lconst_1", 0x0A, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Long]), false),
        info(FConst0, "fconst_0", 0x0B, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Float]), false),
        info(FConst1, "fconst_1", 0x0C, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Float]), false),
        info(FConst2, "fconst_2", 0x0D, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Float]), false),
        info(DConst0, "dconst_0", 0x0E, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Double]), false),
        info(DConst1, "dconst_1", 0x0F, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Double]), false),
        info(BiPush, "bipush", 0x10, 2, OperandKind::Byte, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(SiPush, "sipush", 0x11, 3, OperandKind::Short, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(Ldc, "ldc", 0x12, 2, OperandKind::Constant, FlowControl::Next, NONE, Fixed(&[Word1]), false),
        info(LdcW, "ldc_w", 0x13, 3, OperandKind::WideConstant, FlowControl::Next, NONE, Fixed(&[Word1]), false),
        info(Ldc2W, "ldc2_w", 0x14, 3, OperandKind::WideConstant, FlowControl::Next, NONE, Fixed(&[Word2]), false),
        info(ILoad, "iload", 0x15, 2, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(LLoad, "lload", 0x16, 2, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Long]), false),
        info(FLoad, "fload", 0x17, 2, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Float]), false),
        info(DLoad, "dload", 0x18, 2, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Double]), false),
        info(ALoad, "aload", 0x19, 2, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Reference]), false),
        info(ILoad0, "iload_0", 0x1A, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(ILoad1, "iload_1", 0x1B, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(ILoad2, "iload_2", 0x1C, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(ILoad3, "iload_3", 0x1D, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(LLoad0, "lload_0", 0x1E, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Long]), false),
        info(LLoad1, "lload_1", 0x1F, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Long]), false),
        info(LLoad2, "lload_2", 0x20, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Long]), false),
        info(LLoad3, "lload_3", 0x21, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Long]), false),
        info(FLoad0, "fload_0", 0x22, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Float]), false),
        info(FLoad1, "fload_1", 0x23, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Float]), false),
        info(FLoad2, "fload_2", 0x24, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Float]), false),
        info(FLoad3, "fload_3", 0x25, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Float]), false),
        info(DLoad0, "dload_0", 0x26, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Double]), false),
        info(DLoad1, "dload_1", 0x27, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Double]), false),
        info(DLoad2, "dload_2", 0x28, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Double]), false),
        info(DLoad3, "dload_3", 0x29, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Double]), false),
        info(ALoad0, "aload_0", 0x2A, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Reference]), false),
        info(ALoad1, "aload_1", 0x2B, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Reference]), false),
        info(ALoad2, "aload_2", 0x2C, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Reference]), false),
        info(ALoad3, "aload_3", 0x2D, 1, OperandKind::None, FlowControl::Next, NONE, Fixed(&[Reference]), false),
        info(IALoad, "iaload", 0x2E, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Reference]), Fixed(&[Int]), true),
        info(LALoad, "laload", 0x2F, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Reference]), Fixed(&[Long]), true),
        info(FALoad, "faload", 0x30, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Reference]), Fixed(&[Float]), true),
        info(DALoad, "daload", 0x31, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Reference]), Fixed(&[Double]), true),
        info(AALoad, "aaload", 0x32, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Reference]), Fixed(&[Reference]), true),
        info(BALoad, "baload", 0x33, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Reference]), Fixed(&[Int]), true),
        info(CALoad, "caload", 0x34, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Reference]), Fixed(&[Int]), true),
        info(SALoad, "saload", 0x35, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Reference]), Fixed(&[Int]), true),
        info(IStore, "istore", 0x36, 2, OperandKind::Local, FlowControl::Next, Fixed(&[Int]), NONE, false),
        info(LStore, "lstore", 0x37, 2, OperandKind::Local, FlowControl::Next, Fixed(&[Long]), NONE, false),
        info(FStore, "fstore", 0x38, 2, OperandKind::Local, FlowControl::Next, Fixed(&[Float]), NONE, false),
        info(DStore, "dstore", 0x39, 2, OperandKind::Local, FlowControl::Next, Fixed(&[Double]), NONE, false),
        info(AStore, "astore", 0x3A, 2, OperandKind::Local, FlowControl::Next, Fixed(&[Reference]), NONE, false),
        info(IStore0, "istore_0", 0x3B, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), NONE, false),
        info(IStore1, "istore_1", 0x3C, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), NONE, false),
        info(IStore2, "istore_2", 0x3D, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), NONE, false),
        info(IStore3, "istore_3", 0x3E, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), NONE, false),
        info(LStore0, "lstore_0", 0x3F, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long]), NONE, false),
        info(LStore1, "lstore_1", 0x40, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long]), NONE, false),
        info(LStore2, "lstore_2", 0x41, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long]), NONE, false),
        info(LStore3, "lstore_3", 0x42, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long]), NONE, false),
        info(FStore0, "fstore_0", 0x43, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float]), NONE, false),
        info(FStore1, "fstore_1", 0x44, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float]), NONE, false),
        info(FStore2, "fstore_2", 0x45, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float]), NONE, false),
        info(FStore3, "fstore_3", 0x46, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float]), NONE, false),
        info(DStore0, "dstore_0", 0x47, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double]), NONE, false),
        info(DStore1, "dstore_1", 0x48, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double]), NONE, false),
        info(DStore2, "dstore_2", 0x49, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double]), NONE, false),
        info(DStore3, "dstore_3", 0x4A, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double]), NONE, false),
        info(AStore0, "astore_0", 0x4B, 1, OperandKind::None, FlowControl::Next, Fixed(&[Reference]), NONE, false),
        info(AStore1, "astore_1", 0x4C, 1, OperandKind::None, FlowControl::Next, Fixed(&[Reference]), NONE, false),
        info(AStore2, "astore_2", 0x4D, 1, OperandKind::None, FlowControl::Next, Fixed(&[Reference]), NONE, false),
        info(AStore3, "astore_3", 0x4E, 1, OperandKind::None, FlowControl::Next, Fixed(&[Reference]), NONE, false),
        info(IAStore, "iastore", 0x4F, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int, Reference]), NONE, true),
        info(LAStore, "lastore", 0x50, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Int, Reference]), NONE, true),
        info(FAStore, "fastore", 0x51, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float, Int, Reference]), NONE, true),
        info(DAStore, "dastore", 0x52, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double, Int, Reference]), NONE, true),
        info(AAStore, "aastore", 0x53, 1, OperandKind::None, FlowControl::Next, Fixed(&[Reference, Int, Reference]), NONE, true),
        info(BAStore, "bastore", 0x54, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int, Reference]), NONE, true),
        info(CAStore, "castore", 0x55, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int, Reference]), NONE, true),
        info(SAStore, "sastore", 0x56, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int, Reference]), NONE, true),
        info(Pop, "pop", 0x57, 1, OperandKind::None, FlowControl::Next, Fixed(&[Word1]), NONE, false),
        info(Pop2, "pop2", 0x58, 1, OperandKind::None, FlowControl::Next, Fixed(&[Word2]), NONE, false),
        info(Dup, "dup", 0x59, 1, OperandKind::None, FlowControl::Next, Fixed(&[Word1]), Fixed(&[Word1, Word1]), false),
        info(DupX1, "dup_x1", 0x5A, 1, OperandKind::None, FlowControl::Next, Fixed(&[Word1, Word1]), Fixed(&[Word1, Word1, Word1]), false),
        info(DupX2, "dup_x2", 0x5B, 1, OperandKind::None, FlowControl::Next, Fixed(&[Word2, Word1]), Fixed(&[Word1, Word2, Word1]), false),
        info(Dup2, "dup2", 0x5C, 1, OperandKind::None, FlowControl::Next, Fixed(&[Word2]), Fixed(&[Word2, Word2]), false),
        info(Dup2X1, "dup2_x1", 0x5D, 1, OperandKind::None, FlowControl::Next, Fixed(&[Word1, Word2]), Fixed(&[Word2, Word1, Word2]), false),
        info(Dup2X2, "dup2_x2", 0x5E, 1, OperandKind::None, FlowControl::Next, Fixed(&[Word2, Word2]), Fixed(&[Word2, Word2, Word2]), false),
        info(Swap, "swap", 0x5F, 1, OperandKind::None, FlowControl::Next, Fixed(&[Word1, Word1]), Fixed(&[Word1, Word1]), false),
        info(IAdd, "iadd", 0x60, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), false),
        info(LAdd, "ladd", 0x61, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Long]), Fixed(&[Long]), false),
        info(FAdd, "fadd", 0x62, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float, Float]), Fixed(&[Float]), false),
        info(DAdd, "dadd", 0x63, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double, Double]), Fixed(&[Double]), false),
        info(ISub, "isub", 0x64, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), false),
        info(LSub, "lsub", 0x65, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Long]), Fixed(&[Long]), false),
        info(FSub, "fsub", 0x66, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float, Float]), Fixed(&[Float]), false),
        info(DSub, "dsub", 0x67, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double, Double]), Fixed(&[Double]), false),
        info(IMul, "imul", 0x68, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), false),
        info(LMul, "lmul", 0x69, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Long]), Fixed(&[Long]), false),
        info(FMul, "fmul", 0x6A, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float, Float]), Fixed(&[Float]), false),
        info(DMul, "dmul", 0x6B, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double, Double]), Fixed(&[Double]), false),
        info(IDiv, "idiv", 0x6C, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), true),
        info(LDiv, "ldiv", 0x6D, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Long]), Fixed(&[Long]), true),
        info(FDiv, "fdiv", 0x6E, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float, Float]), Fixed(&[Float]), false),
        info(DDiv, "ddiv", 0x6F, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double, Double]), Fixed(&[Double]), false),
        info(IRem, "irem", 0x70, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), true),
        info(LRem, "lrem", 0x71, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Long]), Fixed(&[Long]), true),
        info(FRem, "frem", 0x72, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float, Float]), Fixed(&[Float]), false),
        info(DRem, "drem", 0x73, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double, Double]), Fixed(&[Double]), false),
        info(INeg, "ineg", 0x74, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), Fixed(&[Int]), false),
        info(LNeg, "lneg", 0x75, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long]), Fixed(&[Long]), false),
        info(FNeg, "fneg", 0x76, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float]), Fixed(&[Float]), false),
        info(DNeg, "dneg", 0x77, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double]), Fixed(&[Double]), false),
        info(IShl, "ishl", 0x78, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), false),
        info(LShl, "lshl", 0x79, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Long]), Fixed(&[Long]), false),
        info(IShr, "ishr", 0x7A, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), false),
        info(LShr, "lshr", 0x7B, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Long]), Fixed(&[Long]), false),
        info(IUshr, "iushr", 0x7C, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), false),
        info(LUshr, "lushr", 0x7D, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Long]), Fixed(&[Long]), false),
        info(IAnd, "iand", 0x7E, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), false),
        info(LAnd, "land", 0x7F, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Long]), Fixed(&[Long]), false),
        info(IOr, "ior", 0x80, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), false),
        info(LOr, "lor", 0x81, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Long]), Fixed(&[Long]), false),
        info(IXor, "ixor", 0x82, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int, Int]), Fixed(&[Int]), false),
        info(LXor, "lxor", 0x83, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Long]), Fixed(&[Long]), false),
        info(IInc, "iinc", 0x84, 3, OperandKind::LocalIncrement, FlowControl::Next, NONE, NONE, false),
        info(I2L, "i2l", 0x85, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), Fixed(&[Long]), false),
        info(I2F, "i2f", 0x86, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), Fixed(&[Float]), false),
        info(I2D, "i2d", 0x87, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), Fixed(&[Double]), false),
        info(L2I, "l2i", 0x88, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long]), Fixed(&[Int]), false),
        info(L2F, "l2f", 0x89, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long]), Fixed(&[Float]), false),
        info(L2D, "l2d", 0x8A, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long]), Fixed(&[Double]), false),
        info(F2I, "f2i", 0x8B, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float]), Fixed(&[Int]), false),
        info(F2L, "f2l", 0x8C, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float]), Fixed(&[Long]), false),
        info(F2D, "f2d", 0x8D, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float]), Fixed(&[Double]), false),
        info(D2I, "d2i", 0x8E, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double]), Fixed(&[Int]), false),
        info(D2L, "d2l", 0x8F, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double]), Fixed(&[Long]), false),
        info(D2F, "d2f", 0x90, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double]), Fixed(&[Float]), false),
        info(I2B, "i2b", 0x91, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), Fixed(&[Int]), false),
        info(I2C, "i2c", 0x92, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), Fixed(&[Int]), false),
        info(I2S, "i2s", 0x93, 1, OperandKind::None, FlowControl::Next, Fixed(&[Int]), Fixed(&[Int]), false),
        info(LCmp, "lcmp", 0x94, 1, OperandKind::None, FlowControl::Next, Fixed(&[Long, Long]), Fixed(&[Int]), false),
        info(FCmpL, "fcmpl", 0x95, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float, Float]), Fixed(&[Int]), false),
        info(FCmpG, "fcmpg", 0x96, 1, OperandKind::None, FlowControl::Next, Fixed(&[Float, Float]), Fixed(&[Int]), false),
        info(DCmpL, "dcmpl", 0x97, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double, Double]), Fixed(&[Int]), false),
        info(DCmpG, "dcmpg", 0x98, 1, OperandKind::None, FlowControl::Next, Fixed(&[Double, Double]), Fixed(&[Int]), false),
        info(IfEq, "ifeq", 0x99, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int]), NONE, false),
        info(IfNe, "ifne", 0x9A, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int]), NONE, false),
        info(IfLt, "iflt", 0x9B, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int]), NONE, false),
        info(IfGe, "ifge", 0x9C, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int]), NONE, false),
        info(IfGt, "ifgt", 0x9D, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int]), NONE, false),
        info(IfLe, "ifle", 0x9E, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int]), NONE, false),
        info(IfICmpEq, "if_icmpeq", 0x9F, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int, Int]), NONE, false),
        info(IfICmpNe, "if_icmpne", 0xA0, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int, Int]), NONE, false),
        info(IfICmpLt, "if_icmplt", 0xA1, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int, Int]), NONE, false),
        info(IfICmpGe, "if_icmpge", 0xA2, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int, Int]), NONE, false),
        info(IfICmpGt, "if_icmpgt", 0xA3, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int, Int]), NONE, false),
        info(IfICmpLe, "if_icmple", 0xA4, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Int, Int]), NONE, false),
        info(IfACmpEq, "if_acmpeq", 0xA5, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Reference, Reference]), NONE, false),
        info(IfACmpNe, "if_acmpne", 0xA6, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Reference, Reference]), NONE, false),
        info(Goto, "goto", 0xA7, 3, OperandKind::Branch, FlowControl::Branch, NONE, NONE, false),
        info(Jsr, "jsr", 0xA8, 3, OperandKind::Branch, FlowControl::Call, NONE, Fixed(&[ReturnAddress]), false),
        info(Ret, "ret", 0xA9, 2, OperandKind::Local, FlowControl::Return, NONE, NONE, false),
        info(TableSwitch, "tableswitch", 0xAA, 0, OperandKind::Switch, FlowControl::Branch, Fixed(&[Int]), NONE, false),
        info(LookupSwitch, "lookupswitch", 0xAB, 0, OperandKind::Switch, FlowControl::Branch, Fixed(&[Int]), NONE, false),
        info(IReturn, "ireturn", 0xAC, 1, OperandKind::None, FlowControl::Return, Fixed(&[Int]), NONE, false),
        info(LReturn, "lreturn", 0xAD, 1, OperandKind::None, FlowControl::Return, Fixed(&[Long]), NONE, false),
        info(FReturn, "freturn", 0xAE, 1, OperandKind::None, FlowControl::Return, Fixed(&[Float]), NONE, false),
        info(DReturn, "dreturn", 0xAF, 1, OperandKind::None, FlowControl::Return, Fixed(&[Double]), NONE, false),
        info(AReturn, "areturn", 0xB0, 1, OperandKind::None, FlowControl::Return, Fixed(&[Reference]), NONE, false),
        info(Return, "return", 0xB1, 1, OperandKind::None, FlowControl::Return, NONE, NONE, false),
        info(GetStatic, "getstatic", 0xB2, 3, OperandKind::Field, FlowControl::Next, NONE, Variable, true),
        info(PutStatic, "putstatic", 0xB3, 3, OperandKind::Field, FlowControl::Next, Variable, NONE, true),
        info(GetField, "getfield", 0xB4, 3, OperandKind::Field, FlowControl::Next, Fixed(&[Reference]), Variable, true),
        info(PutField, "putfield", 0xB5, 3, OperandKind::Field, FlowControl::Next, Variable, NONE, true),
        info(InvokeVirtual, "invokevirtual", 0xB6, 3, OperandKind::Method, FlowControl::Call, Variable, Variable, true),
        info(InvokeSpecial, "invokespecial", 0xB7, 3, OperandKind::Method, FlowControl::Call, Variable, Variable, true),
        info(InvokeStatic, "invokestatic", 0xB8, 3, OperandKind::Method, FlowControl::Call, Variable, Variable, true),
        info(InvokeInterface, "invokeinterface", 0xB9, 5, OperandKind::Method, FlowControl::Call, Variable, Variable, true),
        info(InvokeDynamic, "invokedynamic", 0xBA, 5, OperandKind::Dynamic, FlowControl::Call, Variable, Variable, true),
        info(New, "new", 0xBB, 3, OperandKind::Type, FlowControl::Next, NONE, Fixed(&[Reference]), true),
        info(NewArray, "newarray", 0xBC, 2, OperandKind::PrimitiveType, FlowControl::Next, Fixed(&[Int]), Fixed(&[Reference]), true),
        info(ANewArray, "anewarray", 0xBD, 3, OperandKind::Type, FlowControl::Next, Fixed(&[Int]), Fixed(&[Reference]), true),
        info(ArrayLength, "arraylength", 0xBE, 1, OperandKind::None, FlowControl::Next, Fixed(&[Reference]), Fixed(&[Int]), true),
        info(AThrow, "athrow", 0xBF, 1, OperandKind::None, FlowControl::Throw, Variable, NONE, true),
        info(CheckCast, "checkcast", 0xC0, 3, OperandKind::Type, FlowControl::Next, Fixed(&[Reference]), Fixed(&[Reference]), true),
        info(InstanceOf, "instanceof", 0xC1, 3, OperandKind::Type, FlowControl::Next, Fixed(&[Reference]), Fixed(&[Int]), false),
        info(MonitorEnter, "monitorenter", 0xC2, 1, OperandKind::None, FlowControl::Next, Fixed(&[Reference]), NONE, true),
        info(MonitorExit, "monitorexit", 0xC3, 1, OperandKind::None, FlowControl::Next, Fixed(&[Reference]), NONE, true),
        info(MultiANewArray, "multianewarray", 0xC5, 4, OperandKind::MultiArray, FlowControl::Next, Variable, Fixed(&[Reference]), true),
        info(IfNull, "ifnull", 0xC6, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Reference]), NONE, false),
        info(IfNonNull, "ifnonnull", 0xC7, 3, OperandKind::Branch, FlowControl::ConditionalBranch, Fixed(&[Reference]), NONE, false),
        info(GotoW, "goto_w", 0xC8, 5, OperandKind::WideBranch, FlowControl::Branch, NONE, NONE, false),
        info(JsrW, "jsr_w", 0xC9, 5, OperandKind::WideBranch, FlowControl::Call, NONE, Fixed(&[ReturnAddress]), false),
        info(Breakpoint, "breakpoint", 0xCA, 1, OperandKind::None, FlowControl::Breakpoint, NONE, NONE, false),
        info(ILoadW, "iload_w", 0xC415, 4, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Int]), false),
        info(LLoadW, "lload_w", 0xC416, 4, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Long]), false),
        info(FLoadW, "fload_w", 0xC417, 4, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Float]), false),
        info(DLoadW, "dload_w", 0xC418, 4, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Double]), false),
        info(ALoadW, "aload_w", 0xC419, 4, OperandKind::Local, FlowControl::Next, NONE, Fixed(&[Reference]), false),
        info(IStoreW, "istore_w", 0xC436, 4, OperandKind::Local, FlowControl::Next, Fixed(&[Int]), NONE, false),
        info(LStoreW, "lstore_w", 0xC437, 4, OperandKind::Local, FlowControl::Next, Fixed(&[Long]), NONE, false),
        info(FStoreW, "fstore_w", 0xC438, 4, OperandKind::Local, FlowControl::Next, Fixed(&[Float]), NONE, false),
        info(DStoreW, "dstore_w", 0xC439, 4, OperandKind::Local, FlowControl::Next, Fixed(&[Double]), NONE, false),
        info(AStoreW, "astore_w", 0xC43A, 4, OperandKind::Local, FlowControl::Next, Fixed(&[Reference]), NONE, false),
        info(IIncW, "iinc_w", 0xC484, 6, OperandKind::LocalIncrement, FlowControl::Next, NONE, NONE, false),
        info(RetW, "ret_w", 0xC4A9, 4, OperandKind::Local, FlowControl::Return, NONE, NONE, false),
    ]
};
