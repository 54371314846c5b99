use super::TypeHierarchy;
use crate::jvm::code::InsnId;
use crate::jvm::{BaseType, BinaryName, FieldType, RefType, RenderDescriptor};
use crate::util::Width;
use std::fmt;

/// Abstract value held in one local variable slot or operand stack slot
///
/// Values form a lattice whose top element is `Top` (and, for locals, `Empty`). Double word values
/// (`Long` and `Double`) are always followed by a `Top` filler in the next slot.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum FrameValue {
    /// Local variable which is out of scope (never on the stack)
    Empty,

    /// Unusable value
    Top,

    Integer,
    Float,
    Long,
    Double,
    Null,

    /// Initialized reference
    Reference(RefType<BinaryName>),

    /// Return address pushed by `jsr`, pointing at the instruction after the `jsr`
    ReturnAddress(InsnId),

    /// Object allocated by the `new` instruction with this id, before its constructor is called
    Uninitialized(InsnId),

    /// `this` inside a constructor, before the superclass constructor is called
    UninitializedThis,
}

impl FrameValue {
    pub fn object(class: BinaryName) -> FrameValue {
        FrameValue::Reference(RefType::Object(class))
    }

    /// Is this a `long` or `double` (which is followed by a filler slot)?
    pub fn is_double_word(&self) -> bool {
        matches!(self, FrameValue::Long | FrameValue::Double)
    }

    /// Can this value sit in a reference typed slot?
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            FrameValue::Null
                | FrameValue::Reference(_)
                | FrameValue::Uninitialized(_)
                | FrameValue::UninitializedThis
        )
    }

    /// Is this one of the two uninitialized markers?
    pub fn is_uninitialized(&self) -> bool {
        matches!(
            self,
            FrameValue::Uninitialized(_) | FrameValue::UninitializedThis
        )
    }

    /// Value (plus filler, for `long`/`double`) of a field or method type
    pub fn from_field_type(field_type: &FieldType<BinaryName>) -> Vec<FrameValue> {
        match field_type {
            FieldType::Base(BaseType::Long) => vec![FrameValue::Long, FrameValue::Top],
            FieldType::Base(BaseType::Double) => vec![FrameValue::Double, FrameValue::Top],
            FieldType::Base(BaseType::Float) => vec![FrameValue::Float],
            FieldType::Base(_) => vec![FrameValue::Integer],
            FieldType::Ref(ref_type) => vec![FrameValue::Reference(ref_type.clone())],
        }
    }

    /// Least upper bound of two values
    ///
    /// `Empty` absorbs everything (an out of scope local stays out of scope), `Top` absorbs
    /// everything else, and `null` merges into any reference. Two references merge into their
    /// nearest common supertype, or `Top` if the hierarchy cannot relate them. All other
    /// disagreements (including two different uninitialized markers) produce `Top`.
    pub fn merge<H: TypeHierarchy + ?Sized>(&self, other: &FrameValue, hierarchy: &H) -> FrameValue {
        use FrameValue::*;

        if self == other {
            return self.clone();
        }
        match (self, other) {
            (Empty, _) | (_, Empty) => Empty,
            (Top, _) | (_, Top) => Top,
            (Null, Reference(_)) => other.clone(),
            (Reference(_), Null) => self.clone(),
            (Reference(type1), Reference(type2)) => match hierarchy.common_supertype(type1, type2) {
                Some(common) => Reference(common),
                None => Top,
            },
            _ => Top,
        }
    }
}

impl Width for FrameValue {
    fn width(&self) -> usize {
        if self.is_double_word() {
            2
        } else {
            1
        }
    }
}

impl fmt::Display for FrameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameValue::Empty => f.write_str("empty"),
            FrameValue::Top => f.write_str("top"),
            FrameValue::Integer => f.write_str("int"),
            FrameValue::Float => f.write_str("float"),
            FrameValue::Long => f.write_str("long"),
            FrameValue::Double => f.write_str("double"),
            FrameValue::Null => f.write_str("null"),
            FrameValue::Reference(RefType::Object(class)) => write!(f, "{}", class),
            FrameValue::Reference(array) => f.write_str(&array.render()),
            FrameValue::ReturnAddress(target) => write!(f, "address({})", target),
            FrameValue::Uninitialized(new) => write!(f, "uninitialized({})", new),
            FrameValue::UninitializedThis => f.write_str("uninitializedThis"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas};
    use quickcheck::{quickcheck, Arbitrary, Gen};

    const CLASSES: [BinaryName; 6] = [
        BinaryName::OBJECT,
        BinaryName::STRING,
        BinaryName::INTEGER,
        BinaryName::NUMBER,
        BinaryName::EXCEPTION,
        BinaryName::CHARSEQUENCE,
    ];

    impl Arbitrary for FrameValue {
        fn arbitrary<G: Gen>(g: &mut G) -> Self {
            let class = CLASSES[(u32::arbitrary(g) % CLASSES.len() as u32) as usize].clone();
            match u32::arbitrary(g) % 13 {
                0 => FrameValue::Empty,
                1 => FrameValue::Top,
                2 => FrameValue::Integer,
                3 => FrameValue::Float,
                4 => FrameValue::Long,
                5 => FrameValue::Double,
                6 => FrameValue::Null,
                7 => FrameValue::ReturnAddress(InsnId((u32::arbitrary(g) % 3) as usize)),
                8 => FrameValue::Uninitialized(InsnId((u32::arbitrary(g) % 3) as usize)),
                9 => FrameValue::UninitializedThis,
                10 => FrameValue::Reference(RefType::array(FieldType::object(class))),
                _ => FrameValue::object(class),
            }
        }
    }

    quickcheck! {
        fn merge_is_idempotent(value: FrameValue) -> bool {
            let arenas = ClassGraphArenas::new();
            let graph = ClassGraph::new(&arenas);
            graph.insert_java_library_types();
            value.merge(&value, &graph) == value
        }

        fn merge_is_commutative(value1: FrameValue, value2: FrameValue) -> bool {
            let arenas = ClassGraphArenas::new();
            let graph = ClassGraph::new(&arenas);
            graph.insert_java_library_types();
            value1.merge(&value2, &graph) == value2.merge(&value1, &graph)
        }

        fn top_never_becomes_specific(values: Vec<FrameValue>) -> bool {
            let arenas = ClassGraphArenas::new();
            let graph = ClassGraph::new(&arenas);
            graph.insert_java_library_types();
            let mut current = FrameValue::Top;
            for value in values {
                current = current.merge(&value, &graph);
                if current != FrameValue::Top && current != FrameValue::Empty {
                    return false;
                }
            }
            true
        }
    }

    #[test]
    fn merge_table() {
        let arenas = ClassGraphArenas::new();
        let graph = ClassGraph::new(&arenas);
        graph.insert_java_library_types();

        let string = FrameValue::object(BinaryName::STRING);
        let integer = FrameValue::object(BinaryName::INTEGER);
        let cases = [
            (FrameValue::Integer, FrameValue::Integer, FrameValue::Integer),
            (FrameValue::Integer, FrameValue::Float, FrameValue::Top),
            (FrameValue::Long, FrameValue::Double, FrameValue::Top),
            (FrameValue::Empty, FrameValue::Integer, FrameValue::Empty),
            (FrameValue::Top, string.clone(), FrameValue::Top),
            (FrameValue::Null, string.clone(), string.clone()),
            (FrameValue::Null, FrameValue::Null, FrameValue::Null),
            (string.clone(), integer, FrameValue::object(BinaryName::OBJECT)),
            (FrameValue::Null, FrameValue::UninitializedThis, FrameValue::Top),
            (
                FrameValue::Uninitialized(InsnId(1)),
                FrameValue::Uninitialized(InsnId(2)),
                FrameValue::Top,
            ),
            (
                FrameValue::Uninitialized(InsnId(1)),
                string.clone(),
                FrameValue::Top,
            ),
            (
                FrameValue::ReturnAddress(InsnId(1)),
                FrameValue::ReturnAddress(InsnId(2)),
                FrameValue::Top,
            ),
        ];
        for (value1, value2, expected) in cases {
            assert_eq!(
                value1.merge(&value2, &graph),
                expected,
                "{} ⊔ {} should be {}",
                value1,
                value2,
                expected
            );
        }

        let unknown = FrameValue::object(crate::jvm::Name::from_str("me/Unknown").unwrap());
        assert_eq!(unknown.merge(&string, &graph), FrameValue::Top);
    }

    #[test]
    fn field_types() {
        assert_eq!(
            FrameValue::from_field_type(&FieldType::long()),
            vec![FrameValue::Long, FrameValue::Top]
        );
        assert_eq!(
            FrameValue::from_field_type(&FieldType::boolean()),
            vec![FrameValue::Integer]
        );
        assert_eq!(
            FrameValue::from_field_type(&FieldType::object(BinaryName::STRING)).len(),
            1
        );
    }
}
