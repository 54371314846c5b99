use super::{BinaryName, ClassAccessFlags, ClassData, ClassGraph, ClassId};
use elsa::FrozenVec;

/// Classes from the Java standard library that bytecode routinely refers to
pub struct JavaClasses<'g> {
    pub lang: LangClasses<'g>,
    pub io: IoClasses<'g>,
}

/// Classes inside `java.lang.*`
pub struct LangClasses<'g> {
    pub object: ClassId<'g>,
    pub cloneable: ClassId<'g>,
    pub comparable: ClassId<'g>,
    pub char_sequence: ClassId<'g>,
    pub string: ClassId<'g>,
    pub class: ClassId<'g>,
    pub number: ClassId<'g>,
    pub integer: ClassId<'g>,
    pub float: ClassId<'g>,
    pub long: ClassId<'g>,
    pub double: ClassId<'g>,
    pub invoke: InvokeClasses<'g>,
    pub throwable: ClassId<'g>,
    pub error: ClassId<'g>,
    pub exception: ClassId<'g>,
    pub runtime_exception: ClassId<'g>,
    pub arithmetic_exception: ClassId<'g>,
    pub array_index_out_of_bounds_exception: ClassId<'g>,
    pub class_cast_exception: ClassId<'g>,
    pub illegal_argument_exception: ClassId<'g>,
    pub illegal_state_exception: ClassId<'g>,
    pub null_pointer_exception: ClassId<'g>,
}

/// Classes inside `java.lang.invoke.*`
pub struct InvokeClasses<'g> {
    pub method_type: ClassId<'g>,
    pub method_handle: ClassId<'g>,
}

/// Classes inside `java.io.*`
pub struct IoClasses<'g> {
    pub serializable: ClassId<'g>,
    pub io_exception: ClassId<'g>,
}

const PUBLIC_CLASS: ClassAccessFlags = ClassAccessFlags::from_bits_truncate(
    ClassAccessFlags::PUBLIC.bits() | ClassAccessFlags::SUPER.bits(),
);
const PUBLIC_FINAL_CLASS: ClassAccessFlags = ClassAccessFlags::from_bits_truncate(
    PUBLIC_CLASS.bits() | ClassAccessFlags::FINAL.bits(),
);
const PUBLIC_INTERFACE: ClassAccessFlags = ClassAccessFlags::from_bits_truncate(
    ClassAccessFlags::PUBLIC.bits()
        | ClassAccessFlags::INTERFACE.bits()
        | ClassAccessFlags::ABSTRACT.bits(),
);

impl<'g> JavaClasses<'g> {
    pub fn add_to_graph(class_graph: &ClassGraph<'g>) -> JavaClasses<'g> {
        let object = class_graph.add_class(ClassData {
            name: BinaryName::OBJECT,
            superclass: None,
            interfaces: FrozenVec::new(),
            access_flags: PUBLIC_CLASS,
        });
        let lang = LangClasses::add_to_graph(class_graph, object);
        let io = IoClasses::add_to_graph(class_graph, object, lang.exception);

        for serializable in [lang.number, lang.string, lang.throwable] {
            serializable.add_interface(io.serializable);
        }

        JavaClasses { lang, io }
    }
}

impl<'g> LangClasses<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        object: ClassId<'g>,
    ) -> LangClasses<'g> {
        let class = |name, superclass, access_flags| {
            class_graph.add_class(ClassData::new(name, superclass, access_flags))
        };

        let cloneable = class(BinaryName::CLONEABLE, object, PUBLIC_INTERFACE);
        let comparable = class(BinaryName::COMPARABLE, object, PUBLIC_INTERFACE);
        let char_sequence = class(BinaryName::CHARSEQUENCE, object, PUBLIC_INTERFACE);
        let string = class(BinaryName::STRING, object, PUBLIC_FINAL_CLASS);
        let class_cls = class(BinaryName::CLASS, object, PUBLIC_FINAL_CLASS);
        let number = class(BinaryName::NUMBER, object, PUBLIC_CLASS | ClassAccessFlags::ABSTRACT);
        let integer = class(BinaryName::INTEGER, number, PUBLIC_FINAL_CLASS);
        let float = class(BinaryName::FLOAT, number, PUBLIC_FINAL_CLASS);
        let long = class(BinaryName::LONG, number, PUBLIC_FINAL_CLASS);
        let double = class(BinaryName::DOUBLE, number, PUBLIC_FINAL_CLASS);
        let invoke = InvokeClasses::add_to_graph(class_graph, object);
        let throwable = class(BinaryName::THROWABLE, object, PUBLIC_CLASS);
        let error = class(BinaryName::ERROR, throwable, PUBLIC_CLASS);
        let exception = class(BinaryName::EXCEPTION, throwable, PUBLIC_CLASS);
        let runtime_exception = class(BinaryName::RUNTIMEEXCEPTION, exception, PUBLIC_CLASS);
        let arithmetic_exception = class(
            BinaryName::ARITHMETICEXCEPTION,
            runtime_exception,
            PUBLIC_CLASS,
        );
        let array_index_out_of_bounds_exception = class(
            BinaryName::ARRAYINDEXOUTOFBOUNDSEXCEPTION,
            runtime_exception,
            PUBLIC_CLASS,
        );
        let class_cast_exception = class(
            BinaryName::CLASSCASTEXCEPTION,
            runtime_exception,
            PUBLIC_CLASS,
        );
        let illegal_argument_exception = class(
            BinaryName::ILLEGALARGUMENTEXCEPTION,
            runtime_exception,
            PUBLIC_CLASS,
        );
        let illegal_state_exception = class(
            BinaryName::ILLEGALSTATEEXCEPTION,
            runtime_exception,
            PUBLIC_CLASS,
        );
        let null_pointer_exception = class(
            BinaryName::NULLPOINTEREXCEPTION,
            runtime_exception,
            PUBLIC_CLASS,
        );

        for boxed in [integer, float, long, double, string] {
            boxed.add_interface(comparable);
        }
        string.add_interface(char_sequence);

        LangClasses {
            object,
            cloneable,
            comparable,
            char_sequence,
            string,
            class: class_cls,
            number,
            integer,
            float,
            long,
            double,
            invoke,
            throwable,
            error,
            exception,
            runtime_exception,
            arithmetic_exception,
            array_index_out_of_bounds_exception,
            class_cast_exception,
            illegal_argument_exception,
            illegal_state_exception,
            null_pointer_exception,
        }
    }
}

impl<'g> InvokeClasses<'g> {
    pub fn add_to_graph(class_graph: &ClassGraph<'g>, object: ClassId<'g>) -> InvokeClasses<'g> {
        let method_type = class_graph.add_class(ClassData::new(
            BinaryName::METHODTYPE,
            object,
            PUBLIC_FINAL_CLASS,
        ));
        let method_handle = class_graph.add_class(ClassData::new(
            BinaryName::METHODHANDLE,
            object,
            PUBLIC_CLASS | ClassAccessFlags::ABSTRACT,
        ));

        InvokeClasses {
            method_type,
            method_handle,
        }
    }
}

impl<'g> IoClasses<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        object: ClassId<'g>,
        exception: ClassId<'g>,
    ) -> IoClasses<'g> {
        let serializable = class_graph.add_class(ClassData::new(
            BinaryName::SERIALIZABLE,
            object,
            PUBLIC_INTERFACE,
        ));
        let io_exception = class_graph.add_class(ClassData::new(
            BinaryName::IOEXCEPTION,
            exception,
            PUBLIC_CLASS,
        ));

        IoClasses {
            serializable,
            io_exception,
        }
    }
}
