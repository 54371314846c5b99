use super::{BinaryName, ClassAccessFlags, Name, RenderDescriptor};
use crate::util::RefId;
use elsa::map::FrozenMap;
use elsa::FrozenVec;
use std::fmt;
use std::fmt::Debug;
use typed_arena::Arena;

mod assignable;
mod java_classes;

pub use assignable::*;
pub use java_classes::*;

pub struct ClassGraphArenas<'g> {
    class_arena: Arena<ClassData<'g>>,
}

impl<'g> ClassGraphArenas<'g> {
    pub fn new() -> Self {
        ClassGraphArenas {
            class_arena: Arena::new(),
        }
    }
}

impl<'g> Default for ClassGraphArenas<'g> {
    fn default() -> Self {
        Self::new()
    }
}

/// Class identity (pointer equality on the class data)
pub type ClassId<'g> = RefId<'g, ClassData<'g>>;

/// Tracks the subtyping relationships between classes and interfaces
///
/// Frame computation needs to find the nearest common supertype whenever two reference types meet
/// at a control flow merge. Classes are allocated once into an arena and never removed, so the
/// graph can hand out plain references while still growing.
pub struct ClassGraph<'g> {
    arenas: &'g ClassGraphArenas<'g>,
    classes: FrozenMap<&'g BinaryName, &'g ClassData<'g>>,
}

impl<'g> ClassGraph<'g> {
    /// New empty graph
    pub fn new(arenas: &'g ClassGraphArenas<'g>) -> Self {
        ClassGraph {
            arenas,
            classes: FrozenMap::new(),
        }
    }

    /// Look up a class by name
    pub fn lookup_class(&self, name: &BinaryName) -> Option<ClassId<'g>> {
        self.classes.map_get(name, |data| RefId(*data))
    }

    /// Add a new class to the class graph
    ///
    /// If a class with the same name is already present, the existing class is returned instead.
    pub fn add_class(&self, data: ClassData<'g>) -> ClassId<'g> {
        if let Some(existing) = self.lookup_class(&data.name) {
            log::warn!("Class {:?} is already in the class graph", data.name);
            return existing;
        }
        let data = &*self.arenas.class_arena.alloc(data);
        self.classes.insert(&data.name, data);
        RefId(data)
    }

    /// Add standard types to the class graph
    pub fn insert_java_library_types(&self) -> JavaClasses<'g> {
        JavaClasses::add_to_graph(self)
    }
}

pub struct ClassData<'g> {
    /// Name of the class
    pub name: BinaryName,

    /// Superclass is only ever missing for `java/lang/Object` itself
    pub superclass: Option<ClassId<'g>>,

    /// Interfaces implemented (or super-interfaces)
    pub interfaces: FrozenVec<&'g ClassData<'g>>,

    /// Access flags
    pub access_flags: ClassAccessFlags,
}

impl<'g> ClassData<'g> {
    pub fn new(
        name: BinaryName,
        superclass: ClassId<'g>,
        access_flags: ClassAccessFlags,
    ) -> ClassData<'g> {
        ClassData {
            name,
            superclass: Some(superclass),
            interfaces: FrozenVec::new(),
            access_flags,
        }
    }

    /// Is this an interface?
    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }

    /// Record that this class implements (or extends, for interfaces) an interface
    pub fn add_interface(&self, interface: ClassId<'g>) {
        self.interfaces.push(interface.0);
    }

    /// Iterate up the superclass chain, starting at this class
    pub fn superclasses(&'g self) -> impl Iterator<Item = ClassId<'g>> {
        std::iter::successors(Some(RefId(self)), |class| class.superclass)
    }
}

impl<'g> PartialEq for ClassData<'g> {
    fn eq(&self, other: &ClassData<'g>) -> bool {
        self.name == other.name
    }
}

impl<'g> Eq for ClassData<'g> {}

impl<'g> RenderDescriptor for ClassData<'g> {
    fn render_to(&self, write_to: &mut String) {
        self.name.render_to(write_to)
    }
}

impl<'g> Debug for ClassData<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}
