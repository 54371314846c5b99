use crate::jvm::class_graph::{ClassGraph, ClassId};
use crate::jvm::{BinaryName, FieldType, RefType};
use crate::util::RefId;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Subtyping relationship between types
pub trait Assignable {
    /// Is the first type assignable to the second?
    fn is_assignable(&self, super_type: &Self) -> bool;
}

/// This does a traversal of super types in the class graph to determine assignability
impl<'g> Assignable for ClassId<'g> {
    fn is_assignable(&self, super_type: &ClassId<'g>) -> bool {
        let mut supertypes_to_visit: Vec<ClassId<'g>> = vec![*self];
        let mut dont_revisit: HashSet<ClassId<'g>> = HashSet::new();
        dont_revisit.insert(*self);

        // If the super type is a class, then skip visiting interfaces
        let super_is_class: bool = !super_type.is_interface();

        while let Some(class_data) = supertypes_to_visit.pop() {
            if class_data == *super_type {
                return true;
            }
            let class_data = class_data.0;

            if let Some(superclass) = class_data.superclass {
                if dont_revisit.insert(superclass) {
                    supertypes_to_visit.push(superclass);
                }
            }
            if !super_is_class {
                for interface in &class_data.interfaces {
                    let interface = RefId(interface);
                    if dont_revisit.insert(interface) {
                        supertypes_to_visit.push(interface);
                    }
                }
            }
        }

        false
    }
}

/// This matches the semantics of the prolog predicate `isJavaAssignable(sub_type, super_type)` in
/// the JVM verifier specification.
impl<'g> Assignable for RefType<ClassId<'g>> {
    fn is_assignable(&self, super_type: &RefType<ClassId<'g>>) -> bool {
        match (self, super_type) {
            (
                RefType::PrimitiveArray(_) | RefType::ObjectArray(_),
                RefType::Object(object_type),
            ) => is_array_type_assignable(&object_type.name),

            (RefType::PrimitiveArray(arr1), RefType::PrimitiveArray(arr2)) => arr1 == arr2,

            (RefType::PrimitiveArray(arr1), RefType::ObjectArray(arr2)) => {
                match arr1.additional_dimensions.cmp(&arr2.additional_dimensions) {
                    Ordering::Less | Ordering::Equal => false,
                    Ordering::Greater => is_array_type_assignable(&arr2.element_type.name),
                }
            }

            (RefType::ObjectArray(arr1), RefType::ObjectArray(arr2)) => {
                match arr1.additional_dimensions.cmp(&arr2.additional_dimensions) {
                    Ordering::Less => false,
                    Ordering::Equal => arr1.element_type.is_assignable(&arr2.element_type),
                    Ordering::Greater => is_array_type_assignable(&arr2.element_type.name),
                }
            }

            (RefType::Object(cls1), RefType::Object(cls2)) => cls1.is_assignable(cls2),

            _ => false,
        }
    }
}

/// Check if arrays can be assigned to a super type
///
/// This bakes in knowledge of the small, finite set of super types arrays have.
fn is_array_type_assignable(super_type: &BinaryName) -> bool {
    super_type == &BinaryName::OBJECT
        || super_type == &BinaryName::CLONEABLE
        || super_type == &BinaryName::SERIALIZABLE
}

/// Nearest common superclass of two classes
///
/// If one class is assignable to the other, that other class is the answer (this is the only way
/// an interface ever comes out of here). Otherwise interfaces are ignored and the answer is the
/// lowest shared ancestor on the superclass chains, which is the root class at worst.
pub fn common_superclass<'g>(cls1: ClassId<'g>, cls2: ClassId<'g>) -> ClassId<'g> {
    if cls1.is_assignable(&cls2) {
        return cls2;
    }
    if cls2.is_assignable(&cls1) {
        return cls1;
    }

    let ancestors: Vec<ClassId<'g>> = cls1.0.superclasses().collect();
    let root = ancestors.last().copied().unwrap_or(cls1);
    if cls1.is_interface() || cls2.is_interface() {
        return root;
    }
    let ancestors: HashSet<ClassId<'g>> = ancestors.into_iter().collect();
    cls2.0
        .superclasses()
        .find(|cls| ancestors.contains(cls))
        .unwrap_or(root)
}

impl<'g> ClassGraph<'g> {
    /// Nearest common supertype of two reference types, by name
    ///
    /// Returns `None` when two object types cannot be related because one of them is missing from
    /// the graph. Arrays always have a common supertype: array types whose elements are both
    /// references share the array of the elements' common supertype, and anything else meets at
    /// `java/lang/Object`.
    pub fn common_supertype(
        &self,
        type1: &RefType<BinaryName>,
        type2: &RefType<BinaryName>,
    ) -> Option<RefType<BinaryName>> {
        if type1 == type2 {
            return Some(type1.clone());
        }
        match (type1, type2) {
            (RefType::Object(name1), RefType::Object(name2)) => {
                let cls1 = self.lookup_class(name1)?;
                let cls2 = self.lookup_class(name2)?;
                let common = common_superclass(cls1, cls2);
                Some(RefType::Object(common.name.clone()))
            }
            (RefType::Object(_), _) | (_, RefType::Object(_)) => {
                Some(RefType::Object(BinaryName::OBJECT))
            }
            _ => match (type1.element_type(), type2.element_type()) {
                (Some(FieldType::Ref(elem1)), Some(FieldType::Ref(elem2))) => {
                    let common = self
                        .common_supertype(&elem1, &elem2)
                        .unwrap_or(RefType::Object(BinaryName::OBJECT));
                    Some(RefType::array(FieldType::Ref(common)))
                }
                _ => Some(RefType::Object(BinaryName::OBJECT)),
            },
        }
    }
}
