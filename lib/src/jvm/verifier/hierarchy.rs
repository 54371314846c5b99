use crate::jvm::class_graph::ClassGraph;
use crate::jvm::code::{FieldRef, MethodRef};
use crate::jvm::{BinaryName, FieldType, RefType};

/// Type information the analyzer needs from outside the method being analyzed
pub trait TypeHierarchy {
    /// Nearest common supertype of two reference types
    ///
    /// `None` means the types cannot be related, and the merged value becomes `Top`.
    fn common_supertype(
        &self,
        type1: &RefType<BinaryName>,
        type2: &RefType<BinaryName>,
    ) -> Option<RefType<BinaryName>>;

    /// Type pushed by a method call (`None` for `void`)
    ///
    /// Hook for refining generic signatures. Defaults to the descriptor's return type.
    fn resolve_return_type(&self, method: &MethodRef) -> Option<FieldType<BinaryName>> {
        method.descriptor.return_type.clone()
    }

    /// Type pushed by a field read. Defaults to the descriptor's type.
    fn resolve_field_type(&self, field: &FieldRef) -> FieldType<BinaryName> {
        field.descriptor.clone()
    }
}

impl<'g> TypeHierarchy for ClassGraph<'g> {
    fn common_supertype(
        &self,
        type1: &RefType<BinaryName>,
        type2: &RefType<BinaryName>,
    ) -> Option<RefType<BinaryName>> {
        ClassGraph::common_supertype(self, type1, type2)
    }
}
