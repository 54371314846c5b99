use stable_deref_trait::StableDeref;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// Reference compared and hashed by address instead of by contents
///
/// Classes in the class graph are allocated once in an arena, so two references to the same
/// `ClassData` are the same class. Using the address avoids walking names on every hierarchy
/// query.
pub struct RefId<'a, T: ?Sized>(pub &'a T);

impl<'a, T: ?Sized> Clone for RefId<'a, T> {
    fn clone(&self) -> Self {
        RefId(self.0)
    }
}

impl<'a, T: ?Sized> Copy for RefId<'a, T> {}

impl<'a, T: ?Sized> Hash for RefId<'a, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.0, state)
    }
}

impl<'a, 'b, T: ?Sized> PartialEq<RefId<'b, T>> for RefId<'a, T> {
    fn eq(&self, other: &RefId<'b, T>) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl<'a, T: ?Sized> Eq for RefId<'a, T> {}

impl<'a, T: ?Sized> Deref for RefId<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.0
    }
}

impl<'a, T: ?Sized + Debug> Debug for RefId<'a, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

// The target lives as long as `'a` and never moves, so handing out `&T` from a frozen collection
// is sound.
unsafe impl<'a, T: ?Sized> StableDeref for RefId<'a, T> {}

#[cfg(test)]
mod test {
    use super::RefId;
    use std::collections::HashSet;

    #[test]
    fn identity_not_contents() {
        let first = String::from("java/lang/Object");
        let second = String::from("java/lang/Object");

        assert_eq!(RefId(&first), RefId(&first), "same allocation");
        assert_ne!(RefId(&first), RefId(&second), "equal contents, different allocation");

        let set: HashSet<RefId<String>> = [RefId(&first), RefId(&second), RefId(&first)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }
}
