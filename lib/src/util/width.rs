/// Values that occupy a number of consecutive slots (in the local variables or on the operand
/// stack) or a number of bytes (in the code array)
pub trait Width {
    fn width(&self) -> usize;
}

impl<A: Width> Width for [A] {
    fn width(&self) -> usize {
        self.iter().map(Width::width).sum()
    }
}

impl<A: Width> Width for Vec<A> {
    fn width(&self) -> usize {
        self.as_slice().width()
    }
}

#[cfg(test)]
mod test {
    use super::Width;

    struct Slots(usize);

    impl Width for Slots {
        fn width(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn sums_widths() {
        assert_eq!(vec![Slots(1), Slots(2), Slots(1)].width(), 4);
        assert_eq!(Vec::<Slots>::new().width(), 0);
    }
}
