use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ZeroSizedType;

/// A shared tally of how many [`Counted`] values have been dropped.
#[derive(Debug, Default, Clone)]
pub struct DropCounter(Rc<Cell<usize>>);

impl DropCounter {
    pub fn new() -> DropCounter {
        DropCounter::default()
    }

    pub fn track<T>(&self, value: T) -> Counted<T> {
        Counted {
            value,
            counter: self.clone(),
        }
    }

    pub fn dropped(&self) -> usize {
        self.0.get()
    }
}

/// A value that bumps its [`DropCounter`] exactly once when dropped. Clones share the counter.
#[derive(Debug, Clone)]
pub struct Counted<T> {
    pub value: T,
    counter: DropCounter,
}

impl<T: PartialEq> PartialEq for Counted<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Drop for Counted<T> {
    fn drop(&mut self) {
        self.counter.0.set(self.counter.0.get() + 1);
    }
}
