use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ZeroSizedType;

/// A value which increments a shared counter when dropped.
#[derive(Debug, Clone)]
pub struct CountedDrop(pub Rc<Cell<usize>>);

impl CountedDrop {
    pub fn new(counter: &Rc<Cell<usize>>) -> CountedDrop {
        CountedDrop(Rc::clone(counter))
    }
}

impl Drop for CountedDrop {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}
