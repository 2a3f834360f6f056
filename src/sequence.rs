use std::rc::Rc;
use std::sync::Arc;

/// Identity contract for the items a layout pass asks nodes for.
///
/// Two renderables are "the same" only when they are the same instance. Value-equal but
/// distinct instances back distinct nodes.
pub trait Renderable: Clone {
    fn same_renderable(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Renderable for Rc<T> {
    fn same_renderable(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Renderable for Arc<T> {
    fn same_renderable(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

/// Persistent, forward-only cursor over renderables.
///
/// `get_next` returns a new cursor and leaves `self` untouched, so a cursor can be kept and
/// restarted from.
pub trait Sequence: Sized {
    type Item;

    /// Item at the cursor position, or `None` when exhausted.
    fn get(&self) -> Option<Self::Item>;

    /// Cursor advanced by one, or `None` past the end.
    fn get_next(&self) -> Option<Self>;
}

/// [`Sequence`] over a shared list of items.
#[derive(Debug)]
pub struct ListSequence<R> {
    items: Rc<[R]>,
    index: usize,
}

impl<R> Clone for ListSequence<R> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
            index: self.index,
        }
    }
}

impl<R> ListSequence<R> {
    pub fn new(items: impl Into<Rc<[R]>>) -> Self {
        Self {
            items: items.into(),
            index: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<R: Clone> Sequence for ListSequence<R> {
    type Item = R;

    fn get(&self) -> Option<R> {
        self.items.get(self.index).cloned()
    }

    fn get_next(&self) -> Option<Self> {
        if self.index >= self.items.len() {
            return None;
        }
        Some(Self {
            items: Rc::clone(&self.items),
            index: self.index + 1,
        })
    }
}
