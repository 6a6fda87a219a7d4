//! Duplicate-aware cursor with in-place removal

use crate::{BagError, HeavyBag};
use std::{fmt, hash::RandomState};

/// A cursor over the elements of a [`HeavyBag`], duplicates included, which
/// can remove the element that it last returned.
///
/// This `struct` is created by the [`cursor()`](HeavyBag::cursor) method on
/// [`HeavyBag`]. Like [`Iter`](crate::Iter), it yields all copies of a value
/// back to back, but it mutably borrows the bag so that
/// [`remove()`](Self::remove) can take elements away mid-traversal.
///
/// Since the cursor holds the only access to the bag, the bag cannot change
/// behind its back. [`has_next()`](Self::has_next) still compares the number
/// of elements visited so far with the live length of the bag rather than with
/// a snapshot taken at creation time.
///
/// # Examples
///
/// ```
/// use heavy_bag::{BagError, HeavyBag};
///
/// let mut bag = HeavyBag::new();
/// bag.add_many('a', 3)?;
///
/// let mut cursor = bag.cursor();
/// assert_eq!(cursor.remove(), Err(BagError::NoCurrentElement));
/// assert_eq!(cursor.next(), Ok(&'a'));
/// cursor.remove()?;
/// assert_eq!(cursor.remove(), Err(BagError::NoCurrentElement));
/// assert_eq!(cursor.next(), Ok(&'a'));
/// assert_eq!(cursor.next(), Ok(&'a'));
/// assert!(!cursor.has_next());
/// assert_eq!(cursor.next(), Err(BagError::Exhausted));
///
/// assert_eq!(bag.count(&'a'), 2);
/// # Ok::<(), BagError>(())
/// ```
pub struct Cursor<'a, T, S = RandomState> {
    /// Bag that is being traversed
    bag: &'a mut HeavyBag<T, S>,

    /// Number of elements that were yielded and are still in the bag
    position: usize,

    /// Index of the next distinct value in the bag's value table
    next_index: usize,

    /// Index of the value that was last yielded
    current_index: usize,

    /// Number of times the current value must still be yielded
    remaining_copies: usize,

    /// Truth that the last yielded element can be removed
    can_remove: bool,
}
//
impl<'a, T, S> Cursor<'a, T, S> {
    /// Set up a cursor at the start of `bag`
    pub(crate) fn new(bag: &'a mut HeavyBag<T, S>) -> Self {
        Self {
            bag,
            position: 0,
            next_index: 0,
            current_index: 0,
            remaining_copies: 0,
            can_remove: false,
        }
    }

    /// Truth that [`next()`](Self::next) will yield another element
    #[must_use = "Only effect is to produce a result"]
    pub fn has_next(&self) -> bool {
        self.position < self.bag.len()
    }

    /// Yield the next element of the bag
    ///
    /// # Errors
    ///
    /// Fails with [`BagError::Exhausted`] once every element has been yielded.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<&T, BagError> {
        if self.remaining_copies > 0 {
            self.remaining_copies -= 1;
        } else {
            let (_, multiplicity) = self
                .bag
                .entry_at(self.next_index)
                .ok_or(BagError::Exhausted)?;
            self.current_index = self.next_index;
            self.next_index += 1;
            self.remaining_copies = multiplicity.get() - 1;
        }
        self.position += 1;
        self.can_remove = true;
        self.bag
            .entry_at(self.current_index)
            .map(|(value, _)| value)
            .ok_or(BagError::Exhausted)
    }

    /// Remove the element that was last returned by [`next()`](Self::next)
    ///
    /// Other copies of the same value are unaffected: the ones that were not
    /// yielded yet will still be yielded.
    ///
    /// # Errors
    ///
    /// Fails with [`BagError::NoCurrentElement`] if `next()` was never called,
    /// or if the element it returned was already removed.
    pub fn remove(&mut self) -> Result<(), BagError> {
        if !self.can_remove {
            return Err(BagError::NoCurrentElement);
        }
        self.can_remove = false;
        log::trace!(
            "removing element #{} of the bag, at value index {}",
            self.position,
            self.current_index
        );
        if self.bag.remove_at(self.current_index) {
            // The last value of the table now sits in the freed slot and has
            // not been visited yet
            debug_assert_eq!(self.remaining_copies, 0);
            self.next_index = self.current_index;
        }
        self.position -= 1;
        Ok(())
    }
}

impl<T: fmt::Debug, S> fmt::Debug for Cursor<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .field("len", &self.bag.len())
            .field("remaining_copies", &self.remaining_copies)
            .finish_non_exhaustive()
    }
}
