//! Generic collection contract, and bulk operations derived from it
//!
//! A type only needs to provide the handful of element-wise primitives of
//! [`Collection`] and a removal-capable cursor to get bulk addition, removal,
//! retention and membership queries for free.

use crate::{BagError, Cursor, HeavyBag};
use std::hash::{BuildHasher, Hash};

/// Cursor over a [`Collection`] which can remove the element it last yielded
pub trait CollectionCursor<T> {
    /// Truth that [`next()`](Self::next) will yield another element
    fn has_next(&self) -> bool;

    /// Yield the next element, or fail with [`BagError::Exhausted`]
    fn next(&mut self) -> Result<&T, BagError>;

    /// Remove the element that was last yielded, or fail with
    /// [`BagError::NoCurrentElement`] if there is none
    fn remove(&mut self) -> Result<(), BagError>;
}

/// Element-wise collection primitives, from which bulk operations are derived
///
/// # Examples
///
/// ```
/// use heavy_bag::{Collection, HeavyBag};
///
/// let mut bag = HeavyBag::from_iter(["a", "a", "b", "c"]);
/// let unwanted = HeavyBag::from_iter(["a"]);
///
/// // Removes every copy of "a", not just one
/// assert!(bag.remove_all(&unwanted));
/// assert_eq!(bag, HeavyBag::from_iter(["b", "c"]));
///
/// assert!(bag.add_all(["d", "d"]));
/// assert!(bag.contains_all([&"b", &"d"]));
/// ```
pub trait Collection<T> {
    /// Cursor type returned by [`cursor()`](Self::cursor)
    type Cursor<'a>: CollectionCursor<T>
    where
        Self: 'a;

    /// Add one element, tell whether the collection changed
    fn add(&mut self, value: T) -> bool;

    /// Remove one element equal to `value`, tell whether one was found
    fn remove(&mut self, value: &T) -> bool;

    /// Truth that at least one element is equal to `value`
    fn contains(&self, value: &T) -> bool;

    /// Number of elements, duplicates included
    fn len(&self) -> usize;

    /// Cursor over all elements, duplicates included
    fn cursor(&mut self) -> Self::Cursor<'_>;

    /// Truth that the collection has no element
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add every element of `values`, tell whether the collection changed
    fn add_all<I>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = T>,
        Self: Sized,
    {
        values
            .into_iter()
            .fold(false, |changed, value| self.add(value) | changed)
    }

    /// Truth that every element of `values` is present
    fn contains_all<'v, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'v T>,
        T: 'v,
        Self: Sized,
    {
        values.into_iter().all(|value| self.contains(value))
    }

    /// Remove every element that `other` contains, tell whether the
    /// collection changed
    fn remove_all<C>(&mut self, other: &C) -> bool
    where
        C: Collection<T> + ?Sized,
        Self: Sized,
    {
        remove_where(self, |value| other.contains(value))
    }

    /// Remove every element that `other` does not contain, tell whether the
    /// collection changed
    fn retain_all<C>(&mut self, other: &C) -> bool
    where
        C: Collection<T> + ?Sized,
        Self: Sized,
    {
        remove_where(self, |value| !other.contains(value))
    }

    /// Remove every element
    fn clear(&mut self)
    where
        Self: Sized,
    {
        remove_where(self, |_| true);
    }
}

/// Walk the collection with its cursor, removing elements matching `doomed`
fn remove_where<T, C>(collection: &mut C, mut doomed: impl FnMut(&T) -> bool) -> bool
where
    C: Collection<T>,
{
    let mut changed = false;
    let mut cursor = collection.cursor();
    while cursor.has_next() {
        let remove = match cursor.next() {
            Ok(value) => doomed(value),
            Err(_) => break,
        };
        if remove && cursor.remove().is_ok() {
            changed = true;
        }
    }
    changed
}

impl<T, S> CollectionCursor<T> for Cursor<'_, T, S> {
    fn has_next(&self) -> bool {
        Cursor::has_next(self)
    }

    fn next(&mut self) -> Result<&T, BagError> {
        Cursor::next(self)
    }

    fn remove(&mut self) -> Result<(), BagError> {
        Cursor::remove(self)
    }
}

impl<T: Hash + Eq, S: BuildHasher> Collection<T> for HeavyBag<T, S> {
    type Cursor<'a>
        = Cursor<'a, T, S>
    where
        Self: 'a;

    fn add(&mut self, value: T) -> bool {
        HeavyBag::add(self, value)
    }

    fn remove(&mut self, value: &T) -> bool {
        HeavyBag::remove(self, value)
    }

    fn contains(&self, value: &T) -> bool {
        HeavyBag::contains(self, value)
    }

    fn len(&self) -> usize {
        HeavyBag::len(self)
    }

    fn cursor(&mut self) -> Self::Cursor<'_> {
        HeavyBag::cursor(self)
    }
}
