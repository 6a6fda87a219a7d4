//! A counting multiset ("heavy bag") for collections where a single value may
//! be repeated a huge number of times.
//!
//! This crate implements a kind of multiset, which is a generalization of the
//! notion of mathematical set where multiple elements that are equal to each
//! other can be present simultaneously.
//!
//! The "heavy" part of the name comes from the workload it is designed for:
//! a bag holding a hundred million copies of one value should not store a
//! hundred million copies of that value. Instead, each distinct value is stored
//! once, next to the number of times it occurs, in the spirit of a sparse
//! histogram. Inserting a billion copies of a value with
//! [`add_many()`](HeavyBag::add_many) therefore costs one table entry and one
//! integer.
//!
//! Compared to an ordered multiset, this bag is hash-based:
//!
//! - Element-wise operations (adding, removing, counting, membership tests)
//!   have `O(1)` expected complexity.
//! - Iteration order over distinct values is unspecified. All copies of a
//!   value are however always yielded back to back.
//!
//! Beyond the classic collection primitives, the bag can draw a random element
//! with probability proportional to its multiplicity, see
//! [`choose()`](HeavyBag::choose). Bulk operations like
//! [`retain_all()`](Collection::retain_all) are not implemented by the bag
//! itself, but derived from its primitives by the [`Collection`] trait.
//!
//! The bag is not internally synchronized. Sharing it between threads requires
//! external locking, like any other standard collection.

mod collection;
mod cursor;
mod error;

pub use crate::{
    collection::{Collection, CollectionCursor},
    cursor::Cursor,
    error::{BagError, ErrorKind},
};

use indexmap::{IndexMap, map::Entry};
use rand::Rng;
use std::{
    borrow::Borrow,
    fmt::{self, Debug, Display},
    hash::{BuildHasher, DefaultHasher, Hash, Hasher, RandomState},
    iter::FusedIterator,
    num::NonZeroUsize,
};

/// Largest number of copies that [`HeavyBag::add_many()`] accepts in one call
pub const MAX_ADD_MANY: i64 = 1_000_000_000;

/// A counting multiset that stores each distinct value once.
///
/// You can learn more about the design rationale and overall capabilities of
/// this data structure in the [crate-level documentation](index.html).
///
/// In all the following documentation, we will use the following terminology:
///
/// - "values" refers to a unique value as defined by equality of the
///   [`Eq`] implementation of type `T`
/// - "elements" refers to possibly duplicate occurences of a value within the
///   multiset.
/// - "multiplicity" refers to the number of occurences of a value within the
///   multiset, i.e. the number of elements that are equal to this value.
///
/// As with standard hash-based collections, it is a logic error for a value to
/// be modified in such a way that its hash or equality changes while it is in
/// the bag.
///
/// # Examples
///
/// ```
/// use heavy_bag::HeavyBag;
///
/// let mut bag = HeavyBag::new();
///
/// // Adding a value always succeeds
/// assert!(bag.add("a"));
/// assert!(bag.add("b"));
/// assert!(bag.add("a"));
///
/// // Many copies of a value can be added at once, cheaply
/// bag.add_many("c", 10_000_000).unwrap();
///
/// assert_eq!(bag.count("a"), 2);
/// assert_eq!(bag.count("c"), 10_000_000);
/// assert_eq!(bag.len(), 10_000_003);
/// assert_eq!(bag.num_values(), 3);
///
/// // Removal takes away a single element
/// assert!(bag.remove("a"));
/// assert_eq!(bag.count("a"), 1);
/// ```
#[derive(Clone)]
pub struct HeavyBag<T, S = RandomState> {
    /// Mapping from distinct values to their multiplicities
    value_to_multiplicity: IndexMap<T, NonZeroUsize, S>,

    /// Number of elements = sum of all multiplicities
    len: usize,
}
//
impl<T> HeavyBag<T, RandomState> {
    /// Makes a new, empty `HeavyBag`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let bag = HeavyBag::<i32>::new();
    /// assert!(bag.is_empty());
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Makes a new, empty `HeavyBag` with room for at least `capacity`
    /// distinct values.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let bag = HeavyBag::<i32>::with_capacity(16);
    /// assert!(bag.capacity() >= 16);
    /// assert!(bag.is_empty());
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<T, S> HeavyBag<T, S> {
    /// Makes a new, empty `HeavyBag` which will use the given hash builder to
    /// hash values.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    /// use std::hash::RandomState;
    ///
    /// let mut bag = HeavyBag::with_hasher(RandomState::new());
    /// bag.add(1);
    /// assert_eq!(bag.count(&1), 1);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            value_to_multiplicity: IndexMap::with_hasher(hash_builder),
            len: 0,
        }
    }

    /// Makes a new, empty `HeavyBag` with room for at least `capacity`
    /// distinct values, which will use the given hash builder to hash values.
    #[must_use = "Only effect is to produce a result"]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            value_to_multiplicity: IndexMap::with_capacity_and_hasher(capacity, hash_builder),
            len: 0,
        }
    }

    /// Number of distinct values the bag can hold without reallocating
    #[must_use = "Only effect is to produce a result"]
    pub fn capacity(&self) -> usize {
        self.value_to_multiplicity.capacity()
    }

    /// Clears the multiset, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let mut v = HeavyBag::from_iter([1, 2, 3]);
    /// v.clear();
    /// assert!(v.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.value_to_multiplicity.clear();
        self.len = 0;
    }

    /// Number of elements currently present in the multiset, including
    /// duplicate occurences of a value.
    ///
    /// This is a constant-time query: the element count is maintained as the
    /// multiset is modified.
    ///
    /// See also [`num_values()`](Self::num_values) for a count of distinct
    /// values, ignoring duplicate elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let mut v = HeavyBag::new();
    /// assert_eq!(v.len(), 0);
    /// v.add(1);
    /// assert_eq!(v.len(), 1);
    /// v.add(1);
    /// assert_eq!(v.len(), 2);
    /// v.add_many(2, 40).unwrap();
    /// assert_eq!(v.len(), 42);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of distinct values currently present in the multiset
    ///
    /// See also [`len()`](Self::len) for a count of multiset elements,
    /// including duplicates of each value.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let mut v = HeavyBag::new();
    /// assert_eq!(v.num_values(), 0);
    /// v.add(1);
    /// assert_eq!(v.num_values(), 1);
    /// v.add(1);
    /// assert_eq!(v.num_values(), 1);
    /// v.add(2);
    /// assert_eq!(v.num_values(), 2);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn num_values(&self) -> usize {
        self.value_to_multiplicity.len()
    }

    /// Truth that the multiset contains no elements
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let mut v = HeavyBag::new();
    /// assert!(v.is_empty());
    /// v.add(1);
    /// assert!(!v.is_empty());
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterator over all elements of the multiset, duplicates included.
    ///
    /// A value with multiplicity `n` is yielded `n` times in a row. The order
    /// in which distinct values are visited is unspecified.
    ///
    /// See also [`cursor()`](Self::cursor) if you need to remove elements
    /// while iterating, and [`entries()`](Self::entries) if you would rather
    /// get each value once along with its multiplicity.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let bag = HeavyBag::from_iter(["a", "a", "a"]);
    /// assert!(bag.iter().eq([&"a", &"a", &"a"]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn iter(&self) -> Iter<'_, T> {
        self.into_iter()
    }

    /// Iterator over all distinct values in the multiset, along with their
    /// multiplicities.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    /// use std::num::NonZeroUsize;
    ///
    /// let bag = HeavyBag::from_iter([2, 2]);
    ///
    /// let nonzero = |x| NonZeroUsize::new(x).unwrap();
    /// assert!(bag.entries().eq([(&2, nonzero(2))]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn entries(
        &self,
    ) -> impl DoubleEndedIterator<Item = (&T, NonZeroUsize)> + ExactSizeIterator + FusedIterator + Clone
    {
        self.value_to_multiplicity
            .iter()
            .map(|(value, &multiplicity)| (value, multiplicity))
    }

    /// Read-only view of the distinct values present in the multiset.
    ///
    /// The view borrows the bag, so it always reflects its current contents
    /// and the bag cannot be modified for as long as the view is alive. Use
    /// `bag.unique_elements().iter().cloned().collect()` if you need an
    /// independent snapshot.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let bag = HeavyBag::from_iter([1, 1, 1, 2]);
    ///
    /// let unique = bag.unique_elements();
    /// assert_eq!(unique.len(), 2);
    /// assert!(unique.contains(&1));
    /// assert!(!unique.contains(&3));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn unique_elements(&self) -> UniqueElements<'_, T, S> {
        UniqueElements(&self.value_to_multiplicity)
    }

    /// Cursor over all elements of the multiset which supports removing the
    /// element that was last returned.
    ///
    /// See [`Cursor`] for more information.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let mut bag = HeavyBag::from_iter([1, 1, 2, 3, 3, 3]);
    ///
    /// // Remove every odd element
    /// let mut cursor = bag.cursor();
    /// while cursor.has_next() {
    ///     if *cursor.next()? % 2 == 1 {
    ///         cursor.remove()?;
    ///     }
    /// }
    ///
    /// assert_eq!(bag, HeavyBag::from_iter([2]));
    /// # Ok::<(), heavy_bag::BagError>(())
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn cursor(&mut self) -> Cursor<'_, T, S> {
        Cursor::new(self)
    }

    /// Draw one element at random, with a probability proportional to its
    /// multiplicity.
    ///
    /// For example, if the bag contains 7 copies of `a` and 3 copies of `b`,
    /// `a` is returned 70% of the time and `b` 30% of the time. This takes
    /// time proportional to the number of distinct values, regardless of the
    /// number of elements, and leaves the bag unchanged.
    ///
    /// # Errors
    ///
    /// Fails with [`BagError::Empty`] if the bag holds no element.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::{BagError, HeavyBag};
    ///
    /// let mut bag = HeavyBag::new();
    /// assert_eq!(bag.choose(&mut rand::rng()), Err(BagError::Empty));
    ///
    /// bag.add_many("a", 7)?;
    /// bag.add_many("b", 3)?;
    /// let chosen = *bag.choose(&mut rand::rng())?;
    /// assert!(chosen == "a" || chosen == "b");
    /// # Ok::<(), BagError>(())
    /// ```
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Result<&T, BagError> {
        if self.is_empty() {
            return Err(BagError::Empty);
        }
        let target = rng.random_range(0..self.len);
        log::trace!(
            "choosing element {target} among {} ({} distinct values)",
            self.len,
            self.num_values()
        );
        let mut cumulative = 0;
        for (value, multiplicity) in &self.value_to_multiplicity {
            cumulative += multiplicity.get();
            if cumulative > target {
                return Ok(value);
            }
        }
        unreachable!("Multiplicities should sum up to the multiset length")
    }
}

impl<T: Hash + Eq, S: BuildHasher> HeavyBag<T, S> {
    /// Returns `true` if the multiset contains at least one occurence of a
    /// value.
    ///
    /// See also [`count()`](Self::count) if you need to know how many
    /// occurences of a value are present inside of the multiset.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let bag = HeavyBag::from_iter([1, 2, 2]);
    ///
    /// assert_eq!(bag.contains(&1), true);
    /// assert_eq!(bag.contains(&2), true);
    /// assert_eq!(bag.contains(&3), false);
    /// ```
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.value_to_multiplicity.contains_key(value)
    }

    /// Returns the number of occurences of a value inside of the multiset, or
    /// 0 if this value is not present.
    ///
    /// See also [`multiplicity()`](Self::multiplicity) for a variant that
    /// tells absent values apart in the type system.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let bag = HeavyBag::from_iter([1, 2, 2]);
    ///
    /// assert_eq!(bag.count(&1), 1);
    /// assert_eq!(bag.count(&2), 2);
    /// assert_eq!(bag.count(&3), 0);
    /// ```
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.multiplicity(value).map_or(0, NonZeroUsize::get)
    }

    /// Returns the number of occurences of a value inside of the multiset, or
    /// `None` if this value is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    /// use std::num::NonZeroUsize;
    ///
    /// let bag = HeavyBag::from_iter([1, 2, 2]);
    ///
    /// assert_eq!(bag.multiplicity(&2), NonZeroUsize::new(2));
    /// assert_eq!(bag.multiplicity(&3), None);
    /// ```
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn multiplicity<Q>(&self, value: &Q) -> Option<NonZeroUsize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.value_to_multiplicity.get(value).copied()
    }

    /// Add one element to the multiset.
    ///
    /// Always returns `true`, as adding an element to a bag always changes it.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let mut bag = HeavyBag::new();
    ///
    /// assert!(bag.add(1));
    /// assert!(bag.add(1));
    /// assert!(bag.add(2));
    ///
    /// assert_eq!(bag.len(), 3);
    /// assert_eq!(bag.num_values(), 2);
    /// ```
    #[inline]
    pub fn add(&mut self, value: T) -> bool {
        self.insert_multiple(value, NonZeroUsize::MIN);
        true
    }

    /// Add `count` copies of a value to the multiset at once.
    ///
    /// This costs the same as adding a single element, no matter how large
    /// `count` is. Adding zero copies is accepted and leaves the bag unchanged.
    /// On success, `true` is returned.
    ///
    /// # Errors
    ///
    /// Fails with [`BagError::InvalidCount`] if `count` is negative or greater
    /// than [`MAX_ADD_MANY`]. The bag is left untouched in this case.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::{BagError, HeavyBag};
    ///
    /// let mut bag = HeavyBag::new();
    ///
    /// assert_eq!(bag.add_many(1, 2), Ok(true));
    /// assert_eq!(bag.add_many(1, 3), Ok(true));
    /// assert_eq!(bag.add_many(2, 0), Ok(true));
    /// assert_eq!(
    ///     bag.add_many(2, 1_000_000_001),
    ///     Err(BagError::InvalidCount { count: 1_000_000_001 })
    /// );
    ///
    /// assert_eq!(bag.len(), 5);
    /// assert_eq!(bag.num_values(), 1);
    /// ```
    pub fn add_many(&mut self, value: T, count: i64) -> Result<bool, BagError> {
        if !(0..=MAX_ADD_MANY).contains(&count) {
            log::debug!("rejecting request to add {count} copies of a value at once");
            return Err(BagError::InvalidCount { count });
        }
        // Bounds above guarantee that the count fits
        if let Some(count) = usize::try_from(count).ok().and_then(NonZeroUsize::new) {
            self.insert_multiple(value, count);
        }
        Ok(true)
    }

    /// Remove one element from the multiset. Returns `true` if an element was
    /// present and has been removed.
    ///
    /// When the last copy of a value is removed, the value disappears from the
    /// multiset altogether.
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let mut bag = HeavyBag::from_iter([1, 1, 2]);
    ///
    /// assert!(bag.remove(&1));
    /// assert!(bag.remove(&1));
    /// assert!(!bag.remove(&1));
    /// assert!(!bag.contains(&1));
    /// assert!(bag.remove(&2));
    /// assert!(bag.is_empty());
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(index) = self.value_to_multiplicity.get_index_of(value) else {
            return false;
        };
        self.remove_at(index);
        true
    }

    /// Insert multiple copies of a value
    fn insert_multiple(&mut self, value: T, count: NonZeroUsize) {
        match self.value_to_multiplicity.entry(value) {
            Entry::Vacant(v) => {
                v.insert(count);
            }
            Entry::Occupied(mut o) => {
                let old_count = *o.get();
                *o.get_mut() = old_count
                    .checked_add(count.get())
                    .expect("Multiplicity counter has overflown");
            }
        }
        self.len = self
            .len
            .checked_add(count.get())
            .expect("Element counter has overflown");
    }
}

impl<T, S> HeavyBag<T, S> {
    /// Remove one copy of the value stored at `index` of the value table,
    /// tell whether the value is now gone from the multiset.
    ///
    /// When the value is gone, the last entry of the table has been moved to
    /// `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub(crate) fn remove_at(&mut self, index: usize) -> bool {
        let (_, multiplicity) = self
            .value_to_multiplicity
            .get_index_mut(index)
            .expect("Value index should be in bounds");
        self.len -= 1;
        match NonZeroUsize::new(multiplicity.get() - 1) {
            Some(new_multiplicity) => {
                *multiplicity = new_multiplicity;
                false
            }
            None => {
                self.value_to_multiplicity.swap_remove_index(index);
                true
            }
        }
    }

    /// Value stored at `index` of the value table and its multiplicity
    pub(crate) fn entry_at(&self, index: usize) -> Option<(&T, NonZeroUsize)> {
        self.value_to_multiplicity
            .get_index(index)
            .map(|(value, &multiplicity)| (value, multiplicity))
    }
}

impl<T: Debug, S> Debug for HeavyBag<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl<T: Display, S> Display for HeavyBag<T, S> {
    /// Lists each distinct value along with its multiplicity, in the bag's
    /// iteration order
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    ///
    /// let bag = HeavyBag::from_iter(["a", "a"]);
    /// assert_eq!(bag.to_string(), "{a: 2}");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (value, multiplicity)) in self.entries().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}: {multiplicity}")?;
        }
        f.write_str("}")
    }
}

impl<T, S: Default> Default for HeavyBag<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T: Hash + Eq, S: BuildHasher> Eq for HeavyBag<T, S> {}

impl<T: Hash + Eq, S: BuildHasher> PartialEq for HeavyBag<T, S> {
    /// Two bags are equal when they hold the same values, with the same
    /// multiplicities
    #[must_use = "Only effect is to produce a result"]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.unique_elements() == other.unique_elements()
            && self
                .value_to_multiplicity
                .iter()
                .all(|(value, multiplicity)| other.multiplicity(value) == Some(*multiplicity))
    }
}

impl<T: Hash, S> Hash for HeavyBag<T, S> {
    /// Combines per-value hashes in a way that does not depend on iteration
    /// order, so that equal bags hash identically
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self
            .value_to_multiplicity
            .iter()
            .map(|(value, multiplicity)| {
                let mut hasher = DefaultHasher::new();
                value.hash(&mut hasher);
                multiplicity.hash(&mut hasher);
                hasher.finish()
            })
            .fold(0u64, u64::wrapping_add);
        state.write_usize(self.value_to_multiplicity.len());
        state.write_u64(combined);
    }
}

impl<T: Hash + Eq, S: BuildHasher> Extend<T> for HeavyBag<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.add(element);
        }
    }
}

impl<T: Hash + Eq, S: BuildHasher> Extend<(T, NonZeroUsize)> for HeavyBag<T, S> {
    /// More efficient alternative to [`Extend<T>`] for cases where you know in
    /// advance that you are going to insert several copies of a value
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    /// use std::num::NonZeroUsize;
    ///
    /// let mut bag = HeavyBag::from_iter([1, 2, 3]);
    /// let nonzero = |x| NonZeroUsize::new(x).unwrap();
    /// bag.extend([(3, nonzero(3)), (4, nonzero(2))]);
    /// assert_eq!(bag, HeavyBag::from_iter([1, 2, 3, 3, 3, 3, 4, 4]));
    /// ```
    fn extend<I: IntoIterator<Item = (T, NonZeroUsize)>>(&mut self, iter: I) {
        for (value, count) in iter {
            self.insert_multiple(value, count);
        }
    }
}

impl<T: Hash + Eq> FromIterator<T> for HeavyBag<T> {
    #[must_use = "Only effect is to produce a result"]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut result = Self::default();
        result.extend(iter);
        result
    }
}

impl<T: Hash + Eq> FromIterator<(T, NonZeroUsize)> for HeavyBag<T> {
    /// More efficient alternative to [`FromIterator<T>`] for cases where you
    /// know in advance that you are going to insert several copies of a value
    ///
    /// # Examples
    ///
    /// ```
    /// use heavy_bag::HeavyBag;
    /// use std::num::NonZeroUsize;
    ///
    /// let nonzero = |x| NonZeroUsize::new(x).unwrap();
    /// assert_eq!(
    ///     HeavyBag::from_iter([1, 2, 2, 2, 3, 3]),
    ///     HeavyBag::from_iter([
    ///         (1, nonzero(1)),
    ///         (2, nonzero(3)),
    ///         (3, nonzero(2)),
    ///     ])
    /// );
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn from_iter<I: IntoIterator<Item = (T, NonZeroUsize)>>(iter: I) -> Self {
        let mut result = Self::default();
        result.extend(iter);
        result
    }
}

impl<'a, T, S> IntoIterator for &'a HeavyBag<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    #[must_use = "Only effect is to produce a result"]
    fn into_iter(self) -> Self::IntoIter {
        Iter {
            entries: self.value_to_multiplicity.iter(),
            current: None,
            remaining_copies: 0,
            remaining_len: self.len,
        }
    }
}
//
/// An iterator over the elements of a [`HeavyBag`], duplicates included.
///
/// This `struct` is created by the [`iter()`](HeavyBag::iter) method on
/// [`HeavyBag`]. See its documentation for more.
#[derive(Clone, Debug)]
pub struct Iter<'a, T> {
    /// Distinct values that have not been visited yet
    entries: indexmap::map::Iter<'a, T, NonZeroUsize>,

    /// Value that is currently being repeated
    current: Option<&'a T>,

    /// Number of times `current` must still be yielded
    remaining_copies: usize,

    /// Number of elements that have not been yielded yet
    remaining_len: usize,
}
//
impl<T> ExactSizeIterator for Iter<'_, T> {
    #[must_use = "Only effect is to produce a result"]
    fn len(&self) -> usize {
        self.remaining_len
    }
}
//
impl<T> FusedIterator for Iter<'_, T> {}
//
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining_copies > 0 {
            self.remaining_copies -= 1;
        } else {
            let (value, multiplicity) = self.entries.next()?;
            self.current = Some(value);
            self.remaining_copies = multiplicity.get() - 1;
        }
        self.remaining_len -= 1;
        self.current
    }

    #[must_use = "Only effect is to produce a result"]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining_len, Some(self.remaining_len))
    }

    fn count(self) -> usize
    where
        Self: Sized,
    {
        self.remaining_len
    }
}

/// Read-only view of the distinct values of a [`HeavyBag`]
///
/// This `struct` is created by the
/// [`unique_elements()`](HeavyBag::unique_elements) method on [`HeavyBag`].
/// See its documentation for more.
pub struct UniqueElements<'a, T, S = RandomState>(&'a IndexMap<T, NonZeroUsize, S>);
//
impl<'a, T, S> UniqueElements<'a, T, S> {
    /// Number of distinct values
    #[must_use = "Only effect is to produce a result"]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that the bag has no values
    #[must_use = "Only effect is to produce a result"]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterator over the distinct values, in the bag's iteration order
    #[must_use = "Only effect is to produce a result"]
    pub fn iter(&self) -> indexmap::map::Keys<'a, T, NonZeroUsize> {
        self.0.keys()
    }
}
//
impl<T: Hash + Eq, S: BuildHasher> UniqueElements<'_, T, S> {
    /// Truth that a value is present in the bag
    #[must_use = "Only effect is to produce a result"]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.contains_key(value)
    }
}
//
impl<T, S> Clone for UniqueElements<'_, T, S> {
    fn clone(&self) -> Self {
        *self
    }
}
//
impl<T, S> Copy for UniqueElements<'_, T, S> {}
//
impl<T: Debug, S> Debug for UniqueElements<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
//
impl<T: Hash + Eq, S1: BuildHasher, S2: BuildHasher> PartialEq<UniqueElements<'_, T, S2>>
    for UniqueElements<'_, T, S1>
{
    /// Set equality: same distinct values, in any order
    fn eq(&self, other: &UniqueElements<'_, T, S2>) -> bool {
        self.len() == other.len() && self.iter().all(|value| other.contains(value))
    }
}
//
impl<'a, T, S> IntoIterator for UniqueElements<'a, T, S> {
    type Item = &'a T;
    type IntoIter = indexmap::map::Keys<'a, T, NonZeroUsize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.keys()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashMap;

    /// Check every observable property of `bag` against a histogram of its
    /// expected contents
    fn check_against_model(bag: &HeavyBag<i32>, model: &HashMap<i32, usize>) {
        let expected_len: usize = model.values().sum();
        assert_eq!(bag.len(), expected_len);
        assert_eq!(bag.is_empty(), expected_len == 0);
        assert_eq!(bag.num_values(), model.len());
        assert_eq!(bag.unique_elements().len(), model.len());

        for (value, &count) in model {
            assert!(bag.contains(value));
            assert!(bag.unique_elements().contains(value));
            assert_eq!(bag.count(value), count);
            assert_eq!(bag.multiplicity(value), NonZeroUsize::new(count));
        }
        for (value, multiplicity) in bag.entries() {
            assert_eq!(model.get(value).copied(), Some(multiplicity.get()));
        }

        // Iteration yields exactly len() elements, with runs of equal values
        let iter = bag.iter();
        assert_eq!(iter.len(), expected_len);
        let elements = iter.copied().collect::<Vec<_>>();
        assert_eq!(elements.len(), expected_len);
        let mut histogram = HashMap::<i32, usize>::new();
        let mut runs = 0;
        for (i, &element) in elements.iter().enumerate() {
            *histogram.entry(element).or_default() += 1;
            if i == 0 || elements[i - 1] != element {
                runs += 1;
            }
        }
        assert_eq!(&histogram, model);
        assert_eq!(runs, model.len());

        let rebuilt = elements.iter().copied().collect::<HeavyBag<_>>();
        assert_eq!(&rebuilt, bag);
        assert_eq!(hash_of(&rebuilt), hash_of(bag));
    }

    fn hash_of(bag: &HeavyBag<i32>) -> u64 {
        let mut hasher = DefaultHasher::new();
        bag.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn empty() {
        let bag = HeavyBag::<i32>::new();
        check_against_model(&bag, &HashMap::new());
        check_against_model(&HeavyBag::default(), &HashMap::new());
        assert_eq!(bag.iter().next(), None);
        assert_eq!(bag.count(&0), 0);
        assert_eq!(bag.to_string(), "{}");
        assert_eq!(format!("{bag:?}"), "{}");
    }

    #[test]
    fn add_many_and_remove() {
        let mut bag = HeavyBag::new();
        assert_eq!(bag.add_many(5, 4), Ok(true));
        assert_eq!(bag.count(&5), 4);
        assert!(bag.remove(&5));
        assert_eq!(bag.count(&5), 3);
        assert_eq!(bag.len(), 3);
        assert!(!bag.remove(&6));
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn add_many_bounds() {
        let mut bag = HeavyBag::from_iter([1, 2, 2]);
        let before = bag.clone();
        for count in [-1, i64::MIN, MAX_ADD_MANY + 1, i64::MAX] {
            assert_eq!(bag.add_many(3, count), Err(BagError::InvalidCount { count }));
            assert_eq!(bag, before);
            assert!(!bag.contains(&3));
        }

        // Zero is a no-op that does not leave an empty entry behind
        assert_eq!(bag.add_many(3, 0), Ok(true));
        assert!(!bag.contains(&3));
        assert_eq!(bag.num_values(), 2);
        assert_eq!(bag, before);

        assert_eq!(bag.add_many(3, MAX_ADD_MANY), Ok(true));
        assert_eq!(bag.count(&3), 1_000_000_000);
        assert_eq!(bag.len(), 1_000_000_003);
    }

    #[test]
    fn heavy_iteration() {
        let mut bag = HeavyBag::new();
        bag.add_many('x', 1_000_000).unwrap();
        bag.add('y');
        assert_eq!(bag.iter().count(), 1_000_001);
        assert_eq!(bag.iter().filter(|&&c| c == 'y').count(), 1);
    }

    #[test]
    fn removing_last_copy() {
        let mut bag = HeavyBag::from_iter(["a", "b", "b"]);
        assert!(bag.remove("a"));
        assert!(!bag.contains("a"));
        assert!(!bag.unique_elements().contains("a"));
        assert!(bag.unique_elements().iter().eq([&"b"]));
        assert_eq!(bag.to_string(), "{b: 2}");
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let mut bag1 = HeavyBag::new();
        bag1.add_many("a", 3).unwrap();
        bag1.add("b");
        bag1.add("c");
        assert!(bag1.remove("c"));

        let mut bag2 = HeavyBag::new();
        bag2.add("b");
        bag2.add("a");
        bag2.add_many("a", 2).unwrap();

        assert_eq!(bag1, bag2);
        let hash = |bag: &HeavyBag<&str>| {
            let mut hasher = DefaultHasher::new();
            bag.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&bag1), hash(&bag2));

        // Same values, different multiplicities
        bag2.add("b");
        assert_ne!(bag1, bag2);
        assert!(bag1.remove("a"));
        assert_eq!(bag1.len(), bag2.len() - 2);
        // Same length, different values
        let bag3 = HeavyBag::from_iter(["a", "a", "a", "c"]);
        let bag4 = HeavyBag::from_iter(["a", "a", "a", "b"]);
        assert_ne!(bag3, bag4);
    }

    #[test]
    fn choose_follows_multiplicities() {
        let mut bag = HeavyBag::new();
        bag.add_many('a', 7).unwrap();
        bag.add_many('b', 3).unwrap();
        let before = bag.clone();

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let trials = 10_000;
        let mut a_count = 0;
        for _ in 0..trials {
            match bag.choose(&mut rng).copied() {
                Ok('a') => a_count += 1,
                Ok('b') => {}
                other => panic!("unexpected choice {other:?}"),
            }
        }
        // Standard deviation is about 46 draws
        assert!((6_700..=7_300).contains(&a_count), "{a_count} draws of 'a'");
        assert_eq!(bag, before);
    }

    #[test]
    fn choose_single_value() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut bag = HeavyBag::new();
        assert_eq!(bag.choose(&mut rng), Err(BagError::Empty));
        bag.add_many(9, MAX_ADD_MANY).unwrap();
        for _ in 0..100 {
            assert_eq!(bag.choose(&mut rng), Ok(&9));
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Add(i32),
        AddMany(i32, i64),
        Remove(i32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..8i32).prop_map(Op::Add),
            (0..8i32, -2..20i64).prop_map(|(value, count)| Op::AddMany(value, count)),
            (0..8i32).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn model(ops in prop::collection::vec(op(), 0..64)) {
            let mut bag = HeavyBag::new();
            let mut model = HashMap::<i32, usize>::new();
            for op in ops {
                match op {
                    Op::Add(value) => {
                        prop_assert!(bag.add(value));
                        *model.entry(value).or_default() += 1;
                    }
                    Op::AddMany(value, count) => {
                        let result = bag.add_many(value, count);
                        if count < 0 {
                            prop_assert_eq!(result, Err(BagError::InvalidCount { count }));
                        } else {
                            prop_assert_eq!(result, Ok(true));
                            if count > 0 {
                                *model.entry(value).or_default() += count as usize;
                            }
                        }
                    }
                    Op::Remove(value) => {
                        let expected = match model.get_mut(&value) {
                            Some(1) => {
                                model.remove(&value);
                                true
                            }
                            Some(count) => {
                                *count -= 1;
                                true
                            }
                            None => false,
                        };
                        prop_assert_eq!(bag.remove(&value), expected);
                    }
                }
                check_against_model(&bag, &model);
            }
        }

        #[test]
        fn choose_is_a_member(contents in prop::collection::vec(0..16i32, 1..64), seed in any::<u64>()) {
            let bag = contents.iter().copied().collect::<HeavyBag<_>>();
            let mut rng = StdRng::seed_from_u64(seed);
            let chosen = bag.choose(&mut rng).unwrap();
            prop_assert!(bag.contains(chosen));
        }
    }
}
