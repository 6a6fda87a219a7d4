//! Errors reported by [`HeavyBag`](crate::HeavyBag) and its cursors

use crate::MAX_ADD_MANY;
use thiserror::Error;

/// Broad category of a [`BagError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An argument was outside of its accepted range
    InvalidArgument,

    /// A cursor was advanced past its last element
    ExhaustedIterator,

    /// An operation was called in a state where it is not allowed
    PreconditionViolation,
}

/// Error type of all fallible multiset operations
///
/// No operation that returns this error has modified the multiset.
///
/// # Examples
///
/// ```
/// use heavy_bag::{BagError, ErrorKind, HeavyBag};
///
/// let mut bag = HeavyBag::new();
/// let error = bag.add_many("a", -1).unwrap_err();
/// assert_eq!(error, BagError::InvalidCount { count: -1 });
/// assert_eq!(error.kind(), ErrorKind::InvalidArgument);
/// assert!(bag.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BagError {
    /// `add_many()` was asked to add a negative or excessive number of copies
    #[error(
        "cannot add {count} copies at once, expected a count within [0, {max}]",
        max = MAX_ADD_MANY
    )]
    InvalidCount {
        /// Rejected number of copies
        count: i64,
    },

    /// `next()` was called on a cursor with no remaining element
    #[error("cursor has already yielded every element of the bag")]
    Exhausted,

    /// Cursor `remove()` was called before `next()`, or twice in a row
    #[error("cursor has no current element to remove")]
    NoCurrentElement,

    /// `choose()` was called on an empty bag
    #[error("cannot choose an element from an empty bag")]
    Empty,
}

impl BagError {
    /// Category of this error
    #[must_use = "Only effect is to produce a result"]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCount { .. } => ErrorKind::InvalidArgument,
            Self::Exhausted => ErrorKind::ExhaustedIterator,
            Self::NoCurrentElement | Self::Empty => ErrorKind::PreconditionViolation,
        }
    }
}
