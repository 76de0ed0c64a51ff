//! Marker trait for stage step sequences.
//!
//! Every stage declares its steps as a fieldless enum whose declaration order
//! is the progression order. The trait exposes that order as plain data so
//! the transition engine never has to know which stage it is driving.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// A named step in a stage's linear progression.
///
/// Markers are values: ordering and equality are by ordinal, and two stages
/// use two different types, so comparing markers across stages does not
/// compile.
///
/// Implementations are normally generated with [`marker_enum!`](crate::marker_enum).
///
/// # Example
///
/// ```rust
/// use hubbleds::core::Marker;
/// use hubbleds::marker_enum;
///
/// marker_enum! {
///     pub enum Walkthrough {
///         Intro => "intro",
///         Measure => "measure",
///         Done => "done",
///     }
/// }
///
/// assert_eq!(Walkthrough::first(), Walkthrough::Intro);
/// assert_eq!(Walkthrough::last(), Walkthrough::Done);
/// assert_eq!(Walkthrough::Measure.ordinal(), 1);
/// assert!(Walkthrough::Measure.is_between(Walkthrough::Done, Walkthrough::Intro));
/// ```
pub trait Marker:
    Copy + Eq + Ord + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// All markers of the stage in declaration order. Never empty.
    const SEQUENCE: &'static [Self];

    /// The step key, e.g. `"ang_siz2b"`.
    fn name(&self) -> &'static str;

    /// Position in declaration order, starting at 0.
    fn ordinal(&self) -> usize;

    fn first() -> Self {
        Self::SEQUENCE[0]
    }

    fn last() -> Self {
        Self::SEQUENCE[Self::SEQUENCE.len() - 1]
    }

    fn is_first(&self) -> bool {
        self.ordinal() == 0
    }

    fn is_last(&self) -> bool {
        self.ordinal() + 1 == Self::SEQUENCE.len()
    }

    /// The following marker, or `None` at the end of the stage.
    fn next(&self) -> Option<Self> {
        Self::SEQUENCE.get(self.ordinal() + 1).copied()
    }

    /// The preceding marker, or `None` at the start of the stage.
    fn previous(&self) -> Option<Self> {
        self.ordinal()
            .checked_sub(1)
            .and_then(|i| Self::SEQUENCE.get(i).copied())
    }

    /// Inclusive range check. The bounds may be given in either order.
    fn is_between(&self, low: Self, high: Self) -> bool {
        let (lo, hi) = if low.ordinal() <= high.ordinal() {
            (low, high)
        } else {
            (high, low)
        };
        lo.ordinal() <= self.ordinal() && self.ordinal() <= hi.ordinal()
    }

    /// Look up a marker by its step key.
    fn from_name(name: &str) -> Option<Self> {
        Self::SEQUENCE.iter().copied().find(|m| m.name() == name)
    }
}
