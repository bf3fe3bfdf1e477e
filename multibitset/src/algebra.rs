use std::ops::{BitAnd, BitAndAssign, Not, Sub, SubAssign};

use tracing::trace;

use crate::multi::MultiBitset;

/// Pointwise minimum of two multisets.
///
/// The result covers `0..=min(max_number)` with the narrower of the two
/// counter widths.
pub fn intersection(lhs: &MultiBitset, rhs: &MultiBitset) -> MultiBitset {
    let max_number = lhs.max_number().min(rhs.max_number());
    let width = lhs.width().min(rhs.width());

    let mut out = MultiBitset::zeroed(max_number, width);
    for num in 0..=max_number {
        out.replace(num, lhs.count(num).min(rhs.count(num)));
    }

    trace!(
        "intersection: max_number={}, width={}",
        max_number,
        width.get()
    );
    out
}

/// Pointwise clipped subtraction, `lhs - rhs` floored at zero.
///
/// The result has the shape of `lhs`. Numbers beyond `rhs.max_number()`
/// subtract nothing.
pub fn difference(lhs: &MultiBitset, rhs: &MultiBitset) -> MultiBitset {
    let mut out = MultiBitset::zeroed(lhs.max_number(), lhs.width());
    for num in 0..=lhs.max_number() {
        out.replace(num, lhs.count(num).saturating_sub(rhs.count(num)));
    }

    trace!(
        "difference: max_number={}, width={}",
        lhs.max_number(),
        lhs.width().get()
    );
    out
}

/// Pointwise complement against the saturation ceiling,
/// `max_count - count`.
pub fn complement(set: &MultiBitset) -> MultiBitset {
    let max_count = set.max_count();

    let mut out = MultiBitset::zeroed(set.max_number(), set.width());
    for num in 0..=set.max_number() {
        out.replace(num, max_count - set.count(num));
    }

    trace!(
        "complement: max_number={}, width={}",
        set.max_number(),
        set.width().get()
    );
    out
}

impl BitAnd for &MultiBitset {
    type Output = MultiBitset;

    /// Same as [`intersection`].
    fn bitand(self, rhs: Self) -> MultiBitset {
        intersection(self, rhs)
    }
}

impl Sub for &MultiBitset {
    type Output = MultiBitset;

    /// Same as [`difference`].
    fn sub(self, rhs: Self) -> MultiBitset {
        difference(self, rhs)
    }
}

impl Not for &MultiBitset {
    type Output = MultiBitset;

    /// Same as [`complement`].
    fn not(self) -> MultiBitset {
        complement(self)
    }
}

impl BitAndAssign<&MultiBitset> for MultiBitset {
    fn bitand_assign(&mut self, rhs: &MultiBitset) {
        *self = &*self & rhs;
    }
}

impl SubAssign<&MultiBitset> for MultiBitset {
    fn sub_assign(&mut self, rhs: &MultiBitset) {
        *self = &*self - rhs;
    }
}
