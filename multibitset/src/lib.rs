//! Bit-packed integer sets over arrays of 32-bit words.
//!
//! - [`Bitset`]: a presence set, one bit per integer in `0..capacity`, that
//!   grows when a larger value is added.
//! - [`MultiBitset`]: a counting multiset, one saturating k-bit counter per
//!   integer in `0..=max_number`, with `k` in `1..=31`.
//!
//! Set algebra over counting multisets ([`intersection`], [`difference`],
//! [`complement`]) builds new multisets through the public `count`/`replace`
//! surface and never mutates its inputs.
//!
//! Out-of-range input is not an error anywhere: queries return `false`/`0`,
//! multiset mutations become no-ops, and counters clamp instead of wrapping.
//! Only construction and the explicit `try_*` growth path can fail, see
//! [`Error`].

mod algebra;
mod bitset;
mod codec;
mod multi;

#[cfg(test)]
mod tests_model;

pub use algebra::{complement, difference, intersection};
pub use bitset::Bitset;
pub use multi::{DEFAULT_FIELD_WIDTH, DEFAULT_MAX_NUMBER, FieldWidth, MultiBitset};

// ── Error ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid field width: {0} (expected 1..=31)")]
    InvalidFieldWidth(u8),

    #[error("count {count} at index {index} exceeds the maximum count {max}")]
    CountOverflow { index: usize, count: u32, max: u32 },

    #[error("the requested capacity does not fit in memory")]
    CapacityOverflow,
}
