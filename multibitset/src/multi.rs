use std::fmt;

use tracing::debug;

use crate::codec::{WORD_BITS, Word, decode, encode, low_mask, words_for_fields};
use crate::Error;

/// Largest number of a [`MultiBitset::default`] multiset.
pub const DEFAULT_MAX_NUMBER: usize = 16;

/// Counter width of a [`MultiBitset::default`] multiset.
pub const DEFAULT_FIELD_WIDTH: FieldWidth = FieldWidth(2);

/// The number of bits used by each counter of a [`MultiBitset`].
///
/// Always in `1..=31`, so a counter never spans more than two words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "allocative", derive(allocative::Allocative))]
#[repr(transparent)]
pub struct FieldWidth(u8);

impl FieldWidth {
    /// The widest supported counter.
    pub const MAX: FieldWidth = FieldWidth(WORD_BITS as u8 - 1);

    /// Creates a new FieldWidth if `bits` is in `1..=31`.
    pub const fn new(bits: u8) -> Option<Self> {
        if bits == 0 || bits as u32 >= WORD_BITS {
            None
        } else {
            Some(FieldWidth(bits))
        }
    }

    /// Returns the width in bits.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The saturation ceiling of a counter this wide, `2^k - 1`.
    pub fn max_count(self) -> u32 {
        low_mask(self.0 as u32)
    }

    #[inline]
    fn bits(self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<u8> for FieldWidth {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits).ok_or_else(|| {
            debug!("rejecting field width {}", bits);
            Error::InvalidFieldWidth(bits)
        })
    }
}

impl From<FieldWidth> for u8 {
    fn from(width: FieldWidth) -> Self {
        width.0
    }
}

/// A counting multiset over `0..=max_number` with one saturating k-bit
/// counter per integer.
///
/// # Layout
///
/// Counters are packed back to back, MSB-first, starting at the top bit of
/// word 0: the counter for `num` occupies absolute bits
/// `num * k .. (num + 1) * k`. When that range crosses a word boundary the
/// counter's high bits sit in the low bits of the left word and its low bits
/// in the high bits of the right word.
///
/// With `k = 3`, counter 10 covers absolute bits `30..33`: its two high bits
/// are the two low bits of word 0 and its low bit is the top bit of word 1.
///
/// # Semantics
///
/// Nothing here fails once constructed. Counts saturate at `max_count` and
/// stop at zero, and numbers above `max_number` read as zero and ignore
/// mutation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "allocative", derive(allocative::Allocative))]
pub struct MultiBitset {
    width: FieldWidth,
    max_number: usize,
    words: Vec<Word>,
}

impl MultiBitset {
    /// Create an all-zero multiset over `0..=max_number` with `width`-bit
    /// counters.
    ///
    /// Fails if `width` is not in `1..=31`, or if `(max_number + 1) * width`
    /// bits cannot be allocated.
    pub fn new(max_number: usize, width: u8) -> Result<Self, Error> {
        Self::with_width(max_number, FieldWidth::try_from(width)?)
    }

    /// Create an all-zero multiset from an already validated width.
    ///
    /// Fails with [`Error::CapacityOverflow`] if the counters' bits do not
    /// fit in a `usize` or their words cannot be allocated.
    pub fn with_width(max_number: usize, width: FieldWidth) -> Result<Self, Error> {
        let overflow = || {
            debug!(
                "rejecting multiset shape: max_number={}, width={}",
                max_number,
                width.get()
            );
            Error::CapacityOverflow
        };

        let len = words_for_fields(max_number, width.bits()).ok_or_else(overflow)?;
        let mut words = Vec::new();
        words.try_reserve_exact(len).map_err(|_| overflow())?;
        words.resize(len, 0);

        Ok(Self {
            width,
            max_number,
            words,
        })
    }

    /// An all-zero multiset of a shape no larger than one that already
    /// exists, so its size is known to fit.
    pub(crate) fn zeroed(max_number: usize, width: FieldWidth) -> Self {
        let len = words_for_fields(max_number, width.bits()).unwrap_or_default();
        Self {
            width,
            max_number,
            words: vec![0; len],
        }
    }

    /// Build a multiset whose counts are `counts`, indexed by number.
    ///
    /// An empty slice gives a multiset with `max_number == 0`. Fails if the
    /// width is invalid or any count does not fit in it.
    pub fn from_counts(counts: &[u32], width: u8) -> Result<Self, Error> {
        let mut set = Self::new(counts.len().saturating_sub(1), width)?;
        let max = set.max_count();

        for (index, &count) in counts.iter().enumerate() {
            if count > max {
                return Err(Error::CountOverflow { index, count, max });
            }
            set.replace(index, count);
        }

        Ok(set)
    }

    /// The largest number with a counter (inclusive).
    pub fn max_number(&self) -> usize {
        self.max_number
    }

    /// The counter width.
    pub fn width(&self) -> FieldWidth {
        self.width
    }

    /// The saturation ceiling of every counter.
    pub fn max_count(&self) -> u32 {
        self.width.max_count()
    }

    /// The multiplicity of `num`, or 0 if `num > max_number`.
    pub fn count(&self, num: usize) -> u32 {
        if !self.holds(num) {
            return 0;
        }

        decode(&self.words, num, self.width.bits())
    }

    /// Increment the counter of `num`.
    ///
    /// No-op when `num > max_number` or the counter is already saturated.
    pub fn insert(&mut self, num: usize) {
        if !self.holds(num) {
            return;
        }

        let count = self.count(num);
        if count == self.max_count() {
            return;
        }

        self.replace(num, count + 1);
    }

    /// Decrement the counter of `num`. No-op when it is already zero.
    pub fn remove(&mut self, num: usize) {
        let count = self.count(num);
        if count == 0 {
            return;
        }

        self.replace(num, count - 1);
    }

    /// Set the counter of `num` to `count`, clamped to `max_count`.
    ///
    /// Only the bits of this counter are written. No-op when
    /// `num > max_number`.
    pub fn replace(&mut self, num: usize, count: u32) {
        if !self.holds(num) {
            return;
        }

        let count = count.min(self.max_count());
        encode(&mut self.words, num, self.width.bits(), count);
    }

    /// The total multiplicity, i.e. the sum of every counter.
    pub fn len(&self) -> u64 {
        self.counts().map(u64::from).sum()
    }

    /// Returns `true` if every counter is zero.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Move the contents out, leaving an empty shell behind.
    ///
    /// The shell keeps its width and holds a single zero counter for `0`,
    /// the same as a fresh `with_width(0, width)`.
    pub fn take(&mut self) -> Self {
        let shell = Self::zeroed(0, self.width);
        std::mem::replace(self, shell)
    }

    /// The number of heap-allocated bytes used by this multiset.
    pub fn heap_bytes(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<Word>()
    }

    #[cfg(test)]
    pub(crate) fn words(&self) -> &[Word] {
        &self.words
    }

    /// Counts of `0..=max_number`, in order.
    fn counts(&self) -> impl Iterator<Item = u32> + '_ {
        (0..=self.max_number).map(|num| self.count(num))
    }

    /// Whether `num` has a counter in this buffer.
    #[inline]
    fn holds(&self, num: usize) -> bool {
        num <= self.max_number
    }
}

impl Default for MultiBitset {
    /// A multiset over `0..=16` with 2-bit counters.
    fn default() -> Self {
        Self::zeroed(DEFAULT_MAX_NUMBER, DEFAULT_FIELD_WIDTH)
    }
}

/// Lists every number as many times as it is counted, ascending and
/// space-separated: counts `[1, 0, 3]` render as `0 2 2 2`.
impl fmt::Display for MultiBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (num, count) in self.counts().enumerate() {
            for _ in 0..count {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{}", num)?;
                first = false;
            }
        }
        Ok(())
    }
}
