use tracing::{trace, warn};

use crate::Error;
use crate::codec::{Word, bit_mask, word_index, words_for_capacity};

/// A presence set over `0..capacity`, one bit per integer.
///
/// Integer `n` lives in word `n / 32` at bit `31 - n % 32` (MSB-first). The
/// buffer always holds `capacity / 32 + 1` words and the cardinality is
/// tracked alongside it, so `len` is O(1).
///
/// Adding a value at or beyond the capacity grows the set instead of failing.
/// Growth reallocates to the exact number of words required, without
/// headroom: presence sets are expected to be sized once, up front.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "allocative", derive(allocative::Allocative))]
pub struct Bitset {
    capacity: usize,
    len: usize,
    words: Vec<Word>,
}

impl Bitset {
    /// Create an empty set able to hold `0..capacity` without growing.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            len: 0,
            words: vec![0; words_for_capacity(capacity)],
        }
    }

    /// The exclusive upper bound on values held without growing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of members.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bit is set.
    ///
    /// Checks the words themselves rather than the cardinality counter.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Test whether `n` is a member. Values beyond the capacity never are.
    pub fn contains(&self, n: usize) -> bool {
        if n >= self.capacity {
            return false;
        }

        self.words[word_index(n)] & bit_mask(n) != 0
    }

    /// Add `n`, growing the capacity to `n + 1` if needed.
    ///
    /// Returns `true` if `n` was not already a member. A capacity of `n + 1`
    /// that cannot be represented or allocated leaves the set unchanged and
    /// returns `false`; use [`Bitset::try_add`] to observe that case.
    pub fn add(&mut self, n: usize) -> bool {
        self.try_add(n).unwrap_or_else(|err| {
            warn!("cannot add {} to bitset: {}", n, err);
            false
        })
    }

    /// Add `n` like [`Bitset::add`], failing with
    /// [`Error::CapacityOverflow`] when the set cannot grow to hold it.
    pub fn try_add(&mut self, n: usize) -> Result<bool, Error> {
        if n >= self.capacity {
            let capacity = n.checked_add(1).ok_or(Error::CapacityOverflow)?;
            self.grow(capacity)?;
        }

        let word = &mut self.words[word_index(n)];
        let mask = bit_mask(n);
        if *word & mask != 0 {
            return Ok(false);
        }

        *word |= mask;
        self.len += 1;
        Ok(true)
    }

    /// Remove `n`. No-op for non-members, including values beyond the capacity.
    ///
    /// Returns `true` if `n` was a member.
    pub fn remove(&mut self, n: usize) -> bool {
        if n >= self.capacity {
            return false;
        }

        let word = &mut self.words[word_index(n)];
        let mask = bit_mask(n);
        if *word & mask == 0 {
            return false;
        }

        *word &= !mask;
        self.len -= 1;
        true
    }

    /// Remove every member. The capacity is kept.
    pub fn clear(&mut self) {
        self.words.fill(0);
        self.len = 0;
    }

    /// Move the contents out, leaving an empty set with capacity 0 behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// The number of heap-allocated bytes used by this set.
    pub fn heap_bytes(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<Word>()
    }

    #[cfg(test)]
    pub(crate) fn words(&self) -> &[Word] {
        &self.words
    }

    /// Raise the capacity to `capacity`, reallocating only when the word
    /// count has to increase. Existing bits are preserved, and nothing
    /// changes if the words cannot be allocated.
    fn grow(&mut self, capacity: usize) -> Result<(), Error> {
        debug_assert!(capacity > self.capacity);

        let needed = words_for_capacity(capacity);
        let current = self.words.len();
        if needed > current {
            trace!(
                "growing bitset: capacity {} -> {}, words {} -> {}",
                self.capacity,
                capacity,
                current,
                needed
            );
            self.words
                .try_reserve_exact(needed - current)
                .map_err(|_| Error::CapacityOverflow)?;
            self.words.resize(needed, 0);
        }

        self.capacity = capacity;
        Ok(())
    }
}

impl Default for Bitset {
    /// An empty set with capacity 0.
    fn default() -> Self {
        Self::new(0)
    }
}

impl Extend<usize> for Bitset {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for n in iter {
            self.add(n);
        }
    }
}

impl FromIterator<usize> for Bitset {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}
