/// A single cell of a backing buffer.
pub(crate) type Word = u32;

/// Number of bits in a [`Word`].
pub(crate) const WORD_BITS: u32 = Word::BITS;

/// Index of the word holding absolute bit `bit`.
#[inline]
pub(crate) fn word_index(bit: usize) -> usize {
    bit / WORD_BITS as usize
}

/// Offset of absolute bit `bit` within its word, `bit % 32`.
///
/// Plain offset: callers turn it into an MSB-first shift.
#[inline]
pub(crate) fn bit_in_word(bit: usize) -> u32 {
    (bit % WORD_BITS as usize) as u32
}

/// A mask with the low `bits` bits set.
#[inline]
pub(crate) fn low_mask(bits: u32) -> Word {
    if bits >= WORD_BITS {
        Word::MAX
    } else {
        (1 << bits) - 1
    }
}

/// The single-bit mask selecting `n` within word `word_index(n)`.
///
/// Bits are packed MSB-first: `n % 32 == 0` maps to the word's top bit.
#[inline]
pub(crate) fn bit_mask(n: usize) -> Word {
    1 << (WORD_BITS - 1 - bit_in_word(n))
}

/// Number of words a presence set of the given capacity occupies.
#[inline]
pub(crate) fn words_for_capacity(capacity: usize) -> usize {
    word_index(capacity) + 1
}

/// Where a `width`-bit field lives in the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Span {
    /// The field fits in `word`, with its LSB `shift` bits above the word's LSB.
    Single { word: usize, shift: u32 },
    /// The field crosses from `word` into `word + 1`.
    ///
    /// The high `left_bits` of the field sit in the low bits of `word`, the
    /// low `right_bits` sit in the high bits of `word + 1`.
    Straddle {
        word: usize,
        left_bits: u32,
        right_bits: u32,
    },
}

impl Span {
    /// Locate field `index` of a buffer packed with `width`-bit fields.
    ///
    /// `width` must be in `1..WORD_BITS`, so a field never spans more than
    /// two words.
    #[inline]
    pub(crate) fn of(index: usize, width: u32) -> Span {
        debug_assert!(width > 0 && width < WORD_BITS);

        let start = index * width as usize;
        let word = word_index(start);
        let offset = bit_in_word(start);

        if offset + width <= WORD_BITS {
            Span::Single {
                word,
                shift: WORD_BITS - offset - width,
            }
        } else {
            let left_bits = WORD_BITS - offset;
            Span::Straddle {
                word,
                left_bits,
                right_bits: width - left_bits,
            }
        }
    }

    /// Index of the last word this field touches.
    #[inline]
    pub(crate) fn last_word(self) -> usize {
        match self {
            Span::Single { word, .. } => word,
            Span::Straddle { word, .. } => word + 1,
        }
    }
}

/// Number of words needed to hold fields `0..=max_index`, or `None` if
/// their bits do not fit in a `usize`.
#[inline]
pub(crate) fn words_for_fields(max_index: usize, width: u32) -> Option<usize> {
    max_index.checked_add(1)?.checked_mul(width as usize)?;
    Some(Span::of(max_index, width).last_word() + 1)
}

/// Read field `index`.
pub(crate) fn decode(words: &[Word], index: usize, width: u32) -> Word {
    match Span::of(index, width) {
        Span::Single { word, shift } => (words[word] >> shift) & low_mask(width),
        Span::Straddle {
            word,
            left_bits,
            right_bits,
        } => {
            let high = words[word] & low_mask(left_bits);
            let low = words[word + 1] >> (WORD_BITS - right_bits);
            (high << right_bits) | low
        }
    }
}

/// Overwrite field `index` with the low `width` bits of `value`.
///
/// Bits outside the field are left untouched.
pub(crate) fn encode(words: &mut [Word], index: usize, width: u32, value: Word) {
    match Span::of(index, width) {
        Span::Single { word, shift } => {
            let mask = low_mask(width) << shift;
            words[word] = (words[word] & !mask) | ((value << shift) & mask);
        }
        Span::Straddle {
            word,
            left_bits,
            right_bits,
        } => {
            let left_mask = low_mask(left_bits);
            words[word] = (words[word] & !left_mask) | ((value >> right_bits) & left_mask);

            let right_shift = WORD_BITS - right_bits;
            let right_mask = low_mask(right_bits) << right_shift;
            words[word + 1] =
                (words[word + 1] & !right_mask) | ((value << right_shift) & right_mask);
        }
    }
}
