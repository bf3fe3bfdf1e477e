use crate::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Largest value fed to a presence set. Kept small enough that exhaustive
/// membership checks are fast while still spanning several words.
const MAX_VALUE: usize = 512;

/// Largest `max_number` for counting multisets.
const MAX_NUMBER: usize = 256;

#[derive(Debug, Clone)]
enum SetOp {
    Add(usize),
    Remove(usize),
    Clear,
}

fn arb_set_op() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        6 => (0..MAX_VALUE).prop_map(SetOp::Add),
        3 => (0..MAX_VALUE).prop_map(SetOp::Remove),
        1 => Just(SetOp::Clear),
    ]
}

#[derive(Debug, Clone)]
enum CountOp {
    Insert(usize),
    Remove(usize),
    Replace(usize, u32),
}

fn arb_count_op() -> impl Strategy<Value = CountOp> {
    // Numbers slightly past MAX_NUMBER exercise the out-of-range no-ops.
    prop_oneof![
        5 => (0..MAX_NUMBER + 8).prop_map(CountOp::Insert),
        3 => (0..MAX_NUMBER + 8).prop_map(CountOp::Remove),
        2 => (0..MAX_NUMBER + 8, any::<u32>()).prop_map(|(n, c)| CountOp::Replace(n, c)),
    ]
}

/// Strategy: a (max_number, width, counts) triple with every count in range.
fn arb_multiset() -> impl Strategy<Value = (usize, u8, Vec<u32>)> {
    arb_multiset_with_widths(1..=31)
}

fn arb_multiset_with_widths(
    widths: std::ops::RangeInclusive<u8>,
) -> impl Strategy<Value = (usize, u8, Vec<u32>)> {
    (0..=MAX_NUMBER, widths).prop_flat_map(|(max_number, width)| {
        let max = FieldWidth::new(width).unwrap().max_count();
        proptest::collection::vec(0..=max, max_number + 1)
            .prop_map(move |counts| (max_number, width, counts))
    })
}

/// Strategy: two multisets of independent shapes.
fn arb_pair() -> impl Strategy<Value = (MultiBitset, MultiBitset)> {
    (arb_multiset(), arb_multiset()).prop_map(|((_, wa, ca), (_, wb, cb))| {
        (
            MultiBitset::from_counts(&ca, wa).unwrap(),
            MultiBitset::from_counts(&cb, wb).unwrap(),
        )
    })
}

/// Apply `ops` to both a `MultiBitset` and a plain vector of counts.
fn run_counts(max_number: usize, width: u8, ops: &[CountOp]) -> (MultiBitset, Vec<u32>) {
    let mut set = MultiBitset::new(max_number, width).unwrap();
    let mut model = vec![0u32; max_number + 1];
    let max = set.max_count();

    for op in ops {
        match *op {
            CountOp::Insert(n) => {
                set.insert(n);
                if let Some(c) = model.get_mut(n) {
                    *c = (*c + 1).min(max);
                }
            }
            CountOp::Remove(n) => {
                set.remove(n);
                if let Some(c) = model.get_mut(n) {
                    *c = c.saturating_sub(1);
                }
            }
            CountOp::Replace(n, count) => {
                set.replace(n, count);
                if let Some(c) = model.get_mut(n) {
                    *c = count.min(max);
                }
            }
        }
    }

    (set, model)
}

// ===== Presence set =====

proptest! {
    #[test]
    fn bitset_matches_btreeset(
        capacity in 0..MAX_VALUE,
        ops in proptest::collection::vec(arb_set_op(), 0..200),
    ) {
        let mut bs = Bitset::new(capacity);
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                SetOp::Add(n) => prop_assert_eq!(bs.add(n), model.insert(n)),
                SetOp::Remove(n) => prop_assert_eq!(bs.remove(n), model.remove(&n)),
                SetOp::Clear => {
                    bs.clear();
                    model.clear();
                }
            }
        }

        prop_assert_eq!(bs.len(), model.len());
        prop_assert_eq!(bs.is_empty(), model.is_empty());
        for n in 0..MAX_VALUE + 32 {
            prop_assert_eq!(bs.contains(n), model.contains(&n), "contains({})", n);
        }
    }

    #[test]
    fn bitset_len_counts_members(
        capacity in 0..MAX_VALUE,
        ops in proptest::collection::vec(arb_set_op(), 0..200),
    ) {
        let mut bs = Bitset::new(capacity);
        for op in ops {
            match op {
                SetOp::Add(n) => { bs.add(n); }
                SetOp::Remove(n) => { bs.remove(n); }
                SetOp::Clear => bs.clear(),
            }
        }

        let members = (0..bs.capacity()).filter(|&n| bs.contains(n)).count();
        prop_assert_eq!(bs.len(), members);
    }

    #[test]
    fn bitset_growth_preserves_members(
        initial in proptest::collection::btree_set(0..64usize, 0..32),
        grow_to in 64..4096usize,
    ) {
        let mut bs = Bitset::new(64);
        bs.extend(initial.iter().copied());

        bs.add(grow_to);
        prop_assert_eq!(bs.capacity(), grow_to + 1);
        for &n in &initial {
            prop_assert!(bs.contains(n), "{} lost after growing to {}", n, grow_to);
        }
        prop_assert_eq!(bs.len(), initial.len() + 1);
    }
}

// ===== Counting multiset =====

proptest! {
    #[test]
    fn multiset_matches_model(
        max_number in 0..=MAX_NUMBER,
        width in 1u8..=31,
        ops in proptest::collection::vec(arb_count_op(), 0..300),
    ) {
        let (set, model) = run_counts(max_number, width, &ops);

        for (num, &expected) in model.iter().enumerate() {
            prop_assert_eq!(set.count(num), expected, "count({}), width={}", num, width);
        }
        prop_assert_eq!(set.count(max_number + 1), 0);
        prop_assert_eq!(set.len(), model.iter().map(|&c| c as u64).sum::<u64>());
        prop_assert_eq!(set.is_empty(), model.iter().all(|&c| c == 0));
    }

    #[test]
    fn multiset_saturates(
        max_number in 0..=MAX_NUMBER,
        width in 1u8..=6,
        num in 0..=MAX_NUMBER,
    ) {
        let num = num.min(max_number);
        let mut set = MultiBitset::new(max_number, width).unwrap();
        let max = set.max_count();

        for _ in 0..=max {
            set.insert(num);
        }
        prop_assert_eq!(set.count(num), max);

        for _ in 0..=max {
            set.remove(num);
        }
        prop_assert_eq!(set.count(num), 0);
    }

    #[test]
    fn display_lists_multiplicities(
        (max_number, width, counts) in arb_multiset_with_widths(1..=4),
    ) {
        let set = MultiBitset::from_counts(&counts, width).unwrap();

        let expected: Vec<String> = counts
            .iter()
            .enumerate()
            .flat_map(|(num, &c)| std::iter::repeat_n(num.to_string(), c as usize))
            .collect();
        prop_assert_eq!(set.to_string(), expected.join(" "));
        prop_assert_eq!(set.max_number(), max_number);
    }
}

// ===== Set algebra =====

proptest! {
    #[test]
    fn intersection_is_pointwise_min((a, b) in arb_pair()) {
        let c = intersection(&a, &b);
        prop_assert_eq!(c.max_number(), a.max_number().min(b.max_number()));
        prop_assert_eq!(c.width(), a.width().min(b.width()));
        for i in 0..=c.max_number() {
            prop_assert_eq!(c.count(i), a.count(i).min(b.count(i)), "i={}", i);
        }
    }

    #[test]
    fn difference_is_clipped_subtraction((a, b) in arb_pair()) {
        let c = difference(&a, &b);
        prop_assert_eq!(c.max_number(), a.max_number());
        prop_assert_eq!(c.width(), a.width());
        for i in 0..=a.max_number() {
            let expected = (a.count(i) as i64 - b.count(i) as i64).max(0) as u32;
            prop_assert_eq!(c.count(i), expected, "i={}", i);
        }
    }

    #[test]
    fn complement_against_max_count((a, _) in arb_pair()) {
        let c = complement(&a);
        for i in 0..=a.max_number() {
            prop_assert_eq!(c.count(i), a.max_count() - a.count(i), "i={}", i);
        }
        prop_assert_eq!(complement(&c), a);
    }

    #[test]
    fn difference_of_self_is_empty((a, _) in arb_pair()) {
        prop_assert!(difference(&a, &a).is_empty());
        prop_assert_eq!(intersection(&a, &a), a);
    }
}
