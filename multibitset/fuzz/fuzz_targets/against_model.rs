#![no_main]

use libfuzzer_sys::arbitrary::{self, Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use multibitset::{Bitset, MultiBitset};
use std::collections::BTreeSet;
use std::mem;

// Interesting (max_number, width) shapes: single word, word-aligned fields,
// fields straddling every boundary, and the widest counter.
const SHAPES: [(usize, u8); 12] = [
    (0, 1),
    (31, 1),
    (32, 1),
    (15, 2),
    (16, 2),
    (10, 3),
    (63, 3),
    (100, 5),
    (64, 7),
    (40, 13),
    (17, 31),
    (300, 11),
];

/// Values fed to the presence set are reduced modulo this.
const MAX_VALUE: usize = 4096;

#[derive(Debug, Copy, Clone)]
struct Num(u16);

impl<'a> Arbitrary<'a> for Num {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self(u.arbitrary()?))
    }
}

#[derive(Arbitrary, Debug)]
enum Operation {
    Insert(Num),
    Remove(Num),
    Replace(Num, u32),
    Count(Num),
    CheckDisplay,
    Intersection,
    Difference,
    Complement,
    SwapSides,
    Take,
    Add(Num),
    Discard(Num),
    Contains(Num),
    ClearSet,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    lhs_shape: u8,
    rhs_shape: u8,
    ops: Vec<Operation>,
}

/// Plain vector of counts with the saturation ceiling of its multiset.
#[derive(Clone)]
struct Model {
    max_count: u32,
    counts: Vec<u32>,
}

impl Model {
    fn new(max_number: usize, width: u8) -> Self {
        Self {
            max_count: (1u32 << width) - 1,
            counts: vec![0; max_number + 1],
        }
    }

    fn count(&self, num: usize) -> u32 {
        self.counts.get(num).copied().unwrap_or(0)
    }
}

fn make_pair(shape: u8) -> (MultiBitset, Model) {
    let (max_number, width) = SHAPES[shape as usize % SHAPES.len()];
    (
        MultiBitset::new(max_number, width).unwrap(),
        Model::new(max_number, width),
    )
}

/// Assert that a MultiBitset and its model agree on every counter.
fn check_equal(m: &MultiBitset, model: &Model) {
    assert_eq!(m.max_number() + 1, model.counts.len(), "max_number mismatch");
    assert_eq!(m.max_count(), model.max_count, "max_count mismatch");
    for (num, &count) in model.counts.iter().enumerate() {
        assert_eq!(m.count(num), count, "count({}) mismatch", num);
    }
    assert_eq!(m.count(model.counts.len()), 0, "count past max_number");
}

fuzz_target!(|input: FuzzInput| {
    let (mut lhs_m, mut lhs_model) = make_pair(input.lhs_shape);
    let (mut rhs_m, mut rhs_model) = make_pair(input.rhs_shape);

    let mut bs = Bitset::new(64);
    let mut bs_model = BTreeSet::new();

    for op in &input.ops {
        match *op {
            Operation::Insert(Num(n)) => {
                let n = n as usize;
                lhs_m.insert(n);
                if let Some(c) = lhs_model.counts.get_mut(n) {
                    *c = (*c + 1).min(lhs_model.max_count);
                }
            }
            Operation::Remove(Num(n)) => {
                let n = n as usize;
                lhs_m.remove(n);
                if let Some(c) = lhs_model.counts.get_mut(n) {
                    *c = c.saturating_sub(1);
                }
            }
            Operation::Replace(Num(n), count) => {
                let n = n as usize;
                lhs_m.replace(n, count);
                if let Some(c) = lhs_model.counts.get_mut(n) {
                    *c = count.min(lhs_model.max_count);
                }
            }
            Operation::Count(Num(n)) => {
                let n = n as usize;
                assert_eq!(lhs_m.count(n), lhs_model.count(n), "count({}) mismatch", n);
            }
            Operation::CheckDisplay => {
                let total: u64 = lhs_model.counts.iter().map(|&c| c as u64).sum();
                if total <= 4096 {
                    let mut expected = Vec::new();
                    for (num, &count) in lhs_model.counts.iter().enumerate() {
                        for _ in 0..count {
                            expected.push(num.to_string());
                        }
                    }
                    assert_eq!(lhs_m.to_string(), expected.join(" "), "display mismatch");
                }
            }
            Operation::Intersection => {
                let len = lhs_model.counts.len().min(rhs_model.counts.len());
                let counts = (0..len)
                    .map(|i| lhs_model.count(i).min(rhs_model.count(i)))
                    .collect();
                lhs_model = Model {
                    max_count: lhs_model.max_count.min(rhs_model.max_count),
                    counts,
                };
                lhs_m = multibitset::intersection(&lhs_m, &rhs_m);
            }
            Operation::Difference => {
                for (i, c) in lhs_model.counts.iter_mut().enumerate() {
                    *c = c.saturating_sub(rhs_model.count(i));
                }
                lhs_m = multibitset::difference(&lhs_m, &rhs_m);
            }
            Operation::Complement => {
                for c in lhs_model.counts.iter_mut() {
                    *c = lhs_model.max_count - *c;
                }
                lhs_m = multibitset::complement(&lhs_m);
            }
            Operation::SwapSides => {
                mem::swap(&mut lhs_m, &mut rhs_m);
                mem::swap(&mut lhs_model, &mut rhs_model);
            }
            Operation::Take => {
                let taken = lhs_m.take();
                assert_eq!(lhs_m.count(0), 0, "taken-from shell is not empty");
                assert!(lhs_m.is_empty(), "taken-from shell is not empty");
                lhs_m = taken;
            }
            Operation::Add(Num(n)) => {
                let n = n as usize % MAX_VALUE;
                assert_eq!(bs.add(n), bs_model.insert(n), "add({}) mismatch", n);
            }
            Operation::Discard(Num(n)) => {
                let n = n as usize % MAX_VALUE;
                assert_eq!(bs.remove(n), bs_model.remove(&n), "remove({}) mismatch", n);
            }
            Operation::Contains(Num(n)) => {
                let n = n as usize % MAX_VALUE;
                assert_eq!(bs.contains(n), bs_model.contains(&n), "contains({}) mismatch", n);
            }
            Operation::ClearSet => {
                bs.clear();
                bs_model.clear();
            }
        }
    }

    check_equal(&lhs_m, &lhs_model);
    check_equal(&rhs_m, &rhs_model);

    assert_eq!(bs.len(), bs_model.len(), "len mismatch");
    assert_eq!(bs.is_empty(), bs_model.is_empty(), "is_empty mismatch");
    for n in 0..bs.capacity() {
        assert_eq!(bs.contains(n), bs_model.contains(&n), "contains({}) mismatch", n);
    }
});
