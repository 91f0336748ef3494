//! Deterministic stratified partitioning.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::label::SentimentLabel;

/// Train/test index partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn indices_by_label(labels: &[SentimentLabel]) -> BTreeMap<SentimentLabel, Vec<usize>> {
    let mut groups: BTreeMap<SentimentLabel, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        groups.entry(*label).or_default().push(i);
    }
    groups
}

/// Hold out `test_fraction` of every label, shuffled with a seeded RNG.
///
/// Each label with two or more examples contributes at least one test example
/// and keeps at least one training example. Identical inputs and seed always
/// produce the same partition.
pub fn stratified_split(labels: &[SentimentLabel], test_fraction: f64, seed: u64) -> Split {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (_, mut indices) in indices_by_label(labels) {
        indices.shuffle(&mut rng);
        let n = indices.len();
        let n_test = if n < 2 {
            0
        } else {
            ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1)
        };
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}

/// Stratified k-fold without shuffling: the i-th example of each label lands in
/// fold `i % k`. Returns one train/test split per non-empty fold.
pub fn stratified_folds(labels: &[SentimentLabel], k: usize) -> Vec<Split> {
    let k = k.max(2);
    let mut fold_of = vec![0usize; labels.len()];
    for (_, indices) in indices_by_label(labels) {
        for (i, index) in indices.into_iter().enumerate() {
            fold_of[index] = i % k;
        }
    }

    (0..k)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|i| fold_of[*i] == fold);
            Split { train, test }
        })
        .filter(|s| !s.test.is_empty() && !s.train.is_empty())
        .collect()
}
