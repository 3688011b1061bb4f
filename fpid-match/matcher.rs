use fpid_core::{CoreError, Descriptor, KnnMatch, MatchPair, MatcherConfig, MatcherKind, DESCRIPTOR_BYTES};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use thiserror::Error;

use crate::index::{BruteForceIndex, DescriptorIndex, LshIndex, TrainIndex, VpTreeIndex};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type MatchResult<T> = Result<T, MatchError>;

/// k=2 matcher over a per-candidate index.
///
/// Hash-bit selection and probe masks are fixed at construction, so one
/// matcher is built per identification run and reused for every candidate.
#[derive(Debug, Clone)]
pub struct Matcher {
    cfg: MatcherConfig,
    key_bits: Vec<Vec<u16>>,
    probes: Vec<u32>,
}

impl Matcher {
    pub fn new(cfg: MatcherConfig) -> MatchResult<Self> {
        cfg.validate()?;

        let (key_bits, probes) = match cfg.kind {
            MatcherKind::BruteForce | MatcherKind::VpTree => (Vec::new(), Vec::new()),
            MatcherKind::Lsh => (
                select_key_bits(cfg.table_count, cfg.key_size, cfg.seed),
                probe_masks(cfg.key_size, cfg.multi_probe_level),
            ),
        };

        Ok(Self {
            cfg,
            key_bits,
            probes,
        })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.cfg
    }

    /// Index the candidate descriptors
    pub fn index<'a>(&'a self, train: &'a [Descriptor]) -> TrainIndex<'a> {
        match self.cfg.kind {
            MatcherKind::BruteForce => TrainIndex::BruteForce(BruteForceIndex::new(train)),
            MatcherKind::VpTree => TrainIndex::VpTree(VpTreeIndex::new(train)),
            MatcherKind::Lsh => TrainIndex::Lsh(LshIndex::new(train, &self.key_bits, &self.probes)),
        }
    }

    /// Two nearest candidates for every query descriptor, in query order.
    ///
    /// An empty candidate set yields no matches; a single candidate yields
    /// matches without a second neighbour.
    pub fn knn_match(&self, query: &[Descriptor], train: &[Descriptor]) -> Vec<KnnMatch> {
        if query.is_empty() || train.is_empty() {
            return Vec::new();
        }

        let index = self.index(train);
        let matches: Vec<KnnMatch> = query
            .iter()
            .enumerate()
            .filter_map(|(query_idx, d)| {
                let [best, second] = index.nearest_two(d);
                let pair = |(train_idx, distance): (usize, u32)| MatchPair {
                    query_idx,
                    train_idx,
                    distance,
                };
                best.map(|best| KnnMatch {
                    best: pair(best),
                    second: second.map(pair),
                })
            })
            .collect();

        tracing::trace!(
            query = query.len(),
            train = index.len(),
            matches = matches.len(),
            "knn match"
        );
        matches
    }
}

fn select_key_bits(table_count: usize, key_size: usize, seed: u64) -> Vec<Vec<u16>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions: Vec<u16> = (0..(DESCRIPTOR_BYTES * 8) as u16).collect();
    (0..table_count)
        .map(|_| {
            positions.shuffle(&mut rng);
            positions[..key_size].to_vec()
        })
        .collect()
}

/// Xor masks of every key within Hamming distance `level` of a bucket key
fn probe_masks(key_size: usize, level: usize) -> Vec<u32> {
    let mut masks = vec![0u32];
    if level >= 1 {
        masks.extend((0..key_size).map(|i| 1u32 << i));
    }
    if level >= 2 {
        for i in 0..key_size {
            for j in (i + 1)..key_size {
                masks.push((1u32 << i) | (1u32 << j));
            }
        }
    }
    masks
}
