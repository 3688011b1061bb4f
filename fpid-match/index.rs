use std::collections::HashMap;

use fpid_core::{hamming_distance, Descriptor};

/// Nearest-neighbour lookup over a fixed set of train descriptors
pub trait DescriptorIndex {
    /// Number of indexed descriptors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The two closest train descriptors as `(train_idx, distance)`, closest
    /// first. Slots stay `None` when fewer descriptors are available.
    fn nearest_two(&self, query: &Descriptor) -> [Option<(usize, u32)>; 2];
}

/// Keeps the two smallest distances seen; earlier indices win ties
#[derive(Default)]
struct TopTwo {
    best: Option<(usize, u32)>,
    second: Option<(usize, u32)>,
}

impl TopTwo {
    fn push(&mut self, idx: usize, distance: u32) {
        match self.best {
            Some((_, d)) if distance >= d => match self.second {
                Some((_, d2)) if distance >= d2 => {}
                _ => self.second = Some((idx, distance)),
            },
            _ => {
                self.second = self.best;
                self.best = Some((idx, distance));
            }
        }
    }

    /// Largest distance that can still enter the top two
    fn bound(&self) -> u32 {
        self.second.map_or(u32::MAX, |(_, d)| d)
    }

    fn into_array(self) -> [Option<(usize, u32)>; 2] {
        [self.best, self.second]
    }
}

/// Exhaustive scan
pub struct BruteForceIndex<'a> {
    train: &'a [Descriptor],
}

impl<'a> BruteForceIndex<'a> {
    pub fn new(train: &'a [Descriptor]) -> Self {
        Self { train }
    }
}

impl DescriptorIndex for BruteForceIndex<'_> {
    fn len(&self) -> usize {
        self.train.len()
    }

    fn nearest_two(&self, query: &Descriptor) -> [Option<(usize, u32)>; 2] {
        let mut top = TopTwo::default();
        for (idx, d) in self.train.iter().enumerate() {
            top.push(idx, hamming_distance(query, d));
        }
        top.into_array()
    }
}

/// Below this many bucket hits the LSH ranking is too thin to trust
pub const MIN_LSH_CANDIDATES: usize = 8;

/// Multi-table locality-sensitive hashing over descriptor bits.
///
/// Each table keys a descriptor by a fixed subset of its bits. A query visits
/// its own bucket and every bucket whose key differs by one of `probes`
/// (xor masks), then ranks the union by true Hamming distance. Queries that
/// collect fewer than `MIN_LSH_CANDIDATES` candidates fall back to an
/// exhaustive scan. The second neighbour is approximate.
pub struct LshIndex<'a> {
    train: &'a [Descriptor],
    key_bits: &'a [Vec<u16>],
    probes: &'a [u32],
    tables: Vec<HashMap<u32, Vec<usize>>>,
}

impl<'a> LshIndex<'a> {
    pub fn new(train: &'a [Descriptor], key_bits: &'a [Vec<u16>], probes: &'a [u32]) -> Self {
        let tables = key_bits
            .iter()
            .map(|bits| {
                let mut table: HashMap<u32, Vec<usize>> = HashMap::new();
                for (idx, d) in train.iter().enumerate() {
                    table.entry(hash_key(d, bits)).or_default().push(idx);
                }
                table
            })
            .collect();

        Self {
            train,
            key_bits,
            probes,
            tables,
        }
    }

    /// Distinct candidate indices for `query`, ascending
    pub fn candidates(&self, query: &Descriptor) -> Vec<usize> {
        let mut candidates = Vec::new();
        for (table, bits) in self.tables.iter().zip(self.key_bits) {
            let key = hash_key(query, bits);
            for probe in self.probes {
                if let Some(bucket) = table.get(&(key ^ probe)) {
                    candidates.extend_from_slice(bucket);
                }
            }
        }
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }
}

impl DescriptorIndex for LshIndex<'_> {
    fn len(&self) -> usize {
        self.train.len()
    }

    fn nearest_two(&self, query: &Descriptor) -> [Option<(usize, u32)>; 2] {
        let candidates = self.candidates(query);
        if candidates.len() < MIN_LSH_CANDIDATES {
            return BruteForceIndex::new(self.train).nearest_two(query);
        }

        let mut top = TopTwo::default();
        for idx in candidates {
            top.push(idx, hamming_distance(query, &self.train[idx]));
        }
        top.into_array()
    }
}

/// Vantage-point tree over Hamming distance.
///
/// Every node splits its subtree at the median distance to its vantage
/// descriptor. The triangle inequality prunes subtrees that cannot hold a
/// descriptor closer than the current second neighbour, so results match an
/// exhaustive scan distance for distance.
pub struct VpTreeIndex<'a> {
    train: &'a [Descriptor],
    nodes: Vec<VpNode>,
    root: Option<usize>,
}

struct VpNode {
    idx: usize,
    /// Members of `inside` lie within this distance of the vantage point,
    /// members of `outside` at or beyond it
    radius: u32,
    inside: Option<usize>,
    outside: Option<usize>,
}

impl<'a> VpTreeIndex<'a> {
    pub fn new(train: &'a [Descriptor]) -> Self {
        let mut index = Self {
            train,
            nodes: Vec::with_capacity(train.len()),
            root: None,
        };
        let items: Vec<usize> = (0..train.len()).collect();
        index.root = index.build(items);
        index
    }

    fn build(&mut self, items: Vec<usize>) -> Option<usize> {
        let (&vantage, rest) = items.split_first()?;

        let mut rest: Vec<(u32, usize)> = rest
            .iter()
            .map(|&idx| (hamming_distance(&self.train[vantage], &self.train[idx]), idx))
            .collect();
        rest.sort_unstable();

        let mid = rest.len() / 2;
        let radius = rest.get(mid).map_or(0, |&(d, _)| d);
        let outside: Vec<usize> = rest[mid..].iter().map(|&(_, idx)| idx).collect();
        let inside: Vec<usize> = rest[..mid].iter().map(|&(_, idx)| idx).collect();

        let inside = self.build(inside);
        let outside = self.build(outside);
        self.nodes.push(VpNode {
            idx: vantage,
            radius,
            inside,
            outside,
        });
        Some(self.nodes.len() - 1)
    }

    fn search(&self, node: Option<usize>, query: &Descriptor, top: &mut TopTwo) {
        let Some(node) = node.map(|n| &self.nodes[n]) else {
            return;
        };

        let d = hamming_distance(query, &self.train[node.idx]);
        top.push(node.idx, d);

        if d <= node.radius {
            self.search(node.inside, query, top);
            if node.radius <= d.saturating_add(top.bound()) {
                self.search(node.outside, query, top);
            }
        } else {
            self.search(node.outside, query, top);
            if d <= node.radius.saturating_add(top.bound()) {
                self.search(node.inside, query, top);
            }
        }
    }
}

impl DescriptorIndex for VpTreeIndex<'_> {
    fn len(&self) -> usize {
        self.train.len()
    }

    fn nearest_two(&self, query: &Descriptor) -> [Option<(usize, u32)>; 2] {
        let mut top = TopTwo::default();
        self.search(self.root, query, &mut top);
        top.into_array()
    }
}

/// Index chosen by `MatcherKind`
pub enum TrainIndex<'a> {
    BruteForce(BruteForceIndex<'a>),
    VpTree(VpTreeIndex<'a>),
    Lsh(LshIndex<'a>),
}

impl DescriptorIndex for TrainIndex<'_> {
    fn len(&self) -> usize {
        match self {
            TrainIndex::BruteForce(index) => index.len(),
            TrainIndex::VpTree(index) => index.len(),
            TrainIndex::Lsh(index) => index.len(),
        }
    }

    fn nearest_two(&self, query: &Descriptor) -> [Option<(usize, u32)>; 2] {
        match self {
            TrainIndex::BruteForce(index) => index.nearest_two(query),
            TrainIndex::VpTree(index) => index.nearest_two(query),
            TrainIndex::Lsh(index) => index.nearest_two(query),
        }
    }
}

#[inline]
fn descriptor_bit(d: &Descriptor, bit: u16) -> u32 {
    let bit = bit as usize;
    ((d[bit >> 3] >> (7 - (bit & 7))) & 1) as u32
}

pub(crate) fn hash_key(d: &Descriptor, bits: &[u16]) -> u32 {
    bits.iter()
        .enumerate()
        .fold(0u32, |key, (j, &bit)| key | (descriptor_bit(d, bit) << j))
}
