use std::collections::{HashMap, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;

use super::config::{BlockDurationRange, CommercialCategory};
use crate::models::CommercialRef;

/// Assumed clip length when the server reports no duration
pub const DEFAULT_CLIP_SECS: f64 = 30.0;

/// Clip duration with the unknown-duration fallback applied
pub fn clip_duration_secs(clip: &CommercialRef) -> f64 {
    if clip.duration_secs > 0.0 {
        clip.duration_secs
    } else {
        DEFAULT_CLIP_SECS
    }
}

/// Bounded FIFO window of recently picked pool indices.
///
/// Once at capacity, pushing evicts the oldest entry, so an index stays
/// ineligible for exactly `capacity` subsequent picks.
#[derive(Debug)]
pub struct PickHistory {
    window: VecDeque<usize>,
    capacity: usize,
}

impl PickHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.window.contains(&index)
    }

    /// Least-recently-picked index, used when every index is in the window
    pub fn oldest(&self) -> Option<usize> {
        self.window.front().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.window.back().copied()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn push(&mut self, index: usize) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(index);
    }
}

/// Pick one commercial at random, avoiding recent repeats.
///
/// A clip won't repeat until at least `history.capacity` others have played.
/// When the pool is smaller than the window, falls back to the oldest-used
/// clip. Returns (None, 0.0) for an empty pool.
pub fn pick_single_commercial<'a, R: Rng>(
    pool: &'a [CommercialRef],
    history: &mut PickHistory,
    rng: &mut R,
) -> (Option<&'a CommercialRef>, f64) {
    if pool.is_empty() {
        return (None, 0.0);
    }

    let eligible: Vec<usize> = (0..pool.len()).filter(|i| !history.contains(*i)).collect();

    let idx = match eligible.choose(rng) {
        Some(&i) => i,
        // Everything played recently: reuse the least-recent one
        None => match history.oldest() {
            Some(i) => i,
            None => return (None, 0.0),
        },
    };

    history.push(idx);

    let clip = &pool[idx];
    (Some(clip), clip_duration_secs(clip))
}

/// Category of a clip, inferred from its storage path's parent folder.
/// Handles both Windows and POSIX separators; lowercased for weight lookup.
pub fn clip_category(clip: &CommercialRef) -> String {
    let Some(path) = clip.file_path.as_deref() else {
        return "uncategorized".to_string();
    };

    let components: Vec<&str> = path
        .split(['\\', '/'])
        .filter(|c| !c.is_empty())
        .collect();

    if components.len() >= 2 {
        components[components.len() - 2].to_lowercase()
    } else {
        "uncategorized".to_string()
    }
}

/// Selection weights keyed by lowercased category name
pub fn category_weights(categories: &[CommercialCategory]) -> HashMap<String, f64> {
    categories
        .iter()
        .map(|c| (c.name.to_lowercase(), c.weight))
        .collect()
}

/// Assemble a commercial block of random clips meeting a randomized target.
///
/// Draws one target uniformly from the duration range, then samples clips
/// with replacement (weighted by category) until the running total reaches
/// it. The total therefore never undershoots `range.min` as long as the pool
/// has a clip. Returns (clips, total seconds); ([], 0.0) for an empty pool.
pub fn build_commercial_block<R: Rng>(
    pool: &[CommercialRef],
    range: BlockDurationRange,
    weights: &HashMap<String, f64>,
    rng: &mut R,
) -> (Vec<CommercialRef>, f64) {
    if pool.is_empty() {
        return (Vec::new(), 0.0);
    }

    let target = rng.gen_range(range.min as f64..=range.max as f64);

    // Weight each pool index by its clip's category
    let indices: Vec<usize> = (0..pool.len()).collect();
    let clip_weights: Vec<f64> = pool
        .iter()
        .map(|clip| weights.get(&clip_category(clip)).copied().unwrap_or(1.0))
        .collect();

    let mut block = Vec::new();
    let mut total = 0.0;

    while total < target {
        // Sampling is with replacement: a popular clip may appear twice
        let chosen = match indices.choose_weighted(rng, |&i| clip_weights[i]) {
            Ok(&i) => &pool[i],
            Err(_) => break,
        };

        total += clip_duration_secs(chosen);
        block.push(chosen.clone());
    }

    (block, total)
}
