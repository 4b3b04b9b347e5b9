//! Binary CART decision tree with Gini impurity.
//!
//! Samples go left when `value <= threshold`. A leaf stores the fraction of
//! positive (low-quality) training samples that reached it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// How many features are considered per split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1
    Sqrt,
    /// Every feature
    All,
    /// A fixed number, capped at `n_features`
    Count(usize),
}

impl MaxFeatures {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            Self::Sqrt => (n_features as f64).sqrt().floor() as usize,
            Self::All => n_features,
            Self::Count(k) => k.min(n_features),
        };
        k.max(1)
    }
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        positive_fraction: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Position in the sorted sample slice where the right child begins
    boundary: usize,
    impurity: f64,
}

/// A fitted decision tree
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the rows of `x` listed in `samples` (duplicates allowed).
    ///
    /// `x` must be non-empty and rectangular, and `samples` non-empty.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[bool],
        samples: &mut [usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut builder = Builder {
            x,
            y,
            params,
            n_features: x.first().map_or(0, Vec::len),
            nodes: Vec::new(),
        };
        builder.grow(samples, 0, rng);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Fraction of positive training samples in the leaf `row` falls into
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { positive_fraction } => return *positive_fraction,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Number of nodes, leaves included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + depth_of(nodes, *left).max(depth_of(nodes, *right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            depth_of(&self.nodes, 0)
        }
    }
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [bool],
    params: &'a TreeParams,
    n_features: usize,
    nodes: Vec<Node>,
}

impl Builder<'_> {
    /// Grow the subtree for `samples` and return its node index
    fn grow(&mut self, samples: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let n = samples.len();
        let positives = samples.iter().filter(|&&i| self.y[i]).count();

        #[allow(clippy::cast_precision_loss)]
        let positive_fraction = if n == 0 { 0.0 } else { positives as f64 / n as f64 };
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { positive_fraction });

        let pure = positives == 0 || positives == n;
        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if pure || depth_reached || n < self.params.min_samples_split {
            return idx;
        }

        let Some(best) = self.best_split(samples, rng) else {
            return idx;
        };

        // Reorder so the left child is a prefix of the slice
        let x = self.x;
        samples.sort_by(|&a, &b| x[a][best.feature].total_cmp(&x[b][best.feature]));
        let (left_samples, right_samples) = samples.split_at_mut(best.boundary);

        let left = self.grow(left_samples, depth + 1, rng);
        let right = self.grow(right_samples, depth + 1, rng);
        self.nodes[idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    /// Lowest weighted Gini impurity over `max_features` non-constant candidate features
    fn best_split(&self, samples: &mut [usize], rng: &mut StdRng) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);

        let wanted = self.params.max_features.resolve(self.n_features);
        let min_leaf = self.params.min_samples_leaf.max(1);
        let n = samples.len();
        let total_pos = samples.iter().filter(|&&i| self.y[i]).count();

        let mut visited = 0;
        let mut best: Option<BestSplit> = None;

        for feature in features {
            if visited >= wanted {
                break;
            }

            let x = self.x;
            samples.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
            let first = x[samples[0]][feature];
            let last = x[samples[n - 1]][feature];
            if first.total_cmp(&last).is_eq() {
                // Constant features do not count towards the candidate budget
                continue;
            }
            visited += 1;

            let mut left_pos = 0;
            for boundary in 1..n {
                if self.y[samples[boundary - 1]] {
                    left_pos += 1;
                }

                let lo = x[samples[boundary - 1]][feature];
                let hi = x[samples[boundary]][feature];
                if lo.total_cmp(&hi).is_eq() {
                    continue;
                }
                if boundary < min_leaf || n - boundary < min_leaf {
                    continue;
                }

                let impurity = weighted_gini(boundary, left_pos, n - boundary, total_pos - left_pos);
                if best.map_or(true, |b| impurity < b.impurity) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        boundary,
                        impurity,
                    });
                }
            }
        }

        best
    }
}

/// `n_left * gini(left) + n_right * gini(right)`
#[allow(clippy::cast_precision_loss)]
fn weighted_gini(n_left: usize, pos_left: usize, n_right: usize, pos_right: usize) -> f64 {
    let side = |n: usize, pos: usize| {
        if n == 0 {
            return 0.0;
        }
        let p = pos as f64 / n as f64;
        n as f64 * 2.0 * p * (1.0 - p)
    };
    side(n_left, pos_left) + side(n_right, pos_right)
}
