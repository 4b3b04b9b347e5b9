use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::classify::tree::{DecisionTree, MaxFeatures, TreeParams};
use crate::classify::{ClassifierError, SEED};

/// Random-forest hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub bootstrap: bool,
    pub seed: u64,
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            bootstrap: true,
            seed: SEED,
            tree: TreeParams {
                max_features: MaxFeatures::Sqrt,
                max_depth: None,
                min_samples_split: 2,
                min_samples_leaf: 1,
            },
        }
    }
}

/// A fitted binary random forest
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fit on rows `x` with labels `y` (`true` = low quality)
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError::EmptyTrainingSet` if there are no rows or no
    /// trees requested, and `ClassifierError::FeatureCount` if rows differ in
    /// length or the label count does not match.
    pub fn fit(x: &[Vec<f64>], y: &[bool], params: &ForestParams) -> Result<Self, ClassifierError> {
        if x.is_empty() || params.n_trees == 0 {
            return Err(ClassifierError::EmptyTrainingSet);
        }
        if y.len() != x.len() {
            return Err(ClassifierError::FeatureCount {
                expected: x.len(),
                found: y.len(),
            });
        }
        let n_features = x[0].len();
        if let Some(row) = x.iter().find(|row| row.len() != n_features) {
            return Err(ClassifierError::FeatureCount {
                expected: n_features,
                found: row.len(),
            });
        }

        let n = x.len();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let mut tree_rng = StdRng::seed_from_u64(rng.gen());
            let mut samples: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| tree_rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            trees.push(DecisionTree::fit(
                x,
                y,
                &mut samples,
                &params.tree,
                &mut tree_rng,
            ));
        }

        debug!(
            trees = trees.len(),
            samples = n,
            features = n_features,
            "Fitted random forest"
        );

        Ok(Self { trees, n_features })
    }

    /// Probability of the low-quality class: mean leaf fraction over all trees
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError::FeatureCount` if `row` has the wrong length.
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        if row.len() != self.n_features {
            return Err(ClassifierError::FeatureCount {
                expected: self.n_features,
                found: row.len(),
            });
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(row)).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / self.trees.len() as f64;
        Ok(mean)
    }

    /// Probabilities for many rows
    ///
    /// # Errors
    ///
    /// See [`RandomForest::predict_proba`].
    pub fn predict_proba_all(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ClassifierError> {
        rows.iter().map(|row| self.predict_proba(row)).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well separated clusters on the first feature, noise on the second
    fn toy_data() -> (Vec<Vec<f64>>, Vec<bool>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let noise = f64::from(i % 5);
            x.push(vec![f64::from(i), noise]);
            y.push(false);
            x.push(vec![100.0 + f64::from(i), noise]);
            y.push(true);
        }
        (x, y)
    }

    #[test]
    fn test_separable_data() {
        let (x, y) = toy_data();
        let forest = RandomForest::fit(&x, &y, &ForestParams::default()).unwrap();
        assert_eq!(forest.n_trees(), 100);

        let good = forest.predict_proba(&[5.0, 2.0]).unwrap();
        let bad = forest.predict_proba(&[110.0, 2.0]).unwrap();
        assert!(good < 0.5, "good sample scored {good}");
        assert!(bad > 0.5, "bad sample scored {bad}");
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let (x, y) = toy_data();
        let params = ForestParams::default();
        let a = RandomForest::fit(&x, &y, &params).unwrap();
        let b = RandomForest::fit(&x, &y, &params).unwrap();
        assert_eq!(a, b);

        let rows = vec![vec![50.0, 1.0], vec![60.0, 4.0], vec![0.0, 0.0]];
        assert_eq!(
            a.predict_proba_all(&rows).unwrap(),
            b.predict_proba_all(&rows).unwrap()
        );
    }

    #[test]
    fn test_probabilities_are_bounded() {
        let (x, y) = toy_data();
        let forest = RandomForest::fit(&x, &y, &ForestParams::default()).unwrap();
        for row in &x {
            let p = forest.predict_proba(row).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_wrong_feature_count() {
        let (x, y) = toy_data();
        let forest = RandomForest::fit(&x, &y, &ForestParams::default()).unwrap();
        assert!(matches!(
            forest.predict_proba(&[1.0]),
            Err(ClassifierError::FeatureCount { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_empty_training_set() {
        let result = RandomForest::fit(&[], &[], &ForestParams::default());
        assert!(matches!(result, Err(ClassifierError::EmptyTrainingSet)));
    }

    #[test]
    fn test_without_bootstrap_fits_training_data() {
        let (x, y) = toy_data();
        let params = ForestParams {
            n_trees: 5,
            bootstrap: false,
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(&x, &y, &params).unwrap();
        for (row, &label) in x.iter().zip(&y) {
            let p = forest.predict_proba(row).unwrap();
            assert_eq!(p > 0.5, label);
        }
    }
}
