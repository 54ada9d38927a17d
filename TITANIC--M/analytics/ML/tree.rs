use ndarray::{ArrayView1, ArrayView2};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth, unlimited when `None`.
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split.
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split.
    pub min_samples_leaf: usize,
    /// Features examined per split (more are drawn while no valid split exists).
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        positive_rate: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Binary CART classifier; nodes are stored in an arena with the root at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    importances: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Gini impurity of a node holding `positives` out of `total` samples.
#[must_use]
pub fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

impl DecisionTree {
    /// Grows a tree on the rows listed in `samples` (duplicates allowed, as
    /// produced by bootstrap sampling).
    pub fn fit<R: Rng + ?Sized>(
        features: ArrayView2<'_, f64>,
        labels: &[bool],
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut builder = TreeBuilder {
            features,
            labels,
            params,
            rng,
            nodes: Vec::new(),
            importances: vec![0.0; features.ncols()],
        };
        builder.grow(samples, 0);
        Self {
            nodes: builder.nodes,
            importances: builder.importances,
        }
    }

    /// Fraction of positive training samples in the leaf reached by `row`.
    #[must_use]
    pub fn predict_proba(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { positive_rate } => return positive_rate,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    /// Impurity decrease per feature, normalized to sum to 1 (all zeros for a
    /// single-leaf tree).
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.importances.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.importances.len()];
        }
        self.importances.iter().map(|value| value / total).collect()
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, TreeNode::Leaf { .. }))
            .count()
    }

    /// Longest root-to-leaf path in edges.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match self.nodes[idx] {
                TreeNode::Leaf { .. } => deepest = deepest.max(depth),
                TreeNode::Split { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        deepest
    }
}

struct TreeBuilder<'f, 'a, R: Rng + ?Sized> {
    features: ArrayView2<'f, f64>,
    labels: &'a [bool],
    params: &'a TreeParams,
    rng: &'a mut R,
    nodes: Vec<TreeNode>,
    importances: Vec<f64>,
}

impl<R: Rng + ?Sized> TreeBuilder<'_, '_, R> {
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let labels = self.labels;
        let features = self.features;
        let total = samples.len();
        let positives = samples.iter().filter(|&&row| labels[row]).count();

        let node_id = self.nodes.len();
        let positive_rate = if total == 0 {
            0.0
        } else {
            positives as f64 / total as f64
        };
        self.nodes.push(TreeNode::Leaf { positive_rate });

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if total < self.params.min_samples_split
            || positives == 0
            || positives == total
            || depth_reached
        {
            return node_id;
        }

        let Some(split) = self.best_split(&samples) else {
            return node_id;
        };
        self.importances[split.feature] +=
            total as f64 * (gini(positives, total) - split.impurity);

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&row| features[[row, split.feature]] <= split.threshold);
        let left = self.grow(left, depth + 1);
        let right = self.grow(right, depth + 1);
        self.nodes[node_id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    fn best_split(&mut self, samples: &[usize]) -> Option<Split> {
        let mut order: Vec<usize> = (0..self.features.ncols()).collect();
        order.shuffle(&mut *self.rng);

        let mut best: Option<Split> = None;
        for (visited, &feature) in order.iter().enumerate() {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(feature, samples) {
                if best.map_or(true, |current| candidate.impurity < current.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_on(&self, feature: usize, samples: &[usize]) -> Option<Split> {
        let mut column: Vec<(f64, bool)> = samples
            .iter()
            .map(|&row| (self.features[[row, feature]], self.labels[row]))
            .collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = column.len();
        let total_positives = column.iter().filter(|(_, label)| *label).count();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut left_positives = 0;
        let mut best: Option<Split> = None;

        for split_at in 1..n {
            if column[split_at - 1].1 {
                left_positives += 1;
            }
            let (prev, next) = (column[split_at - 1].0, column[split_at].0);
            if prev >= next {
                continue;
            }
            let (left_n, right_n) = (split_at, n - split_at);
            if left_n < min_leaf || right_n < min_leaf {
                continue;
            }
            let impurity = (left_n as f64 * gini(left_positives, left_n)
                + right_n as f64 * gini(total_positives - left_positives, right_n))
                / n as f64;
            if best.map_or(true, |current| impurity < current.impurity) {
                let mut threshold = prev + (next - prev) / 2.0;
                if threshold >= next {
                    threshold = prev;
                }
                best = Some(Split {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 2,
        }
    }

    #[test]
    fn separates_on_informative_feature() {
        let features: Array2<f64> = array![
            [1.0, 5.0],
            [2.0, 5.0],
            [3.0, 5.0],
            [10.0, 5.0],
            [11.0, 5.0],
            [12.0, 5.0]
        ];
        let labels = [false, false, false, true, true, true];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let tree = DecisionTree::fit(
            features.view(),
            &labels,
            (0..6).collect(),
            &params(),
            &mut rng,
        );

        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.depth(), 1);
        assert!((tree.predict_proba(array![2.5, 5.0].view()) - 0.0).abs() < f64::EPSILON);
        assert!((tree.predict_proba(array![11.5, 0.0].view()) - 1.0).abs() < f64::EPSILON);
        assert!((tree.predict_proba(array![6.5, 5.0].view()) - 0.0).abs() < f64::EPSILON);
        let importances = tree.feature_importances();
        assert!((importances[0] - 1.0).abs() < 1e-12);
        assert!(importances[1].abs() < 1e-12);
    }

    #[test]
    fn pure_node_stays_a_leaf() {
        let features: Array2<f64> = array![[1.0], [2.0], [3.0]];
        let labels = [true, true, true];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tree = DecisionTree::fit(features.view(), &labels, vec![0, 1, 2], &params(), &mut rng);
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.feature_importances(), vec![0.0]);
    }

    #[test]
    fn depth_limit_is_respected() {
        let features: Array2<f64> = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let labels = [false, true, false, true, false, true];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let limited = TreeParams {
            max_depth: Some(1),
            ..params()
        };
        let tree = DecisionTree::fit(
            features.view(),
            &labels,
            (0..6).collect(),
            &limited,
            &mut rng,
        );
        assert!(tree.depth() <= 1);
        let p = tree.predict_proba(array![3.5].view());
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn gini_bounds() {
        assert!(gini(0, 10).abs() < f64::EPSILON);
        assert!(gini(10, 10).abs() < f64::EPSILON);
        assert!((gini(5, 10) - 0.5).abs() < f64::EPSILON);
    }
}
