//! Serialized probability model.
//!
//! The artifact is a JSON document tagged by `kind`. Two families are
//! supported:
//!
//! - `tree_ensemble`: additive regression trees. A split sends a row left when
//!   `x <= threshold`; `NaN` follows `default_left`.
//! - `logistic`: weighted sum passed through the logistic function. `NaN`
//!   inputs are replaced by `impute` when given.
//!
//! `ProbabilityModel` can only be built through validation, whether it comes
//! from [`ProbabilityModel::from_json_slice`] or a plain serde deserialize.

use crate::domain::model::FeatureVector;
use crate::domain::ports::Predictor;
use crate::utils::error::{Result, SurvivalError};
use serde::{Deserialize, Serialize};

/// Validated model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ArtifactDocument", into = "ArtifactDocument")]
pub struct ProbabilityModel {
    document: ArtifactDocument,
}

/// On-disk layout, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ArtifactDocument {
    TreeEnsemble(TreeEnsemble),
    Logistic(LogisticModel),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OutputTransform {
    #[default]
    Identity,
    Sigmoid,
}

impl OutputTransform {
    fn apply(self, margin: f64) -> f64 {
        match self {
            OutputTransform::Identity => margin,
            OutputTransform::Sigmoid => sigmoid(margin),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeEnsemble {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    #[serde(default)]
    base_score: f64,
    #[serde(default)]
    output: OutputTransform,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
struct Tree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default)]
        default_left: bool,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogisticModel {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    weights: Vec<f64>,
    #[serde(default)]
    intercept: f64,
    #[serde(default)]
    impute: Option<Vec<f64>>,
}

impl ProbabilityModel {
    /// 解析並驗證模型檔內容
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let document: ArtifactDocument = serde_json::from_slice(bytes)?;
        Self::try_from(document)
    }

    pub fn kind(&self) -> &'static str {
        match self.document {
            ArtifactDocument::TreeEnsemble(_) => "tree_ensemble",
            ArtifactDocument::Logistic(_) => "logistic",
        }
    }
}

impl TryFrom<ArtifactDocument> for ProbabilityModel {
    type Error = SurvivalError;

    fn try_from(document: ArtifactDocument) -> Result<Self> {
        match &document {
            ArtifactDocument::TreeEnsemble(ensemble) => ensemble.validate()?,
            ArtifactDocument::Logistic(logistic) => logistic.validate()?,
        }
        Ok(Self { document })
    }
}

impl From<ProbabilityModel> for ArtifactDocument {
    fn from(model: ProbabilityModel) -> Self {
        model.document
    }
}

impl Predictor for ProbabilityModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        match &self.document {
            ArtifactDocument::TreeEnsemble(ensemble) => ensemble.score(features),
            ArtifactDocument::Logistic(logistic) => logistic.score(features),
        }
    }
}

impl TreeEnsemble {
    fn validate(&self) -> Result<()> {
        validate_feature_names(self.feature_names.as_deref())?;

        if self.trees.is_empty() {
            return Err(format_error("tree ensemble has no trees"));
        }

        for (tree_idx, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format_error(format!("tree {} has no nodes", tree_idx)));
            }

            for (node_idx, node) in tree.nodes.iter().enumerate() {
                if let TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } = *node
                {
                    if feature >= FeatureVector::LEN {
                        return Err(format_error(format!(
                            "tree {} node {} splits on feature {} (only {} features)",
                            tree_idx,
                            node_idx,
                            feature,
                            FeatureVector::LEN
                        )));
                    }
                    // 子節點必須在目前節點之後，保證走訪一定會結束
                    for child in [left, right] {
                        if child <= node_idx || child >= tree.nodes.len() {
                            return Err(format_error(format!(
                                "tree {} node {} has invalid child index {}",
                                tree_idx, node_idx, child
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn score(&self, features: &FeatureVector) -> Result<f64> {
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += tree.leaf_value(features)?;
        }
        Ok(self.output.apply(margin))
    }
}

impl Tree {
    fn leaf_value(&self, features: &FeatureVector) -> Result<f64> {
        let mut idx = 0;
        // 合法的樹每一步都往後走，步數不會超過節點數
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx).ok_or_else(|| SurvivalError::InferenceError {
                message: format!("tree node {} does not exist", idx),
            })?;
            match *node {
                TreeNode::Leaf { value } => return Ok(value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = features.get(feature).unwrap_or(f64::NAN);
                    let go_left = if x.is_nan() {
                        default_left
                    } else {
                        x <= threshold
                    };
                    idx = if go_left { left } else { right };
                }
            }
        }

        Err(SurvivalError::InferenceError {
            message: "tree traversal did not reach a leaf".to_string(),
        })
    }
}

impl LogisticModel {
    fn validate(&self) -> Result<()> {
        validate_feature_names(self.feature_names.as_deref())?;

        if self.weights.len() != FeatureVector::LEN {
            return Err(format_error(format!(
                "logistic model has {} weights, expected {}",
                self.weights.len(),
                FeatureVector::LEN
            )));
        }

        if let Some(impute) = &self.impute {
            if impute.len() != FeatureVector::LEN {
                return Err(format_error(format!(
                    "logistic model has {} impute values, expected {}",
                    impute.len(),
                    FeatureVector::LEN
                )));
            }
        }

        Ok(())
    }

    fn score(&self, features: &FeatureVector) -> Result<f64> {
        if self.weights.len() != FeatureVector::LEN {
            return Err(SurvivalError::InferenceError {
                message: format!("logistic model has {} weights", self.weights.len()),
            });
        }

        let mut margin = self.intercept;
        for (i, (&x, &weight)) in features.as_slice().iter().zip(&self.weights).enumerate() {
            let x = match &self.impute {
                Some(impute) if x.is_nan() => impute.get(i).copied().unwrap_or(x),
                _ => x,
            };
            margin += x * weight;
        }
        Ok(sigmoid(margin))
    }
}

fn validate_feature_names(names: Option<&[String]>) -> Result<()> {
    let Some(names) = names else {
        return Ok(());
    };

    let matches = names.len() == FeatureVector::LEN
        && names
            .iter()
            .zip(FeatureVector::NAMES)
            .all(|(actual, expected)| actual == expected);

    if matches {
        Ok(())
    } else {
        Err(format_error(format!(
            "feature_names {:?} do not match the expected order {:?}",
            names,
            FeatureVector::NAMES
        )))
    }
}

fn format_error(message: impl Into<String>) -> SurvivalError {
    SurvivalError::ModelFormatError {
        message: message.into(),
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(sex: f64) -> FeatureVector {
        FeatureVector::new([1.0, sex, 30.0, 0.0, 0.0, 50.0, 1.0, 26.0])
    }

    fn stump_json(default_left: bool) -> String {
        format!(
            r#"{{
                "kind": "tree_ensemble",
                "base_score": 0.1,
                "trees": [[
                    {{"split": {{"feature": 1, "threshold": 0.5, "left": 1, "right": 2, "default_left": {}}}}},
                    {{"leaf": {{"value": 0.6}}}},
                    {{"leaf": {{"value": 0.05}}}}
                ]]
            }}"#,
            default_left
        )
    }

    #[test]
    fn test_tree_ensemble_routes_by_threshold() {
        let model = ProbabilityModel::from_json_slice(stump_json(true).as_bytes()).unwrap();
        assert_eq!(model.kind(), "tree_ensemble");

        let female = model.predict(&vector(0.0)).unwrap();
        let male = model.predict(&vector(1.0)).unwrap();
        assert!((female - 0.7).abs() < 1e-12);
        assert!((male - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_tree_ensemble_nan_follows_default_direction() {
        let left = ProbabilityModel::from_json_slice(stump_json(true).as_bytes()).unwrap();
        let right = ProbabilityModel::from_json_slice(stump_json(false).as_bytes()).unwrap();

        assert!((left.predict(&vector(f64::NAN)).unwrap() - 0.7).abs() < 1e-12);
        assert!((right.predict(&vector(f64::NAN)).unwrap() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_sigmoid_output() {
        let json = r#"{
            "kind": "tree_ensemble",
            "output": "sigmoid",
            "trees": [[{"leaf": {"value": 0.0}}]]
        }"#;
        let model = ProbabilityModel::from_json_slice(json.as_bytes()).unwrap();
        assert_eq!(model.predict(&vector(1.0)).unwrap(), 0.5);
    }

    #[test]
    fn test_rejects_backward_child_index() {
        let json = r#"{
            "kind": "tree_ensemble",
            "trees": [[
                {"split": {"feature": 0, "threshold": 1.5, "left": 0, "right": 1}},
                {"leaf": {"value": 1.0}}
            ]]
        }"#;
        let err = ProbabilityModel::from_json_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SurvivalError::ModelFormatError { .. }));
    }

    #[test]
    fn test_rejects_out_of_range_feature() {
        let json = r#"{
            "kind": "tree_ensemble",
            "trees": [[
                {"split": {"feature": 8, "threshold": 1.5, "left": 1, "right": 2}},
                {"leaf": {"value": 1.0}},
                {"leaf": {"value": 0.0}}
            ]]
        }"#;
        assert!(ProbabilityModel::from_json_slice(json.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_reordered_feature_names() {
        let json = r#"{
            "kind": "logistic",
            "feature_names": ["Sex", "Pclass", "Age", "SibSp", "Parch", "Fare", "Family", "mean_Fare_by_Sex"],
            "weights": [0, 0, 0, 0, 0, 0, 0, 0]
        }"#;
        let err = ProbabilityModel::from_json_slice(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("feature_names"));
    }

    #[test]
    fn test_rejects_short_weight_vector() {
        let json = r#"{"kind": "logistic", "weights": [0.1, 0.2]}"#;
        assert!(ProbabilityModel::from_json_slice(json.as_bytes()).is_err());
    }

    #[test]
    fn test_corrupt_artifact_is_serialization_error() {
        let err = ProbabilityModel::from_json_slice(b"\x80\x04\x95pickle").unwrap_err();
        assert!(matches!(err, SurvivalError::SerializationError(_)));
    }

    #[test]
    fn test_serde_deserialize_validates_tree() {
        let json = r#"{
            "kind": "tree_ensemble",
            "trees": [[
                {"split": {"feature": 0, "threshold": 1.5, "left": 7, "right": 7}}
            ]]
        }"#;
        let err = serde_json::from_str::<ProbabilityModel>(json).unwrap_err();
        assert!(err.to_string().contains("invalid child index"));
    }

    #[test]
    fn test_serde_deserialize_validates_logistic() {
        let json = r#"{"kind": "logistic", "weights": [0.5]}"#;
        assert!(serde_json::from_str::<ProbabilityModel>(json).is_err());
    }

    #[test]
    fn test_serde_round_trip_keeps_predictions() {
        let model = ProbabilityModel::from_json_slice(stump_json(true).as_bytes()).unwrap();
        let encoded = serde_json::to_string(&model).unwrap();
        let decoded: ProbabilityModel = serde_json::from_str(&encoded).unwrap();

        assert!(encoded.contains("\"kind\":\"tree_ensemble\""));
        assert_eq!(
            decoded.predict(&vector(0.0)).unwrap(),
            model.predict(&vector(0.0)).unwrap()
        );
    }

    #[test]
    fn test_unvalidated_tree_reports_error_instead_of_panicking() {
        let tree = Tree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 1.5,
                    left: 0,
                    right: 0,
                    default_left: false,
                },
            ],
        };
        let err = tree.leaf_value(&vector(1.0)).unwrap_err();
        assert!(matches!(err, SurvivalError::InferenceError { .. }));

        let dangling = Tree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 1.5,
                left: 7,
                right: 7,
                default_left: false,
            }],
        };
        assert!(dangling.leaf_value(&vector(1.0)).is_err());
    }

    #[test]
    fn test_logistic_imputes_missing_values() {
        let json = r#"{
            "kind": "logistic",
            "weights": [0, 2.0, 0, 0, 0, 0, 0, 0],
            "intercept": -1.0,
            "impute": [0, 0.5, 0, 0, 0, 0, 0, 0]
        }"#;
        let model = ProbabilityModel::from_json_slice(json.as_bytes()).unwrap();
        assert_eq!(model.predict(&vector(f64::NAN)).unwrap(), 0.5);
    }

    #[test]
    fn test_logistic_without_impute_propagates_nan() {
        let json = r#"{"kind": "logistic", "weights": [0, 1, 0, 0, 0, 0, 0, 0]}"#;
        let model = ProbabilityModel::from_json_slice(json.as_bytes()).unwrap();
        assert!(model.predict(&vector(f64::NAN)).unwrap().is_nan());
    }
}
