use crate::core::encoder;
use crate::domain::model::{
    FeatureVector, PassengerAttributes, PassengerClass, Sex, SurvivalProbability,
};
use crate::domain::ports::{ModelProvider, Predictor};
use crate::utils::error::{Result, SurvivalError};
use std::sync::Arc;

/// What to do when a categorical label is not one of the known values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelPolicy {
    /// Encode as `NaN` and let the model decide.
    #[default]
    Propagate,
    /// Fail the request before the model is invoked.
    Reject,
}

pub struct Scorer {
    models: Arc<dyn ModelProvider>,
    policy: LabelPolicy,
}

impl Scorer {
    pub fn new(models: Arc<dyn ModelProvider>) -> Self {
        Self::with_policy(models, LabelPolicy::default())
    }

    pub fn with_policy(models: Arc<dyn ModelProvider>, policy: LabelPolicy) -> Self {
        Self { models, policy }
    }

    pub async fn derive_survival_probability(
        &self,
        attrs: &PassengerAttributes,
    ) -> Result<SurvivalProbability> {
        if self.policy == LabelPolicy::Reject {
            check_labels(attrs)?;
        }

        let features = encoder::encode(attrs);
        let missing = features.missing_features();
        if !missing.is_empty() {
            tracing::warn!(
                "⚠️ Unrecognized labels (Pclass={:?}, Sex={:?}), passing NaN for {:?}",
                attrs.pclass,
                attrs.sex,
                missing
            );
        }

        let model = self.models.model().await?;
        let probability = score_features(model.as_ref(), &features)?;

        tracing::debug!("🔮 features={:?} -> {}", features.as_slice(), probability.value());
        Ok(probability)
    }
}

/// Run the model on a single-row batch and round the result.
pub fn score_features<P: Predictor + ?Sized>(
    model: &P,
    features: &FeatureVector,
) -> Result<SurvivalProbability> {
    let scores = model.predict_batch(std::slice::from_ref(features))?;
    let raw = scores
        .first()
        .copied()
        .ok_or_else(|| SurvivalError::InferenceError {
            message: "model returned an empty batch".to_string(),
        })?;

    if !raw.is_finite() {
        return Err(SurvivalError::InferenceError {
            message: format!(
                "model returned non-finite score {} (missing features: {:?})",
                raw,
                features.missing_features()
            ),
        });
    }

    Ok(SurvivalProbability::from_raw(raw))
}

fn check_labels(attrs: &PassengerAttributes) -> Result<()> {
    if PassengerClass::from_label(&attrs.pclass).is_none() {
        return Err(SurvivalError::UnknownLabelError {
            field: "Pclass".to_string(),
            value: attrs.pclass.clone(),
        });
    }
    if Sex::from_label(&attrs.sex).is_none() {
        return Err(SurvivalError::UnknownLabelError {
            field: "Sex".to_string(),
            value: attrs.sex.clone(),
        });
    }
    Ok(())
}
