use serde::{Deserialize, Serialize};

/// 乘客屬性，對應 POST /api/titanic 的請求內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PassengerAttributes {
    pub pclass: String,
    pub sex: String,
    pub age: i64,
    pub sib_sp: u32,
    pub parch: u32,
    pub fare: i64,
}

/// Passenger class tier. The labels are the exact strings the front end sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerClass {
    Upper,
    Middle,
    Lower,
}

impl PassengerClass {
    pub const UPPER_LABEL: &'static str = "上層クラス (資産階級)";
    pub const MIDDLE_LABEL: &'static str = "中層クラス (一般階級)";
    pub const LOWER_LABEL: &'static str = "下層クラス (労働階級)";

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            Self::UPPER_LABEL => Some(Self::Upper),
            Self::MIDDLE_LABEL => Some(Self::Middle),
            Self::LOWER_LABEL => Some(Self::Lower),
            _ => None,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Self::Upper => 1,
            Self::Middle => 2,
            Self::Lower => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const MALE_LABEL: &'static str = "男性";
    pub const FEMALE_LABEL: &'static str = "女性";

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            Self::MALE_LABEL => Some(Self::Male),
            Self::FEMALE_LABEL => Some(Self::Female),
            _ => None,
        }
    }
}

/// Fixed-order feature vector consumed by the probability model.
///
/// The slot order is the training order; reordering silently corrupts
/// predictions. Unrecognized categorical labels are carried as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

pub const FEATURE_COUNT: usize = 8;

impl FeatureVector {
    pub const LEN: usize = FEATURE_COUNT;

    pub const NAMES: [&'static str; FEATURE_COUNT] = [
        "Pclass",
        "Sex",
        "Age",
        "SibSp",
        "Parch",
        "Fare",
        "Family",
        "mean_Fare_by_Sex",
    ];

    pub const PCLASS: usize = 0;
    pub const SEX: usize = 1;
    pub const MEAN_FARE_BY_SEX: usize = 7;

    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Names of the slots holding the `NaN` sentinel.
    pub fn missing_features(&self) -> Vec<&'static str> {
        self.0
            .iter()
            .zip(Self::NAMES)
            .filter(|(value, _)| value.is_nan())
            .map(|(_, name)| name)
            .collect()
    }
}

/// Survival probability already rounded to three decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SurvivalProbability(f64);

impl SurvivalProbability {
    /// Round a raw model score half-to-even at the third decimal.
    pub fn from_raw(raw: f64) -> Self {
        Self(round_to_places(raw, 3))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Same rounding rule as the numeric library the model was trained with:
/// scale, round half to even, scale back.
pub fn round_to_places(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
