use crate::domain::model::{FeatureVector, PassengerAttributes, PassengerClass, Sex};

/// 男性 → 1, 女性 → 0, otherwise NaN.
pub fn encode_sex(label: &str) -> f64 {
    match Sex::from_label(label) {
        Some(Sex::Male) => 1.0,
        Some(Sex::Female) => 0.0,
        None => f64::NAN,
    }
}

/// Class tier rank: upper 1, middle 2, lower 3, otherwise NaN.
pub fn encode_class(label: &str) -> f64 {
    PassengerClass::from_label(label)
        .map(|class| f64::from(class.rank()))
        .unwrap_or(f64::NAN)
}

/// Parents/children plus siblings/spouses plus the passenger.
pub fn family_size(parch: u32, sibsp: u32) -> u64 {
    u64::from(parch) + u64::from(sibsp) + 1
}

/// Historical mean fare by sex, used as an engineered feature.
pub fn mean_fare_by_sex(label: &str) -> f64 {
    match Sex::from_label(label) {
        Some(Sex::Male) => 26.0,
        Some(Sex::Female) => 46.0,
        None => f64::NAN,
    }
}

pub fn encode(attrs: &PassengerAttributes) -> FeatureVector {
    FeatureVector::new([
        encode_class(&attrs.pclass),
        encode_sex(&attrs.sex),
        attrs.age as f64,
        f64::from(attrs.sib_sp),
        f64::from(attrs.parch),
        attrs.fare as f64,
        family_size(attrs.parch, attrs.sib_sp) as f64,
        mean_fare_by_sex(&attrs.sex),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger(pclass: &str, sex: &str) -> PassengerAttributes {
        PassengerAttributes {
            pclass: pclass.to_string(),
            sex: sex.to_string(),
            age: 30,
            sib_sp: 0,
            parch: 0,
            fare: 50,
        }
    }

    #[test]
    fn test_encode_sex() {
        assert_eq!(encode_sex(Sex::MALE_LABEL), 1.0);
        assert_eq!(encode_sex(Sex::FEMALE_LABEL), 0.0);
        assert!(encode_sex("male").is_nan());
        assert!(encode_sex("").is_nan());
    }

    #[test]
    fn test_encode_class() {
        assert_eq!(encode_class(PassengerClass::UPPER_LABEL), 1.0);
        assert_eq!(encode_class(PassengerClass::MIDDLE_LABEL), 2.0);
        assert_eq!(encode_class(PassengerClass::LOWER_LABEL), 3.0);
        assert!(encode_class("1").is_nan());
        // 括號前的半形空白是標籤的一部分
        assert!(encode_class("上層クラス(資産階級)").is_nan());
    }

    #[test]
    fn test_family_size() {
        assert_eq!(family_size(0, 0), 1);
        assert_eq!(family_size(2, 3), 6);
        for parch in 0..5 {
            for sibsp in 0..5 {
                assert_eq!(family_size(parch, sibsp), u64::from(parch + sibsp + 1));
            }
        }
        assert_eq!(family_size(u32::MAX, u32::MAX), 2 * u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_mean_fare_by_sex() {
        assert_eq!(mean_fare_by_sex(Sex::MALE_LABEL), 26.0);
        assert_eq!(mean_fare_by_sex(Sex::FEMALE_LABEL), 46.0);
        assert!(mean_fare_by_sex("other").is_nan());
    }

    #[test]
    fn test_encode_upper_class_male() {
        let vector = encode(&passenger(PassengerClass::UPPER_LABEL, Sex::MALE_LABEL));
        assert_eq!(
            vector.as_slice(),
            &[1.0, 1.0, 30.0, 0.0, 0.0, 50.0, 1.0, 26.0]
        );
        assert!(vector.missing_features().is_empty());
    }

    #[test]
    fn test_encode_unknown_sex_yields_nan_slots() {
        let vector = encode(&passenger(PassengerClass::LOWER_LABEL, "unknown"));
        assert!(vector.get(FeatureVector::SEX).unwrap().is_nan());
        assert!(vector.get(FeatureVector::MEAN_FARE_BY_SEX).unwrap().is_nan());
        assert_eq!(vector.get(FeatureVector::PCLASS), Some(3.0));
        assert_eq!(vector.missing_features(), vec!["Sex", "mean_Fare_by_Sex"]);
    }
}
