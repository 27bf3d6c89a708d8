/// Number of measurements in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 4;

/// Field names in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// One specimen to classify, measured in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl FeatureVector {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        }
    }

    /// Measurements in the order the model was trained on.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }

    /// Field name and value pairs, in model order.
    pub fn named(&self) -> [(&'static str, f64); FEATURE_COUNT] {
        let values = self.to_array();
        std::array::from_fn(|i| (FEATURE_NAMES[i], values[i]))
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_order_matches_feature_names() {
        let features = FeatureVector::new(5.1, 3.5, 1.4, 0.2);
        let named = features.named();

        assert_eq!(features.to_array(), [5.1, 3.5, 1.4, 0.2]);
        assert_eq!(named[0], ("sepal_length", 5.1));
        assert_eq!(named[3], ("petal_width", 0.2));
        assert_eq!(FeatureVector::from([5.1, 3.5, 1.4, 0.2]), features);
    }
}
