use serde::Deserialize;

/// Upper bound for a single logged item; matches the `food_logs` CHECK constraint.
pub const MAX_ENTRY_CALORIES: i64 = 100_000;

/// Body of `POST /predict`: the label and calories produced by the food classifier.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub label: String,
    pub calories: i64,
}

impl PredictRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.label.trim().is_empty() {
            return Err("label must not be empty");
        }
        if self.calories < 0 {
            return Err("calories must not be negative");
        }
        if self.calories > MAX_ENTRY_CALORIES {
            return Err("calories exceeds the per-entry limit");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_blank_label_and_negative_calories() {
        let blank = PredictRequest {
            label: "   ".into(),
            calories: 100,
        };
        assert_eq!(blank.validate(), Err("label must not be empty"));

        let negative = PredictRequest {
            label: "rendang".into(),
            calories: -1,
        };
        assert_eq!(negative.validate(), Err("calories must not be negative"));

        let zero = PredictRequest {
            label: "water".into(),
            calories: 0,
        };
        assert!(zero.validate().is_ok());

        let huge = PredictRequest {
            label: "overflow".into(),
            calories: i64::MAX,
        };
        assert_eq!(huge.validate(), Err("calories exceeds the per-entry limit"));

        let at_limit = PredictRequest {
            label: "tumpeng".into(),
            calories: MAX_ENTRY_CALORIES,
        };
        assert!(at_limit.validate().is_ok());
    }
}
