use crate::models::strategy::{StrategyInput, StrategyPayload};

use super::{check_date, check_non_empty, Schema, ValidationErrors};

/// Validation for the strategy form: a parseable date and non-empty content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategySchema;

impl Schema for StrategySchema {
    type Input = StrategyInput;
    type Output = StrategyPayload;

    fn validate(&self, input: &StrategyInput) -> Result<StrategyPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date = check_date(&input.date, "date", &mut errors);
        check_non_empty(&input.content, "content", "Content is required", &mut errors);

        match date {
            Some(date) if errors.is_empty() => Ok(StrategyPayload {
                date,
                content: input.content.clone(),
            }),
            _ => Err(errors),
        }
    }
}
