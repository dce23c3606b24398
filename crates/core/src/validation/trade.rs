use std::str::FromStr;

use crate::models::trade::{ImageFile, TradeFormInput, TradeStatus, TradeSubmission};

use super::{
    check_date, check_non_empty, check_number_min, check_optional_number, coerce_number, Coerced,
    Schema, ValidationErrors, ACCEPTED_IMAGE_TYPES, MAX_IMAGE_BYTES,
};

/// How the setup image is treated by a `TradeSchema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRequirement {
    /// New trade: exactly one accepted image file.
    Required,
    /// Existing trade: a file is optional and unchecked; none keeps the stored image.
    KeepExisting,
}

/// Validation for the trade form.
///
/// The image rule depends on whether a trade is being created or edited, so
/// the schema is built per submission through `for_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeSchema {
    image: ImageRequirement,
}

impl TradeSchema {
    pub fn for_mode(is_editing: bool) -> Self {
        if is_editing {
            Self::edit()
        } else {
            Self::create()
        }
    }

    pub fn create() -> Self {
        Self {
            image: ImageRequirement::Required,
        }
    }

    pub fn edit() -> Self {
        Self {
            image: ImageRequirement::KeepExisting,
        }
    }

    pub fn image_requirement(&self) -> ImageRequirement {
        self.image
    }

    fn check_image(&self, files: &[ImageFile], errors: &mut ValidationErrors) -> Option<ImageFile> {
        match self.image {
            ImageRequirement::KeepExisting => files.first().cloned(),
            ImageRequirement::Required => {
                if files.len() != 1 {
                    errors.add("setupImage", "Image is required.");
                }
                let file = files.first()?;
                let mut ok = files.len() == 1;
                if file.size() > MAX_IMAGE_BYTES {
                    errors.add("setupImage", "Max file size is 5MB.");
                    ok = false;
                }
                if !ACCEPTED_IMAGE_TYPES.contains(&file.mime_type.as_str()) {
                    errors.add(
                        "setupImage",
                        "Only .jpg, .jpeg, .png and .webp formats are supported.",
                    );
                    ok = false;
                }
                ok.then(|| file.clone())
            }
        }
    }
}

/// Largest integer an f64 holds exactly; past it the count sent would differ
/// from the one typed.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn check_quantity(raw: &str, errors: &mut ValidationErrors) -> Option<u64> {
    let n = match coerce_number(raw) {
        Coerced::Blank => {
            errors.add("quantity", "Required");
            return None;
        }
        Coerced::NotANumber => {
            errors.add("quantity", "Expected number, received nan");
            return None;
        }
        Coerced::Number(n) => n,
    };
    let mut ok = true;
    if n.fract() != 0.0 {
        errors.add("quantity", "Expected integer, received float");
        ok = false;
    }
    if n < 1.0 {
        errors.add("quantity", "Number must be greater than or equal to 1");
        ok = false;
    }
    if n > MAX_SAFE_INTEGER {
        errors.add(
            "quantity",
            "Number must be less than or equal to 9007199254740991",
        );
        ok = false;
    }
    ok.then_some(n as u64)
}

impl Schema for TradeSchema {
    type Input = TradeFormInput;
    type Output = TradeSubmission;

    fn validate(&self, input: &TradeFormInput) -> Result<TradeSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let date = check_date(&input.date, "date", &mut errors);
        check_non_empty(&input.reason, "reason", "Reason is required", &mut errors);

        let status = TradeStatus::from_str(&input.status).ok();
        if status.is_none() {
            errors.add(
                "status",
                format!(
                    "Invalid enum value. Expected 'open' | 'closed', received '{}'",
                    input.status
                ),
            );
        }

        let entry_price = check_number_min(&input.entry_price, "entryPrice", 0.0, &mut errors);
        let quantity = check_quantity(&input.quantity, &mut errors);
        let profit_loss = check_optional_number(input.profit_loss.as_deref(), "profitLoss", &mut errors);
        let profit_loss_percentage = check_optional_number(
            input.profit_loss_percentage.as_deref(),
            "profitLossPercentage",
            &mut errors,
        );
        let setup_image = self.check_image(&input.setup_image, &mut errors);

        match (date, status, entry_price, quantity) {
            (Some(date), Some(status), Some(entry_price), Some(quantity)) if errors.is_empty() => {
                Ok(TradeSubmission {
                    date,
                    reason: input.reason.clone(),
                    status,
                    entry_price,
                    quantity,
                    profit_loss,
                    profit_loss_percentage,
                    setup_image,
                })
            }
            _ => Err(errors),
        }
    }
}
