// ═══════════════════════════════════════════════════════════════════
// Validation Tests: TradeSchema (create vs edit), StrategySchema
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use trade_journal_core::models::strategy::StrategyInput;
use trade_journal_core::models::trade::{ImageFile, TradeFormInput, TradeStatus};
use trade_journal_core::validation::{
    ImageRequirement, Schema, StrategySchema, TradeSchema, MAX_IMAGE_BYTES,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn png(size: usize) -> ImageFile {
    ImageFile::new("setup.png", "image/png", vec![0u8; size])
}

/// A trade form that is valid in edit mode (no image attached).
fn valid_form() -> TradeFormInput {
    TradeFormInput {
        date: "2024-01-01".into(),
        reason: "breakout".into(),
        status: "open".into(),
        entry_price: "10.5".into(),
        quantity: "3".into(),
        profit_loss: None,
        profit_loss_percentage: None,
        setup_image: vec![],
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Schema factory
// ═══════════════════════════════════════════════════════════════════

mod factory {
    use super::*;

    #[test]
    fn create_mode_requires_image() {
        assert_eq!(
            TradeSchema::for_mode(false).image_requirement(),
            ImageRequirement::Required
        );
        assert_eq!(TradeSchema::for_mode(false), TradeSchema::create());
    }

    #[test]
    fn edit_mode_keeps_existing_image() {
        assert_eq!(
            TradeSchema::for_mode(true).image_requirement(),
            ImageRequirement::KeepExisting
        );
        assert_eq!(TradeSchema::for_mode(true), TradeSchema::edit());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  setupImage: create vs edit
// ═══════════════════════════════════════════════════════════════════

mod setup_image {
    use super::*;

    #[test]
    fn missing_image_rejected_on_create_accepted_on_edit() {
        let form = valid_form();

        let err = TradeSchema::for_mode(false).validate(&form).unwrap_err();
        assert_eq!(err.first("setupImage"), Some("Image is required."));
        assert_eq!(err.len(), 1, "only the image should fail: {err}");

        let ok = TradeSchema::for_mode(true).validate(&form).unwrap();
        assert!(ok.setup_image.is_none());
    }

    #[test]
    fn missing_image_rejected_for_many_payloads() {
        for (price, qty, status) in [("0", "1", "open"), ("99.99", "10", "closed"), ("1e3", "7", "open")] {
            let mut form = valid_form();
            form.entry_price = price.into();
            form.quantity = qty.into();
            form.status = status.into();

            let err = TradeSchema::create().validate(&form).unwrap_err();
            assert!(err.has("setupImage"));
            assert!(TradeSchema::edit().validate(&form).is_ok());
        }
    }

    #[test]
    fn two_megabyte_png_accepted_on_create() {
        let form = valid_form().with_image(png(2_000_000));
        let sub = TradeSchema::create().validate(&form).unwrap();
        assert_eq!(sub.setup_image.unwrap().size(), 2_000_000);
    }

    #[test]
    fn six_megabyte_image_rejected() {
        let form = valid_form().with_image(png(6_000_000));
        let err = TradeSchema::create().validate(&form).unwrap_err();
        assert_eq!(err.first("setupImage"), Some("Max file size is 5MB."));
    }

    #[test]
    fn exactly_max_size_accepted() {
        let form = valid_form().with_image(png(MAX_IMAGE_BYTES));
        assert!(TradeSchema::create().validate(&form).is_ok());
    }

    #[test]
    fn one_byte_over_max_rejected() {
        let form = valid_form().with_image(png(MAX_IMAGE_BYTES + 1));
        assert!(TradeSchema::create().validate(&form).is_err());
    }

    #[test]
    fn accepted_mime_types() {
        for mime in ["image/jpeg", "image/jpg", "image/png", "image/webp"] {
            let form = valid_form().with_image(ImageFile::new("x", mime, vec![1, 2, 3]));
            assert!(TradeSchema::create().validate(&form).is_ok(), "{mime} should pass");
        }
    }

    #[test]
    fn unsupported_mime_rejected() {
        let form = valid_form().with_image(ImageFile::new("x.gif", "image/gif", vec![1]));
        let err = TradeSchema::create().validate(&form).unwrap_err();
        assert_eq!(
            err.first("setupImage"),
            Some("Only .jpg, .jpeg, .png and .webp formats are supported.")
        );
    }

    #[test]
    fn oversized_and_wrong_type_reports_both() {
        let form = valid_form().with_image(ImageFile::new("x.bmp", "image/bmp", vec![0; 6_000_000]));
        let err = TradeSchema::create().validate(&form).unwrap_err();
        assert_eq!(
            err.messages("setupImage"),
            vec![
                "Max file size is 5MB.",
                "Only .jpg, .jpeg, .png and .webp formats are supported."
            ]
        );
    }

    #[test]
    fn two_files_rejected_on_create() {
        let form = valid_form().with_image(png(10)).with_image(png(10));
        let err = TradeSchema::create().validate(&form).unwrap_err();
        assert_eq!(err.first("setupImage"), Some("Image is required."));
    }

    #[test]
    fn edit_takes_first_file_unchecked() {
        let form = valid_form()
            .with_image(ImageFile::new("big.gif", "image/gif", vec![0; 6_000_000]))
            .with_image(png(10));
        let sub = TradeSchema::edit().validate(&form).unwrap();
        assert_eq!(sub.setup_image.unwrap().file_name, "big.gif");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Base trade fields
// ═══════════════════════════════════════════════════════════════════

mod trade_fields {
    use super::*;

    #[test]
    fn valid_submission_is_typed() {
        let sub = TradeSchema::edit().validate(&valid_form()).unwrap();
        assert_eq!(sub.date, d(2024, 1, 1));
        assert_eq!(sub.reason, "breakout");
        assert_eq!(sub.status, TradeStatus::Open);
        assert_eq!(sub.entry_price, 10.5);
        assert_eq!(sub.quantity, 3);
        assert_eq!(sub.profit_loss, None);
        assert_eq!(sub.profit_loss_percentage, None);
    }

    #[test]
    fn rfc3339_date_accepted() {
        let mut form = valid_form();
        form.date = "2024-03-05T14:30:00Z".into();
        assert_eq!(TradeSchema::edit().validate(&form).unwrap().date, d(2024, 3, 5));
    }

    #[test]
    fn bad_dates_rejected() {
        for raw in ["", "yesterday", "2024-13-01", "2024-02-30"] {
            let mut form = valid_form();
            form.date = raw.into();
            let err = TradeSchema::edit().validate(&form).unwrap_err();
            assert_eq!(err.first("date"), Some("Invalid date"), "{raw:?}");
        }
    }

    #[test]
    fn empty_reason_rejected() {
        let mut form = valid_form();
        form.reason = String::new();
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(err.first("reason"), Some("Reason is required"));
    }

    #[test]
    fn unknown_status_rejected() {
        let mut form = valid_form();
        form.status = "pending".into();
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(
            err.first("status"),
            Some("Invalid enum value. Expected 'open' | 'closed', received 'pending'")
        );
    }

    #[test]
    fn closed_status_accepted() {
        let mut form = valid_form();
        form.status = "closed".into();
        assert_eq!(
            TradeSchema::edit().validate(&form).unwrap().status,
            TradeStatus::Closed
        );
    }

    #[test]
    fn entry_price_zero_allowed_negative_rejected() {
        let mut form = valid_form();
        form.entry_price = "0".into();
        assert!(TradeSchema::edit().validate(&form).is_ok());

        form.entry_price = "-0.01".into();
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(
            err.first("entryPrice"),
            Some("Number must be greater than or equal to 0")
        );
    }

    #[test]
    fn entry_price_not_a_number() {
        let mut form = valid_form();
        form.entry_price = "ten".into();
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(err.first("entryPrice"), Some("Expected number, received nan"));
    }

    #[test]
    fn entry_price_blank_is_required() {
        let mut form = valid_form();
        form.entry_price = "  ".into();
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(err.first("entryPrice"), Some("Required"));
    }

    #[test]
    fn numbers_are_trimmed_before_coercion() {
        let mut form = valid_form();
        form.entry_price = " 12.25 ".into();
        form.quantity = " 4 ".into();
        let sub = TradeSchema::edit().validate(&form).unwrap();
        assert_eq!(sub.entry_price, 12.25);
        assert_eq!(sub.quantity, 4);
    }

    #[test]
    fn infinity_is_not_a_number() {
        let mut form = valid_form();
        form.entry_price = "inf".into();
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(err.first("entryPrice"), Some("Expected number, received nan"));
    }

    #[test]
    fn quantity_must_be_integer() {
        let mut form = valid_form();
        form.quantity = "2.5".into();
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(err.first("quantity"), Some("Expected integer, received float"));
    }

    #[test]
    fn quantity_must_be_at_least_one() {
        let mut form = valid_form();
        form.quantity = "0".into();
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(
            err.first("quantity"),
            Some("Number must be greater than or equal to 1")
        );
    }

    #[test]
    fn quantity_too_large_to_send_exactly_rejected() {
        let mut form = valid_form();
        for huge in ["1e30", "9007199254740992"] {
            form.quantity = huge.into();
            let err = TradeSchema::edit().validate(&form).unwrap_err();
            assert_eq!(
                err.messages("quantity"),
                vec!["Number must be less than or equal to 9007199254740991"]
            );
        }

        form.quantity = "9007199254740991".into();
        let sub = TradeSchema::edit().validate(&form).unwrap();
        assert_eq!(sub.quantity, 9_007_199_254_740_991);
    }

    #[test]
    fn fractional_quantity_below_one_reports_both_rules() {
        let mut form = valid_form();
        form.quantity = "0.5".into();
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(
            err.messages("quantity"),
            vec![
                "Expected integer, received float",
                "Number must be greater than or equal to 1"
            ]
        );
    }

    #[test]
    fn optional_numbers_parsed_when_present() {
        let mut form = valid_form();
        form.profit_loss = Some("-12.5".into());
        form.profit_loss_percentage = Some("3.75".into());
        let sub = TradeSchema::edit().validate(&form).unwrap();
        assert_eq!(sub.profit_loss, Some(-12.5));
        assert_eq!(sub.profit_loss_percentage, Some(3.75));
    }

    #[test]
    fn blank_optional_numbers_are_absent() {
        let mut form = valid_form();
        form.profit_loss = Some(String::new());
        form.profit_loss_percentage = Some("   ".into());
        let sub = TradeSchema::edit().validate(&form).unwrap();
        assert_eq!(sub.profit_loss, None);
        assert_eq!(sub.profit_loss_percentage, None);
    }

    #[test]
    fn optional_number_garbage_rejected() {
        let mut form = valid_form();
        form.profit_loss_percentage = Some("lots".into());
        let err = TradeSchema::edit().validate(&form).unwrap_err();
        assert_eq!(
            err.first("profitLossPercentage"),
            Some("Expected number, received nan")
        );
    }

    #[test]
    fn every_failing_field_is_reported() {
        let form = TradeFormInput {
            date: "nope".into(),
            reason: String::new(),
            status: "maybe".into(),
            entry_price: "-1".into(),
            quantity: "0".into(),
            profit_loss: Some("x".into()),
            profit_loss_percentage: None,
            setup_image: vec![],
        };
        let err = TradeSchema::create().validate(&form).unwrap_err();
        for field in ["date", "reason", "status", "entryPrice", "quantity", "profitLoss", "setupImage"] {
            assert!(err.has(field), "expected error on {field}: {err}");
        }
        assert!(!err.has("profitLossPercentage"));
    }

    #[test]
    fn default_form_needs_date_reason_and_image() {
        let err = TradeSchema::create()
            .validate(&TradeFormInput::default())
            .unwrap_err();
        let fields: Vec<&str> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["date", "reason", "setupImage"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  StrategySchema
// ═══════════════════════════════════════════════════════════════════

mod strategy_schema {
    use super::*;

    #[test]
    fn valid_strategy() {
        let payload = StrategySchema
            .validate(&StrategyInput::new("2024-02-10", "Buy the dip"))
            .unwrap();
        assert_eq!(payload.date, d(2024, 2, 10));
        assert_eq!(payload.content, "Buy the dip");
    }

    #[test]
    fn invalid_date() {
        let err = StrategySchema
            .validate(&StrategyInput::new("10/02/2024", "Buy the dip"))
            .unwrap_err();
        assert_eq!(err.first("date"), Some("Invalid date"));
    }

    #[test]
    fn empty_content() {
        let err = StrategySchema
            .validate(&StrategyInput::new("2024-02-10", ""))
            .unwrap_err();
        assert_eq!(err.first("content"), Some("Content is required"));
        assert!(!err.has("date"));
    }

    #[test]
    fn both_fields_reported() {
        let err = StrategySchema.validate(&StrategyInput::default()).unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.has("date"));
        assert!(err.has("content"));
    }
}
