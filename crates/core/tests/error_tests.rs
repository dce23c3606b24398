// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError variants, Display, user messages, From impls
// ═══════════════════════════════════════════════════════════════════

use trade_journal_core::errors::{ApiFieldError, CoreError};
use trade_journal_core::validation::ValidationErrors;

fn field(field: &str, message: &str) -> ApiFieldError {
    ApiFieldError {
        field: field.into(),
        message: message.into(),
    }
}

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn unauthorized() {
        assert_eq!(
            CoreError::Unauthorized.to_string(),
            "Unauthorized: token missing, expired or rejected"
        );
    }

    #[test]
    fn api_with_message() {
        let err = CoreError::Api {
            status: 400,
            message: Some("Bad input".into()),
            field_errors: vec![],
        };
        assert_eq!(err.to_string(), "API error (400): Bad input");
    }

    #[test]
    fn api_without_message() {
        let err = CoreError::Api {
            status: 500,
            message: None,
            field_errors: vec![],
        };
        assert_eq!(err.to_string(), "API error (500): no message");
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn invalid_request() {
        let err = CoreError::InvalidRequest("bad URL".into());
        assert_eq!(err.to_string(), "Invalid request: bad URL");
    }

    #[test]
    fn storage() {
        let err = CoreError::Storage("disk full".into());
        assert_eq!(err.to_string(), "Token storage error: disk full");
    }

    #[test]
    fn config() {
        let err = CoreError::Config("token key must not be empty".into());
        assert_eq!(err.to_string(), "Invalid configuration: token key must not be empty");
    }

    #[test]
    fn not_found() {
        let err = CoreError::NotFound("trade t1".into());
        assert_eq!(err.to_string(), "Not found: trade t1");
    }

    #[test]
    fn validation_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("reason", "Reason is required");
        errors.add("quantity", "Number must be greater than or equal to 1");
        let err = CoreError::Validation(errors);
        assert_eq!(
            err.to_string(),
            "Validation failed: reason: Reason is required; quantity: Number must be greater than or equal to 1"
        );
    }
}

// ── User-facing mutation messages ───────────────────────────────────

mod user_message {
    use super::*;

    #[test]
    fn message_with_field_errors_is_joined() {
        let err = CoreError::Api {
            status: 400,
            message: Some("Trade validation failed".into()),
            field_errors: vec![
                field("reason", "Reason is too short"),
                field("quantity", "Quantity must be positive"),
            ],
        };
        assert_eq!(
            err.user_message("Failed to create trade."),
            "Trade validation failed: Reason is too short, Quantity must be positive"
        );
    }

    #[test]
    fn message_without_field_errors_is_used_as_is() {
        let err = CoreError::Api {
            status: 409,
            message: Some("Duplicate trade".into()),
            field_errors: vec![],
        };
        assert_eq!(err.user_message("Failed to create trade."), "Duplicate trade");
    }

    #[test]
    fn field_errors_without_message_fall_back() {
        let err = CoreError::Api {
            status: 400,
            message: None,
            field_errors: vec![field("reason", "Reason is too short")],
        };
        assert_eq!(err.user_message("Failed to update trade."), "Failed to update trade.");
    }

    #[test]
    fn network_falls_back() {
        let err = CoreError::Network("timed out".into());
        assert_eq!(err.user_message("Failed to delete trade."), "Failed to delete trade.");
    }

    #[test]
    fn unauthorized_falls_back() {
        assert_eq!(
            CoreError::Unauthorized.user_message("Failed to create strategy."),
            "Failed to create strategy."
        );
    }

    #[test]
    fn is_unauthorized() {
        assert!(CoreError::Unauthorized.is_unauthorized());
        assert!(!CoreError::Network("x".into()).is_unauthorized());
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        match CoreError::from(io_err) {
            CoreError::Storage(msg) => assert!(msg.contains("access denied")),
            other => panic!("Expected Storage, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{invalid").unwrap_err();
        match CoreError::from(json_err) {
            CoreError::Deserialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn from_validation_errors() {
        let mut errors = ValidationErrors::new();
        errors.add("date", "Invalid date");
        match CoreError::from(errors) {
            CoreError::Validation(v) => assert_eq!(v.first("date"), Some("Invalid date")),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }
}

// ── Error is std::error::Error ──────────────────────────────────────

mod std_error {
    use super::*;

    #[test]
    fn core_error_implements_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::Network("test".into()));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn core_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
