#[cfg(test)]
mod tests {
    use crate::error::WizardError;

    #[test]
    fn test_request_failed_creation() {
        let error = WizardError::request_failed(500, "file unreadable");
        assert_eq!(
            error,
            WizardError::RequestFailed {
                status: 500,
                message: "file unreadable".to_string()
            }
        );
        assert_eq!(error.status(), Some(500));
        assert_eq!(error.stage(), "request");
    }

    #[test]
    fn test_precondition_has_no_status() {
        let error = WizardError::precondition("missing analysis id");
        assert_eq!(error.status(), None);
        assert_eq!(error.stage(), "precondition");
    }

    #[test]
    fn test_error_display() {
        let error = WizardError::request_failed(404, "not found");
        let display = format!("{}", error);
        assert!(display.contains("404"));
        assert!(display.contains("not found"));
    }

    #[test]
    fn test_base64_error_maps_to_decode_failed() {
        use base64::Engine;
        let err = base64::engine::general_purpose::STANDARD
            .decode("not*base64")
            .unwrap_err();
        let error = WizardError::from(err);
        assert_eq!(error.stage(), "decode");
        assert!(matches!(error, WizardError::DecodeFailed { .. }));
    }

    #[test]
    fn test_json_error_maps_to_invalid_response() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = WizardError::from(err);
        assert!(matches!(error, WizardError::InvalidResponse { .. }));
    }

    #[test]
    fn test_error_serializes_with_kind_tag() {
        let error = WizardError::request_failed(500, "boom");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "request_failed");
        assert_eq!(json["status"], 500);
        assert_eq!(json["message"], "boom");
    }
}
