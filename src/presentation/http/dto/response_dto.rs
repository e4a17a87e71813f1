use serde::Serialize;

/// Uniform response envelope. Success carries data, failure carries an error
/// message and whether a retry may help.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            retryable: None,
        }
    }

    pub fn error(message: String, retryable: bool) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            retryable: Some(retryable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_omits_error_fields() {
        let json = serde_json::to_value(ApiResponse::ok("payload")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "payload");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_envelope() {
        let json =
            serde_json::to_value(ApiResponse::<()>::error("boom".to_string(), true)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert_eq!(json["retryable"], true);
    }
}
