use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

/// 错误响应体，所有失败路径统一为 {"error": "..."}
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_body(message: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: message.into(),
    })
}

/// 未预期的失败统一映射为 500，细节只写入服务端日志
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_body("Internal server error"),
    )
        .into_response()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
}

/// 解析 YYYY-MM-DD，缺省时取当天
pub fn parse_date_or_today(raw: Option<&str>) -> Result<NaiveDate, chrono::ParseError> {
    match raw {
        Some(s) => parse_date(s),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn email_has_valid_shape(email: &str) -> bool {
    !email.is_empty() && email.contains('@')
}

pub fn email_in_allowed_domain(email: &str, domain: &str) -> bool {
    email.ends_with(&format!("@{}", domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_iso_date() {
        let date = parse_date("2025-01-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(parse_date("10.01.2025").is_err());
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn missing_date_defaults_to_today() {
        let date = parse_date_or_today(None).unwrap();
        assert_eq!(date, Utc::now().date_naive());
    }

    #[test]
    fn email_shape_requires_at_sign() {
        assert!(email_has_valid_shape("user@qest.cz"));
        assert!(!email_has_valid_shape("user.qest.cz"));
        assert!(!email_has_valid_shape(""));
    }

    #[test]
    fn domain_check_matches_suffix_only() {
        assert!(email_in_allowed_domain("user@qest.cz", "qest.cz"));
        assert!(!email_in_allowed_domain("user@gmail.com", "qest.cz"));
        // 裸域名后缀不够，必须带 @
        assert!(!email_in_allowed_domain("userqest.cz", "qest.cz"));
    }
}
