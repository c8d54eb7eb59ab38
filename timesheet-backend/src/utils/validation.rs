// timesheet-backend/src/utils/validation.rs

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// "YYYY-MM" 形式の月指定
pub static MONTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("valid month regex"));

/// 通知の配信先として受け付けるメールアドレス
pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// 月指定バリデーション（validator の custom 用）
pub fn validate_month(month: &str) -> Result<(), ValidationError> {
    if MONTH_REGEX.is_match(month) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_month");
        error.message = Some("Month must be in YYYY-MM format".into());
        Err(error)
    }
}

/// 空白だけの文字列を拒否する
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Value must not be blank".into());
        Err(error)
    } else {
        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}
