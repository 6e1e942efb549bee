use axum::Json;
use serde::Deserialize;

use super::{ApiError, ApiResponse};
use crate::validation::{FormField, FormReport, PasswordStrength, password_strength, validate_form};

#[derive(Deserialize)]
pub struct PasswordStrengthRequest {
    pub password: String,
}

/// POST /validate
/// Run the form-validation engine over submitted fields, reporting every
/// failure at once so a client can surface them together.
pub async fn validate_form_handler(
    Json(fields): Json<Vec<FormField>>,
) -> Json<ApiResponse<FormReport>> {
    Json(ApiResponse::success(validate_form(&fields)))
}

/// POST /validate/password
/// Advisory password strength score, independent from the acceptance policy.
pub async fn password_strength_handler(
    Json(payload): Json<PasswordStrengthRequest>,
) -> Json<ApiResponse<PasswordStrength>> {
    Json(ApiResponse::success(password_strength(&payload.password)))
}

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            resource, id
        )));
    }
    Ok(id)
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    Ok(trimmed)
}
