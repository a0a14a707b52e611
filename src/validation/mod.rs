pub mod roadmap;

use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Query},
    http::{Request, request::Parts},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// JSON body extractor that runs `validator` rules.
pub struct ValidatedJson<T>(pub T);

/// Query-string extractor that runs `validator` rules.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S, axum::body::Body> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<axum::body::Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("Invalid JSON format: {}", e)))?;

        value.validate().map_err(validation_failure)?;
        Ok(ValidatedJson(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(format!("Invalid query string: {}", e)))?;

        value.validate().map_err(validation_failure)?;
        Ok(ValidatedQuery(value))
    }
}

/// Flattens field errors into a single message, e.g.
/// `window_days: must be between 1 and 365`.
pub fn validation_failure(errors: ValidationErrors) -> AppError {
    let mut details: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    details.sort();
    AppError::validation(details.join("; "))
}
