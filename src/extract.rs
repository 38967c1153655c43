//! Extractor wrappers that keep rejections inside the error envelope
//!
//! The stock `Json` and `Path` extractors answer malformed input with
//! plain-text bodies that leak parser detail. These wrappers convert the
//! rejections into `AppError` so every error leaves the service as
//! `{"success": false, "error": "..."}`.

use crate::error::AppError;
use axum::extract::{
    rejection::JsonRejection, FromRequest, FromRequestParts, Request,
};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

/// JSON body extractor; rejections become a 400 in the envelope
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(reason = %rejection, "Body rejected");
                AppError::bad_request("Invalid JSON in request body")
            })?;

        Ok(Json(value))
    }
}

// Handlers also respond with Json; delegate to the stock serializer
impl<T: serde::Serialize> axum::response::IntoResponse for Json<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameter extractor; an unparseable id reads as a missing resource
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    tracing::debug!(reason = %rejection, "Path rejected");
                    AppError::not_found("Resource not found")
                })?;

        Ok(Path(value))
    }
}
