//! Request body extractor accepting both JSON and HTML form submissions.

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::ValidationError;

/// Body deserialized from JSON or `application/x-www-form-urlencoded`
/// according to the request's content type.
///
/// A missing or unrecognized content type is read as an empty body. Bodies
/// that cannot be decoded are rejected with
/// [`ValidationError::MalformedBody`] so handlers can report them for their
/// own operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormOrJson<T>(pub T);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Empty,
}

fn body_kind(req: &Request) -> BodyKind {
    let mime = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim);

    match mime {
        Some(mime)
            if mime.eq_ignore_ascii_case("application/json")
                || (mime.starts_with("application/") && mime.ends_with("+json")) =>
        {
            BodyKind::Json
        }
        Some(mime) if mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") => {
            BodyKind::Form
        }
        _ => BodyKind::Empty,
    }
}

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Json => {
                let Json(value) = Json::<T>::from_request(req, state)
                    .await
                    .map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()))?;
                Ok(Self(value))
            }
            BodyKind::Form => {
                let Form(value) = Form::<T>::from_request(req, state)
                    .await
                    .map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()))?;
                Ok(Self(value))
            }
            BodyKind::Empty => {
                let empty = serde_json::Value::Object(serde_json::Map::new());
                serde_json::from_value(empty)
                    .map(Self)
                    .map_err(|e| ValidationError::MalformedBody(e.to_string()))
            }
        }
    }
}
