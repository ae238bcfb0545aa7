//! Custom axum extractors.

use super::error::{ApiError, ClientError};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    response::IntoResponse,
};
use http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// A custom JSON extractor since axum's does not let us customize the response.
///
/// Bodies are read leniently. A request without a JSON content type, an empty
/// body or a body that is not an object all extract as `T::default()`, so the
/// handler sees "no fields" rather than the request being rejected. Only
/// syntactically broken JSON is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> AsRef<T> for Json<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Ok(Json(T::default()));
        }
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(ClientError::from)?;
        if bytes.is_empty() {
            return Ok(Json(T::default()));
        }
        let value: Value = serde_json::from_slice(&bytes).map_err(bad_request)?;
        if !value.is_object() {
            return Ok(Json(T::default()));
        }
        let fields = serde_json::from_value(value).map_err(bad_request)?;
        Ok(Json(fields))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

/// Whether the request declares a JSON body, e.g. `application/json` or `application/merge-patch+json`.
fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn bad_request(e: serde_json::Error) -> ClientError {
    ClientError::Custom(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Fields {
        name: Option<Value>,
    }

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<Fields, ApiError> {
        let mut req = http::Request::post("/");
        if let Some(content_type) = content_type {
            req = req.header(CONTENT_TYPE, content_type);
        }
        let req = req.body(Body::from(body)).unwrap();
        Json::<Fields>::from_request(req, &()).await.map(|Json(f)| f)
    }

    #[tokio::test]
    async fn json_objects_are_deserialized() {
        let fields = extract(Some("application/json"), r#"{"name": 123}"#)
            .await
            .unwrap();
        assert_eq!(Some(Value::from(123)), fields.name);
    }

    #[tokio::test]
    async fn charset_parameters_are_ignored() {
        let fields = extract(Some("Application/JSON; charset=utf-8"), r#"{"name": "a"}"#)
            .await
            .unwrap();
        assert_eq!(Some(Value::from("a")), fields.name);
    }

    #[tokio::test]
    async fn missing_content_type_means_no_fields() {
        let fields = extract(None, r#"{"name": "a"}"#).await.unwrap();
        assert_eq!(Fields::default(), fields);
    }

    #[tokio::test]
    async fn other_content_types_mean_no_fields() {
        let fields = extract(Some("text/plain"), r#"{"name": "a"}"#)
            .await
            .unwrap();
        assert_eq!(Fields::default(), fields);
    }

    #[tokio::test]
    async fn empty_and_non_object_bodies_mean_no_fields() {
        for body in ["", "[1, 2]", "\"a\"", "null"] {
            let fields = extract(Some("application/json"), body).await.unwrap();
            assert_eq!(Fields::default(), fields, "{body}");
        }
    }

    #[tokio::test]
    async fn broken_json_is_a_bad_request() {
        let err = extract(Some("application/json"), "{not json")
            .await
            .unwrap_err();
        let res = err.into_response();
        assert_eq!(StatusCode::BAD_REQUEST, res.status());
    }
}
