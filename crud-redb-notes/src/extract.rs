use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use axum_macros::FromRequestParts;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// JSON request body and response.
///
/// Decodes regardless of the `Content-Type` header and reports bad input as a
/// crate error, so it ends up as a 500 with the parser's message. Object keys
/// match fields case-insensitively with the last occurrence winning, and a
/// `null` body is the default value.
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        let value = match serde_json::from_slice::<Value>(&bytes)? {
            Value::Null => T::default(),
            Value::Object(fields) => serde_json::from_value(Value::Object(fold_keys(fields)))?,
            value => serde_json::from_value(value)?,
        };
        Ok(Json(value))
    }
}

fn fold_keys(fields: Map<String, Value>) -> Map<String, Value> {
    fields.into_iter().map(|(key, value)| (key.to_lowercase(), value)).collect()
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);
