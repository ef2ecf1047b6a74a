use std::sync::Arc;

use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        Request,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::store;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    DB(#[from] store::Error),

    // validation
    #[error("{0}")]
    PathValidation(#[from] PathRejection),
    #[error("{0}")]
    Body(#[from] BytesRejection),

    // startup
    #[error("invalid configuration: {0}")]
    Config(#[from] envy::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::DB(store::Error::Decode(error.to_string()))
    }
}

/// Every error is a 500 with its message as a plain-text body.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let mut res = (StatusCode::INTERNAL_SERVER_ERROR, message).into_response();
        res.extensions_mut().insert(Arc::new(self));
        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let error = response.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    if let Some(error) = error {
        tracing::error!("{:?}", error);
    }

    response
}
