use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error as ThisError;

///
/// ApiError
///

#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend answered {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("backend error {code}: {message}")]
    Backend { code: i64, message: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("base url {0} cannot carry a path")]
    BaseUrl(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

///
/// ViewError
///

#[derive(Debug, ThisError)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("bad form input: {0}")]
    BadInput(String),

    #[error("upload exceeds the configured size limit")]
    TooLarge,

    #[error("template error: {0}")]
    Render(#[from] askama::Error),
}

impl ViewError {
    pub fn status(&self) -> StatusCode {
        match self {
            ViewError::Api(_) => StatusCode::BAD_GATEWAY,
            ViewError::BadInput(_) => StatusCode::BAD_REQUEST,
            ViewError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ViewError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(target: "web", %status, err = %self, "request failed");
        let page = crate::views::ErrorTemplate {
            status: status.as_u16(),
            message: self.to_string(),
        };
        match askama::Template::render(&page) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(_) => (status, self.to_string()).into_response(),
        }
    }
}
