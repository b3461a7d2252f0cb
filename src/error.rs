use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Result type alias for toolbox operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the toolbox.
///
/// Precondition failures (missing directory or file, missing option, use
/// before connecting) all surface as [`Error::Configuration`], whichever
/// crate detected them. Request-input errors keep their HTTP status through
/// [`Error::status_code`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Missing directory or file, missing option, or not connected.
   #[error("{0}")]
   Configuration(String),

   /// Error from the connection manager.
   #[error(transparent)]
   ConnectionManager(sqlx_toolbox_conn_mgr::Error),

   /// Error from query building, execution or pagination.
   #[error(transparent)]
   Query(#[from] sqlx_toolbox_query::Error),

   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// IO error while preparing database or migration files.
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),
}

impl Error {
   pub(crate) fn configuration(message: impl Into<String>) -> Self {
      Error::Configuration(message.into())
   }

   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         Error::Configuration(_) => "CONFIGURATION_ERROR".to_string(),
         Error::ConnectionManager(sqlx_toolbox_conn_mgr::Error::DatabaseClosed) => {
            "DATABASE_CLOSED".to_string()
         }
         Error::ConnectionManager(_) => "CONNECTION_ERROR".to_string(),
         Error::Query(e) => e.error_code(),
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("DATABASE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::Io(_) => "IO_ERROR".to_string(),
      }
   }

   /// HTTP status a web layer should answer with.
   pub fn status_code(&self) -> u16 {
      match self {
         Error::Query(e) => e.status_code(),
         _ => 500,
      }
   }
}

impl From<sqlx_toolbox_conn_mgr::Error> for Error {
   fn from(error: sqlx_toolbox_conn_mgr::Error) -> Self {
      match error {
         sqlx_toolbox_conn_mgr::Error::Configuration(message) => Error::Configuration(message),
         sqlx_toolbox_conn_mgr::Error::Sqlx(e) => Error::Sqlx(e),
         other => Error::ConnectionManager(other),
      }
   }
}

impl IntoResponse for Error {
   fn into_response(self) -> Response {
      let status =
         StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

      let body = if status.is_server_error() {
         // Log the actual error, return generic message
         tracing::error!(code = %self.error_code(), "request failed: {}", self);
         json!({
            "error": "INTERNAL_ERROR",
            "message": "an internal error occurred"
         })
      } else {
         json!({
            "error": self.error_code(),
            "message": self.to_string()
         })
      };

      (status, Json(body)).into_response()
   }
}
