/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for query building, execution and pagination.
///
/// Request-input errors (`InvalidPageArgument`, `EmptyPage`, `NotFound`)
/// carry an HTTP status through [`Error::status_code`]; everything else maps
/// to 500.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// Error from the connection manager other than a failed statement.
   #[error(transparent)]
   ConnectionManager(sqlx_toolbox_conn_mgr::Error),

   /// Page or per-page argument is not usable (non-numeric or negative).
   #[error("{message}")]
   InvalidPageArgument { message: &'static str },

   /// Strict pagination requested a page past the last one.
   #[error("No values")]
   EmptyPage,

   /// `first_or_404()` found no row.
   #[error("{0}")]
   NotFound(String),

   /// Multiple rows returned from a query expecting at most one.
   #[error("one_or_none() query returned {0} rows, expected 0 or 1")]
   MultipleRowsReturned(usize),

   /// Column or table name contains invalid characters.
   ///
   /// Names must match `[a-zA-Z_][a-zA-Z0-9_.]*` (letters, digits,
   /// underscores, and dots for qualified names like `table.column`).
   #[error("invalid identifier '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidColumnName { name: String },

   /// Filter condition placeholder count does not match its bind values.
   #[error("filter '{condition}' has {placeholders} placeholders but {values} values")]
   PlaceholderMismatch {
      condition: String,
      placeholders: usize,
      values: usize,
   },

   /// Generic error for operations that don't fit other categories.
   #[error("{0}")]
   Other(String),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("DATABASE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::ConnectionManager(_) => "CONNECTION_ERROR".to_string(),
         Error::InvalidPageArgument { .. } => "INVALID_PAGE_ARGUMENT".to_string(),
         Error::EmptyPage => "EMPTY_PAGE".to_string(),
         Error::NotFound(_) => "NOT_FOUND".to_string(),
         Error::MultipleRowsReturned(_) => "MULTIPLE_ROWS_RETURNED".to_string(),
         Error::InvalidColumnName { .. } => "INVALID_COLUMN_NAME".to_string(),
         Error::PlaceholderMismatch { .. } => "PLACEHOLDER_MISMATCH".to_string(),
         Error::Other(_) => "ERROR".to_string(),
      }
   }

   /// HTTP status a web layer should answer with.
   pub fn status_code(&self) -> u16 {
      match self {
         Error::InvalidPageArgument { .. } | Error::EmptyPage => 400,
         Error::NotFound(_) => 404,
         _ => 500,
      }
   }
}

impl From<sqlx_toolbox_conn_mgr::Error> for Error {
   fn from(error: sqlx_toolbox_conn_mgr::Error) -> Self {
      match error {
         sqlx_toolbox_conn_mgr::Error::Sqlx(e) => Error::Sqlx(e),
         other => Error::ConnectionManager(other),
      }
   }
}
