//! axum integration: pagination arguments from the query string.

use axum::extract::{FromRequestParts, Query as QueryString};
use axum::http::request::Parts;
use sqlx_toolbox_query::{Model, Pagination, Query, RequestArgs};

use crate::{Error, Result};

/// `page` / `per_page` query-string arguments of the current request.
///
/// Values are kept raw; whether a malformed value is an error or falls back
/// to its default is decided by the `strict` flag at pagination time.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use axum::Json;
/// use axum::extract::State;
/// use sqlx_toolbox::{ModelExt, PageQuery, Result, Toolbox};
/// use sqlx_toolbox_query::{Model, Pagination};
///
/// async fn list<M: Model + serde::Serialize>(
///    State(toolbox): State<Arc<Toolbox>>,
///    page: PageQuery,
/// ) -> Result<Json<Pagination<M>>> {
///    let query = M::query(&toolbox)?;
///    Ok(Json(page.paginate(&query, true).await?))
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery(pub RequestArgs);

impl PageQuery {
   /// Paginate `query` using this request's arguments.
   pub async fn paginate<M: Model>(&self, query: &Query<M>, strict: bool) -> Result<Pagination<M>> {
      Ok(query.paginate_with_args(&self.0, None, None, strict).await?)
   }
}

impl<S> FromRequestParts<S> for PageQuery
where
   S: Send + Sync,
{
   type Rejection = Error;

   async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
      let QueryString(args): QueryString<RequestArgs> =
         QueryString::from_request_parts(parts, state)
            .await
            .map_err(|_| {
               Error::Query(sqlx_toolbox_query::Error::InvalidPageArgument {
                  message: "Malformed query string",
               })
            })?;
      Ok(Self(args))
   }
}
