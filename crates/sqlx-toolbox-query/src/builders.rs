//! Query builder bound to a session

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::Any;
use sqlx::Row;
use sqlx::any::AnyArguments;
use sqlx_toolbox_conn_mgr::{DatabaseType, Session};
use tracing::trace;

use crate::model::Model;
use crate::pagination::{Pagination, RequestArgs, resolve_page_args};
use crate::sql::{number_placeholders, quote_identifier, validate_identifier};
use crate::{Error, Result};

/// Sort direction for an ORDER BY column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   Asc,
   /// Descending order (largest first)
   Desc,
}

impl SortDirection {
   fn as_sql(self) -> &'static str {
      match self {
         SortDirection::Asc => "ASC",
         SortDirection::Desc => "DESC",
      }
   }
}

#[derive(Debug, Clone)]
enum Filter {
   /// Caller-written condition with `?` placeholders
   Condition { sql: String, values: Vec<JsonValue> },
   /// `column = value`
   Equals { column: String, value: JsonValue },
}

/// SELECT query over a model's table, executed on a session.
///
/// The builder is immutable in spirit: every method consumes and returns
/// it, and clones are cheap enough to branch a base query into several
/// variants (which is what pagination does).
///
/// Filters use `?` placeholders; they are renumbered to `$N` when the SQL
/// is rendered, so the same query runs on SQLite and PostgreSQL.
pub struct Query<M> {
   session: Arc<Session>,
   filters: Vec<Filter>,
   order_by: Vec<(String, SortDirection)>,
   limit: Option<i64>,
   offset: Option<i64>,
   _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Query<M> {
   fn clone(&self) -> Self {
      Self {
         session: Arc::clone(&self.session),
         filters: self.filters.clone(),
         order_by: self.order_by.clone(),
         limit: self.limit,
         offset: self.offset,
         _model: PhantomData,
      }
   }
}

impl<M> fmt::Debug for Query<M> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("Query")
         .field("session", &self.session.id())
         .field("filters", &self.filters)
         .field("order_by", &self.order_by)
         .field("limit", &self.limit)
         .field("offset", &self.offset)
         .finish()
   }
}

impl<M: Model> Query<M> {
   /// Start an unfiltered query over `M`'s table.
   pub fn new(session: Arc<Session>) -> Self {
      Self {
         session,
         filters: Vec::new(),
         order_by: Vec::new(),
         limit: None,
         offset: None,
         _model: PhantomData,
      }
   }

   pub fn session(&self) -> &Arc<Session> {
      &self.session
   }

   /// Add a WHERE condition with `?` placeholders. Conditions are ANDed.
   pub fn filter(mut self, condition: impl Into<String>, values: Vec<JsonValue>) -> Self {
      self.filters.push(Filter::Condition {
         sql: condition.into(),
         values,
      });
      self
   }

   /// Add a `column = value` condition.
   pub fn filter_by(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
      self.filters.push(Filter::Equals {
         column: column.into(),
         value: value.into(),
      });
      self
   }

   /// Append an ORDER BY column.
   pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
      self.order_by.push((column.into(), direction));
      self
   }

   /// Drop every ORDER BY column.
   pub fn clear_order_by(mut self) -> Self {
      self.order_by.clear();
      self
   }

   /// Replace the row limit.
   pub fn limit(mut self, limit: i64) -> Self {
      self.limit = Some(limit);
      self
   }

   /// Replace the row offset.
   pub fn offset(mut self, offset: i64) -> Self {
      self.offset = Some(offset);
      self
   }

   /// Render the SELECT statement and its bind values for the session's
   /// backend.
   pub fn to_sql(&self) -> Result<(String, Vec<JsonValue>)> {
      self.render(self.database_type())
   }

   /// Execute the query and return all matching rows
   pub async fn all(&self) -> Result<Vec<M>> {
      let (sql, values) = self.to_sql()?;
      trace!(session = %self.session.id(), sql = %sql, "fetching rows");

      let rows = self.session.fetch_all(build_query(&sql, values)).await?;
      let models = rows
         .iter()
         .map(|row| M::from_row(row))
         .collect::<std::result::Result<Vec<M>, sqlx::Error>>()?;
      Ok(models)
   }

   /// First row in query order, if any.
   pub async fn first(&self) -> Result<Option<M>> {
      let mut rows = self.clone().limit(1).all().await?;
      Ok(if rows.is_empty() {
         None
      } else {
         Some(rows.swap_remove(0))
      })
   }

   /// First row, or [`Error::NotFound`] (HTTP 404) when there is none.
   pub async fn first_or_404(&self, message: Option<&str>) -> Result<M> {
      self.first().await?.ok_or_else(|| {
         Error::NotFound(message.map_or_else(
            || format!("No {} row matches the query", M::TABLE_NAME),
            str::to_string,
         ))
      })
   }

   /// Zero or one row; more than one is an error.
   pub async fn one_or_none(&self) -> Result<Option<M>> {
      // Fetch up to 2 rows; that is enough to know if there are more than 1
      let mut rows = self.clone().limit(2).all().await?;
      match rows.len() {
         0 => Ok(None),
         1 => Ok(rows.pop()),
         count => Err(Error::MultipleRowsReturned(count)),
      }
   }

   /// Number of rows the query yields, honouring any limit and offset.
   pub async fn count(&self) -> Result<i64> {
      let (select, values) = self.clone().clear_order_by().to_sql()?;
      let sql = format!("SELECT COUNT(*) AS total FROM ({}) AS counted", select);
      trace!(session = %self.session.id(), sql = %sql, "counting rows");

      let row = self
         .session
         .fetch_optional(build_query(&sql, values))
         .await?
         .ok_or(sqlx::Error::RowNotFound)?;
      Ok(row.try_get::<i64, _>("total")?)
   }

   /// Paginate without request arguments.
   ///
   /// Missing values default to page 1 and 20 rows per page. With `strict`
   /// off, a page below 1 falls back to 1 and a negative page size to 20;
   /// with `strict` on those are [`Error::InvalidPageArgument`], and a page
   /// past the end is [`Error::EmptyPage`].
   pub async fn paginate(
      &self,
      page: Option<i64>,
      per_page: Option<i64>,
      strict: bool,
   ) -> Result<Pagination<M>> {
      self.paginate_inner(None, page, per_page, strict).await
   }

   /// Paginate, reading `page` / `per_page` from request query arguments
   /// when they are not given explicitly.
   pub async fn paginate_with_args(
      &self,
      args: &RequestArgs,
      page: Option<i64>,
      per_page: Option<i64>,
      strict: bool,
   ) -> Result<Pagination<M>> {
      self.paginate_inner(Some(args), page, per_page, strict).await
   }

   async fn paginate_inner(
      &self,
      args: Option<&RequestArgs>,
      page: Option<i64>,
      per_page: Option<i64>,
      strict: bool,
   ) -> Result<Pagination<M>> {
      let resolved = resolve_page_args(args, page, per_page, strict)?;
      let offset = (resolved.page - 1)
         .checked_mul(resolved.per_page)
         .ok_or(Error::InvalidPageArgument {
            message: "Page value is out of range",
         })?;

      let items = self
         .clone()
         .limit(resolved.per_page)
         .offset(offset)
         .all()
         .await?;

      if items.is_empty() && resolved.page != 1 && strict {
         return Err(Error::EmptyPage);
      }

      let total = self.clone().clear_order_by().count().await?;

      Ok(Pagination::new(
         self.clone(),
         resolved.page,
         resolved.per_page,
         total,
         items,
      ))
   }

   fn database_type(&self) -> DatabaseType {
      self.session.engine().database_type()
   }

   fn render(&self, database_type: DatabaseType) -> Result<(String, Vec<JsonValue>)> {
      validate_identifier(M::TABLE_NAME)?;

      let mut sql = format!("SELECT * FROM {}", quote_identifier(M::TABLE_NAME));
      let mut values = Vec::new();
      let mut conditions = Vec::with_capacity(self.filters.len());

      for filter in &self.filters {
         match filter {
            Filter::Condition { sql: condition, values: bound } => {
               let (numbered, placeholders) = number_placeholders(condition, values.len() + 1);
               if placeholders != bound.len() {
                  return Err(Error::PlaceholderMismatch {
                     condition: condition.clone(),
                     placeholders,
                     values: bound.len(),
                  });
               }
               conditions.push(format!("({})", numbered));
               values.extend(bound.iter().cloned());
            }
            Filter::Equals { column, value } => {
               validate_identifier(column)?;
               conditions.push(format!(
                  "{} = ${}",
                  quote_identifier(column),
                  values.len() + 1
               ));
               values.push(value.clone());
            }
         }
      }

      if !conditions.is_empty() {
         sql.push_str(" WHERE ");
         sql.push_str(&conditions.join(" AND "));
      }

      if !self.order_by.is_empty() {
         let mut parts = Vec::with_capacity(self.order_by.len());
         for (column, direction) in &self.order_by {
            validate_identifier(column)?;
            parts.push(format!("{} {}", quote_identifier(column), direction.as_sql()));
         }
         sql.push_str(" ORDER BY ");
         sql.push_str(&parts.join(", "));
      }

      match (self.limit, self.offset) {
         (Some(limit), _) => sql.push_str(&format!(" LIMIT {}", limit.max(0))),
         // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
         (None, Some(_)) if database_type == DatabaseType::Sqlite3 => sql.push_str(" LIMIT -1"),
         (None, _) => {}
      }
      if let Some(offset) = self.offset {
         sql.push_str(&format!(" OFFSET {}", offset.max(0)));
      }

      Ok((sql, values))
   }
}

fn build_query<'q>(sql: &'q str, values: Vec<JsonValue>) -> sqlx::query::Query<'q, Any, AnyArguments<'q>> {
   let mut q = sqlx::query(sql);
   for value in values {
      q = bind_value(q, value);
   }
   q
}

/// Helper function to bind a JSON value to a SQLx query
pub(crate) fn bind_value<'a>(
   query: sqlx::query::Query<'a, Any, AnyArguments<'a>>,
   value: JsonValue,
) -> sqlx::query::Query<'a, Any, AnyArguments<'a>> {
   match value {
      JsonValue::Null => query.bind(None::<String>),
      JsonValue::Bool(flag) => query.bind(flag),
      JsonValue::String(text) => query.bind(text),
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64 when possible
         if let Some(int_val) = number.as_i64() {
            query.bind(int_val)
         } else if let Some(uint_val) = number.as_u64() {
            // Value too large for i64, use f64 (will lose precision)
            query.bind(uint_val as f64)
         } else {
            query.bind(number.as_f64().unwrap_or_default())
         }
      }
      // Arrays and objects are stored as their JSON text
      other => query.bind(other.to_string()),
   }
}
