//! Offset pagination.
//!
//! [`Query::paginate`](crate::Query::paginate) slices a query into pages of
//! `per_page` rows and returns a [`Pagination`] holding the current page's
//! items together with the total row count, from which page navigation is
//! derived.
//!
//! # Argument resolution
//!
//! Page and page size may come from the caller, from request query arguments
//! ([`RequestArgs`]), or fall back to [`DEFAULT_PAGE`] and
//! [`DEFAULT_PER_PAGE`]. Unusable values either fall back to those defaults
//! or fail with a 400-class error, depending on the caller's `strict` flag:
//!
//! | input | lenient | strict |
//! |---|---|---|
//! | non-numeric `page` argument | 1 | "Given page does not exist" |
//! | non-numeric `per_page` argument | 20 | "Given per page value does not exist" |
//! | `page < 1` | 1 | "Page value is negative" |
//! | `per_page < 0` | 20 | "Per page value is negative" |
//!
//! # Example
//!
//! ```no_run
//! # use sqlx_toolbox_query::{Model, Query, Result};
//! # async fn list<M: Model>(query: Query<M>) -> Result<()> {
//! let page = query.paginate(Some(2), Some(10), false).await?;
//! println!("page {} of {}", page.page, page.pages());
//! if let Some(next) = page.next_num() {
//!    println!("next page is {}", next);
//! }
//! # Ok(())
//! # }
//! ```

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::builders::Query;
use crate::model::Model;
use crate::{Error, Result};

/// Page used when none is given.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when none is given.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Raw `page` / `per_page` query-string arguments of an inbound request.
///
/// Values are kept as strings so that non-numeric input can be told apart
/// from absent input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RequestArgs {
   pub page: Option<String>,
   pub per_page: Option<String>,
}

impl RequestArgs {
   pub fn new(page: Option<&str>, per_page: Option<&str>) -> Self {
      Self {
         page: page.map(str::to_string),
         per_page: per_page.map(str::to_string),
      }
   }
}

/// Validated page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageArgs {
   pub page: i64,
   pub per_page: i64,
}

/// Resolve page and page size from explicit values, request arguments and
/// defaults. See the [module documentation](self) for the rules.
pub fn resolve_page_args(
   args: Option<&RequestArgs>,
   page: Option<i64>,
   per_page: Option<i64>,
   strict: bool,
) -> Result<PageArgs> {
   let page = match (page, args) {
      (Some(page), _) => page,
      (None, Some(args)) => parse_arg(
         args.page.as_deref(),
         DEFAULT_PAGE,
         strict,
         "Given page does not exist",
      )?,
      (None, None) => DEFAULT_PAGE,
   };

   let per_page = match (per_page, args) {
      (Some(per_page), _) => per_page,
      (None, Some(args)) => parse_arg(
         args.per_page.as_deref(),
         DEFAULT_PER_PAGE,
         strict,
         "Given per page value does not exist",
      )?,
      (None, None) => DEFAULT_PER_PAGE,
   };

   let page = if page < 1 {
      if strict {
         return Err(Error::InvalidPageArgument {
            message: "Page value is negative",
         });
      }
      DEFAULT_PAGE
   } else {
      page
   };

   let per_page = if per_page < 0 {
      if strict {
         return Err(Error::InvalidPageArgument {
            message: "Per page value is negative",
         });
      }
      DEFAULT_PER_PAGE
   } else {
      per_page
   };

   Ok(PageArgs { page, per_page })
}

fn parse_arg(raw: Option<&str>, default: i64, strict: bool, message: &'static str) -> Result<i64> {
   let Some(raw) = raw else {
      return Ok(default);
   };
   match raw.trim().parse::<i64>() {
      Ok(value) => Ok(value),
      Err(_) if strict => Err(Error::InvalidPageArgument { message }),
      Err(_) => Ok(default),
   }
}

/// How many page numbers [`Pagination::iter_pages`] shows around the edges
/// and the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
   pub left_edge: i64,
   pub left_current: i64,
   pub right_current: i64,
   pub right_edge: i64,
}

impl Default for PageWindow {
   fn default() -> Self {
      Self {
         left_edge: 2,
         left_current: 2,
         right_current: 5,
         right_edge: 2,
      }
   }
}

/// `ceil(total / per_page)`, or 0 when `per_page` is 0.
pub fn page_count(total: i64, per_page: i64) -> i64 {
   if per_page <= 0 || total <= 0 {
      0
   } else {
      (total + per_page - 1) / per_page
   }
}

fn page_numbers(page: i64, pages: i64, window: PageWindow) -> Vec<Option<i64>> {
   let mut numbers = Vec::new();
   let mut last = 0;

   for num in 1..=pages {
      let near_left_edge = num <= window.left_edge;
      let near_current = num > page - window.left_current - 1 && num < page + window.right_current;
      let near_right_edge = num > pages - window.right_edge;

      if near_left_edge || near_current || near_right_edge {
         if last + 1 != num {
            numbers.push(None);
         }
         numbers.push(Some(num));
         last = num;
      }
   }

   numbers
}

/// One page of a query's results.
pub struct Pagination<M> {
   /// The unlimited query this page was cut from
   pub query: Query<M>,
   /// Current page number (1-indexed)
   pub page: i64,
   /// Number of items per page
   pub per_page: i64,
   /// Total number of items matching the query
   pub total: i64,
   /// Items on the current page
   pub items: Vec<M>,
}

impl<M> Pagination<M> {
   pub(crate) fn new(query: Query<M>, page: i64, per_page: i64, total: i64, items: Vec<M>) -> Self {
      Self {
         query,
         page,
         per_page,
         total,
         items,
      }
   }

   /// Total number of pages; 0 when the page size is 0.
   pub fn pages(&self) -> i64 {
      page_count(self.total, self.per_page)
   }

   pub fn has_prev(&self) -> bool {
      self.page > 1
   }

   pub fn prev_num(&self) -> Option<i64> {
      self.has_prev().then(|| self.page - 1)
   }

   pub fn has_next(&self) -> bool {
      self.page < self.pages()
   }

   pub fn next_num(&self) -> Option<i64> {
      self.has_next().then(|| self.page + 1)
   }

   /// Page numbers for a pager widget, with `None` marking each gap.
   ///
   /// With the default window and 20 pages, page 1 yields
   /// `1 2 3 4 5 … 19 20`.
   pub fn iter_pages(&self, window: PageWindow) -> impl Iterator<Item = Option<i64>> {
      page_numbers(self.page, self.pages(), window).into_iter()
   }

   pub fn is_empty(&self) -> bool {
      self.items.is_empty()
   }
}

impl<M: Model> Pagination<M> {
   /// Paginate the originating query one page back.
   pub async fn prev(&self, strict: bool) -> Result<Pagination<M>> {
      self
         .query
         .paginate(Some(self.page - 1), Some(self.per_page), strict)
         .await
   }

   /// Paginate the originating query one page forward.
   pub async fn next(&self, strict: bool) -> Result<Pagination<M>> {
      self
         .query
         .paginate(Some(self.page + 1), Some(self.per_page), strict)
         .await
   }
}

impl<M> std::fmt::Debug for Pagination<M> {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("Pagination")
         .field("page", &self.page)
         .field("per_page", &self.per_page)
         .field("total", &self.total)
         .field("items", &self.items.len())
         .finish()
   }
}

impl<M: Serialize> Serialize for Pagination<M> {
   fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
      let mut state = serializer.serialize_struct("Pagination", 9)?;
      state.serialize_field("items", &self.items)?;
      state.serialize_field("page", &self.page)?;
      state.serialize_field("per_page", &self.per_page)?;
      state.serialize_field("total", &self.total)?;
      state.serialize_field("pages", &self.pages())?;
      state.serialize_field("has_prev", &self.has_prev())?;
      state.serialize_field("has_next", &self.has_next())?;
      state.serialize_field("prev_num", &self.prev_num())?;
      state.serialize_field("next_num", &self.next_num())?;
      state.end()
   }
}
