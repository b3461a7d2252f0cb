//! # sqlx-toolbox-query
//!
//! Model descriptions, a portable SELECT builder and offset pagination on
//! top of `sqlx-toolbox-conn-mgr` sessions.
//!
//! - **[`Model`]**: a `FromRow` type plus its table description
//! - **[`Query`]**: filters, ordering, slicing, `all` / `first` / `count`
//! - **[`Pagination`]**: one page of a query plus navigation helpers
//! - **[`resolve_page_args`]**: page / per-page resolution from explicit
//!   values, request arguments and defaults

mod builders;
mod error;
mod model;
pub mod pagination;
mod sql;

pub use builders::{Query, SortDirection};
pub use error::{Error, Result};
pub use model::{Column, ColumnType, Model, TableSchema};
pub use pagination::{
   DEFAULT_PAGE, DEFAULT_PER_PAGE, PageArgs, PageWindow, Pagination, RequestArgs, page_count,
   resolve_page_args,
};
