mod common;

use common::{create_test_db, ids, seed_posts};
use serde_json::json;
use sqlx_toolbox_query::{Error, SortDirection};

#[tokio::test]
async fn to_sql_renders_portable_placeholders() {
   let db = create_test_db().await;

   let (sql, values) = db
      .posts()
      .filter_by("category", "tech")
      .filter("score >= ? OR title = '?'", vec![json!(50)])
      .order_by("score", SortDirection::Desc)
      .order_by("id", SortDirection::Asc)
      .limit(10)
      .offset(20)
      .to_sql()
      .unwrap();

   assert_eq!(
      sql,
      r#"SELECT * FROM "posts" WHERE "category" = $1 AND (score >= $2 OR title = '?') ORDER BY "score" DESC, "id" ASC LIMIT 10 OFFSET 20"#
   );
   assert_eq!(values, vec![json!("tech"), json!(50)]);

   db.engine.close().await;
}

#[tokio::test]
async fn offset_without_limit_is_unbounded_on_sqlite() {
   let db = create_test_db().await;

   let (sql, _) = db.posts().offset(5).to_sql().unwrap();
   assert_eq!(sql, r#"SELECT * FROM "posts" LIMIT -1 OFFSET 5"#);

   db.engine.close().await;
}

#[tokio::test]
async fn invalid_identifiers_are_rejected_before_execution() {
   let db = create_test_db().await;

   let err = db
      .posts()
      .order_by("id; DROP TABLE posts", SortDirection::Asc)
      .all()
      .await
      .unwrap_err();
   assert!(matches!(err, Error::InvalidColumnName { .. }));

   let err = db
      .posts()
      .filter_by("bad column", 1)
      .to_sql()
      .unwrap_err();
   assert!(matches!(err, Error::InvalidColumnName { .. }));

   db.engine.close().await;
}

#[tokio::test]
async fn placeholder_count_must_match_values() {
   let db = create_test_db().await;

   let err = db
      .posts()
      .filter("score > ? AND score < ?", vec![json!(1)])
      .to_sql()
      .unwrap_err();
   assert!(matches!(
      err,
      Error::PlaceholderMismatch {
         placeholders: 2,
         values: 1,
         ..
      }
   ));

   db.engine.close().await;
}

#[tokio::test]
async fn all_and_first() {
   let db = create_test_db().await;
   seed_posts(&db, 5).await;

   let all = db
      .posts()
      .order_by("id", SortDirection::Desc)
      .all()
      .await
      .unwrap();
   assert_eq!(ids(&all), vec![5, 4, 3, 2, 1]);

   let first = db
      .posts()
      .filter_by("category", "odd")
      .order_by("score", SortDirection::Desc)
      .first()
      .await
      .unwrap()
      .unwrap();
   assert_eq!(first.id, 5);
   assert_eq!(first.title, "Post 5");
   assert_eq!(first.score, 50);

   let none = db.posts().filter_by("category", "none").first().await.unwrap();
   assert!(none.is_none());

   db.engine.close().await;
}

#[tokio::test]
async fn first_or_404_reports_not_found() {
   let db = create_test_db().await;
   seed_posts(&db, 2).await;

   let found = db.posts().filter_by("id", 2).first_or_404(None).await.unwrap();
   assert_eq!(found.id, 2);

   let err = db
      .posts()
      .filter_by("id", 99)
      .first_or_404(Some("post not found"))
      .await
      .unwrap_err();
   assert_eq!(err.status_code(), 404);
   assert_eq!(err.to_string(), "post not found");

   let err = db
      .posts()
      .filter_by("id", 99)
      .first_or_404(None)
      .await
      .unwrap_err();
   assert!(err.to_string().contains("posts"));

   db.engine.close().await;
}

#[tokio::test]
async fn one_or_none_rejects_multiple_rows() {
   let db = create_test_db().await;
   seed_posts(&db, 4).await;

   assert!(db.posts().filter_by("id", 10).one_or_none().await.unwrap().is_none());

   let one = db.posts().filter_by("id", 3).one_or_none().await.unwrap();
   assert_eq!(one.map(|p| p.id), Some(3));

   let err = db
      .posts()
      .filter_by("category", "even")
      .one_or_none()
      .await
      .unwrap_err();
   assert!(matches!(err, Error::MultipleRowsReturned(2)));

   db.engine.close().await;
}

#[tokio::test]
async fn count_ignores_ordering_and_honours_slicing() {
   let db = create_test_db().await;
   seed_posts(&db, 12).await;

   let base = db.posts().order_by("score", SortDirection::Desc);
   assert_eq!(base.count().await.unwrap(), 12);
   assert_eq!(base.clone().limit(5).count().await.unwrap(), 5);
   assert_eq!(base.clone().offset(10).count().await.unwrap(), 2);
   assert_eq!(
      base
         .filter("category = ?", vec![json!("odd")])
         .count()
         .await
         .unwrap(),
      6
   );

   db.engine.close().await;
}

#[tokio::test]
async fn null_and_json_values_bind() {
   let db = create_test_db().await;
   seed_posts(&db, 3).await;

   // NULL never equals anything, so nothing matches
   let rows = db.posts().filter_by("title", json!(null)).all().await.unwrap();
   assert!(rows.is_empty());

   let rows = db
      .posts()
      .filter("title IN (?, ?)", vec![json!("Post 1"), json!("Post 3")])
      .order_by("id", SortDirection::Asc)
      .all()
      .await
      .unwrap();
   assert_eq!(ids(&rows), vec![1, 3]);

   db.engine.close().await;
}

#[tokio::test]
async fn queries_see_the_sessions_uncommitted_writes() {
   let db = create_test_db().await;
   seed_posts(&db, 2).await;

   db.session
      .execute(
         sqlx::query("INSERT INTO posts (title, category, score) VALUES ($1, $2, $3)")
            .bind("Draft")
            .bind("odd")
            .bind(0_i64),
      )
      .await
      .unwrap();

   assert_eq!(db.posts().count().await.unwrap(), 3);

   db.session.rollback().await.unwrap();
   assert_eq!(db.posts().count().await.unwrap(), 2);

   db.engine.close().await;
}

#[tokio::test]
async fn statement_failures_keep_their_database_code() {
   let db = create_test_db().await;
   seed_posts(&db, 3).await;

   db.session
      .execute(sqlx::query("DROP TABLE posts"))
      .await
      .unwrap();
   db.session.commit().await.unwrap();

   let err = db.posts().all().await.unwrap_err();
   assert!(matches!(err, Error::Sqlx(_)), "{:?}", err);
   assert!(err.error_code().starts_with("DATABASE_"), "{}", err.error_code());
   assert_eq!(err.status_code(), 500);

   let err = db.posts().count().await.unwrap_err();
   assert!(err.error_code().starts_with("DATABASE_"), "{}", err.error_code());

   db.engine.close().await;
}
