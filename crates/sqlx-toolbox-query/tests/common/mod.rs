#![allow(dead_code)]

use std::sync::Arc;

use serde::Serialize;
use sqlx_toolbox_conn_mgr::{Engine, Session, SessionFactory};
use sqlx_toolbox_query::{Column, ColumnType, Model, Query};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Post {
   pub id: i64,
   pub title: String,
   pub category: String,
   pub score: i64,
}

impl Model for Post {
   const TABLE_NAME: &'static str = "posts";

   fn columns() -> Vec<Column> {
      vec![
         Column::new("id", ColumnType::BigInt).primary_key().autoincrement(),
         Column::new("title", ColumnType::Text),
         Column::new("category", ColumnType::Text),
         Column::new("score", ColumnType::BigInt),
      ]
   }
}

pub struct TestDb {
   pub engine: Arc<Engine>,
   pub session: Arc<Session>,
   _temp_dir: TempDir,
}

impl TestDb {
   pub fn posts(&self) -> Query<Post> {
      Query::new(Arc::clone(&self.session))
   }
}

pub async fn create_test_db() -> TestDb {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let db_path = temp_dir.path().join("test.sqlite3");
   let url = format!("sqlite://{}?mode=rwc", db_path.display());
   let engine = Engine::connect(&url, None).expect("Failed to create test engine");
   let session = Arc::new(SessionFactory::new(Arc::clone(&engine)).create());

   let ddl = Post::schema()
      .create_table_sql(engine.database_type())
      .unwrap();
   session.execute(sqlx::query(&ddl)).await.unwrap();
   session.commit().await.unwrap();

   TestDb {
      engine,
      session,
      _temp_dir: temp_dir,
   }
}

/// Seed `count` posts. Post `n` has id `n`, category `"even"` or `"odd"`
/// and score `n * 10`.
pub async fn seed_posts(db: &TestDb, count: i64) {
   for n in 1..=count {
      let category = if n % 2 == 0 { "even" } else { "odd" };
      db.session
         .execute(
            sqlx::query("INSERT INTO posts (title, category, score) VALUES ($1, $2, $3)")
               .bind(format!("Post {}", n))
               .bind(category)
               .bind(n * 10),
         )
         .await
         .unwrap();
   }
   db.session.commit().await.unwrap();
}

/// Extract the ids of a list of posts for concise assertions.
pub fn ids(posts: &[Post]) -> Vec<i64> {
   posts.iter().map(|p| p.id).collect()
}
