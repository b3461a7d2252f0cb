#![allow(dead_code)]

use serde::Serialize;
use sqlx_toolbox::{Column, ColumnType, Model, SqliteOptions, Toolbox};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Member {
   pub id: i64,
   pub name: String,
   pub role: String,
}

impl Model for Member {
   const TABLE_NAME: &'static str = "members";

   fn columns() -> Vec<Column> {
      vec![
         Column::new("id", ColumnType::BigInt).primary_key().autoincrement(),
         Column::new("name", ColumnType::Text),
         Column::new("role", ColumnType::Text),
      ]
   }
}

pub fn init_tracing() {
   let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Toolbox connected to `test_db.sqlite3` in a fresh temp directory, with the
/// `members` table created.
pub async fn connect_temp() -> (Toolbox, TempDir) {
   init_tracing();
   let temp_dir = TempDir::new().expect("Failed to create temp directory");

   let mut toolbox = Toolbox::new();
   toolbox.register::<Member>();
   toolbox
      .connect_sqlite(SqliteOptions::new(temp_dir.path(), "test_db"))
      .await
      .expect("Failed to connect test toolbox");
   toolbox
      .initialize_tables()
      .await
      .expect("Failed to create tables");

   (toolbox, temp_dir)
}

/// Seed `count` members on the calling thread's session. Member `n` is named
/// `member-n`; every third member is an admin.
pub async fn seed_members(toolbox: &Toolbox, count: i64) {
   let session = toolbox.session().unwrap();
   for n in 1..=count {
      let role = if n % 3 == 0 { "admin" } else { "user" };
      session
         .execute(
            sqlx::query("INSERT INTO members (name, role) VALUES ($1, $2)")
               .bind(format!("member-{}", n))
               .bind(role),
         )
         .await
         .unwrap();
   }
   session.commit().await.unwrap();
}
