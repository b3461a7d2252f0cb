//! Alembic configuration.
//!
//! Migrations themselves are applied by alembic; the toolbox only points an
//! existing `alembic.ini` at the current database by rewriting the
//! `sqlalchemy.url` key of its `[alembic]` section.
//!
//! The rewrite is line based. Every other line, comment and section is kept
//! byte for byte, and CRLF files keep their CRLF line endings. A missing key is inserted after the last non-blank line of
//! the section, and a missing section is appended to the file.

use std::io::ErrorKind;
use std::path::Path;

use sqlx_toolbox_conn_mgr::{DATABASE_URL, redact_url};
use tracing::{debug, info};

use crate::toolbox::{NOT_CONNECTED, Toolbox};
use crate::{Error, Result};

/// Section of `alembic.ini` holding the database URL.
pub const ALEMBIC_SECTION: &str = "alembic";

/// Key of the database URL inside [`ALEMBIC_SECTION`].
pub const ALEMBIC_URL_KEY: &str = "sqlalchemy.url";

/// Name of the alembic script directory inside a migrations directory.
pub const ALEMBIC_DIRECTORY: &str = "alembic";

/// Name of the alembic configuration file inside a migrations directory.
pub const ALEMBIC_INI: &str = "alembic.ini";

impl Toolbox {
   /// Point `migrations_directory/alembic.ini` at the current database.
   ///
   /// With `strict`, the directory, its `alembic` subdirectory and the ini
   /// file must all exist. Without it, a missing directory or ini file is
   /// created.
   pub async fn initialize_migrations(
      &self,
      migrations_directory: impl AsRef<Path>,
      strict: bool,
   ) -> Result<()> {
      if !self.is_connected() {
         return Err(Error::configuration(NOT_CONNECTED));
      }
      let directory = migrations_directory.as_ref();
      let ini_path = directory.join(ALEMBIC_INI);

      if strict {
         if !directory.is_dir() {
            return Err(Error::configuration("Migration directory does not exist"));
         }
         if !directory.join(ALEMBIC_DIRECTORY).is_dir() {
            return Err(Error::configuration(
               "Alembic migration directory does not exist",
            ));
         }
         if !ini_path.is_file() {
            return Err(Error::configuration("Alembic ini file does not exist"));
         }
      } else if !directory.is_dir() {
         tokio::fs::create_dir_all(directory).await?;
         debug!(path = %directory.display(), "created migrations directory");
      }

      let url = self.config().require(DATABASE_URL)?;
      configure_alembic(url, &ini_path).await
   }
}

/// Set `sqlalchemy.url` in the `[alembic]` section of the ini file at
/// `ini_path`, creating the file if it does not exist.
pub async fn configure_alembic(database_url: &str, ini_path: &Path) -> Result<()> {
   let contents = match tokio::fs::read_to_string(ini_path).await {
      Ok(contents) => contents,
      Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
      Err(e) => return Err(e.into()),
   };

   let rewritten = set_ini_value(&contents, ALEMBIC_SECTION, ALEMBIC_URL_KEY, database_url);
   tokio::fs::write(ini_path, rewritten).await?;

   info!(
      path = %ini_path.display(),
      url = %redact_url(database_url),
      "alembic configured"
   );
   Ok(())
}

/// Set `key = value` in `[section]` of ini text, keeping all other lines.
pub fn set_ini_value(contents: &str, section: &str, key: &str, value: &str) -> String {
   let assignment = format!("{} = {}", key, value);
   let newline = if contents.contains("\r\n") { "\r\n" } else { "\n" };
   let mut lines: Vec<String> = Vec::new();

   let mut in_section = false;
   let mut section_seen = false;
   let mut replaced = false;
   let mut skipping_continuation = false;
   // Index in `lines` after which a missing key is inserted
   let mut insert_at: Option<usize> = None;

   for line in contents.lines() {
      let trimmed = line.trim();

      if skipping_continuation {
         if !trimmed.is_empty() && line.starts_with(char::is_whitespace) {
            continue;
         }
         skipping_continuation = false;
      }

      if let Some(name) = section_name(trimmed) {
         in_section = name == section;
         if in_section {
            section_seen = true;
            insert_at = Some(lines.len());
         }
         lines.push(line.to_string());
         continue;
      }

      if in_section && !replaced && line_key(line) == Some(key) {
         lines.push(assignment.clone());
         replaced = true;
         skipping_continuation = true;
         continue;
      }

      if in_section && !trimmed.is_empty() {
         insert_at = Some(lines.len());
      }
      lines.push(line.to_string());
   }

   if !replaced {
      match insert_at.filter(|_| section_seen) {
         Some(index) => lines.insert(index + 1, assignment),
         None => {
            if lines.last().is_some_and(|l| !l.trim().is_empty()) {
               lines.push(String::new());
            }
            lines.push(format!("[{}]", section));
            lines.push(assignment);
         }
      }
   }

   let mut output = lines.join(newline);
   output.push_str(newline);
   output
}

fn section_name(trimmed: &str) -> Option<&str> {
   trimmed
      .strip_prefix('[')
      .and_then(|rest| rest.strip_suffix(']'))
      .map(str::trim)
}

fn line_key(line: &str) -> Option<&str> {
   // Indented lines continue the previous value
   if line.starts_with(char::is_whitespace) {
      return None;
   }
   let trimmed = line.trim();
   if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
      return None;
   }
   let end = trimmed.find(['=', ':'])?;
   Some(trimmed[..end].trim())
}
