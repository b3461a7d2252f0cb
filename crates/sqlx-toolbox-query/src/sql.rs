//! SQL text helpers: identifier validation and quoting, and placeholder
//! numbering that skips string literals, quoted identifiers and comments.

use std::fmt::Write;

use crate::Error;

/// Validate that an identifier is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain column
/// names, qualified names (e.g., `table.column`), and underscored identifiers.
pub(crate) fn validate_identifier(name: &str) -> Result<(), Error> {
   let invalid = || Error::InvalidColumnName {
      name: name.to_string(),
   };

   let mut chars = name.chars();
   let first = chars.next().ok_or_else(invalid)?;
   if !first.is_ascii_alphabetic() && first != '_' {
      return Err(invalid());
   }

   if chars.any(|ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.') {
      return Err(invalid());
   }

   Ok(())
}

/// Quote an identifier with double quotes, quoting each dotted part
/// separately so `posts.id` becomes `"posts"."id"`.
///
/// Any embedded double quotes are doubled per SQL standard (`"` → `""`).
pub(crate) fn quote_identifier(name: &str) -> String {
   name
      .split('.')
      .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
      .collect::<Vec<_>>()
      .join(".")
}

/// Advance the scanner index past a quoted literal or identifier.
///
/// `quote` is the opening quote character (`'` or `"`). The scanner handles
/// SQL-standard doubled-quote escaping (`''` or `""`).
fn skip_quoted(bytes: &[u8], len: usize, i: usize, quote: u8) -> usize {
   let mut j = i + 1;
   while j < len {
      if bytes[j] == quote {
         // Doubled quote is an escape; skip both and continue
         if j + 1 < len && bytes[j + 1] == quote {
            j += 2;
            continue;
         }
         return j;
      }
      j += 1;
   }
   j // unterminated, return end
}

/// Advance the scanner index past a `--` line comment (until newline or end).
fn skip_line_comment(bytes: &[u8], len: usize, i: usize) -> usize {
   let mut j = i + 2;
   while j < len && bytes[j] != b'\n' {
      j += 1;
   }
   j
}

/// Advance the scanner index past a `/* … */` block comment.
fn skip_block_comment(bytes: &[u8], len: usize, i: usize) -> usize {
   let mut j = i + 2;
   while j + 1 < len {
      if bytes[j] == b'*' && bytes[j + 1] == b'/' {
         return j + 1;
      }
      j += 1;
   }
   len.saturating_sub(1)
}

/// Rewrite `?` placeholders to `$N`, numbering from `first`.
///
/// SQLite accepts both styles but PostgreSQL only understands `$N`, so the
/// builder always emits `$N`. Question marks inside string literals, quoted
/// identifiers and comments are left alone.
///
/// Returns the rewritten SQL and the number of placeholders found.
pub(crate) fn number_placeholders(sql: &str, first: usize) -> (String, usize) {
   let bytes = sql.as_bytes();
   let len = bytes.len();
   let mut out = String::with_capacity(len + 8);
   let mut next = first;
   let mut copied = 0;
   let mut i = 0;

   while i < len {
      match bytes[i] {
         b'\'' => i = skip_quoted(bytes, len, i, b'\''),
         b'"' => i = skip_quoted(bytes, len, i, b'"'),
         b'-' if i + 1 < len && bytes[i + 1] == b'-' => i = skip_line_comment(bytes, len, i),
         b'/' if i + 1 < len && bytes[i + 1] == b'*' => i = skip_block_comment(bytes, len, i),
         b'?' => {
            out.push_str(&sql[copied..i]);
            let _ = write!(out, "${}", next);
            next += 1;
            copied = i + 1;
         }
         _ => {}
      }
      i += 1;
   }

   out.push_str(&sql[copied.min(len)..]);
   (out, next - first)
}
