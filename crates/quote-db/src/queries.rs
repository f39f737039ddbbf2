use crate::Database;
use crate::models::{AuthorRow, ExtendedAuthorRow, LineRow, LogRow, QuoteRow, SessionRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        name: &str,
        color: &str,
        pass_hash: &str,
        perms: u32,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, color, pass, perms) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, name, color, pass_hash, perms],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, "SELECT id, name, color, picture, pass, perms, created_at FROM users WHERE id = ?1", id)
        })
    }

    pub fn get_user_by_name(&self, name: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, "SELECT id, name, color, picture, pass, perms, created_at FROM users WHERE name = ?1", name)
        })
    }

    pub fn get_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, color, picture, pass, perms, created_at FROM users ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        self.count("SELECT COUNT(id) FROM users")
    }

    pub fn update_user(
        &self,
        id: &str,
        name: &str,
        color: &str,
        picture: &str,
        perms: u32,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET name = ?2, color = ?3, picture = ?4, perms = ?5 WHERE id = ?1",
                rusqlite::params![id, name, color, picture, perms],
            )?;
            Ok(())
        })
    }

    pub fn update_user_password(&self, id: &str, pass_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET pass = ?2 WHERE id = ?1",
                rusqlite::params![id, pass_hash],
            )?;
            Ok(())
        })
    }

    pub fn delete_user(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Sessions --

    pub fn create_session(
        &self,
        id: &str,
        token: &str,
        user_id: &str,
        issued: i64,
        expiry: i64,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, token, user_id, issued, expiry, last_access)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?4)",
                rusqlite::params![id, token, user_id, issued, expiry],
            )?;
            Ok(())
        })
    }

    pub fn get_session_by_token(&self, token: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, token, user_id, issued, expiry, last_access FROM sessions WHERE token = ?1",
            )?;
            let row = stmt
                .query_row([token], |row| {
                    Ok(SessionRow {
                        id: row.get(0)?,
                        token: row.get(1)?,
                        user_id: row.get(2)?,
                        issued: row.get(3)?,
                        expiry: row.get(4)?,
                        last_access: row.get(5)?,
                    })
                })
                .optional()?;
            Ok(row)
        })
    }

    /// Sliding expiry: push the window forward on every authenticated hit.
    pub fn refresh_session(&self, id: &str, expiry: i64, last_access: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE sessions SET expiry = ?2, last_access = ?3 WHERE id = ?1",
                rusqlite::params![id, expiry, last_access],
            )?;
            Ok(())
        })
    }

    pub fn delete_session_by_token(&self, token: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            Ok(())
        })
    }

    pub fn delete_sessions_for_user(&self, user_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE user_id = ?1", [user_id])?;
            Ok(())
        })
    }

    // -- Authors --

    pub fn create_author(&self, id: &str, name: &str, obfname: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO authors (id, name, obfname) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, name, obfname],
            )?;
            Ok(())
        })
    }

    pub fn get_author_by_id(&self, id: &str) -> Result<Option<AuthorRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, obfname FROM authors WHERE id = ?1")?;
            let row = stmt
                .query_row([id], |row| {
                    Ok(AuthorRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        obfname: row.get(2)?,
                    })
                })
                .optional()?;
            Ok(row)
        })
    }

    /// Authors with derived counts: distinct quotes spoken in and total lines.
    pub fn get_authors_extended(&self) -> Result<Vec<ExtendedAuthorRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT authors.id, authors.name, authors.obfname,
                        COUNT(DISTINCT lines.quote_id) AS quotecount,
                        COUNT(lines.id) AS linecount
                 FROM authors LEFT JOIN lines ON authors.id = lines.author_id
                 GROUP BY authors.id, authors.name, authors.obfname
                 ORDER BY authors.created_at",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ExtendedAuthorRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        obfname: row.get(2)?,
                        quotecount: row.get(3)?,
                        linecount: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_author(&self, id: &str, name: &str, obfname: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE authors SET name = ?2, obfname = ?3 WHERE id = ?1",
                rusqlite::params![id, name, obfname],
            )?;
            Ok(())
        })
    }

    pub fn delete_author(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM authors WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn count_authors(&self) -> Result<i64> {
        self.count("SELECT COUNT(id) FROM authors")
    }

    /// Authors that appear on at least one quote line.
    pub fn count_quoted_authors(&self) -> Result<i64> {
        self.count("SELECT COUNT(DISTINCT author_id) FROM lines")
    }

    pub fn count_lines_for_author(&self, id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(id) FROM lines WHERE author_id = ?1",
                [id],
                |row| row.get(0),
            )?;
            Ok(n)
        })
    }

    // -- Quotes --

    pub fn insert_quote(
        &self,
        id: &str,
        context: Option<&str>,
        clearance: i64,
        likes: i64,
        timestamp: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO quotes (id, context, clearance, likes, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, context, clearance, likes, timestamp],
            )?;
            Ok(())
        })
    }

    pub fn insert_line(
        &self,
        id: &str,
        quote_id: &str,
        author_id: &str,
        position: i64,
        content: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO lines (id, quote_id, author_id, position, content)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, quote_id, author_id, position, content],
            )?;
            Ok(())
        })
    }

    pub fn count_quotes(&self) -> Result<i64> {
        self.count("SELECT COUNT(id) FROM quotes")
    }

    /// Quotes stamped at or after `cutoff` ("YYYY-MM-DD HH:MM:SS", UTC —
    /// the format the timestamp column stores, so string comparison works).
    pub fn count_quotes_since(&self, cutoff: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(id) FROM quotes WHERE timestamp >= ?1",
                [cutoff],
                |row| row.get(0),
            )?;
            Ok(n)
        })
    }

    pub fn random_public_quote(&self) -> Result<Option<QuoteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, context, clearance, likes, timestamp FROM quotes
                 WHERE clearance = 0 ORDER BY RANDOM() LIMIT 1",
            )?;
            let row = stmt
                .query_row([], |row| {
                    Ok(QuoteRow {
                        id: row.get(0)?,
                        context: row.get(1)?,
                        clearance: row.get(2)?,
                        likes: row.get(3)?,
                        timestamp: row.get(4)?,
                    })
                })
                .optional()?;
            Ok(row)
        })
    }

    /// Lines of one quote joined with their authors, in reading order.
    pub fn get_lines_for_quote(&self, quote_id: &str) -> Result<Vec<LineRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.quote_id, l.author_id, a.name, a.obfname, l.position, l.content
                 FROM lines l JOIN authors a ON l.author_id = a.id
                 WHERE l.quote_id = ?1
                 ORDER BY l.position",
            )?;
            let rows = stmt
                .query_map([quote_id], |row| {
                    Ok(LineRow {
                        id: row.get(0)?,
                        quote_id: row.get(1)?,
                        author_id: row.get(2)?,
                        author_name: row.get(3)?,
                        author_obfname: row.get(4)?,
                        position: row.get(5)?,
                        content: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Logs --

    pub fn insert_log(
        &self,
        id: &str,
        timestamp: i64,
        actor: &str,
        subject: &str,
        action: &str,
        details: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO logs (id, timestamp, actor, subject, action, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, timestamp, actor, subject, action, details],
            )?;
            Ok(())
        })
    }

    /// Newest first; `offset` implements 1-based page numbering upstream.
    pub fn get_logs(&self, limit: u32, offset: u32) -> Result<Vec<LogRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, actor, subject, action, details FROM logs
                 ORDER BY timestamp DESC, id DESC LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![limit, offset], |row| {
                    Ok(LogRow {
                        id: row.get(0)?,
                        timestamp: row.get(1)?,
                        actor: row.get(2)?,
                        subject: row.get(3)?,
                        action: row.get(4)?,
                        details: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn count(&self, sql: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n)
        })
    }
}

fn query_user(conn: &Connection, sql: &str, key: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let row = stmt.query_row([key], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &rusqlite::Row) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        picture: row.get(3)?,
        pass: row.get(4)?,
        perms: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "admin", "28166f", "$argon2$stub", 1)
            .unwrap();
        db.create_author("a1", "Ada", "Raven").unwrap();
        db.create_author("a2", "Bob", "Sparrow").unwrap();
        db.insert_quote("q1", None, 0, 3, "2026-01-05 10:00:00").unwrap();
        db.insert_quote("q2", Some("standup"), 128, 0, "2026-02-01 09:30:00")
            .unwrap();
        db.insert_line("l1", "q1", "a1", 0, "first").unwrap();
        db.insert_line("l2", "q1", "a1", 1, "second").unwrap();
        db.insert_line("l3", "q2", "a1", 0, "third").unwrap();
        db
    }

    #[test]
    fn extended_authors_carry_join_counts() {
        let db = seeded();
        let authors = db.get_authors_extended().unwrap();
        assert_eq!(authors.len(), 2);

        let ada = authors.iter().find(|a| a.id == "a1").unwrap();
        assert_eq!(ada.quotecount, 2);
        assert_eq!(ada.linecount, 3);

        let bob = authors.iter().find(|a| a.id == "a2").unwrap();
        assert_eq!(bob.quotecount, 0);
        assert_eq!(bob.linecount, 0);
    }

    #[test]
    fn random_public_quote_skips_cleared_ones() {
        let db = seeded();
        for _ in 0..8 {
            let q = db.random_public_quote().unwrap().unwrap();
            assert_eq!(q.id, "q1");
            assert_eq!(q.clearance, 0);
        }
    }

    #[test]
    fn quote_counts_respect_cutoffs() {
        let db = seeded();
        assert_eq!(db.count_quotes().unwrap(), 2);
        assert_eq!(db.count_quotes_since("2026-01-20 00:00:00").unwrap(), 1);
        assert_eq!(db.count_quotes_since("2027-01-01 00:00:00").unwrap(), 0);
    }

    #[test]
    fn quoted_author_count_is_distinct() {
        let db = seeded();
        assert_eq!(db.count_authors().unwrap(), 2);
        assert_eq!(db.count_quoted_authors().unwrap(), 1);
    }

    #[test]
    fn lines_come_back_in_position_order_with_authors() {
        let db = seeded();
        let lines = db.get_lines_for_quote("q1").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].content, "first");
        assert_eq!(lines[1].content, "second");
        assert_eq!(lines[0].author_name, "Ada");
        assert_eq!(lines[0].author_obfname, "Raven");
    }

    #[test]
    fn logs_page_newest_first() {
        let db = seeded();
        for i in 0..5i64 {
            db.insert_log(
                &format!("log{i}"),
                1000 + i,
                "u1",
                "u1",
                "UserPasswordUpdated",
                "\"UserPasswordUpdated\"",
            )
            .unwrap();
        }
        let page = db.get_logs(2, 0).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "log4");
        assert_eq!(page[1].id, "log3");

        let page = db.get_logs(2, 4).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "log0");
    }

    #[test]
    fn deleting_a_user_cascades_sessions() {
        let db = seeded();
        db.create_session("s1", "token-1", "u1", 100, 200).unwrap();
        assert!(db.get_session_by_token("token-1").unwrap().is_some());
        db.delete_user("u1").unwrap();
        assert!(db.get_session_by_token("token-1").unwrap().is_none());
    }
}
