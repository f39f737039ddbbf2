/// Database row types — these map directly to SQLite rows.
/// Distinct from the quote-types wire models to keep the DB layer
/// independent; notably UserRow carries the password hash, which must
/// never reach a wire type.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub picture: String,
    pub pass: String,
    pub perms: u32,
    pub created_at: String,
}

pub struct SessionRow {
    pub id: String,
    pub token: String,
    pub user_id: String,
    pub issued: i64,
    pub expiry: i64,
    pub last_access: i64,
}

pub struct AuthorRow {
    pub id: String,
    pub name: String,
    pub obfname: String,
}

pub struct ExtendedAuthorRow {
    pub id: String,
    pub name: String,
    pub obfname: String,
    pub quotecount: i64,
    pub linecount: i64,
}

pub struct QuoteRow {
    pub id: String,
    pub context: Option<String>,
    pub clearance: i64,
    pub likes: i64,
    pub timestamp: String,
}

/// A quote line joined with its author for rendering.
pub struct LineRow {
    pub id: String,
    pub quote_id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_obfname: String,
    pub position: i64,
    pub content: String,
}

pub struct LogRow {
    pub id: String,
    pub timestamp: i64,
    pub actor: String,
    pub subject: String,
    pub action: String,
    pub details: String,
}
