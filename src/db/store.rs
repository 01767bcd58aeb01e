use crate::db::traits::CredentialStore;
use crate::types::{AppError, JournalEntry, Result, User};
use async_trait::async_trait;
use libsql::{Builder, Connection, Database};

/// libsql-backed persistence for users and journal entries.
pub struct JournalStore {
    db: Database,
}

impl JournalStore {
    /// Opens (or creates) a file-based database.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        let store = Self { db };
        store.initialize_schema().await?;

        Ok(store)
    }

    /// Opens an ephemeral in-memory database, used by tests.
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    fn connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        // The UNIQUE constraint on username is what makes registration's
        // check-and-insert atomic; there is no separate existence probe.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                alias TEXT UNIQUE NOT NULL,
                owner_id TEXT REFERENCES users(id),
                created INTEGER NOT NULL,
                updated INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create entries table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_owner ON entries(owner_id)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create entries index: {}", e)))?;

        Ok(())
    }

    // User operations

    /// Lists up to `limit` usernames, newest first.
    pub async fn list_usernames(&self, limit: u32) -> Result<Vec<String>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT username FROM users ORDER BY rowid DESC LIMIT ?",
                [limit as i64],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query users: {}", e)))?;

        let mut usernames = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            usernames.push(row.get(0).map_err(|e| AppError::Database(e.to_string()))?);
        }

        Ok(usernames)
    }

    // Entry operations

    /// Persists a new entry.
    pub async fn insert_entry(&self, entry: &JournalEntry) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "INSERT INTO entries (id, title, content, alias, owner_id, created, updated)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                entry.id.as_str(),
                entry.title.as_str(),
                entry.content.as_str(),
                entry.alias.as_str(),
                entry.owner_id.as_deref(),
                entry.created,
                entry.updated,
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert entry: {}", e)))?;

        Ok(())
    }

    /// All entries owned by a user, ordered by `updated`.
    pub async fn entries_for_owner(&self, owner_id: &str) -> Result<Vec<JournalEntry>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, title, content, alias, owner_id, created, updated
                 FROM entries WHERE owner_id = ? ORDER BY updated ASC, created ASC",
                [owner_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query entries: {}", e)))?;

        let mut entries = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            entries.push(entry_from_row(&row)?);
        }

        Ok(entries)
    }

    /// Looks up an entry by alias alone - the anonymous read path.
    pub async fn find_entry_by_alias(&self, alias: &str) -> Result<Option<JournalEntry>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, title, content, alias, owner_id, created, updated
                 FROM entries WHERE alias = ?",
                [alias],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query entry: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(entry_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Looks up an entry by alias, scoped to its owner.
    pub async fn find_entry_for_owner(
        &self,
        alias: &str,
        owner_id: &str,
    ) -> Result<Option<JournalEntry>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, title, content, alias, owner_id, created, updated
                 FROM entries WHERE alias = ? AND owner_id = ?",
                [alias, owner_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query entry: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(entry_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Applies a partial update to an owner's entry and returns the result.
    ///
    /// `title`/`content` are only written when present; `updated` is always
    /// refreshed. Returns `None` when no entry matched the alias and owner.
    pub async fn update_entry(
        &self,
        alias: &str,
        owner_id: &str,
        title: Option<&str>,
        content: Option<&str>,
        updated: i64,
    ) -> Result<Option<JournalEntry>> {
        let conn = self.connection()?;

        let affected = conn
            .execute(
                "UPDATE entries
                 SET title = COALESCE(?, title),
                     content = COALESCE(?, content),
                     updated = ?
                 WHERE alias = ? AND owner_id = ?",
                (title, content, updated, alias, owner_id),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to update entry: {}", e)))?;

        if affected == 0 {
            return Ok(None);
        }
        self.find_entry_for_owner(alias, owner_id).await
    }

    /// Removes an owner's entry; `false` when nothing matched.
    pub async fn delete_entry(&self, alias: &str, owner_id: &str) -> Result<bool> {
        let conn = self.connection()?;

        let affected = conn
            .execute(
                "DELETE FROM entries WHERE alias = ? AND owner_id = ?",
                [alias, owner_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete entry: {}", e)))?;

        Ok(affected > 0)
    }
}

#[async_trait]
impl CredentialStore for JournalStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, username, password_hash, created_at
                 FROM users WHERE username = ?",
                [username],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, username, password_hash, created_at
                 FROM users WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at)
             VALUES (?, ?, ?, ?)",
            (
                user.id.as_str(),
                user.username.as_str(),
                user.password_hash.as_deref(),
                user.created_at,
            ),
        )
        .await
        .map_err(|e| {
            let message = e.to_string();
            if message.contains("UNIQUE constraint failed") {
                AppError::Duplicate("That username already exists".to_string())
            } else {
                AppError::Database(format!("Failed to create user: {}", message))
            }
        })?;

        Ok(())
    }
}

fn user_from_row(row: &libsql::Row) -> Result<User> {
    Ok(User {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        username: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        password_hash: row
            .get::<Option<String>>(2)
            .map_err(|e| AppError::Database(e.to_string()))?,
        created_at: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
    })
}

fn entry_from_row(row: &libsql::Row) -> Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        title: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        content: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        alias: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        owner_id: row
            .get::<Option<String>>(4)
            .map_err(|e| AppError::Database(e.to_string()))?,
        created: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
        updated: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: Some("$argon2id$stub".to_string()),
            created_at: 0,
        }
    }

    fn entry(id: &str, alias: &str, owner_id: Option<&str>, updated: i64) -> JournalEntry {
        JournalEntry {
            id: id.to_string(),
            title: "Title".to_string(),
            content: "Body".to_string(),
            alias: alias.to_string(),
            owner_id: owner_id.map(str::to_string),
            created: updated,
            updated,
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = JournalStore::new_memory().await.unwrap();

        store.create_user(&user("u-1", "alice")).await.unwrap();
        let err = store.create_user(&user("u-2", "alice")).await.unwrap_err();

        assert!(matches!(err, AppError::Duplicate(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn user_lookup_by_username_and_id() {
        let store = JournalStore::new_memory().await.unwrap();
        store.create_user(&user("u-1", "alice")).await.unwrap();

        let by_name = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, "u-1");

        let by_id = store.find_user_by_id("u-1").await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        assert!(store.find_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn usernames_list_newest_first_with_limit() {
        let store = JournalStore::new_memory().await.unwrap();
        for i in 0..12 {
            store
                .create_user(&user(&format!("u-{}", i), &format!("user{}", i)))
                .await
                .unwrap();
        }

        let names = store.list_usernames(10).await.unwrap();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "user11");
        assert_eq!(names[9], "user2");
    }

    #[tokio::test]
    async fn entries_are_scoped_and_ordered_by_updated() {
        let store = JournalStore::new_memory().await.unwrap();
        store.create_user(&user("u-1", "alice")).await.unwrap();

        store
            .insert_entry(&entry("e-2", "second", Some("u-1"), 200))
            .await
            .unwrap();
        store
            .insert_entry(&entry("e-1", "first", Some("u-1"), 100))
            .await
            .unwrap();
        store
            .insert_entry(&entry("e-3", "loose", None, 50))
            .await
            .unwrap();

        let entries = store.entries_for_owner("u-1").await.unwrap();
        let aliases: Vec<_> = entries.iter().map(|e| e.alias.as_str()).collect();
        assert_eq!(aliases, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn anonymous_entries_resolve_by_alias_alone() {
        let store = JournalStore::new_memory().await.unwrap();
        store
            .insert_entry(&entry("e-1", "loose", None, 1))
            .await
            .unwrap();

        let found = store.find_entry_by_alias("loose").await.unwrap().unwrap();
        assert_eq!(found.owner_id, None);
        assert!(store.find_entry_by_alias("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_is_partial_and_owner_scoped() {
        let store = JournalStore::new_memory().await.unwrap();
        store.create_user(&user("u-1", "alice")).await.unwrap();
        store
            .insert_entry(&entry("e-1", "mine", Some("u-1"), 100))
            .await
            .unwrap();

        // Content-only update keeps the title.
        let updated = store
            .update_entry("mine", "u-1", None, Some("New body"), 200)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Title");
        assert_eq!(updated.content, "New body");
        assert_eq!(updated.updated, 200);

        // A different owner never matches.
        assert!(store
            .update_entry("mine", "u-2", Some("Hijack"), None, 300)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chronicle.db");
        let path = path.to_str().unwrap();

        {
            let store = JournalStore::new_local(path).await.unwrap();
            store.create_user(&user("u-1", "alice")).await.unwrap();
        }

        let reopened = JournalStore::new_local(path).await.unwrap();
        let found = reopened.find_user_by_username("alice").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_matched() {
        let store = JournalStore::new_memory().await.unwrap();
        store.create_user(&user("u-1", "alice")).await.unwrap();
        store
            .insert_entry(&entry("e-1", "mine", Some("u-1"), 1))
            .await
            .unwrap();

        assert!(!store.delete_entry("mine", "u-2").await.unwrap());
        assert!(store.delete_entry("mine", "u-1").await.unwrap());
        assert!(!store.delete_entry("mine", "u-1").await.unwrap());
    }
}
