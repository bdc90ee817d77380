// ==========================================
// Civic Escalation - Post Repository
// ==========================================
// Serves the `GetPostByExternalId` collaborator contract. The outgoing
// request is joined from user_request, never stored on the post row.
// ==========================================

use crate::domain::post::{NewPost, Post};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const POST_SELECT: &str = r#"
    SELECT p.id, p.alternative_id, p.title, p.body, p.upvotes, p.private,
           p.confirmed_for_deployment, p.confirmed_for_insights,
           p.original_author_id, p.created_at, p.updated_at,
           ur.id
    FROM post p
    LEFT JOIN user_request ur ON ur.request_object_id = p.id
"#;

pub struct PostRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PostRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Publish a post (authoring itself belongs to the posts collaborator)
    pub fn insert(&self, new_post: &NewPost) -> RepositoryResult<Post> {
        let conn = self.get_conn()?;
        let alternative_id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        conn.execute(
            r#"
            INSERT INTO post (
                alternative_id, title, body, private, original_author_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                alternative_id,
                new_post.title,
                new_post.body,
                new_post.private,
                new_post.original_author_id,
                now,
                now,
            ],
        )?;

        Ok(Post {
            id: conn.last_insert_rowid(),
            alternative_id,
            title: new_post.title.clone(),
            body: new_post.body.clone(),
            upvotes: 0,
            private: new_post.private,
            confirmed_for_deployment: false,
            confirmed_for_insights: false,
            original_author_id: new_post.original_author_id,
            created_at: now,
            updated_at: now,
            outgoing_request: None,
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Post>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE p.id = ?1", POST_SELECT);
        let post = conn.query_row(&sql, params![id], map_row).optional()?;
        Ok(post)
    }

    pub fn find_by_alternative_id(&self, alternative_id: &str) -> RepositoryResult<Option<Post>> {
        let conn = self.get_conn()?;
        Self::find_by_alternative_id_tx(&conn, alternative_id)
    }

    /// Lookup by external id inside the caller's transaction
    pub fn find_by_alternative_id_tx(
        conn: &Connection,
        alternative_id: &str,
    ) -> RepositoryResult<Option<Post>> {
        let sql = format!("{} WHERE p.alternative_id = ?1", POST_SELECT);
        let post = conn
            .query_row(&sql, params![alternative_id], map_row)
            .optional()?;
        Ok(post)
    }

    /// Posts authored by one user, newest first
    pub fn find_by_author(&self, author_id: i64) -> RepositoryResult<Vec<Post>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE p.original_author_id = ?1 ORDER BY p.created_at DESC, p.id DESC",
            POST_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let posts = stmt
            .query_map(params![author_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(posts)
    }
}

fn map_row(row: &Row) -> SqliteResult<Post> {
    Ok(Post {
        id: row.get(0)?,
        alternative_id: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        upvotes: row.get(4)?,
        private: row.get(5)?,
        confirmed_for_deployment: row.get(6)?,
        confirmed_for_insights: row.get(7)?,
        original_author_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        outgoing_request: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::user::{NewUser, Role};
    use crate::repository::user_repo::UserRepository;

    #[test]
    fn test_insert_and_find_by_alternative_id() {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let users = UserRepository::new(conn.clone());
        let posts = PostRepository::new(conn);

        let author = users
            .insert(&NewUser::new("Niels Bohr", "nbohr", "nbohr@example.org", "scientist", Role::Regular))
            .unwrap();
        let post = posts
            .insert(&NewPost::new("Street lighting on Main", "Half of the lamps are out.", author.id).private())
            .unwrap();

        let found = posts.find_by_alternative_id(&post.alternative_id).unwrap().unwrap();
        assert_eq!(found.id, post.id);
        assert!(found.private);
        assert!(!found.is_escalated());

        assert_eq!(posts.find_by_author(author.id).unwrap().len(), 1);
        assert!(posts.find_by_alternative_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_post_requires_existing_author() {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let posts = PostRepository::new(conn);
        let err = posts.insert(&NewPost::new("t", "b", 999)).unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
