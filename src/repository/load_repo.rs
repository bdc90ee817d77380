// ==========================================
// Civic Escalation - Load Snapshot Query
// ==========================================
// Pure read. Load = open requests attached to a candidate, where open
// means confirmed = 0 AND closed_at IS NULL.
// Rule: no locking of its own. Callers that decide on the result must
// run it inside their write transaction.
// ==========================================

use crate::domain::load::{CandidateLoad, LoadOverview};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct LoadSnapshotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LoadSnapshotRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Snapshot (transaction scoped)
    // ==========================================

    /// Every representative with its load, ascending id. Zero-load
    /// representatives are included.
    pub fn representative_loads_tx(conn: &Connection) -> RepositoryResult<Vec<CandidateLoad>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT u.id,
                   (SELECT COUNT(*) FROM user_request ur
                    WHERE ur.receiving_representative_id = u.id
                      AND ur.confirmed = 0
                      AND ur.closed_at IS NULL) AS load
            FROM users u
            WHERE u.type = 'representative'
            ORDER BY u.id ASC
            "#,
        )?;
        let loads = stmt
            .query_map([], |row| Ok(CandidateLoad::new(row.get(0)?, row.get(1)?)))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(loads)
    }

    /// Every board with its load, ascending id
    pub fn board_loads_tx(conn: &Connection) -> RepositoryResult<Vec<CandidateLoad>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT b.id,
                   (SELECT COUNT(*) FROM representative_request rr
                    WHERE rr.board_id = b.id
                      AND rr.confirmed = 0
                      AND rr.closed_at IS NULL) AS load
            FROM board b
            ORDER BY b.id ASC
            "#,
        )?;
        let loads = stmt
            .query_map([], |row| Ok(CandidateLoad::new(row.get(0)?, row.get(1)?)))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(loads)
    }

    // ==========================================
    // LoadOf
    // ==========================================

    /// Load of one representative. NotFound if the id is not a representative.
    pub fn load_of_representative(&self, representative_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let load: Option<i64> = conn
            .query_row(
                r#"
                SELECT (SELECT COUNT(*) FROM user_request ur
                        WHERE ur.receiving_representative_id = u.id
                          AND ur.confirmed = 0
                          AND ur.closed_at IS NULL)
                FROM users u
                WHERE u.id = ?1 AND u.type = 'representative'
                "#,
                params![representative_id],
                |row| row.get(0),
            )
            .optional()?;
        load.ok_or_else(|| RepositoryError::not_found("Representative", representative_id))
    }

    /// Load of one board. NotFound if the board does not exist.
    pub fn load_of_board(&self, board_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let load: Option<i64> = conn
            .query_row(
                r#"
                SELECT (SELECT COUNT(*) FROM representative_request rr
                        WHERE rr.board_id = b.id
                          AND rr.confirmed = 0
                          AND rr.closed_at IS NULL)
                FROM board b
                WHERE b.id = ?1
                "#,
                params![board_id],
                |row| row.get(0),
            )
            .optional()?;
        load.ok_or_else(|| RepositoryError::not_found("Board", board_id))
    }

    /// Both tiers read under one lock
    pub fn overview(&self) -> RepositoryResult<LoadOverview> {
        let conn = self.get_conn()?;
        Ok(LoadOverview {
            representatives: Self::representative_loads_tx(&conn)?,
            boards: Self::board_loads_tx(&conn)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::user::{NewUser, Role};
    use crate::repository::board_repo::BoardRepository;
    use crate::repository::user_repo::UserRepository;

    #[test]
    fn test_empty_store_has_no_candidates() {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let loads = LoadSnapshotRepository::new(conn);
        let overview = loads.overview().unwrap();
        assert!(overview.representatives.is_empty());
        assert!(overview.boards.is_empty());
    }

    #[test]
    fn test_zero_load_candidates_are_listed() {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let users = UserRepository::new(conn.clone());
        let boards = BoardRepository::new(conn.clone());
        let loads = LoadSnapshotRepository::new(conn);

        let rep = users
            .insert(&NewUser::new("R", "rep", "rep@example.org", "student", Role::Representative))
            .unwrap();
        let regular = users
            .insert(&NewUser::new("U", "user", "user@example.org", "student", Role::Regular))
            .unwrap();
        let board = boards.insert().unwrap();

        let overview = loads.overview().unwrap();
        assert_eq!(overview.representatives, vec![CandidateLoad::new(rep.id, 0)]);
        assert_eq!(overview.boards, vec![CandidateLoad::new(board.id, 0)]);

        assert_eq!(loads.load_of_representative(rep.id).unwrap(), 0);
        assert_eq!(loads.load_of_board(board.id).unwrap(), 0);
        assert!(matches!(
            loads.load_of_representative(regular.id),
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(
            loads.load_of_board(board.id + 1),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
