// ==========================================
// Concurrent assignment tests
// ==========================================
// Writers on one shared state and on separate connections must observe
// each other's committed loads.
// ==========================================


#[cfg(test)]
mod concurrent_assignment_test {
    use civic_escalation::app::AppState;
    use civic_escalation::domain::user::Role;
    use std::sync::Arc;
    use std::thread;

    use crate::test_helpers::{add_post, add_representatives, add_user, create_test_db};

    const THREADS: usize = 6;
    const POSTS_PER_THREAD: usize = 5;

    fn assert_balanced(state: &AppState, expected_total: i64) {
        let overview = state.request_api.get_load_overview().unwrap();
        let loads: Vec<i64> = overview.representatives.iter().map(|c| c.load).collect();
        let max = loads.iter().copied().max().unwrap();
        let min = loads.iter().copied().min().unwrap();
        assert_eq!(overview.total_open_user_requests(), expected_total);
        assert!(max - min <= 1, "unbalanced loads: {:?}", loads);
    }

    #[test]
    fn test_shared_state_spreads_load_evenly() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let state = Arc::new(AppState::new(db_path).unwrap());
        add_representatives(&state, 4);

        let mut handles = Vec::new();
        for t in 0..THREADS {
            let state = Arc::clone(&state);
            handles.push(thread::spawn(move || {
                let author = add_user(&state, &format!("author{}", t), Role::Regular);
                for p in 0..POSTS_PER_THREAD {
                    let post = add_post(&state, &author, &format!("t{} p{}", t, p));
                    state.request_api.create_user_request(&post, &author).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_balanced(&state, (THREADS * POSTS_PER_THREAD) as i64);
    }

    #[test]
    fn test_separate_connections_spread_load_evenly() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let setup = AppState::new(db_path.clone()).unwrap();
        add_representatives(&setup, 3);

        let mut handles = Vec::new();
        for t in 0..THREADS {
            let author = add_user(&setup, &format!("author{}", t), Role::Regular);
            let posts: Vec<String> = (0..POSTS_PER_THREAD)
                .map(|p| add_post(&setup, &author, &format!("t{} p{}", t, p)))
                .collect();
            let db_path = db_path.clone();
            handles.push(thread::spawn(move || {
                // one connection per thread; BEGIN IMMEDIATE serializes writers
                let state = AppState::new(db_path).unwrap();
                for post in &posts {
                    state.request_api.create_user_request(post, &author).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_balanced(&setup, (THREADS * POSTS_PER_THREAD) as i64);
    }

    #[test]
    fn test_racing_on_one_post_yields_single_request() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let state = Arc::new(AppState::new(db_path).unwrap());
        add_representatives(&state, 2);
        let author = add_user(&state, "author", Role::Regular);
        let post = add_post(&state, &author, "Contested");

        let mut handles = Vec::new();
        for _ in 0..THREADS {
            let state = Arc::clone(&state);
            let author = author.clone();
            let post = post.clone();
            handles.push(thread::spawn(move || {
                state.request_api.create_user_request(&post, &author)
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let created = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(created, 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.code(), "CONFLICT");
        }
        assert_eq!(state.request_api.list_requests_by_caller(&author).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_promotion_of_same_request() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let state = Arc::new(AppState::new(db_path).unwrap());
        add_representatives(&state, 1);
        state.board_repo.insert().unwrap();
        let author = add_user(&state, "author", Role::Regular);
        let post = add_post(&state, &author, "Promote me");
        let ur = state.request_api.create_user_request(&post, &author).unwrap();

        let mut handles = Vec::new();
        for t in 0..THREADS {
            let state = Arc::clone(&state);
            handles.push(thread::spawn(move || {
                state.request_api.promote_request(ur, &format!("op{}", t))
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let overview = state.request_api.get_load_overview().unwrap();
        assert_eq!(overview.total_open_representative_requests(), 1);
    }
}
