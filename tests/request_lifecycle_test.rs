// ==========================================
// Request lifecycle integration tests
// ==========================================
// End-to-end through RequestApi on a file-backed database
// ==========================================


#[cfg(test)]
mod request_lifecycle_test {
    use civic_escalation::domain::types::{DeletePolicy, RequestState};
    use civic_escalation::domain::user::Role;
    use civic_escalation::logging;

    use crate::test_helpers::{
        add_board, add_post, add_representatives, add_user, create_test_state,
    };

    #[test]
    fn test_full_escalation_flow() {
        logging::init_test();
        let (_tmp, state) = create_test_state();
        let api = &state.request_api;

        let author = add_user(&state, "inewton", Role::Regular);
        let reps = add_representatives(&state, 3);
        let board = add_board(&state);
        add_user(&state, "member", Role::BoardMember { board_id: board });

        let post = add_post(&state, &author, "Bus stop shelter");
        let ur = api.create_user_request(&post, &author).unwrap();

        let open = api.list_open_requests_for_representative(reps[0].id).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].state, RequestState::Open);
        assert_eq!(open[0].post_alternative_id, post);

        let rr = api.promote_request(ur, &reps[0].username).unwrap();
        assert!(api
            .list_open_requests_for_representative(reps[0].id)
            .unwrap()
            .is_empty());

        let board_open = api.list_open_requests_for_board(board).unwrap();
        assert_eq!(board_open.len(), 1);
        assert_eq!(board_open[0].id, rr);
        assert_eq!(board_open[0].representative_username, reps[0].username);

        api.resolve_representative_request(rr, "member").unwrap();
        assert!(api.list_open_requests_for_board(board).unwrap().is_empty());

        let mine = api.list_requests_by_caller(&author).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].state(), RequestState::Promoted);

        let actions = api.list_recent_actions(Some(10)).unwrap();
        let types: Vec<&str> = actions.iter().map(|a| a.action_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "RESOLVE_REPRESENTATIVE_REQUEST",
                "PROMOTE_REQUEST",
                "CREATE_USER_REQUEST"
            ]
        );
    }

    #[test]
    fn test_requester_never_assigned_to_self() {
        let (_tmp, state) = create_test_state();
        let api = &state.request_api;
        let reps = add_representatives(&state, 2);

        // rep1 at load 0 files first; rep2 is the only other minimum
        let post = add_post(&state, &reps[0], "Own post");
        let ur = api.create_user_request(&post, &reps[0]).unwrap();
        let filed = api.list_requests_by_caller(&reps[0]).unwrap();
        assert_eq!(filed[0].id, ur);
        assert_eq!(filed[0].receiving_representative_id, reps[1].id);

        // now rep1=0, rep2=1: rep1 is the unique minimum but is the caller
        let post = add_post(&state, &reps[0], "Another own post");
        let err = api.create_user_request(&post, &reps[0]).unwrap_err();
        assert_eq!(err.code(), "UNASSIGNABLE");
    }

    #[test]
    fn test_least_loaded_selection_scenario() {
        let (_tmp, state) = create_test_state();
        let api = &state.request_api;
        let author = add_user(&state, "author", Role::Regular);
        let reps = add_representatives(&state, 3);

        // loads after six requests: 2, 2, 2
        for i in 0..6 {
            let post = add_post(&state, &author, &format!("post {}", i));
            api.create_user_request(&post, &author).unwrap();
        }
        // drain rep2 to reach R1(2), R2(0), R3(2)
        let board = add_board(&state);
        for summary in api.list_open_requests_for_representative(reps[1].id).unwrap() {
            api.promote_request(summary.id, "rep2").unwrap();
        }
        assert_eq!(api.list_open_requests_for_board(board).unwrap().len(), 2);

        let post = add_post(&state, &reps[0], "from R1");
        let ur = api.create_user_request(&post, &reps[0]).unwrap();
        let open = api.list_open_requests_for_representative(reps[1].id).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, ur);
    }

    #[test]
    fn test_escalated_post_conflict_keeps_existing_request() {
        let (_tmp, state) = create_test_state();
        let api = &state.request_api;
        let author = add_user(&state, "author", Role::Regular);
        let other = add_user(&state, "other", Role::Regular);
        add_representatives(&state, 2);

        let post = add_post(&state, &author, "Parks");
        let ur = api.create_user_request(&post, &author).unwrap();

        let err = api.create_user_request(&post, &other).unwrap_err();
        assert_eq!(err.code(), "CONFLICT");

        let stored = state.post_repo.find_by_alternative_id(&post).unwrap().unwrap();
        assert_eq!(stored.outgoing_request, Some(ur));
        assert!(api.list_requests_by_caller(&other).unwrap().is_empty());
    }

    #[test]
    fn test_delete_policy_reject_then_cascade() {
        let (_tmp, state) = create_test_state();
        let api = &state.request_api;
        let author = add_user(&state, "author", Role::Regular);
        add_representatives(&state, 1);
        let board = add_board(&state);

        let post = add_post(&state, &author, "Noise");
        let ur = api.create_user_request(&post, &author).unwrap();
        api.promote_request(ur, "rep1").unwrap();

        let err = api.delete_user_request(ur, "admin").unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(api.list_open_requests_for_board(board).unwrap().len(), 1);

        state
            .config_manager
            .set_delete_policy(DeletePolicy::Cascade)
            .unwrap();
        api.delete_user_request(ur, "admin").unwrap();
        assert!(api.list_open_requests_for_board(board).unwrap().is_empty());
        assert!(state
            .post_repo
            .find_by_alternative_id(&post)
            .unwrap()
            .unwrap()
            .outgoing_request
            .is_none());
    }

    #[test]
    fn test_delete_representative_request_frees_post() {
        let (_tmp, state) = create_test_state();
        let api = &state.request_api;
        let author = add_user(&state, "author", Role::Regular);
        add_representatives(&state, 1);
        add_board(&state);

        let post = add_post(&state, &author, "Snow removal");
        let ur = api.create_user_request(&post, &author).unwrap();
        let rr = api.promote_request(ur, "rep1").unwrap();
        api.delete_representative_request(rr, "admin").unwrap();

        assert!(api.list_requests_by_caller(&author).unwrap().is_empty());
        // the post can be escalated again
        api.create_user_request(&post, &author).unwrap();

        let err = api.delete_representative_request(rr, "admin").unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_boards_balance_by_open_load() {
        let (_tmp, state) = create_test_state();
        let api = &state.request_api;
        let author = add_user(&state, "author", Role::Regular);
        add_representatives(&state, 2);
        let b1 = add_board(&state);
        let b2 = add_board(&state);

        for i in 0..4 {
            let post = add_post(&state, &author, &format!("p{}", i));
            let ur = api.create_user_request(&post, &author).unwrap();
            api.promote_request(ur, "rep").unwrap();
        }
        assert_eq!(api.list_open_requests_for_board(b1).unwrap().len(), 2);
        assert_eq!(api.list_open_requests_for_board(b2).unwrap().len(), 2);

        // resolving frees capacity on b2 only, so the next promotion goes there
        let on_b2: Vec<i64> = api
            .list_open_requests_for_board(b2)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        api.resolve_representative_request(on_b2[0], "board").unwrap();

        let post = add_post(&state, &author, "p4");
        let ur = api.create_user_request(&post, &author).unwrap();
        let rr = api.promote_request(ur, "rep").unwrap();
        let b2_open: Vec<i64> = api
            .list_open_requests_for_board(b2)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert!(b2_open.contains(&rr));
    }
}
