use chrono::Local;
use std::error::Error;
use std::fs;
use std::path::Path;

use civic_escalation::app::{get_default_db_path, AppState};
use civic_escalation::domain::post::NewPost;
use civic_escalation::domain::user::{NewUser, Role, User};

// (full_name, username, email, profession, age)
type Profile = (&'static str, &'static str, &'static str, &'static str, i32);

const REGULAR_USERS: [Profile; 4] = [
    ("Albert Einstein", "aeinstein", "aeinstein@gmail.com", "physicist", 146),
    ("Max Planck", "mplanck", "mplanck@gmail.com", "scientist", 167),
    ("Neils Bohr", "nbohr", "nbohr@gmail.com", "scientist", 140),
    ("Isaac Newton", "inewton", "inewton@gmail.com", "scientist", 382),
];

const REPRESENTATIVES: [Profile; 3] = [
    ("Oyatillo Axadjonov", "oaxadjonov", "oaxadjonov@gmail.com", "student", 18),
    ("Ravshanbek M.", "mravshanbek", "mravshanbek@gmail.com", "student", 18),
    ("MuhammadSodiq D.", "dmuhammadsodiq", "dmuhammadsodiq@gmail.com", "student", 18),
];

const BOARD_MEMBERS: [Profile; 2] = [
    ("Timurbek A.", "atimuberk", "atimuberk@gmail.com", "student", 18),
    ("Akbar Evatov", "aevatov", "aevatov@gmail.com", "student", 18),
];

const DEMO_POSTS: [(&str, &str); 4] = [
    ("Broken street lights", "Half of the lights on the main avenue are off at night."),
    ("Library opening hours", "The public library closes before most people finish work."),
    ("Recycling bins", "The district has no separate bins for glass."),
    ("Bus stop shelter", "The shelter roof at the central stop leaks."),
];

fn main() -> Result<(), Box<dyn Error>> {
    civic_escalation::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;
    seed_demo(&state)?;
    print_quick_counts(&state)?;

    eprintln!("Seeded {}", db_path);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_demo(state: &AppState) -> Result<(), Box<dyn Error>> {
    let board = state.board_repo.insert()?;

    let regulars = insert_users(state, &REGULAR_USERS, Role::Regular)?;
    insert_users(state, &REPRESENTATIVES, Role::Representative)?;
    insert_users(state, &BOARD_MEMBERS, Role::BoardMember { board_id: board.id })?;

    // one post per regular user; the first two get escalated, the first promoted
    let mut request_ids = Vec::new();
    for (author, (title, body)) in regulars.iter().zip(DEMO_POSTS.iter()) {
        let post = state.post_repo.insert(&NewPost::new(*title, *body, author.id))?;
        if request_ids.len() < 2 {
            let id = state
                .request_api
                .create_user_request(&post.alternative_id, author)?;
            request_ids.push(id);
        }
    }
    if let Some(&first) = request_ids.first() {
        state.request_api.promote_request(first, "seed_demo_db")?;
    }

    Ok(())
}

fn insert_users(
    state: &AppState,
    profiles: &[Profile],
    role: Role,
) -> Result<Vec<User>, Box<dyn Error>> {
    let mut users = Vec::with_capacity(profiles.len());
    for &(full_name, username, email, profession, age) in profiles {
        let user = state.user_repo.insert(
            &NewUser::new(full_name, username, email, profession, role).with_age(age),
        )?;
        users.push(user);
    }
    Ok(users)
}

fn print_quick_counts(state: &AppState) -> Result<(), Box<dyn Error>> {
    let overview = state.request_api.get_load_overview()?;
    for rep in &overview.representatives {
        eprintln!("representative {:>3}: {} open", rep.candidate_id, rep.load);
    }
    for board in &overview.boards {
        eprintln!("board          {:>3}: {} open", board.candidate_id, board.load);
    }
    Ok(())
}
