use chrono::{NaiveDate, TimeDelta};
use edubase_core::{ConnectionProvider, Course, CourseRepository, DatabaseConfig};
use rusqlite::params;
use tempfile::TempDir;

fn open_store() -> (TempDir, ConnectionProvider) {
    let dir = tempfile::tempdir().unwrap();
    let provider = ConnectionProvider::new();
    provider
        .initialize(&DatabaseConfig::at(dir.path().join("catalog.sqlite3")))
        .unwrap();
    (dir, provider)
}

#[test]
fn save_assigns_id_and_find_returns_same_values() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    let course = Course::new("Algorithms", "Coursera").with_description("Sorting and graphs");
    let saved = repo.save(course.clone()).unwrap();

    let id = saved.id.expect("save should assign an id");
    assert!(id > 0);

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.name, course.name);
    assert_eq!(loaded.description, course.description);
    assert_eq!(loaded.platform, course.platform);
}

#[test]
fn catalog_scenario_insert_search_delete() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    let first = repo.save(Course::new("Algorithms", "Coursera")).unwrap();
    let second = repo.save(Course::new("Algorithms II", "Coursera")).unwrap();
    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(2));
    assert_eq!(repo.count(), Ok(2));

    let mut found: Vec<_> = repo
        .search_by_name("algo")
        .unwrap()
        .into_iter()
        .filter_map(|course| course.id)
        .collect();
    found.sort_unstable();
    assert_eq!(found, vec![1, 2]);

    assert_eq!(repo.delete_by_id(1), Ok(true));
    assert_eq!(repo.count(), Ok(1));
    assert_eq!(repo.find_by_id(1), Ok(None));
}

#[test]
fn save_existing_updates_in_place() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    let stored = repo.save(Course::new("Rust", "Udemy")).unwrap();
    let original = repo.find_by_id(stored.id.unwrap()).unwrap().unwrap();

    let mut edited = original.clone();
    edited.name = "Rust in Depth".to_string();
    edited.created_at = NaiveDate::from_ymd_opt(2001, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let saved = repo.save(edited).unwrap();
    assert_eq!(saved.id, original.id);

    let reloaded = repo.find_by_id(original.id.unwrap()).unwrap().unwrap();
    assert_eq!(repo.count(), Ok(1));
    assert_eq!(reloaded.name, "Rust in Depth");
    assert_eq!(reloaded.created_at, original.created_at);
    assert!(reloaded.updated_at > original.updated_at);
}

#[test]
fn repeated_updates_keep_advancing_updated_at() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    let mut course = repo.save(Course::new("Databases", "edX")).unwrap();
    let mut previous = course.updated_at;
    for round in 0..5 {
        course.description = Some(format!("revision {round}"));
        course = repo.update(course).unwrap();
        let stored = repo.find_by_id(course.id.unwrap()).unwrap().unwrap();
        assert!(stored.updated_at > previous);
        previous = stored.updated_at;
    }
}

#[test]
fn save_with_unknown_id_inserts_with_store_id() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    let mut course = Course::new("Compilers", "Stanford Online");
    course.id = Some(42);
    let saved = repo.save(course).unwrap();

    assert_eq!(saved.id, Some(1));
    assert_eq!(repo.exists_by_id(42), Ok(false));
    assert_eq!(repo.exists_by_id(1), Ok(true));
}

#[test]
fn delete_reports_whether_a_row_was_removed() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    let saved = repo.save(Course::new("Networks", "Coursera")).unwrap();
    let id = saved.id.unwrap();

    assert_eq!(repo.delete_by_id(id), Ok(true));
    assert_eq!(repo.find_by_id(id), Ok(None));
    assert_eq!(repo.delete_by_id(id), Ok(false));
    assert_eq!(repo.delete_by_id(999), Ok(false));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    repo.save(Course::new("A", "p")).unwrap();
    let second = repo.save(Course::new("B", "p")).unwrap();
    assert_eq!(repo.delete_by_id(second.id.unwrap()), Ok(true));

    let third = repo.save(Course::new("C", "p")).unwrap();
    assert_eq!(third.id, Some(3));
}

#[test]
fn find_by_platform_matches_exactly() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    repo.save(Course::new("Algorithms", "Coursera")).unwrap();
    repo.save(Course::new("Linear Algebra", "edX")).unwrap();
    repo.save(Course::new("Calculus", "Coursera")).unwrap();

    let coursera = repo.find_by_platform("Coursera").unwrap();
    assert_eq!(coursera.len(), 2);
    assert!(coursera.iter().all(|course| course.platform == "Coursera"));
    assert!(repo.find_by_platform("Cours").unwrap().is_empty());
}

#[test]
fn find_all_returns_fresh_values() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    let saved = repo.save(Course::new("Algorithms", "Coursera")).unwrap();
    let mut listed = repo.find_all().unwrap();
    assert_eq!(listed, vec![saved.clone()]);

    listed[0].name = "changed locally".to_string();
    assert_eq!(repo.find_all().unwrap(), vec![saved]);
}

#[test]
fn update_without_id_changes_nothing() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    let course = Course::new("Orphan", "Nowhere");
    let returned = repo.update(course).unwrap();

    assert_eq!(returned.id, None);
    assert_eq!(repo.count(), Ok(0));
}

#[test]
fn escape_hatches_bind_positional_params() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    repo.save(Course::new("Algorithms", "Coursera")).unwrap();
    repo.save(Course::new("Calculus", "Coursera")).unwrap();
    repo.save(Course::new("Physics", "edX")).unwrap();

    let changed = repo
        .execute_update(
            "UPDATE courses SET platform = ?1 WHERE platform = ?2",
            params!["Coursera Plus", "Coursera"],
        )
        .unwrap();
    assert_eq!(changed, 2);

    let rows = repo
        .execute_query(
            "SELECT id, name, description, platform, created_at, updated_at
             FROM courses WHERE platform = ?1 AND name <> ?2",
            params!["Coursera Plus", "Calculus"],
        )
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Algorithms");
}

#[test]
fn store_errors_degrade_to_empty_results() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);
    repo.save(Course::new("Algorithms", "Coursera")).unwrap();

    provider
        .acquire()
        .unwrap()
        .execute_batch("DROP TABLE courses;")
        .unwrap();

    assert_eq!(repo.count(), Ok(0));
    assert_eq!(repo.find_all(), Ok(Vec::new()));
    assert_eq!(repo.find_by_id(1), Ok(None));
    assert_eq!(repo.exists_by_id(1), Ok(false));
    assert_eq!(repo.delete_by_id(1), Ok(false));
    assert_eq!(repo.search_by_name("algo"), Ok(Vec::new()));

    let unsaved = repo.save(Course::new("Lost", "Nowhere")).unwrap();
    assert_eq!(unsaved.id, None);
    let unsaved = repo.insert(Course::new("Lost", "Nowhere")).unwrap();
    assert_eq!(unsaved.id, None);
}

#[test]
fn malformed_sql_in_escape_hatch_is_softened() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    assert_eq!(repo.execute_query("SELECT nonsense FROM", &[]), Ok(Vec::new()));
    assert_eq!(repo.execute_update("UPDATE nowhere SET x = 1", &[]), Ok(0));
}

#[test]
fn insert_ignores_caller_id_and_stamps_timestamps() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);

    let mut course = Course::new("Operating Systems", "MIT OCW");
    course.id = Some(77);
    course.created_at -= TimeDelta::days(30);
    let before = course.created_at;

    let inserted = repo.insert(course).unwrap();
    assert_eq!(inserted.id, Some(1));
    assert!(inserted.created_at > before);
    assert_eq!(inserted.created_at, inserted.updated_at);
}

fn far_future() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2099, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn import_with_future_stamp(repo: &CourseRepository<'_>) -> Course {
    let mut course = Course::new("Algorithms", "Coursera");
    course.id = Some(1);
    course.updated_at = far_future();
    repo.import(course).unwrap().unwrap()
}

#[test]
fn save_moves_past_a_stored_stamp_ahead_of_the_clock() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);
    import_with_future_stamp(&repo);

    let mut stale = Course::new("Algorithms II", "Coursera");
    stale.id = Some(1);
    let saved = repo.save(stale).unwrap();

    let stored = repo.find_by_id(1).unwrap().unwrap();
    assert_eq!(stored.name, "Algorithms II");
    assert!(stored.updated_at > far_future());
    assert_eq!(saved.updated_at, stored.updated_at);
}

#[test]
fn update_moves_past_a_stored_stamp_ahead_of_the_clock() {
    let (_dir, provider) = open_store();
    let repo = CourseRepository::new(&provider);
    import_with_future_stamp(&repo);

    let mut stale = Course::new("Algorithms II", "Coursera");
    stale.id = Some(1);
    let updated = repo.update(stale).unwrap();

    let stored = repo.find_by_id(1).unwrap().unwrap();
    assert!(stored.updated_at > far_future());
    assert_eq!(updated.updated_at, stored.updated_at);
}
