// End-to-end exploration flow against a fixture SQLite store

use tabchat_explore::{Conversations, Event, Limits, MenuOption, Reply};
use tempfile::tempdir;

/// Create a store with `orders` and `users` tables and return its path.
fn fixture_store(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("shop.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE orders (id INTEGER, item TEXT, amount REAL);
         INSERT INTO orders VALUES (1, 'widget', 9.5);
         INSERT INTO orders VALUES (2, 'gadget', 12.0);
         INSERT INTO orders VALUES (2, 'gadget', 12.0);
         INSERT INTO orders VALUES (3, NULL, NULL);
         CREATE TABLE users (id INTEGER, name TEXT);
         INSERT INTO users VALUES (1, 'alice');
         INSERT INTO users VALUES (2, 'bob');",
    )
    .unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_happy_path_to_menu() {
    let dir = tempdir().unwrap();
    let uri = fixture_store(&dir);
    let conv = Conversations::new(Limits::default());

    assert_eq!(conv.handle("c1", Event::Begin), Reply::PromptUri);
    assert_eq!(conv.state_name("c1"), "awaiting_uri");

    match conv.handle("c1", Event::Uri(uri)) {
        Reply::Tables(tables) => {
            assert!(tables.contains(&"orders".to_string()));
            assert!(tables.contains(&"users".to_string()));
        }
        other => panic!("expected table list, got {other:?}"),
    }
    assert_eq!(conv.state_name("c1"), "awaiting_table");

    match conv.handle("c1", Event::TableChoice("orders".into())) {
        Reply::TableLoaded { name, rows, cols } => {
            assert_eq!(name, "orders");
            assert_eq!(rows, 4);
            assert_eq!(cols, 3);
        }
        other => panic!("expected loaded table, got {other:?}"),
    }
    assert_eq!(conv.state_name("c1"), "menu");
}

#[test]
fn test_menu_reports() {
    let dir = tempdir().unwrap();
    let uri = fixture_store(&dir);
    let conv = Conversations::new(Limits::default());
    conv.handle("c1", Event::Begin);
    conv.handle("c1", Event::Uri(uri));
    conv.handle("c1", Event::TableChoice("orders".into()));

    match conv.handle("c1", Event::MenuChoice(MenuOption::Info)) {
        Reply::Report(text) => assert!(text.contains("widget")),
        other => panic!("expected report, got {other:?}"),
    }
    assert_eq!(conv.state_name("c1"), "menu");

    match conv.handle("c1", Event::MenuChoice(MenuOption::Missing)) {
        Reply::Report(text) => {
            assert!(text.contains("item"));
            assert!(text.contains('1'));
        }
        other => panic!("expected report, got {other:?}"),
    }

    match conv.handle("c1", Event::MenuChoice(MenuOption::Duplicates)) {
        Reply::Report(text) => assert!(text.contains("gadget")),
        other => panic!("expected report, got {other:?}"),
    }
    assert_eq!(conv.state_name("c1"), "menu");
}

#[test]
fn test_search_flow_returns_to_menu() {
    let dir = tempdir().unwrap();
    let uri = fixture_store(&dir);
    let conv = Conversations::new(Limits::default());
    conv.handle("c1", Event::Begin);
    conv.handle("c1", Event::Uri(uri));
    conv.handle("c1", Event::TableChoice("orders".into()));

    match conv.handle("c1", Event::MenuChoice(MenuOption::Search)) {
        Reply::Columns(cols) => {
            assert_eq!(cols, vec!["id".to_string(), "item".into(), "amount".into()])
        }
        other => panic!("expected columns, got {other:?}"),
    }
    assert_eq!(conv.state_name("c1"), "awaiting_search_column");

    assert_eq!(
        conv.handle("c1", Event::ColumnChoice("item".into())),
        Reply::PromptTerm { column: "item".into() }
    );

    match conv.handle("c1", Event::Term("wid".into())) {
        Reply::SearchResults(text) => assert!(text.contains("widget")),
        other => panic!("expected search results, got {other:?}"),
    }
    assert_eq!(conv.state_name("c1"), "menu");

    // No matches is still a successful search
    conv.handle("c1", Event::MenuChoice(MenuOption::Search));
    conv.handle("c1", Event::ColumnChoice("item".into()));
    match conv.handle("c1", Event::Term("zzzz".into())) {
        Reply::SearchResults(text) => assert_eq!(text, "no matches"),
        other => panic!("expected empty search results, got {other:?}"),
    }
}

#[test]
fn test_bad_uri_returns_to_idle() {
    let conv = Conversations::new(Limits::default());
    conv.handle("c1", Event::Begin);
    match conv.handle("c1", Event::Uri("/no/such/dir/store.db".into())) {
        Reply::Failed(_) => {}
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(conv.state_name("c1"), "idle");
}

#[test]
fn test_idle_ignores_everything_but_begin() {
    let conv = Conversations::new(Limits::default());
    for event in [
        Event::Uri("x".into()),
        Event::TableChoice("orders".into()),
        Event::MenuChoice(MenuOption::Info),
        Event::ColumnChoice("a".into()),
        Event::Term("t".into()),
    ] {
        assert_eq!(conv.handle("c1", event), Reply::Ignored);
        assert_eq!(conv.state_name("c1"), "idle");
    }
}

#[test]
fn test_guard_failures_do_not_transition() {
    let dir = tempdir().unwrap();
    let uri = fixture_store(&dir);
    let conv = Conversations::new(Limits::default());
    conv.handle("c1", Event::Begin);
    conv.handle("c1", Event::Uri(uri));

    // Not one of the offered tables
    assert_eq!(
        conv.handle("c1", Event::TableChoice("missing_table".into())),
        Reply::Ignored
    );
    assert_eq!(conv.state_name("c1"), "awaiting_table");

    conv.handle("c1", Event::TableChoice("users".into()));
    conv.handle("c1", Event::MenuChoice(MenuOption::Search));

    // Not one of the offered columns
    assert_eq!(
        conv.handle("c1", Event::ColumnChoice("password".into())),
        Reply::Ignored
    );
    assert_eq!(conv.state_name("c1"), "awaiting_search_column");
}

#[test]
fn test_begin_supersedes_active_connection() {
    let dir = tempdir().unwrap();
    let uri = fixture_store(&dir);
    let conv = Conversations::new(Limits::default());
    conv.handle("c1", Event::Begin);
    conv.handle("c1", Event::Uri(uri));
    conv.handle("c1", Event::TableChoice("orders".into()));

    // A fresh Begin drops the old context and prompts again
    assert_eq!(conv.handle("c1", Event::Begin), Reply::PromptUri);
    assert_eq!(conv.state_name("c1"), "awaiting_uri");
}

#[test]
fn test_stalled_conversation_does_not_block_others() {
    let dir = tempdir().unwrap();
    let open_uri = fixture_store(&dir);

    // A second store held under an exclusive lock; reads against it wait
    // out the busy timeout
    let locked_path = dir.path().join("locked.db");
    let lock_conn = rusqlite::Connection::open(&locked_path).unwrap();
    lock_conn
        .execute_batch("CREATE TABLE t (id INTEGER); BEGIN EXCLUSIVE;")
        .unwrap();

    let conv = std::sync::Arc::new(Conversations::new(Limits::default()));
    conv.handle("slow", Event::Begin);
    conv.handle("fast", Event::Begin);

    let worker = {
        let conv = std::sync::Arc::clone(&conv);
        let uri = locked_path.to_string_lossy().into_owned();
        std::thread::spawn(move || conv.handle("slow", Event::Uri(uri)))
    };
    // Let the worker reach the locked store before driving the other
    // conversation
    std::thread::sleep(std::time::Duration::from_millis(200));

    let started = std::time::Instant::now();
    match conv.handle("fast", Event::Uri(open_uri)) {
        Reply::Tables(_) => {}
        other => panic!("expected table list, got {other:?}"),
    }
    assert!(started.elapsed() < std::time::Duration::from_secs(4));

    // Release the lock so the stalled conversation can finish either way
    drop(lock_conn);
    match worker.join().unwrap() {
        Reply::Tables(_) | Reply::Failed(_) => {}
        other => panic!("unexpected reply on the stalled conversation: {other:?}"),
    }
}

#[test]
fn test_reset_reports_presence() {
    let conv = Conversations::new(Limits::default());
    conv.handle("c1", Event::Begin);
    assert!(conv.reset("c1"));
    assert!(!conv.reset("c1"));
    assert_eq!(conv.state_name("c1"), "idle");
}
