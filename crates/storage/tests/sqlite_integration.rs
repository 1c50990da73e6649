use quiz_core::model::{ProgressRecord, QuizId, ScoreRecord, UserId};
use serde_json::{Value, json};
use storage::document::{Document, USERS};
use storage::seed::seed_samples;
use storage::sqlite::SqliteDocumentStore;
use storage::{DocumentStore, QuizStore};

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("test fixtures are objects"),
    }
}

async fn connect(name: &str) -> SqliteDocumentStore {
    let store = SqliteDocumentStore::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");
    store
}

#[tokio::test]
async fn sqlite_upsert_merges_partial_patches() {
    let store = connect("memdb_merge").await;

    store
        .upsert_document(
            USERS,
            "u1",
            doc(json!({ "math": { "index": 1, "answers": ["4", ""], "score": 1 } })),
        )
        .await
        .unwrap();
    store
        .upsert_document(
            USERS,
            "u1",
            doc(json!({ "capitals": { "index": 0, "answers": ["", "", ""], "score": 0 } })),
        )
        .await
        .unwrap();
    store
        .upsert_document(USERS, "u1", doc(json!({ "math": { "index": 0 } })))
        .await
        .unwrap();

    let user = store.get_document(USERS, "u1").await.unwrap().unwrap();
    assert_eq!(user["math"], json!({ "index": 0, "answers": ["4", ""], "score": 1 }));
    assert_eq!(user["capitals"]["answers"], json!(["", "", ""]));
}

#[tokio::test]
async fn sqlite_migrate_is_idempotent() {
    let store = connect("memdb_migrate_twice").await;
    store.migrate().await.expect("second migrate");
    assert!(store.get_document("quizzes", "none").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_add_document_appends() {
    let store = connect("memdb_append").await;
    let first = store
        .add_document("scores", doc(json!({ "userId": "o", "quizId": "q", "score": 1 })))
        .await
        .unwrap();
    let second = store
        .add_document("scores", doc(json!({ "userId": "o", "quizId": "q", "score": 1 })))
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(store.list_documents("scores").await.unwrap().len(), 2);
}

#[tokio::test]
async fn sqlite_quiz_store_round_trip() {
    let store = connect("memdb_quiz_store").await;
    let quizzes = QuizStore::new(std::sync::Arc::new(store));
    let owner = UserId::new("owner-1").unwrap();

    let ids = seed_samples(&quizzes, Some(&owner)).await.unwrap();
    assert!(ids.contains(&QuizId::new("math-basics").unwrap()));

    let math = quizzes
        .fetch_quiz(&QuizId::new("math-basics").unwrap())
        .await
        .unwrap()
        .expect("seeded quiz");
    assert_eq!(math.name(), "Math Basics");
    assert_eq!(math.question_count(), 2);
    assert_eq!(math.questions()[0].correct_option(), "4");
    assert_eq!(math.owner(), Some(&owner));

    let user = UserId::new("u1").unwrap();
    let progress = ProgressRecord {
        current_index: 1,
        answers: vec![Some("4".into()), None],
        score: 1,
    };
    quizzes
        .save_progress(&user, math.id(), &progress)
        .await
        .unwrap();
    assert_eq!(
        quizzes.fetch_progress(&user, math.id()).await.unwrap(),
        Some(progress)
    );

    quizzes
        .append_score(&ScoreRecord::new(owner, math.id().clone(), 1))
        .await
        .unwrap();
    assert_eq!(quizzes.list_scores(math.id()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_concurrent_patches_to_one_document_all_land() {
    let path = std::env::temp_dir().join(format!("quiz-concurrent-{}.sqlite3", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let store = SqliteDocumentStore::connect(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    let writes = (0..8).map(|n| {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .upsert_document(USERS, "u1", doc(json!({ format!("quiz-{n}"): { "index": n } })))
                .await
        })
    });
    for write in writes.collect::<Vec<_>>() {
        write.await.expect("join").expect("upsert");
    }

    let user = store.get_document(USERS, "u1").await.unwrap().unwrap();
    assert_eq!(user.len(), 8);
    assert_eq!(user["quiz-7"], json!({ "index": 7 }));

    store.pool().close().await;
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn sqlite_collection_listing_uses_primary_key() {
    let store = connect("memdb_query_plan").await;
    let rows: Vec<(i64, i64, i64, String)> =
        sqlx::query_as("EXPLAIN QUERY PLAN SELECT id, body FROM documents WHERE collection = ?1")
            .bind("scores")
            .fetch_all(store.pool())
            .await
            .unwrap();
    assert!(rows.iter().any(|(_, _, _, detail)| detail.contains("USING INDEX")));
}
