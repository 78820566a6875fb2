//! Session flows against the real SQLite repository.

mod common;

use common::{MAX_MODELS, MockFileStore, MockSynthesis, MockToolkit, TOKEN};
use std::path::Path;
use std::sync::Arc;
use vocalis_application::SessionUseCase;
use vocalis_core::UserId;
use vocalis_core::audio::AudioNormalizer;
use vocalis_core::error::VocalisError;
use vocalis_core::event::BotCommand;
use vocalis_core::model::{ModelFileStore, ModelName, ModelRepository, RemoteFileRef};
use vocalis_core::reply::Reply;
use vocalis_core::session::{SessionState, SessionStore};
use vocalis_infrastructure::SqliteModelRepository;

const USER: UserId = UserId(77);
const CLIP_REF: &str = "voice/file_9.oga";

fn build(
    repo: Arc<SqliteModelRepository>,
    files: Arc<MockFileStore>,
) -> SessionUseCase {
    SessionUseCase::new(
        Arc::new(SessionStore::new()),
        repo,
        files,
        Arc::new(MockSynthesis::default()),
        AudioNormalizer::new(Arc::new(MockToolkit)),
        MAX_MODELS,
        TOKEN,
    )
}

async fn create(usecase: &SessionUseCase, name: &str) -> Result<Reply, VocalisError> {
    usecase.on_command(USER, BotCommand::SaveModel).await?;
    usecase.on_text(USER, name).await?;
    usecase
        .on_voice(USER, &RemoteFileRef::new(CLIP_REF), TOKEN)
        .await
}

fn open(path: &Path) -> Arc<SqliteModelRepository> {
    Arc::new(SqliteModelRepository::open(path).unwrap())
}

#[tokio::test]
async fn test_first_upload_registers_user() {
    let repo = Arc::new(SqliteModelRepository::open_in_memory().unwrap());
    let files = Arc::new(MockFileStore::default());
    files.publish(CLIP_REF, b"clip");
    let usecase = build(repo.clone(), files);

    assert!(!repo.user_exists(USER).await.unwrap());
    create(&usecase, "voice1").await.unwrap();

    assert!(repo.user_exists(USER).await.unwrap());
    assert_eq!(repo.list_models(USER).await.unwrap(), vec!["voice1"]);

    // A second model reuses the existing user row.
    create(&usecase, "voice2").await.unwrap();
    assert_eq!(repo.count_models(USER).await.unwrap(), 2);
}

#[tokio::test]
async fn test_limit_enforced_by_stored_rows() {
    let repo = Arc::new(SqliteModelRepository::open_in_memory().unwrap());
    let files = Arc::new(MockFileStore::default());
    files.publish(CLIP_REF, b"clip");
    let usecase = build(repo.clone(), files);

    for i in 0..MAX_MODELS {
        create(&usecase, &format!("m{i}")).await.unwrap();
    }

    let err = create(&usecase, "one-too-many").await.unwrap_err();
    assert!(matches!(err, VocalisError::ModelLimitReached { .. }));
    assert_eq!(repo.count_models(USER).await.unwrap(), MAX_MODELS);
}

#[tokio::test]
async fn test_restart_keeps_models_and_drops_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db").join("vocalis.sqlite3");
    let files = Arc::new(MockFileStore::default());
    files.publish(CLIP_REF, b"clip");

    {
        let usecase = build(open(&db), files.clone());
        create(&usecase, "voice1").await.unwrap();
        usecase.on_command(USER, BotCommand::DeleteModel).await.unwrap();
    }

    let usecase = build(open(&db), files);

    assert_eq!(usecase.session_state(USER).await, SessionState::Free);
    assert_eq!(usecase.active_model(USER).await, None);
    assert!(matches!(
        usecase.on_text(USER, "hello").await,
        Err(VocalisError::NoActiveModel)
    ));

    // The stored model can be picked again without re-uploading.
    usecase.on_callback(USER, "choose_model|voice1").await.unwrap();
    let reply = usecase.on_text(USER, "hello").await.unwrap();
    assert!(matches!(reply, Reply::Voice(_)));
}

#[tokio::test]
async fn test_delete_removes_row_and_blob() {
    let repo = Arc::new(SqliteModelRepository::open_in_memory().unwrap());
    let files = Arc::new(MockFileStore::default());
    files.publish(CLIP_REF, b"clip");
    let usecase = build(repo.clone(), files.clone());
    create(&usecase, "voice1").await.unwrap();

    usecase.on_command(USER, BotCommand::DeleteModel).await.unwrap();
    usecase.on_text(USER, "voice1").await.unwrap();

    assert!(repo.list_models(USER).await.unwrap().is_empty());
    assert!(!files.has_blob(USER, "voice1"));
    // The user row stays.
    assert!(repo.user_exists(USER).await.unwrap());
}

#[tokio::test]
async fn test_orphaned_blob_is_overwritten_by_retry() {
    let repo = Arc::new(SqliteModelRepository::open_in_memory().unwrap());
    let files = Arc::new(MockFileStore::default());
    files.put_blob(USER, "voice1", b"stale");
    files.publish(CLIP_REF, b"fresh");
    let usecase = build(repo.clone(), files.clone());

    create(&usecase, "voice1").await.unwrap();

    assert_eq!(repo.list_models(USER).await.unwrap(), vec!["voice1"]);
    let stored = files
        .read_model(USER, &ModelName::parse("voice1").unwrap())
        .await
        .unwrap();
    assert_eq!(stored, b"fresh");
}
