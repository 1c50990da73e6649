use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{QuizId, QuizPolicy, UserId};
use quiz_core::time::fixed_now;
use services::{AuthProvider, Clock, QuizSessionLoop, WatchAuth};
use storage::document::Document;
use storage::seed::seed_samples;
use storage::{DocumentStore, InMemoryDocumentStore, QuizStore, StorageError};

use crate::context::{UiApp, build_app_context};
use crate::views::quiz::QuizTestHandles;
use crate::views::{HomeView, QuizView, RegisterView};

/// In-memory store whose reads can be switched off after seeding.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryDocumentStore,
    offline: AtomicBool,
}

impl FlakyStore {
    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StorageError> {
        self.check_online()?;
        self.inner.get_document(collection, id).await
    }

    async fn list_documents(
        &self,
        collection: &str,
    ) -> Result<Vec<(String, Document)>, StorageError> {
        self.check_online()?;
        self.inner.list_documents(collection).await
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<(), StorageError> {
        self.inner.upsert_document(collection, id, patch).await
    }

    async fn add_document(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<String, StorageError> {
        self.inner.add_document(collection, document).await
    }
}

#[derive(Clone)]
struct TestApp {
    quiz_id: QuizId,
    auth: Arc<WatchAuth>,
    session_loop: Arc<QuizSessionLoop>,
}

impl UiApp for TestApp {
    fn default_quiz_id(&self) -> QuizId {
        self.quiz_id.clone()
    }

    fn auth(&self) -> Arc<WatchAuth> {
        Arc::clone(&self.auth)
    }

    fn session_loop(&self) -> Arc<QuizSessionLoop> {
        Arc::clone(&self.session_loop)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Register,
    Quiz(String),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    quiz_handles: QuizTestHandles,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    use_context_provider(|| props.quiz_handles.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
    #[route("/register")]
    RegisterPage {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Register => rsx! { RegisterView {} },
        ViewKind::Quiz(quiz_id) => rsx! { QuizView { quiz_id } },
    }
}

#[component]
fn RegisterPage() -> Element {
    rsx! { RegisterView {} }
}

pub struct HarnessOptions {
    pub user: Option<&'static str>,
    pub policy: QuizPolicy,
    /// Every store read fails once seeding is done.
    pub offline_reads: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            user: Some("player-1"),
            policy: QuizPolicy::classic(),
            offline_reads: false,
        }
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub store: QuizStore,
    pub auth: Arc<WatchAuth>,
    pub quiz_handles: QuizTestHandles,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then give async loads a few turns to settle.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..3 {
            self.drive_async().await;
        }
    }

    pub fn dispatch(&mut self, intent: crate::vm::QuizIntent) {
        let dispatch = self.quiz_handles.dispatch();
        self.dom.in_runtime(|| dispatch.call(intent));
        drive_dom(&mut self.dom);
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub async fn setup_view_harness(view: ViewKind, options: HarnessOptions) -> ViewHarness {
    let backend = Arc::new(FlakyStore::default());
    let documents: Arc<dyn DocumentStore> = backend.clone();
    let store = QuizStore::new(documents);
    let owner = UserId::new("owner-1").expect("owner id");
    seed_samples(&store, Some(&owner)).await.expect("seed quizzes");
    backend.offline.store(options.offline_reads, Ordering::SeqCst);

    let auth = Arc::new(match options.user {
        Some(user) => WatchAuth::signed_in(UserId::new(user).expect("user id")),
        None => WatchAuth::anonymous(),
    });
    let auth_provider: Arc<dyn AuthProvider> = auth.clone();
    let session_loop = Arc::new(
        QuizSessionLoop::new(Clock::fixed(fixed_now()), store.clone(), auth_provider)
            .with_policy(options.policy),
    );

    let app = Arc::new(TestApp {
        quiz_id: QuizId::new("math-basics").expect("quiz id"),
        auth: Arc::clone(&auth),
        session_loop,
    });
    let quiz_handles = QuizTestHandles::default();

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            quiz_handles: quiz_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        store,
        auth,
        quiz_handles,
    }
}
