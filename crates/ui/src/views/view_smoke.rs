use dioxus::prelude::ReadableExt;
use quiz_core::model::{QuizId, QuizPolicy, UserId};
use services::{AuthProvider, QuizScreen};

use super::test_harness::{HarnessOptions, ViewKind, setup_view_harness};
use crate::vm::QuizIntent;

fn quiz_view() -> ViewKind {
    ViewKind::Quiz("math-basics".to_string())
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_renders_first_question() {
    let mut harness = setup_view_harness(quiz_view(), HarnessOptions::default()).await;
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Math Basics"), "missing quiz name in {html}");
    assert!(html.contains("Question 1 of 2"), "missing position in {html}");
    assert!(html.contains("What is 2 + 2?"), "missing prompt in {html}");
    assert!(html.contains("Next"), "missing next in {html}");
    assert!(!html.contains("Previous"), "previous shown on first question: {html}");
    assert!(!html.contains("Finish"), "finish shown on first question: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_plays_through_to_score() {
    let mut harness = setup_view_harness(quiz_view(), HarnessOptions::default()).await;
    harness.settle().await;

    harness.dispatch(QuizIntent::Select("4".into()));
    harness.dispatch(QuizIntent::Next);
    let html = harness.render();
    assert!(html.contains("Question 2 of 2"), "missing position in {html}");
    assert!(html.contains("Previous"), "missing previous in {html}");
    assert!(html.contains("Finish"), "missing finish in {html}");

    harness.dispatch(QuizIntent::Select("B".into()));
    harness.dispatch(QuizIntent::Finish);
    let html = harness.render();
    assert!(html.contains("Your score: 1/2"), "missing score in {html}");
    assert!(html.contains("Back"), "missing back link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn finishing_early_is_rejected() {
    let mut harness = setup_view_harness(quiz_view(), HarnessOptions::default()).await;
    harness.settle().await;

    harness.dispatch(QuizIntent::Finish);
    let screen = harness.quiz_handles.screen();
    let current = harness.dom.in_runtime(|| screen.peek().clone());
    assert!(matches!(current, QuizScreen::Question(_)));
    let html = harness.render();
    assert!(html.contains("not available"), "missing rejection in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn immediate_feedback_is_rendered() {
    let options = HarnessOptions {
        policy: QuizPolicy::resumable(),
        ..HarnessOptions::default()
    };
    let mut harness = setup_view_harness(quiz_view(), options).await;
    harness.settle().await;

    harness.dispatch(QuizIntent::Select("3".into()));
    let html = harness.render();
    assert!(html.contains("Incorrect."), "missing feedback in {html}");
    assert!(html.contains("Your answer: 3"), "missing selection in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn resumable_quiz_restores_progress() {
    let options = HarnessOptions {
        policy: QuizPolicy::resumable(),
        ..HarnessOptions::default()
    };
    let mut harness = setup_view_harness(quiz_view(), options).await;
    harness
        .store
        .save_progress(
            &UserId::new("player-1").unwrap(),
            &QuizId::new("math-basics").unwrap(),
            &quiz_core::model::ProgressRecord {
                current_index: 1,
                answers: vec![Some("4".into()), None],
                score: 1,
            },
        )
        .await
        .unwrap();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Question 2 of 2"), "progress not restored: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn missing_quiz_renders_not_found() {
    let mut harness =
        setup_view_harness(ViewKind::Quiz("nope".into()), HarnessOptions::default()).await;
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Quiz not found"), "missing not-found in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn signed_out_quiz_never_shows_questions() {
    let options = HarnessOptions {
        user: None,
        ..HarnessOptions::default()
    };
    let mut harness = setup_view_harness(quiz_view(), options).await;
    harness.settle().await;

    let html = harness.render();
    assert!(!html.contains("Question 1 of"), "question rendered for anonymous user: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_shows_user_and_scores() {
    let mut harness = setup_view_harness(ViewKind::Home, HarnessOptions::default()).await;
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Signed in as player-1"), "missing user in {html}");
    assert!(html.contains("Mode: classic"), "missing policy in {html}");
    assert!(html.contains("Scores recorded: 0"), "missing scores in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn register_view_renders_form() {
    let options = HarnessOptions {
        user: None,
        ..HarnessOptions::default()
    };
    let mut harness = setup_view_harness(ViewKind::Register, options).await;
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("Register"), "missing title in {html}");
    assert!(html.contains("Sign in"), "missing submit in {html}");
    assert!(harness.auth.current_user().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn failed_load_stays_on_loading() {
    let options = HarnessOptions {
        offline_reads: true,
        ..HarnessOptions::default()
    };
    let mut harness = setup_view_harness(quiz_view(), options).await;
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Loading..."), "missing loading state in {html}");
    assert!(html.contains("Loading failed"), "missing load error in {html}");
    assert!(!html.contains("What is 2 + 2?"), "question shown after failed load: {html}");
    assert!(!html.contains("Question 1 of 2"), "position shown after failed load: {html}");
}
