use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use quiz_core::model::{Feedback, QuizId};
use services::sessions::{CompletedScreen, QuestionScreen};
use services::{AuthProvider, QuizScreen, SessionGuard};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::vm::{QuizIntent, QuizLoad, QuizVm, start_quiz};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

fn feedback_class(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::Correct => "quiz-feedback correct",
        Feedback::Incorrect => "quiz-feedback incorrect",
    }
}

#[component]
pub fn QuizView(quiz_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let session_loop = ctx.session_loop();
    let auth = ctx.auth();
    let parsed_id = QuizId::new(quiz_id).ok();

    let vm = use_signal(|| None::<QuizVm>);
    let screen = use_signal(|| QuizScreen::Loading);
    let error = use_signal(|| None::<ViewError>);

    // Loads started by this mount are dropped once it goes away.
    let guard = use_hook(SessionGuard::new);
    use_drop({
        let guard = guard.clone();
        move || guard.invalidate()
    });

    let _load = use_resource(move || {
        let session_loop = session_loop.clone();
        let guard = guard.clone();
        let parsed_id = parsed_id.clone();
        let mut vm = vm;
        let mut screen = screen;
        let mut error = error;

        async move {
            let Some(quiz_id) = parsed_id else {
                screen.set(QuizScreen::NotFound);
                return;
            };
            match start_quiz(&session_loop, &quiz_id, &guard).await {
                Ok(QuizLoad::Redirect) => {
                    let _ = navigator.replace(Route::Register {});
                }
                Ok(QuizLoad::Stale) => {}
                Ok(QuizLoad::Static(static_screen)) => {
                    screen.set(static_screen);
                    error.set(None);
                }
                Ok(QuizLoad::Ready(loaded)) => {
                    screen.set(loaded.screen());
                    vm.set(Some(loaded));
                    error.set(None);
                }
                Err(err) => {
                    error.set(Some(err));
                }
            }
        }
    });

    // Sign-out or a user switch leaves the quiz.
    use_future(move || {
        let auth = auth.clone();
        let mut vm = vm;
        async move {
            let mut rx = auth.subscribe();
            while rx.changed().await.is_ok() {
                let current = rx.borrow_and_update().clone();
                let redirect = match vm.write().as_mut() {
                    Some(live) => live.on_identity_change(current.as_ref()),
                    None => current.is_none(),
                };
                if redirect {
                    let _ = navigator.replace(Route::Register {});
                    return;
                }
            }
        }
    });

    let dispatch_intent = use_callback(move |intent: QuizIntent| {
        let mut vm = vm;
        let mut screen = screen;
        let mut error = error;

        let result = vm.write().as_mut().map(|live| live.dispatch(intent));
        match result {
            Some(Ok(next)) => {
                screen.set(next);
                error.set(None);
            }
            Some(Err(err)) => error.set(Some(err)),
            None => {}
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuizTestHandles>() {
                handles.register(dispatch_intent, screen);
            }
        }
    }

    let on_key = use_callback(move |evt: KeyboardEvent| match evt.data.key() {
        Key::ArrowLeft => dispatch_intent.call(QuizIntent::Previous),
        Key::ArrowRight => dispatch_intent.call(QuizIntent::Next),
        _ => {}
    });

    let current = screen.read().clone();
    let error_message = error().map(ViewError::message);

    rsx! {
        div { class: "page quiz", tabindex: "0", onkeydown: on_key,
            if let Some(message) = error_message {
                p { class: "error", "{message}" }
            }
            match current {
                QuizScreen::Loading => rsx! {
                    p { "Loading..." }
                },
                QuizScreen::NotFound => rsx! {
                    h2 { "Quiz not found" }
                    Link { to: Route::Home {}, "Back" }
                },
                QuizScreen::Completed(done) => rsx! {
                    CompletedPanel { done }
                },
                QuizScreen::Question(question) => rsx! {
                    QuestionPanel { question, on_intent: dispatch_intent }
                },
            }
        }
    }
}

#[component]
fn QuestionPanel(question: QuestionScreen, on_intent: Callback<QuizIntent>) -> Element {
    let position = question.position_label();
    let selected_text = question
        .selected
        .as_deref()
        .map(|answer| format!("Your answer: {answer}"));

    rsx! {
        h2 { "{question.quiz_name}" }
        p { class: "quiz-position", "{position}" }
        h3 { class: "quiz-prompt", "{question.prompt}" }
        ul { class: "quiz-options",
            {question.options.iter().map(|option| {
                let label = option.label.clone();
                let class = if option.selected { "quiz-option selected" } else { "quiz-option" };
                rsx! {
                    li { key: "{option.label}",
                        button {
                            class,
                            onclick: move |_| on_intent.call(QuizIntent::Select(label.clone())),
                            "{option.label}"
                        }
                    }
                }
            })}
        }
        if let Some(text) = selected_text {
            p { class: "quiz-selected", "{text}" }
        }
        if let Some(feedback) = question.feedback {
            p { class: feedback_class(feedback), "{feedback.message()}" }
        }
        div { class: "quiz-nav",
            if question.show_previous {
                button { id: "quiz-previous", onclick: move |_| on_intent.call(QuizIntent::Previous), "Previous" }
            }
            if question.show_next {
                button { id: "quiz-next", onclick: move |_| on_intent.call(QuizIntent::Next), "Next" }
            }
            if question.show_finish {
                button { id: "quiz-finish", onclick: move |_| on_intent.call(QuizIntent::Finish), "Finish" }
            }
        }
    }
}

#[component]
fn CompletedPanel(done: CompletedScreen) -> Element {
    rsx! {
        h2 { "Quiz complete" }
        p { class: "quiz-score", "Your score: {done.score_label()}" }
        Link { to: Route::Home {}, "Back" }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
    screen: Rc<RefCell<Option<Signal<QuizScreen>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<QuizIntent>, screen: Signal<QuizScreen>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.screen.borrow_mut() = Some(screen);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }

    pub(crate) fn screen(&self) -> Signal<QuizScreen> {
        (*self.screen.borrow()).expect("quiz screen registered")
    }
}
