use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let quiz_id = ctx.default_quiz_id().clone();
    let session_loop = ctx.session_loop();
    let policy = session_loop.policy();

    let scores = {
        let quiz_id = quiz_id.clone();
        use_resource(move || {
            let session_loop = session_loop.clone();
            let quiz_id = quiz_id.clone();
            async move {
                session_loop
                    .store()
                    .list_scores(&quiz_id)
                    .await
                    .map(|scores| scores.len())
                    .map_err(|_| ViewError::LoadFailed)
            }
        })
    };
    let scores_state = view_state_from_resource(scores);
    let quiz_id = quiz_id.to_string();

    rsx! {
        div { class: "page",
            h2 { "Home" }
            match ctx.current_user() {
                Some(user) => rsx! {
                    p { "Signed in as {user}" }
                },
                None => rsx! {
                    p { "Not signed in." }
                    Link { to: Route::Register {}, "Register" }
                },
            }
            p { "Mode: {policy}" }
            match scores_state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading scores..." }
                },
                ViewState::Ready(count) => rsx! {
                    p { "Scores recorded: {count}" }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                },
            }
            Link { to: Route::Quiz { quiz_id: quiz_id.clone() }, "Start quiz {quiz_id}" }
        }
    }
}
