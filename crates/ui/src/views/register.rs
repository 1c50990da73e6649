use dioxus::prelude::*;
use dioxus_router::use_navigator;

use quiz_core::model::UserId;

use crate::context::AppContext;
use crate::routes::Route;

/// Sign-in surface the quiz screen redirects to when nobody is signed in.
#[component]
pub fn RegisterView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let auth = ctx.auth();
    let quiz_id = ctx.default_quiz_id().to_string();

    let mut name = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        match UserId::new(name()) {
            Ok(user) => {
                auth.sign_in(user);
                error.set(None);
                let _ = navigator.push(Route::Quiz {
                    quiz_id: quiz_id.clone(),
                });
            }
            Err(err) => error.set(Some(err.to_string())),
        }
    };

    rsx! {
        div { class: "page",
            h2 { "Register" }
            p { "Choose a name to keep your progress and scores." }
            form { onsubmit: on_submit,
                input {
                    id: "register-name",
                    placeholder: "Your name",
                    value: "{name}",
                    oninput: move |evt| name.set(evt.value()),
                }
                button { r#type: "submit", "Sign in" }
            }
            if let Some(message) = error() {
                p { class: "error", "{message}" }
            }
        }
    }
}
