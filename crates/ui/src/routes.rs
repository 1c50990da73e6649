use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{HomeView, QuizView, RegisterView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/quiz/:quiz_id", QuizView)] Quiz { quiz_id: String },
        #[route("/register", RegisterView)] Register {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            TopBar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn TopBar() -> Element {
    let ctx = use_context::<AppContext>();
    let quiz_id = ctx.default_quiz_id().to_string();

    rsx! {
        nav { class: "topbar",
            h1 { "Quiz" }
            div {
                Link { to: Route::Home {}, "Home" }
                Link { to: Route::Quiz { quiz_id }, "Play" }
            }
        }
    }
}
