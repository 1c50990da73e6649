mod home;
mod quiz;
mod register;
mod state;

pub use home::HomeView;
pub use quiz::QuizView;
pub use register::RegisterView;
pub use state::{ViewError, ViewState, view_state_from_resource};

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;
