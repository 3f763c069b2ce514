//! Role-based routing: a pure function of session state to the screen that
//! should be shown. Re-evaluated on every state change; holds no state of
//! its own.

use crate::models::Role;
use crate::session::SessionState;

/// The screen trees the client can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Login,
    MechanicHome,
    Dashboard,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Login => "login",
            Self::MechanicHome => "mechanic",
            Self::Dashboard => "dashboard",
        }
    }
}

/// Decision tree: loading wins, then authentication, then role. Admins and
/// assistants share the default dashboard tree.
pub fn route(state: &SessionState) -> Screen {
    if state.loading {
        return Screen::Loading;
    }
    if !state.is_authenticated() {
        return Screen::Login;
    }
    match state.user.as_ref().and_then(|user| user.role) {
        Some(Role::Mechanic) => Screen::MechanicHome,
        _ => Screen::Dashboard,
    }
}
