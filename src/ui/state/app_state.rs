use std::sync::Arc;

use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::resource::ResourceKind;
use crate::domain::entities::session::Session;

pub struct AppState {
    pub session: Signal<Option<Arc<Session>>>,
    pub selected_resource: Signal<Option<ResourceKind>>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new(initial_session: Option<Arc<Session>>) -> Self {
        let first_resource = initial_session
            .as_ref()
            .and_then(|session| session.role.resources().first().copied());
        Self {
            session: use_signal(move || initial_session),
            selected_resource: use_signal(move || first_resource),
            status: use_signal(|| "Ready".to_string()),
        }
    }
}
