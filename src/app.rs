use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use dioxus::prelude::*;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::domain::entities::filter::FilterKind;
use crate::domain::entities::resource::ResourceKind;
use crate::domain::entities::session::{Role, Session};
use crate::domain::entities::stats::count_by;
use crate::infra::http::fetcher::HttpEntityFetcher;
use crate::infra::sqlite::session_store::SqliteSessionStore;
use crate::ui::format::{cell_text, showing_label, table_container_style, table_header_cell_style};
use crate::ui::state::app_state::AppState;
use crate::usecase::services::collection_controller::{CollectionController, FetchTicket};
use crate::usecase::services::query_service::QueryService;
use crate::usecase::services::session_service::SessionService;
use crate::{default_config_dir, default_db_path};

#[derive(Clone)]
struct Boot {
    config: AppConfig,
    sessions: Arc<SessionService>,
    session: Option<Arc<Session>>,
}

fn boot_dashboard() -> Result<Boot> {
    let config = AppConfig::load(&default_config_dir()?)?.with_env_overrides();
    let store = SqliteSessionStore::new(default_db_path()?)?;
    let sessions = Arc::new(SessionService::new(Arc::new(store)));
    let session = sessions.hydrate()?;
    info!(api = %config.api_base_url, restored = session.is_some(), "dashboard started");
    Ok(Boot {
        config,
        sessions,
        session,
    })
}

/// Runs `ticket` in the background and hands the outcome back to the controller.
fn dispatch(
    mut controller: Signal<CollectionController>,
    service: QueryService,
    ticket: Option<FetchTicket>,
) {
    let Some(ticket) = ticket else {
        return;
    };
    spawn(async move {
        let result = service.run(&ticket).await;
        let follow_up = {
            let mut current = controller.write();
            current.complete(ticket.generation, result);
            current.refill()
        };
        dispatch(controller, service, follow_up);
    });
}

fn filter_placeholder(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Equality { .. } => "exact value or all",
        FilterKind::Boolean => "true / false / all",
        FilterKind::NumericRange => "min..max",
        FilterKind::DateRange => "YYYY-MM-DD..YYYY-MM-DD",
        FilterKind::Substring => "contains",
    }
}

#[component]
pub fn App() -> Element {
    let boot = use_hook(|| boot_dashboard().map_err(|err| format!("{err:#}")));
    let initial_session = boot.as_ref().ok().and_then(|b| b.session.clone());
    let AppState {
        mut session,
        mut selected_resource,
        mut status,
    } = AppState::new(initial_session);

    let boot = match boot {
        Ok(boot) => boot,
        Err(err) => {
            return rsx! {
                div {
                    p { "Failed to start the dashboard: {err}" }
                }
            };
        }
    };

    let sessions_for_login = boot.sessions.clone();
    let sessions_for_logout = boot.sessions.clone();
    let config = boot.config.clone();
    let current_session = session();
    let status_text = status();

    rsx! {
        div {
            style: "font-family: 'Noto Sans', sans-serif; padding: 12px; height: 100vh; display: flex; flex-direction: column; overflow: hidden; box-sizing: border-box;",

            h2 { "TVET Oversight Dashboard" }
            p { style: "color: #555; margin: 0 0 8px 0;", "{status_text}" }

            if let Some(active) = current_session {
                Dashboard {
                    session: active,
                    config: config,
                    selected: selected_resource,
                    on_logout: move |_| {
                        match sessions_for_logout.logout() {
                            Ok(()) => {
                                session.set(None);
                                selected_resource.set(None);
                                status.set("Logged out".to_string());
                            }
                            Err(err) => {
                                error!(error = %err, "logout failed");
                                status.set(format!("Logout failed: {err}"));
                            }
                        }
                    },
                }
            } else {
                LoginPanel {
                    on_login: move |next: Session| {
                        match sessions_for_login.login(next) {
                            Ok(active) => {
                                selected_resource.set(active.role.resources().first().copied());
                                status.set(format!("Signed in as {}", active.email));
                                session.set(Some(active));
                            }
                            Err(err) => {
                                error!(error = %err, "saving session failed");
                                status.set(format!("Sign-in failed: {err}"));
                            }
                        }
                    },
                }
            }
        }
    }
}

/// Accepts a token issued by the external auth service.
#[component]
fn LoginPanel(on_login: EventHandler<Session>) -> Element {
    let mut email = use_signal(String::new);
    let mut token = use_signal(String::new);
    let mut role = use_signal(|| Role::MinistryOfEducation);
    let mut problem = use_signal(|| None::<String>);
    let problem_text = problem();
    let email_text = email();
    let token_text = token();

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 8px; max-width: 360px;",
            input {
                placeholder: "Email",
                value: "{email_text}",
                oninput: move |event| email.set(event.value()),
            }
            input {
                placeholder: "Access token",
                r#type: "password",
                value: "{token_text}",
                oninput: move |event| token.set(event.value()),
            }
            select {
                onchange: move |event| {
                    if let Ok(next) = Role::from_str(&event.value()) {
                        role.set(next);
                    }
                },
                option { value: "MINISTRY_OF_EDUCATION", "Ministry of Education" }
                option { value: "SERVICE_PROVIDER", "Service Provider" }
                option { value: "INSTITUTION", "Institution" }
            }
            button {
                onclick: move |_| {
                    let email_value = email().trim().to_string();
                    let token_value = token().trim().to_string();
                    if email_value.is_empty() || token_value.is_empty() {
                        problem.set(Some("Email and token are required".to_string()));
                        return;
                    }
                    problem.set(None);
                    on_login.call(Session {
                        token: token_value,
                        email: email_value,
                        role: role(),
                    });
                },
                "Sign in"
            }
            if let Some(text) = problem_text {
                p { style: "color: #b00020;", "{text}" }
            }
        }
    }
}

#[component]
fn Dashboard(
    session: Arc<Session>,
    config: AppConfig,
    selected: Signal<Option<ResourceKind>>,
    on_logout: EventHandler<()>,
) -> Element {
    let mut selected = selected;
    let role = session.role;
    let title = role.dashboard_title();
    let email = session.email.clone();
    let current = selected().or_else(|| role.resources().first().copied());

    rsx! {
        div {
            style: "display: flex; gap: 8px; align-items: center; margin-bottom: 12px;",
            strong { "{title}" }
            span { style: "color: #666;", "{email}" }
            {role.resources().iter().map(|kind| {
                let kind = *kind;
                let label = kind.label();
                let background = if current == Some(kind) { "#eef4ff" } else { "#fff" };
                rsx!(
                    button {
                        key: "{label}",
                        style: "border: 1px solid #bbb; background: {background}; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                        onclick: move |_| selected.set(Some(kind)),
                        "{label}"
                    }
                )
            })}
            button {
                style: "margin-left: auto;",
                onclick: move |_| on_logout.call(()),
                "Log out"
            }
        }

        if let Some(kind) = current {
            CollectionScreen {
                key: "{kind:?}",
                kind: kind,
                session: session.clone(),
                config: config.clone(),
            }
        }
    }
}

#[component]
fn CollectionScreen(kind: ResourceKind, session: Arc<Session>, config: AppConfig) -> Element {
    let controller_config = config.controller();
    let mut controller =
        use_signal(move || CollectionController::for_resource(kind, controller_config));
    let service = use_hook(|| {
        HttpEntityFetcher::new(
            &config.api_base_url,
            kind,
            Some(session.clone()),
            config.request_timeout(),
        )
        .map(|fetcher| QueryService::new(Arc::new(fetcher)))
        .map_err(|err| format!("{err:#}"))
    });

    let service_for_load = service.clone();
    use_effect(move || {
        if let Ok(service) = service_for_load.clone() {
            let ticket = controller.write().load();
            dispatch(controller, service, Some(ticket));
        }
    });

    let service = match service {
        Ok(service) => service,
        Err(err) => {
            return rsx! {
                p { style: "color: #b00020;", "Cannot create the data client: {err}" }
            };
        }
    };

    let snapshot = controller.read();
    let view = snapshot.view();
    let summary = count_by(&snapshot.working_set(), kind.summary_field());
    let specs = snapshot.filters().specs().to_vec();
    let search_term = snapshot.search().term.clone();
    let page_size = snapshot.client_state().client_page_size;
    drop(snapshot);

    let columns = kind.columns();
    let showing = showing_label(&view, page_size);
    let client_page = view.client_page;
    let total_pages = view.total_pages.max(1);
    let error_text = view.error.as_ref().map(|err| err.to_string());
    let summary_field = kind.summary_field();

    let service_for_search = service.clone();
    let service_for_reset = service.clone();
    let service_for_prev = service.clone();
    let service_for_next = service.clone();
    let service_for_retry = service.clone();

    rsx! {
        div {
            style: "display: flex; gap: 12px; flex-wrap: wrap; margin-bottom: 8px;",
            {summary.iter().map(|(value, count)| {
                let value = value.clone();
                let count = *count;
                rsx!(
                    div {
                        key: "{value}",
                        style: "border: 1px solid #ddd; border-radius: 8px; padding: 8px 12px; min-width: 120px;",
                        div { style: "color: #666; font-size: 12px;", "{summary_field}: {value}" }
                        div { style: "font-size: 20px; font-weight: 600;", "{count}" }
                    }
                )
            })}
        }

        div {
            style: "display: flex; gap: 8px; flex-wrap: wrap; align-items: center; margin-bottom: 8px;",
            input {
                placeholder: "Search",
                value: "{search_term}",
                oninput: move |event| {
                    let ticket = controller.write().set_search(&event.value());
                    dispatch(controller, service_for_search.clone(), ticket);
                },
            }
            {specs.into_iter().map(|spec| {
                let key_field = spec.field.clone();
                let label_field = spec.field.clone();
                let select_field = spec.field.clone();
                let input_field = spec.field.clone();
                let service_for_select = service.clone();
                let service_for_input = service.clone();
                let placeholder = filter_placeholder(spec.kind);
                let is_boolean = spec.kind == FilterKind::Boolean;
                rsx!(
                    label {
                        key: "{key_field}",
                        style: "display: inline-flex; gap: 4px; align-items: center;",
                        span { "{label_field}" }
                        if is_boolean {
                            select {
                                onchange: move |event| {
                                    let ticket = controller.write().set_filter_input(&select_field, &event.value());
                                    dispatch(controller, service_for_select.clone(), ticket);
                                },
                                option { value: "all", "All" }
                                option { value: "true", "Yes" }
                                option { value: "false", "No" }
                            }
                        } else {
                            input {
                                placeholder: "{placeholder}",
                                onchange: move |event| {
                                    let ticket = controller.write().set_filter_input(&input_field, &event.value());
                                    dispatch(controller, service_for_input.clone(), ticket);
                                },
                            }
                        }
                    }
                )
            })}
            button {
                onclick: move |_| {
                    let ticket = controller.write().reset();
                    dispatch(controller, service_for_reset.clone(), Some(ticket));
                },
                "Reset"
            }
        }

        if let Some(text) = error_text {
            div {
                style: "display: flex; gap: 8px; align-items: center; background: #fdecea; color: #b00020; padding: 8px 12px; border-radius: 6px; margin-bottom: 8px;",
                span { "{text}" }
                button {
                    onclick: move |_| {
                        let ticket = controller.write().retry();
                        dispatch(controller, service_for_retry.clone(), ticket);
                    },
                    "Retry"
                }
                button {
                    onclick: move |_| controller.write().dismiss_error(),
                    "Dismiss"
                }
            }
        }

        if view.is_loading {
            p { style: "color: #666; margin: 4px 0;", "Loading…" }
        }

        div {
            style: table_container_style(),
            table {
                style: "border-collapse: collapse; width: 100%;",
                thead {
                    tr {
                        {columns.iter().map(|column| {
                            let label = column.label;
                            rsx!(th { key: "{label}", style: table_header_cell_style(), "{label}" })
                        })}
                    }
                }
                tbody {
                    {view.items.iter().map(|entity| {
                        let row_key = entity.id.0.clone();
                        rsx!(
                            tr {
                                key: "{row_key}",
                                {columns.iter().map(|column| {
                                    let field = column.field;
                                    let text = cell_text(entity, field);
                                    rsx!(td { key: "{field}", style: "padding: 4px 10px; border-bottom: 1px solid #eee;", "{text}" })
                                })}
                            }
                        )
                    })}
                }
            }
        }

        div {
            style: "display: flex; gap: 8px; align-items: center; margin-top: 8px;",
            button {
                disabled: client_page <= 1,
                onclick: move |_| {
                    let target = i64::try_from(client_page).unwrap_or(i64::MAX) - 1;
                    let ticket = controller.write().go_to_page(target);
                    dispatch(controller, service_for_prev.clone(), ticket);
                },
                "Previous"
            }
            span { "Page {client_page} of {total_pages}" }
            button {
                disabled: client_page >= total_pages,
                onclick: move |_| {
                    let target = i64::try_from(client_page).unwrap_or(i64::MAX - 1) + 1;
                    let ticket = controller.write().go_to_page(target);
                    dispatch(controller, service_for_next.clone(), ticket);
                },
                "Next"
            }
            span { style: "color: #666;", "{showing}" }
        }
    }
}
