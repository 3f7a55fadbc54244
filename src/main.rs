use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

mod app;
mod config;
mod domain;
mod infra;
mod ui;
mod usecase;


const DEFAULT_LOG_FILTER: &str = "tvet_dashboard=info";

fn main() {
    init_tracing();

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create WebView2 data directory");

    #[cfg(feature = "desktop")]
    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("TVET Dashboard"))
                .with_data_directory(webview_data_dir),
        )
        .launch(app::App);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "tvet", "tvet-dashboard")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("session.sqlite"))
}

fn default_config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}
