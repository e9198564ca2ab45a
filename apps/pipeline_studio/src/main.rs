use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use studio_core::TokioDeferral;
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod controller;
mod ui;

use app_state::{load_initial_pipeline, StudioServices};
use controller::{
    events::UiEvent, orchestration::post_ui_event, top_panel::TopPanelController,
};
use ui::app::StudioApp;

#[derive(Parser, Debug)]
#[command(name = "pipeline-studio", about = "Desktop editor for data pipelines")]
struct Args {
    /// Settings file (defaults to the per-user config directory).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Exported pipeline JSON to open as a copy.
    #[arg(long)]
    clone: Option<PathBuf>,
    #[arg(long)]
    name: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = config::load_settings(args.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let initial = load_initial_pipeline(&settings, args.clone.as_deref(), args.name.as_deref())?;
    tracing::info!(
        name = %initial.config.name,
        artifact = %initial.config.artifact,
        cloned = initial.cloned_from.is_some(),
        "opening pipeline"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("failed to build deferral runtime")?;

    let (ui_tx, ui_rx) = bounded::<UiEvent>(settings.event_queue_capacity);
    let deferral_tx = ui_tx.clone();
    let deferral = Arc::new(TokioDeferral::new(runtime.handle().clone(), move |handle, action| {
        post_ui_event(&deferral_tx, UiEvent::Deferred { handle, action })
    }));

    let services = StudioServices::new(initial.config);
    let controller = TopPanelController::new(
        services.top_panel_deps(deferral, ui_tx.clone()),
        initial.cloned_from,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(settings.window_title.clone())
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        &settings.window_title,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(StudioApp::new(
                controller, services, ui_tx, ui_rx, runtime,
            )))
        }),
    )
    .map_err(|err| anyhow!("studio window failed: {err}"))
}
