use anyhow::Result;
use clap::Parser;
use eframe::egui;

use benchplot::app::BenchplotApp;
use benchplot::charts::{self, ChartContext, Figure};
use benchplot::cli::Cli;
use benchplot::config::PlotConfig;
use benchplot::data::{CommandGenerator, TableStore};
use benchplot::export;
use benchplot::state::{AppState, Failure};

/// Build every requested figure. A failing figure is logged and recorded; the
/// rest are still built.
fn build_figures(cli: &Cli, ctx: &ChartContext<'_>) -> (Vec<Figure>, Vec<Failure>) {
    let mut figures = Vec::new();
    let mut failures = Vec::new();
    for &experiment in &cli.experiments {
        for (what, result) in charts::build(experiment, ctx, &cli.datasets) {
            match result {
                Ok(figure) => figures.push(figure),
                Err(e) => {
                    log::error!("{what}: {e:#}");
                    failures.push(Failure {
                        what,
                        reason: format!("{e:#}"),
                    });
                }
            }
        }
    }
    (figures, failures)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("benchplot=info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PlotConfig::load(path)?,
        None => PlotConfig::default(),
    };
    let store = TableStore::new(CommandGenerator::new(&cli.generator));
    let ctx = ChartContext {
        store: &store,
        root: &cli.root,
        trials: cli.trials,
        config: &config,
    };

    let (figures, failures) = build_figures(&cli, &ctx);
    log::info!("built {} figures, {} failed", figures.len(), failures.len());

    if cli.save_plots {
        for figure in &figures {
            match export::save_figure(figure, &cli.figures_dir) {
                Ok(path) => log::info!("saved {}", path.display()),
                Err(e) => log::error!("saving {}: {e:#}", figure.name),
            }
        }
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let state = AppState::new(figures, failures);
    eframe::run_native(
        "Benchplot",
        options,
        Box::new(move |_cc| Ok(Box::new(BenchplotApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the viewer: {e}"))
}
