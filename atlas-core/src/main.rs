//! src/main.rs
//! Atlas: browse the world's countries from the terminal

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tokio::{
    signal,
    sync::{Notify, mpsc},
};
use tracing::{debug, error, info, warn};

use atlas_core::{
    api::client::RestCountriesClient,
    cache::data_store::DataStore,
    config::Config,
    controller::{
        actions::Action,
        app_controller::AppController,
        event_loop::{EventLoop, TaskResult},
        router::HOME_PATH,
    },
    logging::init_logging,
    prefs::FilePreferenceStore,
    view::{theme::ThemeManager, ui::UIRenderer},
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Parser)]
#[command(name = "atlas", version, about = "Browse countries from the REST Countries API")]
struct Cli {
    /// Initial route, e.g. `/` or `/BEL`.
    #[arg(default_value = HOME_PATH)]
    route: String,

    /// Override the API base URL from the config file.
    #[arg(long)]
    api_url: Option<String>,

    /// Override the log level from the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().await.unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        Config::default()
    });
    if let Some(url) = cli.api_url.clone() {
        config.api.base_url = url;
    }
    if let Some(level) = cli.log_level.clone() {
        config.logging.level = level;
    }

    let log_dir = config.log_dir().context("Failed to resolve log directory")?;
    let _log_guard = init_logging(log_dir, &config.logging.level)
        .await
        .context("Failed to initialize logging")?;

    setup_panic_handler();
    info!(version = env!("CARGO_PKG_VERSION"), "Starting Atlas");

    let app = App::new(config, &cli.route).context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    event_loop: EventLoop,
    controller: AppController,
    ui_renderer: UIRenderer,
    prefs: Arc<FilePreferenceStore>,
    shutdown: Arc<Notify>,
    mouse: bool,
}

impl App {
    fn new(config: Config, initial_route: &str) -> Result<Self> {
        let client = RestCountriesClient::new(&config.api.base_url, config.api.timeout)
            .context("Failed to build API client")?;
        let store = Arc::new(DataStore::new(Arc::new(client), config.cache.clone()));

        let prefs_dir = Config::config_dir().context("Failed to resolve config directory")?;
        let prefs = Arc::new(FilePreferenceStore::in_dir(&prefs_dir));
        let theme = ThemeManager::detect(prefs.clone());

        let (task_tx, task_rx) = mpsc::unbounded_channel::<TaskResult>();
        let event_loop = EventLoop::new(task_rx, config.ui.tick_rate);
        let mut controller = AppController::new(store, theme, task_tx, &config.ui);

        let terminal = setup_terminal(config.ui.mouse).context("Failed to initialize terminal")?;
        let size = terminal.size().context("Failed to read terminal size")?;
        controller.dispatch(Action::Resize(size.width, size.height));
        controller.start(initial_route);

        info!("Application initialized successfully");
        Ok(Self {
            terminal,
            event_loop,
            controller,
            ui_renderer: UIRenderer::new(),
            prefs,
            shutdown: Arc::new(Notify::new()),
            mouse: config.ui.mouse,
        })
    }

    async fn run(mut self) -> Result<()> {
        self.setup_shutdown_handler();
        let mut last_metrics_log = Instant::now();

        loop {
            self.render()?;

            if last_metrics_log.elapsed() >= Duration::from_secs(30) {
                last_metrics_log = Instant::now();
                self.log_metrics();
            }

            let ctx = self.controller.input_context();
            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("Shutdown signal received");
                    break;
                }

                action = self.event_loop.next_action(ctx) => {
                    let Some(action) = action else {
                        info!("Event sources closed");
                        break;
                    };
                    if !self.dispatch(action) {
                        break;
                    }
                }
            }
        }

        self.log_metrics();
        self.prefs.flush().await;
        info!("Event loop terminated cleanly");
        Ok(())
    }

    fn dispatch(&mut self, action: Action) -> bool {
        let action = match action {
            Action::Click { column, row } => match self.ui_renderer.hit_test(column, row) {
                Some(activation) => Action::Activate(activation),
                None => return true,
            },
            other => other,
        };
        if !matches!(action, Action::Tick) {
            debug!(?action, "Dispatching action");
        }
        self.controller.dispatch(action)
    }

    fn render(&mut self) -> Result<()> {
        if !self.controller.ui().needs_redraw() {
            return Ok(());
        }

        let start = Instant::now();
        let Self {
            terminal,
            controller,
            ui_renderer,
            ..
        } = self;
        terminal
            .draw(|frame: &mut Frame<'_>| ui_renderer.render(frame, controller))
            .context("Failed to draw terminal")?;
        self.controller.ui().clear_redraw();

        let duration = start.elapsed();
        if duration.as_millis() > 16 {
            warn!("Slow render: {}ms (target: <16ms)", duration.as_millis());
        }
        Ok(())
    }

    fn log_metrics(&self) {
        let loop_metrics = self.event_loop.metrics();
        let render_stats = self.ui_renderer.stats();
        let names = self.controller.store().names().stats();
        info!(
            terminal_events = loop_metrics.terminal_events,
            tasks = loop_metrics.tasks,
            ticks = loop_metrics.ticks,
            frames = render_stats.frames,
            slow_frames = render_stats.slow,
            fps = render_stats.fps(),
            name_cache_hits = names.hits,
            name_cache_misses = names.misses,
            "Runtime metrics"
        );
    }

    fn setup_shutdown_handler(&self) {
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                match (
                    signal(SignalKind::terminate()),
                    signal(SignalKind::hangup()),
                ) {
                    (Ok(mut sigterm), Ok(mut sighup)) => {
                        tokio::select! {
                            _ = sigterm.recv() => info!("Received SIGTERM"),
                            _ = sighup.recv() => info!("Received SIGHUP"),
                            _ = signal::ctrl_c() => info!("Received Ctrl+C"),
                        }
                    }
                    _ => {
                        warn!("Failed to install signal handlers, only Ctrl+C is handled");
                        if signal::ctrl_c().await.is_err() {
                            return;
                        }
                    }
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                info!("Received Ctrl+C");
            }

            shutdown.notify_one();
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal, self.mouse) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn setup_terminal(mouse: bool) -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    if mouse {
        execute!(stdout, EnableMouseCapture).context("Failed to enable mouse capture")?;
    }

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal, mouse: bool) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)
            .context("Failed to disable mouse capture")?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
