use std::{
    backtrace::Backtrace,
    io::{self, Stdout},
    panic,
    time::Duration,
};

use crossterm::{
    cursor,
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::{Stream, StreamExt};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{
    colors::Theme,
    events::{classify, Action},
    grid_view::render_grid,
};
use crate::{
    config::Config,
    error::Result,
    layout::{build_grid, Grid, Layout},
    metrics::Collector,
    widgets::{instantiate, Sources, WidgetHandle, WidgetOptions},
};

/// The widget grid plus everything that keeps it fed and on screen.
pub struct Dashboard {
    grid: Grid<WidgetHandle>,
    theme: Theme,
    redraw_interval: Duration,
    root: CancellationToken,
    collectors: Vec<Collector>,
}

impl Dashboard {
    pub fn new(layout: &Layout, config: &Config, theme: Theme) -> Self {
        let opts = WidgetOptions::new(config, &theme);
        let grid = build_grid(layout, |spec| instantiate(spec, &opts));
        Self {
            grid,
            theme,
            redraw_interval: config.update_interval(),
            root: CancellationToken::new(),
            collectors: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Grid<WidgetHandle> {
        &self.grid
    }

    /// Token cancelled when the dashboard stops; collectors hang off it.
    pub fn cancel_token(&self) -> CancellationToken {
        self.root.clone()
    }

    /// Spawns one collector per widget that has a data source.
    #[tracing::instrument(skip_all)]
    pub fn start_collectors(&mut self, sources: &Sources) {
        for widget in self.grid.items() {
            if let Some(collector) = widget.spawn_collector(sources, &self.root) {
                debug!(collector = collector.name(), "collector started");
                self.collectors.push(collector);
            }
        }
        info!(count = self.collectors.len(), "collectors started");
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        render_grid(f, area, &mut self.grid, &self.theme);
    }

    /// Redraws on every tick and handles terminal events until asked to quit.
    pub async fn run<B, S>(&mut self, terminal: &mut Terminal<B>, mut events: S) -> Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        let root = self.root.clone();
        let signal = shutdown_signal();
        tokio::pin!(signal);

        let mut ticker = time::interval(self.redraw_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let res: Result<()> = loop {
            tokio::select! {
                biased;
                _ = root.cancelled() => break Ok(()),
                _ = &mut signal => {
                    info!("termination signal received");
                    break Ok(());
                }
                _ = ticker.tick() => {
                    if let Err(e) = terminal.draw(|f| self.draw(f)) {
                        break Err(e.into());
                    }
                }
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => match classify(&event) {
                        Action::Quit => break Ok(()),
                        Action::Resize(w, h) => {
                            debug!(w, h, "terminal resized");
                            if let Err(e) = self.redraw_resized(terminal) {
                                break Err(e.into());
                            }
                        }
                        Action::Ignore => {}
                    },
                    Some(Err(e)) => warn!(error = %e, "terminal event error"),
                    None => break Ok(()),
                },
            }
        };

        self.shutdown();
        res
    }

    fn redraw_resized<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.autoresize()?;
        terminal.clear()?;
        terminal.draw(|f| self.draw(f))?;
        Ok(())
    }

    /// Cancels every collector and in-flight fetch.
    pub fn shutdown(&mut self) {
        self.root.cancel();
        for collector in self.collectors.drain(..) {
            collector.shutdown();
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Resolves on Ctrl-C or SIGTERM. A handler that can't be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Leaves raw mode and the alternate screen and shows the cursor again.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)
}

/// Logs panics with a backtrace and gives the terminal back before the
/// default hook prints.
pub fn install_panic_hook() {
    let default = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let bt = Backtrace::force_capture();
        error!(target: "panic", "panic: {panic_info}\n\nBacktrace:\n{bt}");
        let _ = restore_terminal();
        default(panic_info);
    }));
}

/// Runs `dashboard` on the real terminal until the user quits.
#[tracing::instrument(skip_all)]
pub async fn run_dashboard(mut dashboard: Dashboard, sources: Sources) -> Result<()> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;
    dashboard.start_collectors(&sources);

    let res = dashboard.run(&mut terminal, EventStream::new()).await;

    let restored = restore_terminal();
    res?;
    restored?;
    Ok(())
}
