//! Dashboard loop: terminal lifecycle, tick/input multiplexing, drawing.

use std::{io, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time;

use crate::action::XdpAction;
use crate::map::CounterSource;
use crate::stats::{self, RateRecord, Snapshot};
use crate::ui;

pub struct App {
    interval: Duration,
    previous: Option<Snapshot>,
}

impl App {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            previous: None,
        }
    }

    /// Runs the dashboard until quit or error. The terminal is restored on
    /// every exit path, error returns included.
    pub async fn run(&mut self, source: &impl CounterSource) -> Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, source).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    /// One event at a time: either the sampling ticker fires and the table
    /// is resampled and redrawn, or an input event arrives. Sampling errors
    /// end the loop; there are no retries.
    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        source: &impl CounterSource,
    ) -> Result<()> {
        let mut events = EventStream::new();
        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let current = stats::collect(source).context("collecting stats")?;
                    let rates = self.advance(&current);
                    terminal.draw(|f| ui::draw_stats_table(f, &current, rates.as_ref()))?;
                }
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if is_quit(&key) => break,
                        Some(Ok(_)) => {}
                        Some(Err(err)) => return Err(err).context("reading terminal events"),
                        None => break,
                    }
                }
            }
        }

        Ok(())
    }

    /// Retires the previous snapshot and computes rates against it. The
    /// first sample has no predecessor, so the first frame shows totals
    /// only.
    fn advance(&mut self, current: &Snapshot) -> Option<[RateRecord; XdpAction::COUNT]> {
        let rates = self
            .previous
            .as_ref()
            .map(|prev| stats::compute_rates(prev, current));
        self.previous = Some(*current);
        rates
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::map::CounterPair;
    use crate::stats::SlotSnapshot;

    fn snapshot(taken_at: Instant, packets: u64, bytes: u64) -> Snapshot {
        let slot = SlotSnapshot {
            taken_at,
            total: CounterPair { packets, bytes },
        };
        Snapshot {
            slots: [slot; XdpAction::COUNT],
        }
    }

    #[test]
    fn first_tick_has_no_rates() {
        let mut app = App::new(Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(app.advance(&snapshot(t0, 100, 1000)).is_none());

        let rates = app
            .advance(&snapshot(t0 + Duration::from_secs(1), 150, 2000))
            .expect("second tick computes rates");
        assert!((rates[0].packets_per_sec - 50.0).abs() < 1e-9);
    }

    #[test]
    fn retained_snapshot_is_replaced_each_tick() {
        let mut app = App::new(Duration::from_secs(1));
        let t0 = Instant::now();

        app.advance(&snapshot(t0, 0, 0));
        app.advance(&snapshot(t0 + Duration::from_secs(1), 100, 0));
        let rates = app
            .advance(&snapshot(t0 + Duration::from_secs(2), 300, 0))
            .unwrap();
        // diffed against the second snapshot, not the first
        assert!((rates[0].packets_per_sec - 200.0).abs() < 1e-9);
    }

    #[test]
    fn quit_keys() {
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let other = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert!(is_quit(&q));
        assert!(is_quit(&ctrl_c));
        assert!(!is_quit(&other));
    }
}
