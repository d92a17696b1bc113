//! Periodic reporting of a [`Tally`].
//!
//! A [`Reporter`] wakes up on a fixed interval, takes a snapshot of the
//! tally, renders it with the configured [`ReportFormat`] and writes it to
//! its sink. Empty snapshots produce no output.
//!
//! ```text
//!   Idle ──run()──► Running ──token.cancel()──► Stopped
//!                     │  ▲
//!              tick   │  │ render + write
//!                     ▼  │
//!                   snapshot
//! ```
//!
//! The first report is written one full interval after `run` starts. The
//! loop waits on the timer and on a [`CancellationToken`] at the same time,
//! checking cancellation first, so a tick that races with cancellation
//! writes nothing and no final report is produced on shutdown.

use std::io::Write;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::counters::Observable;
use crate::observers::{Renderer, ReportFormat, Result};
use crate::tally::{Snapshot, Tally};

/// Smallest interval accepted by the reporter.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodic snapshot printer.
///
/// # Examples
///
/// ```rust
/// use conteggio::reporter::Reporter;
/// use conteggio::tally::Tally;
/// use std::time::Duration;
///
/// let tally = Tally::new();
/// tally.increment("checkout");
///
/// let reporter = Reporter::new(&tally, Duration::from_secs(30));
/// let mut out = Vec::new();
/// reporter.report(&mut out).unwrap();
/// assert_eq!(out, b"\"checkout\" - 1\n\n");
/// ```
pub struct Reporter<'a> {
    tally: &'a Tally,
    interval: Duration,
    renderer: Renderer,
    counters: Vec<&'a dyn Observable>,
}

impl<'a> Reporter<'a> {
    /// Creates a reporter for `tally` using the text format.
    ///
    /// Intervals shorter than [`MIN_INTERVAL`] are raised to it.
    pub fn new(tally: &'a Tally, interval: Duration) -> Self {
        Self {
            tally,
            interval: interval.max(MIN_INTERVAL),
            renderer: Renderer::default(),
            counters: Vec::new(),
        }
    }

    /// Sets the output format, keeping the renderer's observer settings.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.renderer = self.renderer.with_format(format);
        self
    }

    /// Sets the output format and observer settings.
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Adds counters exported alongside the tally by formats that support it.
    pub fn with_counters(mut self, counters: impl IntoIterator<Item = &'a dyn Observable>) -> Self {
        self.counters.extend(counters);
        self
    }

    /// Returns the effective interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Renders `snapshot` in the configured format.
    pub fn render(&self, snapshot: &Snapshot) -> Result<String> {
        self.renderer.render(snapshot, self.counters.iter().copied())
    }

    /// Takes one snapshot and writes it to `out`, unless it is empty.
    pub fn report<W: Write>(&self, out: &mut W) -> Result<()> {
        let snapshot = self.tally.snapshot();
        if snapshot.is_empty() {
            return Ok(());
        }

        let rendered = self.render(&snapshot)?;
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Reports every interval until `token` is cancelled.
    ///
    /// Failures to render or write a report are logged and do not stop the
    /// loop.
    ///
    /// `out` is a blocking writer: each report is written on the task
    /// running this future.
    pub async fn run<W: Write>(&self, token: CancellationToken, mut out: W) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?self.interval, format = ?self.renderer.format(), "starting monitoring");

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(err) = self.report(&mut out) {
                        warn!(error = %err, "failed to write report");
                    }
                }
            }
        }

        info!("monitoring stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// A cloneable sink shared between the reporter task and the test.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_report_empty_writes_nothing() {
        let tally = Tally::new();
        let mut out = Vec::new();
        Reporter::new(&tally, Duration::from_secs(1))
            .report(&mut out)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_report_text() {
        let tally = Tally::new();
        tally.increment("user-service");
        tally.increment("order-service");
        tally.increment("unknown");

        let mut out = Vec::new();
        Reporter::new(&tally, Duration::from_secs(1))
            .report(&mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"order-service\" - 1\n\"unknown\" - 1\n\"user-service\" - 1\n\n"
        );
    }

    #[test]
    fn test_report_write_error() {
        let tally = Tally::new();
        tally.increment("x");
        let result = Reporter::new(&tally, Duration::from_secs(1)).report(&mut FailingWriter);
        assert!(matches!(result, Err(crate::observers::ObserverError::Io(_))));
    }

    #[test]
    fn test_zero_interval_is_raised() {
        let tally = Tally::new();
        let reporter = Reporter::new(&tally, Duration::ZERO);
        assert_eq!(reporter.interval(), MIN_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reports_on_each_tick() {
        let tally = Arc::new(Tally::new());
        let token = CancellationToken::new();
        let out = SharedBuf::default();

        let handle = tokio::spawn({
            let tally = Arc::clone(&tally);
            let token = token.clone();
            let out = out.clone();
            async move {
                Reporter::new(&tally, Duration::from_secs(10))
                    .run(token, out)
                    .await
            }
        });

        tally.increment("a");

        // Nothing before the first full interval.
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(out.contents(), "");

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(out.contents(), "\"a\" - 1\n\n");

        tally.increment("b");
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(out.contents(), "\"a\" - 1\n\n\"a\" - 1\n\"b\" - 1\n\n");

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_skips_empty_ticks() {
        let tally = Arc::new(Tally::new());
        let token = CancellationToken::new();
        let out = SharedBuf::default();

        let handle = tokio::spawn({
            let tally = Arc::clone(&tally);
            let token = token.clone();
            let out = out.clone();
            async move {
                Reporter::new(&tally, Duration::from_secs(1))
                    .run(token, out)
                    .await
            }
        });

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(out.contents(), "");

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_cancel_without_final_report() {
        let tally = Arc::new(Tally::new());
        let token = CancellationToken::new();
        let out = SharedBuf::default();

        tally.increment("a");

        let handle = tokio::spawn({
            let tally = Arc::clone(&tally);
            let token = token.clone();
            let out = out.clone();
            async move {
                Reporter::new(&tally, Duration::from_secs(1))
                    .run(token, out)
                    .await
            }
        });

        time::sleep(Duration::from_millis(1500)).await;
        let before = out.contents();
        assert_eq!(before, "\"a\" - 1\n\n");

        token.cancel();
        handle.await.unwrap();

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(out.contents(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cancelled_before_first_tick() {
        let tally = Tally::new();
        tally.increment("a");
        let token = CancellationToken::new();
        token.cancel();

        let out = SharedBuf::default();
        Reporter::new(&tally, Duration::from_secs(1))
            .run(token, out.clone())
            .await;
        assert_eq!(out.contents(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_tick_racing_cancel_writes_nothing() {
        let tally = Arc::new(Tally::new());
        tally.increment("a");
        let token = CancellationToken::new();
        let out = SharedBuf::default();
        let interval = Duration::from_secs(1);

        let handle = tokio::spawn({
            let tally = Arc::clone(&tally);
            let token = token.clone();
            let out = out.clone();
            async move { Reporter::new(&tally, interval).run(token, out).await }
        });

        // Let the reporter arm its ticker, then make the tick and the
        // cancellation ready before it is polled again.
        tokio::task::yield_now().await;
        time::advance(interval).await;
        token.cancel();

        handle.await.unwrap();
        assert_eq!(out.contents(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_write_errors() {
        let tally = Arc::new(Tally::new());
        tally.increment("a");
        let token = CancellationToken::new();

        let handle = tokio::spawn({
            let tally = Arc::clone(&tally);
            let token = token.clone();
            async move {
                Reporter::new(&tally, Duration::from_secs(1))
                    .run(token, FailingWriter)
                    .await
            }
        });

        time::sleep(Duration::from_millis(3500)).await;
        assert!(!handle.is_finished());

        token.cancel();
        handle.await.unwrap();
    }
}
