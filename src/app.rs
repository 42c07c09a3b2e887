//! Top-level run: detection, terminal setup and the sampling loop.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, TimeDelta};
use nix::fcntl::OFlag;
use nix::sys::signal::Signal;
use nix::sys::termios::LocalFlags;
use tracing::{debug, info};

use crate::interrupt::InterruptFlag;
use crate::sampling::{
    CommandRunner, DetectError, FileSystem, RealFs, Sample, SampleError, Sampler,
    SamplerDetector, SystemRunner, Throughput,
};
use crate::term::{
    FileStatusGuard, FileStatusSet, SignalSuspender, TerminalControl, TerminalError,
    TerminalModeGuard, TerminalModeSet, TerminalSurface, TerminalWindow, Tty, resize_signal,
};
use crate::ui::{BarChart, KeyAction, RESERVED_ROWS, read_keys};

/// Widest history kept, in one-second ticks.
pub const HISTORY_CAPACITY: usize = 1024;

/// Time between samples.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Input polls per sampling interval.
pub const POLLS_PER_TICK: u32 = 100;

/// Runtime settings, independent of how they were parsed.
#[derive(Debug, Clone)]
pub struct Config {
    pub interface: String,
    pub proc_path: String,
    pub sys_path: String,
}

/// Which direction the chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Received,
    Transmitted,
}

impl DisplayMode {
    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Received => "received",
            DisplayMode::Transmitted => "transmitted",
        }
    }
}

/// Reasons the monitor stopped other than an interrupt.
#[derive(Debug)]
pub enum AppError {
    NoSampler(DetectError),
    Sample(SampleError),
    Terminal(TerminalError),
    Signal(ctrlc::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NoSampler(e) => write!(f, "{}", e),
            AppError::Sample(e) => write!(f, "sampling failed: {}", e),
            AppError::Terminal(e) => write!(f, "{}", e),
            AppError::Signal(e) => write!(f, "cannot install interrupt handler: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::NoSampler(e) => Some(e),
            AppError::Sample(e) => Some(e),
            AppError::Terminal(e) => Some(e),
            AppError::Signal(e) => Some(e),
        }
    }
}

impl From<DetectError> for AppError {
    fn from(e: DetectError) -> Self {
        AppError::NoSampler(e)
    }
}

impl From<SampleError> for AppError {
    fn from(e: SampleError) -> Self {
        AppError::Sample(e)
    }
}

impl From<TerminalError> for AppError {
    fn from(e: TerminalError) -> Self {
        AppError::Terminal(e)
    }
}

impl From<ctrlc::Error> for AppError {
    fn from(e: ctrlc::Error) -> Self {
        AppError::Signal(e)
    }
}

/// Monitors `config.interface` on the controlling terminal until `interrupt`
/// is raised.
///
/// Detection runs before the terminal is touched. Every terminal change made
/// afterwards is undone on return, whatever the outcome.
pub fn run(config: &Config, interrupt: &InterruptFlag) -> Result<(), AppError> {
    let detector = SamplerDetector::new(
        RealFs::new(),
        SystemRunner::new(),
        &config.proc_path,
        &config.sys_path,
    );
    let (sampler, baseline) = detector.detect_sampler(&config.interface)?;

    let tty = Tty::new();
    let interrupt_suspender = SignalSuspender::new(Signal::SIGINT);
    let resize_suspender = SignalSuspender::new(resize_signal());

    let mut mode_setter = TerminalModeSet::new()
        .local_off(LocalFlags::ECHO | LocalFlags::ICANON)
        .build_setter(&tty, &interrupt_suspender);
    let _mode_guard = TerminalModeGuard::acquire(&mut mode_setter)?;

    let window = TerminalWindow::create(&tty, &resize_suspender)?;
    let surface = TerminalSurface::new(window, io::stdout().lock(), RESERVED_ROWS);

    let mut status_setter = FileStatusSet::new()
        .status_on(OFlag::O_NONBLOCK)
        .build_setter(&tty, &interrupt_suspender);
    let _status_guard = FileStatusGuard::acquire(&mut status_setter)?;

    let mut monitor = Monitor::new(
        &config.interface,
        sampler,
        baseline,
        surface,
        io::stdin(),
        interrupt,
    );
    monitor.run()
}

/// Tick deadlines on a fixed grid, so time spent sampling and drawing does
/// not push later ticks back.
#[derive(Debug, Clone, Copy)]
struct TickSchedule {
    next: Instant,
    interval: Duration,
}

impl TickSchedule {
    fn starting_at(origin: Instant, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            next: origin + interval,
            interval,
        }
    }

    fn deadline(&self) -> Instant {
        self.next
    }

    /// Moves to the first grid point after `now`. Grid points that were
    /// missed entirely are skipped rather than fired late.
    fn advance(&mut self, now: Instant) {
        self.next += self.interval;
        while self.next <= now {
            self.next += self.interval;
        }
    }
}

/// The sampling and rendering loop over an already prepared terminal.
pub struct Monitor<'a, F, R, C, W, I>
where
    F: FileSystem,
    R: CommandRunner,
    C: TerminalControl,
    W: Write,
    I: Read,
{
    interface: String,
    sampler: Sampler<F, R>,
    throughput: Throughput,
    chart: BarChart,
    surface: TerminalSurface<'a, C, W>,
    input: I,
    interrupt: &'a InterruptFlag,
    mode: DisplayMode,
    interval: Duration,
    schedule: TickSchedule,
}

impl<'a, F, R, C, W, I> Monitor<'a, F, R, C, W, I>
where
    F: FileSystem,
    R: CommandRunner,
    C: TerminalControl,
    W: Write,
    I: Read,
{
    pub fn new(
        interface: &str,
        sampler: Sampler<F, R>,
        baseline: Sample,
        surface: TerminalSurface<'a, C, W>,
        input: I,
        interrupt: &'a InterruptFlag,
    ) -> Self {
        Self::with_interval(
            interface,
            sampler,
            baseline,
            surface,
            input,
            interrupt,
            SAMPLE_INTERVAL,
        )
    }

    pub fn with_interval(
        interface: &str,
        sampler: Sampler<F, R>,
        baseline: Sample,
        surface: TerminalSurface<'a, C, W>,
        input: I,
        interrupt: &'a InterruptFlag,
        interval: Duration,
    ) -> Self {
        let tick = TimeDelta::milliseconds(interval.as_millis() as i64);
        // Anchor the deadline grid at the baseline read so each sample lands
        // just after its own tick boundary.
        let now = Instant::now();
        let origin = (Local::now() - baseline.timestamp)
            .to_std()
            .ok()
            .and_then(|lag| now.checked_sub(lag))
            .unwrap_or(now);
        info!(
            "Monitoring {} with the {} source every {:?}",
            interface,
            sampler.name(),
            interval
        );
        Self {
            interface: interface.to_string(),
            sampler,
            throughput: Throughput::new(baseline, tick, HISTORY_CAPACITY),
            chart: BarChart::new(interface),
            surface,
            input,
            interrupt,
            mode: DisplayMode::Received,
            interval,
            schedule: TickSchedule::starting_at(origin, interval),
        }
    }

    /// Loops until interrupted. A sampler or terminal failure ends the loop
    /// with an error.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.render()?;
        while self.wait_for_tick()? {
            self.tick()?;
        }
        debug!("Interrupt received, leaving monitor loop");
        Ok(())
    }

    /// Spends one interval polling input. Returns `false` once interrupted.
    fn wait_for_tick(&mut self) -> Result<bool, AppError> {
        let deadline = self.schedule.deadline();
        let poll = self.interval / POLLS_PER_TICK;

        loop {
            if self.interrupt.is_set() {
                return Ok(false);
            }
            let actions = read_keys(&mut self.input).map_err(TerminalError::from)?;
            for action in actions {
                self.apply(action)?;
            }

            let now = Instant::now();
            if now >= deadline {
                self.schedule.advance(now);
                return Ok(!self.interrupt.is_set());
            }
            thread::sleep(poll.min(deadline - now));
        }
    }

    /// Takes one sample, records it and redraws.
    pub fn tick(&mut self) -> Result<(), AppError> {
        let sample = self.sampler.get_sample(&self.interface)?;
        self.throughput.record(sample);
        self.render()?;
        Ok(())
    }

    /// Reacts to a keypress. A view switch redraws from stored history
    /// without sampling.
    pub fn apply(&mut self, action: KeyAction) -> Result<(), TerminalError> {
        match action {
            KeyAction::ShowReceived => self.switch(DisplayMode::Received),
            KeyAction::ShowTransmitted => self.switch(DisplayMode::Transmitted),
            KeyAction::Redraw => self.surface.on_carriage_return(),
            KeyAction::None => Ok(()),
        }
    }

    fn switch(&mut self, mode: DisplayMode) -> Result<(), TerminalError> {
        if self.mode == mode {
            return Ok(());
        }
        debug!("Switching view to {}", mode.label());
        self.mode = mode;
        self.render()
    }

    fn render(&mut self) -> Result<(), TerminalError> {
        let series = match self.mode {
            DisplayMode::Received => self.throughput.received(),
            DisplayMode::Transmitted => self.throughput.transmitted(),
        };
        let width = self.surface.width()?;
        let len = width.min(series.span());
        let values = series.get_slice_from_end(len);
        let times = series.times_from_end(len);
        self.chart
            .draw_bars_from_right(&mut self.surface, self.mode.label(), &values, &times)
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn throughput(&self) -> &Throughput {
        &self.throughput
    }

    pub fn frame(&self) -> &[String] {
        self.surface.frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::SysfsSampler;
    use crate::sampling::mock::MockRunner;
    use crate::term::testing::RecordingControl;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    type TestMonitor<'a> = Monitor<'a, RealFs, MockRunner, RecordingControl, Vec<u8>, Cursor<Vec<u8>>>;

    fn write_stats(root: &Path, rx: u64, tx: u64) {
        let dir = root.join("class/net/eth0/statistics");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("rx_bytes"), format!("{}\n", rx)).unwrap();
        fs::write(dir.join("tx_bytes"), format!("{}\n", tx)).unwrap();
    }

    fn sysfs_sampler(root: &Path) -> Sampler<RealFs, MockRunner> {
        Sampler::Sysfs(SysfsSampler::new(
            RealFs::new(),
            root.to_string_lossy().into_owned(),
        ))
    }

    fn monitor<'a>(
        root: &Path,
        control: &'a RecordingControl,
        suspender: &'a SignalSuspender,
        interrupt: &'a InterruptFlag,
        keys: &[u8],
    ) -> TestMonitor<'a> {
        let sampler = sysfs_sampler(root);
        let baseline = sampler.get_sample("eth0").unwrap();
        let window = TerminalWindow::with_resize_flag(control, suspender, Arc::default()).unwrap();
        let surface = TerminalSurface::new(window, Vec::new(), RESERVED_ROWS);
        Monitor::with_interval(
            "eth0",
            sampler,
            baseline,
            surface,
            Cursor::new(keys.to_vec()),
            interrupt,
            Duration::from_millis(20),
        )
    }

    #[test]
    fn test_tick_records_deltas() {
        let dir = TempDir::new().unwrap();
        write_stats(dir.path(), 100, 1000);
        let control = RecordingControl::typical();
        let suspender = SignalSuspender::new(resize_signal());
        let interrupt = InterruptFlag::new();
        let mut monitor = monitor(dir.path(), &control, &suspender, &interrupt, b"");

        write_stats(dir.path(), 150, 1300);
        monitor.tick().unwrap();

        let throughput = monitor.throughput();
        assert_eq!(*throughput.received().get_slice_from_end(1).last().unwrap(), 50);
        assert_eq!(*throughput.transmitted().get_slice_from_end(1).last().unwrap(), 300);
        assert!(monitor.frame()[0].starts_with("eth0 received"));
    }

    #[test]
    fn test_sampler_failure_after_detection_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_stats(dir.path(), 1, 1);
        let control = RecordingControl::typical();
        let suspender = SignalSuspender::new(resize_signal());
        let interrupt = InterruptFlag::new();
        let mut monitor = monitor(dir.path(), &control, &suspender, &interrupt, b"");

        fs::remove_dir_all(dir.path().join("class")).unwrap();
        assert!(matches!(monitor.tick(), Err(AppError::Sample(_))));
    }

    #[test]
    fn test_switch_view_redraws_without_sampling() {
        let dir = TempDir::new().unwrap();
        write_stats(dir.path(), 0, 0);
        let control = RecordingControl::typical();
        let suspender = SignalSuspender::new(resize_signal());
        let interrupt = InterruptFlag::new();
        let mut monitor = monitor(dir.path(), &control, &suspender, &interrupt, b"");

        write_stats(dir.path(), 10, 20);
        monitor.tick().unwrap();

        monitor.apply(KeyAction::ShowTransmitted).unwrap();
        assert_eq!(monitor.mode(), DisplayMode::Transmitted);
        assert!(monitor.frame()[0].starts_with("eth0 transmitted"));
        assert!(monitor.frame()[1].contains("last   20 b/s"));

        monitor.apply(KeyAction::ShowReceived).unwrap();
        assert_eq!(monitor.mode(), DisplayMode::Received);
        assert!(monitor.frame()[1].contains("last   10 b/s"));
    }

    #[test]
    fn test_run_returns_ok_when_interrupted() {
        let dir = TempDir::new().unwrap();
        write_stats(dir.path(), 0, 0);
        let control = RecordingControl::typical();
        let suspender = SignalSuspender::new(resize_signal());
        let interrupt = InterruptFlag::new();
        interrupt.trigger();
        let mut monitor = monitor(dir.path(), &control, &suspender, &interrupt, b"t");

        assert!(monitor.run().is_ok());
        assert_eq!(monitor.mode(), DisplayMode::Received);
        assert_eq!(monitor.frame().len(), 24);
    }

    #[test]
    fn test_keys_are_handled_while_waiting() {
        let dir = TempDir::new().unwrap();
        write_stats(dir.path(), 0, 0);
        let control = RecordingControl::typical();
        let suspender = SignalSuspender::new(resize_signal());
        let interrupt = InterruptFlag::new();
        let mut monitor = monitor(dir.path(), &control, &suspender, &interrupt, b"t");

        assert!(monitor.wait_for_tick().unwrap());
        assert_eq!(monitor.mode(), DisplayMode::Transmitted);
    }

    #[test]
    fn test_display_mode_labels() {
        assert_eq!(DisplayMode::Received.label(), "received");
        assert_eq!(DisplayMode::Transmitted.label(), "transmitted");
    }

    #[test]
    fn test_schedule_keeps_fixed_grid() {
        let origin = Instant::now();
        let second = Duration::from_secs(1);
        let mut schedule = TickSchedule::starting_at(origin, second);
        assert_eq!(schedule.deadline(), origin + second);

        // Fired late, the next deadline still sits on the grid
        schedule.advance(origin + Duration::from_millis(1040));
        assert_eq!(schedule.deadline(), origin + 2 * second);

        // A whole missed grid point is skipped, not fired late
        schedule.advance(origin + Duration::from_millis(3500));
        assert_eq!(schedule.deadline(), origin + 4 * second);
    }

    #[test]
    fn test_steady_traffic_with_slow_iterations_has_no_gaps() {
        use chrono::TimeZone;

        let start = Local.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let origin = Instant::now();
        let second = Duration::from_secs(1);
        let mut schedule = TickSchedule::starting_at(origin, second);
        let mut throughput = Throughput::new(
            Sample {
                received_bytes: 0,
                transmitted_bytes: 0,
                timestamp: start,
            },
            TimeDelta::seconds(1),
            HISTORY_CAPACITY,
        );

        // Each iteration notices its deadline 5 ms late and spends another
        // 5 ms sampling and drawing, so a naive loop would run every 1010 ms.
        let mut received = 0;
        for _ in 0..300 {
            let fired = schedule.deadline() + Duration::from_millis(5);
            received += 1000;
            let elapsed = TimeDelta::from_std(fired - origin).unwrap();
            throughput.record(Sample {
                received_bytes: received,
                transmitted_bytes: 0,
                timestamp: start + elapsed,
            });
            schedule.advance(fired + Duration::from_millis(5));
        }

        let series = throughput.received();
        assert_eq!(series.span(), 300);
        let values = series.get_slice_from_end(series.span());
        assert_eq!(values.len(), 300);
        assert!(values.iter().all(|&v| v == 1000));
    }
}
