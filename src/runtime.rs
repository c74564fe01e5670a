use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// What the lab loop reacts to
#[derive(Clone, Debug)]
pub enum LabEvent {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within one redraw interval
    Tick,
}

/// Where terminal input comes from
pub trait LabEventSource: Send + 'static {
    /// Wait up to `timeout` for the next event; `None` when nothing arrived
    fn poll(&self, timeout: Duration) -> Option<LabEvent>;
}

/// Reads the terminal on a background thread.
///
/// Only key presses are forwarded; release and repeat reports (sent by
/// some Windows terminals) would otherwise type every letter twice.
pub struct CrosstermEventSource {
    rx: Receiver<LabEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => LabEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => LabEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LabEventSource for CrosstermEventSource {
    fn poll(&self, timeout: Duration) -> Option<LabEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Events fed from a channel, for driving the lab without a terminal
pub struct ScriptedEventSource {
    rx: Receiver<LabEvent>,
}

impl ScriptedEventSource {
    pub fn new(rx: Receiver<LabEvent>) -> Self {
        Self { rx }
    }
}

impl LabEventSource for ScriptedEventSource {
    fn poll(&self, timeout: Duration) -> Option<LabEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(evt) => Some(evt),
            // a finished script behaves like an idle keyboard
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// One turn of the loop: the event plus the wall time since the previous turn
#[derive(Debug)]
pub struct Step {
    pub event: LabEvent,
    pub elapsed: Duration,
}

/// Pulls one event per redraw and measures how much time went by, so the
/// countdown keeps moving while keys are arriving.
pub struct Runner<E: LabEventSource> {
    source: E,
    redraw: Duration,
    last: Instant,
}

impl<E: LabEventSource> Runner<E> {
    pub fn new(source: E, redraw: Duration) -> Self {
        Self {
            source,
            redraw,
            last: Instant::now(),
        }
    }

    pub fn redraw_interval(&self) -> Duration {
        self.redraw
    }

    /// Blocks up to one redraw interval; `Tick` when the source stayed quiet
    pub fn step(&mut self) -> Step {
        let event = self.source.poll(self.redraw).unwrap_or(LabEvent::Tick);
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        Step { event, elapsed }
    }
}

/// Turns the runner's frequent redraw ticks into whole-second game ticks.
///
/// Time only accrues while `running` is true, and whatever fraction was
/// pending is dropped as soon as it goes false, so a countdown that was
/// stopped never receives a stale second afterwards.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    pending: Duration,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed `elapsed` wall time; returns how many whole seconds to deliver
    pub fn advance(&mut self, elapsed: Duration, running: bool) -> u32 {
        if !running {
            self.reset();
            return 0;
        }
        self.pending += elapsed;
        let whole = self.pending.as_secs();
        self.pending -= Duration::from_secs(whole);
        whole as u32
    }

    pub fn reset(&mut self) {
        self.pending = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(redraw_ms: u64) -> (mpsc::Sender<LabEvent>, Runner<ScriptedEventSource>) {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(ScriptedEventSource::new(rx), Duration::from_millis(redraw_ms));
        (tx, runner)
    }

    #[test]
    fn quiet_source_yields_tick_after_redraw_interval() {
        let (_tx, mut runner) = runner(5);
        let step = runner.step();
        assert!(matches!(step.event, LabEvent::Tick));
        assert!(step.elapsed >= Duration::from_millis(5));
    }

    #[test]
    fn queued_events_come_first() {
        let (tx, mut runner) = runner(1000);
        tx.send(LabEvent::Resize).unwrap();
        let step = runner.step();
        assert!(matches!(step.event, LabEvent::Resize));
        assert!(step.elapsed < Duration::from_millis(1000));
    }

    #[test]
    fn dropped_script_reads_as_ticks() {
        let (tx, mut runner) = runner(1);
        drop(tx);
        assert!(matches!(runner.step().event, LabEvent::Tick));
        assert_eq!(runner.redraw_interval(), Duration::from_millis(1));
    }

    #[test]
    fn clock_emits_whole_seconds() {
        let mut clock = Clock::new();
        let step = Duration::from_millis(100);

        let delivered: u32 = (0..25).map(|_| clock.advance(step, true)).sum();
        assert_eq!(delivered, 2);
        // the remaining half second arrives after five more steps
        let delivered: u32 = (0..5).map(|_| clock.advance(step, true)).sum();
        assert_eq!(delivered, 1);
    }

    #[test]
    fn clock_drops_partial_second_when_stopped() {
        let mut clock = Clock::new();
        assert_eq!(clock.advance(Duration::from_millis(900), true), 0);
        assert_eq!(clock.advance(Duration::from_millis(900), false), 0);
        assert_eq!(clock.advance(Duration::from_millis(200), true), 0);
    }

    #[test]
    fn clock_catches_up_after_long_gap() {
        let mut clock = Clock::new();
        assert_eq!(clock.advance(Duration::from_millis(3500), true), 3);
        assert_eq!(clock.advance(Duration::from_millis(500), true), 1);
    }
}
