use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Game clock period
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Everything the game loop reacts to
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    Frame,
}

/// Where key and resize events come from
pub trait GameEventSource: Send + 'static {
    /// Wait at most `timeout` for the next event
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Reads the terminal on a background thread and forwards over a channel
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            while let Ok(raw) = event::read() {
                let forwarded = match raw {
                    // key release events would double every letter on some terminals
                    CtEvent::Key(key) if key.kind != KeyEventKind::Release => GameEvent::Key(key),
                    CtEvent::Resize(..) => GameEvent::Resize,
                    _ => continue,
                };
                if tx.send(forwarded).is_err() {
                    return;
                }
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

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Period of the game clock
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Constant period, one second unless told otherwise
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed source for driving the loop without a terminal
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
/// Ticks keep a steady cadence no matter how much input arrives in between;
/// frames are only produced while an animation asks for them.
pub struct Runner<E: GameEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    frame_interval: Option<Duration>,
    next_tick: Cell<Instant>,
    next_frame: Cell<Option<Instant>>,
}

impl<E: GameEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Cell::new(Instant::now() + ticker.interval());
        Self {
            event_source,
            ticker,
            frame_interval: None,
            next_tick,
            next_frame: Cell::new(None),
        }
    }

    pub fn with_frames(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    /// Restart the cadence, e.g. when a countdown begins
    pub fn reset_tick(&self) {
        self.next_tick.set(Instant::now() + self.ticker.interval());
    }

    pub fn set_animating(&self, animating: bool) {
        match (animating, self.frame_interval, self.next_frame.get()) {
            (true, Some(interval), None) => self.next_frame.set(Some(Instant::now() + interval)),
            (false, _, _) => self.next_frame.set(None),
            _ => {}
        }
    }

    /// Blocks until the next event or deadline, whichever is first
    pub fn step(&self) -> GameEvent {
        loop {
            let now = Instant::now();
            let tick_at = self.next_tick.get();
            if now >= tick_at {
                self.next_tick.set(tick_at + self.ticker.interval());
                return GameEvent::Tick;
            }

            let mut deadline = tick_at;
            if let (Some(frame_at), Some(interval)) = (self.next_frame.get(), self.frame_interval) {
                if now >= frame_at {
                    self.next_frame.set(Some(frame_at + interval));
                    return GameEvent::Frame;
                }
                deadline = deadline.min(frame_at);
            }

            match self.event_source.recv_timeout(deadline - now) {
                Ok(ev) => return ev,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::mpsc;

    fn runner(ticks_every: Duration) -> (mpsc::Sender<GameEvent>, Runner<TestEventSource, FixedTicker>) {
        let (tx, rx) = mpsc::channel();
        (tx, Runner::new(TestEventSource::new(rx), FixedTicker::new(ticks_every)))
    }

    #[test]
    fn idle_source_yields_tick_at_deadline() {
        let (_tx, runner) = runner(Duration::from_millis(1));
        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn queued_events_come_before_the_tick() {
        let (tx, runner) = runner(Duration::from_millis(200));
        tx.send(GameEvent::Resize).unwrap();
        tx.send(GameEvent::Key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE)))
            .unwrap();

        assert!(matches!(runner.step(), GameEvent::Resize));
        assert_matches!(runner.step(), GameEvent::Key(k) if k.code == KeyCode::Char('z'));
    }

    #[test]
    fn closed_source_still_ticks() {
        let (tx, runner) = runner(Duration::from_millis(2));
        drop(tx);
        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn steady_input_does_not_starve_ticks() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..10_000 {
            tx.send(GameEvent::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE)))
                .unwrap();
        }
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(5)));

        std::thread::sleep(Duration::from_millis(10));
        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn frames_only_while_animating() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(200)))
            .with_frames(Duration::from_millis(1));

        runner.set_animating(true);
        assert!(matches!(runner.step(), GameEvent::Frame));

        runner.set_animating(false);
        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn default_ticker_is_one_second() {
        assert_eq!(FixedTicker::default().interval(), Duration::from_secs(1));
    }
}
