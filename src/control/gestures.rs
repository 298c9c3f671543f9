//! Whole-surface swipe and long-press recognition
//!
//! Listens to the touch stream of the entire interactive surface. A
//! single-touch press captures a start sample; release classifies at most
//! one swipe if the gesture was fast and far enough. A long-press timer is
//! armed on press and cancelled by *any* movement. The timer fires through
//! an atomic armed flag, so a cancellation that loses the dequeue race
//! still wins the side-effect race and the callback can never run twice.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::Vec2;

/// Free-form swipe over the surface, in screen terms (up is away from the
/// operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwipeDirection::Up => write!(f, "up"),
            SwipeDirection::Down => write!(f, "down"),
            SwipeDirection::Left => write!(f, "left"),
            SwipeDirection::Right => write!(f, "right"),
        }
    }
}

/// Event reported by the gesture surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Swipe(SwipeDirection),
    LongPress,
}

/// Callback invoked once per completed gesture.
pub type GestureSink = Arc<dyn Fn(GestureEvent) + Send + Sync>;

/// Classification thresholds for the gesture surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureThresholds {
    /// Minimum displacement on one axis before a release counts as a swipe.
    pub swipe_distance: f64,
    /// Maximum press-to-release time for a swipe.
    pub swipe_window: Duration,
    /// Hold time before a long-press fires.
    pub long_press: Duration,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            swipe_distance: 50.0,
            swipe_window: Duration::from_millis(300),
            long_press: Duration::from_millis(500),
        }
    }
}

/// Start of a candidate gesture, captured at touch-start and consumed at
/// touch-end. At most one per surface; multi-touch input never creates or
/// clears one.
#[derive(Debug, Clone, Copy)]
struct SwipeSample {
    start: Vec2,
    started_at: Instant,
}

/// Cancellable one-shot long-press timer. `armed` is the single gate: the
/// firing task `swap`s it false before side-effecting, cancellation
/// `store`s false (and aborts the sleep), so the callback runs at most
/// once no matter how the two interleave.
struct LongPressTimer {
    armed: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl LongPressTimer {
    fn cancel(self) {
        self.armed.store(false, Ordering::SeqCst);
        self.task.abort();
    }
}

struct Inner {
    thresholds: GestureThresholds,
    sample: Option<SwipeSample>,
    timer: Option<LongPressTimer>,
    enabled: bool,
}

/// Swipe/long-press recognizer for the whole interactive surface.
///
/// Must be created and driven inside a tokio runtime when long-press is
/// enabled (the timer is a spawned task).
pub struct SwipeRecognizer {
    inner: Arc<Mutex<Inner>>,
    long_press_enabled: bool,
    sink: GestureSink,
}

impl SwipeRecognizer {
    /// Recognizer without a long-press consumer: no timer is ever armed.
    pub fn new(thresholds: GestureThresholds, sink: GestureSink) -> Self {
        Self::build(thresholds, sink, false)
    }

    /// Recognizer that also reports [`GestureEvent::LongPress`] after the
    /// configured hold time.
    pub fn with_long_press(thresholds: GestureThresholds, sink: GestureSink) -> Self {
        Self::build(thresholds, sink, true)
    }

    fn build(thresholds: GestureThresholds, sink: GestureSink, long_press_enabled: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                thresholds,
                sample: None,
                timer: None,
                enabled: true,
            })),
            long_press_enabled,
            sink,
        }
    }

    /// Whether a start sample is currently held.
    pub fn has_pending_sample(&self) -> bool {
        self.inner.lock().sample.is_some()
    }

    pub fn set_thresholds(&self, thresholds: GestureThresholds) {
        self.inner.lock().thresholds = thresholds;
    }

    /// Disabling drops any in-flight sample and pending timer; re-enabling
    /// starts from a clean surface.
    pub fn set_enabled(&self, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.enabled = enabled;
        if !enabled {
            if let Some(timer) = inner.timer.take() {
                timer.cancel();
            }
            inner.sample = None;
        }
    }

    /// Touch-start on the surface. Anything but exactly one touch is
    /// ignored without clearing prior state.
    pub fn touch_start(&self, position: Vec2, touches: usize) {
        let mut inner = self.inner.lock();
        if !inner.enabled {
            return;
        }
        if touches != 1 {
            trace!(touches, "multi-touch start ignored");
            return;
        }

        // A new touch supersedes any timer left from the previous one
        if let Some(timer) = inner.timer.take() {
            timer.cancel();
        }

        inner.sample = Some(SwipeSample {
            start: position,
            started_at: Instant::now(),
        });

        if self.long_press_enabled {
            let armed = Arc::new(AtomicBool::new(true));
            let task = tokio::spawn(Self::long_press_body(
                inner.thresholds.long_press,
                armed.clone(),
                self.inner.clone(),
                self.sink.clone(),
            ));
            inner.timer = Some(LongPressTimer { armed, task });
        }
    }

    /// Touch movement. Any motion, however small, cancels a pending
    /// long-press; the start sample stays live for swipe classification.
    pub fn touch_move(&self, _position: Vec2) {
        let mut inner = self.inner.lock();
        if !inner.enabled {
            return;
        }
        if let Some(timer) = inner.timer.take() {
            trace!("long-press cancelled by movement");
            timer.cancel();
        }
    }

    /// Touch-end at `position`. Consumes the start sample whether or not a
    /// swipe is classified; fires at most one event.
    pub fn touch_end(&self, position: Vec2) {
        let swipe = {
            let mut inner = self.inner.lock();
            if !inner.enabled {
                return;
            }
            if let Some(timer) = inner.timer.take() {
                timer.cancel();
            }
            let Some(sample) = inner.sample.take() else {
                return;
            };

            let elapsed = sample.started_at.elapsed();
            let delta = position - sample.start;
            let thresholds = inner.thresholds;

            if elapsed < thresholds.swipe_window
                && (delta.x.abs() > thresholds.swipe_distance
                    || delta.y.abs() > thresholds.swipe_distance)
            {
                Some(classify_swipe(delta))
            } else {
                trace!(?delta, ?elapsed, "release below swipe thresholds");
                None
            }
        };

        if let Some(direction) = swipe {
            debug!(%direction, "swipe");
            (self.sink)(GestureEvent::Swipe(direction));
        }
    }

    async fn long_press_body(
        delay: Duration,
        armed: Arc<AtomicBool>,
        inner: Arc<Mutex<Inner>>,
        sink: GestureSink,
    ) {
        tokio::time::sleep(delay).await;
        // The swap is the commit point: whoever flips armed first owns the
        // outcome.
        if !armed.swap(false, Ordering::SeqCst) {
            return;
        }
        {
            let mut inner = inner.lock();
            // Clear the sample so the eventual touch-end cannot also swipe
            inner.sample = None;
            inner.timer = None;
        }
        debug!("long-press");
        sink(GestureEvent::LongPress);
    }
}

/// Larger axis wins, ties to X; positive Y is a downward swipe.
fn classify_swipe(delta: Vec2) -> SwipeDirection {
    if delta.x.abs() >= delta.y.abs() {
        if delta.x > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if delta.y > 0.0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct GestureRecorder {
        events: Arc<Mutex<Vec<GestureEvent>>>,
    }

    impl GestureRecorder {
        fn new() -> Self {
            Self {
                events: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn sink(&self) -> GestureSink {
            let events = self.events.clone();
            Arc::new(move |event| events.lock().push(event))
        }

        fn take(&self) -> Vec<GestureEvent> {
            std::mem::take(&mut *self.events.lock())
        }
    }

    fn advance(ms: u64) -> tokio::time::Sleep {
        tokio::time::sleep(Duration::from_millis(ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_swipe_down() {
        let rec = GestureRecorder::new();
        let surface = SwipeRecognizer::new(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(100.0, 100.0), 1);
        advance(100).await;
        surface.touch_end(Vec2::new(100.0, 200.0));

        assert_eq!(rec.take(), vec![GestureEvent::Swipe(SwipeDirection::Down)]);
        assert!(!surface.has_pending_sample());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_release_is_not_a_swipe() {
        let rec = GestureRecorder::new();
        let surface = SwipeRecognizer::new(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(100.0, 100.0), 1);
        advance(400).await;
        surface.touch_end(Vec2::new(100.0, 200.0));

        assert!(rec.take().is_empty());
        // Sample consumed regardless
        assert!(!surface.has_pending_sample());
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_displacement_is_not_a_swipe() {
        let rec = GestureRecorder::new();
        let surface = SwipeRecognizer::new(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(100.0, 100.0), 1);
        advance(50).await;
        surface.touch_end(Vec2::new(130.0, 110.0));

        assert!(rec.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_swipe_axis_selection_and_tie() {
        let rec = GestureRecorder::new();
        let surface = SwipeRecognizer::new(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(0.0, 0.0), 1);
        surface.touch_end(Vec2::new(-80.0, 60.0));
        assert_eq!(rec.take(), vec![GestureEvent::Swipe(SwipeDirection::Left)]);

        surface.touch_start(Vec2::new(0.0, 0.0), 1);
        surface.touch_end(Vec2::new(20.0, -90.0));
        assert_eq!(rec.take(), vec![GestureEvent::Swipe(SwipeDirection::Up)]);

        // Equal displacement on both axes resolves to the X branch
        surface.touch_start(Vec2::new(0.0, 0.0), 1);
        surface.touch_end(Vec2::new(70.0, 70.0));
        assert_eq!(rec.take(), vec![GestureEvent::Swipe(SwipeDirection::Right)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_without_start_is_ignored() {
        let rec = GestureRecorder::new();
        let surface = SwipeRecognizer::new(GestureThresholds::default(), rec.sink());

        surface.touch_end(Vec2::new(500.0, 500.0));
        assert!(rec.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_touch_ignored_without_clearing_state() {
        let rec = GestureRecorder::new();
        let surface = SwipeRecognizer::new(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(0.0, 0.0), 1);
        // Second finger lands: ignored, first sample stays live
        surface.touch_start(Vec2::new(300.0, 300.0), 2);
        assert!(surface.has_pending_sample());

        advance(100).await;
        surface.touch_end(Vec2::new(90.0, 0.0));
        assert_eq!(rec.take(), vec![GestureEvent::Swipe(SwipeDirection::Right)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_press_fires_once_and_suppresses_swipe() {
        let rec = GestureRecorder::new();
        let surface =
            SwipeRecognizer::with_long_press(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(100.0, 100.0), 1);
        advance(600).await;
        assert_eq!(rec.take(), vec![GestureEvent::LongPress]);
        assert!(!surface.has_pending_sample());

        // The held touch eventually lifts far away: no swipe
        surface.touch_end(Vec2::new(100.0, 300.0));
        assert!(rec.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_movement_cancels_long_press_but_not_swipe() {
        let rec = GestureRecorder::new();
        let surface =
            SwipeRecognizer::with_long_press(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(0.0, 0.0), 1);
        advance(100).await;
        surface.touch_move(Vec2::new(1.0, 0.0)); // Any motion cancels
        advance(600).await;
        assert!(rec.take().is_empty());
        // Cancelling the timer did not consume the start sample
        assert!(surface.has_pending_sample());

        // Start sample survived the cancellation; a fresh fast gesture on
        // the same touch still needs release within the window.
        surface.touch_end(Vec2::new(0.0, -90.0));
        assert!(rec.take().is_empty()); // 700 ms since start: too slow
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_before_hold_time_cancels_long_press() {
        let rec = GestureRecorder::new();
        let surface =
            SwipeRecognizer::with_long_press(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(0.0, 0.0), 1);
        advance(200).await;
        surface.touch_end(Vec2::new(0.0, -80.0));
        assert_eq!(rec.take(), vec![GestureEvent::Swipe(SwipeDirection::Up)]);

        advance(600).await;
        assert!(rec.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_long_press_when_not_configured() {
        let rec = GestureRecorder::new();
        let surface = SwipeRecognizer::new(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(0.0, 0.0), 1);
        advance(600).await;
        assert!(rec.take().is_empty());
        // Sample still pending: nothing consumed it
        assert!(surface.has_pending_sample());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_drops_sample_and_timer() {
        let rec = GestureRecorder::new();
        let surface =
            SwipeRecognizer::with_long_press(GestureThresholds::default(), rec.sink());

        surface.touch_start(Vec2::new(0.0, 0.0), 1);
        surface.set_enabled(false);
        assert!(!surface.has_pending_sample());

        advance(600).await;
        assert!(rec.take().is_empty());

        // Events while disabled are inert
        surface.touch_start(Vec2::new(0.0, 0.0), 1);
        surface.touch_end(Vec2::new(90.0, 0.0));
        assert!(rec.take().is_empty());
    }
}
