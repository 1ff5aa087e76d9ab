//! Splash screen and the gate that holds the root on it.

use std::time::Duration;

use alumni_common::messages;
use tokio::time::Instant;

/// How long the splash stays up before the first routing decision.
pub const SPLASH_DURATION: Duration = Duration::from_millis(3000);

/// Length of the branding fade-in.
pub const FADE_IN_DURATION: Duration = Duration::from_millis(1000);

/// Interval between branding frames while fading in.
pub const FADE_FRAME: Duration = Duration::from_millis(100);

// xterm 256-colour grayscale ramp, darkest to brightest.
const GRAY_RAMP_START: u8 = 232;
const GRAY_RAMP_STEPS: u8 = 23;

/// Branding shown while the gate is closed. The branding fades in linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct SplashView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub loading_text: &'static str,
    pub fade_in: Duration,
}

impl SplashView {
    pub fn new(fade_in: Duration) -> Self {
        Self {
            title: messages::APP_TITLE,
            subtitle: messages::APP_SUBTITLE,
            loading_text: messages::LOADING,
            fade_in,
        }
    }

    /// Branding opacity `elapsed` after mount, from 0.0 to 1.0.
    pub fn opacity(&self, elapsed: Duration) -> f32 {
        if self.fade_in.is_zero() || elapsed >= self.fade_in {
            return 1.0;
        }
        elapsed.as_secs_f32() / self.fade_in.as_secs_f32()
    }

    /// Title and subtitle drawn at `opacity` in grayscale. With `redraw` the
    /// frame overwrites the previous one instead of scrolling.
    pub fn frame(&self, opacity: f32, redraw: bool) -> String {
        let shade = GRAY_RAMP_START + (opacity.clamp(0.0, 1.0) * f32::from(GRAY_RAMP_STEPS)).round() as u8;
        let rewind = if redraw { "\x1b[2F" } else { "" };
        format!("{}\x1b[38;5;{}m{}\n{}\x1b[0m", rewind, shade, self.title, self.subtitle)
    }
}

/// Frame clock for the branding fade-in, started when the splash is mounted.
#[derive(Debug, Clone, Copy)]
pub struct FadeIn {
    started: Instant,
    next_frame: Instant,
    frames: u32,
}

impl FadeIn {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            next_frame: now,
            frames: 0,
        }
    }

    /// When the next frame is due.
    pub fn next_frame(&self) -> Instant {
        self.next_frame
    }

    /// Render the frame that is due and schedule the following one.
    pub fn advance(&mut self, view: &SplashView) -> (String, f32) {
        let opacity = view.opacity(self.started.elapsed());
        let frame = view.frame(opacity, self.frames > 0);
        self.frames += 1;
        self.next_frame += FADE_FRAME;
        (frame, opacity)
    }
}

impl Default for SplashView {
    fn default() -> Self {
        Self::new(FADE_IN_DURATION)
    }
}

/// Fixed-duration gate started at process start.
#[derive(Debug, Clone, Copy)]
pub struct SplashGate {
    started: Instant,
    duration: Duration,
}

impl SplashGate {
    pub fn start(duration: Duration) -> Self {
        Self {
            started: Instant::now(),
            duration,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.started + self.duration
    }

    /// Resolves once the gate opens.
    pub async fn opened(&self) {
        tokio::time::sleep_until(self.deadline()).await;
    }
}
