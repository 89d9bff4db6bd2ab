//! RGB status LED.
//!
//! | phase                          | LED             |
//! |--------------------------------|-----------------|
//! | connected, compressor attached | green           |
//! | connected, no compressor       | orange          |
//! | connecting                     | orange, blinking|
//! | provisioning                   | blue            |
//! | initializing / scanning        | white           |
//! | error, waiting to retry        | red, blinking   |

use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::{NetworkPhase, NetworkStatus};

/// A 24-bit `0xRRGGBB` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const OFF: Rgb = Rgb(0x000000);
    pub const GREEN: Rgb = Rgb(0x00FF00);
    pub const ORANGE: Rgb = Rgb(0xFFFF00);
    pub const BLUE: Rgb = Rgb(0x0000FF);
    pub const WHITE: Rgb = Rgb(0xFFFFFF);
    pub const RED: Rgb = Rgb(0xFF0000);

    pub fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(&self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPattern {
    Solid(Rgb),
    Blink(Rgb),
}

impl NetworkPhase {
    pub fn led_pattern(&self) -> LedPattern {
        match self {
            Self::ConnectedActive => LedPattern::Solid(Rgb::GREEN),
            Self::ConnectedIdle => LedPattern::Solid(Rgb::ORANGE),
            Self::Connecting => LedPattern::Blink(Rgb::ORANGE),
            Self::Provisioning => LedPattern::Solid(Rgb::BLUE),
            Self::Initializing | Self::Scanning => LedPattern::Solid(Rgb::WHITE),
            Self::Error => LedPattern::Blink(Rgb::RED),
        }
    }
}

/// Whatever physically shows the colour (a WS2812 on the board).
pub trait IndicatorSink: Send + 'static {
    fn show(&mut self, color: Rgb);
}

/// Turns the manager's phase into one LED frame per tick.
#[derive(Debug)]
pub struct StatusIndicator {
    status: NetworkStatus,
    lit: bool,
}

impl StatusIndicator {
    pub fn new(status: NetworkStatus) -> Self {
        Self { status, lit: false }
    }

    /// The colour for this tick. Blinking patterns alternate between the
    /// colour and off on successive calls, starting lit.
    pub fn next_frame(&mut self) -> Rgb {
        match self.status.phase().led_pattern() {
            LedPattern::Solid(color) => {
                self.lit = false;
                color
            }
            LedPattern::Blink(color) => {
                let frame = if self.lit { Rgb::OFF } else { color };
                self.lit = !self.lit;
                frame
            }
        }
    }
}

/// Refreshes `sink` every `period`, forever.
pub async fn run_indicator(mut indicator: StatusIndicator, mut sink: impl IndicatorSink, period: Duration) {
    loop {
        let frame = indicator.next_frame();
        trace!(color = frame.0, "indicator frame");
        sink.show(frame);
        tokio::time::sleep(period).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use benchlink_state::SharedState;
    use tokio::sync::watch;

    use crate::NetworkState;
    use crate::status::ManagerStatus;

    fn indicator_for(state: NetworkState) -> (watch::Sender<ManagerStatus>, StatusIndicator) {
        let (tx, rx) = watch::channel(ManagerStatus {
            state,
            ..ManagerStatus::default()
        });
        let status = NetworkStatus::new(rx, Arc::new(SharedState::new()));
        (tx, StatusIndicator::new(status))
    }

    #[test]
    fn test_phase_colours() {
        assert_eq!(NetworkPhase::ConnectedActive.led_pattern(), LedPattern::Solid(Rgb::GREEN));
        assert_eq!(NetworkPhase::Provisioning.led_pattern(), LedPattern::Solid(Rgb::BLUE));
        assert_eq!(NetworkPhase::Scanning.led_pattern(), LedPattern::Solid(Rgb::WHITE));
        assert_eq!(NetworkPhase::Error.led_pattern(), LedPattern::Blink(Rgb::RED));
    }

    #[test]
    fn test_connecting_blinks_orange() {
        let (_tx, mut indicator) = indicator_for(NetworkState::Connecting);
        let frames: Vec<_> = (0..4).map(|_| indicator.next_frame()).collect();
        assert_eq!(frames, vec![Rgb::ORANGE, Rgb::OFF, Rgb::ORANGE, Rgb::OFF]);
    }

    #[test]
    fn test_blink_restarts_lit_after_solid() {
        let (tx, mut indicator) = indicator_for(NetworkState::Connecting);
        assert_eq!(indicator.next_frame(), Rgb::ORANGE);
        tx.send_modify(|s| s.state = NetworkState::Provisioning);
        assert_eq!(indicator.next_frame(), Rgb::BLUE);
        tx.send_modify(|s| s.state = NetworkState::SocketFailed);
        assert_eq!(indicator.next_frame(), Rgb::RED);
        assert_eq!(indicator.next_frame(), Rgb::OFF);
    }

    #[test]
    fn test_rgb_channels() {
        let c = Rgb(0x12_34_56);
        assert_eq!((c.red(), c.green(), c.blue()), (0x12, 0x34, 0x56));
        assert_eq!(Rgb::ORANGE.to_string(), "#FFFF00");
    }

    struct Recorder(Arc<Mutex<Vec<Rgb>>>);

    impl IndicatorSink for Recorder {
        fn show(&mut self, color: Rgb) {
            self.0.lock().unwrap().push(color);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_indicator_ticks_each_period() {
        let (_tx, indicator) = indicator_for(NetworkState::Startup);
        let frames = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(run_indicator(
            indicator,
            Recorder(Arc::clone(&frames)),
            Duration::from_secs(1),
        ));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        task.abort();

        assert_eq!(*frames.lock().unwrap(), vec![Rgb::WHITE; 3]);
    }
}
