//! TUI module for gesturefx
//!
//! Shows where the virtual hands are, what the engine is doing with them, and
//! whether the audio streams keep up.

mod sensors;
mod state;
mod status;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use gesture_fx::control::{PollerHandle, VirtualSensorHandle};
use gesture_fx::EngineConfig;

pub use state::{AudioCounters, Hands, StatusUpdate};

use sensors::render_sensors;
use status::{render_status, StreamHealth};

/// Hand movement per key press, in meters
const HAND_STEP: f32 = 0.01;

/// UI application state
pub struct UiApp {
    config: EngineConfig,
    hands: Hands,
    /// Ring buffer receiver for engine status
    status_rx: Consumer<StatusUpdate>,
    /// Latest status received
    status: StatusUpdate,
    counters: Arc<AudioCounters>,
    poller: PollerHandle,
    /// Whether the app should quit
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        config: EngineConfig,
        hands: Hands,
        status_rx: Consumer<StatusUpdate>,
        counters: Arc<AudioCounters>,
        poller: PollerHandle,
    ) -> Self {
        Self {
            config,
            hands,
            status_rx,
            status: StatusUpdate::default(),
            counters,
            poller,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_status();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep only the latest status
    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // Closer means more distortion
            KeyCode::Left => self.hands.distortion.nudge(-HAND_STEP),
            KeyCode::Right => self.hands.distortion.nudge(HAND_STEP),
            KeyCode::Down => self.hands.delay.nudge(-HAND_STEP),
            KeyCode::Up => self.hands.delay.nudge(HAND_STEP),
            KeyCode::Char('x') => toggle_hand(&self.hands.distortion, &self.config),
            KeyCode::Char('d') => toggle_hand(&self.hands.delay, &self.config),
            KeyCode::Char('f') => toggle_fault(&self.hands.distortion),
            KeyCode::Char('g') => toggle_fault(&self.hands.delay),
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: status, sensors, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(4), // Sensor panels
                Constraint::Min(0),
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let health = StreamHealth {
            underruns: self.counters.underruns.load(Ordering::Relaxed),
            overruns: self.counters.overruns.load(Ordering::Relaxed),
            poller: self.poller.stats(),
        };
        render_status(frame, chunks[0], &self.config, &self.status, &health);
        render_sensors(frame, chunks[1], &self.config, &self.hands, &self.status);

        let help = Paragraph::new(
            " [Q] Quit  [←/→] Distortion hand  [↑/↓] Delay hand  [X/D] Remove/place hand  [F/G] Sensor fault",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

/// Pull the hand out of range, or put it back mid-range.
fn toggle_hand(hand: &VirtualSensorHandle, config: &EngineConfig) {
    let max_range = config.sensors.max_range;
    if hand.distance() >= max_range {
        hand.set_distance(max_range / 2.0);
    } else {
        hand.withdraw();
    }
}

fn toggle_fault(hand: &VirtualSensorHandle) {
    if hand.is_faulted() {
        hand.clear_fault();
    } else {
        hand.fail_with_timeout();
    }
}
