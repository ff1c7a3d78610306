//! Hand position and effect parameter gauges

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use gesture_fx::control::VirtualSensorHandle;
use gesture_fx::EngineConfig;

use super::{Hands, StatusUpdate};

/// Render one panel per sensor: where the hand is and what it controls.
pub fn render_sensors(
    frame: &mut Frame,
    area: Rect,
    config: &EngineConfig,
    hands: &Hands,
    status: &StatusUpdate,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let amount = status.params.distortion_amount;
    render_panel(
        frame,
        columns[0],
        " Distortion  [←/→] ",
        &hands.distortion,
        config.sensors.max_range,
        amount / config.distortion.amount_max.max(f32::EPSILON),
        format!("amount {:.3}", amount),
        Color::Red,
    );

    let delay_ms = status.params.delay_samples / config.sample_rate as f32 * 1000.0;
    let max_ms = config.delay.max_seconds * 1000.0;
    render_panel(
        frame,
        columns[1],
        " Delay  [↑/↓] ",
        &hands.delay,
        config.sensors.max_range,
        delay_ms / max_ms.max(f32::EPSILON),
        format!(
            "{:.1} ms ({:.0} samples), feedback {:.2}",
            delay_ms, status.params.delay_samples, status.params.delay_gain
        ),
        Color::Cyan,
    );
}

#[allow(clippy::too_many_arguments)]
fn render_panel(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    hand: &VirtualSensorHandle,
    max_range: f32,
    level: f32,
    label: String,
    color: Color,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let distance = hand.distance();
    let hand_label = if hand.is_faulted() {
        "sensor fault".to_string()
    } else if distance >= max_range {
        "no hand".to_string()
    } else {
        format!("hand at {:.1} cm", distance * 100.0)
    };
    let hand_gauge = Gauge::default()
        .gauge_style(Style::default().fg(if hand.is_faulted() {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
        .ratio(ratio(distance / max_range))
        .label(hand_label);
    frame.render_widget(hand_gauge, rows[0]);

    let param_gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(ratio(level))
        .label(label);
    frame.render_widget(param_gauge, rows[1]);
}

fn ratio(value: f32) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0) as f64
    } else {
        0.0
    }
}
