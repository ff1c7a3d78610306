//! Status bar widget - shows stream format, engine progress and health

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use gesture_fx::control::PollerStats;
use gesture_fx::EngineConfig;

use super::StatusUpdate;

/// Stream health as read from the shared counters
pub struct StreamHealth {
    pub underruns: u64,
    pub overruns: u64,
    pub poller: PollerStats,
}

/// Render the status bar
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    config: &EngineConfig,
    status: &StatusUpdate,
    health: &StreamHealth,
) {
    let block = Block::default().title(" gesturefx ").borders(Borders::ALL);

    // Format sample rate nicely (e.g., 44100 -> "44.1kHz")
    let sample_rate_khz = config.sample_rate as f32 / 1000.0;
    let latency_ms = config.block_duration().as_secs_f32() * 1000.0;

    let health_color = if health.underruns + health.overruns > 0 {
        Color::Yellow
    } else {
        Color::Green
    };

    let line = Line::from(vec![
        Span::styled(
            format!(
                " {:.1}kHz  {}ch  {} frames ({:.1}ms)  ",
                sample_rate_khz, config.channels, config.block_size, latency_ms
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("blocks {}  ", status.blocks),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("params #{}  ", status.generation),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  ", status.peak),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!(
                "xruns {}/{}  ",
                health.underruns, health.overruns
            ),
            Style::default().fg(health_color),
        ),
        Span::styled(
            format!(
                "polls {}  read errors {}",
                health.poller.polls, health.poller.read_failures
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
