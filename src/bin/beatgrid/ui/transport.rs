//! Transport bar widget - shows BPM, play state, bar and latency settings

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::View;

pub fn render_transport(frame: &mut Frame, area: Rect, view: &View) {
    let snapshot = view.snapshot;
    let tempo = &snapshot.tempo;

    let block = Block::default().title(" beatgrid ").borders(Borders::ALL);

    let play_symbol = if snapshot.is_playing { "▶" } else { "■" };
    let play_state_str = if snapshot.is_playing { "Playing" } else { "Stopped" };

    // Bars count from 1 on screen
    let bar = match snapshot.bar_number {
        Some(bar) if bar >= 0 => format!("Bar {}", bar + 1),
        _ => "Bar -".to_string(),
    };
    let step = snapshot.current_index + 1;

    let input = if view.input_enabled {
        format!("Claps: {}  ", snapshot.detected.len())
    } else {
        "Input off  ".to_string()
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}  ", snapshot.bpm),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if snapshot.is_playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!(
                "{} | Step {}/{}  ",
                bar,
                step,
                tempo.total_subdivisions_per_bar()
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{}/{}  ", tempo.beats_per_bar(), tempo.subdivisions_per_beat()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Delay: {:.0}ms  ", snapshot.delay * 1000.0),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(input, Style::default().fg(Color::Magenta)),
        Span::styled(
            format!("{:.1}kHz", view.sample_rate as f32 / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
