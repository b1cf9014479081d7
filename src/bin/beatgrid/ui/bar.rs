//! Bar widget - playhead plus the detected beats of the most recent bars
//!
//! Each row is one bar, newest at the bottom. Beats land at their
//! `position_in_bar`, so claps that drift early or late show up as columns
//! wandering away from the beat markers.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use beatgrid::DisplaySnapshot;

const LABEL_WIDTH: u16 = 6;

pub fn render_bar(frame: &mut Frame, area: Rect, snapshot: &DisplaySnapshot) {
    if area.height < 3 || area.width < LABEL_WIDTH + 8 {
        return;
    }

    let width = (area.width - LABEL_WIDTH) as usize;
    let beats_per_bar = snapshot.tempo.beats_per_bar() as usize;
    let mut lines = Vec::new();

    // Beat markers row
    let mut markers = vec![' '; width];
    for beat in 0..beats_per_bar {
        markers[column(beat as f64 / beats_per_bar as f64, width)] = '|';
    }
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH as usize)),
        Span::styled(markers.into_iter().collect::<String>(), Style::default().fg(Color::DarkGray)),
    ]));

    // One row per recent bar, leaving room for the playhead
    let rows = (area.height - 2) as i64;
    let newest = snapshot
        .bar_number
        .into_iter()
        .chain(snapshot.detected.last().map(|mark| mark.bar_number))
        .max()
        .unwrap_or(0);

    for bar in (newest - rows + 1)..=newest {
        if bar < 0 {
            continue;
        }
        let mut row = vec!['·'; width];
        for mark in snapshot.detected.iter().filter(|m| m.bar_number == bar) {
            row[column(mark.position_in_bar, width)] = '●';
        }

        let is_current = snapshot.bar_number == Some(bar);
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:>4}  ", bar + 1),
                Style::default().fg(if is_current { Color::White } else { Color::DarkGray }),
            ),
            Span::styled(row.into_iter().collect::<String>(), Style::default().fg(Color::Cyan)),
        ]));
    }

    // Playhead row
    if let Some(position) = snapshot.position_in_bar {
        let mut playhead = vec![' '; width];
        playhead[column(position, width)] = '▲';
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(LABEL_WIDTH as usize)),
            Span::styled(playhead.into_iter().collect::<String>(), Style::default().fg(Color::Yellow)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

/// Character column for a bar fraction in [0, 1)
fn column(position: f64, width: usize) -> usize {
    ((position * width as f64) as usize).min(width.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_stays_inside_row() {
        assert_eq!(column(0.0, 40), 0);
        assert_eq!(column(0.5, 40), 20);
        assert_eq!(column(0.999_999, 40), 39);
        assert_eq!(column(1.0, 40), 39);
    }
}
