//! Grid widget - one circle per subdivision, the current step filled

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use beatgrid::{DisplaySnapshot, PitchClass};

pub fn render_grid(frame: &mut Frame, area: Rect, snapshot: &DisplaySnapshot) {
    let total = snapshot.tempo.total_subdivisions_per_bar();
    if area.height == 0 || total == 0 {
        return;
    }

    let cell = (area.width as u32 / total).max(2) as usize;
    let subdivisions = snapshot.tempo.subdivisions_per_beat();

    let spans: Vec<Span> = (0..total)
        .map(|index| {
            let current = snapshot.is_playing && index == snapshot.current_index;
            let symbol = if current { "●" } else { "○" };
            let color = match PitchClass::for_index(index, subdivisions) {
                PitchClass::Downbeat => Color::Red,
                PitchClass::Beat => Color::Cyan,
                PitchClass::Subdivision => Color::DarkGray,
            };
            let style = if current {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(color)
            };
            Span::styled(format!("{symbol:^cell$}"), style)
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
