//! TUI module for beatgrid
//!
//! Draws one `DisplaySnapshot` per refresh. Nothing here writes back into
//! the session.

mod bar;
mod grid;
pub mod state;
mod transport;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use beatgrid::DisplaySnapshot;

pub use state::Status;

use bar::render_bar;
use grid::render_grid;
use transport::render_transport;

/// Everything one frame draws from
pub struct View<'a> {
    pub snapshot: &'a DisplaySnapshot,
    pub status: &'a Status,
    pub input_enabled: bool,
    pub sample_rate: u32,
}

pub fn render(frame: &mut Frame, view: &View) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Length(3), // Subdivision grid
            Constraint::Min(6),    // Bar view
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Help bar
        ])
        .split(area);

    render_transport(frame, chunks[0], view);

    let grid_block = Block::default().title(" Grid ").borders(Borders::ALL);
    let grid_inner = grid_block.inner(chunks[1]);
    frame.render_widget(grid_block, chunks[1]);
    render_grid(frame, grid_inner, view.snapshot);

    let bar_block = Block::default().title(" Bar ").borders(Borders::ALL);
    let bar_inner = bar_block.inner(chunks[2]);
    frame.render_widget(bar_block, chunks[2]);
    render_bar(frame, bar_inner, view.snapshot);

    let status_style = if view.status.is_error() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    };
    frame.render_widget(
        Paragraph::new(format!(" {}", view.status.text())).style(status_style),
        chunks[3],
    );

    let help = Paragraph::new(" [Space] Play/Stop  [+/-] Tempo  [R] Reload settings  [Q] Quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}
