//! Layout and drawing: playfield with ghost, hold and next previews, stats, overlays.

use crate::app::Screen;
use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::game::PieceSnapshot;
use crate::snapshot::{CellView, Snapshot};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each board cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 20;
/// Duration of the line-clear flash in ms.
const LINE_CLEAR_FADE_MS: u32 = 350;

/// Playfield size in terminal cells including the border.
fn playfield_outer_size() -> (u16, u16) {
    (BOARD_WIDTH as u16 * CELL_WIDTH + 2, BOARD_HEIGHT as u16 + 2)
}

/// Everything the renderer needs for one frame.
#[derive(Debug)]
pub struct View<'a> {
    pub screen: Screen,
    pub snapshot: &'a Snapshot,
    pub theme: &'a Theme,
    pub best: u32,
    pub new_best: bool,
    pub show_ghost: bool,
    /// Randomizer seed, shown on game over.
    pub seed: u64,
}

/// Flash over rows that were just cleared (TachyonFX fade from white).
#[derive(Default)]
pub struct LineFlash {
    rows: Vec<usize>,
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl LineFlash {
    pub fn trigger(&mut self, rows: &[usize]) {
        self.rows = rows.to_vec();
        self.effect = None;
        self.last_process = None;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.effect = None;
        self.last_process = None;
    }

    fn render(&mut self, frame: &mut Frame, board_rect: Rect, now: Instant) {
        if self.rows.is_empty() {
            return;
        }
        let delta = self
            .last_process
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        self.last_process = Some(now);

        if self.effect.is_none() {
            let positions: HashSet<(u16, u16)> = self
                .rows
                .iter()
                .filter(|&&r| (r as u16) < board_rect.height)
                .flat_map(|&r| {
                    let y = board_rect.y + r as u16;
                    (board_rect.x..board_rect.x + board_rect.width).map(move |x| (x, y))
                })
                .collect();
            let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
                positions.contains(&(pos.x, pos.y))
            }));
            let effect = fx::fade_from(
                Color::White,
                Color::White,
                (LINE_CLEAR_FADE_MS, Interpolation::QuadOut),
            )
            .with_filter(filter)
            .with_area(board_rect);
            self.effect = Some(effect);
        }

        if let Some(effect) = self.effect.as_mut() {
            frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
            if effect.done() {
                self.clear();
            }
        }
    }
}

impl std::fmt::Debug for LineFlash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineFlash")
            .field("rows", &self.rows)
            .field("active", &self.effect.is_some())
            .finish_non_exhaustive()
    }
}

/// Draw current screen: the game with an overlay for ready, pause and game over.
pub fn draw(frame: &mut Frame, view: &View, flash: &mut LineFlash, now: Instant) {
    let area = frame.area();
    let board_rect = draw_game(frame, view, area);
    match view.screen {
        Screen::Playing => flash.render(frame, board_rect, now),
        Screen::Ready => draw_ready_overlay(frame, view.theme, area),
        Screen::Paused => draw_pause_overlay(frame, view.theme, area),
        Screen::GameOver => draw_game_over(frame, view, area),
    }
}

/// Draw game: playfield + sidebar centred in the area. Returns the board's inner rect.
fn draw_game(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let (pw, ph) = playfield_outer_size();
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);

    let board_rect = draw_playfield(frame, view, inner[0]);
    draw_sidebar(frame, view, inner[1]);
    board_rect
}

fn cell_span(cell: CellView, theme: &Theme) -> Span<'static> {
    match cell {
        CellView::Empty => Span::styled(" .", Style::default().fg(theme.div_line).bg(theme.bg)),
        CellView::Locked(kind) | CellView::Active(kind) => {
            Span::styled("██", Style::default().fg(theme.piece(kind)).bg(theme.bg))
        }
        CellView::Ghost(kind) => {
            Span::styled("░░", Style::default().fg(theme.ghost(kind)).bg(theme.bg))
        }
    }
}

fn draw_playfield(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let theme = view.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Bagtris ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let lines: Vec<Line> = view
        .snapshot
        .layered(view.show_ghost)
        .into_iter()
        .map(|row| Line::from(row.into_iter().map(|c| cell_span(c, theme)).collect::<Vec<_>>()))
        .collect();
    Paragraph::new(lines).render(inner, frame.buffer_mut());
    inner
}

fn sidebar_block(theme: &Theme, title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let snap = view.snapshot;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Hold (border + 4 preview rows)
            Constraint::Length(6), // Next
            Constraint::Length(7), // Stats
            Constraint::Fill(1),   // Keys
        ])
        .split(area);

    let hold_block = sidebar_block(theme, " Hold ");
    let hold_inner = hold_block.inner(chunks[0]);
    hold_block.render(chunks[0], frame.buffer_mut());
    if let Some(held) = snap.hold {
        let color = if snap.can_hold {
            theme.piece(held.kind)
        } else {
            theme.inactive_fg
        };
        draw_piece_preview(frame, held, color, hold_inner);
    }

    let next_block = sidebar_block(theme, " Next ");
    let next_inner = next_block.inner(chunks[1]);
    next_block.render(chunks[1], frame.buffer_mut());
    draw_piece_preview(frame, snap.next, theme.piece(snap.next.kind), next_inner);

    let label = Style::default().fg(theme.title);
    let value = Style::default().fg(theme.main_fg);
    let stat = |name: &'static str, v: String| {
        Line::from(vec![Span::styled(name, label), Span::styled(v, value)])
    };
    let stats = vec![
        stat("Score: ", snap.score.to_string()),
        stat("Best:  ", view.best.max(snap.score).to_string()),
        stat("Level: ", snap.level.to_string()),
        stat("Lines: ", snap.lines.to_string()),
        stat("Drop:  ", format!("{} ms", snap.drop_ms)),
    ];
    let stats_block = sidebar_block(theme, " Stats ");
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    Paragraph::new(stats).render(stats_inner, frame.buffer_mut());

    let dim = Style::default().fg(theme.inactive_fg);
    let ghost = if view.show_ghost { "on" } else { "off" };
    let keys = vec![
        Line::from(Span::styled("←→/ad  move", dim)),
        Line::from(Span::styled("↓/s    soft drop", dim)),
        Line::from(Span::styled("↑/w    rotate", dim)),
        Line::from(Span::styled("space  hard drop", dim)),
        Line::from(Span::styled("c      hold", dim)),
        Line::from(Span::styled(format!("g      ghost ({ghost})"), dim)),
        Line::from(Span::styled("p      pause", dim)),
    ];
    Paragraph::new(keys).render(chunks[3], frame.buffer_mut());
}

/// Draw a detached piece cropped to its filled cells and centred in `area`.
fn draw_piece_preview(frame: &mut Frame, piece: PieceSnapshot, color: Color, area: Rect) {
    let cells: Vec<(i32, i32)> = piece.shape.filled_cells().collect();
    let (Some(min_x), Some(min_y)) = (
        cells.iter().map(|c| c.0).min(),
        cells.iter().map(|c| c.1).min(),
    ) else {
        return;
    };
    let max_x = cells.iter().map(|c| c.0).max().unwrap_or(min_x);
    let max_y = cells.iter().map(|c| c.1).max().unwrap_or(min_y);
    let bw = (max_x - min_x + 1) as u16;
    let bh = (max_y - min_y + 1) as u16;

    let lines: Vec<Line> = (min_y..=max_y)
        .map(|y| {
            let spans: Vec<Span> = (min_x..=max_x)
                .map(|x| {
                    if cells.contains(&(x, y)) {
                        Span::styled("██", Style::default().fg(color))
                    } else {
                        Span::raw("  ")
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();
    let r = Rect {
        x: area.x + area.width.saturating_sub(bw * CELL_WIDTH) / 2,
        y: area.y + area.height.saturating_sub(bh) / 2,
        width: (bw * CELL_WIDTH).min(area.width),
        height: bh.min(area.height),
    };
    Paragraph::new(lines).render(r, frame.buffer_mut());
}

fn centered_popup(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_popup(frame: &mut Frame, theme: &Theme, popup: Rect, lines: Vec<Line>) {
    Clear.render(popup, frame.buffer_mut());
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .style(Style::default().bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_ready_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" BAGTRIS ", Style::default().fg(theme.title).bold())),
        Line::from(""),
        Line::from(Span::styled(
            " Enter — Start    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    draw_popup(frame, theme, centered_popup(area, 30, 6), lines);
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    draw_popup(frame, theme, centered_popup(area, 28, 6), lines);
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", view.snapshot.score), fg)),
        Line::from(Span::styled(format!(" Best: {} ", view.best), fg)),
        Line::from(Span::styled(format!(" Lines: {} ", view.snapshot.lines), fg)),
        Line::from(Span::styled(
            format!(" Seed: {} ", view.seed),
            Style::default().fg(theme.inactive_fg),
        )),
    ];
    if view.new_best {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" R — Restart    Q — Quit ", fg)));
    let h = lines.len() as u16 + 2;
    draw_popup(frame, theme, centered_popup(area, 30, h), lines);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Session;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(screen: Screen, snapshot: &Snapshot) -> String {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(60, 26)).unwrap();
        let mut flash = LineFlash::default();
        let view = View {
            screen,
            snapshot,
            theme: &theme,
            best: 4321,
            new_best: false,
            show_ghost: true,
            seed: 3,
        };
        terminal
            .draw(|f| draw(f, &view, &mut flash, Instant::now()))
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn playing_screen_shows_stats_and_pieces() {
        let snap = Session::new(3, 1).snapshot();
        let out = render(Screen::Playing, &snap);
        assert!(out.contains("Bagtris"));
        assert!(out.contains("Score: 0"));
        assert!(out.contains("Best:  4321"));
        assert!(out.contains("██"));
        assert!(out.contains("░░"));
    }

    #[test]
    fn game_over_overlay() {
        let snap = Session::new(3, 1).snapshot();
        let out = render(Screen::GameOver, &snap);
        assert!(out.contains("Game Over"));
        assert!(out.contains("Restart"));
        assert!(out.contains("Seed: 3"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let theme = Theme::default();
        let snap = Session::new(3, 1).snapshot();
        let mut terminal = Terminal::new(TestBackend::new(12, 5)).unwrap();
        let mut flash = LineFlash::default();
        flash.trigger(&[19]);
        let view = View {
            screen: Screen::Playing,
            snapshot: &snap,
            theme: &theme,
            best: 0,
            new_best: false,
            show_ghost: true,
            seed: 3,
        };
        terminal
            .draw(|f| draw(f, &view, &mut flash, Instant::now()))
            .unwrap();
    }
}
