use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::lectures::{LecturePicker, LectureRow, RowMark};
use super::subjects::SubjectPicker;
use super::viewport::Viewport;

const ACCENT: Color = Color::Cyan;
const HEADER_BG: Color = Color::DarkGray;
const CURSOR_BG: Color = Color::Red;
const SELECTED: Color = Color::Green;
const DIM: Color = Color::DarkGray;

const NAV_HINT: &str = "SPACE: select   ↑↓: up/down   ENTER: advance   ESC: exit";

/// Rows left for the list pane on a terminal `height` rows tall: one row for
/// the nav bar and two for the pane border.
pub fn list_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(3)).max(1)
}

fn split_nav(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

// ─── Nav Bar ────────────────────────────────────────────────────────────────

fn render_nav_bar(f: &mut Frame, status: String, area: Rect) {
    let bar = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {status}"), Style::default().fg(Color::White)),
        Span::styled(format!("   {NAV_HINT} "), Style::default().fg(DIM)),
    ]))
    .style(Style::default().bg(HEADER_BG));
    f.render_widget(bar, area);
}

/// `first-last/total` once the list no longer fits.
fn scroll_hint(vp: &Viewport) -> Option<String> {
    if vp.total_rows() <= vp.visible_rows() {
        return None;
    }
    let (_, end) = vp.visible_window();
    Some(format!(" {}-{}/{} ", vp.scroll_offset() + 1, end, vp.total_rows()))
}

fn list_block(title: String, vp: &Viewport) -> Block<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(ACCENT));
    match scroll_hint(vp) {
        Some(hint) => block.title_bottom(Line::from(hint).right_aligned()),
        None => block,
    }
}

fn checkbox(selected: bool) -> &'static str {
    if selected {
        "(x) "
    } else {
        "( ) "
    }
}

// ─── Stage 1: subjects ──────────────────────────────────────────────────────

pub fn render_subjects(f: &mut Frame, picker: &SubjectPicker) {
    let (main, nav) = split_nav(f.area());

    let name_width = picker
        .rows()
        .iter()
        .map(|r| r.subject.as_str().width())
        .max()
        .unwrap_or(0);
    // Checkbox, session count and border on top of the longest name.
    let list_width = (name_width + 20) as u16;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(list_width), Constraint::Min(0)])
        .split(main);

    render_subject_list(f, picker, name_width, chunks[0]);
    render_selected_pane(f, picker, name_width, chunks[1]);

    let count = picker.selected_subjects().len();
    render_nav_bar(f, format!("{count} subject(s) selected"), nav);
}

fn render_subject_list(f: &mut Frame, picker: &SubjectPicker, name_width: usize, area: Rect) {
    let vp = picker.viewport();
    let (start, end) = vp.visible_window();

    let lines: Vec<Line> = picker.rows()[start..end]
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let idx = start + offset;
            let pad = name_width.saturating_sub(row.subject.as_str().width());
            let style = if idx == vp.highlight() {
                Style::default().fg(Color::Black).bg(CURSOR_BG)
            } else if row.selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(checkbox(row.selected), style),
                Span::styled(format!("{}{}", row.subject, " ".repeat(pad)), style),
                Span::styled(format!("  {:>3} ses.", row.sessions), Style::default().fg(DIM)),
            ])
        })
        .collect();

    let list = Paragraph::new(lines).block(list_block(
        format!(" Subjects ({}) ", picker.rows().len()),
        vp,
    ));
    f.render_widget(list, area);
}

/// Two columns of ticked subjects. Derived from the list every frame.
fn render_selected_pane(f: &mut Frame, picker: &SubjectPicker, name_width: usize, area: Rect) {
    let selected = picker.selected_subjects();
    let lines: Vec<Line> = selected
        .chunks(2)
        .map(|pair| {
            let spans: Vec<Span> = pair
                .iter()
                .map(|s| {
                    let pad = (name_width + 4).saturating_sub(s.as_str().width());
                    Span::styled(
                        format!("{}{}", s, " ".repeat(pad)),
                        Style::default().fg(SELECTED),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let pane = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" SELECTED SUBJECTS ")
            .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
    );
    f.render_widget(pane, area);
}

// ─── Stage 2: sessions ──────────────────────────────────────────────────────

pub fn render_lectures(f: &mut Frame, picker: &LecturePicker<'_>) {
    let (main, nav) = split_nav(f.area());
    let vp = picker.viewport();
    let (start, end) = vp.visible_window();
    let decided = picker.decided_subjects();

    let lines: Vec<Line> = (start..end)
        .map(|idx| match picker.rows()[idx] {
            LectureRow::Header(day) => Line::from(Span::styled(
                day.label(),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
            LectureRow::Session(s) => {
                let Some(session) = picker.session(s) else {
                    return Line::default();
                };
                let style = match picker.mark(idx, &decided) {
                    Some(RowMark::Cursor) => Style::default().fg(Color::Black).bg(CURSOR_BG),
                    Some(RowMark::DecidedElsewhere) => {
                        Style::default().fg(Color::Black).bg(Color::White)
                    }
                    Some(RowMark::Selected) => Style::default().fg(Color::White).bg(SELECTED),
                    Some(RowMark::Plain) | None => Style::default(),
                };
                Line::from(Span::styled(
                    format!("{}{}", checkbox(session.selected), session.entry),
                    style,
                ))
            }
        })
        .collect();

    let list = Paragraph::new(lines).block(list_block(
        format!(" Sessions ({}) ", picker.sessions().len()),
        vp,
    ));
    f.render_widget(list, main);

    let chosen = picker.sessions().iter().filter(|s| s.selected).count();
    render_nav_bar(
        f,
        format!("{chosen} session(s), {} subject(s)", decided.len()),
        nav,
    );
}
