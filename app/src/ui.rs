// In app/src/ui.rs

use crate::dashboard::{App, CrumbHit, HitMap};
use core_types::{HierarchyNode, TwrSnapshot};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use store::{Slice, Status};
use tracing::Level;
use treemap::{color_for, layout, shares};

const GAIN: Color = Color::Rgb(0x28, 0xA7, 0x45);
const LOSS: Color = Color::Rgb(0xDC, 0x35, 0x45);
const MUTED: Color = Color::DarkGray;
const CRUMB_PREFIX: &str = "Navigation: ";
const CRUMB_SEPARATOR: &str = " > ";

/// Draws the whole dashboard and reports where the clickable parts went.
pub fn render(frame: &mut Frame, app: &App) -> HitMap {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(8),
        ])
        .split(frame.size());

    frame.render_widget(render_twr(app.store.twr()), rows[0]);

    let mut hits = HitMap::default();
    if let Some(root) = app.store.hierarchy().data() {
        let (line, crumbs) = breadcrumb_line(&app.nav.breadcrumb(root), rows[1]);
        frame.render_widget(Paragraph::new(line), rows[1]);
        hits.crumbs = crumbs;
    }

    hits.tiles = render_treemap(frame, app, rows[2]);
    frame.render_widget(render_status(app), rows[3]);
    frame.render_widget(render_logs(app, rows[4].height.saturating_sub(2) as usize), rows[4]);
    hits
}

fn render_twr(slice: &Slice<TwrSnapshot>) -> Paragraph<'static> {
    let line = match (slice.status(), slice.data()) {
        (_, Some(twr)) => {
            let colour = if twr.is_gain() { GAIN } else { LOSS };
            let mut spans = vec![Span::styled(
                format!("TWR: {}", twr.formatted()),
                Style::default().fg(colour).add_modifier(Modifier::BOLD),
            )];
            if let Some(at) = slice.last_updated() {
                spans.push(Span::styled(
                    format!("  (updated {})", at.format("%H:%M:%S")),
                    Style::default().fg(MUTED),
                ));
            }
            Line::from(spans)
        }
        (Status::Loading, None) => Line::from("TWR: loading..."),
        (Status::Failed, None) => Line::from(Span::styled(
            format!("TWR unavailable: {}", slice.error().unwrap_or_default()),
            Style::default().fg(LOSS),
        )),
        _ => Line::from(Span::styled("TWR: --", Style::default().fg(MUTED))),
    };

    Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Time-Weighted Return"))
}

/// Terminal columns a span occupies, capped at `u16::MAX`.
fn cell_width(span: &Span) -> u16 {
    u16::try_from(span.width()).unwrap_or(u16::MAX)
}

/// Builds the breadcrumb line and the column span of each segment.
pub fn breadcrumb_line(names: &[String], area: Rect) -> (Line<'static>, Vec<CrumbHit>) {
    let mut spans = vec![Span::styled(CRUMB_PREFIX, Style::default().add_modifier(Modifier::BOLD))];
    let mut hits = Vec::with_capacity(names.len());
    let mut x = area.x.saturating_add(cell_width(&spans[0]));
    let last = names.len().saturating_sub(1);

    for (depth, name) in names.iter().enumerate() {
        let style = if depth == last {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)
        };
        let label = Span::styled(format!("{depth}:{name}"), style);
        let width = cell_width(&label);
        spans.push(label);
        hits.push(CrumbHit {
            row: area.y,
            start: x,
            end: x.saturating_add(width),
            depth,
        });
        x = x.saturating_add(width);
        if depth != last {
            let separator = Span::styled(CRUMB_SEPARATOR, Style::default().fg(MUTED));
            x = x.saturating_add(cell_width(&separator));
            spans.push(separator);
        }
    }

    (Line::from(spans), hits)
}

fn render_treemap(frame: &mut Frame, app: &App, area: Rect) -> Vec<treemap::Tile> {
    let slice = app.store.hierarchy();
    let block = Block::default().borders(Borders::ALL).title("Portfolio Composition");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let root = match (slice.status(), slice.data()) {
        (_, Some(root)) => root,
        (Status::Failed, None) => {
            let message = format!("Error: {}", slice.error().unwrap_or_default());
            frame.render_widget(placeholder(message, LOSS), inner);
            return Vec::new();
        }
        (Status::Loading, None) => {
            frame.render_widget(placeholder("Loading...".to_string(), Color::Reset), inner);
            return Vec::new();
        }
        _ => {
            frame.render_widget(placeholder("No data.".to_string(), MUTED), inner);
            return Vec::new();
        }
    };

    let current = app.nav.current(root);
    let sibling_shares = shares(&current.children);
    let tiles = layout(&sibling_shares, inner);
    if tiles.is_empty() {
        frame.render_widget(placeholder(empty_reason(current), MUTED), inner);
        return tiles;
    }

    for tile in &tiles {
        let share = &sibling_shares[tile.index];
        let colour = color_for(tile.index);
        let selected = tile.index == app.selected;

        let mut block = Block::default().style(Style::default().bg(colour).fg(Color::White));
        if selected {
            block = block
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
        }
        let tile_inner = block.inner(tile.rect);
        frame.render_widget(block, tile.rect);

        // Tiles that can be drilled into are marked with a trailing "+".
        let label = if share.leaf { share.name.clone() } else { format!("{} +", share.name) };
        let mut lines = vec![
            Line::from(Span::styled(label, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(share.label()),
        ];
        let top = tile_inner.height.saturating_sub(lines.len() as u16) / 2;
        let mut text = vec![Line::default(); top as usize];
        text.append(&mut lines);
        frame.render_widget(
            Paragraph::new(Text::from(text)).alignment(Alignment::Center),
            tile_inner,
        );
    }
    tiles
}

fn empty_reason(node: &HierarchyNode) -> String {
    if node.is_leaf() {
        format!("{} has no holdings below it.", node.name)
    } else {
        format!("{} has no value to show.", node.name)
    }
}

fn placeholder(message: String, colour: Color) -> Paragraph<'static> {
    Paragraph::new(Span::styled(message, Style::default().fg(colour)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Idle => "idle",
        Status::Loading => "loading",
        Status::Succeeded => "ok",
        Status::Failed => "failed",
    }
}

fn render_status(app: &App) -> Paragraph<'static> {
    let mut spans = vec![
        Span::raw(format!("Push: {}", app.link.label())),
        Span::styled(" | ", Style::default().fg(MUTED)),
        Span::raw(format!("Hierarchy: {}", status_label(app.store.hierarchy().status()))),
        Span::styled(" | ", Style::default().fg(MUTED)),
        Span::raw(format!("TWR: {}", status_label(app.store.twr().status()))),
    ];
    if let Some(notice) = app.store.notice() {
        spans.push(Span::styled(" | ", Style::default().fg(MUTED)));
        spans.push(Span::styled(format!("Service: {notice}"), Style::default().fg(LOSS)));
    }
    spans.push(Span::styled(
        "   Enter drill  Bksp up  0-9 crumb  r refresh  q quit",
        Style::default().fg(MUTED),
    ));
    Paragraph::new(Line::from(spans))
}

fn render_logs(app: &App, visible: usize) -> Paragraph<'static> {
    let lines: Vec<Line> = app
        .logs
        .tail(visible)
        .into_iter()
        .map(|line| {
            let colour = match line.level {
                Level::ERROR => LOSS,
                Level::WARN => Color::Yellow,
                Level::INFO => Color::Reset,
                _ => MUTED,
            };
            Line::from(vec![
                Span::styled(format!("{} ", line.timestamp.format("%H:%M:%S")), Style::default().fg(MUTED)),
                Span::styled(format!("{:>5} ", line.level), Style::default().fg(colour)),
                Span::raw(line.message),
            ])
        })
        .collect();

    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::LiveEvent;
    use crate::tracing_layer::LogBuffer;
    use events::StateUpdate;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_breadcrumb_hits_cover_labels() {
        let names = vec!["Portfolio".to_string(), "Tech".to_string()];
        let (line, hits) = breadcrumb_line(&names, Rect::new(0, 4, 80, 1));

        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(rendered, "Navigation: 0:Portfolio > 1:Tech");

        let start0 = CRUMB_PREFIX.len() as u16;
        assert_eq!(hits[0], CrumbHit { row: 4, start: start0, end: start0 + 11, depth: 0 });
        assert_eq!(hits[1].start, rendered.find("1:Tech").unwrap() as u16);
        assert_eq!(hits[1].end, rendered.len() as u16);
    }

    #[test]
    fn test_breadcrumb_hits_use_display_width() {
        let names = vec!["Portfolio".to_string(), "日本株".to_string(), "Tech".to_string()];
        let (line, hits) = breadcrumb_line(&names, Rect::new(0, 0, 80, 1));

        // "1:日本株" is 2 narrow + 3 double-width cells.
        assert_eq!(hits[1].end - hits[1].start, 8);
        let width: u16 = line.spans.iter().map(|s| s.width() as u16).sum();
        assert_eq!(hits[2].end, width);
    }

    #[test]
    fn test_breadcrumb_hits_saturate_on_huge_names() {
        let names = vec!["x".repeat(70_000), "y".repeat(70_000)];
        let (_, hits) = breadcrumb_line(&names, Rect::new(10, 0, 80, 1));

        assert_eq!(hits[0].end, u16::MAX);
        assert_eq!(hits[1].start, u16::MAX);
        assert_eq!(hits[1].end, u16::MAX);
    }

    #[test]
    fn test_render_reports_one_tile_per_child() {
        let mut app = App::new(LogBuffer::new());
        app.apply_live(LiveEvent::Update(StateUpdate::Hierarchy(HierarchyNode::root(
            "Portfolio",
            100.0,
            vec![
                HierarchyNode::tag("Tech", 70.0, vec![]),
                HierarchyNode::tag("Energy", 30.0, vec![]),
            ],
        ))));
        app.apply_live(LiveEvent::Update(StateUpdate::Twr(TwrSnapshot { twr: -0.01, ..Default::default() })));

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let mut hits = HitMap::default();
        terminal.draw(|frame| hits = render(frame, &app)).unwrap();

        assert_eq!(hits.tiles.len(), 2);
        assert_eq!(hits.tiles[0].index, 0);
        assert_eq!(hits.crumbs.len(), 1);

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("TWR: -1.0000%"));
        assert!(text.contains("70.0%"));
    }

    #[test]
    fn test_failed_hierarchy_shows_error() {
        let mut app = App::new(LogBuffer::new());
        app.apply_fetch(store::FetchOutcome::Hierarchy(Err("HTTP error! status: 500".into())));

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let mut hits = HitMap::default();
        terminal.draw(|frame| hits = render(frame, &app)).unwrap();

        assert!(hits.tiles.is_empty());
        let text: String = terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Error: HTTP error! status: 500"));
    }
}
