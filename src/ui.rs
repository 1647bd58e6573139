use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use cybernews::model::{Article, Priority};
use cybernews::store::FetchStatus;

use crate::app::App;

const RETRY_HINT: &str = "Try updating the news first or check if the server is running.";

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(f.size());

    // Top bar
    let filter = &app.view.filter;
    let top = format!(
        "cybernews — days:{}  category:{}  limit:{}   j/k:move  Enter:read  d/c/l:filter  r:load  u:update  e:export  o:open  q:quit",
        filter.days_back,
        filter.category_label(),
        filter.limit
    );
    f.render_widget(Paragraph::new(top), chunks[0]);

    // Statistics line, only when there is something to count
    if let Some(stats) = app.stats() {
        let line = format!(
            "Total: {}   High priority: {}   Medium priority: {}   Sources: {}",
            stats.total_articles,
            stats.high_priority_count,
            stats.medium_priority_count,
            stats.distinct_source_count
        );
        f.render_widget(
            Paragraph::new(line).style(Style::default().add_modifier(Modifier::BOLD)),
            chunks[1],
        );
    }

    match &app.view.status {
        FetchStatus::Loading => {
            let p = Paragraph::new("Loading news articles…")
                .block(Block::default().borders(Borders::ALL).title("News"));
            f.render_widget(p, chunks[2]);
        }
        FetchStatus::Error(msg) => draw_error(f, chunks[2], msg),
        _ if app.view.articles.is_empty() => {
            let p = Paragraph::new("No articles loaded. Press r to load the latest cybersecurity news.")
                .block(Block::default().borders(Borders::ALL).title("News"));
            f.render_widget(p, chunks[2]);
        }
        _ => draw_articles(f, chunks[2], app),
    }

    // Bottom status
    f.render_widget(Paragraph::new(app.notice.clone()), chunks[3]);
}

fn draw_error(f: &mut Frame, area: Rect, msg: &str) {
    let red = Style::default().fg(Color::Red);
    let text = Text::from(vec![
        Line::from("Error loading news").style(red.add_modifier(Modifier::BOLD)),
        Line::from(msg.to_string()).style(red),
        Line::from(""),
        Line::from(RETRY_HINT),
    ]);
    let p = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn draw_articles(f: &mut Frame, area: Rect, app: &App) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    // Left: list
    let items: Vec<ListItem> = app.view.articles.iter().enumerate().map(|(pos, a)| {
        let prefix = if pos == app.selected { "▶ " } else { "  " };
        let line = Line::from(vec![
            Span::raw(prefix),
            priority_badge(a),
            Span::raw(format!(" {:<16} {:<18} {}", a.date_line(), a.source, a.title)),
        ]);
        ListItem::new(line)
    }).collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Articles"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(list, panes[0]);

    // Right: preview
    let body = if let Some(a) = app.selected_article() {
        let mut text = Text::default();
        text.lines.push(Line::from(a.title.clone()).style(Style::default().add_modifier(Modifier::BOLD)));
        text.lines.push(Line::from(format!("Source: {}    Date: {}    #{}", a.source, a.date_line(), a.category)));
        text.lines.push(Line::from(format!("Link: {}", a.url)));
        text.lines.push(Line::from(vec![Span::raw("Priority: "), priority_badge(a)]));
        if !a.keywords.is_empty() {
            text.lines.push(Line::from(format!("Keywords: {}", a.keywords.join(", "))));
        }
        text.lines.push(Line::from(""));
        let content = if app.show_full { a.summary.clone() } else { truncate(&a.summary, 700) };
        text.lines.extend(Text::from(content).lines);
        text
    } else {
        Text::from("Nothing selected.")
    };

    let preview = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title("Article"))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, panes[1]);
}

fn priority_badge(a: &Article) -> Span<'static> {
    let score = a.priority_score.to_string();
    match a.priority() {
        Priority::High => Span::styled(format!("!!{score:>3}"), Style::default().fg(Color::Red)),
        Priority::Medium => Span::styled(format!(" !{score:>3}"), Style::default().fg(Color::Yellow)),
        Priority::Normal => Span::styled(format!("  {score:>3}"), Style::default().fg(Color::DarkGray)),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max { return s.to_string(); }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
