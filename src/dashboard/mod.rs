use anyhow::Result;
use crossterm::{
    event::{Event, KeyCode},
    execute,
    terminal::*,
};
use ratatui::{
    prelude::*,
    style::{Color, Modifier},
    text::{Line, Span},
    widgets::*,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use crate::monitoring::{Anomaly, NetworkMonitor, NetworkStats, Sample, Severity};
use crate::notifications::Notification;

/// Everything one frame needs, gathered before drawing.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub stats: NetworkStats,
    pub history: Vec<Sample>,
    pub anomalies: Vec<Anomaly>,
    pub notifications: Vec<Notification>,
    pub toast: Option<Notification>,
    pub paused: bool,
}

impl DashboardView {
    pub async fn capture(monitor: &NetworkMonitor, toast: Option<Notification>) -> Self {
        Self {
            stats: monitor.snapshot(),
            history: monitor.history().await,
            anomalies: monitor.recent_anomalies().await,
            notifications: monitor.notifications().await,
            toast,
            paused: !monitor.is_running(),
        }
    }
}

pub async fn start_dashboard(
    monitor: &mut NetworkMonitor,
    mut toasts: Option<mpsc::UnboundedReceiver<Notification>>,
    refresh: Duration,
) -> Result<()> {
    monitor.start();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut toast = None;

    let outcome = loop {
        if let Some(rx) = toasts.as_mut() {
            while let Ok(notification) = rx.try_recv() {
                toast = Some(notification);
            }
        }

        let view = DashboardView::capture(monitor, toast.clone()).await;
        if let Err(e) = terminal.draw(|f| render(f, &view)) {
            break Err(e.into());
        }

        match crossterm::event::poll(refresh) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => break Err(e.into()),
        }
        let key = match crossterm::event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => break Err(e.into()),
        };
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
            KeyCode::Char('p') => {
                if monitor.is_running() {
                    monitor.stop();
                } else {
                    monitor.start();
                }
            }
            KeyCode::Char('c') => {
                monitor.clear_notifications().await;
                toast = None;
            }
            _ => {}
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    monitor.stop();
    info!("Dashboard closed");
    outcome
}

pub fn render(f: &mut Frame, view: &DashboardView) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.size());

    let status = if view.paused {
        Span::styled(" PAUSED ", Style::new().fg(Color::Black).bg(Color::Yellow))
    } else {
        Span::styled(" LIVE ", Style::new().fg(Color::Black).bg(Color::LightGreen))
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Network Monitor ",
            Style::new().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
        ),
        status,
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::new().fg(Color::LightBlue))
            .border_type(BorderType::Thick),
    );
    f.render_widget(header, main_layout[0]);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(main_layout[1]);

    f.render_widget(
        render_stats_panel(&view.stats).block(panel("Statistics")),
        content_layout[0],
    );

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Min(3),
        ])
        .split(content_layout[1]);

    let downloads: Vec<u64> = view.history.iter().map(|s| s.download.round() as u64).collect();
    let uploads: Vec<u64> = view.history.iter().map(|s| s.upload.round() as u64).collect();
    f.render_widget(
        Sparkline::default()
            .block(panel("Download (Mbps)"))
            .data(&downloads)
            .style(Style::new().fg(Color::Cyan)),
        right_layout[0],
    );
    f.render_widget(
        Sparkline::default()
            .block(panel("Upload (Mbps)"))
            .data(&uploads)
            .style(Style::new().fg(Color::Magenta)),
        right_layout[1],
    );

    let feed_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(right_layout[2]);
    f.render_widget(
        render_anomaly_list(&view.anomalies).block(panel("Anomalies")),
        feed_layout[0],
    );
    f.render_widget(
        render_notification_list(&view.notifications).block(panel("Notifications")),
        feed_layout[1],
    );

    let mut footer_spans = vec![
        Span::styled("Q: Quit", Style::new().fg(Color::LightYellow)),
        Span::raw(" | "),
        Span::styled("P: Pause/Resume", Style::new().fg(Color::LightGreen)),
        Span::raw(" | "),
        Span::styled("C: Clear", Style::new().fg(Color::LightMagenta)),
    ];
    if let Some(toast) = &view.toast {
        footer_spans.push(Span::raw("  "));
        footer_spans.push(Span::styled(
            format!("{}: {}", toast.title, toast.message),
            severity_style(toast.severity),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(footer_spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP)),
        main_layout[2],
    );
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::new().fg(Color::LightBlue))
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Info => Style::new().fg(Color::LightBlue),
        Severity::Success => Style::new().fg(Color::LightGreen),
        Severity::Warning => Style::new().fg(Color::LightYellow),
        Severity::Error => Style::new().fg(Color::Red),
    }
}

fn stat_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<18}", label), Style::new().fg(Color::Gray)),
        Span::styled(value, Style::new().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn render_stats_panel(stats: &NetworkStats) -> Paragraph<'static> {
    let signal_color = match stats.signal_strength {
        0..=29 => Color::Red,
        30..=59 => Color::Yellow,
        _ => Color::LightGreen,
    };
    Paragraph::new(vec![
        stat_line("Download", format!("{:.1} Mbps", stats.download), Color::Cyan),
        stat_line("Upload", format!("{:.1} Mbps", stats.upload), Color::Magenta),
        stat_line("Ping", format!("{:.0} ms", stats.ping), Color::LightYellow),
        stat_line("Signal", format!("{}%", stats.signal_strength), signal_color),
        stat_line("Devices", stats.connected_devices.to_string(), Color::White),
        stat_line("Data transfer", format!("{:.1} GB", stats.data_transfer), Color::White),
        stat_line("Network speed", format!("{:.1} Mbps", stats.network_speed), Color::Cyan),
    ])
}

fn render_anomaly_list(anomalies: &[Anomaly]) -> Paragraph<'static> {
    let lines: Vec<Line> = anomalies
        .iter()
        .rev()
        .map(|a| {
            Line::from(vec![
                Span::styled(
                    a.time.format("%H:%M:%S ").to_string(),
                    Style::new().fg(Color::Gray),
                ),
                Span::styled(a.kind.to_string(), Style::new().fg(Color::LightYellow)),
                Span::raw(format!(" {:.1}", a.value)),
            ])
        })
        .collect();
    Paragraph::new(lines)
}

fn render_notification_list(notifications: &[Notification]) -> Paragraph<'static> {
    let lines: Vec<Line> = notifications
        .iter()
        .rev()
        .map(|n| {
            Line::from(vec![
                Span::styled(format!("● {} ", n.title), severity_style(n.severity)),
                Span::raw(n.message.clone()),
            ])
        })
        .collect();
    Paragraph::new(lines).wrap(Wrap { trim: true })
}
