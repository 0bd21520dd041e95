// src/ui/widgets/results.rs

use crate::app::{App, AppState, QUICK_EXAMPLES, SPINNER_CHARS};
use crate::core::models::{
    DnsReport, GeoRow, HttpRow, NormalizedData, PingRow, PortRow, PortScanRow, RowStatus, TracerouteReport,
};
use crate::core::tab_state::TabStatus;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

/// Renders the content pane: quick examples before the first run, the focused tab afterwards.
pub fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    if app.session.is_none() || (app.state == AppState::Editing && app.target_input.is_empty()) {
        render_examples(frame, area);
        return;
    }

    let category = app.active_tab;
    let block = Block::default().borders(Borders::ALL).title(format!("{} (↑ ↓ to scroll)", category.label()));
    let state = app.active_state();

    let message = match state.status {
        TabStatus::Unavailable => Some(Text::from(vec![
            Line::from("Unavailable: specify a port".fg(Color::DarkGray)),
            Line::from(""),
            Line::from(format!("Press n and enter a port number to run {} checks.", category.label())),
        ])),
        TabStatus::Unrequested => Some(Text::from("Open this tab to run the check.")),
        TabStatus::Pending if app.is_dormant(category) => Some(Text::from(vec![
            Line::from(format!("Still pending after {} attempts.", state.retry_count).fg(Color::Magenta)),
            Line::from(""),
            Line::from("Press r to poll again."),
        ])),
        TabStatus::Pending => Some(Text::from(Line::from(vec![
            Span::styled(format!("{} ", SPINNER_CHARS[app.spinner_frame]), Style::default().fg(Color::Cyan)),
            Span::raw(format!("Running {} check...", category.label())),
            Span::styled(
                if state.retry_count > 0 { format!(" (attempt {})", state.retry_count + 1) } else { String::new() },
                Style::default().fg(Color::DarkGray),
            ),
        ]))),
        TabStatus::Error => Some(Text::from(vec![
            Line::from(format!("Error: {}", state.error.as_deref().unwrap_or("unknown error")).fg(Color::Red)),
            Line::from(""),
            Line::from("Press r to retry."),
        ])),
        TabStatus::Ready => None,
    };

    if let Some(message) = message {
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let offset = app.scroll_offset as usize;
    match &state.data {
        Some(NormalizedData::Http(rows)) => frame.render_widget(http_table(rows, offset).block(block), area),
        Some(NormalizedData::Ping(rows)) => frame.render_widget(ping_table(rows, offset).block(block), area),
        Some(NormalizedData::Ports(rows)) => frame.render_widget(port_table(rows, offset).block(block), area),
        Some(NormalizedData::GeoIp(rows)) => frame.render_widget(geo_table(rows, offset).block(block), area),
        Some(NormalizedData::Dns(report)) => render_text(frame, dns_text(report), block, app, area),
        Some(NormalizedData::Traceroute(report)) => render_text(frame, traceroute_text(report), block, app, area),
        Some(NormalizedData::PortScan(rows)) => render_text(frame, portscan_text(rows), block, app, area),
        None => frame.render_widget(Paragraph::new("No data available").block(block), area),
    }
}

fn render_examples(frame: &mut Frame, area: Rect) {
    let mut lines = vec![Line::from("Try these examples".bold()), Line::from("")];
    for (index, (name, target)) in QUICK_EXAMPLES.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("F{:<3}", index + 1), Style::default().fg(Color::Yellow)),
            Span::raw(format!("{:<16}", name)),
            Span::styled(*target, Style::default().fg(Color::Cyan)),
        ]));
    }
    let block = Block::default().borders(Borders::ALL).title("Network Check");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_text(frame: &mut Frame, text: Text<'static>, block: Block, app: &App, area: Rect) {
    let paragraph = Paragraph::new(text).block(block).scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, area);
}

fn status_cell(status: RowStatus) -> Cell<'static> {
    let color = match status {
        RowStatus::Success => Color::Green,
        RowStatus::Failed => Color::Red,
        RowStatus::Pending => Color::Cyan,
    };
    Cell::from(status.to_string()).style(Style::default().fg(color))
}

fn header(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().copied().map(Cell::from)).style(Style::new().bold().underlined())
}

fn http_table(rows: &[HttpRow], offset: usize) -> Table<'static> {
    let body = rows.iter().skip(offset).map(|row| {
        Row::new(vec![
            Cell::from(row.agent.clone()),
            status_cell(row.status),
            Cell::from(row.code.map(|code| code.to_string()).unwrap_or_else(|| "N/A".to_string())),
            Cell::from(row.response_time.clone()),
            Cell::from(row.ip.clone()),
            Cell::from(if row.ssl { "✓" } else { "✗" }),
            Cell::from(row.server.clone()),
        ])
    });
    Table::new(
        body,
        [
            Constraint::Percentage(22),
            Constraint::Length(8),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Percentage(20),
            Constraint::Length(4),
            Constraint::Min(8),
        ],
    )
    .header(header(&["Location", "Status", "Code", "Response", "IP Address", "SSL", "Server"]))
}

fn ping_table(rows: &[PingRow], offset: usize) -> Table<'static> {
    let body = rows.iter().skip(offset).map(|row| {
        let loss_color = if row.packet_loss == "0%" { Color::Green } else { Color::Yellow };
        Row::new(vec![
            Cell::from(row.agent.clone()),
            status_cell(row.status),
            Cell::from(format!("{}/{}", row.packets_received, row.packets_sent)),
            Cell::from(row.packet_loss.clone()).style(Style::default().fg(loss_color)),
            Cell::from(row.min_time.clone()),
            Cell::from(row.avg_time.clone()),
            Cell::from(row.max_time.clone()),
            Cell::from(row.ip.clone()),
        ])
    });
    Table::new(
        body,
        [
            Constraint::Percentage(22),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Min(8),
        ],
    )
    .header(header(&["Location", "Status", "Packets", "Loss", "Min", "Avg", "Max", "IP Address"]))
}

fn port_table(rows: &[PortRow], offset: usize) -> Table<'static> {
    let body = rows.iter().skip(offset).map(|row| {
        let state = match row.status {
            RowStatus::Success if row.reachable => Cell::from("Open").style(Style::default().fg(Color::Green)),
            RowStatus::Success => Cell::from("Closed").style(Style::default().fg(Color::Red)),
            status => status_cell(status),
        };
        Row::new(vec![
            Cell::from(row.agent.clone()),
            Cell::from(row.port.map(|port| port.to_string()).unwrap_or_else(|| "N/A".to_string())),
            state,
            Cell::from(row.latency.clone()),
            Cell::from(row.protocol.to_string().to_uppercase()),
            Cell::from(row.ip.clone()),
        ])
    });
    Table::new(
        body,
        [
            Constraint::Percentage(25),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Min(8),
        ],
    )
    .header(header(&["Location", "Port", "State", "Latency", "Protocol", "IP Address"]))
}

fn geo_table(rows: &[GeoRow], offset: usize) -> Table<'static> {
    let body = rows.iter().skip(offset).map(|row| {
        Row::new(vec![
            Cell::from(row.agent.clone()),
            Cell::from(row.ip.clone()),
            Cell::from(row.isp.clone()),
            Cell::from(row.country.clone()),
            Cell::from(format!("{}, {}", row.city, row.region)),
            Cell::from(row.postal_code.clone()),
            Cell::from(row.timezone.clone()),
            Cell::from(row.coordinates_label.clone()),
        ])
    });
    Table::new(
        body,
        [
            Constraint::Percentage(15),
            Constraint::Length(16),
            Constraint::Percentage(15),
            Constraint::Percentage(12),
            Constraint::Percentage(18),
            Constraint::Length(8),
            Constraint::Percentage(12),
            Constraint::Min(10),
        ],
    )
    .header(header(&["Location", "IP", "ISP", "Country", "City", "Postal", "Timezone", "Coordinates"]))
}

fn dns_text(report: &DnsReport) -> Text<'static> {
    let mut lines = vec![Line::from(vec![
        Span::raw("Resolved by "),
        Span::styled(report.agent.clone(), Style::default().fg(Color::Cyan)),
    ])];
    if report.status == RowStatus::Failed {
        lines.push(Line::from("All agents failed to resolve the domain.".fg(Color::Red)));
    }

    let sections = [
        ("A", &report.records.a_records),
        ("AAAA", &report.records.aaaa_records),
        ("MX", &report.records.mx_records),
        ("NS", &report.records.ns_records),
        ("CNAME", &report.records.cname_records),
        ("TXT", &report.records.txt_records),
    ];
    for (name, records) in sections {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("{} Records", name), Style::default().bold().underlined())));
        if records.is_empty() {
            lines.push(Line::from("  none".fg(Color::DarkGray)));
        }
        for record in records {
            lines.push(Line::from(format!("  {}", record)));
        }
    }
    Text::from(lines)
}

fn traceroute_text(report: &TracerouteReport) -> Text<'static> {
    let mut lines = vec![
        Line::from(vec![Span::raw("Target: "), Span::styled(report.target.clone(), Style::default().bold())]),
        Line::from(format!("Traced from {}", report.agent)),
        Line::from(vec![
            Span::raw(format!("Total hops: {}  ", report.summary.total_hops)),
            Span::styled(format!("Successful: {}  ", report.summary.successful), Style::default().fg(Color::Green)),
            Span::styled(format!("Timeouts: {}", report.summary.timeouts), Style::default().fg(Color::Red)),
        ]),
        Line::from(""),
    ];

    for hop in &report.hops {
        let time_style = if hop.is_timeout() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        let mut spans = vec![
            Span::styled(format!("{:>3}  ", hop.ttl), Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{:<16}", hop.ip)),
            Span::styled(format!("{:>10}", hop.time), time_style),
        ];
        if let Some(hostname) = hop.hostname.as_ref().filter(|hostname| **hostname != hop.ip) {
            spans.push(Span::raw(format!("  ({})", hostname)));
        }
        if let Some(loss) = &hop.packet_loss {
            spans.push(Span::styled(format!("  {} loss", loss), Style::default().fg(Color::Yellow)));
        }
        let details: Vec<String> = [
            hop.asn.as_ref().map(|asn| format!("AS{}", asn)),
            hop.country.clone(),
            hop.isp.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !details.is_empty() {
            spans.push(Span::styled(format!("  {}", details.join(" | ")), Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::from(spans));
    }
    Text::from(lines)
}

fn portscan_text(rows: &[PortScanRow]) -> Text<'static> {
    let mut lines = Vec::new();
    for row in rows {
        lines.push(Line::from(vec![
            Span::styled(row.agent.clone(), Style::default().bold()),
            Span::raw("  "),
            Span::raw(row.status.to_string()),
        ]));
        if let Some(runtime) = &row.runtime {
            lines.push(Line::from(
                format!(
                    "  Scanned {} in {}s, exit {} (Nmap {})",
                    runtime.time, runtime.elapsed, runtime.exit, runtime.version
                )
                .fg(Color::DarkGray),
            ));
        }
        if row.hosts.is_empty() && row.status == RowStatus::Success {
            lines.push(Line::from("  No scan results available"));
        }
        for host in &row.hosts {
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", host.ip), Style::default().fg(Color::Cyan)),
                Span::raw(format!("({})  ", host.hostname)),
                Span::styled(format!("open {} ", host.open), Style::default().fg(Color::Green)),
                Span::raw(format!("closed {} ", host.closed)),
                Span::styled(format!("filtered {}", host.filtered), Style::default().fg(Color::Yellow)),
            ]));
            for port in &host.ports {
                lines.push(Line::from(format!(
                    "    {:>5}/{:<4} {:<9} {:<14} {} (conf {}/10)",
                    port.port, port.protocol, port.state, port.service, port.reason, port.confidence
                )));
            }
            for os in host.os_matches.iter().take(3) {
                lines.push(Line::from(format!("    OS: {} ({}%)", os.name, os.accuracy).fg(Color::DarkGray)));
            }
        }
        lines.push(Line::from(""));
    }
    Text::from(lines)
}
