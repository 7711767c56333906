//! Stats table rendering: one header row plus one row per XDP action.

use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

use crate::action::XdpAction;
use crate::stats::{
    format_bit_rate, format_packet_rate, format_period, format_total_bytes, RateRecord, Snapshot,
};

pub const HEADERS: [&str; 6] = [
    "Action",
    "Total Packets",
    "Packets Per Sec",
    "Total Bytes",
    "Bit Rate",
    "Period",
];

const COLS: [Constraint; 6] = [
    Constraint::Length(14),
    Constraint::Length(16),
    Constraint::Length(18),
    Constraint::Length(14),
    Constraint::Length(16),
    Constraint::Min(10),
];

/// Draws the full-frame stats table. With `rates` absent (the first frame,
/// which has no previous snapshot to diff against) only the cumulative
/// columns are filled and the rate cells stay blank.
pub fn draw_stats_table(
    f: &mut Frame<'_>,
    snapshot: &Snapshot,
    rates: Option<&[RateRecord; XdpAction::COUNT]>,
) {
    let header = Row::new(HEADERS.map(str::to_string))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows = XdpAction::ALL.map(|action| {
        let i = action.index() as usize;
        let total = snapshot.slots[i].total;
        let (pps, bit_rate, period) = match rates {
            Some(r) => (
                format_packet_rate(r[i].packets_per_sec),
                format_bit_rate(r[i].bits_per_sec),
                format_period(r[i].period_secs),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        Row::new(vec![
            action.name().to_string(),
            total.packets.to_string(),
            pps,
            format_total_bytes(total.bytes),
            bit_rate,
            period,
        ])
    });

    let table = Table::new(rows, COLS).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("xdptop — XDP action stats (press 'q' to quit)"),
    );
    f.render_widget(table, f.area());
}
