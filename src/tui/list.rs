//! 各模式共用的包列表渲染

use super::state::{CheckList, ItemStatus, PackageList};
use super::theme::{
    BLUE, BRIGHT_WHITE, DESC_DIM, DIM, PINK, SEL_BG, STATUS_FAILED, STATUS_OK, STATUS_RUNNING,
};
use crate::package_manager::PackageRecord;
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// 列表显示的版本列
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VersionColumn {
    /// 仅当前版本
    Current,
    /// 当前版本 → 可用版本
    Upgrade,
}

/// 让选中行保持在可见范围内
fn scroll_offset(selected: usize, visible_height: usize) -> usize {
    if visible_height > 0 && selected >= visible_height {
        selected + 1 - visible_height
    } else {
        0
    }
}

fn version_text(record: &PackageRecord, column: VersionColumn) -> String {
    match column {
        VersionColumn::Upgrade if !record.available.is_empty() => {
            format!(" {} → {}", record.version, record.available)
        }
        _ => format!(" {}", record.version),
    }
}

/// 可见窗口内 "名称 版本" 的最大显示宽度，用于 ID 列对齐
fn max_label_width<'a>(
    records: impl Iterator<Item = &'a PackageRecord>,
    column: VersionColumn,
) -> usize {
    records
        .map(|r| UnicodeWidthStr::width(r.name.as_str()) + UnicodeWidthStr::width(version_text(r, column).as_str()))
        .max()
        .unwrap_or(20)
}

fn render_scrollbar(f: &mut Frame, area: Rect, total: usize, scroll: usize) {
    if total > area.height as usize {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut state = ScrollbarState::new(total).position(scroll);
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin { horizontal: 0, vertical: 0 }),
            &mut state,
        );
    }
}

/// 一行的基本结构：光标 + 标记 + 名称 + 版本 + 对齐后的 ID/来源 + 状态
struct Row<'a> {
    record: &'a PackageRecord,
    selected: bool,
    marker: &'a str,
    marked: bool,
    badge: Option<ItemStatus>,
}

fn render_row(row: Row, label_width: usize, column: VersionColumn, focused: bool) -> Line<'static> {
    let Row { record, selected, marker, marked, badge } = row;
    let cursor = if selected && focused { ">" } else { " " };
    let version = version_text(record, column);
    let used = UnicodeWidthStr::width(record.name.as_str()) + UnicodeWidthStr::width(version.as_str());
    let padding = " ".repeat(label_width.saturating_sub(used) + 2);
    let tail = format!("{}{}  [{}]", padding, record.id, record.source_label());

    let mut spans = if selected && focused {
        let bg = Style::default().bg(SEL_BG);
        vec![
            Span::styled(format!("{}{}", cursor, marker), bg.fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD)),
            Span::styled(record.name.clone(), bg.fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD)),
            Span::styled(version, bg.fg(BLUE)),
            Span::styled(tail, bg.fg(DESC_DIM)),
        ]
    } else if marked {
        vec![
            Span::styled(format!("{}{}", cursor, marker), Style::default().fg(PINK)),
            Span::styled(record.name.clone(), Style::default().fg(PINK)),
            Span::styled(version, Style::default().fg(Color::White)),
            Span::styled(tail, Style::default().fg(DIM)),
        ]
    } else {
        vec![
            Span::styled(format!("{}{}", cursor, marker), Style::default().fg(Color::White)),
            Span::styled(record.name.clone(), Style::default().fg(BLUE)),
            Span::styled(version, Style::default().fg(Color::White)),
            Span::styled(tail, Style::default().fg(DIM)),
        ]
    };

    if let Some(status) = badge {
        spans.push(Span::raw("  "));
        spans.push(status_badge(status));
    }
    Line::from(spans)
}

fn status_badge(status: ItemStatus) -> Span<'static> {
    let color = match status {
        ItemStatus::Pending => DIM,
        ItemStatus::Installing => STATUS_RUNNING,
        ItemStatus::Installed => STATUS_OK,
        ItemStatus::Failed => STATUS_FAILED,
    };
    Span::styled(
        format!("[{}]", status.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// 渲染普通包列表（更新 / 已安装 / 搜索结果）
pub fn render_package_list(
    f: &mut Frame,
    list: &PackageList,
    column: VersionColumn,
    focused: bool,
    area: Rect,
) {
    let visible_height = area.height as usize;
    let scroll = scroll_offset(list.selected, visible_height);
    let window = || list.records.iter().skip(scroll).take(visible_height);
    let label_width = max_label_width(window(), column);

    let lines: Vec<Line> = window()
        .enumerate()
        .map(|(offset, record)| {
            let row = Row {
                record,
                selected: scroll + offset == list.selected,
                marker: "",
                marked: false,
                badge: None,
            };
            render_row(row, label_width, column, focused)
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
    render_scrollbar(f, area, list.records.len(), scroll);
}

/// 渲染带勾选框的列表；`statuses` 存在时在行尾显示安装状态
pub fn render_check_list(
    f: &mut Frame,
    list: &CheckList,
    statuses: Option<&[ItemStatus]>,
    area: Rect,
) {
    let visible_height = area.height as usize;
    let scroll = scroll_offset(list.selected, visible_height);
    let window = || list.records.iter().skip(scroll).take(visible_height);
    let label_width = max_label_width(window(), VersionColumn::Current);

    let lines: Vec<Line> = window()
        .enumerate()
        .map(|(offset, record)| {
            let idx = scroll + offset;
            let marked = list.checked.get(idx).copied().unwrap_or(false);
            let row = Row {
                record,
                selected: idx == list.selected,
                marker: if marked { "[✓] " } else { "[ ] " },
                marked,
                badge: statuses.and_then(|s| s.get(idx).copied()),
            };
            render_row(row, label_width, VersionColumn::Current, true)
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
    render_scrollbar(f, area, list.records.len(), scroll);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(25, 10), 16);
        assert_eq!(scroll_offset(3, 0), 0);
    }

    #[test]
    fn test_version_text() {
        let mut record = PackageRecord {
            name: "Git".to_string(),
            id: "Git.Git".to_string(),
            version: "2.43.0".to_string(),
            available: "2.44.0".to_string(),
            source: "winget".to_string(),
        };
        assert_eq!(version_text(&record, VersionColumn::Upgrade), " 2.43.0 → 2.44.0");
        assert_eq!(version_text(&record, VersionColumn::Current), " 2.43.0");
        record.available.clear();
        assert_eq!(version_text(&record, VersionColumn::Upgrade), " 2.43.0");
    }
}
