use super::state::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const ASCII_LOGO: &str = r#"
██       ██                   
░██      ░░                   
░██       ██  ██████  ███████ 
░██      ░██ ░░░░░░██░░██░░░██
░██      ░██  ███████ ░██  ░██
░██      ░██ ██░░░░██ ░██  ░██
░████████░██░░████████░██  ░██
░░░░░░░░ ░░  ░░░░░░░░ ░░   ░░"#;

pub fn render_dashboard(f: &mut Frame, app: &App) {
    let area = f.area();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(block, area);

    // 构建所有行
    let mut lines: Vec<Line> = Vec::new();

    // 空行填充（顶部留白）
    lines.push(Line::from(""));

    // ASCII Logo
    for logo_line in ASCII_LOGO.lines() {
        lines.push(Line::from(vec![Span::styled(
            logo_line.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(""));

    lines.push(section_title("── winget ──"));
    lines.push(Line::from(""));

    match &app.winget_version {
        None => lines.push(info_line("版本  ", "检测中...")),
        Some(Ok(version)) => lines.push(info_line("版本  ", version)),
        Some(Err(e)) => lines.push(Line::from(vec![Span::styled(
            e.clone(),
            Style::default().fg(Color::Red),
        )])),
    }
    lines.push(info_line("程序  ", app.winget.name()));
    lines.push(info_line("软件源  ", &app.winget.source));
    lines.push(info_line(
        "备份目录  ",
        &app.config.backup_dir.display().to_string(),
    ));

    lines.push(Line::from(""));
    lines.push(Line::from(""));

    lines.push(section_title("── 快捷键 ──"));
    lines.push(Line::from(""));

    lines.push(shortcut_line("U", " 检查更新         "));
    lines.push(shortcut_line("I", " 已安装的软件包   "));
    lines.push(shortcut_line("S", " 搜索并安装       "));
    lines.push(shortcut_line("B", " 备份与恢复       "));
    lines.push(shortcut_line("q", " 退出             "));

    lines.push(Line::from(""));
    lines.push(Line::from(""));

    // 版本号
    lines.push(Line::from(vec![Span::styled(
        format!("lian-winget v{}  ", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    )]));

    let lines_count = lines.len();
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);

    // 垂直居中：计算内容高度，用 Layout 居中
    let content_height = lines_count as u16;
    let inner = area.inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 1,
    });

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(content_height),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(paragraph, vertical[1]);
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        title.to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )])
}

/// 信息行: "标签: 值"
fn info_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
    ])
}

/// 快捷键行: "  X  描述"
fn shortcut_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("  {key}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc.to_string(), Style::default().fg(Color::White)),
    ])
}
