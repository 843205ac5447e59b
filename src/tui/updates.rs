use super::layout;
use super::list::{self, VersionColumn};
use super::spawn_task;
use super::state::{App, AppEvent, AppMode, PendingAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};
use tokio::sync::mpsc;

/// 后台执行 winget upgrade 并解析可升级列表
pub fn load_updates(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.busy.is_some() {
        return;
    }
    app.busy = Some("Checking for updates...".to_string());
    let winget = app.winget.clone();
    spawn_task(tx, move || {
        let (records, output) = winget.fetch_updates();
        AppEvent::UpdatesLoaded { records, output }
    });
}

/// 确认后升级单个包
pub fn spawn_upgrade(app: &mut App, tx: &mpsc::Sender<AppEvent>, id: String) {
    app.busy = Some(format!("Upgrading {}...", id));
    let winget = app.winget.clone();
    spawn_task(tx, move || AppEvent::ActionFinished {
        mode: AppMode::Updates,
        output: winget.upgrade(&id),
    });
}

pub fn handle_updates_key(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.updates.select_up(),
        KeyCode::Down | KeyCode::Char('j') => app.updates.select_down(),
        KeyCode::Char('r') => load_updates(app, tx),
        KeyCode::Enter => {
            if let Some(record) = app.updates.current() {
                app.confirm = Some(PendingAction::Upgrade(record.id.clone()));
            }
        }
        _ => {}
    }
}

pub fn render_updates(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());

    let header = if app.updates.loaded {
        format!("⬆️  可用更新 - {} 个", app.updates.records.len())
    } else {
        "⬆️  可用更新".to_string()
    };
    layout::render_header(f, &header, chunks[0]);

    let block = Block::default()
        .title(format!(" 软件源: {} ", app.winget.source))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(chunks[1]);
    f.render_widget(block, chunks[1]);

    if app.updates.records.is_empty() {
        if app.updates.loaded {
            layout::render_placeholder(f, "No verified winget updates available.", inner);
        }
    } else {
        list::render_package_list(f, &app.updates, VersionColumn::Upgrade, true, inner);
    }

    let footer = app
        .busy
        .clone()
        .unwrap_or_else(|| "↑↓ 选择 | Enter 升级 | r 刷新 | Esc 返回".to_string());
    layout::render_footer(f, &footer, chunks[2]);
}
