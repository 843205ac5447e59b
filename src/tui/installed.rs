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

pub fn load_installed(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.busy.is_some() {
        return;
    }
    app.busy = Some("Loading installed packages...".to_string());
    let winget = app.winget.clone();
    spawn_task(tx, move || {
        let (records, output) = winget.fetch_installed();
        AppEvent::InstalledLoaded { records, output }
    });
}

pub fn spawn_uninstall(app: &mut App, tx: &mpsc::Sender<AppEvent>, id: String) {
    app.busy = Some(format!("Uninstalling {}...", id));
    let winget = app.winget.clone();
    spawn_task(tx, move || AppEvent::ActionFinished {
        mode: AppMode::Installed,
        output: winget.uninstall(&id),
    });
}

pub fn handle_installed_key(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.installed.select_up(),
        KeyCode::Down | KeyCode::Char('j') => app.installed.select_down(),
        KeyCode::Char('r') => load_installed(app, tx),
        KeyCode::Enter => {
            if let Some(record) = app.installed.current() {
                app.confirm = Some(PendingAction::Uninstall(record.id.clone()));
            }
        }
        _ => {}
    }
}

pub fn render_installed(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());

    let header = if app.installed.loaded {
        format!("📦 已安装 - {} 个", app.installed.records.len())
    } else {
        "📦 已安装".to_string()
    };
    layout::render_header(f, &header, chunks[0]);

    let block = Block::default()
        .title(format!(" 软件源: {} ", app.winget.source))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(chunks[1]);
    f.render_widget(block, chunks[1]);

    if app.installed.records.is_empty() {
        if app.installed.loaded {
            layout::render_placeholder(f, "No verified winget packages found.", inner);
        }
    } else {
        list::render_package_list(f, &app.installed, VersionColumn::Current, true, inner);
    }

    let footer = app
        .busy
        .clone()
        .unwrap_or_else(|| "↑↓ 选择 | Enter 卸载 | r 刷新 | Esc 返回".to_string());
    layout::render_footer(f, &footer, chunks[2]);
}
