mod backup;
mod dashboard;
pub mod input;
mod installed;
mod layout;
mod list;
mod search;
pub mod state;
mod theme;
mod updates;

use crate::config::Config;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, style::Color, Frame, Terminal};
use state::{App, AppEvent, AppMode, BackupView, CheckList, PendingAction};
use std::io;
use tokio::sync::mpsc;

/// 在阻塞线程池中执行 winget / 文件操作，完成后把结果事件送回主循环
pub(crate) fn spawn_task<F>(tx: &mpsc::Sender<AppEvent>, task: F)
where
    F: FnOnce() -> AppEvent + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = tokio::task::spawn_blocking(task)
            .await
            .unwrap_or_else(|e| AppEvent::Error(format!("后台任务异常: {}", e)));
        let _ = tx.send(event).await;
    });
}

pub async fn run(config: Config) -> Result<()> {
    // 终端初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);

    let (tx, mut rx) = mpsc::channel(32);

    // 检测 winget
    let winget = app.winget.clone();
    spawn_task(&tx, move || {
        AppEvent::WingetDetected(winget.detect().map_err(|e| e.to_string()))
    });

    // 主循环
    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            // Windows 下同时上报按下和松开，只处理按下
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, &mut app, &tx);
                }
            }
        }

        // 处理异步事件
        while let Ok(event) = rx.try_recv() {
            handle_event(event, &mut app, &tx);
        }

        if app.should_quit {
            break;
        }
    }

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

/// 进入某个模式，首次进入时自动加载数据
fn enter_mode(mode: AppMode, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.mode == mode {
        return;
    }
    app.mode = mode;
    match mode {
        AppMode::Updates => {
            app.updates.clear();
            updates::load_updates(app, tx);
        }
        AppMode::Installed => {
            app.installed.clear();
            installed::load_installed(app, tx);
        }
        AppMode::Search => app.reset_search_state(),
        AppMode::Backup => app.reset_backup_state(),
        AppMode::Dashboard => {}
    }
}

fn handle_key(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // 弹窗：任意键关闭
    if app.message.is_some() {
        app.message = None;
        return;
    }

    // 确认框：y 执行，n / Esc 取消
    if let Some(action) = app.confirm.take() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => confirm_action(action, app, tx),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
            _ => app.confirm = Some(action),
        }
        return;
    }

    // 有操作进行中时忽略其余按键
    if app.busy.is_some() {
        return;
    }

    match key.code {
        // q 仅在 Dashboard 退出
        KeyCode::Char('q') if app.mode == AppMode::Dashboard => {
            app.should_quit = true;
        }
        KeyCode::Esc => match app.mode {
            AppMode::Dashboard => {}
            AppMode::Backup if app.backup.prompt.is_some() || app.backup.view != BackupView::Menu => {
                backup::handle_backup_key(key, app, tx);
            }
            _ => app.mode = AppMode::Dashboard,
        },
        // 模式切换快捷键 (Shift + 字母)，文本输入时作为普通字符
        KeyCode::Char('U' | 'I' | 'S' | 'B') if !app.is_typing() => {
            let mode = match key.code {
                KeyCode::Char('U') => AppMode::Updates,
                KeyCode::Char('I') => AppMode::Installed,
                KeyCode::Char('S') => AppMode::Search,
                _ => AppMode::Backup,
            };
            enter_mode(mode, app, tx);
        }
        // 委托给当前模式处理
        _ => match app.mode {
            AppMode::Dashboard => {}
            AppMode::Updates => updates::handle_updates_key(key, app, tx),
            AppMode::Installed => installed::handle_installed_key(key, app, tx),
            AppMode::Search => search::handle_search_key(key, app, tx),
            AppMode::Backup => backup::handle_backup_key(key, app, tx),
        },
    }
}

fn confirm_action(action: PendingAction, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.busy.is_some() {
        return;
    }
    match action {
        PendingAction::Upgrade(id) => updates::spawn_upgrade(app, tx, id),
        PendingAction::Uninstall(id) => installed::spawn_uninstall(app, tx, id),
        PendingAction::Install(id) => search::spawn_install(app, tx, id),
        PendingAction::InstallBatch(_) => backup::spawn_batch_install(app, tx),
    }
}

fn handle_event(event: AppEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::WingetDetected(result) => {
            if let Err(e) = &result {
                log::warn!("{}", e);
            }
            app.winget_version = Some(result);
        }
        AppEvent::UpdatesLoaded { records, output } => {
            app.busy = None;
            report_fetch_error(app, &output);
            app.updates.replace(records);
        }
        AppEvent::InstalledLoaded { records, output } => {
            app.busy = None;
            report_fetch_error(app, &output);
            app.installed.replace(records);
        }
        AppEvent::SearchLoaded { records, output } => {
            app.busy = None;
            report_fetch_error(app, &output);
            app.search.list.replace(records);
            if !app.search.list.records.is_empty() {
                app.search.focus = state::SearchFocus::Results;
            }
        }
        AppEvent::ActionFinished { mode, output } => {
            app.busy = None;
            app.show_output(&output);
            // 升级 / 卸载后刷新列表
            match mode {
                AppMode::Updates if app.mode == AppMode::Updates => updates::load_updates(app, tx),
                AppMode::Installed if app.mode == AppMode::Installed => {
                    installed::load_installed(app, tx)
                }
                _ => {}
            }
        }
        AppEvent::ExportCandidatesLoaded(records) => {
            app.busy = None;
            if records.is_empty() {
                app.message = Some("No verified packages found to export.".to_string());
            } else {
                app.backup.export = CheckList::new(records);
                app.backup.view = BackupView::Export;
            }
        }
        AppEvent::ExportFinished(result) => {
            app.busy = None;
            match result {
                Ok(summary) => {
                    log::info!("{}", summary.message());
                    app.message = Some(summary.message());
                    app.backup.export = CheckList::default();
                    app.backup.view = BackupView::Menu;
                }
                Err(e) => app.message = Some(format!("Export failed: {}", e)),
            }
        }
        AppEvent::ImportLoaded(result) => {
            app.busy = None;
            match result {
                Ok(records) => {
                    let count = records.len();
                    app.backup.load_import(records);
                    app.backup.log_line(&format!("Successfully imported {} packages.", count));
                }
                Err(e) => app.message = Some(format!("Import failed: {}", e)),
            }
        }
        AppEvent::BatchProgress(event) => {
            app.backup.apply_batch_event(event);
        }
        AppEvent::BatchComplete(report) => {
            app.busy = None;
            app.backup.installing = false;
            app.backup.log_line(&report.summary());
        }
        AppEvent::Error(msg) => {
            log::error!("{}", msg);
            app.busy = None;
            app.backup.installing = false;
            app.message = Some(msg);
        }
    }
}

/// 查询失败且没有解析出任何表格时弹出错误
fn report_fetch_error(app: &mut App, output: &crate::package_manager::CommandOutput) {
    if output.error.is_some() && output.stdout.trim().is_empty() {
        app.show_output(output);
    }
}

fn ui(f: &mut Frame, app: &App) {
    match app.mode {
        AppMode::Dashboard => dashboard::render_dashboard(f, app),
        AppMode::Updates => updates::render_updates(f, app),
        AppMode::Installed => installed::render_installed(f, app),
        AppMode::Search => search::render_search(f, app),
        AppMode::Backup => backup::render_backup(f, app),
    }

    if let Some(action) = &app.confirm {
        layout::render_popup(f, "确认", &action.prompt(), "y 确认 / n 取消", Color::Yellow);
    } else if let Some(msg) = &app.message {
        layout::render_popup(f, "消息", msg, "任意键关闭", theme::BLUE);
    }
}
