//! 备份模式：导出已安装的包到加密文件，或从文件导入并逐个安装

use super::input::{render_input_box, InputBox};
use super::layout;
use super::list;
use super::spawn_task;
use super::state::{App, AppEvent, BackupView, PathPrompt, PathPurpose, PendingAction};
use crate::backup::{self, default_path};
use crate::package_manager::install_all;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear},
    Frame,
};
use std::path::PathBuf;
use tokio::sync::mpsc;

fn open_prompt(app: &mut App, purpose: PathPurpose) {
    let default = default_path(&app.config.backup_dir);
    app.backup.prompt = Some(PathPrompt {
        purpose,
        input: InputBox::with_text(&default.to_string_lossy()),
    });
}

/// 导出前先获取已安装列表
fn load_export_candidates(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.busy.is_some() {
        return;
    }
    app.busy = Some("Fetching installed packages...".to_string());
    let winget = app.winget.clone();
    spawn_task(tx, move || {
        let (records, output) = winget.fetch_installed();
        if let Some(e) = &output.error {
            log::warn!("导出前获取已安装列表失败: {}", e);
        }
        AppEvent::ExportCandidatesLoaded(records)
    });
}

/// 路径输入框中按 Enter
fn submit_prompt(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let Some(prompt) = app.backup.prompt.take() else {
        return;
    };
    if prompt.input.is_blank() || app.busy.is_some() {
        return;
    }
    let path = PathBuf::from(prompt.input.content().trim());

    match prompt.purpose {
        PathPurpose::Export => {
            let records = app.backup.export.checked_records();
            app.busy = Some("Exporting...".to_string());
            spawn_task(tx, move || {
                AppEvent::ExportFinished(backup::export_to_file(&records, &path).map_err(|e| e.to_string()))
            });
        }
        PathPurpose::Import => {
            app.busy = Some("Reading backup file...".to_string());
            spawn_task(tx, move || {
                AppEvent::ImportLoaded(backup::import_from_file(&path).map_err(|e| e.to_string()))
            });
        }
    }
}

/// 确认后在独立线程中顺序安装所有勾选的包
pub fn spawn_batch_install(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let records = app.backup.import.checked_records();
    if records.is_empty() {
        return;
    }
    app.busy = Some(format!("Installing {} packages...", records.len()));
    app.backup.installing = true;
    app.backup.log_line(&format!("Starting installation of {} packages...", records.len()));

    let winget = app.winget.clone();
    let tx = tx.clone();
    std::thread::spawn(move || {
        let report = install_all(
            &records,
            |record| winget.install(&record.id),
            |event| {
                let _ = tx.blocking_send(AppEvent::BatchProgress(event));
            },
        );
        log::info!("批量安装结束: {}", report.summary());
        let _ = tx.blocking_send(AppEvent::BatchComplete(report));
    });
}

pub fn handle_backup_key(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    // 路径输入优先
    if app.backup.prompt.is_some() {
        match key.code {
            KeyCode::Esc => app.backup.prompt = None,
            KeyCode::Enter => submit_prompt(app, tx),
            _ => {
                if let Some(prompt) = app.backup.prompt.as_mut() {
                    prompt.input.handle_key(key);
                }
            }
        }
        return;
    }

    match app.backup.view {
        BackupView::Menu => match key.code {
            KeyCode::Char('e') => load_export_candidates(app, tx),
            KeyCode::Char('o') => open_prompt(app, PathPurpose::Import),
            _ => {}
        },
        BackupView::Export => match key.code {
            KeyCode::Esc => app.backup.view = BackupView::Menu,
            KeyCode::Up | KeyCode::Char('k') => app.backup.export.select_up(),
            KeyCode::Down | KeyCode::Char('j') => app.backup.export.select_down(),
            KeyCode::Char(' ') => app.backup.export.toggle_current(),
            KeyCode::Char('a') => app.backup.export.toggle_all(),
            KeyCode::Enter => {
                if app.backup.export.checked_count() == 0 {
                    app.message = Some("Please select at least one package to export.".to_string());
                } else {
                    open_prompt(app, PathPurpose::Export);
                }
            }
            _ => {}
        },
        BackupView::Import => match key.code {
            KeyCode::Esc => app.backup.view = BackupView::Menu,
            KeyCode::Up | KeyCode::Char('k') => app.backup.import.select_up(),
            KeyCode::Down | KeyCode::Char('j') => app.backup.import.select_down(),
            KeyCode::PageUp => app.backup.log_scroll = app.backup.log_scroll.saturating_sub(5),
            KeyCode::PageDown => {
                let last = app.backup.log.len().saturating_sub(1);
                app.backup.log_scroll = (app.backup.log_scroll + 5).min(last);
            }
            KeyCode::Char(' ') => app.backup.import.toggle_current(),
            KeyCode::Char('a') => app.backup.import.toggle_all(),
            KeyCode::Enter => {
                let count = app.backup.import.checked_count();
                if count == 0 {
                    app.message = Some("Please select at least one package to install.".to_string());
                } else {
                    app.confirm = Some(PendingAction::InstallBatch(count));
                }
            }
            _ => {}
        },
    }
}

pub fn render_backup(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());

    match app.backup.view {
        BackupView::Menu => {
            layout::render_header(f, "💾 备份与恢复", chunks[0]);
            let lines = vec![
                String::new(),
                "  e  导出已安装的软件包到备份文件".to_string(),
                "  o  从备份文件导入并安装".to_string(),
                String::new(),
                format!("  默认目录: {}", app.config.backup_dir.display()),
                format!("  文件扩展名: .{}", backup::BACKUP_EXTENSION),
                String::new(),
                "  备份文件经过加密，只能由本程序导入。".to_string(),
            ];
            layout::render_scrollable_content(f, "操作", &lines, 0, chunks[1]);
        }
        BackupView::Export => {
            let export = &app.backup.export;
            let header = format!("📤 导出 - 已选 {}/{}", export.checked_count(), export.records.len());
            layout::render_header(f, &header, chunks[0]);

            let block = Block::default()
                .title(" 选择要导出的软件包 ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow));
            let inner = block.inner(chunks[1]);
            f.render_widget(block, chunks[1]);
            list::render_check_list(f, export, None, inner);
        }
        BackupView::Import => {
            let import = &app.backup.import;
            let mut header = format!("📥 导入 - 已选 {}/{}", import.checked_count(), import.records.len());
            if app.backup.installing {
                header.push_str(" (安装中)");
            }
            layout::render_header(f, &header, chunks[0]);

            let body = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(10)])
                .split(chunks[1]);

            let block = Block::default()
                .title(" 文件中的软件包 ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow));
            let inner = block.inner(body[0]);
            f.render_widget(block, body[0]);
            if import.records.is_empty() {
                layout::render_placeholder(f, "No packages in file.", inner);
            } else {
                list::render_check_list(f, import, Some(&app.backup.statuses), inner);
            }

            layout::render_scrollable_content(f, "安装日志", &app.backup.log, app.backup.log_scroll, body[1]);
        }
    }

    let footer = match (&app.busy, app.backup.view) {
        (Some(msg), _) => msg.clone(),
        (None, BackupView::Menu) => "e 导出 | o 导入 | Esc 返回".to_string(),
        (None, BackupView::Export) => "↑↓ 选择 | Space 勾选 | a 全选 | Enter 导出 | Esc 返回".to_string(),
        (None, BackupView::Import) => {
            "↑↓ 选择 | Space 勾选 | a 全选 | Enter 安装 | PgUp/PgDn 日志 | Esc 返回".to_string()
        }
    };
    layout::render_footer(f, &footer, chunks[2]);

    if let Some(prompt) = &app.backup.prompt {
        let label = match prompt.purpose {
            PathPurpose::Export => "导出到:",
            PathPurpose::Import => "导入自:",
        };
        let popup = layout::centered_rect(80, 20, f.area());
        let area = Rect {
            y: popup.y + popup.height.saturating_sub(3) / 2,
            height: 3.min(f.area().height),
            ..popup
        };
        f.render_widget(Clear, area);
        render_input_box(f, &prompt.input, label, true, area);
    }
}
