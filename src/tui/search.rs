use super::input::render_input_box;
use super::layout;
use super::list::{self, VersionColumn};
use super::spawn_task;
use super::state::{App, AppEvent, AppMode, PendingAction, SearchFocus};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};
use tokio::sync::mpsc;

/// 执行搜索；空查询不调用 winget
fn run_search(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.busy.is_some() || app.search.input.is_blank() {
        return;
    }
    let query = app.search.input.content().trim().to_string();
    app.search.last_query = query.clone();
    app.busy = Some(format!("Searching for \"{}\"...", query));
    let winget = app.winget.clone();
    spawn_task(tx, move || {
        let (records, output) = winget.fetch_search(&query);
        AppEvent::SearchLoaded { records, output }
    });
}

pub fn spawn_install(app: &mut App, tx: &mpsc::Sender<AppEvent>, id: String) {
    app.busy = Some(format!("Installing {}...", id));
    let winget = app.winget.clone();
    spawn_task(tx, move || AppEvent::ActionFinished {
        mode: AppMode::Search,
        output: winget.install(&id),
    });
}

pub fn handle_search_key(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    match app.search.focus {
        SearchFocus::Input => match key.code {
            KeyCode::Enter => run_search(app, tx),
            KeyCode::Tab | KeyCode::Down => {
                if !app.search.list.records.is_empty() {
                    app.search.focus = SearchFocus::Results;
                }
            }
            _ => {
                app.search.input.handle_key(key);
            }
        },
        SearchFocus::Results => match key.code {
            KeyCode::Tab => app.search.focus = SearchFocus::Input,
            KeyCode::Up | KeyCode::Char('k') => {
                if app.search.list.selected == 0 {
                    app.search.focus = SearchFocus::Input;
                } else {
                    app.search.list.select_up();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => app.search.list.select_down(),
            KeyCode::Enter => {
                if let Some(record) = app.search.list.current() {
                    app.confirm = Some(PendingAction::Install(record.id.clone()));
                }
            }
            _ => {}
        },
    }
}

pub fn render_search(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());
    layout::render_header(f, "🔍 搜索软件包", chunks[0]);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(chunks[1]);

    let input_focused = app.search.focus == SearchFocus::Input;
    render_input_box(f, &app.search.input, "搜索:", input_focused, body[0]);

    let title = if app.search.list.loaded {
        format!(" \"{}\" - {} 个结果 ", app.search.last_query, app.search.list.records.len())
    } else {
        " 结果 ".to_string()
    };
    let border = if input_focused { Color::DarkGray } else { Color::Yellow };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(body[1]);
    f.render_widget(block, body[1]);

    if app.search.list.records.is_empty() {
        if app.search.list.loaded {
            layout::render_placeholder(f, "No verified packages found.", inner);
        }
    } else {
        list::render_package_list(f, &app.search.list, VersionColumn::Current, !input_focused, inner);
    }

    let footer = match (&app.busy, app.search.focus) {
        (Some(msg), _) => msg.clone(),
        (None, SearchFocus::Input) => "Enter 搜索 | Tab 切换到结果 | Esc 返回".to_string(),
        (None, SearchFocus::Results) => "↑↓ 选择 | Enter 安装 | Tab 切换到输入 | Esc 返回".to_string(),
    };
    layout::render_footer(f, &footer, chunks[2]);
}
