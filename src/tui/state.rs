use super::input::InputBox;
use crate::backup::ExportSummary;
use crate::config::Config;
use crate::package_manager::parser::clean_terminal_output;
use crate::package_manager::{BatchEvent, BatchReport, CommandOutput, PackageRecord, Winget};

// ========== 枚举 ==========

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Dashboard,
    Updates,   // Shift+U: winget upgrade
    Installed, // Shift+I: winget list
    Search,    // Shift+S: winget search
    Backup,    // Shift+B: 导出 / 导入
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchFocus {
    Input,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackupView {
    Menu,
    Export,
    Import,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathPurpose {
    Export,
    Import,
}

/// 导入列表中每个包的安装状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemStatus {
    Pending,
    Installing,
    Installed,
    Failed,
}

impl ItemStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "Pending",
            ItemStatus::Installing => "Installing...",
            ItemStatus::Installed => "Installed",
            ItemStatus::Failed => "Failed",
        }
    }
}

/// 需要用户确认后才执行的操作
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Upgrade(String),
    Uninstall(String),
    Install(String),
    InstallBatch(usize),
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::Upgrade(id) => format!("确定要升级 {} 吗？", id),
            PendingAction::Uninstall(id) => format!("确定要卸载 {} 吗？此操作无法撤销。", id),
            PendingAction::Install(id) => format!("确定要安装 {} 吗？", id),
            PendingAction::InstallBatch(n) => format!("将逐个安装 {} 个软件包，继续吗？", n),
        }
    }
}

// ========== 事件 ==========

#[derive(Debug)]
pub enum AppEvent {
    WingetDetected(Result<String, String>),
    UpdatesLoaded {
        records: Vec<PackageRecord>,
        output: CommandOutput,
    },
    InstalledLoaded {
        records: Vec<PackageRecord>,
        output: CommandOutput,
    },
    SearchLoaded {
        records: Vec<PackageRecord>,
        output: CommandOutput,
    },
    /// 升级 / 卸载 / 安装单个包完成
    ActionFinished {
        mode: AppMode,
        output: CommandOutput,
    },
    ExportCandidatesLoaded(Vec<PackageRecord>),
    ExportFinished(Result<ExportSummary, String>),
    ImportLoaded(Result<Vec<PackageRecord>, String>),
    BatchProgress(BatchEvent),
    BatchComplete(BatchReport),
    Error(String),
}

// ========== 列表 ==========

/// 可选中的包列表，每次加载整体替换
#[derive(Debug, Clone, Default)]
pub struct PackageList {
    pub records: Vec<PackageRecord>,
    pub selected: usize,
    /// 至少加载过一次（用于区分“加载中”和“无结果”）
    pub loaded: bool,
}

impl PackageList {
    pub fn replace(&mut self, records: Vec<PackageRecord>) {
        self.records = records;
        self.selected = 0;
        self.loaded = true;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        let max = self.records.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn current(&self) -> Option<&PackageRecord> {
        self.records.get(self.selected)
    }
}

/// 带勾选框的包列表（导出 / 导入）
#[derive(Debug, Clone, Default)]
pub struct CheckList {
    pub records: Vec<PackageRecord>,
    pub checked: Vec<bool>,
    pub selected: usize,
}

impl CheckList {
    /// 加载后默认全选
    pub fn new(records: Vec<PackageRecord>) -> Self {
        let checked = vec![true; records.len()];
        Self {
            records,
            checked,
            selected: 0,
        }
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        let max = self.records.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn toggle_current(&mut self) {
        if let Some(flag) = self.checked.get_mut(self.selected) {
            *flag = !*flag;
        }
    }

    pub fn all_checked(&self) -> bool {
        self.checked.iter().all(|&c| c)
    }

    /// 全选 / 全不选
    pub fn toggle_all(&mut self) {
        let value = !self.all_checked();
        self.checked.iter_mut().for_each(|c| *c = value);
    }

    pub fn checked_count(&self) -> usize {
        self.checked.iter().filter(|&&c| c).count()
    }

    /// 按原顺序返回勾选的包
    pub fn checked_records(&self) -> Vec<PackageRecord> {
        self.records
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(r, _)| r.clone())
            .collect()
    }
}

// ========== 子状态结构体 ==========

pub struct SearchModeState {
    pub input: InputBox,
    pub focus: SearchFocus,
    pub list: PackageList,
    pub last_query: String,
}

pub struct PathPrompt {
    pub purpose: PathPurpose,
    pub input: InputBox,
}

pub struct BackupModeState {
    pub view: BackupView,
    pub export: CheckList,
    pub import: CheckList,
    pub statuses: Vec<ItemStatus>,
    pub log: Vec<String>,
    pub log_scroll: usize,
    pub prompt: Option<PathPrompt>,
    pub installing: bool,
}

impl SearchModeState {
    pub fn new() -> Self {
        Self {
            input: InputBox::new(),
            focus: SearchFocus::Input,
            list: PackageList::default(),
            last_query: String::new(),
        }
    }
}

impl BackupModeState {
    pub fn new() -> Self {
        Self {
            view: BackupView::Menu,
            export: CheckList::default(),
            import: CheckList::default(),
            statuses: Vec::new(),
            log: Vec::new(),
            log_scroll: 0,
            prompt: None,
            installing: false,
        }
    }

    /// 导入成功后展示待安装列表
    pub fn load_import(&mut self, records: Vec<PackageRecord>) {
        self.statuses = vec![ItemStatus::Pending; records.len()];
        self.import = CheckList::new(records);
        self.log.clear();
        self.log_scroll = 0;
        self.view = BackupView::Import;
    }

    pub fn set_status(&mut self, id: &str, status: ItemStatus) {
        for (record, slot) in self.import.records.iter().zip(self.statuses.iter_mut()) {
            if record.id == id {
                *slot = status;
            }
        }
    }

    /// 追加带时间戳的导入日志
    pub fn log_line(&mut self, message: &str) {
        let time = chrono::Local::now().format("%H:%M:%S");
        self.log.push(format!("[{}] {}", time, message));
        self.log_scroll = self.log.len().saturating_sub(1);
    }

    pub fn apply_batch_event(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Started(record) => {
                self.set_status(&record.id, ItemStatus::Installing);
                self.log_line(&format!("Installing {} ({})...", record.name, record.id));
            }
            BatchEvent::Finished { record, output } => match output.error {
                None => {
                    self.set_status(&record.id, ItemStatus::Installed);
                    self.log_line(&format!("Successfully installed {}", record.name));
                }
                Some(e) => {
                    self.set_status(&record.id, ItemStatus::Failed);
                    self.log_line(&format!("Failed to install {}: {}", record.id, e));
                }
            },
        }
    }
}

// ========== App ==========

pub struct App {
    pub mode: AppMode,
    pub config: Config,
    pub winget: Winget,
    /// winget --version 的结果，None 表示检测中
    pub winget_version: Option<Result<String, String>>,
    /// 正在执行的操作说明；Some 时忽略新的操作
    pub busy: Option<String>,
    /// 弹窗消息（命令输出、错误等），任意键关闭
    pub message: Option<String>,
    pub confirm: Option<PendingAction>,
    pub should_quit: bool,
    // 子状态
    pub updates: PackageList,
    pub installed: PackageList,
    pub search: SearchModeState,
    pub backup: BackupModeState,
}

impl App {
    pub fn new(config: Config) -> Self {
        let winget = Winget::from_config(&config);
        Self {
            mode: AppMode::Dashboard,
            config,
            winget,
            winget_version: None,
            busy: None,
            message: None,
            confirm: None,
            should_quit: false,
            updates: PackageList::default(),
            installed: PackageList::default(),
            search: SearchModeState::new(),
            backup: BackupModeState::new(),
        }
    }

    /// 当前是否在文本输入状态（此时 Shift+字母 作为普通字符）
    pub fn is_typing(&self) -> bool {
        match self.mode {
            AppMode::Search => self.search.focus == SearchFocus::Input,
            AppMode::Backup => self.backup.prompt.is_some(),
            _ => false,
        }
    }

    /// 重置搜索相关状态
    pub fn reset_search_state(&mut self) {
        self.search = SearchModeState::new();
    }

    /// 重置备份相关状态
    pub fn reset_backup_state(&mut self) {
        self.backup = BackupModeState::new();
    }

    /// 命令结果弹窗文本：优先 stdout / stderr，都为空时显示错误
    pub fn show_output(&mut self, output: &CommandOutput) {
        let cleaned = clean_terminal_output(output.message());
        let text = cleaned.trim();
        self.message = Some(if !text.is_empty() {
            text.to_string()
        } else if let Some(e) = &output.error {
            format!("Error: {}", e)
        } else {
            "完成".to_string()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> PackageRecord {
        PackageRecord {
            name: format!("{} app", id),
            id: id.to_string(),
            version: "1.0".to_string(),
            available: String::new(),
            source: "winget".to_string(),
        }
    }

    #[test]
    fn test_package_list_selection_bounds() {
        let mut list = PackageList::default();
        list.select_down();
        assert_eq!(list.selected, 0);
        assert!(list.current().is_none());

        list.replace(vec![record("A.a"), record("B.b")]);
        list.select_down();
        list.select_down();
        assert_eq!(list.current().unwrap().id, "B.b");
        list.select_up();
        list.select_up();
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn test_replace_resets_selection() {
        let mut list = PackageList::default();
        list.replace(vec![record("A.a"), record("B.b")]);
        list.select_down();
        list.replace(vec![record("C.c")]);
        assert_eq!(list.selected, 0);
        assert!(list.loaded);
    }

    #[test]
    fn test_checklist_defaults_to_all_checked() {
        let list = CheckList::new(vec![record("A.a"), record("B.b"), record("C.c")]);
        assert!(list.all_checked());
        assert_eq!(list.checked_count(), 3);
    }

    #[test]
    fn test_checklist_toggle_keeps_order() {
        let mut list = CheckList::new(vec![record("A.a"), record("B.b"), record("C.c")]);
        list.select_down();
        list.toggle_current();
        let ids: Vec<String> = list.checked_records().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["A.a", "C.c"]);

        // 未全选时 toggle_all 变为全选，再次则全不选
        list.toggle_all();
        assert_eq!(list.checked_count(), 3);
        list.toggle_all();
        assert_eq!(list.checked_count(), 0);
    }

    #[test]
    fn test_batch_events_update_statuses_and_log() {
        let mut backup = BackupModeState::new();
        backup.load_import(vec![record("A.a"), record("B.b")]);
        assert_eq!(backup.view, BackupView::Import);
        assert_eq!(backup.statuses, vec![ItemStatus::Pending, ItemStatus::Pending]);

        backup.apply_batch_event(BatchEvent::Started(record("A.a")));
        assert_eq!(backup.statuses[0], ItemStatus::Installing);

        backup.apply_batch_event(BatchEvent::Finished {
            record: record("A.a"),
            output: CommandOutput::default(),
        });
        backup.apply_batch_event(BatchEvent::Finished {
            record: record("B.b"),
            output: CommandOutput {
                error: Some("winget exited with code 1".to_string()),
                ..CommandOutput::default()
            },
        });

        assert_eq!(backup.statuses, vec![ItemStatus::Installed, ItemStatus::Failed]);
        assert_eq!(backup.log.len(), 3);
        assert!(backup.log[0].starts_with('['));
        assert!(backup.log[2].ends_with("Failed to install B.b: winget exited with code 1"));
    }

    #[test]
    fn test_show_output_falls_back_to_error() {
        let mut app = App::new(Config::default());
        app.show_output(&CommandOutput {
            error: Some("failed to run winget: not found".to_string()),
            ..CommandOutput::default()
        });
        assert_eq!(
            app.message.as_deref(),
            Some("Error: failed to run winget: not found")
        );
    }

    #[test]
    fn test_typing_detection() {
        let mut app = App::new(Config::default());
        assert!(!app.is_typing());
        app.mode = AppMode::Search;
        assert!(app.is_typing());
        app.search.focus = SearchFocus::Results;
        assert!(!app.is_typing());
    }
}
