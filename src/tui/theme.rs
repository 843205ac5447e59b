//! 界面配色，全局统一使用

use ratatui::style::Color;

/// 粉色：勾选行
pub const PINK: Color = Color::Rgb(245, 169, 184);
/// 蓝色：包名、消息弹窗
pub const BLUE: Color = Color::Rgb(91, 206, 250);
/// 选中行背景色
pub const SEL_BG: Color = Color::Rgb(45, 35, 55);
pub const BRIGHT_WHITE: Color = Color::Rgb(255, 255, 255);
/// 暗灰色（ID、来源等次要信息）
pub const DIM: Color = Color::Rgb(130, 130, 140);
/// 选中行内的次要信息
pub const DESC_DIM: Color = Color::Rgb(180, 180, 190);

// 安装状态
pub const STATUS_RUNNING: Color = Color::Rgb(250, 214, 110);
pub const STATUS_OK: Color = Color::Rgb(120, 220, 140);
pub const STATUS_FAILED: Color = Color::Rgb(240, 100, 100);
