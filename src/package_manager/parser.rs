//! 输出解析函数

use super::types::{PackageRecord, UNKNOWN_VERSION};

/// 清理终端输出中的 ANSI 转义序列和特殊字符
///
/// winget 在表格前用 `\r` 原地刷新进度旋转符，这里把孤立的 `\r` 视为换行，
/// 其余字符（包括非 ASCII 包名）原样保留。
pub fn clean_terminal_output(input: &str) -> String {
    let mut result = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    while let Some(&next) = chars.peek() {
                        chars.next();
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            '\r' => {
                if chars.peek() != Some(&'\n') && !result.ends_with('\n') {
                    result.push('\n');
                }
            }
            c if c.is_control() && c != '\n' && c != '\t' => {}
            _ => result.push(c),
        }
    }

    result
}

/// 按两个及以上连续空白切分列，单个空格视为列内内容（如包名 "Visual Studio Code"）
pub fn split_columns(line: &str) -> Vec<&str> {
    let line = line.trim();
    let mut columns = Vec::new();
    if line.is_empty() {
        return columns;
    }

    let mut field_start = 0;
    let mut gap_start: Option<usize> = None;
    let mut gap_len = 0;

    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if gap_start.is_none() {
                gap_start = Some(i);
                gap_len = 0;
            }
            gap_len += 1;
        } else if let Some(start) = gap_start.take() {
            if gap_len >= 2 {
                columns.push(&line[field_start..start]);
                field_start = i;
            }
        }
    }
    columns.push(&line[field_start..]);

    columns
}

/// 按列位置映射为 PackageRecord，少于两列返回 None。
///
/// 四列时第 4 列是 Source（list/search 无 Available 列），五列及以上时依次为 Available、Source。
/// winget 的列布局随语言和版本变化，这里只按位置判断。
fn record_from_columns(columns: &[&str]) -> Option<PackageRecord> {
    if columns.len() < 2 {
        return None;
    }

    let version = columns.get(2).copied().unwrap_or(UNKNOWN_VERSION);
    let (available, source) = match columns.len() {
        4 => ("", columns[3]),
        n if n >= 5 => (columns[3], columns[4]),
        _ => ("", ""),
    };

    Some(PackageRecord {
        name: columns[0].to_string(),
        id: columns[1].to_string(),
        version: version.to_string(),
        available: available.to_string(),
        source: source.to_string(),
    })
}

/// 解析 winget upgrade / list / search 的表格输出
///
/// 在出现以 `---` 开头的分隔行之前的内容全部忽略；没有分隔行时返回空列表。
/// 不可信或格式不符的行直接丢弃，不报告错误。
pub fn parse_packages(output: &str) -> Vec<PackageRecord> {
    let mut packages = Vec::new();
    let mut in_table = false;

    for line in output.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("---") {
            in_table = true;
            continue;
        }

        if !in_table {
            continue;
        }

        if let Some(record) = record_from_columns(&split_columns(trimmed)) {
            if record.is_trusted() {
                packages.push(record);
            }
        }
    }

    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_columns_keeps_single_spaces() {
        assert_eq!(
            split_columns("Visual Studio Code  Microsoft.VisualStudioCode   1.2.3"),
            vec!["Visual Studio Code", "Microsoft.VisualStudioCode", "1.2.3"]
        );
    }

    #[test]
    fn test_split_columns_mixed_whitespace() {
        assert_eq!(split_columns("  a \tb  c  "), vec!["a", "b", "c"]);
        assert_eq!(split_columns("a b\tc"), vec!["a b\tc"]);
        assert!(split_columns("   ").is_empty());
    }

    #[test]
    fn test_parse_documented_scenario() {
        let raw = "Name  Id  Version\n---\nVisual Studio Code  Microsoft.VisualStudioCode  1.2.3  1.2.4  winget\n7-Zip  7zip  Unknown  \n";
        let packages = parse_packages(raw);
        assert_eq!(
            packages,
            vec![PackageRecord {
                name: "Visual Studio Code".to_string(),
                id: "Microsoft.VisualStudioCode".to_string(),
                version: "1.2.3".to_string(),
                available: "1.2.4".to_string(),
                source: "winget".to_string(),
            }]
        );
    }

    #[test]
    fn test_no_separator_yields_nothing() {
        let raw = "Name  Id  Version\nGit  Git.Git  2.44.0\nNode.js  OpenJS.NodeJS  20.1.0\n";
        assert!(parse_packages(raw).is_empty());
        assert!(parse_packages("").is_empty());
    }

    #[test]
    fn test_rows_before_separator_are_ignored() {
        let raw = "Git  Git.Git  2.44.0\n----------\nNode.js  OpenJS.NodeJS  20.1.0\n";
        let packages = parse_packages(raw);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].id, "OpenJS.NodeJS");
    }

    #[test]
    fn test_id_without_dot_is_dropped() {
        let raw = "---\nSpotify  9NCBCSZSJRSB  1.2.3  winget\nSpotify Music  Spotify.Spotify  1.2.3  winget\n";
        let packages = parse_packages(raw);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].id, "Spotify.Spotify");
    }

    #[test]
    fn test_unknown_version_any_case_is_dropped() {
        let raw = "---\nA  Pub.A  Unknown\nB  Pub.B  UNKNOWN  winget\nC  Pub.C  unknown  2.0  winget\nD  Pub.D  < 1.0\n";
        let packages = parse_packages(raw);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].id, "Pub.D");
        assert_eq!(packages[0].version, "< 1.0");
    }

    #[test]
    fn test_missing_version_defaults_to_unknown_and_is_dropped() {
        assert!(parse_packages("---\nGit  Git.Git\n").is_empty());
    }

    #[test]
    fn test_single_column_rows_are_skipped() {
        let raw = "---\n3 upgrades available.\nGit  Git.Git  2.44.0  2.45.0  winget\n";
        let packages = parse_packages(raw);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].available, "2.45.0");
    }

    #[test]
    fn test_four_columns_fourth_is_source() {
        let packages = parse_packages("---\nGit  Git.Git  2.44.0  winget\n");
        assert_eq!(packages[0].available, "");
        assert_eq!(packages[0].source, "winget");
    }

    #[test]
    fn test_three_columns_have_no_source() {
        let packages = parse_packages("---\nGit  Git.Git  2.44.0\n");
        assert_eq!(packages[0].available, "");
        assert_eq!(packages[0].source, "");
    }

    #[test]
    fn test_unicode_preserved() {
        let raw = "---\n微信 WeChat ünïcødé  Tencent.WeChat  3.9.8  winget\n";
        let packages = parse_packages(raw);
        assert_eq!(packages[0].name, "微信 WeChat ünïcødé");
        assert_eq!(packages[0].id, "Tencent.WeChat");
    }

    #[test]
    fn test_long_line_preserved() {
        let name = "x".repeat(5000);
        let raw = format!("---\n{name}  Pub.Long  1.0\n");
        let packages = parse_packages(&raw);
        assert_eq!(packages[0].name, name);
    }

    #[test]
    fn test_crlf_output() {
        let raw = "Name  Id  Version  Source\r\n-----------------\r\nGit  Git.Git  2.44.0  winget\r\n";
        let packages = parse_packages(raw);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].source, "winget");
    }

    #[test]
    fn test_second_table_header_is_dropped() {
        let raw = "\
Name     Id        Version  Available  Source
-----------------------------------------------
Git      Git.Git   2.44.0   2.45.0     winget
1 upgrades available.

The following packages have an upgrade available, but require explicit targeting for upgrade:
Name     Id              Version  Available  Source
-----------------------------------------------------
Zoom     Zoom.Zoom       5.0      6.0        winget
";
        let ids: Vec<String> = parse_packages(raw).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["Git.Git", "Zoom.Zoom"]);
    }

    #[test]
    fn test_clean_spinner_and_ansi() {
        let raw = "   - \r   \\ \r\x1b[32mName  Id  Version\x1b[0m\n---\nGit  Git.Git  2.44.0\n";
        let cleaned = clean_terminal_output(raw);
        assert!(!cleaned.contains('\x1b'));
        assert!(!cleaned.contains('\r'));
        let packages = parse_packages(&cleaned);
        assert_eq!(packages.len(), 1);
    }

    #[test]
    fn test_clean_keeps_crlf_and_unicode() {
        let cleaned = clean_terminal_output("Ünïcødé 名\r\nnext\r\n");
        assert_eq!(cleaned, "Ünïcødé 名\r\nnext\r\n".replace('\r', ""));
    }
}
