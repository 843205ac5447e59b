//! 批量安装（导入备份后逐个安装）

use super::types::{CommandOutput, PackageRecord};

/// 批量安装过程中的进度事件
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started(PackageRecord),
    Finished {
        record: PackageRecord,
        output: CommandOutput,
    },
}

/// 批量安装结果汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    /// (包 ID, 失败原因)
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} succeeded, {} failed",
            self.succeeded.len(),
            self.failed.len()
        );
        if !self.failed.is_empty() {
            let ids: Vec<&str> = self.failed.iter().map(|(id, _)| id.as_str()).collect();
            text.push_str(&format!(" ({})", ids.join(", ")));
        }
        text
    }
}

/// 严格串行地安装每个包：上一个结束（成功或失败）后才开始下一个，
/// 单个失败只记录，不中断后续安装。
pub fn install_all<I, E>(records: &[PackageRecord], mut install: I, mut on_event: E) -> BatchReport
where
    I: FnMut(&PackageRecord) -> CommandOutput,
    E: FnMut(BatchEvent),
{
    let mut report = BatchReport::default();

    for record in records {
        on_event(BatchEvent::Started(record.clone()));
        let output = install(record);

        match &output.error {
            None => {
                log::info!("installed {}", record.id);
                report.succeeded.push(record.id.clone());
            }
            Some(reason) => {
                log::info!("failed to install {}: {}", record.id, reason);
                report.failed.push((record.id.clone(), reason.clone()));
            }
        }

        on_event(BatchEvent::Finished {
            record: record.clone(),
            output,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> PackageRecord {
        PackageRecord {
            name: id.to_string(),
            id: id.to_string(),
            version: "1.0".to_string(),
            available: String::new(),
            source: "winget".to_string(),
        }
    }

    #[test]
    fn test_failure_does_not_abort_remaining_items() {
        let records = vec![record("Pub.One"), record("Pub.Two"), record("Pub.Three")];
        let mut attempted = Vec::new();

        let report = install_all(
            &records,
            |rec| {
                attempted.push(rec.id.clone());
                if rec.id == "Pub.Two" {
                    CommandOutput {
                        stdout: String::new(),
                        stderr: "installer failed".to_string(),
                        error: Some("winget exited with code 1".to_string()),
                    }
                } else {
                    CommandOutput::default()
                }
            },
            |_| {},
        );

        assert_eq!(attempted, vec!["Pub.One", "Pub.Two", "Pub.Three"]);
        assert_eq!(report.succeeded, vec!["Pub.One", "Pub.Three"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "Pub.Two");
        assert_eq!(report.summary(), "2 succeeded, 1 failed (Pub.Two)");
    }

    #[test]
    fn test_events_are_sequential() {
        let records = vec![record("Pub.A"), record("Pub.B")];
        let mut events = Vec::new();

        install_all(
            &records,
            |_| CommandOutput::default(),
            |event| match event {
                BatchEvent::Started(rec) => events.push(format!("start {}", rec.id)),
                BatchEvent::Finished { record, output } => {
                    events.push(format!("done {} {}", record.id, output.success()))
                }
            },
        );

        assert_eq!(
            events,
            vec!["start Pub.A", "done Pub.A true", "start Pub.B", "done Pub.B true"]
        );
    }

    #[test]
    fn test_empty_batch() {
        let report = install_all(&[], |_| CommandOutput::default(), |_| {});
        assert_eq!(report, BatchReport::default());
        assert_eq!(report.summary(), "0 succeeded, 0 failed");
    }
}
