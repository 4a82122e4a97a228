//! 导出到文件
//!
//! 读取录制文件、执行展平、把五张表写入输出目录。
//!
//! 所有表都在内存中序列化完成后才开始写文件，因此展平失败时不会写出任何文件。
//! 写文件过程中发生IO错误时，已经写出的表会保留在输出目录中。

use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use profile_export_core::{
    list_statistics, run, ExportOptions, ExportTables, FlattenError, FrameRange,
    ProfilingDataSource, RecordedCapture,
};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 一次导出的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub range: FrameRange,
    pub files: Vec<PathBuf>,
}

/// 读取录制文件
///
/// 文件不存在时返回 `SourceUnavailable`。
pub fn load_capture(path: &Path) -> ExportResult<RecordedCapture> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(FlattenError::SourceUnavailable(format!(
                "capture file {} not found",
                path.display()
            ))
            .into());
        }
        Err(e) => return Err(ExportError::io(path, e)),
    };
    let capture = RecordedCapture::from_json_str(&content)?;
    tracing::info!(target: "profile_export", "Loaded {} frames from {}", capture.frames().len(), path.display());
    Ok(capture)
}

/// 把五张表写入目录，返回写出的文件路径
pub fn write_tables(tables: &ExportTables, dir: &Path) -> ExportResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;

    let mut files = Vec::with_capacity(5);
    for table in tables.tables() {
        let path = dir.join(table.file_name());
        fs::write(&path, &table.contents).map_err(|e| ExportError::io(&path, e))?;
        tracing::debug!(target: "profile_export", "Wrote {}", path.display());
        files.push(path);
    }
    Ok(files)
}

/// 从任意数据源导出到目录
pub fn export_source<S>(source: &S, config: &ExportConfig) -> ExportResult<ExportSummary>
where
    S: ProfilingDataSource + ?Sized,
{
    let range = config.frames.resolve(source.frame_range()?);
    if tracing::enabled!(target: "profile_export", tracing::Level::DEBUG) {
        let unmapped = list_statistics(source)?
            .into_iter()
            .filter(|listing| !listing.mapped)
            .count();
        tracing::debug!(target: "profile_export", unmapped, "Unmapped statistics are skipped");
    }
    let options = ExportOptions {
        range: Some(range),
        hierarchy: config.hierarchy,
    };

    let tables = run(source, &options)?;
    let files = write_tables(&tables, &config.output_dir)?;
    Ok(ExportSummary {
        range: tables.range,
        files,
    })
}

/// 按配置读取录制文件并导出
pub fn export_capture(config: &ExportConfig) -> ExportResult<ExportSummary> {
    let capture = load_capture(&config.capture_path)?;
    export_source(&capture, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_export_core::{Category, RecordedFrame, RecordedHierarchy};

    fn capture() -> RecordedCapture {
        let mut capture = RecordedCapture::new(0);
        for _ in 0..2 {
            capture.push_frame(
                RecordedFrame::new()
                    .with_statistic(Category::Rendering, "Batches", 4.0)
                    .with_hierarchy(RecordedHierarchy::default()),
            );
        }
        capture
    }

    #[test]
    fn test_load_missing_capture() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_capture(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Flatten(FlattenError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_export_source_writes_five_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            output_dir: dir.path().join("out"),
            ..ExportConfig::default()
        };
        let summary = export_source(&capture(), &config).unwrap();
        assert_eq!(summary.range, FrameRange::new(0, 2));
        assert_eq!(summary.files.len(), 5);

        let rendering = fs::read_to_string(dir.path().join("out").join("rendering.csv")).unwrap();
        assert_eq!(
            rendering,
            "frame,batches,setPassCall,triangles,vertices\n0,4,0,0,0\n1,4,0,0,0\n"
        );
    }

    #[test]
    fn test_failed_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ExportConfig {
            output_dir: dir.path().join("out"),
            ..ExportConfig::default()
        };
        config.frames.last_frame = Some(5);

        let err = export_source(&capture(), &config).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Flatten(FlattenError::RangeOutOfBounds { .. })
        ));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_write_tables_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("csv");
        let tables = run(&capture(), &ExportOptions::default()).unwrap();

        let files = write_tables(&tables, &out).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["cpu.csv", "memory.csv", "rendering.csv", "hierarchy.csv", "hierarchy_item.csv"]
        );
        assert_eq!(
            fs::read_to_string(out.join("hierarchy_item.csv")).unwrap().lines().count(),
            1
        );
    }
}
