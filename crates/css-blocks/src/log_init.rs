use log::{Level, Metadata, Record, SetLoggerError};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Appends log records to a file, reopening it per record so the file can
/// be truncated or removed while the process runs.
struct FileLogger {
    file_path: PathBuf,
    level: Level,
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)
            {
                let _ = writeln!(
                    file,
                    "[{}] {}: {}",
                    record.level(),
                    record.target(),
                    record.args()
                );
            }
        }
    }

    fn flush(&self) {}
}

/// Sends `debug` and more severe records from the parser and analyzer to
/// `path`. Fails if a logger is already installed.
pub fn init_logger(path: impl Into<PathBuf>) -> Result<(), SetLoggerError> {
    init_logger_with_level(path, Level::Debug)
}

pub fn init_logger_with_level(path: impl Into<PathBuf>, level: Level) -> Result<(), SetLoggerError> {
    let logger = FileLogger {
        file_path: path.into(),
        level,
    };
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_writes_records() {
        let path = std::env::temp_dir().join(format!("css-blocks-log-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        init_logger(&path).unwrap();
        log::debug!(target: "css_blocks::test", "hello from the analyzer");
        log::trace!(target: "css_blocks::test", "too verbose");
        assert!(init_logger(&path).is_err());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[DEBUG] css_blocks::test: hello from the analyzer"));
        assert!(!contents.contains("too verbose"));
        let _ = std::fs::remove_file(&path);
    }
}
