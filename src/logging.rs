//! Logger setup: `env_logger` to stderr, mirrored into a per-day log file
//!
//! Lines look like `[2025-05-14 08:00:03 UTC] INFO  message`. The file is
//! `<logs_dir>/metrics_log_<YYYY-MM-DD>.txt`, opened in append mode.

use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes every log line to stderr and to the day's log file
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Log file for the UTC day of `now`
pub fn log_file_path(logs_dir: &Path, now: DateTime<Utc>) -> PathBuf {
    logs_dir.join(format!("metrics_log_{}.txt", now.format("%Y-%m-%d")))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialise logging (default level `info`, `RUST_LOG` overrides)
///
/// If the log file cannot be opened, logs go to stderr only.
pub fn init(logs_dir: &Path) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {:<5} {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            record.level(),
            record.args()
        )
    });

    let path = log_file_path(logs_dir, Utc::now());
    let file_error = match open_log_file(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
            None
        }
        Err(e) => {
            builder.target(env_logger::Target::Stderr);
            Some(e)
        }
    };

    // A second init (tests, embedding) keeps the first logger
    if builder.try_init().is_err() {
        return;
    }

    match file_error {
        Some(e) => log::warn!("⚠️  Logging to stderr only, cannot open {}: {}", path.display(), e),
        None => log::debug!("Mirroring logs to {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_log_file_name_uses_utc_day() {
        let now = Utc.with_ymd_and_hms(2025, 5, 14, 23, 59, 59).unwrap();
        assert_eq!(
            log_file_path(Path::new("logs"), now),
            PathBuf::from("logs/metrics_log_2025-05-14.txt")
        );
    }

    #[test]
    fn test_tee_appends_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("metrics_log_test.txt");

        let mut tee = TeeWriter {
            file: open_log_file(&path).unwrap(),
        };
        tee.write_all(b"first\n").unwrap();
        tee.flush().unwrap();

        let mut tee = TeeWriter {
            file: open_log_file(&path).unwrap(),
        };
        tee.write_all(b"second\n").unwrap();
        tee.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
