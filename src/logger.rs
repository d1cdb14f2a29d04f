//! Per-run log file for RasterPad.
//!
//! Each run starts the file over, so it only holds the latest session.
//! By default it sits next to `settings.cfg` in the app data directory
//! (`%APPDATA%\RasterPad`, `~/Library/Application Support/RasterPad` or
//! `$XDG_DATA_HOME/RasterPad`); the CLI can point it elsewhere with `--log`.
//!
//! The `log_info!`, `log_warn!` and `log_err!` macros are usable from any
//! module. Before a session is opened they do nothing, which keeps the
//! library quiet when embedded and in tests.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

struct Session {
    path: PathBuf,
    file: Mutex<File>,
}

static SESSION: OnceLock<Session> = OnceLock::new();

/// Location of the open session log, if one was opened.
pub fn log_path() -> Option<&'static Path> {
    SESSION.get().map(|s| s.path.as_path())
}

/// Append `line` verbatim. I/O failures are swallowed.
pub fn write_line(line: &str) {
    if let Some(session) = SESSION.get()
        && let Ok(mut file) = session.file.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

/// Append `msg` tagged with the clock time and `level`.
pub fn write(level: &str, msg: &str) {
    if SESSION.get().is_some() {
        write_line(&format!("[{}] [{}] {}", clock(), level, msg));
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write("INFO", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write("WARN", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write("ERROR", &format!($($arg)*));
    };
}

/// Open the session log at [`default_log_path`].
pub fn init() {
    init_at(&default_log_path());
}

/// Open the session log at `path`, emptying any earlier contents, and hook
/// panics so their message lands in the file before the default report.
///
/// Later calls are ignored once a session is open. If the file cannot be
/// opened the run continues unlogged.
pub fn init_at(path: &Path) {
    if SESSION.get().is_some() {
        return;
    }

    let file = match open_truncated(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[logger] cannot open {}: {}", path.display(), e);
            return;
        }
    };
    let _ = SESSION.set(Session {
        path: path.to_path_buf(),
        file: Mutex::new(file),
    });

    write_line(&format!("=== RasterPad run {} ===", epoch_seconds()));
    write_line(&format!("log: {}", path.display()));
    write_line("");

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write("PANIC", &info.to_string());
        previous(info);
    }));
}

fn open_truncated(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

pub fn default_log_path() -> PathBuf {
    app_data_dir().join("rasterpad.log")
}

/// `RasterPad` folder under the platform data directory; also holds settings.
pub fn app_data_dir() -> PathBuf {
    platform_data_root().join("RasterPad")
}

fn platform_data_root() -> PathBuf {
    let var = |name: &str| std::env::var_os(name).map(PathBuf::from);

    #[cfg(target_os = "windows")]
    {
        if let Some(dir) = var("APPDATA") {
            return dir;
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = var("HOME") {
            return home.join("Library/Application Support");
        }
    }

    var("XDG_DATA_HOME")
        .or_else(|| var("HOME").map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn epoch_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| format!("(unix {})", d.as_secs()))
        .unwrap_or_else(|_| "(unknown time)".to_string())
}

/// UTC wall clock as HH:MM:SS.
fn clock() -> String {
    let Ok(since) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return "??:??:??".to_string();
    };
    let day = since.as_secs() % 86_400;
    format!("{:02}:{:02}:{:02}", day / 3600, (day % 3600) / 60, day % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_hh_mm_ss() {
        let ts = clock();
        assert_eq!(ts.len(), 8);
        assert_eq!(ts.as_bytes()[2], b':');
        assert_eq!(ts.as_bytes()[5], b':');
    }

    #[test]
    fn default_log_path_lives_in_app_dir() {
        let path = default_log_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("rasterpad.log"));
        assert!(path.starts_with(app_data_dir()));
    }

    #[test]
    fn writes_before_init_are_dropped() {
        // No test opens a session, so this must be a silent no-op.
        crate::log_info!("nothing listens yet");
        assert!(log_path().is_none());
    }
}
