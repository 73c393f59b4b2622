//! Reply routing
//!
//! Each reply line from the board is either sensor data or a console
//! message. Sensor data (`T=`/`H=` prefixed readings, or anything carrying a
//! `P=` pressure field) is appended to the sensor log with a timestamp;
//! everything else is printed for the operator.

use crate::error::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp format for sensor log records (local wall-clock time)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Where a reply line was routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Appended to the sensor log file
    SensorLog,
    /// Printed to the operator's console
    Console,
}

/// Returns true if a reply line is sensor data
///
/// The firmware emits temperature as `T=...`, humidity as `H=...`, and
/// pressure as a `P=` field that may be preceded by a label.
pub fn is_sensor_line(line: &str) -> bool {
    line.starts_with("T=") || line.starts_with("H=") || line.contains("P=")
}

/// Routes reply lines to the sensor log or the console
pub struct Router {
    sensor_file: PathBuf,
}

impl Router {
    /// Create a router appending sensor data to `sensor_file`
    pub fn new<P: AsRef<Path>>(sensor_file: P) -> Self {
        Self {
            sensor_file: sensor_file.as_ref().to_path_buf(),
        }
    }

    /// Classify and deliver one non-empty reply line
    ///
    /// Sensor lines gain exactly one log record and produce no console
    /// output; other lines are printed verbatim and leave the log untouched.
    pub fn route(&self, line: &str) -> Result<Route> {
        if is_sensor_line(line) {
            self.append_record(line)?;
            Ok(Route::SensorLog)
        } else {
            println!("{}", line);
            Ok(Route::Console)
        }
    }

    /// Append one timestamped record to the sensor log
    ///
    /// The file is opened, written, and closed per record. Cheap at human
    /// command rates, and the record is durable the moment route() returns.
    fn append_record(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.sensor_file)?;
        writeln!(file, "{} {}", Local::now().format(TIMESTAMP_FORMAT), line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sensor_classification() {
        assert!(is_sensor_line("T=23.5"));
        assert!(is_sensor_line("H=45"));
        assert!(is_sensor_line("P=1013"));
        // Substring match: pressure may carry a label
        assert!(is_sensor_line("Pressure P=1013"));

        assert!(!is_sensor_line("OK"));
        assert!(!is_sensor_line("ERROR: unknown command"));
        // Prefix match only for T= and H=
        assert!(!is_sensor_line("TEMP T: 23.5"));
        assert!(!is_sensor_line("x T=23.5"));
    }

    #[test]
    fn test_sensor_line_appends_one_record() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("sensors.txt");
        let router = Router::new(&log_path);

        assert_eq!(router.route("T=23.5").unwrap(), Route::SensorLog);

        let contents = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" T=23.5"));
        // Record is "<timestamp> <line>"; timestamp starts with the year
        assert!(lines[0].starts_with("20"));
    }

    #[test]
    fn test_console_line_leaves_log_untouched() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("sensors.txt");
        let router = Router::new(&log_path);

        assert_eq!(router.route("OK").unwrap(), Route::Console);
        assert!(!log_path.exists());
    }

    #[test]
    fn test_records_accumulate_in_order() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("sensors.txt");
        let router = Router::new(&log_path);

        router.route("T=23.5").unwrap();
        router.route("H=45").unwrap();
        router.route("Pressure P=1013").unwrap();

        let contents = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("T=23.5"));
        assert!(lines[1].ends_with("H=45"));
        assert!(lines[2].ends_with("Pressure P=1013"));

        // Timestamps are fixed-width (26 chars) and non-decreasing
        let stamps: Vec<&str> = lines.iter().map(|l| &l[..26]).collect();
        for pair in stamps.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }
}
