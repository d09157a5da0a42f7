use csv::Reader;
use shots_core::imu::RawMotion;
use std::fs::File;
use std::path::Path;

use crate::errors::{ReplayError, Result};

const COLUMNS: [&str; 9] = [
    "acc_x", "acc_y", "acc_z", "gyr_x", "gyr_y", "gyr_z", "grav_x", "grav_y", "grav_z",
];

/// Parser for raw device-motion recordings
pub struct RawMotionParser;

impl RawMotionParser {
    /// Parse raw readings from a CSV file
    ///
    /// Expected format:
    /// acc_x,acc_y,acc_z,gyr_x,gyr_y,gyr_z,grav_x,grav_y,grav_z
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawMotion>> {
        let file = File::open(path.as_ref()).map_err(|_| {
            ReplayError::RawMotionFileNotFound(path.as_ref().display().to_string())
        })?;

        let readings = Self::parse_reader(file)?;
        if readings.is_empty() {
            return Err(ReplayError::NoSamples(path.as_ref().display().to_string()));
        }

        log::info!("Loaded {} raw motion readings from file", readings.len());
        Ok(readings)
    }

    pub fn parse_reader<R: std::io::Read>(input: R) -> Result<Vec<RawMotion>> {
        let mut reader = Reader::from_reader(input);
        let mut readings = Vec::new();

        for (line_number, result) in reader.records().enumerate() {
            let line = line_number + 2; // +1 for header, +1 for 1-based indexing
            let record = result.map_err(|e| ReplayError::RawMotionFormat {
                line,
                message: format!("CSV error: {}", e),
            })?;

            if record.len() < COLUMNS.len() {
                return Err(ReplayError::RawMotionFormat {
                    line,
                    message: format!(
                        "Expected {} columns, found {}",
                        COLUMNS.len(),
                        record.len()
                    ),
                });
            }

            let mut values = [0.0f64; 9];
            for (index, name) in COLUMNS.iter().enumerate() {
                values[index] = record[index].trim().parse().map_err(|e| {
                    ReplayError::RawMotionFormat {
                        line,
                        message: format!("Invalid {}: {}", name, e),
                    }
                })?;
            }

            readings.push(RawMotion::new(
                [values[0], values[1], values[2]],
                [values[3], values[4], values[5]],
                [values[6], values[7], values[8]],
            ));
        }

        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_valid_motion_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", COLUMNS.join(",")).unwrap();
        writeln!(file, "0.01,-0.02,0.03,0.1,0.2,0.3,0.0,-0.98,-0.1").unwrap();
        writeln!(file, "0.02,-0.01,0.04,0.1,0.2,0.3,0.0,-0.97,-0.1").unwrap();
        file.flush().unwrap();

        let readings = RawMotionParser::parse_file(file.path()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].gravity.y, -0.97);
        assert_eq!(readings[0].rotation_rate.z, 0.3);
    }

    #[test]
    fn reports_line_of_bad_value() {
        let csv = format!("{}\n0,0,0,0,0,0,0,-1,0\n0,0,x,0,0,0,0,-1,0\n", COLUMNS.join(","));
        let err = RawMotionParser::parse_reader(csv.as_bytes()).unwrap_err();
        match err {
            ReplayError::RawMotionFormat { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("acc_z"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", COLUMNS.join(",")).unwrap();
        file.flush().unwrap();

        assert!(matches!(
            RawMotionParser::parse_file(file.path()),
            Err(ReplayError::NoSamples(_))
        ));
    }
}
