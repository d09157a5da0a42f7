use std::fmt::Write;

use super::sample::MotionSample;

/// Column header of the motion export; downstream analysis tooling relies on
/// this exact order.
pub const EXPORT_HEADER: &str = "Time Stamp,Accelerometer X,Accelerometer Y,Accelerometer Z,Gyroscope X,Gyroscope Y,Gyroscope Z,Transformed accelerometer X,Transformed accelerometer Y,Transformed accelerometer Z,Gravity X,Gravity Y,Gravity Z\n";

pub const SEPARATOR: char = ',';

/// Renders samples as the comma-separated motion export.
///
/// Time stamps carry 2 decimals, every sensor field 8.
pub fn render_samples<'a, I>(samples: I) -> String
where
    I: IntoIterator<Item = &'a MotionSample>,
{
    let mut out = String::from(EXPORT_HEADER);
    for sample in samples {
        write_line(&mut out, sample);
    }
    out
}

fn write_line(out: &mut String, sample: &MotionSample) {
    // Writing into a String cannot fail.
    let _ = write!(out, "{:.2}", sample.timestamp);
    let fields = sample
        .acceleration
        .iter()
        .chain(sample.rotation_rate.iter())
        .chain(sample.transformed_acceleration.iter())
        .chain(sample.gravity.iter());
    for value in fields {
        let _ = write!(out, "{SEPARATOR}{value:.8}");
    }
    out.push('\n');
}
