pub mod delimited;
pub mod json;
pub mod vtk;

pub use delimited::CsvWriter;
pub use json::JsonWriter;
pub use vtk::VtkWriter;

use crate::domain::model::MeshKind;
use crate::domain::ports::{DataWriter, OutputFormat};

/// Time stamp settings shared by all writers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStamp {
    pub time_constant: f64,
    pub precision: usize,
}

impl Default for TimeStamp {
    fn default() -> Self {
        Self {
            time_constant: 1.0,
            precision: 0,
        }
    }
}

impl TimeStamp {
    pub fn new(time_constant: f64, precision: usize) -> Self {
        Self {
            time_constant,
            precision,
        }
    }

    /// `t / time_constant` with `precision` decimals, the decimal point
    /// removed, zero-padded to four digits.
    pub fn stamp(&self, time: f64) -> String {
        let scaled = time / self.time_constant;
        let formatted = format!("{:.*}", self.precision, scaled.abs()).replace('.', "");
        let sign = if scaled < 0.0 && formatted.chars().any(|c| c != '0') {
            "-"
        } else {
            ""
        };
        format!("{}{:0>4}", sign, formatted)
    }

    pub fn filename(&self, basename: &str, time: Option<f64>, extension: &str) -> String {
        match time {
            Some(t) => format!("{}_t{}.{}", basename, self.stamp(t), extension),
            None => format!("{}.{}", basename, extension),
        }
    }
}

/// Plain decimal for ordinary magnitudes, exponent notation for very large or
/// very small ones.
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || !value.is_finite() || (1.0e-5..1.0e16).contains(&magnitude) {
        value.to_string()
    } else {
        format!("{:e}", value)
    }
}

pub fn data_writer<M: MeshKind>(format: OutputFormat, time_stamp: TimeStamp) -> Box<dyn DataWriter<M>> {
    match format {
        OutputFormat::Vtk => Box::new(VtkWriter::new(time_stamp)),
        OutputFormat::Csv => Box::new(CsvWriter::new(time_stamp)),
        OutputFormat::Json => Box::new(JsonWriter::new(time_stamp)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(-1250.0), "-1250");
        assert_eq!(format_value(1.0e-300), "1e-300");
        assert_eq!(format_value(-3.5e20), "-3.5e20");
        assert_eq!(format_value(1.0e-5), "0.00001");
    }

    #[test]
    fn test_time_stamp() {
        let stamp = TimeStamp::default();
        assert_eq!(stamp.stamp(2.0), "0002");
        assert_eq!(stamp.stamp(12345.0), "12345");

        let stamp = TimeStamp::new(0.5, 1);
        assert_eq!(stamp.stamp(1.25), "0025");

        let stamp = TimeStamp::new(1.0, 0);
        assert_eq!(stamp.stamp(-3.0), "-0003");
    }

    #[test]
    fn test_filename() {
        let stamp = TimeStamp::default();
        assert_eq!(stamp.filename("fault", Some(10.0), "vtk"), "fault_t0010.vtk");
        assert_eq!(stamp.filename("fault", None, "vtk"), "fault.vtk");
    }
}
