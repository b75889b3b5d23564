use std::{fs::File, path::PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use pcd_core::pointcloud::point::{Label, Point, PointCloud};

use super::{Parser, ParserProvider};
use crate::error::ParseError;

pub struct TxtParserProvider {
    pub filename: PathBuf,
}

impl ParserProvider for TxtParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(TxtParser {
            filename: self.filename.clone(),
        })
    }
}

/// Reads whitespace separated `x y z intensity range label [sequence_index]`
/// rows, one point per line.
pub struct TxtParser {
    pub filename: PathBuf,
}

impl Parser for TxtParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let file = File::open(&self.filename).map_err(|source| ParseError::Io {
            path: self.filename.clone(),
            source,
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let mut points = Vec::new();
        let mut record = StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(source) => {
                    return Err(ParseError::Csv {
                        path: self.filename.clone(),
                        source,
                    })
                }
            }

            let fields = split_fields(&record);
            if fields.is_empty() {
                continue;
            }

            let ordinal = points.len() as u64;
            let point = parse_fields(&fields, ordinal).map_err(|reason| {
                ParseError::MalformedRecord {
                    path: self.filename.clone(),
                    line: record.position().map_or(0, |p| p.line()),
                    reason,
                }
            })?;
            points.push(point);
        }

        log::debug!("read {} points from {:?}", points.len(), self.filename);

        let mut point_cloud = PointCloud::new(points);
        point_cloud.metadata.other.insert(
            "source".to_string(),
            self.filename.to_string_lossy().into_owned(),
        );
        Ok(point_cloud)
    }
}

// Repeated spaces show up as empty fields and tabs stay inside a field.
fn split_fields(record: &StringRecord) -> Vec<&str> {
    record
        .iter()
        .flat_map(|field| field.split_whitespace())
        .collect()
}

/// Builds a point from the fields of one row.
///
/// Without a seventh field the sequence index falls back to `ordinal`.
pub fn parse_fields(fields: &[&str], ordinal: u64) -> Result<Point, String> {
    if fields.len() != 6 && fields.len() != 7 {
        return Err(format!("expected 6 or 7 fields, found {}", fields.len()));
    }

    let mut values = [0.0f64; 7];
    for (i, (value, name)) in fields.iter().zip(FIELD_NAMES).enumerate() {
        values[i] = value
            .parse()
            .map_err(|e| format!("failed to parse '{}' ({:?}): {}", name, value, e))?;
    }

    let label = parse_integral(values[5], "label")?;
    let label = u32::try_from(label).map_err(|_| format!("label {} is out of range", label))?;
    let sequence_index = if fields.len() == 7 {
        parse_integral(values[6], "sequence_index")?
    } else {
        ordinal
    };

    Ok(Point {
        x: values[0],
        y: values[1],
        z: values[2],
        intensity: values[3],
        range: values[4],
        label: Label(label),
        sequence_index,
    })
}

const FIELD_NAMES: [&str; 7] = ["x", "y", "z", "intensity", "range", "label", "sequence_index"];

fn parse_integral(value: f64, name: &str) -> Result<u64, String> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(format!("'{}' must be a non-negative integer, got {}", name, value));
    }
    Ok(value as u64)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::Builder;

    use super::*;

    fn parse_str(content: &str) -> Result<PointCloud, ParseError> {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        TxtParser {
            filename: file.path().to_path_buf(),
        }
        .parse()
    }

    #[test]
    fn parses_six_and_seven_field_rows() {
        let pc = parse_str("1.5 -2 0.25 0.3 12.5 0\n0 0 -1 0.1 3 4 17\n").unwrap();
        assert_eq!(pc.len(), 2);

        let p = &pc.points[0];
        assert_eq!((p.x, p.y, p.z), (1.5, -2.0, 0.25));
        assert_eq!((p.intensity, p.range), (0.3, 12.5));
        assert_eq!(p.label, Label::UNLABELED);
        assert_eq!(p.sequence_index, 0);

        let p = &pc.points[1];
        assert_eq!(p.label, Label::GROUND);
        assert_eq!(p.sequence_index, 17);
    }

    #[test]
    fn missing_sequence_index_uses_record_ordinal() {
        let pc = parse_str("0 0 0 0 0 0\n\n1 1 1 0 0 0\n2 2 2 0 0 0\n").unwrap();
        let indices: Vec<u64> = pc.points.iter().map(|p| p.sequence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn tolerates_repeated_spaces_and_tabs() {
        let pc = parse_str("  1  2\t3   0 0 0.0  \n").unwrap();
        assert_eq!(pc.len(), 1);
        assert_eq!(pc.points[0].z, 3.0);
    }

    #[test]
    fn float_formatted_labels_are_accepted() {
        let pc = parse_str("0 0 0 0 0 4.0 3.0\n").unwrap();
        assert_eq!(pc.points[0].label, Label::GROUND);
        assert_eq!(pc.points[0].sequence_index, 3);
    }

    #[test]
    fn malformed_record_reports_line() {
        let err = parse_str("0 0 0 0 0 0\n0 0 zero 0 0 0\n").unwrap_err();
        match err {
            ParseError::MalformedRecord { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("'z'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        assert!(matches!(
            parse_str("0 0 0 0\n"),
            Err(ParseError::MalformedRecord { .. })
        ));
        assert!(parse_fields(&["0"; 8], 0).is_err());
    }

    #[test]
    fn fractional_or_negative_labels_are_rejected() {
        assert!(parse_fields(&["0", "0", "0", "0", "0", "1.5"], 0).is_err());
        assert!(parse_fields(&["0", "0", "0", "0", "0", "-4"], 0).is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let parser = TxtParser {
            filename: PathBuf::from("/nonexistent/scan.txt"),
        };
        match parser.parse() {
            Err(ParseError::Io { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn records_source_in_metadata() {
        let pc = parse_str("0 0 0 0 0 0\n").unwrap();
        assert!(pc.metadata.other["source"].ends_with(".txt"));
    }
}
