use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write as _},
    path::Path,
};

use pcd_core::pointcloud::point::Point;

use crate::error::ExportError;

/// One output row: `x y z intensity range label`.
pub fn format_point(point: &Point) -> String {
    format!(
        "{} {} {} {} {} {}",
        point.x, point.y, point.z, point.intensity, point.range, point.label
    )
}

/// Appends `points` to `path`, one row per point.
///
/// The file is created when missing, and so are its parent directories.
pub fn write_points(path: &Path, points: &[Point]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(ExportError::io(parent))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(ExportError::io(path))?;
    write_rows(file, path, points)
}

/// Writes one row per point to an already opened `file`.
pub(crate) fn write_rows(file: File, path: &Path, points: &[Point]) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(file);
    for p in points {
        writeln!(writer, "{}", format_point(p)).map_err(ExportError::io(path))?;
    }
    writer.flush().map_err(ExportError::io(path))?;

    log::debug!("wrote {} points to {:?}", points.len(), path);
    Ok(())
}
