use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use pcd_core::pointcloud::point::PointCloud;

use crate::{error::ExportError, txt::write_rows};

/// Calls `create` with versions 1, 2, ... until it no longer reports
/// `AlreadyExists`.
fn claim_version<T>(
    mut create: impl FnMut(u32) -> (PathBuf, io::Result<T>),
) -> Result<(PathBuf, T), ExportError> {
    let mut version = 1u32;
    loop {
        let (path, result) = create(version);
        match result {
            Ok(value) => return Ok((path, value)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && version < u32::MAX => {
                version += 1;
            }
            Err(source) => return Err(ExportError::Io { path, source }),
        }
    }
}

/// Creates and returns the first of `base1`, `base2`, ... that is free.
///
/// Each candidate is claimed with `create_dir`, so two runs started with the
/// same base never share a directory.
pub fn create_versioned_dir(base: &Path) -> Result<PathBuf, ExportError> {
    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(ExportError::io(parent))?;
    }

    let (dir, ()) = claim_version(|version| {
        let mut name = OsString::from(base.as_os_str());
        name.push(version.to_string());
        let dir = PathBuf::from(name);
        let result = fs::create_dir(&dir);
        (dir, result)
    })?;
    log::info!("output directory: {:?}", dir);
    Ok(dir)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    Ground,
    NonGround,
}

impl SplitKind {
    fn tag(self) -> &'static str {
        match self {
            SplitKind::Ground => "gnd",
            SplitKind::NonGround => "ngnd",
        }
    }
}

/// Creates the first free `{v}_gnd_{stem}.txt` or `{v}_ngnd_{stem}.txt` in
/// `dir`.
pub fn create_split_file(
    dir: &Path,
    stem: &str,
    kind: SplitKind,
) -> Result<(PathBuf, File), ExportError> {
    claim_version(|version| {
        let path = dir.join(format!("{}_{}_{}.txt", version, kind.tag(), stem));
        let result = OpenOptions::new().write(true).create_new(true).open(&path);
        (path, result)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutput {
    pub ground: PathBuf,
    pub non_ground: PathBuf,
}

/// Writes the ground and non-ground points of `point_cloud` to separate files.
pub fn write_split(
    dir: &Path,
    stem: &str,
    point_cloud: &PointCloud,
) -> Result<SplitOutput, ExportError> {
    fs::create_dir_all(dir).map_err(ExportError::io(dir))?;
    let (ground, non_ground) = point_cloud.partition_by_ground();

    let (ground_path, file) = create_split_file(dir, stem, SplitKind::Ground)?;
    write_rows(file, &ground_path, &ground)?;
    let (non_ground_path, file) = create_split_file(dir, stem, SplitKind::NonGround)?;
    write_rows(file, &non_ground_path, &non_ground)?;

    Ok(SplitOutput {
        ground: ground_path,
        non_ground: non_ground_path,
    })
}
