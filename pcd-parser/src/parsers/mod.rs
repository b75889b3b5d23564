use std::{ffi::OsStr, path::Path};

use pcd_core::pointcloud::point::PointCloud;

use crate::error::ParseError;

pub mod txt;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Txt,
}

pub fn get_extension(path: &Path) -> Result<Extension, ParseError> {
    let extension = path.extension().and_then(OsStr::to_str);
    match extension {
        Some(ext) if ext.eq_ignore_ascii_case("txt") => Ok(Extension::Txt),
        other => Err(ParseError::UnsupportedExtension(other.map(str::to_string))),
    }
}

pub fn provider_for(path: &Path) -> Result<Box<dyn ParserProvider>, ParseError> {
    match get_extension(path)? {
        Extension::Txt => Ok(Box::new(txt::TxtParserProvider {
            filename: path.to_path_buf(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_is_the_only_supported_extension() {
        assert_eq!(
            get_extension(Path::new("scans/000001.txt")).unwrap(),
            Extension::Txt
        );
        assert_eq!(
            get_extension(Path::new("scans/000001.TXT")).unwrap(),
            Extension::Txt
        );
        assert!(matches!(
            get_extension(Path::new("scans/000001.las")),
            Err(ParseError::UnsupportedExtension(Some(ext))) if ext == "las"
        ));
        assert!(matches!(
            get_extension(Path::new("scans/README")),
            Err(ParseError::UnsupportedExtension(None))
        ));
    }
}
