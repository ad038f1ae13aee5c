//! Fixture archive reader.
//!
//! A fixture archive is a zip file (a `.gdtf` file) holding
//! `description.xml` and the gobo media referenced by its wheels, under
//! `wheels/`. Archives carrying a `description.json` instead are read as the
//! JSON form of [`FixtureDescription`]. Member lookups fall back to a
//! case-insensitive match.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use image::RgbaImage;

use crate::errors::{Result, StageError};
use crate::resources::fixture::FixtureDescription;

const XML_DESCRIPTION: &str = "description.xml";
const JSON_DESCRIPTION: &str = "description.json";

pub struct FixtureArchive<R: Read + Seek> {
    zip: zip::ZipArchive<R>,
}

impl FixtureArchive<BufReader<File>> {
    /// Opens an archive from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> FixtureArchive<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        Ok(Self {
            zip: zip::ZipArchive::new(reader)?,
        })
    }

    /// Reads a member by path, trying an exact match first.
    pub fn read_member(&mut self, path: &str) -> Result<Vec<u8>> {
        let resolved = if self.zip.file_names().any(|n| n == path) {
            path.to_string()
        } else {
            self.zip
                .file_names()
                .find(|n| n.eq_ignore_ascii_case(path))
                .map(str::to_string)
                .ok_or_else(|| StageError::ArchiveMemberMissing(path.to_string()))?
        };

        let mut file = self.zip.by_name(&resolved)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Parses `description.xml`, or `description.json` when there is no XML.
    pub fn description(&mut self) -> Result<FixtureDescription> {
        match self.read_member(XML_DESCRIPTION) {
            Ok(bytes) => FixtureDescription::from_xml(&String::from_utf8_lossy(&bytes)),
            Err(StageError::ArchiveMemberMissing(_)) => match self.read_member(JSON_DESCRIPTION) {
                Ok(bytes) => FixtureDescription::from_json(&bytes),
                Err(StageError::ArchiveMemberMissing(_)) => {
                    Err(StageError::ArchiveMemberMissing(XML_DESCRIPTION.to_string()))
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Decodes the media of every gobo-wheel slot that has one.
    ///
    /// Slots whose media is missing or undecodable are skipped with a warning.
    pub fn gobo_images(&mut self, description: &FixtureDescription) -> Vec<RgbaImage> {
        let mut images = Vec::new();

        for wheel in description.gobo_wheels() {
            for slot in wheel.slots.iter().filter(|s| !s.media_file.is_empty()) {
                let candidates = [
                    format!("wheels/{}.png", slot.media_file),
                    format!("wheels/{}.jpg", slot.media_file),
                    format!("wheels/{}.jpeg", slot.media_file),
                    format!("{}.png", slot.media_file),
                    slot.media_file.clone(),
                ];

                let Some(bytes) = candidates.iter().find_map(|p| self.read_member(p).ok()) else {
                    log::warn!("Gobo media '{}' not found in archive", slot.media_file);
                    continue;
                };

                match image::load_from_memory(&bytes) {
                    Ok(img) => images.push(img.to_rgba8()),
                    Err(e) => log::warn!("Gobo media '{}' failed to decode: {e}", slot.media_file),
                }
            }
        }

        images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn build_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            for (name, data) in members {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn reads_description_case_insensitively() {
        let json = br#"{ "name": "Spot", "geometry": { "name": "Base" } }"#;
        let bytes = build_archive(&[("Description.JSON", json)]);
        let mut archive = FixtureArchive::from_reader(Cursor::new(bytes)).unwrap();

        let description = archive.description().unwrap();
        assert_eq!(description.name, "Spot");
        assert_eq!(description.geometry.name, "Base");
    }

    #[test]
    fn xml_description_wins_over_json() {
        let xml = br#"<GDTF><FixtureType Name="From XML"><Geometries>
            <Geometry Name="Base"/></Geometries></FixtureType></GDTF>"#;
        let json = br#"{ "name": "From JSON", "geometry": { "name": "Base" } }"#;
        let bytes = build_archive(&[("description.json", json), ("description.xml", xml)]);
        let mut archive = FixtureArchive::from_reader(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.description().unwrap().name, "From XML");
    }

    #[test]
    fn archive_without_description_names_the_xml() {
        let bytes = build_archive(&[("wheels/a.png", b"x")]);
        let mut archive = FixtureArchive::from_reader(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            archive.description(),
            Err(StageError::ArchiveMemberMissing(name)) if name == "description.xml"
        ));
    }

    #[test]
    fn missing_member_is_reported() {
        let bytes = build_archive(&[("other.txt", b"x")]);
        let mut archive = FixtureArchive::from_reader(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            archive.read_member("description.json"),
            Err(StageError::ArchiveMemberMissing(_))
        ));
    }
}
