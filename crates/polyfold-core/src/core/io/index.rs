//! Indexed random access over a silent file.
//!
//! The container itself is append-oriented and never checks tag
//! uniqueness; consumers that need tag-keyed access build a [`SilentIndex`]
//! and get duplicate detection at that boundary.

use super::codec::{self, CodecError};
use super::container::{ContainerError, io_error, open_error};
use super::options::SilentOptions;
use crate::core::models::pose::Pose;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A tag-to-byte-offset map over one container file.
///
/// Built by a single scan at load time; [`SilentIndex::get`] then seeks
/// straight to a record. The index is a snapshot; records appended after
/// `load` are not visible through it.
#[derive(Debug)]
pub struct SilentIndex {
    path: PathBuf,
    entries: Vec<(String, u64)>,
    by_tag: HashMap<String, usize>,
}

impl SilentIndex {
    /// Scans the container and builds the index.
    ///
    /// # Errors
    ///
    /// Fails with [`ContainerError::DuplicateTag`] on the first tag seen
    /// twice, and with the same errors as streaming for missing files and
    /// malformed records.
    pub fn load(path: &Path, options: &SilentOptions) -> Result<Self, ContainerError> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let mut reader = BufReader::new(file);
        let mut entries: Vec<(String, u64)> = Vec::new();
        let mut by_tag = HashMap::new();

        loop {
            let offset = reader
                .stream_position()
                .map_err(|source| io_error(path, source))?;
            match codec::read_record(&mut reader) {
                Ok(None) => break,
                Ok(Some(record)) => {
                    let index = entries.len();
                    if let Some(&first) = by_tag.get(&record.tag) {
                        return Err(ContainerError::DuplicateTag {
                            tag: record.tag,
                            first,
                            second: index,
                        });
                    }
                    by_tag.insert(record.tag.clone(), index);
                    entries.push((record.tag, offset));
                }
                Err(CodecError::Truncated) if options.tolerate_truncated_tail => {
                    warn!(
                        path = %path.display(),
                        offset, "trailing record truncated; indexing the records before it"
                    );
                    break;
                }
                Err(CodecError::Io(source)) => return Err(io_error(path, source)),
                Err(source) => {
                    return Err(ContainerError::MalformedRecord {
                        index: entries.len(),
                        offset,
                        source,
                    });
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            by_tag,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tags in file order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(tag, _)| tag.as_str())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Byte offset of the record stored under `tag`.
    pub fn offset_of(&self, tag: &str) -> Option<u64> {
        self.by_tag.get(tag).map(|&i| self.entries[i].1)
    }

    /// Reads and decodes the record stored under `tag`.
    ///
    /// # Errors
    ///
    /// Fails with [`ContainerError::TagNotFound`] for an unindexed tag, and
    /// with [`ContainerError::MalformedRecord`] if the file changed under
    /// the index or the record no longer decodes.
    pub fn get(&self, tag: &str) -> Result<Pose, ContainerError> {
        let &index = self
            .by_tag
            .get(tag)
            .ok_or_else(|| ContainerError::TagNotFound {
                tag: tag.to_string(),
                path: self.path.clone(),
            })?;
        let offset = self.entries[index].1;

        let file = File::open(&self.path).map_err(|e| open_error(&self.path, e))?;
        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(offset))
            .map_err(|source| io_error(&self.path, source))?;

        let malformed = |source| ContainerError::MalformedRecord {
            index,
            offset,
            source,
        };
        match codec::read_record(&mut reader) {
            Ok(Some(record)) => codec::decode_pose(&record).map_err(malformed),
            Ok(None) => Err(malformed(CodecError::Truncated)),
            Err(CodecError::Io(source)) => Err(io_error(&self.path, source)),
            Err(source) => Err(malformed(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build::pose_from_sequence;
    use crate::core::chemistry::TypeSet;
    use crate::core::io::container::append_poses;
    use crate::core::models::metadata::Metadata;
    use tempfile::tempdir;

    fn tagged_pose(sequence: &str, tag: &str) -> Pose {
        let mut pose = pose_from_sequence(sequence, TypeSet::FaStandard, true).unwrap();
        pose.set_metadata(Metadata::new(tag, pose.residue_count()).unwrap())
            .unwrap();
        pose
    }

    #[test]
    fn index_maps_tags_in_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let options = SilentOptions::binary();
        let poses = [
            tagged_pose("GA", "a"),
            tagged_pose("GAV", "b"),
            tagged_pose("GAVL", "c"),
        ];
        append_poses(&path, &poses, &options).unwrap();

        let index = SilentIndex::load(&path, &options).unwrap();
        assert_eq!(index.len(), 3);
        let tags: Vec<&str> = index.tags().collect();
        assert_eq!(tags, ["a", "b", "c"]);
        assert!(index.contains("b"));
        assert!(!index.contains("z"));
        assert_eq!(index.offset_of("a"), Some(0));
        assert!(index.offset_of("b").unwrap() > 0);
    }

    #[test]
    fn get_seeks_to_any_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let options = SilentOptions::default();
        let poses = [
            tagged_pose("GA", "a"),
            tagged_pose("GAV", "b"),
            tagged_pose("GAVL", "c"),
        ];
        append_poses(&path, &poses, &options).unwrap();

        let index = SilentIndex::load(&path, &options).unwrap();
        let pose = index.get("c").unwrap();
        assert_eq!(pose.residue_count(), 4);
        assert_eq!(pose.tag(), Some("c"));
        let pose = index.get("a").unwrap();
        assert_eq!(pose.residue_count(), 2);
    }

    #[test]
    fn unknown_tag_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let options = SilentOptions::default();
        append_poses(&path, [&tagged_pose("GA", "only")], &options).unwrap();

        let index = SilentIndex::load(&path, &options).unwrap();
        assert!(matches!(
            index.get("missing"),
            Err(ContainerError::TagNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_tags_fail_at_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let options = SilentOptions::default();
        let poses = [
            tagged_pose("GA", "dup"),
            tagged_pose("GAV", "unique"),
            tagged_pose("GAVL", "dup"),
        ];
        append_poses(&path, &poses, &options).unwrap();

        match SilentIndex::load(&path, &options) {
            Err(ContainerError::DuplicateTag { tag, first, second }) => {
                assert_eq!(tag, "dup");
                assert_eq!(first, 0);
                assert_eq!(second, 2);
            }
            other => panic!("expected DuplicateTag, got {other:?}"),
        }
    }

    #[test]
    fn empty_container_indexes_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        std::fs::write(&path, b"").unwrap();
        let index = SilentIndex::load(&path, &SilentOptions::default()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn missing_container_is_file_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.silent");
        assert!(matches!(
            SilentIndex::load(&path, &SilentOptions::default()),
            Err(ContainerError::FileNotFound { .. })
        ));
    }
}
