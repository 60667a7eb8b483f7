//! The silent-file container: merge-append writing and lazy streaming
//! read-back of tagged structure records over a single file.

use super::codec::{self, CodecError};
use super::options::SilentOptions;
use super::record::StructureRecord;
use crate::core::models::pose::Pose;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Silent file not found: '{path}'", path = path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O failure on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Pose {index} has no metadata tag to append under")]
    MissingTag { index: usize },

    #[error("Cannot encode record '{tag}': {source}")]
    Encode {
        tag: String,
        #[source]
        source: CodecError,
    },

    #[error("Malformed record {index} at byte offset {offset}: {source}")]
    MalformedRecord {
        index: usize,
        offset: u64,
        #[source]
        source: CodecError,
    },

    #[error("Duplicate tag '{tag}' (records {first} and {second})")]
    DuplicateTag {
        tag: String,
        first: usize,
        second: usize,
    },

    #[error("Tag '{tag}' not found in '{path}'", path = path.display())]
    TagNotFound { tag: String, path: PathBuf },
}

pub(crate) fn io_error(path: &Path, source: io::Error) -> ContainerError {
    ContainerError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub(crate) fn open_error(path: &Path, source: io::Error) -> ContainerError {
    if source.kind() == io::ErrorKind::NotFound {
        ContainerError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        io_error(path, source)
    }
}

/// Appends one record to the container at `path`.
///
/// The file is opened in append mode: an existing container is never
/// truncated, a missing one is created. An exclusive advisory lock is held
/// for the duration of the write so concurrent appenders cannot interleave
/// partial records. Each append is an independent, immediately-flushed
/// unit; there are no transaction semantics across calls.
pub fn append_record(
    path: &Path,
    record: &StructureRecord,
    options: &SilentOptions,
) -> Result<(), ContainerError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    file.lock_exclusive().map_err(|e| io_error(path, e))?;
    let result = write_locked(&file, path, record, options);
    let unlock = FileExt::unlock(&file).map_err(|e| io_error(path, e));
    result.and(unlock)
}

fn write_locked(
    file: &File,
    path: &Path,
    record: &StructureRecord,
    options: &SilentOptions,
) -> Result<(), ContainerError> {
    let mut writer = BufWriter::new(file);
    codec::write_record(record, options.encoding, &mut writer).map_err(|source| match source {
        CodecError::Io(e) => io_error(path, e),
        other => ContainerError::Encode {
            tag: record.tag.clone(),
            source: other,
        },
    })?;
    writer.flush().map_err(|e| io_error(path, e))?;
    debug!(tag = %record.tag, path = %path.display(), "appended structure record");
    Ok(())
}

/// Appends every pose in `poses`, each under its own metadata tag.
///
/// This is the single write contract for one or many poses: callers with a
/// single pose pass a one-element iterator. Returns the number of records
/// written.
///
/// # Errors
///
/// Fails with [`ContainerError::MissingTag`] (carrying the 1-based position
/// in the iterator) when a pose has no metadata; there is no silent
/// fallback to an autogenerated tag. Poses written before the failing one
/// remain in the container.
pub fn append_poses<'a, I>(
    path: &Path,
    poses: I,
    options: &SilentOptions,
) -> Result<usize, ContainerError>
where
    I: IntoIterator<Item = &'a Pose>,
{
    let mut written = 0;
    for (i, pose) in poses.into_iter().enumerate() {
        let tag = pose
            .tag()
            .ok_or(ContainerError::MissingTag { index: i + 1 })?
            .to_string();
        let record = codec::encode_pose(pose, &tag, &BTreeMap::new());
        append_record(path, &record, options)?;
        written += 1;
    }
    Ok(written)
}

/// Opens a lazy stream over the container at `path`.
///
/// Records are yielded in file order as `(tag, pose)` pairs. The stream is
/// finite, forward-only, and restartable: calling `stream` again opens an
/// independent fresh pass. Dropping the reader closes the file promptly,
/// so consumers may stop iterating at any point.
///
/// # Errors
///
/// Fails with [`ContainerError::FileNotFound`] if the path does not exist.
/// During iteration, a corrupt entry aborts the stream with
/// [`ContainerError::MalformedRecord`] (reporting the record index and
/// byte offset); there is no skip-and-continue mode. A record cut short
/// by end of file ends the stream early instead when
/// `options.tolerate_truncated_tail` is set.
pub fn stream(path: &Path, options: &SilentOptions) -> Result<SilentReader, ContainerError> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    debug!(path = %path.display(), "streaming silent file");
    Ok(SilentReader {
        reader: BufReader::new(file),
        path: path.to_path_buf(),
        options: *options,
        index: 0,
        finished: false,
    })
}

/// One pass over a container; see [`stream`].
pub struct SilentReader {
    reader: BufReader<File>,
    path: PathBuf,
    options: SilentOptions,
    index: usize,
    finished: bool,
}

impl SilentReader {
    /// Number of records yielded so far.
    pub fn records_read(&self) -> usize {
        self.index
    }
}

impl Iterator for SilentReader {
    type Item = Result<(String, Pose), ContainerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let offset = match self.reader.stream_position() {
            Ok(offset) => offset,
            Err(source) => {
                self.finished = true;
                return Some(Err(io_error(&self.path, source)));
            }
        };
        match codec::read_record(&mut self.reader) {
            Ok(None) => {
                self.finished = true;
                None
            }
            Ok(Some(record)) => match codec::decode_pose(&record) {
                Ok(pose) => {
                    self.index += 1;
                    Some(Ok((record.tag, pose)))
                }
                Err(source) => {
                    self.finished = true;
                    Some(Err(ContainerError::MalformedRecord {
                        index: self.index,
                        offset,
                        source,
                    }))
                }
            },
            Err(CodecError::Truncated) if self.options.tolerate_truncated_tail => {
                warn!(
                    path = %self.path.display(),
                    offset, "trailing record truncated; ending stream early"
                );
                self.finished = true;
                None
            }
            Err(CodecError::Io(source)) => {
                self.finished = true;
                Some(Err(io_error(&self.path, source)))
            }
            Err(source) => {
                self.finished = true;
                Some(Err(ContainerError::MalformedRecord {
                    index: self.index,
                    offset,
                    source,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build::pose_from_sequence;
    use crate::core::chemistry::TypeSet;
    use crate::core::io::options::Encoding;
    use crate::core::models::metadata::Metadata;
    use tempfile::tempdir;

    fn tagged_pose(sequence: &str, tag: &str) -> Pose {
        let mut pose = pose_from_sequence(sequence, TypeSet::FaStandard, true).unwrap();
        pose.set_metadata(Metadata::new(tag, pose.residue_count()).unwrap())
            .unwrap();
        pose
    }

    fn collect_tags(path: &Path, options: &SilentOptions) -> Vec<(String, usize)> {
        stream(path, options)
            .unwrap()
            .map(|item| {
                let (tag, pose) = item.unwrap();
                (tag, pose.residue_count())
            })
            .collect()
    }

    #[test]
    fn container_round_trip_preserves_order_and_counts() {
        for options in [SilentOptions::default(), SilentOptions::binary()] {
            let dir = tempdir().unwrap();
            let path = dir.path().join("out.silent");
            let poses = [
                tagged_pose("GAVLIF", "a"),
                tagged_pose("WY", "b"),
                tagged_pose("ARNDCEQGHILKMFPSTWYV", "c"),
            ];
            append_poses(&path, &poses, &options).unwrap();

            let seen = collect_tags(&path, &options);
            assert_eq!(
                seen,
                [
                    ("a".to_string(), 6),
                    ("b".to_string(), 2),
                    ("c".to_string(), 20)
                ]
            );
        }
    }

    #[test]
    fn streamed_poses_carry_the_record_tag() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let poses = [tagged_pose("GA", "p1"), tagged_pose("GAV", "p2")];
        append_poses(&path, &poses, &SilentOptions::binary()).unwrap();

        let read: Vec<(String, Pose)> = stream(&path, &SilentOptions::default())
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].0, "p1");
        assert_eq!(read[0].1.tag(), Some("p1"));
        assert_eq!(read[0].1.residue_count(), poses[0].residue_count());
        assert_eq!(read[1].0, "p2");
        assert_eq!(read[1].1.residue_count(), poses[1].residue_count());
    }

    #[test]
    fn append_merges_into_an_existing_container() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let options = SilentOptions::default();
        append_poses(&path, [&tagged_pose("GA", "first")], &options).unwrap();
        append_poses(&path, [&tagged_pose("GAV", "second")], &options).unwrap();

        let tags: Vec<String> = collect_tags(&path, &options)
            .into_iter()
            .map(|(tag, _)| tag)
            .collect();
        assert_eq!(tags, ["first", "second"]);
    }

    #[test]
    fn stream_is_restartable_from_the_beginning() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let options = SilentOptions::default();
        let poses = [tagged_pose("GA", "a"), tagged_pose("GAV", "b")];
        append_poses(&path, &poses, &options).unwrap();

        let mut first_pass = stream(&path, &options).unwrap();
        let (tag, _) = first_pass.next().unwrap().unwrap();
        assert_eq!(tag, "a");
        drop(first_pass);

        let tags: Vec<String> = collect_tags(&path, &options)
            .into_iter()
            .map(|(tag, _)| tag)
            .collect();
        assert_eq!(tags, ["a", "b"]);
    }

    #[test]
    fn stream_on_missing_file_is_file_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.silent");
        assert!(matches!(
            stream(&path, &SilentOptions::default()),
            Err(ContainerError::FileNotFound { .. })
        ));
    }

    #[test]
    fn append_into_missing_directory_is_an_io_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.silent");
        let pose = tagged_pose("GA", "t");
        assert!(matches!(
            append_poses(&path, [&pose], &SilentOptions::default()),
            Err(ContainerError::Io { .. })
        ));
    }

    #[test]
    fn pose_without_metadata_cannot_be_appended() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let mut pose = pose_from_sequence("GA", TypeSet::FaStandard, true).unwrap();
        pose.clear_metadata();
        assert!(matches!(
            append_poses(&path, [&pose], &SilentOptions::default()),
            Err(ContainerError::MissingTag { index: 1 })
        ));
        // Nothing was appended, but the container file now exists and is empty.
        assert!(collect_tags(&path, &SilentOptions::default()).is_empty());
    }

    #[test]
    fn duplicate_tags_are_permitted_at_the_storage_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let options = SilentOptions::default();
        let poses = [tagged_pose("GA", "same"), tagged_pose("GAV", "same")];
        append_poses(&path, &poses, &options).unwrap();

        let tags: Vec<String> = collect_tags(&path, &options)
            .into_iter()
            .map(|(tag, _)| tag)
            .collect();
        assert_eq!(tags, ["same", "same"]);
    }

    #[test]
    fn corrupt_entry_aborts_the_stream_with_its_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let options = SilentOptions::default();
        append_poses(
            &path,
            [&tagged_pose("GA", "good"), &tagged_pose("GAV", "bad")],
            &options,
        )
        .unwrap();

        // Corrupt the second record's header keyword.
        let text = std::fs::read_to_string(&path).unwrap();
        let corrupted = text.replacen("STRUCT bad", "STRUCK bad", 1);
        std::fs::write(&path, corrupted).unwrap();

        let mut reader = stream(&path, &options).unwrap();
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(ContainerError::MalformedRecord { index, offset, .. }) => {
                assert_eq!(index, 1);
                assert!(offset > 0);
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncated_tail_is_fatal_by_default_and_tolerated_on_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.silent");
        let options = SilentOptions::binary();
        append_poses(
            &path,
            [&tagged_pose("GA", "whole"), &tagged_pose("GAV", "cut")],
            &options,
        )
        .unwrap();

        // Chop the file inside the second record.
        let bytes = std::fs::read(&path).unwrap();
        let cut = bytes.len() - 24;
        std::fs::write(&path, &bytes[..cut]).unwrap();

        let mut strict = stream(&path, &SilentOptions::default()).unwrap();
        assert!(strict.next().unwrap().is_ok());
        assert!(matches!(
            strict.next().unwrap(),
            Err(ContainerError::MalformedRecord {
                index: 1,
                source: CodecError::Truncated,
                ..
            })
        ));

        let tolerant_options = SilentOptions {
            tolerate_truncated_tail: true,
            ..SilentOptions::default()
        };
        let tags: Vec<String> = stream(&path, &tolerant_options)
            .unwrap()
            .map(|item| item.unwrap().0)
            .collect();
        assert_eq!(tags, ["whole"]);
    }
}
