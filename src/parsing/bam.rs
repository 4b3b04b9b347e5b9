//! Conversion of BAM alignments to a read coordinate table using noodles.
//!
//! Output is BED6 (`chrom  start  end  name  mapq  strand`) with 0-based,
//! end-exclusive coordinates, one line per mapped record.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use noodles::bam;
use noodles::sam::alignment::Record as _;
use tempfile::NamedTempFile;

use crate::parsing::ParseError;

/// Mapping quality written when a record has none
const MISSING_MAPQ: u8 = 255;

/// Convert a BAM file into a coordinate table at `out`.
///
/// The table is written to a temporary file beside `out` and renamed into
/// place once complete. Returns the number of records written.
///
/// # Errors
///
/// Returns `ParseError::Io` on read/write failures and `ParseError::Noodles`
/// if a record refers to a reference sequence missing from the header.
pub fn bam_to_coords_file(bam_path: &Path, out: &Path) -> Result<usize, ParseError> {
    let dir = out
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;

    let written = {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let written = bam_to_coords(bam_path, &mut writer)?;
        writer.flush()?;
        written
    };

    tmp.persist(out).map_err(|e| ParseError::Io(e.error))?;
    Ok(written)
}

/// Write the coordinate table of a BAM file to `writer`
///
/// # Errors
///
/// See [`bam_to_coords_file`].
pub fn bam_to_coords<W: Write>(bam_path: &Path, writer: &mut W) -> Result<usize, ParseError> {
    let mut reader = File::open(bam_path).map(bam::io::Reader::new)?;
    let header = reader.read_header()?;
    let mut written = 0;

    for result in reader.records() {
        let record = result?;
        let flags = record.flags();
        if flags.is_unmapped() {
            continue;
        }

        let (Some(id), Some(start), Some(end)) = (
            record.reference_sequence_id().transpose()?,
            record.alignment_start().transpose()?,
            record.alignment_end().transpose()?,
        ) else {
            continue;
        };

        let (chrom, _) = header.reference_sequences().get_index(id).ok_or_else(|| {
            ParseError::Noodles(format!("Reference sequence index {id} not in BAM header"))
        })?;

        let name = record
            .name()
            .map(|n| n.to_string())
            .unwrap_or_else(|| ".".to_string());
        let mapq = record
            .mapping_quality()
            .map_or(MISSING_MAPQ, |q| q.get());
        let strand = if flags.is_reverse_complemented() { '-' } else { '+' };

        writeln!(
            writer,
            "{chrom}\t{}\t{}\t{name}\t{mapq}\t{strand}",
            usize::from(start) - 1,
            usize::from(end),
        )?;
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_bam_is_io_error() {
        let mut out = Vec::new();
        let err = bam_to_coords(Path::new("/nonexistent/reads.bam"), &mut out).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
        assert!(out.is_empty());
    }

    fn write_bam(path: &Path) {
        use std::num::NonZeroUsize;

        use noodles::core::Position;
        use noodles::sam::alignment::io::Write as _;
        use noodles::sam::alignment::record::cigar::{op::Kind, Op};
        use noodles::sam::alignment::record::Flags;
        use noodles::sam::alignment::RecordBuf;
        use noodles::sam::header::record::value::{map::ReferenceSequence, Map};

        let header = noodles::sam::Header::builder()
            .add_reference_sequence(
                "chr1",
                Map::<ReferenceSequence>::new(NonZeroUsize::try_from(1000).unwrap()),
            )
            .build();

        let mapped = RecordBuf::builder()
            .set_name("r1")
            .set_flags(Flags::empty())
            .set_reference_sequence_id(0)
            .set_alignment_start(Position::try_from(101).unwrap())
            .set_cigar([Op::new(Kind::Match, 50)].into_iter().collect())
            .build();
        let unmapped = RecordBuf::builder()
            .set_name("r2")
            .set_flags(Flags::UNMAPPED)
            .build();

        let mut writer = bam::io::Writer::new(File::create(path).unwrap());
        writer.write_header(&header).unwrap();
        writer.write_alignment_record(&header, &mapped).unwrap();
        writer.write_alignment_record(&header, &unmapped).unwrap();
        writer.try_finish().unwrap();
    }

    #[test]
    fn test_mapped_records_become_bed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let bam_path = dir.path().join("S1.bam");
        write_bam(&bam_path);

        let mut out = Vec::new();
        let written = bam_to_coords(&bam_path, &mut out).unwrap();
        assert_eq!(written, 1);
        assert_eq!(String::from_utf8(out).unwrap(), "chr1\t100\t150\tr1\t255\t+\n");
    }

    #[test]
    fn test_coords_file_is_written_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let bam_path = dir.path().join("S1.bam");
        let bed_path = dir.path().join("S1.bed");
        write_bam(&bam_path);

        assert_eq!(bam_to_coords_file(&bam_path, &bed_path).unwrap(), 1);
        assert_eq!(
            std::fs::read_to_string(&bed_path).unwrap(),
            "chr1\t100\t150\tr1\t255\t+\n"
        );
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 2);
    }

    #[test]
    fn test_truncated_bam_is_rejected() {
        let mut bam = tempfile::NamedTempFile::with_suffix(".bam").unwrap();
        bam.write_all(b"not a bam").unwrap();

        let mut out = Vec::new();
        assert!(bam_to_coords(bam.path(), &mut out).is_err());
    }
}
