//! Driving the external read aligner.
//!
//! Reads are mapped with `bowtie2`, whose SAM output is piped through
//! `samtools view -Sb` into a BAM file:
//!
//! ```text
//! bowtie2 -p <cores> -x <index> -U <fastq> 2> <stats> | samtools view -@ <cores> -Sb -o <bam>
//! ```
//!
//! Both tools are opaque collaborators: the driver builds their command lines,
//! wires the pipe, and checks exit status. Nothing is retried.

pub mod bowtie;

pub use bowtie::{AlignError, AlignmentJob, Tools};
