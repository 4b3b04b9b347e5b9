use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with {status}")]
    Failed { tool: String, status: ExitStatus },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Executables used for mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub bowtie2: PathBuf,
    pub samtools: PathBuf,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            bowtie2: PathBuf::from("bowtie2"),
            samtools: PathBuf::from("samtools"),
        }
    }
}

/// One FASTQ mapped against one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentJob {
    pub fastq: PathBuf,
    /// Bowtie2 index prefix (minus `.X.bt2`)
    pub index: PathBuf,
    pub cores: usize,
    /// Where bowtie2's stderr summary goes
    pub stats: PathBuf,
    pub bam: PathBuf,
}

impl AlignmentJob {
    /// Both outputs already exist, so mapping can be skipped
    pub fn is_complete(&self) -> bool {
        self.stats.exists() && self.bam.exists()
    }

    pub fn bowtie2_command(&self, tools: &Tools) -> Command {
        let mut command = Command::new(&tools.bowtie2);
        command
            .arg("-p")
            .arg(self.cores.to_string())
            .arg("-x")
            .arg(&self.index)
            .arg("-U")
            .arg(&self.fastq);
        command
    }

    pub fn samtools_command(&self, tools: &Tools, out: &Path) -> Command {
        let mut command = Command::new(&tools.samtools);
        command
            .arg("view")
            .arg("-@")
            .arg(self.cores.to_string())
            .arg("-Sb")
            .arg("-o")
            .arg(out);
        command
    }

    /// Run `bowtie2 | samtools view`.
    ///
    /// The BAM is written to a temporary file beside the final path and only
    /// renamed into place when both tools succeed.
    ///
    /// # Errors
    ///
    /// Returns `AlignError::Spawn` if a tool cannot be started,
    /// `AlignError::Failed` if a tool exits unsuccessfully, or
    /// `AlignError::Io` on file failures.
    pub fn run(&self, tools: &Tools) -> Result<(), AlignError> {
        let dir = self
            .bam
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp_bam = tempfile::Builder::new()
            .prefix(".mapping-")
            .suffix(".bam")
            .tempfile_in(dir)?;

        let stats = File::create(&self.stats)?;

        let mut bowtie2 = self.bowtie2_command(tools);
        bowtie2.stdout(Stdio::piped()).stderr(Stdio::from(stats));
        let mut samtools = self.samtools_command(tools, tmp_bam.path());

        debug!(
            "{} | {}",
            command_line(&bowtie2),
            command_line(&samtools)
        );

        let mut bowtie2_child = bowtie2.spawn().map_err(|source| AlignError::Spawn {
            tool: tools.bowtie2.display().to_string(),
            source,
        })?;

        let Some(sam_stream) = bowtie2_child.stdout.take() else {
            return Err(AlignError::Io(io::Error::other("bowtie2 stdout was not captured")));
        };
        samtools.stdin(Stdio::from(sam_stream));

        let samtools_child = samtools.spawn().map_err(|source| AlignError::Spawn {
            tool: tools.samtools.display().to_string(),
            source,
        });
        let mut samtools_child = match samtools_child {
            Ok(child) => child,
            Err(e) => {
                let _ = bowtie2_child.kill();
                let _ = bowtie2_child.wait();
                return Err(e);
            }
        };

        let bowtie2_status = bowtie2_child.wait()?;
        let samtools_status = samtools_child.wait()?;

        check_status(&tools.bowtie2, bowtie2_status)?;
        check_status(&tools.samtools, samtools_status)?;

        tmp_bam
            .persist(&self.bam)
            .map_err(|e| AlignError::Io(e.error))?;
        info!(bam = %self.bam.display(), "Mapping finished");
        Ok(())
    }
}

fn check_status(tool: &Path, status: ExitStatus) -> Result<(), AlignError> {
    if status.success() {
        Ok(())
    } else {
        Err(AlignError::Failed {
            tool: tool.display().to_string(),
            status,
        })
    }
}

/// Render a command as a shell-like line for logging
pub fn command_line(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|s| s.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(dir: &Path) -> AlignmentJob {
        AlignmentJob {
            fastq: PathBuf::from("reads.fastq.gz"),
            index: PathBuf::from("idx/BL/hg38"),
            cores: 4,
            stats: dir.join("S1_stats.txt"),
            bam: dir.join("S1.bam"),
        }
    }

    #[test]
    fn test_command_lines() {
        let job = job(Path::new("out"));
        let tools = Tools::default();
        assert_eq!(
            command_line(&job.bowtie2_command(&tools)),
            "bowtie2 -p 4 -x idx/BL/hg38 -U reads.fastq.gz"
        );
        assert_eq!(
            command_line(&job.samtools_command(&tools, Path::new("out/S1.bam"))),
            "samtools view -@ 4 -Sb -o out/S1.bam"
        );
    }

    #[test]
    fn test_is_complete_requires_both_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        assert!(!job.is_complete());

        std::fs::write(&job.stats, "").unwrap();
        assert!(!job.is_complete());

        std::fs::write(&job.bam, "").unwrap();
        assert!(job.is_complete());
    }

    #[test]
    fn test_missing_tool_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        let tools = Tools {
            bowtie2: PathBuf::from("/nonexistent/bowtie2"),
            samtools: PathBuf::from("/nonexistent/samtools"),
        };

        let err = job.run(&tools).unwrap_err();
        assert!(matches!(err, AlignError::Spawn { ref tool, .. } if tool == "/nonexistent/bowtie2"));
        assert!(!job.bam.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_leaves_no_bam() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        let tools = Tools {
            bowtie2: PathBuf::from("false"),
            samtools: PathBuf::from("true"),
        };

        let err = job.run(&tools).unwrap_err();
        assert!(matches!(err, AlignError::Failed { ref tool, .. } if tool == "false"));
        assert!(!job.bam.exists());
    }
}
