//! Bitstream primitives used by the splicer.
//!
//! The splicer never touches encoded audio itself. It asks an [`AudioTools`]
//! implementation to cut byte-exact sub-ranges, join parts, and locate a
//! silent clip. [`DelayCutTools`] does this with the DelayCut command line
//! tool and plain byte copies.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::models::BitrateId;

use super::errors::{RetimeError, RetimeResult};

/// Lossless audio primitives.
pub trait AudioTools: Send + Sync {
    /// Cut `[start_ms, end_ms]` of `input` into `output` without re-encoding.
    /// `end_ms == None` runs to the end of the stream.
    fn trim(&self, input: &Path, output: &Path, start_ms: u64, end_ms: Option<u64>)
        -> RetimeResult<()>;

    /// Join `parts` byte for byte into `output`, in order.
    fn concat(&self, parts: &[&Path], output: &Path) -> RetimeResult<()>;

    /// Path of a silent clip encoded at `bitrate`.
    fn silence_clip(&self, bitrate: &BitrateId) -> RetimeResult<PathBuf>;
}

/// Directory of pre-authored silent clips, one per bitrate
/// (`blank_<bitrate>.ac3`).
#[derive(Debug, Clone)]
pub struct SilenceLibrary {
    dir: PathBuf,
}

impl SilenceLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Expected location of the clip for `bitrate`, whether or not it exists.
    pub fn clip_path(&self, bitrate: &BitrateId) -> PathBuf {
        self.dir.join(format!("blank_{}.ac3", bitrate))
    }

    /// Look up the clip for `bitrate`.
    pub fn lookup(&self, bitrate: &BitrateId) -> RetimeResult<PathBuf> {
        let path = self.clip_path(bitrate);
        if !path.is_file() {
            return Err(RetimeError::MissingSilenceAsset {
                bitrate: bitrate.to_string(),
                path,
            });
        }
        Ok(path)
    }
}

/// Concatenate files byte for byte.
pub fn concat_files(parts: &[&Path], output: &Path) -> RetimeResult<()> {
    let file = File::create(output)
        .map_err(|e| RetimeError::filesystem(format!("create {}", output.display()), e))?;
    let mut writer = BufWriter::new(file);

    for part in parts {
        let input = File::open(part)
            .map_err(|e| RetimeError::filesystem(format!("open {}", part.display()), e))?;
        io::copy(&mut BufReader::new(input), &mut writer)
            .map_err(|e| RetimeError::filesystem(format!("append {}", part.display()), e))?;
    }

    writer
        .flush()
        .and_then(|_| writer.get_ref().sync_all())
        .map_err(|e| RetimeError::filesystem(format!("flush {}", output.display()), e))?;
    Ok(())
}

/// [`AudioTools`] backed by the DelayCut executable.
#[derive(Debug, Clone)]
pub struct DelayCutTools {
    executable: PathBuf,
    silence: SilenceLibrary,
}

impl DelayCutTools {
    pub fn new(executable: impl Into<PathBuf>, silence: SilenceLibrary) -> Self {
        Self {
            executable: executable.into(),
            silence,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Check that the executable exists before any work starts.
    pub fn validate(&self) -> RetimeResult<()> {
        if !self.executable.is_file() {
            return Err(RetimeError::ToolNotFound(self.executable.clone()));
        }
        tracing::debug!("DelayCut path: {}", self.executable.display());
        Ok(())
    }

    /// Arguments for one DelayCut invocation. An end cut of `0` keeps
    /// everything up to the end of the input.
    fn trim_args(input: &Path, output: &Path, start_ms: u64, end_ms: Option<u64>) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.display().to_string(),
            "-endcut".to_string(),
            end_ms.unwrap_or(0).to_string(),
            "-startcut".to_string(),
            start_ms.to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ]
    }
}

impl AudioTools for DelayCutTools {
    fn trim(
        &self,
        input: &Path,
        output: &Path,
        start_ms: u64,
        end_ms: Option<u64>,
    ) -> RetimeResult<()> {
        let args = Self::trim_args(input, output, start_ms, end_ms);
        tracing::debug!("Running: {} {}", self.executable.display(), args.join(" "));

        let result = Command::new(&self.executable)
            .args(&args)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => RetimeError::ToolNotFound(self.executable.clone()),
                _ => RetimeError::filesystem(
                    format!("spawn {}", self.executable.display()),
                    e,
                ),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(RetimeError::tool_failed(
                "delaycut",
                result.status.code().unwrap_or(-1),
                stderr.trim(),
            ));
        }

        if !output.is_file() {
            return Err(RetimeError::OutputMissing(output.to_path_buf()));
        }

        Ok(())
    }

    fn concat(&self, parts: &[&Path], output: &Path) -> RetimeResult<()> {
        concat_files(parts, output)
    }

    fn silence_clip(&self, bitrate: &BitrateId) -> RetimeResult<PathBuf> {
        self.silence.lookup(bitrate)
    }
}

/// Remove a file, ignoring it if already gone.
pub(crate) fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// In-process stand-in for DelayCut used by tests.
///
/// Streams are treated as `bytes_per_ms` bytes per millisecond, so a trim is
/// a plain byte-range copy.
#[cfg(test)]
pub(crate) mod fake {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    pub(crate) struct FakeTools {
        pub bytes_per_ms: u64,
        pub silence: SilenceLibrary,
        pub trims: Mutex<Vec<(u64, Option<u64>)>>,
        pub fail_on_trim: Option<usize>,
        trim_calls: AtomicUsize,
    }

    impl FakeTools {
        pub fn new(silence_dir: &Path) -> Self {
            Self {
                bytes_per_ms: 1,
                silence: SilenceLibrary::new(silence_dir),
                trims: Mutex::new(Vec::new()),
                fail_on_trim: None,
                trim_calls: AtomicUsize::new(0),
            }
        }

        /// Make the n-th trim call (zero based) fail.
        pub fn failing_at(mut self, call: usize) -> Self {
            self.fail_on_trim = Some(call);
            self
        }

        /// Write a silent clip of `ms` milliseconds for `bitrate`.
        pub fn add_silence(&self, bitrate: &BitrateId, ms: u64) {
            fs::create_dir_all(self.silence.dir()).unwrap();
            let bytes = vec![0u8; (ms * self.bytes_per_ms) as usize];
            fs::write(self.silence.clip_path(bitrate), bytes).unwrap();
        }
    }

    impl AudioTools for FakeTools {
        fn trim(
            &self,
            input: &Path,
            output: &Path,
            start_ms: u64,
            end_ms: Option<u64>,
        ) -> RetimeResult<()> {
            let call = self.trim_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_trim == Some(call) {
                return Err(RetimeError::tool_failed("delaycut", 1, "injected failure"));
            }
            self.trims.lock().push((start_ms, end_ms));

            let data = fs::read(input).map_err(|e| RetimeError::filesystem("fake read", e))?;
            let len = data.len() as u64;
            let start = (start_ms * self.bytes_per_ms).min(len) as usize;
            let end = end_ms
                .map(|ms| (ms * self.bytes_per_ms).min(len))
                .unwrap_or(len) as usize;
            let slice = if start < end { &data[start..end] } else { &[][..] };
            fs::write(output, slice).map_err(|e| RetimeError::filesystem("fake write", e))
        }

        fn concat(&self, parts: &[&Path], output: &Path) -> RetimeResult<()> {
            concat_files(parts, output)
        }

        fn silence_clip(&self, bitrate: &BitrateId) -> RetimeResult<PathBuf> {
            self.silence.lookup(bitrate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn trim_args_use_zero_for_open_end() {
        let args = DelayCutTools::trim_args(Path::new("a.ac3"), Path::new("b.ac3"), 6167, None);
        assert_eq!(
            args,
            vec!["-i", "a.ac3", "-endcut", "0", "-startcut", "6167", "-o", "b.ac3"]
        );
    }

    #[test]
    fn trim_args_with_end() {
        let args =
            DelayCutTools::trim_args(Path::new("a.ac3"), Path::new("b.ac3"), 0, Some(4125));
        assert_eq!(args[3], "4125");
        assert_eq!(args[5], "0");
    }

    #[test]
    fn silence_lookup_reports_missing_clip() {
        let dir = tempdir().unwrap();
        let library = SilenceLibrary::new(dir.path());
        let bitrate = BitrateId::new("20_192");

        match library.lookup(&bitrate) {
            Err(RetimeError::MissingSilenceAsset { bitrate, path }) => {
                assert_eq!(bitrate, "20_192");
                assert!(path.ends_with("blank_20_192.ac3"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        fs::write(library.clip_path(&bitrate), b"silence").unwrap();
        assert!(library.lookup(&bitrate).is_ok());
    }

    #[test]
    fn concat_preserves_every_byte() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        fs::write(&a, b"lead-").unwrap();
        fs::write(&b, [0u8; 3]).unwrap();
        fs::write(&c, b"-tail").unwrap();

        let out = dir.path().join("out");
        concat_files(&[&a, &b, &c], &out).unwrap();

        let joined = fs::read(&out).unwrap();
        assert_eq!(joined.len(), 5 + 3 + 5);
        assert_eq!(&joined[..5], b"lead-");
        assert_eq!(&joined[5..8], &[0, 0, 0]);
        assert_eq!(&joined[8..], b"-tail");
    }

    #[test]
    fn validate_rejects_missing_executable() {
        let dir = tempdir().unwrap();
        let tools = DelayCutTools::new(
            dir.path().join("delaycut"),
            SilenceLibrary::new(dir.path()),
        );
        assert!(matches!(tools.validate(), Err(RetimeError::ToolNotFound(_))));
    }

    #[test]
    fn trim_with_missing_executable_is_tool_not_found() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.ac3");
        fs::write(&input, b"data").unwrap();
        let tools = DelayCutTools::new(
            dir.path().join("no-such-delaycut"),
            SilenceLibrary::new(dir.path()),
        );

        let result = tools.trim(&input, &dir.path().join("out.ac3"), 0, Some(10));
        assert!(matches!(result, Err(RetimeError::ToolNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn trim_reports_non_zero_exit() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.ac3");
        fs::write(&input, b"data").unwrap();
        let tools = DelayCutTools::new("/bin/false", SilenceLibrary::new(dir.path()));
        assert_eq!(tools.executable(), Path::new("/bin/false"));

        let result = tools.trim(&input, &dir.path().join("out.ac3"), 0, Some(10));
        match result {
            Err(RetimeError::ExternalToolFailed { tool, exit_code, .. }) => {
                assert_eq!(tool, "delaycut");
                assert_eq!(exit_code, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn trim_without_output_file_is_an_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.ac3");
        fs::write(&input, b"data").unwrap();
        let out = dir.path().join("out.ac3");
        let tools = DelayCutTools::new("/bin/true", SilenceLibrary::new(dir.path()));

        match tools.trim(&input, &out, 0, None) {
            Err(RetimeError::OutputMissing(path)) => assert_eq!(path, out),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn remove_if_exists_ignores_missing() {
        let dir = tempdir().unwrap();
        assert!(remove_if_exists(&dir.path().join("gone")).is_ok());
    }
}
