//! External transcode invocation.
//!
//! The transcode step shells out to an external ffmpeg binary with a
//! scale filter derived from the chosen [`Resolution`]. Success is
//! signaled by the process exit code *and* the existence of a non-empty
//! output file; there is no partial-output cleanup and no automatic
//! retry - a failure aborts that single import.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EncoderError, Error, Result};

/// Target resolution for a transcode, drawn from a fixed enumerated set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// 426x240.
    #[serde(rename = "240p")]
    P240,
    /// 640x360.
    #[serde(rename = "360p")]
    P360,
    /// 854x480.
    #[serde(rename = "480p")]
    P480,
    /// 1280x720.
    #[serde(rename = "720p")]
    P720,
    /// 1920x1080.
    #[serde(rename = "1080p")]
    P1080,
    /// 2560x1440.
    #[serde(rename = "1440p")]
    P1440,
}

impl Resolution {
    /// All resolutions, lowest first.
    pub const ALL: [Self; 6] = [
        Self::P240,
        Self::P360,
        Self::P480,
        Self::P720,
        Self::P1080,
        Self::P1440,
    ];

    /// The `W:H` pair passed to the encoder's scale filter.
    #[must_use]
    pub const fn scale(self) -> &'static str {
        match self {
            Self::P240 => "426:240",
            Self::P360 => "640:360",
            Self::P480 => "854:480",
            Self::P720 => "1280:720",
            Self::P1080 => "1920:1080",
            Self::P1440 => "2560:1440",
        }
    }

    /// Output width and height in pixels.
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::P240 => (426, 240),
            Self::P360 => (640, 360),
            Self::P480 => (854, 480),
            Self::P720 => (1280, 720),
            Self::P1080 => (1920, 1080),
            Self::P1440 => (2560, 1440),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::P240 => "240p",
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::P1440 => "1440p",
        };
        write!(f, "{label}")
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "240p" => Ok(Self::P240),
            "360p" => Ok(Self::P360),
            "480p" => Ok(Self::P480),
            "720p" => Ok(Self::P720),
            "1080p" => Ok(Self::P1080),
            "1440p" => Ok(Self::P1440),
            other => Err(Error::Configuration(format!(
                "Unknown resolution: {other}"
            ))),
        }
    }
}

/// Settings for the external encoder invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Encoder binary to invoke (name on PATH or absolute path).
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// x264 preset.
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Constant rate factor (lower = higher quality).
    #[serde(default = "default_crf")]
    pub crf: u8,
    /// Resolution offered first in the import flow.
    #[serde(default = "default_resolution")]
    pub default_resolution: Resolution,
}

fn default_binary() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_preset() -> String {
    "fast".to_string()
}

const fn default_crf() -> u8 {
    23
}

const fn default_resolution() -> Resolution {
    Resolution::P720
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            preset: default_preset(),
            crf: default_crf(),
            default_resolution: default_resolution(),
        }
    }
}

impl EncoderConfig {
    /// Use a specific encoder binary.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Use a specific x264 preset.
    #[must_use]
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }
}

/// A single transcode request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    /// Source file.
    pub input: PathBuf,
    /// Destination file. Overwritten if present.
    pub output: PathBuf,
    /// Target resolution.
    pub resolution: Resolution,
}

/// The result of a successful transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOutcome {
    /// Path of the produced file.
    pub output: PathBuf,
    /// Size of the produced file in bytes.
    pub size_bytes: u64,
}

/// Abstraction over the transcode step, mockable for tests.
#[cfg_attr(test, mockall::automock)]
pub trait VideoEncoder: Send + Sync {
    /// Transcode `request.input` into `request.output`.
    ///
    /// # Errors
    ///
    /// Returns an [`EncoderError`] when the binary is missing, the process
    /// exits non-zero, or no usable output is produced.
    fn encode(&self, request: &EncodeRequest) -> Result<EncodeOutcome>;
}

/// Production encoder shelling out to ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    /// Create an encoder with the given settings.
    #[must_use]
    pub const fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// The settings this encoder invokes the binary with.
    #[must_use]
    pub const fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Argument vector for a request:
    /// `-i IN -vf scale=W:H -c:v libx264 -preset P -crf N -c:a aac -y OUT`.
    fn build_args(&self, request: &EncodeRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(14);
        args.push("-i".into());
        args.push(request.input.as_os_str().to_os_string());
        args.push("-vf".into());
        args.push(format!("scale={}", request.resolution.scale()).into());
        args.push("-c:v".into());
        args.push("libx264".into());
        args.push("-preset".into());
        args.push(self.config.preset.as_str().into());
        args.push("-crf".into());
        args.push(self.config.crf.to_string().into());
        args.push("-c:a".into());
        args.push("aac".into());
        args.push("-y".into());
        args.push(request.output.as_os_str().to_os_string());
        args
    }

    fn verify_output(path: &Path) -> Result<u64> {
        match fs::metadata(path) {
            Ok(meta) if meta.len() > 0 => Ok(meta.len()),
            Ok(_) | Err(_) => Err(EncoderError::EmptyOutput {
                path: path.to_path_buf(),
            }
            .into()),
        }
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn encode(&self, request: &EncodeRequest) -> Result<EncodeOutcome> {
        if !request.input.is_file() {
            return Err(EncoderError::InputMissing {
                path: request.input.clone(),
            }
            .into());
        }

        let args = self.build_args(request);
        info!(
            "Transcoding {} -> {} at {}",
            request.input.display(),
            request.output.display(),
            request.resolution
        );
        debug!("Encoder args: {:?}", args);

        let output = Command::new(&self.config.binary)
            .args(&args)
            .output()
            .map_err(|e| -> Error {
                if e.kind() == io::ErrorKind::NotFound {
                    EncoderError::BinaryNotFound {
                        binary: self.config.binary.clone(),
                    }
                    .into()
                } else {
                    Error::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                "Encoder exited with {:?} for {}",
                output.status.code(),
                request.input.display()
            );
            return Err(EncoderError::ExitFailure {
                code: output.status.code(),
                stderr,
            }
            .into());
        }

        let size_bytes = Self::verify_output(&request.output)?;
        info!(
            "Transcode complete: {} ({} bytes)",
            request.output.display(),
            size_bytes
        );
        Ok(EncodeOutcome {
            output: request.output.clone(),
            size_bytes,
        })
    }
}
