//! Unified file reading strategies
//!
//! Documents are rewritten in place, so content is never truncated. Provides
//! consistent handling for:
//! - Non-UTF-8 files
//! - Oversized files
//! - Binary files

use std::fs;
use std::path::Path;

use crate::core::model::ItemError;

/// Default maximum file size in bytes (64 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Bytes inspected for NUL when detecting binary content
const BINARY_CHECK_LEN: usize = 8192;

/// Strategy for handling non-UTF-8 content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingStrategy {
    /// Skip non-UTF-8 files entirely
    #[default]
    Skip,
    /// Use lossy conversion; only safe when the content is not written back
    Lossy,
}

/// Configuration for file reading
#[derive(Debug, Clone)]
pub struct FileReadConfig {
    /// Files larger than this are skipped
    pub max_file_size: u64,

    /// How to handle non-UTF-8 content
    pub encoding_strategy: EncodingStrategy,
}

impl Default for FileReadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            encoding_strategy: EncodingStrategy::Skip,
        }
    }
}

impl FileReadConfig {
    /// Config for read-only inspection (lint)
    pub fn read_only() -> Self {
        Self {
            encoding_strategy: EncodingStrategy::Lossy,
            ..Default::default()
        }
    }
}

/// Warning codes for file operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    /// File was skipped due to size
    FileSkippedSize,
    /// File was skipped due to encoding
    FileSkippedEncoding,
    /// Lossy encoding conversion used
    LossyConversion,
    /// File appears to be binary
    BinaryFile,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::FileSkippedSize => "FILE_SKIPPED_SIZE",
            WarningCode::FileSkippedEncoding => "FILE_SKIPPED_ENCODING",
            WarningCode::LossyConversion => "LOSSY_CONVERSION",
            WarningCode::BinaryFile => "BINARY_FILE",
        }
    }
}

/// A structured warning
#[derive(Debug, Clone)]
pub struct FileWarning {
    pub code: WarningCode,
    pub message: String,
}

impl FileWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Convert to an issue for embedding in ResultItem
    pub fn to_item_error(&self) -> ItemError {
        ItemError::warning(self.code.as_str(), &self.message)
    }
}

/// Result of reading a file
#[derive(Debug, Clone)]
pub struct FileReadResult {
    /// The file content (if successfully read)
    pub content: Option<String>,

    /// File size in bytes, when metadata was readable
    pub size: Option<u64>,

    /// Whether lossy conversion was used
    pub lossy_conversion: bool,

    /// Warnings generated during reading
    pub warnings: Vec<FileWarning>,

    /// Reason for skipping (if skipped)
    pub skip_reason: Option<String>,
}

impl FileReadResult {
    fn success(content: String, size: u64) -> Self {
        Self {
            content: Some(content),
            size: Some(size),
            lossy_conversion: false,
            warnings: Vec::new(),
            skip_reason: None,
        }
    }

    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            content: None,
            size: None,
            lossy_conversion: false,
            warnings: Vec::new(),
            skip_reason: Some(reason.into()),
        }
    }

    fn with_warning(mut self, warning: FileWarning) -> Self {
        self.warnings.push(warning);
        self
    }

}

/// Read a file with the given configuration
pub fn read_file_with_config(path: &Path, config: &FileReadConfig) -> FileReadResult {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => return FileReadResult::skipped(format!("cannot read metadata: {}", e)),
    };

    let file_size = metadata.len();
    if file_size > config.max_file_size {
        let message = format!(
            "file exceeds size limit ({} > {} bytes)",
            file_size, config.max_file_size
        );
        return FileReadResult::skipped(message.clone())
            .with_warning(FileWarning::new(WarningCode::FileSkippedSize, message));
    }

    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => return FileReadResult::skipped(format!("cannot read file: {}", e)),
    };

    let check_len = std::cmp::min(BINARY_CHECK_LEN, bytes.len());
    if bytes[..check_len].contains(&0) {
        return FileReadResult::skipped("binary file").with_warning(FileWarning::new(
            WarningCode::BinaryFile,
            "file appears to be binary (contains null bytes)",
        ));
    }

    match String::from_utf8(bytes) {
        Ok(content) => FileReadResult::success(content, file_size),
        Err(err) => match config.encoding_strategy {
            EncodingStrategy::Skip => FileReadResult::skipped("invalid UTF-8").with_warning(
                FileWarning::new(
                    WarningCode::FileSkippedEncoding,
                    "file contains invalid UTF-8 sequences",
                ),
            ),
            EncodingStrategy::Lossy => {
                let content = String::from_utf8_lossy(err.as_bytes()).into_owned();
                let mut result = FileReadResult::success(content, file_size).with_warning(
                    FileWarning::new(
                        WarningCode::LossyConversion,
                        "lossy UTF-8 conversion applied (some characters replaced)",
                    ),
                );
                result.lossy_conversion = true;
                result
            }
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_file_read_config_default() {
        let config = FileReadConfig::default();
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.encoding_strategy, EncodingStrategy::Skip);
        assert_eq!(FileReadConfig::read_only().encoding_strategy, EncodingStrategy::Lossy);
    }

    #[test]
    fn test_read_file_success() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("index.html");
        fs::write(&file_path, "<h2>Hello</h2>").unwrap();

        let result = read_file_with_config(&file_path, &FileReadConfig::default());
        assert!(result.content.is_some());
        assert_eq!(result.content, Some("<h2>Hello</h2>".to_string()));
        assert_eq!(result.size, Some(14));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_large_file_is_read_whole() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("big.html");
        let content = "<p>x</p>".repeat(20_000);
        fs::write(&file_path, &content).unwrap();

        let result = read_file_with_config(&file_path, &FileReadConfig::default());
        assert_eq!(result.content.map(|c| c.len()), Some(content.len()));
    }

    #[test]
    fn test_read_file_skip_size() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("index.html");
        fs::write(&file_path, "<h2>Hello</h2>").unwrap();

        let config = FileReadConfig {
            max_file_size: 1,
            ..Default::default()
        };

        let result = read_file_with_config(&file_path, &config);
        assert!(result.content.is_none());
        assert_eq!(result.warnings[0].code, WarningCode::FileSkippedSize);
    }

    #[test]
    fn test_read_file_binary() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("binary.html");

        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(&[0x3C, 0x00, 0x01, 0x02]).unwrap();

        let result = read_file_with_config(&file_path, &FileReadConfig::read_only());
        assert!(result.content.is_none());
        assert_eq!(result.warnings[0].code, WarningCode::BinaryFile);
    }

    #[test]
    fn test_read_file_skip_encoding() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("latin1.html");
        fs::write(&file_path, [0x3C, 0x68, 0x32, 0x3E, 0xE9, 0x3C]).unwrap();

        let result = read_file_with_config(&file_path, &FileReadConfig::default());
        assert!(result.content.is_none());
        assert_eq!(result.skip_reason.as_deref(), Some("invalid UTF-8"));
        assert_eq!(result.warnings[0].code.as_str(), "FILE_SKIPPED_ENCODING");
    }

    #[test]
    fn test_read_file_lossy_conversion() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("latin1.html");
        fs::write(&file_path, [0x3C, 0x68, 0x32, 0x3E, 0xE9, 0x3C]).unwrap();

        let result = read_file_with_config(&file_path, &FileReadConfig::read_only());
        assert!(result.content.is_some());
        assert!(result.lossy_conversion);
        assert!(result.content.unwrap().starts_with("<h2>"));
        assert_eq!(result.warnings[0].to_item_error().code, "LOSSY_CONVERSION");
    }

    #[test]
    fn test_read_nonexistent_file() {
        let result = read_file_with_config(Path::new("/nonexistent/file.html"), &FileReadConfig::default());
        assert!(result.content.is_none());
        assert!(result.skip_reason.unwrap().contains("cannot read metadata"));
    }
}
