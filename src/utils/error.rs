use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Knowledge base error: {message}")]
    KnowledgeError { message: String },

    #[error("Artifact '{artifact}' error: {message}")]
    ArtifactError { artifact: String, message: String },

    #[error("Training error: {message}")]
    TrainingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Knowledge,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MatchError::IoError(_) => ErrorCategory::Io,
            MatchError::SerializationError(_) | MatchError::CsvError(_) => ErrorCategory::Data,
            MatchError::ConfigValidationError { .. }
            | MatchError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            MatchError::KnowledgeError { .. } => ErrorCategory::Knowledge,
            MatchError::ArtifactError { .. } | MatchError::TrainingError { .. } => {
                ErrorCategory::Model
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 模型檔案可以重新產生
            MatchError::ArtifactError { .. } => ErrorSeverity::Low,
            MatchError::IoError(_) | MatchError::CsvError(_) => ErrorSeverity::Medium,
            MatchError::SerializationError(_)
            | MatchError::ConfigValidationError { .. }
            | MatchError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            MatchError::KnowledgeError { .. } | MatchError::TrainingError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the file paths exist and are writable",
            ErrorCategory::Data => "Delete the corrupted file and run the command again",
            ErrorCategory::Configuration => {
                "Review the TOML configuration file and command-line flags"
            }
            ErrorCategory::Knowledge => {
                "Make sure the knowledge file lists every symptom and condition exactly once"
            }
            ErrorCategory::Model => "Remove the artifact directory to force the model to retrain",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MatchError::IoError(e) => format!("Could not access a file: {}", e),
            MatchError::SerializationError(_) => "A stored file could not be read".to_string(),
            MatchError::CsvError(e) => format!("Could not write the training corpus: {}", e),
            MatchError::ConfigValidationError { field, message } => {
                format!("Configuration problem in {}: {}", field, message)
            }
            MatchError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting {}: {}", field, reason)
            }
            MatchError::KnowledgeError { message } => {
                format!("The condition knowledge base is invalid: {}", message)
            }
            MatchError::ArtifactError { artifact, .. } => {
                format!("The stored model file '{}' is unusable", artifact)
            }
            MatchError::TrainingError { message } => {
                format!("The classifier could not be trained: {}", message)
            }
        }
    }

    /// Exit code used by the binaries when a run fails. Always nonzero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
