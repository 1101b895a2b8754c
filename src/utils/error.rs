use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurvivalError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load model from {path}: {message}")]
    ModelLoadError { path: String, message: String },

    #[error("Model artifact is invalid: {message}")]
    ModelFormatError { message: String },

    #[error("Unrecognized {field} label: '{value}'")]
    UnknownLabelError { field: String, value: String },

    #[error("Inference failed: {message}")]
    InferenceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Model,
    Request,
    Inference,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SurvivalError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SurvivalError::IoError(_) => ErrorCategory::System,
            SurvivalError::SerializationError(_) => ErrorCategory::Model,
            SurvivalError::ConfigError { .. }
            | SurvivalError::ConfigValidationError { .. }
            | SurvivalError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SurvivalError::ModelLoadError { .. } | SurvivalError::ModelFormatError { .. } => {
                ErrorCategory::Model
            }
            SurvivalError::UnknownLabelError { .. } => ErrorCategory::Request,
            SurvivalError::InferenceError { .. } => ErrorCategory::Inference,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request => ErrorSeverity::Low,
            ErrorCategory::Inference => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Model | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SurvivalError::IoError(_) => "Check that the file exists and is readable",
            SurvivalError::SerializationError(_) | SurvivalError::ModelFormatError { .. } => {
                "Re-export the model artifact and make sure it matches the expected JSON layout"
            }
            SurvivalError::ConfigError { .. } => "Check the TOML syntax of the configuration file",
            SurvivalError::ConfigValidationError { .. }
            | SurvivalError::InvalidConfigValueError { .. } => {
                "Fix the reported configuration field and restart the service"
            }
            SurvivalError::ModelLoadError { .. } => {
                "Verify model.path in the configuration points to the trained artifact"
            }
            SurvivalError::UnknownLabelError { .. } => {
                "Send one of the documented Pclass / Sex labels"
            }
            SurvivalError::InferenceError { .. } => {
                "Inspect the input features; the model produced no usable score"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Model => format!("Model unavailable: {}", self),
            ErrorCategory::Request => format!("Invalid request: {}", self),
            ErrorCategory::Inference => format!("Prediction failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 程序結束碼，依嚴重程度決定
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SurvivalError>;
