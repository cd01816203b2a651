use thiserror::Error;

/// Errors found while validating a service or instance manifest
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("API type '{0}' is declared by more than one glanceAPIs entry")]
    DuplicateApiType(String),

    #[error("API name '{0}' is used by more than one glanceAPIs entry")]
    DuplicateApiName(String),

    #[error("glanceAPIs entry '{name}' has type '{api_type}', expected one of Single, Split, Edge")]
    InvalidTemplateApiType { name: String, api_type: String },

    #[error("instance '{name}' has type '{api_type}', expected one of Single, Internal, External, Edge")]
    InvalidInstanceApiType { name: String, api_type: String },

    #[error("keystoneEndpoint '{0}' does not name any glanceAPIs entry")]
    UnknownKeystoneEndpoint(String),

    #[error("glanceAPIs entry has an empty name")]
    EmptyApiName,
}
