use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("Invalid {input}: {value:?} (expected one of: {expected})")]
    InvalidChoice {
        input: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{input} is not valid base64: {source}")]
    Base64 {
        input: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{input} does not decode to UTF-8 text: {source}")]
    Utf8 {
        input: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to parse k8s-secret manifest: {0}")]
    SecretManifest(#[source] serde_yaml::Error),

    #[error("{0} is missing in k8s-secret")]
    MissingSecretField(&'static str),

    #[error("Invalid kubeconfig: {0}")]
    Kubeconfig(#[source] serde_yaml::Error),

    #[error("Context {0:?} not found in kubeconfig")]
    UnknownContext(String),

    #[error("Failed to serialize kubeconfig: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
