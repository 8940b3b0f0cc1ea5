//! Action inputs and the credentials they describe.
//!
//! CI runners hand action inputs to a process as `INPUT_<NAME>` environment
//! variables. [`EnvInputs`] reads them the same way the runner toolkits do:
//! the name is upper-cased, spaces become underscores, the value is trimmed
//! and an empty value counts as unset.

use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};

pub const METHOD: &str = "method";
pub const KUBECONFIG: &str = "kubeconfig";
pub const KUBECONFIG_ENCODING: &str = "kubeconfig-encoding";
pub const CONTEXT: &str = "context";
pub const K8S_URL: &str = "k8s-url";
pub const K8S_SECRET: &str = "k8s-secret";

/// Somewhere named inputs can be looked up.
pub trait InputSource {
    /// Returns the trimmed value of `name`, or `None` if it is unset or blank.
    fn input(&self, name: &str) -> Option<String>;

    /// Like [`InputSource::input`], but a missing value is an error.
    fn required(&self, name: &'static str) -> Result<String> {
        self.input(name).ok_or(Error::MissingInput(name))
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Inputs read from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvInputs;

impl EnvInputs {
    pub fn var_name(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }
}

impl InputSource for EnvInputs {
    fn input(&self, name: &str) -> Option<String> {
        env::var(Self::var_name(name))
            .ok()
            .and_then(|value| non_blank(&value))
    }
}

impl InputSource for BTreeMap<String, String> {
    fn input(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| non_blank(value))
    }
}

impl<T: InputSource + ?Sized> InputSource for &T {
    fn input(&self, name: &str) -> Option<String> {
        (**self).input(name)
    }
}

/// Looks inputs up in `overrides` first and falls back to `base`.
#[derive(Debug, Clone)]
pub struct Layered<O, B> {
    pub overrides: O,
    pub base: B,
}

impl<O: InputSource, B: InputSource> InputSource for Layered<O, B> {
    fn input(&self, name: &str) -> Option<String> {
        self.overrides
            .input(name)
            .or_else(|| self.base.input(name))
    }
}

// region: Choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Kubeconfig,
    ServiceAccount,
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kubeconfig" => Ok(Method::Kubeconfig),
            "service-account" => Ok(Method::ServiceAccount),
            _ => Err(Error::InvalidChoice {
                input: METHOD,
                value: s.to_owned(),
                expected: "kubeconfig, service-account",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Plaintext,
    Base64,
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "plaintext" => Ok(Encoding::Plaintext),
            "base64" => Ok(Encoding::Base64),
            _ => Err(Error::InvalidChoice {
                input: KUBECONFIG_ENCODING,
                value: s.to_owned(),
                expected: "plaintext, base64",
            }),
        }
    }
}
// endregion

/// Everything needed to produce a kubeconfig, validated for presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Kubeconfig {
        kubeconfig: String,
        encoding: Encoding,
        context: Option<String>,
    },
    ServiceAccount {
        server: String,
        secret: String,
    },
}

impl Credentials {
    pub fn from_inputs(inputs: &impl InputSource) -> Result<Self> {
        let method = inputs
            .input(METHOD)
            .map(|m| m.parse())
            .transpose()?
            .unwrap_or_default();
        debug!(?method, "Resolved credential method");

        match method {
            Method::Kubeconfig => Ok(Credentials::Kubeconfig {
                kubeconfig: inputs.required(KUBECONFIG)?,
                encoding: inputs
                    .input(KUBECONFIG_ENCODING)
                    .map(|e| e.parse())
                    .transpose()?
                    .unwrap_or_default(),
                context: inputs.input(CONTEXT),
            }),
            Method::ServiceAccount => Ok(Credentials::ServiceAccount {
                server: inputs.required(K8S_URL)?,
                secret: inputs.required(K8S_SECRET)?,
            }),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Credentials::Kubeconfig { .. } => Method::Kubeconfig,
            Credentials::ServiceAccount { .. } => Method::ServiceAccount,
        }
    }
}
