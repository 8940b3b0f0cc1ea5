//! The parts of a service account token Secret needed to reach a cluster.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::decode::{decode_base64, decode_base64_string};
use crate::error::{Error, Result};

pub const CA_CERT_KEY: &str = "ca.crt";
pub const TOKEN_KEY: &str = "token";

#[derive(Deserialize, Debug, Clone)]
pub struct ServiceAccountSecret {
    #[serde(default)]
    pub data: Option<BTreeMap<String, String>>,
}

impl ServiceAccountSecret {
    /// Parses a Secret manifest. JSON manifests are accepted as well as YAML.
    pub fn from_manifest(manifest: &str) -> Result<Self> {
        serde_yaml::from_str(manifest).map_err(Error::SecretManifest)
    }

    fn field(&self, key: &'static str) -> Result<&str> {
        let data = self.data.as_ref().ok_or(Error::MissingSecretField("data"))?;
        data.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or(Error::MissingSecretField(key))
    }

    /// The base64-encoded CA bundle, as stored in the Secret.
    pub fn ca_certificate(&self) -> Result<&str> {
        let ca = self.field(CA_CERT_KEY)?;
        decode_base64(CA_CERT_KEY, ca)?;
        Ok(ca)
    }

    pub fn token(&self) -> Result<String> {
        decode_base64_string(TOKEN_KEY, self.field(TOKEN_KEY)?)
    }
}
