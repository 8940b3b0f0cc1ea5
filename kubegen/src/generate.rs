use serde_yaml::Value as YamlValue;
use tracing::{debug, info};

use crate::decode::decode_base64_string;
use crate::error::{Error, Result};
use crate::inputs::{Credentials, Encoding, KUBECONFIG, K8S_SECRET};
use crate::kubeconfig::KubeConfig;
use crate::secret::ServiceAccountSecret;

/// A kubeconfig ready to be written, plus any credentials in it that should
/// be kept out of logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub contents: String,
    pub secrets: Vec<String>,
}

pub fn generate(credentials: &Credentials) -> Result<Generated> {
    match credentials {
        Credentials::Kubeconfig {
            kubeconfig,
            encoding,
            context,
        } => {
            let kubeconfig = match encoding {
                Encoding::Plaintext => kubeconfig.clone(),
                Encoding::Base64 => decode_base64_string(KUBECONFIG, kubeconfig)?,
            };
            let contents = match context {
                Some(context) => set_current_context(&kubeconfig, context)?,
                None => kubeconfig,
            };
            info!(?encoding, "Using supplied kubeconfig");
            Ok(Generated {
                contents,
                secrets: Vec::new(),
            })
        }
        Credentials::ServiceAccount { server, secret } => {
            let manifest = decode_base64_string(K8S_SECRET, secret)?;
            let secret = ServiceAccountSecret::from_manifest(&manifest)?;
            let ca = secret.ca_certificate()?;
            let token = secret.token()?;

            let contents = KubeConfig::for_token(server, ca, &token).to_json()?;
            info!(%server, "Generated kubeconfig from service account secret");
            Ok(Generated {
                contents,
                secrets: vec![token],
            })
        }
    }
}

/// Point `current-context` at `context`, which must name one of the
/// kubeconfig's contexts. Everything else in the document is preserved.
pub fn set_current_context(kubeconfig: &str, context: &str) -> Result<String> {
    let mut doc: YamlValue = serde_yaml::from_str(kubeconfig).map_err(Error::Kubeconfig)?;

    let known = doc
        .get("contexts")
        .and_then(YamlValue::as_sequence)
        .map(|contexts| {
            contexts
                .iter()
                .any(|ctx| ctx.get("name").and_then(YamlValue::as_str) == Some(context))
        })
        .unwrap_or(false);
    if !known {
        return Err(Error::UnknownContext(context.to_owned()));
    }

    let Some(map) = doc.as_mapping_mut() else {
        return Err(Error::UnknownContext(context.to_owned()));
    };
    map.insert(
        YamlValue::from("current-context"),
        YamlValue::from(context),
    );
    debug!(context, "Set current context");

    serde_yaml::to_string(&doc).map_err(Error::Kubeconfig)
}
