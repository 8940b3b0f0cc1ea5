use serde::*;

// region: Context
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContextSpec {
    pub cluster: String,
    pub user: String,
}
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Context {
    pub name: String,
    pub context: ContextSpec,
}
// endregion

// region: Cluster
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
    pub server: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Cluster {
    pub name: String,
    pub cluster: ClusterSpec,
}
// endregion

// region: User
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserSpec {
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub name: String,
    pub user: UserSpec,
}
// endregion

// region: Common
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    #[serde(rename = "v1")]
    V1,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Config,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct KubeConfig {
    #[serde(rename = "apiVersion")]
    pub api_version: ApiVersion,
    pub kind: Kind,
    pub clusters: Vec<Cluster>,
    pub users: Vec<User>,
    pub contexts: Vec<Context>,
    pub current_context: String,
    pub preferences: serde_json::Map<String, serde_json::Value>,
}

pub const CLUSTER_NAME: &str = "default";
pub const USER_NAME: &str = "default-user";
pub const CONTEXT_NAME: &str = "loaded-context";

impl KubeConfig {
    /// A single-cluster config that authenticates with a bearer token.
    pub fn for_token(server: &str, certificate_authority_data: &str, token: &str) -> Self {
        KubeConfig {
            api_version: ApiVersion::V1,
            kind: Kind::Config,
            clusters: vec![Cluster {
                name: CLUSTER_NAME.to_owned(),
                cluster: ClusterSpec {
                    certificate_authority_data: Some(certificate_authority_data.to_owned()),
                    insecure_skip_tls_verify: false,
                    server: server.to_owned(),
                },
            }],
            users: vec![User {
                name: USER_NAME.to_owned(),
                user: UserSpec {
                    token: token.to_owned(),
                },
            }],
            contexts: vec![Context {
                name: CONTEXT_NAME.to_owned(),
                context: ContextSpec {
                    cluster: CLUSTER_NAME.to_owned(),
                    user: USER_NAME.to_owned(),
                },
            }],
            current_context: CONTEXT_NAME.to_owned(),
            preferences: Default::default(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
// endregion
