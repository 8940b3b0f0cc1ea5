use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use kubegen::inputs::{self, InputSource};
use kubegen::runner::{self, Runner};
use kubegen::{generate, Credentials, EnvInputs, Layered};

/// Write a kubeconfig for later workflow steps and point KUBECONFIG at it.
///
/// Every option falls back to the matching action input (INPUT_<NAME>).
#[derive(Parser, Debug, Default)]
#[clap(version)]
struct Args {
    /// kubeconfig or service-account
    #[clap(long)]
    method: Option<String>,

    /// Contents of the kubeconfig to use
    #[clap(long)]
    kubeconfig: Option<String>,

    /// plaintext or base64
    #[clap(long)]
    kubeconfig_encoding: Option<String>,

    /// Context to make current in the supplied kubeconfig
    #[clap(long)]
    context: Option<String>,

    /// Cluster API server URL
    #[clap(long)]
    k8s_url: Option<String>,

    /// Base64-encoded service account Secret manifest
    #[clap(long)]
    k8s_secret: Option<String>,

    /// Where to write the kubeconfig [default: $RUNNER_TEMP/kubeconfig_<millis>]
    #[clap(short, long)]
    output: Option<PathBuf>,
}

impl InputSource for Args {
    fn input(&self, name: &str) -> Option<String> {
        let value = match name.to_lowercase().as_str() {
            inputs::METHOD => &self.method,
            inputs::KUBECONFIG => &self.kubeconfig,
            inputs::KUBECONFIG_ENCODING => &self.kubeconfig_encoding,
            inputs::CONTEXT => &self.context,
            inputs::K8S_URL => &self.k8s_url,
            inputs::K8S_SECRET => &self.k8s_secret,
            _ => return None,
        };
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }
}

/// Log level used when RUST_LOG is unset; runners set RUNNER_DEBUG=1 for debug logging.
fn default_level(runner_debug: Option<&str>) -> &'static str {
    match runner_debug {
        Some("1") => "debug",
        _ => "info",
    }
}

fn init_tracing() {
    let level = default_level(std::env::var("RUNNER_DEBUG").ok().as_deref());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let inputs = Layered {
        overrides: &args,
        base: EnvInputs,
    };

    let credentials = Credentials::from_inputs(&inputs).context("Reading action inputs")?;
    info!(method = ?credentials.method(), "Setting cluster context");

    let generated = generate(&credentials).context("Generating kubeconfig")?;

    let mut ci = Runner::from_env();
    for secret in &generated.secrets {
        ci.add_mask(secret)?;
    }

    let path = runner::kubeconfig_path(args.output.as_deref());
    runner::write_kubeconfig(&path, &generated.contents)?;
    info!(path = %path.display(), "Kubeconfig written");

    let path = path.to_string_lossy();
    ci.export_variable("KUBECONFIG", &path)
        .context("Exporting KUBECONFIG")?;
    debug!("KUBECONFIG environment variable set");
    ci.set_output("kubeconfig-path", &path)
        .context("Setting kubeconfig-path output")?;

    Ok(())
}
