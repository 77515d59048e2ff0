use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use tf_version_inspect::config::{self, InspectConfig};
use tf_version_inspect::inspect::Inspector;
use tf_version_inspect::logging::{self, LogFormat};
use tf_version_inspect::version::diagnostics::TracingDiagnostics;

#[derive(Parser)]
#[command(name = "tf-version-inspect")]
#[command(
    version,
    about = "Inspects terraform project to determine the required terraform version",
    long_about = "Does the shallow terraform project parsing to provide the required version.\n\
                  The list of available versions is taken from https://releases.hashicorp.com/."
)]
struct Cli {
    /// Terraform project directory
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Only accept versions published as an image in this registry (e.g. docker.io)
    #[arg(short, long)]
    registry: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Accept prerelease versions whose core version satisfies the constraint
    #[arg(long)]
    prerelease: bool,

    /// Release index endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Number of releases requested per page
    #[arg(long)]
    page_limit: Option<usize>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/tf-version-inspect/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    /// Flags given on the command line take precedence over the file
    fn apply(&self, mut config: InspectConfig) -> InspectConfig {
        if let Some(registry) = &self.registry {
            config.image.registry = Some(registry.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.releases.endpoint = endpoint.clone();
        }
        if let Some(page_limit) = self.page_limit {
            config.releases.page_limit = page_limit;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = Some(timeout.saturating_mul(1000));
        }
        config.prerelease |= self.prerelease;
        config
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.apply(config::load_or_default(cli.config.as_deref())?);
    let inspector = Inspector::from_config(&config, Arc::new(TracingDiagnostics))?;

    let version = inspector.inspect(&cli.dir).await?;
    println!("{version}");
    Ok(())
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = logging::init(cli.debug, cli.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from([
            "tf-version-inspect",
            "--registry",
            "ghcr.io",
            "--page-limit",
            "5",
            "--timeout",
            "3",
            "--prerelease",
        ]);
        let file = InspectConfig {
            releases: config::ReleasesConfig {
                endpoint: "http://localhost:8080/releases".to_string(),
                page_limit: 50,
            },
            ..InspectConfig::default()
        };

        let config = cli.apply(file);

        assert_eq!(config.image.registry.as_deref(), Some("ghcr.io"));
        assert_eq!(config.releases.endpoint, "http://localhost:8080/releases");
        assert_eq!(config.releases.page_limit, 5);
        assert_eq!(config.timeout_ms, Some(3000));
        assert!(config.prerelease);
    }

    #[test]
    fn defaults_keep_file_values() {
        let cli = Cli::parse_from(["tf-version-inspect"]);
        let file = InspectConfig {
            prerelease: true,
            ..InspectConfig::default()
        };

        let config = cli.apply(file.clone());

        assert_eq!(config, file);
        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(cli.log_format, LogFormat::Text);
    }
}
