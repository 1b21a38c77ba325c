use kfcreds_common::{prelude::*, tracing_support::initialize_tracing};
use structopt::StructOpt;

mod cmd;
mod description;
mod inputs;

/// Command-line options, parsed using `structopt`.
#[derive(Debug, StructOpt)]
#[structopt(about = "Inject storage credentials from a service account into a pod.")]
enum Opt {
    /// Add credential volumes, mounts and environment variables to a pod
    /// spec, and print the result as YAML.
    #[structopt(name = "inject")]
    Inject {
        #[structopt(flatten)]
        source: cmd::SourceOpt,

        /// The container to modify (defaults to the first one).
        #[structopt(long = "container")]
        container: Option<String>,

        /// Path to a JSON or YAML pod spec.
        #[structopt(parse(from_os_str))]
        pod_spec: std::path::PathBuf,
    },

    /// Show which credential provider each of a service account's secrets
    /// belongs to.
    #[structopt(name = "classify")]
    Classify {
        #[structopt(flatten)]
        source: cmd::SourceOpt,
    },
}

fn run() -> Result<()> {
    initialize_tracing();
    let opt = Opt::from_args();
    debug!("Args: {:?}", opt);

    match opt {
        Opt::Inject {
            ref source,
            ref container,
            ref pod_spec,
        } => cmd::inject::run(source, container.as_deref(), pod_spec),
        Opt::Classify { ref source } => cmd::classify::run(source),
    }
}

kfcreds_common::quick_main!(run);
