use std::{io, process::ExitCode};

use tracing_subscriber::EnvFilter;
use vktut::{Entry, tutorial};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let entry = Entry::linked();
    let config = tutorial::TutorialConfig::new("vulkan-tut02");

    let mut out = io::stdout().lock();
    let result = tutorial::queue_families(&entry, &config, &mut out);

    tutorial::finish(result)
}
