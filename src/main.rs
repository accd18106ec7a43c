use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    // stdout carries program output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let status = match ippcode_vm::run() {
        Ok(status) => status,
        Err(err) => {
            error!("{err:#}");
            ippcode_vm::error::exit_code(&err)
        }
    };

    std::process::exit(status);
}
