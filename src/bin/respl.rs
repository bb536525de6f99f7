use respl::{cli, config, RespError};

fn init_tracing(debug: bool) {
    use tracing_subscriber::{
        filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt as _, Registry,
    };

    let fallback = if debug { "debug" } else { "warn" };

    // Logs go to stderr so replies on stdout stay clean.
    let filter = EnvFilter::try_from_env(config::env::LOG_DIRECTIVE)
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    Registry::default()
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_file(false)
                .with_line_number(false)
                .with_target(true),
        )
        .with(filter)
        .init();
}

fn main() {
    let command = cli::parse();

    init_tracing(command.debug);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .map_err(RespError::from)
        .and_then(|runtime| runtime.block_on(cli::run(command)));

    if let Err(err) = result {
        tracing::debug!("{:?}", err);

        match err {
            // Already rendered on stdout.
            RespError::ErrorReply(_) => (),
            _ => eprintln!("{}", err),
        }
        std::process::exit(1);
    }
}
