use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "hyper=info,tower_http=info,cartrade=info,api=info,web=info";

/// Installs the stderr subscriber. `RUST_LOG` directives are layered on top
/// of the defaults; unparsable ones are reported and skipped.
pub fn init_logging() {
    let mut env_filter = EnvFilter::new(DEFAULT_FILTER);
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        for directive in rust_log.split(',').filter(|s| !s.is_empty()) {
            match directive.parse::<Directive>() {
                Ok(parsed) => env_filter = env_filter.add_directive(parsed),
                Err(err) => eprintln!("Ignoring directive `{}`: {}", directive, err),
            }
        }
    }

    let _ = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
