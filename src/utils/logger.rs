use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// The binaries log under their own targets, next to the library's.
fn cli_directives(verbose: bool) -> &'static str {
    if verbose {
        "leap_year_etl=debug,toml_etl=debug,info"
    } else {
        "leap_year_etl=info,toml_etl=info,warn"
    }
}

fn json_directives(verbose: bool) -> &'static str {
    if verbose {
        "leap_year_etl=debug,leap_web=debug,tower_http=debug,info"
    } else {
        "leap_year_etl=info,leap_web=info,tower_http=info,warn"
    }
}

fn env_or(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_or(cli_directives(verbose)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON lines for the web server, where logs are usually shipped elsewhere.
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_or(json_directives(verbose)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
