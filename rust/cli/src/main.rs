use pokerfelt_client::logging::{LogFormat, init_logging};

fn main() {
    let format = match std::env::var("POKERFELT_LOG_FORMAT") {
        Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Text,
    };
    if let Err(e) = init_logging(format) {
        eprintln!("WARNING: logging not initialized: {}", e);
    }

    let code = pokerfelt_cli::run(
        std::env::args(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    );
    std::process::exit(code);
}
