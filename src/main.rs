fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    xmljs::install_fatal_handler();

    if let Err(e) = xmljs::run(std::env::args().skip(1)) {
        eprintln!("Host failed: {}", e);
        std::process::exit(1);
    }
}
