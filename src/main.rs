fn main() {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
    quantfeed::app::logging::init();
    if let Err(err) = quantfeed::app::cli::run() {
        eprintln!("error: {}", err.message);
        std::process::exit(1);
    }
}
