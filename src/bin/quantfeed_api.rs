use quantfeed::config::Config;

#[tokio::main]
async fn main() {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
    quantfeed::app::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let (config_path, addr_override) = parse_args(&args).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(1);
    });

    let config = Config::load(&config_path).unwrap_or_else(|err| {
        eprintln!("error: {}", err.message);
        std::process::exit(1);
    });

    let addr = addr_override
        .or_else(|| std::env::var("QUANTFEED_API_ADDR").ok())
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

    quantfeed::app::metrics::init_start_time();
    if let Err(err) = quantfeed::app::api_server::run(&addr, config).await {
        eprintln!("error: {}", err.message);
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<(String, Option<String>), String> {
    let mut config_path = "config.toml".to_string();
    let mut addr = None;

    let mut index = 1;
    while index < args.len() {
        match args[index].as_str() {
            "--config" | "-c" => {
                let value = args.get(index + 1).ok_or("missing value for --config")?;
                config_path = value.to_string();
                index += 2;
            }
            "--addr" => {
                let value = args.get(index + 1).ok_or("missing value for --addr")?;
                addr = Some(value.to_string());
                index += 2;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            unknown => {
                return Err(format!("unknown argument: {unknown}"));
            }
        }
    }

    Ok((config_path, addr))
}

fn print_usage() {
    println!("usage: quantfeed_api [--config <path>] [--addr <host:port>]");
    println!("  -c, --config   Path to config.toml (default: config.toml)");
    println!("      --addr     Bind address (default: server.host:server.port or QUANTFEED_API_ADDR)");
}
