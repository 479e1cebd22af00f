use clap::Parser;
use serde_json::json;

use client_ip_telemetry::{ClientIpResolver, RequestSnapshot, ResolverConfig};

#[derive(Parser)]
#[command(name = "resolve-ip")]
#[command(about = "Resolve a client IP from request headers, offline", long_about = None)]
struct Cli {
    /// Request header as "Name: value". Repeatable.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Transport peer address used as fallback.
    #[arg(short, long)]
    remote: Option<String>,

    /// Header to inspect, in priority order. Repeatable. Defaults to X-Forwarded-For.
    #[arg(short = 'n', long = "header-name")]
    header_names: Vec<String>,

    /// Separator characters for multi-valued headers.
    #[arg(short, long, default_value = ",")]
    separators: String,

    /// Use the last address in a header instead of the first.
    #[arg(long)]
    last: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got {:?}", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty".to_string());
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ResolverConfig::new()
        .with_header_value_separators(&cli.separators)
        .with_use_first_ip(!cli.last);
    if !cli.header_names.is_empty() {
        config.set_header_names(cli.header_names);
    }

    let mut request = RequestSnapshot::new();
    for (name, value) in cli.headers {
        request = request.with_header(name, value);
    }
    if let Some(remote) = cli.remote {
        request = request.with_remote_addr(remote);
    }

    let resolved = ClientIpResolver::new(config).resolve_detailed(&request);
    let output = match resolved {
        Some(r) => json!({ "ip": r.ip, "source": r.source }),
        None => json!({ "ip": null, "source": null }),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
