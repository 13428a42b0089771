//! AQT Modbus Demo
//!
//! Polls an AQT560 transmitter behind a serial-to-TCP gateway and prints
//! every parameter in the built-in register table, followed by one full
//! exchange transcript and the transport statistics.
//!
//! Usage: cargo run --bin demo [gateway_address]
//! Example: cargo run --bin demo 192.168.0.7:9001

use std::process;

use aqt_modbus::{registers, AqtSession, LinkConfig};

#[tokio::main]
async fn main() {
    println!("{}", aqt_modbus::info());
    println!("==============================\n");

    let mut config = LinkConfig::new();
    if let Some(addr) = std::env::args().nth(1) {
        match parse_address(&addr) {
            Some((host, port)) => {
                config = config.with_host(host).with_port(port);
            }
            None => {
                eprintln!("invalid address '{}', expected host:port", addr);
                process::exit(2);
            }
        }
    }

    let target = format!("{}:{}", config.host, config.port);
    println!("Connecting to {}...", target);

    let mut session = AqtSession::new(config);
    if !session.connect().await {
        eprintln!("Connection failed (is the gateway reachable?)");
        process::exit(1);
    }
    println!("Connected.\n");

    println!("Parameters:");
    let mut failures = 0usize;
    for (name, command) in registers::COMMANDS {
        match session.read_parameter(command).await {
            Ok(exchange) => println!("  {:<26} = {}", name, exchange.value),
            Err(e) => {
                println!("  {:<26} = <error: {}>", name, e);
                failures += 1;
            }
        }
    }

    // Show one full exchange for diagnostics.
    if let Some(uptime_cmd) = registers::command_for("Uptime (s, 32-bit)") {
        if let Ok(exchange) = session.read_parameter(uptime_cmd).await {
            println!("\nSample exchange:");
            for line in exchange.transcript().lines() {
                println!("  {}", line);
            }
        }
    }

    if let Some(stats) = session.stats() {
        println!("\nStatistics:");
        println!(
            "  {} parameters, {} failed",
            registers::COMMANDS.len(),
            failures
        );
        println!(
            "  Requests: {}, Responses: {}",
            stats.requests_sent, stats.responses_received
        );
        println!(
            "  Bytes sent: {}, received: {}",
            stats.bytes_sent, stats.bytes_received
        );
    }

    session.disconnect().await;
    println!("\nDone.");
}

fn parse_address(addr: &str) -> Option<(String, u16)> {
    let (host, port) = addr.rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }
    Some((host.to_string(), port.parse().ok()?))
}
