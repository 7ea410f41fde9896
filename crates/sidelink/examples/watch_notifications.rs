//! Subscribe to a notification method and print events as they arrive
//!
//! Usage: watch_notifications <sidecar-binary> <method> [seconds]

use std::time::Duration;

use sidelink::{SidecarConfig, SidecarLink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let program = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: watch_notifications <sidecar-binary> <method> [seconds]"))?;
    let method = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing method name"))?;
    let seconds: u64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 30,
    };

    let link = SidecarLink::connect(SidecarConfig::new(program)).await?;

    let watched = method.clone();
    let _sub = link.subscribe(method.as_str(), move |params| {
        println!("{}: {}", watched, params);
    });

    println!("watching {:?} for {}s...", method, seconds);
    tokio::time::sleep(Duration::from_secs(seconds)).await;

    link.close().await;
    Ok(())
}
