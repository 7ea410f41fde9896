//! Invoke one sidecar tool and print its result
//!
//! Usage: call_tool <sidecar-binary> <tool-name> [json-arguments]

use serde_json::Value;
use sidelink::{SidecarConfig, SidecarLink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let program = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: call_tool <sidecar-binary> <tool-name> [json-arguments]"))?;
    let tool = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing tool name"))?;
    let arguments: Value = match args.next() {
        Some(raw) => serde_json::from_str(&raw)?,
        None => serde_json::json!({}),
    };

    let link = SidecarLink::connect(SidecarConfig::new(program)).await?;

    let result = link.call(tool.as_str(), arguments).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    link.close().await;
    Ok(())
}
