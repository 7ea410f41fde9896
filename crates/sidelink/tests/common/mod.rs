//! Scripted stand-in sidecars for integration tests
//!
//! Instead of depending on a real sidecar binary, each test spawns `sh` with
//! a small script that speaks just enough of the protocol for the scenario
//! at hand. The scripts pull the correlation id out of the request line with
//! plain parameter expansion, so replies carry whatever id the client chose.

use std::time::Duration;

use sidelink::SidecarConfig;

/// Spawn configuration for an inline shell script acting as the sidecar
pub fn sh_sidecar(script: &str) -> SidecarConfig {
    SidecarConfig::new("sh")
        .with_arg("-c")
        .with_arg(script)
        .with_call_timeout(Duration::from_secs(5))
        .with_shutdown_grace(Duration::from_millis(500))
}

/// A sidecar that answers every request with `{"id":...,"result":[{"pid":1}]}`
pub const REPLY_PID_LIST: &str = r#"
while read -r line; do
  id=${line#*\"id\":\"}
  id=${id%%\"*}
  printf '{"id":"%s","result":[{"pid":1}]}\n' "$id"
done
"#;

/// A sidecar that answers every request with an error payload
pub const REPLY_ERROR: &str = r#"
while read -r line; do
  id=${line#*\"id\":\"}
  id=${id%%\"*}
  printf '{"id":"%s","error":{"message":"tool exploded"}}\n' "$id"
done
"#;

/// A sidecar that echoes the requested tool name back as the result
///
/// Reads two requests before answering either, then replies in reverse
/// order, so correlation cannot lean on send order.
pub const REPLY_REVERSED: &str = r#"
read -r first
read -r second
reply() {
  id=${1#*\"id\":\"}; id=${id%%\"*}
  name=${1#*\"name\":\"}; name=${name%%\"*}
  printf '{"id":"%s","result":"%s"}\n' "$id" "$name"
}
reply "$second"
reply "$first"
"#;

/// A sidecar that emits a notification before answering the first request
pub const NOTIFY_THEN_REPLY: &str = r#"
read -r line
id=${line#*\"id\":\"}
id=${id%%\"*}
printf '{"method":"terminal/output","params":{"data":"hi"}}\n'
printf '{"id":"%s","result":"ok"}\n' "$id"
cat >/dev/null
"#;

/// A sidecar that answers the first request only after a one-second nap
///
/// Every later request is answered immediately with its ordinal, so a test
/// can confirm the link survived the straggler.
pub const SLOW_FIRST_REPLY: &str = r#"
n=0
while read -r line; do
  id=${line#*\"id\":\"}
  id=${id%%\"*}
  n=$((n+1))
  if [ "$n" = 1 ]; then sleep 1; fi
  printf '{"id":"%s","result":%d}\n' "$id" "$n"
done
"#;

/// A sidecar that reads one request and dies without answering
pub const EXIT_MID_CALL: &str = r#"
read -r line
exit 7
"#;
