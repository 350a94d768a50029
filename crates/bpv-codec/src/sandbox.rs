//! # Codec Sandbox
//!
//! Runs a profile's embedded JavaScript codec in an isolated interpreter.
//!
//! ## Isolation
//!
//! Every call gets a fresh `boa_engine::Context` on its own worker thread,
//! so no state survives from one call to the next. The context has no
//! host bindings: no filesystem, network, module loader or timers. A
//! prelude removes `eval` and installs a `console` whose methods do
//! nothing.
//!
//! ## Limits
//!
//! The interpreter's loop-iteration and recursion limits come from
//! [`SandboxConfig`]. The caller additionally waits at most
//! `timeout` for the worker; a worker that overruns is abandoned and
//! stops on its own once it hits the loop limit.
//!
//! The loop limit does not bound work done inside a single built-in call,
//! such as a backtracking regular expression. A worker stuck there keeps
//! its thread (and its stack) until it finishes or the process exits.
//! Each timed-out call is logged at `warn`.
//!
//! ## Data exchange
//!
//! Inputs are embedded in the call as JSON literals and results come back
//! through `JSON.stringify`, so only JSON-representable data crosses the
//! boundary in either direction.

use std::sync::mpsc;
use std::time::Duration;

use boa_engine::{Context, Source};
use bpv_core::{json_type_name, ValidatorConfig, DECODE_ENTRY_POINT, ENCODE_ENTRY_POINT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SandboxError;

const PRELUDE: &str = r#"
globalThis.eval = undefined;
var console = (function () {
  var noop = function () {};
  return { log: noop, info: noop, warn: noop, error: noop, debug: noop, trace: noop };
})();
"#;

const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Limits applied to every codec call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Wall-clock budget per call.
    pub timeout: Duration,
    /// Interpreter loop iteration limit.
    pub loop_iteration_limit: u64,
    /// Interpreter recursion depth limit.
    pub recursion_limit: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::from(&ValidatorConfig::default())
    }
}

impl From<&ValidatorConfig> for SandboxConfig {
    fn from(config: &ValidatorConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.codec_timeout_ms),
            loop_iteration_limit: config.loop_iteration_limit,
            recursion_limit: config.recursion_limit,
        }
    }
}

/// Argument passed to `decodeUplink`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UplinkInput {
    pub bytes: Vec<u8>,
    #[serde(rename = "fPort")]
    pub f_port: u8,
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl UplinkInput {
    pub fn new(bytes: Vec<u8>, f_port: u8) -> Self {
        Self {
            bytes,
            f_port,
            variables: Map::new(),
        }
    }
}

/// Argument passed to `encodeDownlink`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownlinkInput {
    pub data: Value,
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl DownlinkInput {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            variables: Map::new(),
        }
    }
}

/// Which entry points a codec defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodecInspection {
    pub has_decode: bool,
    pub has_encode: bool,
}

/// Executes codec scripts under [`SandboxConfig`] limits.
#[derive(Debug, Clone, Default)]
pub struct CodecSandbox {
    config: SandboxConfig,
}

impl CodecSandbox {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Load the codec and report which entry points it defines.
    pub fn inspect(&self, source: &str) -> Result<CodecInspection, SandboxError> {
        let call = format!(
            "JSON.stringify({{ ok: {{ hasDecode: typeof {DECODE_ENTRY_POINT} === \"function\", \
             hasEncode: typeof {ENCODE_ENTRY_POINT} === \"function\" }} }})"
        );
        let value = self.run(source, call)?;
        serde_json::from_value(value)
            .map_err(|e| SandboxError::InvalidOutput(format!("inspection failed: {e}")))
    }

    /// Run `decodeUplink` on one uplink. The result must be an array.
    pub fn decode(&self, source: &str, input: &UplinkInput) -> Result<Vec<Value>, SandboxError> {
        let call = guarded_call(DECODE_ENTRY_POINT, &serde_json::to_string(input)?);
        match self.run(source, call)? {
            Value::Array(records) => Ok(records),
            other => Err(SandboxError::InvalidOutput(format!(
                "{DECODE_ENTRY_POINT} must return an array, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Run `encodeDownlink`. The result must be an array of byte values.
    pub fn encode(&self, source: &str, input: &DownlinkInput) -> Result<Vec<u8>, SandboxError> {
        let call = guarded_call(ENCODE_ENTRY_POINT, &serde_json::to_string(input)?);
        let items = match self.run(source, call)? {
            Value::Array(items) => items,
            other => {
                return Err(SandboxError::InvalidOutput(format!(
                    "{ENCODE_ENTRY_POINT} must return an array of bytes, got {}",
                    json_type_name(&other)
                )))
            }
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| {
                        SandboxError::InvalidOutput(format!(
                            "byte {i} is {item}, expected an integer 0..=255"
                        ))
                    })
            })
            .collect()
    }

    /// Evaluate `source` then `call` in a fresh context on a worker thread.
    ///
    /// `call` must evaluate to a JSON string of `{ok: value}`,
    /// `{error: message}` or `{missing: entry}`.
    fn run(&self, source: &str, call: String) -> Result<Value, SandboxError> {
        let (tx, rx) = mpsc::channel();
        let source = source.to_string();
        let limits = self.config.clone();

        std::thread::Builder::new()
            .name("codec-sandbox".to_string())
            .stack_size(WORKER_STACK_SIZE)
            .spawn(move || {
                let _ = tx.send(execute(&source, &call, &limits));
            })?;

        let timeout_ms = self.config.timeout.as_millis() as u64;
        match rx.recv_timeout(self.config.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(timeout_ms, "codec call timed out");
                Err(SandboxError::Timeout { timeout_ms })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(SandboxError::Runtime(
                "sandbox worker terminated unexpectedly".to_string(),
            )),
        }
    }
}

fn execute(source: &str, call: &str, limits: &SandboxConfig) -> Result<Value, SandboxError> {
    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(limits.loop_iteration_limit);
    context
        .runtime_limits_mut()
        .set_recursion_limit(limits.recursion_limit);

    context
        .eval(Source::from_bytes(PRELUDE))
        .map_err(|e| SandboxError::Runtime(format!("prelude: {e}")))?;
    context
        .eval(Source::from_bytes(source))
        .map_err(|e| SandboxError::Load(e.to_string()))?;

    let result = context
        .eval(Source::from_bytes(call))
        .map_err(|e| SandboxError::Runtime(e.to_string()))?;
    let text = result
        .as_string()
        .map(|s| s.to_std_string_escaped())
        .ok_or_else(|| SandboxError::InvalidOutput("call did not produce JSON text".to_string()))?;

    let envelope: Value = serde_json::from_str(&text)?;
    if let Some(missing) = envelope.get("missing").and_then(Value::as_str) {
        let entry = if missing == ENCODE_ENTRY_POINT {
            ENCODE_ENTRY_POINT
        } else {
            DECODE_ENTRY_POINT
        };
        return Err(SandboxError::MissingEntryPoint(entry));
    }
    if let Some(message) = envelope.get("error").and_then(Value::as_str) {
        return Err(SandboxError::Runtime(message.to_string()));
    }
    match envelope.get("ok") {
        Some(value) => Ok(value.clone()),
        None => Err(SandboxError::InvalidOutput(
            "entry point returned undefined".to_string(),
        )),
    }
}

/// JavaScript expression calling `entry(input)` and wrapping the outcome.
fn guarded_call(entry: &'static str, input_json: &str) -> String {
    format!(
        r#"(function () {{
  if (typeof {entry} !== "function") {{
    return JSON.stringify({{ missing: "{entry}" }});
  }}
  try {{
    return JSON.stringify({{ ok: {entry}({input_json}) }});
  }} catch (e) {{
    return JSON.stringify({{ error: String(e) }});
  }}
}})()"#
    )
}
