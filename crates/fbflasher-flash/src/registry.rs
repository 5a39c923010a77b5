//! Transport registry and initialization

use std::collections::HashMap;
use std::path::Path;

use fbflasher_core::command::Transport;
use fbflasher_core::command_log::CommandLog;
use fbflasher_core::executor::FlashExecutor;

/// Transport used when none is given
pub const DEFAULT_TRANSPORT: &str = "fastboot";

/// Parsed transport parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportParams {
    /// Transport name
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl TransportParams {
    fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a transport string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_transport_params("fastboot:path=/opt/platform-tools/fastboot")?;
/// assert_eq!(params.name, "fastboot");
/// ```
pub fn parse_transport_params(s: &str) -> Result<TransportParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));
    if name.is_empty() {
        return Err("Empty transport name".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(TransportParams {
        name: name.to_string(),
        params,
    })
}

/// Open a transport from a `name[:key=value,...]` string
///
/// # Arguments
/// * `transport` - Transport string (e.g., "fastboot" or "dummy:product=lynx")
pub fn open_transport(transport: &str) -> Result<Box<dyn Transport>, Box<dyn std::error::Error>> {
    let params = parse_transport_params(transport)?;
    #[allow(unused_variables)]
    let options = params.options();

    match params.name.as_str() {
        #[cfg(feature = "fastboot")]
        "fastboot" => {
            log::debug!("Opening fastboot transport...");
            fbflasher_fastboot::open_fastboot(&options)
        }

        #[cfg(feature = "dummy")]
        "dummy" => {
            log::info!("Opening dummy transport, no real device will be touched");
            fbflasher_dummy::open_dummy(&options)
        }

        _ => Err(format!(
            "Unknown transport: {} (available: {})",
            params.name,
            transport_names_short()
        )
        .into()),
    }
}

/// Open a transport and a fresh command log in `log_dir`
///
/// The log file is named after the current time.
pub fn open_executor(
    transport: &str,
    log_dir: impl AsRef<Path>,
) -> Result<FlashExecutor, Box<dyn std::error::Error>> {
    let transport = open_transport(transport)?;
    let log = CommandLog::create(log_dir)?;
    log::info!("Logging commands to {}", log.path().display());
    Ok(FlashExecutor::new(transport, log))
}

// Transport information and listing
/// Information about a transport
pub struct TransportInfo {
    /// Name used in `--transport`
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Get information about all available transports (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_transports() -> Vec<TransportInfo> {
    let mut transports = Vec::new();

    #[cfg(feature = "fastboot")]
    transports.push(TransportInfo {
        name: "fastboot",
        description: "Android platform-tools fastboot executable (path=<file>)",
    });

    #[cfg(feature = "dummy")]
    transports.push(TransportInfo {
        name: "dummy",
        description: "Simulated device for dry runs (product=<board>,fail=<partition>)",
    });

    transports
}

/// Generate a short list of transport names for CLI help
pub fn transport_names_short() -> String {
    let transports = available_transports();
    if transports.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = transports.iter().map(|t| t.name).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_only() {
        let params = parse_transport_params("fastboot").unwrap();
        assert_eq!(params.name, "fastboot");
        assert!(params.params.is_empty());
    }

    #[test]
    fn test_parse_with_params() {
        let params = parse_transport_params("dummy:product=lynx,fail=dtbo_a").unwrap();
        assert_eq!(params.name, "dummy");
        assert_eq!(params.params.get("product").map(String::as_str), Some("lynx"));
        assert_eq!(params.params.get("fail").map(String::as_str), Some("dtbo_a"));
    }

    #[test]
    fn test_parse_rejects_bare_option() {
        assert!(parse_transport_params("dummy:product").is_err());
        assert!(parse_transport_params(":path=x").is_err());
    }

    #[test]
    fn test_unknown_transport() {
        let err = open_transport("adb").err().unwrap();
        assert!(err.to_string().contains("Unknown transport: adb"));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_executor() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = open_executor("dummy:product=lynx", dir.path()).unwrap();
        assert_eq!(executor.transport().name(), "dummy");

        let output = executor
            .execute(&fbflasher_core::command::FastbootCommand::GetVar(
                "product".into(),
            ))
            .unwrap();
        assert!(output.contains("lynx"));
        assert!(executor.log().path().starts_with(dir.path()));
    }

    #[test]
    fn test_names_listed() {
        let names = transport_names_short();
        #[cfg(feature = "fastboot")]
        assert!(names.contains("fastboot"));
        #[cfg(feature = "dummy")]
        assert!(names.contains("dummy"));
        assert!(!names.is_empty());
    }
}
