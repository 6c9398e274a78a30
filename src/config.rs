//! Watchdog configuration
//!
//! Settings are resolved once per run, in three layers:
//! - built-in defaults
//! - the override file, a flat `KEY=VALUE` list in `EnvironmentFile` syntax
//! - `KIOSK_*` variables from the process environment
//!
//! Keys are case-insensitive, may carry the `KIOSK_` prefix, and treat `-` and `_`
//! alike, so `KIOSK_GRACE_THRESHOLD=10` and `grace-threshold=10` are the same
//! assignment. Unknown keys and unparsable values are logged and skipped; resolution
//! itself never fails.

use crate::error::Error;
use crate::systemd::DEFAULT_QUERY_TIMEOUT;
use nix::unistd::User;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default override file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/kiosk-watchdog.conf";

/// Prefix for environment overrides
const ENV_PREFIX: &str = "KIOSK_";

/// Environment variable naming the override file (handled by the CLI, not a setting)
pub const CONFIG_ENV: &str = "KIOSK_CONFIG";

/// Service account the kiosk session runs under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Login name
    pub name: String,
    /// Numeric uid, if the account exists
    pub uid: Option<u32>,
    /// Home directory
    pub home: PathBuf,
}

impl Account {
    /// Look the account up in the system user database
    ///
    /// An unknown account is not an error here: the process stage will fail for it
    /// and the operator sees that in the logs.
    pub fn lookup(name: &str) -> Self {
        match User::from_name(name) {
            Ok(Some(user)) => Self {
                name: name.to_string(),
                uid: Some(user.uid.as_raw()),
                home: user.dir,
            },
            Ok(None) => {
                warn!(account = name, "service account not found in user database");
                Self::unresolved(name)
            }
            Err(e) => {
                warn!(account = name, error = %e, "service account lookup failed");
                Self::unresolved(name)
            }
        }
    }

    fn unresolved(name: &str) -> Self {
        Self {
            name: name.to_string(),
            uid: None,
            home: PathBuf::from("/home").join(name),
        }
    }
}

/// Fully resolved, immutable settings for one run
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    /// Override file that contributed settings, if any
    pub source: Option<PathBuf>,

    /// Local endpoint host
    pub host: String,
    /// Local endpoint port
    pub port: u16,
    /// Request path on the endpoint
    pub path: String,
    /// `http://{host}:{port}{path}`
    pub endpoint_url: String,

    /// X display identifier, e.g. `:0`
    pub display: String,
    /// Account owning the browser process and the X session
    pub account: Account,

    /// Supervised unit (browser/display session)
    pub service: String,
    /// Dependent unit (local content server)
    pub dependent_service: String,

    /// Command-line substring identifying the browser process
    pub process_match: String,
    /// Display probe command line
    pub display_probe: Vec<String>,

    /// Stage 1 timeout
    pub process_timeout: Duration,
    /// Stage 2 timeout
    pub display_timeout: Duration,
    /// Stage 3 timeout (covers all HTTP attempts)
    pub http_timeout: Duration,
    /// TCP connect timeout per HTTP attempt
    pub connect_timeout: Duration,
    /// Extra HTTP attempts allowed after a refused connection
    pub http_retries: u8,
    /// Timeout for each service manager call
    pub query_timeout: Duration,

    /// Services active for less than this get a grace sleep
    pub grace_threshold: Duration,
    /// Grace sleep for a recently started service
    pub grace_sleep: Duration,
    /// Grace sleep when the activation timestamp is unavailable
    pub grace_fallback: Duration,
    /// Wait between the dependent restart and the endpoint re-check
    pub recheck_delay: Duration,

    /// Primary X authority path
    pub xauthority: PathBuf,
    /// Ordered alternates tried when the primary is unreadable
    pub xauthority_fallbacks: Vec<PathBuf>,
    /// Authority file actually handed to the display probe
    pub authority: PathBuf,
}

impl WatchdogConfig {
    /// Resolve from defaults, the override file, and the process environment
    pub fn resolve(file: &Path) -> Self {
        Self::resolve_with(file, std::env::vars())
    }

    /// Resolve with an explicit environment
    pub fn resolve_with<I>(file: &Path, env: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut draft = Draft::default();
        let mut source = None;

        if let Some(content) = read_override_file(file) {
            for (key, value) in parse_assignments(&content) {
                draft.apply(&key, &value);
            }
            source = Some(file.to_path_buf());
        }

        for (key, value) in env {
            if key == CONFIG_ENV || value.is_empty() {
                continue;
            }
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                draft.apply(stripped, &value);
            }
        }

        let mut config = draft.finish();
        config.source = source;
        config
    }

    /// Build a config from explicit assignments on top of the defaults
    pub fn from_assignments<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut draft = Draft::default();
        for (key, value) in pairs {
            draft.apply(key.as_ref(), value.as_ref());
        }
        draft.finish()
    }

    /// Resolved configuration as JSON for the `config` command
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "source": self.source.as_ref().map(|p| p.display().to_string()),
            "endpoint_url": self.endpoint_url,
            "display": self.display,
            "user": self.account.name,
            "uid": self.account.uid,
            "service": self.service,
            "dependent_service": self.dependent_service,
            "process_match": self.process_match,
            "display_probe": self.display_probe,
            "timeouts": {
                "process": self.process_timeout.as_secs_f64(),
                "display": self.display_timeout.as_secs_f64(),
                "http": self.http_timeout.as_secs_f64(),
                "connect": self.connect_timeout.as_secs_f64(),
                "query": self.query_timeout.as_secs_f64(),
            },
            "http_retries": self.http_retries,
            "grace": {
                "threshold": self.grace_threshold.as_secs_f64(),
                "sleep": self.grace_sleep.as_secs_f64(),
                "fallback": self.grace_fallback.as_secs_f64(),
            },
            "recheck_delay": self.recheck_delay.as_secs_f64(),
            "xauthority": self.xauthority.display().to_string(),
            "xauthority_fallbacks": self
                .xauthority_fallbacks
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
            "authority": self.authority.display().to_string(),
        })
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Draft::default().finish()
    }
}

/// Mutable settings collected while layering overrides
#[derive(Debug)]
struct Draft {
    host: String,
    port: u16,
    path: String,
    display: String,
    user: String,
    service: String,
    dependent_service: String,
    process_match: Option<String>,
    display_probe: Vec<String>,
    process_timeout: Duration,
    display_timeout: Duration,
    http_timeout: Duration,
    connect_timeout: Duration,
    http_retries: u8,
    query_timeout: Duration,
    grace_threshold: Duration,
    grace_sleep: Duration,
    grace_fallback: Duration,
    recheck_delay: Duration,
    xauthority: Option<PathBuf>,
    xauthority_fallbacks: Option<Vec<PathBuf>>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            path: String::new(),
            display: ":0".to_string(),
            user: "kiosk".to_string(),
            service: "kiosk.service".to_string(),
            dependent_service: "kiosk-web.service".to_string(),
            process_match: None,
            display_probe: vec!["xset".to_string(), "q".to_string()],
            process_timeout: Duration::from_secs(5),
            display_timeout: Duration::from_secs(5),
            http_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            http_retries: 2,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            grace_threshold: Duration::from_secs(10),
            grace_sleep: Duration::from_secs(10),
            grace_fallback: Duration::from_secs(5),
            recheck_delay: Duration::from_secs(5),
            xauthority: None,
            xauthority_fallbacks: None,
        }
    }
}

impl Draft {
    /// Apply one assignment; bad keys and values are logged and skipped
    fn apply(&mut self, raw_key: &str, value: &str) {
        let key = normalize_key(raw_key);
        let value = value.trim();

        let accepted = match key.as_str() {
            "host" => set_string(&mut self.host, value),
            "port" => set_parsed(&mut self.port, value),
            "path" => {
                self.path = if value.is_empty() || value.starts_with('/') {
                    value.to_string()
                } else {
                    format!("/{}", value)
                };
                true
            }
            "display" => set_string(&mut self.display, value),
            "user" => set_string(&mut self.user, value),
            "service" => set_string(&mut self.service, value),
            "dependent_service" => set_string(&mut self.dependent_service, value),
            "process_match" => {
                if value.is_empty() {
                    false
                } else {
                    self.process_match = Some(value.to_string());
                    true
                }
            }
            "display_probe" => {
                let argv: Vec<String> = value.split_whitespace().map(str::to_string).collect();
                if argv.is_empty() {
                    false
                } else {
                    self.display_probe = argv;
                    true
                }
            }
            "timeouts" | "timeout" => match parse_secs(value) {
                Some(d) => {
                    self.process_timeout = d;
                    self.display_timeout = d;
                    self.http_timeout = d;
                    true
                }
                None => false,
            },
            "process_timeout" => set_secs(&mut self.process_timeout, value),
            "display_timeout" => set_secs(&mut self.display_timeout, value),
            "http_timeout" => set_secs(&mut self.http_timeout, value),
            "connect_timeout" => set_secs(&mut self.connect_timeout, value),
            "http_retries" => set_parsed(&mut self.http_retries, value),
            "query_timeout" => set_secs(&mut self.query_timeout, value),
            "grace_threshold" => set_secs(&mut self.grace_threshold, value),
            "grace_sleep" => set_secs(&mut self.grace_sleep, value),
            "grace_fallback" => set_secs(&mut self.grace_fallback, value),
            "recheck_delay" => set_secs(&mut self.recheck_delay, value),
            "xauthority" => {
                if value.is_empty() {
                    false
                } else {
                    self.xauthority = Some(PathBuf::from(value));
                    true
                }
            }
            "xauthority_fallbacks" => {
                self.xauthority_fallbacks = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(PathBuf::from)
                        .collect(),
                );
                true
            }
            _ => {
                debug!(key = raw_key, "ignoring unknown setting");
                return;
            }
        };

        if !accepted {
            warn!(key = raw_key, value, "ignoring invalid value");
        }
    }

    /// Derive dependent settings and resolve the authority file
    fn finish(self) -> WatchdogConfig {
        let account = Account::lookup(&self.user);
        let endpoint_url = format!("http://{}:{}{}", self.host, self.port, self.path);
        let process_match = self.process_match.unwrap_or_else(|| endpoint_url.clone());
        let xauthority = self
            .xauthority
            .unwrap_or_else(|| account.home.join(".Xauthority"));
        let xauthority_fallbacks = self
            .xauthority_fallbacks
            .unwrap_or_else(|| default_authority_fallbacks(&account, &self.display));
        let authority = resolve_authority(&xauthority, &xauthority_fallbacks);

        WatchdogConfig {
            source: None,
            host: self.host,
            port: self.port,
            path: self.path,
            endpoint_url,
            display: self.display,
            account,
            service: self.service,
            dependent_service: self.dependent_service,
            process_match,
            display_probe: self.display_probe,
            process_timeout: self.process_timeout,
            display_timeout: self.display_timeout,
            http_timeout: self.http_timeout,
            connect_timeout: self.connect_timeout,
            http_retries: self.http_retries,
            query_timeout: self.query_timeout,
            grace_threshold: self.grace_threshold,
            grace_sleep: self.grace_sleep,
            grace_fallback: self.grace_fallback,
            recheck_delay: self.recheck_delay,
            xauthority,
            xauthority_fallbacks,
            authority,
        }
    }
}

fn set_string(slot: &mut String, value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    *slot = value.to_string();
    true
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
    match value.parse() {
        Ok(v) => {
            *slot = v;
            true
        }
        Err(_) => false,
    }
}

fn set_secs(slot: &mut Duration, value: &str) -> bool {
    match parse_secs(value) {
        Some(d) => {
            *slot = d;
            true
        }
        None => false,
    }
}

/// Parse a non-negative, possibly fractional number of seconds
fn parse_secs(value: &str) -> Option<Duration> {
    let secs: f64 = value.parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Canonical form of a setting name: lowercase, `_` separators, no `KIOSK_` prefix
fn normalize_key(raw: &str) -> String {
    let key = raw.trim().to_ascii_lowercase().replace('-', "_");
    match key.strip_prefix("kiosk_") {
        Some(stripped) => stripped.to_string(),
        None => key,
    }
}

/// Split `EnvironmentFile`-style content into key/value pairs
fn parse_assignments(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            warn!(line = lineno + 1, "ignoring line without '='");
            continue;
        };

        pairs.push((key.trim().to_string(), unquote(value.trim()).to_string()));
    }

    pairs
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn read_override_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => {
            info!(path = %path.display(), "configuration loaded");
            Some(content)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no override file, using defaults");
            None
        }
        Err(e) => {
            let err = Error::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            };
            warn!("{}, using defaults", err);
            None
        }
    }
}

/// Well-known authority locations for display managers and `startx` sessions
fn default_authority_fallbacks(account: &Account, display: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(uid) = account.uid {
        paths.push(PathBuf::from(format!("/run/user/{}/gdm/Xauthority", uid)));
        paths.push(PathBuf::from(format!("/run/user/{}/Xauthority", uid)));
    }
    paths.push(PathBuf::from(format!("/var/run/lightdm/{}/xauthority", account.name)));
    paths.push(PathBuf::from("/var/run/lightdm/root").join(display));
    paths.push(PathBuf::from("/root/.Xauthority"));
    paths
}

fn is_readable(path: &Path) -> bool {
    File::open(path)
        .and_then(|f| f.metadata())
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Pick the first readable authority file: the primary, then each fallback in order
///
/// When nothing is readable the primary is returned unchanged so the display stage
/// fails with a concrete path in its message.
pub fn resolve_authority(primary: &Path, fallbacks: &[PathBuf]) -> PathBuf {
    if is_readable(primary) {
        return primary.to_path_buf();
    }

    match fallbacks.iter().find(|p| is_readable(p)) {
        Some(found) => {
            info!(
                primary = %primary.display(),
                using = %found.display(),
                "primary authority file unreadable, using fallback"
            );
            found.clone()
        }
        None => {
            warn!(
                primary = %primary.display(),
                "no readable authority file found"
            );
            primary.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NO_SUCH_USER: &str = "kiosk-watchdog-test-nobody";

    fn config(pairs: &[(&str, &str)]) -> WatchdogConfig {
        let mut all = vec![("user", NO_SUCH_USER)];
        all.extend_from_slice(pairs);
        WatchdogConfig::from_assignments(all)
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.endpoint_url, "http://127.0.0.1:8080");
        assert_eq!(cfg.process_match, cfg.endpoint_url);
        assert_eq!(cfg.display, ":0");
        assert_eq!(cfg.service, "kiosk.service");
        assert_eq!(cfg.dependent_service, "kiosk-web.service");
        assert_eq!(cfg.grace_threshold, Duration::from_secs(10));
        assert_eq!(cfg.display_probe, vec!["xset", "q"]);
        assert!(cfg.source.is_none());
    }

    #[test]
    fn test_unknown_account_uses_home_convention() {
        let cfg = config(&[]);
        assert_eq!(cfg.account.uid, None);
        assert_eq!(cfg.account.home, PathBuf::from("/home").join(NO_SUCH_USER));
        assert_eq!(
            cfg.xauthority,
            PathBuf::from("/home").join(NO_SUCH_USER).join(".Xauthority")
        );
    }

    #[test]
    fn test_endpoint_derived_from_host_port_path() {
        let cfg = config(&[("host", "localhost"), ("port", "1111"), ("path", "api?sensors=STIME")]);
        assert_eq!(cfg.endpoint_url, "http://localhost:1111/api?sensors=STIME");
        assert_eq!(cfg.process_match, "http://localhost:1111/api?sensors=STIME");
    }

    #[test]
    fn test_explicit_process_match_wins() {
        let cfg = config(&[("process_match", "--kiosk"), ("port", "9000")]);
        assert_eq!(cfg.process_match, "--kiosk");
        assert_eq!(cfg.endpoint_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_key_normalization() {
        assert_eq!(normalize_key("KIOSK_GRACE_THRESHOLD"), "grace_threshold");
        assert_eq!(normalize_key("grace-sleep"), "grace_sleep");
        assert_eq!(normalize_key(" Port "), "port");

        let cfg = config(&[("KIOSK_GRACE_THRESHOLD", "30"), ("grace-sleep", "2.5")]);
        assert_eq!(cfg.grace_threshold, Duration::from_secs(30));
        assert_eq!(cfg.grace_sleep, Duration::from_millis(2500));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let cfg = config(&[
            ("port", "eighty"),
            ("grace_sleep", "-3"),
            ("http_retries", "300"),
            ("host", ""),
            ("display_probe", "   "),
            ("bogus_key", "1"),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.grace_sleep, Duration::from_secs(10));
        assert_eq!(cfg.http_retries, 2);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.display_probe, vec!["xset", "q"]);
    }

    #[test]
    fn test_default_signature_matches_both_launch_forms() {
        let cfg = config(&[]);
        assert!("chromium --kiosk http://127.0.0.1:8080".contains(&cfg.process_match));
        assert!("chromium --kiosk http://127.0.0.1:8080/".contains(&cfg.process_match));
    }

    #[test]
    fn test_timeouts_key_sets_all_stages() {
        let cfg = config(&[("timeouts", "1")]);
        assert_eq!(cfg.process_timeout, Duration::from_secs(1));
        assert_eq!(cfg.display_timeout, Duration::from_secs(1));
        assert_eq!(cfg.http_timeout, Duration::from_secs(1));

        let cfg = config(&[("KIOSK_TIMEOUTS", "2.5")]);
        assert_eq!(cfg.http_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_timeout_sets_all_stages_then_specific_override() {
        let cfg = config(&[("timeout", "3"), ("http_timeout", "8")]);
        assert_eq!(cfg.process_timeout, Duration::from_secs(3));
        assert_eq!(cfg.display_timeout, Duration::from_secs(3));
        assert_eq!(cfg.http_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_parse_assignments() {
        let content = r#"
# installer generated
; legacy comment
KIOSK_HOST=127.0.0.1
export KIOSK_PORT=1111
display = ":1"
xauthority='/home/kiosk/.Xauthority'
not an assignment
"#;
        let pairs = parse_assignments(content);
        assert_eq!(
            pairs,
            vec![
                ("KIOSK_HOST".to_string(), "127.0.0.1".to_string()),
                ("KIOSK_PORT".to_string(), "1111".to_string()),
                ("display".to_string(), ":1".to_string()),
                ("xauthority".to_string(), "/home/kiosk/.Xauthority".to_string()),
            ]
        );
    }

    #[test]
    fn test_resolve_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let env = vec![("KIOSK_USER".to_string(), NO_SUCH_USER.to_string())];
        let cfg = WatchdogConfig::resolve_with(&dir.path().join("absent.conf"), env);
        assert!(cfg.source.is_none());
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn test_resolve_file_then_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiosk-watchdog.conf");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "KIOSK_USER={}", NO_SUCH_USER).unwrap();
        writeln!(file, "KIOSK_PORT=1111").unwrap();
        writeln!(file, "KIOSK_DISPLAY=:1").unwrap();
        drop(file);

        let env = vec![
            ("KIOSK_PORT".to_string(), "2222".to_string()),
            ("KIOSK_CONFIG".to_string(), "/elsewhere.conf".to_string()),
            ("KIOSK_HOST".to_string(), String::new()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];
        let cfg = WatchdogConfig::resolve_with(&path, env);

        assert_eq!(cfg.source.as_deref(), Some(path.as_path()));
        assert_eq!(cfg.port, 2222);
        assert_eq!(cfg.display, ":1");
        assert_eq!(cfg.host, "127.0.0.1");
    }

    #[test]
    fn test_authority_primary_readable() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("primary");
        let fallback = dir.path().join("fallback");
        File::create(&primary).unwrap();
        File::create(&fallback).unwrap();

        assert_eq!(resolve_authority(&primary, &[fallback]), primary);
    }

    #[test]
    fn test_authority_uses_single_readable_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("missing-primary");
        let missing = dir.path().join("missing-fallback");
        let directory = dir.path().join("a-directory");
        let readable = dir.path().join("readable");
        fs::create_dir(&directory).unwrap();
        File::create(&readable).unwrap();

        let chosen = resolve_authority(&primary, &[missing, directory, readable.clone()]);
        assert_eq!(chosen, readable);
    }

    #[test]
    fn test_authority_none_readable_keeps_primary() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("missing-primary");
        let chosen = resolve_authority(&primary, &[dir.path().join("also-missing")]);
        assert_eq!(chosen, primary);
    }

    #[test]
    fn test_configured_fallbacks_feed_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let readable = dir.path().join("Xauthority");
        File::create(&readable).unwrap();
        let list = format!(
            "{}, {}",
            dir.path().join("nope").display(),
            readable.display()
        );

        let primary = dir.path().join("primary").display().to_string();

        let cfg = config(&[
            ("xauthority", primary.as_str()),
            ("xauthority_fallbacks", list.as_str()),
        ]);
        assert_eq!(cfg.xauthority_fallbacks.len(), 2);
        assert_eq!(cfg.authority, readable);
    }

    #[test]
    fn test_default_fallback_order() {
        let account = Account {
            name: "kiosk".to_string(),
            uid: Some(1000),
            home: PathBuf::from("/home/kiosk"),
        };
        let paths = default_authority_fallbacks(&account, ":0");
        assert_eq!(paths[0], PathBuf::from("/run/user/1000/gdm/Xauthority"));
        assert_eq!(paths[1], PathBuf::from("/run/user/1000/Xauthority"));
        assert_eq!(paths[3], PathBuf::from("/var/run/lightdm/root/:0"));
        assert_eq!(paths.last().unwrap(), &PathBuf::from("/root/.Xauthority"));
    }

    #[test]
    fn test_to_json() {
        let cfg = config(&[("port", "1111")]);
        let json = cfg.to_json();
        assert_eq!(json["endpoint_url"], "http://127.0.0.1:1111");
        assert_eq!(json["grace"]["threshold"], 10.0);
        assert!(json["source"].is_null());
    }
}
