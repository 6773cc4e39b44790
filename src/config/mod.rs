use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    /// Defaults, then `path` (if it exists), then environment overrides.
    pub fn load_from(path: &Path) -> Self {
        let mut map = default_map();

        if path.exists() {
            if let Ok(file) = fs::File::open(path) {
                let reader = BufReader::new(file);
                for line in reader.lines().flatten() {
                    if let Some((k, v)) = parse_line(&line) {
                        map.insert(k, v);
                    }
                }
            }
        }

        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path: path.to_path_buf() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    /// Command-line overrides take precedence over env and file values.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false)
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from)
    }

    /// Full URL of the run endpoint, e.g. `http://127.0.0.1:5000/run_code`.
    pub fn run_code_url(&self) -> String {
        let base = self.get("CODERUN_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let endpoint = self
            .get("CODERUN_RUN_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_RUN_ENDPOINT.into());
        join_url(&base, &endpoint)
    }

    pub fn separator_width(&self) -> usize {
        self.get_usize("CODERUN_SEPARATOR_WIDTH").unwrap_or(50)
    }

    pub fn layout_delay(&self) -> Duration {
        Duration::from_millis(self.get_u64("CODERUN_LAYOUT_DELAY_MS").unwrap_or(100))
    }

    /// Output panel line cap, at most `u16::MAX` (the panel scrolls in
    /// `u16` rows).
    pub fn scrollback(&self) -> usize {
        self.get_usize("CODERUN_SCROLLBACK")
            .unwrap_or(2000)
            .min(u16::MAX as usize)
    }

    pub fn log_file(&self) -> PathBuf {
        self.get_path("CODERUN_LOG_FILE")
            .unwrap_or_else(|| env::temp_dir().join("coderun").join("coderun.log"))
    }

    /// Sorted `KEY=VALUE` lines for `show-config`.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .inner
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        entries
    }
}

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_RUN_ENDPOINT: &str = "/run_code";

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    line.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
}

fn join_url(base: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

fn is_config_key(k: &str) -> bool {
    k.starts_with("CODERUN_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("coderun").join(".coderunrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Endpoint
    m.insert("CODERUN_BASE_URL".into(), DEFAULT_BASE_URL.into());
    m.insert("CODERUN_RUN_ENDPOINT".into(), DEFAULT_RUN_ENDPOINT.into());

    // Numbers
    m.insert("CODERUN_SEPARATOR_WIDTH".into(), "50".into());
    m.insert("CODERUN_LAYOUT_DELAY_MS".into(), "100".into());
    m.insert("CODERUN_SCROLLBACK".into(), "2000".into());

    // Controls
    m.insert("CODERUN_KEY_RUN".into(), "ctrl+r,f5".into());
    m.insert("CODERUN_KEY_CLEAR".into(), "ctrl+l".into());
    m.insert("CODERUN_KEY_TOGGLE".into(), "ctrl+o".into());

    // Paths
    let log = env::temp_dir().join("coderun").join("coderun.log");
    m.insert("CODERUN_LOG_FILE".into(), log.to_string_lossy().into_owned());

    // Bools as strings
    m.insert("CODERUN_COLOR".into(), "true".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_local_run_code() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("missing"));
        assert_eq!(cfg.get("CODERUN_RUN_ENDPOINT").as_deref(), Some("/run_code"));
        assert_eq!(cfg.separator_width(), 50);
        assert_eq!(cfg.layout_delay(), Duration::from_millis(100));
    }

    #[test]
    fn file_values_are_read_and_comments_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".coderunrc");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "# local sandbox").unwrap();
        writeln!(file, "CODERUN_SCROLLBACK = 10").unwrap();
        writeln!(file, "").unwrap();
        writeln!(file, "CODERUN_KEY_CLEAR=none").unwrap();

        let cfg = Config::load_from(&path);
        assert_eq!(cfg.scrollback(), 10);
        assert_eq!(cfg.get("CODERUN_KEY_CLEAR").as_deref(), Some("none"));
    }

    #[test]
    fn set_overrides_loaded_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::load_from(&dir.path().join("missing"));
        cfg.set("CODERUN_SEPARATOR_WIDTH", "12");
        assert_eq!(cfg.separator_width(), 12);
    }

    #[test]
    fn run_code_url_joins_base_and_endpoint() {
        assert_eq!(join_url("http://host:5000/", "/run_code"), "http://host:5000/run_code");
        assert_eq!(join_url("http://host:5000", "run_code"), "http://host:5000/run_code");
        assert_eq!(
            join_url("http://ignored", "https://sandbox.example/run"),
            "https://sandbox.example/run"
        );
    }

    #[test]
    fn env_wins_over_file_and_file_over_defaults() {
        // Key used by no other test, so parallel loads are unaffected.
        const KEY: &str = "CODERUN_PRECEDENCE_CHECK_SEPARATOR";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".coderunrc");
        fs::write(&path, format!("{KEY}=from-file\nCODERUN_RUN_ENDPOINT=/from-file\n")).unwrap();

        let cfg = Config::load_from(&path);
        assert_eq!(cfg.get(KEY).as_deref(), Some("from-file"));
        assert_eq!(cfg.get("CODERUN_RUN_ENDPOINT").as_deref(), Some("/from-file"));

        env::set_var(KEY, "from-env");
        let cfg = Config::load_from(&path);
        env::remove_var(KEY);
        assert_eq!(cfg.get(KEY).as_deref(), Some("from-env"));
    }

    #[test]
    fn scrollback_is_capped_to_panel_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::load_from(&dir.path().join("missing"));
        cfg.set("CODERUN_SCROLLBACK", "1000000");
        assert_eq!(cfg.scrollback(), u16::MAX as usize);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::load_from(&dir.path().join("missing"));
        cfg.set("CODERUN_SEPARATOR_WIDTH", "wide");
        assert_eq!(cfg.separator_width(), 50);
    }
}
