use std::path::PathBuf;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ROOM: &str = "demo";
pub const DEFAULT_DEAL_COUNT: u32 = 8;
pub const DEFAULT_LOG_FILE: &str = "cardroom.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub server: String,
    pub room: String,
    pub name: Option<String>,
    pub pid: Option<String>,
    pub deal_count: u32,
    pub log_file: PathBuf,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            room: DEFAULT_ROOM.to_string(),
            name: None,
            pid: None,
            deal_count: DEFAULT_DEAL_COUNT,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

pub fn parse_options(args: &[String]) -> LaunchOptions {
    parse_options_with(args, |key| std::env::var(key).ok())
}

/// Flags win over environment variables, which win over defaults. Unknown
/// flags are skipped.
pub fn parse_options_with(args: &[String], env: impl Fn(&str) -> Option<String>) -> LaunchOptions {
    let mut options = LaunchOptions::default();
    if let Some(value) = non_empty(env("CARDROOM_SERVER")) {
        options.server = value;
    }
    if let Some(value) = non_empty(env("CARDROOM_ROOM")) {
        options.room = value;
    }
    options.name = non_empty(env("CARDROOM_NAME"));
    options.pid = non_empty(env("CARDROOM_PID"));
    if let Some(count) = env("CARDROOM_DEAL").and_then(|value| value.trim().parse().ok()) {
        options.deal_count = count;
    }
    if let Some(value) = non_empty(env("CARDROOM_LOG_FILE")) {
        options.log_file = PathBuf::from(value);
    }

    let mut idx = 0usize;
    while idx < args.len() {
        let value = args.get(idx + 1).cloned();
        let consumed = match args[idx].as_str() {
            "--server" | "-s" => value.map(|v| options.server = v).is_some(),
            "--room" | "-r" => value.map(|v| options.room = v).is_some(),
            "--name" | "-n" => value.map(|v| options.name = Some(v)).is_some(),
            "--pid" => value.map(|v| options.pid = Some(v)).is_some(),
            "--deal" => {
                if let Some(count) = value.as_deref().and_then(|v| v.parse().ok()) {
                    options.deal_count = count;
                }
                value.is_some()
            }
            "--log-file" => value.map(|v| options.log_file = PathBuf::from(v)).is_some(),
            _ => false,
        };
        idx += if consumed { 2 } else { 1 };
    }
    options
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
