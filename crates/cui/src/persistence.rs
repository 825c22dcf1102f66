use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const IDENTITY_SCHEMA_VERSION: u32 = 1;
const PID_PREFIX: &str = "p-";
const PID_HEX_LEN: usize = 12;

/// The pid this machine joins rooms with, kept between launches so the
/// server recognises a returning player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedIdentity {
    pub version: u32,
    pub pid: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub fn default_identity_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CARDROOM_IDENTITY") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cardroom_identity.json"))
}

pub fn save_identity_file(identity: &SavedIdentity, path: &Path) -> Result<(), String> {
    let body = serde_json::to_string_pretty(identity).map_err(|err| err.to_string())?;
    fs::write(path, body).map_err(|err| err.to_string())
}

pub fn load_identity_file(path: &Path) -> Result<SavedIdentity, String> {
    let body = fs::read_to_string(path).map_err(|err| err.to_string())?;
    let payload: SavedIdentity = serde_json::from_str(&body).map_err(|err| err.to_string())?;
    if payload.version != IDENTITY_SCHEMA_VERSION {
        return Err(format!(
            "unsupported identity version {} (expected {})",
            payload.version, IDENTITY_SCHEMA_VERSION
        ));
    }
    if payload.pid.trim().is_empty() {
        return Err("identity file has an empty pid".to_string());
    }
    Ok(payload)
}

pub fn generate_pid(rng: &mut impl Rng) -> String {
    let digits: String = (0..PID_HEX_LEN)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
        .collect();
    format!("{PID_PREFIX}{digits}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPid {
    pub pid: String,
    pub note: Option<String>,
}

/// An explicit pid wins. Otherwise the stored identity is reused, and when
/// there is none a fresh pid is generated and written back. Storage failures
/// never stop a launch; they come back as a note for the event log.
pub fn resolve_pid(explicit: Option<&str>, path: Option<&Path>) -> ResolvedPid {
    if let Some(pid) = explicit.map(str::trim).filter(|pid| !pid.is_empty()) {
        return ResolvedPid {
            pid: pid.to_string(),
            note: None,
        };
    }
    let Some(path) = path else {
        return ResolvedPid {
            pid: generate_pid(&mut rand::thread_rng()),
            note: Some("no identity path; using a one-off pid".to_string()),
        };
    };
    let mut note = None;
    if path.exists() {
        match load_identity_file(path) {
            Ok(saved) => {
                return ResolvedPid {
                    pid: saved.pid,
                    note: None,
                }
            }
            Err(err) => note = Some(format!("identity ignored: {err}")),
        }
    }
    let identity = SavedIdentity {
        version: IDENTITY_SCHEMA_VERSION,
        pid: generate_pid(&mut rand::thread_rng()),
        name: None,
    };
    if let Err(err) = save_identity_file(&identity, path) {
        note = Some(format!("identity not saved to {}: {err}", path.display()));
    }
    ResolvedPid {
        pid: identity.pid,
        note,
    }
}
