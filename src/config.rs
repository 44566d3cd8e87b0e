use worker::Env;

/// D1 binding holding the `reports` table.
pub const DB_BINDING: &str = "DB";
/// R2 binding holding uploaded images.
pub const UPLOADS_BINDING: &str = "UPLOADS";

const CORS_ORIGIN_VAR: &str = "CORS_ALLOWED_ORIGIN";
const MAX_UPLOAD_VAR: &str = "MAX_UPLOAD_BYTES";

const DEFAULT_CORS_ORIGIN: &str = "*";
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Deployment settings read from `wrangler.toml` vars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cors_origin: String,
    pub max_upload_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Missing vars fall back to defaults.
    pub fn from_env(env: &Env) -> Self {
        let var = |name: &str| env.var(name).ok().map(|v| v.to_string());
        let max_upload = var(MAX_UPLOAD_VAR);
        let cfg = Self::from_vars(var(CORS_ORIGIN_VAR), max_upload.clone());
        if let Some(raw) = max_upload.filter(|v| parse_limit(v).is_none()) {
            worker::console_log!(
                "WARN: ignoring invalid {MAX_UPLOAD_VAR}={raw:?}; using {}",
                cfg.max_upload_bytes
            );
        }
        cfg
    }

    /// Blank or unparsable values fall back to defaults.
    pub fn from_vars(cors_origin: Option<String>, max_upload_bytes: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            cors_origin: cors_origin
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cors_origin),
            max_upload_bytes: max_upload_bytes
                .as_deref()
                .and_then(parse_limit)
                .unwrap_or(defaults.max_upload_bytes),
        }
    }
}

fn parse_limit(v: &str) -> Option<u64> {
    v.trim().parse::<u64>().ok().filter(|n| *n > 0)
}
