#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    /// Name the wallet extension shows when asked to enable itself.
    pub app_name: String,
    pub proxy_wrapping: bool,
    pub fee_estimation: bool,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            app_name: "extrinsic-signing".to_owned(),
            proxy_wrapping: true,
            fee_estimation: true,
        }
    }
}

impl SubmitterConfig {
    /// Defaults overridden by `EXTRINSIC_APP_NAME`, `EXTRINSIC_PROXY_WRAPPING` and
    /// `EXTRINSIC_FEE_ESTIMATION`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            app_name: std::env::var("EXTRINSIC_APP_NAME")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.app_name),
            proxy_wrapping: env_flag("EXTRINSIC_PROXY_WRAPPING").unwrap_or(defaults.proxy_wrapping),
            fee_estimation: env_flag("EXTRINSIC_FEE_ESTIMATION").unwrap_or(defaults.fee_estimation),
        }
    }
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().as_deref().and_then(parse_flag)
}
