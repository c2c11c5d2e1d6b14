use dormant_core::config::{OwnerKind, ReportFormat};
use typed_path::Utf8NativePathBuf;
use url::Url;

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<Utf8NativePathBuf, String> {
    Ok(Utf8NativePathBuf::from(value))
}

pub fn parse_owner_kind(value: &str) -> Result<OwnerKind, String> {
    value.parse().map_err(|_| format!("unknown owner kind '{value}' (expected org or user)"))
}

pub fn parse_format(value: &str) -> Result<ReportFormat, String> {
    value.parse().map_err(|_| format!("unknown format '{value}' (expected plain or summary)"))
}

pub fn parse_url(value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|e| format!("invalid URL '{value}': {e}"))
}
