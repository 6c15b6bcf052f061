//! Deep-link formatting for code redemption.

use crate::code::AccessCode;

/// Root-relative redemption path: `/sessions/{id}/mark?code={code}`.
#[must_use]
pub fn redemption_path(session_id: &str, code: &AccessCode) -> String {
    format!(
        "/sessions/{}/mark?code={}",
        urlencoding::encode(session_id),
        urlencoding::encode(code.as_str())
    )
}

/// Redemption URL under `base_url`. An empty base yields the root-relative path.
#[must_use]
pub fn redemption_url(base_url: &str, session_id: &str, code: &AccessCode) -> String {
    let base = base_url.trim().trim_end_matches('/');
    format!("{base}{}", redemption_path(session_id, code))
}
