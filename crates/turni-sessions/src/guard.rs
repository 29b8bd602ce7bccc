//! Stale-action guard for inline keyboards.
//!
//! Every rendered keyboard carries the user's current token in each
//! button's callback data (`action#token`). Issuing a new token — done once
//! per render — invalidates every previously issued button for that user.
//! A token stays valid for repeated presses until superseded.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::types::UserSession;

fn callback_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+)#([\w-]+)$").unwrap())
}

/// Generate a fresh unguessable token and store it on the session,
/// overwriting (and thereby invalidating) the previous one.
///
/// Must be called exactly once per rendered keyboard; the caller persists
/// the session afterwards.
pub fn issue_token(session: &mut UserSession) -> String {
    let token = Uuid::new_v4().to_string();
    session.callback_token = Some(token.clone());
    token
}

/// A button press is accepted iff its token equals the currently stored
/// one. Acceptance does not consume the token.
pub fn validate(session: &UserSession, token: &str) -> bool {
    session.callback_token.as_deref() == Some(token)
}

/// Split raw callback data into `(action, token)`. `None` for data that
/// does not match the `action#token` wire format.
pub fn parse_callback(data: &str) -> Option<(&str, &str)> {
    let caps = callback_re().captures(data)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Tag an action name with the token for button callback data.
pub fn tag_action(action: &str, token: &str) -> String {
    format!("{action}#{token}")
}
