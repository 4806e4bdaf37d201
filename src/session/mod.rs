//! Signed-in session: the bearer token attached to every API request.

mod storage;

pub use storage::LocalStorage;

use color_eyre::{eyre::eyre, Result};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

const TOKEN_KEY: &str = "token";

/// Shared handle to the current session.
///
/// The token is read from storage on every call, so signing in or out from
/// one view is seen by every request issued afterwards.
#[derive(Clone)]
pub struct Session {
  inner: Arc<SessionInner>,
}

struct SessionInner {
  storage: LocalStorage,
  /// Token supplied through the environment; wins over the stored one
  override_token: Mutex<Option<String>>,
}

impl Session {
  pub fn new(storage: LocalStorage, override_token: Option<String>) -> Self {
    Self {
      inner: Arc::new(SessionInner {
        storage,
        override_token: Mutex::new(override_token.filter(|t| !t.is_empty())),
      }),
    }
  }

  /// Current bearer token, if any.
  pub fn token(&self) -> Option<String> {
    if let Some(token) = self
      .inner
      .override_token
      .lock()
      .ok()
      .and_then(|t| t.clone())
    {
      return Some(token);
    }
    match self.inner.storage.get_item(TOKEN_KEY) {
      Ok(token) => token.filter(|t| !t.is_empty()),
      Err(e) => {
        warn!(error = %e, "failed to read session token");
        None
      }
    }
  }

  pub fn is_signed_in(&self) -> bool {
    self.token().is_some()
  }

  /// Persist a token returned by the login mutation.
  pub fn sign_in(&self, token: &str) -> Result<()> {
    self.inner.storage.set_item(TOKEN_KEY, token)?;
    info!("session started");
    Ok(())
  }

  /// Forget the stored token (and any environment override).
  pub fn sign_out(&self) -> Result<()> {
    self
      .inner
      .override_token
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?
      .take();
    self.inner.storage.remove_item(TOKEN_KEY)?;
    info!("session ended");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn session(override_token: Option<&str>) -> Session {
    Session::new(
      LocalStorage::open_in_memory().unwrap(),
      override_token.map(String::from),
    )
  }

  #[test]
  fn test_sign_in_and_out() {
    let session = session(None);
    assert!(!session.is_signed_in());

    session.sign_in("tok").unwrap();
    assert_eq!(session.token().as_deref(), Some("tok"));

    session.sign_out().unwrap();
    assert!(!session.is_signed_in());
  }

  #[test]
  fn test_override_token_wins() {
    let session = session(Some("env-token"));
    session.sign_in("stored").unwrap();
    assert_eq!(session.token().as_deref(), Some("env-token"));
  }

  #[test]
  fn test_sign_out_drops_override() {
    let session = session(Some("env-token"));
    session.sign_out().unwrap();
    assert!(!session.is_signed_in());
  }

  #[test]
  fn test_empty_override_is_ignored() {
    let session = session(Some(""));
    assert!(!session.is_signed_in());
  }

  #[test]
  fn test_clones_share_storage() {
    let session = session(None);
    let other = session.clone();
    session.sign_in("tok").unwrap();
    assert_eq!(other.token().as_deref(), Some("tok"));
  }
}
