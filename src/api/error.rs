use thiserror::Error;

/// Errors returned by the GraphQL client.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Request never got a response (DNS, TLS, connection refused, timeout)
  #[error("Network error: {0}")]
  Network(#[from] reqwest::Error),

  /// Non-GraphQL error response from the server
  #[error("Server responded with {status}: {body}")]
  Status { status: u16, body: String },

  /// The API rejected the operation; `message` is shown to the user
  #[error("{message}")]
  GraphQl { message: String },

  /// The response carried neither data nor errors for the operation
  #[error("No data returned for {operation}")]
  MissingData { operation: &'static str },

  #[error("Failed to decode {operation} response: {source}")]
  Decode {
    operation: &'static str,
    #[source]
    source: serde_json::Error,
  },

  /// A record failed validation at the API boundary
  #[error("Invalid {entity} record: {reason}")]
  InvalidRecord { entity: &'static str, reason: String },
}

impl ApiError {
  /// The server answered but refused the operation (as opposed to the
  /// request failing to reach it).
  pub fn is_rejected(&self) -> bool {
    matches!(
      self,
      ApiError::GraphQl { .. } | ApiError::MissingData { .. }
    )
  }

  pub(crate) fn invalid(entity: &'static str, reason: impl Into<String>) -> Self {
    ApiError::InvalidRecord {
      entity,
      reason: reason.into(),
    }
  }
}

/// Remove the `GraphQL error: ` prefix some servers put in front of messages.
pub fn strip_graphql_prefix(message: &str) -> &str {
  message
    .strip_prefix("GraphQL error: ")
    .unwrap_or(message)
    .trim()
}
