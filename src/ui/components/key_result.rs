/// Outcome of offering a key to a component.
///
/// Components never act on their parent directly; they hand back an event and
/// the view decides what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed with nothing to report
  Handled,
  /// Consumed, and the parent has something to act on
  Event(T),
  /// Not for this component; offer it to the next one
  NotHandled,
}

impl<T> KeyResult<T> {
  /// True unless the key should travel further
  pub fn is_consumed(&self) -> bool {
    !matches!(self, KeyResult::NotHandled)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_only_not_handled_passes_through() {
    assert!(KeyResult::<()>::Handled.is_consumed());
    assert!(KeyResult::Event(1).is_consumed());
    assert!(!KeyResult::<()>::NotHandled.is_consumed());
  }
}
