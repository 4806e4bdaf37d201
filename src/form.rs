//! Declarative form schemas and validation state.
//!
//! A schema lists fields and their rules. `FormState` holds the raw text of
//! every field plus which fields the user has left at least once; errors are
//! computed from the values on demand and only shown for touched fields.

use std::collections::BTreeMap;
use std::num::IntErrorKind;

/// A validation rule applied to a field's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
  /// Non-blank
  Required,
  /// Looks like an email address
  Email,
  /// Parses as a number
  Number,
  /// Numeric value greater than zero
  Positive,
  /// Whole number that fits a stock count (`u32`)
  Integer,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
  pub name: &'static str,
  pub label: &'static str,
  pub rules: &'static [Rule],
  /// Render as bullets (passwords)
  pub masked: bool,
}

impl FieldSpec {
  const fn new(name: &'static str, label: &'static str, rules: &'static [Rule]) -> Self {
    Self {
      name,
      label,
      rules,
      masked: false,
    }
  }

  const fn masked(mut self) -> Self {
    self.masked = true;
    self
  }

  pub fn is_required(&self) -> bool {
    self.rules.contains(&Rule::Required)
  }

  /// First failing rule's message, if any
  pub fn validate(&self, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
      return self
        .is_required()
        .then(|| format!("{} is required", self.label));
    }

    self.rules.iter().find_map(|rule| match rule {
      Rule::Required => None,
      Rule::Email => (!is_email(value)).then(|| "Invalid email".to_string()),
      Rule::Number => value
        .parse::<f64>()
        .map_or(true, |n| !n.is_finite())
        .then(|| format!("{} must be a number", self.label)),
      Rule::Positive => value
        .parse::<f64>()
        .map_or(true, |n| n <= 0.0)
        .then(|| format!("{} must be greater than zero", self.label)),
      Rule::Integer => match value.parse::<u32>() {
        Ok(_) => None,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
          Some(format!("{} is too large", self.label))
        }
        Err(_) => Some(format!("{} must be a whole number", self.label)),
      },
    })
  }
}

fn is_email(value: &str) -> bool {
  if value.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = value.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && domain
      .split_once('.')
      .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[derive(Debug)]
pub struct Schema {
  pub fields: &'static [FieldSpec],
}

impl Schema {
  #[cfg(test)]
  pub fn field(&self, name: &str) -> Option<&FieldSpec> {
    self.fields.iter().find(|f| f.name == name)
  }
}

pub const CLIENT_SCHEMA: Schema = Schema {
  fields: &[
    FieldSpec::new("first_name", "First name", &[Rule::Required]),
    FieldSpec::new("last_name", "Last name", &[Rule::Required]),
    FieldSpec::new("company", "Company", &[Rule::Required]),
    FieldSpec::new("email", "Email", &[Rule::Required, Rule::Email]),
    FieldSpec::new("phone", "Phone", &[]),
  ],
};

pub const PRODUCT_SCHEMA: Schema = Schema {
  fields: &[
    FieldSpec::new("name", "Name", &[Rule::Required]),
    FieldSpec::new(
      "stock",
      "Stock",
      &[Rule::Required, Rule::Number, Rule::Positive, Rule::Integer],
    ),
    FieldSpec::new(
      "price",
      "Price",
      &[Rule::Required, Rule::Number, Rule::Positive],
    ),
  ],
};

pub const LOGIN_SCHEMA: Schema = Schema {
  fields: &[
    FieldSpec::new("email", "Email", &[Rule::Required, Rule::Email]),
    FieldSpec::new("password", "Password", &[Rule::Required]).masked(),
  ],
};

/// Values and touched flags of one form
#[derive(Debug, Clone)]
pub struct FormState {
  schema: &'static Schema,
  values: Vec<String>,
  touched: Vec<bool>,
}

impl FormState {
  pub fn new(schema: &'static Schema) -> Self {
    Self {
      schema,
      values: vec![String::new(); schema.fields.len()],
      touched: vec![false; schema.fields.len()],
    }
  }

  pub fn schema(&self) -> &'static Schema {
    self.schema
  }

  fn index(&self, name: &str) -> Option<usize> {
    self.schema.fields.iter().position(|f| f.name == name)
  }

  pub fn value(&self, name: &str) -> &str {
    self
      .index(name)
      .map(|i| self.values[i].as_str())
      .unwrap_or_default()
  }

  pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
    if let Some(i) = self.index(name) {
      self.values[i] = value.into();
    }
  }

  /// Replace every value and forget touched state (loading a record to edit)
  pub fn reset(&mut self, values: &[(&str, String)]) {
    self.values.iter_mut().for_each(String::clear);
    self.touched.iter_mut().for_each(|t| *t = false);
    for (name, value) in values {
      self.set_value(name, value.clone());
    }
  }

  /// The user left the field
  pub fn blur(&mut self, name: &str) {
    if let Some(i) = self.index(name) {
      self.touched[i] = true;
    }
  }

  pub fn is_touched(&self, name: &str) -> bool {
    self.index(name).is_some_and(|i| self.touched[i])
  }

  /// Every current error, touched or not
  pub fn errors(&self) -> BTreeMap<&'static str, String> {
    self
      .schema
      .fields
      .iter()
      .zip(&self.values)
      .filter_map(|(field, value)| field.validate(value).map(|e| (field.name, e)))
      .collect()
  }

  /// Error to display next to a field
  pub fn visible_error(&self, name: &str) -> Option<String> {
    if !self.is_touched(name) {
      return None;
    }
    let i = self.index(name)?;
    self.schema.fields[i].validate(&self.values[i])
  }

  pub fn is_valid(&self) -> bool {
    self.errors().is_empty()
  }

  /// Touch every field; true when the form may be sent
  pub fn submit(&mut self) -> bool {
    self.touched.iter_mut().for_each(|t| *t = true);
    self.is_valid()
  }

  /// Trimmed text, `None` when blank
  pub fn optional(&self, name: &str) -> Option<String> {
    let value = self.value(name).trim();
    (!value.is_empty()).then(|| value.to_string())
  }

  pub fn text(&self, name: &str) -> String {
    self.value(name).trim().to_string()
  }

  pub fn number(&self, name: &str) -> Option<f64> {
    self.value(name).trim().parse().ok()
  }

  pub fn unsigned(&self, name: &str) -> Option<u32> {
    self.value(name).trim().parse().ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_errors_hidden_until_touched() {
    let mut form = FormState::new(&CLIENT_SCHEMA);
    assert!(!form.is_valid());
    assert_eq!(form.visible_error("first_name"), None);

    form.blur("first_name");
    assert_eq!(
      form.visible_error("first_name").as_deref(),
      Some("First name is required")
    );
    assert_eq!(form.visible_error("last_name"), None);
  }

  #[test]
  fn test_submit_touches_everything_and_blocks() {
    let mut form = FormState::new(&CLIENT_SCHEMA);
    form.set_value("first_name", "Ana");
    assert!(!form.submit());
    assert!(form.is_touched("company"));
    assert!(form.visible_error("email").is_some());
    // Optional field never errors
    assert_eq!(form.visible_error("phone"), None);
  }

  #[test]
  fn test_valid_client_form() {
    let mut form = FormState::new(&CLIENT_SCHEMA);
    form.set_value("first_name", "Ana");
    form.set_value("last_name", "Ruiz");
    form.set_value("company", "Acme");
    form.set_value("email", "ana@acme.com");
    assert!(form.submit());
    assert_eq!(form.optional("phone"), None);
  }

  #[test]
  fn test_email_rule() {
    let field = CLIENT_SCHEMA.field("email").unwrap();
    assert_eq!(field.validate("ana@acme.com"), None);
    for bad in ["ana", "ana@", "@acme.com", "ana@acme", "a na@acme.com", "a@b@c.com"] {
      assert_eq!(field.validate(bad).as_deref(), Some("Invalid email"), "{}", bad);
    }
  }

  #[test]
  fn test_product_numeric_rules() {
    let stock = PRODUCT_SCHEMA.field("stock").unwrap();
    assert_eq!(stock.validate("12"), None);
    assert_eq!(stock.validate("abc").as_deref(), Some("Stock must be a number"));
    assert_eq!(
      stock.validate("0").as_deref(),
      Some("Stock must be greater than zero")
    );
    assert_eq!(
      stock.validate("1.5").as_deref(),
      Some("Stock must be a whole number")
    );
    assert_eq!(stock.validate("4294967295"), None);
    assert_eq!(
      stock.validate("4294967296").as_deref(),
      Some("Stock is too large")
    );

    let price = PRODUCT_SCHEMA.field("price").unwrap();
    assert_eq!(price.validate("19.99"), None);
    assert!(price.validate("-3").is_some());
  }

  #[test]
  fn test_reset_clears_touched() {
    let mut form = FormState::new(&PRODUCT_SCHEMA);
    form.submit();
    form.reset(&[("name", "Laptop".to_string()), ("stock", "4".to_string())]);
    assert_eq!(form.value("name"), "Laptop");
    assert_eq!(form.value("price"), "");
    assert!(!form.is_touched("price"));
    assert_eq!(form.unsigned("stock"), Some(4));
  }

  #[test]
  fn test_login_password_is_masked() {
    assert!(LOGIN_SCHEMA.field("password").unwrap().masked);
    assert!(!LOGIN_SCHEMA.field("email").unwrap().masked);
  }
}
