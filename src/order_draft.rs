//! The order being assembled in the new-order view.

use thiserror::Error;

use crate::api::types::{Client, OrderInput, OrderLineInput, OrderStatus, Product};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
  #[error("Select a client for the order")]
  NoClient,
  #[error("Add at least one product")]
  NoLines,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
  pub product: Product,
  pub quantity: u32,
}

impl DraftLine {
  pub fn subtotal(&self) -> f64 {
    self.product.price * f64::from(self.quantity)
  }
}

/// Client plus product quantities; lines keep the order products were added
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
  client: Option<Client>,
  lines: Vec<DraftLine>,
}

impl OrderDraft {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn client(&self) -> Option<&Client> {
    self.client.as_ref()
  }

  pub fn select_client(&mut self, client: Client) {
    self.client = Some(client);
  }

  pub fn lines(&self) -> &[DraftLine] {
    &self.lines
  }

  pub fn quantity(&self, product_id: &str) -> u32 {
    self
      .lines
      .iter()
      .find(|l| l.product.id == product_id)
      .map_or(0, |l| l.quantity)
  }

  /// Set a product's quantity, capped at its stock. Zero removes the line.
  ///
  /// Returns the quantity actually applied.
  pub fn set_quantity(&mut self, product: &Product, quantity: u32) -> u32 {
    let quantity = quantity.min(product.stock);
    let existing = self.lines.iter().position(|l| l.product.id == product.id);

    match (existing, quantity) {
      (Some(i), 0) => {
        self.lines.remove(i);
      }
      (Some(i), q) => {
        self.lines[i].quantity = q;
        self.lines[i].product = product.clone();
      }
      (None, 0) => {}
      (None, q) => self.lines.push(DraftLine {
        product: product.clone(),
        quantity: q,
      }),
    }
    quantity
  }

  pub fn increment(&mut self, product: &Product) -> u32 {
    let next = self.quantity(&product.id).saturating_add(1);
    self.set_quantity(product, next)
  }

  pub fn decrement(&mut self, product: &Product) -> u32 {
    let next = self.quantity(&product.id).saturating_sub(1);
    self.set_quantity(product, next)
  }

  pub fn total(&self) -> f64 {
    self.lines.iter().map(DraftLine::subtotal).sum()
  }

  pub fn validate(&self) -> Result<(), DraftError> {
    if self.client.is_none() {
      return Err(DraftError::NoClient);
    }
    if self.lines.is_empty() {
      return Err(DraftError::NoLines);
    }
    Ok(())
  }

  /// Build the mutation input; new orders start pending
  pub fn to_input(&self) -> Result<OrderInput, DraftError> {
    self.validate()?;
    let client = self.client.as_ref().ok_or(DraftError::NoClient)?;

    Ok(OrderInput {
      client_id: client.id.clone(),
      lines: self
        .lines
        .iter()
        .map(|l| OrderLineInput {
          product_id: l.product.id.clone(),
          name: l.product.name.clone(),
          quantity: l.quantity,
          price: l.product.price,
        })
        .collect(),
      total: self.total(),
      status: OrderStatus::Pending,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product(id: &str, price: f64, stock: u32) -> Product {
    Product {
      id: id.to_string(),
      name: format!("product {}", id),
      price,
      stock,
    }
  }

  fn client() -> Client {
    Client {
      id: "c1".into(),
      first_name: "Ana".into(),
      last_name: "Ruiz".into(),
      company: "Acme".into(),
      email: "ana@acme.com".into(),
      phone: None,
    }
  }

  #[test]
  fn test_quantity_capped_by_stock() {
    let mut draft = OrderDraft::new();
    let p = product("p1", 10.0, 2);
    assert_eq!(draft.set_quantity(&p, 5), 2);
    assert_eq!(draft.increment(&p), 2);
    assert_eq!(draft.quantity("p1"), 2);
  }

  #[test]
  fn test_zero_removes_line() {
    let mut draft = OrderDraft::new();
    let p = product("p1", 10.0, 5);
    draft.increment(&p);
    draft.decrement(&p);
    assert!(draft.lines().is_empty());
    // Decrementing an absent product stays at zero
    assert_eq!(draft.decrement(&p), 0);
  }

  #[test]
  fn test_out_of_stock_product_cannot_be_added() {
    let mut draft = OrderDraft::new();
    assert_eq!(draft.increment(&product("p1", 10.0, 0)), 0);
    assert!(draft.lines().is_empty());
  }

  #[test]
  fn test_total() {
    let mut draft = OrderDraft::new();
    draft.set_quantity(&product("p1", 10.5, 9), 2);
    draft.set_quantity(&product("p2", 3.0, 9), 3);
    assert!((draft.total() - 30.0).abs() < f64::EPSILON);
  }

  #[test]
  fn test_validation_order() {
    let mut draft = OrderDraft::new();
    assert_eq!(draft.validate(), Err(DraftError::NoClient));
    draft.select_client(client());
    assert_eq!(draft.validate(), Err(DraftError::NoLines));
    draft.increment(&product("p1", 1.0, 1));
    assert_eq!(draft.validate(), Ok(()));
  }

  #[test]
  fn test_to_input() {
    let mut draft = OrderDraft::new();
    draft.select_client(client());
    draft.set_quantity(&product("p2", 4.0, 10), 3);
    draft.set_quantity(&product("p1", 2.5, 10), 2);

    let input = draft.to_input().unwrap();
    assert_eq!(input.client_id, "c1");
    assert_eq!(input.status, OrderStatus::Pending);
    let ids: Vec<_> = input.lines.iter().map(|l| l.product_id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p1"]);
    assert!((input.total - 17.0).abs() < f64::EPSILON);
  }
}
