//! Domain types used throughout the application.
//!
//! These are decoded from the wire types in `api_types` and are what the
//! cache stores and the views render.

use serde::{Deserialize, Serialize};

/// A client owned by the signed-in salesperson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
  pub company: String,
  pub email: String,
  pub phone: Option<String>,
}

impl Client {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Fields submitted by the client form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientInput {
  pub first_name: String,
  pub last_name: String,
  pub company: String,
  pub email: String,
  pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: String,
  pub name: String,
  pub price: f64,
  pub stock: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductInput {
  pub name: String,
  pub price: f64,
  pub stock: u32,
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
  #[default]
  #[serde(rename = "PENDIENTE")]
  Pending,
  #[serde(rename = "COMPLETADO")]
  Completed,
  #[serde(rename = "CANCELADO")]
  Canceled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 3] = [
    OrderStatus::Completed,
    OrderStatus::Pending,
    OrderStatus::Canceled,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "Pending",
      OrderStatus::Completed => "Completed",
      OrderStatus::Canceled => "Canceled",
    }
  }
}

/// Client contact details denormalized into an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderClient {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub phone: Option<String>,
}

impl OrderClient {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
  /// Product id
  pub id: String,
  pub quantity: u32,
  /// Product name at the time of ordering
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: String,
  /// Owning salesperson id
  pub seller: String,
  pub client: OrderClient,
  pub lines: Vec<OrderLine>,
  pub total: f64,
  pub status: OrderStatus,
}

/// A line of a new order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineInput {
  pub product_id: String,
  pub name: String,
  pub quantity: u32,
  pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderInput {
  pub client_id: String,
  pub lines: Vec<OrderLineInput>,
  pub total: f64,
  pub status: OrderStatus,
}

/// The signed-in salesperson
#[derive(Debug, Clone, PartialEq)]
pub struct User {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
}

impl User {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
  pub email: String,
  pub password: String,
}

/// Sales total per salesperson
#[derive(Debug, Clone, PartialEq)]
pub struct TopSeller {
  pub name: String,
  pub email: String,
  pub total: f64,
}

/// Purchase total per client
#[derive(Debug, Clone, PartialEq)]
pub struct TopClient {
  pub name: String,
  pub company: String,
  pub total: f64,
}
