//! Serde types matching the GraphQL API's payloads.
//!
//! These are separate from domain types so the loosely shaped wire format
//! (Spanish field names, nullable everything) is validated in one place and
//! the rest of the application works with typed records.

use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::types::{
  Client, ClientInput, Credentials, Order, OrderClient, OrderInput, OrderLine, OrderStatus,
  Product, ProductInput, TopClient, TopSeller, User,
};

// ============================================================================
// GraphQL envelope
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V> {
  pub query: &'a str,
  #[serde(rename = "operationName")]
  pub operation_name: &'a str,
  pub variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
  pub data: Option<serde_json::Value>,
  #[serde(default)]
  pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
  pub message: String,
}

/// Some aggregate fields come back as a one-element list, some as an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
  One(T),
  Many(Vec<T>),
}

impl<T> OneOrMany<T> {
  pub fn into_first(self) -> Option<T> {
    match self {
      OneOrMany::One(v) => Some(v),
      OneOrMany::Many(v) => v.into_iter().next(),
    }
  }
}

// ============================================================================
// Response records
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiUsuario {
  pub id: Option<String>,
  pub nombre: Option<String>,
  pub apellido: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiToken {
  pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiCliente {
  pub id: Option<String>,
  pub nombre: Option<String>,
  pub apellido: Option<String>,
  pub empresa: Option<String>,
  pub email: Option<String>,
  pub telefono: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiProducto {
  pub id: Option<String>,
  pub nombre: Option<String>,
  pub precio: Option<f64>,
  pub existencia: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiArticulo {
  pub id: Option<String>,
  pub cantidad: Option<i64>,
  pub nombre: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiPedido {
  pub id: Option<String>,
  #[serde(default)]
  pub pedido: Vec<ApiArticulo>,
  pub cliente: Option<ApiCliente>,
  pub vendedor: Option<String>,
  pub total: Option<f64>,
  pub estado: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ApiVendedorResumen {
  pub nombre: Option<String>,
  pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMejorVendedor {
  pub vendedor: Option<OneOrMany<ApiVendedorResumen>>,
  pub total: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiClienteResumen {
  pub nombre: Option<String>,
  pub empresa: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMejorCliente {
  pub cliente: Option<OneOrMany<ApiClienteResumen>>,
  pub total: Option<f64>,
}

// ============================================================================
// Request inputs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiAutenticarInput<'a> {
  pub email: &'a str,
  pub password: &'a str,
}

impl<'a> From<&'a Credentials> for ApiAutenticarInput<'a> {
  fn from(c: &'a Credentials) -> Self {
    Self {
      email: &c.email,
      password: &c.password,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ApiClienteInput<'a> {
  pub nombre: &'a str,
  pub apellido: &'a str,
  pub empresa: &'a str,
  pub email: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub telefono: Option<&'a str>,
}

impl<'a> From<&'a ClientInput> for ApiClienteInput<'a> {
  fn from(input: &'a ClientInput) -> Self {
    Self {
      nombre: &input.first_name,
      apellido: &input.last_name,
      empresa: &input.company,
      email: &input.email,
      telefono: input.phone.as_deref(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ApiProductoInput<'a> {
  pub nombre: &'a str,
  pub existencia: u32,
  pub precio: f64,
}

impl<'a> From<&'a ProductInput> for ApiProductoInput<'a> {
  fn from(input: &'a ProductInput) -> Self {
    Self {
      nombre: &input.name,
      existencia: input.stock,
      precio: input.price,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ApiArticuloInput<'a> {
  pub id: &'a str,
  pub cantidad: u32,
  pub nombre: &'a str,
  pub precio: f64,
}

#[derive(Debug, Serialize)]
pub struct ApiPedidoInput<'a> {
  pub pedido: Vec<ApiArticuloInput<'a>>,
  pub total: f64,
  pub cliente: &'a str,
  pub estado: OrderStatus,
}

impl<'a> From<&'a OrderInput> for ApiPedidoInput<'a> {
  fn from(input: &'a OrderInput) -> Self {
    Self {
      pedido: input
        .lines
        .iter()
        .map(|line| ApiArticuloInput {
          id: &line.product_id,
          cantidad: line.quantity,
          nombre: &line.name,
          precio: line.price,
        })
        .collect(),
      total: input.total,
      cliente: &input.client_id,
      estado: input.status,
    }
  }
}

/// Status change: the API wants the owning client alongside the new status
#[derive(Debug, Serialize)]
pub struct ApiPedidoEstadoInput<'a> {
  pub estado: OrderStatus,
  pub cliente: &'a str,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

fn require_id(id: Option<String>, entity: &'static str) -> Result<String, ApiError> {
  id.filter(|id| !id.is_empty())
    .ok_or_else(|| ApiError::invalid(entity, "missing id"))
}

fn non_negative(value: Option<i64>, entity: &'static str, field: &str) -> Result<u32, ApiError> {
  let value = value.unwrap_or_default();
  u32::try_from(value).map_err(|_| ApiError::invalid(entity, format!("{} out of range: {}", field, value)))
}

impl TryFrom<ApiUsuario> for User {
  type Error = ApiError;

  fn try_from(u: ApiUsuario) -> Result<Self, Self::Error> {
    Ok(User {
      id: require_id(u.id, "user")?,
      first_name: u.nombre.unwrap_or_default(),
      last_name: u.apellido.unwrap_or_default(),
    })
  }
}

impl TryFrom<ApiCliente> for Client {
  type Error = ApiError;

  fn try_from(c: ApiCliente) -> Result<Self, Self::Error> {
    Ok(Client {
      id: require_id(c.id, "client")?,
      first_name: c.nombre.unwrap_or_default(),
      last_name: c.apellido.unwrap_or_default(),
      company: c.empresa.unwrap_or_default(),
      email: c.email.unwrap_or_default(),
      phone: c.telefono.filter(|p| !p.is_empty()),
    })
  }
}

impl TryFrom<ApiProducto> for Product {
  type Error = ApiError;

  fn try_from(p: ApiProducto) -> Result<Self, Self::Error> {
    Ok(Product {
      id: require_id(p.id, "product")?,
      name: p.nombre.unwrap_or_default(),
      price: p.precio.unwrap_or_default(),
      stock: non_negative(p.existencia, "product", "stock")?,
    })
  }
}

impl TryFrom<ApiArticulo> for OrderLine {
  type Error = ApiError;

  fn try_from(a: ApiArticulo) -> Result<Self, Self::Error> {
    Ok(OrderLine {
      id: require_id(a.id, "order line")?,
      quantity: non_negative(a.cantidad, "order line", "quantity")?,
      name: a.nombre.unwrap_or_default(),
    })
  }
}

impl TryFrom<ApiPedido> for Order {
  type Error = ApiError;

  fn try_from(p: ApiPedido) -> Result<Self, Self::Error> {
    let id = require_id(p.id, "order")?;
    let cliente = p
      .cliente
      .ok_or_else(|| ApiError::invalid("order", format!("order {} has no client", id)))?;

    Ok(Order {
      seller: p.vendedor.unwrap_or_default(),
      client: OrderClient {
        id: require_id(cliente.id, "order client")?,
        first_name: cliente.nombre.unwrap_or_default(),
        last_name: cliente.apellido.unwrap_or_default(),
        email: cliente.email.unwrap_or_default(),
        phone: cliente.telefono.filter(|p| !p.is_empty()),
      },
      lines: p
        .pedido
        .into_iter()
        .map(OrderLine::try_from)
        .collect::<Result<_, _>>()?,
      total: p.total.unwrap_or_default(),
      status: p.estado.unwrap_or_default(),
      id,
    })
  }
}

impl From<ApiMejorVendedor> for TopSeller {
  fn from(v: ApiMejorVendedor) -> Self {
    let seller = v.vendedor.and_then(OneOrMany::into_first);
    TopSeller {
      name: seller
        .as_ref()
        .and_then(|s| s.nombre.clone())
        .unwrap_or_default(),
      email: seller.and_then(|s| s.email).unwrap_or_default(),
      total: v.total.unwrap_or_default(),
    }
  }
}

impl From<ApiMejorCliente> for TopClient {
  fn from(c: ApiMejorCliente) -> Self {
    let client = c.cliente.and_then(OneOrMany::into_first);
    TopClient {
      name: client
        .as_ref()
        .and_then(|s| s.nombre.clone())
        .unwrap_or_default(),
      company: client.and_then(|s| s.empresa).unwrap_or_default(),
      total: c.total.unwrap_or_default(),
    }
  }
}
