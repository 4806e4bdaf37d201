use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::session::Session;

use super::api_types::{
  ApiAutenticarInput, ApiCliente, ApiClienteInput, ApiMejorCliente, ApiMejorVendedor, ApiPedido,
  ApiPedidoEstadoInput, ApiPedidoInput, ApiProducto, ApiProductoInput, ApiToken, ApiUsuario,
  GraphQlRequest, GraphQlResponse,
};
use super::error::{strip_graphql_prefix, ApiError};
use super::operations::{self, Operation};
use super::types::{
  Client, ClientInput, Credentials, Order, OrderInput, OrderStatus, Product, ProductInput,
  TopClient, TopSeller, User,
};

/// GraphQL API client
///
/// Every request reads the bearer token from the session at send time, so a
/// sign-in or sign-out takes effect on the next call.
#[derive(Clone)]
pub struct CrmClient {
  http: reqwest::Client,
  endpoint: Url,
  session: Session,
}

impl CrmClient {
  pub fn new(config: &Config, session: Session) -> color_eyre::Result<Self> {
    let endpoint = Url::parse(&config.api.url)
      .map_err(|e| color_eyre::eyre::eyre!("Invalid API url {}: {}", config.api.url, e))?;

    let http = reqwest::Client::builder()
      .timeout(config.request_timeout())
      .user_agent(concat!("crmtui/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| color_eyre::eyre::eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      endpoint,
      session,
    })
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  /// Send one operation and decode the value under `data.<operation name>`.
  async fn execute<V, D>(&self, operation: &Operation, variables: V) -> Result<D, ApiError>
  where
    V: Serialize,
    D: DeserializeOwned,
  {
    let body = GraphQlRequest {
      query: operation.document,
      operation_name: operation.name,
      variables,
    };

    let authorization = self
      .session
      .token()
      .map(|token| format!("Bearer {}", token))
      .unwrap_or_default();

    debug!(operation = operation.name, "sending request");
    let response = self
      .http
      .post(self.endpoint.clone())
      .header(AUTHORIZATION, authorization)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    let text = response.text().await?;

    match serde_json::from_str::<GraphQlResponse>(&text) {
      Ok(payload) => decode_payload(operation, payload),
      Err(_) if !status.is_success() => Err(ApiError::Status {
        status: status.as_u16(),
        body: text,
      }),
      Err(source) => Err(ApiError::Decode {
        operation: operation.name,
        source,
      }),
    }
  }

  // --------------------------------------------------------------------------
  // Session
  // --------------------------------------------------------------------------

  /// The signed-in salesperson; `MissingData` when the token is not accepted
  pub async fn current_user(&self) -> Result<User, ApiError> {
    let user: ApiUsuario = self.execute(&operations::CURRENT_USER, json!({})).await?;
    User::try_from(user)
  }

  /// Exchange credentials for a session token
  pub async fn authenticate(&self, credentials: &Credentials) -> Result<String, ApiError> {
    let token: ApiToken = self
      .execute(
        &operations::AUTHENTICATE,
        json!({ "input": ApiAutenticarInput::from(credentials) }),
      )
      .await?;
    info!(email = %credentials.email, "authenticated");
    Ok(token.token)
  }

  // --------------------------------------------------------------------------
  // Clients
  // --------------------------------------------------------------------------

  pub async fn clients(&self) -> Result<Vec<Client>, ApiError> {
    let clients: Vec<ApiCliente> = self.execute(&operations::CLIENTS, json!({})).await?;
    Ok(convert_list(clients))
  }

  pub async fn client(&self, id: &str) -> Result<Client, ApiError> {
    let client: ApiCliente = self
      .execute(&operations::CLIENT, json!({ "id": id }))
      .await?;
    Client::try_from(client)
  }

  pub async fn create_client(&self, input: &ClientInput) -> Result<Client, ApiError> {
    let client: ApiCliente = self
      .execute(
        &operations::NEW_CLIENT,
        json!({ "input": ApiClienteInput::from(input) }),
      )
      .await?;
    Client::try_from(client)
  }

  pub async fn update_client(&self, id: &str, input: &ClientInput) -> Result<Client, ApiError> {
    let client: ApiCliente = self
      .execute(
        &operations::UPDATE_CLIENT,
        json!({ "id": id, "input": ApiClienteInput::from(input) }),
      )
      .await?;
    Client::try_from(client)
  }

  /// Returns the server's confirmation message
  pub async fn delete_client(&self, id: &str) -> Result<String, ApiError> {
    self
      .execute(&operations::DELETE_CLIENT, json!({ "id": id }))
      .await
  }

  // --------------------------------------------------------------------------
  // Products
  // --------------------------------------------------------------------------

  pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
    let products: Vec<ApiProducto> = self.execute(&operations::PRODUCTS, json!({})).await?;
    Ok(convert_list(products))
  }

  pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
    let product: ApiProducto = self
      .execute(&operations::PRODUCT, json!({ "id": id }))
      .await?;
    Product::try_from(product)
  }

  pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
    let product: ApiProducto = self
      .execute(
        &operations::NEW_PRODUCT,
        json!({ "input": ApiProductoInput::from(input) }),
      )
      .await?;
    Product::try_from(product)
  }

  pub async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Product, ApiError> {
    let product: ApiProducto = self
      .execute(
        &operations::UPDATE_PRODUCT,
        json!({ "id": id, "input": ApiProductoInput::from(input) }),
      )
      .await?;
    Product::try_from(product)
  }

  pub async fn delete_product(&self, id: &str) -> Result<String, ApiError> {
    self
      .execute(&operations::DELETE_PRODUCT, json!({ "id": id }))
      .await
  }

  // --------------------------------------------------------------------------
  // Orders
  // --------------------------------------------------------------------------

  pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
    let orders: Vec<ApiPedido> = self.execute(&operations::ORDERS, json!({})).await?;
    Ok(convert_list(orders))
  }

  pub async fn create_order(&self, input: &OrderInput) -> Result<Order, ApiError> {
    let order: ApiPedido = self
      .execute(
        &operations::NEW_ORDER,
        json!({ "input": ApiPedidoInput::from(input) }),
      )
      .await?;
    Order::try_from(order)
  }

  pub async fn update_order_status(
    &self,
    id: &str,
    client_id: &str,
    status: OrderStatus,
  ) -> Result<Order, ApiError> {
    let input = ApiPedidoEstadoInput {
      estado: status,
      cliente: client_id,
    };
    let order: ApiPedido = self
      .execute(
        &operations::UPDATE_ORDER,
        json!({ "id": id, "input": input }),
      )
      .await?;
    Order::try_from(order)
  }

  pub async fn delete_order(&self, id: &str) -> Result<String, ApiError> {
    self
      .execute(&operations::DELETE_ORDER, json!({ "id": id }))
      .await
  }

  // --------------------------------------------------------------------------
  // Statistics
  // --------------------------------------------------------------------------

  pub async fn top_sellers(&self) -> Result<Vec<TopSeller>, ApiError> {
    let sellers: Vec<ApiMejorVendedor> = self.execute(&operations::TOP_SELLERS, json!({})).await?;
    Ok(sellers.into_iter().map(TopSeller::from).collect())
  }

  pub async fn top_clients(&self) -> Result<Vec<TopClient>, ApiError> {
    let clients: Vec<ApiMejorCliente> = self.execute(&operations::TOP_CLIENTS, json!({})).await?;
    Ok(clients.into_iter().map(TopClient::from).collect())
  }
}

/// Turn a GraphQL response into the operation's result.
///
/// The first error wins over any partial data.
fn decode_payload<D: DeserializeOwned>(
  operation: &Operation,
  payload: GraphQlResponse,
) -> Result<D, ApiError> {
  if let Some(error) = payload.errors.first() {
    return Err(ApiError::GraphQl {
      message: strip_graphql_prefix(&error.message).to_string(),
    });
  }

  let value = payload
    .data
    .and_then(|mut data| data.get_mut(operation.name).map(serde_json::Value::take))
    .filter(|value| !value.is_null())
    .ok_or(ApiError::MissingData {
      operation: operation.name,
    })?;

  serde_json::from_value(value).map_err(|source| ApiError::Decode {
    operation: operation.name,
    source,
  })
}

/// Convert wire records, dropping the ones that fail boundary validation.
fn convert_list<A, T>(records: Vec<A>) -> Vec<T>
where
  T: TryFrom<A, Error = ApiError>,
{
  records
    .into_iter()
    .filter_map(|record| match T::try_from(record) {
      Ok(value) => Some(value),
      Err(e) => {
        warn!(error = %e, "skipping invalid record");
        None
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload(value: serde_json::Value) -> GraphQlResponse {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_decode_returns_operation_field() {
    let result: Result<String, _> = decode_payload(
      &operations::DELETE_CLIENT,
      payload(json!({ "data": { "eliminarCliente": "Eliminado correctamente" } })),
    );
    assert_eq!(result.unwrap(), "Eliminado correctamente");
  }

  #[test]
  fn test_decode_error_strips_prefix() {
    let result: Result<String, _> = decode_payload(
      &operations::NEW_CLIENT,
      payload(json!({
        "data": null,
        "errors": [{ "message": "GraphQL error: Ese cliente ya esta registrado" }]
      })),
    );
    assert_eq!(
      result.unwrap_err().to_string(),
      "Ese cliente ya esta registrado"
    );
  }

  #[test]
  fn test_decode_null_field_is_missing_data() {
    let result: Result<ApiUsuario, _> = decode_payload(
      &operations::CURRENT_USER,
      payload(json!({ "data": { "obtenerUsuario": null } })),
    );
    assert!(matches!(
      result.unwrap_err(),
      ApiError::MissingData {
        operation: "obtenerUsuario"
      }
    ));
  }

  #[test]
  fn test_decode_wrong_shape_is_decode_error() {
    let result: Result<Vec<ApiCliente>, _> = decode_payload(
      &operations::CLIENTS,
      payload(json!({ "data": { "obtenerClientesVendedor": "nope" } })),
    );
    assert!(matches!(result.unwrap_err(), ApiError::Decode { .. }));
  }

  #[test]
  fn test_convert_list_skips_invalid_records() {
    let records: Vec<ApiProducto> = serde_json::from_value(json!([
      { "id": "p1", "nombre": "Laptop", "precio": 10.0, "existencia": 3 },
      { "nombre": "sin id", "precio": 1.0, "existencia": 1 },
      { "id": "p3", "nombre": "Mouse", "precio": 2.0, "existencia": -1 }
    ]))
    .unwrap();

    let products: Vec<Product> = convert_list(records);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "p1");
  }
}
