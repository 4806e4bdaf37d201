//! GraphQL documents sent to the API.
//!
//! The operation name doubles as the root field of the response's `data`.

/// A named GraphQL operation
#[derive(Debug, Clone, Copy)]
pub struct Operation {
  pub name: &'static str,
  pub document: &'static str,
}

pub const CURRENT_USER: Operation = Operation {
  name: "obtenerUsuario",
  document: r#"
query obtenerUsuario {
  obtenerUsuario { id nombre apellido }
}"#,
};

pub const AUTHENTICATE: Operation = Operation {
  name: "autenticarUsuario",
  document: r#"
mutation autenticarUsuario($input: AutenticarInput) {
  autenticarUsuario(input: $input) { token }
}"#,
};

// ----------------------------------------------------------------------------
// Clients
// ----------------------------------------------------------------------------

pub const CLIENTS: Operation = Operation {
  name: "obtenerClientesVendedor",
  document: r#"
query obtenerClientesVendedor {
  obtenerClientesVendedor { id nombre apellido empresa email telefono }
}"#,
};

pub const CLIENT: Operation = Operation {
  name: "obtenerCliente",
  document: r#"
query obtenerCliente($id: ID!) {
  obtenerCliente(id: $id) { id nombre apellido empresa email telefono }
}"#,
};

pub const NEW_CLIENT: Operation = Operation {
  name: "nuevoCliente",
  document: r#"
mutation nuevoCliente($input: ClienteInput) {
  nuevoCliente(input: $input) { id nombre apellido empresa email telefono }
}"#,
};

pub const UPDATE_CLIENT: Operation = Operation {
  name: "actualizarCliente",
  document: r#"
mutation actualizarCliente($id: ID!, $input: ClienteInput) {
  actualizarCliente(id: $id, input: $input) { id nombre apellido empresa email telefono }
}"#,
};

pub const DELETE_CLIENT: Operation = Operation {
  name: "eliminarCliente",
  document: r#"
mutation eliminarCliente($id: ID!) {
  eliminarCliente(id: $id)
}"#,
};

// ----------------------------------------------------------------------------
// Products
// ----------------------------------------------------------------------------

pub const PRODUCTS: Operation = Operation {
  name: "obtenerProductos",
  document: r#"
query obtenerProductos {
  obtenerProductos { id nombre precio existencia }
}"#,
};

pub const PRODUCT: Operation = Operation {
  name: "obtenerProducto",
  document: r#"
query obtenerProducto($id: ID!) {
  obtenerProducto(id: $id) { id nombre precio existencia }
}"#,
};

pub const NEW_PRODUCT: Operation = Operation {
  name: "nuevoProducto",
  document: r#"
mutation nuevoProducto($input: ProductoInput) {
  nuevoProducto(input: $input) { id nombre precio existencia }
}"#,
};

pub const UPDATE_PRODUCT: Operation = Operation {
  name: "actualizarProducto",
  document: r#"
mutation actualizarProducto($id: ID!, $input: ProductoInput) {
  actualizarProducto(id: $id, input: $input) { id nombre precio existencia }
}"#,
};

pub const DELETE_PRODUCT: Operation = Operation {
  name: "eliminarProducto",
  document: r#"
mutation eliminarProducto($id: ID!) {
  eliminarProducto(id: $id)
}"#,
};

// ----------------------------------------------------------------------------
// Orders
// ----------------------------------------------------------------------------

pub const ORDERS: Operation = Operation {
  name: "obtenerPedidosVendedor",
  document: r#"
query obtenerPedidosVendedor {
  obtenerPedidosVendedor {
    id
    pedido { id cantidad nombre }
    cliente { id nombre apellido email telefono }
    vendedor
    total
    estado
  }
}"#,
};

pub const NEW_ORDER: Operation = Operation {
  name: "nuevoPedido",
  document: r#"
mutation nuevoPedido($input: PedidoInput) {
  nuevoPedido(input: $input) {
    id
    pedido { id cantidad nombre }
    cliente { id nombre apellido email telefono }
    vendedor
    total
    estado
  }
}"#,
};

pub const UPDATE_ORDER: Operation = Operation {
  name: "actualizarPedido",
  document: r#"
mutation actualizarPedido($id: ID!, $input: PedidoInput) {
  actualizarPedido(id: $id, input: $input) {
    id
    pedido { id cantidad nombre }
    cliente { id nombre apellido email telefono }
    vendedor
    total
    estado
  }
}"#,
};

pub const DELETE_ORDER: Operation = Operation {
  name: "eliminarPedido",
  document: r#"
mutation eliminarPedido($id: ID!) {
  eliminarPedido(id: $id)
}"#,
};

// ----------------------------------------------------------------------------
// Statistics
// ----------------------------------------------------------------------------

pub const TOP_SELLERS: Operation = Operation {
  name: "mejoresVendedores",
  document: r#"
query mejoresVendedores {
  mejoresVendedores {
    vendedor { nombre email }
    total
  }
}"#,
};

pub const TOP_CLIENTS: Operation = Operation {
  name: "mejoresClientes",
  document: r#"
query mejoresClientes {
  mejoresClientes {
    cliente { nombre empresa }
    total
  }
}"#,
};
