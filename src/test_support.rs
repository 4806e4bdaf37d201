//! Fixtures shared by view and client tests: a scripted GraphQL backend and
//! ready-made view contexts.

use axum::extract::State;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};

use crate::api::types::{Client, Order, OrderClient, OrderLine, OrderStatus};
use crate::api::CachedCrmClient;
use crate::config::Config;
use crate::event::{Event, Notice, Notifier};
use crate::session::{LocalStorage, Session};
use crate::ui::view::ViewContext;

#[derive(Default)]
struct Script {
  replies: VecDeque<Value>,
  operations: Vec<String>,
}

type SharedScript = Arc<Mutex<Script>>;

/// GraphQL endpoint answering from a queue of replies.
///
/// Each request records its `operationName`. A request with nothing queued
/// gets a GraphQL error back.
pub struct MockGraphQl {
  addr: SocketAddr,
  script: SharedScript,
  shutdown: watch::Sender<bool>,
}

impl MockGraphQl {
  pub async fn start() -> Self {
    let script = SharedScript::default();
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let app = Router::new().fallback(answer).with_state(script.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
      .await
      .expect("bind mock GraphQL server");
    let addr = listener.local_addr().expect("mock server address");

    tokio::spawn(async move {
      axum::serve(listener, app)
        .with_graceful_shutdown(async move {
          let _ = shutdown_rx.changed().await;
        })
        .await
        .ok();
    });

    Self {
      addr,
      script,
      shutdown,
    }
  }

  pub fn url(&self) -> String {
    format!("http://{}/graphql", self.addr)
  }

  /// Queue the `data` object of the next response
  pub fn reply(&self, data: Value) {
    self
      .script
      .lock()
      .unwrap()
      .replies
      .push_back(json!({ "data": data }));
  }

  /// Operation names received so far, oldest first
  pub fn operations(&self) -> Vec<String> {
    self.script.lock().unwrap().operations.clone()
  }
}

impl Drop for MockGraphQl {
  fn drop(&mut self) {
    let _ = self.shutdown.send(true);
  }
}

async fn answer(State(script): State<SharedScript>, Json(body): Json<Value>) -> Json<Value> {
  let mut script = script.lock().unwrap();
  let operation = body["operationName"].as_str().unwrap_or_default().to_string();
  script.operations.push(operation);
  let reply = script
    .replies
    .pop_front()
    .unwrap_or_else(|| json!({ "errors": [{ "message": "no reply queued" }] }));
  Json(reply)
}

/// A signed-in client talking to `url`
pub fn crm_at(url: &str) -> CachedCrmClient {
  let mut config = Config::default();
  config.api.url = url.to_string();
  config.api.timeout_secs = 2;
  let session = Session::new(
    LocalStorage::open_in_memory().unwrap(),
    Some("token".to_string()),
  );
  CachedCrmClient::new(&config, session).unwrap()
}

/// A signed-in client whose endpoint refuses every connection
pub fn unreachable_crm() -> CachedCrmClient {
  crm_at("http://127.0.0.1:1")
}

pub fn view_context(crm: CachedCrmClient) -> (ViewContext, mpsc::UnboundedReceiver<Event>) {
  let (tx, rx) = mpsc::unbounded_channel();
  let ctx = ViewContext {
    crm,
    notifier: Notifier::new(tx),
  };
  (ctx, rx)
}

pub fn client(id: &str, name: &str) -> Client {
  Client {
    id: id.to_string(),
    first_name: name.to_string(),
    last_name: "Test".to_string(),
    company: "Acme".to_string(),
    email: format!("{}@acme.com", name.to_lowercase()),
    phone: None,
  }
}

pub fn order(id: &str, total: f64) -> Order {
  Order {
    id: id.to_string(),
    seller: "s1".to_string(),
    client: OrderClient {
      id: "1".to_string(),
      first_name: "Ana".to_string(),
      last_name: "Test".to_string(),
      email: "ana@acme.com".to_string(),
      phone: None,
    },
    lines: vec![OrderLine {
      id: "p1".to_string(),
      quantity: 1,
      name: "Laptop".to_string(),
    }],
    total,
    status: OrderStatus::Pending,
  }
}

/// Poll `check` every 10ms for up to 3 seconds
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
  for _ in 0..300 {
    if check() {
      return true;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  false
}

/// The next notice posted on the channel
pub async fn next_notice(rx: &mut mpsc::UnboundedReceiver<Event>) -> Notice {
  loop {
    let event = tokio::time::timeout(Duration::from_secs(3), rx.recv())
      .await
      .expect("no notice within 3s")
      .expect("notifier channel closed");
    if let Event::Notice(notice) = event {
      return notice;
    }
  }
}
