mod client_form;
mod client_list;
mod login;
mod new_order;
mod order_list;
mod product_form;
mod product_list;
mod ranking;

pub use client_form::ClientFormView;
pub use client_list::ClientListView;
pub use login::LoginView;
pub use new_order::NewOrderView;
pub use order_list::OrderListView;
pub use product_form::ProductFormView;
pub use product_list::ProductListView;
pub use ranking::RankingView;
