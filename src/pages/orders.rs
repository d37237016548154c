use uuid::Uuid;

use super::{format_date, Block, Link, Outcome, PageContext, PageState, View};
use crate::api::{NewOrder, Order, OrderStatus, OrderType};
use crate::error::{AppError, AppResult};

/// Librarian queue of active orders, optionally filtered by username.
pub async fn render_orders(ctx: &PageContext<'_>, state: &PageState) -> View {
    let limit = ctx.config.orders_page_size;
    let mut view = View::new("Active Orders").with(Block::Links(vec![Link::path("Home", "/home")]));
    if !state.search.trim().is_empty() {
        view.push(Block::Text(format!("Search by username: {}", state.search.trim())));
    }
    let filter = Some(state.search.as_str()).filter(|s| !s.trim().is_empty());
    match ctx.api().orders(filter, limit, state.offset(limit)).await {
        Ok(page) => {
            let shown: Vec<&Order> = page.items.iter().filter(|o| !state.dismissed.contains(&o.order_id)).collect();
            if shown.is_empty() {
                view.push(Block::Text("No active orders found.".into()));
                return view;
            }
            let rows = shown
                .iter()
                .map(|o| {
                    vec![
                        o.order_id.to_string(),
                        o.username.clone().unwrap_or_default(),
                        o.book_title.clone().unwrap_or_default(),
                        o.order_type.to_string(),
                        format_date(o.order_date.as_ref()),
                        format_date(o.due_date.as_ref()),
                        o.status.as_str().to_string(),
                        action_label(o.status),
                    ]
                })
                .collect();
            view.push(Block::Table {
                columns: cols(&["Order ID", "Username", "Book Title", "Order Type", "Order Date", "Due Date", "Status", "Action"]),
                rows,
            });
            view.push(Block::Pager { page: state.page, has_prev: state.page > 1, has_next: page.has_next });
        }
        Err(e) => {
            view.push(Block::Error(e.user_message("Failed to load orders.")));
            view.push(Block::Text("No active orders found.".into()));
        }
    }
    view
}

fn action_label(status: OrderStatus) -> String {
    match status {
        OrderStatus::Completed => "Completed".into(),
        OrderStatus::Pending | OrderStatus::Overdue => "complete <id>".into(),
    }
}

/// The logged-in reader's own orders.
pub async fn render_my_orders(ctx: &PageContext<'_>, state: &PageState) -> View {
    let limit = ctx.config.orders_page_size;
    let mut view = View::new("My Active Orders").with(Block::Links(vec![Link::path("Home", "/home")]));
    if ctx.session.identity().is_none() {
        return view;
    }
    match ctx.api().my_orders(limit, state.offset(limit)).await {
        Ok(page) if page.items.is_empty() => view.push(Block::Text("No active orders found.".into())),
        Ok(page) => {
            let rows = page
                .items
                .iter()
                .map(|o| {
                    vec![
                        o.book_title.clone().unwrap_or_default(),
                        o.order_type.to_string(),
                        format_date(o.order_date.as_ref()),
                        format_date(o.due_date.as_ref()),
                        o.status.as_str().to_string(),
                    ]
                })
                .collect();
            view.push(Block::Table { columns: cols(&["Book Title", "Order Type", "Order Date", "Due Date", "Status"]), rows });
            view.push(Block::Pager { page: state.page, has_prev: state.page > 1, has_next: page.has_next });
        }
        Err(e) => {
            view.push(Block::Error(e.user_message("Failed to load orders.")));
            view.push(Block::Text("No active orders found.".into()));
        }
    }
    view
}

/// Mark an order completed. On success the caller hides the row.
pub async fn complete(ctx: &PageContext<'_>, order_id: &str) -> Outcome {
    if order_id.trim().is_empty() {
        return Outcome::Failed("Order ID is required.".into());
    }
    match ctx.api().complete_order(order_id.trim()).await {
        Ok(()) => Outcome::Stay,
        Err(e) => Outcome::Failed(e.user_message("Failed to complete order.")),
    }
}

pub fn render_make_order(book_id: Option<&str>) -> View {
    let mut view = View::new("Place an Order").with(Block::Links(vec![Link::path("Home", "/home")]));
    if let Some(b) = book_id {
        view.push(Block::Fields(vec![("Book ID".into(), b.to_string())]));
    }
    view.push(Block::Text("order <borrow|read_in_library>".into()));
    view.push(Block::Text("If you borrow a book, you can keep it for up to 7 days. Please return it by the due date.".into()));
    view
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub book_id: Option<String>,
    pub order_type: String,
}

impl OrderForm {
    pub fn validate(&self) -> AppResult<NewOrder> {
        let book_id = self.book_id.as_deref().map(str::trim).filter(|b| !b.is_empty());
        let (Some(book_id), false) = (book_id, self.order_type.trim().is_empty()) else {
            return Err(AppError::validation("required", "Book ID and order type are required."));
        };
        let book_id = Uuid::parse_str(book_id).map_err(|_| AppError::validation("bad_book_id", "Book ID is not valid."))?;
        let order_type = self.order_type.parse::<OrderType>()?;
        Ok(NewOrder { book_id, order_type })
    }
}

pub async fn submit_order(ctx: &PageContext<'_>, form: &OrderForm) -> Outcome {
    let order = match form.validate() {
        Ok(o) => o,
        Err(e) => return Outcome::Failed(e.user_message("")),
    };
    match ctx.api().place_order(&order).await {
        Ok(()) => Outcome::Navigate("/my_orders".into()),
        Err(e) => Outcome::Failed(e.user_message("Failed to submit order.")),
    }
}

fn cols(names: &[&str]) -> Vec<String> { names.iter().map(|s| s.to_string()).collect() }
