use super::{Block, Link, PageContext, View};
use crate::identity::Role;

pub const TITLE: &str = "Library Management System";

/// Landing page; its menu depends on who is logged in.
pub fn render(ctx: &PageContext<'_>) -> View {
    let state = ctx.session.snapshot();
    if state.hydrating {
        return View::placeholder();
    }
    let mut view = View::new(TITLE);
    let Some(user) = state.identity else {
        view.push(Block::Text("Please login or sign up to continue.".into()));
        view.push(Block::Links(vec![Link::path("Login", "/login"), Link::path("Sign Up", "/signup")]));
        return view;
    };
    view.push(Block::Text(format!("Welcome, {}!", user.username)));
    let mut links = vec![Link::path("Book Catalog", "/books"), Link::path("Popular Books", "/books/popular")];
    match user.role {
        Role::Librarian => {
            links.push(Link::path("Add Book", "/books/add"));
            links.push(Link::path("Orders", "/orders"));
        }
        Role::Reader => links.push(Link::path("My Orders", "/my_orders")),
    }
    links.push(Link::command("Logout", "logout"));
    view.push(Block::Links(links));
    view
}
