use tracing::debug;

use super::{excerpt, Block, Link, Outcome, PageContext, PageState, View};
use crate::api::NewBook;
use crate::error::{AppError, AppResult};
use crate::identity::Role;

pub async fn render_catalog(ctx: &PageContext<'_>, state: &PageState) -> View {
    let limit = ctx.config.books_page_size;
    let mut view = View::new("Library Catalog").with(Block::Links(vec![Link::path("Home", "/home")]));
    match ctx.api().books(limit, state.offset(limit)).await {
        Ok(page) => {
            let rows = page
                .items
                .iter()
                .map(|b| vec![b.book_id.to_string(), b.title.clone(), b.author.clone(), excerpt(b.description.as_deref())])
                .collect();
            view.push(Block::Table { columns: cols(&["ID", "Title", "Author", "Description"]), rows });
            view.push(Block::Pager { page: state.page, has_prev: state.page > 1, has_next: page.has_next });
        }
        Err(e) => {
            debug!(target: "libris::pages", error = %e, "catalog fetch failed");
            view.push(Block::Error(e.user_message("Failed to load books.")));
            view.push(Block::Pager { page: state.page, has_prev: state.page > 1, has_next: false });
        }
    }
    view
}

pub async fn render_book(ctx: &PageContext<'_>, id: &str) -> View {
    let book = match ctx.api().book(id).await {
        Ok(b) => b,
        Err(e) => return View::new("Book").with(Block::Error(e.user_message("Failed to load book details."))),
    };
    let mut fields = vec![("Author".to_string(), book.author.clone()), ("ISBN".to_string(), book.isbn.clone())];
    if let Some(y) = book.publication_year {
        fields.push(("Published".into(), y.to_string()));
    }
    if let Some(d) = book.description.as_ref().filter(|d| !d.is_empty()) {
        fields.push(("Description".into(), d.clone()));
    }
    fields.push((
        "Available copies".into(),
        book.available_copies.map(|c| c.to_string()).unwrap_or_else(|| "Unknown".into()),
    ));
    let mut view = View::new(book.title.clone())
        .with(Block::Links(vec![Link::path("Book Catalog", "/books")]))
        .with(Block::Fields(fields));
    // Ordering is offered to readers only
    if let Some(Role::Reader) = ctx.session.identity().map(|i| i.role) {
        if book.available_copies.unwrap_or(0) > 0 {
            view.push(Block::Links(vec![Link::path("Order", format!("/orders/make_order?book_id={}", book.book_id))]));
        } else {
            view.push(Block::Text("Not Available".into()));
        }
    }
    view
}

pub async fn render_popular(ctx: &PageContext<'_>) -> View {
    let mut view = View::new("Most Borrowed Books (Last 30 Days)").with(Block::Links(vec![Link::path("Home", "/home")]));
    match ctx.api().most_borrowed().await {
        Ok(books) if books.is_empty() => view.push(Block::Text("No popular books found this month.".into())),
        Ok(books) => {
            let rows = books
                .iter()
                .enumerate()
                .map(|(i, b)| vec![rank_badge(i), b.title.clone(), b.author.clone(), b.recent_orders.to_string(), b.book_id.to_string()])
                .collect();
            view.push(Block::Table { columns: cols(&["Rank", "Title", "Author", "Orders Last Month", "ID"]), rows });
        }
        Err(e) => view.push(Block::Error(e.user_message("Failed to load popular books."))),
    }
    view
}

fn rank_badge(index: usize) -> String {
    match index {
        0 => "🥇".into(),
        1 => "🥈".into(),
        2 => "🥉".into(),
        n => format!("#{}", n + 1),
    }
}

pub fn render_add_book() -> View {
    View::new("Add New Book")
        .with(Block::Links(vec![Link::path("Home", "/home")]))
        .with(Block::Text("add-book title=<..> author=<..> isbn=<13 digits> copies=<n> [year=<yyyy>] [description=<..>]".into()))
}

/// Raw add-book form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBookForm {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: String,
    pub description: String,
    pub num_copies: String,
}

impl NewBookForm {
    pub fn validate(&self) -> AppResult<NewBook> {
        let copies = self.num_copies.trim().parse::<u32>().unwrap_or(0);
        if self.title.trim().is_empty() || self.author.trim().is_empty() || self.isbn.trim().is_empty() || copies == 0 {
            return Err(AppError::validation("required", "Title, author, ISBN, and number of copies are required."));
        }
        let year = match self.publication_year.trim() {
            "" => None,
            y => match y.parse::<i32>() {
                Ok(v) if (0..=2100).contains(&v) => Some(v),
                _ => return Err(AppError::validation("bad_year", "Publication year must be a number between 0 and 2100.")),
            },
        };
        Ok(NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            publication_year: year,
            description: self.description.trim().to_string(),
            num_copies: copies,
        })
    }
}

pub async fn submit_new_book(ctx: &PageContext<'_>, form: &NewBookForm) -> Outcome {
    let book = match form.validate() {
        Ok(b) => b,
        Err(e) => return Outcome::Failed(e.user_message("")),
    };
    match ctx.api().add_book(&book).await {
        Ok(()) => Outcome::Navigate("/home".into()),
        Err(e) => Outcome::Failed(e.user_message("Failed to add book.")),
    }
}

fn cols(names: &[&str]) -> Vec<String> { names.iter().map(|s| s.to_string()).collect() }

#[cfg(test)]
mod tests {
    use super::*;

    fn form(copies: &str, year: &str) -> NewBookForm {
        NewBookForm {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            isbn: "9780441172719".into(),
            publication_year: year.into(),
            description: String::new(),
            num_copies: copies.into(),
        }
    }

    #[test]
    fn new_book_requires_copies() {
        assert_eq!(form("0", "").validate().unwrap_err().code_str(), "required");
        assert_eq!(form("", "").validate().unwrap_err().code_str(), "required");
        assert_eq!(form("two", "").validate().unwrap_err().code_str(), "required");
    }

    #[test]
    fn new_book_year_is_optional_but_bounded() {
        assert_eq!(form("2", "").validate().unwrap().publication_year, None);
        assert_eq!(form("2", "1965").validate().unwrap().publication_year, Some(1965));
        assert_eq!(form("2", "3000").validate().unwrap_err().code_str(), "bad_year");
    }

    #[test]
    fn ranks_use_medals_then_numbers() {
        assert_eq!(rank_badge(0), "🥇");
        assert_eq!(rank_badge(2), "🥉");
        assert_eq!(rank_badge(3), "#4");
    }
}
