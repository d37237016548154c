use super::{Block, Link, View};

pub fn render(path: &str) -> View {
    View::new("Page Not Found")
        .with(Block::Text(format!("Nothing lives at '{}'.", path)))
        .with(Block::Links(vec![Link::path("Home", "/home")]))
}
