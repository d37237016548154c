//! Parsing of interactive input lines into navigator commands.

use crate::error::{AppError, AppResult};
use crate::pages::auth::{LoginForm, SignupForm};
use crate::pages::books::NewBookForm;

pub const HELP: &str = "Commands:
  go <path>                      open a page, e.g. go /books or go /books/<id>
  back                           return to the previous page
  next | prev                    move between pages of a listing
  refresh                        reload the current page
  login <username> <password>    log in (on /login)
  signup <username> <email|-> <reader|librarian> <password> <confirm>
  logout                         end the session (asks for confirmation)
  search [username]              filter active orders by username (on /orders)
  complete <order id>            mark an order completed (on /orders)
  order <borrow|read_in_library> place an order for the selected book
  add-book title=.. author=.. isbn=.. copies=.. [year=..] [description=..]
  whoami                         show who is logged in
  help                           show this help
  quit | exit                    leave the client
Values containing spaces can be quoted: add-book title=\"The Hobbit\" ...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Go(String),
    Back,
    Next,
    Prev,
    Refresh,
    Login(LoginForm),
    Signup(SignupForm),
    Logout,
    Search(String),
    Complete(String),
    Order(String),
    AddBook(NewBookForm),
    WhoAmI,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> AppResult<Command> {
        let words = split_words(line)?;
        let Some((head, rest)) = words.split_first() else { return Ok(Command::Empty) };
        // A bare path is shorthand for `go <path>`
        if head.starts_with('/') && rest.is_empty() {
            return Ok(Command::Go(head.clone()));
        }
        let cmd = match (head.to_ascii_lowercase().as_str(), rest) {
            ("go" | "open", [path]) => Command::Go(path.clone()),
            ("back", []) => Command::Back,
            ("next", []) => Command::Next,
            ("prev" | "previous", []) => Command::Prev,
            ("refresh" | "r", []) => Command::Refresh,
            ("login", [u, p]) => Command::Login(LoginForm { username: u.clone(), password: p.clone() }),
            ("signup", [u, e, role, p, c]) => Command::Signup(SignupForm {
                username: u.clone(),
                email: if e == "-" { String::new() } else { e.clone() },
                password: p.clone(),
                confirm_password: c.clone(),
                role: role.clone(),
            }),
            ("logout", []) => Command::Logout,
            ("search", []) => Command::Search(String::new()),
            ("search", [name]) => Command::Search(name.clone()),
            ("complete", [id]) => Command::Complete(id.clone()),
            ("order", [kind]) => Command::Order(kind.clone()),
            ("add-book", fields) => Command::AddBook(parse_book_fields(fields)?),
            ("whoami", []) => Command::WhoAmI,
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            (other, _) if is_known(other) => {
                return Err(AppError::validation("bad_arguments", format!("wrong arguments for '{}'; type 'help'", other)))
            }
            (other, _) => return Err(AppError::validation("unknown_command", format!("unknown command '{}'; type 'help'", other))),
        };
        Ok(cmd)
    }
}

fn is_known(word: &str) -> bool {
    matches!(
        word,
        "go" | "open" | "back" | "next" | "prev" | "previous" | "refresh" | "r" | "login" | "signup" | "logout" | "search" | "complete"
            | "order" | "whoami" | "quit" | "exit"
    )
}

fn parse_book_fields(fields: &[String]) -> AppResult<NewBookForm> {
    let mut form = NewBookForm::default();
    for f in fields {
        let Some((key, value)) = f.split_once('=') else {
            return Err(AppError::validation("bad_arguments", format!("expected key=value, got '{}'", f)));
        };
        let slot = match key.to_ascii_lowercase().as_str() {
            "title" => &mut form.title,
            "author" => &mut form.author,
            "isbn" => &mut form.isbn,
            "year" | "publication_year" => &mut form.publication_year,
            "description" => &mut form.description,
            "copies" | "num_copies" => &mut form.num_copies,
            other => return Err(AppError::validation("bad_arguments", format!("unknown book field '{}'", other))),
        };
        *slot = value.to_string();
    }
    Ok(form)
}

/// Whitespace-separated words; double quotes group, backslash escapes.
pub fn split_words(line: &str) -> AppResult<Vec<String>> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(next) = chars.next() {
                    cur.push(next);
                }
                in_word = true;
            }
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut cur));
                    in_word = false;
                }
            }
            c => {
                cur.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err(AppError::validation("unterminated_quote", "unterminated quote"));
    }
    if in_word {
        words.push(cur);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_with_quotes() {
        assert_eq!(split_words("  a  \"b c\" d=\"e f\" ").unwrap(), vec!["a", "b c", "d=e f"]);
        assert_eq!(split_words("x \"\"").unwrap(), vec!["x", ""]);
        assert!(split_words("\"open").is_err());
    }

    #[test]
    fn parses_navigation() {
        assert_eq!(Command::parse("").unwrap(), Command::Empty);
        assert_eq!(Command::parse("/books").unwrap(), Command::Go("/books".into()));
        assert_eq!(Command::parse("go /orders").unwrap(), Command::Go("/orders".into()));
        assert_eq!(Command::parse("BACK").unwrap(), Command::Back);
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn parses_forms() {
        assert_eq!(
            Command::parse("login bob secret123").unwrap(),
            Command::Login(LoginForm { username: "bob".into(), password: "secret123".into() })
        );
        let Command::Signup(f) = Command::parse("signup amy - librarian pw123456 pw123456").unwrap() else { panic!("not signup") };
        assert_eq!(f.email, "");
        assert_eq!(f.role, "librarian");
        let Command::AddBook(b) = Command::parse("add-book title=\"The Hobbit\" author=Tolkien isbn=9780261103344 copies=2").unwrap() else {
            panic!("not add-book")
        };
        assert_eq!(b.title, "The Hobbit");
        assert_eq!(b.num_copies, "2");
        assert_eq!(b.publication_year, "");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Command::parse("login bob").unwrap_err().code_str(), "bad_arguments");
        assert_eq!(Command::parse("fly away").unwrap_err().code_str(), "unknown_command");
        assert_eq!(Command::parse("add-book pages=3").unwrap_err().code_str(), "bad_arguments");
    }
}
