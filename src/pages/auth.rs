//! Login and signup pages. Input is validated locally before the session
//! store contacts the backend.

use super::{Block, Link, Outcome, PageContext, View};
use crate::error::{AppError, AppResult};
use crate::identity::Role;

pub const MIN_USERNAME: usize = 3;
pub const MIN_PASSWORD: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> AppResult<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(AppError::validation("required", "Username and password are required."));
        }
        if self.password.chars().count() < MIN_PASSWORD {
            return Err(AppError::validation("password_short", "Password must be at least 8 characters long."));
        }
        if self.username.chars().count() < MIN_USERNAME {
            return Err(AppError::validation("username_short", "Username must be at least 3 characters long."));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

impl SignupForm {
    /// Checks the form and returns the chosen role.
    pub fn validate(&self) -> AppResult<Role> {
        if self.username.is_empty() || self.password.is_empty() || self.confirm_password.is_empty() || self.role.is_empty() {
            return Err(AppError::validation("required", "Username, password, confirm password, and role are required."));
        }
        if self.username.chars().count() < MIN_USERNAME {
            return Err(AppError::validation("username_short", "Username must be at least 3 characters long."));
        }
        if self.password.chars().count() < MIN_PASSWORD {
            return Err(AppError::validation("password_short", "Password must be at least 8 characters long."));
        }
        if self.password != self.confirm_password {
            return Err(AppError::validation("password_mismatch", "Passwords do not match."));
        }
        self.role.parse::<Role>()
    }
}

pub fn render_login() -> View {
    View::new("Log In")
        .with(Block::Text("login <username> <password>".into()))
        .with(Block::Links(vec![Link::path("Need an account? Sign Up", "/signup")]))
}

pub fn render_signup() -> View {
    View::new("Create Your Account")
        .with(Block::Text("signup <username> <email|-> <reader|librarian> <password> <confirm password>".into()))
        .with(Block::Links(vec![Link::path("Already have an account? Log In", "/login")]))
}

pub async fn submit_login(ctx: &PageContext<'_>, form: &LoginForm) -> Outcome {
    if let Err(e) = form.validate() {
        return Outcome::Failed(e.user_message(""));
    }
    match ctx.session.login(&form.username, &form.password).await {
        Ok(_) => Outcome::Navigate("/home".into()),
        Err(e) => Outcome::Failed(e.user_message("Login failed.")),
    }
}

pub async fn submit_signup(ctx: &PageContext<'_>, form: &SignupForm) -> Outcome {
    let role = match form.validate() {
        Ok(r) => r,
        Err(e) => return Outcome::Failed(e.user_message("")),
    };
    let email = Some(form.email.as_str()).filter(|e| !e.is_empty());
    match ctx.session.signup(&form.username, email, role, &form.password).await {
        Ok(_) => Outcome::Navigate("/home".into()),
        Err(e) => Outcome::Failed(e.user_message("Signup failed.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(u: &str, p: &str) -> LoginForm { LoginForm { username: u.into(), password: p.into() } }

    fn signup(u: &str, p: &str, c: &str, r: &str) -> SignupForm {
        SignupForm { username: u.into(), email: String::new(), password: p.into(), confirm_password: c.into(), role: r.into() }
    }

    #[test]
    fn login_checks_in_order() {
        assert_eq!(login("", "x").validate().unwrap_err().message(), "Username and password are required.");
        // password length is checked before username length
        assert_eq!(login("ab", "short").validate().unwrap_err().message(), "Password must be at least 8 characters long.");
        assert_eq!(login("ab", "longenough").validate().unwrap_err().message(), "Username must be at least 3 characters long.");
        assert!(login("bob", "longenough").validate().is_ok());
    }

    #[test]
    fn signup_validation() {
        assert_eq!(signup("bob", "longenough", "longenough", "").validate().unwrap_err().code_str(), "required");
        assert_eq!(signup("bo", "longenough", "longenough", "reader").validate().unwrap_err().code_str(), "username_short");
        assert_eq!(signup("bob", "short", "short", "reader").validate().unwrap_err().code_str(), "password_short");
        assert_eq!(signup("bob", "longenough", "longenougH", "reader").validate().unwrap_err().message(), "Passwords do not match.");
        assert_eq!(signup("bob", "longenough", "longenough", "wizard").validate().unwrap_err().code_str(), "unknown_role");
        assert_eq!(signup("bob", "longenough", "longenough", "librarian").validate().unwrap(), Role::Librarian);
    }
}
