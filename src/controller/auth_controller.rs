use std::fmt::Write;
use crate::controller::ViewError;
use crate::models::user::{LoginRequest, RegisterRequest, User};
use crate::repositories::RentalApi;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "Welcome Back",
            AuthMode::Register => "Create Your Account",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            AuthMode::Login => "Log in to book your next ride.",
            AuthMode::Register => "Register as a customer to start booking cars.",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default)]
pub struct AuthView {
    mode: AuthMode,
    form: AuthForm,
}

/// Same bar a browser email input sets: something@something, no spaces.
pub fn is_well_formed_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

fn required(value: &str, label: &str) -> Result<(), ViewError> {
    if value.trim().is_empty() {
        return Err(ViewError::Validation(format!("{} is required", label)));
    }
    Ok(())
}

impl AuthView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    pub fn form(&self) -> &AuthForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AuthForm {
        &mut self.form
    }

    fn validate(&self) -> Result<(), ViewError> {
        if self.mode == AuthMode::Register {
            required(&self.form.name, "Full Name")?;
        }
        required(&self.form.email, "Email")?;
        if !is_well_formed_email(self.form.email.trim()) {
            return Err(ViewError::Validation(format!(
                "'{}' is not a valid email address",
                self.form.email
            )));
        }
        required(&self.form.password, "Password")
    }

    /// Logs in or registers depending on the mode. The returned identity is
    /// for the composer to keep.
    pub async fn submit<A: RentalApi>(&mut self, api: &A) -> Result<User, ViewError> {
        self.validate()?;
        let email = self.form.email.trim().to_string();

        let user = match self.mode {
            AuthMode::Login => {
                let request = LoginRequest {
                    email,
                    password: self.form.password.clone(),
                };
                api.login(&request).await?
            }
            AuthMode::Register => {
                let request = RegisterRequest {
                    name: self.form.name.clone(),
                    email,
                    password: self.form.password.clone(),
                };
                api.register(&request).await?
            }
        };

        self.form.password.clear();
        Ok(user)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} ==", self.mode.title());
        let _ = writeln!(out, "{}", self.mode.hint());
        match self.mode {
            AuthMode::Login => {
                let _ = writeln!(out, "  login <email> <password>");
                let _ = writeln!(out, "Need an account? Type `mode` to register.");
            }
            AuthMode::Register => {
                let _ = writeln!(out, "  register <full-name> <email> <password>");
                let _ = writeln!(out, "Already have an account? Type `mode` to log in.");
            }
        }
        out
    }
}
