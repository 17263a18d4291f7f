use crate::common::TextField;

/// Message shown when the form is submitted with an empty field.
pub const EMPTY_FIELDS_MESSAGE: &str = "Please enter both email and password";

/// Focusable elements of the login form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginFocus {
    #[default]
    Email,
    Password,
    Submit,
}

impl LoginFocus {
    pub fn next(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Submit,
            LoginFocus::Submit => LoginFocus::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Submit,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Submit => LoginFocus::Password,
        }
    }
}

/// Login form state. A fresh form is built every time the login screen is
/// shown, so nothing typed survives a sign-out.
#[derive(Debug, Clone, Default)]
pub struct LoginState {
    pub email: TextField,
    pub password: TextField,
    pub focus: LoginFocus,
    /// Inline error line.
    pub error: Option<String>,
    /// "Authenticating..." is shown and submit is disabled while set.
    pub loading: bool,
}

impl LoginState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_submit(&self) -> bool {
        !self.loading
    }

    /// Field receiving text input, if the focus is on one.
    pub fn focused_field_mut(&mut self) -> Option<&mut TextField> {
        match self.focus {
            LoginFocus::Email => Some(&mut self.email),
            LoginFocus::Password => Some(&mut self.password),
            LoginFocus::Submit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_cycles() {
        let focus = LoginFocus::default();
        assert_eq!(focus, LoginFocus::Email);
        assert_eq!(focus.next().next().next(), LoginFocus::Email);
        assert_eq!(focus.prev(), LoginFocus::Submit);
    }

    #[test]
    fn test_submit_focus_has_no_field() {
        let mut state = LoginState {
            focus: LoginFocus::Submit,
            ..LoginState::new()
        };
        assert!(state.focused_field_mut().is_none());
    }
}
