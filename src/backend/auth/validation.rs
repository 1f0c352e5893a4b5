//! Field validation for names, emails and passwords.
//!
//! One policy is shared by signup, profile update, password change and
//! password reset.

use serde::Serialize;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Check a name or surname
///
/// Trimmed value must be 2-50 characters of letters with inner spaces.
pub fn validate_name(field: &str, label: &str, value: &str) -> Option<FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(FieldError::new(field, format!("{} cannot be empty", label)));
    }

    let length = trimmed.chars().count();
    if length < NAME_MIN_CHARS {
        return Some(FieldError::new(
            field,
            format!("{} must be at least {} characters long", label, NAME_MIN_CHARS),
        ));
    }
    if length > NAME_MAX_CHARS {
        return Some(FieldError::new(
            field,
            format!("{} must be at most {} characters long", label, NAME_MAX_CHARS),
        ));
    }

    if !trimmed.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Some(FieldError::new(
            field,
            format!("{} can only contain letters and spaces", label),
        ));
    }

    None
}

/// Check the shape of an email address
pub fn validate_email(value: &str) -> Option<FieldError> {
    let invalid = || Some(FieldError::new("email", "Invalid email address"));

    if value.is_empty() || value.chars().count() > EMAIL_MAX_CHARS {
        return invalid();
    }
    if value.chars().any(char::is_whitespace) {
        return invalid();
    }

    let mut parts = value.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return invalid(),
    };

    if local.is_empty() {
        return invalid();
    }
    // Domain needs at least one dot with labels on both sides
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return invalid();
    }

    None
}

/// Validate the identity fields shared by signup and profile update
pub fn validate_identity(name: &str, surname: &str, email: &str) -> Vec<FieldError> {
    [
        validate_name("name", "Name", name),
        validate_name("surname", "Surname", surname),
        validate_email(email),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// List every password policy rule the candidate violates
///
/// An empty list means the password is acceptable.
pub fn password_problems(password: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if password.chars().count() < PASSWORD_MIN_CHARS {
        problems.push(format!(
            "Password must be at least {} characters long",
            PASSWORD_MIN_CHARS
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        problems.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        problems.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain at least one digit".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_punctuation()) {
        problems.push("Password must contain at least one special character".to_string());
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_identity() {
        assert!(validate_identity("Ana", "Smith", "ana@x.com").is_empty());
        assert!(validate_identity("Şükrü", "Öztürk", "s.o@mail.example.org").is_empty());
        assert!(validate_identity("Mary Jane", "Van Dyke", "mj@x.io").is_empty());
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(
            validate_name("name", "Name", "   ").map(|e| e.message),
            Some("Name cannot be empty".to_string())
        );
        assert!(validate_name("name", "Name", "A").is_some());
        assert!(validate_name("name", "Name", "Al").is_none());
        assert!(validate_name("name", "Name", &"a".repeat(51)).is_some());
        assert!(validate_name("name", "Name", "R2D2").is_some());
        assert!(validate_name("name", "Name", "Ana!").is_some());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("ana@x.com").is_none());
        assert!(validate_email("").is_some());
        assert!(validate_email("ana.x.com").is_some());
        assert!(validate_email("ana@@x.com").is_some());
        assert!(validate_email("a@b@x.com").is_some());
        assert!(validate_email("@x.com").is_some());
        assert!(validate_email("ana@localhost").is_some());
        assert!(validate_email("ana@x.com.").is_some());
        assert!(validate_email("an a@x.com").is_some());
        assert!(validate_email(&format!("{}@x.com", "a".repeat(250))).is_some());
    }

    #[test]
    fn test_identity_reports_every_field() {
        let errors = validate_identity("", "S", "nope");
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "surname", "email"]);
    }

    #[test]
    fn test_password_policy() {
        assert!(password_problems("Str0ng!Pass").is_empty());
        assert_eq!(password_problems("Sh0rt!").len(), 1);
        assert_eq!(password_problems("alllowercase").len(), 3);
        assert_eq!(
            password_problems("NoDigits!!"),
            vec!["Password must contain at least one digit".to_string()]
        );
        assert_eq!(
            password_problems("NoSpecial12"),
            vec!["Password must contain at least one special character".to_string()]
        );
    }
}
