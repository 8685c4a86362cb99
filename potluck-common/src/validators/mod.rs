#[derive(Debug, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(&'static str),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

pub const MAX_USER_NAME_LENGTH: usize = 64;
pub const MAX_PASSWORD_LENGTH: usize = 512;

pub fn validate_email_address(email: &str) -> Validity {
    if email.len() > 320 {
        return Validity::Invalid("Email address is too long");
    }

    if email.chars().any(|c| c.is_whitespace() || !c.is_ascii()) {
        return Validity::Invalid("Email address cannot contain whitespace or non-ASCII characters");
    }

    if email.contains("@.") {
        return Validity::Invalid("Domain name in email address cannot begin with a period");
    }

    let Some((username, domain)) = email.split_once('@') else {
        return Validity::Invalid("Email address must contain an at symbol (@)");
    };

    if username.is_empty() || domain.len() < 3 {
        return Validity::Invalid("Email username or domain name is too short");
    }

    if domain.contains('@') || !domain.contains('.') {
        return Validity::Invalid(
            "Email address must have only one at symbol (@) and the domain must contain a period",
        );
    }

    if domain.ends_with('.') {
        return Validity::Invalid("Email address cannot end with a period");
    }

    Validity::Valid
}

pub fn validate_user_name(name: &str) -> Validity {
    if name.trim().is_empty() {
        return Validity::Invalid("User name cannot be blank");
    }

    if name.chars().count() > MAX_USER_NAME_LENGTH {
        return Validity::Invalid("User name is too long");
    }

    if name.chars().any(|c| c.is_control()) {
        return Validity::Invalid("User name cannot contain control characters");
    }

    Validity::Valid
}

pub fn validate_password(password: &str) -> Validity {
    if password.is_empty() {
        return Validity::Invalid("Password cannot be empty");
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Validity::Invalid("Password is too long");
    }

    Validity::Valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_address() {
        // Valid
        const NORMAL: &str = "test@example.com";
        const WITH_DOT_IN_USERNAME: &str = "test.me@example.com";
        const MULTIPLE_DOT_DOMAIN: &str = "email@example.co.jp";
        const PLUS_IN_USERNAME: &str = "firstname+lastname@example.com";
        const NUMERIC_USERNAME: &str = "1234567890@example.com";
        const DASH_IN_DOMAIN: &str = "email@example-one.com";

        // Invalid
        const NO_AT: &str = "testexample.com";
        const NO_DOMAIN: &str = "test@";
        const NO_USERNAME: &str = "@example.com";
        const TWO_ATS: &str = "test@me@example.com";
        const NO_DOT_IN_DOMAIN: &str = "test@example";
        const DOMAIN_STARTS_WITH_DOT: &str = "test@.example.com";
        const ENDS_WITH_DOT: &str = "test@example.com.";
        const HAS_SPACE: &str = "te st@example.com";
        const NON_ASCII: &str = "tést@example.com";

        for valid in [
            NORMAL,
            WITH_DOT_IN_USERNAME,
            MULTIPLE_DOT_DOMAIN,
            PLUS_IN_USERNAME,
            NUMERIC_USERNAME,
            DASH_IN_DOMAIN,
        ] {
            assert!(validate_email_address(valid).is_valid(), "{valid}");
        }

        for invalid in [
            NO_AT,
            NO_DOMAIN,
            NO_USERNAME,
            TWO_ATS,
            NO_DOT_IN_DOMAIN,
            DOMAIN_STARTS_WITH_DOT,
            ENDS_WITH_DOT,
            HAS_SPACE,
            NON_ASCII,
        ] {
            assert!(!validate_email_address(invalid).is_valid(), "{invalid}");
        }

        let too_long = format!("{}@example.com", "a".repeat(320));
        assert!(!validate_email_address(&too_long).is_valid());
    }

    #[test]
    fn test_validate_user_name() {
        assert!(validate_user_name("user1").is_valid());
        assert!(validate_user_name("Jane Doe").is_valid());
        assert!(validate_user_name(&"a".repeat(MAX_USER_NAME_LENGTH)).is_valid());

        assert!(!validate_user_name("").is_valid());
        assert!(!validate_user_name("   ").is_valid());
        assert!(!validate_user_name(&"a".repeat(MAX_USER_NAME_LENGTH + 1)).is_valid());
        assert!(!validate_user_name("bad\nname").is_valid());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password").is_valid());
        assert!(!validate_password("").is_valid());
        assert!(!validate_password(&"p".repeat(MAX_PASSWORD_LENGTH + 1)).is_valid());
    }
}
