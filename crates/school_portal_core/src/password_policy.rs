//! crates/school_portal_core/src/password_policy.rs
//!
//! Strength rules for new passwords. Rules run in a fixed order and only the
//! first violation is reported.

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters that satisfy the special-character rule.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must contain at least one number")]
    MissingDigit,
    #[error("Password must contain at least one special character")]
    MissingSpecial,
}

/// Checks `candidate` against the policy: length, uppercase, lowercase, digit, special.
pub fn validate_password(candidate: &str) -> Result<(), PolicyViolation> {
    if candidate.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PolicyViolation::TooShort);
    }
    if !candidate.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PolicyViolation::MissingUppercase);
    }
    if !candidate.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PolicyViolation::MissingLowercase);
    }
    if !candidate.chars().any(|c| c.is_ascii_digit()) {
        return Err(PolicyViolation::MissingDigit);
    }
    if !candidate.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(PolicyViolation::MissingSpecial);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_password_meeting_every_rule() {
        assert_eq!(validate_password("Str0ng!pass"), Ok(()));
        assert_eq!(validate_password("Aa1{bcdefg"), Ok(()));
    }

    #[test]
    fn short_passwords_report_length_regardless_of_other_rules() {
        for candidate in ["", "a", "abc", "A1!", "Ab1!xyz", "1234567", "ÄÖÜäöü!"] {
            assert_eq!(
                validate_password(candidate),
                Err(PolicyViolation::TooShort),
                "candidate {:?}",
                candidate
            );
        }
    }

    #[test]
    fn reports_only_the_first_violated_rule() {
        // Missing everything except length: uppercase comes first.
        assert_eq!(validate_password("        "), Err(PolicyViolation::MissingUppercase));
        assert_eq!(validate_password("abcdefgh"), Err(PolicyViolation::MissingUppercase));
        assert_eq!(validate_password("ABCDEFGH"), Err(PolicyViolation::MissingLowercase));
        assert_eq!(validate_password("ABCDefgh"), Err(PolicyViolation::MissingDigit));
        assert_eq!(validate_password("ABCDefg1"), Err(PolicyViolation::MissingSpecial));
        assert_eq!(validate_password("ABCD1234"), Err(PolicyViolation::MissingLowercase));
    }

    #[test]
    fn characters_outside_the_special_set_do_not_count() {
        assert_eq!(validate_password("Abcdefg1-_+="), Err(PolicyViolation::MissingSpecial));
        assert_eq!(validate_password("Abcdefg1~"), Err(PolicyViolation::MissingSpecial));
        assert_eq!(validate_password("Abcdefg1\""), Ok(()));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Six characters, more than eight bytes.
        assert_eq!(validate_password("Aé1!éé"), Err(PolicyViolation::TooShort));
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            PolicyViolation::TooShort.to_string(),
            "Password must be at least 8 characters long"
        );
        assert_eq!(
            PolicyViolation::MissingDigit.to_string(),
            "Password must contain at least one number"
        );
    }
}
