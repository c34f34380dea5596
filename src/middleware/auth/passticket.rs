use rand::{thread_rng, Rng};

use crate::error::AuthSchemeError;

const TICKET_LENGTH: usize = 8;

/// Generates one-time-use tickets scoped to a user and target application.
/// A ticket must never be reused; callers request a fresh one per call.
pub trait PassTicketGenerator: Send + Sync {
    fn generate(&self, user_id: &str, applid: &str) -> Result<String, AuthSchemeError>;
}

/// In-process generator producing random upper-alphanumeric tickets
#[derive(Debug, Default)]
pub struct RandomPassTicketGenerator;

impl PassTicketGenerator for RandomPassTicketGenerator {
    fn generate(&self, user_id: &str, applid: &str) -> Result<String, AuthSchemeError> {
        if user_id.is_empty() {
            return Err(AuthSchemeError::TicketGeneration(
                "user id is empty".to_string(),
            ));
        }
        if applid.is_empty() {
            return Err(AuthSchemeError::TicketGeneration(
                "application id is empty".to_string(),
            ));
        }

        let ticket: String = thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .map(char::from)
            .map(|c| c.to_ascii_uppercase())
            .take(TICKET_LENGTH)
            .collect();

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_fresh_tickets() {
        let generator = RandomPassTicketGenerator;

        let a = generator.generate("USER1", "TSTAPPL").unwrap();
        let b = generator.generate("USER1", "TSTAPPL").unwrap();

        assert_eq!(a.len(), TICKET_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_empty_inputs() {
        let generator = RandomPassTicketGenerator;
        assert!(generator.generate("", "TSTAPPL").is_err());
        assert!(generator.generate("USER1", "").is_err());
    }
}
