/// Supplies the session key sent along with profile lookups.
pub trait SessionProvider: Send + Sync {
    fn session_key(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    key: Option<String>,
}

impl StaticSession {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl SessionProvider for StaticSession {
    fn session_key(&self) -> Option<String> {
        self.key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_anonymous() {
        assert_eq!(StaticSession::new(Some(" ".to_string())).session_key(), None);
        assert_eq!(
            StaticSession::new(Some("abc123".to_string())).session_key(),
            Some("abc123".to_string())
        );
    }
}
