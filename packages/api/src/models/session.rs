use super::Principal;

/// Snapshot of who is signed in and whether that is still being determined.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub principal: Option<Principal>,
    pub loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            principal: None,
            loading: true,
        }
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Identifier of the signed-in principal, if any.
    pub fn identifier(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.identifier())
    }
}
