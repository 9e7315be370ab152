// identifier of a post or promotion as it arrives in a route
// it ends up inside remote query filters, so the alphabet is kept tight:
// - non-empty, at most 64 characters
// - ascii alphanumerics, `-` and `_` only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityId(String);

impl TryFrom<String> for EntityId {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.is_empty() {
            anyhow::bail!("The identifier cannot be empty.")
        }
        let max_length = 64;
        if s.len() > max_length {
            anyhow::bail!("The identifier must be at most {max_length} characters long");
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            anyhow::bail!("The identifier contains unsupported characters");
        }
        Ok(Self(s))
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
