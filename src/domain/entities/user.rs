use std::fmt;

/// A platform account, either a chat member or the bot itself
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub discriminator: Option<String>,
    pub avatar_url: Option<String>,
    pub is_bot: bool,
    /// Permissions the platform grants this account
    pub permissions: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            discriminator: None,
            avatar_url: None,
            is_bot: false,
            permissions: Vec::new(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn as_bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// `name#0001` when both parts are known, otherwise the best available name
    pub fn tag(&self) -> String {
        match (&self.username, &self.discriminator) {
            (Some(name), Some(disc)) => format!("{}#{}", name, disc),
            (Some(name), None) => name.clone(),
            _ => self.id.clone(),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
