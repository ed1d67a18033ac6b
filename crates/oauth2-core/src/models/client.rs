use serde::{Deserialize, Serialize};

/// A registered OAuth2 client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    pub id: String,
    pub secret: String,
    pub domain: String,
    pub public: bool,
    pub user_id: String,
}

impl Client {
    pub fn new(id: String, secret: String, domain: String) -> Self {
        Self {
            id,
            secret,
            domain,
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}
