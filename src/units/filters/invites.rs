use std::sync::Arc;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::bot::Bot;
use crate::application::errors::LoaderError;
use crate::domain::entities::Message;
use crate::domain::traits::{Filter, FilterInfo};

static INVITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(discord\.gg|discord(?:app)?\.com/invite)/[a-z0-9-]+")
        .expect("invite pattern is valid")
});

/// Flags server invite links
pub struct InviteFilter;

pub fn build(_bot: &Arc<Bot>) -> Result<Arc<dyn Filter>, LoaderError> {
    Ok(Arc::new(InviteFilter))
}

impl Filter for InviteFilter {
    fn describe(&self) -> FilterInfo {
        FilterInfo {
            name: "invites".to_string(),
            description: "Blocks invite links to other servers".to_string(),
            warning_key: "filters.invites.warning".to_string(),
        }
    }

    fn apply(&self, message: &Message) -> bool {
        INVITE.is_match(&message.raw)
    }
}
