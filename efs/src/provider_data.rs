//! Provider data structure passed to resources after configuration

use crate::api::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct EfsProviderData {
    pub client: Arc<Client>,
}

impl EfsProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
