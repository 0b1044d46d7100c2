pub mod api;
pub mod cors;

use crate::agent::ConciergeAgent;
use crate::cli::Args;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    agent: Arc<ConciergeAgent>,
    args: Args,
}

impl Server {
    pub fn new(agent: Arc<ConciergeAgent>, args: Args) -> Self {
        Self { agent, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.args, self.agent.clone()).await
    }
}
