use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use kiln_core::config::KilnConfig;
use kiln_maven::repository::Repository;
use kiln_maven::transport::{Deadline, Transport, UrlTransport};
use kiln_util::errors::KilnResult;

/// What every resolver of one resolution shares: the ordered repositories,
/// the transport and the deadline.
///
/// Cloning is cheap; nested resolvers (parents, transitive dependencies)
/// get a clone so they probe the same repositories under the same budget.
#[derive(Clone)]
pub struct Session {
    repositories: Arc<[Repository]>,
    transport: Arc<dyn Transport>,
    deadline: Deadline,
}

impl Session {
    pub fn new(repositories: Vec<Repository>, transport: Arc<dyn Transport>) -> Self {
        Self {
            repositories: repositories.into(),
            transport,
            deadline: Deadline::none(),
        }
    }

    /// An HTTP session for the configured repositories and network settings.
    pub fn from_config(config: &KilnConfig) -> KilnResult<Self> {
        let transport = UrlTransport::new(&config.network.user_agent)?;
        let repositories = config
            .repositories
            .iter()
            .map(Repository::from_entry)
            .collect();
        let session = Self::new(repositories, Arc::new(transport));
        Ok(match config.network.timeout_secs {
            0 => session,
            secs => session.with_deadline(Deadline::after(Duration::from_secs(secs))),
        })
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("repositories", &self.repositories)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
