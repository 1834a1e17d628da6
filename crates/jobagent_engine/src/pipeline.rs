use std::sync::Arc;

use agent_logging::{agent_error, agent_info, agent_warn};
use jobagent_core::{assemble_digest, JobProfile, SearchResults};

use crate::mail::{DeliveryError, Mailer};
use crate::runner::Clock;
use crate::search::SearchEngine;
use crate::store::JobStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    /// Credentials missing; searching and saving still happened.
    NotConfigured,
    Failed(String),
}

/// Outcome of one search-and-deliver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub query: String,
    pub results: SearchResults,
    pub saved: usize,
    pub save_failures: usize,
    pub delivery: DeliveryStatus,
}

impl RunReport {
    pub fn found(&self) -> usize {
        self.results.len()
    }

    pub fn degraded(&self) -> bool {
        self.results.degraded
    }
}

/// Query, search, persist, digest and deliver for one profile.
///
/// Errors never escape [`Pipeline::run`]; each step's failure is logged and
/// folded into the returned report.
pub struct Pipeline {
    engine: SearchEngine,
    store: Arc<dyn JobStore>,
    mailer: Arc<dyn Mailer>,
    clock: Clock,
    max_results: usize,
}

impl Pipeline {
    pub fn new(
        engine: SearchEngine,
        store: Arc<dyn JobStore>,
        mailer: Arc<dyn Mailer>,
        clock: Clock,
        max_results: usize,
    ) -> Self {
        Self {
            engine,
            store,
            mailer,
            clock,
            max_results,
        }
    }

    pub async fn search(&self, profile: &JobProfile) -> (String, SearchResults) {
        let query = profile.search_query();
        let results = self.engine.search(&query, self.max_results).await;
        (query, results)
    }

    pub async fn run(&self, profile: &JobProfile) -> RunReport {
        let email = profile.recipient_email.as_str();
        agent_info!("Running job search for {}", email);

        let (query, results) = self.search(profile).await;

        let mut saved = 0;
        let mut save_failures = 0;
        for posting in &results.postings {
            match self
                .store
                .save_job(&posting.title, &posting.link, email, posting.source, &query)
            {
                Ok(_) => saved += 1,
                Err(err) => {
                    save_failures += 1;
                    agent_error!("Failed to save posting {}: {}", posting.link, err);
                }
            }
        }

        let today = (self.clock)().date();
        let digest = assemble_digest(&results.postings, &profile.role, &profile.location, today)
            .mark_degraded(results.degraded);

        let delivery = match self.mailer.send_digest(email, &digest).await {
            Ok(()) => {
                agent_info!("Sent {} jobs to {}", digest.count, email);
                DeliveryStatus::Sent
            }
            Err(DeliveryError::NotConfigured) => {
                agent_warn!("Email delivery not configured; digest for {} not sent", email);
                DeliveryStatus::NotConfigured
            }
            Err(err) => {
                agent_error!("Failed to send digest to {}: {}", email, err);
                DeliveryStatus::Failed(err.to_string())
            }
        };

        RunReport {
            query,
            results,
            saved,
            save_failures,
            delivery,
        }
    }
}
