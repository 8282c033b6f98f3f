use crate::envelope::Envelope;
use crate::error::ServerResult;
use crate::negotiate::ClientPrefs;
use racc::facts::DEFAULT_FACT_FROM;
use racc::selector::{DEFAULT_TAKE, parse_or};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FactBody {
    pub fact: &'static str,
}

/// Random fact (GET /v1/fact)
pub async fn random_fact() -> Envelope<FactBody> {
    let fact = racc::random_fact(&mut rand::thread_rng());
    Envelope::data(FactBody { fact })
}

/// Slice of the fact list (GET /v1/facts?from&take)
pub async fn list_facts(prefs: ClientPrefs) -> ServerResult<Envelope<Vec<&'static str>>> {
    let from = parse_or(prefs.query_value("from"), DEFAULT_FACT_FROM)?;
    let take = parse_or(prefs.query_value("take"), DEFAULT_TAKE)?;
    Ok(Envelope::data(racc::list_facts(from, take)))
}
