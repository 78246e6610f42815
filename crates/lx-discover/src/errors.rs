use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("no coordinator endpoint configured")]
    MissingEndpoint,

    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("coordinator rejected registration ({status}): {body}")]
    Rejected { status: u16, body: String },
}
