//! Default values for configuration

/// Default remote ranker endpoint (OpenAI-style chat completions)
pub fn default_ranker_endpoint_url() -> String {
    std::env::var("SCOUT_RANKER_URL")
        .unwrap_or_else(|_| "http://localhost:3001/v1/chat/completions".to_string())
}

/// Default per-request timeout in seconds
pub fn default_ranker_timeout() -> u64 {
    120
}

/// Default completion token budget
pub fn default_ranker_max_tokens() -> u32 {
    1024
}

/// Default system prompt sent ahead of every ranking request
pub fn default_ranker_system_prompt() -> String {
    concat!(
        "You are a helpful file search assistant. ",
        "Your task is to re-rank the provided file candidates based on how well they match the user's query. ",
        "Return a JSON object with a 'ranked' key containing a list of file IDs (paths) in order of relevance, ",
        "and a 'reasoning' key explaining why."
    )
    .to_string()
}

/// Default maximum candidates per remote request
pub fn default_batch_size() -> usize {
    300
}

/// Default cap on concurrent remote requests
pub fn default_batch_max_workers() -> usize {
    3
}

/// Default retries after a failed batch attempt
pub fn default_batch_max_retries() -> u32 {
    2
}

/// Default initial backoff delay (1 second, doubled per retry)
pub fn default_batch_retry_base_delay() -> u64 {
    1000
}

/// Default search mode
pub fn default_search_mode() -> String {
    "hybrid".to_string()
}

/// Default number of prefiltered candidates in hybrid mode
pub fn default_search_top_k() -> usize {
    100
}

/// Default number of results returned
pub fn default_search_max_results() -> usize {
    20
}

/// Default preview length sent to the ranker
pub fn default_preview_chars() -> usize {
    400
}

/// Default number of body characters the prefilter looks at
pub fn default_prefilter_body_chars() -> usize {
    1000
}

/// Default indexed file extensions
pub fn default_index_extensions() -> Vec<String> {
    [".txt", ".md", ".log", ".py", ".json", ".csv", ".js", ".html", ".css"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

/// Default maximum characters read per file
pub fn default_index_max_file_chars() -> usize {
    200_000
}
