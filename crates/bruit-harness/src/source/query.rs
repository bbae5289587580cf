//! ActiveData query construction.

use serde_json::{json, Value};

use crate::config::QueryConfig;

/// Column names selected from the `perf` table.
pub mod columns {
    pub const RUN_NAME: &str = "run.name";
    pub const SUITE: &str = "result.suite";
    pub const TEST: &str = "result.test";
    pub const SAMPLES: &str = "result.samples";
    pub const STATS: &str = "result.stats";
    pub const TIMESTAMP: &str = "action.start_time";
    pub const TASK_STATE: &str = "task.state";
}

fn any_run_name(patterns: &[String]) -> Option<Value> {
    if patterns.is_empty() {
        return None;
    }
    let finds: Vec<Value> = patterns
        .iter()
        .map(|pattern| json!({ "find": { columns::RUN_NAME: pattern } }))
        .collect();
    Some(json!({ "or": finds }))
}

/// Build the ActiveData query selecting the runs described by `config`.
///
/// Framework and suite patterns are substring matches on the run name; each
/// group is OR-ed internally and the groups are AND-ed together.
///
/// # Examples
///
/// ```
/// use bruit_harness::config::QueryConfig;
/// use bruit_harness::source::build_query;
///
/// let query = build_query(&QueryConfig::default());
/// assert_eq!(query["from"], "perf");
/// assert_eq!(query["limit"], 10000);
/// ```
pub fn build_query(config: &QueryConfig) -> Value {
    let mut clauses: Vec<Value> = Vec::new();

    clauses.extend(any_run_name(&config.frameworks));
    clauses.extend(any_run_name(&config.suites));

    if let Some(state) = config.task_state.as_deref().filter(|s| !s.is_empty()) {
        clauses.push(json!({ "eq": { columns::TASK_STATE: state } }));
    }
    if let Some(since) = &config.since {
        clauses.push(json!({ "gte": { columns::TIMESTAMP: { "date": since } } }));
    }
    if let Some(until) = &config.until {
        clauses.push(json!({ "lt": { columns::TIMESTAMP: { "date": until } } }));
    }

    json!({
        "from": "perf",
        "where": { "and": clauses },
        "select": [
            columns::RUN_NAME,
            columns::SUITE,
            columns::TEST,
            columns::SAMPLES,
            columns::STATS,
            columns::TIMESTAMP,
        ],
        "limit": config.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_query_shape() {
        let query = build_query(&QueryConfig::default());

        assert_eq!(
            query["where"]["and"][0],
            json!({"or": [
                {"find": {"run.name": "raptor"}},
                {"find": {"run.name": "browsertime"}}
            ]})
        );
        assert_eq!(
            query["where"]["and"][1],
            json!({"or": [
                {"find": {"run.name": "tp6-"}},
                {"find": {"run.name": "tp6m-"}}
            ]})
        );
        assert_eq!(
            query["where"]["and"][2],
            json!({"eq": {"task.state": "completed"}})
        );
        assert_eq!(query["where"]["and"].as_array().unwrap().len(), 3);
        assert!(query["select"]
            .as_array()
            .unwrap()
            .contains(&json!("result.samples")));
    }

    #[test]
    fn test_date_range_clauses() {
        let config = QueryConfig {
            since: Some("today-20day".to_string()),
            until: Some("today".to_string()),
            ..QueryConfig::default()
        };
        let query = build_query(&config);
        let clauses = query["where"]["and"].as_array().unwrap();

        assert!(clauses.contains(&json!({"gte": {"action.start_time": {"date": "today-20day"}}})));
        assert!(clauses.contains(&json!({"lt": {"action.start_time": {"date": "today"}}})));
    }

    #[test]
    fn test_empty_groups_are_omitted() {
        let config = QueryConfig {
            frameworks: Vec::new(),
            suites: Vec::new(),
            task_state: Some(String::new()),
            ..QueryConfig::default()
        };
        let query = build_query(&config);

        assert_eq!(query["where"]["and"], json!([]));
    }
}
