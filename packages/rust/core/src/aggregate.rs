//! Fail-soft aggregation of per-root preparation outcomes.

use tracing::{error, info, instrument, warn};

use stagehand_shared::{AggregateResult, ContentRoot};
use stagehand_staging::{PrepareOptions, Preparer};

/// Prepare every discovered root in order and fold the outcomes into one
/// [`AggregateResult`].
///
/// A per-root failure flips `all_successful` and is recorded with its root
/// key, but never stops the remaining roots: the caller surfaces the first
/// recorded error only after every root has been attempted. Roots run one
/// at a time, so writes into the shared aggregate are trivially sequenced.
#[instrument(skip_all, fields(roots = roots.len()))]
pub async fn prepare_all<P: Preparer>(
    roots: Vec<ContentRoot>,
    preparer: &P,
    opts: &PrepareOptions,
) -> AggregateResult {
    let mut aggregate = AggregateResult::empty();

    for root in roots {
        let key = root.as_key();
        aggregate.did_something = true;

        match preparer.prepare(&root, opts).await {
            Ok(outcome) => {
                if !outcome.success {
                    warn!(root = %key, "preparer reported failure");
                    aggregate.all_successful = false;
                    aggregate
                        .errors
                        .push((key.clone(), "preparer reported failure".into()));
                }
                if outcome.did_something {
                    aggregate.submitted_something = true;
                    if let Some(id) = outcome.content_id_base {
                        info!(root = %key, content_id = %id, "content submitted");
                        aggregate.content_id_map.insert(key, id);
                    }
                }
            }
            Err(e) => {
                error!(root = %key, error = %e, "preparation failed, continuing with remaining roots");
                aggregate.all_successful = false;
                aggregate.errors.push((key, e.to_string()));
            }
        }
    }

    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use stagehand_shared::{PrepareOutcome, Result, RevisionId, StagehandError, TransientApiKey};

    /// Preparer stub scripted per root key; records invocation order.
    struct ScriptedPreparer {
        calls: Mutex<Vec<String>>,
        fail: Vec<&'static str>,
        quiet: Vec<&'static str>,
    }

    impl ScriptedPreparer {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: Vec::new(),
                quiet: Vec::new(),
            }
        }

        fn failing_on(mut self, root: &'static str) -> Self {
            self.fail.push(root);
            self
        }

        fn quiet_on(mut self, root: &'static str) -> Self {
            self.quiet.push(root);
            self
        }
    }

    impl Preparer for ScriptedPreparer {
        async fn prepare(
            &self,
            root: &ContentRoot,
            _opts: &PrepareOptions,
        ) -> Result<PrepareOutcome> {
            let key = root.as_key();
            self.calls.lock().unwrap().push(key.clone());

            if self.fail.iter().any(|r| *r == key) {
                return Err(StagehandError::preparation(key, "scripted failure"));
            }
            if self.quiet.iter().any(|r| *r == key) {
                return Ok(PrepareOutcome {
                    success: true,
                    did_something: false,
                    content_id_base: None,
                });
            }
            Ok(PrepareOutcome {
                success: true,
                did_something: true,
                content_id_base: Some(format!("id-{key}")),
            })
        }
    }

    fn opts() -> PrepareOptions {
        PrepareOptions {
            revision_id: RevisionId::from_sha("abc123"),
            content_service_url: "http://localhost:9000".into(),
            content_service_api_key: TransientApiKey::new("key"),
            workspace: PathBuf::from("/tmp/ws"),
        }
    }

    fn roots(keys: &[&str]) -> Vec<ContentRoot> {
        keys.iter().map(|k| ContentRoot::new(*k)).collect()
    }

    #[tokio::test]
    async fn successful_roots_populate_the_content_id_map() {
        let preparer = ScriptedPreparer::new();
        let agg = prepare_all(roots(&["docs", "api"]), &preparer, &opts()).await;

        assert!(agg.all_successful);
        assert!(agg.did_something);
        assert!(agg.submitted_something);
        assert_eq!(agg.content_id_map.get("docs").unwrap(), "id-docs");
        assert_eq!(agg.content_id_map.get("api").unwrap(), "id-api");
        assert_eq!(agg.content_id_map.len(), 2);
    }

    #[tokio::test]
    async fn failure_does_not_stop_remaining_roots() {
        let preparer = ScriptedPreparer::new().failing_on("api");
        let agg = prepare_all(roots(&["api", "docs", "guides"]), &preparer, &opts()).await;

        // Every root was still attempted, in order.
        assert_eq!(
            *preparer.calls.lock().unwrap(),
            vec!["api", "docs", "guides"]
        );
        assert!(!agg.all_successful);
        assert!(agg.submitted_something);
        assert_eq!(agg.errors.len(), 1);
        assert_eq!(agg.first_error().unwrap().0, "api");
        // The failed root never made it into the map.
        assert!(!agg.content_id_map.contains_key("api"));
        assert!(agg.content_id_map.contains_key("docs"));
    }

    #[tokio::test]
    async fn map_entry_exists_iff_root_did_something() {
        let preparer = ScriptedPreparer::new().quiet_on("empty");
        let agg = prepare_all(roots(&["docs", "empty"]), &preparer, &opts()).await;

        assert!(agg.all_successful);
        assert!(agg.content_id_map.contains_key("docs"));
        assert!(!agg.content_id_map.contains_key("empty"));
    }

    #[tokio::test]
    async fn all_quiet_roots_submit_nothing() {
        let preparer = ScriptedPreparer::new().quiet_on("a").quiet_on("b");
        let agg = prepare_all(roots(&["a", "b"]), &preparer, &opts()).await;

        assert!(agg.did_something);
        assert!(!agg.submitted_something);
        assert!(agg.content_id_map.is_empty());
    }

    #[tokio::test]
    async fn zero_roots_is_not_an_error() {
        let preparer = ScriptedPreparer::new();
        let agg = prepare_all(Vec::new(), &preparer, &opts()).await;

        assert!(agg.all_successful);
        assert!(!agg.did_something);
        assert!(!agg.submitted_something);
    }
}
