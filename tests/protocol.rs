//! Rendezvous-protocol behaviour across worker boundaries, exercised with a
//! recording runner instead of real processes.

mod common;

use std::sync::{Arc, Mutex};

use dmake::coord::{CoordinationStore, MemoryStore, keys};
use dmake::dag::TaskPayload;
use dmake::errors::DmakeError;
use dmake::exec::{DeliveryOutcome, process_delivery};
use dmake::queue::MemoryQueue;
use dmake::rules;
use dmake_test_utils::builders::RuleFileBuilder;
use dmake_test_utils::recording::RecordingRunner;
use dmake_test_utils::{init_tracing, with_timeout};

use common::Harness;

type Executed = Arc<Mutex<Vec<(String, String)>>>;

fn executed_targets(executed: &Executed) -> Vec<String> {
    executed
        .lock()
        .unwrap()
        .iter()
        .map(|(target, _)| target.clone())
        .collect()
}

#[tokio::test]
async fn diamond_runs_each_task_once_with_deps_first() {
    init_tracing();
    with_timeout(async {
        let text = RuleFileBuilder::new()
            .rule("top", &["left", "right"], Some("echo top"))
            .rule("left", &["base"], Some("echo left"))
            .rule("right", &["base"], Some("echo right"))
            .rule("base", &[], Some("echo base"))
            .build();

        let executed: Executed = Arc::new(Mutex::new(Vec::new()));
        let runner = Arc::new(RecordingRunner::new(executed.clone()));
        let harness = Harness::new(runner, 3);
        harness.build(&text, "top").await.unwrap();

        let order = executed_targets(&executed);
        assert_eq!(order.len(), 4);

        let position = |target: &str| order.iter().position(|t| t == target).unwrap();
        assert_eq!(position("base"), 0);
        assert!(position("left") < position("top"));
        assert!(position("right") < position("top"));
    })
    .await;
}

#[tokio::test]
async fn aggregator_target_without_command_completes() {
    init_tracing();
    with_timeout(async {
        let text = RuleFileBuilder::new()
            .rule("all", &["a", "b"], None)
            .rule("a", &[], Some("echo a"))
            .rule("b", &[], Some("echo b"))
            .build();

        let executed: Executed = Arc::new(Mutex::new(Vec::new()));
        let runner = Arc::new(RecordingRunner::new(executed.clone()));
        let harness = Harness::new(runner, 2);
        harness.build(&text, "").await.unwrap();

        // `all` counts as an executed node but runs no commands.
        let mut targets = executed_targets(&executed);
        targets.sort_unstable();
        assert_eq!(targets, vec!["a", "b"]);
        assert_eq!(
            harness.store.get_value(keys::REMAINING_TASKS).await.unwrap(),
            Some("0".to_string())
        );
    })
    .await;
}

#[tokio::test]
async fn duplicated_dependency_tokens_still_balance() {
    init_tracing();
    with_timeout(async {
        let text = "all: b b\n\techo all\nb:\n\techo b\n";

        let executed: Executed = Arc::new(Mutex::new(Vec::new()));
        let runner = Arc::new(RecordingRunner::new(executed.clone()));
        let harness = Harness::new(runner, 2);
        harness.build(text, "").await.unwrap();

        assert_eq!(executed_targets(&executed), vec!["b", "all"]);
    })
    .await;
}

#[tokio::test]
async fn cycle_is_rejected_before_anything_runs() {
    init_tracing();
    with_timeout(async {
        let text = RuleFileBuilder::new()
            .rule("a", &["b"], Some("echo a"))
            .rule("b", &["a"], Some("echo b"))
            .build();

        let executed: Executed = Arc::new(Mutex::new(Vec::new()));
        let runner = Arc::new(RecordingRunner::new(executed.clone()));
        let harness = Harness::new(runner, 2);

        let err = harness.build(&text, "a").await.unwrap_err();
        assert!(matches!(err, DmakeError::Cycle(_)));
        assert!(executed.lock().unwrap().is_empty());
    })
    .await;
}

#[tokio::test]
async fn failure_reports_the_failing_target() {
    init_tracing();
    with_timeout(async {
        let text = RuleFileBuilder::new()
            .rule("all", &["broken"], Some("echo all"))
            .rule("broken", &[], Some("echo broken"))
            .build();

        let executed: Executed = Arc::new(Mutex::new(Vec::new()));
        let runner = Arc::new(RecordingRunner::new(executed.clone()).fail_target("broken"));
        let harness = Harness::new(runner, 2);

        let err = harness.build(&text, "").await.unwrap_err();
        assert!(err.to_string().contains("broken"));

        // The parent never became ready.
        assert_eq!(executed_targets(&executed), vec!["broken"]);
    })
    .await;
}

#[tokio::test]
async fn concurrent_final_arrivals_arm_exactly_one_executor() {
    init_tracing();
    with_timeout(async {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new());
        store
            .set_value(keys::REMAINING_TASKS, "1")
            .await
            .unwrap();

        let executed: Executed = Arc::new(Mutex::new(Vec::new()));
        let runner = Arc::new(RecordingRunner::new(executed.clone()));

        let task = TaskPayload {
            target: "parent".to_string(),
            command: Some("echo parent".to_string()),
            dep_count: 3,
            children: Vec::new(),
        };

        // Three dependency arrivals race from separate tasks.
        let mut handles = Vec::new();
        for _ in 0..3 {
            let store = store.clone();
            let queue = queue.clone();
            let runner = runner.clone();
            let task = task.clone();
            handles.push(tokio::spawn(async move {
                process_delivery(store.as_ref(), queue.as_ref(), runner.as_ref(), &task).await
            }));
        }

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap().unwrap());
        }

        let armed = outcomes
            .iter()
            .filter(|outcome| **outcome == DeliveryOutcome::Executed)
            .count();
        assert_eq!(armed, 1);
        assert_eq!(executed.lock().unwrap().len(), 1);
    })
    .await;
}

#[tokio::test]
async fn round_trip_preserves_declared_dependency_order() {
    init_tracing();
    let text = RuleFileBuilder::new()
        .comment("build everything")
        .rule("all", &["z", "m", "a"], Some("echo all"))
        .blank_line()
        .rule("z", &[], Some("echo z"))
        .rule("m", &[], Some("echo m"))
        .rule("a", &[], Some("echo a"))
        .build();

    let graph = rules::parse(&text).unwrap();
    assert_eq!(
        graph.lookup("").unwrap().dependencies,
        vec!["z", "m", "a"]
    );
}
