use std::collections::HashSet;
use std::time::Duration;

use demo_bootable::Bootable;
use demo_messaging_memory::MemoryBroker;
use demo_replier::{Replier, ReplierOptions};
use demo_requestor::{RequestOutcome, Requestor, RequestorOptions, payload_for};
use tokio::sync::broadcast;
use tokio::time::Instant;

fn replier(broker: &MemoryBroker, subject: &str, delay: Duration) -> Replier<MemoryBroker> {
    Replier::new(
        broker.clone(),
        ReplierOptions {
            debug: false,
            delay,
            queue_group: "g1".to_string(),
            subject: subject.to_string(),
        },
    )
}

async fn collect_for(
    outcomes: &mut broadcast::Receiver<RequestOutcome>,
    period: Duration,
) -> Vec<RequestOutcome> {
    let deadline = Instant::now() + period;
    let mut collected = Vec::new();

    while let Ok(Ok(outcome)) = tokio::time::timeout_at(deadline, outcomes.recv()).await {
        collected.push(outcome);
    }

    collected
}

#[tokio::test]
async fn test_single_loop_sequence_has_no_gaps() {
    let broker = MemoryBroker::new();
    let replier = replier(&broker, "seq", Duration::ZERO);
    replier.start().await.unwrap();

    let requestor = Requestor::new(
        broker.clone(),
        RequestorOptions {
            interval: Duration::from_millis(1),
            subject: "seq".to_string(),
            ..RequestorOptions::default()
        },
    );
    let mut outcomes = requestor.outcomes();
    requestor.start().await.unwrap();

    let collected = collect_for(&mut outcomes, Duration::from_millis(200)).await;

    replier.shutdown().await.unwrap();
    requestor.shutdown().await.unwrap();

    assert!(collected.len() > 10);
    for (index, outcome) in collected.iter().enumerate() {
        let expected = index as u64 + 1;
        assert_eq!(
            outcome,
            &RequestOutcome::Reply {
                sequence: expected,
                payload: payload_for(expected),
            }
        );
    }
}

#[tokio::test]
async fn test_parallel_loops_share_the_counter() {
    let broker = MemoryBroker::new();
    let replier = replier(&broker, "par", Duration::from_millis(2));
    replier.start().await.unwrap();

    let requestor = Requestor::new(
        broker.clone(),
        RequestorOptions {
            interval: Duration::from_millis(1),
            requestors: 4,
            subject: "par".to_string(),
            ..RequestorOptions::default()
        },
    );
    let mut outcomes = requestor.outcomes();
    requestor.start().await.unwrap();

    let collected = collect_for(&mut outcomes, Duration::from_millis(200)).await;

    replier.shutdown().await.unwrap();
    requestor.shutdown().await.unwrap();

    let sequences: HashSet<u64> = collected.iter().map(RequestOutcome::sequence).collect();
    assert_eq!(sequences.len(), collected.len());
    assert!(collected.iter().all(RequestOutcome::is_reply));

    // Every number up to the highest one seen was handed out exactly once.
    let highest = sequences.iter().copied().max().unwrap();
    assert!(highest <= requestor.last_sequence());
    assert!(highest as usize >= sequences.len());
}

#[tokio::test]
async fn test_requests_time_out_without_replier() {
    let broker = MemoryBroker::new();
    let timeout = Duration::from_millis(50);
    let requestor = Requestor::new(
        broker,
        RequestorOptions {
            timeout,
            subject: "nobody".to_string(),
            ..RequestorOptions::default()
        },
    );
    let mut outcomes = requestor.outcomes();

    let start = Instant::now();
    requestor.start().await.unwrap();

    let first = outcomes.recv().await.unwrap();
    assert!(start.elapsed() >= timeout);
    assert!(matches!(
        first,
        RequestOutcome::Failed {
            sequence: 1,
            timed_out: true,
            ..
        }
    ));

    // The loop keeps going after a timeout.
    let second = outcomes.recv().await.unwrap();
    assert_eq!(second.sequence(), 2);

    requestor.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_abandons_in_flight_request() {
    let broker = MemoryBroker::new();
    let requestor = Requestor::new(
        broker.clone(),
        RequestorOptions {
            subject: "nobody".to_string(),
            ..RequestorOptions::default()
        },
    );
    requestor.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;

    let start = Instant::now();
    requestor.shutdown().await.unwrap();
    requestor.wait().await;

    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(broker.is_closed());
}

#[tokio::test]
async fn test_replies_flow_for_one_second() {
    let broker = MemoryBroker::new();
    let replier = replier(&broker, "t1", Duration::from_millis(10));
    replier.start().await.unwrap();

    // One loop tops out below 30 replies per second with these delays, so
    // run two.
    let requestor = Requestor::new(
        broker.clone(),
        RequestorOptions {
            requestors: 2,
            subject: "t1".to_string(),
            ..RequestorOptions::default()
        },
    );
    let mut outcomes = requestor.outcomes();
    requestor.start().await.unwrap();

    let collected = collect_for(&mut outcomes, Duration::from_secs(1)).await;

    replier.shutdown().await.unwrap();
    requestor.shutdown().await.unwrap();

    let mut payloads = HashSet::new();
    for outcome in collected {
        let RequestOutcome::Reply { sequence, payload } = outcome else {
            panic!("unexpected failure: {outcome:?}");
        };
        assert_eq!(payload, payload_for(sequence));
        payloads.insert(payload);
    }

    assert!(payloads.len() >= 30);
}
