//! Graceful shutdown tests driven by a manual signal bridge.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use service_foundation::config::ShutdownConfig;
use service_foundation::health::Probes;
use service_foundation::lifecycle::{
    CancellableContext, ShutdownCoordinator, ShutdownReport, SignalBridge, TerminationSignal,
};
use tokio::task::JoinHandle;

fn spawn_run(coordinator: ShutdownCoordinator) -> JoinHandle<ShutdownReport> {
    tokio::spawn(coordinator.run_until_shutdown())
}

#[tokio::test]
async fn test_waits_for_all_pending_work_after_signal() {
    let bridge = SignalBridge::manual();
    let coordinator = ShutdownCoordinator::new(bridge.clone());
    let pending = coordinator.pending_work();

    let mut guards: Vec<_> = (0..3).map(|_| pending.begin()).collect();

    // Signal before any work completes.
    bridge.trigger(TerminationSignal::Terminate);
    let run = spawn_run(coordinator);

    while let Some(guard) = guards.pop() {
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!run.is_finished(), "returned with {} units pending", guards.len() + 1);
        drop(guard);
    }

    let report = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("shutdown should finish once work drains")
        .unwrap();
    assert_eq!(report.signal, TerminationSignal::Terminate);
    assert!(report.drained);
    assert_eq!(pending.count(), 0);
}

#[tokio::test]
async fn test_hooks_run_in_order_after_signal_and_before_drain() {
    let bridge = SignalBridge::manual();
    let mut coordinator = ShutdownCoordinator::new(bridge.clone());
    let pending = coordinator.pending_work();
    let guard = pending.begin();

    // (hook id, pending count observed by the hook)
    let calls: Arc<Mutex<Vec<(u32, usize)>>> = Arc::default();
    for id in 1..=3 {
        let calls = calls.clone();
        let pending = pending.clone();
        coordinator.on_shutdown(move || calls.lock().unwrap().push((id, pending.count())));
    }

    let run = spawn_run(coordinator);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(calls.lock().unwrap().is_empty(), "hooks ran before the signal");

    bridge.trigger(TerminationSignal::Interrupt);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*calls.lock().unwrap(), vec![(1, 1), (2, 1), (3, 1)]);
    assert!(!run.is_finished());

    drop(guard);
    let report = run.await.unwrap();
    assert_eq!(report.hooks_run, 3);
    assert_eq!(report.hooks_failed, 0);
    assert_eq!(calls.lock().unwrap().len(), 3, "hooks ran more than once");
}

#[tokio::test]
async fn test_panicking_hook_is_isolated() {
    let bridge = SignalBridge::manual();
    let mut coordinator = ShutdownCoordinator::new(bridge.clone());

    let ran_after = Arc::new(Mutex::new(false));
    let flag = ran_after.clone();
    coordinator
        .on_shutdown(|| panic!("cleanup exploded"))
        .on_shutdown(move || *flag.lock().unwrap() = true);

    bridge.trigger(TerminationSignal::Terminate);
    let report = coordinator.run_until_shutdown().await;

    assert_eq!(report.hooks_run, 2);
    assert_eq!(report.hooks_failed, 1);
    assert!(*ran_after.lock().unwrap());
}

#[tokio::test]
#[should_panic(expected = "cleanup exploded")]
async fn test_panicking_hook_propagates_without_isolation() {
    let bridge = SignalBridge::manual();
    let config = ShutdownConfig {
        isolate_hook_panics: false,
        ..ShutdownConfig::default()
    };
    let mut coordinator = ShutdownCoordinator::new(bridge.clone()).with_config(config);
    coordinator.on_shutdown(|| panic!("cleanup exploded"));

    bridge.trigger(TerminationSignal::Terminate);
    coordinator.run_until_shutdown().await;
}

#[tokio::test]
async fn test_slow_hook_is_abandoned_after_timeout() {
    let bridge = SignalBridge::manual();
    let config = ShutdownConfig {
        hook_timeout_ms: Some(50),
        ..ShutdownConfig::default()
    };
    let mut coordinator = ShutdownCoordinator::new(bridge.clone()).with_config(config);

    let ran_after = Arc::new(Mutex::new(false));
    let flag = ran_after.clone();
    coordinator
        .on_shutdown(|| std::thread::sleep(Duration::from_secs(2)))
        .on_shutdown(move || *flag.lock().unwrap() = true);

    bridge.trigger(TerminationSignal::Terminate);
    let started = Instant::now();
    let report = coordinator.run_until_shutdown().await;

    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(report.hooks_failed, 1);
    assert!(*ran_after.lock().unwrap());
}

#[tokio::test]
async fn test_drain_timeout_gives_up_on_stuck_work() {
    let bridge = SignalBridge::manual();
    let config = ShutdownConfig {
        drain_timeout_ms: Some(50),
        ..ShutdownConfig::default()
    };
    let coordinator = ShutdownCoordinator::new(bridge.clone()).with_config(config);
    let _stuck = coordinator.pending_work().begin();

    bridge.trigger(TerminationSignal::Terminate);
    let report = tokio::time::timeout(Duration::from_secs(2), coordinator.run_until_shutdown())
        .await
        .expect("drain timeout should bound the wait");

    assert!(!report.drained);
}

#[tokio::test]
async fn test_readiness_dropped_on_signal() {
    let bridge = SignalBridge::manual();
    let probes = Probes::new();
    probes.mark_ready();

    let coordinator = ShutdownCoordinator::new(bridge.clone()).with_probes(probes.clone());
    let run = spawn_run(coordinator);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(probes.is_ready());

    bridge.trigger(TerminationSignal::Terminate);
    run.await.unwrap();
    assert!(!probes.is_ready());
    assert!(probes.is_alive());
}

#[tokio::test]
async fn test_context_and_coordinator_share_one_signal() {
    let bridge = SignalBridge::manual();
    let coordinator = ShutdownCoordinator::new(bridge.clone());
    let pending = coordinator.pending_work();
    let ctx = CancellableContext::wrap(coordinator.bridge());

    // A worker that runs until its context is cancelled.
    pending.spawn({
        let ctx = ctx.clone();
        async move {
            ctx.cancelled().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    let run = spawn_run(coordinator);
    bridge.trigger(TerminationSignal::Terminate);

    let report = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .unwrap()
        .unwrap();
    assert!(report.drained);
    assert!(ctx.is_cancelled());
}
