//! Concurrent forwarding to many distinct targets.

use std::time::Duration;
use validator_proxy::config::ProxyConfig;

mod common;

use common::{client, start_mock_backend, start_proxy, CannedResponse};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_targets_do_not_mix_bodies() {
    let targets = 16;
    let rounds = 5;

    let mut backends = Vec::new();
    for i in 0..targets {
        // staggered delays so responses complete out of request order
        let delay = Duration::from_millis(((targets - i) * 7) as u64);
        let body = format!("validator-{}-{}", i, "x".repeat(i * 100));
        backends.push(start_mock_backend(CannedResponse::ok(body).with_delay(delay)).await);
    }

    let (proxy_addr, shutdown) = start_proxy(ProxyConfig::default()).await;
    let client = client();

    let mut tasks = Vec::new();
    for round in 0..rounds {
        for (i, backend) in backends.iter().enumerate() {
            let client = client.clone();
            let url = format!(
                "http://{}/proxy/api/config/countries?target={}&round={}",
                proxy_addr, backend.addr, round
            );
            let expected = format!("validator-{}-{}", i, "x".repeat(i * 100));
            tasks.push(tokio::spawn(async move {
                let res = client.get(&url).send().await.expect("proxy reachable");
                assert!(res.status().is_success());
                let body = res.text().await.unwrap();
                assert_eq!(body, expected, "caller for target {} got another body", i);
            }));
        }
    }

    for task in tasks {
        task.await.unwrap();
    }

    for backend in &backends {
        assert_eq!(backend.calls(), rounds);
        for seen in backend.requests() {
            assert!(seen.target.starts_with("/api/config/countries?round="));
        }
    }

    shutdown.trigger();
}
