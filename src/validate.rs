use crate::normalize::is_valid_url;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

/// Outcome of one full validation run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// URLs that passed the ignore filter and the structural check
    pub valid_urls: HashSet<String>,

    /// How many URLs matched the ignore pattern
    pub ignored_count: usize,
}

/// Per-URL classification published by workers to the aggregator
#[derive(Debug)]
enum Classification {
    Valid(String),
    Ignored,
    Dropped,
}

/// Optional HEAD liveness probe, shared across all validator workers.
///
/// Requests are throttled by a global fixed-rate limiter (burst of one) so
/// enabling the probe never hammers remote servers.
pub struct HeadProbe {
    client: reqwest::Client,
    throttle: Throttle,
}

impl HeadProbe {
    pub fn new(timeout: Duration, rate_per_sec: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("HTTP client for HEAD probe");
        Self {
            client,
            throttle: Throttle::new(rate_per_sec),
        }
    }

    /// Issues a throttled HEAD request; any transport error or status
    /// outside 200-399 means the URL is considered dead.
    async fn is_live(&self, url: &str) -> bool {
        self.throttle.acquire().await;
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                status.is_success() || status.is_redirection()
            }
            Err(e) => {
                ::log::debug!("HEAD probe failed for {}: {}", url, e);
                false
            }
        }
    }
}

/// Fixed-rate limiter with a burst of one.
///
/// Each caller claims the next free slot under a short lock and sleeps
/// outside it, so the lock is never held across I/O.
struct Throttle {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl Throttle {
    fn new(rate_per_sec: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / rate_per_sec.max(1),
            next_slot: Mutex::new(Instant::now()),
        }
    }

    async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = if *next > now { *next } else { now };
            *next = slot + self.interval;
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

/// Classifies every URL concurrently and returns the surviving set plus an
/// exact count of ignored URLs.
///
/// Each URL is checked against the ignore pattern first (ignored URLs are
/// counted and excluded before structural validation), then structurally
/// validated; structurally invalid URLs are dropped silently. A bounded
/// pool of workers consumes a shared work queue and publishes
/// classifications to a single aggregator loop that exclusively owns the
/// mutable result state. The call blocks until every URL is classified.
///
/// This operation never fails: a malformed ignore pattern is rejected by
/// the caller before it gets here.
pub async fn validate_urls_concurrently(
    urls: &[String],
    ignore_pattern: Option<Regex>,
    max_concurrency: usize,
    probe: Option<HeadProbe>,
) -> ValidationResult {
    let num_workers = max_concurrency.max(1).min(urls.len().max(1));
    ::log::debug!(
        "Validating {} URLs across {} workers",
        urls.len(),
        num_workers
    );

    let (work_tx, work_rx) = mpsc::channel::<String>(urls.len().max(1));
    let (result_tx, mut result_rx) = mpsc::channel::<Classification>(urls.len().max(1));
    let work_rx = Arc::new(Mutex::new(work_rx));
    let ignore_pattern = ignore_pattern.map(Arc::new);
    let probe = probe.map(Arc::new);

    // The queue is pre-filled and closed before workers start, so workers
    // terminate when it drains.
    for url in urls {
        work_tx
            .send(url.clone())
            .await
            .expect("work queue has capacity for every URL");
    }
    drop(work_tx);

    let mut handles = Vec::with_capacity(num_workers);
    for worker_id in 0..num_workers {
        handles.push(tokio::spawn(worker_loop(
            worker_id,
            Arc::clone(&work_rx),
            result_tx.clone(),
            ignore_pattern.clone(),
            probe.clone(),
        )));
    }

    // Drop the original sender so the aggregator loop ends once every
    // worker has finished.
    drop(result_tx);

    // Aggregator: sole owner of the valid set and the ignored counter.
    let mut result = ValidationResult::default();
    while let Some(classification) = result_rx.recv().await {
        match classification {
            Classification::Valid(url) => {
                result.valid_urls.insert(url);
            }
            Classification::Ignored => result.ignored_count += 1,
            Classification::Dropped => {}
        }
    }

    for handle in handles {
        if let Err(e) = handle.await {
            ::log::error!("Validator worker panicked: {}", e);
        }
    }

    result
}

/// A single validator worker: pulls URLs from the shared queue until it
/// drains, publishing one classification per URL.
async fn worker_loop(
    worker_id: usize,
    work_rx: Arc<Mutex<mpsc::Receiver<String>>>,
    result_tx: mpsc::Sender<Classification>,
    ignore_pattern: Option<Arc<Regex>>,
    probe: Option<Arc<HeadProbe>>,
) {
    loop {
        let url = {
            let mut rx = work_rx.lock().await;
            rx.recv().await
        };
        let Some(url) = url else {
            ::log::trace!("Worker {} finished, queue drained", worker_id);
            break;
        };

        let classification = classify(url, ignore_pattern.as_deref(), probe.as_deref()).await;
        if result_tx.send(classification).await.is_err() {
            ::log::error!("Worker {} failed to publish classification", worker_id);
            break;
        }
    }
}

async fn classify(
    url: String,
    ignore_pattern: Option<&Regex>,
    probe: Option<&HeadProbe>,
) -> Classification {
    if let Some(pattern) = ignore_pattern {
        if pattern.is_match(&url) {
            ::log::debug!("Ignoring URL by pattern: {}", url);
            return Classification::Ignored;
        }
    }
    if !is_valid_url(&url) {
        ::log::debug!("Dropping structurally invalid URL: {}", url);
        return Classification::Dropped;
    }
    if let Some(probe) = probe {
        if !probe.is_live(&url).await {
            ::log::debug!("Dropping dead URL: {}", url);
            return Classification::Dropped;
        }
    }
    Classification::Valid(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_ignore_pattern_checked_before_validity() {
        let input = urls(&["http://example.com", "https://example.com", "invalid-url"]);
        let ignore = Regex::new(r"^https://.*$").unwrap();

        let result = validate_urls_concurrently(&input, Some(ignore), 4, None).await;

        let expected: HashSet<String> = ["http://example.com".to_string()].into();
        assert_eq!(result.valid_urls, expected);
        // invalid-url is dropped, not ignored
        assert_eq!(result.ignored_count, 1);
    }

    #[tokio::test]
    async fn test_no_ignore_pattern_keeps_all_valid() {
        let input = urls(&[
            "http://example.com",
            "https://example.org/path",
            "ftp://example.net",
            "not a url",
        ]);

        let result = validate_urls_concurrently(&input, None, 4, None).await;

        assert_eq!(result.valid_urls.len(), 2);
        assert!(result.valid_urls.contains("http://example.com"));
        assert!(result.valid_urls.contains("https://example.org/path"));
        assert_eq!(result.ignored_count, 0);
    }

    #[tokio::test]
    async fn test_valid_set_is_subset_and_counts_bound() {
        let input = urls(&[
            "http://a.example.com",
            "https://b.example.com",
            "invalid",
            "http://ignored.example.com",
            "gopher://c.example.com",
        ]);
        let ignore = Regex::new(r"ignored").unwrap();

        let result = validate_urls_concurrently(&input, Some(ignore), 2, None).await;

        for url in &result.valid_urls {
            assert!(is_valid_url(url));
        }
        assert!(result.ignored_count + result.valid_urls.len() <= input.len());
        assert_eq!(result.valid_urls.len(), 2);
        assert_eq!(result.ignored_count, 1);
    }

    #[tokio::test]
    async fn test_duplicate_ignored_urls_counted_per_occurrence() {
        let input = urls(&[
            "http://skip.example.com",
            "http://skip.example.com",
            "http://keep.example.com",
        ]);
        let ignore = Regex::new(r"skip").unwrap();

        let result = validate_urls_concurrently(&input, Some(ignore), 8, None).await;

        assert_eq!(result.ignored_count, 2);
        assert_eq!(result.valid_urls.len(), 1);
    }

    #[tokio::test]
    async fn test_single_worker_classifies_everything() {
        let input: Vec<String> = (0..50).map(|i| format!("http://example.com/{}", i)).collect();

        let result = validate_urls_concurrently(&input, None, 1, None).await;

        assert_eq!(result.valid_urls.len(), 50);
        assert_eq!(result.ignored_count, 0);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let result = validate_urls_concurrently(&[], None, 4, None).await;
        assert!(result.valid_urls.is_empty());
        assert_eq!(result.ignored_count, 0);
    }

    /// Serves every connection a canned HTTP response with the given
    /// status line and an empty body.
    async fn spawn_status_server(status: &'static str) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        addr
    }

    /// An address nothing is listening on: bind a port, then release it.
    async fn unreachable_addr() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    #[tokio::test]
    async fn test_probe_keeps_live_urls_and_drops_dead_ones() {
        let live = spawn_status_server("200 OK").await;
        let dead = spawn_status_server("404 Not Found").await;

        let live_url = format!("http://{}/", live);
        let dead_url = format!("http://{}/", dead);
        let input = vec![live_url.clone(), dead_url.clone()];

        let probe = HeadProbe::new(Duration::from_secs(5), 100);
        let result = validate_urls_concurrently(&input, None, 2, Some(probe)).await;

        let expected: HashSet<String> = [live_url].into();
        assert_eq!(result.valid_urls, expected);
        // Dead URLs are dropped, never counted as ignored
        assert_eq!(result.ignored_count, 0);
    }

    #[tokio::test]
    async fn test_probe_accepts_redirects() {
        let redirect = spawn_status_server("301 Moved Permanently").await;
        let url = format!("http://{}/", redirect);

        let probe = HeadProbe::new(Duration::from_secs(5), 100);
        let result = validate_urls_concurrently(&[url.clone()], None, 1, Some(probe)).await;

        assert!(result.valid_urls.contains(&url));
    }

    #[tokio::test]
    async fn test_probe_drops_url_on_transport_error() {
        let unreachable = unreachable_addr().await;
        let url = format!("http://{}/", unreachable);

        let probe = HeadProbe::new(Duration::from_secs(2), 100);
        let result = validate_urls_concurrently(&[url], None, 1, Some(probe)).await;

        assert!(result.valid_urls.is_empty());
        assert_eq!(result.ignored_count, 0);
    }

    #[tokio::test]
    async fn test_throttle_spaces_permits() {
        let throttle = Throttle::new(10);
        let start = Instant::now();
        for _ in 0..3 {
            throttle.acquire().await;
        }
        // Burst of one: the third permit cannot arrive before two intervals
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
