//! Outdated dependency scanning
//!
//! Fans out one registry lookup per declared dependency onto a `JoinSet`,
//! bounded by a semaphore and a per-lookup timeout. Results come back to the
//! scanning task one at a time, so only that task writes the collected
//! entries. A failed lookup is recorded and never stops the others.

use crate::config::{ScanConfig, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use crate::domain::{locale_cmp, DependencySpec, InstalledRecord, OutdatedEntry, ScanResult};
use crate::error::{FailureKind, LookupError, RegistryError, ScanError};
use crate::progress::Progress;
use crate::registry::{create_source, MetadataSource};
use crate::tree::{declared_dependencies, load_tree, InstalledTreeView};
use crate::version::{pick, LATEST_TAG};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// A dependency whose lookup failed
#[derive(Debug)]
pub struct LookupFailure {
    /// Package name
    pub name: String,
    /// Why the lookup failed
    pub error: LookupError,
}

impl LookupFailure {
    pub fn kind(&self) -> FailureKind {
        self.error.classify()
    }
}

/// Everything a scan found
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Outdated and missing dependencies, sorted by name
    pub result: ScanResult,
    /// Lookups that failed, sorted by name
    pub failures: Vec<LookupFailure>,
    /// Dependencies whose specifier cannot be checked against a registry, sorted
    pub unsupported: Vec<String>,
}

impl ScanReport {
    /// Returns true if any dependency is outdated or missing
    pub fn has_outdated(&self) -> bool {
        !self.result.is_empty()
    }

    /// Returns true if any lookup failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Checks every declared dependency of a tree against a metadata source
pub struct OutdatedScanner {
    source: Arc<dyn MetadataSource>,
    concurrency: usize,
    timeout: Duration,
    filter: Vec<String>,
    show_progress: bool,
}

impl OutdatedScanner {
    /// Create a scanner with default concurrency and timeout
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            filter: Vec::new(),
            show_progress: false,
        }
    }

    /// Set the maximum number of lookups in flight (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the time limit for one lookup
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Only check these package names (empty means all)
    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Show a progress bar while lookups run
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Scan a tree
    pub async fn scan(&self, tree: &dyn InstalledTreeView) -> ScanReport {
        let location = tree.root_name().map(str::to_string);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        let mut unsupported = Vec::new();

        for dependency in declared_dependencies(tree) {
            if !self.filter.is_empty() && !self.filter.contains(&dependency.name) {
                continue;
            }

            let specifier = dependency.specifier();
            if !specifier.is_registry() {
                debug!(
                    package = %dependency.name,
                    spec = %specifier,
                    kind = ?specifier.kind(),
                    "skipping non-registry dependency"
                );
                unsupported.push(dependency.name);
                continue;
            }

            let name = dependency.name.clone();
            let lookup = Lookup {
                installed: tree.installed(&dependency.name),
                dependency,
                location: location.clone(),
                source: Arc::clone(&self.source),
                semaphore: Arc::clone(&semaphore),
                timeout: self.timeout,
            };
            let handle = tasks.spawn(lookup.run());
            pending.insert(handle.id(), name);
        }

        let mut progress = Progress::new(self.show_progress);
        progress.start(tasks.len() as u64, "Checking dependencies");

        let mut entries = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            progress.inc();
            let (name, outcome) = match joined {
                Ok((id, done)) => {
                    pending.remove(&id);
                    done
                }
                Err(e) => {
                    let name = pending.remove(&e.id()).unwrap_or_default();
                    let error = LookupError::Aborted {
                        package: name.clone(),
                        message: e.to_string(),
                    };
                    (name, Err(error))
                }
            };
            progress.set_message(&name);

            match outcome {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => debug!(package = %name, "up to date"),
                Err(error) if error.classify() == FailureKind::Unsupported => {
                    debug!(package = %name, error = %error, "skipping unsupported specifier");
                    unsupported.push(name);
                }
                Err(error) => {
                    warn!(package = %name, kind = %error.classify(), error = %error, "lookup failed");
                    failures.push(LookupFailure { name, error });
                }
            }
        }
        progress.finish_and_clear();

        failures.sort_by(|a, b| locale_cmp(&a.name, &b.name));
        unsupported.sort_by(|a, b| locale_cmp(a, b));

        ScanReport {
            result: ScanResult::from_unsorted(entries),
            failures,
            unsupported,
        }
    }
}

/// One dependency's lookup, owned by its task
struct Lookup {
    dependency: DependencySpec,
    installed: Option<InstalledRecord>,
    location: Option<String>,
    source: Arc<dyn MetadataSource>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl Lookup {
    async fn run(self) -> (String, Result<Option<OutdatedEntry>, LookupError>) {
        let outcome = self.check().await;
        (self.dependency.name, outcome)
    }

    async fn check(&self) -> Result<Option<OutdatedEntry>, LookupError> {
        let name = &self.dependency.name;
        let registry = self.source.registry_name();

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| RegistryError::network_error(name, registry, e.to_string()))?;

        let packument = tokio::time::timeout(self.timeout, self.source.fetch(name))
            .await
            .map_err(|_| RegistryError::timeout(name, registry))??;

        let wanted = pick(&packument, &self.dependency.spec)?;
        let latest = pick(&packument, LATEST_TAG)?;
        debug!(package = %name, wanted = %wanted.version, latest = %latest.version, "resolved");

        Ok(OutdatedEntry::evaluate(
            &self.dependency,
            self.installed.as_ref(),
            wanted,
            latest,
            self.location.as_deref(),
        ))
    }
}

/// Load the tree a configuration points at and scan it against its registry
pub async fn scan_project(config: &ScanConfig) -> Result<ScanReport, ScanError> {
    let tree = load_tree(&config.scope)?;
    let source = create_source(config).map_err(ScanError::Client)?;

    let scanner = OutdatedScanner::new(source)
        .with_concurrency(config.concurrency)
        .with_timeout(config.timeout)
        .with_filter(config.packages.clone())
        .with_progress(config.progress);

    Ok(scanner.scan(tree.as_ref()).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyKind, Packument};
    use crate::tree::StaticTree;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory metadata source with a per-package delay
    #[derive(Default)]
    struct FakeSource {
        packuments: HashMap<String, (Packument, Duration)>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, packument: Packument, delay_ms: u64) -> Self {
            self.packuments.insert(
                packument.name.clone(),
                (packument, Duration::from_millis(delay_ms)),
            );
            self
        }
    }

    #[async_trait]
    impl MetadataSource for FakeSource {
        fn registry_name(&self) -> &str {
            "fake"
        }

        async fn fetch(&self, package: &str) -> Result<Packument, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let result = match self.packuments.get(package) {
                Some((packument, delay)) => {
                    tokio::time::sleep(*delay).await;
                    Ok(packument.clone())
                }
                None => Err(RegistryError::package_not_found(package, "fake")),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn packument(name: &str, versions: &[&str], latest: &str) -> Packument {
        versions
            .iter()
            .fold(Packument::new(name), |p, v| p.with_version(v))
            .with_tag(LATEST_TAG, latest)
    }

    fn scanner(source: FakeSource) -> (OutdatedScanner, Arc<FakeSource>) {
        let source = Arc::new(source);
        let dyn_source: Arc<dyn MetadataSource> = source.clone();
        (OutdatedScanner::new(dyn_source), source)
    }

    fn names(report: &ScanReport) -> Vec<&str> {
        report.result.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_missing_dependency() {
        let tree = StaticTree::new("app").with_dependency(DependencySpec::dev("left-pad", "^1.0.0"));
        let (scanner, _) = scanner(
            FakeSource::default().with(packument("left-pad", &["1.0.0", "1.3.0"], "1.3.0"), 0),
        );

        let report = scanner.scan(&tree).await;

        assert!(report.has_outdated());
        let entry = report.result.get("left-pad").unwrap();
        assert!(entry.current.is_none());
        assert_eq!(entry.wanted, "1.3.0");
        assert_eq!(entry.latest, "1.3.0");
        assert_eq!(entry.location.as_deref(), Some("app"));
        assert_eq!(entry.kind, DependencyKind::Dev);
    }

    #[tokio::test]
    async fn test_up_to_date() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::prod("lodash", "^4.17.0"))
            .with_installed("lodash", "4.17.21");
        let (scanner, _) = scanner(
            FakeSource::default().with(packument("lodash", &["4.17.20", "4.17.21"], "4.17.21"), 0),
        );

        let report = scanner.scan(&tree).await;

        assert!(!report.has_outdated());
        assert!(!report.has_failures());
        assert!(report.unsupported.is_empty());
    }

    #[tokio::test]
    async fn test_behind_latest_in_global_tree() {
        let tree = StaticTree::global()
            .with_dependency(DependencySpec::prod("npm", "*"))
            .with_installed("npm", "9.0.0");
        let (scanner, _) =
            scanner(FakeSource::default().with(packument("npm", &["9.0.0", "10.2.0"], "10.2.0"), 0));

        let report = scanner.scan(&tree).await;

        let entry = report.result.get("npm").unwrap();
        assert_eq!(entry.current.as_deref(), Some("9.0.0"));
        assert_eq!(entry.wanted, "10.2.0");
        assert!(entry.location.is_none());
    }

    #[tokio::test]
    async fn test_deterministic_regardless_of_completion_order() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::prod("react", "^17.0.0"))
            .with_dependency(DependencySpec::prod("Express", "^4.0.0"))
            .with_dependency(DependencySpec::prod("axios", "^1.0.0"));

        let run = |delays: [u64; 3]| {
            let source = FakeSource::default()
                .with(packument("react", &["17.0.2"], "17.0.2"), delays[0])
                .with(packument("Express", &["4.18.2"], "4.18.2"), delays[1])
                .with(packument("axios", &["1.6.0"], "1.6.0"), delays[2]);
            let (scanner, _) = scanner(source);
            let tree = tree.clone();
            async move { scanner.scan(&tree).await }
        };

        let forward = run([10, 30, 50]).await;
        let reversed = run([50, 30, 10]).await;

        assert_eq!(names(&forward), ["axios", "Express", "react"]);
        assert_eq!(forward.result, reversed.result);
    }

    #[tokio::test]
    async fn test_partial_failure_on_timeout() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::prod("a", "^1.0.0"))
            .with_dependency(DependencySpec::prod("slow", "^1.0.0"))
            .with_dependency(DependencySpec::prod("c", "^1.0.0"));
        let source = FakeSource::default()
            .with(packument("a", &["1.0.0"], "1.0.0"), 0)
            .with(packument("slow", &["1.0.0"], "1.0.0"), 5_000)
            .with(packument("c", &["1.0.0"], "1.0.0"), 0);
        let (scanner, _) = scanner(source);

        let report = scanner
            .with_timeout(Duration::from_millis(100))
            .scan(&tree)
            .await;

        assert_eq!(names(&report), ["a", "c"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "slow");
        assert_eq!(report.failures[0].kind(), FailureKind::Timeout);
    }

    #[tokio::test]
    async fn test_not_found_is_isolated() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::prod("ghost", "^1.0.0"))
            .with_dependency(DependencySpec::prod("future", "^9.0.0"))
            .with_dependency(DependencySpec::prod("real", "^1.0.0"));
        let (scanner, _) = scanner(
            FakeSource::default()
                .with(packument("future", &["1.0.0"], "1.0.0"), 0)
                .with(packument("real", &["1.0.0"], "1.0.0"), 0),
        );

        let report = scanner.scan(&tree).await;

        assert_eq!(names(&report), ["real"]);
        let kinds: Vec<_> = report
            .failures
            .iter()
            .map(|f| (f.name.as_str(), f.kind()))
            .collect();
        assert_eq!(
            kinds,
            [
                ("future", FailureKind::NotFound),
                ("ghost", FailureKind::NotFound)
            ]
        );
    }

    #[tokio::test]
    async fn test_first_declaration_wins() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::dev("a", "^2.0.0"))
            .with_dependency(DependencySpec::prod("a", "^1.0.0"));
        let (scanner, source) =
            scanner(FakeSource::default().with(packument("a", &["1.5.0", "2.1.0"], "2.1.0"), 0));

        let report = scanner.scan(&tree).await;

        let entry = report.result.get("a").unwrap();
        assert_eq!(entry.wanted, "1.5.0");
        assert_eq!(entry.kind, DependencyKind::Prod);
        assert_eq!(report.result.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_registry_specifiers_skipped() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::prod("local", "file:../local"))
            .with_dependency(DependencySpec::prod("forked", "github:me/forked"))
            .with_dependency(DependencySpec::prod("weird", "!!!"));
        let (scanner, source) = scanner(FakeSource::default());

        let report = scanner.scan(&tree).await;

        assert!(!report.has_outdated());
        assert!(!report.has_failures());
        assert_eq!(report.unsupported, ["forked", "local", "weird"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_filter() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::prod("a", "^1.0.0"))
            .with_dependency(DependencySpec::prod("b", "^1.0.0"));
        let (scanner, source) = scanner(
            FakeSource::default()
                .with(packument("a", &["1.0.0"], "1.0.0"), 0)
                .with(packument("b", &["1.0.0"], "1.0.0"), 0),
        );

        let report = scanner.with_filter(vec!["b".to_string()]).scan(&tree).await;

        assert_eq!(names(&report), ["b"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrency_limit() {
        let mut tree = StaticTree::new("app");
        let mut source = FakeSource::default();
        for i in 0..6 {
            let name = format!("pkg-{}", i);
            tree = tree.with_dependency(DependencySpec::prod(&name, "^1.0.0"));
            source = source.with(packument(&name, &["1.0.0"], "1.0.0"), 20);
        }
        let (scanner, source) = scanner(source);

        let report = scanner.with_concurrency(2).scan(&tree).await;

        assert_eq!(report.result.len(), 6);
        assert_eq!(source.calls.load(Ordering::SeqCst), 6);
        assert!(source.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_empty_tree() {
        let (scanner, _) = scanner(FakeSource::default());
        let report = scanner.scan(&StaticTree::new("app")).await;
        assert!(!report.has_outdated());
        assert!(report.failures.is_empty());
    }

    /// Source whose fetch panics for one package name
    struct PanickingSource {
        inner: FakeSource,
        poisoned: &'static str,
    }

    #[async_trait]
    impl MetadataSource for PanickingSource {
        fn registry_name(&self) -> &str {
            "fake"
        }

        async fn fetch(&self, package: &str) -> Result<Packument, RegistryError> {
            if package == self.poisoned {
                panic!("registry client bug");
            }
            self.inner.fetch(package).await
        }
    }

    #[tokio::test]
    async fn test_panicked_lookup_is_recorded_as_failure() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::prod("a", "^1.0.0"))
            .with_dependency(DependencySpec::prod("boom", "^1.0.0"));
        let source = PanickingSource {
            inner: FakeSource::default().with(packument("a", &["1.0.0"], "1.0.0"), 0),
            poisoned: "boom",
        };

        let report = OutdatedScanner::new(Arc::new(source)).scan(&tree).await;

        assert_eq!(names(&report), ["a"]);
        assert!(report.has_failures());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "boom");
        assert_eq!(report.failures[0].kind(), FailureKind::Aborted);
    }

    #[test]
    fn test_with_concurrency_minimum() {
        let (scanner, _) = scanner(FakeSource::default());
        assert_eq!(scanner.with_concurrency(0).concurrency, 1);
    }
}
