//! In-memory doubles for the target page, the tab provider and the job executor.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use designflow_core::{DesignRecord, ScrapedDesign};
use tokio::sync::Semaphore;

use crate::error::AutomationError;
use crate::job::{JobExecutor, JobReport};
use crate::target::{ActionResult, Intent, Probe, RemoteTarget, TargetProvider, TargetSpec};

pub(crate) const NEVER: u32 = u32::MAX;

pub(crate) fn record(id: &str, prompt: Option<&str>) -> DesignRecord {
    let scrape = ScrapedDesign::new(id, "Brand", format!("https://shop.example/{id}"), "i");
    let mut record = DesignRecord::from_scraped(scrape.validate().unwrap());
    record.id = id.to_owned();
    record.prompt = prompt.map(ToOwned::to_owned);
    record
}

/// Page double. Probes turn true after a configurable number of `false` answers.
pub(crate) struct FakeTarget {
    url: String,
    live: AtomicBool,
    broken: AtomicBool,
    missing: Mutex<HashSet<Intent>>,
    false_answers: Mutex<HashMap<&'static str, u32>>,
    evaluations: Mutex<HashMap<&'static str, u32>>,
    log: Mutex<Vec<String>>,
}

fn probe_key(probe: &Probe) -> &'static str {
    match probe {
        Probe::DocumentReady => "ready",
        Probe::Authenticated => "auth",
        Probe::OptionVisible(_) => "option",
    }
}

impl FakeTarget {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            live: AtomicBool::new(true),
            broken: AtomicBool::new(false),
            missing: Mutex::new(HashSet::new()),
            false_answers: Mutex::new(HashMap::new()),
            evaluations: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn without(self, intent: Intent) -> Self {
        self.missing.lock().unwrap().insert(intent);
        self
    }

    /// `probe` answers `false` this many times first; [`NEVER`] keeps it false.
    pub(crate) fn false_for(self, probe: &Probe, times: u32) -> Self {
        self.false_answers.lock().unwrap().insert(probe_key(probe), times);
        self
    }

    pub(crate) fn kill(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub(crate) fn break_connection(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn evaluations(&self, probe: &Probe) -> u32 {
        self.evaluations.lock().unwrap().get(probe_key(probe)).copied().unwrap_or(0)
    }

    fn check(&self) -> Result<(), AutomationError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(AutomationError::Connection("socket closed".to_owned()));
        }
        Ok(())
    }

    fn act(&self, intent: Intent, entry: String) -> ActionResult {
        if self.missing.lock().unwrap().contains(&intent) {
            return ActionResult::ElementMissing;
        }
        self.log.lock().unwrap().push(entry);
        ActionResult::Applied
    }
}

#[async_trait]
impl RemoteTarget for FakeTarget {
    fn url(&self) -> &str {
        &self.url
    }

    async fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    async fn fill(&self, intent: Intent, value: &str) -> Result<ActionResult, AutomationError> {
        self.check()?;
        Ok(self.act(intent, format!("fill:{value}")))
    }

    async fn select_option(
        &self,
        intent: Intent,
        label: &str,
    ) -> Result<ActionResult, AutomationError> {
        self.check()?;
        Ok(self.act(intent, format!("select:{label}")))
    }

    async fn click(&self, intent: Intent) -> Result<ActionResult, AutomationError> {
        self.check()?;
        Ok(self.act(intent, format!("click:{}", intent.as_str())))
    }

    async fn evaluate(&self, probe: &Probe) -> Result<bool, AutomationError> {
        self.check()?;
        let key = probe_key(probe);
        let mut evaluations = self.evaluations.lock().unwrap();
        let count = evaluations.entry(key).or_insert(0);
        *count += 1;
        let threshold = self.false_answers.lock().unwrap().get(key).copied().unwrap_or(0);
        Ok(threshold != NEVER && *count > threshold)
    }
}

type TargetFactory = Box<dyn Fn(&str) -> FakeTarget + Send + Sync>;

/// Tab provider double. `open` builds pages with `factory`.
pub(crate) struct FakeProvider {
    existing: Mutex<Option<Arc<FakeTarget>>>,
    opened: Mutex<Vec<Arc<FakeTarget>>>,
    finds: AtomicU32,
    factory: TargetFactory,
}

impl FakeProvider {
    pub(crate) fn new(factory: impl Fn(&str) -> FakeTarget + Send + Sync + 'static) -> Self {
        Self {
            existing: Mutex::new(None),
            opened: Mutex::new(Vec::new()),
            finds: AtomicU32::new(0),
            factory: Box::new(factory),
        }
    }

    pub(crate) fn healthy() -> Self {
        Self::new(FakeTarget::new)
    }

    pub(crate) fn with_existing(self, target: Arc<FakeTarget>) -> Self {
        *self.existing.lock().unwrap() = Some(target);
        self
    }

    pub(crate) fn opened(&self) -> Vec<Arc<FakeTarget>> {
        self.opened.lock().unwrap().clone()
    }

    pub(crate) fn finds(&self) -> u32 {
        self.finds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetProvider for FakeProvider {
    async fn find(
        &self,
        _spec: &TargetSpec,
    ) -> Result<Option<Arc<dyn RemoteTarget>>, AutomationError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        let existing = self.existing.lock().unwrap().clone();
        Ok(existing.map(|t| t as Arc<dyn RemoteTarget>))
    }

    async fn open(&self, spec: &TargetSpec) -> Result<Arc<dyn RemoteTarget>, AutomationError> {
        let target = Arc::new((self.factory)(&spec.url));
        self.opened.lock().unwrap().push(Arc::clone(&target));
        Ok(target)
    }
}

/// Executor double that records start/end order and blocks on a gate.
pub(crate) struct ScriptedExecutor {
    trace: Mutex<Vec<String>>,
    gate: Semaphore,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExecutor {
    /// Jobs block until [`Self::release`] hands out permits.
    pub(crate) fn gated() -> Self {
        Self {
            trace: Mutex::new(Vec::new()),
            gate: Semaphore::new(0),
            failing: HashSet::new(),
            panicking: HashSet::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn open() -> Self {
        let executor = Self::gated();
        executor.release(Semaphore::MAX_PERMITS / 2);
        executor
    }

    pub(crate) fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_owned());
        self
    }

    pub(crate) fn panicking(mut self, id: &str) -> Self {
        self.panicking.insert(id.to_owned());
        self
    }

    pub(crate) fn release(&self, jobs: usize) {
        self.gate.add_permits(jobs);
    }

    pub(crate) fn trace(&self) -> Vec<String> {
        self.trace.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobExecutor for ScriptedExecutor {
    async fn run(&self, record: &DesignRecord) -> Result<JobReport, AutomationError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.trace.lock().unwrap().push(format!("start:{}", record.id));

        self.gate.acquire().await.unwrap().forget();

        self.trace.lock().unwrap().push(format!("end:{}", record.id));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(&record.id) {
            panic!("executor blew up on {}", record.id);
        }
        if self.failing.contains(&record.id) {
            return Err(AutomationError::TargetNotFound("submit control".to_owned()));
        }
        Ok(JobReport {
            record_id: record.id.clone(),
            target_url: "https://studio.example/".to_owned(),
            reused_target: false,
            steps: Vec::new(),
        })
    }
}
