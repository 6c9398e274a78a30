//! Test doubles shared by the unit tests

use crate::clock::Clock;
use crate::config::WatchdogConfig;
use crate::error::{Error, Result};
use crate::sickbay::checker::{CheckResult, HealthProbe};
use crate::systemd::ServiceManager;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// Monotonic "now" reported by [`FakeClock`]
pub const FAKE_NOW: Duration = Duration::from_secs(1000);

/// Account name that never exists on a test host
pub const NO_SUCH_USER: &str = "kiosk-watchdog-test-nobody";

/// Defaults with an account that cannot resolve, so nothing touches the real user db
pub fn test_config() -> WatchdogConfig {
    WatchdogConfig::from_assignments([("user", NO_SUCH_USER)])
}

/// Something observable that happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Sleep(Duration),
    Check(&'static str),
}

/// Ordered record of sleeps and checks shared between fakes
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn record(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Sleep(d) => Some(d),
                Event::Check(_) => None,
            })
            .collect()
    }
}

/// Probe returning scripted results; the last result repeats
pub struct FakeProbe {
    name: &'static str,
    results: RefCell<VecDeque<CheckResult>>,
    calls: Cell<usize>,
    journal: Journal,
}

impl FakeProbe {
    pub fn scripted(name: &'static str, results: Vec<CheckResult>, journal: &Journal) -> Self {
        Self {
            name,
            results: RefCell::new(results.into()),
            calls: Cell::new(0),
            journal: journal.clone(),
        }
    }

    pub fn passing(name: &'static str, journal: &Journal) -> Self {
        Self::scripted(name, vec![CheckResult::Pass], journal)
    }

    pub fn failing(name: &'static str, reason: &str, journal: &Journal) -> Self {
        Self::scripted(name, vec![CheckResult::Fail(reason.to_string())], journal)
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl HealthProbe for FakeProbe {
    fn check(&self, _config: &WatchdogConfig) -> CheckResult {
        self.calls.set(self.calls.get() + 1);
        self.journal.record(Event::Check(self.name));

        let mut results = self.results.borrow_mut();
        if results.len() > 1 {
            results.pop_front().unwrap_or(CheckResult::Pass)
        } else {
            results.front().cloned().unwrap_or(CheckResult::Pass)
        }
    }
}

/// Clock frozen at [`FAKE_NOW`] that records sleeps instead of blocking
pub struct FakeClock {
    now: Option<Duration>,
    journal: Journal,
}

impl FakeClock {
    pub fn new(journal: &Journal) -> Self {
        Self {
            now: Some(FAKE_NOW),
            journal: journal.clone(),
        }
    }

    /// A clock that cannot be read
    pub fn unreadable(journal: &Journal) -> Self {
        Self {
            now: None,
            journal: journal.clone(),
        }
    }
}

impl Clock for FakeClock {
    fn monotonic_now(&self) -> Option<Duration> {
        self.now
    }

    fn sleep(&self, duration: Duration) {
        self.journal.record(Event::Sleep(duration));
    }
}

/// A call made against [`FakeManager`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ActiveState(String),
    SubState(String),
    ActiveEnter(String),
    Restart(String),
}

/// Scripted service manager
pub struct FakeManager {
    active: Option<String>,
    sub: Option<String>,
    entered: Result<Option<Duration>>,
    reject_restarts: bool,
    calls: RefCell<Vec<Call>>,
}

impl FakeManager {
    pub fn with_state(active: &str, sub: &str) -> Self {
        Self {
            active: Some(active.to_string()),
            sub: Some(sub.to_string()),
            entered: Ok(Some(FAKE_NOW - Duration::from_secs(60))),
            reject_restarts: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Active and running, entered `uptime` before [`FAKE_NOW`]
    pub fn active_for(uptime: Duration) -> Self {
        let mut fake = Self::with_state("active", "running");
        fake.entered = Ok(Some(FAKE_NOW.saturating_sub(uptime)));
        fake
    }

    /// Every query fails
    pub fn unreachable() -> Self {
        Self {
            active: None,
            sub: None,
            entered: Err(query_error("kiosk.service")),
            reject_restarts: true,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Active, but the sub-state query fails
    pub fn without_sub_state(mut self) -> Self {
        self.sub = None;
        self
    }

    /// Active with no usable entry timestamp
    pub fn without_timestamp(mut self) -> Self {
        self.entered = Ok(None);
        self
    }

    /// Entry timestamp query fails
    pub fn with_timestamp_error(mut self) -> Self {
        self.entered = Err(query_error("kiosk.service"));
        self
    }

    /// Entry timestamp is an absolute monotonic value
    pub fn entered_at(mut self, at: Duration) -> Self {
        self.entered = Ok(Some(at));
        self
    }

    pub fn rejecting_restarts(mut self) -> Self {
        self.reject_restarts = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn restarts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Restart(unit) => Some(unit.clone()),
                _ => None,
            })
            .collect()
    }
}

fn query_error(unit: &str) -> Error {
    Error::ServiceQuery {
        unit: unit.to_string(),
        message: "Failed to connect to bus".to_string(),
    }
}

impl ServiceManager for FakeManager {
    fn active_state(&self, unit: &str) -> Result<String> {
        self.calls
            .borrow_mut()
            .push(Call::ActiveState(unit.to_string()));
        self.active.clone().ok_or_else(|| query_error(unit))
    }

    fn sub_state(&self, unit: &str) -> Result<String> {
        self.calls.borrow_mut().push(Call::SubState(unit.to_string()));
        self.sub.clone().ok_or_else(|| query_error(unit))
    }

    fn active_enter_monotonic(&self, unit: &str) -> Result<Option<Duration>> {
        self.calls
            .borrow_mut()
            .push(Call::ActiveEnter(unit.to_string()));
        match &self.entered {
            Ok(entered) => Ok(*entered),
            Err(_) => Err(query_error(unit)),
        }
    }

    fn restart(&self, unit: &str) -> Result<()> {
        if self.reject_restarts {
            return Err(Error::RestartFailed {
                unit: unit.to_string(),
                message: "Access denied".to_string(),
            });
        }
        self.calls.borrow_mut().push(Call::Restart(unit.to_string()));
        Ok(())
    }
}
