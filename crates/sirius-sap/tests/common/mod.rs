#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sirius_sap::{
    CacTimer, EventSink, LowerLayer, NolRecord, OperatingChannel, Result, SapConfig,
    SapController, SapError, SapNotification, ScanRequest, SessionId, StartBssParams,
};

/// One observable side effect of the controller, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Notify(SessionId, SapNotification),
    Open(SessionId),
    Close(SessionId),
    Scan(SessionId, ScanRequest),
    StartBss(SessionId, StartBssParams),
    StopBss(SessionId),
    ChangeChannel(SessionId, OperatingChannel),
    Csa(SessionId, OperatingChannel),
    StartBeacon(SessionId),
    Arm(Duration),
    Disarm,
}

#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<Record>>>);

impl Log {
    pub fn push(&self, record: Record) {
        self.0.lock().expect("log lock").push(record);
    }

    pub fn records(&self) -> Vec<Record> {
        self.0.lock().expect("log lock").clone()
    }

    pub fn clear(&self) {
        self.0.lock().expect("log lock").clear();
    }

    pub fn notifications(&self, session: SessionId) -> Vec<SapNotification> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                Record::Notify(id, n) if id == session => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Record) -> bool) -> usize {
        self.records().iter().filter(|r| pred(r)).count()
    }

    pub fn arms(&self) -> usize {
        self.count(|r| matches!(r, Record::Arm(_)))
    }

    pub fn disarms(&self) -> usize {
        self.count(|r| matches!(r, Record::Disarm))
    }

    pub fn start_completions(&self, session: SessionId) -> usize {
        self.notifications(session)
            .iter()
            .filter(|n| matches!(n, SapNotification::StartBssComplete { .. }))
            .count()
    }

    /// Position of the first record matching `pred`
    pub fn position(&self, pred: impl Fn(&Record) -> bool) -> Option<usize> {
        self.records().iter().position(|r| pred(r))
    }
}

pub struct RecordingSink {
    pub log: Log,
    pub stored: Vec<NolRecord>,
}

impl EventSink for RecordingSink {
    fn notify(&mut self, session: SessionId, notification: SapNotification) {
        self.log.push(Record::Notify(session, notification));
    }

    fn stored_nol(&mut self) -> Vec<NolRecord> {
        self.stored.clone()
    }
}

/// Lower layer that records commands; names in `fail` are rejected
pub struct RecordingLower {
    pub log: Log,
    pub fail: Vec<&'static str>,
}

impl RecordingLower {
    fn run(&mut self, name: &'static str, record: Record) -> Result<()> {
        if self.fail.contains(&name) {
            return Err(SapError::lower(format!("{name} rejected")));
        }
        self.log.push(record);
        Ok(())
    }
}

impl LowerLayer for RecordingLower {
    fn open_session(&mut self, session: SessionId) -> Result<()> {
        self.run("open", Record::Open(session))
    }

    fn close_session(&mut self, session: SessionId) -> Result<()> {
        self.run("close", Record::Close(session))
    }

    fn request_scan(&mut self, session: SessionId, request: &ScanRequest) -> Result<()> {
        self.run("scan", Record::Scan(session, request.clone()))
    }

    fn start_bss(&mut self, session: SessionId, params: &StartBssParams) -> Result<()> {
        self.run("start_bss", Record::StartBss(session, params.clone()))
    }

    fn stop_bss(&mut self, session: SessionId) -> Result<()> {
        self.run("stop_bss", Record::StopBss(session))
    }

    fn change_channel(&mut self, session: SessionId, target: &OperatingChannel) -> Result<()> {
        self.run("change_channel", Record::ChangeChannel(session, *target))
    }

    fn send_csa(&mut self, session: SessionId, target: &OperatingChannel) -> Result<()> {
        self.run("csa", Record::Csa(session, *target))
    }

    fn start_beacon(&mut self, session: SessionId) -> Result<()> {
        self.run("start_beacon", Record::StartBeacon(session))
    }
}

pub struct RecordingTimer {
    pub log: Log,
}

impl CacTimer for RecordingTimer {
    fn arm(&mut self, duration: Duration) {
        self.log.push(Record::Arm(duration));
    }

    fn disarm(&mut self) {
        self.log.push(Record::Disarm);
    }
}

pub type TestController = SapController<RecordingSink, RecordingLower, RecordingTimer>;

pub fn controller(config: SapConfig) -> (TestController, Log) {
    build(config, Vec::new(), Vec::new())
}

pub fn build(
    config: SapConfig,
    stored: Vec<NolRecord>,
    fail: Vec<&'static str>,
) -> (TestController, Log) {
    let log = Log::default();
    let sap = SapController::new(
        config,
        RecordingSink {
            log: log.clone(),
            stored,
        },
        RecordingLower {
            log: log.clone(),
            fail,
        },
        RecordingTimer { log: log.clone() },
    )
    .expect("controller")
    .with_seed(42);
    (sap, log)
}
