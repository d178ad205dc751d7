use super::backend::StorageBackend;
use crate::error::Result;
use crate::model::{
    derive_session_preview, derive_session_title, round2, SessionPayload, SessionRecord,
    MAX_SESSION_SECONDS,
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Completed typing sessions, oldest first, capped at `limit` records.
pub struct SessionHistory<B: StorageBackend> {
    backend: Arc<B>,
    limit: usize,
    log: RwLock<Option<Vec<SessionRecord>>>,
}

impl<B: StorageBackend> SessionHistory<B> {
    pub fn new(backend: Arc<B>, limit: usize) -> Self {
        Self {
            backend,
            limit: limit.max(1),
            log: RwLock::new(None),
        }
    }

    fn load_locked<'a>(
        &self,
        slot: &'a mut Option<Vec<SessionRecord>>,
    ) -> Result<&'a mut Vec<SessionRecord>> {
        let log = match slot.take() {
            Some(log) => log,
            None => {
                let mut log = self.backend.load_sessions()?.unwrap_or_default();
                if log.len() > self.limit {
                    warn!(
                        "Session log holds {} records, keeping the newest {}",
                        log.len(),
                        self.limit
                    );
                    log.drain(..log.len() - self.limit);
                }
                debug!("Loaded {} sessions", log.len());
                log
            }
        };
        Ok(slot.insert(log))
    }

    /// Normalizes and stores a finished session, returning the stored record.
    ///
    /// The whole log is rewritten on every call. Memory is only updated once
    /// that write succeeded.
    pub fn record(&self, payload: &SessionPayload) -> Result<SessionRecord> {
        let record = normalize(payload);

        let mut guard = self.log.write();
        let log = self.load_locked(&mut guard)?;

        let mut next = Vec::with_capacity(log.len() + 1);
        let skip = (log.len() + 1).saturating_sub(self.limit);
        next.extend(log.iter().skip(skip).cloned());
        next.push(record.clone());

        self.backend.save_sessions(&next)?;
        *log = next;
        Ok(record)
    }

    /// Up to `limit` most recent sessions, newest first. `0` means all.
    pub fn list(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        {
            let guard = self.log.read();
            if let Some(log) = guard.as_ref() {
                return Ok(newest_first(log, limit));
            }
        }
        let mut guard = self.log.write();
        let log = self.load_locked(&mut guard)?;
        Ok(newest_first(log, limit))
    }
}

fn newest_first(log: &[SessionRecord], limit: usize) -> Vec<SessionRecord> {
    let take = if limit == 0 { log.len() } else { limit };
    log.iter().rev().take(take).cloned().collect()
}

fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}

fn normalize(payload: &SessionPayload) -> SessionRecord {
    let id = payload
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| derive_session_title(&payload.source_text));

    let now = Utc::now();
    let (started_at, ended_at, duration_seconds) = match (payload.started_at, payload.ended_at) {
        (Some(start), Some(end)) if end >= start => (start, end, elapsed_seconds(start, end)),
        (Some(start), None) if start <= now => (start, now, elapsed_seconds(start, now)),
        (_, end) => {
            let end = end.unwrap_or(now);
            let seconds = if payload.duration_seconds.is_finite() {
                payload.duration_seconds.clamp(0.0, MAX_SESSION_SECONDS)
            } else {
                0.0
            };
            // Clamped, so only an end near the earliest representable date
            // can underflow
            let start = Duration::try_milliseconds((seconds * 1000.0).round() as i64)
                .and_then(|elapsed| end.checked_sub_signed(elapsed))
                .unwrap_or(end);
            (start, end, elapsed_seconds(start, end))
        }
    };

    let total_keystrokes = payload.total_keystrokes.max(0) as u64;
    let total_errors = (payload.total_errors.max(0) as u64).min(total_keystrokes);
    let character_count = if payload.character_count > 0 {
        payload.character_count as u64
    } else {
        payload.source_text.chars().count() as u64
    };

    let mistakes = payload
        .mistakes
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(key, count)| (key.clone(), *count as u64))
        .collect();

    SessionRecord {
        id,
        title,
        preview: derive_session_preview(&payload.source_text),
        started_at,
        ended_at,
        duration_seconds: round2(duration_seconds),
        wpm: round2(payload.wpm.max(0.0)),
        cpm: round2(payload.cpm.max(0.0)),
        accuracy: round2(payload.accuracy.clamp(0.0, 100.0)),
        total_keystrokes,
        total_errors,
        character_count,
        mistakes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::mem_backend::MemBackend;
    use chrono::TimeZone;

    fn history(backend: MemBackend, limit: usize) -> (Arc<MemBackend>, SessionHistory<MemBackend>) {
        let backend = Arc::new(backend);
        (Arc::clone(&backend), SessionHistory::new(backend, limit))
    }

    fn payload(wpm: f64) -> SessionPayload {
        SessionPayload {
            source_text: "fn main() {}".into(),
            wpm,
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_metrics() {
        let mut p = payload(-5.0);
        p.cpm = 301.236;
        p.accuracy = 104.2;
        p.total_keystrokes = 10;
        p.total_errors = 25;
        let record = normalize(&p);

        assert_eq!(record.wpm, 0.0);
        assert_eq!(record.cpm, 301.24);
        assert_eq!(record.accuracy, 100.0);
        assert_eq!(record.total_errors, 10);
        assert_eq!(record.character_count, 12);
        assert!(Uuid::parse_str(&record.id).is_ok());
        assert_eq!(record.title, "fn main() {}");
    }

    #[test]
    fn test_normalize_negative_counts() {
        let mut p = payload(50.0);
        p.total_keystrokes = -3;
        p.total_errors = -1;
        p.accuracy = -20.0;
        let record = normalize(&p);
        assert_eq!(record.total_keystrokes, 0);
        assert_eq!(record.total_errors, 0);
        assert_eq!(record.accuracy, 0.0);
    }

    #[test]
    fn test_normalize_keeps_supplied_id_and_title() {
        let mut p = payload(50.0);
        p.id = Some("session-1".into());
        p.title = Some("  Warmup ".into());
        let record = normalize(&p);
        assert_eq!(record.id, "session-1");
        assert_eq!(record.title, "Warmup");
    }

    #[test]
    fn test_duration_from_timestamps() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let mut p = payload(50.0);
        p.started_at = Some(start);
        p.ended_at = Some(start + Duration::milliseconds(61_234));
        p.duration_seconds = 5.0;
        let record = normalize(&p);
        assert_eq!(record.duration_seconds, 61.23);
        assert_eq!(record.started_at, start);
    }

    #[test]
    fn test_duration_falls_back_when_inverted() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let mut p = payload(50.0);
        p.started_at = Some(start);
        p.ended_at = Some(start - Duration::seconds(30));
        p.duration_seconds = 42.5;
        let record = normalize(&p);
        assert_eq!(record.duration_seconds, 42.5);
        assert!(record.started_at <= record.ended_at);
        assert_eq!(record.ended_at, start - Duration::seconds(30));
    }

    #[test]
    fn test_duration_without_timestamps() {
        let mut p = payload(50.0);
        p.duration_seconds = 12.346;
        let record = normalize(&p);
        assert_eq!(record.duration_seconds, 12.35);
        assert_eq!(
            (record.ended_at - record.started_at).num_milliseconds(),
            12_346
        );
    }

    #[test]
    fn test_huge_duration_is_clamped() {
        let mut p = payload(50.0);
        p.duration_seconds = 1e15;
        let record = normalize(&p);
        assert_eq!(record.duration_seconds, MAX_SESSION_SECONDS);
        assert!(record.started_at <= record.ended_at);

        // Same without any room to go back in time
        p.ended_at = Some(DateTime::<Utc>::MIN_UTC);
        let record = normalize(&p);
        assert_eq!(record.started_at, record.ended_at);
        assert_eq!(record.duration_seconds, 0.0);
    }

    #[test]
    fn test_duration_from_start_only() {
        let start = Utc::now() - Duration::seconds(30);
        let mut p = payload(50.0);
        p.started_at = Some(start);
        p.duration_seconds = 5.0;
        let record = normalize(&p);

        assert_eq!(record.started_at, start);
        let elapsed = (record.ended_at - record.started_at).num_milliseconds() as f64 / 1000.0;
        assert_eq!(record.duration_seconds, round2(elapsed));
        assert!(record.duration_seconds >= 30.0);
    }

    #[test]
    fn test_mistakes_filtered_and_copied() {
        let mut p = payload(50.0);
        p.mistakes.insert("a".into(), 3);
        p.mistakes.insert("b".into(), 0);
        p.mistakes.insert("c".into(), -2);

        let (_backend, history) = history(MemBackend::new(), 10);
        let record = history.record(&p).unwrap();
        p.mistakes.insert("a".into(), 99);
        p.mistakes.insert("d".into(), 1);

        assert_eq!(record.mistakes.len(), 1);
        let stored = &history.list(1).unwrap()[0];
        assert_eq!(stored.mistakes.get("a"), Some(&3));
        assert!(!stored.mistakes.contains_key("b"));
        assert!(!stored.mistakes.contains_key("c"));
        assert!(!stored.mistakes.contains_key("d"));
    }

    #[test]
    fn test_record_trims_oldest() {
        let (backend, history) = history(MemBackend::new(), 3);
        for i in 1..=5 {
            history.record(&payload(i as f64)).unwrap();
        }
        let listed = history.list(0).unwrap();
        let wpms: Vec<f64> = listed.iter().map(|r| r.wpm).collect();
        assert_eq!(wpms, vec![5.0, 4.0, 3.0]);
        assert_eq!(backend.stored_sessions().unwrap().len(), 3);
    }

    #[test]
    fn test_list_limit() {
        let (_backend, history) = history(MemBackend::new(), 10);
        for i in 1..=4 {
            history.record(&payload(i as f64)).unwrap();
        }
        let listed = history.list(2).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].wpm, 4.0);
        assert_eq!(history.list(100).unwrap().len(), 4);
    }

    #[test]
    fn test_oversized_log_truncated_on_load() {
        let records: Vec<SessionRecord> = (1..=6).map(|i| normalize(&payload(i as f64))).collect();
        let (backend, history) = history(MemBackend::new().with_sessions(records), 4);

        let listed = history.list(0).unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].wpm, 6.0);
        assert_eq!(listed[3].wpm, 3.0);

        history.list(0).unwrap();
        assert_eq!(backend.session_loads(), 1);
    }

    #[test]
    fn test_failed_write_keeps_log() {
        let (backend, history) = history(MemBackend::new(), 10);
        history.record(&payload(10.0)).unwrap();
        backend.set_fail_session_writes(true);

        let err = history.record(&payload(20.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(history.list(0).unwrap().len(), 1);
    }
}
