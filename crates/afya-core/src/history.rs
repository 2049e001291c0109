use crate::insight::{Insight, Status};
use crate::reading::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use uuid::Uuid;

/// Rows a history view asks for when the caller names no limit.
pub const DEFAULT_READING_HISTORY: usize = 100;
pub const DEFAULT_INSIGHT_HISTORY: usize = 20;

/// Row shape of the `health_readings` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    pub user_id: Uuid,
    pub heart_rate: u16,
    pub systolic: u16,
    pub diastolic: u16,
    pub recorded_at: DateTime<Utc>,
}

impl VitalRecord {
    pub fn from_reading(user_id: Uuid, reading: &Reading) -> Self {
        Self {
            user_id,
            heart_rate: reading.heart_rate,
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            recorded_at: reading.timestamp,
        }
    }
}

/// Row shape of the `health_insights` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub user_id: Uuid,
    pub status: Status,
    pub summary: String,
    pub recommendation: String,
    pub recorded_at: DateTime<Utc>,
}

impl InsightRecord {
    pub fn from_insight(user_id: Uuid, insight: &Insight) -> Self {
        Self {
            user_id,
            status: insight.status,
            summary: insight.summary.clone(),
            recommendation: insight.recommendation.clone(),
            recorded_at: insight.timestamp,
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history full: max rows={0}")]
    Full(usize),
}

/// Append/query contract of the hosted persistence backend. Queries return
/// rows newest first.
pub trait HistoryStore {
    fn append_reading(&mut self, record: VitalRecord) -> Result<(), HistoryError>;

    fn append_insight(&mut self, record: InsightRecord) -> Result<(), HistoryError>;

    fn recent_readings(&self, user_id: Uuid, limit: usize) -> Result<Vec<VitalRecord>, HistoryError>;

    fn recent_insights(&self, user_id: Uuid, limit: usize) -> Result<Vec<InsightRecord>, HistoryError>;

    /// Deletes every row belonging to `user_id`, returning how many went.
    fn clear_user(&mut self, user_id: Uuid) -> Result<usize, HistoryError>;
}

#[derive(Default)]
struct UserRows {
    readings: VecDeque<VitalRecord>,
    insights: VecDeque<InsightRecord>,
}

impl UserRows {
    fn len(&self) -> usize {
        self.readings.len() + self.insights.len()
    }

    /// Drops the oldest row of the preferred kind, else of the other.
    fn evict_oldest(&mut self, prefer_readings: bool) -> bool {
        if prefer_readings {
            self.readings.pop_front().is_some() || self.insights.pop_front().is_some()
        } else {
            self.insights.pop_front().is_some() || self.readings.pop_front().is_some()
        }
    }
}

/// Newest first; ties keep the later append first.
fn newest_first<T: Clone>(
    rows: &VecDeque<T>,
    limit: usize,
    at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| at(b).cmp(&at(a)));
    out.truncate(limit);
    out
}

/// Process-local `HistoryStore`, bounded by a total row count. Once full, an
/// append evicts the appending user's oldest row; a user with no rows to
/// give up gets `HistoryError::Full`.
pub struct InMemoryHistory {
    max_rows: usize,
    rows: HashMap<Uuid, UserRows>,
    evicted: usize,
}

impl InMemoryHistory {
    pub fn new(max_rows: usize) -> Self {
        Self {
            max_rows,
            rows: HashMap::new(),
            evicted: 0,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.rows.values().map(UserRows::len).sum()
    }

    /// Rows dropped to make room since the store was created.
    pub fn evicted_rows(&self) -> usize {
        self.evicted
    }

    fn make_room(&mut self, user_id: Uuid, reading: bool) -> Result<(), HistoryError> {
        if self.total_rows() < self.max_rows {
            return Ok(());
        }
        let evicted = self
            .rows
            .get_mut(&user_id)
            .is_some_and(|rows| rows.evict_oldest(reading));
        if !evicted {
            return Err(HistoryError::Full(self.max_rows));
        }
        self.evicted += 1;
        Ok(())
    }
}

impl HistoryStore for InMemoryHistory {
    fn append_reading(&mut self, record: VitalRecord) -> Result<(), HistoryError> {
        self.make_room(record.user_id, true)?;
        self.rows.entry(record.user_id).or_default().readings.push_back(record);
        Ok(())
    }

    fn append_insight(&mut self, record: InsightRecord) -> Result<(), HistoryError> {
        self.make_room(record.user_id, false)?;
        self.rows.entry(record.user_id).or_default().insights.push_back(record);
        Ok(())
    }

    fn recent_readings(&self, user_id: Uuid, limit: usize) -> Result<Vec<VitalRecord>, HistoryError> {
        Ok(self
            .rows
            .get(&user_id)
            .map(|rows| newest_first(&rows.readings, limit, |r| r.recorded_at))
            .unwrap_or_default())
    }

    fn recent_insights(&self, user_id: Uuid, limit: usize) -> Result<Vec<InsightRecord>, HistoryError> {
        Ok(self
            .rows
            .get(&user_id)
            .map(|rows| newest_first(&rows.insights, limit, |r| r.recorded_at))
            .unwrap_or_default())
    }

    fn clear_user(&mut self, user_id: Uuid) -> Result<usize, HistoryError> {
        Ok(self.rows.remove(&user_id).map(|rows| rows.len()).unwrap_or(0))
    }
}
