//! Immutable in-memory snapshot of both tables.
//!
//! A [`Snapshot`] is built in one go by a [`SnapshotBuilder`] and never
//! mutated afterwards. Keyed lookups go through index maps that point into the
//! ordered lists, so each record is stored exactly once.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::{exclude_columns, record_key, Record, Row, COMPANY_KEY, RECRUITMENT_KEY};
use crate::value::sanitize_row;

/// Point-in-time copy of the `company` and `recruit` tables.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    companies: Vec<Record>,
    recruitments: Vec<Record>,
    company_index: HashMap<String, usize>,
    recruitment_index: HashMap<String, usize>,
    loaded_at: Option<DateTime<Utc>>,
}

/// Sizes of the keyed mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotCounts {
    pub companies: usize,
    pub recruitments: usize,
}

/// A recruitment together with the company its foreign key resolves to.
#[derive(Debug, Serialize)]
pub struct RecruitmentDetail<'a> {
    pub recruitment: &'a Record,
    pub company: Option<&'a Record>,
}

impl Snapshot {
    /// Snapshot with no data, used before the first load completes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn company(&self, key: &str) -> Option<&Record> {
        self.company_index.get(key).map(|&i| &self.companies[i])
    }

    /// Look up a recruitment and resolve its owning company.
    ///
    /// A missing or dangling `corporate_number` yields `company: None`.
    pub fn recruitment(&self, key: &str) -> Option<RecruitmentDetail<'_>> {
        let recruitment = self
            .recruitment_index
            .get(key)
            .map(|&i| &self.recruitments[i])?;

        let company = record_key(recruitment, COMPANY_KEY).and_then(|fk| self.company(&fk));

        Some(RecruitmentDetail {
            recruitment,
            company,
        })
    }

    /// Every loaded company row in source order, keyed or not.
    pub fn companies(&self) -> &[Record] {
        &self.companies
    }

    /// Every loaded recruitment row in source order, keyed or not.
    pub fn recruitments(&self) -> &[Record] {
        &self.recruitments
    }

    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            companies: self.company_index.len(),
            recruitments: self.recruitment_index.len(),
        }
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}

/// Accumulates rows and produces a [`Snapshot`].
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    excluded_columns: Vec<String>,
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    /// `excluded_columns` are substrings; company columns containing any of
    /// them are dropped. Recruitment rows are kept whole.
    pub fn new(excluded_columns: Vec<String>) -> Self {
        Self {
            excluded_columns,
            snapshot: Snapshot::default(),
        }
    }

    pub fn push_company(&mut self, row: Row) {
        let record = sanitize_row(exclude_columns(row, &self.excluded_columns));
        let target = &mut self.snapshot;

        if let Some(key) = record_key(&record, COMPANY_KEY) {
            target.company_index.insert(key, target.companies.len());
        }
        target.companies.push(record);
    }

    pub fn push_recruitment(&mut self, row: Row) {
        let record = sanitize_row(row);
        let target = &mut self.snapshot;

        if let Some(key) = record_key(&record, RECRUITMENT_KEY) {
            target.recruitment_index.insert(key, target.recruitments.len());
        }
        target.recruitments.push(record);
    }

    pub fn extend_companies(&mut self, rows: impl IntoIterator<Item = Row>) {
        for row in rows {
            self.push_company(row);
        }
    }

    pub fn extend_recruitments(&mut self, rows: impl IntoIterator<Item = Row>) {
        for row in rows {
            self.push_recruitment(row);
        }
    }

    /// Finish the snapshot, stamping it with the current time.
    pub fn build(self) -> Snapshot {
        Snapshot {
            loaded_at: Some(Utc::now()),
            ..self.snapshot
        }
    }
}
