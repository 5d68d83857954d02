//! Wizard step state machine.
//!
//! The wizard progresses through eight data steps plus a read-only summary.
//! Steps are identified by an explicit enum, never by positional index, so
//! reordering the flow cannot silently re-bind a step to the wrong section.
//!
//! # Step Flow
//!
//! ```text
//! General -> Address -> Position -> EmploymentType -> Attainment
//!     -> Account -> Contact -> File -> Summary
//! ```

use crate::section::SectionKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the record wizard.
///
/// Every step except [`WizardStep::Summary`] maps 1:1 to a [`SectionKey`] of
/// the composite record. Summary is read-only and carries no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Names, identifiers, birth date, civil status.
    General,
    /// Home address with the four-level location hierarchy.
    Address,
    /// Position, schedule, job level and rate.
    Position,
    /// Employment category and start/end dates.
    EmploymentType,
    /// Educational attainment.
    Attainment,
    /// Payroll account details.
    Account,
    /// Contact lines (multi-valued).
    Contact,
    /// File attachments (multi-valued).
    File,
    /// Read-only review of everything collected so far.
    Summary,
}

impl WizardStep {
    /// Total number of steps, summary included.
    pub const TOTAL_STEPS: usize = 9;

    /// All data-bearing steps in wizard order (summary excluded).
    pub const fn data_steps() -> &'static [Self] {
        &[
            Self::General,
            Self::Address,
            Self::Position,
            Self::EmploymentType,
            Self::Attainment,
            Self::Account,
            Self::Contact,
            Self::File,
        ]
    }

    /// All steps in wizard order.
    pub const fn all_steps() -> &'static [Self] {
        &[
            Self::General,
            Self::Address,
            Self::Position,
            Self::EmploymentType,
            Self::Attainment,
            Self::Account,
            Self::Contact,
            Self::File,
            Self::Summary,
        ]
    }

    /// Next step in the sequence, or `None` at the summary.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::General => Some(Self::Address),
            Self::Address => Some(Self::Position),
            Self::Position => Some(Self::EmploymentType),
            Self::EmploymentType => Some(Self::Attainment),
            Self::Attainment => Some(Self::Account),
            Self::Account => Some(Self::Contact),
            Self::Contact => Some(Self::File),
            Self::File => Some(Self::Summary),
            Self::Summary => None,
        }
    }

    /// Previous step in the sequence, or `None` at the first step.
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::General => None,
            Self::Address => Some(Self::General),
            Self::Position => Some(Self::Address),
            Self::EmploymentType => Some(Self::Position),
            Self::Attainment => Some(Self::EmploymentType),
            Self::Account => Some(Self::Attainment),
            Self::Contact => Some(Self::Account),
            Self::File => Some(Self::Contact),
            Self::Summary => Some(Self::File),
        }
    }

    /// Whether going back from this step is possible.
    pub const fn can_go_back(self) -> bool {
        self.previous().is_some()
    }

    /// The composite-record section this step edits.
    ///
    /// Summary returns `None`: it only reviews data, it never owns any.
    pub const fn data_key(self) -> Option<SectionKey> {
        match self {
            Self::General => Some(SectionKey::General),
            Self::Address => Some(SectionKey::Address),
            Self::Position => Some(SectionKey::Position),
            Self::EmploymentType => Some(SectionKey::EmploymentType),
            Self::Attainment => Some(SectionKey::Attainment),
            Self::Account => Some(SectionKey::Account),
            Self::Contact => Some(SectionKey::Contact),
            Self::File => Some(SectionKey::File),
            Self::Summary => None,
        }
    }

    /// True for the read-only summary step.
    pub const fn is_summary(self) -> bool {
        matches!(self, Self::Summary)
    }

    /// True for the last step that still carries data.
    ///
    /// Advancing past it triggers the full-record validation gate.
    pub const fn is_last_data_step(self) -> bool {
        matches!(self, Self::File)
    }

    /// Display title for this step.
    pub const fn title(self) -> &'static str {
        match self {
            Self::General => "General Information",
            Self::Address => "Address",
            Self::Position => "Position",
            Self::EmploymentType => "Employment Type",
            Self::Attainment => "Educational Attainment",
            Self::Account => "Account",
            Self::Contact => "Contact Details",
            Self::File => "Files",
            Self::Summary => "Summary",
        }
    }

    /// Step number (1-indexed for display).
    pub fn step_number(self) -> usize {
        match self {
            Self::General => 1,
            Self::Address => 2,
            Self::Position => 3,
            Self::EmploymentType => 4,
            Self::Attainment => 5,
            Self::Account => 6,
            Self::Contact => 7,
            Self::File => 8,
            Self::Summary => 9,
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::General
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}
