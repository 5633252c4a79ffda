//! Counters the sub-models keep instead of failing.
//!
//! Each worker owns one [`Diagnostics`]; the executor merges them once the
//! pass is over.  Merging is plain addition, so the totals do not depend on
//! how households were split into packets.

use log::{info, warn};

/// Why a household did not get a joint tour frequency choice.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum JointIneligible {
    OnePerson,
    FewerThanTwoLeaveHome,
    OnlyPreschoolersLeaveHome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Work tours scheduled with no free window.
    pub no_work_window:     u64,
    /// School tours scheduled with no free window.
    pub no_school_window:   u64,
    /// Mandatory tours skipped because the person has no usual location.
    pub no_usual_location:  u64,
    /// Destination choices with no positive size term anywhere.
    pub no_destination:     u64,
    pub joint_ineligible:   [u64; 3],
    /// Participation choices repeated because the drawn party was invalid.
    pub party_redraws:      u64,
    pub soa_tables:         u64,
}

impl Diagnostics {
    pub fn joint_ineligible(&mut self, reason: JointIneligible) {
        self.joint_ineligible[reason as usize] += 1;
    }

    pub fn merge(&mut self, other: &Diagnostics) {
        self.no_work_window += other.no_work_window;
        self.no_school_window += other.no_school_window;
        self.no_usual_location += other.no_usual_location;
        self.no_destination += other.no_destination;
        for (a, b) in self.joint_ineligible.iter_mut().zip(other.joint_ineligible) {
            *a += b;
        }
        self.party_redraws += other.party_redraws;
        self.soa_tables += other.soa_tables;
    }

    /// Log a one-pass summary; anything a modeler should look at is a warning.
    pub fn log_summary(&self, label: &str) {
        if self.no_work_window > 0 || self.no_school_window > 0 {
            warn!(
                "{label}: {} work and {} school tours had no available time window",
                self.no_work_window, self.no_school_window
            );
        }
        if self.no_usual_location > 0 {
            warn!("{label}: {} mandatory tours skipped without a usual location", self.no_usual_location);
        }
        if self.no_destination > 0 {
            warn!("{label}: {} destination choices had no zone with positive size", self.no_destination);
        }
        info!(
            "{label}: joint tours skipped for {} one-person, {} stay-home and {} preschool-only households; \
             {} party redraws; {} sample tables",
            self.joint_ineligible[0],
            self.joint_ineligible[1],
            self.joint_ineligible[2],
            self.party_redraws,
            self.soa_tables,
        );
    }
}
