//! Sampling hierarchy checks.
//!
//! A site implies a method and a period. The converse (method or period
//! without a site) is accepted and not checked.

use survey_model::ObservationRow;

use crate::issue::Issue;

pub fn check(row: &ObservationRow) -> Vec<Issue> {
    let mut issues = Vec::new();
    if row.survey_sample_site_id.is_none() {
        return issues;
    }
    if row.survey_sample_method_id.is_none() {
        issues.push(Issue::MissingSamplingMethod);
    }
    if row.survey_sample_period_id.is_none() {
        issues.push(Issue::MissingSamplingPeriod);
    }
    issues
}
