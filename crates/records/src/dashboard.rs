//! Per-category analytics for the dashboard.
//!
//! The five category bar charts and the pie summary are fetched
//! concurrently and independently: a failing endpoint publishes an error
//! notice and leaves its chart as it was, the others still update.

use std::collections::HashMap;

use chrono::NaiveDate;
use futures::future::join_all;

use counsel_client::api::decode_list;
use counsel_client::HttpError;
use counsel_core::dashboard::{
    analytics_query, CountBucket, DateRange, GradeFilter, PieSlice, ProblemCategory, RangePreset,
    PIE_SUMMARY_ENDPOINT,
};

use crate::state::AppContext;

/// Which charts a [`DashboardAggregator::refresh`] could not update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub failed: Vec<&'static str>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct DashboardAggregator {
    ctx: AppContext,
    grade: GradeFilter,
    preset: RangePreset,
    range: DateRange,
    bars: HashMap<ProblemCategory, Vec<CountBucket>>,
    pie: Vec<PieSlice>,
    selected: ProblemCategory,
}

impl DashboardAggregator {
    /// All grades, no date bounds, academic chart selected, no data yet.
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            grade: GradeFilter::All,
            preset: RangePreset::Custom,
            range: DateRange::default(),
            bars: HashMap::new(),
            pie: Vec::new(),
            selected: ProblemCategory::Academic,
        }
    }

    // ---- filters ----
    //
    // Changing a filter does not fetch; call `refresh` afterwards.

    pub fn grade(&self) -> &GradeFilter {
        &self.grade
    }

    pub fn set_grade(&mut self, grade: GradeFilter) {
        self.grade = grade;
    }

    pub fn preset(&self) -> RangePreset {
        self.preset
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Overwrite both dates from a quick range, or clear them for custom.
    pub fn set_preset(&mut self, preset: RangePreset, today: NaiveDate) {
        self.preset = preset;
        self.range = DateRange::for_preset(preset, today);
    }

    pub fn set_start(&mut self, start: Option<NaiveDate>) {
        self.preset = RangePreset::Custom;
        self.range.start = start;
    }

    pub fn set_end(&mut self, end: Option<NaiveDate>) {
        self.preset = RangePreset::Custom;
        self.range.end = end;
    }

    /// Query pairs sent with every analytics request.
    pub fn query(&self) -> Vec<(String, String)> {
        analytics_query(&self.grade, &self.range)
    }

    // ---- data ----

    pub fn bars(&self, category: ProblemCategory) -> &[CountBucket] {
        self.bars.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn pie(&self) -> &[PieSlice] {
        &self.pie
    }

    pub fn selected(&self) -> ProblemCategory {
        self.selected
    }

    /// Select the category whose bar chart is shown. Unknown labels are
    /// ignored and return `false`.
    pub fn select_slice(&mut self, label: &str) -> bool {
        match ProblemCategory::from_slice(label) {
            Some(category) => {
                self.selected = category;
                true
            }
            None => {
                tracing::debug!(label, "Ignoring unknown pie slice");
                false
            }
        }
    }

    /// The selected category and its bars.
    pub fn selected_chart(&self) -> (ProblemCategory, &[CountBucket]) {
        (self.selected, self.bars(self.selected))
    }

    /// Fetch every chart with the current filters.
    pub async fn refresh(&mut self) -> RefreshReport {
        let query = self.query();
        let api = &self.ctx.api;

        let bar_requests = ProblemCategory::ALL.map(|category| {
            let query = &query;
            async move {
                let result = api
                    .analytics(category.endpoint(), query)
                    .await
                    .and_then(decode_list::<CountBucket>);
                (category, result)
            }
        });
        let pie_request = async {
            api.analytics(PIE_SUMMARY_ENDPOINT, &query)
                .await
                .and_then(decode_list::<PieSlice>)
        };

        let (bar_results, pie_result) = futures::join!(join_all(bar_requests), pie_request);

        let mut report = RefreshReport::default();
        for (category, result) in bar_results {
            match result {
                Ok(buckets) => {
                    self.bars.insert(category, buckets);
                }
                Err(e) => self.report_failure(&mut report, category.endpoint(), category.label(), &e),
            }
        }
        match pie_result {
            Ok(slices) => self.pie = slices,
            Err(e) => self.report_failure(&mut report, PIE_SUMMARY_ENDPOINT, "Problem summary", &e),
        }

        tracing::info!(
            grade = self.grade.as_query_value(),
            failed = report.failed.len(),
            "Dashboard refreshed"
        );
        report
    }

    fn report_failure(
        &self,
        report: &mut RefreshReport,
        endpoint: &'static str,
        chart: &str,
        error: &HttpError,
    ) {
        tracing::warn!(endpoint, error = %error, "Analytics request failed");
        self.ctx
            .notifier
            .error(format!("Could not load {chart}: {}", error.user_message()));
        report.failed.push(endpoint);
    }
}
