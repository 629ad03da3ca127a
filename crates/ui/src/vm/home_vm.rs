use services::ExamListing;

use crate::routes::Route;

#[derive(Clone, PartialEq)]
pub struct ExamListingVm {
    pub title: String,
    pub time_limit_label: String,
    pub route: Route,
}

#[must_use]
pub fn map_exam_listings(exams: &[ExamListing]) -> Vec<ExamListingVm> {
    exams
        .iter()
        .map(|exam| ExamListingVm {
            title: exam.title.clone(),
            time_limit_label: format!("{} minutes", exam.time_limit.minutes()),
            route: Route::exam(exam.exam_id, exam.time_limit),
        })
        .collect()
}
