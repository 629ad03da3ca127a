mod exam_vm;
mod home_vm;
mod results_vm;
mod time_fmt;

pub use exam_vm::{ExamIntent, ExamScreenVm, OptionVm, QuestionCardVm, map_exam_screen};
pub use home_vm::{ExamListingVm, map_exam_listings};
pub use results_vm::{PASS_PERCENT, ResultCardVm, map_result_cards};
pub use time_fmt::{CountdownVm, LOW_TIME_SECS, format_countdown, format_datetime, map_countdown};
